//! Tidiness checks.
//!
//! A state made of intermediate species is *tidy* if some sequence of reactions that consume no
//! formal species brings it to the empty state. States are explored smallest first, formal species
//! are projected out of every successor.

crate::prelude!();

/// Result of a tidiness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tidiness {
    /// The empty state is reachable.
    Tidy,
    /// The empty state is not reachable.
    Untidy,
    /// The search stopped at the width bound, carries the states left to explore.
    Pending(Vec<Multiset>),
    /// The search visited more states than allowed.
    Exceeded,
}
impl Tidiness {
    /// True if [`Tidiness::Tidy`].
    pub fn is_tidy(&self) -> bool {
        matches!(self, Self::Tidy)
    }
}

/// Tidiness checker over a CRN, remembers the states known to be tidy.
pub struct TidyCheck<'a> {
    crn: &'a [Reaction],
    formals: &'a Set<Species>,
    max_states: usize,
    tidy: HashSet<Multiset>,
}

impl<'a> TidyCheck<'a> {
    /// Constructor.
    ///
    /// A single check fails with [`Tidiness::Exceeded`] when it has seen more than `max_states`
    /// states.
    pub fn new(crn: &'a [Reaction], formals: &'a Set<Species>, max_states: usize) -> Self {
        Self {
            crn,
            formals,
            max_states,
            tidy: HashSet::new(),
        }
    }

    /// True if `state` is known to be tidy.
    pub fn is_known_tidy(&self, state: &Multiset) -> bool {
        self.tidy.contains(state)
    }

    /// Checks that `state` is tidy, formal species are ignored.
    ///
    /// Hitting the width `bound` yields [`Tidiness::Pending`], which [`Self::resume`] can
    /// continue later with a larger bound.
    pub fn check(
        &mut self,
        state: &Multiset,
        bound: Option<usize>,
        deadline: &Deadline,
    ) -> Res<Tidiness> {
        let state = state.project_out(self.formals);
        let res = self.search(vec![state.clone()], bound, deadline)?;
        if res.is_tidy() {
            self.tidy.insert(state);
        }
        Ok(res)
    }

    /// Resumes a pending check on behalf of `state`.
    pub fn resume(
        &mut self,
        state: &Multiset,
        queue: Vec<Multiset>,
        bound: Option<usize>,
        deadline: &Deadline,
    ) -> Res<Tidiness> {
        let res = self.search(queue, bound, deadline)?;
        if res.is_tidy() {
            self.tidy.insert(state.project_out(self.formals));
        }
        Ok(res)
    }

    fn search(
        &self,
        queue: Vec<Multiset>,
        bound: Option<usize>,
        deadline: &Deadline,
    ) -> Res<Tidiness> {
        // Smallest first, insertion order for states of the same size.
        let mut todo: Map<(usize, usize), Multiset> = Map::new();
        let mut seen: HashSet<Multiset> = HashSet::new();
        let mut count = 0;
        for state in queue {
            if seen.insert(state.clone()) {
                todo.insert((state.len(), count), state);
                count += 1;
            }
        }

        while let Some(((len, idx), state)) = todo.pop_first() {
            deadline.check()?;
            if len == 0 || self.tidy.contains(&state) {
                return Ok(Tidiness::Tidy);
            }
            if bound.map(|bound| len > bound).unwrap_or(false) {
                todo.insert((len, idx), state);
                trace!("tidiness check pending, {} states left", todo.len());
                return Ok(Tidiness::Pending(todo.into_values().collect()));
            }

            for rxn in self.crn {
                if let Some(next) = rxn.fire(&state) {
                    let next = next.project_out(self.formals);
                    if seen.insert(next.clone()) {
                        if seen.len() > self.max_states {
                            debug!(
                                "tidiness check gave up after {} states",
                                self.max_states
                            );
                            return Ok(Tidiness::Exceeded);
                        }
                        todo.insert((next.len(), count), next);
                        count += 1;
                    }
                }
            }
        }
        Ok(Tidiness::Untidy)
    }
}
