//! Pathways, sequences of reactions fired from a minimal initial state.
//!
//! A [`Pathway`] borrows its reactions from a CRN and refers to them by index. Extension with
//! [`Pathway::extend`] produces a fresh pathway whose initial state, final state, width, formal
//! closure and decompositions are computed incrementally from the parent. The other attributes are
//! computed on demand and cached.

use std::cell::OnceCell;

crate::prelude!();


/// Attributes identifying a pathway during basis enumeration.
///
/// Two pathways with the same signature are interchangeable: same extensions, same verdicts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Minimal initial state.
    pub initial: Multiset,
    /// Final state.
    pub final_state: Multiset,
    /// Width.
    pub width: usize,
    /// Formal closure.
    pub closure: Multiset,
    /// Decomposed final states.
    pub dfs: Set<Multiset>,
    /// Regular final states.
    pub rfs: Set<Multiset>,
}

/// A sequence of reactions over a fixed CRN and a fixed set of formal species.
#[derive(Clone)]
pub struct Pathway<'a> {
    /// Reactions the steps refer to.
    crn: &'a [Reaction],
    /// Formal species.
    formals: &'a Set<Species>,
    /// Indices of the reactions in `crn`.
    steps: Vec<usize>,
    /// Minimal initial state.
    initial: Multiset,
    /// Final state.
    final_state: Multiset,
    /// Largest state.
    width: usize,
    /// Union of the formal projections of all states.
    closure: Multiset,
    /// Pairs of final states of the two halves of all the decompositions, `None` if not
    /// semiformal. Index `0` is always the trivial decomposition `(final_state, ∅)`.
    pairs: Option<Vec<(Multiset, Multiset)>>,

    states: OnceCell<Vec<Multiset>>,
    dfs: OnceCell<Option<Set<Multiset>>>,
    rfs: OnceCell<Set<Multiset>>,
}

impl<'a> Pathway<'a> {
    /// Empty pathway.
    pub fn new(crn: &'a [Reaction], formals: &'a Set<Species>) -> Self {
        Self {
            crn,
            formals,
            steps: vec![],
            initial: Multiset::new(),
            final_state: Multiset::new(),
            width: 0,
            closure: Multiset::new(),
            pairs: Some(vec![(Multiset::new(), Multiset::new())]),
            states: OnceCell::new(),
            dfs: OnceCell::new(),
            rfs: OnceCell::new(),
        }
    }

    /// Pathway firing some reactions of `crn`, in order.
    ///
    /// # Errors
    ///
    /// - if a step is not a legal index in `crn`.
    pub fn from_steps(
        crn: &'a [Reaction],
        formals: &'a Set<Species>,
        steps: impl IntoIterator<Item = usize>,
    ) -> Res<Self> {
        let mut res = Self::new(crn, formals);
        for step in steps {
            if step >= crn.len() {
                bail!(
                    "[internal] illegal reaction index {} for a CRN of length {}",
                    step,
                    crn.len()
                )
            }
            res = res.extend(step)
        }
        Ok(res)
    }

    /// Pathway firing all the reactions of `crn`, in order.
    pub fn of(crn: &'a [Reaction], formals: &'a Set<Species>) -> Self {
        (0..crn.len()).fold(Self::new(crn, formals), |path, idx| path.extend(idx))
    }

    /// A copy of this pathway over another CRN of the same length, typically its
    /// interpretation.
    pub fn over<'b>(&self, crn: &'b [Reaction], formals: &'b Set<Species>) -> Res<Pathway<'b>> {
        Pathway::from_steps(crn, formals, self.steps.iter().cloned())
    }

    /// Extends the pathway with reaction `idx` of the CRN.
    pub fn extend(&self, idx: usize) -> Self {
        let rxn = &self.crn[idx];
        let missing = rxn.reactants.minus(&self.final_state);
        let initial = self.initial.sum(&missing);
        let final_state = self
            .final_state
            .sum(&missing)
            .minus(&rxn.reactants)
            .sum(&rxn.products);
        let width = (self.width + missing.len()).max(final_state.len());
        let closure = self
            .closure
            .sum(&missing.project(self.formals))
            .union(&final_state.project(self.formals));
        let pairs = self
            .pairs
            .as_ref()
            .and_then(|pairs| next_pairs(pairs, rxn, self.formals));

        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend(self.steps.iter().cloned());
        steps.push(idx);

        Self {
            crn: self.crn,
            formals: self.formals,
            steps,
            initial,
            final_state,
            width,
            closure,
            pairs,
            states: OnceCell::new(),
            dfs: OnceCell::new(),
            rfs: OnceCell::new(),
        }
    }

    /// Number of reactions.
    pub fn len(&self) -> usize {
        self.steps.len()
    }
    /// True if there are no reactions.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
    /// Reaction indices.
    pub fn steps(&self) -> &[usize] {
        &self.steps
    }
    /// Reactions, in order.
    pub fn reactions(&self) -> impl Iterator<Item = &'a Reaction> + '_ {
        let crn = self.crn;
        self.steps.iter().map(move |idx| &crn[*idx])
    }
    /// Formal species.
    pub fn formals(&self) -> &'a Set<Species> {
        self.formals
    }

    /// Minimal initial state.
    pub fn initial(&self) -> &Multiset {
        &self.initial
    }
    /// Final state.
    pub fn final_state(&self) -> &Multiset {
        &self.final_state
    }
    /// Size of the largest state, counting multiplicity.
    pub fn width(&self) -> usize {
        self.width
    }
    /// Formal closure, the formal species witnessed along the pathway.
    pub fn closure(&self) -> &Multiset {
        &self.closure
    }

    /// True if the initial state is formal.
    pub fn is_semiformal(&self) -> bool {
        self.initial.is_over(self.formals)
    }
    /// True if the final state is formal.
    pub fn is_closed(&self) -> bool {
        self.final_state.is_over(self.formals)
    }
    /// True if the initial and final states are formal.
    pub fn is_formal(&self) -> bool {
        self.is_semiformal() && self.is_closed()
    }

    /// All the states from the initial state to the final state.
    pub fn states(&self) -> &[Multiset] {
        self.states.get_or_init(|| {
            let mut states = Vec::with_capacity(self.steps.len() + 1);
            let mut current = self.initial.clone();
            states.push(current.clone());
            for rxn in self.reactions() {
                current = current.minus(&rxn.reactants).sum(&rxn.products);
                states.push(current.clone());
            }
            states
        })
    }

    /// Decomposed final states, `None` if the pathway is not semiformal.
    ///
    /// The final states of both halves of all the non-trivial decompositions of the pathway into
    /// two semiformal interleaved sub-pathways.
    pub fn dfs(&self) -> Option<&Set<Multiset>> {
        self.dfs
            .get_or_init(|| {
                self.pairs.as_ref().map(|pairs| {
                    let mut dfs = Set::new();
                    for (left, right) in pairs.iter().skip(1) {
                        dfs.insert(left.clone());
                        dfs.insert(right.clone());
                    }
                    dfs
                })
            })
            .as_ref()
    }

    /// Decomposition pairs, index `0` is the trivial decomposition.
    pub fn decompositions(&self) -> Option<&[(Multiset, Multiset)]> {
        self.pairs.as_deref()
    }

    /// True if the pathway has no non-trivial decomposition.
    pub fn is_prime(&self) -> bool {
        self.dfs().map(|dfs| dfs.is_empty()).unwrap_or(false)
    }

    /// True if some decomposition has a half with a formal final state.
    pub fn is_strongly_decomposable(&self) -> bool {
        self.dfs()
            .map(|dfs| dfs.iter().any(|state| state.is_over(self.formals)))
            .unwrap_or(false)
    }

    /// Regular final states.
    ///
    /// Let `j` be the first state index where the formal projection is not contained in the
    /// initial state (the last index if there is none). Walking backwards from the final state,
    /// `T` accumulates the formal projections of the states. Reaction `i ≤ j` is a turning point
    /// if the formal projection of its state minus its reactants is empty, `T` is then a regular
    /// final state.
    pub fn rfs(&self) -> &Set<Multiset> {
        self.rfs.get_or_init(|| {
            let states = self.states();
            let n = self.steps.len();
            let turn = states
                .iter()
                .position(|state| !state.project(self.formals).is_subset(&self.initial))
                .unwrap_or(n);

            let mut rfs = Set::new();
            let mut acc = Multiset::new();
            for i in (1..=n).rev() {
                acc = acc.union(&states[i].project(self.formals));
                if i > turn {
                    continue;
                }
                let rxn = &self.crn[self.steps[i - 1]];
                if states[i - 1]
                    .minus(&rxn.reactants)
                    .project(self.formals)
                    .is_empty()
                {
                    rfs.insert(acc.clone());
                }
            }
            rfs
        })
    }

    /// True if the final state is a regular final state.
    pub fn is_regular(&self) -> bool {
        self.rfs().contains(&self.final_state)
    }

    /// Signature, `None` if the pathway is not semiformal.
    pub fn signature(&self) -> Option<Signature> {
        let dfs = self.dfs()?.clone();
        Some(Signature {
            initial: self.initial.clone(),
            final_state: self.final_state.clone(),
            width: self.width,
            closure: self.closure.clone(),
            dfs,
            rfs: self.rfs().clone(),
        })
    }

    /// True if all states have at most one element in `nonwastes`, counting multiplicity.
    pub fn is_linear(&self, nonwastes: &Set<Species>) -> bool {
        self.states()
            .iter()
            .all(|state| state.project(nonwastes).len() <= 1)
    }
}

/// Decomposition pairs after firing `rxn`, `None` if no decomposition can fire it.
///
/// Each half consumes the formal reactants it has and must contain the intermediate ones.
fn next_pairs(
    pairs: &[(Multiset, Multiset)],
    rxn: &Reaction,
    formals: &Set<Species>,
) -> Option<Vec<(Multiset, Multiset)>> {
    let formal_r = rxn.reactants.project(formals);
    let inter_r = rxn.reactants.project_out(formals);
    let fire = |half: &Multiset| {
        half.minus(&formal_r)
            .checked_minus(&inter_r)
            .map(|rest| rest.sum(&rxn.products))
    };

    let mut res: Vec<(Multiset, Multiset)> = Vec::with_capacity(pairs.len() * 2);
    let push = |res: &mut Vec<(Multiset, Multiset)>, pair: (Multiset, Multiset)| {
        if res.is_empty() || !res[1..].contains(&pair) {
            res.push(pair)
        }
    };
    for (left, right) in pairs {
        let fired_left = fire(left);
        if left == right {
            if let Some(fired) = fired_left {
                push(&mut res, (fired, right.clone()))
            }
            continue;
        }
        match (fired_left, fire(right)) {
            (None, None) => (),
            (Some(fired), None) => push(&mut res, (fired, right.clone())),
            (None, Some(fired)) => push(&mut res, (left.clone(), fired)),
            (Some(fired_l), Some(fired_r)) => {
                push(&mut res, (fired_l, right.clone()));
                push(&mut res, (left.clone(), fired_r));
            }
        }
    }
    if res.is_empty() {
        None
    } else {
        Some(res)
    }
}

impl fmt::Display for Pathway<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        for (idx, rxn) in self.reactions().enumerate() {
            if idx > 0 {
                write!(fmt, "; ")?;
            }
            write!(fmt, "{}", rxn)?;
        }
        Ok(())
    }
}
impl fmt::Debug for Pathway<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(
            fmt,
            "Pathway({}, S0: {}, Sn: {}, w: {})",
            self, self.initial, self.final_state, self.width
        )
    }
}

/// A pathway detached from its CRN, used in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Witness {
    /// Minimal initial state.
    pub initial: Multiset,
    /// Final state.
    pub final_state: Multiset,
    /// Reactions, in order.
    pub reactions: Vec<Reaction>,
}
impl From<&Pathway<'_>> for Witness {
    fn from(path: &Pathway<'_>) -> Self {
        Self {
            initial: path.initial.clone(),
            final_state: path.final_state.clone(),
            reactions: path.reactions().cloned().collect(),
        }
    }
}
impl fmt::Display for Witness {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "from initial state {}:", self.initial)?;
        for rxn in &self.reactions {
            write!(fmt, "\n    {}", rxn)?;
        }
        write!(fmt, "\nto final state {}", self.final_state)
    }
}
