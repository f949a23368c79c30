//! Permissive condition.
//!
//! Under a complete interpretation, every implementation state whose interpretation enables a
//! formal reaction must be able to reach, through trivial reactions only, a state enabling an
//! implementation of that formal reaction. Only minimal such states need to be checked.

use std::cell::Cell;

crate::prelude!();

use super::partition::{ordered_partitions, sub_multisets};

/// Permissive check variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Permissive {
    /// Fixpoint over the reachability graph of the minimal states.
    WholeGraph,
    /// Path search between minimal states, scheduling the production of null species.
    LoopSearch,
    /// Depth-first search up to some depth.
    DepthFirst,
}
impl Permissive {
    /// All the variants.
    pub const ALL: [Self; 3] = [Self::WholeGraph, Self::LoopSearch, Self::DepthFirst];

    /// Short name, suffix of the method names.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::WholeGraph => "gs",
            Self::LoopSearch => "ls",
            Self::DepthFirst => "df",
        }
    }
}
impl fmt::Display for Permissive {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::WholeGraph => write!(fmt, "whole-graph"),
            Self::LoopSearch => write!(fmt, "loop-search"),
            Self::DepthFirst => write!(fmt, "depth-first"),
        }
    }
}

/// A formal reaction some implementation state cannot implement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// The formal reaction.
    pub reaction: Reaction,
    /// The implementation state.
    pub state: Multiset,
    /// Interpretation under which the check failed.
    pub interpretation: Interpretation,
}
impl fmt::Display for Failure {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(
            fmt,
            "formal reaction `{}` cannot fire from implementation state `{}`",
            self.reaction, self.state
        )
    }
}

/// Result of a permissive check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// The condition holds.
    Holds,
    /// The condition does not hold.
    Fails(Failure),
    /// Some search hit its bound.
    Unknown(Failure),
}

/// Implementation states whose interpretation contains `state`.
///
/// States are built by covering the species of `state` one at a time with the image of one
/// implementation species. Every minimal state is in the result, along with a few larger ones.
///
/// ```rust
/// # use crn_verify::{bisim::permissive::minimal_states, interp, ms};
/// let m = interp!(A => [A], B => [B], i => [A, B], j => [B]);
/// let states = minimal_states(&ms!(A, B), &m);
/// assert_eq!(states.len(), 4);
/// assert!(states.contains(&ms!(i)));
/// assert!(states.contains(&ms!(A, B)));
/// assert!(states.contains(&ms!(A, j)));
/// ```
pub fn minimal_states(state: &Multiset, m: &Interpretation) -> Set<Multiset> {
    let mut res = Set::new();
    let first = match state.species().next() {
        Some(sp) => sp,
        None => {
            res.insert(Multiset::new());
            return res;
        }
    };
    for (sp, image) in m.iter() {
        if image.has(first) {
            for mut sub in minimal_states(&state.minus(image), m) {
                sub.insert(sp.clone(), 1);
                res.insert(sub);
            }
        }
    }
    res
}

/// Outcome of a single search.
enum Reach {
    Yes,
    No,
    Bounded,
}

/// True if the species `state` lacks to contain `needed` are all in `spare`.
fn covered(spare: &Set<Species>, needed: &Multiset, state: &Multiset) -> bool {
    needed.minus(state).species().all(|sp| spare.contains(sp))
}

struct Searcher<'a> {
    m: &'a Interpretation,
    targets: Vec<&'a Reaction>,
    trivial: &'a [&'a Reaction],
    /// Species interpreted as nothing that some reaction consumes.
    nulls: &'a Set<Species>,
    /// Minimal implementations of the formal reactants.
    points: Vec<Multiset>,
    max_states: usize,
    depth: usize,
    deadline: &'a Deadline,
    /// Steps left to the current loop search.
    budget: Cell<usize>,
}

impl<'a> Searcher<'a> {
    fn enables_target(&self, state: &Multiset) -> bool {
        self.targets.iter().any(|rxn| rxn.is_enabled(state))
    }

    fn successors<'s>(&'s self, state: &'s Multiset) -> impl Iterator<Item = Multiset> + 's {
        self.trivial.iter().filter_map(move |rxn| rxn.fire(state))
    }

    /// True if `m(lhs) ⊆ m(rhs)`.
    fn interleq(&self, lhs: &Multiset, rhs: &Multiset) -> bool {
        self.m.state(lhs).is_subset(&self.m.state(rhs))
    }

    /// Fixpoint over the minimal states, `None` if there are too many of them.
    ///
    /// A trivial reaction leads from point `i` to every point contained in its result. Along with
    /// reachability between points, the fixpoint collects the null species each point can
    /// produce in any number by looping back to itself. Point `i` fires when some target only
    /// lacks such species.
    fn whole_graph(&self) -> Res<Option<Vec<bool>>> {
        let count = self.points.len();
        if count > self.max_states {
            return Ok(None);
        }
        let mut fires = vec![false; count];
        let mut loopable = vec![Set::new(); count];
        let mut reach = vec![vec![false; count]; count];

        let mut changed = true;
        while changed {
            changed = false;
            for i in 0..count {
                self.deadline.check()?;
                if fires[i] {
                    continue;
                }
                let state = &self.points[i];
                if self
                    .targets
                    .iter()
                    .any(|rxn| covered(&loopable[i], &rxn.reactants, state))
                {
                    fires[i] = true;
                    changed = true;
                    continue;
                }
                for rxn in self.trivial {
                    if !covered(&loopable[i], &rxn.reactants, state) {
                        continue;
                    }
                    let left = state.minus(&rxn.reactants);
                    let after = left.sum(&rxn.products);
                    for j in 0..count {
                        if !self.points[j].is_subset(&after) {
                            continue;
                        }
                        if fires[j] {
                            fires[i] = true;
                            changed = true;
                            break;
                        }
                        if reach[j][i] {
                            // Null species left over by the move come back with each loop.
                            let leftover = after.minus(&self.points[j]);
                            let spare: Set<Species> = loopable[j]
                                .iter()
                                .chain(leftover.species().filter(|sp| self.nulls.contains(*sp)))
                                .cloned()
                                .collect();
                            if !spare.is_subset(&loopable[i]) {
                                loopable[i].extend(spare);
                                changed = true;
                            }
                        }
                        if !reach[i][j] {
                            reach[i][j] = true;
                            changed = true;
                        }
                        for k in 0..count {
                            if !reach[i][k] && reach[j][k] {
                                reach[i][k] = true;
                                changed = true;
                            }
                        }
                    }
                    if fires[i] {
                        break;
                    }
                }
            }
        }
        Ok(Some(fires))
    }

    /// Looks for a path of at most `2^k` trivial reactions from `start` to a state containing
    /// `goal`, or enabling a target if `goal` is `None`.
    ///
    /// Species of `spare` are available in any number. The path must leave the species of
    /// `pickup` next to `goal`. Paths are split in halves at minimal states, `pickup` is
    /// distributed over the halves.
    fn mid_search(
        &self,
        start: &Multiset,
        goal: Option<&Multiset>,
        pickup: &Set<Species>,
        spare: &Set<Species>,
        k: usize,
    ) -> Res<bool> {
        self.deadline.check()?;
        let budget = self.budget.get();
        if budget == 0 {
            return Ok(false);
        }
        self.budget.set(budget - 1);

        if let Some(goal) = goal {
            if pickup.is_empty() && covered(spare, goal, start) {
                return Ok(true);
            }
            if !self.interleq(goal, start) {
                return Ok(false);
            }
        }

        if k == 0 {
            return Ok(match goal {
                None => self
                    .targets
                    .iter()
                    .any(|rxn| covered(spare, &rxn.reactants, start)),
                Some(goal) => self.trivial.iter().any(|rxn| {
                    let after = start.minus(&rxn.reactants).sum(&rxn.products);
                    covered(spare, &rxn.reactants, start)
                        && goal.is_subset(&after)
                        && pickup.is_subset(&after.minus(goal).support())
                }),
            });
        }

        if self.mid_search(start, goal, pickup, spare, k - 1)? {
            return Ok(true);
        }
        for part in sub_multisets(&Multiset::from_species(pickup.iter().cloned())) {
            let part = part.support();
            let rest: Set<Species> = pickup.difference(&part).cloned().collect();
            for mid in &self.points {
                if self.mid_search(start, Some(mid), &part, spare, k - 1)?
                    && (!self.interleq(start, mid)
                        || self.mid_search(mid, goal, &rest, spare, k - 1)?)
                {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Search over minimal states, collecting null species through loops.
    ///
    /// Each ordered partition of the null species is a schedule: move to some point, loop back
    /// to it while producing the next part, which is then available in any number, and finally
    /// reach a target.
    fn loop_search(&self, start: &Multiset) -> Res<Reach> {
        self.budget.set(self.max_states);
        let mut rounds = 0;
        while (1usize << rounds) < self.points.len() {
            rounds += 1
        }
        let nulls = Multiset::from_species(self.nulls.iter().cloned());
        let none = Set::new();

        'schedules: for parts in ordered_partitions(&nulls, self.nulls.len() + 1) {
            let parts: Vec<Set<Species>> = parts.iter().map(Multiset::support).collect();
            let redundant = parts
                .windows(2)
                .take(parts.len().saturating_sub(2))
                .any(|pair| !pair[0].is_empty() && pair[1].is_empty());
            if redundant {
                continue;
            }

            let mut place = start.clone();
            let mut spare = Set::new();
            for pickup in &parts[..parts.len() - 1] {
                let mut moved = false;
                for base in &self.points {
                    if self.mid_search(&place, Some(base), &none, &spare, rounds)? {
                        if !self.interleq(&place, base) {
                            return Ok(Reach::Yes);
                        }
                        if self.mid_search(base, Some(base), pickup, &spare, rounds)? {
                            place = base.clone();
                            moved = true;
                            break;
                        }
                    }
                }
                if !moved {
                    continue 'schedules;
                }
                spare.extend(pickup.iter().cloned());
            }
            if self.mid_search(&place, None, &none, &spare, rounds)? {
                return Ok(Reach::Yes);
            }
        }
        Ok(if self.budget.get() == 0 {
            Reach::Bounded
        } else {
            Reach::No
        })
    }

    fn depth_first(&self, start: &Multiset) -> Res<Reach> {
        let mut best: Map<Multiset, usize> = Map::new();
        self.bounded(start, 0, &mut best)
    }

    fn bounded(
        &self,
        state: &Multiset,
        depth: usize,
        best: &mut Map<Multiset, usize>,
    ) -> Res<Reach> {
        self.deadline.check()?;
        if self.enables_target(state) {
            return Ok(Reach::Yes);
        }
        if let Some(known) = best.get(state) {
            if *known <= depth {
                return Ok(Reach::No);
            }
        }
        if depth >= self.depth {
            return Ok(Reach::Bounded);
        }
        best.insert(state.clone(), depth);
        let mut res = Reach::No;
        for next in self.successors(state).collect::<Vec<_>>() {
            match self.bounded(&next, depth + 1, best)? {
                Reach::Yes => return Ok(Reach::Yes),
                Reach::Bounded => res = Reach::Bounded,
                Reach::No => (),
            }
        }
        Ok(res)
    }
}

/// Checks the permissive condition under a complete interpretation.
///
/// `icrn` is the original implementation CRN, not interpreted.
pub fn check(
    fcrn: &[Reaction],
    icrn: &[Reaction],
    m: &Interpretation,
    variant: Permissive,
    conf: &Conf,
    deadline: &Deadline,
) -> Res<Check> {
    let interpreted: Vec<Reaction> = icrn.iter().map(|rxn| rxn.interpret(m)).collect();
    let trivial: Vec<&Reaction> = icrn
        .iter()
        .zip(&interpreted)
        .filter(|(_, int)| int.is_trivial())
        .map(|(rxn, _)| rxn)
        .collect();
    let reacting: Set<&Species> = icrn.iter().flat_map(|rxn| rxn.reactants.species()).collect();
    let nulls: Set<Species> = m
        .iter()
        .filter(|(sp, image)| image.is_empty() && reacting.contains(sp))
        .map(|(sp, _)| sp.clone())
        .collect();

    let mut unknown = None;
    for frxn in fcrn {
        let targets: Vec<&Reaction> = icrn
            .iter()
            .zip(&interpreted)
            .filter(|(_, int)| int.reactants == frxn.reactants && int.products == frxn.products)
            .map(|(rxn, _)| rxn)
            .collect();
        let points: Vec<Multiset> = minimal_states(&frxn.reactants, m)
            .into_iter()
            .filter(|state| frxn.reactants.is_subset(&m.state(state)))
            .collect();
        let searcher = Searcher {
            m,
            targets,
            trivial: &trivial,
            nulls: &nulls,
            points,
            max_states: conf.max_graph_states,
            depth: conf.depth(),
            deadline,
            budget: Cell::new(0),
        };

        let fires = match variant {
            Permissive::WholeGraph => searcher.whole_graph()?,
            Permissive::LoopSearch | Permissive::DepthFirst => None,
        };
        for (idx, state) in searcher.points.iter().enumerate() {
            let reach = match variant {
                Permissive::WholeGraph => match &fires {
                    Some(fires) if fires[idx] => Reach::Yes,
                    Some(_) => Reach::No,
                    None => Reach::Bounded,
                },
                Permissive::LoopSearch => searcher.loop_search(state)?,
                Permissive::DepthFirst => searcher.depth_first(state)?,
            };
            let failure = || Failure {
                reaction: frxn.clone(),
                state: state.clone(),
                interpretation: m.clone(),
            };
            match reach {
                Reach::Yes => (),
                Reach::No => {
                    debug!("permissive check failed: {}", failure());
                    return Ok(Check::Fails(failure()));
                }
                Reach::Bounded => {
                    debug!("permissive check ({}) inconclusive: {}", variant, failure());
                    if unknown.is_none() {
                        unknown = Some(failure())
                    }
                }
            }
        }
    }
    Ok(match unknown {
        None => Check::Holds,
        Some(failure) => Check::Unknown(failure),
    })
}

#[cfg(test)]
mod test {
    crate::prelude!();

    use super::{check, Check, Permissive};
    use crate::{interp, ms};

    fn run(fcrn: &str, icrn: &str, m: &Interpretation, variant: Permissive) -> Check {
        let fcrn = parse::crn(fcrn).unwrap().split_reversible();
        let icrn = parse::crn(icrn).unwrap().split_reversible();
        let res = check(&fcrn, &icrn, m, variant, &Conf::new(), &Deadline::none()).unwrap();
        println!("{} ({}): {:?}", icrn, variant, res);
        res
    }

    #[test]
    fn growing_trivial_loop() {
        // `i -> i + w` makes the reachable states infinite, `j` is never produced.
        let m = interp!(A => [A], B => [B], i => [A], j => [A], w => []);
        for variant in [Permissive::WholeGraph, Permissive::LoopSearch] {
            match run("A -> B", "A -> i; i -> i + w; j -> B", &m, variant) {
                Check::Fails(failure) => {
                    assert_eq!(failure.reaction.products, ms!(B));
                    assert_eq!(failure.state, ms!(A));
                }
                res => panic!("expected a failure with {}, got {:?}", variant, res),
            }
        }
        // Depth-first cannot conclude over infinitely many states.
        assert!(matches!(
            run("A -> B", "A -> i; i -> i + w; j -> B", &m, Permissive::DepthFirst),
            Check::Unknown(_)
        ));
    }

    #[test]
    fn growing_trivial_loop_that_fires() {
        let m = interp!(A => [A], B => [B], i => [A], j => [A], w => []);
        for variant in Permissive::ALL {
            let res = run("A -> B", "A -> i; i -> i + w; i -> j; j -> B", &m, variant);
            assert_eq!(res, Check::Holds, "{}", variant);
        }
    }

    #[test]
    fn loopable_nulls() {
        // `i + w -> B` needs a `w`, which `i` produces by looping through `k`.
        let m = interp!(A => [A], B => [B], i => [A], k => [A], w => []);
        for variant in Permissive::ALL {
            let res = run("A -> B", "A -> i; i -> k + w; k -> i; i + w -> B", &m, variant);
            assert_eq!(res, Check::Holds, "{}", variant);
        }
        // Nothing produces `w`.
        for variant in Permissive::ALL {
            let res = run("A -> B", "A -> i; i -> k; k -> i; i + w -> B", &m, variant);
            assert!(matches!(res, Check::Fails(_)), "{}", variant);
        }
    }
}
