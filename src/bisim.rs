//! CRN bisimulation.
//!
//! Searches for an interpretation of the implementation species as formal multisets satisfying
//!
//! - the *delimiting* condition: every implementation reaction is trivial or some formal reaction
//!   once interpreted;
//! - the *atomic* condition: every formal species is the image of some implementation species;
//! - the *permissive* condition, see [`permissive`].
//!
//! The search extends a partial interpretation so that every formal reaction is implemented
//! (column search), then so that every implementation reaction is delimited (row search). The
//! species left unknown must make their reactions trivial, which is a Diophantine problem.
//!
//! ```rust
//! # use crn_verify::{prelude::*, bisim::Permissive, ms, species_set};
//! let fcrn = parse::crn("A -> B").unwrap();
//! let icrn = parse::crn("A <=> i; i -> B").unwrap();
//! let fs = species_set!(A, B);
//! let outcome = bisim::bisimulation(
//!     &fcrn, &icrn, &fs, None, Permissive::WholeGraph, &Conf::new(), &Deadline::none(),
//! ).unwrap();
//! let m = outcome.into_interpretation().unwrap();
//! assert_eq!(m.state(&ms!(i)), ms!(A));
//! ```

crate::prelude!();

pub mod diophantine;
pub mod modular;
pub mod partition;
pub mod permissive;
pub mod table;

#[cfg(test)]
mod test;

use self::{permissive::Check, table::Table};

pub use self::{
    modular::modular_bisimulation,
    permissive::{Failure, Permissive},
};

/// Outcome of a bisimulation search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BisimOutcome {
    /// A bisimulation, the interpretation is complete.
    Found(Interpretation),
    /// There is no bisimulation, carries the last permissive failure if any.
    NotFound(Option<Failure>),
    /// No bisimulation was found, but some permissive check was inconclusive.
    Unknown(Failure),
}
impl BisimOutcome {
    /// True if [`BisimOutcome::Found`].
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
    /// The interpretation, if any.
    pub fn interpretation(&self) -> Option<&Interpretation> {
        match self {
            Self::Found(m) => Some(m),
            _ => None,
        }
    }
    /// Turns itself into the interpretation, if any.
    pub fn into_interpretation(self) -> Option<Interpretation> {
        match self {
            Self::Found(m) => Some(m),
            _ => None,
        }
    }
}
impl fmt::Display for BisimOutcome {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Found(m) => write!(fmt, "bisimulation found with interpretation\n{}", m),
            Self::NotFound(None) => write!(fmt, "no bisimulation"),
            Self::NotFound(Some(failure)) => write!(fmt, "no bisimulation, last failure: {}", failure),
            Self::Unknown(failure) => write!(fmt, "inconclusive permissive check: {}", failure),
        }
    }
}

/// Searches for a bisimulation between `fcrn` and `icrn`.
///
/// Reversible reactions are split. Implementation species named after a formal species are
/// interpreted as that formal species, unless `partial` says otherwise. `partial` is respected by
/// the result, which also carries its entries for species that do not appear in `icrn`.
///
/// # Errors
///
/// - `fcrn` mentions non-formal species;
/// - `partial` maps some species to non-formal species, or some formal species to something other
///   than itself;
/// - timeout.
pub fn bisimulation(
    fcrn: &Crn,
    icrn: &Crn,
    formals: &Set<Species>,
    partial: Option<&Interpretation>,
    permissive: Permissive,
    conf: &Conf,
    deadline: &Deadline,
) -> Res<BisimOutcome> {
    search(
        fcrn,
        icrn,
        formals,
        partial,
        permissive,
        conf,
        deadline,
        &|_| true,
    )
}

/// Same as [`bisimulation`], only yields bisimulations `accept` is happy with.
#[allow(clippy::too_many_arguments)]
pub(crate) fn search(
    fcrn: &Crn,
    icrn: &Crn,
    formals: &Set<Species>,
    partial: Option<&Interpretation>,
    permissive: Permissive,
    conf: &Conf,
    deadline: &Deadline,
    accept: &dyn Fn(&Interpretation) -> bool,
) -> Res<BisimOutcome> {
    let fcrn = fcrn.split_reversible().remove_duplicates();
    let icrn = icrn.split_reversible().remove_duplicates();
    if let Some(sp) = fcrn.species().iter().find(|sp| !formals.contains(*sp)) {
        bail!(malformed(format!(
            "species `{}` of the formal CRN is not a formal species",
            sp
        )))
    }
    let partial = partial.cloned().unwrap_or_default();
    partial.check(formals)?;

    let species = icrn.species();
    let mut m = partial.restrict(|sp| species.contains(sp));
    // Atoms interpreted by `partial` outside of `icrn`.
    let atoms: Set<Species> = partial
        .iter()
        .filter(|(sp, image)| !species.contains(*sp) && image.len() == 1)
        .flat_map(|(_, image)| image.species().cloned())
        .collect();
    for sp in species.iter().filter(|sp| formals.contains(*sp)) {
        m.entry(sp.clone())
            .or_insert_with(|| Multiset::from_species(Some(sp.clone())));
    }

    if icrn.is_empty() {
        return Ok(if fcrn.is_empty() {
            BisimOutcome::Found(partial)
        } else {
            BisimOutcome::NotFound(None)
        });
    }

    debug!(
        "bisimulation search ({}), {} formal and {} implementation reaction(s)",
        permissive,
        fcrn.len(),
        icrn.len()
    );
    let mut search = Search {
        fcrn: &fcrn,
        icrn: &icrn,
        formals,
        permissive,
        conf,
        deadline,
        accept,
        atoms,
        failure: None,
        unknown: None,
        max_depth: 0,
    };
    let columns = (0..fcrn.len()).collect();
    match search.columns(m, columns, 0)? {
        Some(mut m) => {
            for (sp, image) in partial.iter() {
                m.entry(sp.clone()).or_insert_with(|| image.clone());
            }
            info!("valid interpretation:\n{}", m);
            Ok(BisimOutcome::Found(m))
        }
        None => {
            debug!("no bisimulation, max search depth {}", search.max_depth);
            Ok(match search.unknown {
                Some(failure) => BisimOutcome::Unknown(failure),
                None => BisimOutcome::NotFound(search.failure),
            })
        }
    }
}

/// Extensions of the interpretation turning `irxn`, already interpreted, into `frxn`.
///
/// On each side, the formal species `frxn` has and `irxn` does not are distributed over the unknown
/// species of `irxn`, taking their multiplicity into account.
fn extensions(irxn: &Reaction, frxn: &Reaction) -> Vec<Map<Species, Multiset>> {
    let side = |impl_side: &Multiset, formal_side: &Multiset| -> Vec<Map<Species, Multiset>> {
        let unknown = impl_side.minus(formal_side);
        let missing = formal_side.minus(impl_side);
        let (species, weights): (Vec<Species>, Vec<usize>) =
            unknown.iter().map(|(sp, count)| (sp.clone(), count)).unzip();
        partition::weighted_partitions(&missing, &weights)
            .into_iter()
            .map(|parts| species.iter().cloned().zip(parts).collect())
            .collect()
    };
    let lft = side(&irxn.reactants, &frxn.reactants);
    let rgt = side(&irxn.products, &frxn.products);

    let mut res = vec![];
    for l in &lft {
        'rgt: for r in &rgt {
            let mut ext = l.clone();
            for (sp, image) in r {
                match ext.get(sp) {
                    Some(known) if known != image => continue 'rgt,
                    Some(_) => (),
                    None => {
                        ext.insert(sp.clone(), image.clone());
                    }
                }
            }
            res.push(ext)
        }
    }
    res
}

/// Search context.
struct Search<'a> {
    fcrn: &'a [Reaction],
    icrn: &'a [Reaction],
    formals: &'a Set<Species>,
    permissive: Permissive,
    conf: &'a Conf,
    deadline: &'a Deadline,
    accept: &'a dyn Fn(&Interpretation) -> bool,
    /// Formal species known to have an atomic implementation.
    atoms: Set<Species>,
    /// Last permissive failure.
    failure: Option<Failure>,
    /// First inconclusive permissive check.
    unknown: Option<Failure>,
    max_depth: usize,
}

impl<'a> Search<'a> {
    fn interpret(&self, m: &Interpretation) -> Vec<Reaction> {
        self.icrn.iter().map(|rxn| rxn.interpret(m)).collect()
    }

    /// Makes sure the formal reactions in `todo` are implemented.
    fn columns(
        &mut self,
        m: Interpretation,
        todo: Vec<usize>,
        depth: usize,
    ) -> Res<Option<Interpretation>> {
        self.deadline.check()?;
        self.max_depth = self.max_depth.max(depth);
        let fcrn = self.fcrn;
        let interpreted = self.interpret(&m);
        let table = Table::new(fcrn, &interpreted, self.formals);
        if !table.is_consistent() {
            trace!("inconsistent table at depth {}\n{}", depth, table);
            return Ok(None);
        }

        // Most constrained column first.
        let col = match todo.iter().cloned().min_by_key(|col| table.column(*col).count()) {
            Some(col) => col,
            None => {
                let rows = (0..interpreted.len())
                    .filter(|row| table::has_unknown(&interpreted[*row], self.formals))
                    .collect();
                return self.rows(m, rows, false, depth);
            }
        };
        let rest: Vec<usize> = todo.iter().cloned().filter(|c| *c != col).collect();

        for row in table.column(col) {
            for ext in extensions(&interpreted[row], &fcrn[col]) {
                let mut next = m.clone();
                next.extend(ext);
                if let Some(res) = self.columns(next, rest.clone(), depth + 1)? {
                    return Ok(Some(res));
                }
            }
        }
        Ok(None)
    }

    /// Makes sure the implementation reactions in `todo` are delimited.
    ///
    /// `tried` is true if the equations were already tried for `m`.
    fn rows(
        &mut self,
        m: Interpretation,
        todo: Vec<usize>,
        mut tried: bool,
        depth: usize,
    ) -> Res<Option<Interpretation>> {
        self.deadline.check()?;
        self.max_depth = self.max_depth.max(depth);
        let fcrn = self.fcrn;
        let interpreted = self.interpret(&m);
        let table = Table::new(fcrn, &interpreted, self.formals);
        if !table.is_consistent() {
            trace!("inconsistent table at depth {}\n{}", depth, table);
            return Ok(None);
        }
        if todo.is_empty() {
            return if tried { Ok(None) } else { self.equations(&m) };
        }

        // All the rows left can be trivial, try to solve the unknown species.
        if !tried && todo.iter().all(|row| table.trivial(*row)) {
            if let Some(res) = self.equations(&m)? {
                return Ok(Some(res));
            }
            tried = true
        }

        let row = todo
            .iter()
            .map(|row| (table.row_formals(*row).count(), *row))
            .filter(|(count, _)| *count > 0)
            .min_by_key(|(count, _)| *count)
            .map(|(_, row)| row);
        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };
        let rest: Vec<usize> = todo.iter().cloned().filter(|r| *r != row).collect();

        if table.trivial(row) {
            if let Some(res) = self.rows(m.clone(), rest.clone(), tried, depth)? {
                return Ok(Some(res));
            }
        }
        for col in table.row_formals(row) {
            for ext in extensions(&interpreted[row], &fcrn[col]) {
                let mut next = m.clone();
                next.extend(ext);
                if let Some(res) = self.rows(next, rest.clone(), false, depth + 1)? {
                    return Ok(Some(res));
                }
            }
        }
        Ok(None)
    }

    /// Completes the interpretation so that the reactions with unknown species are trivial.
    ///
    /// Formal species without an atomic implementation are first assigned to unknown species.
    fn equations(&mut self, m: &Interpretation) -> Res<Option<Interpretation>> {
        self.deadline.check()?;
        let formals = self.formals;
        let interpreted = self.interpret(m);
        let rows: Vec<usize> = (0..interpreted.len())
            .filter(|row| table::has_unknown(&interpreted[*row], formals))
            .collect();
        let unknown: Vec<Species> = rows
            .iter()
            .flat_map(|row| interpreted[*row].species())
            .filter(|sp| !formals.contains(sp))
            .collect::<Set<_>>()
            .into_iter()
            .collect();

        let atoms: Set<&Species> = m
            .values()
            .filter(|image| image.len() == 1)
            .flat_map(|image| image.species())
            .chain(self.atoms.iter())
            .collect();
        let missing: Vec<&Species> = formals.iter().filter(|sp| !atoms.contains(sp)).collect();

        for assign in partition::arrangements(&unknown, missing.len()) {
            let mut next = m.clone();
            for (sp, formal) in assign.iter().zip(&missing) {
                next.insert(sp.clone(), Multiset::from_species(Some((*formal).clone())));
            }
            let interpreted = self.interpret(&next);
            let table = Table::new(self.fcrn, &interpreted, formals);
            if !table.is_consistent() || rows.iter().any(|row| !table.trivial(*row)) {
                continue;
            }

            let left: Vec<Species> = unknown
                .iter()
                .filter(|sp| !assign.contains(sp))
                .cloned()
                .collect();
            if !left.is_empty() {
                match self.solve(&interpreted, &rows, &left)? {
                    Some(images) => next.extend(images),
                    None => continue,
                }
            }
            if let Some(res) = self.permissive(next)? {
                return Ok(Some(res));
            }
        }
        Ok(None)
    }

    /// Interprets the `unknown` species so that all `rows` are trivial, one formal species at a
    /// time.
    fn solve(
        &self,
        interpreted: &[Reaction],
        rows: &[usize],
        unknown: &[Species],
    ) -> Res<Option<Map<Species, Multiset>>> {
        let mut images: Map<Species, Multiset> = unknown
            .iter()
            .map(|sp| (sp.clone(), Multiset::new()))
            .collect();
        for formal in self.formals {
            let system: Vec<Vec<i64>> = rows
                .iter()
                .map(|row| {
                    let rxn = &interpreted[*row];
                    let net = |sp: &Species| {
                        rxn.reactants.count(sp) as i64 - rxn.products.count(sp) as i64
                    };
                    unknown.iter().map(net).chain(Some(net(formal))).collect()
                })
                .collect();
            match diophantine::solve(&system, self.deadline)? {
                None => {
                    trace!("no solution for formal species {}", formal);
                    return Ok(None);
                }
                Some(solution) => {
                    for (sp, count) in unknown.iter().zip(solution) {
                        if let Some(image) = images.get_mut(sp) {
                            image.insert(formal.clone(), count)
                        }
                    }
                }
            }
        }
        Ok(Some(images))
    }

    /// Checks the permissive condition on a complete interpretation.
    fn permissive(&mut self, m: Interpretation) -> Res<Option<Interpretation>> {
        let check = permissive::check(
            self.fcrn,
            self.icrn,
            &m,
            self.permissive,
            self.conf,
            self.deadline,
        )?;
        match check {
            Check::Holds => {
                if (self.accept)(&m) {
                    Ok(Some(m))
                } else {
                    debug!("bisimulation rejected");
                    Ok(None)
                }
            }
            Check::Fails(failure) => {
                self.failure = Some(failure);
                Ok(None)
            }
            Check::Unknown(failure) => {
                if self.unknown.is_none() {
                    self.unknown = Some(failure)
                }
                Ok(None)
            }
        }
    }
}
