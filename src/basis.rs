//! Formal basis enumeration.
//!
//! The formal basis of a CRN is the set of `initial state -> final state` reactions of its prime
//! pathways with formal initial and final states. Enumeration explores pathways depth-first,
//! deduplicated by [signature](crate::pathway::Signature), within a width bound and an initial
//! state bound that grow until no new strongly semiformal pathway shows up. Along the way, prime
//! pathways must be tidy and the formal ones must be regular.
//!
//! ```rust
//! # use crn_verify::{prelude::*, species_set};
//! let crn = parse::crn("A <=> i; i -> B").unwrap();
//! let fs = species_set!(A, B);
//! let outcome = basis::find_basis(&crn, &fs, None, &Conf::new(), &Deadline::none()).unwrap();
//! let basis = outcome.into_basis().unwrap();
//! assert_eq!(basis.raw.to_string(), "A -> B");
//! ```

crate::prelude!();

pub mod modules;
pub mod tidy;

#[cfg(test)]
mod test;

use crate::pathway::{Signature, Witness};
use self::tidy::{TidyCheck, Tidiness};

pub use self::modules::modules;

/// Statistics of a basis enumeration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Number of modules.
    pub modules: usize,
    /// Largest width bound reached.
    pub w_max: usize,
    /// Largest initial state bound reached.
    pub i_max: usize,
    /// Number of enumeration rounds, over all modules.
    pub rounds: usize,
    /// Number of signatures of the last round, over all modules.
    pub signatures: usize,
}
impl Stats {
    fn merge(&mut self, other: Self) {
        self.modules += other.modules;
        self.w_max = self.w_max.max(other.w_max);
        self.i_max = self.i_max.max(other.i_max);
        self.rounds += other.rounds;
        self.signatures += other.signatures;
    }
}
impl fmt::Display for Stats {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(
            fmt,
            "{} module(s), {} round(s), {} signature(s), w_max = {}, i_max = {}",
            self.modules, self.rounds, self.signatures, self.w_max, self.i_max
        )
    }
}

/// A formal basis.
#[derive(Debug, Clone)]
pub struct Basis {
    /// Formal basis.
    pub raw: Crn,
    /// Formal basis of the interpreted pathways, empty without an interpretation.
    pub int: Crn,
    /// Enumeration statistics.
    pub stats: Stats,
}

/// Outcome of a basis enumeration.
#[derive(Debug, Clone)]
pub enum BasisOutcome {
    /// Enumeration succeeded.
    Found(Basis),
    /// The witness ends in a state that cannot be cleaned up.
    NotTidy(Witness),
    /// The witness is formal but its final state is not regular.
    NotRegular(Witness),
    /// A tidiness check gave up, the witness ends in the state it was checking.
    BoundExceeded(Witness),
}
impl BasisOutcome {
    /// True if a basis was found.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
    /// The basis, if any.
    pub fn into_basis(self) -> Option<Basis> {
        match self {
            Self::Found(basis) => Some(basis),
            _ => None,
        }
    }
}
impl fmt::Display for BasisOutcome {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Found(basis) if basis.raw.is_empty() => {
                write!(fmt, "the formal basis is empty")
            }
            Self::Found(basis) => write!(fmt, "formal basis:\n{}", basis.raw),
            Self::NotTidy(witness) => write!(fmt, "not tidy, {}", witness),
            Self::NotRegular(witness) => write!(fmt, "not regular, {}", witness),
            Self::BoundExceeded(witness) => {
                write!(fmt, "tidiness check exceeded its bound, {}", witness)
            }
        }
    }
}

/// Finds the formal basis of `crn`.
///
/// Reversible reactions are split first. With an `interpretation` (integrated hybrid mode),
/// regularity is checked on the interpreted pathways, and [`Basis::int`] is the basis of the
/// interpreted pathways.
///
/// # Errors
///
/// - [`ErrorKind::Timeout`] if `deadline` expires.
pub fn find_basis(
    crn: &Crn,
    formals: &Set<Species>,
    interpretation: Option<&Interpretation>,
    conf: &Conf,
    deadline: &Deadline,
) -> Res<BasisOutcome> {
    let crn = crn.split_reversible();
    let modules = if conf.modular {
        modules(&crn, &crn.intermediates(formals))
    } else {
        vec![crn]
    };
    info!(
        "divided the implementation CRN into {} module(s) with {:?} reaction(s)",
        modules.len(),
        modules.iter().map(|module| module.len()).collect::<Vec<_>>()
    );

    let interpreted_formals = interpretation.map(|m| {
        let mut set = Set::new();
        for sp in formals {
            match m.get(sp) {
                Some(image) => set.extend(image.species().cloned()),
                None => {
                    set.insert(sp.clone());
                }
            }
        }
        set
    });

    let (mut raw, mut int) = (Crn::new(), Crn::new());
    let mut stats = Stats::default();
    for (idx, module) in modules.iter().enumerate() {
        debug!("module {}:\n{}", idx + 1, module);
        let interpreted = interpretation.map(|m| module.interpret(m));
        let interpreted = interpreted.as_ref().zip(interpreted_formals.as_ref());

        let mut enumerator = Enumerator::new(module, formals, interpreted, conf, deadline);
        if let Some(fail) = enumerator.run()? {
            info!("{}", fail);
            return Ok(fail);
        }
        let (module_raw, module_int) = enumerator.basis()?;
        debug!("formal basis of module {}:\n{}", idx + 1, module_raw);
        raw.extend(module_raw);
        int.extend(module_int);
        stats.merge(enumerator.stats);
    }

    let basis = Basis {
        raw: raw.clean(),
        int: int.clean(),
        stats,
    };
    info!("enumeration done: {}", basis.stats);
    Ok(BasisOutcome::Found(basis))
}

/// Bound-related properties of a CRN.
struct Properties {
    /// Largest reaction arity.
    b: usize,
    /// Largest number of intermediate reactants.
    b_r: usize,
    /// Pairs of formal and intermediate reactant counts.
    fr_ir: Set<(usize, usize)>,
    /// Non-waste intermediates, if the CRN has a monomolecular substructure.
    nonwastes: Option<Set<Species>>,
}
impl Properties {
    fn of(crn: &Crn, formals: &Set<Species>) -> Self {
        let nonwastes = crn.nonwaste_intermediates(formals);
        let linear = crn.iter().all(|rxn| {
            rxn.reactants.project(&nonwastes).len() <= 1
                && rxn.products.project(&nonwastes).len() <= 1
        });
        let b = crn.iter().map(Reaction::arity).max().unwrap_or(0);
        let b_r = crn
            .iter()
            .map(|rxn| rxn.reactants.project_out(formals).len())
            .max()
            .unwrap_or(0);
        let fr_ir: Set<(usize, usize)> = crn
            .iter()
            .map(|rxn| {
                (
                    rxn.reactants.project(formals).len(),
                    rxn.reactants.project_out(formals).len(),
                )
            })
            .collect();
        debug!(
            "monomolecular substructure: {}, b = {}, b_r = {}, fr_ir = {:?}",
            linear, b, b_r, fr_ir
        );
        Self {
            b,
            b_r,
            fr_ir,
            nonwastes: if linear { Some(nonwastes) } else { None },
        }
    }
}

/// Basis enumeration over one module.
struct Enumerator<'a> {
    crn: &'a [Reaction],
    formals: &'a Set<Species>,
    /// Interpreted CRN and formal species, integrated hybrid mode only.
    interpreted: Option<(&'a Crn, &'a Set<Species>)>,
    props: Properties,
    deadline: &'a Deadline,

    w_max: usize,
    i_max: usize,
    signatures: HashSet<Signature>,
    elementary: Vec<Pathway<'a>>,

    tidy: TidyCheck<'a>,
    /// Tidiness checks stopped by the width bound.
    pending: Map<Multiset, (Vec<Multiset>, Witness)>,
    stats: Stats,
}

impl<'a> Enumerator<'a> {
    fn new(
        crn: &'a Crn,
        formals: &'a Set<Species>,
        interpreted: Option<(&'a Crn, &'a Set<Species>)>,
        conf: &Conf,
        deadline: &'a Deadline,
    ) -> Self {
        Self {
            crn: crn.as_slice(),
            formals,
            interpreted,
            props: Properties::of(crn, formals),
            deadline,
            w_max: 0,
            i_max: 0,
            signatures: HashSet::new(),
            elementary: vec![],
            tidy: TidyCheck::new(crn, formals, conf.tidy_max_states),
            pending: Map::new(),
            stats: Stats {
                modules: 1,
                ..Stats::default()
            },
        }
    }

    /// Runs rounds until the bounds stabilize, `Some` on failure.
    fn run(&mut self) -> Res<Option<BasisOutcome>> {
        loop {
            debug!("current bounds: w_max = {}, i_max = {}", self.w_max, self.i_max);
            self.signatures.clear();
            self.elementary.clear();
            self.stats.rounds += 1;
            let start = Pathway::new(self.crn, self.formals);
            if let Some(fail) = self.enumerate(start)? {
                return Ok(Some(fail));
            }
            debug!(
                "round over: {} signature(s), {} prime formal pathway(s)",
                self.signatures.len(),
                self.elementary.len()
            );

            let (mut new_w, mut new_i) = (0, 0);
            for sig in &self.signatures {
                if sig.dfs.is_empty() && !sig.final_state.is_over(self.formals) {
                    new_w = new_w.max(sig.width);
                    new_i = new_i.max(sig.initial.len());
                }
            }
            let w_t = new_w * self.props.b_r + self.props.b;
            let i_t = self
                .props
                .fr_ir
                .iter()
                .map(|(fr, ir)| new_i * ir + fr)
                .max()
                .unwrap_or(0);

            if w_t <= self.w_max && i_t <= self.i_max {
                self.stats.w_max = self.w_max;
                self.stats.i_max = self.i_max;
                self.stats.signatures = self.signatures.len();
                return self.close_pending(new_w);
            }
            self.w_max = w_t;
            self.i_max = i_t;
        }
    }

    /// Resumes the tidiness checks stopped by the width bound.
    fn close_pending(&mut self, bound: usize) -> Res<Option<BasisOutcome>> {
        let pending = std::mem::take(&mut self.pending);
        for (state, (queue, witness)) in pending {
            match self.tidy.resume(&state, queue, Some(bound), self.deadline)? {
                Tidiness::Tidy => (),
                Tidiness::Exceeded => return Ok(Some(BasisOutcome::BoundExceeded(witness))),
                Tidiness::Untidy | Tidiness::Pending(_) => {
                    info!("not tidy from state {} within width {}", state, bound);
                    return Ok(Some(BasisOutcome::NotTidy(witness)));
                }
            }
        }
        Ok(None)
    }

    /// Enumerates the extensions of `path`, `Some` on failure.
    fn enumerate(&mut self, path: Pathway<'a>) -> Res<Option<BasisOutcome>> {
        self.deadline.check()?;

        if !path.is_semiformal()
            || path.width() > self.w_max
            || path.initial().len() > self.i_max
        {
            return Ok(None);
        }
        if let Some(nonwastes) = &self.props.nonwastes {
            if !path.is_linear(nonwastes) {
                return Ok(None);
            }
        }
        let sig = match path.signature() {
            Some(sig) => sig,
            None => return Ok(None),
        };
        if sig.dfs.iter().any(|state| state.is_over(self.formals)) {
            return Ok(None);
        }
        let prime = sig.dfs.is_empty();
        if !self.signatures.insert(sig) {
            return Ok(None);
        }

        if prime {
            trace!("new prime pathway: {}", path);
            if let Some(fail) = self.check_tidy(&path)? {
                return Ok(Some(fail));
            }
            if !path.is_empty() && path.is_formal() {
                if let Some(fail) = self.check_regular(&path)? {
                    return Ok(Some(fail));
                }
                self.elementary.push(path);
                return Ok(None);
            }
        }

        for idx in 0..self.crn.len() {
            if let Some(fail) = self.enumerate(path.extend(idx))? {
                return Ok(Some(fail));
            }
        }
        Ok(None)
    }

    fn check_tidy(&mut self, path: &Pathway<'a>) -> Res<Option<BasisOutcome>> {
        let state = path.final_state().project_out(self.formals);
        if self.tidy.is_known_tidy(&state) {
            return Ok(None);
        }
        let bound = Some(self.w_max);
        let res = match self.pending.remove(&state) {
            Some((queue, _)) => self.tidy.resume(&state, queue, bound, self.deadline)?,
            None => self.tidy.check(&state, bound, self.deadline)?,
        };
        match res {
            Tidiness::Tidy => Ok(None),
            Tidiness::Untidy => Ok(Some(BasisOutcome::NotTidy(path.into()))),
            Tidiness::Exceeded => Ok(Some(BasisOutcome::BoundExceeded(path.into()))),
            Tidiness::Pending(queue) => {
                debug!(
                    "not tidy from {} within the current width bound {}",
                    path.final_state(),
                    self.w_max
                );
                self.pending.insert(state, (queue, path.into()));
                Ok(None)
            }
        }
    }

    fn check_regular(&self, path: &Pathway<'a>) -> Res<Option<BasisOutcome>> {
        match self.interpreted {
            Some((crn, formals)) => {
                let interpreted = path.over(crn, formals)?;
                if !interpreted.is_regular() {
                    return Ok(Some(BasisOutcome::NotRegular((&interpreted).into())));
                }
            }
            None => {
                if !path.is_regular() {
                    return Ok(Some(BasisOutcome::NotRegular(path.into())));
                }
            }
        }
        Ok(None)
    }

    /// Formal basis and interpreted formal basis of the elementary pathways.
    fn basis(&self) -> Res<(Crn, Crn)> {
        let (mut raw, mut int) = (Crn::new(), Crn::new());
        for path in &self.elementary {
            raw.push(Reaction::new(
                path.initial().clone(),
                path.final_state().clone(),
            ));
            if let Some((crn, formals)) = self.interpreted {
                let path = path.over(crn, formals)?;
                int.push(Reaction::new(
                    path.initial().clone(),
                    path.final_state().clone(),
                ))
            }
        }
        Ok((raw, int))
    }
}
