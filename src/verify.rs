//! Verification façade.
//!
//! Dispatches a formal CRN, an implementation CRN and an optional partial interpretation to one of
//! the verification [`Method`]s, on a worker thread with a large stack and a cooperative deadline.
//! Timeouts and inconclusive checks yield [`Verdict::Indeterminate`].
//!
//! ```rust
//! # use crn_verify::{prelude::*, species_set, verify::{Method, Verdict}};
//! let fcrn = parse::crn("A + B -> C").unwrap();
//! let icrn = parse::crn("A + B <=> i; i -> C + w").unwrap();
//! let fs = species_set!(A, B, C);
//! let conf = Conf::new();
//! for method in ["pathway-decomposition", "crn-bisimulation", "compositional-hybrid"] {
//!     let method: Method = method.parse().unwrap();
//!     let (verdict, _) = verify::verify(&fcrn, &icrn, &fs, None, method, &conf).unwrap();
//!     assert_eq!(verdict, Verdict::True);
//! }
//! ```

use std::{str::FromStr, thread};

crate::prelude!();

use crate::{
    basis::BasisOutcome,
    bisim::{BisimOutcome, Permissive},
};


/// Verification methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Compares the formal basis of the implementation to the formal CRN.
    PathwayDecomposition,
    /// CRN bisimulation.
    Bisimulation(Permissive),
    /// Formal basis enumeration checking regularity on interpreted pathways.
    IntegratedHybrid,
    /// CRN bisimulation between the formal CRN and the formal basis of the implementation.
    CompositionalHybrid,
    /// Modular CRN bisimulation, only through [`verify_modules`].
    ModularBisimulation(Permissive),
}
impl fmt::Display for Method {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::PathwayDecomposition => write!(fmt, "pathway-decomposition"),
            Self::Bisimulation(p) => write!(fmt, "crn-bisimulation-{}", p.suffix()),
            Self::IntegratedHybrid => write!(fmt, "integrated-hybrid"),
            Self::CompositionalHybrid => write!(fmt, "compositional-hybrid"),
            Self::ModularBisimulation(p) => write!(fmt, "modular-crn-bisimulation-{}", p.suffix()),
        }
    }
}

impl FromStr for Method {
    type Err = Error;
    fn from_str(s: &str) -> Res<Self> {
        let permissive = |suffix: &str| {
            if suffix.is_empty() {
                return Some(Permissive::WholeGraph);
            }
            let suffix = suffix.strip_prefix('-')?;
            Permissive::ALL.into_iter().find(|p| p.suffix() == suffix)
        };
        let method = match s {
            "pathway-decomposition" => Some(Self::PathwayDecomposition),
            "integrated-hybrid" => Some(Self::IntegratedHybrid),
            "compositional-hybrid" => Some(Self::CompositionalHybrid),
            _ => {
                if let Some(suffix) = s.strip_prefix("modular-crn-bisimulation") {
                    permissive(suffix).map(Self::ModularBisimulation)
                } else if let Some(suffix) = s.strip_prefix("crn-bisimulation") {
                    permissive(suffix).map(Self::Bisimulation)
                } else {
                    None
                }
            }
        };
        match method {
            Some(method) => Ok(method),
            None => bail!(malformed(format!("unknown verification method `{}`", s))),
        }
    }
}

/// Outcome of a verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// The implementation is correct.
    True,
    /// The implementation is not correct.
    False,
    /// Timeout, or some bound was reached.
    Indeterminate,
}
impl Verdict {
    /// True if [`Verdict::True`].
    pub fn is_true(self) -> bool {
        self == Self::True
    }
}
impl fmt::Display for Verdict {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::True => write!(fmt, "true"),
            Self::False => write!(fmt, "false"),
            Self::Indeterminate => write!(fmt, "indeterminate"),
        }
    }
}

fn bisim_verdict(outcome: BisimOutcome) -> (Verdict, Option<Interpretation>) {
    match outcome {
        BisimOutcome::Found(m) => (Verdict::True, Some(m)),
        BisimOutcome::NotFound(_) => (Verdict::False, None),
        BisimOutcome::Unknown(_) => (Verdict::Indeterminate, None),
    }
}

/// Runs a job on the verification worker.
///
/// Returns `None` on timeout.
fn on_worker<T: Send>(
    conf: &Conf,
    job: impl FnOnce(&Deadline) -> Res<T> + Send,
) -> Res<Option<T>> {
    let deadline = Deadline::from_timeout(conf.timeout);
    let res = thread::scope(|scope| -> Res<Res<T>> {
        let worker = thread::Builder::new()
            .name("crn-verify".into())
            .stack_size(conf.stack_size)
            .spawn_scoped(scope, move || job(&deadline))
            .chain_err(|| "while spawning the verification worker")?;
        match worker.join() {
            Ok(res) => Ok(res),
            Err(_) => bail!("[internal] the verification worker panicked"),
        }
    })?;
    match res {
        Ok(res) => Ok(Some(res)),
        Err(e) if e.is_timeout() => {
            warn!("timeout after {:?}", conf.timeout.unwrap_or_default());
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Removes the fuels, splits reversible reactions, removes duplicate and trivial reactions.
fn prepare(icrn: &Crn, conf: &Conf) -> Crn {
    let fuels = if conf.absorb_fuels {
        icrn.absorb_fuels(&conf.fuels)
    } else {
        conf.fuels.clone()
    };
    if fuels.is_empty() {
        icrn.clean()
    } else {
        icrn.remove_species(&fuels).clean()
    }
}

fn same_reactions(lft: &Crn, rgt: &Crn) -> bool {
    let lft: Set<&Reaction> = lft.iter().collect();
    let rgt: Set<&Reaction> = rgt.iter().collect();
    lft == rgt
}

/// Formal species and interpretation of the pathway-based methods.
///
/// Wastes and interpreted species are formal, wastes are interpreted as nothing.
fn pathway_setup(
    icrn: &Crn,
    formals: &Set<Species>,
    interpretation: Option<&Interpretation>,
) -> (Set<Species>, Interpretation) {
    let mut m = interpretation.cloned().unwrap_or_default();
    let mut basis_formals = formals.clone();
    basis_formals.extend(m.keys().cloned());
    let wastes = icrn.wastes(&basis_formals);
    debug!("wastes: {:?}", wastes);
    for waste in wastes {
        m.entry(waste.clone()).or_insert_with(Multiset::new);
        basis_formals.insert(waste);
    }
    (basis_formals, m)
}

/// Verdict of a basis enumeration that failed.
fn basis_failure(outcome: &BasisOutcome) -> Verdict {
    match outcome {
        BasisOutcome::BoundExceeded(_) => Verdict::Indeterminate,
        _ => Verdict::False,
    }
}

fn run(
    fcrn: &Crn,
    icrn: &Crn,
    formals: &Set<Species>,
    interpretation: Option<&Interpretation>,
    method: Method,
    conf: &Conf,
    deadline: &Deadline,
) -> Res<(Verdict, Option<Interpretation>)> {
    match method {
        Method::Bisimulation(permissive) => {
            let outcome = bisim::bisimulation(
                fcrn,
                icrn,
                formals,
                interpretation,
                permissive,
                conf,
                deadline,
            )?;
            Ok(bisim_verdict(outcome))
        }
        Method::ModularBisimulation(_) => bail!(malformed(format!(
            "method `{}` needs the formal and implementation modules, see `verify_modules`",
            method
        ))),
        Method::PathwayDecomposition => {
            let (basis_formals, m) = pathway_setup(icrn, formals, interpretation);
            let outcome = basis::find_basis(icrn, &basis_formals, None, conf, deadline)?;
            let basis = match outcome {
                BasisOutcome::Found(basis) => basis,
                outcome => {
                    info!("{}", outcome);
                    return Ok((basis_failure(&outcome), None));
                }
            };
            let interpreted = basis.raw.interpret(&m).clean();
            debug!("interpreted formal basis:\n{}", interpreted);
            let verdict = if same_reactions(&interpreted, &fcrn.clean()) {
                Verdict::True
            } else {
                Verdict::False
            };
            Ok((verdict, None))
        }
        Method::IntegratedHybrid => {
            let (basis_formals, m) = pathway_setup(icrn, formals, interpretation);
            let outcome = basis::find_basis(icrn, &basis_formals, Some(&m), conf, deadline)?;
            let basis = match outcome {
                BasisOutcome::Found(basis) => basis,
                outcome => {
                    info!("{}", outcome);
                    return Ok((basis_failure(&outcome), None));
                }
            };
            debug!("interpreted formal basis:\n{}", basis.int);
            if same_reactions(&basis.int, &fcrn.clean()) {
                Ok((Verdict::True, Some(m)))
            } else {
                Ok((Verdict::False, None))
            }
        }
        Method::CompositionalHybrid => {
            let (basis_formals, m) = pathway_setup(icrn, formals, interpretation);
            let outcome = basis::find_basis(icrn, &basis_formals, None, conf, deadline)?;
            let basis = match outcome {
                BasisOutcome::Found(basis) => basis,
                outcome => {
                    info!("{}", outcome);
                    return Ok((basis_failure(&outcome), None));
                }
            };
            debug!("formal basis:\n{}", basis.raw);
            let outcome = bisim::bisimulation(
                fcrn,
                &basis.raw,
                formals,
                Some(&m),
                Permissive::WholeGraph,
                conf,
                deadline,
            )?;
            Ok(bisim_verdict(outcome))
        }
    }
}

/// Verifies that `icrn` implements `fcrn`.
///
/// Fuels of `conf` are removed from `icrn` first.
///
/// # Errors
///
/// - `method` is a modular method, modules go through [`verify_modules`];
/// - malformed inputs, see [`bisim::bisimulation`].
///
/// Timeouts are not errors.
pub fn verify(
    fcrn: &Crn,
    icrn: &Crn,
    formals: &Set<Species>,
    interpretation: Option<&Interpretation>,
    method: Method,
    conf: &Conf,
) -> Res<(Verdict, Option<Interpretation>)> {
    info!("verifying with {}", method);
    let icrn = prepare(icrn, conf);
    let fcrn = fcrn.split_reversible();
    let res = on_worker(conf, |deadline| {
        run(&fcrn, &icrn, formals, interpretation, method, conf, deadline)
    })?;
    let res = res.unwrap_or((Verdict::Indeterminate, None));
    info!("{}: {}", method, res.0);
    Ok(res)
}

/// Verifies module by module that `icrns` implement `fcrns`.
///
/// Only the bisimulation methods support modules, all of them run [`bisim::modular_bisimulation`].
///
/// # Errors
///
/// - `method` is not a bisimulation method;
/// - the number of formal and implementation modules differ;
/// - malformed inputs, see [`bisim::bisimulation`].
pub fn verify_modules(
    fcrns: &[Crn],
    icrns: &[Crn],
    formals: &Set<Species>,
    interpretation: Option<&Interpretation>,
    method: Method,
    conf: &Conf,
) -> Res<(Verdict, Option<Interpretation>)> {
    let permissive = match method {
        Method::Bisimulation(p) | Method::ModularBisimulation(p) => p,
        method => bail!(malformed(format!(
            "method `{}` does not support modules",
            method
        ))),
    };
    info!("verifying {} module(s) with {}", icrns.len(), method);
    let icrns: Vec<Crn> = icrns.iter().map(|icrn| prepare(icrn, conf)).collect();
    let fcrns: Vec<Crn> = fcrns.iter().map(|fcrn| fcrn.split_reversible()).collect();
    let res = on_worker(conf, |deadline| {
        let outcome = bisim::modular_bisimulation(
            &fcrns,
            &icrns,
            formals,
            interpretation,
            None,
            permissive,
            conf,
            deadline,
        )?;
        Ok(bisim_verdict(outcome))
    })?;
    let res = res.unwrap_or((Verdict::Indeterminate, None));
    info!("{}: {}", method, res.0);
    Ok(res)
}
