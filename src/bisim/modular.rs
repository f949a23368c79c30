//! Modular bisimulation.
//!
//! Formal and implementation CRNs come as lists of modules. Each module pair must be a
//! bisimulation on its own, and every implementation species of a module must be able to break
//! down, through trivial reactions, into species the modules have in common or species interpreted
//! as nothing.

crate::prelude!();

use super::{BisimOutcome, Permissive};

/// Species appearing in more than one module, plus the formal species of the modules.
pub fn common_species(icrns: &[Crn], formals: &Set<Species>) -> Set<Species> {
    let mut occurrences: Map<Species, usize> = Map::new();
    for icrn in icrns {
        for sp in icrn.species() {
            *occurrences.entry(sp).or_insert(0) += 1
        }
    }
    occurrences
        .into_iter()
        .filter(|(sp, count)| *count > 1 || formals.contains(sp))
        .map(|(sp, _)| sp)
        .collect()
}

/// Break-down status of a species.
#[derive(Debug, Clone)]
enum Breaks {
    /// The species breaks down into common or null species.
    Yes,
    /// Not known yet.
    Maybe {
        /// Species with the same interpretation reachable through trivial reactions.
        reach: Set<Species>,
        /// Null species producible by a loop back to the species.
        loops: Set<Species>,
    },
}

/// Module condition, `m` must be complete over the species of `module`.
///
/// ```rust
/// # use crn_verify::{prelude::*, bisim::modular::module_condition, interp, species_set};
/// let module = parse::crn("A -> i; i -> j + w; j -> B").unwrap();
/// let common = species_set!(A, B);
/// let m = interp!(A => [A], B => [B], i => [A], j => [A], w => []);
/// assert!(!module_condition(&module, &common, &m));
///
/// let module = parse::crn("A -> i; i -> A; i -> B").unwrap();
/// let m = interp!(A => [A], B => [B], i => [A]);
/// assert!(module_condition(&module, &common, &m));
/// ```
pub fn module_condition(module: &[Reaction], common: &Set<Species>, m: &Interpretation) -> bool {
    let image = |sp: &Species| {
        m.get(sp)
            .cloned()
            .unwrap_or_else(|| Multiset::from_species(Some(sp.clone())))
    };
    let species: Set<Species> = module.iter().flat_map(|rxn| rxn.species()).collect();
    let mut breaks: Map<Species, Breaks> = species
        .iter()
        .map(|sp| {
            let status = if common.contains(sp) || image(sp).is_empty() {
                Breaks::Yes
            } else {
                Breaks::Maybe {
                    reach: Set::new(),
                    loops: Set::new(),
                }
            };
            (sp.clone(), status)
        })
        .collect();
    let trivial: Vec<&Reaction> = module
        .iter()
        .filter(|rxn| rxn.interpret(m).is_trivial())
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for sp in &species {
            for rxn in &trivial {
                let loops = match breaks.get(sp) {
                    Some(Breaks::Maybe { loops, .. }) => loops.clone(),
                    _ => break,
                };
                if !rxn.reactants.has(sp) {
                    continue;
                }
                // One copy of `sp`, plus null species it can produce in a loop.
                let mut others = rxn.reactants.clone();
                others.remove_one(sp);
                if !others.species().all(|other| loops.contains(other)) {
                    continue;
                }

                let sp_image = image(sp);
                let mut nulls = Set::new();
                let mut heir = None;
                let mut broken = false;
                for prod in rxn.products.species() {
                    let prod_image = image(prod);
                    if prod_image.is_empty() {
                        nulls.insert(prod.clone());
                    } else if !sp_image.is_subset(&prod_image)
                        || matches!(breaks.get(prod), Some(Breaks::Yes))
                    {
                        broken = true;
                        break;
                    } else {
                        heir = Some(prod.clone())
                    }
                }
                if broken {
                    breaks.insert(sp.clone(), Breaks::Yes);
                    changed = true;
                    break;
                }
                let heir = match heir {
                    Some(heir) => heir,
                    None => continue,
                };

                let (heir_reach, heir_loops) = match breaks.get(&heir) {
                    Some(Breaks::Maybe { reach, loops }) => (reach.clone(), loops.clone()),
                    _ => (Set::new(), Set::new()),
                };
                if let Some(Breaks::Maybe { reach, loops }) = breaks.get_mut(sp) {
                    if reach.insert(heir.clone()) {
                        changed = true
                    }
                    if !heir_reach.is_subset(reach) {
                        reach.extend(heir_reach.iter().cloned());
                        changed = true
                    }
                    if heir_reach.contains(sp) {
                        let loopable: Set<Species> = nulls.union(&heir_loops).cloned().collect();
                        if !loopable.is_subset(loops) {
                            loops.extend(loopable);
                            changed = true
                        }
                    }
                }
            }
        }
    }

    let mut res = true;
    for (sp, status) in &breaks {
        if let Breaks::Maybe { .. } = status {
            debug!("species {} does not break down", sp);
            res = false
        }
    }
    res
}

/// Searches for a modular bisimulation.
///
/// Modules are checked in order, each one under the interpretation built so far restricted to its
/// species and the common ones. Common species default to [`common_species`], the common species
/// `partial` does not interpret are interpreted as themselves if formal, as nothing otherwise.
///
/// # Errors
///
/// - the number of formal and implementation modules differ;
/// - see [`super::bisimulation`].
#[allow(clippy::too_many_arguments)]
pub fn modular_bisimulation(
    fcrns: &[Crn],
    icrns: &[Crn],
    formals: &Set<Species>,
    partial: Option<&Interpretation>,
    common: Option<&Set<Species>>,
    permissive: Permissive,
    conf: &Conf,
    deadline: &Deadline,
) -> Res<BisimOutcome> {
    if fcrns.len() != icrns.len() {
        bail!(malformed(format!(
            "found {} formal module(s) but {} implementation module(s)",
            fcrns.len(),
            icrns.len()
        )))
    }
    let common = common
        .cloned()
        .unwrap_or_else(|| common_species(icrns, formals));
    debug!("common species: {:?}", common);

    let mut m = partial.cloned().unwrap_or_default();
    for sp in &common {
        if !m.contains_key(sp) {
            let image = if formals.contains(sp) {
                Multiset::from_species(Some(sp.clone()))
            } else {
                Multiset::new()
            };
            m.insert(sp.clone(), image);
        }
    }

    for (idx, (fcrn, icrn)) in fcrns.iter().zip(icrns).enumerate() {
        deadline.check()?;
        let species = icrn.species();
        let local = m.restrict(|sp| common.contains(sp) || species.contains(sp));
        let module = icrn.split_reversible();
        let accept = |candidate: &Interpretation| module_condition(&module, &common, candidate);

        let outcome = super::search(
            fcrn,
            icrn,
            formals,
            Some(&local),
            permissive,
            conf,
            deadline,
            &accept,
        )?;
        match outcome {
            BisimOutcome::Found(found) => {
                debug!("module {} verified", idx);
                for (sp, image) in found.iter() {
                    if species.contains(sp) || common.contains(sp) {
                        m.insert(sp.clone(), image.clone());
                    }
                }
            }
            outcome => {
                info!("module {} failed: {}", idx, outcome);
                return Ok(outcome);
            }
        }
    }
    info!("valid modular interpretation:\n{}", m);
    Ok(BisimOutcome::Found(m))
}
