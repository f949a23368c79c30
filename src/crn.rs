//! Reactions, CRNs, and the utilities preparing them for verification.

crate::prelude!();


/// A reaction, reversible or not.
///
/// Rates are carried along but never consulted by the verification algorithms. Equality, hashing
/// and ordering ignore them.
#[readonly::make]
#[derive(Debug, Clone)]
pub struct Reaction {
    /// Reactants.
    pub reactants: Multiset,
    /// Products.
    pub products: Multiset,
    /// True for `R <=> P`.
    pub reversible: bool,
    /// Forward rate, if any.
    pub k_fwd: Option<f64>,
    /// Reverse rate, if any, only meaningful for reversible reactions.
    pub k_rev: Option<f64>,
}

impl Reaction {
    /// Irreversible reaction constructor.
    pub fn new(reactants: Multiset, products: Multiset) -> Self {
        Self {
            reactants,
            products,
            reversible: false,
            k_fwd: None,
            k_rev: None,
        }
    }
    /// Reversible reaction constructor.
    pub fn new_reversible(reactants: Multiset, products: Multiset) -> Self {
        Self {
            reversible: true,
            ..Self::new(reactants, products)
        }
    }
    /// Sets the rates.
    pub fn with_rates(mut self, k_fwd: Option<f64>, k_rev: Option<f64>) -> Self {
        self.k_fwd = k_fwd;
        self.k_rev = k_rev;
        self
    }

    /// True if reactants and products are the same multiset.
    pub fn is_trivial(&self) -> bool {
        self.reactants == self.products
    }

    /// True if `state` contains the reactants.
    pub fn is_enabled(&self, state: &Multiset) -> bool {
        self.reactants.is_subset(state)
    }

    /// Fires the reaction, `None` if `state` does not enable it.
    ///
    /// ```rust
    /// # use crn_verify::{ms, parse};
    /// let rxn = parse::rules::reaction("A + i -> 2 B").unwrap();
    /// assert_eq!(rxn.fire(&ms!(A, i, C)), Some(ms!(B * 2, C)));
    /// assert_eq!(rxn.fire(&ms!(A, C)), None);
    /// ```
    pub fn fire(&self, state: &Multiset) -> Option<Multiset> {
        state
            .checked_minus(&self.reactants)
            .map(|rest| rest.sum(&self.products))
    }

    /// Max of the reactant and product counts.
    pub fn arity(&self) -> usize {
        self.reactants.len().max(self.products.len())
    }

    /// Species appearing in the reaction.
    pub fn species(&self) -> Set<Species> {
        let mut set = self.reactants.support();
        set.extend(self.products.species().cloned());
        set
    }
    /// True if `species` appears on either side.
    pub fn mentions(&self, species: &Species) -> bool {
        self.reactants.has(species) || self.products.has(species)
    }

    /// The reverse reaction, irreversible, rated with the reverse rate.
    pub fn reverse(&self) -> Self {
        Self::new(self.products.clone(), self.reactants.clone()).with_rates(self.k_rev, None)
    }

    /// Splits a reversible reaction in its forward and reverse irreversible reactions.
    ///
    /// Irreversible reactions yield themselves.
    pub fn split(&self) -> Vec<Self> {
        if self.reversible {
            vec![
                Self::new(self.reactants.clone(), self.products.clone())
                    .with_rates(self.k_fwd, None),
                self.reverse(),
            ]
        } else {
            vec![self.clone()]
        }
    }

    /// True if `self` and `other` are each other's reverse, ignoring reversibility.
    pub fn is_reverse_of(&self, other: &Self) -> bool {
        self.reactants == other.products && self.products == other.reactants
    }

    /// Interprets both sides.
    pub fn interpret(&self, m: &Interpretation) -> Self {
        Self {
            reactants: m.state(&self.reactants),
            products: m.state(&self.products),
            reversible: self.reversible,
            k_fwd: self.k_fwd,
            k_rev: self.k_rev,
        }
    }

    /// Removes some species from both sides.
    pub fn without(&self, species: &Set<Species>) -> Self {
        Self {
            reactants: self.reactants.project_out(species),
            products: self.products.project_out(species),
            reversible: self.reversible,
            k_fwd: self.k_fwd,
            k_rev: self.k_rev,
        }
    }

    fn key(&self) -> (&Multiset, &Multiset, bool) {
        (&self.reactants, &self.products, self.reversible)
    }
}

impl PartialEq for Reaction {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}
impl Eq for Reaction {}
impl std::hash::Hash for Reaction {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state)
    }
}
impl PartialOrd for Reaction {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Reaction {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key().cmp(&other.key())
    }
}

/// Writes a reaction side, nothing for the empty side.
fn fmt_side(ms: &Multiset, fmt: &mut fmt::Formatter) -> fmt::Result {
    if ms.is_empty() {
        Ok(())
    } else {
        fmt::Display::fmt(ms, fmt)
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt_side(&self.reactants, fmt)?;
        if !self.reactants.is_empty() {
            write!(fmt, " ")?;
        }
        write!(fmt, "{}", if self.reversible { "<=>" } else { "->" })?;
        if !self.products.is_empty() {
            write!(fmt, " ")?;
        }
        fmt_side(&self.products, fmt)?;
        match (self.k_fwd, self.k_rev) {
            (None, None) => Ok(()),
            (Some(kf), None) => write!(fmt, " [k = {}]", kf),
            (kf, kr) => write!(
                fmt,
                " [kf = {}, kr = {}]",
                kf.unwrap_or(1.0),
                kr.unwrap_or(1.0)
            ),
        }
    }
}

/// A chemical reaction network, an ordered list of reactions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Crn {
    rxns: Vec<Reaction>,
}

impl Deref for Crn {
    type Target = Vec<Reaction>;
    fn deref(&self) -> &Vec<Reaction> {
        &self.rxns
    }
}
impl DerefMut for Crn {
    fn deref_mut(&mut self) -> &mut Vec<Reaction> {
        &mut self.rxns
    }
}
impl From<Vec<Reaction>> for Crn {
    fn from(rxns: Vec<Reaction>) -> Self {
        Self { rxns }
    }
}
impl FromIterator<Reaction> for Crn {
    fn from_iter<I: IntoIterator<Item = Reaction>>(iter: I) -> Self {
        Self {
            rxns: iter.into_iter().collect(),
        }
    }
}
impl IntoIterator for Crn {
    type Item = Reaction;
    type IntoIter = std::vec::IntoIter<Reaction>;
    fn into_iter(self) -> Self::IntoIter {
        self.rxns.into_iter()
    }
}
impl<'a> IntoIterator for &'a Crn {
    type Item = &'a Reaction;
    type IntoIter = std::slice::Iter<'a, Reaction>;
    fn into_iter(self) -> Self::IntoIter {
        self.rxns.iter()
    }
}

impl Crn {
    /// Empty CRN.
    pub fn new() -> Self {
        Self { rxns: vec![] }
    }

    /// All the species of the CRN.
    pub fn species(&self) -> Set<Species> {
        let mut set = Set::new();
        for rxn in &self.rxns {
            set.extend(rxn.reactants.species().cloned());
            set.extend(rxn.products.species().cloned());
        }
        set
    }

    /// Species that are not in `formals`.
    pub fn intermediates(&self, formals: &Set<Species>) -> Set<Species> {
        self.species()
            .into_iter()
            .filter(|sp| !formals.contains(sp))
            .collect()
    }

    /// True if some reaction is reversible.
    pub fn has_reversible(&self) -> bool {
        self.rxns.iter().any(|rxn| rxn.reversible)
    }

    /// Replaces each reversible reaction by its forward and reverse reactions, in this order.
    pub fn split_reversible(&self) -> Self {
        self.rxns.iter().flat_map(Reaction::split).collect()
    }

    /// Pairs opposite irreversible reactions back into reversible reactions.
    ///
    /// The first reaction of a pair gives the forward direction and rate, the second one gives
    /// the reverse rate.
    ///
    /// # Errors
    ///
    /// - when a reversible reaction has an opposite reaction in the CRN.
    pub fn combine_reversible(&self) -> Res<Self> {
        let mut removed = vec![false; self.rxns.len()];
        let mut res = Vec::with_capacity(self.rxns.len());
        for (idx, rxn) in self.rxns.iter().enumerate() {
            if removed[idx] {
                continue;
            }
            let partner = self
                .rxns
                .iter()
                .enumerate()
                .skip(idx + 1)
                .find(|(jdx, other)| !removed[*jdx] && rxn.is_reverse_of(other));
            match partner {
                None => res.push(rxn.clone()),
                Some((jdx, other)) => {
                    if rxn.reversible || other.reversible {
                        return Err(malformed(format!(
                            "reaction `{}` is specified twice (with `{}`)",
                            rxn, other
                        )));
                    }
                    removed[jdx] = true;
                    res.push(
                        Reaction::new_reversible(rxn.reactants.clone(), rxn.products.clone())
                            .with_rates(rxn.k_fwd, other.k_fwd),
                    )
                }
            }
        }
        Ok(res.into())
    }

    /// Removes duplicate reactions, keeps the first occurrence.
    pub fn remove_duplicates(&self) -> Self {
        let mut known = HashSet::new();
        self.rxns
            .iter()
            .filter(|rxn| known.insert((*rxn).clone()))
            .cloned()
            .collect()
    }

    /// Removes trivial reactions.
    pub fn remove_trivial(&self) -> Self {
        self.rxns
            .iter()
            .filter(|rxn| !rxn.is_trivial())
            .cloned()
            .collect()
    }

    /// Splits reversible reactions, removes duplicates and trivial reactions.
    pub fn clean(&self) -> Self {
        self.split_reversible().remove_duplicates().remove_trivial()
    }

    /// Removes some species (typically fuels) from all reactions.
    pub fn remove_species(&self, species: &Set<Species>) -> Self {
        debug!("removing species {:?}", species);
        self.rxns.iter().map(|rxn| rxn.without(species)).collect()
    }

    /// Extends a set of fuels with the species producible from fuels only.
    pub fn absorb_fuels(&self, fuels: &Set<Species>) -> Set<Species> {
        let mut fuels = fuels.clone();
        loop {
            let mut changed = false;
            for rxn in &self.rxns {
                if rxn.reactants.is_over(&fuels) {
                    for sp in rxn.products.species() {
                        changed = fuels.insert(sp.clone()) || changed
                    }
                }
            }
            if !changed {
                break fuels;
            }
        }
    }

    /// Interprets all reactions.
    pub fn interpret(&self, m: &Interpretation) -> Self {
        self.rxns.iter().map(|rxn| rxn.interpret(m)).collect()
    }

    /// Waste species.
    ///
    /// A non-waste is a formal species, or a species that is a reactant of a reaction mentioning a
    /// non-waste species. Wastes are all the other species.
    pub fn wastes(&self, formals: &Set<Species>) -> Set<Species> {
        let species = self.species();
        let mut nonwastes = formals.clone();
        loop {
            let mut changed = false;
            for sp in &species {
                if nonwastes.contains(sp) {
                    continue;
                }
                let reacts_with_nonwaste = self.rxns.iter().any(|rxn| {
                    rxn.reactants.has(sp)
                        && (rxn.reactants.meets(&nonwastes) || rxn.products.meets(&nonwastes))
                });
                if reacts_with_nonwaste {
                    nonwastes.insert(sp.clone());
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        species
            .into_iter()
            .filter(|sp| !nonwastes.contains(sp))
            .collect()
    }

    /// Intermediates that are not wastes.
    pub fn nonwaste_intermediates(&self, formals: &Set<Species>) -> Set<Species> {
        let wastes = self.wastes(formals);
        self.intermediates(formals)
            .into_iter()
            .filter(|sp| !wastes.contains(sp))
            .collect()
    }
}

impl fmt::Display for Crn {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        for (idx, rxn) in self.rxns.iter().enumerate() {
            if idx > 0 {
                writeln!(fmt)?;
            }
            rxn.fmt(fmt)?;
        }
        Ok(())
    }
}
