//! Multisets of species.
//!
//! Used for states, reaction sides and interpretations. All operations produce fresh values, the
//! only mutating operations are [`Multiset::insert`] and [`Multiset::remove_one`].

use std::ops::{Add, Sub};

crate::prelude!();

#[cfg(test)]
mod test;

/// A multiset of species.
///
/// Species with a zero count are never stored, so structural equality, hashing and ordering are
/// the multiset ones. The order is lexicographic over sorted species names, then counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Multiset {
    counts: Map<Species, usize>,
}

impl Multiset {
    /// Empty multiset.
    pub fn new() -> Self {
        Self { counts: Map::new() }
    }

    /// Multiset from a list of species, with repetitions.
    pub fn from_species<S: Into<Species>>(species: impl IntoIterator<Item = S>) -> Self {
        let mut res = Self::new();
        for sp in species {
            res.insert(sp.into(), 1)
        }
        res
    }

    /// Adds `count` copies of `species`.
    pub fn insert(&mut self, species: Species, count: usize) {
        if count > 0 {
            *self.counts.entry(species).or_insert(0) += count
        }
    }

    /// Removes one copy of `species`, yields `false` if it was not present.
    pub fn remove_one(&mut self, species: &Species) -> bool {
        match self.counts.get_mut(species) {
            None => false,
            Some(count) => {
                *count -= 1;
                if *count == 0 {
                    self.counts.remove(species);
                }
                true
            }
        }
    }

    /// Cardinality, counting multiplicity.
    pub fn len(&self) -> usize {
        self.counts.values().sum()
    }
    /// Number of distinct species.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }
    /// True if empty.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Multiplicity of a species.
    pub fn count(&self, species: &Species) -> usize {
        self.counts.get(species).cloned().unwrap_or(0)
    }
    /// True if `species` appears at least once.
    pub fn has(&self, species: &Species) -> bool {
        self.counts.contains_key(species)
    }

    /// Sorted iterator over species and their multiplicity.
    pub fn iter(&self) -> impl Iterator<Item = (&Species, usize)> + '_ {
        self.counts.iter().map(|(sp, count)| (sp, *count))
    }
    /// Sorted iterator over the distinct species.
    pub fn species(&self) -> impl Iterator<Item = &Species> + '_ {
        self.counts.keys()
    }
    /// Sorted iterator over the elements, with repetitions.
    pub fn elements(&self) -> impl Iterator<Item = &Species> + '_ {
        self.counts
            .iter()
            .flat_map(|(sp, count)| std::iter::repeat(sp).take(*count))
    }
    /// Set of the distinct species.
    pub fn support(&self) -> Set<Species> {
        self.counts.keys().cloned().collect()
    }

    /// Containment, `self ⊆ other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.counts
            .iter()
            .all(|(sp, count)| other.count(sp) >= *count)
    }

    /// Sum of two multisets.
    pub fn sum(&self, other: &Self) -> Self {
        let mut res = self.clone();
        for (sp, count) in other.iter() {
            res.insert(sp.clone(), count)
        }
        res
    }

    /// Difference, clamped to zero.
    pub fn minus(&self, other: &Self) -> Self {
        let mut counts = Map::new();
        for (sp, count) in self.iter() {
            let other_count = other.count(sp);
            if count > other_count {
                counts.insert(sp.clone(), count - other_count);
            }
        }
        Self { counts }
    }

    /// Exact difference, `None` if `other ⊄ self`.
    pub fn checked_minus(&self, other: &Self) -> Option<Self> {
        if other.is_subset(self) {
            Some(self.minus(other))
        } else {
            None
        }
    }

    /// Symmetric difference `(self - other) + (other - self)`.
    pub fn sym_diff(&self, other: &Self) -> Self {
        self.minus(other).sum(&other.minus(self))
    }

    /// Union, max of the counts.
    pub fn union(&self, other: &Self) -> Self {
        let mut res = self.clone();
        for (sp, count) in other.iter() {
            let entry = res.counts.entry(sp.clone()).or_insert(0);
            if *entry < count {
                *entry = count
            }
        }
        res
    }

    /// Intersection, min of the counts.
    pub fn intersection(&self, other: &Self) -> Self {
        let mut counts = Map::new();
        for (sp, count) in self.iter() {
            let min = count.min(other.count(sp));
            if min > 0 {
                counts.insert(sp.clone(), min);
            }
        }
        Self { counts }
    }

    /// Multiplies all counts by `factor`.
    pub fn scale(&self, factor: usize) -> Self {
        if factor == 0 {
            return Self::new();
        }
        Self {
            counts: self
                .counts
                .iter()
                .map(|(sp, count)| (sp.clone(), count * factor))
                .collect(),
        }
    }

    /// Keeps the species verifying some predicate.
    pub fn filter(&self, mut keep: impl FnMut(&Species) -> bool) -> Self {
        Self {
            counts: self
                .counts
                .iter()
                .filter(|(sp, _)| keep(sp))
                .map(|(sp, count)| (sp.clone(), *count))
                .collect(),
        }
    }
    /// Projection on a set of species.
    pub fn project(&self, on: &Set<Species>) -> Self {
        self.filter(|sp| on.contains(sp))
    }
    /// Projection on the complement of a set of species.
    pub fn project_out(&self, out: &Set<Species>) -> Self {
        self.filter(|sp| !out.contains(sp))
    }
    /// True if all the species of `self` are in `set`.
    pub fn is_over(&self, set: &Set<Species>) -> bool {
        self.counts.keys().all(|sp| set.contains(sp))
    }
    /// True if some species of `self` is in `set`.
    pub fn meets(&self, set: &Set<Species>) -> bool {
        self.counts.keys().any(|sp| set.contains(sp))
    }
}

impl<'a> Add<&'a Multiset> for &'a Multiset {
    type Output = Multiset;
    fn add(self, other: &'a Multiset) -> Multiset {
        self.sum(other)
    }
}
impl<'a> Sub<&'a Multiset> for &'a Multiset {
    type Output = Multiset;
    fn sub(self, other: &'a Multiset) -> Multiset {
        self.minus(other)
    }
}

impl FromIterator<Species> for Multiset {
    fn from_iter<I: IntoIterator<Item = Species>>(iter: I) -> Self {
        Self::from_species(iter)
    }
}
impl FromIterator<(Species, usize)> for Multiset {
    fn from_iter<I: IntoIterator<Item = (Species, usize)>>(iter: I) -> Self {
        let mut res = Self::new();
        for (sp, count) in iter {
            res.insert(sp, count)
        }
        res
    }
}

impl fmt::Display for Multiset {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return write!(fmt, "∅");
        }
        for (idx, sp) in self.elements().enumerate() {
            if idx > 0 {
                write!(fmt, " + ")?;
            }
            write!(fmt, "{}", sp)?;
        }
        Ok(())
    }
}

/// Sorted list of multisets, for display.
pub struct MultisetList<'a, I>(pub &'a I);
impl<'a, I> fmt::Display for MultisetList<'a, I>
where
    &'a I: IntoIterator<Item = &'a Multiset>,
{
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{{")?;
        for (idx, ms) in self.0.into_iter().enumerate() {
            if idx > 0 {
                write!(fmt, ", ")?;
            }
            write!(fmt, "[{}]", ms)?;
        }
        write!(fmt, "}}")
    }
}
