//! Interpretations, maps from implementation species to formal multisets.

crate::prelude!();

/// Maps implementation species to multisets of formal species.
///
/// Interpreting a state replaces each species by its image, species without an image are kept
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Interpretation {
    map: Map<Species, Multiset>,
}

impl Deref for Interpretation {
    type Target = Map<Species, Multiset>;
    fn deref(&self) -> &Map<Species, Multiset> {
        &self.map
    }
}
impl DerefMut for Interpretation {
    fn deref_mut(&mut self) -> &mut Map<Species, Multiset> {
        &mut self.map
    }
}
impl FromIterator<(Species, Multiset)> for Interpretation {
    fn from_iter<I: IntoIterator<Item = (Species, Multiset)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}
impl From<Map<Species, Multiset>> for Interpretation {
    fn from(map: Map<Species, Multiset>) -> Self {
        Self { map }
    }
}

impl Interpretation {
    /// Empty interpretation.
    pub fn new() -> Self {
        Self { map: Map::new() }
    }

    /// Identity interpretation over some species.
    pub fn identity<'a>(species: impl IntoIterator<Item = &'a Species>) -> Self {
        species
            .into_iter()
            .map(|sp| (sp.clone(), Multiset::from_species(Some(sp.clone()))))
            .collect()
    }

    /// Interprets a state.
    pub fn state(&self, state: &Multiset) -> Multiset {
        let mut res = Multiset::new();
        for (sp, count) in state.iter() {
            match self.map.get(sp) {
                Some(image) => {
                    for (formal, n) in image.iter() {
                        res.insert(formal.clone(), n * count)
                    }
                }
                None => res.insert(sp.clone(), count),
            }
        }
        res
    }

    /// Restricts the interpretation to some species.
    pub fn restrict(&self, keep: impl Fn(&Species) -> bool) -> Self {
        self.map
            .iter()
            .filter(|(sp, _)| keep(sp))
            .map(|(sp, image)| (sp.clone(), image.clone()))
            .collect()
    }

    /// Checks that all images are over `formals`, and that formal species are mapped to
    /// themselves.
    ///
    /// # Errors
    ///
    /// - an image mentions a non-formal species;
    /// - a formal species is mapped to something other than itself.
    pub fn check(&self, formals: &Set<Species>) -> Res<()> {
        for (sp, image) in &self.map {
            if let Some(bad) = image.species().find(|f| !formals.contains(*f)) {
                bail!(malformed(format!(
                    "species `{}` is interpreted as `{}`, but `{}` is not a formal species",
                    sp, image, bad
                )))
            }
            if formals.contains(sp) && (image.len() != 1 || !image.has(sp)) {
                bail!(malformed(format!(
                    "formal species `{}` must be interpreted as itself, found `{}`",
                    sp, image
                )))
            }
        }
        Ok(())
    }
}

impl fmt::Display for Interpretation {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        for (idx, (sp, image)) in self.map.iter().enumerate() {
            if idx > 0 {
                writeln!(fmt)?;
            }
            if image.is_empty() {
                write!(fmt, "{} ->", sp)?
            } else {
                write!(fmt, "{} -> {}", sp, image)?
            }
        }
        Ok(())
    }
}
