//! Splits a CRN into modules that share no intermediate species.

crate::prelude!();

/// Union-find over species.
struct Partition {
    parent: Map<Species, Species>,
}
impl Partition {
    fn new<'a>(species: impl IntoIterator<Item = &'a Species>) -> Self {
        Self {
            parent: species
                .into_iter()
                .map(|sp| (sp.clone(), sp.clone()))
                .collect(),
        }
    }

    fn root(&mut self, sp: &Species) -> Species {
        let mut current = sp.clone();
        while let Some(parent) = self.parent.get(&current) {
            if *parent == current {
                break;
            }
            current = parent.clone();
        }
        // Path compression.
        let mut sp = sp.clone();
        while sp != current {
            let next = self.parent.insert(sp, current.clone());
            match next {
                Some(next) => sp = next,
                None => break,
            }
        }
        current
    }

    fn join(&mut self, lft: &Species, rgt: &Species) {
        let lft = self.root(lft);
        let rgt = self.root(rgt);
        if lft != rgt {
            self.parent.insert(rgt, lft);
        }
    }
}

/// Splits `crn` into modules.
///
/// Two reactions are in the same module if they are connected by a chain of reactions sharing
/// intermediate species. A reaction without intermediates is a module by itself. Modules are
/// ordered by size, then by the position of their first reaction.
pub fn modules(crn: &[Reaction], intermediates: &Set<Species>) -> Vec<Crn> {
    let mut partition = Partition::new(intermediates);
    let inter_of = |rxn: &Reaction| -> Vec<Species> {
        rxn.reactants
            .species()
            .chain(rxn.products.species())
            .filter(|sp| intermediates.contains(*sp))
            .cloned()
            .collect()
    };

    for rxn in crn {
        let inter = inter_of(rxn);
        if let Some((first, rest)) = inter.split_first() {
            for sp in rest {
                partition.join(first, sp)
            }
        }
    }

    let mut res: Vec<Crn> = vec![];
    let mut index: Map<Species, usize> = Map::new();
    for rxn in crn {
        match inter_of(rxn).first() {
            None => res.push(Crn::from(vec![rxn.clone()])),
            Some(sp) => {
                let root = partition.root(sp);
                let idx = *index.entry(root).or_insert_with(|| {
                    res.push(Crn::new());
                    res.len() - 1
                });
                res[idx].push(rxn.clone())
            }
        }
    }
    res.sort_by_key(|module| module.len());
    res
}
