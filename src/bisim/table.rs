//! Delimiting table.
//!
//! Rows are implementation reactions, interpreted by the current partial interpretation, columns
//! are formal reactions plus a last *trivial* column. A cell is true when some extension of the
//! interpretation to the unknown species, those that are not formal after interpretation, could
//! map the row onto the column.

crate::prelude!();

/// True if some extension of the interpretation can turn `irxn` into `frxn`.
///
/// Both sides must agree on their formal content, and whatever formal species `frxn` needs on a
/// side must be producible by unknown species on that side of `irxn`.
pub fn may_implement(irxn: &Reaction, frxn: &Reaction, formals: &Set<Species>) -> bool {
    let side = |impl_side: &Multiset, formal_side: &Multiset| -> bool {
        let missing = formal_side.minus(impl_side);
        let extra = impl_side.minus(formal_side);
        !extra.meets(formals) && (missing.is_empty() || !extra.is_empty())
    };
    side(&irxn.reactants, &frxn.reactants) && side(&irxn.products, &frxn.products)
}

/// True if some extension of the interpretation can make `irxn` trivial.
pub fn may_be_trivial(irxn: &Reaction, formals: &Set<Species>) -> bool {
    let lft = irxn.reactants.minus(&irxn.products);
    let rgt = irxn.products.minus(&irxn.reactants);
    (!lft.meets(formals) || !rgt.is_over(formals)) && (!rgt.meets(formals) || !lft.is_over(formals))
}

/// True if the reaction mentions species that are not formal.
pub fn has_unknown(irxn: &Reaction, formals: &Set<Species>) -> bool {
    !irxn.reactants.is_over(formals) || !irxn.products.is_over(formals)
}

/// Delimiting table of an interpreted implementation CRN against a formal CRN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    cells: Vec<Vec<bool>>,
    formal_count: usize,
}

impl Table {
    /// Builds the table, `icrn` must already be interpreted.
    pub fn new(fcrn: &[Reaction], icrn: &[Reaction], formals: &Set<Species>) -> Self {
        let cells = icrn
            .iter()
            .map(|irxn| {
                let mut row: Vec<bool> = fcrn
                    .iter()
                    .map(|frxn| may_implement(irxn, frxn, formals))
                    .collect();
                row.push(may_be_trivial(irxn, formals));
                row
            })
            .collect();
        Self {
            cells,
            formal_count: fcrn.len(),
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    /// Value of a cell, `col` is a formal reaction index.
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.cells[row][col]
    }
    /// Value of the trivial cell of a row.
    pub fn trivial(&self, row: usize) -> bool {
        self.cells[row][self.formal_count]
    }

    /// Formal reactions a row may implement.
    pub fn row_formals(&self, row: usize) -> impl Iterator<Item = usize> + '_ {
        self.cells[row][..self.formal_count]
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell)
            .map(|(col, _)| col)
    }
    /// Implementation reactions that may implement a column.
    pub fn column(&self, col: usize) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, row)| row[col])
            .map(|(row, _)| row)
    }

    /// False if some row is all false, or some formal column is all false.
    ///
    /// No extension of the interpretation can satisfy the delimiting condition in that case.
    pub fn is_consistent(&self) -> bool {
        self.cells.iter().all(|row| row.iter().any(|cell| *cell))
            && (0..self.formal_count).all(|col| self.cells.iter().any(|row| row[col]))
    }
}

impl fmt::Display for Table {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        for (idx, row) in self.cells.iter().enumerate() {
            if idx > 0 {
                writeln!(fmt)?;
            }
            for cell in row {
                write!(fmt, "{}", if *cell { '1' } else { '.' })?;
            }
        }
        Ok(())
    }
}
