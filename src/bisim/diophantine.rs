//! Non-negative solutions of homogeneous linear Diophantine systems.
//!
//! Contejean and Devie's algorithm explores non-negative vectors from the unit vectors, only
//! increasing a component when it makes the residue `A·x` shrink. Vectors above a known minimal
//! solution are cut.

use num::Integer;

crate::prelude!();

/// Divides a row by the gcd of its coefficients, `None` for null rows.
fn normalize(row: &[i64]) -> Option<Vec<i64>> {
    let gcd = row.iter().fold(0i64, |gcd, c| gcd.gcd(c));
    if gcd == 0 {
        None
    } else {
        Some(row.iter().map(|c| c / gcd).collect())
    }
}

fn dot(lft: &[i64], rgt: &[i64]) -> i64 {
    lft.iter().zip(rgt).map(|(l, r)| l * r).sum()
}

/// Finds a non-negative solution `x` of `A·x = 0` with `x[q - 1] = 1`, where `q` is the number
/// of columns.
///
/// There must be at least one row, all rows must have the same length `q > 0`.
pub fn solve(a: &[Vec<i64>], deadline: &Deadline) -> Res<Option<Vec<usize>>> {
    let q = match a.first() {
        Some(row) => row.len(),
        None => bail!("[internal] cannot solve an empty diophantine system"),
    };
    if q == 0 {
        bail!("[internal] cannot solve a diophantine system without columns")
    }
    if a.iter().any(|row| row.len() != q) {
        bail!("[internal] illegal diophantine system, rows have different lengths")
    }

    let a: Vec<Vec<i64>> = a.iter().filter_map(|row| normalize(row)).collect();
    let columns: Vec<Vec<i64>> = (0..q)
        .map(|col| a.iter().map(|row| row[col]).collect())
        .collect();
    let residue = |x: &[i64]| -> Vec<i64> { a.iter().map(|row| dot(row, x)).collect() };

    // Candidates with their frozen components.
    let mut todo: Vec<(Vec<i64>, Vec<bool>)> = (0..q)
        .map(|i| {
            let mut x = vec![0; q];
            x[i] = 1;
            let frozen = (0..q).map(|j| i == q - 1 || j < i).collect();
            (x, frozen)
        })
        .collect();
    let mut minimal: Vec<Vec<i64>> = vec![];

    while let Some((x, mut frozen)) = todo.pop() {
        deadline.check()?;
        let res = residue(&x);
        if res.iter().all(|v| *v == 0) {
            if x[q - 1] == 1 {
                return Ok(Some(x.into_iter().map(|v| v as usize).collect()));
            }
            minimal.push(x);
            continue;
        }
        for i in 0..q {
            if frozen[i] || dot(&res, &columns[i]) >= 0 {
                continue;
            }
            let mut next = x.clone();
            next[i] += 1;
            let above_minimal = minimal
                .iter()
                .any(|sol| sol.iter().zip(&next).all(|(s, n)| s <= n));
            if !above_minimal {
                if i == q - 1 {
                    frozen[i] = true
                }
                todo.push((next, frozen.clone()))
            }
            frozen[i] = true
        }
    }
    Ok(None)
}
