//! Tests over CRN bisimulation.

use std::time::Duration;

crate::prelude!();

use super::{modular, table::Table, BisimOutcome, Permissive};
use crate::{interp, ms, species_set};

fn crn(text: &str) -> Crn {
    parse::crn(text).unwrap()
}

fn run(
    fcrn: &str,
    icrn: &str,
    formals: &Set<Species>,
    partial: Option<&Interpretation>,
    permissive: Permissive,
) -> BisimOutcome {
    let conf = Conf::new().permissive_depth(8);
    let outcome = bisim::bisimulation(
        &crn(fcrn),
        &crn(icrn),
        formals,
        partial,
        permissive,
        &conf,
        &Deadline::none(),
    )
    .unwrap();
    println!("{}:\n{}\n", permissive, outcome);
    outcome
}

fn found(outcome: BisimOutcome) -> Interpretation {
    match outcome {
        BisimOutcome::Found(m) => m,
        outcome => panic!("expected a bisimulation, got {}", outcome),
    }
}

#[test]
fn delimiting_table() {
    let fs = species_set!(A, B);
    let fcrn = crn("A -> B");

    let icrn = crn("A -> i; i -> B");
    let table = Table::new(&fcrn, &icrn.split_reversible(), &fs);
    println!("{}\n", table);
    assert_eq!(table.rows(), 2);
    assert!(table.get(0, 0) && table.trivial(0));
    assert!(table.get(1, 0) && table.trivial(1));
    assert!(table.is_consistent());

    // `B -> A` is neither trivial nor an implementation of `A -> B`.
    let icrn = crn("A -> i; i -> B; B -> A");
    let table = Table::new(&fcrn, &icrn, &fs);
    println!("{}\n", table);
    assert!(!table.get(2, 0));
    assert!(!table.trivial(2));
    assert!(!table.is_consistent());

    // Nothing can implement `A -> B`.
    let icrn = crn("A -> A + A");
    let table = Table::new(&fcrn, &icrn, &fs);
    assert!(!table.is_consistent());
}

#[test]
fn example_01() {
    let fs = species_set!(A, B);
    let partial = interp!(A => [A], B => [B]);
    let backup = partial.clone();
    for permissive in Permissive::ALL {
        let m = found(run(
            "A -> B",
            "A <=> i19; i19 <=> i39 + X; i39 -> i71 + i72",
            &fs,
            Some(&partial),
            permissive,
        ));
        assert_eq!(m.state(&ms!(i19)), ms!(A));
        assert_eq!(m.state(&ms!(i39)), ms!(A));
        assert_eq!(m.state(&ms!(X)), ms!());
        assert_eq!(m.state(&ms!(i71, i72)), ms!(B));
    }
    assert_eq!(partial, backup);
}

#[test]
fn example_02() {
    let fcrn = "A + B -> C + D; A + C -> B + D";
    let icrn = "x1 -> x2; x3 + x4 <=> x5; x2 -> x6 + x8; x5 -> x7; \
                x3 <=> x6; x9 <=> x10; x10 + x4 <=> x1; x7 -> x9 + x8";
    let fs = species_set!(A, B, C, D);

    let outcome = run(fcrn, icrn, &fs, None, Permissive::WholeGraph);
    assert!(outcome.is_found());

    let partial = interp!(x2 => [B, D], x3 => [C]);
    let outcome = run(fcrn, icrn, &fs, Some(&partial), Permissive::LoopSearch);
    assert!(!outcome.is_found());

    let partial = interp!(x2 => [B, D]);
    let m = found(run(fcrn, icrn, &fs, Some(&partial), Permissive::LoopSearch));
    assert_eq!(m.state(&ms!(x2)), ms!(B, D));
}

#[test]
fn example_03() {
    let fcrn = "A + B -> C + D; A + C -> B + D";
    let icrn = "x1 -> x2; x3 + x4 <=> x5; x2 -> x6 + x8; x5 -> x7; \
                x3 <=> x6; x9 <=> x10; x10 + x4 <=> x1; x7 -> x9 + x8";
    let fs = species_set!(A, B, C, D);
    let inter1 = interp!(
        x1 => [A, B], x2 => [C, D], x3 => [C], x4 => [A], x5 => [A, C],
        x6 => [C], x7 => [B, D], x8 => [D], x9 => [B], x10 => [B],
    );
    let inter2 = interp!(
        x1 => [A, C], x2 => [B, D], x3 => [B], x4 => [A], x5 => [A, B],
        x6 => [B], x7 => [C, D], x8 => [D], x9 => [C], x10 => [C],
    );
    for permissive in Permissive::ALL {
        let m = found(run(fcrn, icrn, &fs, Some(&inter1), permissive));
        assert_eq!(m, inter1);
        let m = found(run(fcrn, icrn, &fs, Some(&inter2), permissive));
        assert_eq!(m, inter2);
    }
}

#[test]
fn example_04() {
    let fcrn = "B + B -> B";
    let icrn = "B <=> x1; B + x1 -> x2 + x3; x2 -> B + x4";
    let fs = species_set!(B);

    let partial = interp!(B => [B], x2 => [B, B]);
    let m = found(run(fcrn, icrn, &fs, Some(&partial), Permissive::WholeGraph));
    assert_eq!(
        m,
        interp!(B => [B], x1 => [B], x2 => [B * 2], x3 => [], x4 => []),
    );

    let partial = interp!(B => [B], x2 => [B]);
    let m = found(run(fcrn, icrn, &fs, Some(&partial), Permissive::WholeGraph));
    assert_eq!(
        m,
        interp!(B => [B], x1 => [B], x2 => [B], x3 => [], x4 => []),
    );
}

#[test]
fn example_05() {
    // `e45` used to confuse the search because of its name.
    let fs = species_set!(A, B, C);
    let partial = interp!(A => [A], B => [B], C => [C]);
    let m = found(run(
        "A + C -> A + B",
        "A <=> x1 + e45; C + x1 <=> x3 + x4; x3 -> A + B + x5",
        &fs,
        Some(&partial),
        Permissive::WholeGraph,
    ));
    for sp in ["A", "B", "C"] {
        let sp = Species::new(sp);
        assert_eq!(m.get(&sp), Some(&Multiset::from_species(Some(sp.clone()))));
    }
}

#[test]
fn garbage_collection_breaks_permissiveness() {
    let icrn = "A <=> i22; i59 <=> i139; i45 -> i351 + i352; i22 + B <=> i45 + i44; \
                i44 <=> i60 + i59; i60 -> i104 + i105; i139 <=> i227 + X; \
                i227 <=> i269 + Y; i269 -> i338 + i339";
    let fs = species_set!(A, B, X, Y);
    let partial = interp!(
        A => [A], B => [B], X => [X], Y => [Y],
        i22 => [A], i44 => [A, B], i59 => [A, B], i139 => [A, B], i227 => [Y],
        i269 => [], i60 => [], i104 => [], i105 => [], i45 => [], i351 => [], i352 => [],
    );
    let outcome = run("A + B <=> X + Y", icrn, &fs, Some(&partial), Permissive::WholeGraph);
    match outcome {
        BisimOutcome::NotFound(Some(failure)) => {
            assert_eq!(failure.reaction.reactants, ms!(X, Y));
            assert_eq!(failure.reaction.products, ms!(A, B));
        }
        outcome => panic!("expected a permissive failure, got {}", outcome),
    }
}

#[test]
fn empty_implementation() {
    let fs = species_set!(A, B);
    let conf = Conf::new();
    let deadline = Deadline::none();
    let empty = Crn::new();

    let outcome =
        bisim::bisimulation(&empty, &empty, &fs, None, Permissive::WholeGraph, &conf, &deadline)
            .unwrap();
    assert!(outcome.is_found());

    let outcome = bisim::bisimulation(
        &crn("A -> B"),
        &empty,
        &fs,
        None,
        Permissive::WholeGraph,
        &conf,
        &deadline,
    )
    .unwrap();
    assert_eq!(outcome, BisimOutcome::NotFound(None));
}

#[test]
fn malformed_inputs() {
    let fs = species_set!(A, B);
    let conf = Conf::new();
    let deadline = Deadline::none();
    let fcrn = crn("A -> B");
    let icrn = crn("A -> i; i -> B");

    // `Z` is not formal.
    let partial = interp!(i => [Z]);
    let res = bisim::bisimulation(
        &fcrn,
        &icrn,
        &fs,
        Some(&partial),
        Permissive::WholeGraph,
        &conf,
        &deadline,
    );
    assert!(res.is_err());

    let res = bisim::bisimulation(
        &crn("A -> C"),
        &icrn,
        &fs,
        None,
        Permissive::WholeGraph,
        &conf,
        &deadline,
    );
    match res {
        Err(e) => {
            println!("{}", e);
            assert!(matches!(e.kind(), ErrorKind::MalformedInput(_)))
        }
        Ok(outcome) => panic!("expected an error, got {}", outcome),
    }
}

#[test]
fn timeout() {
    let deadline = Deadline::after(Duration::from_secs(0));
    let res = bisim::bisimulation(
        &crn("A -> B"),
        &crn("A -> i; i -> B"),
        &species_set!(A, B),
        None,
        Permissive::WholeGraph,
        &Conf::new(),
        &deadline,
    );
    match res {
        Err(e) => assert!(e.is_timeout()),
        Ok(outcome) => panic!("expected a timeout, got {}", outcome),
    }
}

#[test]
fn module_condition() {
    let common = species_set!(A, B);

    // `i` can only go back to `A` or become `B`, both are common.
    let module = crn("A -> i; i -> A; i -> B");
    let m = interp!(A => [A], B => [B], i => [A]);
    assert!(modular::module_condition(&module, &common, &m));

    // Nothing breaks `i` down.
    let module = crn("A -> i; i -> B");
    assert!(!modular::module_condition(&module, &common, &m));

    // `w` is null, `i` loses it and goes into `A`.
    let module = crn("A + w -> i; i -> A + w");
    let m = interp!(A => [A], i => [A], w => []);
    assert!(modular::module_condition(&module, &common, &m));
}

#[test]
fn common_species() {
    let icrns = vec![crn("A -> i; i -> B"), crn("B -> j; j + k -> C + k")];
    let common = modular::common_species(&icrns, &species_set!(A, B, C));
    assert_eq!(common, species_set!(A, B, C));

    let icrns = vec![crn("A -> i; i -> w"), crn("w + B -> j")];
    let common = modular::common_species(&icrns, &species_set!(A, B));
    assert_eq!(common, species_set!(A, B, w));
}

#[test]
fn modular_bisimulation() {
    let fcrns = vec![crn("A -> B"), crn("B -> C")];
    let icrns = vec![crn("A <=> i; i -> B"), crn("B <=> j; j -> C")];
    let fs = species_set!(A, B, C);
    let conf = Conf::new();
    let deadline = Deadline::none();

    let outcome = modular::modular_bisimulation(
        &fcrns,
        &icrns,
        &fs,
        None,
        None,
        Permissive::WholeGraph,
        &conf,
        &deadline,
    )
    .unwrap();
    println!("{}", outcome);
    let m = found(outcome);
    assert!(m.contains_key(&Species::new("i")));
    assert!(m.contains_key(&Species::new("j")));
    assert_eq!(m.state(&ms!(A, B, C)), ms!(A, B, C));

    // Global bisimulation holds, but `i` cannot turn into anything common.
    let fcrns = vec![crn("A -> B"), crn("C -> D")];
    let icrns = vec![crn("A -> i; i -> B"), crn("C -> j; j -> D")];
    let fs = species_set!(A, B, C, D);
    let partial = interp!(i => [A]);

    let global = bisim::bisimulation(
        &crn("A -> B; C -> D"),
        &crn("A -> i; i -> B; C -> j; j -> D"),
        &fs,
        Some(&partial),
        Permissive::WholeGraph,
        &conf,
        &deadline,
    )
    .unwrap();
    println!("{}", global);
    assert!(global.is_found());

    let outcome = modular::modular_bisimulation(
        &fcrns,
        &icrns,
        &fs,
        Some(&partial),
        None,
        Permissive::WholeGraph,
        &conf,
        &deadline,
    )
    .unwrap();
    println!("{}", outcome);
    assert!(!outcome.is_found());

    let res = modular::modular_bisimulation(
        &fcrns[..1],
        &icrns,
        &fs,
        None,
        None,
        Permissive::WholeGraph,
        &conf,
        &deadline,
    );
    assert!(res.is_err());
}
