//! Tests over tidiness, modules and basis enumeration.

crate::prelude!();

use super::{tidy::Tidiness, BasisOutcome};
use crate::{interp, ms, species_set};

fn crn_of(text: &str) -> Crn {
    parse::crn(text).unwrap().split_reversible()
}

fn rxns(text: &str) -> Set<Reaction> {
    crn_of(text).into_iter().collect()
}

fn set_of(crn: &Crn) -> Set<Reaction> {
    crn.iter().cloned().collect()
}

fn run(
    crn: &str,
    formals: &Set<Species>,
    interpretation: Option<&Interpretation>,
    modular: bool,
) -> BasisOutcome {
    let crn = crn_of(crn);
    let conf = Conf::new().modular(modular);
    let outcome = basis::find_basis(&crn, formals, interpretation, &conf, &Deadline::none()).unwrap();
    println!("{}", outcome);
    outcome
}

fn tidiness(crn: &str, formals: &Set<Species>, state: Multiset, bound: Option<usize>) -> Tidiness {
    let crn = crn_of(crn);
    let mut check = super::tidy::TidyCheck::new(&crn, formals, 10_000);
    let res = check.check(&state, bound, &Deadline::none()).unwrap();
    println!("{} from {}: {:?}", crn, state, res);
    res
}

#[test]
fn tidy_checks() {
    let fs = species_set!(A, X);

    let crn = "X -> i + k + l; l -> p + q; i + k + l -> A; p + q -> k; k -> l";
    assert_eq!(tidiness(crn, &fs, ms!(i, k, l), None), Tidiness::Tidy);
    let crn = "X -> i + k + l; l -> p + q; i + k + l -> A; k -> l; p + q -> k";
    assert_eq!(tidiness(crn, &fs, ms!(i, k, l), None), Tidiness::Tidy);
    let crn = "X -> i + k + l; l -> ; l -> 3l; i + k + 4l -> A; k -> j";
    assert_eq!(tidiness(crn, &fs, ms!(i, k, l), None), Tidiness::Tidy);

    // Formal species are projected out.
    assert_eq!(tidiness(crn, &fs, ms!(A, X), None), Tidiness::Tidy);

    let crn = "A -> i; i -> A + j";
    assert_eq!(tidiness(crn, &fs, ms!(j), None), Tidiness::Untidy);
    assert_eq!(tidiness(crn, &fs, ms!(i), None), Tidiness::Untidy);
}

#[test]
fn tidy_bounds() {
    let fs = species_set!(A, B, C, X);
    // Consuming `k` requires `B`, while `i` and `l` grow forever.
    let crn = "X -> i + k + l; l -> ; l -> 3l; i -> i + i; B + i + k + 4l -> A";

    match tidiness(crn, &fs, ms!(i, k, l), Some(6)) {
        Tidiness::Pending(queue) => {
            assert!(!queue.is_empty());
            assert!(queue.iter().all(|state| state.len() > 6))
        }
        res => panic!("expected a pending check, got {:?}", res),
    }
    assert_eq!(tidiness(crn, &fs, ms!(i, k, l), None), Tidiness::Exceeded);

    let crn = crn_of(crn);
    let mut check = super::tidy::TidyCheck::new(&crn, &fs, 10_000);
    let deadline = Deadline::none();
    let queue = match check.check(&ms!(i, k), Some(2), &deadline).unwrap() {
        Tidiness::Pending(queue) => queue,
        res => panic!("expected a pending check, got {:?}", res),
    };
    let res = check.resume(&ms!(i, k), queue, Some(3), &deadline).unwrap();
    assert!(matches!(res, Tidiness::Pending(_)));
}

#[test]
fn tidy_cache() {
    let fs = species_set!(A, B);
    let crn = crn_of("A -> i; i -> j; j -> B");
    let mut check = super::tidy::TidyCheck::new(&crn, &fs, 10_000);
    let deadline = Deadline::none();
    assert!(!check.is_known_tidy(&ms!(i)));
    assert!(check.check(&ms!(A, i), None, &deadline).unwrap().is_tidy());
    assert!(check.is_known_tidy(&ms!(i)));
}

#[test]
fn crn_modules() {
    let crn = crn_of(
        "
        A <=> i503
        A + i383 -> i420
        A + i407 -> i420
        A + i472 <=> i420
        A <=> i683
        A + i383 -> i420
        A + i407 -> i420
        B <=> i165
        B + i43 <=> i17
        B + i503 -> i17
        B + i683 -> i17
        B <=> i157
        B + i503 -> i17
        B + i683 -> i17
        C <=> i383
        C + i157 -> i178
        C + i165 -> i178
        C + i232 <=> i178
        C <=> i407
        C + i157 -> i178
        C + i165 -> i178
        i232 -> C
        i43 -> B
        i472 -> A
        ",
    );
    let fs = species_set!(A, B, C);
    let modules = super::modules(&crn, &crn.intermediates(&fs));
    for module in &modules {
        println!("module:\n{}\n", module);
    }
    assert_eq!(modules.len(), 3);
    assert_eq!(modules.iter().map(|m| m.len()).sum::<usize>(), crn.len());

    let species: Vec<Set<Species>> = modules.iter().map(|m| m.intermediates(&fs)).collect();
    assert!(species.contains(&species_set!(i503, i683, i17, i43)));
    assert!(species.contains(&species_set!(i383, i407, i420, i472)));
    assert!(species.contains(&species_set!(i157, i165, i178, i232)));

    // Reactions without intermediates are on their own, small modules first.
    let crn = crn_of("A -> i; i -> j; j -> B; A + B -> C");
    let modules = super::modules(&crn, &crn.intermediates(&fs));
    assert_eq!(modules.len(), 2);
    assert_eq!(modules[0].to_string(), "A + B -> C");
    assert_eq!(modules[1].len(), 3);
}

#[test]
fn stw2019_f3() {
    let fs = species_set!(A, B, C, D, E, F);
    let icrn = "
        A <=> i
        B <=> j
        i + j  -> k
        k -> D + l
        l -> E
        D <=> m
        m -> F
    ";
    let expected = rxns("A + B -> D + E; D -> F");

    let modular = run(icrn, &fs, None, true).into_basis().unwrap();
    assert_eq!(set_of(&modular.raw), expected);
    assert!(modular.int.is_empty());
    assert_eq!(modular.stats.modules, 2);

    let global = run(icrn, &fs, None, false).into_basis().unwrap();
    assert_eq!(set_of(&global.raw), expected);
    assert!(global.int.is_empty());
    assert_eq!(global.stats.modules, 1);
}

#[test]
fn stw2019_f4() {
    let icrn = "
        A1 -> i
        i -> B1 + W
        A2 -> j
        j -> B2
        W + j -> B1
    ";
    let m = interp!(A1 => [A], A2 => [A], B1 => [B], B2 => [B], W => []);
    let fs: Set<Species> = m.keys().cloned().collect();
    let expected = rxns("A1 -> B1 + W; A2 -> B2; A2 + W -> B1");

    let basis = run(icrn, &fs, None, true).into_basis().unwrap();
    assert_eq!(set_of(&basis.raw), expected);
    assert!(basis.int.is_empty());

    let basis = run(icrn, &fs, Some(&m), true).into_basis().unwrap();
    assert_eq!(set_of(&basis.raw), expected);
    assert_eq!(set_of(&basis.int), rxns("A -> B"));
}

#[test]
fn stw2019_intro() {
    let fs = species_set!(A, B, C, D);
    let formal = "A + B -> C + D; C + A -> C + C";
    let basis1 = run(formal, &fs, None, true).into_basis().unwrap();
    assert_eq!(set_of(&basis1.raw), rxns(formal));

    for icrn in &[
        "A <=> i; i + B <=> j; i + j -> C + k; k <=> D; C + A <=> m + n; m + n -> C + C",
        "A <=> i; i + B <=> j; j <=> C + k; k -> D; C + A <=> m + n; m + n -> C + C",
        "A -> i; i + B <=> j; j -> C + k; k <=> D; C + A <=> m + n; m + n -> C + C",
    ] {
        assert!(!run(icrn, &fs, None, true).is_found());
    }

    let icrn = "A <=> i; i + B <=> j; j -> C + k; k <=> D; C + A <=> m + n; m + n -> C + C";
    let basis5 = run(icrn, &fs, None, true).into_basis().unwrap();
    assert_eq!(set_of(&basis5.raw), set_of(&basis1.raw));

    let icrn = "A + g1 <=> i + g2; i + B <=> j + g3; g4 + j -> C + k + w1; g5 + k <=> D + w2; \
        C + A <=> m + n; g6 + m + n -> C + C + w3";
    let basis6 = run(icrn, &fs, None, true).into_basis().unwrap();
    assert_ne!(set_of(&basis6.raw), set_of(&basis1.raw));
}

#[test]
fn stw2019_text01() {
    let icrn = "
        A <=> i
        i + B1 <=> j1
        i + B2 <=> j2
        j1 -> C
        j2 -> C
    ";
    let formal = rxns("A + B -> C");
    let fs = species_set!(A, B, C);
    let m1 = interp!(A => [A], B1 => [B], B2 => [B], C => [C]);
    let fs1: Set<Species> = m1.keys().cloned().collect();
    let m2 = interp!(
        A => [A], B1 => [B], B2 => [B], i => [A], j1 => [A, B], j2 => [A, B], C => [C],
    );
    let fs2: Set<Species> = m2.keys().cloned().collect();

    let basis = run(icrn, &fs, None, true).into_basis().unwrap();
    assert!(basis.raw.is_empty());
    assert!(basis.int.is_empty());

    assert!(!run(icrn, &fs1, None, true).is_found());

    let basis = run(icrn, &fs2, None, true).into_basis().unwrap();
    assert_eq!(set_of(&basis.raw), rxns(icrn));
    assert!(basis.int.is_empty());

    let basis = run(icrn, &fs1, Some(&m1), true).into_basis().unwrap();
    assert_eq!(
        set_of(&basis.raw),
        rxns("A + B1 -> C; A + B1 + B2 -> B2 + C; A + B1 + B2 -> B1 + C; A + B2 -> C"),
    );
    assert_eq!(set_of(&basis.int), formal);

    let basis = run(icrn, &fs2, Some(&m2), true).into_basis().unwrap();
    assert_eq!(set_of(&basis.raw), rxns(icrn));
    assert_eq!(set_of(&basis.int), formal);
}

#[test]
fn jdw2019_f5() {
    let icrn = "
        A <=> i_A_BCD
        B + i_A_BCD <=> i_AB_CD
        i_AB_CD <=> i_ABC_D + C
        i_ABC_D <=> i_ABCD_ + D
        i_ABCD_ + fi -> w_ABCD
    ";
    let m = interp!(A => [A], B => [B], C => [C], D => [D]);
    let fs: Set<Species> = m.keys().cloned().collect();
    assert!(!run(icrn, &fs, None, true).is_found());
    assert!(!run(icrn, &fs, Some(&m), true).is_found());
}

#[test]
fn no_basis() {
    let icrn = "A <=> j; j -> i + C; C + i -> B; B -> C; i -> j";
    assert!(!run(icrn, &species_set!(A, B, C), None, true).is_found());

    match run(icrn, &species_set!(A, B), None, true) {
        BasisOutcome::NotTidy(witness) => {
            assert_eq!(witness.initial, ms!(A));
            assert!(witness.final_state.has(&Species::new("C")));
        }
        outcome => panic!("expected a tidiness failure, got {}", outcome),
    }

    let icrn = "A <=> i; i + B <=> j; j <=> k + C; k <=> D";
    assert!(!run(icrn, &species_set!(A, B, C, D), None, true).is_found());
}

#[test]
fn empty_and_formal_crns() {
    let fs = species_set!(A, B);
    let basis = run("", &fs, None, true).into_basis().unwrap();
    assert!(basis.raw.is_empty());

    let basis = run("A -> B; B -> B", &fs, None, true).into_basis().unwrap();
    assert_eq!(basis.raw.to_string(), "A -> B");
}

#[test]
fn timeout() {
    let crn = crn_of("A <=> i; i -> B");
    let fs = species_set!(A, B);
    let deadline = Deadline::after(std::time::Duration::from_secs(0));
    let err = basis::find_basis(&crn, &fs, None, &Conf::new(), &deadline).unwrap_err();
    assert!(err.is_timeout());
}
