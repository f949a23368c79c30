//! Multiset algebra tests.

crate::prelude!();

use crate::ms;

#[test]
fn sum_and_difference() {
    let a = ms!(A, A, i);
    let b = ms!(A, B);
    println!("a: {}", a);
    println!("b: {}", b);

    assert_eq!(&a + &b, ms!(A * 3, B, i));
    // Clamped.
    assert_eq!(&a - &b, ms!(A, i));
    assert_eq!(&b - &a, ms!(B));
    // Exact.
    assert_eq!(a.checked_minus(&b), None);
    assert_eq!(a.checked_minus(&ms!(A)), Some(ms!(A, i)));
    // Symmetric.
    assert_eq!(a.sym_diff(&b), ms!(A, B, i));
    // Inputs untouched.
    assert_eq!(a, ms!(A * 2, i));
    assert_eq!(b, ms!(A, B));
}

#[test]
fn containment_and_cardinality() {
    let small = ms!(A, i);
    let big = ms!(A * 2, i, j);
    assert!(small.is_subset(&big));
    assert!(!big.is_subset(&small));
    assert!(ms!().is_subset(&small));
    assert!(small.is_subset(&small));

    assert_eq!(big.len(), 4);
    assert_eq!(big.distinct(), 3);
    assert_eq!(ms!().len(), 0);
}

#[test]
fn remove_one_deletes_empty_keys() {
    let mut state = ms!(A * 2);
    assert!(state.remove_one(&Species::new("A")));
    assert_eq!(state, ms!(A));
    assert!(state.remove_one(&Species::new("A")));
    assert!(state.is_empty());
    assert_eq!(state, Multiset::new());
    assert!(!state.remove_one(&Species::new("A")));
}

#[test]
fn union_and_intersection() {
    let a = ms!(A * 2, B);
    let b = ms!(A, C * 3);
    assert_eq!(a.union(&b), ms!(A * 2, B, C * 3));
    assert_eq!(a.intersection(&b), ms!(A));
    assert_eq!(a.scale(3), ms!(A * 6, B * 3));
    assert_eq!(a.scale(0), ms!());
}

#[test]
fn projections() {
    let fs: Set<Species> = vec![Species::new("A"), Species::new("B")]
        .into_iter()
        .collect();
    let state = ms!(A, i * 2, B, w);
    assert_eq!(state.project(&fs), ms!(A, B));
    assert_eq!(state.project_out(&fs), ms!(i * 2, w));
    assert!(ms!(A, B * 2).is_over(&fs));
    assert!(ms!().is_over(&fs));
    assert!(!state.is_over(&fs));
    assert!(state.meets(&fs));
    assert!(!ms!(i).meets(&fs));
}

#[test]
fn canonical_order_and_display() {
    let a = Multiset::from_species(vec!["i", "B", "A", "i"]);
    let b = Multiset::from_species(vec!["A", "i", "i", "B"]);
    assert_eq!(a, b);
    assert_eq!(a.to_string(), "A + B + i + i");
    assert_eq!(ms!().to_string(), "∅");

    let elements: Vec<_> = a.elements().map(|sp| sp.name().to_string()).collect();
    assert_eq!(elements, vec!["A", "B", "i", "i"]);

    // Lexicographic over sorted species.
    assert!(ms!(A) < ms!(B));
    assert!(ms!(A) < ms!(A, B));
    assert!(ms!(A * 2) > ms!(A, B));
}

#[test]
fn species_are_interned() {
    let a1 = Species::new("some_species");
    let a2 = Species::new(String::from("some_species"));
    assert_eq!(a1, a2);
    assert_eq!(a1.name(), "some_species");
    assert!(Species::new("a") < Species::new("b"));
}
