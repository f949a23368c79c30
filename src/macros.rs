//! Crate-level macros.

/// Imports the crate's prelude.
#[macro_export]
macro_rules! prelude {
    {} => { use $crate::prelude::*; };
    { pub } => { pub use $crate::prelude::*; };
}

/// Convenience macro, builds a [`Multiset`](crate::multiset::Multiset).
///
/// Species are written as identifiers, optionally followed by `* <count>`.
///
/// ```rust
/// # use crn_verify::ms;
/// let state = ms!(A, i * 2, B);
/// assert_eq!(state.len(), 4);
/// assert_eq!(state.to_string(), "A + B + i + i");
/// assert!(ms!().is_empty());
/// ```
#[macro_export]
macro_rules! ms {
    ( $( $sp:ident $(* $n:literal)? ),* $(,)? ) => {{
        #[allow(unused_mut)]
        let mut ms = $crate::multiset::Multiset::new();
        $(
            ms.insert($crate::species::Species::new(stringify!($sp)), 1 $(- 1 + $n)?);
        )*
        ms
    }};
}

/// Convenience macro, builds an [`Interpretation`](crate::interp::Interpretation).
///
/// ```rust
/// # use crn_verify::{interp, ms};
/// let m = interp!(i1 => [A], x => [], y => [A, B * 2]);
/// assert_eq!(m.len(), 3);
/// assert_eq!(m.state(&ms!(i1, y)), ms!(A * 2, B * 2));
/// ```
#[macro_export]
macro_rules! interp {
    ( $( $sp:ident => [ $($formal:tt)* ] ),* $(,)? ) => {{
        #[allow(unused_mut)]
        let mut m = $crate::interp::Interpretation::new();
        $(
            m.insert(
                $crate::species::Species::new(stringify!($sp)),
                $crate::ms!($($formal)*),
            );
        )*
        m
    }};
}

/// Builds a set of species from identifiers.
///
/// ```rust
/// # use crn_verify::species_set;
/// let fs = species_set!(A, B, C);
/// assert_eq!(fs.len(), 3);
/// ```
#[macro_export]
macro_rules! species_set {
    ( $($sp:ident),* $(,)? ) => {{
        #[allow(unused_mut)]
        let mut set = $crate::prelude::Set::new();
        $(
            set.insert($crate::species::Species::new(stringify!($sp)));
        )*
        set
    }};
}
