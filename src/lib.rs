//! Verification of chemical reaction network implementations.
//!
//! A *formal* CRN is implemented by a larger *implementation* CRN, usually compiled to DNA strand
//! displacement. This crate checks the implementation against the formal CRN with two notions of
//! equivalence:
//!
//! - *pathway decomposition*, through the [formal basis](basis) of the implementation;
//! - *CRN bisimulation*, through an [interpretation](interp) of implementation species as formal
//!   multisets, see [`bisim`].
//!
//! The [hybrid methods](verify::Method) combine both. Entry point is [`verify::verify`].
//!
//! ```rust
//! # use crn_verify::{prelude::*, species_set, verify::Verdict};
//! let fcrn = parse::crn("A + B -> C").unwrap();
//! let icrn = parse::crn("
//!     A <=> i1
//!     i1 + B -> i2 + w
//!     i2 -> C
//! ").unwrap();
//! let fs = species_set!(A, B, C);
//! let method = "crn-bisimulation".parse().unwrap();
//! let (verdict, m) = verify::verify(&fcrn, &icrn, &fs, None, method, &Conf::new()).unwrap();
//! assert_eq!(verdict, Verdict::True);
//! println!("{}", m.unwrap());
//! ```

#![forbid(missing_docs)]

mod macros;

pub mod prelude;

pub mod basis;
pub mod bisim;
pub mod conf;
pub mod crn;
pub mod deadline;
pub mod interp;
pub mod multiset;
pub mod parse;
pub mod pathway;
pub mod species;
pub mod verify;
