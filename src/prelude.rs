//! Common imports throughout this project.

pub use std::{
    collections::{BTreeMap as Map, BTreeSet as Set, HashSet},
    fmt,
    ops::{Deref, DerefMut},
};

pub use error_chain::bail;
pub use tracing::{debug, info, trace, warn};

pub use crate::{
    basis, bisim,
    conf::Conf,
    crn::{self, Crn, Reaction},
    deadline::Deadline,
    interp::Interpretation,
    multiset::Multiset,
    parse, pathway,
    pathway::Pathway,
    species::Species,
    verify,
};

error_chain::error_chain! {
    types {
        Error, ErrorKind, ResExt, Res;
    }

    foreign_links {
        Io(std::io::Error)
        /// I/O error.
        ;
    }

    errors {
        /// A parse error.
        ///
        /// **NB**: `row` and `col` start at zero.
        ParseErr(row: usize, col: usize, line: String, msg: String) {
            description("parse error")
            display("error @{}:{}: `{}`, {}", row + 1, col + 1, line, msg)
        }
        /// Input that is syntactically fine but semantically illegal.
        MalformedInput(msg: String) {
            description("malformed input")
            display("malformed input: {}", msg)
        }
        /// The cooperative deadline expired.
        Timeout {
            description("timeout")
            display("deadline reached before the analysis could conclude")
        }
    }
}

impl Error {
    /// True if the error is a [`ErrorKind::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind(), ErrorKind::Timeout)
    }
}

/// Builds a malformed-input error.
pub fn malformed(msg: impl Into<String>) -> Error {
    ErrorKind::MalformedInput(msg.into()).into()
}
