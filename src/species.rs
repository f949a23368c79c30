//! Interned species names.

use std::{
    hash::{Hash, Hasher},
    sync::{Arc, Mutex},
};

crate::prelude!();

lazy_static::lazy_static! {
    /// Table of all the species names created so far.
    static ref TABLE: Mutex<HashSet<Arc<str>>> = Mutex::new(HashSet::new());
}

/// A species, an opaque interned name.
///
/// Two species with the same name share the same allocation, equality is checked on pointers
/// first.
#[derive(Clone)]
pub struct Species {
    name: Arc<str>,
}
impl Species {
    /// Constructor, interns `name`.
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        // A poisoned table still holds valid names.
        let mut table = TABLE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(known) = table.get(name) {
            return Self {
                name: known.clone(),
            };
        }
        let name: Arc<str> = Arc::from(name);
        table.insert(name.clone());
        Self { name }
    }

    /// Species name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Species {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.name, &other.name) || self.name == other.name
    }
}
impl Eq for Species {}
impl Hash for Species {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state)
    }
}
impl PartialOrd for Species {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Species {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        if Arc::ptr_eq(&self.name, &other.name) {
            std::cmp::Ordering::Equal
        } else {
            self.name.cmp(&other.name)
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        self.name.fmt(fmt)
    }
}
impl fmt::Debug for Species {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        self.name.fmt(fmt)
    }
}

impl From<&str> for Species {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
impl From<String> for Species {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
impl AsRef<str> for Species {
    fn as_ref(&self) -> &str {
        &self.name
    }
}
impl std::borrow::Borrow<str> for Species {
    fn borrow(&self) -> &str {
        &self.name
    }
}
