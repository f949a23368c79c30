//! Verification settings.

use std::time::Duration;

crate::prelude!();

/// Default depth of the depth-first permissive check.
pub const DEFAULT_PERMISSIVE_DEPTH: usize = 64;
/// Default ceiling on the states explored per permissive graph search.
pub const DEFAULT_MAX_GRAPH_STATES: usize = 100_000;
/// Default ceiling on the states explored by one tidiness check.
pub const DEFAULT_TIDY_MAX_STATES: usize = 1_000_000;
/// Default stack size of the verification worker.
pub const DEFAULT_STACK_SIZE: usize = 256 * 1024 * 1024;

/// Settings shared by all verification methods.
///
/// ```rust
/// # use crn_verify::{conf::Conf, species_set};
/// # use std::time::Duration;
/// let conf = Conf::new()
///     .timeout(Duration::from_secs(30))
///     .permissive_depth(8)
///     .fuels(species_set!(f1, f2));
/// assert_eq!(conf.permissive_depth, Some(8));
/// assert!(!conf.absorb_fuels);
/// ```
#[derive(Debug, Clone)]
pub struct Conf {
    /// Wall-clock timeout.
    pub timeout: Option<Duration>,
    /// Depth of the depth-first permissive check.
    pub permissive_depth: Option<usize>,
    /// Ceiling on the minimal states of a whole-graph permissive check, and on the search
    /// steps of one loop search.
    pub max_graph_states: usize,
    /// Ceiling on the states explored by one tidiness check.
    pub tidy_max_states: usize,
    /// Enumerate the formal basis module by module.
    pub modular: bool,
    /// Species removed from the implementation before verification.
    pub fuels: Set<Species>,
    /// Extends the fuels with the species producible from fuels only.
    pub absorb_fuels: bool,
    /// Stack size of the verification worker.
    pub stack_size: usize,
}
impl Default for Conf {
    fn default() -> Self {
        Self::new()
    }
}
impl Conf {
    /// Default settings.
    pub fn new() -> Self {
        Self {
            timeout: None,
            permissive_depth: None,
            max_graph_states: DEFAULT_MAX_GRAPH_STATES,
            tidy_max_states: DEFAULT_TIDY_MAX_STATES,
            modular: true,
            fuels: Set::new(),
            absorb_fuels: false,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }

    /// Sets the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
    /// Sets the depth of the depth-first permissive check.
    pub fn permissive_depth(mut self, depth: usize) -> Self {
        self.permissive_depth = Some(depth);
        self
    }
    /// Sets the permissive graph search ceiling.
    pub fn max_graph_states(mut self, max: usize) -> Self {
        self.max_graph_states = max;
        self
    }
    /// Sets the tidiness ceiling.
    pub fn tidy_max_states(mut self, max: usize) -> Self {
        self.tidy_max_states = max;
        self
    }
    /// (De)activates modular basis enumeration.
    pub fn modular(mut self, modular: bool) -> Self {
        self.modular = modular;
        self
    }
    /// Sets the fuels.
    pub fn fuels(mut self, fuels: Set<Species>) -> Self {
        self.fuels = fuels;
        self
    }
    /// (De)activates fuel absorption.
    pub fn absorb_fuels(mut self, absorb: bool) -> Self {
        self.absorb_fuels = absorb;
        self
    }
    /// Sets the worker's stack size.
    pub fn stack_size(mut self, size: usize) -> Self {
        self.stack_size = size;
        self
    }

    /// Depth of the depth-first permissive check, default if unset.
    pub fn depth(&self) -> usize {
        self.permissive_depth.unwrap_or(DEFAULT_PERMISSIVE_DEPTH)
    }
}
