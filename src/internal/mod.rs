//! Internal implementation details.

pub(crate) mod circular;
pub(crate) mod lock;

pub use circular::MAX_RESOLUTION_DEPTH;
pub(crate) use circular::{ResolutionStacks, StackGuard};
pub(crate) use lock::Lock;
