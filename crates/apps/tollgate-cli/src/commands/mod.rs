//! CLI command implementations.

pub mod budget;
pub mod call;
pub mod completions;
pub mod self_test;

// Re-export command handlers
pub use budget::budget;
pub use call::call;
pub use completions::completions;
pub use self_test::self_test;
