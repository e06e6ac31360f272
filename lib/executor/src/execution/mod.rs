pub mod compile;
pub(crate) mod concurrency;
pub mod error;
pub mod executor;
pub mod node;
