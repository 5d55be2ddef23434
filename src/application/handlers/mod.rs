//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations, grouped
//! by the service that owns them.

pub mod catalog;
pub mod release;
pub mod result;
pub mod sample;

#[cfg(test)]
pub(crate) mod testing;
