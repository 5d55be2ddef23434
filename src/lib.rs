//! QC Release - Quality Control to Quality Assurance release pipeline
//!
//! Laboratory samples are drawn from goods receipts, batches and production
//! orders, tested against a catalog of specifications, and submitted to QA.
//! A reviewer's release/reject/hold decision is then delivered back to the
//! domain that owns the sampled entity.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
