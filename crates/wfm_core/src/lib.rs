//! Shared workflow-management domain primitives.
//!
//! This crate owns deterministic behavior: the typed-attribute record codec,
//! record and payload contracts, default-parameter resolution, the
//! workflow-library fan-out rules, and resource naming. It intentionally
//! excludes AWS SDK and Lambda runtime concerns, which live in
//! `crates/wfm_lambda`.

pub mod contract;
pub mod fanout;
pub mod naming;
pub mod record;
pub mod resolver;
pub mod status;
