//! AWS-oriented adapters and handlers for the workflow-management platform.
//!
//! This crate owns runtime integration details: the record-store, dispatch,
//! stack-orchestration, and teardown adapter traits, their AWS SDK
//! implementations, and the Lambda handlers built on top of them. Handlers
//! take adapters by trait so every path is testable with in-memory doubles;
//! deterministic domain behavior lives in `crates/wfm_core`.

pub mod adapters;
pub mod handlers;
pub mod logging;
