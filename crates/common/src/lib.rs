//! Shared token lifecycle infrastructure for the LeadLink workspace.
//!
//! The `auth` module owns the OAuth refresh cycle: the persisted token
//! record, the refresh exchange client, and the manager that decides when a
//! refresh runs. The `testing` module provides deterministic in-memory
//! doubles for the auth ports.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;
pub mod testing;
