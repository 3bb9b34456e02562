//! pinecache application library
//!
//! Store lifecycle, logging setup and the operator CLI, exposed as a library
//! so the binary stays a thin orchestrator and the pieces can be tested.

pub mod args;
pub mod commands;
pub mod lifecycle;
pub mod logging;
