//! # Shared Types Crate
//!
//! Message types shared by the transaction service (request side) and the
//! authentication service (decision side).
//!
//! ## Wire Format
//!
//! Messages are versionless JSON objects with camelCase keys:
//!
//! ```text
//! auth-request   {"requestId": "…", "token": "…"}
//! auth-response  {"requestId": "…", "status": "ACCEPTED"}
//! ```
//!
//! The `status` field is always one of the four literals
//! `ACCEPTED`, `REJECTED`, `UNKNOWN`, `INVALID`.

pub mod entities;
pub mod errors;
pub mod ipc;

pub use entities::*;
pub use errors::*;
pub use ipc::*;
