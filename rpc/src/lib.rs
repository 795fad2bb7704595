//! HTTP API for the VIGIL attestation service.
//!
//! Public surface:
//! - `POST /challenge` — issue a challenge (API-keyed)
//! - `POST /verify` — verify a response (API-keyed)
//! - `POST /session/validate` — validate a session token (open)
//!
//! Admin surface (credential-gated): tenant provisioning and lifecycle,
//! usage log, aggregate stats.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::{ApiError, RpcError};
pub use server::{router, AppState, RpcServer};
