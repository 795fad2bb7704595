//! Tenant registry for the VIGIL attestation service.
//!
//! Owns every client (tenant) record: API keys, plans, monthly verification
//! quotas, and account lifecycle (active/blocked/expired), plus the
//! append-only usage audit log. All mutation goes through [`ClientRegistry`];
//! no other component touches tenant state directly.

pub mod client;
pub mod error;
pub mod registry;
pub mod usage_log;

pub use client::Client;
pub use error::{AdmitError, RegistryError};
pub use registry::{ClientRegistry, DEFAULT_DURATION_DAYS};
pub use usage_log::{UsageAction, UsageLog, UsageLogEntry};
