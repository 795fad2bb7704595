//! Fundamental types for the VIGIL attestation service.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: timestamps and calendar months, opaque credential tokens, risk
//! and lifecycle enums, protocol parameters, and the entropy source trait.

pub mod entropy;
pub mod params;
pub mod risk;
pub mod state;
pub mod time;
pub mod token;

pub use entropy::{EntropySource, SystemEntropy};
pub use params::AttestParams;
pub use risk::RiskScore;
pub use state::{ClientStatus, Plan};
pub use time::{Timestamp, YearMonth};
pub use token::{ApiKey, DeviceId, Nonce, SessionToken};
