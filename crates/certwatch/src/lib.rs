//! Certification tracking and expiry alerting for industrial training
//! courses: workers hold course certifications with expiration dates, and the
//! service classifies each one, alerts the owning company before and after
//! expiry, and answers diploma verification lookups.

pub mod certifications;
pub mod config;
pub mod error;
pub mod telemetry;
