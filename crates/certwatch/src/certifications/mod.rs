//! Certification expiry tracking: status classification, the alert scan,
//! the administrative flag resync, and diploma verification lookup.
//!
//! Persistence and outbound mail are collaborators behind the
//! [`CertificationStore`] and [`AlertNotifier`] traits so the business rules
//! here can be exercised against in-memory doubles.

pub mod domain;
pub mod email;
pub mod repository;
pub mod router;
pub mod service;
pub mod status;

#[cfg(test)]
mod tests;

pub use domain::{
    AlertCheckRecord, Certification, CertificationId, Company, CompanyId, VerificationView, Worker,
};
pub use repository::{
    AlertFlagUpdate, AlertLine, AlertNotifier, CertificationStore, CompanyAlert, DispatchOutcome,
    NotifyError, StoreError,
};
pub use router::certification_router;
pub use service::{
    AlertServiceError, CertificationAlertService, DispatchFailure, ResyncReport, ScanReport,
};
pub use status::{
    breakdown, classify, report_label, CertificationStatus, StatusBreakdown, StatusInfo,
    ATTENTION_WINDOW_DAYS, REPORT_SOFT_WINDOW_DAYS,
};
