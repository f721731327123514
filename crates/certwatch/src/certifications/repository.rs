use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{AlertCheckRecord, CertificationId, CompanyId, VerificationView};
use super::status::CertificationStatus;

/// Storage abstraction so the alert service can be exercised in isolation.
pub trait CertificationStore: Send + Sync {
    /// Certifications with at least one alert flag still unset, joined with
    /// their owning worker and company.
    fn fetch_needing_alert_check(&self) -> Result<Vec<AlertCheckRecord>, StoreError>;

    /// Apply the given flag transitions to one certification.
    fn set_alert_flags(
        &self,
        id: &CertificationId,
        update: AlertFlagUpdate,
    ) -> Result<(), StoreError>;

    fn find_by_verification_code(
        &self,
        code: &str,
    ) -> Result<Option<VerificationView>, StoreError>;

    /// Expiration dates of every stored certification (dashboard stats).
    fn expirations(&self) -> Result<Vec<Option<NaiveDate>>, StoreError>;
}

/// Partial flag write; `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertFlagUpdate {
    pub attention_alert_sent: Option<bool>,
    pub critical_alert_sent: Option<bool>,
}

impl AlertFlagUpdate {
    pub fn attention_sent() -> Self {
        Self {
            attention_alert_sent: Some(true),
            ..Self::default()
        }
    }

    pub fn critical_sent() -> Self {
        Self {
            critical_alert_sent: Some(true),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.attention_alert_sent.is_none() && self.critical_alert_sent.is_none()
    }
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("certification not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Outbound notification hook (SMTP adapter, simulated transport, or test
/// double). One dispatch covers every at-risk certification for one company.
pub trait AlertNotifier: Send + Sync {
    fn dispatch(&self, alert: &CompanyAlert) -> Result<DispatchOutcome, NotifyError>;
}

/// Alert batch routed to a single company contact address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyAlert {
    pub company_id: CompanyId,
    pub company_name: String,
    pub contact_email: String,
    pub lines: Vec<AlertLine>,
}

/// One at-risk certification inside a company alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertLine {
    pub certification_id: CertificationId,
    pub course: String,
    pub worker_name: String,
    pub worker_national_id: String,
    pub work_center: String,
    pub expires_on: NaiveDate,
    pub status: CertificationStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The message left the machine.
    Sent,
    /// No-op transport; treated as confirmed delivery so dev environments
    /// without credentials still exercise the full flag lifecycle.
    Simulated,
}

/// Alert dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("alert transport unavailable: {0}")]
    Transport(String),
    #[error("alert dispatch timed out after {0} seconds")]
    Timeout(u64),
}
