use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CertificationId(pub i64);

impl fmt::Display for CertificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompanyId(pub i64);

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A worker's record of having completed a training course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certification {
    pub id: CertificationId,
    pub course: String,
    pub issued_on: NaiveDate,
    pub expires_on: Option<NaiveDate>,
    /// Assigned lazily on first diploma render, immutable afterwards.
    pub verification_code: Option<String>,
    pub report_url: Option<String>,
    pub attention_alert_sent: bool,
    pub critical_alert_sent: bool,
}

impl Certification {
    /// Recertification extends the expiration date and re-arms both alert
    /// flags so the renewed record can alert again in a future window.
    pub fn renew(&mut self, new_expiration: NaiveDate) {
        self.expires_on = Some(new_expiration);
        self.attention_alert_sent = false;
        self.critical_alert_sent = false;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: i64,
    pub name: String,
    pub surname: String,
    /// Chilean RUT.
    pub national_id: String,
    pub work_center: Option<String>,
}

impl Worker {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname).trim().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub national_id: Option<String>,
    pub contact_email: Option<String>,
}

/// Joined read-model the alert scan consumes. Worker and company stay
/// optional because a broken linkage is an expected data-quality state, not
/// a fault; the scanner skips such records silently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertCheckRecord {
    pub certification: Certification,
    pub worker: Option<Worker>,
    pub company: Option<Company>,
}

/// Public payload returned by the diploma verification lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationView {
    pub worker: String,
    pub national_id: String,
    pub course: String,
    pub expires_on: Option<NaiveDate>,
    pub work_center: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renewal_resets_both_alert_flags() {
        let mut cert = Certification {
            id: CertificationId(1),
            course: "Rigger Certificado".to_string(),
            issued_on: NaiveDate::from_ymd_opt(2022, 6, 1).expect("valid date"),
            expires_on: Some(NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")),
            verification_code: Some("RYL-2022-0001".to_string()),
            report_url: None,
            attention_alert_sent: true,
            critical_alert_sent: true,
        };

        let renewed_until = NaiveDate::from_ymd_opt(2026, 6, 1).expect("valid date");
        cert.renew(renewed_until);

        assert_eq!(cert.expires_on, Some(renewed_until));
        assert!(!cert.attention_alert_sent);
        assert!(!cert.critical_alert_sent);
        // The verification code survives recertification.
        assert_eq!(cert.verification_code.as_deref(), Some("RYL-2022-0001"));
    }

    #[test]
    fn full_name_trims_missing_surname() {
        let worker = Worker {
            id: 1,
            name: "Ana".to_string(),
            surname: String::new(),
            national_id: "12.345.678-5".to_string(),
            work_center: None,
        };
        assert_eq!(worker.full_name(), "Ana");
    }
}
