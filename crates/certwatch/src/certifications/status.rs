//! Expiration-status classification.
//!
//! Every caller that needs to know whether a certification is in good standing
//! (alert scan, dashboard stats, exported report labels) goes through
//! [`classify`] so the thresholds live in exactly one place.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Days before expiration during which a certification requires attention.
pub const ATTENTION_WINDOW_DAYS: i64 = 30;

/// Soft horizon used by exported company reports to hint at upcoming
/// renewals. Label text only; it never drives alerting.
pub const REPORT_SOFT_WINDOW_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificationStatus {
    Critical,
    Attention,
    Vigent,
}

impl CertificationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "Crítico",
            Self::Attention => "En atención",
            Self::Vigent => "Vigente",
        }
    }

    /// Severity line used in alert e-mails sent to companies.
    pub const fn alert_label(self) -> &'static str {
        match self {
            Self::Critical => "Crítico (vencida)",
            Self::Attention => "En atención (vence pronto)",
            Self::Vigent => "Vigente",
        }
    }
}

/// Outcome of classifying a single expiration date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusInfo {
    pub status: CertificationStatus,
    /// Whole days until expiration; negative once expired, `None` when no
    /// date is registered.
    pub days_remaining: Option<i64>,
    /// Human-readable tooltip text shown next to the status badge.
    pub message: String,
}

/// Classify an expiration date against a reference day.
///
/// Working on `NaiveDate` keeps time-of-day out of the arithmetic entirely, so
/// the same certification classifies identically no matter what hour a batch
/// job runs. A certification expiring today counts as critical; a missing
/// date is treated as attention so it surfaces for human review instead of
/// silently passing as vigent.
pub fn classify(expiration: Option<NaiveDate>, today: NaiveDate) -> StatusInfo {
    let Some(expires_on) = expiration else {
        return StatusInfo {
            status: CertificationStatus::Attention,
            days_remaining: None,
            message: "Sin fecha de vencimiento registrada.".to_string(),
        };
    };

    let days = (expires_on - today).num_days();
    let date_text = format_short(expires_on);

    let (status, message) = if days < 0 {
        let elapsed = days.abs();
        let message = if elapsed == 1 {
            format!("Venció hace 1 día ({date_text}).")
        } else {
            format!("Venció hace {elapsed} días ({date_text}).")
        };
        (CertificationStatus::Critical, message)
    } else if days == 0 {
        (
            CertificationStatus::Critical,
            format!("Vence hoy ({date_text})."),
        )
    } else if days <= ATTENTION_WINDOW_DAYS {
        let message = if days == 1 {
            format!("Vence en 1 día ({date_text}).")
        } else {
            format!("Vence en {days} días ({date_text}).")
        };
        (CertificationStatus::Attention, message)
    } else {
        (
            CertificationStatus::Vigent,
            format!("Vence el {date_text}."),
        )
    };

    StatusInfo {
        status,
        days_remaining: Some(days),
        message,
    }
}

/// Label printed on exported company reports. Certifications in good standing
/// but inside the 90-day horizon get a softer renewal hint; the alerting
/// severities pass through untouched.
pub fn report_label(expiration: Option<NaiveDate>, today: NaiveDate) -> &'static str {
    let info = classify(expiration, today);
    match (info.status, info.days_remaining) {
        (CertificationStatus::Vigent, Some(days)) if days <= REPORT_SOFT_WINDOW_DAYS => {
            "Vigente (renovar pronto)"
        }
        (status, _) => status.label(),
    }
}

/// Per-status counts backing the dashboard header cards.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBreakdown {
    pub total: usize,
    pub critical: usize,
    pub attention: usize,
    pub vigent: usize,
}

/// Tally a collection of expiration dates into dashboard counts.
pub fn breakdown<I>(expirations: I, today: NaiveDate) -> StatusBreakdown
where
    I: IntoIterator<Item = Option<NaiveDate>>,
{
    let mut stats = StatusBreakdown::default();
    for expiration in expirations {
        stats.total += 1;
        match classify(expiration, today).status {
            CertificationStatus::Critical => stats.critical += 1,
            CertificationStatus::Attention => stats.attention += 1,
            CertificationStatus::Vigent => stats.vigent += 1,
        }
    }
    stats
}

// es-CL short date, day first.
fn format_short(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}
