use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{error, info, warn};

use super::domain::{Company, CompanyId, VerificationView, Worker};
use super::repository::{
    AlertFlagUpdate, AlertLine, AlertNotifier, CertificationStore, CompanyAlert, DispatchOutcome,
    NotifyError, StoreError,
};
use super::status::{breakdown, classify, CertificationStatus, StatusBreakdown};

/// Service composing the certification store, the status classifier, and the
/// outbound notifier.
pub struct CertificationAlertService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    /// Overlapping scans could both observe an unset flag and double-notify,
    /// so a scan holds this lock for its full duration.
    scan_guard: Mutex<()>,
}

impl<S, N> CertificationAlertService<S, N>
where
    S: CertificationStore + 'static,
    N: AlertNotifier + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self {
            store,
            notifier,
            scan_guard: Mutex::new(()),
        }
    }

    /// Batch alert pass: classify every certification still missing an alert,
    /// group fresh candidates by company, dispatch one notification per
    /// company, and mark flags only after confirmed dispatch.
    ///
    /// Re-running immediately after a fully successful pass finds zero new
    /// candidates and dispatches nothing.
    pub fn scan(&self, today: NaiveDate) -> Result<ScanReport, AlertServiceError> {
        let _serialized = self.scan_guard.lock().expect("scan mutex poisoned");

        let records = self.store.fetch_needing_alert_check()?;
        let mut report = ScanReport {
            ok: true,
            ..ScanReport::default()
        };

        // BTreeMap keeps dispatch order deterministic across runs.
        let mut batches: BTreeMap<CompanyId, CompanyBatch> = BTreeMap::new();

        for record in records {
            let cert = record.certification;
            let Some(worker) = record.worker else { continue };
            let Some(company) = record.company else { continue };
            let Some(expires_on) = cert.expires_on else { continue };

            let status = classify(Some(expires_on), today).status;
            let fresh_candidate = match status {
                CertificationStatus::Attention => !cert.attention_alert_sent,
                CertificationStatus::Critical => !cert.critical_alert_sent,
                CertificationStatus::Vigent => false,
            };
            if !fresh_candidate {
                continue;
            }

            batches
                .entry(company.id)
                .or_insert_with(|| CompanyBatch::new(company))
                .lines
                .push(alert_line(&cert.id, &cert.course, &worker, expires_on, status));
        }

        for (company_id, batch) in batches {
            let Some(contact_email) = batch.company.contact_email.clone() else {
                warn!(
                    company = %batch.company.name,
                    id = %company_id,
                    "company has no contact e-mail, alert deferred to next scan"
                );
                report.skipped_companies += 1;
                continue;
            };

            let alert = CompanyAlert {
                company_id,
                company_name: batch.company.name.clone(),
                contact_email,
                lines: batch.lines,
            };

            match self.notifier.dispatch(&alert) {
                Ok(outcome) => {
                    if matches!(outcome, DispatchOutcome::Simulated) {
                        report.mocked = true;
                    }
                    report.notified_companies += 1;
                    info!(
                        company = %alert.company_name,
                        certifications = alert.lines.len(),
                        simulated = matches!(outcome, DispatchOutcome::Simulated),
                        "alert dispatched"
                    );
                    self.mark_notified(&alert, &mut report);
                }
                Err(err) => {
                    // Recoverable: the same certifications stay candidates
                    // and are retried on the next scheduled scan.
                    warn!(
                        company = %alert.company_name,
                        id = %company_id,
                        error = %err,
                        "alert dispatch failed"
                    );
                    report.dispatch_failures.push(DispatchFailure {
                        company_id,
                        company_name: alert.company_name.clone(),
                        detail: err.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    fn mark_notified(&self, alert: &CompanyAlert, report: &mut ScanReport) {
        for line in &alert.lines {
            let update = match line.status {
                CertificationStatus::Attention => AlertFlagUpdate::attention_sent(),
                CertificationStatus::Critical => AlertFlagUpdate::critical_sent(),
                CertificationStatus::Vigent => continue,
            };
            match self.store.set_alert_flags(&line.certification_id, update) {
                Ok(()) => report.notified_certifications += 1,
                Err(err) => {
                    // The notification already went out; a lost flag write
                    // means this certification re-alerts on the next scan.
                    error!(
                        certification = %line.certification_id,
                        error = %err,
                        "flag write failed after successful dispatch"
                    );
                    report.flag_write_failures += 1;
                }
            }
        }
    }

    /// Administrative bulk flag set. Marks every currently-qualifying
    /// certification as already alerted without sending anything; used to
    /// suppress an alert flood over historical records.
    ///
    /// Buckets reuse the classifier's own day counts (expired or expiring
    /// today marks critical, the 30-day window marks attention) so resync and
    /// scan can never disagree at a boundary.
    pub fn resync(&self, today: NaiveDate) -> Result<ResyncReport, AlertServiceError> {
        let records = self.store.fetch_needing_alert_check()?;
        let mut report = ResyncReport::default();

        for record in records {
            let cert = record.certification;
            let Some(expires_on) = cert.expires_on else { continue };

            match classify(Some(expires_on), today).status {
                CertificationStatus::Critical if !cert.critical_alert_sent => {
                    self.store
                        .set_alert_flags(&cert.id, AlertFlagUpdate::critical_sent())?;
                    report.critical_marked += 1;
                }
                CertificationStatus::Attention if !cert.attention_alert_sent => {
                    self.store
                        .set_alert_flags(&cert.id, AlertFlagUpdate::attention_sent())?;
                    report.attention_marked += 1;
                }
                _ => {}
            }
        }

        info!(
            critical = report.critical_marked,
            attention = report.attention_marked,
            "alert flag resync completed"
        );
        Ok(report)
    }

    /// Dashboard counts over every stored certification.
    pub fn stats(&self, today: NaiveDate) -> Result<StatusBreakdown, AlertServiceError> {
        Ok(breakdown(self.store.expirations()?, today))
    }

    /// Diploma verification lookup by QR code.
    pub fn verify(&self, code: &str) -> Result<Option<VerificationView>, AlertServiceError> {
        Ok(self.store.find_by_verification_code(code)?)
    }
}

struct CompanyBatch {
    company: Company,
    lines: Vec<AlertLine>,
}

impl CompanyBatch {
    fn new(company: Company) -> Self {
        Self {
            company,
            lines: Vec::new(),
        }
    }
}

fn alert_line(
    id: &super::domain::CertificationId,
    course: &str,
    worker: &Worker,
    expires_on: NaiveDate,
    status: CertificationStatus,
) -> AlertLine {
    AlertLine {
        certification_id: *id,
        course: course.to_string(),
        worker_name: worker.full_name(),
        worker_national_id: worker.national_id.clone(),
        work_center: worker.work_center.clone().unwrap_or_default(),
        expires_on,
        status,
    }
}

/// Summary returned by the scan endpoint and the CLI.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ScanReport {
    pub ok: bool,
    /// True when at least one dispatch ran through the simulated transport.
    pub mocked: bool,
    pub notified_companies: usize,
    pub notified_certifications: usize,
    pub skipped_companies: usize,
    pub flag_write_failures: usize,
    pub dispatch_failures: Vec<DispatchFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchFailure {
    pub company_id: CompanyId,
    pub company_name: String,
    pub detail: String,
}

/// Summary printed by the operator resync command.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResyncReport {
    pub critical_marked: usize,
    pub attention_marked: usize,
}

/// Error raised by the alert service.
#[derive(Debug, thiserror::Error)]
pub enum AlertServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}
