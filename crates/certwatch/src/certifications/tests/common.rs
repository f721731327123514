use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::certifications::domain::{
    AlertCheckRecord, Certification, CertificationId, Company, CompanyId, VerificationView, Worker,
};
use crate::certifications::repository::{
    AlertFlagUpdate, AlertNotifier, CertificationStore, CompanyAlert, DispatchOutcome, NotifyError,
    StoreError,
};
use crate::certifications::service::CertificationAlertService;

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Reference day used across scenarios; matches the worked example in the
/// operations runbook.
pub(super) fn today() -> NaiveDate {
    date(2024, 6, 15)
}

pub(super) fn worker(id: i64, name: &str, surname: &str) -> Worker {
    Worker {
        id,
        name: name.to_string(),
        surname: surname.to_string(),
        national_id: format!("{id}.111.222-3"),
        work_center: Some("Faena Norte".to_string()),
    }
}

pub(super) fn company(id: i64, name: &str, contact_email: Option<&str>) -> Company {
    Company {
        id: CompanyId(id),
        name: name.to_string(),
        national_id: Some("76.543.210-K".to_string()),
        contact_email: contact_email.map(str::to_string),
    }
}

pub(super) fn certification(id: i64, course: &str, expires_on: Option<NaiveDate>) -> Certification {
    Certification {
        id: CertificationId(id),
        course: course.to_string(),
        issued_on: date(2023, 6, 15),
        expires_on,
        verification_code: None,
        report_url: None,
        attention_alert_sent: false,
        critical_alert_sent: false,
    }
}

pub(super) fn record(
    certification: Certification,
    worker: Option<Worker>,
    company: Option<Company>,
) -> AlertCheckRecord {
    AlertCheckRecord {
        certification,
        worker,
        company,
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    records: Arc<Mutex<HashMap<CertificationId, AlertCheckRecord>>>,
    pub(super) fail_flag_writes: Arc<Mutex<bool>>,
}

impl MemoryStore {
    pub(super) fn with_records(records: Vec<AlertCheckRecord>) -> Self {
        let store = Self::default();
        for record in records {
            store.insert(record);
        }
        store
    }

    pub(super) fn insert(&self, record: AlertCheckRecord) {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .insert(record.certification.id, record);
    }

    pub(super) fn flags(&self, id: i64) -> (bool, bool) {
        let guard = self.records.lock().expect("store mutex poisoned");
        let record = guard
            .get(&CertificationId(id))
            .expect("certification present");
        (
            record.certification.attention_alert_sent,
            record.certification.critical_alert_sent,
        )
    }

    pub(super) fn break_flag_writes(&self) {
        *self.fail_flag_writes.lock().expect("store mutex poisoned") = true;
    }
}

impl CertificationStore for MemoryStore {
    fn fetch_needing_alert_check(&self) -> Result<Vec<AlertCheckRecord>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        let mut records: Vec<AlertCheckRecord> = guard
            .values()
            .filter(|record| {
                !(record.certification.attention_alert_sent
                    && record.certification.critical_alert_sent)
            })
            .cloned()
            .collect();
        records.sort_by_key(|record| record.certification.id);
        Ok(records)
    }

    fn set_alert_flags(
        &self,
        id: &CertificationId,
        update: AlertFlagUpdate,
    ) -> Result<(), StoreError> {
        if *self.fail_flag_writes.lock().expect("store mutex poisoned") {
            return Err(StoreError::Unavailable("flag write rejected".to_string()));
        }
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let record = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        if let Some(value) = update.attention_alert_sent {
            record.certification.attention_alert_sent = value;
        }
        if let Some(value) = update.critical_alert_sent {
            record.certification.critical_alert_sent = value;
        }
        Ok(())
    }

    fn find_by_verification_code(
        &self,
        code: &str,
    ) -> Result<Option<VerificationView>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.values().find_map(|record| {
            let cert = &record.certification;
            if cert.verification_code.as_deref() != Some(code) {
                return None;
            }
            let worker = record.worker.as_ref()?;
            Some(VerificationView {
                worker: worker.full_name(),
                national_id: worker.national_id.clone(),
                course: cert.course.clone(),
                expires_on: cert.expires_on,
                work_center: worker.work_center.clone(),
            })
        }))
    }

    fn expirations(&self) -> Result<Vec<Option<NaiveDate>>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard
            .values()
            .map(|record| record.certification.expires_on)
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct RecordingNotifier {
    dispatched: Arc<Mutex<Vec<CompanyAlert>>>,
}

impl RecordingNotifier {
    pub(super) fn dispatched(&self) -> Vec<CompanyAlert> {
        self.dispatched.lock().expect("notifier mutex poisoned").clone()
    }
}

impl AlertNotifier for RecordingNotifier {
    fn dispatch(&self, alert: &CompanyAlert) -> Result<DispatchOutcome, NotifyError> {
        self.dispatched
            .lock()
            .expect("notifier mutex poisoned")
            .push(alert.clone());
        Ok(DispatchOutcome::Sent)
    }
}

/// Fails dispatch for one company and records everything else.
pub(super) struct FlakyNotifier {
    pub(super) failing_company: CompanyId,
    pub(super) inner: RecordingNotifier,
}

impl AlertNotifier for FlakyNotifier {
    fn dispatch(&self, alert: &CompanyAlert) -> Result<DispatchOutcome, NotifyError> {
        if alert.company_id == self.failing_company {
            return Err(NotifyError::Timeout(30));
        }
        self.inner.dispatch(alert)
    }
}

pub(super) fn build_service(
    records: Vec<AlertCheckRecord>,
) -> (
    CertificationAlertService<MemoryStore, RecordingNotifier>,
    MemoryStore,
    RecordingNotifier,
) {
    let store = MemoryStore::with_records(records);
    let notifier = RecordingNotifier::default();
    let service = CertificationAlertService::new(
        Arc::new(store.clone()),
        Arc::new(notifier.clone()),
    );
    (service, store, notifier)
}
