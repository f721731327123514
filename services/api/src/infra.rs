use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use certwatch::certifications::{
    AlertCheckRecord, AlertFlagUpdate, Certification, CertificationId, CertificationStore, Company,
    CompanyId, StoreError, VerificationView, Worker,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Certification store backed by process memory. Stands in for the database
/// adapter in demos and tests.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCertificationStore {
    records: Arc<Mutex<HashMap<CertificationId, AlertCheckRecord>>>,
}

impl InMemoryCertificationStore {
    pub(crate) fn insert(&self, record: AlertCheckRecord) {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        guard.insert(record.certification.id, record);
    }
}

impl CertificationStore for InMemoryCertificationStore {
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

/// Seeds a small roster with one company per data-quality shape: a healthy
/// contact, a company without an e-mail, and certifications across every
/// status bucket. Used by `--demo-data` and the CLI demo.
pub(crate) fn seed_demo_data(store: &InMemoryCertificationStore, today: NaiveDate) {
    let aurora = Company {
        id: CompanyId(1),
        name: "Minera Aurora SpA".to_string(),
        national_id: Some("76.543.210-8".to_string()),
        contact_email: Some("prevencion@aurora.cl".to_string()),
    };
    let lefiman = Company {
        id: CompanyId(2),
        name: "Constructora Lefimán Ltda".to_string(),
        national_id: Some("77.111.222-3".to_string()),
        contact_email: None,
    };

    let roster: [(i64, &str, &str, &str, Option<i64>, Option<&str>, &Company); 5] = [
        (
            1,
            "Ana",
            "Soto",
            "Operador de Grúa Horquilla",
            Some(-5),
            Some("RYL-2024-0001"),
            &aurora,
        ),
        (2, "Pedro", "Muñoz", "Rigger Certificado", Some(25), None, &aurora),
        (3, "Luisa", "Rojas", "Izaje Crítico", Some(78), None, &aurora),
        (4, "Mario", "Paredes", "Trabajo en Altura", None, None, &aurora),
        (5, "Carla", "Vidal", "Operador de Puente Grúa", Some(10), None, &lefiman),
    ];

    for (id, name, surname, course, offset_days, code, company) in roster {
        let expires_on = offset_days.map(|days| today + chrono::Duration::days(days));
        store.insert(AlertCheckRecord {
            certification: Certification {
                id: CertificationId(id),
                course: course.to_string(),
                issued_on: today - chrono::Duration::days(365),
                expires_on,
                verification_code: code.map(str::to_string),
                report_url: None,
                attention_alert_sent: false,
                critical_alert_sent: false,
            },
            worker: Some(Worker {
                id,
                name: name.to_string(),
                surname: surname.to_string(),
                national_id: format!("1{id}.345.678-{id}"),
                work_center: Some("Faena Norte".to_string()),
            }),
            company: Some(company.clone()),
        });
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
