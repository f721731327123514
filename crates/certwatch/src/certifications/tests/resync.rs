use super::common::{build_service, certification, company, date, record, today, worker};
use crate::certifications::service::ResyncReport;

#[test]
fn resync_marks_buckets_without_notifying() {
    let (service, store, notifier) = build_service(vec![
        record(
            certification(1, "Operador de Grúa Horquilla", Some(date(2024, 6, 10))),
            Some(worker(1, "Ana", "Soto")),
            Some(company(1, "Minera Aurora SpA", Some("prevencion@aurora.cl"))),
        ),
        record(
            certification(2, "Rigger Certificado", Some(date(2024, 7, 10))),
            Some(worker(2, "Pedro", "Muñoz")),
            Some(company(1, "Minera Aurora SpA", Some("prevencion@aurora.cl"))),
        ),
        record(
            certification(3, "Izaje Crítico", Some(date(2024, 9, 1))),
            Some(worker(3, "Luisa", "Rojas")),
            Some(company(2, "Constructora Lefimán Ltda", None)),
        ),
    ]);

    let report = service.resync(today()).expect("resync completes");

    assert_eq!(
        report,
        ResyncReport {
            critical_marked: 1,
            attention_marked: 1,
        }
    );
    assert!(notifier.dispatched().is_empty());
    assert_eq!(store.flags(1), (false, true));
    assert_eq!(store.flags(2), (true, false));
    assert_eq!(store.flags(3), (false, false));
}

#[test]
fn resync_ignores_flags_already_set() {
    let mut expired = certification(1, "Trabajo en Altura", Some(date(2024, 6, 1)));
    expired.critical_alert_sent = true;

    let (service, _store, _notifier) = build_service(vec![record(
        expired,
        Some(worker(1, "Ana", "Soto")),
        Some(company(1, "Minera Aurora SpA", None)),
    )]);

    let report = service.resync(today()).expect("resync completes");
    assert_eq!(report.critical_marked, 0);
    assert_eq!(report.attention_marked, 0);
}

#[test]
fn resync_twice_marks_nothing_on_the_second_pass() {
    let (service, _store, _notifier) = build_service(vec![record(
        certification(1, "Rigger Certificado", Some(date(2024, 7, 1))),
        Some(worker(1, "Ana", "Soto")),
        Some(company(1, "Minera Aurora SpA", Some("prevencion@aurora.cl"))),
    )]);

    let first = service.resync(today()).expect("first resync");
    assert_eq!(first.attention_marked, 1);

    let second = service.resync(today()).expect("second resync");
    assert_eq!(second, ResyncReport::default());
}

#[test]
fn resync_skips_certifications_without_expiration_date() {
    let (service, store, _notifier) = build_service(vec![record(
        certification(1, "Rigger Certificado", None),
        Some(worker(1, "Ana", "Soto")),
        Some(company(1, "Minera Aurora SpA", Some("prevencion@aurora.cl"))),
    )]);

    let report = service.resync(today()).expect("resync completes");
    assert_eq!(report, ResyncReport::default());
    assert_eq!(store.flags(1), (false, false));
}

#[test]
fn boundary_day_lands_in_exactly_one_bucket() {
    // Expires today -> critical bucket; exactly 30 days out -> attention.
    let (service, store, _notifier) = build_service(vec![
        record(
            certification(1, "Izaje Crítico", Some(today())),
            Some(worker(1, "Ana", "Soto")),
            Some(company(1, "Minera Aurora SpA", None)),
        ),
        record(
            certification(2, "Izaje Crítico", Some(date(2024, 7, 15))),
            Some(worker(2, "Pedro", "Muñoz")),
            Some(company(1, "Minera Aurora SpA", None)),
        ),
    ]);

    let report = service.resync(today()).expect("resync completes");
    assert_eq!(report.critical_marked, 1);
    assert_eq!(report.attention_marked, 1);
    assert_eq!(store.flags(1), (false, true));
    assert_eq!(store.flags(2), (true, false));
}
