use crate::infra::{parse_date, seed_demo_data, InMemoryCertificationStore};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::sync::{Arc, Mutex};

use certwatch::certifications::email::render_alert_email;
use certwatch::certifications::{
    AlertNotifier, CertificationAlertService, CompanyAlert, DispatchOutcome, NotifyError,
    ScanReport,
};
use certwatch::error::AppError;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date for the demo (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the full rendered alert e-mails instead of summaries.
    #[arg(long)]
    pub(crate) show_emails: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ScanArgs {
    /// Evaluation date for the scan (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ResyncArgs {
    /// Evaluation date for the resync (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

/// Notifier that records every alert so the demo can show what would have
/// been sent.
#[derive(Default, Clone)]
struct CapturingNotifier {
    dispatched: Arc<Mutex<Vec<CompanyAlert>>>,
}

impl CapturingNotifier {
    fn dispatched(&self) -> Vec<CompanyAlert> {
        self.dispatched.lock().expect("demo mutex poisoned").clone()
    }
}

impl AlertNotifier for CapturingNotifier {
    fn dispatch(&self, alert: &CompanyAlert) -> Result<DispatchOutcome, NotifyError> {
        self.dispatched
            .lock()
            .expect("demo mutex poisoned")
            .push(alert.clone());
        Ok(DispatchOutcome::Simulated)
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, show_emails } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    println!("Certification alert demo (evaluated {today})");

    let store = InMemoryCertificationStore::default();
    seed_demo_data(&store, today);
    let notifier = CapturingNotifier::default();
    let service = Arc::new(CertificationAlertService::new(
        Arc::new(store),
        Arc::new(notifier.clone()),
    ));

    let stats = service.stats(today)?;
    println!("\nCertification status breakdown");
    println!("- total: {}", stats.total);
    println!("- critical: {}", stats.critical);
    println!("- attention: {}", stats.attention);
    println!("- vigent: {}", stats.vigent);

    println!("\nFirst alert scan");
    let report = service.scan(today)?;
    render_scan_report(&report);

    for alert in notifier.dispatched() {
        let email = render_alert_email(&alert);
        println!(
            "\nAlert for {} -> {} ({} certification(s))",
            alert.company_name,
            alert.contact_email,
            alert.lines.len()
        );
        println!("  Subject: {}", email.subject);
        if show_emails {
            println!("{}", email.body);
        } else {
            for line in &alert.lines {
                println!(
                    "  - {} | {} | vence {}",
                    line.course, line.worker_name, line.expires_on
                );
            }
        }
    }

    println!("\nSecond scan on the same day (idempotence check)");
    let repeat = service.scan(today)?;
    render_scan_report(&repeat);

    let verification = service.verify("RYL-2024-0001")?;
    match verification {
        Some(view) => println!(
            "\nDiploma RYL-2024-0001 -> {} ({}), curso {}",
            view.worker, view.national_id, view.course
        ),
        None => println!("\nDiploma RYL-2024-0001 not found"),
    }

    Ok(())
}

/// Seeds the demo roster and runs one alert scan, using the real SMTP
/// transport when configured and the simulated one otherwise.
pub(crate) fn run_scan(args: ScanArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let config = certwatch::config::AppConfig::load()?;

    let store = InMemoryCertificationStore::default();
    seed_demo_data(&store, today);
    let notifier = crate::notifier::ApiNotifier::from_config(&config.smtp);
    let service = CertificationAlertService::new(Arc::new(store), Arc::new(notifier));

    let report = service.scan(today)?;
    println!("Alert scan (evaluated {today})");
    render_scan_report(&report);

    Ok(())
}

/// Seeds the demo roster and runs the administrative flag resync so an
/// operator can preview what the bulk flag set would mark.
pub(crate) fn run_resync(args: ResyncArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let store = InMemoryCertificationStore::default();
    seed_demo_data(&store, today);
    let service = CertificationAlertService::new(Arc::new(store), Arc::new(CapturingNotifier::default()));

    let report = service.resync(today)?;
    println!("Alert flag resync (evaluated {today})");
    println!("- critical marked: {}", report.critical_marked);
    println!("- attention marked: {}", report.attention_marked);
    println!("No e-mail was sent.");

    Ok(())
}

fn render_scan_report(report: &ScanReport) {
    println!(
        "- companies notified: {} | certifications marked: {} | companies skipped: {}",
        report.notified_companies, report.notified_certifications, report.skipped_companies
    );
    if report.mocked {
        println!("- transport: simulated (no SMTP credentials)");
    }
    if report.flag_write_failures > 0 {
        println!("- flag write failures: {}", report.flag_write_failures);
    }
    for failure in &report.dispatch_failures {
        println!(
            "- dispatch failed for {}: {}",
            failure.company_name, failure.detail
        );
    }
}
