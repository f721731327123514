//! Spanish-language e-mail content for company alert batches.

use super::repository::CompanyAlert;

/// Display name used on outbound alert mail.
pub const SENDER_NAME: &str = "Rigging & Lifting Training SpA";

/// Rendered subject and plain-text body, ready for any transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEmail {
    pub subject: String,
    pub body: String,
}

pub fn render_alert_email(alert: &CompanyAlert) -> AlertEmail {
    let subject = format!(
        "Alertas de certificaciones en estado crítico / en atención – {}",
        alert.company_name
    );

    let mut lines = Vec::with_capacity(alert.lines.len() + 9);
    lines.push("Estimado(a),".to_string());
    lines.push(String::new());
    lines.push(format!(
        "Hay certificaciones en estado CRÍTICO o EN ATENCIÓN para su empresa: {}.",
        alert.company_name
    ));
    lines.push(String::new());
    lines.push("Detalle:".to_string());
    for entry in &alert.lines {
        lines.push(format!(
            "- {} | Trabajador: {} ({}) | CT: {} | Vence: {} | Estado: {}",
            entry.course,
            entry.worker_name,
            entry.worker_national_id,
            entry.work_center,
            entry.expires_on.format("%Y-%m-%d"),
            entry.status.alert_label(),
        ));
    }
    lines.push(String::new());
    lines.push(
        "Puede solicitar recertificación desde el panel de control de la empresa o respondiendo a este correo."
            .to_string(),
    );
    lines.push(String::new());
    lines.push("Atentamente,".to_string());
    lines.push(SENDER_NAME.to_string());

    AlertEmail {
        subject,
        body: lines.join("\n"),
    }
}
