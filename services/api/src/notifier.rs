use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, warn};

use certwatch::certifications::email::{render_alert_email, SENDER_NAME};
use certwatch::certifications::{AlertNotifier, CompanyAlert, DispatchOutcome, NotifyError};
use certwatch::config::SmtpConfig;

/// Notifier selected at startup from the mail settings: a real SMTP
/// transport when the configuration is complete, otherwise a simulated
/// transport that only logs.
pub(crate) enum ApiNotifier {
    Smtp(SmtpNotifier),
    Simulated(SimulatedNotifier),
}

impl ApiNotifier {
    /// Never fails: an incomplete or unusable mail configuration degrades to
    /// the simulated transport so the scan endpoint stays available.
    pub(crate) fn from_config(config: &SmtpConfig) -> Self {
        if !config.is_complete() {
            info!("smtp settings incomplete, alerts will be simulated");
            return Self::Simulated(SimulatedNotifier);
        }

        match SmtpNotifier::from_config(config) {
            Ok(notifier) => Self::Smtp(notifier),
            Err(err) => {
                warn!(error = %err, "smtp transport unavailable, falling back to simulation");
                Self::Simulated(SimulatedNotifier)
            }
        }
    }
}

impl AlertNotifier for ApiNotifier {
    fn dispatch(&self, alert: &CompanyAlert) -> Result<DispatchOutcome, NotifyError> {
        match self {
            Self::Smtp(notifier) => notifier.dispatch(alert),
            Self::Simulated(notifier) => notifier.dispatch(alert),
        }
    }
}

/// Sends expiry alerts over SMTP using the shared e-mail template.
pub(crate) struct SmtpNotifier {
    transport: SmtpTransport,
    sender: Mailbox,
    cc: Option<Mailbox>,
}

impl SmtpNotifier {
    pub(crate) fn from_config(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let host = config
            .host
            .as_deref()
            .ok_or_else(|| NotifyError::Transport("smtp host missing".to_string()))?;
        let username = config
            .username
            .clone()
            .ok_or_else(|| NotifyError::Transport("smtp user missing".to_string()))?;
        let password = config
            .password
            .clone()
            .ok_or_else(|| NotifyError::Transport("smtp password missing".to_string()))?;

        let builder = if config.secure() {
            SmtpTransport::relay(host)
        } else {
            SmtpTransport::starttls_relay(host)
        }
        .map_err(|err| NotifyError::Transport(err.to_string()))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(username, password))
            .build();

        let sender_address = config
            .sender_address()
            .ok_or_else(|| NotifyError::Transport("sender address missing".to_string()))?;
        let sender = format!("{SENDER_NAME} <{sender_address}>")
            .parse::<Mailbox>()
            .map_err(|err| NotifyError::Transport(err.to_string()))?;

        let cc = config
            .cc_address
            .as_deref()
            .map(|address| {
                address
                    .parse::<Mailbox>()
                    .map_err(|err| NotifyError::Transport(err.to_string()))
            })
            .transpose()?;

        Ok(Self {
            transport,
            sender,
            cc,
        })
    }
}

impl AlertNotifier for SmtpNotifier {
    fn dispatch(&self, alert: &CompanyAlert) -> Result<DispatchOutcome, NotifyError> {
        let recipient = alert
            .contact_email
            .parse::<Mailbox>()
            .map_err(|err| NotifyError::Transport(err.to_string()))?;

        let email = render_alert_email(alert);
        let mut builder = Message::builder()
            .from(self.sender.clone())
            .to(recipient)
            .subject(email.subject)
            .header(ContentType::TEXT_PLAIN);
        if let Some(cc) = self.cc.clone() {
            builder = builder.cc(cc);
        }
        let message = builder
            .body(email.body)
            .map_err(|err| NotifyError::Transport(err.to_string()))?;

        self.transport
            .send(&message)
            .map_err(|err| NotifyError::Transport(err.to_string()))?;
        Ok(DispatchOutcome::Sent)
    }
}

/// Logs the rendered alert instead of sending it. Used whenever SMTP is not
/// fully configured, which keeps development environments quiet.
pub(crate) struct SimulatedNotifier;

impl AlertNotifier for SimulatedNotifier {
    fn dispatch(&self, alert: &CompanyAlert) -> Result<DispatchOutcome, NotifyError> {
        let email = render_alert_email(alert);
        info!(
            company = %alert.company_name,
            to = %alert.contact_email,
            certifications = alert.lines.len(),
            subject = %email.subject,
            "simulated alert e-mail"
        );
        Ok(DispatchOutcome::Simulated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certwatch::certifications::{AlertLine, CertificationId, CertificationStatus, CompanyId};
    use chrono::NaiveDate;

    fn sample_alert() -> CompanyAlert {
        CompanyAlert {
            company_id: CompanyId(1),
            company_name: "Minera Aurora SpA".to_string(),
            contact_email: "prevencion@aurora.cl".to_string(),
            lines: vec![AlertLine {
                certification_id: CertificationId(1),
                course: "Rigger Certificado".to_string(),
                worker_name: "Ana Soto".to_string(),
                worker_national_id: "12.345.678-5".to_string(),
                work_center: "Faena Norte".to_string(),
                expires_on: NaiveDate::from_ymd_opt(2024, 7, 1).expect("valid date"),
                status: CertificationStatus::Attention,
            }],
        }
    }

    #[test]
    fn incomplete_config_selects_simulation() {
        let notifier = ApiNotifier::from_config(&SmtpConfig::default());
        assert!(matches!(notifier, ApiNotifier::Simulated(_)));
    }

    #[test]
    fn simulated_dispatch_reports_its_outcome() {
        let outcome = SimulatedNotifier
            .dispatch(&sample_alert())
            .expect("simulation cannot fail");
        assert_eq!(outcome, DispatchOutcome::Simulated);
    }
}
