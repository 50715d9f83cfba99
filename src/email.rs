use crate::error::JanitorError;
use crate::pipeline::RunReport;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::collections::HashMap;

const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub recipient: String,
}

impl EmailConfig {
    /// `None` unless all of SMTP_USER, SMTP_PASS and RECIPIENT_EMAIL are set.
    #[must_use]
    pub fn from_map(map: &HashMap<String, String>) -> Option<Self> {
        Some(EmailConfig {
            smtp_host: map
                .get("SMTP_HOST")
                .cloned()
                .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            smtp_user: map.get("SMTP_USER")?.clone(),
            smtp_pass: map.get("SMTP_PASS")?.clone(),
            recipient: map.get("RECIPIENT_EMAIL")?.clone(),
        })
    }
}

#[must_use]
pub fn summary_message(share: &str, report: &RunReport) -> (String, String) {
    let status = if report.summary.failed > 0 {
        "PARTIAL"
    } else {
        "OK"
    };
    let subject = format!("[Share Janitor] {status}: cleanup of {share}");

    let mut body = format!(
        "Cleanup run on {share} finished.\n\n\
         Files found:     {}\n\
         Expired:         {}\n\
         Deleted:         {}\n\
         Failed:          {}\n\
         Unparsed times:  {}\n\
         Report:          {}\n",
        report.discovered,
        report.expired.len(),
        report.summary.succeeded,
        report.summary.failed,
        report.unparsed_timestamps,
        report.report_path,
    );
    if report.dry_run {
        body.push_str("\nDry run: nothing was deleted.\n");
    }

    let failures: Vec<_> = report.outcomes.iter().filter(|o| !o.succeeded).collect();
    if !failures.is_empty() {
        body.push_str("\nFailed deletions:\n");
        for f in failures {
            body.push_str(&format!(
                "  - {}: {}\n",
                f.relative_path,
                f.error_message.as_deref().unwrap_or("unknown error")
            ));
        }
    }
    (subject, body)
}

/// Builds the summary email for one run.
pub fn build_summary(
    share: &str,
    report: &RunReport,
    config: &EmailConfig,
) -> Result<Message, JanitorError> {
    let from: Mailbox = config.smtp_user.parse().map_err(|e| {
        JanitorError::Notify(format!("invalid sender address '{}': {e}", config.smtp_user))
    })?;
    let to: Mailbox = config.recipient.parse().map_err(|e| {
        JanitorError::Notify(format!("invalid recipient address '{}': {e}", config.recipient))
    })?;
    let (subject, body) = summary_message(share, report);

    Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .body(body)
        .map_err(|e| JanitorError::Notify(format!("cannot build summary email: {e}")))
}

/// Mails the run summary. Delivery problems are logged; they never fail the run.
pub fn send_summary(share: &str, report: &RunReport, config: &EmailConfig) {
    let result = build_summary(share, report, config).and_then(|message| {
        let creds = Credentials::new(config.smtp_user.clone(), config.smtp_pass.clone());
        SmtpTransport::relay(&config.smtp_host)
            .map_err(|e| JanitorError::Notify(format!("SMTP relay {}: {e}", config.smtp_host)))?
            .credentials(creds)
            .build()
            .send(&message)
            .map_err(|e| JanitorError::Notify(format!("delivery failed: {e}")))
    });

    match result {
        Ok(_) => log::info!("Summary email sent to {}", config.recipient),
        Err(e) => log::warn!("Summary email not sent: {e}"),
    }
}
