use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::domain::models::attendee::Attendee;
use crate::domain::models::sent_email::NewSentEmail;
use crate::domain::ports::{
    AttendeeRepository, MailTransport, OutboundEmail, SendOutcome, SentEmailRepository,
};
use crate::domain::services::renderer::{MessageRenderer, CREDITS_SUBJECT};
use crate::domain::services::retry::{exponential_backoff, send_with_retry};
use crate::error::AppError;

/// Process-level sender identity, resolved from configuration once at
/// startup and validated when a run starts.
#[derive(Debug, Clone)]
pub struct SenderIdentity {
    pub from_address: String,
    pub from_display_name: Option<String>,
}

impl SenderIdentity {
    /// RFC 5322 style `Name <addr>` header value, or the bare address.
    pub fn header_value(&self) -> String {
        match &self.from_display_name {
            Some(name) => format!("{} <{}>", name, self.from_address),
            None => self.from_address.clone(),
        }
    }
}

/// Timing and retry knobs. Production defaults follow the provider quota:
/// 3 attempts with a 2s doubling backoff, 600ms between recipients.
#[derive(Debug, Clone)]
pub struct DispatchTuning {
    pub max_attempts: u32,
    pub retry_base: Duration,
    pub send_gap: Duration,
}

impl Default for DispatchTuning {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_base: Duration::from_secs(2),
            send_gap: Duration::from_millis(600),
        }
    }
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct DispatchSummary {
    pub success_count: u32,
    pub error_count: u32,
    /// Emails the provider confirmed but whose flag/ledger write-back failed.
    /// Kept out of both other counts so the operator can follow up on the
    /// inconsistent rows specifically.
    pub unrecorded_count: u32,
}

/// Orchestrates one dispatch run: eligibility selection, per-recipient
/// render, rate-limited send with retry, ledger/flag write-back and the run
/// summary. Recipients are processed strictly sequentially in store order;
/// no failure of a single recipient ever aborts the run.
pub struct DispatchEngine {
    attendee_repo: Arc<dyn AttendeeRepository>,
    ledger_repo: Arc<dyn SentEmailRepository>,
    transport: Arc<dyn MailTransport>,
    renderer: MessageRenderer,
    sender: Option<SenderIdentity>,
    default_event_name: Option<String>,
    tuning: DispatchTuning,
    run_lock: Mutex<()>,
    cancel_requested: AtomicBool,
}

impl DispatchEngine {
    pub fn new(
        attendee_repo: Arc<dyn AttendeeRepository>,
        ledger_repo: Arc<dyn SentEmailRepository>,
        transport: Arc<dyn MailTransport>,
        renderer: MessageRenderer,
        sender: Option<SenderIdentity>,
        default_event_name: Option<String>,
        tuning: DispatchTuning,
    ) -> Self {
        Self {
            attendee_repo,
            ledger_repo,
            transport,
            renderer,
            sender,
            default_event_name,
            tuning,
            run_lock: Mutex::new(()),
            cancel_requested: AtomicBool::new(false),
        }
    }

    /// Cooperative cancellation: the running loop checks this flag between
    /// recipients and stops before picking up the next one. The recipient in
    /// flight always completes, so write-back ordering is never interrupted.
    pub fn request_cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }

    /// One dispatch run. Fails the whole call, before any send, when the
    /// resolved event name is empty or no sender identity is configured.
    /// Overlapping invocations are rejected so the same recipient can never
    /// be double-sent by an operator double-click.
    pub async fn send_emails(&self, event_name: Option<&str>) -> Result<DispatchSummary, AppError> {
        let event_name = event_name
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .or_else(|| self.default_event_name.clone())
            .ok_or_else(|| AppError::Validation("event name is required".to_string()))?;

        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| AppError::Config("MAIL_FROM is not configured".to_string()))?
            .clone();

        let _run_guard = self
            .run_lock
            .try_lock()
            .map_err(|_| AppError::Conflict("A dispatch run is already in progress".to_string()))?;
        self.cancel_requested.store(false, Ordering::SeqCst);

        let span = info_span!("dispatch_run", event_name = %event_name);
        self.process_run(&event_name, &sender).instrument(span).await
    }

    async fn process_run(
        &self,
        event_name: &str,
        sender: &SenderIdentity,
    ) -> Result<DispatchSummary, AppError> {
        let recipients = self.attendee_repo.select_eligible().await?;
        info!(count = recipients.len(), "selected eligible recipients");

        let mut summary = DispatchSummary::default();
        let last_index = recipients.len().saturating_sub(1);

        for (index, attendee) in recipients.iter().enumerate() {
            if index > 0 && self.cancel_requested.load(Ordering::SeqCst) {
                warn!(
                    processed = index,
                    remaining = recipients.len() - index,
                    "dispatch run cancelled between recipients"
                );
                break;
            }

            self.process_recipient(attendee, event_name, sender, &mut summary)
                .await;

            // Inter-send pause to stay under the provider's send quota. Not
            // needed after the last recipient, nor when a cancel is already
            // pending and the next iteration will only stop.
            if index < last_index && !self.cancel_requested.load(Ordering::SeqCst) {
                sleep(self.tuning.send_gap).await;
            }
        }

        info!(
            success_count = summary.success_count,
            error_count = summary.error_count,
            unrecorded_count = summary.unrecorded_count,
            "dispatch run complete"
        );
        Ok(summary)
    }

    async fn process_recipient(
        &self,
        attendee: &Attendee,
        event_name: &str,
        sender: &SenderIdentity,
        summary: &mut DispatchSummary,
    ) {
        info!(attendee_id = attendee.id, email = %attendee.email, "recipient selected");

        // Selection already filtered on these, re-check anyway: a blank email
        // or code must never reach the transport.
        let code = match attendee.assigned_code.as_deref() {
            Some(code) if !code.trim().is_empty() && !attendee.email.trim().is_empty() => code,
            _ => {
                warn!(attendee_id = attendee.id, "skipping recipient with blank email or code");
                summary.error_count += 1;
                return;
            }
        };

        debug!(attendee_id = attendee.id, "rendering message body");
        let html_body = match self.renderer.render(&attendee.first_name, code, event_name) {
            Ok(html) => html,
            Err(e) => {
                warn!(attendee_id = attendee.id, error = %e, "render failed");
                summary.error_count += 1;
                return;
            }
        };

        let outbound = OutboundEmail {
            from: sender.header_value(),
            to: attendee.email.clone(),
            subject: CREDITS_SUBJECT.to_string(),
            html_body,
        };

        let outcome = send_with_retry(
            || self.transport.send(&outbound),
            self.tuning.max_attempts,
            exponential_backoff(self.tuning.retry_base),
        )
        .await;

        match outcome {
            SendOutcome::Delivered { message_id } => {
                info!(attendee_id = attendee.id, %message_id, "delivered");
                match self.record_delivery(attendee, code, event_name).await {
                    Ok(()) => summary.success_count += 1,
                    Err(e) => {
                        // Email is out but the store doesn't know. Worse than
                        // a plain send failure, so it gets its own counter.
                        error!(
                            attendee_id = attendee.id,
                            email = %attendee.email,
                            error = %e,
                            "delivered but not recorded, operator follow-up required"
                        );
                        summary.unrecorded_count += 1;
                    }
                }
            }
            SendOutcome::Failed { kind, .. } => {
                warn!(attendee_id = attendee.id, ?kind, "send failed after all attempts");
                summary.error_count += 1;
            }
        }
    }

    /// Ledger append happens before the flag update: a crash between the two
    /// leaves a re-eligible attendee with a ledger entry, never a sent flag
    /// without one.
    async fn record_delivery(
        &self,
        attendee: &Attendee,
        code: &str,
        event_name: &str,
    ) -> Result<(), AppError> {
        let record = NewSentEmail::from_delivery(attendee, code, event_name);
        self.ledger_repo.append(&record).await?;
        self.attendee_repo.mark_sent(attendee.id).await?;
        Ok(())
    }
}
