use crate::{
    error::BadgeError,
    models::{parse_amount, CallbackEnvelope, PaymentRecord, SETTLEMENT_CURRENCY},
    services::{Clock, RecordStore},
};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum CallbackOutcome {
    Recorded(PaymentRecord),
    /// Valid notification in a currency the badges do not track.
    Ignored { currency: String },
}

/// Turns a confirmed callback body into a store update.
pub struct EventProcessor {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
}

impl EventProcessor {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Must only be called on bodies the verifier has confirmed.
    pub async fn process(&self, raw_body: &[u8]) -> Result<CallbackOutcome, BadgeError> {
        let envelope: CallbackEnvelope = serde_json::from_slice(raw_body)?;
        let notification = envelope.data;

        if notification.currency != SETTLEMENT_CURRENCY {
            tracing::debug!(
                "Ignoring {} payment to {}",
                notification.currency,
                notification.destination
            );
            return Ok(CallbackOutcome::Ignored {
                currency: notification.currency,
            });
        }

        if notification.destination.is_empty() {
            return Err(BadgeError::MalformedPayload(
                "Empty destination".to_string(),
            ));
        }

        let amount_text = notification.amount_text().ok_or_else(|| {
            BadgeError::MalformedPayload(format!(
                "{} amount is not a decimal: {}",
                SETTLEMENT_CURRENCY, notification.amount
            ))
        })?;
        let amount = parse_amount(&amount_text)?;

        let record = PaymentRecord::new(notification.destination, amount, self.clock.now())
            .with_amount_text(amount_text.trim());
        self.store.put(&record).await?;

        tracing::info!(
            "Payment recorded: {} {} to {}",
            amount_text,
            SETTLEMENT_CURRENCY,
            record.recipient
        );

        Ok(CallbackOutcome::Recorded(record))
    }
}
