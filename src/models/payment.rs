use crate::error::BadgeError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The only settlement currency that updates a badge.
pub const SETTLEMENT_CURRENCY: &str = "XRP";

/// How long after a qualifying payment a badge stays powered.
pub const FRESHNESS_WINDOW_SECS: i64 = 24 * 3600;

/// Latest qualifying payment seen for one recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub recipient: String,
    pub amount: f64,
    /// Decimal text as the notifier sent it; this is what gets stored.
    pub amount_text: String,
    pub observed_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn new(recipient: impl Into<String>, amount: f64, observed_at: DateTime<Utc>) -> Self {
        Self {
            recipient: recipient.into(),
            amount,
            amount_text: amount.to_string(),
            observed_at,
        }
    }

    pub fn with_amount_text(mut self, amount_text: impl Into<String>) -> Self {
        self.amount_text = amount_text.into();
        self
    }

    /// True while `now` is strictly less than 24 hours past `observed_at`.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.observed_at) < Duration::seconds(FRESHNESS_WINDOW_SECS)
    }
}

/// Parses a decimal amount string as sent by the notifier.
pub fn parse_amount(raw: &str) -> Result<f64, BadgeError> {
    let amount: f64 = raw
        .trim()
        .parse()
        .map_err(|_| BadgeError::MalformedPayload(format!("Invalid amount: {}", raw)))?;

    if !amount.is_finite() || amount < 0.0 {
        return Err(BadgeError::MalformedPayload(format!(
            "Amount must be a non-negative decimal: {}",
            raw
        )));
    }

    Ok(amount)
}
