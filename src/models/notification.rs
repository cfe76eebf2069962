use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope posted by the notifier to `/callback`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackEnvelope {
    pub data: PaymentNotification,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentNotification {
    pub currency: String,
    pub destination: String,
    /// A decimal string for XRP; other currencies may send an object here.
    pub amount: Value,
}

impl PaymentNotification {
    /// Amount as decimal text, accepting a bare JSON number too.
    pub fn amount_text(&self) -> Option<String> {
        match &self.amount {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}
