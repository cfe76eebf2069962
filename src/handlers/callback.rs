use crate::{app::AppState, error::BadgeError, services::CallbackOutcome};
use axum::{body::Bytes, extract::State};

/// Called by the notifier for every configured payment event.
///
/// The raw body is confirmed with the receipt service before it is parsed.
/// Once confirmed, the reply is `OK` even for ignored currencies so the
/// event is not delivered again.
pub async fn payment_callback(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, BadgeError> {
    if !state.verifier.confirm(&body).await {
        return Err(BadgeError::ValidationFailed);
    }

    match state.processor.process(&body).await? {
        CallbackOutcome::Recorded(record) => {
            tracing::debug!("Callback recorded for {}", record.recipient);
        }
        CallbackOutcome::Ignored { currency } => {
            tracing::debug!("Callback ignored ({})", currency);
        }
    }

    Ok("OK")
}
