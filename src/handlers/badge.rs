use crate::{
    app::AppState,
    error::BadgeError,
    services::{needs_compat_mode, render_badge},
};
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};

const SAMPLE_AMOUNT: f64 = 12345.0;

fn compat_mode(headers: &HeaderMap) -> bool {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok());
    needs_compat_mode(user_agent)
}

fn svg_response(svg: String) -> Response {
    ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response()
}

pub async fn sample_badge(headers: HeaderMap) -> Response {
    svg_response(render_badge(SAMPLE_AMOUNT, true, compat_mode(&headers)))
}

pub async fn recipient_badge(
    State(state): State<AppState>,
    Path(recipient): Path<String>,
    headers: HeaderMap,
) -> Result<Response, BadgeError> {
    let (amount, powered) = match state.store.get(&recipient).await? {
        Some(record) => (record.amount, record.is_fresh(state.clock.now())),
        None => (0.0, false),
    };

    tracing::debug!(
        recipient = %recipient,
        amount = amount,
        powered = powered,
        "Rendering badge"
    );

    Ok(svg_response(render_badge(
        amount,
        powered,
        compat_mode(&headers),
    )))
}
