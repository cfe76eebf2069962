use crate::models::SETTLEMENT_CURRENCY;

const TEMPLATE: &str = include_str!("../../templates/badge.svg");

/// Ideographic space; SVG does not collapse it.
const FILLER: char = '\u{3000}';

/// Display strings shorter than this get padded before stretching.
const MIN_UNPADDED_CHARS: usize = 7;
const PAD_CHARS: usize = 2;

const GRAYSCALE_FILTER: &str = "url(#grayscale)";

// Old IE cannot combine textLength with text-anchor="end", so it
// anchors at the start of the amount field instead.
const ANCHOR_COMPAT: &str = r#"textLength="135" x="85" text-anchor="start""#;
const ANCHOR_STANDARD: &str = r#"textLength="135" x="218" text-anchor="end""#;

/// `12345.4` becomes `"12345 XRP"`. Negative or non-finite amounts show as zero.
pub fn format_amount(amount: f64) -> String {
    let amount = if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    };
    format!("{:.0} {}", amount, SETTLEMENT_CURRENCY)
}

/// Short strings look stretched under `textLength`, so they get two fillers up front.
pub fn pad_display(text: &str) -> String {
    if text.chars().count() < MIN_UNPADDED_CHARS {
        let mut padded: String = std::iter::repeat(FILLER).take(PAD_CHARS).collect();
        padded.push_str(text);
        padded
    } else {
        text.to_string()
    }
}

/// Renders the badge SVG document.
///
/// `powered` keeps full colour; otherwise the whole image is grayscaled.
/// `compat_mode` only moves the text anchor.
pub fn render_badge(amount: f64, powered: bool, compat_mode: bool) -> String {
    let text = pad_display(&format_amount(amount));
    let filter = if powered { "" } else { GRAYSCALE_FILTER };
    let anchor = if compat_mode {
        ANCHOR_COMPAT
    } else {
        ANCHOR_STANDARD
    };

    TEMPLATE
        .replace("{filter}", filter)
        .replace("{anchor}", anchor)
        .replace("{text}", &text)
}

/// Clients that need the start-anchored text layout.
pub fn needs_compat_mode(user_agent: Option<&str>) -> bool {
    user_agent.map_or(false, |ua| ua.contains("MSIE"))
}
