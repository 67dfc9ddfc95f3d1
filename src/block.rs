//! Block/CAPTCHA page detection.

/// Phrases that mark a response body as a block or CAPTCHA page. Matched
/// case-insensitively anywhere in the body.
const BLOCK_SIGNALS: &[&str] = &["detected unusual traffic", "captcha", "/sorry/index"];

/// Returns true if the body looks like a block or CAPTCHA page.
///
/// This is a heuristic: soft blocks that slip through simply extract to an
/// empty result set downstream.
pub fn is_blocked(body: &str) -> bool {
    let lowered = body.to_lowercase();
    BLOCK_SIGNALS.iter().any(|signal| lowered.contains(signal))
}
