//! Risk-score extraction from free-text agent replies.

use std::sync::LazyLock;

use regex::Regex;

static SCORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{1,3}").unwrap());

/// Pull a 0-100 risk score out of an agent reply.
///
/// Takes the first run of 1-3 digits anywhere in the text and clamps it to
/// 100. This is a best-effort heuristic: any leading digit sequence wins,
/// whether or not it is semantically a score.
pub fn parse_risk_score(text: &str) -> Option<u8> {
    let m = SCORE_RE.find(text)?;
    let value: u16 = m.as_str().parse().ok()?;
    Some(value.min(100) as u8)
}
