use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// The judge sees the full-history answer as A and the summary answer as B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    A,
    B,
}

// Standalone letter only, so words like "Both" or "Absolutely" never count.
static VERDICT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b[ab]\b").expect("static verdict pattern"));

/// First standalone `A`/`B` (any case) in the judge's reply.
pub fn parse_verdict(reply: &str) -> Option<Verdict> {
    let m = VERDICT_RE.find(reply)?;
    match m.as_str() {
        "A" | "a" => Some(Verdict::A),
        _ => Some(Verdict::B),
    }
}
