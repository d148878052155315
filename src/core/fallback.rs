// src/core/fallback.rs — Deterministic advice when no advisor is usable

use super::types::{CountStatus, Recommendation, TargetBand, Verdict};

/// Advice from the count alone: narrow above the band, broaden below it,
/// proceed inside it. Never suggests edits.
pub fn manual_recommendation(count: u64, band: &TargetBand) -> Recommendation {
    let status = band.classify(count);
    match status {
        CountStatus::TooMany => Recommendation::manual(
            Verdict::Refine,
            Some(status),
            format!(
                "{} leads is above the target of {}; narrow the filters",
                count, band
            ),
        ),
        CountStatus::TooFew => Recommendation::manual(
            Verdict::Refine,
            Some(status),
            format!(
                "{} leads is below the target of {}; broaden the filters",
                count, band
            ),
        ),
        CountStatus::Optimal => Recommendation::manual(
            Verdict::Proceed,
            Some(status),
            format!("{} leads is within the target of {}", count, band),
        ),
    }
}

/// Advice when no count has been observed yet.
pub fn evaluation_unavailable() -> Recommendation {
    Recommendation::manual(
        Verdict::Refine,
        None,
        "evaluation unavailable; no lead count observed yet",
    )
}
