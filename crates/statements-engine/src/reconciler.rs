//! Contradiction reconciliation between red flags and positive signals.
//!
//! Rule families run independently, so averaged ratios and per-period facts
//! can disagree. When a red flag and a positive signal describe the same
//! aspect, the red flag wins and the signal is dropped. Matching is by
//! substring against the rule message templates.

use crate::extractor::AverageMetrics;

/// Red-flag fragments and the signal fragments they invalidate.
const CONTRADICTION_GROUPS: &[(&[&str], &[&str])] = &[
    (
        &["High debt", "Interest coverage critically low"],
        &[
            "Low debt",
            "Comfortable interest coverage",
            "Healthy working capital",
        ],
    ),
    (
        &["Current ratio below", "Negative working capital"],
        &["Comfortable liquidity", "Healthy working capital"],
    ),
    (
        &["ROE below", "Negative net margin", "Recurring losses"],
        &["Excellent ROE", "Good ROE", "Strong net margin"],
    ),
    (&["Declining revenues"], &["Consistent revenue growth"]),
    (
        &["Negative operating cash flow"],
        &[
            "Strong operating cash generation",
            "Strong cash conversion",
            "Positive free cash flow",
        ],
    ),
    (
        &["Net margin below", "Negative net margin"],
        &["Highly profitable operation"],
    ),
];

const LEVERAGE_STRAINED: f64 = 2.0;
const COVERAGE_COMFORTABLE: f64 = 8.0;
const MARGIN_GAP_OPERATING: f64 = 0.15;
const MARGIN_GAP_NET: f64 = 0.05;

/// Drops positive signals contradicted by red flags or by the averaged
/// metrics themselves. Returns the surviving signals and how many were
/// removed; the removal count feeds the score penalty cascade.
pub fn reconcile(
    red_flags: &[String],
    positive_signals: Vec<String>,
    metrics: &AverageMetrics,
) -> (Vec<String>, usize) {
    let before = positive_signals.len();

    let high_debt = red_flags.iter().any(|f| f.contains("High debt"));
    let falling_profits = red_flags.iter().any(|f| f.contains("Declining profits"));
    let low_margin = red_flags
        .iter()
        .any(|f| f.contains("Net margin below") || f.contains("Negative net margin"));

    let survivors: Vec<String> = positive_signals
        .into_iter()
        .filter(|signal| {
            for (triggers, targets) in CONTRADICTION_GROUPS {
                let triggered = triggers
                    .iter()
                    .any(|t| red_flags.iter().any(|f| f.contains(t)));
                if triggered && targets.iter().any(|t| signal.contains(t)) {
                    return false;
                }
            }

            // Leverage strained while coverage still reads comfortable: the
            // coverage average is likely stale relative to the debt load.
            if metrics.debt_to_equity > LEVERAGE_STRAINED
                && metrics.interest_coverage >= COVERAGE_COMFORTABLE
                && signal.contains("Comfortable interest coverage")
            {
                return false;
            }

            // Wide operating-to-net gap: the operation is not the story.
            if metrics.operating_margin >= MARGIN_GAP_OPERATING
                && metrics.net_margin < MARGIN_GAP_NET
                && signal.contains("Highly profitable operation")
            {
                return false;
            }

            if high_debt && falling_profits {
                let lowered = signal.to_lowercase();
                if lowered.contains("cash") || lowered.contains("dividend") {
                    return false;
                }
            }

            if low_margin && falling_profits && signal.contains("shareholder value") {
                return false;
            }

            true
        })
        .collect();

    let removed = before - survivors.len();
    (survivors, removed)
}
