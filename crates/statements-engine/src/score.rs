//! Score normalization, penalty cascade, caps, and risk classification.
//!
//! Each rule family's raw adjustment is normalized to a 0-100 family score,
//! the families are blended with fixed weights, and then the cascade applies
//! holistic penalties and caps that no single family can see on its own.

use analysis_core::{RiskLevel, RuleOutcome};

/// Family weights in the fixed evaluation order: profitability, liquidity,
/// efficiency, stability, cash flow, growth, income composition. Sums to 1.
pub const FAMILY_WEIGHTS: [f64; 7] = [0.25, 0.18, 0.18, 0.15, 0.10, 0.04, 0.10];

/// Income-composition raw adjustments at or below these convert to bounded
/// direct deductions instead of flowing through normalization alone.
const COMPOSITION_CHRONIC_RAW: i32 = -300;
const COMPOSITION_PARTIAL_RAW: i32 = -50;
const COMPOSITION_CHRONIC_DEDUCTION: i32 = 25;
const COMPOSITION_PARTIAL_DEDUCTION: i32 = 15;

/// Flag fragments that mark a finding as critical for risk classification.
const CRITICAL_MARKERS: [&str; 5] = [
    "Recurring losses",
    "Negative net margin",
    "Negative working capital",
    "High debt",
    "Negative operating cash flow",
];

fn normalized(adjustment: i32) -> f64 {
    (100.0 + adjustment as f64).clamp(0.0, 100.0)
}

/// Highest applicable alert-ratio tier. The ratio alone is not enough; a
/// minimum absolute flag count guards against small-sample verdicts.
fn alert_ratio_penalty(red_flags: usize, positive_signals: usize) -> i32 {
    let total = red_flags + positive_signals;
    if total == 0 {
        return 0;
    }
    let ratio = red_flags as f64 / total as f64;
    match () {
        _ if ratio >= 0.85 && red_flags >= 6 => 30,
        _ if ratio >= 0.75 && red_flags >= 5 => 25,
        _ if ratio >= 0.65 && red_flags >= 4 => 20,
        _ if ratio >= 0.50 && red_flags >= 3 => 15,
        _ => 0,
    }
}

fn contradiction_penalty(removed: usize) -> i32 {
    match removed {
        0 => 0,
        1 | 2 => 10,
        3 | 4 => 15,
        _ => 20,
    }
}

/// Blends the seven family outcomes and runs the penalty cascade.
///
/// `red_flags` and `positive_signals` are the merged, reconciled lists
/// before output truncation; the caps and ratios read the full counts.
pub fn compute_score(
    outcomes: &[RuleOutcome; 7],
    red_flags: &[String],
    positive_signals: &[String],
    contradictions_removed: usize,
) -> u32 {
    let weighted: f64 = outcomes
        .iter()
        .zip(FAMILY_WEIGHTS)
        .map(|(outcome, weight)| normalized(outcome.score_adjustment) * weight)
        .sum();
    let mut score = weighted.clamp(0.0, 100.0).round() as i32;

    score -= alert_ratio_penalty(red_flags.len(), positive_signals.len());
    score -= contradiction_penalty(contradictions_removed);

    let composition_raw = outcomes[6].score_adjustment;
    if composition_raw <= COMPOSITION_CHRONIC_RAW {
        score -= COMPOSITION_CHRONIC_DEDUCTION;
    } else if composition_raw <= COMPOSITION_PARTIAL_RAW {
        score -= COMPOSITION_PARTIAL_DEDUCTION;
    }

    score = score.max(0);

    let has = |fragment: &str| red_flags.iter().any(|f| f.contains(fragment));
    let unstable = has("Unstable revenues") || has("Volatile margins");
    let low_margin = has("Net margin below") || has("Negative net margin");

    if has("High debt") && has("Declining profits") && has("ROE below") {
        score = score.min(40);
    }
    if low_margin && has("Declining profits") && unstable {
        score = score.min(45);
    }
    if red_flags.len() >= 8 {
        score = score.min(35);
    } else if red_flags.len() >= 6 {
        score = score.min(50);
    }

    score as u32
}

/// Risk classification from the final score and the full flag list.
pub fn risk_level(score: u32, red_flags: &[String]) -> RiskLevel {
    let critical_count = red_flags
        .iter()
        .filter(|f| CRITICAL_MARKERS.iter().any(|m| f.contains(m)))
        .count();
    if score < 30 || critical_count >= 3 {
        RiskLevel::Critical
    } else if score < 50 || critical_count >= 2 {
        RiskLevel::High
    } else if score < 70 || red_flags.len() >= 4 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(adjustment: i32) -> RuleOutcome {
        RuleOutcome {
            score_adjustment: adjustment,
            ..Default::default()
        }
    }

    fn outcomes(adjustments: [i32; 7]) -> [RuleOutcome; 7] {
        adjustments.map(outcome)
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn weights_sum_to_one() {
        let sum: f64 = FAMILY_WEIGHTS.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn neutral_outcomes_score_one_hundred() {
        let score = compute_score(&outcomes([0; 7]), &[], &[], 0);
        assert_eq!(score, 100);
    }

    #[test]
    fn family_adjustments_blend_by_weight() {
        // Profitability -20 alone: 100 - 0.25 * 20 = 95.
        let score = compute_score(&outcomes([-20, 0, 0, 0, 0, 0, 0]), &[], &[], 0);
        assert_eq!(score, 95);
    }

    #[test]
    fn normalization_clamps_each_family() {
        // -200 in one family cannot drag more than its full weight.
        let score = compute_score(&outcomes([-200, 0, 0, 0, 0, 0, 0]), &[], &[], 0);
        assert_eq!(score, 75);
    }

    #[test]
    fn alert_ratio_tiers_take_the_highest_only() {
        let flags = strings(&["a", "b", "c", "d", "e", "f"]);
        let signals = strings(&["g"]);
        // ratio 6/7 = 0.857, count 6: -30, not cumulative with lower tiers.
        let with = compute_score(&outcomes([0; 7]), &flags, &signals, 0);
        // 6 flags also trips the >=6 cap of 50.
        assert_eq!(with, 50);

        let flags3 = strings(&["a", "b", "c"]);
        let score3 = compute_score(&outcomes([0; 7]), &flags3, &strings(&["g"]), 0);
        assert_eq!(score3, 85);
    }

    #[test]
    fn contradiction_penalty_tiers() {
        assert_eq!(compute_score(&outcomes([0; 7]), &[], &[], 1), 90);
        assert_eq!(compute_score(&outcomes([0; 7]), &[], &[], 3), 85);
        assert_eq!(compute_score(&outcomes([0; 7]), &[], &[], 5), 80);
    }

    #[test]
    fn composition_raw_penalties_are_mutually_exclusive() {
        // Chronic: family normalizes to 0 (weight 0.10) plus a -25 deduction.
        let chronic = compute_score(&outcomes([0, 0, 0, 0, 0, 0, -300]), &[], &[], 0);
        assert_eq!(chronic, 90 - 25);
        let partial = compute_score(&outcomes([0, 0, 0, 0, 0, 0, -50]), &[], &[], 0);
        assert_eq!(partial, 95 - 15);
    }

    #[test]
    fn distress_pattern_caps_at_forty() {
        let flags = strings(&[
            "High debt load (debt-to-equity 4.0x above 2.0x ceiling)",
            "Declining profits (-12.0%/yr)",
            "ROE below sector minimum (2.0% vs 8.0%)",
        ]);
        let score = compute_score(&outcomes([0; 7]), &flags, &strings(&["x", "y", "z"]), 0);
        assert_eq!(score, 40);
    }

    #[test]
    fn eight_flags_cap_the_score_at_thirty_five() {
        let flags: Vec<String> = (0..8).map(|i| format!("flag {i}")).collect();
        let signals: Vec<String> = (0..8).map(|i| format!("signal {i}")).collect();
        // Mild adjustments alone read 100 - 15 (50% alert ratio) = 85; the
        // flag-count ceiling is what brings it down.
        let score = compute_score(&outcomes([0; 7]), &flags, &signals, 0);
        assert_eq!(score, 35);
    }

    #[test]
    fn score_never_goes_negative() {
        let flags: Vec<String> = (0..9).map(|i| format!("flag {i}")).collect();
        let score = compute_score(&outcomes([-100; 7]), &flags, &[], 6);
        assert_eq!(score, 0);
    }

    #[test]
    fn risk_levels_from_score_bands() {
        assert_eq!(risk_level(80, &[]), RiskLevel::Low);
        assert_eq!(risk_level(60, &[]), RiskLevel::Medium);
        assert_eq!(risk_level(40, &[]), RiskLevel::High);
        assert_eq!(risk_level(20, &[]), RiskLevel::Critical);
    }

    #[test]
    fn critical_flag_count_overrides_a_decent_score() {
        let flags = strings(&[
            "Recurring losses (2 of the last 3 periods)",
            "Negative net margin (-3.0%)",
            "Negative working capital (-8.0% of assets)",
        ]);
        assert_eq!(risk_level(75, &flags), RiskLevel::Critical);

        let two = strings(&[
            "Recurring losses (2 of the last 3 periods)",
            "High debt load (debt-to-equity 4.0x above 2.0x ceiling)",
        ]);
        assert_eq!(risk_level(75, &two), RiskLevel::High);
    }

    #[test]
    fn four_flags_of_any_kind_mean_at_least_medium() {
        let flags = strings(&["a", "b", "c", "d"]);
        assert_eq!(risk_level(85, &flags), RiskLevel::Medium);
    }
}
