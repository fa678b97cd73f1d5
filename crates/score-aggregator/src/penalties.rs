//! Price-compatibility factors and the post-hoc flat penalties applied after
//! the weighted blend.

use analysis_core::RiskLevel;

/// Flat deduction while an active alert is set on the company.
pub const ACTIVE_FLAG_PENALTY: i32 = 20;

/// Progressive haircut for intrinsic-value strategies whose upside over the
/// current price is thin. Full score at >=20% upside.
pub fn price_compatibility_factor(upside: Option<f64>) -> f64 {
    match upside {
        Some(u) if u < 5.0 => 0.50,
        Some(u) if u < 10.0 => 0.75,
        Some(u) if u < 15.0 => 0.90,
        Some(u) if u < 20.0 => 0.95,
        _ => 1.0,
    }
}

/// Statement score ceiling by risk level, applied before weighting.
pub fn risk_capped(score: f64, risk: RiskLevel) -> f64 {
    match risk {
        RiskLevel::Critical => score.min(20.0),
        RiskLevel::High => score.min(40.0),
        _ => score,
    }
}

/// Net-debt-to-equity tier table. Foreign listings get the lenient variant:
/// their consolidated debt figures mix jurisdictions and currencies.
pub fn net_debt_penalty(ratio: f64, foreign_listed: bool) -> i32 {
    if foreign_listed {
        match ratio {
            r if r > 3.5 => 8,
            r if r > 2.5 => 5,
            r if r > 2.0 => 2,
            r if r > 1.5 => 1,
            _ => 0,
        }
    } else {
        match ratio {
            r if r > 3.0 => 12,
            r if r > 2.0 => 8,
            r if r > 1.5 => 4,
            r if r > 1.0 => 1,
            _ => 0,
        }
    }
}

/// Point-in-time net-margin tier table.
pub fn net_margin_penalty(margin: f64, foreign_listed: bool) -> i32 {
    if foreign_listed {
        match margin {
            m if m < -0.15 => 12,
            m if m < -0.05 => 8,
            m if m < 0.0 => 5,
            m if m < 0.03 => 2,
            _ => 0,
        }
    } else {
        match margin {
            m if m < -0.15 => 18,
            m if m < -0.05 => 12,
            m if m < 0.0 => 8,
            m if m < 0.02 => 3,
            m if m < 0.04 => 1,
            _ => 0,
        }
    }
}

/// Risk-level deduction and ceiling over the blended score.
pub fn apply_risk_adjustment(score: i32, risk: RiskLevel) -> i32 {
    match risk {
        RiskLevel::Critical => (score - 15).min(50),
        RiskLevel::High => (score - 8).min(70),
        _ => score,
    }
}
