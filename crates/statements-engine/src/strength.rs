//! Company strength classification, a fundamentals composite independent of
//! the red-flag driven health score.

use crate::benchmarks::SectorBenchmarks;
use crate::extractor::AverageMetrics;
use crate::validator::DataQuality;
use analysis_core::CompanyStrength;

const VERY_STRONG: i32 = 80;
const STRONG: i32 = 60;
const MODERATE: i32 = 40;

pub fn classify(
    metrics: &AverageMetrics,
    bench: &SectorBenchmarks,
    quality: &DataQuality,
) -> CompanyStrength {
    let mut points = 0i32;

    // Profitability, up to 40.
    points += match metrics.roe {
        r if r >= 0.20 => 40,
        r if r >= 0.15 => 30,
        r if r >= 0.10 => 20,
        r if r >= 0.05 => 10,
        _ => 0,
    };

    // Liquidity, up to 25. Unreliable balance detail earns a small neutral
    // credit rather than a verdict either way.
    if quality.current_assets_valid && quality.current_liabilities_valid {
        points += if metrics.current_ratio >= 1.5 && metrics.quick_ratio >= 1.0 {
            25
        } else if metrics.current_ratio >= 1.2 {
            15
        } else if metrics.current_ratio < bench.current_ratio_min {
            -10
        } else {
            0
        };
    } else {
        points += 5;
    }

    // Leverage, up to 20.
    points += match metrics.debt_to_equity {
        d if d <= 0.5 => 20,
        d if d <= 1.0 => 12,
        d if d <= 2.0 => 5,
        d if d > bench.debt_to_equity_max => -15,
        _ => 0,
    };

    // Stability, up to 15.
    if metrics.revenue_stability >= 0.7 && metrics.margin_stability >= 0.7 {
        points += 15;
    } else if metrics.revenue_stability >= 0.7 {
        points += 8;
    }

    match points {
        p if p >= VERY_STRONG => CompanyStrength::VeryStrong,
        p if p >= STRONG => CompanyStrength::Strong,
        p if p >= MODERATE => CompanyStrength::Moderate,
        _ => CompanyStrength::Weak,
    }
}
