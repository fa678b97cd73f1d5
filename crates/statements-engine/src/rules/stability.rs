use crate::benchmarks::SectorBenchmarks;
use crate::extractor::AverageMetrics;
use analysis_core::{RuleOutcome, SectorContext, SectorType};

const REVENUE_STABLE: f64 = 0.8;
const REVENUE_UNSTABLE: f64 = 0.5;
const MARGIN_STABLE: f64 = 0.7;
const MARGIN_UNSTABLE: f64 = 0.4;

/// Categorical override: repeated losses dominate any stability verdict.
const LOSS_PERIODS_CRITICAL: u32 = 2;
const LOSS_PENALTY: i32 = -40;

pub fn evaluate(
    metrics: &AverageMetrics,
    _bench: &SectorBenchmarks,
    sector: &SectorContext,
) -> RuleOutcome {
    let mut out = RuleOutcome::new();
    let financial = sector.sector_type == SectorType::Financial;

    if metrics.revenue_stability >= REVENUE_STABLE {
        out.adjust(8);
        out.signal(format!(
            "Stable revenues (stability {:.2})",
            metrics.revenue_stability
        ));
    } else if metrics.revenue_stability < REVENUE_UNSTABLE {
        if financial {
            // Intermediation revenue swings with the rate cycle; soften.
            out.adjust(-5);
            out.context(format!(
                "Revenue volatility (stability {:.2}) common for financial intermediation",
                metrics.revenue_stability
            ));
        } else {
            out.adjust(-10);
            out.flag(format!(
                "Unstable revenues (stability {:.2})",
                metrics.revenue_stability
            ));
        }
    }

    if metrics.margin_stability >= MARGIN_STABLE {
        out.adjust(6);
        out.signal(format!(
            "Stable margins (stability {:.2})",
            metrics.margin_stability
        ));
    } else if metrics.margin_stability < MARGIN_UNSTABLE {
        out.adjust(-8);
        out.flag(format!(
            "Volatile margins (stability {:.2})",
            metrics.margin_stability
        ));
    }

    if metrics.loss_periods >= LOSS_PERIODS_CRITICAL {
        out.adjust(LOSS_PENALTY);
        out.flag(format!(
            "Recurring losses ({} of the last 3 periods)",
            metrics.loss_periods
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmarks::SectorBenchmarks;
    use analysis_core::SizeContext;

    fn bench() -> SectorBenchmarks {
        SectorBenchmarks::for_company(&SectorContext::default(), &SizeContext::default(), false)
    }

    #[test]
    fn loss_override_applies_regardless_of_stability() {
        let mut m = AverageMetrics::neutral();
        m.revenue_stability = 0.95;
        m.margin_stability = 0.9;
        m.loss_periods = 2;
        let out = evaluate(&m, &bench(), &SectorContext::default());
        assert!(out.red_flags.iter().any(|f| f.contains("Recurring losses")));
        // +8 +6 from stability, -40 override
        assert_eq!(out.score_adjustment, -26);
    }

    #[test]
    fn financial_low_revenue_stability_is_softened() {
        let sector = SectorContext {
            sector_type: SectorType::Financial,
            ..Default::default()
        };
        let mut m = AverageMetrics::neutral();
        m.revenue_stability = 0.3;
        let fin = evaluate(&m, &bench(), &sector);
        let corp = evaluate(&m, &bench(), &SectorContext::default());
        assert!(fin.red_flags.iter().all(|f| !f.contains("Unstable")));
        assert!(corp.red_flags.iter().any(|f| f.contains("Unstable revenues")));
        assert!(fin.score_adjustment > corp.score_adjustment);
    }
}
