use crate::benchmarks::SectorBenchmarks;
use crate::extractor::AverageMetrics;
use crate::validator::DataQuality;
use analysis_core::{RuleOutcome, SectorContext, SectorType};

// Working-capital bands, as a share of total assets.
const WC_HEALTHY: f64 = 0.15;
const WC_MILDLY_LOW: f64 = 0.05;
const WC_NEGATIVE: f64 = -0.05;

// Financial-sector leverage tiers (debt-to-equity multiples).
const FIN_LEVERAGE_EXTREME: f64 = 20.0;
const FIN_LEVERAGE_ELEVATED: f64 = 15.0;
const FIN_LEVERAGE_NORMAL: f64 = 8.0;

/// Coverage at or above this reads as comfortable for non-banks.
const COVERAGE_COMFORTABLE: f64 = 8.0;
/// Bank coverage below this is a funding-cost artifact, not distress.
const BANK_COVERAGE_BENIGN: f64 = 0.5;

pub fn evaluate(
    metrics: &AverageMetrics,
    bench: &SectorBenchmarks,
    quality: &DataQuality,
    sector: &SectorContext,
) -> RuleOutcome {
    let mut out = RuleOutcome::new();
    let financial = sector.sector_type == SectorType::Financial;

    if quality.current_assets_valid && quality.current_liabilities_valid {
        if metrics.current_ratio >= bench.current_ratio_good {
            out.adjust(8);
            out.signal(format!(
                "Comfortable liquidity (current ratio {:.2})",
                metrics.current_ratio
            ));
        } else if metrics.current_ratio < bench.current_ratio_min {
            out.adjust(-12);
            out.flag(format!(
                "Current ratio below minimum ({:.2} vs {:.2})",
                metrics.current_ratio, bench.current_ratio_min
            ));
        }

        if metrics.quick_ratio < bench.quick_ratio_min {
            out.adjust(-8);
            out.flag(format!(
                "Quick ratio below minimum ({:.2} vs {:.2})",
                metrics.quick_ratio, bench.quick_ratio_min
            ));
        }

        let wc = metrics.working_capital_ratio;
        if wc >= WC_HEALTHY {
            out.adjust(6);
            out.signal(format!(
                "Healthy working capital ({:.1}% of assets)",
                wc * 100.0
            ));
        } else if wc < WC_NEGATIVE {
            out.adjust(-15);
            out.flag(format!(
                "Negative working capital ({:.1}% of assets)",
                wc * 100.0
            ));
        } else if (0.0..WC_MILDLY_LOW).contains(&wc) {
            out.adjust(-5);
            out.context(format!(
                "Working capital thin at {:.1}% of assets",
                wc * 100.0
            ));
        }
    } else {
        out.context("Liquidity ratios not assessed (balance detail unreliable)");
    }

    // Leverage reads on the whole balance sheet, so it is not gated by the
    // current-item validity flags.
    let d2e = metrics.debt_to_equity;
    if financial {
        if d2e > FIN_LEVERAGE_EXTREME {
            out.adjust(-20);
            out.flag(format!(
                "Extreme leverage for a financial institution ({d2e:.1}x)"
            ));
        } else if d2e > FIN_LEVERAGE_ELEVATED {
            out.adjust(-10);
            out.flag(format!(
                "Elevated leverage for a financial institution ({d2e:.1}x)"
            ));
        } else if d2e >= FIN_LEVERAGE_NORMAL {
            out.context(format!(
                "Leverage of {d2e:.1}x within normal range for financial institutions"
            ));
        } else {
            out.adjust(5);
            out.signal(format!(
                "Conservative funding for a financial institution ({d2e:.1}x)"
            ));
        }
    } else if d2e > bench.debt_to_equity_max {
        out.adjust(-15);
        out.flag(format!(
            "High debt load (debt-to-equity {:.1}x above {:.1}x ceiling)",
            d2e, bench.debt_to_equity_max
        ));
    } else if d2e <= 0.5 {
        out.adjust(8);
        out.signal(format!("Low debt load (debt-to-equity {d2e:.2}x)"));
    }

    let coverage = metrics.interest_coverage;
    if quality.is_likely_bank {
        if coverage.abs() < BANK_COVERAGE_BENIGN {
            out.context(
                "Interest coverage near zero reflects funding costs, normal for banks",
            );
        } else if coverage >= 2.0 {
            out.adjust(3);
            out.signal(format!("Funding costs well covered ({coverage:.1}x)"));
        }
    } else if coverage >= COVERAGE_COMFORTABLE {
        out.adjust(6);
        out.signal(format!("Comfortable interest coverage ({coverage:.1}x)"));
    } else if coverage < bench.interest_coverage_min {
        out.adjust(-15);
        out.flag(format!("Interest coverage critically low ({coverage:.1}x)"));
    }

    out
}
