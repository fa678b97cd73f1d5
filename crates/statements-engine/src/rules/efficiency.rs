use crate::benchmarks::SectorBenchmarks;
use crate::extractor::AverageMetrics;
use crate::validator::DataQuality;
use analysis_core::RuleOutcome;

/// Banks turn assets over an order of magnitude slower than operating
/// companies; their minimum scales down accordingly.
const BANK_TURNOVER_SCALE: f64 = 0.1;

const INVENTORY_TURNOVER_SLOW: f64 = 2.0;
const INVENTORY_TURNOVER_FAST: f64 = 8.0;
const RECEIVABLES_TURNOVER_SLOW: f64 = 4.0;
const RECEIVABLES_TURNOVER_FAST: f64 = 10.0;

/// Operating margin at or above this marks a highly profitable operation.
const HIGHLY_PROFITABLE_MARGIN: f64 = 0.15;

pub fn evaluate(
    metrics: &AverageMetrics,
    bench: &SectorBenchmarks,
    quality: &DataQuality,
) -> RuleOutcome {
    let mut out = RuleOutcome::new();

    let turnover_min = if quality.is_likely_bank {
        bench.asset_turnover_min * BANK_TURNOVER_SCALE
    } else {
        bench.asset_turnover_min
    };
    if metrics.asset_turnover >= 2.0 * turnover_min {
        out.adjust(8);
        out.signal(format!(
            "Efficient asset utilization (turnover {:.2}x)",
            metrics.asset_turnover
        ));
    } else if metrics.asset_turnover < turnover_min {
        out.adjust(-8);
        out.flag(format!(
            "Low asset utilization (turnover {:.2}x vs {:.2}x minimum)",
            metrics.asset_turnover, turnover_min
        ));
    }

    // Operating margin here already carries the EBIT -> gross-minus-opex ->
    // reported-line fallback from the extractor.
    let om = metrics.operating_margin;
    if om >= HIGHLY_PROFITABLE_MARGIN.max(1.8 * bench.operating_margin_min) {
        out.adjust(6);
        out.signal(format!(
            "Highly profitable operation (operating margin {:.1}%)",
            om * 100.0
        ));
    } else if om >= 0.0 && om < bench.operating_margin_min {
        out.adjust(-6);
        out.flag(format!(
            "Operating margin below sector minimum ({:.1}% vs {:.1}%)",
            om * 100.0,
            bench.operating_margin_min * 100.0
        ));
    }

    let skip_reason = if quality.is_bank_or_financial {
        Some("financial institution")
    } else if quality.is_service_company {
        Some("service company")
    } else if !quality.receivables_valid || !quality.inventory_valid {
        Some("insufficient balance detail")
    } else {
        None
    };

    match skip_reason {
        Some(reason) => {
            out.context(format!(
                "Receivables and inventory turnover not assessed ({reason})"
            ));
        }
        None => {
            if metrics.inventory_turnover >= INVENTORY_TURNOVER_FAST {
                out.adjust(4);
                out.signal(format!(
                    "Healthy inventory turnover ({:.1}x)",
                    metrics.inventory_turnover
                ));
            } else if metrics.inventory_turnover > 0.0
                && metrics.inventory_turnover < INVENTORY_TURNOVER_SLOW
            {
                out.adjust(-5);
                out.flag(format!(
                    "Slow inventory turnover ({:.1}x)",
                    metrics.inventory_turnover
                ));
            }

            if metrics.receivables_turnover >= RECEIVABLES_TURNOVER_FAST {
                out.adjust(4);
                out.signal(format!(
                    "Healthy receivables turnover ({:.1}x)",
                    metrics.receivables_turnover
                ));
            } else if metrics.receivables_turnover > 0.0
                && metrics.receivables_turnover < RECEIVABLES_TURNOVER_SLOW
            {
                out.adjust(-5);
                out.flag(format!(
                    "Slow receivables collection ({:.1}x)",
                    metrics.receivables_turnover
                ));
            }
        }
    }

    out
}
