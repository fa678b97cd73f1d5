use crate::benchmarks::SectorBenchmarks;
use crate::extractor::AverageMetrics;
use analysis_core::RuleOutcome;

/// Annualized decline worse than this is a red flag, not just weak growth.
const DECLINE_THRESHOLD: f64 = -0.05;

pub fn evaluate(metrics: &AverageMetrics, bench: &SectorBenchmarks) -> RuleOutcome {
    let mut out = RuleOutcome::new();

    let rg = metrics.revenue_growth;
    if rg >= 2.0 * bench.revenue_growth_min {
        out.adjust(8);
        out.signal(format!("Strong revenue growth ({:.1}%/yr)", rg * 100.0));
    } else if rg >= bench.revenue_growth_min {
        out.adjust(4);
        out.signal(format!("Consistent revenue growth ({:.1}%/yr)", rg * 100.0));
    } else if rg < DECLINE_THRESHOLD {
        out.adjust(-10);
        out.flag(format!("Declining revenues ({:.1}%/yr)", rg * 100.0));
    }

    let pg = metrics.profit_growth;
    if pg >= bench.profit_growth_min {
        out.adjust(6);
        out.signal(format!("Consistent profit growth ({:.1}%/yr)", pg * 100.0));
    } else if pg < DECLINE_THRESHOLD {
        out.adjust(-12);
        out.flag(format!("Declining profits ({:.1}%/yr)", pg * 100.0));
    }

    // Growth quality: the relation between the two trajectories.
    if rg > 0.0 && pg > rg {
        out.adjust(4);
        out.signal("Profit growth outpacing revenue (operating leverage)");
    } else if rg > 0.05 && pg < 0.0 {
        out.adjust(-8);
        out.flag(format!(
            "Revenue growth without profit conversion ({:.1}%/yr revenue, {:.1}%/yr profit)",
            rg * 100.0,
            pg * 100.0
        ));
    }

    out
}
