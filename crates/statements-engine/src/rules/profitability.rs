use crate::benchmarks::SectorBenchmarks;
use crate::extractor::{operating_result, AverageMetrics};
use analysis_core::{FallbackData, IncomeRow, Indicator, RuleOutcome, SectorContext, SectorType};

/// Net-margin gap the inconsistency detector reacts to: averaged operating
/// margin negative while net margin still clears this level.
const INCONSISTENT_NET_MARGIN: f64 = 0.05;

/// A decomposition cause must explain at least this share of the gap.
const CAUSE_COVERAGE: f64 = 0.50;

pub fn evaluate(
    metrics: &AverageMetrics,
    bench: &SectorBenchmarks,
    sector: &SectorContext,
    fallback: Option<&FallbackData>,
    latest_income: Option<&IncomeRow>,
) -> RuleOutcome {
    let mut out = RuleOutcome::new();
    let financial = sector.sector_type == SectorType::Financial;

    // ROE against the three-tier sector ladder.
    let roe_pct = metrics.roe * 100.0;
    if metrics.roe >= bench.roe_excellent {
        out.adjust(15);
        if financial {
            out.signal(format!(
                "Excellent ROE of {roe_pct:.1}% for a financial institution generates shareholder value"
            ));
        } else {
            out.signal(format!(
                "Excellent ROE of {roe_pct:.1}% generates shareholder value"
            ));
        }
    } else if metrics.roe >= bench.roe_good {
        out.adjust(8);
        out.signal(format!("Good ROE of {roe_pct:.1}%, above the sector bar"));
    } else if let Some(holding_roe) = holding_roe(fallback, bench) {
        // Holding structure: consolidated ratios miss equity-method income,
        // so the externally supplied ROE speaks instead.
        out.signal(format!(
            "Holding structure: profitability carried by equity income (ROE {:.1}%)",
            holding_roe * 100.0
        ));
    } else if metrics.roe < bench.roe_min {
        out.adjust(-20);
        out.flag(format!(
            "ROE below sector minimum ({roe_pct:.1}% vs {:.1}%)",
            bench.roe_min * 100.0
        ));
    }

    // ROA two-tier.
    if metrics.roa >= bench.roa_good {
        out.adjust(10);
        out.signal(format!("Solid ROA of {:.1}%", metrics.roa * 100.0));
    } else if metrics.roa < bench.roa_min {
        out.adjust(-15);
        out.flag(format!(
            "ROA below sector minimum ({:.1}% vs {:.1}%)",
            metrics.roa * 100.0,
            bench.roa_min * 100.0
        ));
    }

    // Net margin: distinct negative branch, asymmetric penalties, and an
    // explanatory path for financial intermediation revenue.
    let nm_pct = metrics.net_margin * 100.0;
    if financial && metrics.net_margin == 0.0 {
        out.context("Net margin not meaningful for financial intermediation revenue");
    } else if metrics.net_margin < 0.0 {
        out.adjust(-22);
        out.flag(format!("Negative net margin ({nm_pct:.1}%)"));
    } else if metrics.net_margin >= bench.net_margin_good {
        out.adjust(12);
        out.signal(format!("Strong net margin of {nm_pct:.1}%"));
    } else if metrics.net_margin < bench.net_margin_min {
        out.adjust(-18);
        out.flag(format!(
            "Net margin below sector minimum ({nm_pct:.1}% vs {:.1}%)",
            bench.net_margin_min * 100.0
        ));
    }

    if metrics.operating_margin < 0.0 && metrics.net_margin > INCONSISTENT_NET_MARGIN {
        if let Some(latest) = latest_income {
            out.signal(explain_margin_inconsistency(latest));
        }
    }

    out
}

fn holding_roe(fallback: Option<&FallbackData>, bench: &SectorBenchmarks) -> Option<f64> {
    let data = fallback.filter(|d| d.is_holding)?;
    let roe = data.roe.as_ref().and_then(Indicator::value)?;
    (roe >= bench.roe_min).then_some(roe)
}

/// Negative operating margin with a healthy net margin: attribute the gap to
/// the non-operating lines of the latest period. Always explanatory, never a
/// red flag — the composition rule handles chronic reliance.
fn explain_margin_inconsistency(latest: &IncomeRow) -> String {
    let net_income = latest.net_income.unwrap_or(0.0);
    let gap = match operating_result(latest) {
        Some(op) => net_income - op,
        None => net_income,
    };
    if gap <= 0.0 {
        return "Net profit above operating result explained by non-operating items".to_string();
    }

    let mut causes: Vec<&str> = Vec::new();
    let candidates: [(&str, Option<f64>); 4] = [
        ("interest income", latest.interest_income),
        ("other non-operating income", latest.other_income),
        (
            "net financial result",
            latest.financial_result.filter(|v| *v > 0.0),
        ),
        (
            // Rough effect of a tax credit: a quarter of the pre-tax result.
            "tax benefit",
            latest
                .tax_expense
                .filter(|t| *t < 0.0)
                .and(latest.pretax_income)
                .map(|p| 0.25 * p.abs()),
        ),
    ];
    for (name, value) in candidates {
        if let Some(v) = value {
            if v >= CAUSE_COVERAGE * gap {
                causes.push(name);
            }
        }
    }

    if causes.is_empty() {
        "Net profit above operating result explained by non-operating items".to_string()
    } else {
        format!(
            "Net profit above operating result explained by {}",
            causes.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmarks::SectorBenchmarks;
    use analysis_core::{SizeContext, SizeCategory};

    fn bench() -> SectorBenchmarks {
        SectorBenchmarks::for_company(
            &SectorContext::default(),
            &SizeContext {
                category: SizeCategory::Mid,
                ..Default::default()
            },
            false,
        )
    }

    fn metrics_with_roe(roe: f64) -> AverageMetrics {
        let mut m = AverageMetrics::neutral();
        m.roe = roe;
        m
    }

    #[test]
    fn roe_adjustment_is_monotone_across_the_ladder() {
        let bench = bench();
        let sector = SectorContext::default();
        let low = evaluate(&metrics_with_roe(0.04), &bench, &sector, None, None);
        let mid = evaluate(&metrics_with_roe(0.10), &bench, &sector, None, None);
        let good = evaluate(&metrics_with_roe(0.18), &bench, &sector, None, None);
        let excellent = evaluate(&metrics_with_roe(0.30), &bench, &sector, None, None);
        assert!(low.score_adjustment < mid.score_adjustment);
        assert!(mid.score_adjustment < good.score_adjustment);
        assert!(good.score_adjustment < excellent.score_adjustment);
        assert!(low.red_flags.iter().any(|f| f.contains("ROE below")));
    }

    #[test]
    fn holding_with_fallback_roe_suppresses_the_low_roe_flag() {
        let bench = bench();
        let sector = SectorContext::default();
        let fallback = FallbackData {
            roe: Some(Indicator::Scalar(0.12)),
            is_holding: true,
            ..Default::default()
        };
        // Computed ROE is tiny; the extractor keeps it because it is not a
        // holding-aware layer, but the rule must not flag it.
        let out = evaluate(
            &metrics_with_roe(0.004),
            &bench,
            &sector,
            Some(&fallback),
            None,
        );
        assert!(!out.red_flags.iter().any(|f| f.contains("ROE below")));
        let holding_signal = out
            .positive_signals
            .iter()
            .find(|s| s.contains("Holding structure"))
            .expect("holding signal");
        assert!(holding_signal.contains("12.0%"));
    }

    #[test]
    fn holding_without_adequate_fallback_still_flags() {
        let bench = bench();
        let fallback = FallbackData {
            roe: Some(Indicator::Scalar(0.02)), // below roe_min
            is_holding: true,
            ..Default::default()
        };
        let out = evaluate(
            &metrics_with_roe(0.004),
            &bench,
            &SectorContext::default(),
            Some(&fallback),
            None,
        );
        assert!(out.red_flags.iter().any(|f| f.contains("ROE below")));
    }

    #[test]
    fn negative_margin_is_a_distinct_branch() {
        let bench = bench();
        let mut m = AverageMetrics::neutral();
        m.net_margin = -0.03;
        let out = evaluate(&m, &bench, &SectorContext::default(), None, None);
        assert!(out.red_flags.iter().any(|f| f.contains("Negative net margin")));

        let mut m = AverageMetrics::neutral();
        m.net_margin = 0.02; // positive but below min
        let out = evaluate(&m, &bench, &SectorContext::default(), None, None);
        assert!(out.red_flags.iter().any(|f| f.contains("Net margin below")));
    }

    #[test]
    fn financial_unmeasurable_margin_is_contextual_not_a_verdict() {
        let sector = SectorContext {
            sector_type: SectorType::Financial,
            ..Default::default()
        };
        let bench = SectorBenchmarks::for_company(
            &sector,
            &SizeContext::default(),
            false,
        );
        let mut m = AverageMetrics::neutral();
        m.net_margin = 0.0;
        m.roe = 0.16;
        m.roa = 0.02;
        let out = evaluate(&m, &bench, &sector, None, None);
        assert!(out.red_flags.is_empty());
        assert!(out
            .contextual_factors
            .iter()
            .any(|c| c.contains("not meaningful")));
    }

    #[test]
    fn inconsistency_detector_names_dominant_causes() {
        let latest = IncomeRow {
            revenue: Some(1000.0),
            ebit: Some(-50.0),
            net_income: Some(80.0),
            interest_income: Some(120.0),
            tax_expense: Some(-10.0),
            pretax_income: Some(70.0),
            ..Default::default()
        };
        let mut m = AverageMetrics::neutral();
        m.operating_margin = -0.05;
        m.net_margin = 0.08;
        let out = evaluate(
            &m,
            &bench(),
            &SectorContext::default(),
            None,
            Some(&latest),
        );
        let signal = out
            .positive_signals
            .iter()
            .find(|s| s.contains("Net profit above operating result"))
            .expect("explanatory signal");
        assert!(signal.contains("interest income"));
        assert!(out.red_flags.iter().all(|f| !f.contains("operating result")));
    }
}
