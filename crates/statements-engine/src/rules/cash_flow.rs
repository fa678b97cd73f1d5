use crate::benchmarks::SectorBenchmarks;
use crate::extractor::AverageMetrics;
use analysis_core::{RuleOutcome, SectorContext, SectorType};

const OCF_MARGIN_STRONG: f64 = 0.15;
const OCF_MARGIN_SOLID: f64 = 0.08;
const FCF_MARGIN_STRONG: f64 = 0.10;
const FCF_MARGIN_POSITIVE: f64 = 0.05;
const CONVERSION_STRONG: f64 = 1.2;
const CONVERSION_CONSISTENT: f64 = 0.9;
const CONVERSION_WEAK: f64 = 0.5;

pub fn evaluate(
    metrics: &AverageMetrics,
    _bench: &SectorBenchmarks,
    sector: &SectorContext,
) -> RuleOutcome {
    let mut out = RuleOutcome::new();
    let financial = sector.sector_type == SectorType::Financial;

    let ocf = metrics.operating_cash_flow_margin;
    if ocf >= OCF_MARGIN_STRONG {
        out.adjust(10);
        out.signal(format!(
            "Strong operating cash generation ({:.1}% of revenue)",
            ocf * 100.0
        ));
    } else if ocf >= OCF_MARGIN_SOLID {
        out.adjust(5);
        out.signal(format!(
            "Solid operating cash generation ({:.1}% of revenue)",
            ocf * 100.0
        ));
    } else if ocf < 0.0 {
        out.adjust(-15);
        out.flag(format!(
            "Negative operating cash flow margin ({:.1}%)",
            ocf * 100.0
        ));
    }

    let fcf = metrics.free_cash_flow_margin;
    if fcf >= FCF_MARGIN_STRONG {
        out.adjust(8);
        out.signal(format!("Strong free cash flow ({:.1}% of revenue)", fcf * 100.0));
    } else if fcf >= FCF_MARGIN_POSITIVE {
        out.adjust(4);
        out.signal(format!(
            "Positive free cash flow ({:.1}% of revenue)",
            fcf * 100.0
        ));
    } else if fcf < 0.0 {
        out.adjust(-10);
        out.flag(format!("Negative free cash flow margin ({:.1}%)", fcf * 100.0));
    }

    let conv = metrics.cash_conversion;
    if conv >= CONVERSION_STRONG {
        out.adjust(8);
        out.signal(format!(
            "Strong cash conversion ({conv:.2}x of net income)"
        ));
    } else if conv >= CONVERSION_CONSISTENT {
        out.adjust(4);
        out.signal(format!(
            "Consistent cash conversion ({conv:.2}x of net income)"
        ));
    } else if conv < CONVERSION_WEAK {
        out.adjust(-10);
        if financial {
            // Intermediation cash flows track the loan book, not earnings.
            out.flag(format!(
                "Weak cash conversion ({conv:.2}x), partly expected for financial intermediation"
            ));
        } else {
            out.flag(format!(
                "Weak cash conversion ({conv:.2}x of net income)"
            ));
        }
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
    fn cash_generator_collects_all_three_signals() {
        let mut m = AverageMetrics::neutral();
        m.operating_cash_flow_margin = 0.20;
        m.free_cash_flow_margin = 0.12;
        m.cash_conversion = 1.3;
        let out = evaluate(&m, &bench(), &SectorContext::default());
        assert_eq!(out.positive_signals.len(), 3);
        assert_eq!(out.score_adjustment, 10 + 8 + 8);
    }

    #[test]
    fn cash_burner_flags_without_signals() {
        let mut m = AverageMetrics::neutral();
        m.operating_cash_flow_margin = -0.05;
        m.free_cash_flow_margin = -0.08;
        m.cash_conversion = 0.2;
        let out = evaluate(&m, &bench(), &SectorContext::default());
        assert!(out
            .red_flags
            .iter()
            .any(|f| f.contains("Negative operating cash flow")));
        assert!(out.red_flags.iter().any(|f| f.contains("Weak cash conversion")));
        assert!(out.positive_signals.is_empty());
        assert_eq!(out.score_adjustment, -15 - 10 - 10);
    }

    #[test]
    fn financial_weak_conversion_gets_softer_wording_same_penalty() {
        let sector = SectorContext {
            sector_type: SectorType::Financial,
            ..Default::default()
        };
        let mut m = AverageMetrics::neutral();
        m.cash_conversion = 0.1;
        let fin = evaluate(&m, &bench(), &sector);
        let corp = evaluate(&m, &bench(), &SectorContext::default());
        assert_eq!(fin.score_adjustment, corp.score_adjustment);
        assert!(fin
            .red_flags
            .iter()
            .any(|f| f.contains("partly expected")));
    }
}
