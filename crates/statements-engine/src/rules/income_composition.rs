use crate::extractor::operating_result;
use analysis_core::{IncomeRow, RuleOutcome, SectorContext, SectorType};

/// Periods checked for earnings quality.
const PERIODS: usize = 3;

/// Non-operating income above this share of net income makes a profitable
/// period problematic.
const NON_OPERATING_SHARE: f64 = 0.5;

/// Large raw penalties; the score layer converts them to bounded deductions.
const PENALTY_CHRONIC: i32 = -300;
const PENALTY_PARTIAL: i32 = -50;

pub fn evaluate(income: &[IncomeRow], sector: &SectorContext, is_holding: bool) -> RuleOutcome {
    let mut out = RuleOutcome::new();

    // Financial income IS the operating line for banks and insurers.
    if sector.sector_type == SectorType::Financial {
        return out;
    }
    if is_holding {
        out.signal("Equity-method income expected for a holding company");
        return out;
    }

    let mut qualifying = 0usize;
    let mut problematic = 0usize;
    for row in income.iter().take(PERIODS) {
        let ni = match row.net_income {
            Some(v) if v > 0.0 => v,
            _ => continue,
        };
        qualifying += 1;

        let non_op = if row.financial_result.is_some() || row.other_income.is_some() {
            row.financial_result.unwrap_or(0.0) + row.other_income.unwrap_or(0.0)
        } else {
            match operating_result(row) {
                Some(op) => ni - op,
                None => continue,
            }
        };
        if non_op > NON_OPERATING_SHARE * ni {
            problematic += 1;
        }
    }

    if qualifying < 2 {
        return out;
    }

    if problematic > qualifying / 2 {
        out.adjust(PENALTY_CHRONIC);
        out.flag(format!(
            "Profits rely on non-operating income ({problematic} of {qualifying} profitable periods)"
        ));
    } else if problematic >= 1 {
        out.adjust(PENALTY_PARTIAL);
        out.flag(format!(
            "Profits partly rely on non-operating income ({problematic} of {qualifying} profitable periods)"
        ));
    } else {
        out.adjust(10);
        out.signal("Profits grounded in operating results");
    }

    out
}
