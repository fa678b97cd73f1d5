//! Secondary-indicator fallback layer.
//!
//! The statements sometimes cannot produce a metric (missing fields, failed
//! preconditions). When externally supplied indicator data exists, it fills
//! those holes; afterwards a neutral floor replaces whatever is still
//! missing. Within this layer a value of 0 or NaN counts as missing.

use crate::extractor::AverageMetrics;
use analysis_core::{FallbackData, Indicator};

/// Computed ROE below this is considered unmeasured for holding companies,
/// whose profits sit in equity-method income the statement ratios miss.
const HOLDING_ROE_OVERRIDE_BELOW: f64 = 0.01;

pub struct FallbackResolver<'a> {
    data: Option<&'a FallbackData>,
    reference_year: i32,
}

impl<'a> FallbackResolver<'a> {
    pub fn new(data: Option<&'a FallbackData>, reference_year: i32) -> Self {
        Self {
            data,
            reference_year,
        }
    }

    /// Substitute fallback indicators into missing metric fields, then apply
    /// the neutral floors. Total: works with or without fallback data.
    pub fn resolve(&self, metrics: &mut AverageMetrics) {
        if let Some(data) = self.data {
            let years = &data.years;
            let year = self.reference_year;

            // Holding override runs first: it may replace a small-but-nonzero
            // ROE that the generic pass would leave alone.
            if data.is_holding && metrics.roe < HOLDING_ROE_OVERRIDE_BELOW {
                if let Some(roe) = value_of(&data.roe, years, year) {
                    metrics.roe = roe;
                }
            }

            fill(&mut metrics.roe, &data.roe, years, year);
            fill(&mut metrics.roa, &data.roa, years, year);
            fill(&mut metrics.net_margin, &data.net_margin, years, year);
            fill(&mut metrics.gross_margin, &data.gross_margin, years, year);
            fill(&mut metrics.operating_margin, &data.operating_margin, years, year);
            fill(&mut metrics.current_ratio, &data.current_ratio, years, year);
            fill(&mut metrics.debt_to_equity, &data.debt_to_equity, years, year);
            fill(&mut metrics.asset_turnover, &data.asset_turnover, years, year);
            fill(&mut metrics.revenue_growth, &data.revenue_growth, years, year);
            fill(&mut metrics.interest_coverage, &data.interest_coverage, years, year);
        }

        apply_neutral_floors(metrics);
    }
}

/// Series indicators aligned with `years` average only the entries of
/// completed fiscal years, mirroring the statement-period filter. Scalars
/// and unaligned series keep the plain finite-mean reading.
fn value_of(indicator: &Option<Indicator>, years: &[i32], reference_year: i32) -> Option<f64> {
    match indicator.as_ref()? {
        Indicator::Series(values) if !years.is_empty() && values.len() == years.len() => {
            let finite: Vec<f64> = values
                .iter()
                .zip(years)
                .filter(|(v, &year)| v.is_finite() && year < reference_year)
                .map(|(v, _)| *v)
                .collect();
            if finite.is_empty() {
                None
            } else {
                Some(finite.iter().sum::<f64>() / finite.len() as f64)
            }
        }
        other => other.value(),
    }
}

fn missing(value: f64) -> bool {
    value == 0.0 || !value.is_finite()
}

fn fill(field: &mut f64, indicator: &Option<Indicator>, years: &[i32], reference_year: i32) {
    if missing(*field) {
        if let Some(v) = value_of(indicator, years, reference_year) {
            *field = v;
        }
    }
}

/// Structural ratios that cannot plausibly be zero get their neutral default
/// when nothing measured or substituted them. Flow metrics (margins, growth)
/// stay at zero: for those, zero is a legitimate pessimistic reading.
fn apply_neutral_floors(metrics: &mut AverageMetrics) {
    let neutral = AverageMetrics::neutral();
    for (field, default) in [
        (&mut metrics.current_ratio, neutral.current_ratio),
        (&mut metrics.quick_ratio, neutral.quick_ratio),
        (&mut metrics.interest_coverage, neutral.interest_coverage),
        (&mut metrics.cash_conversion, neutral.cash_conversion),
        (&mut metrics.asset_turnover, neutral.asset_turnover),
        (&mut metrics.equity_ratio, neutral.equity_ratio),
    ] {
        if missing(*field) {
            *field = default;
        }
    }
    if !metrics.roe.is_finite() {
        metrics.roe = 0.0;
    }
}
