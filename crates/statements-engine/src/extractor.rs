//! Metric extraction over the aligned statement periods.
//!
//! Each ratio contributes per period only when its preconditions hold, is
//! checked against an explicit sanity bound, and is replaced by a documented
//! conservative proxy when the bound trips. The result is an average over the
//! valid-period count of each field; growth and stability fields are computed
//! from the ordered series instead of averaged.

use analysis_core::{BalanceRow, CashFlowRow, IncomeRow};
use serde::{Deserialize, Serialize};

// Sanity bounds. Values beyond these are data errors, not information.
const MAX_ABS_ROE: f64 = 10.0; // |1000%|
const MAX_ABS_ROA: f64 = 5.0;
const MAX_ABS_MARGIN: f64 = 5.0;
const MAX_ABS_GROSS_MARGIN: f64 = 2.0;
const MAX_CURRENT_RATIO: f64 = 50.0;
const MAX_ASSET_TURNOVER: f64 = 20.0;
const MAX_SECONDARY_TURNOVER: f64 = 100.0;
const MAX_DEBT_TO_EQUITY: f64 = 100.0;
const DEBT_TO_EQUITY_PROXY_CAP: f64 = 10.0;
const MAX_ABS_INTEREST_COVERAGE: f64 = 1000.0;
const MAX_CASH_CONVERSION: f64 = 10.0;
const MIN_CAGR: f64 = -0.99;
const MAX_CAGR: f64 = 5.0;

/// Equity below this share of assets is treated as a reporting artifact.
const MIN_EQUITY_TO_ASSETS: f64 = 0.001;

/// Averaged ratios over the valid periods, plus series-derived growth and
/// stability fields. Every field is either a sanity-bounded computed value or
/// the neutral default from [`AverageMetrics::neutral`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub roe: f64,
    pub roa: f64,
    pub net_margin: f64,
    pub gross_margin: f64,
    pub operating_margin: f64,
    pub current_ratio: f64,
    pub quick_ratio: f64,
    /// Working capital over total assets.
    pub working_capital_ratio: f64,
    pub asset_turnover: f64,
    pub receivables_turnover: f64,
    pub inventory_turnover: f64,
    pub debt_to_equity: f64,
    pub debt_to_assets: f64,
    pub equity_ratio: f64,
    pub interest_coverage: f64,
    /// CAGR of oldest-vs-newest positive revenue.
    pub revenue_growth: f64,
    /// CAGR of oldest-vs-newest positive net income.
    pub profit_growth: f64,
    pub operating_cash_flow_margin: f64,
    pub free_cash_flow_margin: f64,
    /// Operating cash flow over net income, profitable periods only.
    pub cash_conversion: f64,
    /// 1 - coefficient of variation, clamped to [0, 1].
    pub revenue_stability: f64,
    pub margin_stability: f64,
    pub earnings_stability: f64,
    /// Loss-making periods among the 3 most recent.
    pub loss_periods: u32,
}

impl AverageMetrics {
    /// Neutral "benefit of the doubt" defaults used when no period can be
    /// measured. Deliberately not zeros: a zero current ratio or coverage
    /// would read as distress rather than absence of data.
    pub fn neutral() -> Self {
        Self {
            roe: 0.10,
            roa: 0.05,
            net_margin: 0.08,
            gross_margin: 0.30,
            operating_margin: 0.10,
            current_ratio: 1.0,
            quick_ratio: 0.8,
            working_capital_ratio: 0.05,
            asset_turnover: 0.5,
            receivables_turnover: 6.0,
            inventory_turnover: 4.0,
            debt_to_equity: 1.0,
            debt_to_assets: 0.5,
            equity_ratio: 0.4,
            interest_coverage: 5.0,
            revenue_growth: 0.03,
            profit_growth: 0.03,
            operating_cash_flow_margin: 0.08,
            free_cash_flow_margin: 0.04,
            cash_conversion: 1.0,
            revenue_stability: 0.5,
            margin_stability: 0.5,
            earnings_stability: 0.5,
            loss_periods: 0,
        }
    }
}

/// Per-field running average over valid observations only.
#[derive(Debug, Default, Clone, Copy)]
struct Acc {
    sum: f64,
    count: u32,
}

impl Acc {
    fn push(&mut self, value: f64) {
        if value.is_finite() {
            self.sum += value;
            self.count += 1;
        }
    }

    fn push_opt(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.push(v);
        }
    }

    fn average(&self) -> f64 {
        if self.count > 0 {
            self.sum / self.count as f64
        } else {
            0.0
        }
    }
}

pub struct MetricExtractor<'a> {
    income: &'a [IncomeRow],
    balance: &'a [BalanceRow],
    cash_flow: &'a [CashFlowRow],
    likely_bank: bool,
}

impl<'a> MetricExtractor<'a> {
    pub fn new(
        income: &'a [IncomeRow],
        balance: &'a [BalanceRow],
        cash_flow: &'a [CashFlowRow],
        likely_bank: bool,
    ) -> Self {
        Self {
            income,
            balance,
            cash_flow,
            likely_bank,
        }
    }

    pub fn extract(&self) -> AverageMetrics {
        let periods = self
            .income
            .len()
            .min(self.balance.len())
            .min(self.cash_flow.len());
        if periods == 0 {
            return AverageMetrics::neutral();
        }

        let mut roe = Acc::default();
        let mut roa = Acc::default();
        let mut net_margin = Acc::default();
        let mut gross_margin = Acc::default();
        let mut operating_margin = Acc::default();
        let mut current_ratio = Acc::default();
        let mut quick_ratio = Acc::default();
        let mut working_capital = Acc::default();
        let mut asset_turnover = Acc::default();
        let mut receivables_turnover = Acc::default();
        let mut inventory_turnover = Acc::default();
        let mut debt_to_equity = Acc::default();
        let mut debt_to_assets = Acc::default();
        let mut equity_ratio = Acc::default();
        let mut interest_coverage = Acc::default();
        let mut ocf_margin = Acc::default();
        let mut fcf_margin = Acc::default();
        let mut cash_conversion = Acc::default();

        for i in 0..periods {
            let inc = &self.income[i];
            let bal = &self.balance[i];
            let cf = &self.cash_flow[i];

            let assets = bal.total_assets.filter(|a| *a > 0.0);
            let equity = match (bal.shareholders_equity, assets) {
                (Some(e), Some(a)) if e > 0.0 && e > MIN_EQUITY_TO_ASSETS * a => Some(e),
                _ => None,
            };
            let revenue = inc.revenue.filter(|r| *r > 0.0);
            let liabilities = match (bal.total_liabilities, assets) {
                (Some(l), Some(a)) if l >= 0.0 && l < 10.0 * a => Some(l),
                _ => None,
            };

            let period_roa = match (inc.net_income, assets) {
                (Some(ni), Some(a)) => {
                    let value = ni / a;
                    (value.abs() <= MAX_ABS_ROA).then_some(value)
                }
                _ => None,
            };
            roa.push_opt(period_roa);

            if let (Some(ni), Some(e)) = (inc.net_income, equity) {
                let value = ni / e;
                if value.abs() <= MAX_ABS_ROE {
                    roe.push(value);
                } else {
                    // Implausible ROE from near-zero equity: fall back to the
                    // asset-based return for this period.
                    roe.push_opt(period_roa);
                }
            }

            if let (Some(ni), Some(rev)) = (inc.net_income, revenue) {
                let value = ni / rev;
                if value.abs() <= MAX_ABS_MARGIN {
                    net_margin.push(value);
                }
            }
            if let (Some(gp), Some(rev)) = (inc.gross_profit, revenue) {
                let value = gp / rev;
                if value.abs() <= MAX_ABS_GROSS_MARGIN {
                    gross_margin.push(value);
                }
            }
            if let (Some(op), Some(rev)) = (operating_result(inc), revenue) {
                let value = op / rev;
                if value.abs() <= MAX_ABS_MARGIN {
                    operating_margin.push(value);
                }
            }

            if let (Some(ca), Some(cl)) = (bal.current_assets, bal.current_liabilities) {
                if cl > 0.0 && ca >= 0.0 {
                    let value = ca / cl;
                    if value <= MAX_CURRENT_RATIO {
                        current_ratio.push(value);
                    }
                    let quick = (ca - bal.inventory.unwrap_or(0.0)) / cl;
                    if quick.abs() <= MAX_CURRENT_RATIO {
                        quick_ratio.push(quick);
                    }
                }
                if let Some(a) = assets {
                    working_capital.push(((ca - cl) / a).clamp(-1.0, 1.0));
                }
            }

            if let (Some(rev), Some(a)) = (revenue, assets) {
                let value = rev / a;
                if value <= MAX_ASSET_TURNOVER {
                    asset_turnover.push(value);
                }
            }
            if let (Some(rev), Some(rec)) = (revenue, bal.receivables.filter(|v| *v > 0.0)) {
                receivables_turnover.push((rev / rec).min(MAX_SECONDARY_TURNOVER));
            }
            if let (Some(rev), Some(inv)) = (revenue, bal.inventory.filter(|v| *v > 0.0)) {
                inventory_turnover.push((rev / inv).min(MAX_SECONDARY_TURNOVER));
            }

            let period_d2a = match (liabilities, assets) {
                (Some(l), Some(a)) => Some(l / a),
                _ => None,
            };
            debt_to_assets.push_opt(period_d2a);
            if let (Some(l), Some(e)) = (liabilities, equity) {
                let value = l / e;
                if value <= MAX_DEBT_TO_EQUITY {
                    debt_to_equity.push(value);
                } else if let Some(d2a) = period_d2a {
                    // Implausible leverage ratio: proxy from debt-to-assets.
                    debt_to_equity.push((2.0 * d2a).min(DEBT_TO_EQUITY_PROXY_CAP));
                }
            }
            if let (Some(e), Some(a)) = (equity, assets) {
                equity_ratio.push((e / a).min(1.0));
            }

            interest_coverage.push_opt(self.period_interest_coverage(inc));

            if let (Some(ocf), Some(rev)) = (cf.operating_cash_flow, revenue) {
                let value = ocf / rev;
                if value.abs() <= MAX_ABS_MARGIN {
                    ocf_margin.push(value);
                }
                if let Some(fcf) = free_cash_flow(cf) {
                    let fcf_value = fcf / rev;
                    if fcf_value.abs() <= MAX_ABS_MARGIN {
                        fcf_margin.push(fcf_value);
                    }
                }
                if let Some(ni) = inc.net_income.filter(|v| *v > 0.0) {
                    cash_conversion.push((ocf / ni).min(MAX_CASH_CONVERSION));
                }
            }
        }

        let revenues: Vec<Option<f64>> = self.income.iter().map(|r| r.revenue).collect();
        let profits: Vec<Option<f64>> = self.income.iter().map(|r| r.net_income).collect();
        let margins: Vec<f64> = self
            .income
            .iter()
            .filter_map(|r| match (r.net_income, r.revenue.filter(|v| *v > 0.0)) {
                (Some(ni), Some(rev)) => Some(ni / rev),
                _ => None,
            })
            .collect();
        let revenue_values: Vec<f64> = revenues.iter().flatten().copied().filter(|v| *v > 0.0).collect();
        let profit_values: Vec<f64> = profits.iter().flatten().copied().collect();

        let loss_periods = self
            .income
            .iter()
            .take(3)
            .filter(|r| r.net_income.map(|ni| ni < 0.0).unwrap_or(false))
            .count() as u32;

        AverageMetrics {
            roe: roe.average(),
            roa: roa.average(),
            net_margin: net_margin.average(),
            gross_margin: gross_margin.average(),
            operating_margin: operating_margin.average(),
            current_ratio: current_ratio.average(),
            quick_ratio: quick_ratio.average(),
            working_capital_ratio: working_capital.average(),
            asset_turnover: asset_turnover.average(),
            receivables_turnover: receivables_turnover.average(),
            inventory_turnover: inventory_turnover.average(),
            debt_to_equity: debt_to_equity.average(),
            debt_to_assets: debt_to_assets.average(),
            equity_ratio: equity_ratio.average(),
            interest_coverage: interest_coverage.average(),
            revenue_growth: cagr(&revenues),
            profit_growth: cagr(&profits),
            operating_cash_flow_margin: ocf_margin.average(),
            free_cash_flow_margin: fcf_margin.average(),
            cash_conversion: cash_conversion.average(),
            revenue_stability: stability(&revenue_values),
            margin_stability: stability(&margins),
            earnings_stability: stability(&profit_values),
            loss_periods,
        }
    }

    /// Coverage of financing costs by the operating result. For banks the
    /// interest expense is a funding cost rather than leverage service, so
    /// interest income is folded back in and near-zero coverage is normal.
    fn period_interest_coverage(&self, inc: &IncomeRow) -> Option<f64> {
        let expense = inc.interest_expense.map(f64::abs).filter(|v| *v > 0.0)?;
        let op = operating_result(inc)?;
        let numerator = if self.likely_bank {
            op + inc.interest_income.unwrap_or(0.0)
        } else {
            op
        };
        Some((numerator / expense).clamp(-MAX_ABS_INTEREST_COVERAGE, MAX_ABS_INTEREST_COVERAGE))
    }
}

/// Operating result with fallback order: EBIT, then gross profit minus
/// operating expenses, then the reported operating income line.
pub fn operating_result(inc: &IncomeRow) -> Option<f64> {
    if let Some(ebit) = inc.ebit {
        return Some(ebit);
    }
    if let (Some(gp), Some(opex)) = (inc.gross_profit, inc.operating_expenses) {
        return Some(gp - opex.abs());
    }
    inc.operating_income
}

fn free_cash_flow(cf: &CashFlowRow) -> Option<f64> {
    let ocf = cf.operating_cash_flow?;
    if let Some(capex) = cf.capital_expenditure {
        Some(ocf - capex.abs())
    } else {
        cf.investing_cash_flow.map(|inv| ocf + inv)
    }
}

/// CAGR between the oldest and newest positive values of a most-recent-first
/// series. Requires at least two positive points; bounded to a plausible
/// range.
pub fn cagr(series: &[Option<f64>]) -> f64 {
    let positives: Vec<(usize, f64)> = series
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.filter(|x| *x > 0.0).map(|x| (i, x)))
        .collect();
    if positives.len() < 2 {
        return 0.0;
    }
    let (newest_idx, newest) = positives[0];
    let (oldest_idx, oldest) = positives[positives.len() - 1];
    let years = oldest_idx.saturating_sub(newest_idx);
    if years == 0 {
        return 0.0;
    }
    let growth = (newest / oldest).powf(1.0 / years as f64) - 1.0;
    growth.clamp(MIN_CAGR, MAX_CAGR)
}

/// 1 - coefficient of variation, clamped to [0, 1]. Fewer than two valid
/// points yields the neutral 0.5.
pub fn stability(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.5;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean.abs() < 1e-12 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let cv = variance.sqrt() / mean.abs();
    (1.0 - cv).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn income(revenue: f64, net_income: f64) -> IncomeRow {
        IncomeRow {
            revenue: Some(revenue),
            net_income: Some(net_income),
            ..Default::default()
        }
    }

    fn balance(assets: f64, liabilities: f64, equity: f64) -> BalanceRow {
        BalanceRow {
            total_assets: Some(assets),
            total_liabilities: Some(liabilities),
            shareholders_equity: Some(equity),
            ..Default::default()
        }
    }

    fn cash(ocf: f64) -> CashFlowRow {
        CashFlowRow {
            operating_cash_flow: Some(ocf),
            ..Default::default()
        }
    }

    #[test]
    fn zero_periods_yields_neutral_defaults() {
        let extractor = MetricExtractor::new(&[], &[], &[], false);
        let metrics = extractor.extract();
        assert_eq!(metrics, AverageMetrics::neutral());
        assert_eq!(metrics.current_ratio, 1.0);
        assert_eq!(metrics.interest_coverage, 5.0);
    }

    #[test]
    fn basic_ratio_averaging() {
        let inc = vec![income(1000.0, 100.0), income(900.0, 90.0)];
        let bal = vec![balance(2000.0, 800.0, 1000.0), balance(1800.0, 700.0, 900.0)];
        let cf = vec![cash(120.0), cash(110.0)];
        let metrics = MetricExtractor::new(&inc, &bal, &cf, false).extract();
        assert!((metrics.roe - 0.10).abs() < 1e-9);
        assert!((metrics.net_margin - 0.10).abs() < 1e-9);
        assert!((metrics.debt_to_equity - (0.8 + 700.0 / 900.0) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn implausible_equity_falls_back_to_roa() {
        // Equity is 0.01% of assets: ROE precondition fails, ROA proxy kicks in.
        let inc = vec![income(1000.0, 100.0), income(1000.0, 100.0)];
        let bal = vec![balance(1_000_000.0, 900_000.0, 100.0); 2];
        let cf = vec![cash(100.0), cash(100.0)];
        let metrics = MetricExtractor::new(&inc, &bal, &cf, false).extract();
        // Equity fails plausibility, so no ROE observation is made at all;
        // the field stays 0 for the fallback layer.
        assert_eq!(metrics.roe, 0.0);
        assert!((metrics.roa - 0.0001).abs() < 1e-9);
    }

    #[test]
    fn out_of_bound_leverage_uses_debt_to_assets_proxy() {
        let inc = vec![income(1000.0, 50.0), income(1000.0, 50.0)];
        // Equity is plausible (>0.1% of assets) but leverage is 150x.
        let mut row = balance(3_000_000.0, 2_700_000.0, 18_000.0);
        row.shareholders_equity = Some(18_000.0);
        let bal = vec![row.clone(), row];
        let cf = vec![cash(60.0), cash(60.0)];
        let metrics = MetricExtractor::new(&inc, &bal, &cf, false).extract();
        let d2a = 2_700_000.0 / 3_000_000.0;
        assert!((metrics.debt_to_equity - (2.0 * d2a)).abs() < 1e-9);
    }

    #[test]
    fn cagr_needs_two_positive_points() {
        assert_eq!(cagr(&[Some(100.0)]), 0.0);
        assert_eq!(cagr(&[Some(100.0), Some(-50.0)]), 0.0);
        // 4 periods most-recent-first: 133.1 today, 100 three years ago = 10%/yr
        let series = vec![Some(133.1), Some(121.0), Some(110.0), Some(100.0)];
        assert!((cagr(&series) - 0.10).abs() < 1e-9);
    }

    #[test]
    fn cagr_skips_nonpositive_endpoints() {
        // Oldest period is negative: CAGR anchors on the oldest positive one.
        let series = vec![Some(121.0), Some(110.0), Some(100.0), Some(-5.0)];
        assert!((cagr(&series) - 0.10).abs() < 1e-9);
    }

    #[test]
    fn stability_defaults_and_clamps() {
        assert_eq!(stability(&[]), 0.5);
        assert_eq!(stability(&[100.0]), 0.5);
        assert_eq!(stability(&[100.0, 100.0, 100.0]), 1.0);
        // Wildly volatile series clamps to 0 instead of going negative
        assert_eq!(stability(&[1.0, 1000.0, 1.0, 1000.0]), 0.0);
    }

    #[test]
    fn interest_coverage_skips_zero_expense() {
        let mut inc_row = income(1000.0, 100.0);
        inc_row.ebit = Some(150.0);
        inc_row.interest_expense = Some(0.0);
        let inc = vec![inc_row.clone(), inc_row];
        let bal = vec![balance(2000.0, 800.0, 1000.0); 2];
        let cf = vec![cash(100.0), cash(100.0)];
        let metrics = MetricExtractor::new(&inc, &bal, &cf, false).extract();
        // No observation: stays 0 until the fallback/neutral layer fills it.
        assert_eq!(metrics.interest_coverage, 0.0);
    }

    #[test]
    fn bank_coverage_folds_interest_income_back_in() {
        let mut row = income(1000.0, 100.0);
        row.ebit = Some(50.0);
        row.interest_income = Some(400.0);
        row.interest_expense = Some(300.0);
        let inc = vec![row.clone(), row];
        let bal = vec![balance(10_000.0, 9_000.0, 1_000.0); 2];
        let cf = vec![cash(100.0), cash(100.0)];

        let bank = MetricExtractor::new(&inc, &bal, &cf, true).extract();
        let corp = MetricExtractor::new(&inc, &bal, &cf, false).extract();
        assert!((bank.interest_coverage - 1.5).abs() < 1e-9);
        assert!((corp.interest_coverage - (50.0 / 300.0)).abs() < 1e-9);
    }

    #[test]
    fn loss_periods_counts_last_three_only() {
        let inc = vec![
            income(100.0, -10.0),
            income(100.0, -5.0),
            income(100.0, 10.0),
            income(100.0, -50.0),
        ];
        let bal = vec![balance(200.0, 80.0, 100.0); 4];
        let cf = vec![cash(10.0); 4];
        let metrics = MetricExtractor::new(&inc, &bal, &cf, false).extract();
        assert_eq!(metrics.loss_periods, 2);
    }
}
