use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One fiscal period of the income statement.
///
/// All monetary fields are optional: an absent field means "not reported",
/// which downstream rules treat differently from an explicit zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncomeRow {
    #[serde(default)]
    pub fiscal_year: Option<i32>,
    #[serde(default)]
    pub period_end: Option<NaiveDate>,
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub gross_profit: Option<f64>,
    #[serde(default)]
    pub operating_expenses: Option<f64>,
    #[serde(default)]
    pub operating_income: Option<f64>,
    #[serde(default)]
    pub ebit: Option<f64>,
    #[serde(default)]
    pub interest_income: Option<f64>,
    #[serde(default)]
    pub interest_expense: Option<f64>,
    /// Net financial result (financial income minus financial expenses).
    #[serde(default)]
    pub financial_result: Option<f64>,
    /// Other non-operating income.
    #[serde(default)]
    pub other_income: Option<f64>,
    #[serde(default)]
    pub pretax_income: Option<f64>,
    #[serde(default)]
    pub tax_expense: Option<f64>,
    #[serde(default)]
    pub net_income: Option<f64>,
}

/// One fiscal period of the balance sheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalanceRow {
    #[serde(default)]
    pub fiscal_year: Option<i32>,
    #[serde(default)]
    pub period_end: Option<NaiveDate>,
    #[serde(default)]
    pub total_assets: Option<f64>,
    #[serde(default)]
    pub current_assets: Option<f64>,
    #[serde(default)]
    pub cash_and_equivalents: Option<f64>,
    #[serde(default)]
    pub receivables: Option<f64>,
    #[serde(default)]
    pub inventory: Option<f64>,
    #[serde(default)]
    pub total_liabilities: Option<f64>,
    #[serde(default)]
    pub current_liabilities: Option<f64>,
    #[serde(default)]
    pub total_debt: Option<f64>,
    #[serde(default)]
    pub shareholders_equity: Option<f64>,
}

/// One fiscal period of the cash-flow statement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CashFlowRow {
    #[serde(default)]
    pub fiscal_year: Option<i32>,
    #[serde(default)]
    pub period_end: Option<NaiveDate>,
    #[serde(default)]
    pub operating_cash_flow: Option<f64>,
    #[serde(default)]
    pub investing_cash_flow: Option<f64>,
    #[serde(default)]
    pub financing_cash_flow: Option<f64>,
    #[serde(default)]
    pub capital_expenditure: Option<f64>,
}

/// Company identification used for benchmarking and classification seams.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub ticker: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub market_cap: Option<f64>,
}

/// Broad sector bucket driving benchmark overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SectorType {
    Financial,
    Technology,
    Utilities,
    ConsumerStaples,
    ConsumerDiscretionary,
    Industrial,
    Energy,
    Healthcare,
    BasicMaterials,
    RealEstate,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MarginExpectation {
    Low,
    #[default]
    Normal,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VolatilityTolerance {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SizeCategory {
    Small,
    #[default]
    Mid,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GrowthExpectation {
    Low,
    #[default]
    Moderate,
    High,
}

/// Sector classification output, derived once by an external classifier.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SectorContext {
    pub sector_type: SectorType,
    pub volatility_tolerance: VolatilityTolerance,
    pub margin_expectation: MarginExpectation,
    pub cash_intensive: bool,
}

/// Size classification output, derived once by an external classifier.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SizeContext {
    pub category: SizeCategory,
    pub volatility_tolerance: VolatilityTolerance,
    pub growth_expectation: GrowthExpectation,
}

impl SizeContext {
    /// Fallback derivation when no external classification is supplied.
    /// Magnitude thresholds only; currency-agnostic.
    pub fn from_market_cap(market_cap: Option<f64>) -> Self {
        let category = match market_cap {
            Some(cap) if cap >= 10_000_000_000.0 => SizeCategory::Large,
            Some(cap) if cap >= 2_000_000_000.0 => SizeCategory::Mid,
            Some(_) => SizeCategory::Small,
            None => SizeCategory::Mid,
        };
        let (volatility_tolerance, growth_expectation) = match category {
            SizeCategory::Large => (VolatilityTolerance::Low, GrowthExpectation::Low),
            SizeCategory::Mid => (VolatilityTolerance::Medium, GrowthExpectation::Moderate),
            SizeCategory::Small => (VolatilityTolerance::High, GrowthExpectation::High),
        };
        Self {
            category,
            volatility_tolerance,
            growth_expectation,
        }
    }
}

/// Outcome of a single rule family.
///
/// Immutable value: the engine concatenates family outcomes in one fixed
/// order, which decides what survives the first-N truncation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub score_adjustment: i32,
    pub red_flags: Vec<String>,
    pub positive_signals: Vec<String>,
    pub contextual_factors: Vec<String>,
}

impl RuleOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn adjust(&mut self, delta: i32) {
        self.score_adjustment += delta;
    }

    pub fn flag(&mut self, message: impl Into<String>) {
        self.red_flags.push(message.into());
    }

    pub fn signal(&mut self, message: impl Into<String>) {
        self.positive_signals.push(message.into());
    }

    pub fn context(&mut self, message: impl Into<String>) {
        self.contextual_factors.push(message.into());
    }
}

/// Statement-based risk classification, distinct from the blended score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CompanyStrength {
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

/// Output of the statement health scoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementsAnalysis {
    /// 0-100.
    pub score: u32,
    /// At most 8, insertion order.
    pub red_flags: Vec<String>,
    /// At most 6, insertion order.
    pub positive_signals: Vec<String>,
    pub risk_level: RiskLevel,
    pub company_strength: CompanyStrength,
    /// At most 3, insertion order.
    pub contextual_factors: Vec<String>,
}

/// Result of an external valuation strategy, consumed as an opaque record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyAnalysis {
    pub is_eligible: bool,
    /// 0-100.
    pub score: f64,
    #[serde(default)]
    pub fair_value: Option<f64>,
    /// Percent distance from current price to fair value.
    #[serde(default)]
    pub upside: Option<f64>,
    #[serde(default)]
    pub reasoning: String,
}

/// 11-tier letter grade over the blended investment score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    APlus,
    A,
    AMinus,
    BPlus,
    B,
    BMinus,
    CPlus,
    C,
    CMinus,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 90 => Grade::APlus,
            s if s >= 85 => Grade::A,
            s if s >= 80 => Grade::AMinus,
            s if s >= 75 => Grade::BPlus,
            s if s >= 70 => Grade::B,
            s if s >= 65 => Grade::BMinus,
            s if s >= 55 => Grade::CPlus,
            s if s >= 45 => Grade::C,
            s if s >= 35 => Grade::CMinus,
            s if s >= 25 => Grade::D,
            _ => Grade::F,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::AMinus => "A-",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::BMinus => "B-",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::CMinus => "C-",
            Grade::D => "D",
            Grade::F => "F",
        }
    }

    pub fn classification(&self) -> &'static str {
        match self {
            Grade::APlus => "Exceptional",
            Grade::A => "Excellent",
            Grade::AMinus => "Very Good",
            Grade::BPlus => "Good",
            Grade::B => "Above Average",
            Grade::BMinus => "Average",
            Grade::CPlus => "Below Average",
            Grade::C => "Weak",
            Grade::CMinus => "Fragile",
            Grade::D => "Poor",
            Grade::F => "Very Poor",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Grade::APlus | Grade::A => "Strong Buy",
            Grade::AMinus | Grade::BPlus => "Buy",
            Grade::B | Grade::BMinus => "Moderate Buy",
            Grade::CPlus | Grade::C => "Hold",
            Grade::CMinus | Grade::D => "Sell",
            Grade::F => "Strong Sell",
        }
    }
}

/// Per-strategy line of the optional aggregator breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyContribution {
    pub name: String,
    /// Score after price-compatibility and risk capping, as weighted.
    pub used_score: f64,
    pub weight: f64,
    /// used_score x weight.
    pub points: f64,
    pub eligible: bool,
    pub description: String,
}

/// Blended investment score over all strategies plus the statement engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallScore {
    /// 0-100, after all post-hoc penalties.
    pub score: u32,
    pub grade: Grade,
    pub classification: String,
    /// At most 5, insertion order.
    pub strengths: Vec<String>,
    /// At most 5, insertion order.
    pub weaknesses: Vec<String>,
    pub recommendation: String,
    pub statements: StatementsAnalysis,
    /// Present when the caller requested a breakdown; sorted by points desc.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributions: Option<Vec<StrategyContribution>>,
    /// Unrounded pre-penalty weighted score, present with the breakdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_score: Option<f64>,
}

/// Secondary indicator: a point-in-time scalar or a per-year series.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Indicator {
    Scalar(f64),
    Series(Vec<f64>),
}

impl Indicator {
    /// Scalar value, or the mean of the finite series entries.
    pub fn value(&self) -> Option<f64> {
        match self {
            Indicator::Scalar(v) if v.is_finite() => Some(*v),
            Indicator::Scalar(_) => None,
            Indicator::Series(values) => {
                let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
                if finite.is_empty() {
                    None
                } else {
                    Some(finite.iter().sum::<f64>() / finite.len() as f64)
                }
            }
        }
    }
}

/// Externally supplied secondary indicators used to backfill metrics the
/// statements could not produce.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FallbackData {
    #[serde(default)]
    pub roe: Option<Indicator>,
    #[serde(default)]
    pub roa: Option<Indicator>,
    #[serde(default)]
    pub net_margin: Option<Indicator>,
    #[serde(default)]
    pub gross_margin: Option<Indicator>,
    #[serde(default)]
    pub operating_margin: Option<Indicator>,
    #[serde(default)]
    pub current_ratio: Option<Indicator>,
    #[serde(default)]
    pub debt_to_equity: Option<Indicator>,
    #[serde(default)]
    pub asset_turnover: Option<Indicator>,
    #[serde(default)]
    pub revenue_growth: Option<Indicator>,
    #[serde(default)]
    pub interest_coverage: Option<Indicator>,
    /// Fiscal years the series indicators cover, index-aligned with their
    /// entries. When present, in-progress years are excluded from averaging.
    #[serde(default)]
    pub years: Vec<i32>,
    /// Profits come mainly from equity-method stakes in subsidiaries.
    #[serde(default)]
    pub is_holding: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_ladder_has_eleven_tiers() {
        let grades: Vec<Grade> = [95, 87, 82, 77, 72, 67, 60, 50, 40, 30, 10]
            .iter()
            .map(|&s| Grade::from_score(s))
            .collect();
        let mut unique = grades.clone();
        unique.dedup();
        assert_eq!(unique.len(), 11);
        assert_eq!(grades[0], Grade::APlus);
        assert_eq!(grades[10], Grade::F);
    }

    #[test]
    fn grade_boundaries() {
        assert_eq!(Grade::from_score(90), Grade::APlus);
        assert_eq!(Grade::from_score(89), Grade::A);
        assert_eq!(Grade::from_score(25), Grade::D);
        assert_eq!(Grade::from_score(24), Grade::F);
        assert_eq!(Grade::from_score(0), Grade::F);
    }

    #[test]
    fn indicator_series_averages_finite_values() {
        let ind = Indicator::Series(vec![0.10, 0.20, f64::NAN]);
        let avg = ind.value().unwrap();
        assert!((avg - 0.15).abs() < 1e-12);
        assert_eq!(Indicator::Series(vec![]).value(), None);
        assert_eq!(Indicator::Scalar(f64::INFINITY).value(), None);
    }

    #[test]
    fn size_context_from_market_cap() {
        assert_eq!(
            SizeContext::from_market_cap(Some(50e9)).category,
            SizeCategory::Large
        );
        assert_eq!(
            SizeContext::from_market_cap(Some(5e9)).category,
            SizeCategory::Mid
        );
        assert_eq!(
            SizeContext::from_market_cap(Some(5e8)).category,
            SizeCategory::Small
        );
        assert_eq!(
            SizeContext::from_market_cap(None).category,
            SizeCategory::Mid
        );
    }
}
