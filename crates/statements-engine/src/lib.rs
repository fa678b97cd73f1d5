//! Financial statement health scoring.
//!
//! Given up to several years of income, balance, and cash-flow periods, the
//! engine extracts sanity-bounded average metrics, benchmarks them against
//! sector- and size-specific thresholds, runs seven rule families, reconciles
//! contradictory findings, and produces a 0-100 health score with risk and
//! strength classifications. Everything is pure and synchronous; the caller
//! injects the clock as a reference year.

pub mod benchmarks;
pub mod classify;
pub mod extractor;
pub mod fallback;
pub mod reconciler;
pub mod rules;
pub mod score;
pub mod strength;
pub mod validator;

use analysis_core::{
    AnalysisError, BalanceRow, CashFlowRow, CompanyInfo, FallbackData, IncomeRow, RiskLevel,
    RuleOutcome, SectorClassifier, SectorContext, SizeClassifier, SizeContext, StatementsAnalysis,
    coerce,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::classify::{MarketCapSizeClassifier, NameSectorClassifier};
use crate::extractor::MetricExtractor;
use crate::fallback::FallbackResolver;

/// Output truncation limits, insertion order.
const MAX_RED_FLAGS: usize = 8;
const MAX_POSITIVE_SIGNALS: usize = 6;
const MAX_CONTEXTUAL_FACTORS: usize = 3;

/// Everything the engine needs for one company. Statement sequences are
/// ordered most-recent-first; sector and size contexts are optional and
/// derived from `company` when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementsInput {
    #[serde(default)]
    pub income: Vec<IncomeRow>,
    #[serde(default)]
    pub balance: Vec<BalanceRow>,
    #[serde(default)]
    pub cash_flow: Vec<CashFlowRow>,
    #[serde(default)]
    pub company: Option<CompanyInfo>,
    #[serde(default)]
    pub sector: Option<SectorContext>,
    #[serde(default)]
    pub size: Option<SizeContext>,
    #[serde(default)]
    pub fallback: Option<FallbackData>,
}

impl StatementsInput {
    /// Tolerant parse from loosely typed JSON, as produced by scrapers and
    /// third-party statement APIs: numbers may arrive as localized strings,
    /// percentages, or placeholder dashes, and fields go by several names.
    pub fn from_value(value: &Value) -> Result<Self, AnalysisError> {
        let obj = value
            .as_object()
            .ok_or_else(|| AnalysisError::InvalidInput("statement payload must be an object".into()))?;

        let rows = |key: &str| -> Vec<&Value> {
            obj.get(key)
                .and_then(Value::as_array)
                .map(|a| a.iter().collect())
                .unwrap_or_default()
        };

        if ["income", "balance", "cash_flow"]
            .iter()
            .all(|k| obj.get(*k).and_then(Value::as_array).is_none())
        {
            return Err(AnalysisError::InsufficientData(
                "payload carries no statement arrays".into(),
            ));
        }

        let income = rows("income").into_iter().map(parse_income_row).collect();
        let balance = rows("balance").into_iter().map(parse_balance_row).collect();
        let cash_flow = rows("cash_flow").into_iter().map(parse_cash_flow_row).collect();

        let company = match obj.get("company") {
            Some(v) if !v.is_null() => Some(serde_json::from_value(v.clone())?),
            _ => None,
        };
        let fallback = match obj.get("fallback") {
            Some(v) if !v.is_null() => Some(serde_json::from_value(v.clone())?),
            _ => None,
        };

        Ok(Self {
            income,
            balance,
            cash_flow,
            company,
            sector: None,
            size: None,
            fallback,
        })
    }
}

fn parse_year(row: &Value, keys: &[&str]) -> Option<i32> {
    coerce::field(row, keys).map(|v| v as i32)
}

fn parse_income_row(row: &Value) -> IncomeRow {
    IncomeRow {
        fiscal_year: parse_year(row, &["fiscal_year", "year", "ano"]),
        period_end: None,
        revenue: coerce::field(row, &["revenue", "total_revenue", "net_revenue", "receita_liquida"]),
        gross_profit: coerce::field(row, &["gross_profit", "resultado_bruto"]),
        operating_expenses: coerce::field(row, &["operating_expenses", "despesas_operacionais"]),
        operating_income: coerce::field(row, &["operating_income", "resultado_operacional"]),
        ebit: coerce::field(row, &["ebit"]),
        interest_income: coerce::field(row, &["interest_income", "receitas_financeiras"]),
        interest_expense: coerce::field(row, &["interest_expense", "despesas_financeiras"]),
        financial_result: coerce::field(row, &["financial_result", "resultado_financeiro"]),
        other_income: coerce::field(row, &["other_income", "outras_receitas"]),
        pretax_income: coerce::field(row, &["pretax_income", "lair"]),
        tax_expense: coerce::field(row, &["tax_expense", "impostos"]),
        net_income: coerce::field(row, &["net_income", "lucro_liquido", "profit"]),
    }
}

fn parse_balance_row(row: &Value) -> BalanceRow {
    BalanceRow {
        fiscal_year: parse_year(row, &["fiscal_year", "year", "ano"]),
        period_end: None,
        total_assets: coerce::field(row, &["total_assets", "ativo_total"]),
        current_assets: coerce::field(row, &["current_assets", "ativo_circulante"]),
        cash_and_equivalents: coerce::field(row, &["cash_and_equivalents", "cash", "caixa"]),
        receivables: coerce::field(row, &["receivables", "contas_a_receber"]),
        inventory: coerce::field(row, &["inventory", "estoques"]),
        total_liabilities: coerce::field(row, &["total_liabilities", "passivo_total"]),
        current_liabilities: coerce::field(row, &["current_liabilities", "passivo_circulante"]),
        total_debt: coerce::field(row, &["total_debt", "divida_bruta"]),
        shareholders_equity: coerce::field(
            row,
            &["shareholders_equity", "patrimonio_liquido", "equity"],
        ),
    }
}

fn parse_cash_flow_row(row: &Value) -> CashFlowRow {
    CashFlowRow {
        fiscal_year: parse_year(row, &["fiscal_year", "year", "ano"]),
        period_end: None,
        operating_cash_flow: coerce::field(row, &["operating_cash_flow", "fco"]),
        investing_cash_flow: coerce::field(row, &["investing_cash_flow", "fci"]),
        financing_cash_flow: coerce::field(row, &["financing_cash_flow", "fcf"]),
        capital_expenditure: coerce::field(row, &["capital_expenditure", "capex"]),
    }
}

/// Runs the full statement analysis.
///
/// `reference_year` is the injected clock: periods dated in it or later are
/// dropped as incomplete fiscal years before anything else runs. With fewer
/// than two completed periods in any statement, a fixed benefit-of-the-doubt
/// result is returned instead of scoring noise.
pub fn analyze_financial_statements(
    input: &StatementsInput,
    reference_year: i32,
) -> StatementsAnalysis {
    let completed = |year: Option<i32>| year.map_or(true, |y| y < reference_year);
    let income: Vec<IncomeRow> = input
        .income
        .iter()
        .filter(|r| completed(r.fiscal_year))
        .cloned()
        .collect();
    let balance: Vec<BalanceRow> = input
        .balance
        .iter()
        .filter(|r| completed(r.fiscal_year))
        .cloned()
        .collect();
    let cash_flow: Vec<CashFlowRow> = input
        .cash_flow
        .iter()
        .filter(|r| completed(r.fiscal_year))
        .cloned()
        .collect();

    if income.len() < 2 || balance.len() < 2 || cash_flow.len() < 2 {
        return insufficient_history();
    }

    let company = input.company.as_ref();
    let sector = input.sector.unwrap_or_else(|| {
        NameSectorClassifier.classify(
            company.and_then(|c| c.sector.as_deref()),
            company.and_then(|c| c.industry.as_deref()),
        )
    });
    let size = input
        .size
        .unwrap_or_else(|| MarketCapSizeClassifier.classify(company.and_then(|c| c.market_cap)));

    let quality = validator::assess(&balance, company, &sector);
    let mut metrics = MetricExtractor::new(&income, &balance, &cash_flow, quality.is_likely_bank)
        .extract();
    FallbackResolver::new(input.fallback.as_ref(), reference_year).resolve(&mut metrics);

    let foreign = company
        .map(|c| benchmarks::is_foreign_listing(&c.ticker))
        .unwrap_or(false);
    let bench = benchmarks::SectorBenchmarks::for_company(&sector, &size, foreign);
    debug!(
        sector = ?sector.sector_type,
        size = ?size.category,
        foreign,
        likely_bank = quality.is_likely_bank,
        "benchmark table selected"
    );

    let is_holding = input.fallback.as_ref().map(|f| f.is_holding).unwrap_or(false);
    let outcomes: [RuleOutcome; 7] = [
        rules::profitability::evaluate(
            &metrics,
            &bench,
            &sector,
            input.fallback.as_ref(),
            income.first(),
        ),
        rules::liquidity::evaluate(&metrics, &bench, &quality, &sector),
        rules::efficiency::evaluate(&metrics, &bench, &quality),
        rules::stability::evaluate(&metrics, &bench, &sector),
        rules::cash_flow::evaluate(&metrics, &bench, &sector),
        rules::growth::evaluate(&metrics, &bench),
        rules::income_composition::evaluate(&income, &sector, is_holding),
    ];

    let mut red_flags = Vec::new();
    let mut positive_signals = Vec::new();
    let mut contextual_factors = Vec::new();
    for outcome in &outcomes {
        red_flags.extend(outcome.red_flags.iter().cloned());
        positive_signals.extend(outcome.positive_signals.iter().cloned());
        contextual_factors.extend(outcome.contextual_factors.iter().cloned());
    }

    let (positive_signals, removed) =
        reconciler::reconcile(&red_flags, positive_signals, &metrics);

    let score = score::compute_score(&outcomes, &red_flags, &positive_signals, removed);
    let risk_level = score::risk_level(score, &red_flags);
    let company_strength = strength::classify(&metrics, &bench, &quality);

    debug!(
        ticker = company.map(|c| c.ticker.as_str()).unwrap_or("?"),
        score,
        flags = red_flags.len(),
        signals = positive_signals.len(),
        contradictions = removed,
        ?risk_level,
        "statement analysis complete"
    );

    red_flags.truncate(MAX_RED_FLAGS);
    let mut positive_signals = positive_signals;
    positive_signals.truncate(MAX_POSITIVE_SIGNALS);
    contextual_factors.truncate(MAX_CONTEXTUAL_FACTORS);

    StatementsAnalysis {
        score,
        red_flags,
        positive_signals,
        risk_level,
        company_strength,
        contextual_factors,
    }
}

/// Fixed result when the completed-period history is too short to score.
pub fn insufficient_history() -> StatementsAnalysis {
    StatementsAnalysis {
        score: 50,
        red_flags: vec![
            "Insufficient statement history for a reliable assessment".to_string(),
        ],
        positive_signals: Vec::new(),
        risk_level: RiskLevel::Medium,
        company_strength: analysis_core::CompanyStrength::Moderate,
        contextual_factors: Vec::new(),
    }
}
