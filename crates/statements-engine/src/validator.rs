//! Data-quality assessment over the most recent periods.
//!
//! Liquidity and efficiency rules only run when the underlying field families
//! look trustworthy; otherwise they skip with an explanatory factor instead
//! of scoring garbage.

use analysis_core::{BalanceRow, CompanyInfo, SectorContext, SectorType};

/// Share of checked periods that must hold plausible values.
const VALIDITY_THRESHOLD: f64 = 0.60;

/// How many most-recent periods the plausibility window covers.
const VALIDITY_WINDOW: usize = 3;

/// Sector/industry substrings that mark a banking or insurance business.
/// Ordered, first match wins; matched case-insensitively.
const BANKING_KEYWORDS: &[&str] = &[
    "banco",
    "bank",
    "insurance",
    "seguradora",
    "seguros",
    "previdencia",
    "capitaliza",
    "financeira",
    "financial services",
    "credito",
];

/// Tickers treated as banks even when sector metadata is missing or generic.
const LIKELY_BANK_TICKERS: &[&str] = &[
    "ITUB3", "ITUB4", "BBDC3", "BBDC4", "BBAS3", "SANB11", "BPAC11", "ABCB4", "BRSR6", "BMGB4",
    "PINE4", "BPAN4",
];

/// Flags describing how much of the input can be trusted.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataQuality {
    pub current_assets_valid: bool,
    pub current_liabilities_valid: bool,
    pub inventory_valid: bool,
    pub receivables_valid: bool,
    /// Inventory present and exactly zero in every checked period.
    pub is_service_company: bool,
    pub is_bank_or_financial: bool,
    /// Bank by ticker allow-list or by the financial flag.
    pub is_likely_bank: bool,
}

pub fn assess(
    balance: &[BalanceRow],
    company: Option<&CompanyInfo>,
    sector: &SectorContext,
) -> DataQuality {
    let window = balance.len().min(VALIDITY_WINDOW);
    let checked = &balance[..window];

    let current_assets_valid = family_valid(checked, |row| {
        plausible_current(row.current_assets, row.total_assets)
    });
    let current_liabilities_valid = family_valid(checked, |row| {
        plausible_current(row.current_liabilities, row.total_assets)
    });
    let inventory_valid = family_valid(checked, |row| row.inventory.is_some());
    let receivables_valid = family_valid(checked, |row| row.receivables.is_some());

    let is_service_company =
        window > 0 && checked.iter().all(|row| row.inventory == Some(0.0));

    let is_bank_or_financial =
        sector.sector_type == SectorType::Financial || matches_banking_keywords(company);

    let is_likely_bank = is_bank_or_financial
        || company
            .map(|c| {
                let ticker = c.ticker.to_uppercase();
                LIKELY_BANK_TICKERS.contains(&ticker.as_str())
            })
            .unwrap_or(false);

    DataQuality {
        current_assets_valid,
        current_liabilities_valid,
        inventory_valid,
        receivables_valid,
        is_service_company,
        is_bank_or_financial,
        is_likely_bank,
    }
}

fn family_valid(checked: &[BalanceRow], plausible: impl Fn(&BalanceRow) -> bool) -> bool {
    if checked.is_empty() {
        return false;
    }
    let ok = checked.iter().filter(|row| plausible(row)).count();
    ok as f64 / checked.len() as f64 >= VALIDITY_THRESHOLD
}

fn plausible_current(value: Option<f64>, total_assets: Option<f64>) -> bool {
    match (value, total_assets) {
        (Some(v), Some(assets)) => v > 0.0 && assets > 0.0 && v < 2.0 * assets,
        _ => false,
    }
}

fn matches_banking_keywords(company: Option<&CompanyInfo>) -> bool {
    let Some(company) = company else {
        return false;
    };
    let haystacks = [company.sector.as_deref(), company.industry.as_deref()];
    for text in haystacks.into_iter().flatten() {
        let lower = text.to_lowercase();
        for keyword in BANKING_KEYWORDS {
            if lower.contains(keyword) {
                return true;
            }
        }
    }
    false
}
