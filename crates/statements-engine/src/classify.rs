//! Default sector and size classifiers.
//!
//! Callers with a richer taxonomy can supply their own [`SectorContext`] /
//! [`SizeContext`]; these implementations cover the common case of raw
//! sector/industry strings and a market cap.

use analysis_core::{
    MarginExpectation, SectorClassifier, SectorContext, SectorType, SizeClassifier, SizeContext,
    VolatilityTolerance,
};

/// Ordered keyword table, first match wins. Matched case-insensitively
/// against the sector string first, then the industry string.
const SECTOR_KEYWORDS: &[(&[&str], SectorType)] = &[
    (
        &["banco", "bank", "financ", "insur", "segur", "credito"],
        SectorType::Financial,
    ),
    (
        &["tech", "software", "semicondut", "informa"],
        SectorType::Technology,
    ),
    (
        &["utilit", "electric", "water", "saneamento", "energia"],
        SectorType::Utilities,
    ),
    (
        &["staple", "aliment", "bebida", "food", "beverage", "agro"],
        SectorType::ConsumerStaples,
    ),
    (
        &["retail", "varejo", "consumer", "consumo", "apparel"],
        SectorType::ConsumerDiscretionary,
    ),
    (
        &["oil", "gas", "petrol", "petro", "energy"],
        SectorType::Energy,
    ),
    (
        &["health", "saude", "pharma", "farma", "hospital"],
        SectorType::Healthcare,
    ),
    (
        &[
            "material", "mining", "minera", "siderur", "steel", "chemical", "quimic", "papel",
        ],
        SectorType::BasicMaterials,
    ),
    (
        &["real estate", "imobili", "properties", "shopping"],
        SectorType::RealEstate,
    ),
    (
        &["industr", "machin", "transporte", "logist", "capital goods"],
        SectorType::Industrial,
    ),
];

/// Keyword-driven classifier over free-form sector/industry strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct NameSectorClassifier;

impl SectorClassifier for NameSectorClassifier {
    fn classify(&self, sector: Option<&str>, industry: Option<&str>) -> SectorContext {
        let sector_type = [sector, industry]
            .into_iter()
            .flatten()
            .map(str::to_lowercase)
            .find_map(|text| {
                SECTOR_KEYWORDS.iter().find_map(|(keywords, kind)| {
                    keywords
                        .iter()
                        .any(|k| text.contains(k))
                        .then_some(*kind)
                })
            })
            .unwrap_or(SectorType::Unknown);
        context_for(sector_type)
    }
}

fn context_for(sector_type: SectorType) -> SectorContext {
    use MarginExpectation as M;
    use VolatilityTolerance as V;
    let (volatility_tolerance, margin_expectation, cash_intensive) = match sector_type {
        SectorType::Financial => (V::Medium, M::Normal, false),
        SectorType::Technology => (V::High, M::High, false),
        SectorType::Utilities => (V::Low, M::Normal, true),
        SectorType::ConsumerStaples => (V::Low, M::Low, false),
        SectorType::ConsumerDiscretionary => (V::Medium, M::Low, false),
        SectorType::Industrial => (V::Medium, M::Normal, false),
        SectorType::Energy => (V::High, M::Normal, true),
        SectorType::Healthcare => (V::Medium, M::High, false),
        SectorType::BasicMaterials => (V::High, M::Low, false),
        SectorType::RealEstate => (V::Medium, M::High, true),
        SectorType::Unknown => (V::Medium, M::Normal, false),
    };
    SectorContext {
        sector_type,
        volatility_tolerance,
        margin_expectation,
        cash_intensive,
    }
}

/// Market-cap magnitude classifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarketCapSizeClassifier;

impl SizeClassifier for MarketCapSizeClassifier {
    fn classify(&self, market_cap: Option<f64>) -> SizeContext {
        SizeContext::from_market_cap(market_cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::SizeCategory;

    #[test]
    fn sector_strings_map_to_types() {
        let c = NameSectorClassifier;
        assert_eq!(
            c.classify(Some("Bancos"), None).sector_type,
            SectorType::Financial
        );
        assert_eq!(
            c.classify(Some("Information Technology"), None).sector_type,
            SectorType::Technology
        );
        assert_eq!(
            c.classify(None, Some("Siderurgia e Metalurgia")).sector_type,
            SectorType::BasicMaterials
        );
        assert_eq!(c.classify(None, None).sector_type, SectorType::Unknown);
    }

    #[test]
    fn sector_string_takes_precedence_over_industry() {
        let c = NameSectorClassifier;
        let ctx = c.classify(Some("Utilities"), Some("Banking"));
        assert_eq!(ctx.sector_type, SectorType::Utilities);
        assert!(ctx.cash_intensive);
    }

    #[test]
    fn size_classifier_wraps_market_cap_rule() {
        let c = MarketCapSizeClassifier;
        assert_eq!(c.classify(Some(50e9)).category, SizeCategory::Large);
        assert_eq!(c.classify(None).category, SizeCategory::Mid);
    }
}
