//! Picks the currency a startup's figures are shown in.
//!
//! Order: the currency stored on the startup, then the one implied by its
//! country, then USD.

use std::str::FromStr;

use runway_shared::types::Currency;

/// Euro area members, by lowercase name and ISO alpha-2 code.
const EUROZONE: &[(&str, &str)] = &[
    ("austria", "at"),
    ("belgium", "be"),
    ("croatia", "hr"),
    ("cyprus", "cy"),
    ("estonia", "ee"),
    ("finland", "fi"),
    ("france", "fr"),
    ("germany", "de"),
    ("greece", "gr"),
    ("ireland", "ie"),
    ("italy", "it"),
    ("latvia", "lv"),
    ("lithuania", "lt"),
    ("luxembourg", "lu"),
    ("malta", "mt"),
    ("netherlands", "nl"),
    ("portugal", "pt"),
    ("slovakia", "sk"),
    ("slovenia", "si"),
    ("spain", "es"),
];

/// Looks up the currency used in a country given by name or ISO code.
#[must_use]
pub fn currency_for_country(country: &str) -> Option<Currency> {
    let key = country.trim().to_lowercase();
    let currency = match key.as_str() {
        "united states" | "united states of america" | "usa" | "us" => Currency::Usd,
        "india" | "in" | "ind" => Currency::Inr,
        "united kingdom" | "uk" | "gb" | "great britain" | "england" => Currency::Gbp,
        "singapore" | "sg" | "sgp" => Currency::Sgd,
        "united arab emirates" | "uae" | "ae" => Currency::Aed,
        "canada" | "ca" | "can" => Currency::Cad,
        "australia" | "au" | "aus" => Currency::Aud,
        "japan" | "jp" | "jpn" => Currency::Jpy,
        "indonesia" | "id" | "idn" => Currency::Idr,
        other => {
            return EUROZONE
                .iter()
                .any(|(name, code)| *name == other || *code == other)
                .then_some(Currency::Eur);
        }
    };
    Some(currency)
}

/// Resolves the display currency from the stored field and the country.
///
/// Unparseable stored values are ignored rather than rejected.
#[must_use]
pub fn resolve_currency(stored: Option<&str>, country: Option<&str>) -> Currency {
    stored
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| Currency::from_str(s).ok())
        .or_else(|| country.and_then(currency_for_country))
        .unwrap_or(Currency::Usd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("India", Some(Currency::Inr))]
    #[case("IN", Some(Currency::Inr))]
    #[case(" united kingdom ", Some(Currency::Gbp))]
    #[case("Germany", Some(Currency::Eur))]
    #[case("nl", Some(Currency::Eur))]
    #[case("UAE", Some(Currency::Aed))]
    #[case("Atlantis", None)]
    fn test_currency_for_country(#[case] country: &str, #[case] expected: Option<Currency>) {
        assert_eq!(currency_for_country(country), expected);
    }

    #[test]
    fn test_stored_currency_wins() {
        assert_eq!(resolve_currency(Some("sgd"), Some("India")), Currency::Sgd);
    }

    #[test]
    fn test_country_fallback() {
        assert_eq!(resolve_currency(None, Some("India")), Currency::Inr);
        assert_eq!(resolve_currency(Some(""), Some("Japan")), Currency::Jpy);
        assert_eq!(resolve_currency(Some("???"), Some("Canada")), Currency::Cad);
    }

    #[test]
    fn test_usd_default() {
        assert_eq!(resolve_currency(None, None), Currency::Usd);
        assert_eq!(resolve_currency(None, Some("Atlantis")), Currency::Usd);
    }
}
