use serde::Serialize;

use crate::domain::DomainError;
use crate::models::site_settings::CurrencyRates;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub amount: f64,
    pub from: String,
    pub to: String,
    pub rate: f64,
    pub result: f64,
}

fn rate_of(rates: &CurrencyRates, code: &str) -> Result<f64, DomainError> {
    rates
        .rates
        .get(code)
        .copied()
        .ok_or_else(|| DomainError::Validation(format!("unsupported currency: {}", code)))
}

/// Convert `amount` from one currency to another through the base currency.
pub fn convert(
    rates: &CurrencyRates,
    amount: f64,
    from: &str,
    to: &str,
) -> Result<Conversion, DomainError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(DomainError::Validation(
            "amount must be a non-negative number".into(),
        ));
    }

    let from = from.trim().to_uppercase();
    let to = to.trim().to_uppercase();
    let rate = rate_of(rates, &to)? / rate_of(rates, &from)?;

    Ok(Conversion {
        amount,
        result: amount * rate,
        rate,
        from,
        to,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn rates() -> CurrencyRates {
        CurrencyRates {
            base: "IDR".into(),
            rates: BTreeMap::from([
                ("IDR".into(), 1.0),
                ("USD".into(), 0.0000625),
                ("EUR".into(), 0.00005),
            ]),
        }
    }

    #[test]
    fn converts_from_base() {
        let c = convert(&rates(), 160_000.0, "idr", "usd").unwrap();
        assert!((c.result - 10.0).abs() < 1e-9);
        assert_eq!(c.from, "IDR");
        assert_eq!(c.to, "USD");
    }

    #[test]
    fn converts_between_non_base_currencies() {
        let c = convert(&rates(), 10.0, "USD", "EUR").unwrap();
        assert!((c.result - 8.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_unknown_codes_and_bad_amounts() {
        assert!(matches!(
            convert(&rates(), 1.0, "IDR", "JPY"),
            Err(DomainError::Validation(_))
        ));
        assert!(convert(&rates(), -1.0, "IDR", "USD").is_err());
        assert!(convert(&rates(), f64::NAN, "IDR", "USD").is_err());
    }
}
