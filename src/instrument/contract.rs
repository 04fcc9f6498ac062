use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("contract symbol {0:?} has no alphabetic product code")]
    NoProductCode(String),
    #[error("contract symbol {0:?} has no numeric expiry token")]
    NoExpiryToken(String),
    #[error("contract symbol {0:?} has an unusable expiry token")]
    BadExpiryToken(String),
    #[error("contract symbol {0:?} has an expiry month outside 1-12")]
    InvalidMonth(String),
}

//returns the maximal leading run of alphabetic characters of a contract symbol
pub fn product_prefix(symbol: &str) -> Option<&str> {
    let end = symbol
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(symbol.len());

    if end == 0 {
        None
    } else {
        Some(&symbol[..end])
    }
}

//a contract identity: product code plus canonical yyyymm expiry key
//
//contracts of one product are totally ordered by expiry_key; 2-digit years
//are normalized to 20yy (21st-century assumption, a documented limitation)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractId {
    pub symbol: String,
    pub product: String,
    pub expiry_year: i32,
    pub expiry_month: u32,
}

impl ContractId {
    //parses a symbol such as "IF2109", "i2505", "cu2203" or "IF202109"
    pub fn parse(symbol: &str) -> Result<Self, ParseError> {
        let product = product_prefix(symbol)
            .ok_or_else(|| ParseError::NoProductCode(symbol.to_string()))?;

        let rest = &symbol[product.len()..];
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let digits = &rest[..digits_end];

        if digits.is_empty() {
            return Err(ParseError::NoExpiryToken(symbol.to_string()));
        }

        //6+ digits read as yyyymm, 4 as yymm, 3 as yy plus a one-digit month
        let (year, month) = match digits.len() {
            len if len >= 6 => (&digits[..4], &digits[4..6]),
            4 => (&digits[..2], &digits[2..4]),
            3 => (&digits[..2], &digits[2..3]),
            _ => return Err(ParseError::BadExpiryToken(symbol.to_string())),
        };

        let mut expiry_year: i32 = year
            .parse()
            .map_err(|_| ParseError::BadExpiryToken(symbol.to_string()))?;
        if year.len() == 2 {
            expiry_year += 2000;
        }

        let expiry_month: u32 = month
            .parse()
            .map_err(|_| ParseError::BadExpiryToken(symbol.to_string()))?;
        if !(1..=12).contains(&expiry_month) {
            return Err(ParseError::InvalidMonth(symbol.to_string()));
        }

        Ok(ContractId {
            symbol: symbol.to_string(),
            product: product.to_string(),
            expiry_year,
            expiry_month,
        })
    }

    //canonical yyyymm ordering key
    pub fn expiry_key(&self) -> i32 {
        self.expiry_year * 100 + self.expiry_month as i32
    }

    //expiry approximated as the last calendar day of the expiry month
    //true exchange last-trading-day rules are not modeled
    pub fn month_end(&self) -> NaiveDate {
        let (year, month) = if self.expiry_month == 12 {
            (self.expiry_year + 1, 1)
        } else {
            (self.expiry_year, self.expiry_month + 1)
        };

        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|first| first.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    //case-insensitive product equality
    pub fn matches_product(&self, product: &str) -> bool {
        self.product.eq_ignore_ascii_case(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_four_digit_expiry() {
        let id = ContractId::parse("IF2109").unwrap();
        assert_eq!(id.product, "IF");
        assert_eq!(id.expiry_year, 2021);
        assert_eq!(id.expiry_month, 9);
        assert_eq!(id.expiry_key(), 202109);
    }

    #[test]
    fn parses_lowercase_and_single_letter_products() {
        let id = ContractId::parse("i2505").unwrap();
        assert_eq!(id.product, "i");
        assert_eq!(id.expiry_key(), 202505);

        let id = ContractId::parse("cu2203").unwrap();
        assert_eq!(id.product, "cu");
        assert_eq!(id.expiry_key(), 202203);
    }

    #[test]
    fn parses_six_digit_expiry() {
        let id = ContractId::parse("IF202109").unwrap();
        assert_eq!(id.expiry_year, 2021);
        assert_eq!(id.expiry_month, 9);
    }

    #[test]
    fn parses_three_digit_expiry_as_year_tail_plus_month() {
        let id = ContractId::parse("t309").unwrap();
        assert_eq!(id.expiry_year, 2030);
        assert_eq!(id.expiry_month, 9);
    }

    #[test]
    fn rejects_malformed_symbols() {
        assert_eq!(
            ContractId::parse("2109"),
            Err(ParseError::NoProductCode("2109".to_string()))
        );
        assert_eq!(
            ContractId::parse("IF"),
            Err(ParseError::NoExpiryToken("IF".to_string()))
        );
        assert_eq!(
            ContractId::parse("IF21"),
            Err(ParseError::BadExpiryToken("IF21".to_string()))
        );
        assert_eq!(
            ContractId::parse("IF2113"),
            Err(ParseError::InvalidMonth("IF2113".to_string()))
        );
        assert_eq!(
            ContractId::parse("IF2100"),
            Err(ParseError::InvalidMonth("IF2100".to_string()))
        );
    }

    #[test]
    fn orders_contracts_by_expiry_key() {
        let mut ids: Vec<ContractId> = ["IF2109", "IF2012", "IF2101"]
            .iter()
            .map(|s| ContractId::parse(s).unwrap())
            .collect();
        ids.sort_by_key(|id| id.expiry_key());

        let symbols: Vec<&str> = ids.iter().map(|id| id.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["IF2012", "IF2101", "IF2109"]);
    }

    #[test]
    fn month_end_handles_year_boundary() {
        let september = ContractId::parse("cu2109").unwrap();
        assert_eq!(
            september.month_end(),
            NaiveDate::from_ymd_opt(2021, 9, 30).unwrap()
        );

        let december = ContractId::parse("cu2112").unwrap();
        assert_eq!(
            december.month_end(),
            NaiveDate::from_ymd_opt(2021, 12, 31).unwrap()
        );

        let february = ContractId::parse("cu2402").unwrap();
        assert_eq!(
            february.month_end(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn product_prefix_stops_at_first_non_alpha() {
        assert_eq!(product_prefix("cu2110"), Some("cu"));
        assert_eq!(product_prefix("IF2109"), Some("IF"));
        assert_eq!(product_prefix("2109"), None);
        assert_eq!(product_prefix(""), None);
    }

    #[test]
    fn matches_product_ignores_case() {
        let id = ContractId::parse("cu2110").unwrap();
        assert!(id.matches_product("CU"));
        assert!(id.matches_product("cu"));
        assert!(!id.matches_product("CUX"));
    }
}
