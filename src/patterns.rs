//! Compiled regex patterns for column classification.
//!
//! Header rules are matched case-insensitively against trimmed column names.
//! Value shapes are matched against sampled text cells.

use std::sync::LazyLock;

use regex::Regex;

use crate::column_type::ColumnType;

/// One entry of the header rule table.
pub struct ColumnRule {
    pub column_type: ColumnType,
    pub patterns: Vec<Regex>,
}

impl ColumnRule {
    fn new(column_type: ColumnType, patterns: &[&str]) -> Self {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(&format!("(?i){p}")).expect("Invalid header pattern"))
            .collect();
        Self {
            column_type,
            patterns,
        }
    }

    /// Returns true if any pattern of this rule matches `header`.
    #[inline]
    pub fn matches(&self, header: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(header))
    }
}

/// The header rule table, in priority order. The first matching rule wins.
///
/// `name` only accepts the bare word or a qualified full/customer name, so
/// headers like "First Name" fall through to the `first_name` rule.
static COLUMN_RULES: LazyLock<Vec<ColumnRule>> = LazyLock::new(|| {
    vec![
        ColumnRule::new(
            ColumnType::CustomerId,
            &[r"customer.*id", r"client.*id", r"user.*id", r"^id$"],
        ),
        ColumnRule::new(ColumnType::Email, &[r"e?mail", r"^email$"]),
        ColumnRule::new(
            ColumnType::Name,
            &[r"^name$", r"full.*name", r"customer.*name"],
        ),
        ColumnRule::new(
            ColumnType::FirstName,
            &[r"first.*name", r"fname", r"given.*name"],
        ),
        ColumnRule::new(
            ColumnType::LastName,
            &[r"last.*name", r"lname", r"surname", r"family.*name"],
        ),
        ColumnRule::new(ColumnType::Phone, &[r"phone", r"tel", r"mobile", r"cell"]),
        ColumnRule::new(
            ColumnType::Company,
            &[r"company", r"organization", r"business"],
        ),
        ColumnRule::new(ColumnType::Industry, &[r"industry", r"sector", r"vertical"]),
        ColumnRule::new(
            ColumnType::Revenue,
            &[r"revenue", r"sales", r"spend", r"ltv", r"lifetime.*value"],
        ),
        ColumnRule::new(
            ColumnType::PurchaseCount,
            &[
                r"purchase.*count",
                r"order.*count",
                r"transactions",
                r"num.*orders",
            ],
        ),
        ColumnRule::new(
            ColumnType::LastPurchaseDate,
            &[r"last.*purchase", r"last.*order", r"recent.*purchase"],
        ),
        ColumnRule::new(
            ColumnType::SignupDate,
            &[r"signup", r"join.*date", r"registration", r"created.*at"],
        ),
        ColumnRule::new(ColumnType::Status, &[r"status", r"state", r"active"]),
        ColumnRule::new(
            ColumnType::Segment,
            &[r"segment", r"tier", r"level", r"category"],
        ),
        ColumnRule::new(ColumnType::Location, &[r"location", r"address"]),
        ColumnRule::new(ColumnType::City, &[r"city", r"town"]),
        ColumnRule::new(ColumnType::Country, &[r"country", r"nation"]),
        ColumnRule::new(ColumnType::Age, &[r"^age$", r"years.*old"]),
        ColumnRule::new(ColumnType::Gender, &[r"gender", r"sex$"]),
    ]
});

/// Get the header rule table.
/// Returns a static reference to avoid rebuilding the table on each call.
pub fn column_rules() -> &'static [ColumnRule] {
    &COLUMN_RULES
}

/// Email-shaped value: `local@domain.tld` with no whitespace.
pub static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email shape"));

/// Phone-shaped value: ASCII digits, whitespace, dashes, plus and parentheses.
pub static PHONE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9\s\-+()]+$").expect("Invalid phone shape"));

/// Minimum length of a phone-shaped value.
pub const MIN_PHONE_LEN: usize = 10;

/// Date-shaped value prefix: ISO `YYYY-MM-DD` or slashed `DD/MM/YYYY`.
pub static DATE_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}|^[0-9]{2}/[0-9]{2}/[0-9]{4}")
        .expect("Invalid date shape")
});
