use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Semantic kind assigned to a CRM column.
///
/// Variants are declared in rule-table order, which is also their `Ord`
/// order, so maps keyed by `ColumnType` iterate deterministically.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    CustomerId,
    Email,
    Name,
    FirstName,
    LastName,
    Phone,
    Company,
    Industry,
    Revenue,
    PurchaseCount,
    LastPurchaseDate,
    SignupDate,
    Status,
    Segment,
    Location,
    City,
    Country,
    Age,
    Gender,
    /// No classification could be made.
    #[default]
    Unknown,
}

/// How much a column type contributes to behavioral clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Low,
    Medium,
    High,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Importance::Low => write!(f, "low"),
            Importance::Medium => write!(f, "medium"),
            Importance::High => write!(f, "high"),
        }
    }
}

impl ColumnType {
    /// Number of variants, `Unknown` included.
    pub const COUNT: usize = 20;

    /// Every variant in declaration order.
    pub const ALL: [ColumnType; Self::COUNT] = [
        ColumnType::CustomerId,
        ColumnType::Email,
        ColumnType::Name,
        ColumnType::FirstName,
        ColumnType::LastName,
        ColumnType::Phone,
        ColumnType::Company,
        ColumnType::Industry,
        ColumnType::Revenue,
        ColumnType::PurchaseCount,
        ColumnType::LastPurchaseDate,
        ColumnType::SignupDate,
        ColumnType::Status,
        ColumnType::Segment,
        ColumnType::Location,
        ColumnType::City,
        ColumnType::Country,
        ColumnType::Age,
        ColumnType::Gender,
        ColumnType::Unknown,
    ];

    /// The snake_case wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnType::CustomerId => "customer_id",
            ColumnType::Email => "email",
            ColumnType::Name => "name",
            ColumnType::FirstName => "first_name",
            ColumnType::LastName => "last_name",
            ColumnType::Phone => "phone",
            ColumnType::Company => "company",
            ColumnType::Industry => "industry",
            ColumnType::Revenue => "revenue",
            ColumnType::PurchaseCount => "purchase_count",
            ColumnType::LastPurchaseDate => "last_purchase_date",
            ColumnType::SignupDate => "signup_date",
            ColumnType::Status => "status",
            ColumnType::Segment => "segment",
            ColumnType::Location => "location",
            ColumnType::City => "city",
            ColumnType::Country => "country",
            ColumnType::Age => "age",
            ColumnType::Gender => "gender",
            ColumnType::Unknown => "unknown",
        }
    }

    /// Human-readable label used by the mapping editor.
    pub const fn label(&self) -> &'static str {
        match self {
            ColumnType::CustomerId => "Customer ID",
            ColumnType::Email => "Email",
            ColumnType::Name => "Full Name",
            ColumnType::FirstName => "First Name",
            ColumnType::LastName => "Last Name",
            ColumnType::Phone => "Phone",
            ColumnType::Company => "Company",
            ColumnType::Industry => "Industry",
            ColumnType::Revenue => "Revenue",
            ColumnType::PurchaseCount => "Purchase Count",
            ColumnType::LastPurchaseDate => "Last Purchase Date",
            ColumnType::SignupDate => "Signup Date",
            ColumnType::Status => "Status",
            ColumnType::Segment => "Segment",
            ColumnType::Location => "Location",
            ColumnType::City => "City",
            ColumnType::Country => "Country",
            ColumnType::Age => "Age",
            ColumnType::Gender => "Gender",
            ColumnType::Unknown => "Unknown / Skip",
        }
    }

    /// Returns true for the `Unknown` sentinel.
    #[inline]
    pub fn is_unknown(&self) -> bool {
        matches!(self, ColumnType::Unknown)
    }

    /// Weight of this column when building a behavioral clustering request.
    pub fn importance(&self) -> Importance {
        match self {
            ColumnType::PurchaseCount
            | ColumnType::Revenue
            | ColumnType::LastPurchaseDate
            | ColumnType::Status
            | ColumnType::Segment => Importance::High,
            ColumnType::SignupDate
            | ColumnType::Industry
            | ColumnType::Company
            | ColumnType::Location => Importance::Medium,
            _ => Importance::Low,
        }
    }
}

/// Error returned when parsing an unrecognized column type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown column type name: {0}")]
pub struct ParseColumnTypeError(pub String);

impl FromStr for ColumnType {
    type Err = ParseColumnTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColumnType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseColumnTypeError(s.to_string()))
    }
}
