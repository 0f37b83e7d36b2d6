//! Pagination and filtering types for collection queries
//!
//! ```rust
//! use bookit_rooms::repository::{FilterCondition, Pagination};
//!
//! let page = Pagination::page(2, 4);
//! assert_eq!(page.offset, 4);
//!
//! let filters = vec![
//!     FilterCondition::gte("pricePerNight", "100"),
//!     FilterCondition::eq("category", "King"),
//! ];
//! assert_eq!(filters[0].to_string(), "pricePerNight >= 100");
//! ```

use std::fmt;

/// Offset/limit window over a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Number of results to skip
    pub offset: u64,
    /// Maximum number of results to return
    pub limit: u64,
}

impl Pagination {
    /// Create new pagination parameters
    #[must_use]
    pub const fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// Pagination for the first page with the given limit
    #[must_use]
    pub const fn first_page(limit: u64) -> Self {
        Self { offset: 0, limit }
    }

    /// Pagination for a 1-indexed page number
    ///
    /// Page 0 is treated as page 1.
    ///
    /// ```rust
    /// use bookit_rooms::repository::Pagination;
    ///
    /// let page3 = Pagination::page(3, 20);
    /// assert_eq!(page3.offset, 40);
    /// assert_eq!(page3.limit, 20);
    /// ```
    #[must_use]
    pub const fn page(page_number: u64, page_size: u64) -> Self {
        let offset = page_number.saturating_sub(1).saturating_mul(page_size);
        Self {
            offset,
            limit: page_size,
        }
    }

    /// Apply this window to an iterator
    pub fn apply<I: Iterator>(&self, items: I) -> impl Iterator<Item = I::Item> {
        let skip = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let take = usize::try_from(self.limit).unwrap_or(usize::MAX);
        items.skip(skip).take(take)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::first_page(20)
    }
}

/// Comparison operators for filter conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    /// Equal to (=)
    Equal,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal to (>=)
    GreaterThanOrEqual,
    /// Less than (<)
    LessThan,
    /// Less than or equal to (<=)
    LessThanOrEqual,
    /// Case-insensitive literal substring match
    Contains,
}

impl FilterOperator {
    /// Operator named by a bracketed query suffix (`gt`, `gte`, `lt`, `lte`)
    ///
    /// ```rust
    /// use bookit_rooms::repository::FilterOperator;
    ///
    /// assert_eq!(FilterOperator::from_suffix("gte"), Some(FilterOperator::GreaterThanOrEqual));
    /// assert_eq!(FilterOperator::from_suffix("ne"), None);
    /// ```
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "gt" => Some(Self::GreaterThan),
            "gte" => Some(Self::GreaterThanOrEqual),
            "lt" => Some(Self::LessThan),
            "lte" => Some(Self::LessThanOrEqual),
            _ => None,
        }
    }

    /// Whether an observed ordering between stored value and operand satisfies this operator
    ///
    /// `Contains` is not an ordering test and always returns `false` here.
    pub fn accepts(&self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::{Equal, Greater, Less};
        match self {
            Self::Equal => ordering == Equal,
            Self::GreaterThan => ordering == Greater,
            Self::GreaterThanOrEqual => ordering != Less,
            Self::LessThan => ordering == Less,
            Self::LessThanOrEqual => ordering != Greater,
            Self::Contains => false,
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "="),
            Self::GreaterThan => write!(f, ">"),
            Self::GreaterThanOrEqual => write!(f, ">="),
            Self::LessThan => write!(f, "<"),
            Self::LessThanOrEqual => write!(f, "<="),
            Self::Contains => write!(f, "CONTAINS"),
        }
    }
}

/// A single condition on a document field
///
/// Values are kept as the raw strings received from the query string. The
/// collection decides how to compare them with the stored field type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterCondition {
    /// Field path, dot-separated for nested fields
    pub field: String,
    /// The comparison operator
    pub operator: FilterOperator,
    /// The raw operand
    pub value: String,
}

impl FilterCondition {
    /// Create a new filter condition
    pub fn new(
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// field = value
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Equal, value)
    }

    /// field > value
    pub fn gt(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::GreaterThan, value)
    }

    /// field >= value
    pub fn gte(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::GreaterThanOrEqual, value)
    }

    /// field < value
    pub fn lt(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::LessThan, value)
    }

    /// field <= value
    pub fn lte(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::LessThanOrEqual, value)
    }

    /// field contains value, ignoring case
    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Contains, value)
    }

    /// Field path split on `.`
    pub fn path(&self) -> impl Iterator<Item = &str> {
        self.field.split('.')
    }
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.value)
    }
}
