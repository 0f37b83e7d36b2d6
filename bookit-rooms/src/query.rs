//! Listing query construction
//!
//! A [`QuerySpec`] is built from the raw query string of a listing request in
//! three steps, each returning a new value:
//!
//! ```rust
//! use bookit_rooms::query::{QueryParams, QuerySpec};
//!
//! let params: QueryParams = [
//!     ("keyword", "beach"),
//!     ("pricePerNight[lte]", "200"),
//!     ("page", "2"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let criteria = QuerySpec::new().search(&params, "address").filter(&params);
//! let page = criteria.clone().paginate(&params, 4);
//!
//! assert!(criteria.window().is_none());
//! assert_eq!(page.window().map(|w| w.offset), Some(4));
//! assert_eq!(page.criteria().count(), 2);
//! ```
//!
//! The same criteria drive both the filtered count and the page fetch, so the
//! two can never disagree.

use std::collections::BTreeMap;
use std::num::IntErrorKind;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::repository::{FilterCondition, FilterOperator, Pagination};

/// Free-text search term
pub const KEYWORD_PARAM: &str = "keyword";
/// 1-based page number
pub const PAGE_PARAM: &str = "page";
/// Reserved for page size; never treated as a filter
pub const LIMIT_PARAM: &str = "limit";

/// Parameter names consumed by search and pagination
pub const RESERVED_PARAMS: &[&str] = &[KEYWORD_PARAM, PAGE_PARAM, LIMIT_PARAM];

/// `field[op]` with a range operator suffix
static RANGE_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<field>.+)\[(?P<op>gt|gte|lt|lte)\]$").expect("range param regex is valid")
});

/// Raw query-string parameters, last value wins for repeated names
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    /// Value of a parameter, if present
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// All parameters in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parameters that are not reserved
    pub fn filter_params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter()
            .filter(|(name, _)| !RESERVED_PARAMS.contains(name))
    }

    /// Requested page, `1` when absent, non-numeric or not positive
    ///
    /// Numbers beyond `u64::MAX` saturate.
    pub fn page(&self) -> u64 {
        self.get(PAGE_PARAM)
            .and_then(|raw| match raw.trim().parse::<u64>() {
                Ok(page) => Some(page),
                Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(u64::MAX),
                Err(_) => None,
            })
            .filter(|page| *page > 0)
            .unwrap_or(1)
    }

    /// Whether no parameters were given
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Condition expressed by a single filter parameter
///
/// ```rust
/// use bookit_rooms::query::condition_for;
/// use bookit_rooms::repository::FilterOperator;
///
/// let range = condition_for("pricePerNight[gte]", "100");
/// assert_eq!(range.field, "pricePerNight");
/// assert_eq!(range.operator, FilterOperator::GreaterThanOrEqual);
///
/// let exact = condition_for("price[ne]", "5");
/// assert_eq!(exact.field, "price[ne]");
/// assert_eq!(exact.operator, FilterOperator::Equal);
/// ```
pub fn condition_for(name: &str, value: &str) -> FilterCondition {
    if let Some(caps) = RANGE_PARAM.captures(name) {
        if let Some(operator) = FilterOperator::from_suffix(&caps["op"]) {
            return FilterCondition::new(&caps["field"], operator, value);
        }
    }
    FilterCondition::eq(name, value)
}

/// Immutable description of which documents a listing wants
///
/// The default value matches every document and has no window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySpec {
    search: Option<FilterCondition>,
    filters: Vec<FilterCondition>,
    window: Option<Pagination>,
}

impl QuerySpec {
    /// A query matching every document
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Narrow to documents whose `field` contains the `keyword` parameter, ignoring case
    ///
    /// An absent or empty keyword leaves the query unchanged.
    #[must_use]
    pub fn search(mut self, params: &QueryParams, field: &str) -> Self {
        if let Some(keyword) = params.get(KEYWORD_PARAM).filter(|k| !k.is_empty()) {
            self.search = Some(FilterCondition::contains(field, keyword));
        }
        self
    }

    /// Add one condition per non-reserved parameter
    #[must_use]
    pub fn filter(mut self, params: &QueryParams) -> Self {
        self.filters.extend(
            params
                .filter_params()
                .map(|(name, value)| condition_for(name, value)),
        );
        self
    }

    /// Restrict to the page named by the `page` parameter
    ///
    /// `results_per_page` below 1 is treated as 1.
    #[must_use]
    pub fn paginate(mut self, params: &QueryParams, results_per_page: u64) -> Self {
        self.window = Some(Pagination::page(params.page(), results_per_page.max(1)));
        self
    }

    /// Add a single condition
    #[must_use]
    pub fn with_condition(mut self, condition: FilterCondition) -> Self {
        self.filters.push(condition);
        self
    }

    /// Search clause, if any
    pub fn search_clause(&self) -> Option<&FilterCondition> {
        self.search.as_ref()
    }

    /// Field filters
    pub fn filters(&self) -> &[FilterCondition] {
        &self.filters
    }

    /// Search clause followed by field filters, all of which must hold
    pub fn criteria(&self) -> impl Iterator<Item = &FilterCondition> {
        self.search.iter().chain(self.filters.iter())
    }

    /// Pagination window, if any
    pub fn window(&self) -> Option<Pagination> {
        self.window
    }

    /// Same criteria without a window
    #[must_use]
    pub fn without_window(&self) -> Self {
        Self {
            window: None,
            ..self.clone()
        }
    }

    /// Whether this query matches every document
    pub fn matches_all(&self) -> bool {
        self.search.is_none() && self.filters.is_empty()
    }
}
