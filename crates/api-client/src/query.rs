//! List query model and its wire encoding
//!
//! Pagination goes out as a half-open index range (`_start`/`_end`) so the
//! origin can slice without knowing page sizes; sort as `_sort`/`_order`;
//! filters pass through verbatim as their own parameters. A `q` parameter is
//! always present, empty when no free-text filter was given, which lets the
//! origin implement either range pagination or search without per-resource
//! knowledge on our side.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Page selection, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Page number, starting at 1
    pub page: u32,
    /// Records per page, at least 1
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

impl Pagination {
    /// Half-open index range covered by this page
    #[must_use]
    pub fn range(&self) -> (u64, u64) {
        let page = u64::from(self.page.max(1));
        let per_page = u64::from(self.per_page.max(1));
        ((page - 1) * per_page, page * per_page)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    /// Ascending
    #[default]
    Asc,
    /// Descending
    Desc,
}

impl SortOrder {
    /// Wire representation (`ASC`/`DESC`)
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Sort specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    /// Field to sort by
    pub field: String,
    /// Direction
    pub order: SortOrder,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: "id".to_string(),
            order: SortOrder::Asc,
        }
    }
}

/// A request for one page of records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    /// Page selection
    pub pagination: Pagination,
    /// Sort specification
    pub sort: Sort,
    /// Field filters, passed through verbatim (insertion order preserved)
    pub filter: Map<String, Value>,
    /// Free-text search
    pub q: Option<String>,
}

impl ListQuery {
    /// Create a query with all defaults (page 1, 10 per page, sort id ASC)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a page
    #[must_use]
    pub fn with_page(mut self, page: u32, per_page: u32) -> Self {
        self.pagination = Pagination { page, per_page };
        self
    }

    /// Set the sort field and direction
    #[must_use]
    pub fn with_sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Sort {
            field: field.into(),
            order,
        };
        self
    }

    /// Add a filter on a field
    #[must_use]
    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter.insert(field.into(), value.into());
        self
    }

    /// Set the free-text search term
    #[must_use]
    pub fn with_q(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    /// Encode as ordered query parameters
    ///
    /// `None` values are dropped by the URL builder; filter entries holding
    /// JSON null encode that way so absent filters never reach the wire.
    #[must_use]
    pub fn to_params(&self) -> Vec<(String, Option<String>)> {
        let (start, end) = self.pagination.range();

        let mut params = vec![
            ("_start".to_string(), Some(start.to_string())),
            ("_end".to_string(), Some(end.to_string())),
            ("_sort".to_string(), Some(self.sort.field.clone())),
            ("_order".to_string(), Some(self.sort.order.as_str().to_string())),
        ];

        for (field, value) in &self.filter {
            params.push((field.clone(), stringify(value)));
        }

        params.push(("q".to_string(), Some(self.q.clone().unwrap_or_default())));
        params
    }
}

/// Render a filter value the way it should appear in a query string
fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
