//! Pagination helpers and types.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Default pagination limit.
pub const DEFAULT_LIMIT: i64 = 50;

/// Largest page a client may request.
pub const MAX_LIMIT: i64 = 200;

/// Returns the default pagination limit.
pub fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

/// Standard pagination query parameters.
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// Maximum number of results to return (1-200).
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Number of results to skip.
    #[serde(default)]
    pub offset: i64,
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl PaginationQuery {
    /// Clamp client-supplied values into a range safe to pass to SQL.
    pub fn normalized(&self) -> (i64, i64) {
        (self.limit.clamp(1, MAX_LIMIT), self.offset.max(0))
    }
}

/// Paginated response wrapper.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub limit: i64,
    pub offset: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total_count: i64, limit: i64, offset: i64) -> Self {
        Self {
            items,
            total_count,
            limit,
            offset,
        }
    }
}
