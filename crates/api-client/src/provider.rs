//! CRUD data provider
//!
//! The public surface of the adapter: each operation composes the URL
//! builder, one transport call, and record normalization, and holds no state
//! between calls. Errors pass straight through to the caller.

use crate::error::{ApiError, ApiResult};
use crate::query::ListQuery;
use crate::record::{normalize_list, normalize_record, ListResult, Record, DEFAULT_KEY_FIELD};
use crate::transport::{ApiResponse, RequestOptions, Transport};
use futures::future::join_all;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Per-id result of a batch delete
///
/// A failed id says nothing about the others; deletes that already landed on
/// the origin are not rolled back. Callers reconciling state should re-list.
#[derive(Debug)]
pub struct DeleteOutcome {
    /// The id this outcome belongs to
    pub id: String,
    /// What happened to this id's DELETE
    pub result: ApiResult<()>,
}

impl DeleteOutcome {
    /// Whether this id's delete succeeded
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Generic REST data provider
///
/// Stateless between calls; cloning shares the underlying transport.
#[derive(Clone)]
pub struct DataProvider {
    transport: Transport,
    key_field: String,
    options: RequestOptions,
}

impl DataProvider {
    /// Create a provider over the given transport
    ///
    /// Records are keyed by `_id` on the origin unless overridden with
    /// [`with_key_field`](Self::with_key_field).
    #[must_use]
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            key_field: DEFAULT_KEY_FIELD.to_string(),
            options: RequestOptions::default(),
        }
    }

    /// Use a different native primary-key field
    #[must_use]
    pub fn with_key_field(mut self, field: impl Into<String>) -> Self {
        self.key_field = field.into();
        self
    }

    /// Apply the same request options to every operation
    #[must_use]
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// The transport this provider issues requests through
    #[must_use]
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Fetch one page of a resource
    ///
    /// The origin's total-count signal is surfaced as-is, even when it
    /// disagrees with the page length.
    pub async fn list(&self, resource: &str, query: &ListQuery) -> ApiResult<ListResult> {
        let url = self
            .transport
            .urls()
            .build_with_params(resource, query.to_params());
        let response = self.transport.get(&url, &self.options).await?;
        let total_header = response.total_count().map(ToString::to_string);
        let records = into_array(response)?;
        normalize_list(records, total_header.as_deref(), &self.key_field)
    }

    /// Fetch a single record by id
    ///
    /// A missing record surfaces as the origin's 404 ([`ApiError::is_not_found`]).
    pub async fn get_one(&self, resource: &str, id: &str) -> ApiResult<Record> {
        let endpoint = format!("{resource}/{id}");
        let value = self
            .transport
            .get(&endpoint, &self.options)
            .await?
            .into_json()?;
        normalize_record(value, &self.key_field)
    }

    /// Fetch several records by id in one request
    ///
    /// Encoded as one repeated `id` parameter per requested id. Result
    /// ordering is the origin's contract, not enforced here.
    pub async fn get_many(&self, resource: &str, ids: &[String]) -> ApiResult<Vec<Record>> {
        // An empty id set selects nothing. Without the short-circuit the
        // request would be an unfiltered GET returning every record.
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.transport.urls().build_with_params(
            resource,
            ids.iter().map(|id| ("id", Some(id.as_str()))),
        );
        let response = self.transport.get(&url, &self.options).await?;
        into_array(response)?
            .into_iter()
            .map(|value| normalize_record(value, &self.key_field))
            .collect()
    }

    /// Fetch the records referencing `id` through the foreign-key `target`
    ///
    /// When the origin omits the count header the page length stands in for
    /// the total, a degraded but deterministic fallback.
    pub async fn get_many_reference(
        &self,
        resource: &str,
        target: &str,
        id: &str,
        query: &ListQuery,
    ) -> ApiResult<ListResult> {
        let query = query.clone().with_filter(target, id);
        let url = self
            .transport
            .urls()
            .build_with_params(resource, query.to_params());
        let response = self.transport.get(&url, &self.options).await?;
        let total_header = response.total_count().map(ToString::to_string);
        let records = into_array(response)?;

        let mut result = normalize_list(records, total_header.as_deref(), &self.key_field)?;
        if total_header.is_none() {
            result.total = result.data.len() as u64;
        }
        Ok(result)
    }

    /// Create a record
    ///
    /// Some origins nest the created record under a `data` field; both shapes
    /// are accepted.
    pub async fn create<B: Serialize>(&self, resource: &str, data: &B) -> ApiResult<Record> {
        let value = self
            .transport
            .post(resource, data, &self.options)
            .await?
            .into_json()?;
        normalize_record(unwrap_data(value), &self.key_field)
    }

    /// Replace a record by id
    pub async fn update<B: Serialize>(
        &self,
        resource: &str,
        id: &str,
        data: &B,
    ) -> ApiResult<Record> {
        let endpoint = format!("{resource}/{id}");
        let value = self
            .transport
            .put(&endpoint, data, &self.options)
            .await?
            .into_json()?;
        normalize_record(unwrap_data(value), &self.key_field)
    }

    /// Bulk update — deliberately unimplemented
    ///
    /// The records backend has no batch-update endpoint, so this fails fast
    /// instead of pretending the ids were written.
    pub async fn update_many<B: Serialize>(
        &self,
        _resource: &str,
        _ids: &[String],
        _data: &B,
    ) -> ApiResult<Vec<String>> {
        Err(ApiError::Unsupported("update_many"))
    }

    /// Delete a record by id
    ///
    /// The returned record carries only the `id`, regardless of what the
    /// origin sent back.
    pub async fn delete(&self, resource: &str, id: &str) -> ApiResult<Record> {
        let endpoint = format!("{resource}/{id}");
        self.transport.delete(&endpoint, &self.options).await?;

        let mut record = Map::new();
        record.insert("id".to_string(), Value::String(id.to_string()));
        Ok(record)
    }

    /// Delete several records, one concurrent DELETE per id
    ///
    /// Fan-out with join-all semantics and a per-id outcome for each. This is
    /// a non-atomic batch: a mix of successes and failures is a normal result.
    pub async fn delete_many(&self, resource: &str, ids: &[String]) -> Vec<DeleteOutcome> {
        debug!(resource, count = ids.len(), "Batch delete fan-out");
        let tasks = ids.iter().map(|id| async move {
            DeleteOutcome {
                id: id.clone(),
                result: self.delete(resource, id).await.map(|_| ()),
            }
        });
        join_all(tasks).await
    }

    /// Delete several records, failing the whole call on the first failed id
    ///
    /// Deletes that already landed are not rolled back; the error only says
    /// that at least one id failed.
    pub async fn delete_many_strict(
        &self,
        resource: &str,
        ids: &[String],
    ) -> ApiResult<Vec<String>> {
        for outcome in self.delete_many(resource, ids).await {
            outcome.result?;
        }
        Ok(ids.to_vec())
    }
}

/// Interpret a body as a list response
fn into_array(response: ApiResponse) -> ApiResult<Vec<Value>> {
    Ok(serde_json::from_value(response.into_json()?)?)
}

/// Unwrap a record nested under a `data` field, if the origin nests
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut object) if object.get("data").is_some_and(Value::is_object) => {
            object.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_data_nested() {
        let value = json!({"data": {"_id": "pt-1"}});
        assert_eq!(unwrap_data(value), json!({"_id": "pt-1"}));
    }

    #[test]
    fn test_unwrap_data_flat() {
        let value = json!({"_id": "pt-1", "data": "2024-01-01"});
        assert_eq!(
            unwrap_data(value),
            json!({"_id": "pt-1", "data": "2024-01-01"})
        );
    }

    #[test]
    fn test_delete_outcome_helpers() {
        let ok = DeleteOutcome {
            id: "a".to_string(),
            result: Ok(()),
        };
        let failed = DeleteOutcome {
            id: "b".to_string(),
            result: Err(ApiError::http(500, None)),
        };
        assert!(ok.is_ok());
        assert!(!failed.is_ok());
    }
}
