//! The generic resource client shared by every OneView facade.
//!
//! A [`ResourceClient`] is bound to one base path (e.g. `/rest/fc-networks`)
//! and turns "id or URI" arguments into addresses, issues the HTTP verbs,
//! follows `nextPageUri` across collection pages, and hands running tasks to
//! the [`TaskMonitor`].
//!
//! All argument checks happen before any request is sent.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::connection::{Connection, CustomHeaders, Outcome};
use crate::error::{self, OneViewError, Result};
use crate::models::{resource_uri, Collection, PatchOperation, Resource};
use crate::query::{append_query, equality_filter, QueryParams, UtilizationQuery};
use crate::task_monitor::TaskMonitor;

/// Per-call options for mutating operations.
///
/// Replaces the positional `uri` / `force` / `timeout` / headers arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Target address; defaults depend on the operation.
    pub uri: Option<String>,

    /// Append `force=True` to complete despite connectivity or resource errors.
    pub force: bool,

    /// How long to wait for a resulting task; `None` waits indefinitely.
    pub timeout: Option<Duration>,

    /// Extra HTTP headers.
    pub custom_headers: CustomHeaders,
}

impl RequestOptions {
    /// Creates default options: no explicit address, no force, wait forever.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the target address.
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Requests a forced operation.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Limits how long to wait for a resulting task.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Adds an HTTP header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.insert(name.into(), value.into());
        self
    }
}

/// Target of a delete: an id/URI, or a full representation carrying its `uri`.
#[derive(Debug, Clone, Copy)]
pub enum ResourceRef<'a> {
    /// A bare id or a full address.
    IdOrUri(&'a str),
    /// A representation; its `uri` field is used.
    Representation(&'a Resource),
}

impl<'a> From<&'a str> for ResourceRef<'a> {
    fn from(id_or_uri: &'a str) -> Self {
        ResourceRef::IdOrUri(id_or_uri)
    }
}

impl<'a> From<&'a String> for ResourceRef<'a> {
    fn from(id_or_uri: &'a String) -> Self {
        ResourceRef::IdOrUri(id_or_uri)
    }
}

impl<'a> From<&'a Resource> for ResourceRef<'a> {
    fn from(resource: &'a Resource) -> Self {
        ResourceRef::Representation(resource)
    }
}

/// Result of a delete.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// The appliance answered with no content and no task.
    Completed,
    /// A deletion task ran to completion; its final body.
    Task(Value),
    /// The appliance answered synchronously with a body.
    Body(Value),
}

/// Shared engine behind every typed facade.
#[derive(Clone)]
pub struct ResourceClient {
    connection: Arc<dyn Connection>,
    uri: String,
    task_monitor: TaskMonitor,
}

impl ResourceClient {
    /// Creates a client for the collection at `uri` with a default task monitor.
    pub fn new(connection: Arc<dyn Connection>, uri: impl Into<String>) -> Self {
        let task_monitor = TaskMonitor::new(connection.clone());
        Self::with_task_monitor(connection, uri, task_monitor)
    }

    /// Creates a client that waits for tasks with the given monitor.
    pub fn with_task_monitor(
        connection: Arc<dyn Connection>,
        uri: impl Into<String>,
        task_monitor: TaskMonitor,
    ) -> Self {
        Self {
            connection,
            uri: uri.into(),
            task_monitor,
        }
    }

    /// Base path of the collection.
    pub fn base_uri(&self) -> &str {
        &self.uri
    }

    /// Task monitor used for asynchronous operations.
    pub fn task_monitor(&self) -> &TaskMonitor {
        &self.task_monitor
    }

    /// Resolves an id or URI to a full address.
    ///
    /// A value containing `/` is treated as an address and must contain the
    /// base path; anything else is an id appended to the base path.
    ///
    /// # Errors
    ///
    /// - `OneViewError::InvalidArgument` if `id_or_uri` is empty
    /// - `OneViewError::UnrecognizedUri` if an address belongs to another resource
    pub fn build_uri(&self, id_or_uri: &str) -> Result<String> {
        if id_or_uri.is_empty() {
            return Err(OneViewError::invalid_argument(error::INVALID_ID));
        }

        if id_or_uri.contains('/') {
            self.validate_resource_uri(id_or_uri)?;
            Ok(id_or_uri.to_string())
        } else {
            Ok(format!("{}/{}", self.uri, id_or_uri))
        }
    }

    fn validate_resource_uri(&self, path: &str) -> Result<()> {
        if !path.contains(self.uri.as_str()) {
            tracing::debug!(uri = %path, base_uri = %self.uri, "Unrecognized URI");
            return Err(OneViewError::unrecognized_uri(path));
        }
        Ok(())
    }

    /// Gets every item matching `params`, following `nextPageUri`.
    ///
    /// Fetching stops at the first page without a next page, at an empty
    /// page, or once at least `params.count` items have been collected. The
    /// last page is never trimmed, so more than `count` items may be returned.
    ///
    /// # Arguments
    ///
    /// * `params` - Start, count and optional filter/query/sort/view/fields
    /// * `uri` - Collection address to use instead of the base path
    pub async fn get_all(&self, params: &QueryParams, uri: Option<&str>) -> Result<Vec<Value>> {
        let path = uri.unwrap_or(&self.uri);
        self.validate_resource_uri(path)?;

        let uri = params.apply_to(path);
        tracing::debug!(uri = %uri, "Getting all resources");

        let items = self.do_requests_to_getall(uri, params.count).await?;

        tracing::debug!(total = items.len(), "Collected collection members");
        Ok(items)
    }

    async fn do_requests_to_getall(&self, mut uri: String, count: Option<u32>) -> Result<Vec<Value>> {
        let mut items = Vec::new();

        loop {
            let response = self.connection.get(&uri).await?;
            let page = Collection::from_value(&response);
            let page_len = page.members.len();
            items.extend(page.members);

            tracing::debug!(
                uri = %uri,
                members = page_len,
                next_page_uri = ?page.next_page_uri,
                "Fetched collection page"
            );

            let below_cap = count.is_none_or(|cap| items.len() < cap as usize);
            match page.next_page_uri {
                Some(next) if page_len > 0 && below_cap => uri = next,
                _ => break,
            }
        }

        Ok(items)
    }

    /// Gets a single resource by id or URI. Reads never involve tasks.
    pub async fn get(&self, id_or_uri: &str) -> Result<Value> {
        let uri = self.build_uri(id_or_uri)?;
        tracing::debug!(uri = %uri, "Get resource");
        self.connection.get(&uri).await
    }

    /// Gets the members of a collection that does not accept `start`/`count`.
    ///
    /// # Arguments
    ///
    /// * `id_or_uri` - Id or address of the collection
    /// * `filter` - Optional filter expression
    pub async fn get_collection(&self, id_or_uri: &str, filter: Option<&str>) -> Result<Vec<Value>> {
        let mut uri = self.build_uri(id_or_uri)?;
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            uri = append_query(&uri, &format!("filter={}", urlencoding::encode(filter)));
        }

        tracing::debug!(uri = %uri, "Get resource collection");
        let response = self.connection.get(&uri).await?;
        Ok(Collection::members_of(&response))
    }

    /// Gets the JSON schema of the resource type.
    pub async fn get_schema(&self) -> Result<Value> {
        let uri = format!("{}/schema", self.uri);
        tracing::debug!(uri = %uri, "Get schema");
        self.connection.get(&uri).await
    }

    /// Creates a resource with a POST.
    ///
    /// The target defaults to the base path. If the appliance starts a task,
    /// waits for it with `options.timeout` and returns its final body;
    /// otherwise returns the response body unchanged.
    ///
    /// # Errors
    ///
    /// Returns `OneViewError::InvalidArgument` if `resource` is empty.
    pub async fn create(&self, resource: &Resource, options: &RequestOptions) -> Result<Value> {
        if resource.is_empty() {
            return Err(OneViewError::invalid_argument(error::RESOURCE_NOT_PROVIDED));
        }

        let uri = options.uri.as_deref().unwrap_or(&self.uri);
        tracing::debug!(uri = %uri, "Create resource");

        let body = Value::Object(resource.clone());
        self.do_post(uri, Some(&body), options).await
    }

    /// POSTs with no body, for trigger-only endpoints.
    pub async fn create_with_zero_body(&self, options: &RequestOptions) -> Result<Value> {
        let uri = options.uri.as_deref().unwrap_or(&self.uri);
        tracing::debug!(uri = %uri, "Create with zero body");
        self.do_post(uri, None, options).await
    }

    /// Updates a resource with a PUT.
    ///
    /// Without an explicit `options.uri`, the representation's own `uri`
    /// field is the target. `options.force` appends `force=True`.
    ///
    /// # Errors
    ///
    /// - `OneViewError::InvalidArgument` if `resource` is empty
    /// - `OneViewError::UnknownObjectType` if no address is available
    pub async fn update(&self, resource: &Resource, options: &RequestOptions) -> Result<Value> {
        if resource.is_empty() {
            return Err(OneViewError::invalid_argument(error::RESOURCE_NOT_PROVIDED));
        }

        let uri = match options.uri.as_deref() {
            Some(uri) => uri.to_string(),
            None => resource_uri(resource)
                .ok_or_else(OneViewError::unknown_object_type)?
                .to_string(),
        };
        let uri = with_force(uri, options.force);

        tracing::debug!(uri = %uri, "Update resource");

        let body = Value::Object(resource.clone());
        self.do_put(&uri, Some(&body), options).await
    }

    /// PUTs with no body to an id or URI.
    pub async fn update_with_zero_body(&self, id_or_uri: &str, options: &RequestOptions) -> Result<Value> {
        let uri = with_force(self.build_uri(id_or_uri)?, options.force);
        tracing::debug!(uri = %uri, "Update with zero length body");
        self.do_put(&uri, None, options).await
    }

    /// Applies a single PATCH operation.
    ///
    /// The appliance accepts one operation per call; the body is sent as
    /// `[{"op": ..., "path": ..., "value": ...}]`.
    pub async fn patch(
        &self,
        id_or_uri: &str,
        operation: &str,
        path: &str,
        value: Value,
        options: &RequestOptions,
    ) -> Result<Value> {
        let uri = self.build_uri(id_or_uri)?;

        tracing::debug!(uri = %uri, op = %operation, path = %path, "Patch resource");

        let body = PatchOperation::new(operation, path, value).into_body();
        let outcome = self
            .connection
            .patch(&uri, &body, &options.custom_headers)
            .await?;
        self.resolve(outcome, options.timeout).await
    }

    /// Deletes a resource.
    ///
    /// # Arguments
    ///
    /// * `resource` - An id or URI, or a representation carrying its `uri`
    /// * `options` - `force`, `timeout` and headers; `options.uri` is ignored
    ///
    /// # Errors
    ///
    /// - `OneViewError::InvalidArgument` if the id is empty or the representation is empty
    /// - `OneViewError::UnknownObjectType` if the representation has no `uri`
    pub async fn delete<'a>(
        &self,
        resource: impl Into<ResourceRef<'a>>,
        options: &RequestOptions,
    ) -> Result<DeleteOutcome> {
        let uri = match resource.into() {
            ResourceRef::IdOrUri(id_or_uri) => {
                if id_or_uri.is_empty() {
                    return Err(OneViewError::invalid_argument(error::RESOURCE_NOT_PROVIDED));
                }
                self.build_uri(id_or_uri)?
            }
            ResourceRef::Representation(resource) => {
                if resource.is_empty() {
                    return Err(OneViewError::invalid_argument(error::RESOURCE_NOT_PROVIDED));
                }
                resource_uri(resource)
                    .ok_or_else(OneViewError::unknown_object_type)?
                    .to_string()
            }
        };
        let uri = with_force(uri, options.force);

        tracing::debug!(uri = %uri, "Delete resource");

        match self.connection.delete(&uri, &options.custom_headers).await? {
            outcome if outcome.is_empty() => Ok(DeleteOutcome::Completed),
            Outcome::Body(body) => Ok(DeleteOutcome::Body(body)),
            Outcome::Task(task) => {
                let result = self.task_monitor.wait_for_task(&task, options.timeout).await?;
                Ok(DeleteOutcome::Task(result))
            }
        }
    }

    /// Gets every item whose `field` equals `value`.
    ///
    /// Builds the filter `"'field'='value'"`; the appliance matches it
    /// case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `OneViewError::InvalidArgument` if `field` is empty.
    pub async fn get_by(&self, field: &str, value: &str, uri: Option<&str>) -> Result<Vec<Value>> {
        if field.is_empty() {
            return Err(OneViewError::invalid_argument(error::INVALID_FIELD));
        }

        let path = uri.unwrap_or(&self.uri);
        self.validate_resource_uri(path)?;

        tracing::debug!(uri = %path, field = %field, value = %value, "Get by");

        let params = QueryParams::new().with_filter(equality_filter(field, value));
        self.get_all(&params, Some(path)).await
    }

    /// Gets the resource with the given name, or `None`.
    ///
    /// Names are expected to be unique. If the appliance returns several
    /// matches, the first is returned and a warning is logged.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Value>> {
        let matches = self.get_by("name", name, None).await?;

        if matches.len() > 1 {
            tracing::warn!(
                base_uri = %self.uri,
                name = %name,
                matches = matches.len(),
                "Several resources share this name, using the first"
            );
        }

        Ok(matches.into_iter().next())
    }

    /// Gets historical utilization data for a resource.
    ///
    /// # Errors
    ///
    /// Returns `OneViewError::InvalidArgument` if `id_or_uri` is empty.
    pub async fn get_utilization(&self, id_or_uri: &str, query: &UtilizationQuery) -> Result<Value> {
        if id_or_uri.is_empty() {
            return Err(OneViewError::invalid_argument(error::INVALID_ID));
        }

        let uri = format!("{}/utilization", self.build_uri(id_or_uri)?);
        let uri = append_query(&uri, &query.to_query_string());

        tracing::debug!(uri = %uri, "Get utilization");
        self.connection.get(&uri).await
    }

    async fn do_post(&self, uri: &str, body: Option<&Value>, options: &RequestOptions) -> Result<Value> {
        let outcome = self
            .connection
            .post(uri, body, &options.custom_headers)
            .await?;
        self.resolve(outcome, options.timeout).await
    }

    async fn do_put(&self, uri: &str, body: Option<&Value>, options: &RequestOptions) -> Result<Value> {
        let outcome = self
            .connection
            .put(uri, body, &options.custom_headers)
            .await?;
        self.resolve(outcome, options.timeout).await
    }

    /// Returns a synchronous body as-is, or waits for a task.
    async fn resolve(&self, outcome: Outcome, timeout: Option<Duration>) -> Result<Value> {
        match outcome {
            Outcome::Body(body) => Ok(body),
            Outcome::Task(task) => {
                tracing::debug!(task_uri = %task.uri, "Waiting for task");
                self.task_monitor.wait_for_task(&task, timeout).await
            }
        }
    }
}

fn with_force(uri: String, force: bool) -> String {
    if force {
        append_query(&uri, "force=True")
    } else {
        uri
    }
}
