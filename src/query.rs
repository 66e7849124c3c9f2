//! Query string construction for collection and utilization endpoints.
//!
//! Every value is percent-encoded on its own, and parameters are always
//! emitted in the same order (start, count, filter, query, sort, view,
//! fields) so identical inputs produce identical request addresses.

/// Wire value of `count` meaning "all items".
pub const UNBOUNDED_COUNT: i64 = -1;

/// Builds the equality filter expression `"'field'='value'"`.
///
/// Matching is case-insensitive on the appliance side.
pub fn equality_filter(field: &str, value: &str) -> String {
    format!("\"'{}'='{}'\"", field, value)
}

/// Splits a comma-joined list of `NAME=VALUE` filters into separate expressions.
///
/// Empty segments are dropped.
pub fn split_filters(filters: &str) -> Vec<String> {
    filters
        .split(',')
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

/// Appends an already-encoded query string to a path, choosing `?` or `&`.
pub fn append_query(path: &str, query: &str) -> String {
    if query.is_empty() {
        return path.to_string();
    }
    let symbol = if path.contains('?') { '&' } else { '?' };
    format!("{}{}{}", path, symbol, query)
}

fn push_param(out: &mut Vec<String>, name: &str, value: &str) {
    out.push(format!("{}={}", name, urlencoding::encode(value)));
}

/// Parameters for paginated collection requests.
///
/// Use the builder methods to set the optional dimensions.
///
/// # Example
///
/// ```
/// use oneview::query::QueryParams;
///
/// let params = QueryParams::new()
///     .with_count(10)
///     .with_filter("name='SAN A'")
///     .with_sort("name:ascending");
/// assert_eq!(
///     params.to_query_string(),
///     "start=0&count=10&filter=name%3D%27SAN%20A%27&sort=name%3Aascending"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    /// First item to return (0-based).
    pub start: u32,

    /// Item cap; `None` requests everything.
    pub count: Option<u32>,

    /// Filter expressions, each sent as its own `filter=` parameter.
    pub filters: Vec<String>,

    /// Free-form query expression.
    pub query: Option<String>,

    /// Sort expression, e.g. `name:ascending`.
    pub sort: Option<String>,

    /// Predefined view name.
    pub view: Option<String>,

    /// Comma-separated field list.
    pub fields: Option<String>,
}

impl QueryParams {
    /// Creates parameters requesting every item from the start.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the starting offset.
    pub fn with_start(mut self, start: u32) -> Self {
        self.start = start;
        self
    }

    /// Caps the number of items requested.
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Adds one filter expression. Empty expressions are ignored.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        if !filter.is_empty() {
            self.filters.push(filter);
        }
        self
    }

    /// Adds each expression of a comma-joined filter list separately.
    pub fn with_filter_list(mut self, filters: &str) -> Self {
        self.filters.extend(split_filters(filters));
        self
    }

    /// Sets the free-form query expression.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = non_empty(query.into());
        self
    }

    /// Sets the sort expression.
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = non_empty(sort.into());
        self
    }

    /// Sets the view name.
    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.view = non_empty(view.into());
        self
    }

    /// Sets the field list.
    pub fn with_fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = non_empty(fields.into());
        self
    }

    /// Returns the item cap as sent on the wire (`-1` when unbounded).
    pub fn wire_count(&self) -> i64 {
        self.count.map(i64::from).unwrap_or(UNBOUNDED_COUNT)
    }

    /// Renders the query string without a leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut parts = vec![
            format!("start={}", self.start),
            format!("count={}", self.wire_count()),
        ];

        for filter in &self.filters {
            push_param(&mut parts, "filter", filter);
        }
        if let Some(ref query) = self.query {
            push_param(&mut parts, "query", query);
        }
        if let Some(ref sort) = self.sort {
            push_param(&mut parts, "sort", sort);
        }
        if let Some(ref view) = self.view {
            push_param(&mut parts, "view", view);
        }
        if let Some(ref fields) = self.fields {
            push_param(&mut parts, "fields", fields);
        }

        parts.join("&")
    }

    /// Appends the query string to a collection path.
    pub fn apply_to(&self, path: &str) -> String {
        append_query(path, &self.to_query_string())
    }
}

/// Parameters for `/utilization` requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UtilizationQuery {
    /// Metric names in the format `METRIC[,METRIC]...`.
    pub fields: Option<String>,

    /// Filter expressions such as `startDate=2016-05-30T11:20:44.541Z`.
    pub filters: Vec<String>,

    /// Ask the appliance to queue a refresh of the samples.
    pub refresh: bool,

    /// Resolution of the samples: `native`, `hour` or `day`.
    pub view: Option<String>,
}

impl UtilizationQuery {
    /// Creates an empty utilization query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the metric list.
    pub fn with_fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = non_empty(fields.into());
        self
    }

    /// Adds filters from a comma-joined `NAME=VALUE[,NAME=VALUE]...` list.
    pub fn with_filter(mut self, filters: &str) -> Self {
        self.filters.extend(split_filters(filters));
        self
    }

    /// Requests a refresh of the utilization data.
    pub fn with_refresh(mut self) -> Self {
        self.refresh = true;
        self
    }

    /// Sets the sample resolution.
    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.view = non_empty(view.into());
        self
    }

    /// Renders the query string without a leading `?`; empty when nothing is set.
    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::new();

        for filter in &self.filters {
            push_param(&mut parts, "filter", filter);
        }
        if let Some(ref fields) = self.fields {
            push_param(&mut parts, "fields", fields);
        }
        if self.refresh {
            parts.push("refresh=true".to_string());
        }
        if let Some(ref view) = self.view {
            push_param(&mut parts, "view", view);
        }

        parts.join("&")
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
