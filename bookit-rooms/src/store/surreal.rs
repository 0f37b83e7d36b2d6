//! SurrealDB document collection
//!
//! Supports runtime protocol selection via URL scheme:
//! - `ws://` / `wss://` - WebSocket connections
//! - `http://` / `https://` - HTTP connections
//! - `mem://` - In-memory database (for testing)
//!
//! Each document is a record `table:<id>` whose content is the JSON form of the
//! document. Query criteria are rendered into a parameterized `WHERE` clause;
//! operands are always bound, never interpolated.

use std::marker::PhantomData;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::config::SurrealDbConfig;
use crate::error::{Error, Result};
use crate::query::QuerySpec;
use crate::repository::{
    merge_patch, Document, FilterCondition, FilterOperator, Patch, Repository, RepositoryError,
    RepositoryOperation, RepositoryResult,
};

/// SurrealDB client type alias using the `Any` engine for runtime protocol selection
pub type SurrealClient = surrealdb::Surreal<surrealdb::engine::any::Any>;

static FIELD_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("field segment regex is valid")
});

/// Create a SurrealDB client, retrying with exponential backoff
pub async fn create_client(config: &SurrealDbConfig) -> Result<SurrealClient> {
    let mut attempt = 0;
    let base_delay = Duration::from_secs(config.retry_delay_secs);

    loop {
        match try_create_client(config).await {
            Ok(client) => {
                if attempt > 0 {
                    tracing::info!(
                        "SurrealDB connection established after {} attempt(s)",
                        attempt + 1
                    );
                } else {
                    tracing::info!(
                        "SurrealDB connected: url={}, ns={}, db={}",
                        sanitize_url(&config.url),
                        config.namespace,
                        config.database
                    );
                }
                return Ok(client);
            }
            Err(e) => {
                attempt += 1;

                if attempt > config.max_retries {
                    tracing::error!(
                        "Failed to connect to SurrealDB after {} attempts: {}",
                        config.max_retries + 1,
                        e
                    );
                    return Err(e);
                }

                let delay = base_delay * 2_u32.pow(attempt.saturating_sub(1));
                tracing::warn!(
                    "SurrealDB connection attempt {} failed: {}. Retrying in {:?}...",
                    attempt,
                    e,
                    delay
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}

async fn try_create_client(config: &SurrealDbConfig) -> Result<SurrealClient> {
    let url_safe = sanitize_url(&config.url);
    tracing::debug!("Connecting to SurrealDB: {}", url_safe);

    let client = surrealdb::engine::any::connect(&config.url)
        .await
        .map_err(|e| {
            Error::Store(format!(
                "failed to connect to SurrealDB at '{}' ({}): {}",
                url_safe,
                categorize_error(&e),
                e
            ))
        })?;

    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        client
            .signin(surrealdb::opt::auth::Root { username, password })
            .await
            .map_err(|e| {
                Error::Store(format!(
                    "failed to authenticate with SurrealDB at '{}' ({}): {}",
                    url_safe,
                    categorize_error(&e),
                    e
                ))
            })?;
    }

    client
        .use_ns(&config.namespace)
        .use_db(&config.database)
        .await
        .map_err(|e| {
            Error::Store(format!(
                "failed to select namespace '{}' / database '{}' ({}): {}",
                config.namespace,
                config.database,
                categorize_error(&e),
                e
            ))
        })?;

    Ok(client)
}

/// Remove credentials from a connection URL before logging it
pub fn sanitize_url(url: &str) -> String {
    if let (Some(at_pos), Some(scheme_end)) = (url.find('@'), url.find("://")) {
        let scheme = &url[..scheme_end + 3];
        let after_at = &url[at_pos..];
        return format!("{}***{}", scheme, after_at);
    }
    url.to_string()
}

fn categorize_error(err: &surrealdb::Error) -> &'static str {
    let err_str = err.to_string().to_lowercase();

    if err_str.contains("auth") || err_str.contains("credentials") || err_str.contains("signin") {
        "authentication error"
    } else if err_str.contains("connect")
        || err_str.contains("network")
        || err_str.contains("dns")
        || err_str.contains("refused")
    {
        "network error"
    } else if err_str.contains("permission") || err_str.contains("not allowed") {
        "permission error"
    } else if err_str.contains("timeout") {
        "timeout"
    } else {
        "connection error"
    }
}

/// A `WHERE` clause with its bound parameters
#[derive(Debug, Default, PartialEq)]
pub(crate) struct WhereClause {
    pub sql: String,
    pub bindings: Vec<(String, Value)>,
}

/// Render `spec` criteria, or an empty clause when it matches everything
pub(crate) fn render_where(spec: &QuerySpec) -> WhereClause {
    let mut clause = WhereClause::default();
    let mut parts = Vec::new();

    for (index, condition) in spec.criteria().enumerate() {
        parts.push(render_condition(index, condition, &mut clause.bindings));
    }

    if !parts.is_empty() {
        clause.sql = format!(" WHERE {}", parts.join(" AND "));
    }
    clause
}

fn render_condition(
    index: usize,
    condition: &FilterCondition,
    bindings: &mut Vec<(String, Value)>,
) -> String {
    let Some(field) = field_expression(&condition.field) else {
        return "false".to_string();
    };

    let scalar = |subject: &str, bindings: &mut Vec<(String, Value)>| {
        scalar_predicate(index, subject, condition, bindings)
    };

    let direct = scalar(&field, bindings);
    let element = scalar("$this", bindings);
    format!("({direct} OR (type::is::array({field}) AND array::len({field}[WHERE {element}]) > 0))")
}

fn scalar_predicate(
    index: usize,
    subject: &str,
    condition: &FilterCondition,
    bindings: &mut Vec<(String, Value)>,
) -> String {
    let mut bind = |suffix: &str, value: Value| {
        let name = format!("c{index}{suffix}");
        if !bindings.iter().any(|(n, _)| *n == name) {
            bindings.push((name.clone(), value));
        }
        format!("${name}")
    };

    if condition.operator == FilterOperator::Contains {
        let needle = bind("s", Value::String(condition.value.to_lowercase()));
        return format!(
            "(type::is::string({subject}) AND string::contains(string::lowercase({subject}), {needle}))"
        );
    }

    let op = condition.operator.to_string();
    let mut alternatives = vec![format!(
        "(type::is::string({subject}) AND {subject} {op} {})",
        bind("s", Value::String(condition.value.clone()))
    )];

    if let Some(number) = condition
        .value
        .trim()
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
    {
        alternatives.push(format!(
            "(type::is::number({subject}) AND {subject} {op} {})",
            bind("n", Value::Number(number))
        ));
    }

    if let Ok(flag) = condition.value.parse::<bool>() {
        alternatives.push(format!(
            "(type::is::bool({subject}) AND {subject} {op} {})",
            bind("b", Value::Bool(flag))
        ));
    }

    format!("({})", alternatives.join(" OR "))
}

/// Backtick-quoted field path, or `None` if any segment is not a plain identifier
fn field_expression(field: &str) -> Option<String> {
    field
        .split('.')
        .map(|segment| {
            FIELD_SEGMENT
                .is_match(segment)
                .then(|| format!("`{segment}`"))
        })
        .collect::<Option<Vec<_>>>()
        .map(|segments| segments.join("."))
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: u64,
}

/// Documents stored in a SurrealDB table
pub struct SurrealStore<D> {
    client: SurrealClient,
    table: String,
    _document: PhantomData<fn() -> D>,
}

impl<D> Clone for SurrealStore<D> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            table: self.table.clone(),
            _document: PhantomData,
        }
    }
}

impl<D: Document> SurrealStore<D> {
    /// Use `table` on an already connected client
    pub fn new(client: SurrealClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
            _document: PhantomData,
        }
    }

    /// Connect using `config` and use its table
    pub async fn connect(config: &SurrealDbConfig) -> Result<Self> {
        let client = create_client(config).await?;
        Ok(Self::new(client, config.table.clone()))
    }

    fn db_error(operation: RepositoryOperation) -> impl Fn(surrealdb::Error) -> RepositoryError {
        move |e| RepositoryError::database_error(operation, e.to_string())
    }

    async fn insert(&self, document: &D) -> RepositoryResult<()> {
        self.client
            .query("CREATE type::thing($tb, $id) CONTENT $data RETURN NONE")
            .bind(("tb", self.table.clone()))
            .bind(("id", document.id().to_string()))
            .bind(("data", document.clone()))
            .await
            .and_then(|response| response.check())
            .map_err(Self::db_error(RepositoryOperation::Create))?;
        Ok(())
    }

    async fn count_where(&self, spec: &QuerySpec) -> RepositoryResult<u64> {
        let clause = render_where(spec);
        let sql = format!(
            "SELECT count() FROM type::table($tb){} GROUP ALL",
            clause.sql
        );

        let mut query = self.client.query(sql).bind(("tb", self.table.clone()));
        for binding in clause.bindings {
            query = query.bind(binding);
        }

        let mut response = query.await.map_err(Self::db_error(RepositoryOperation::Count))?;
        let row: Option<CountRow> = response
            .take(0)
            .map_err(Self::db_error(RepositoryOperation::Count))?;
        Ok(row.map_or(0, |r| r.count))
    }
}

impl<D: Document> Repository<D::Id, D, D::Draft, Patch> for SurrealStore<D> {
    async fn count_all(&self) -> RepositoryResult<u64> {
        self.count_where(&QuerySpec::new()).await
    }

    async fn count_matching(&self, spec: &QuerySpec) -> RepositoryResult<u64> {
        self.count_where(spec).await
    }

    async fn fetch_page(&self, spec: &QuerySpec) -> RepositoryResult<Vec<D>> {
        let clause = render_where(spec);
        let window = spec
            .window()
            .map(|_| " LIMIT $limit START $start")
            .unwrap_or_default();
        // createdAt is written with fixed precision, so string order is time order
        let sql = format!(
            "SELECT * OMIT id FROM type::table($tb){} ORDER BY createdAt, {}{}",
            clause.sql,
            D::ID_FIELD,
            window
        );

        let mut query = self.client.query(sql).bind(("tb", self.table.clone()));
        for binding in clause.bindings {
            query = query.bind(binding);
        }
        if let Some(window) = spec.window() {
            query = query
                .bind(("limit", window.limit))
                .bind(("start", window.offset));
        }

        let mut response = query
            .await
            .map_err(Self::db_error(RepositoryOperation::FetchPage))?;
        let documents: Vec<D> = response
            .take(0)
            .map_err(Self::db_error(RepositoryOperation::FetchPage))?;
        tracing::debug!(entity = D::ENTITY, returned = documents.len(), "Fetched page");
        Ok(documents)
    }

    async fn find_by_id(&self, id: &D::Id) -> RepositoryResult<Option<D>> {
        let mut response = self
            .client
            .query("SELECT * OMIT id FROM type::thing($tb, $id)")
            .bind(("tb", self.table.clone()))
            .bind(("id", id.to_string()))
            .await
            .map_err(Self::db_error(RepositoryOperation::FindById))?;

        response
            .take(0)
            .map_err(Self::db_error(RepositoryOperation::FindById))
    }

    async fn create(&self, data: D::Draft) -> RepositoryResult<D> {
        let document = D::from_draft(data);
        self.insert(&document).await?;

        tracing::debug!(entity = D::ENTITY, id = %document.id(), "Created document");
        Ok(document)
    }

    async fn update(&self, id: &D::Id, data: Patch) -> RepositoryResult<Option<D>> {
        let Some(current) = self
            .find_by_id(id)
            .await
            .map_err(|e| e.with_operation(RepositoryOperation::Update))?
        else {
            return Ok(None);
        };

        let updated = merge_patch(&current, data)?;

        self.client
            .query("UPDATE type::thing($tb, $id) CONTENT $data RETURN NONE")
            .bind(("tb", self.table.clone()))
            .bind(("id", id.to_string()))
            .bind(("data", updated.clone()))
            .await
            .and_then(|response| response.check())
            .map_err(Self::db_error(RepositoryOperation::Update))?;

        tracing::debug!(entity = D::ENTITY, id = %id, "Updated document");
        Ok(Some(updated))
    }

    async fn delete(&self, id: &D::Id) -> RepositoryResult<bool> {
        let exists = self
            .find_by_id(id)
            .await
            .map_err(|e| e.with_operation(RepositoryOperation::Delete))?
            .is_some();
        if !exists {
            return Ok(false);
        }

        self.client
            .query("DELETE type::thing($tb, $id) RETURN NONE")
            .bind(("tb", self.table.clone()))
            .bind(("id", id.to_string()))
            .await
            .and_then(|response| response.check())
            .map_err(Self::db_error(RepositoryOperation::Delete))?;

        tracing::debug!(entity = D::ENTITY, id = %id, "Deleted document");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryParams;
    use crate::rooms::{fixtures::new_room, Room};
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs.iter().copied().collect()
    }

    async fn mem_store() -> SurrealStore<Room> {
        let config = SurrealDbConfig {
            max_retries: 0,
            ..SurrealDbConfig::default()
        };
        SurrealStore::connect(&config).await.unwrap()
    }

    #[test]
    fn test_sanitize_url() {
        assert_eq!(sanitize_url("ws://localhost:8000"), "ws://localhost:8000");
        assert_eq!(sanitize_url("mem://"), "mem://");

        let sanitized = sanitize_url("ws://user:pass@localhost:8000");
        assert_eq!(sanitized, "ws://***@localhost:8000");
    }

    #[test]
    fn test_field_expression() {
        assert_eq!(field_expression("pricePerNight").as_deref(), Some("`pricePerNight`"));
        assert_eq!(field_expression("location.city").as_deref(), Some("`location`.`city`"));
        assert_eq!(field_expression("_id").as_deref(), Some("`_id`"));
        assert!(field_expression("price[ne]").is_none());
        assert!(field_expression("a..b").is_none());
        assert!(field_expression("x` OR true").is_none());
    }

    #[test]
    fn test_render_where_empty_query() {
        assert_eq!(render_where(&QuerySpec::new()), WhereClause::default());
    }

    #[test]
    fn test_render_where_binds_operands() {
        let spec = QuerySpec::new()
            .with_condition(FilterCondition::gte("pricePerNight", "100"))
            .with_condition(FilterCondition::eq("bad name", "1"));
        let clause = render_where(&spec);

        assert!(clause.sql.starts_with(" WHERE ("));
        assert!(clause.sql.contains("`pricePerNight` >= $c0s"));
        assert!(clause.sql.contains("`pricePerNight` >= $c0n"));
        assert!(clause.sql.ends_with(" AND false"));
        assert!(!clause.sql.contains("100"));
        assert_eq!(
            clause.bindings,
            vec![
                ("c0s".to_string(), json!("100")),
                ("c0n".to_string(), json!(100.0)),
            ]
        );
    }

    #[test]
    fn test_render_contains_lowercases_needle() {
        let p = params(&[("keyword", "LaKe")]);
        let clause = render_where(&QuerySpec::new().search(&p, "address"));
        assert!(clause.sql.contains("string::contains(string::lowercase(`address`), $c0s)"));
        assert_eq!(clause.bindings, vec![("c0s".to_string(), json!("lake"))]);
    }

    #[tokio::test]
    async fn test_mem_connection() {
        let config = SurrealDbConfig {
            namespace: "test".to_string(),
            database: "test".to_string(),
            max_retries: 0,
            ..SurrealDbConfig::default()
        };
        let result = create_client(&config).await;
        assert!(result.is_ok(), "Failed to connect to in-memory SurrealDB: {:?}", result.err());
    }

    fn room_at(name: &str, created_at: &str) -> Room {
        let mut room = Room::from_draft(new_room(name, "Beach Road", 100.0));
        room.created_at = created_at.parse().unwrap();
        room
    }

    async fn all_pages(store: &SurrealStore<Room>, per_page: u64) -> Vec<String> {
        let mut names = Vec::new();
        for page in 1.. {
            let page = page.to_string();
            let spec = QuerySpec::new().paginate(&params(&[("page", page.as_str())]), per_page);
            let rooms = store.fetch_page(&spec).await.unwrap();
            if rooms.is_empty() {
                break;
            }
            names.extend(rooms.into_iter().map(|r| r.name));
        }
        names
    }

    #[tokio::test]
    async fn test_pages_follow_creation_time() {
        let store = mem_store().await;
        for room in [
            room_at("C", "2024-05-01T12:00:00.9Z"),
            room_at("B", "2024-05-01T12:00:00.123000500Z"),
            room_at("E", "2024-05-01T12:00:10Z"),
            room_at("A", "2024-05-01T12:00:00.123Z"),
            room_at("D", "2024-05-01T12:00:01Z"),
        ] {
            store.insert(&room).await.unwrap();
        }

        assert_eq!(all_pages(&store, 2).await, vec!["A", "B", "C", "D", "E"]);
    }

    #[tokio::test]
    async fn test_pages_follow_insertion_order() {
        let store = mem_store().await;
        for i in 0..7 {
            store
                .create(new_room(&format!("Room {i}"), "Beach Road", 100.0))
                .await
                .unwrap();
        }

        let expected: Vec<String> = (0..7).map(|i| format!("Room {i}")).collect();
        assert_eq!(all_pages(&store, 3).await, expected);
    }

    #[tokio::test]
    async fn test_crud_and_listing() {
        let store = mem_store().await;
        for i in 0..6 {
            let address = if i % 2 == 0 { "Beach Road" } else { "Hill Top" };
            store
                .create(new_room(&format!("Room {i}"), address, 100.0 * (i + 1) as f64))
                .await
                .unwrap();
        }

        assert_eq!(store.count_all().await.unwrap(), 6);

        let p = params(&[("keyword", "beach"), ("pricePerNight[lte]", "300"), ("page", "1")]);
        let criteria = QuerySpec::new().search(&p, "address").filter(&p);
        assert_eq!(store.count_matching(&criteria).await.unwrap(), 2);

        let page = store.fetch_page(&criteria.paginate(&p, 1)).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "Room 0");

        let id = page[0].id.clone();
        let updated = store
            .update(&id, json!({ "name": "Renamed" }).as_object().cloned().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(store.find_by_id(&id).await.unwrap().unwrap().name, "Renamed");

        assert!(store.delete(&id).await.unwrap());
        assert!(!store.delete(&id).await.unwrap());
        assert_eq!(store.count_all().await.unwrap(), 5);
    }
}
