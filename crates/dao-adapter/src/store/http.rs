//! HTTP Document Store - Client for an Elasticsearch-compatible engine
//!
//! Speaks the typeless REST API (`/{index}/_doc/{id}`). Engines without
//! per-document types keep the mapping tag in the reserved source field
//! [`MAPPING_FIELD`]; it is written with every document and stripped on read.
//! Listing and counting filter on that field, so several entity types can
//! share one index.

use std::net::ToSocketAddrs;
use std::time::Duration;

use dao_domain::{Document, DocumentKey, DocumentStore, StoreError, WriteMode, WriteResult};
use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use shared::{EngineConfig, RefreshPolicy};
use tracing::{debug, info, warn};

use crate::error::ConnectError;

/// Source field holding the mapping tag of a stored document
pub const MAPPING_FIELD: &str = "doc_type";

const INDEX_NOT_FOUND: &str = "index_not_found_exception";
const INDEX_ALREADY_EXISTS: &str = "resource_already_exists_exception";
const VERSION_CONFLICT: &str = "version_conflict_engine_exception";

/// How long the engine keeps a search context alive between pages
const SCROLL_KEEP_ALIVE: &str = "1m";

/// Engine identity reported by the root endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cluster_name: String,
    pub version: EngineVersion,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineVersion {
    pub number: String,
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    #[serde(default)]
    found: bool,
    #[serde(rename = "_source")]
    source: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "_scroll_id")]
    scroll_id: Option<String>,
    hits: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    total: Option<TotalHits>,
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TotalHits {
    /// 7.x and later: `{"value": 3, "relation": "eq"}`
    Counted {
        value: u64,
        #[serde(default)]
        relation: Option<String>,
    },
    /// 6.x: a bare number
    Plain(u64),
}

impl TotalHits {
    /// Exact number of matching documents, `None` for a lower bound
    fn exact(&self) -> Option<u64> {
        match self {
            TotalHits::Counted { value, relation } => match relation.as_deref() {
                None | Some("eq") => Some(*value),
                Some(_) => None,
            },
            TotalHits::Plain(value) => Some(*value),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "_source")]
    source: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

/// Engine client handle
///
/// Built once at startup with [`connect`](Self::connect) and shared by
/// reference counting. Connections are pooled by the underlying HTTP
/// client, every request is bounded by the configured timeouts.
#[derive(Debug, Clone)]
pub struct HttpDocumentStore {
    http_client: HttpClient,
    base_url: Url,
    refresh: RefreshPolicy,
    page_size: u32,
}

impl HttpDocumentStore {
    /// Build a client for the engine described by `config`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The host cannot be resolved
    /// - The base URL is malformed
    /// - The HTTP client cannot be created
    pub fn connect(config: &EngineConfig) -> Result<Self, ConnectError> {
        let address = config.address();
        let resolved = address
            .to_socket_addrs()
            .map_err(|source| ConnectError::Resolve {
                address: address.clone(),
                source,
            })?
            .count();
        if resolved == 0 {
            return Err(ConnectError::NoAddress { address });
        }

        let url = config.base_url();
        let base_url = Url::parse(&url).map_err(|e| ConnectError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConnectError::InvalidUrl {
                url,
                reason: "cannot be a base URL".to_string(),
            });
        }

        let http_client = HttpClient::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .pool_max_idle_per_host(10)
            .build()?;

        info!(url = %base_url, addresses = resolved, "Engine client ready");

        Ok(Self {
            http_client,
            base_url,
            refresh: config.refresh,
            page_size: config.page_size,
        })
    }

    /// Fetch engine identity from the root endpoint
    pub fn ping(&self) -> Result<EngineInfo, StoreError> {
        let url = self.endpoint(&[])?;
        let response = self.execute(Method::GET, url, None, false)?;
        if !response.status().is_success() {
            return Err(error_from(response, "", None));
        }
        parse_json(response)
    }

    /// Shut the client down
    ///
    /// Drops this handle's reference to the connection pool. The pool itself
    /// is released once every clone of the handle is gone.
    pub fn close(self) {
        let Self {
            http_client,
            base_url,
            ..
        } = self;
        drop(http_client);
        info!(url = %base_url, "Engine client closed");
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::Transport {
                message: format!("{} cannot be a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
        refresh: bool,
    ) -> Result<Response, StoreError> {
        debug!(method = %method, url = %url, "Engine request");

        let mut request = self.http_client.request(method, url);
        if refresh {
            request = request.query(&[("refresh", self.refresh.as_query())]);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().map_err(|e| StoreError::Transport {
            message: e.to_string(),
        })
    }

    /// Follow the scroll cursor until the hits run out or `expected`
    /// documents are in hand
    fn collect_pages(
        &self,
        mut hits: Vec<SearchHit>,
        expected: Option<u64>,
        scroll_id: &mut Option<String>,
    ) -> Result<Vec<Document>, StoreError> {
        let mut documents = Vec::new();

        while !hits.is_empty() {
            documents.extend(
                hits.drain(..)
                    .filter_map(|hit| hit.source)
                    .map(|source| from_source(source).1),
            );
            if expected.is_some_and(|total| documents.len() as u64 >= total) {
                break;
            }
            let Some(current) = scroll_id.clone() else {
                break;
            };

            let page = self.next_page(&current)?;
            if page.scroll_id.is_some() {
                *scroll_id = page.scroll_id;
            }
            hits = page.hits.hits;
        }
        Ok(documents)
    }

    fn next_page(&self, scroll_id: &str) -> Result<SearchResponse, StoreError> {
        let url = self.endpoint(&["_search", "scroll"])?;
        let body = json!({
            "scroll": SCROLL_KEEP_ALIVE,
            "scroll_id": scroll_id,
        });
        let response = self.execute(Method::POST, url, Some(&body), false)?;

        if !response.status().is_success() {
            return Err(error_from(response, "", None));
        }
        parse_json(response)
    }

    /// Release a search context; it would expire on its own otherwise
    fn clear_scroll(&self, scroll_id: &str) {
        let body = json!({ "scroll_id": [scroll_id] });
        let result = self
            .endpoint(&["_search", "scroll"])
            .and_then(|url| self.execute(Method::DELETE, url, Some(&body), false));

        match result {
            Ok(response)
                if response.status().is_success() || response.status() == StatusCode::NOT_FOUND => {}
            Ok(response) => warn!(status = %response.status(), "Failed to release search context"),
            Err(e) => warn!(error = %e, "Failed to release search context"),
        }
    }
}

impl DocumentStore for HttpDocumentStore {
    fn index_exists(&self, index: &str) -> Result<bool, StoreError> {
        let url = self.endpoint(&[index])?;
        let response = self.execute(Method::HEAD, url, None, false)?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(error_from(response, index, None)),
        }
    }

    fn create_index(&self, index: &str) -> Result<(), StoreError> {
        let url = self.endpoint(&[index])?;
        let response = self.execute(Method::PUT, url, Some(&index_mappings()), false)?;

        let status = response.status();
        if status.is_success() {
            info!(index = %index, "Index created on engine");
            return Ok(());
        }

        let body = response.text().unwrap_or_default();
        match error_details(&body).0.as_deref() {
            // Created concurrently by another client
            Some(INDEX_ALREADY_EXISTS) => Ok(()),
            _ => Err(classify_error(status.as_u16(), &body, index, None)),
        }
    }

    fn get(
        &self,
        index: &str,
        mapping: &str,
        key: &DocumentKey,
    ) -> Result<Option<Document>, StoreError> {
        let url = self.endpoint(&[index, "_doc", key.as_str()])?;
        let response = self.execute(Method::GET, url, None, false)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            let body = response.text().unwrap_or_default();
            return match classify_error(status.as_u16(), &body, index, Some(key)) {
                e @ StoreError::IndexNotFound { .. } => Err(e),
                _ => Ok(None),
            };
        }
        if !status.is_success() {
            return Err(error_from(response, index, Some(key)));
        }

        let found: GetResponse = parse_json(response)?;
        if !found.found {
            return Ok(None);
        }
        let source = found.source.ok_or_else(|| StoreError::InvalidResponse {
            message: format!("document '{}' has no _source", key),
        })?;

        let (stored_mapping, document) = from_source(source);
        match stored_mapping {
            Some(stored) if stored != mapping => Ok(None),
            _ => Ok(Some(document)),
        }
    }

    fn put(
        &self,
        index: &str,
        mapping: &str,
        key: &DocumentKey,
        document: &Document,
        mode: WriteMode,
    ) -> Result<WriteResult, StoreError> {
        let operation = match mode {
            WriteMode::Upsert => "_doc",
            WriteMode::CreateOnly => "_create",
        };
        let url = self.endpoint(&[index, operation, key.as_str()])?;
        let body = to_source(document, mapping);
        let response = self.execute(Method::PUT, url, Some(&body), true)?;

        if !response.status().is_success() {
            return Err(error_from(response, index, Some(key)));
        }
        write_result(response)
    }

    fn update(
        &self,
        index: &str,
        mapping: &str,
        key: &DocumentKey,
        partial: &Document,
    ) -> Result<WriteResult, StoreError> {
        let url = self.endpoint(&[index, "_update", key.as_str()])?;
        // Without detect_noop=false an identical update reports "noop"
        let body = json!({
            "doc": to_source(partial, mapping),
            "detect_noop": false,
        });
        let response = self.execute(Method::POST, url, Some(&body), true)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            let body = response.text().unwrap_or_default();
            return match classify_error(status.as_u16(), &body, index, Some(key)) {
                e @ StoreError::IndexNotFound { .. } => Err(e),
                _ => Ok(WriteResult::NotFound),
            };
        }
        if !status.is_success() {
            return Err(error_from(response, index, Some(key)));
        }
        write_result(response)
    }

    fn delete(
        &self,
        index: &str,
        _mapping: &str,
        key: &DocumentKey,
    ) -> Result<WriteResult, StoreError> {
        let url = self.endpoint(&[index, "_doc", key.as_str()])?;
        let response = self.execute(Method::DELETE, url, None, true)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            let body = response.text().unwrap_or_default();
            return match classify_error(status.as_u16(), &body, index, Some(key)) {
                e @ StoreError::IndexNotFound { .. } => Err(e),
                _ => Ok(WriteResult::NotFound),
            };
        }
        if !status.is_success() {
            return Err(error_from(response, index, Some(key)));
        }
        write_result(response)
    }

    fn search(&self, index: &str, mapping: &str) -> Result<Vec<Document>, StoreError> {
        let mut url = self.endpoint(&[index, "_search"])?;
        url.query_pairs_mut().append_pair("scroll", SCROLL_KEEP_ALIVE);
        let body = json!({
            "size": self.page_size,
            "query": mapping_filter(mapping),
            "sort": ["_doc"],
            "track_total_hits": true,
        });
        let response = self.execute(Method::POST, url, Some(&body), false)?;

        if !response.status().is_success() {
            return Err(error_from(response, index, None));
        }
        let first: SearchResponse = parse_json(response)?;
        let expected = first.hits.total.as_ref().and_then(TotalHits::exact);

        let mut scroll_id = first.scroll_id.clone();
        let collected = self.collect_pages(first.hits.hits, expected, &mut scroll_id);
        if let Some(scroll_id) = scroll_id {
            self.clear_scroll(&scroll_id);
        }
        let documents = collected?;

        if let Some(total) = expected {
            if (documents.len() as u64) < total {
                return Err(StoreError::InvalidResponse {
                    message: format!(
                        "search on '{}' returned {} of {} documents",
                        index,
                        documents.len(),
                        total
                    ),
                });
            }
        }
        debug!(index = %index, mapping = %mapping, documents = documents.len(), "Search complete");
        Ok(documents)
    }

    fn count(&self, index: &str, mapping: &str) -> Result<u64, StoreError> {
        let url = self.endpoint(&[index, "_count"])?;
        let body = json!({ "query": mapping_filter(mapping) });
        let response = self.execute(Method::POST, url, Some(&body), false)?;

        if !response.status().is_success() {
            return Err(error_from(response, index, None));
        }
        let counted: CountResponse = parse_json(response)?;
        Ok(counted.count)
    }
}

fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    response.json::<T>().map_err(|e| StoreError::InvalidResponse {
        message: e.to_string(),
    })
}

fn write_result(response: Response) -> Result<WriteResult, StoreError> {
    let written: WriteResponse = parse_json(response)?;
    WriteResult::from_engine_name(&written.result).ok_or_else(|| StoreError::InvalidResponse {
        message: format!("unknown write result '{}'", written.result),
    })
}

fn error_from(response: Response, index: &str, key: Option<&DocumentKey>) -> StoreError {
    let status = response.status().as_u16();
    let body = response.text().unwrap_or_default();
    classify_error(status, &body, index, key)
}

/// `(error.type, error.reason)` of an engine error body
fn error_details(body: &str) -> (Option<String>, Option<String>) {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return (None, None);
    };
    let error = &value["error"];
    let text = |field: &str| error[field].as_str().map(str::to_string);
    match error {
        Value::String(reason) => (None, Some(reason.clone())),
        _ => (text("type"), text("reason")),
    }
}

fn classify_error(status: u16, body: &str, index: &str, key: Option<&DocumentKey>) -> StoreError {
    let (error_type, reason) = error_details(body);

    match (status, error_type.as_deref()) {
        (404, Some(INDEX_NOT_FOUND)) => StoreError::IndexNotFound {
            index: index.to_string(),
        },
        (409, _) | (_, Some(VERSION_CONFLICT)) => StoreError::Conflict {
            key: key.map(|k| k.to_string()).unwrap_or_default(),
        },
        _ => StoreError::UnexpectedResponse {
            status,
            message: reason.unwrap_or_else(|| body.to_string()),
        },
    }
}

fn term(field: String, value: &str) -> Value {
    let mut clause = Map::new();
    clause.insert(field, Value::String(value.to_string()));
    json!({ "term": Value::Object(clause) })
}

/// Query matching documents tagged with `mapping`
///
/// Indices created here map the tag as a keyword. Indices created by other
/// clients with dynamic mapping expose it as `doc_type.keyword` instead.
fn mapping_filter(mapping: &str) -> Value {
    json!({
        "bool": {
            "should": [
                term(MAPPING_FIELD.to_string(), mapping),
                term(format!("{}.keyword", MAPPING_FIELD), mapping),
            ],
            "minimum_should_match": 1,
        }
    })
}

fn index_mappings() -> Value {
    let mut properties = Map::new();
    properties.insert(MAPPING_FIELD.to_string(), json!({ "type": "keyword" }));
    json!({ "mappings": { "properties": Value::Object(properties) } })
}

fn to_source(document: &Document, mapping: &str) -> Value {
    let mut source: Map<String, Value> = document
        .iter()
        .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
        .collect();
    source.insert(MAPPING_FIELD.to_string(), Value::String(mapping.to_string()));
    Value::Object(source)
}

/// Split a stored source into its mapping tag and document fields
///
/// Non-string values written by other clients are kept in their JSON text
/// form; nulls are dropped.
fn from_source(source: Map<String, Value>) -> (Option<String>, Document) {
    let mut mapping = None;
    let mut document = Document::new();

    for (name, value) in source {
        if name == MAPPING_FIELD {
            mapping = value.as_str().map(str::to_string);
            continue;
        }
        match value {
            Value::Null => {}
            Value::String(text) => document.set(name, text),
            other => document.set(name, other),
        }
    }
    (mapping, document)
}
