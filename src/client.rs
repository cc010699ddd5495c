//! HTTP client for the Obsidian Local REST API.
//!
//! Owns the transport contract: base URL construction, bearer-token
//! injection, fixed timeouts, TLS verification, and uniform error
//! translation. Every store capability maps onto exactly one HTTP request;
//! all failures surface as [`McpError::Store`].

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{McpError, Result};

/// Time allowed to establish a connection to the REST API.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
/// Time allowed for the full request/response exchange.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(6);

/// Immutable connection settings for the Obsidian Local REST API.
///
/// Constructed once at startup from CLI flags and environment variables,
/// then owned by a single [`ObsidianClient`] for the process lifetime.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Bearer token for the REST API
    pub api_key: String,
    /// URL scheme, `http` or `https`
    pub protocol: String,
    /// Host where the REST API listens
    pub host: String,
    /// Port of the REST API
    pub port: u16,
    /// Whether to verify the API's TLS certificate (the plugin ships a
    /// self-signed one, so this is usually off)
    pub verify_tls: bool,
}

impl ClientConfig {
    /// The fixed base address all request paths are appended to.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }
}

/// Calendar period recognized by the periodic-notes endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Daily note
    Daily,
    /// Weekly note
    Weekly,
    /// Monthly note
    Monthly,
    /// Quarterly note
    Quarterly,
    /// Yearly note
    Yearly,
}

impl Period {
    /// All recognized periods, in wire order.
    pub const ALL: [Period; 5] = [
        Period::Daily,
        Period::Weekly,
        Period::Monthly,
        Period::Quarterly,
        Period::Yearly,
    ];

    /// Wire name used in request paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::Quarterly => "quarterly",
            Period::Yearly => "yearly",
        }
    }

    /// Parse a wire name; anything outside the five keywords is rejected.
    pub fn parse(s: &str) -> Option<Period> {
        Period::ALL.iter().copied().find(|p| p.as_str() == s)
    }
}

/// Kind of edit a patch request performs relative to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOperation {
    /// Insert after the target
    Append,
    /// Insert before the target
    Prepend,
    /// Replace the target's content
    Replace,
}

impl PatchOperation {
    /// Value sent in the `Operation` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchOperation::Append => "append",
            PatchOperation::Prepend => "prepend",
            PatchOperation::Replace => "replace",
        }
    }

    /// Parse a wire name.
    pub fn parse(s: &str) -> Option<PatchOperation> {
        match s {
            "append" => Some(PatchOperation::Append),
            "prepend" => Some(PatchOperation::Prepend),
            "replace" => Some(PatchOperation::Replace),
            _ => None,
        }
    }
}

/// Kind of document location a patch request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetType {
    /// A heading path within the note
    Heading,
    /// A block reference
    Block,
    /// A frontmatter field
    Frontmatter,
}

impl TargetType {
    /// Value sent in the `Target-Type` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Heading => "heading",
            TargetType::Block => "block",
            TargetType::Frontmatter => "frontmatter",
        }
    }

    /// Parse a wire name.
    pub fn parse(s: &str) -> Option<TargetType> {
        match s {
            "heading" => Some(TargetType::Heading),
            "block" => Some(TargetType::Block),
            "frontmatter" => Some(TargetType::Frontmatter),
            _ => None,
        }
    }
}

/// A file's raw text plus the caller-local date it was read on.
#[derive(Debug, Clone)]
pub struct FileContents {
    /// Current date on the calling machine, ISO `YYYY-MM-DD`
    pub now: String,
    /// Raw text body of the file
    pub content: String,
}

/// Shape of a JSON error body returned by the REST API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "errorCode")]
    error_code: Option<i64>,
    message: Option<String>,
}

/// Translate a failed response body into the normalized store error.
///
/// Defaults to code -1 and a placeholder message when the body is empty,
/// not JSON, or missing fields.
fn store_error(body: &str) -> McpError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or(ErrorBody {
        error_code: None,
        message: None,
    });
    McpError::Store {
        code: parsed.error_code.unwrap_or(-1),
        message: parsed.message.unwrap_or_else(|| "<unknown>".to_string()),
    }
}

/// Percent-escape a patch target for the `Target` header.
///
/// `/` separators stay unescaped so path-like targets (nested headings,
/// block references) keep their structure.
fn escape_target(target: &str) -> String {
    target
        .split('/')
        .map(|part| urlencoding::encode(part).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Dataview DQL text for the recent-changes query.
///
/// Takes only already-validated unsigned integers so the interpolation
/// cannot become an injection surface.
fn recent_changes_query(limit: u64, days: u64) -> String {
    [
        "TABLE file.mtime".to_string(),
        format!("WHERE file.mtime >= date(today) - dur({days} days)"),
        "SORT file.mtime DESC".to_string(),
        format!("LIMIT {limit}"),
    ]
    .join("\n")
}

/// Client for the Obsidian Local REST API.
///
/// One instance is constructed at startup and shared by reference with
/// every tool handler; it holds only immutable configuration and a
/// connection-pooling HTTP handle, so concurrent invocations need no
/// locking.
pub struct ObsidianClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl ObsidianClient {
    /// Build a client from immutable configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| McpError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    /// The base address requests are issued against.
    pub fn base_url(&self) -> String {
        self.config.base_url()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url(), path)
    }

    /// Send a request with the bearer token attached and normalize failures.
    ///
    /// HTTP 4xx/5xx responses become [`McpError::Store`] with the code and
    /// message from the JSON error body; transport failures become
    /// `Store { code: -1 }` via the `From<reqwest::Error>` impl.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request.bearer_auth(&self.config.api_key).send().await?;
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(store_error(&body));
        }
        Ok(response)
    }

    /// List files in the vault root. Unwraps the `files` field.
    pub async fn list_files_in_vault(&self) -> Result<JsonValue> {
        debug!("GET /vault/");
        let response = self.execute(self.http.get(self.url("/vault/"))).await?;
        let body: JsonValue = response.json().await?;
        files_field(body)
    }

    /// List files in a vault directory. Unwraps the `files` field.
    pub async fn list_files_in_dir(&self, dirpath: &str) -> Result<JsonValue> {
        debug!(dirpath, "GET /vault/{{dir}}/");
        let url = self.url(&format!("/vault/{dirpath}/"));
        let response = self.execute(self.http.get(url)).await?;
        let body: JsonValue = response.json().await?;
        files_field(body)
    }

    /// Read a single file's raw text, paired with the caller-local date.
    pub async fn get_file_contents(&self, filepath: &str) -> Result<FileContents> {
        debug!(filepath, "GET /vault/{{path}}");
        let url = self.url(&format!("/vault/{filepath}"));
        let response = self.execute(self.http.get(url)).await?;
        let content = response.text().await?;
        Ok(FileContents {
            now: chrono::Local::now().date_naive().to_string(),
            content,
        })
    }

    /// Read several files sequentially, concatenated with per-file headers.
    ///
    /// A file that fails to read contributes an inline error block instead
    /// of aborting the batch; remaining files are still read, in input
    /// order.
    pub async fn get_batch_file_contents(&self, filepaths: &[String]) -> Result<String> {
        let mut sections = Vec::with_capacity(filepaths.len());
        for filepath in filepaths {
            match self.get_file_contents(filepath).await {
                Ok(file) => {
                    sections.push(format!("# {}\n\n{}\n\n---\n\n", filepath, file.content));
                }
                Err(err) => {
                    sections.push(format!("# {filepath}\n\nError reading file: {err}\n\n---\n\n"));
                }
            }
        }
        Ok(sections.concat())
    }

    /// Plain-text search across the vault. Returns the store's ranked
    /// match list unmodified; shaping happens in the gateway.
    pub async fn search(&self, query: &str, context_length: u64) -> Result<JsonValue> {
        debug!(query, context_length, "POST /search/simple/");
        let request = self
            .http
            .post(self.url("/search/simple/"))
            .query(&[("query", query.to_string()), ("contextLength", context_length.to_string())]);
        let response = self.execute(request).await?;
        Ok(response.json().await?)
    }

    /// Structured search with a JsonLogic query document.
    ///
    /// The query is forwarded verbatim; the store evaluates it.
    pub async fn search_json(&self, query: &JsonValue) -> Result<JsonValue> {
        debug!("POST /search/ (jsonlogic)");
        let request = self
            .http
            .post(self.url("/search/"))
            .header(CONTENT_TYPE, "application/vnd.olrapi.jsonlogic+json")
            .body(query.to_string());
        let response = self.execute(request).await?;
        Ok(response.json().await?)
    }

    /// Append raw markdown to a file, creating it if absent.
    pub async fn append_content(&self, filepath: &str, content: &str) -> Result<()> {
        debug!(filepath, "POST /vault/{{path}}");
        let request = self
            .http
            .post(self.url(&format!("/vault/{filepath}")))
            .header(CONTENT_TYPE, "text/markdown")
            .body(content.to_string());
        self.execute(request).await?;
        Ok(())
    }

    /// Patch a file relative to a heading, block reference, or frontmatter
    /// field. Fails with a store error if the target cannot be located.
    pub async fn patch_content(
        &self,
        filepath: &str,
        operation: PatchOperation,
        target_type: TargetType,
        target: &str,
        content: &str,
    ) -> Result<()> {
        debug!(filepath, operation = operation.as_str(), "PATCH /vault/{{path}}");
        let request = self
            .http
            .patch(self.url(&format!("/vault/{filepath}")))
            .header(CONTENT_TYPE, "text/markdown")
            .header("Operation", operation.as_str())
            .header("Target-Type", target_type.as_str())
            .header("Target", escape_target(target))
            .body(content.to_string());
        self.execute(request).await?;
        Ok(())
    }

    /// Delete a file or directory. Returns the raw HTTP status code.
    pub async fn delete_file(&self, filepath: &str) -> Result<u16> {
        debug!(filepath, "DELETE /vault/{{path}}");
        let url = self.url(&format!("/vault/{filepath}"));
        let response = self.execute(self.http.delete(url)).await?;
        Ok(response.status().as_u16())
    }

    /// Current periodic note for a period, as raw text.
    pub async fn get_periodic_note(&self, period: Period) -> Result<String> {
        debug!(period = period.as_str(), "GET /periodic/{{period}}/");
        let url = self.url(&format!("/periodic/{}/", period.as_str()));
        let response = self.execute(self.http.get(url)).await?;
        Ok(response.text().await?)
    }

    /// Most recent periodic notes for a period.
    pub async fn get_recent_periodic_notes(
        &self,
        period: Period,
        limit: u64,
        include_content: bool,
    ) -> Result<JsonValue> {
        debug!(period = period.as_str(), limit, include_content, "GET /periodic/{{period}}/recent");
        let url = self.url(&format!("/periodic/{}/recent", period.as_str()));
        let request = self.http.get(url).query(&[
            ("limit", limit.to_string()),
            ("includeContent", include_content.to_string()),
        ]);
        let response = self.execute(request).await?;
        Ok(response.json().await?)
    }

    /// Files modified within the last `days` days, newest first, capped at
    /// `limit` entries.
    pub async fn get_recent_changes(&self, limit: u64, days: u64) -> Result<JsonValue> {
        debug!(limit, days, "POST /search/ (dataview)");
        let request = self
            .http
            .post(self.url("/search/"))
            .header(CONTENT_TYPE, "application/vnd.olrapi.dataview.dql+txt")
            .body(recent_changes_query(limit, days));
        let response = self.execute(request).await?;
        Ok(response.json().await?)
    }
}

/// Unwrap the `files` field from a listing response body.
fn files_field(body: JsonValue) -> Result<JsonValue> {
    match body {
        JsonValue::Object(mut map) => map.remove("files").ok_or_else(|| McpError::Store {
            code: -1,
            message: "listing response missing 'files' field".to_string(),
        }),
        _ => Err(McpError::Store {
            code: -1,
            message: "listing response was not a JSON object".to_string(),
        }),
    }
}
