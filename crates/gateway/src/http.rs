//! HttpGateway - PostgREST access over reqwest

use crate::table_gateway::{ensure_filtered, Page, TableGateway};
use async_trait::async_trait;
use query::{range_header, ContentRange, QueryParams};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use shared::{MutationOutcome, RestConfig, RestError, Result, Row, StatusError};
use std::time::Duration;
use tracing::{debug, warn};

const PREFER_COUNT: &str = "count=exact";
const PREFER_REPRESENTATION: &str = "return=representation";

const READ_OK: &[u16] = &[200, 206];
const INSERT_OK: &[u16] = &[200, 201];
const MUTATION_OK: &[u16] = &[200, 204];

/// Gateway to a live PostgREST endpoint
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    config: RestConfig,
}

impl HttpGateway {
    /// Create a gateway; the config is validated first
    pub fn new(config: RestConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .default_headers(default_headers(&config)?)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RestError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    fn request(&self, method: Method, table: &str, params: &QueryParams) -> RequestBuilder {
        let url = self.config.table_url(table);
        let pairs = params.to_pairs();
        debug!(%method, %url, query = ?pairs, "request");
        self.client.request(method, url).query(&pairs)
    }

    /// Send and check the status against `accepted`.
    ///
    /// Anything else is logged with the response body and returned as a
    /// [`StatusError`].
    async fn send(
        &self,
        method: &str,
        table: &str,
        builder: RequestBuilder,
        accepted: &[u16],
    ) -> Result<Response> {
        let response = builder.send().await.map_err(|e| {
            warn!(method, table, error = %e, "connection failed");
            RestError::Transport(format!("{} {}: {}", method, table, e))
        })?;

        let status = response.status();
        if accepted.contains(&status.as_u16()) {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(method, table, status = status.as_u16(), body = %body, "unexpected status");
        Err(StatusError {
            method: method.to_string(),
            table: table.to_string(),
            status: status.as_u16(),
            body,
        }
        .into())
    }

    async fn read_body(response: Response) -> Result<String> {
        response
            .text()
            .await
            .map_err(|e| RestError::Transport(format!("Failed to read response body: {}", e)))
    }
}

fn default_headers(config: &RestConfig) -> Result<HeaderMap> {
    let invalid = |what: &str| RestError::Config(format!("{} contains characters not allowed in a header", what));

    let mut key = HeaderValue::from_str(&config.api_key).map_err(|_| invalid("API key"))?;
    key.set_sensitive(true);
    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key)).map_err(|_| invalid("API key"))?;
    bearer.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(HeaderName::from_static("apikey"), key);
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Some(schema) = &config.schema {
        let profile = HeaderValue::from_str(schema).map_err(|_| invalid("schema"))?;
        headers.insert(HeaderName::from_static("accept-profile"), profile.clone());
        headers.insert(HeaderName::from_static("content-profile"), profile);
    }

    Ok(headers)
}

/// Decode a read body; it must be a JSON array of objects
fn decode_rows(body: &str) -> Result<Vec<Row>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<Value>(body)? {
        value @ Value::Array(_) => shared::rows_from_value(value),
        other => Err(RestError::Decode(format!("expected a JSON array, got {}", other))),
    }
}

/// Decode a mutation body; empty means "applied, no representation"
fn decode_outcome(body: &str) -> Result<MutationOutcome> {
    if body.trim().is_empty() {
        return Ok(MutationOutcome::Applied);
    }
    let value: Value = serde_json::from_str(body)?;
    Ok(MutationOutcome::Rows(shared::rows_from_value(value)?))
}

fn content_range(response: &Response) -> Result<Option<ContentRange>> {
    response
        .headers()
        .get("content-range")
        .map(|v| {
            v.to_str()
                .map_err(|_| RestError::ContentRange("<non-ascii>".to_string()))
                .and_then(ContentRange::parse)
        })
        .transpose()
}

#[async_trait]
impl TableGateway for HttpGateway {
    async fn execute(&self, table: &str, params: &QueryParams) -> Result<Vec<Row>> {
        let builder = self.request(Method::GET, table, params).header("Prefer", PREFER_COUNT);
        let response = self.send("GET", table, builder, READ_OK).await?;
        decode_rows(&Self::read_body(response).await?)
    }

    async fn fetch_page(
        &self,
        table: &str,
        params: &QueryParams,
        offset: usize,
        limit: usize,
    ) -> Result<Page> {
        let range = range_header(offset, limit)?;
        let builder = self
            .request(Method::GET, table, &params.without_paging())
            .header("Prefer", PREFER_COUNT)
            .header("Range-Unit", "items")
            .header("Range", range);

        // Past the last row the server answers 416; that is an empty page.
        let mut accepted = READ_OK.to_vec();
        accepted.push(StatusCode::RANGE_NOT_SATISFIABLE.as_u16());

        let response = self.send("GET", table, builder, &accepted).await?;
        if response.status() == StatusCode::RANGE_NOT_SATISFIABLE {
            return Ok(Page::empty());
        }

        let content_range = content_range(&response)?;
        let rows = decode_rows(&Self::read_body(response).await?)?;
        Ok(Page { rows, content_range })
    }

    async fn count(&self, table: &str, params: &QueryParams) -> Result<u64> {
        let builder = self
            .request(Method::HEAD, table, &params.filters_only())
            .header("Prefer", PREFER_COUNT);
        let response = self.send("HEAD", table, builder, READ_OK).await?;

        content_range(&response)?
            .ok_or_else(|| RestError::ContentRange("<missing>".to_string()))?
            .total
            .ok_or_else(|| RestError::ContentRange("total not reported".to_string()))
    }

    async fn insert(&self, table: &str, rows: &[Row]) -> Result<Vec<Row>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let builder = self
            .request(Method::POST, table, &QueryParams::new())
            .header("Prefer", PREFER_REPRESENTATION)
            .json(rows);
        let response = self.send("POST", table, builder, INSERT_OK).await?;
        let outcome = decode_outcome(&Self::read_body(response).await?)?;
        Ok(outcome.into_rows())
    }

    async fn update(&self, table: &str, patch: &Row, filters: &QueryParams) -> Result<MutationOutcome> {
        ensure_filtered("PATCH", table, filters)?;

        let builder = self
            .request(Method::PATCH, table, &filters.filters_only())
            .header("Prefer", PREFER_REPRESENTATION)
            .json(patch);
        let response = self.send("PATCH", table, builder, MUTATION_OK).await?;
        decode_outcome(&Self::read_body(response).await?)
    }

    async fn delete(&self, table: &str, filters: &QueryParams) -> Result<MutationOutcome> {
        ensure_filtered("DELETE", table, filters)?;

        let builder = self
            .request(Method::DELETE, table, &filters.filters_only())
            .header("Prefer", PREFER_REPRESENTATION);
        let response = self.send("DELETE", table, builder, MUTATION_OK).await?;
        decode_outcome(&Self::read_body(response).await?)
    }
}
