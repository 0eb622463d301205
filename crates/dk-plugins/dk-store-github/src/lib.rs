//! # dk-store-github
//!
//! `DocumentStore` backed by a GitHub repository through the REST contents
//! API. Every save is a commit; the blob SHA returned on read is the revision
//! token, and GitHub refuses an update whose SHA is no longer current.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use dk_core::{AppError, Document, DocumentStore, Result, Revision, Snapshot};
use log::{debug, warn};
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Where the documents live and how to authenticate.
#[derive(Debug, Clone)]
pub struct GitHubSettings {
    pub token: SecretString,
    /// "owner/name"
    pub repo: String,
    pub branch: String,
    /// API root, e.g. `https://api.github.com` or a GitHub Enterprise URL.
    pub api_url: String,
}

pub struct GitHubDocumentStore {
    client: Client,
    settings: GitHubSettings,
}

/// Subset of the contents API file response.
#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutContents<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

impl GitHubDocumentStore {
    pub fn new(settings: GitHubSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(concat!("docket/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Persistence(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            settings: GitHubSettings {
                api_url: settings.api_url.trim_end_matches('/').to_string(),
                ..settings
            },
        })
    }

    fn contents_url(&self, doc: Document) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.settings.api_url,
            self.settings.repo,
            doc.path()
        )
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.bearer_auth(self.settings.token.expose_secret())
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }
}

/// Decodes the base64 payload GitHub wraps at 60 columns.
fn decode_content(encoded: &str) -> Result<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| AppError::Persistence(format!("invalid base64 from GitHub: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| AppError::Persistence(format!("document is not UTF-8: {e}")))
}

fn request_failed(e: reqwest::Error) -> AppError {
    AppError::Persistence(format!("GitHub request failed: {e}"))
}

async fn failure_body(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read response body".to_string())
}

#[async_trait]
impl DocumentStore for GitHubDocumentStore {
    async fn load(&self, doc: Document) -> Result<Option<Snapshot>> {
        let response = self
            .authorized(self.client.get(self.contents_url(doc)))
            .query(&[("ref", self.settings.branch.as_str())])
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("{} not found in {}", doc, self.settings.repo);
            return Ok(None);
        }
        if !status.is_success() {
            let body = failure_body(response).await;
            return Err(AppError::Persistence(format!(
                "GitHub read of {doc} failed: status={status}, body={body}"
            )));
        }

        let file: ContentsResponse = response.json().await.map_err(request_failed)?;
        let revision = Some(Revision(file.sha));

        let encoded = match (file.encoding.as_deref(), file.content) {
            (Some("base64") | None, Some(content)) => content,
            (encoding, _) => {
                return Err(AppError::Persistence(format!(
                    "{doc} is not inline in the contents API (encoding {encoding:?}); file too large"
                )));
            }
        };

        let text = decode_content(&encoded)?;
        // Keep the revision so the next save replaces the broken file.
        let value = serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!("{} in {} is not valid JSON: {}", doc, self.settings.repo, e);
            Value::Null
        });
        Ok(Some(Snapshot { value, revision }))
    }

    async fn save(
        &self,
        doc: Document,
        value: &Value,
        revision: Option<Revision>,
        message: &str,
    ) -> Result<()> {
        let mut body = serde_json::to_string_pretty(value)?;
        body.push('\n');

        let payload = PutContents {
            message,
            content: base64::engine::general_purpose::STANDARD.encode(body.as_bytes()),
            branch: &self.settings.branch,
            sha: revision.as_ref().map(Revision::as_str),
        };

        let response = self
            .authorized(self.client.put(self.contents_url(doc)))
            .json(&payload)
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = failure_body(response).await;
        // 409: sha no longer matches; 422: sha missing for an existing file
        if status == StatusCode::CONFLICT || status == StatusCode::UNPROCESSABLE_ENTITY {
            Err(AppError::Conflict(format!(
                "{doc} changed on GitHub since it was read: {body}"
            )))
        } else {
            Err(AppError::Persistence(format!(
                "GitHub write of {doc} failed: status={status}, body={body}"
            )))
        }
    }

    fn backend_name(&self) -> &'static str {
        "github"
    }
}
