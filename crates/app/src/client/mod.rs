//! HTTP client for the GitHub repository contents API.
//!
//! Implements [`BlobStore`] so the engine can read and conditionally write
//! the ledger file. File content travels as base64 of its UTF-8 bytes.

use std::time::Duration;

use api_types::{
    ErrorBody,
    contents::{ContentFile, PutContent, PutContentResponse},
};
use base64::{Engine, prelude::BASE64_STANDARD};
use engine::{BlobError, BlobStore, EngineError, RemoteFile, VersionToken};
use reqwest::{StatusCode, Url, header};

use crate::{config::AppConfig, error::Result};

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
    owner: String,
    repo: String,
    branch: Option<String>,
}

impl Client {
    pub fn new(config: &AppConfig, token: &str) -> Result<Self> {
        let base_url = Url::parse(&config.api_url)
            .map_err(|err| EngineError::InvalidConfig(format!("invalid api_url: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(EngineError::InvalidConfig(format!(
                "invalid api_url: {}",
                config.api_url
            ))
            .into());
        }

        let mut auth = header::HeaderValue::try_from(format!("Bearer {}", token.trim()))
            .map_err(|err| EngineError::InvalidConfig(format!("invalid token: {err}")))?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            header::HeaderValue::from_static("2022-11-28"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("spendlog/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            http,
            owner: config.owner.trim().to_string(),
            repo: config.repo.trim().to_string(),
            branch: config.branch.clone().filter(|branch| !branch.trim().is_empty()),
        })
    }

    /// `{api_url}/repos/{owner}/{repo}/contents/{path}`, each segment encoded.
    fn contents_url(&self, path: &str) -> std::result::Result<Url, BlobError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| BlobError::Remote("api_url cannot be a base".to_string()))?;
            segments
                .pop_if_empty()
                .extend(["repos", self.owner.as_str(), self.repo.as_str(), "contents"])
                .extend(path.split('/').filter(|segment| !segment.is_empty()));
        }
        Ok(url)
    }
}

impl BlobStore for Client {
    async fn read(&self, path: &str) -> std::result::Result<Option<RemoteFile>, BlobError> {
        let mut url = self.contents_url(path)?;
        if let Some(branch) = &self.branch {
            url.query_pairs_mut().append_pair("ref", branch);
        }

        tracing::debug!("GET {url}");
        let res = self.http.get(url).send().await.map_err(transport)?;
        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(error_from_response(res, false).await);
        }

        let file = res.json::<ContentFile>().await.map_err(transport)?;
        let content = decode_file(&file)?;
        Ok(Some(RemoteFile {
            path: file.path,
            content,
            version: VersionToken::new(file.sha),
        }))
    }

    async fn write(
        &self,
        path: &str,
        content: &str,
        message: &str,
        expected: Option<&VersionToken>,
    ) -> std::result::Result<VersionToken, BlobError> {
        let url = self.contents_url(path)?;
        let body = PutContent {
            message: message.to_string(),
            content: encode_content(content),
            sha: expected.map(|version| version.as_str().to_string()),
            branch: self.branch.clone(),
        };

        tracing::debug!("PUT {url}");
        let res = self
            .http
            .put(url)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        if !res.status().is_success() {
            return Err(error_from_response(res, true).await);
        }

        let created = res.json::<PutContentResponse>().await.map_err(transport)?;
        Ok(VersionToken::new(created.content.sha))
    }
}

fn transport(err: reqwest::Error) -> BlobError {
    if err.is_timeout() {
        BlobError::Remote("request timed out".to_string())
    } else {
        BlobError::Remote(format!("transport failure: {err}"))
    }
}

async fn error_from_response(res: reqwest::Response, on_write: bool) -> BlobError {
    let status = res.status();
    let message = res.json::<ErrorBody>().await.ok().map(|body| body.message);
    classify_failure(status, message, on_write)
}

/// Maps a non-success status to a blob error.
///
/// A rejected `sha` on write comes back as 409 or 422.
fn classify_failure(status: StatusCode, message: Option<String>, on_write: bool) -> BlobError {
    let message = message
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("remote returned {status}"));
    match status {
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY if on_write => {
            BlobError::Conflict(message)
        }
        _ => BlobError::Remote(message),
    }
}

fn decode_file(file: &ContentFile) -> std::result::Result<String, BlobError> {
    match (file.encoding.as_deref(), file.content.as_deref()) {
        (Some("none"), _) => Err(BlobError::Remote(format!(
            "{} is too large for the contents API ({} bytes)",
            file.path, file.size
        ))),
        (_, Some(raw)) => decode_content(raw),
        (_, None) if file.size == 0 => Ok(String::new()),
        (_, None) => Err(BlobError::Remote(format!("{} has no content", file.path))),
    }
}

/// Base64 of the UTF-8 bytes of `content`.
fn encode_content(content: &str) -> String {
    BASE64_STANDARD.encode(content.as_bytes())
}

/// Decodes base64 (line-wrapped or not) into UTF-8 text.
fn decode_content(raw: &str) -> std::result::Result<String, BlobError> {
    let compact: String = raw.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = BASE64_STANDARD
        .decode(compact)
        .map_err(|err| BlobError::Remote(format!("invalid base64 content: {err}")))?;
    String::from_utf8(bytes)
        .map_err(|err| BlobError::Remote(format!("ledger is not valid UTF-8: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            owner: "someone".to_string(),
            repo: "spending".to_string(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn contents_url_encodes_segments() {
        let client = Client::new(&config(), "token").unwrap();
        let url = client.contents_url("logs/my spending.csv").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/someone/spending/contents/logs/my%20spending.csv"
        );
    }

    #[test]
    fn contents_url_keeps_base_path() {
        let config = AppConfig {
            api_url: "https://ghe.example.com/api/v3/".to_string(),
            ..config()
        };
        let client = Client::new(&config, "token").unwrap();
        let url = client.contents_url("spending_log.csv").unwrap();
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/repos/someone/spending/contents/spending_log.csv"
        );
    }

    #[test]
    fn rejects_unusable_api_url() {
        let config = AppConfig {
            api_url: "mailto:someone@example.com".to_string(),
            ..config()
        };
        assert!(Client::new(&config, "token").is_err());
    }

    #[test]
    fn content_round_trips_multibyte_utf8() {
        let text = "timestamp,amount,category,note\n2026-10-17T09:00:00+09:00,4.50,RESTAURANTS,\"抹茶, 団子\"\n";
        assert_eq!(decode_content(&encode_content(text)).unwrap(), text);
    }

    #[test]
    fn decode_accepts_wrapped_base64() {
        let wrapped = "dGltZXN0YW1wLGFtb3VudCxjYXRlZ29y\neSxub3RlCg==\n";
        assert_eq!(decode_content(wrapped).unwrap(), "timestamp,amount,category,note\n");
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        let raw = BASE64_STANDARD.encode([0xffu8, 0xfe, 0x41]);
        assert!(matches!(decode_content(&raw), Err(BlobError::Remote(_))));
    }

    #[test]
    fn large_files_are_a_remote_error() {
        let file = ContentFile {
            path: "spending_log.csv".to_string(),
            sha: "abc".to_string(),
            size: 2_000_000,
            encoding: Some("none".to_string()),
            content: Some(String::new()),
        };
        assert!(matches!(decode_file(&file), Err(BlobError::Remote(_))));
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            classify_failure(
                StatusCode::CONFLICT,
                Some("is at 1234 but expected 5678".to_string()),
                true
            ),
            BlobError::Conflict("is at 1234 but expected 5678".to_string())
        );
        assert!(matches!(
            classify_failure(StatusCode::UNPROCESSABLE_ENTITY, None, true),
            BlobError::Conflict(_)
        ));
        assert_eq!(
            classify_failure(StatusCode::UNAUTHORIZED, Some("Bad credentials".to_string()), true),
            BlobError::Remote("Bad credentials".to_string())
        );
        assert_eq!(
            classify_failure(StatusCode::BAD_GATEWAY, None, false),
            BlobError::Remote("remote returned 502 Bad Gateway".to_string())
        );
        assert!(matches!(
            classify_failure(StatusCode::CONFLICT, None, false),
            BlobError::Remote(_)
        ));
    }
}
