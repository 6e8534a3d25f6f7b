//! Wire types of the remote file-content API.
//!
//! The shapes follow the GitHub repository contents endpoint
//! (`/repos/{owner}/{repo}/contents/{path}`); only the fields the ledger
//! client reads or writes are modelled.

use serde::{Deserialize, Serialize};

pub mod contents {
    use super::*;

    /// Response of `GET .../contents/{path}` for a file.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ContentFile {
        pub path: String,
        /// Blob hash, used as the version token for conditional writes.
        pub sha: String,
        #[serde(default)]
        pub size: u64,
        /// `base64`, or `none` when the file is too large to be inlined.
        #[serde(default)]
        pub encoding: Option<String>,
        /// Base64 payload, wrapped with line breaks every 60 characters.
        #[serde(default)]
        pub content: Option<String>,
    }

    /// Body of `PUT .../contents/{path}`.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct PutContent {
        /// Commit message.
        pub message: String,
        /// Base64 of the full new file content.
        pub content: String,
        /// Blob hash the new content replaces; omitted to create the file.
        #[serde(skip_serializing_if = "Option::is_none")]
        pub sha: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub branch: Option<String>,
    }

    /// Response of a successful `PUT`.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct PutContentResponse {
        pub content: ContentRef,
        #[serde(default)]
        pub commit: Option<CommitRef>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ContentRef {
        pub path: String,
        pub sha: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct CommitRef {
        pub sha: String,
        #[serde(default)]
        pub message: Option<String>,
    }
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default)]
    pub documentation_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::contents::*;
    use super::*;

    #[test]
    fn put_omits_missing_sha_and_branch() {
        let body = PutContent {
            message: "spending: $1.00 OTHER".to_string(),
            content: "aGk=".to_string(),
            sha: None,
            branch: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "message": "spending: $1.00 OTHER", "content": "aGk=" })
        );
    }

    #[test]
    fn file_response_ignores_unknown_fields() {
        let raw = r#"{
            "type": "file",
            "name": "spending_log.csv",
            "path": "spending_log.csv",
            "sha": "3d21ec53a331a6f037a91c368710b99387d012c1",
            "size": 31,
            "encoding": "base64",
            "content": "dGltZXN0YW1wLGFtb3VudCxjYXRlZ29y\neSxub3RlCg==\n",
            "_links": {}
        }"#;
        let file: ContentFile = serde_json::from_str(raw).unwrap();
        assert_eq!(file.sha, "3d21ec53a331a6f037a91c368710b99387d012c1");
        assert_eq!(file.encoding.as_deref(), Some("base64"));
    }

    #[test]
    fn error_body_without_docs_url() {
        let err: ErrorBody = serde_json::from_str(r#"{"message":"Not Found"}"#).unwrap();
        assert_eq!(err.message, "Not Found");
        assert!(err.documentation_url.is_none());
    }
}
