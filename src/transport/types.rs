use crate::staging::StagedFile;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Multipart body shared by the primary and legacy upload endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadForm {
    pub file_field: String,
    pub instructions_field: String,
    pub files: Vec<StagedFile>,
    pub instructions: String,
}

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP status {code}")]
    Status { code: u16, body: Option<Value> },
    #[error("malformed response: {0}")]
    Shape(String),
    #[error("cannot build request: {0}")]
    Input(String),
}

impl TransportError {
    /// The `error` (or `message`) string a failing backend put in its JSON body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            TransportError::Status { body: Some(body), .. } => body
                .get("error")
                .or_else(|| body.get("message"))
                .and_then(Value::as_str),
            _ => None,
        }
    }
}
