use super::{Transport, TransportError, UploadForm};
use crate::config::Config;
use anyhow::{Context, Result};
use reqwest::blocking::{
    multipart::{Form, Part},
    Client, Response,
};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub struct HttpTransport {
    cfg: Config,
    upload_client: Client,
    query_client: Client,
}

impl HttpTransport {
    pub fn new(cfg: &Config) -> Result<Self> {
        let upload_client = Client::builder()
            .timeout(timeout(cfg.server.timeout_seconds))
            .build()
            .with_context(|| "building upload HTTP client")?;
        let query_client = Client::builder()
            .timeout(timeout(cfg.server.query_timeout_seconds))
            .build()
            .with_context(|| "building query HTTP client")?;
        Ok(Self {
            cfg: cfg.clone(),
            upload_client,
            query_client,
        })
    }

    /// GET on the server root; any HTTP answer means the backend is reachable.
    pub fn ping(&self) -> Result<u16, TransportError> {
        let url = self.cfg.endpoint("/");
        let resp = self
            .query_client
            .get(&url)
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(resp.status().as_u16())
    }

    fn build_form(&self, form: &UploadForm) -> Result<Form, TransportError> {
        let mut multipart = Form::new();
        for file in &form.files {
            let bytes = std::fs::read(&file.path).map_err(|e| {
                TransportError::Input(format!("reading {}: {e}", file.path.display()))
            })?;
            let part = Part::bytes(bytes)
                .file_name(file.name.clone())
                .mime_str(&file.mime_type)
                .map_err(|e| TransportError::Input(format!("{}: {e}", file.name)))?;
            multipart = multipart.part(form.file_field.clone(), part);
        }
        Ok(multipart.text(form.instructions_field.clone(), form.instructions.clone()))
    }
}

fn timeout(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn read_json(resp: Response) -> Result<Value, TransportError> {
    let status = resp.status();
    let text = resp
        .text()
        .map_err(|e| TransportError::Network(e.to_string()))?;
    if !status.is_success() {
        return Err(TransportError::Status {
            code: status.as_u16(),
            body: serde_json::from_str(&text).ok(),
        });
    }
    serde_json::from_str(&text).map_err(|e| TransportError::Shape(e.to_string()))
}

impl Transport for HttpTransport {
    fn post_form(&self, path: &str, form: &UploadForm) -> Result<Value, TransportError> {
        let url = self.cfg.endpoint(path);
        debug!(
            "POST {url} files={} instructions_len={}",
            form.files.len(),
            form.instructions.len()
        );
        let body = self.build_form(form)?;
        let resp = self
            .upload_client
            .post(&url)
            .multipart(body)
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        read_json(resp)
    }

    fn post_json(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        let url = self.cfg.endpoint(path);
        debug!("POST {url}");
        let resp = self
            .query_client
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        read_json(resp)
    }
}
