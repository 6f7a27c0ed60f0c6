use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub upload: Upload,
    #[serde(default)]
    pub progress: Progress,
    #[serde(default)]
    pub render: Render,
    #[serde(default)]
    pub query: Query,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub security: Security,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }

    /// Joins `server.base_url` with an endpoint path, tolerating stray slashes.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.server.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub base_url: String,
    pub primary_path: String,
    pub legacy_path: String,
    pub query_path: String,
    pub timeout_seconds: u64,
    pub query_timeout_seconds: u64,
}
impl Default for Server {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".into(),
            primary_path: "/verify_with_instructions".into(),
            legacy_path: "/verify".into(),
            query_path: "/rag_query".into(),
            timeout_seconds: 300,
            query_timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Upload {
    pub file_field: String,
    pub instructions_field: String,
    pub default_instructions: String,
}
impl Default for Upload {
    fn default() -> Self {
        Self {
            file_field: "files".into(),
            instructions_field: "instructions".into(),
            default_instructions: "".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    pub enabled: bool,
    pub start_percent: u8,
    pub tick_ms: u64,
    pub min_step: u8,
    pub max_step: u8,
    pub cap_percent: u8,
    pub ceiling_ms: u64,
    pub settle_ms: u64,
}
impl Default for Progress {
    fn default() -> Self {
        Self {
            enabled: true,
            start_percent: 5,
            tick_ms: 120,
            min_step: 3,
            max_step: 8,
            cap_percent: 95,
            ceiling_ms: 8000,
            settle_ms: 400,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Render {
    pub dump_max_chars: usize,
    pub page_title: String,
}
impl Default for Render {
    fn default() -> Self {
        Self {
            dump_max_chars: 600,
            page_title: "ForenSIGHT Report".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Query {
    pub flag_clear_ms: u64,
}
impl Default for Query {
    fn default() -> Self {
        Self {
            flag_clear_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub out_dir: String,
    pub write_html: bool,
    pub html_filename: String,
    pub write_report_json: bool,
    pub report_filename: String,
    pub write_raw_json: bool,
    pub raw_filename: String,
    pub write_index_json: bool,
    pub print_summary: bool,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            out_dir: "out".into(),
            write_html: true,
            html_filename: "report.html".into(),
            write_report_json: true,
            report_filename: "report.json".into(),
            write_raw_json: true,
            raw_filename: "raw.json".into(),
            write_index_json: true,
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_upload_bytes: u64,
    pub warn_on_unknown_extension: bool,
}
impl Default for Limits {
    fn default() -> Self {
        Self {
            max_upload_bytes: 200 * 1024 * 1024,
            warn_on_unknown_extension: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Security {
    pub reject_url_inputs: bool,
}
impl Default for Security {
    fn default() -> Self {
        Self {
            reject_url_inputs: true,
        }
    }
}
