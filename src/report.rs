use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SIMULATED_LABEL: &str = "simulated result (server error)";

/// Where a rendered report came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSource {
    Primary,
    Legacy,
    Offline,
    Simulated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub final_summary: String,
    pub proof_hash: Option<String>,
    pub blockchain_tx: Option<BlockchainTx>,
    pub opinions: Vec<Opinion>,
    pub entities: Vec<Entity>,
    pub relations: Vec<Relation>,
    pub results: Vec<EvidenceResult>,
    pub session_id: Option<String>,
    pub source: ReportSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BlockchainTx {
    Recorded {
        tx_hash: String,
        chain_id: Option<String>,
    },
    /// Placeholder hash issued when the backend has no live chain connection.
    Stub { tx_hash: String },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opinion {
    pub file: String,
    pub opinion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub source: String,
    pub relation: String,
    pub target: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceKind {
    Image,
    Video,
    Document,
    Other,
}

impl EvidenceKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "image" => EvidenceKind::Image,
            "video" => EvidenceKind::Video,
            "document" => EvidenceKind::Document,
            _ => EvidenceKind::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EvidenceKind::Image => "image",
            EvidenceKind::Video => "video",
            EvidenceKind::Document => "document",
            EvidenceKind::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceResult {
    pub file: String,
    pub findings: Findings,
    /// Set on cards synthesized locally because no endpoint answered.
    pub simulated: bool,
}

impl EvidenceResult {
    pub fn kind(&self) -> EvidenceKind {
        match self.findings {
            Findings::Image(_) => EvidenceKind::Image,
            Findings::Video(_) => EvidenceKind::Video,
            Findings::Document(_) => EvidenceKind::Document,
            Findings::Other { .. } => EvidenceKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Findings {
    Image(ImageFindings),
    Video(VideoFindings),
    Document(DocumentFindings),
    Other { raw_type: String, payload: Value },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFindings {
    pub tamper_percentage: f64,
    pub explanation: String,
    pub verdict: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoFindings {
    pub fake_ratio_percent: f64,
    pub max_fake_score: f64,
    pub frames_analyzed: Option<u64>,
    pub duration_sec: Option<f64>,
    pub resolution: Option<String>,
    pub verdict: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFindings {
    pub danger_score: f64,
    pub flag_count: usize,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAnswer {
    pub answer: String,
    pub sources: Vec<String>,
}
