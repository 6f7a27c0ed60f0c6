//! Strict decode of backend verification responses.
//!
//! The backend has emitted several report shapes over time (camelCase and
//! snake_case keys, a `metaReport` envelope, the single-file `/verify` shape).
//! Every fallback rule is applied here, once, so the rest of the crate only
//! sees [`AnalysisReport`].

use crate::report::{
    AnalysisReport, BlockchainTx, DocumentFindings, Entity, EvidenceKind, EvidenceResult,
    Findings, ImageFindings, Opinion, Relation, ReportSource, VideoFindings,
};
use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::LazyLock;
use tracing::debug;

pub const SUMMARY_FALLBACK: &str = "No summary available.";
const VERDICT_FALLBACK: &str = "Unknown";
const EXPLANATION_FALLBACK: &str = "No explanation provided.";
const DOCUMENT_SUMMARY_FALLBACK: &str = "No summary provided.";

const ENVELOPE_KEYS: &[&str] = &["metaReport", "meta_report", "report"];
const SUMMARY_KEYS: &[&str] = &[
    "finalSummary",
    "final_summary",
    "overallSummary",
    "overall_summary",
];

static TX_HASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0x)?[0-9a-fA-F]{64}$").expect("static regex"));

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("report is not a JSON object")]
    NotAnObject,
    #[error("server reported an error: {0}")]
    ServerError(String),
    #[error("unrecognised report shape (keys: {0})")]
    Unrecognized(String),
}

pub fn normalize(raw: &Value, source: ReportSource) -> Result<AnalysisReport, ShapeError> {
    let report = unwrap_envelope(raw)?;

    let has_results = report.get("results").is_some_and(Value::is_array);
    let is_legacy_single =
        !has_results && (report.contains_key("verdict") || report.contains_key("details"));
    let recognised = has_results
        || is_legacy_single
        || report.contains_key("opinions")
        || SUMMARY_KEYS.iter().any(|k| report.contains_key(*k));
    if !recognised {
        let keys = report.keys().cloned().collect::<Vec<_>>().join(",");
        return Err(ShapeError::Unrecognized(keys));
    }

    let raw_items: Vec<Value> = if is_legacy_single {
        vec![legacy_item(report)]
    } else {
        report
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    };

    let results: Vec<EvidenceResult> = raw_items.iter().map(decode_result).collect();

    let opinions = match report.get("opinions").and_then(Value::as_array) {
        Some(list) => list.iter().filter_map(decode_opinion).collect(),
        None => raw_items.iter().map(synthesize_opinion).collect(),
    };

    let final_summary = first_str(report, SUMMARY_KEYS)
        .or_else(|| {
            if is_legacy_single {
                first_str(report, &["verdict"])
            } else {
                None
            }
        })
        .unwrap_or_else(|| SUMMARY_FALLBACK.to_string());

    let out = AnalysisReport {
        final_summary,
        proof_hash: first_str(report, &["proofHash", "proof_hash"]),
        blockchain_tx: first_value(report, &["blockchainTx", "blockchain_tx"])
            .and_then(decode_blockchain_tx),
        opinions,
        entities: list(report, "entities")
            .iter()
            .filter_map(decode_entity)
            .collect(),
        relations: list(report, "relations")
            .iter()
            .filter_map(decode_relation)
            .collect(),
        results,
        session_id: first_str(report, &["session_id", "sessionId"]),
        source,
    };
    debug!(
        "normalized report source={:?} results={} opinions={} entities={} relations={}",
        out.source,
        out.results.len(),
        out.opinions.len(),
        out.entities.len(),
        out.relations.len()
    );
    Ok(out)
}

/// Strips one level of `metaReport` / `meta_report` / `report` wrapping.
pub fn unwrap_envelope(raw: &Value) -> Result<&Map<String, Value>, ShapeError> {
    let obj = raw.as_object().ok_or(ShapeError::NotAnObject)?;

    if obj.get("status").and_then(Value::as_str) == Some("error") {
        let msg = first_str(obj, &["message", "error"]).unwrap_or_else(|| "unknown error".into());
        return Err(ShapeError::ServerError(msg));
    }

    match first_value(obj, ENVELOPE_KEYS) {
        Some(inner) => inner.as_object().ok_or(ShapeError::NotAnObject),
        None => Ok(obj),
    }
}

fn decode_result(item: &Value) -> EvidenceResult {
    let file = item
        .get("file")
        .and_then(Value::as_str)
        .unwrap_or("unknown file")
        .to_string();
    let raw_type = item.get("type").and_then(Value::as_str).unwrap_or("");
    let report = item.get("report");

    let findings = match (report, item.get("error")) {
        (None, Some(_)) => Findings::Other {
            raw_type: if raw_type.is_empty() { "error".into() } else { raw_type.into() },
            payload: item.clone(),
        },
        (report, _) => {
            let empty = Value::Object(Map::new());
            let report = report.unwrap_or(&empty);
            match EvidenceKind::parse(raw_type) {
                EvidenceKind::Image => Findings::Image(decode_image(report)),
                EvidenceKind::Video => Findings::Video(decode_video(report)),
                EvidenceKind::Document => Findings::Document(decode_document(report)),
                EvidenceKind::Other => Findings::Other {
                    raw_type: raw_type.to_string(),
                    payload: report.clone(),
                },
            }
        }
    };

    EvidenceResult {
        file,
        findings,
        simulated: false,
    }
}

fn decode_image(report: &Value) -> ImageFindings {
    ImageFindings {
        tamper_percentage: first_num(
            report,
            &["tamperingPercentage", "tampering_percentage", "tamper_percentage"],
        )
        .unwrap_or(0.0),
        explanation: str_at(report, "explanation").unwrap_or_else(|| EXPLANATION_FALLBACK.into()),
        verdict: str_at(report, "verdict"),
    }
}

fn decode_video(report: &Value) -> VideoFindings {
    let visual = report
        .get("visual_analysis")
        .or_else(|| report.get("visualAnalysis"))
        .unwrap_or(report);
    let metadata = report.get("metadata").filter(|m| m.get("error").is_none());

    VideoFindings {
        fake_ratio_percent: first_num(visual, &["fake_ratio_percent", "fakeRatioPercent"])
            .unwrap_or(0.0),
        max_fake_score: first_num(visual, &["max_fake_score", "maxFakeScore"]).unwrap_or(0.0),
        frames_analyzed: visual.get("frames_analyzed").and_then(Value::as_u64),
        duration_sec: metadata.and_then(|m| first_num(m, &["duration_sec", "durationSec"])),
        resolution: metadata.and_then(|m| str_at(m, "resolution")),
        verdict: str_at(report, "verdict"),
    }
}

fn decode_document(report: &Value) -> DocumentFindings {
    let analysis = report
        .get("misinformationAnalysis")
        .or_else(|| report.get("misinformation_analysis"));

    DocumentFindings {
        danger_score: analysis
            .and_then(|a| first_num(a, &["dangerScore", "danger_score"]))
            .unwrap_or(0.0),
        flag_count: analysis
            .and_then(|a| a.get("flags"))
            .and_then(Value::as_array)
            .map_or(0, Vec::len),
        summary: str_at(report, "summary")
            .or_else(|| analysis.and_then(|a| str_at(a, "explanation")))
            .unwrap_or_else(|| DOCUMENT_SUMMARY_FALLBACK.into()),
    }
}

/// Reshapes the single-file `/verify` report into one `results[]` item.
fn legacy_item(report: &Map<String, Value>) -> Value {
    let details = report.get("details").cloned().unwrap_or(Value::Null);
    let file_type = details
        .get("file_type")
        .and_then(Value::as_str)
        .unwrap_or("other")
        .to_ascii_lowercase();
    let file = first_str(report, &["file", "filename"]).unwrap_or_else(|| "evidence".into());
    let verdict = report.get("verdict").cloned().unwrap_or(Value::Null);

    let body = match EvidenceKind::parse(&file_type) {
        EvidenceKind::Image => details
            .get("full_analysis")
            .cloned()
            .unwrap_or_else(|| Value::Object(report.clone())),
        EvidenceKind::Video => json!({
            "verdict": verdict.clone(),
            "visual_analysis": details.get("analysis").cloned().unwrap_or(Value::Null),
        }),
        EvidenceKind::Document => details.get("analysis").cloned().unwrap_or(Value::Null),
        EvidenceKind::Other => details,
    };

    json!({ "file": file, "type": file_type, "report": body, "verdict": verdict })
}

fn decode_opinion(item: &Value) -> Option<Opinion> {
    let obj = item.as_object()?;
    Some(Opinion {
        file: first_str(obj, &["file"]).unwrap_or_default(),
        opinion: first_str(obj, &["opinion", "text"]).unwrap_or_default(),
    })
}

fn synthesize_opinion(item: &Value) -> Opinion {
    let verdict = item
        .get("report")
        .and_then(|r| str_at(r, "verdict"))
        .or_else(|| str_at(item, "verdict"))
        .unwrap_or_else(|| VERDICT_FALLBACK.into());
    Opinion {
        file: str_at(item, "file").unwrap_or_default(),
        opinion: verdict,
    }
}

fn decode_entity(item: &Value) -> Option<Entity> {
    if let Some(name) = item.as_str() {
        return Some(Entity {
            name: name.to_string(),
            kind: "unknown".into(),
        });
    }
    let obj = item.as_object()?;
    Some(Entity {
        name: first_str(obj, &["name", "text"])?,
        kind: first_str(obj, &["type", "label"]).unwrap_or_else(|| "unknown".into()),
    })
}

fn decode_relation(item: &Value) -> Option<Relation> {
    let obj = item.as_object()?;
    Some(Relation {
        source: first_str(obj, &["source", "entityA"])?,
        relation: first_str(obj, &["relation", "relationship"]).unwrap_or_else(|| "related to".into()),
        target: first_str(obj, &["target", "entityB"])?,
    })
}

fn decode_blockchain_tx(raw: &Value) -> Option<BlockchainTx> {
    let obj = raw.as_object()?;
    if let Some(error) = first_str(obj, &["error"]) {
        return Some(BlockchainTx::Failed { error });
    }
    let tx_hash = first_str(obj, &["txHash", "tx_hash"])?;
    if TX_HASH.is_match(&tx_hash) {
        let chain_id = first_value(obj, &["chain_id", "chainId"]).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });
        Some(BlockchainTx::Recorded { tx_hash, chain_id })
    } else {
        Some(BlockchainTx::Stub { tx_hash })
    }
}

fn list<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    obj.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn first_value<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

fn first_str(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn str_at(v: &Value, key: &str) -> Option<String> {
    v.as_object().and_then(|obj| first_str(obj, &[key]))
}

fn first_num(v: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().filter_map(|k| v.get(*k)).find_map(|n| match n {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}
