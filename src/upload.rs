use crate::{
    config::Config,
    normalize::normalize,
    progress::{Pace, ProgressSimulator},
    proof::{self, ProofCheck},
    report::{
        AnalysisReport, EvidenceResult, Findings, ImageFindings, Opinion, ReportSource,
        SIMULATED_LABEL,
    },
    staging::StagedFile,
    surface::Surface,
    transport::{Transport, UploadForm},
};
use rand::{Rng, RngCore};
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

pub const STATUS_UPLOADING: &str = "Uploading evidence…";
pub const STATUS_RETRYING: &str = "Primary endpoint failed, retrying legacy endpoint…";
pub const STATUS_ANALYZING: &str = "Analyzing evidence…";
pub const STATUS_FINALIZING: &str = "Finalizing report…";

/// Result of one submission: the report to paint plus the raw body it came from.
#[derive(Debug, Clone)]
pub struct Submission {
    pub report: AnalysisReport,
    pub raw: Option<Value>,
    pub proof: Option<ProofCheck>,
}

pub struct Uploader<'a, T: Transport> {
    cfg: &'a Config,
    transport: T,
}

impl<'a, T: Transport> Uploader<'a, T> {
    pub fn new(cfg: &'a Config, transport: T) -> Self {
        Self { cfg, transport }
    }

    /// Uploads `files` with `instructions`, falling back to the legacy endpoint and
    /// finally to a locally simulated report. Never fails.
    pub fn submit(
        &self,
        files: &[StagedFile],
        instructions: &str,
        surface: &mut dyn Surface,
        rng: &mut dyn RngCore,
        pace: &mut dyn Pace,
    ) -> Submission {
        let progress = &self.cfg.progress;
        surface.progress(progress.start_percent, STATUS_UPLOADING);

        let form = UploadForm {
            file_field: self.cfg.upload.file_field.clone(),
            instructions_field: self.cfg.upload.instructions_field.clone(),
            files: files.to_vec(),
            instructions: instructions.to_string(),
        };

        let mut outcome = self.attempt(&self.cfg.server.primary_path, &form, ReportSource::Primary);
        if outcome.is_none() {
            surface.progress(progress.start_percent, STATUS_RETRYING);
            outcome = self.attempt(&self.cfg.server.legacy_path, &form, ReportSource::Legacy);
        }

        if progress.enabled {
            let sim = ProgressSimulator::from_config(progress);
            sim.run(progress.start_percent, rng, pace, |p| {
                surface.progress(p, STATUS_ANALYZING)
            });
        }
        surface.progress(100, STATUS_FINALIZING);
        pace.wait(Duration::from_millis(progress.settle_ms));

        match outcome {
            Some((report, raw)) => {
                info!(
                    "report from {:?} endpoint with {} result(s)",
                    report.source,
                    report.results.len()
                );
                let proof = Some(proof::verify(&raw));
                Submission {
                    report,
                    raw: Some(raw),
                    proof,
                }
            }
            None => {
                warn!(
                    "both endpoints failed; simulating results for {} file(s)",
                    files.len()
                );
                Submission {
                    report: simulated_report(files, rng),
                    raw: None,
                    proof: None,
                }
            }
        }
    }

    fn attempt(
        &self,
        path: &str,
        form: &UploadForm,
        source: ReportSource,
    ) -> Option<(AnalysisReport, Value)> {
        match self.transport.post_form(path, form) {
            Ok(raw) => match normalize(&raw, source) {
                Ok(report) => Some((report, raw)),
                Err(err) => {
                    warn!("{path}: unusable report: {err}");
                    None
                }
            },
            Err(err) => {
                warn!("{path}: upload failed: {err}");
                None
            }
        }
    }
}

/// Stand-in report shown when no endpoint answered: a random tamper score per file.
pub fn simulated_report(files: &[StagedFile], rng: &mut dyn RngCore) -> AnalysisReport {
    let results: Vec<EvidenceResult> = files
        .iter()
        .map(|f| EvidenceResult {
            file: f.name.clone(),
            findings: Findings::Image(ImageFindings {
                tamper_percentage: rng.gen_range(0.0..100.0),
                explanation: SIMULATED_LABEL.to_string(),
                verdict: None,
            }),
            simulated: true,
        })
        .collect();

    AnalysisReport {
        final_summary: format!(
            "The verification server could not be reached. Showing simulated results for {} file(s).",
            files.len()
        ),
        proof_hash: None,
        blockchain_tx: None,
        opinions: files
            .iter()
            .map(|f| Opinion {
                file: f.name.clone(),
                opinion: SIMULATED_LABEL.to_string(),
            })
            .collect(),
        entities: Vec::new(),
        relations: Vec::new(),
        results,
        session_id: None,
        source: ReportSource::Simulated,
    }
}
