use crate::{
    config,
    proof::ProofCheck,
    report::{
        AnalysisReport, BlockchainTx, DocumentFindings, EvidenceResult, Findings, ImageFindings,
        QueryAnswer, SIMULATED_LABEL, VideoFindings,
    },
    util::truncate_chars,
};
use serde_json::Value;

pub const NOT_AVAILABLE: &str = "N/A";

/// Rewrites every markup-significant character as an entity.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '`' => out.push_str("&#x60;"),
            '=' => out.push_str("&#x3D;"),
            '/' => out.push_str("&#x2F;"),
            other => out.push(other),
        }
    }
    out
}

fn level(danger: bool) -> &'static str {
    if danger { "danger" } else { "safe" }
}

fn score(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    dump_max_chars: usize,
    page_title: String,
}

impl HtmlRenderer {
    pub fn new(cfg: &config::Render) -> Self {
        Self {
            dump_max_chars: cfg.dump_max_chars,
            page_title: cfg.page_title.clone(),
        }
    }

    /// Summary block: synthesis text, proof, chain record, opinions, entities, relations.
    pub fn summary(&self, report: &AnalysisReport, proof: Option<&ProofCheck>) -> String {
        let mut html = String::from("<section class=\"summary\">\n<h2>Final summary</h2>\n");
        html.push_str(&format!(
            "<p class=\"summary-text\">{}</p>\n",
            escape_html(&report.final_summary)
        ));

        if let Some(hash) = &report.proof_hash {
            let check = match proof {
                Some(ProofCheck::Verified) => " <span class=\"badge safe\">verified locally</span>",
                Some(ProofCheck::Mismatch { .. }) => {
                    " <span class=\"badge danger\">hash mismatch</span>"
                }
                _ => "",
            };
            html.push_str(&format!(
                "<p class=\"proof\">Proof hash: <code>{}</code>{check}</p>\n",
                escape_html(hash)
            ));
        }

        if let Some(tx) = &report.blockchain_tx {
            html.push_str(&self.blockchain(tx));
        }

        if !report.opinions.is_empty() {
            html.push_str("<h3>Opinions</h3>\n<ul class=\"opinions\">\n");
            for o in &report.opinions {
                html.push_str(&format!(
                    "<li><strong>{}</strong>: {}</li>\n",
                    escape_html(&o.file),
                    escape_html(&o.opinion)
                ));
            }
            html.push_str("</ul>\n");
        }

        if !report.entities.is_empty() {
            html.push_str("<h3>Entities</h3>\n<ul class=\"entities\">\n");
            for e in &report.entities {
                html.push_str(&format!(
                    "<li>{} <em>({})</em></li>\n",
                    escape_html(&e.name),
                    escape_html(&e.kind)
                ));
            }
            html.push_str("</ul>\n");
        }

        if !report.relations.is_empty() {
            html.push_str("<h3>Relations</h3>\n<ul class=\"relations\">\n");
            for r in &report.relations {
                html.push_str(&format!(
                    "<li>{} &rarr; {} &rarr; {}</li>\n",
                    escape_html(&r.source),
                    escape_html(&r.relation),
                    escape_html(&r.target)
                ));
            }
            html.push_str("</ul>\n");
        }

        html.push_str("</section>\n");
        html
    }

    fn blockchain(&self, tx: &BlockchainTx) -> String {
        match tx {
            BlockchainTx::Recorded { tx_hash, chain_id } => format!(
                "<p class=\"tx\">Blockchain TX: <code>{}</code>{}</p>\n",
                escape_html(tx_hash),
                chain_id
                    .as_deref()
                    .map(|c| format!(" (chain {})", escape_html(c)))
                    .unwrap_or_default()
            ),
            BlockchainTx::Stub { tx_hash } => format!(
                "<p class=\"tx\">Blockchain TX: <code>{}</code> <span class=\"badge\">stub</span></p>\n",
                escape_html(tx_hash)
            ),
            BlockchainTx::Failed { error } => format!(
                "<p class=\"tx danger\">Blockchain TX failed: {}</p>\n",
                escape_html(error)
            ),
        }
    }

    /// One evidence card, chosen by the result's kind.
    pub fn card(&self, result: &EvidenceResult) -> String {
        let body = match &result.findings {
            Findings::Image(f) => self.image_body(f),
            Findings::Video(f) => self.video_body(f),
            Findings::Document(f) => self.document_body(f),
            Findings::Other { raw_type, payload } => self.other_body(raw_type, payload),
        };
        let badge = if result.simulated {
            format!("<span class=\"badge simulated\">{SIMULATED_LABEL}</span>\n")
        } else {
            String::new()
        };
        format!(
            "<div class=\"card card-{kind}\">\n<h3>{file}</h3>\n{badge}{body}</div>\n",
            kind = result.kind().as_str(),
            file = escape_html(&result.file),
        )
    }

    fn image_body(&self, f: &ImageFindings) -> String {
        format!(
            "<p class=\"metric {}\">Tamper: {:.1}%</p>\n<p class=\"explanation\">{}</p>\n",
            level(f.tamper_percentage > 50.0),
            f.tamper_percentage,
            escape_html(&f.explanation)
        )
    }

    fn video_body(&self, f: &VideoFindings) -> String {
        let duration = f
            .duration_sec
            .map(|d| format!("{d:.2}s"))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        format!(
            "<p class=\"metric {}\">Fake frames: {:.1}%</p>\n<p>Max fake score: {}</p>\n<p>Duration: {}</p>\n",
            level(f.fake_ratio_percent > 0.0),
            f.fake_ratio_percent,
            score(f.max_fake_score),
            duration
        )
    }

    fn document_body(&self, f: &DocumentFindings) -> String {
        format!(
            "<p class=\"metric {}\">Danger score: {}/100</p>\n<p>Flags: {}</p>\n<p class=\"explanation\">{}</p>\n",
            level(f.danger_score > 50.0),
            score(f.danger_score),
            f.flag_count,
            escape_html(&f.summary)
        )
    }

    fn other_body(&self, raw_type: &str, payload: &Value) -> String {
        let dump = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
        format!(
            "<p>Type: <code>{}</code></p>\n<pre class=\"dump\">{}</pre>\n",
            escape_html(raw_type),
            escape_html(&truncate_chars(&dump, self.dump_max_chars))
        )
    }

    pub fn answer(&self, answer: &QueryAnswer) -> String {
        let mut html = format!(
            "<section class=\"answer\">\n<p class=\"answer-text\">{}</p>\n",
            escape_html(&answer.answer)
        );
        if !answer.sources.is_empty() {
            html.push_str("<ul class=\"sources\">\n");
            for s in &answer.sources {
                html.push_str(&format!("<li>{}</li>\n", escape_html(s)));
            }
            html.push_str("</ul>\n");
        }
        html.push_str("</section>\n");
        html
    }

    pub fn query_error(&self, message: &str) -> String {
        format!(
            "<section class=\"answer\">\n<p class=\"answer-text danger\">{}</p>\n</section>\n",
            escape_html(message)
        )
    }

    /// Wraps rendered sections in a standalone page.
    pub fn document(&self, sections: &[String]) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("<meta charset=\"UTF-8\">\n");
        html.push_str(
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
        );
        html.push_str(&format!("<title>{}</title>\n", escape_html(&self.page_title)));
        html.push_str(STYLE);
        html.push_str("</head>\n<body>\n");
        html.push_str(&format!("<h1>{}</h1>\n", escape_html(&self.page_title)));
        for s in sections {
            html.push_str(s);
        }
        html.push_str("</body>\n</html>\n");
        html
    }
}

const STYLE: &str = r#"<style>
body { font-family: system-ui, sans-serif; max-width: 1100px; margin: 2rem auto; padding: 0 1rem; color: #1f2933; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(260px, 1fr)); gap: 1rem; }
.card { border: 1px solid #d9e2ec; border-radius: 8px; padding: 1rem; }
.metric { font-size: 1.25rem; font-weight: 600; }
.danger { color: #c62828; }
.safe { color: #2e7d32; }
.badge { display: inline-block; font-size: 0.75rem; padding: 0.1rem 0.4rem; border-radius: 4px; background: #eef2f7; }
.badge.simulated { background: #fff3cd; }
.dump { white-space: pre-wrap; font-size: 0.8rem; background: #f5f7fa; padding: 0.5rem; }
</style>
"#;
