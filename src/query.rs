use crate::{
    config::Config,
    render::HtmlRenderer,
    report::QueryAnswer,
    staging::ActionState,
    surface::Surface,
    transport::Transport,
};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_QUERY_LABEL: &str = "Ask";
pub const BUSY_QUERY_LABEL: &str = "Querying…";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error: the knowledge service could not be reached.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Nothing to send: the text was empty after trimming.
    Rejected,
    Answered(QueryAnswer),
    Errored(String),
}

pub struct KnowledgeQuery<'a, T: Transport> {
    cfg: &'a Config,
    transport: T,
    renderer: &'a HtmlRenderer,
}

impl<'a, T: Transport> KnowledgeQuery<'a, T> {
    pub fn new(cfg: &'a Config, transport: T, renderer: &'a HtmlRenderer) -> Self {
        Self {
            cfg,
            transport,
            renderer,
        }
    }

    pub fn ask(&self, text: &str, case_id: Option<&str>, surface: &mut dyn Surface) -> QueryOutcome {
        let text = text.trim();
        if text.is_empty() {
            surface.flag_query_input(Duration::from_millis(self.cfg.query.flag_clear_ms));
            return QueryOutcome::Rejected;
        }

        surface.query_control(&ActionState {
            enabled: false,
            label: BUSY_QUERY_LABEL.to_string(),
        });

        let outcome = self.exchange(text, case_id);
        match &outcome {
            QueryOutcome::Answered(answer) => {
                info!("query answered with {} source(s)", answer.sources.len());
                surface.show_answer(&self.renderer.answer(answer));
            }
            QueryOutcome::Errored(message) => {
                surface.show_answer(&self.renderer.query_error(message));
            }
            QueryOutcome::Rejected => {}
        }

        surface.query_control(&ActionState {
            enabled: true,
            label: DEFAULT_QUERY_LABEL.to_string(),
        });
        outcome
    }

    fn exchange(&self, text: &str, case_id: Option<&str>) -> QueryOutcome {
        let body = json!({ "query": text, "caseId": case_id });
        match self.transport.post_json(&self.cfg.server.query_path, &body) {
            Ok(v) => decode_answer(&v),
            Err(err) => {
                warn!("query failed: {err}");
                QueryOutcome::Errored(
                    err.server_message()
                        .map(str::to_string)
                        .unwrap_or_else(|| NETWORK_ERROR_MESSAGE.to_string()),
                )
            }
        }
    }
}

/// Reads a `/rag_query` body. Only `status == "success"` with a string answer counts.
pub fn decode_answer(v: &Value) -> QueryOutcome {
    let result = v.get("result");
    let success = v.get("status").and_then(Value::as_str) == Some("success");
    let answer = result.and_then(|r| r.get("answer")).and_then(Value::as_str);

    if let (true, Some(answer)) = (success, answer) {
        let sources = result
            .and_then(|r| r.get("sources"))
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        return QueryOutcome::Answered(QueryAnswer {
            answer: answer.to_string(),
            sources,
        });
    }

    let message = v
        .get("error")
        .or_else(|| result.and_then(|r| r.get("error")))
        .and_then(Value::as_str)
        .unwrap_or(NETWORK_ERROR_MESSAGE);
    QueryOutcome::Errored(message.to_string())
}
