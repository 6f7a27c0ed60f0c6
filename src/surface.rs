use crate::{
    render::HtmlRenderer,
    staging::{ActionState, StagedFile},
};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Everything the dashboard paints. Handed to [`crate::dashboard::Dashboard`]
/// once at construction; nothing looks display state up on its own.
pub trait Surface {
    fn staged(&mut self, files: &[StagedFile], action: &ActionState);
    fn progress(&mut self, percent: u8, status: &str);
    /// Empties the evidence grid before a new report is painted.
    fn clear_results(&mut self);
    fn show_summary(&mut self, markup: &str);
    fn append_card(&mut self, markup: &str);
    fn reveal_results(&mut self);
    /// Marks the query input invalid; the mark is expected to disappear after `clear_after`.
    fn flag_query_input(&mut self, clear_after: Duration);
    fn query_control(&mut self, state: &ActionState);
    fn show_answer(&mut self, markup: &str);
}

/// Logs interaction to the console and collects markup into a standalone page.
#[derive(Debug, Default)]
pub struct ConsoleSurface {
    last_status: String,
    summary: Option<String>,
    cards: Vec<String>,
    answer: Option<String>,
}

impl ConsoleSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    pub fn into_page(self, renderer: &HtmlRenderer) -> String {
        let mut sections = Vec::new();
        if let Some(summary) = self.summary {
            sections.push(summary);
        }
        if !self.cards.is_empty() {
            sections.push(format!(
                "<section class=\"grid\">\n{}</section>\n",
                self.cards.concat()
            ));
        }
        if let Some(answer) = self.answer {
            sections.push(answer);
        }
        renderer.document(&sections)
    }
}

impl Surface for ConsoleSurface {
    fn staged(&mut self, files: &[StagedFile], action: &ActionState) {
        debug!(
            "staged files={} action=\"{}\" enabled={}",
            files.len(),
            action.label,
            action.enabled
        );
    }

    fn progress(&mut self, percent: u8, status: &str) {
        if status != self.last_status {
            info!("{status} ({percent}%)");
            self.last_status = status.to_string();
        } else {
            debug!("progress {percent}%");
        }
    }

    fn clear_results(&mut self) {
        self.summary = None;
        self.cards.clear();
    }

    fn show_summary(&mut self, markup: &str) {
        self.summary = Some(markup.to_string());
    }

    fn append_card(&mut self, markup: &str) {
        self.cards.push(markup.to_string());
    }

    fn reveal_results(&mut self) {
        info!("report ready: {} evidence card(s)", self.cards.len());
    }

    fn flag_query_input(&mut self, _clear_after: Duration) {
        warn!("query is empty; nothing sent");
    }

    fn query_control(&mut self, state: &ActionState) {
        debug!("query control \"{}\" enabled={}", state.label, state.enabled);
    }

    fn show_answer(&mut self, markup: &str) {
        self.answer = Some(markup.to_string());
    }
}
