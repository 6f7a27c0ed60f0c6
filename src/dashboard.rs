use crate::{
    config::Config,
    progress::{Pace, RealPace},
    query::{KnowledgeQuery, QueryOutcome, DEFAULT_QUERY_LABEL},
    render::HtmlRenderer,
    staging::{ActionState, FileStaging, StagedFile},
    surface::Surface,
    transport::Transport,
    upload::{Submission, Uploader},
};
use anyhow::{bail, Result};
use rand::{rngs::StdRng, SeedableRng};

/// Application state: the staged files plus the transport and surface they flow through.
///
/// `submit` borrows the dashboard mutably, so a second submission cannot
/// start while one is in flight; the action control stays disabled for the
/// whole window.
pub struct Dashboard<T: Transport, S: Surface> {
    cfg: Config,
    staging: FileStaging,
    transport: T,
    surface: S,
    renderer: HtmlRenderer,
    rng: StdRng,
    pace: Box<dyn Pace>,
}

impl<T: Transport, S: Surface> Dashboard<T, S> {
    pub fn new(cfg: &Config, transport: T, surface: S) -> Self {
        let mut dashboard = Self {
            cfg: cfg.clone(),
            staging: FileStaging::new(),
            transport,
            surface,
            renderer: HtmlRenderer::new(&cfg.render),
            rng: StdRng::from_entropy(),
            pace: Box::new(RealPace::new()),
        };
        dashboard.refresh_staging();
        dashboard.surface.query_control(&ActionState {
            enabled: true,
            label: DEFAULT_QUERY_LABEL.to_string(),
        });
        dashboard
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_pace(mut self, pace: Box<dyn Pace>) -> Self {
        self.pace = pace;
        self
    }

    pub fn staging(&self) -> &FileStaging {
        &self.staging
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn renderer(&self) -> &HtmlRenderer {
        &self.renderer
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn add_files<I>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = StagedFile>,
    {
        let added = self.staging.add_files(candidates);
        self.refresh_staging();
        added
    }

    pub fn remove_file(&mut self, index: usize) {
        self.staging.remove_file(index);
        self.refresh_staging();
    }

    pub fn clear_files(&mut self) {
        self.staging.clear();
        self.refresh_staging();
    }

    /// Uploads every staged file, paints the resulting report and resets staging.
    pub fn submit(&mut self, instructions: &str) -> Result<Submission> {
        if self.staging.is_empty() {
            bail!("no files staged");
        }
        self.surface
            .staged(self.staging.files(), &ActionState::busy());

        let uploader = Uploader::new(&self.cfg, &self.transport);
        let submission = uploader.submit(
            self.staging.files(),
            instructions,
            &mut self.surface,
            &mut self.rng,
            self.pace.as_mut(),
        );

        self.surface.clear_results();
        self.surface.show_summary(
            &self
                .renderer
                .summary(&submission.report, submission.proof.as_ref()),
        );
        for result in &submission.report.results {
            self.surface.append_card(&self.renderer.card(result));
        }
        self.surface.reveal_results();

        self.clear_files();
        Ok(submission)
    }

    pub fn query(&mut self, text: &str, case_id: Option<&str>) -> QueryOutcome {
        KnowledgeQuery::new(&self.cfg, &self.transport, &self.renderer).ask(
            text,
            case_id,
            &mut self.surface,
        )
    }

    fn refresh_staging(&mut self) {
        let action = self.staging.action_state();
        self.surface.staged(self.staging.files(), &action);
    }
}
