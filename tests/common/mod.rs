#![allow(dead_code)]

use forensight::{
    progress::Pace,
    staging::{ActionState, StagedFile},
    surface::Surface,
    transport::{Transport, TransportError, UploadForm},
};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Network,
    Status(u16, Option<Value>),
    Malformed,
}

/// Scripted transport: one reply per path, every call recorded in order.
#[derive(Default)]
pub struct FakeTransport {
    replies: HashMap<String, Reply>,
    pub calls: RefCell<Vec<String>>,
    pub json_bodies: RefCell<Vec<Value>>,
    pub forms: RefCell<Vec<UploadForm>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, path: &str, reply: Reply) -> Self {
        self.replies.insert(path.to_string(), reply);
        self
    }

    fn answer(&self, path: &str) -> Result<Value, TransportError> {
        self.calls.borrow_mut().push(path.to_string());
        match self.replies.get(path) {
            Some(Reply::Json(v)) => Ok(v.clone()),
            Some(Reply::Status(code, body)) => Err(TransportError::Status {
                code: *code,
                body: body.clone(),
            }),
            Some(Reply::Malformed) => Err(TransportError::Shape("expected value at line 1".into())),
            Some(Reply::Network) | None => Err(TransportError::Network("connection refused".into())),
        }
    }
}

impl Transport for FakeTransport {
    fn post_form(&self, path: &str, form: &UploadForm) -> Result<Value, TransportError> {
        self.forms.borrow_mut().push(form.clone());
        self.answer(path)
    }

    fn post_json(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        self.json_bodies.borrow_mut().push(body.clone());
        self.answer(path)
    }
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub staged: Vec<(usize, ActionState)>,
    pub progress: Vec<(u8, String)>,
    pub clears: usize,
    pub summary: Option<String>,
    pub cards: Vec<String>,
    pub revealed: usize,
    pub flags: Vec<Duration>,
    pub query_controls: Vec<ActionState>,
    pub answers: Vec<String>,
}

impl Surface for RecordingSurface {
    fn staged(&mut self, files: &[StagedFile], action: &ActionState) {
        self.staged.push((files.len(), action.clone()));
    }

    fn progress(&mut self, percent: u8, status: &str) {
        self.progress.push((percent, status.to_string()));
    }

    fn clear_results(&mut self) {
        self.clears += 1;
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
        self.revealed += 1;
    }

    fn flag_query_input(&mut self, clear_after: Duration) {
        self.flags.push(clear_after);
    }

    fn query_control(&mut self, state: &ActionState) {
        self.query_controls.push(state.clone());
    }

    fn show_answer(&mut self, markup: &str) {
        self.answers.push(markup.to_string());
    }
}

/// Virtual clock: `wait` advances time by the requested duration plus `stall`.
#[derive(Debug, Default)]
pub struct VirtualPace {
    pub now: Duration,
    pub stall: Duration,
    pub waits: usize,
}

impl VirtualPace {
    pub fn stalling(stall: Duration) -> Self {
        Self {
            stall,
            ..Self::default()
        }
    }
}

impl Pace for VirtualPace {
    fn now(&self) -> Duration {
        self.now
    }

    fn wait(&mut self, d: Duration) {
        self.now += d + self.stall;
        self.waits += 1;
    }
}

pub fn file(name: &str, size: u64) -> StagedFile {
    StagedFile::new(name, size, "application/octet-stream", format!("/evidence/{name}"))
}
