#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use empath_core::error::{EmpathError, Result};
use empath_core::session::{ChatBackend, ChatSession, Console, InputEvent, ModelInfo};

/// How a mock model behaves when used.
#[derive(Clone)]
pub enum ModelBehavior {
    /// `start_chat` fails.
    StartFails(String),
    /// `start_chat` succeeds but the first send fails.
    SendFails(String),
    /// The model answers with an empty string.
    Empty,
    /// Every send returns this reply prefixed by the model id.
    Replies,
    /// Sends never complete.
    Hangs,
}

/// Records every interaction in order.
#[derive(Default, Clone)]
pub struct CallLog {
    pub start_attempts: Arc<Mutex<Vec<String>>>,
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
    pub list_calls: Arc<AtomicUsize>,
}

impl CallLog {
    pub fn start_attempts(&self) -> Vec<String> {
        self.start_attempts.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, text)| text).collect()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

pub struct MockBackend {
    behaviors: HashMap<String, ModelBehavior>,
    listing: std::result::Result<Vec<ModelInfo>, String>,
    pub log: CallLog,
}

impl MockBackend {
    pub fn new(behaviors: &[(&str, ModelBehavior)]) -> Self {
        Self {
            behaviors: behaviors
                .iter()
                .map(|(id, behavior)| (id.to_string(), behavior.clone()))
                .collect(),
            listing: Ok(vec![
                ModelInfo {
                    name: "models/gemini-2.5-flash".to_string(),
                    supported_methods: vec!["generateContent".to_string()],
                },
                ModelInfo {
                    name: "models/text-embedding-004".to_string(),
                    supported_methods: vec!["embedContent".to_string()],
                },
            ]),
            log: CallLog::default(),
        }
    }

    pub fn with_listing_error(mut self, message: &str) -> Self {
        self.listing = Err(message.to_string());
        self
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        self.log.list_calls.fetch_add(1, Ordering::SeqCst);
        self.listing.clone().map_err(EmpathError::transport)
    }

    async fn start_chat(&self, model_id: &str) -> Result<Box<dyn ChatSession>> {
        self.log
            .start_attempts
            .lock()
            .unwrap()
            .push(model_id.to_string());

        let behavior = self
            .behaviors
            .get(model_id)
            .cloned()
            .unwrap_or(ModelBehavior::StartFails(format!("404 model {model_id} not found")));

        if let ModelBehavior::StartFails(message) = behavior {
            return Err(EmpathError::transport(message));
        }

        Ok(Box::new(MockSession {
            model_id: model_id.to_string(),
            behavior,
            log: self.log.clone(),
            fail_after: None,
        }))
    }
}

pub struct MockSession {
    pub model_id: String,
    pub behavior: ModelBehavior,
    pub log: CallLog,
    /// Fail every send once this many messages were delivered.
    pub fail_after: Option<usize>,
}

impl MockSession {
    pub fn replying(model_id: &str, log: CallLog) -> Self {
        Self {
            model_id: model_id.to_string(),
            behavior: ModelBehavior::Replies,
            log,
            fail_after: None,
        }
    }
}

#[async_trait]
impl ChatSession for MockSession {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn send_message(&mut self, text: &str) -> Result<String> {
        if let Some(limit) = self.fail_after {
            if self.log.sent().len() >= limit {
                return Err(EmpathError::transport("connection reset by peer"));
            }
        }

        match &self.behavior {
            ModelBehavior::Hangs => std::future::pending().await,
            ModelBehavior::SendFails(message) => Err(EmpathError::transport(message.clone())),
            behavior => {
                self.log
                    .sent
                    .lock()
                    .unwrap()
                    .push((self.model_id.clone(), text.to_string()));
                match behavior {
                    ModelBehavior::Empty => Ok(String::new()),
                    _ => Ok(format!("[{}] reply to: {}", self.model_id, text)),
                }
            }
        }
    }
}

/// Console fed from a script; records everything printed.
#[derive(Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<InputEvent>,
    pub prompts: Vec<String>,
    pub said: Vec<String>,
    pub replies: Vec<(String, String)>,
    pub clears: usize,
    /// Once scripted input runs out, `read_line` waits forever instead of closing.
    pub wait_when_drained: bool,
    /// `render_reply` records the reply, then never finishes typing it.
    pub stall_rendering: bool,
}

impl ScriptedConsole {
    pub fn with_lines(lines: &[&str]) -> Self {
        Self {
            inputs: lines
                .iter()
                .map(|line| InputEvent::Line(line.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn then(mut self, event: InputEvent) -> Self {
        self.inputs.push_back(event);
        self
    }

    pub fn waiting_when_drained(mut self) -> Self {
        self.wait_when_drained = true;
        self
    }

    pub fn stalling_render(mut self) -> Self {
        self.stall_rendering = true;
        self
    }

    pub fn said_text(&self) -> String {
        self.said.join("\n")
    }
}

#[async_trait]
impl Console for ScriptedConsole {
    async fn read_line(&mut self, prompt: &str) -> InputEvent {
        self.prompts.push(prompt.to_string());
        match self.inputs.pop_front() {
            Some(event) => event,
            None if self.wait_when_drained => std::future::pending().await,
            None => InputEvent::Closed,
        }
    }

    fn say(&mut self, text: &str) {
        self.said.push(text.to_string());
    }

    async fn render_reply(&mut self, label: &str, text: &str) {
        self.replies.push((label.to_string(), text.to_string()));
        if self.stall_rendering {
            std::future::pending::<()>().await;
        }
    }

    fn clear(&mut self) {
        self.clears += 1;
    }
}
