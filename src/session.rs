//! In-memory session registry.
//!
//! Each session owns its ingested tools, their vocabulary and a bounded
//! conversation history. Session state sits behind an async mutex; a chat turn
//! holds the lock for its whole duration, so a session has at most one turn in
//! flight. The tool list is also published as a snapshot that can be read
//! without waiting for a turn to finish.

use crate::ingestion::{IngestOutcome, Tool};
use crate::llm::ChatMessage;
use crate::selection::Vocabulary;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};
use tokio::sync::{Mutex, MutexGuard};

pub const DEFAULT_INSTRUCTIONS: &str = "You are a helpful assistant that uses tools when relevant.";

pub struct SessionState {
    pub tools: Arc<Vec<Tool>>,
    pub vocabulary: Vocabulary,
    pub instructions: String,
    history: VecDeque<ChatMessage>,
    max_history: usize,
}

impl SessionState {
    pub fn new(max_history: usize) -> Self {
        Self {
            tools: Arc::new(Vec::new()),
            vocabulary: Vocabulary::default(),
            instructions: String::new(),
            history: VecDeque::new(),
            max_history,
        }
    }

    /// Replace the tool set with a fresh ingestion. The vocabulary is rebuilt
    /// from the new tools only, and the conversation starts over.
    pub fn load(&mut self, outcome: IngestOutcome, instructions: String) {
        self.vocabulary = Vocabulary::build(&outcome.tools);
        self.tools = Arc::new(outcome.tools);
        self.instructions = instructions;
        self.history.clear();
    }

    /// Instructions for the system prompt, or the default when none were given.
    pub fn system_instructions(&self) -> &str {
        if self.instructions.trim().is_empty() {
            DEFAULT_INSTRUCTIONS
        } else {
            &self.instructions
        }
    }

    /// Append to the history, dropping the oldest entries past `max_history`.
    pub fn push_history(&mut self, message: ChatMessage) {
        self.history.push_back(message);
        while self.history.len() > self.max_history {
            self.history.pop_front();
        }
    }

    pub fn history(&self) -> impl Iterator<Item = &ChatMessage> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

/// One registry entry: the turn-locked state plus a lock-free view of its tools.
pub struct SessionEntry {
    state: Mutex<SessionState>,
    catalog: RwLock<Arc<Vec<Tool>>>,
}

impl SessionEntry {
    fn new(max_history: usize) -> Self {
        Self {
            state: Mutex::new(SessionState::new(max_history)),
            catalog: RwLock::new(Arc::new(Vec::new())),
        }
    }

    pub async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().await
    }

    /// The tools from the latest ingestion. Does not wait on an in-flight turn.
    pub fn tools(&self) -> Arc<Vec<Tool>> {
        self.catalog
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    async fn load(&self, outcome: IngestOutcome, instructions: String) -> MutexGuard<'_, SessionState> {
        let mut state = self.state.lock().await;
        state.load(outcome, instructions);
        *self
            .catalog
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Arc::clone(&state.tools);
        state
    }
}

pub type SessionHandle = Arc<SessionEntry>;

pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionHandle>>,
    max_history: usize,
}

impl SessionRegistry {
    pub fn new(max_history: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_history,
        }
    }

    pub fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(session_id)
            .cloned()
    }

    /// The session for `session_id`, created empty if it does not exist yet.
    pub fn get_or_create(&self, session_id: &str) -> SessionHandle {
        if let Some(existing) = self.get(session_id) {
            return existing;
        }
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(SessionEntry::new(self.max_history)))
            .clone()
    }

    /// Store a fresh ingestion for the session, replacing any previous one.
    pub async fn set(&self, session_id: &str, outcome: IngestOutcome, instructions: String) {
        let handle = self.get_or_create(session_id);
        let state = handle.load(outcome, instructions).await;
        tracing::info!(
            session_id,
            tools = state.tools.len(),
            vocabulary = state.vocabulary.len(),
            "Session loaded"
        );
    }

    pub async fn append_history(&self, session_id: &str, message: ChatMessage) {
        let handle = self.get_or_create(session_id);
        handle.lock().await.push_history(message);
    }

    pub async fn history(&self, session_id: &str) -> Vec<ChatMessage> {
        match self.get(session_id) {
            Some(handle) => handle.lock().await.history().cloned().collect(),
            None => Vec::new(),
        }
    }

    pub async fn clear_history(&self, session_id: &str) -> bool {
        match self.get(session_id) {
            Some(handle) => {
                handle.lock().await.clear_history();
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, session_id: &str) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(session_id)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
