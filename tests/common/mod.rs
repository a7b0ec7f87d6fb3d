//! In-process fakes for the embedding, search and completion services.

#![allow(dead_code)]

use async_trait::async_trait;
use learning_buddy::config::RetrievalSettings;
use learning_buddy::embedding::Embedder;
use learning_buddy::error::{BuddyError, Result};
use learning_buddy::orchestrator::Orchestrator;
use learning_buddy::rag::{Generator, PromptComposer};
use learning_buddy::vector_store::{Collection, Match, VectorSearch};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Returns a fixed vector and counts calls, optionally failing on the nth call.
#[derive(Default)]
pub struct CountingEmbedder {
    pub texts: Mutex<Vec<String>>,
    fail_on_call: Option<usize>,
}

impl CountingEmbedder {
    /// Fail the `n`th call (1-based) and every call after it.
    pub fn failing_from(n: usize) -> Self {
        Self {
            fail_on_call: Some(n),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.texts.lock().unwrap().len()
    }
}

#[async_trait]
impl Embedder for CountingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let call = {
            let mut texts = self.texts.lock().unwrap();
            texts.push(text.to_string());
            texts.len()
        };
        match self.fail_on_call {
            Some(n) if call >= n => Err(BuddyError::Embedding("model offline".to_string())),
            _ => Ok(vec![0.5, 0.5, 0.5]),
        }
    }

    fn dimensions(&self) -> usize {
        3
    }
}

/// Replies to searches in call order from a script.
#[derive(Default)]
pub struct ScriptedSearch {
    script: Mutex<VecDeque<std::result::Result<Vec<Match>, String>>>,
    pub requests: Mutex<Vec<(Collection, usize)>>,
}

impl ScriptedSearch {
    pub fn new(script: Vec<std::result::Result<Vec<Match>, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl VectorSearch for ScriptedSearch {
    async fn search(&self, _vector: &[f32], collection: Collection, top_k: usize) -> Result<Vec<Match>> {
        self.requests.lock().unwrap().push((collection, top_k));
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(matches)) => Ok(matches),
            Some(Err(message)) => Err(BuddyError::VectorSearch(message)),
            None => Ok(Vec::new()),
        }
    }
}

/// Records prompts and replies with a canned answer, an error, or after a delay.
pub struct RecordingGenerator {
    reply: Option<String>,
    delay: Option<Duration>,
    pub prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl RecordingGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            delay: None,
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            ..Self::replying("")
        }
    }

    pub fn slow(reply: &str, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::replying(reply)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl Generator for RecordingGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.reply {
            Some(reply) => Ok(reply.trim().to_string()),
            None => Err(BuddyError::Generation("quota exceeded".to_string())),
        }
    }
}

pub struct Harness {
    pub embedder: Arc<CountingEmbedder>,
    pub search: Arc<ScriptedSearch>,
    pub generator: Arc<RecordingGenerator>,
    pub orchestrator: Orchestrator,
}

pub fn harness(search: ScriptedSearch, generator: RecordingGenerator) -> Harness {
    harness_with(CountingEmbedder::default(), search, generator)
}

pub fn harness_with(
    embedder: CountingEmbedder,
    search: ScriptedSearch,
    generator: RecordingGenerator,
) -> Harness {
    let embedder = Arc::new(embedder);
    let search = Arc::new(search);
    let generator = Arc::new(generator);

    let orchestrator = Orchestrator::with_components(
        embedder.clone(),
        search.clone(),
        generator.clone(),
        PromptComposer::default(),
        RetrievalSettings::default(),
    );

    Harness {
        embedder,
        search,
        generator,
        orchestrator,
    }
}

pub fn course(id: &str, score: f32, name: &str, category: &str) -> Match {
    serde_json::from_value(json!({
        "id": id,
        "score": score,
        "metadata": { "course_name": name, "category": category, "text": format!("{} course", name) }
    }))
    .unwrap()
}

pub fn faq(id: &str, score: f32, question: &str, answer: &str) -> Match {
    serde_json::from_value(json!({
        "id": id,
        "score": score,
        "metadata": { "question": question, "answer": answer }
    }))
    .unwrap()
}
