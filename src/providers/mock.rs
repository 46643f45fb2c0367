/*!
 * Mock provider implementations for testing and dry runs.
 *
 * `MockProvider` never touches the network. Replies queued with
 * `with_reply` / `with_failure` are consumed first, in order; once the
 * queue is empty the provider falls back to its behavior:
 * - `MockProvider::echo()` - returns the input unchanged (marker tokens survive)
 * - `MockProvider::failing()` - always fails with an API error
 * - `MockProvider::empty()` - returns an empty body
 * - `MockProvider::intermittent(n)` - fails every nth request
 */

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::ProviderError;
use crate::providers::{ChatProvider, Provider, parse_chat_reply};
use crate::translation::model::{TranslationRequest, TranslationResult};

/// Behavior once the scripted replies run out
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Return the request text (or the user prompt) unchanged
    Echo,
    /// Always fail with an error
    Failing,
    /// Return an empty body
    Empty,
    /// Fail every Nth request
    Intermittent { fail_every: usize },
}

/// A prompt pair received through `chat`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPrompt {
    pub system: String,
    pub user: String,
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    behavior: MockBehavior,
    /// Replies handed out before falling back to `behavior`
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    /// Requests seen so far (shared between clones)
    request_count: Arc<AtomicUsize>,
    /// Prompts received through `chat`
    prompts: Mutex<Vec<RecordedPrompt>>,
    /// Rewrites echoed text, e.g. to simulate a provider mangling tokens
    custom_response: Option<fn(&str) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            script: Mutex::new(VecDeque::new()),
            request_count: Arc::new(AtomicUsize::new(0)),
            prompts: Mutex::new(Vec::new()),
            custom_response: None,
        }
    }

    /// A provider that echoes its input
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// A provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// A provider that returns empty bodies
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// A provider that fails every `fail_every`th request
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Queue a raw reply
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.push(Ok(reply.into()));
        self
    }

    /// Queue a failure
    pub fn with_failure(self, error: ProviderError) -> Self {
        self.push(Err(error));
        self
    }

    /// Transform echoed text before returning it
    pub fn with_custom_response(mut self, generator: fn(&str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests served, including failures
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Prompts received through `chat`, oldest first
    pub fn prompts(&self) -> Vec<RecordedPrompt> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }

    fn push(&self, reply: Result<String, ProviderError>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(reply);
        }
    }

    fn next_scripted(&self) -> Option<Result<String, ProviderError>> {
        self.script.lock().ok().and_then(|mut script| script.pop_front())
    }

    /// Produce a raw reply for `input`, consuming the script first.
    fn respond(&self, input: &str) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        if let Some(reply) = self.next_scripted() {
            return reply;
        }

        match self.behavior {
            MockBehavior::Echo => Ok(match self.custom_response {
                Some(generator) => generator(input),
                None => input.to_string(),
            }),
            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),
            MockBehavior::Empty => Ok(String::new()),
            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                    })
                } else {
                    Ok(input.to_string())
                }
            }
        }
    }
}

impl Clone for MockProvider {
    /// Clones share the request counter but not the script or recorded prompts.
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            script: Mutex::new(VecDeque::new()),
            request_count: Arc::clone(&self.request_count),
            prompts: Mutex::new(Vec::new()),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult, ProviderError> {
        let reply = self.respond(&request.text)?;
        parse_chat_reply(&reply, request.want_notes)
    }

    fn as_chat(&self) -> Option<&dyn ChatProvider> {
        Some(self)
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    async fn chat(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(RecordedPrompt {
                system: system.to_string(),
                user: user.to_string(),
            });
        }
        self.respond(user)
    }
}
