//! Scripted `Transport` for unit tests. Replies are consumed in order.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::llm_client::{LlmClient, LlmError, ProfileKind, RetryPolicy, Transport, UpstreamReason};

#[derive(Default)]
pub struct FakeTransport {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    calls: Mutex<Vec<(String, ProfileKind)>>,
}

impl FakeTransport {
    pub fn new(replies: Vec<Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(vec![Ok(text.into())]))
    }

    /// Client over this fake with an instant backoff.
    pub fn client(fake: Arc<Self>) -> LlmClient {
        LlmClient::new(fake).with_retry_policy(RetryPolicy {
            max_retries: 3,
            initial_delay: Duration::ZERO,
        })
    }

    pub fn throttled() -> LlmError {
        LlmError::Upstream {
            status: 429,
            reason: UpstreamReason::RateLimited,
            body: "rate limited".to_string(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn profiles(&self) -> Vec<ProfileKind> {
        self.calls.lock().unwrap().iter().map(|(_, k)| *k).collect()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn generate_content(
        &self,
        prompt: &str,
        profile: ProfileKind,
    ) -> Result<String, LlmError> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), profile));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::MalformedResponse("no scripted reply".to_string())))
    }
}
