//! Mock chat backend for testing.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{ChatBackend, CoreError};

/// A configurable mock reply for [`MockChat`].
#[derive(Clone, Debug)]
pub enum MockReply {
    /// The model's text reply (any string; need not be valid JSON).
    Content(String),
    /// Simulate a 429 rate-limit response.
    RateLimited,
    /// Simulate a non-2xx API response.
    ApiError { status: u16, message: String },
}

/// A hand-rolled mock implementing [`ChatBackend`] for tests.
///
/// Supports a fixed reply or a sequence of replies (one per call, repeating
/// the last when exhausted), call counting, and capture of the messages sent.
pub struct MockChat {
    /// If non-empty, each call pops the next reply.
    replies: Mutex<Vec<MockReply>>,
    /// Fallback when the sequence is exhausted (or single-reply mode).
    fallback: MockReply,
    call_count: AtomicUsize,
    /// Every `(system, user)` message pair this mock has received.
    calls: Mutex<Vec<(String, String)>>,
}

impl MockChat {
    /// Create a mock that always returns `reply`.
    pub fn new(reply: MockReply) -> Self {
        Self {
            replies: Mutex::new(Vec::new()),
            fallback: reply,
            call_count: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that returns replies in order, repeating the last one.
    pub fn with_sequence(mut replies: Vec<MockReply>) -> Self {
        assert!(!replies.is_empty(), "sequence must have at least one reply");
        // Reverse so we can pop() from the front cheaply.
        replies.reverse();
        let fallback = replies.first().cloned().unwrap();
        Self {
            replies: Mutex::new(replies),
            fallback,
            call_count: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// How many times `complete()` has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// The `(system, user)` message pairs received so far.
    pub fn recorded_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn next_reply(&self) -> MockReply {
        let mut seq = self.replies.lock().unwrap();
        seq.pop().unwrap_or_else(|| self.fallback.clone())
    }
}

impl ChatBackend for MockChat {
    fn name(&self) -> &str {
        "Mock"
    }

    fn complete<'a>(
        &'a self,
        system: &'a str,
        user: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, CoreError>> + Send + 'a>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        let reply = self.next_reply();

        Box::pin(async move {
            match reply {
                MockReply::Content(text) => Ok(text),
                MockReply::RateLimited => Err(CoreError::RateLimited),
                MockReply::ApiError { status, message } => {
                    Err(CoreError::Api { status, message })
                }
            }
        })
    }
}
