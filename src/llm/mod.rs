//! Text generation capability.
//!
//! Everything that produces text (a local model server, a deterministic
//! fallback, a test stub) is consumed through the [`Generate`] trait: an
//! ordered list of [`ChatMessage`]s in, one string out. Engines never look
//! a backend up by name; whoever drives a turn passes one in.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Chat role on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => f.write_str("system"),
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

/// One `{role, content}` pair, serialized in the OpenAI chat shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Content of the last `user` message, or `""` if there is none.
pub fn last_user_content(messages: &[ChatMessage]) -> &str {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .unwrap_or("")
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure raised by a generation backend.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The backend rejected the request or failed internally.
    #[error("backend error: {message}")]
    Backend { message: String },

    /// Transport-level HTTP failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with something that could not be used.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// The blocking bridge into the async client could not start.
    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

impl GenerationError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Generate
// ---------------------------------------------------------------------------

/// Anything that turns a conversation into a reply.
pub trait Generate: Send + Sync {
    /// Produce a reply for `messages`.
    ///
    /// # Arguments
    /// * `messages` - Ordered conversation, system messages included.
    fn generate(&self, messages: &[ChatMessage]) -> Result<String, GenerationError>;
}

impl<F> Generate for F
where
    F: Fn(&[ChatMessage]) -> Result<String, GenerationError> + Send + Sync,
{
    fn generate(&self, messages: &[ChatMessage]) -> Result<String, GenerationError> {
        self(messages)
    }
}
