//! Usage errors raised while assembling strategies.

/// A caller passed something the strategy machinery cannot accept.
///
/// This mirrors Hypothesis's `InvalidArgument`: it signals a mistake in how
/// strategies were put together, never a property of the generated data, so
/// nothing in this crate retries or recovers from it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct InvalidArgument {
    message: String,
}

impl InvalidArgument {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
