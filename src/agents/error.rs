use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentErrorKind {
    /// The context window holds too little history to evaluate.
    InsufficientData,
    /// The backing scorer could not be invoked. Distinct from a
    /// low-probability result by contract.
    ModelUnavailable,
    InvalidInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentError {
    pub kind: AgentErrorKind,
    pub message: String,
}

impl AgentError {
    pub fn new(kind: AgentErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AgentError {}

pub fn insufficient_data(message: impl Into<String>) -> AgentError {
    AgentError::new(AgentErrorKind::InsufficientData, message)
}

pub fn model_unavailable(message: impl Into<String>) -> AgentError {
    AgentError::new(AgentErrorKind::ModelUnavailable, message)
}

pub fn invalid_input(message: impl Into<String>) -> AgentError {
    AgentError::new(AgentErrorKind::InvalidInput, message)
}
