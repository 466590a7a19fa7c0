use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("Invalid parameters: {field} — {reason}")]
    InvalidParameters { field: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PlannerError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        PlannerError::InvalidParameters {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for PlannerError {
    fn from(e: serde_json::Error) -> Self {
        PlannerError::Serialization(e.to_string())
    }
}

/// Conditions a simulation recovers from on its own. They never abort a
/// computation; they end up in the envelope's `warnings` instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Degradation {
    #[error("{context} overflowed decimal range; normalized to 0")]
    NonFiniteNormalized { context: String },

    #[error("{simulation} stopped at the {iterations}-iteration cap; partial result returned")]
    IterationCapReached { simulation: String, iterations: u32 },
}

impl Degradation {
    /// Emit the degradation as a `tracing` event and return its rendered form.
    pub fn report(&self) -> String {
        let message = self.to_string();
        tracing::warn!(degradation = %message, "soft degradation");
        message
    }
}
