use crate::types::ValidationResult;
use thiserror::Error;

/// Failure taxonomy for one pipeline run.
///
/// Lower layers return these typed variants; only the HTTP handlers decide
/// status codes. Execution failures are deliberately NOT here: generation and
/// persistence succeed independently of the run outcome, so a failed run is
/// carried inside the response as an `ExecutionResult` instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Instruction or test name violated the request invariants.
    /// No external or filesystem call was made.
    #[error("{0}")]
    Input(String),

    /// The upstream generator call failed. No file was written.
    #[error("generation failed: {0}")]
    Generation(String),

    /// Generated code failed the heuristic checks. No file was written.
    #[error("generated code failed validation")]
    Validation(ValidationResult),

    /// The store could not write the test file. Fatal to this run.
    #[error("failed to persist test file: {0}")]
    Persistence(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_underlying_cause() {
        let err = PipelineError::Generation("Gemini error 429: quota".to_string());
        assert!(err.to_string().contains("429"));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = PipelineError::Persistence(io);
        assert!(err.to_string().contains("denied"));
    }
}
