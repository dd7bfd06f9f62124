/// Pipeline Orchestrator - High-Level Sequencing
///
/// **Responsibility:**
/// instruction → prompt → generated text → extracted code → validation gate →
/// persisted file → (optional) execution → structured response.
///
/// This module is the glue layer - it knows nothing about:
/// - How text is generated (ScriptGenerator's job)
/// - How files are named or stored (TestFileStore's job)
/// - How the runner subprocess behaves (TestExecutor's job)
///
/// Fails fast with no partial success reporting: the first failing stage
/// short-circuits, and no file exists for a response that reports failure.
/// The one exception is execution - a failed run is attached to an
/// otherwise-successful response because generation and persistence already
/// succeeded on their own terms.

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use taas_common::error::PipelineError;
use taas_common::types::{GenerateTestRequest, PipelineResponse};
use tracing::{info, warn};
use uuid::Uuid;

use crate::executor::TestExecutor;
use crate::llm::ScriptGenerator;
use crate::store::TestFileStore;
use crate::{extractor, metrics, prompt, validator};

const MIN_INSTRUCTION_CHARS: usize = 10;
const MAX_INSTRUCTION_CHARS: usize = 1000;
const MAX_TEST_NAME_CHARS: usize = 100;

#[derive(Clone)]
pub struct Pipeline {
    generator: Arc<dyn ScriptGenerator>,
    store: TestFileStore,
    executor: TestExecutor,
}

impl Pipeline {
    pub fn new(
        generator: Arc<dyn ScriptGenerator>,
        store: TestFileStore,
        executor: TestExecutor,
    ) -> Self {
        Self {
            generator,
            store,
            executor,
        }
    }

    pub fn store(&self) -> &TestFileStore {
        &self.store
    }

    /// Run one request through the full pipeline.
    pub async fn run(
        &self,
        request: &GenerateTestRequest,
    ) -> Result<PipelineResponse, PipelineError> {
        let request_id = Uuid::new_v4();
        let start = Instant::now();
        metrics::GENERATION_REQUESTS.inc();

        // Step 1: request invariants, before any external call.
        check_request(request)?;

        info!(
            request_id = %request_id,
            instruction_len = request.instruction.len(),
            execute = request.execute_immediately,
            "Pipeline run started"
        );

        // Steps 2-3: deterministic prompt, opaque generation.
        let prompt = prompt::build_prompt(&request.instruction);
        let raw = self.generator.generate(&prompt).await.map_err(|e| {
            metrics::GENERATION_FAILURES.inc();
            warn!(request_id = %request_id, error = %e, "Generator call failed");
            PipelineError::Generation(format!("{e:#}"))
        })?;

        // Step 4: normalize, then gate.
        let code = extractor::extract_code(&raw);
        let validation = validator::validate(&code);
        if !validation.is_valid {
            metrics::GENERATION_FAILURES.inc();
            warn!(
                request_id = %request_id,
                errors = validation.errors.len(),
                "Generated code failed validation"
            );
            return Err(PipelineError::Validation(validation));
        }

        // Step 5: persist. A write failure is fatal to this run.
        let persisted = self
            .store
            .persist(&code, request.test_name.as_deref())
            .await
            .map_err(|e| {
                metrics::GENERATION_FAILURES.inc();
                warn!(request_id = %request_id, error = %e, "Persistence failed");
                PipelineError::Persistence(e)
            })?;

        // Step 6: optional execution, reported but never fatal.
        let execution_result = if request.execute_immediately {
            metrics::EXECUTIONS.inc();
            Some(self.executor.execute(&persisted.absolute_path).await)
        } else {
            None
        };

        info!(
            request_id = %request_id,
            test_file = %persisted.file_name,
            warnings = validation.warnings.len(),
            executed = execution_result.is_some(),
            pipeline_ms = start.elapsed().as_millis() as u64,
            "Pipeline run completed"
        );

        // Step 7: response timestamp captured at build time.
        Ok(PipelineResponse {
            success: true,
            test_file: persisted.absolute_path.display().to_string(),
            code,
            validation,
            execution_result,
            generated_at: Utc::now(),
        })
    }
}

fn check_request(request: &GenerateTestRequest) -> Result<(), PipelineError> {
    let len = request.instruction.chars().count();
    if len < MIN_INSTRUCTION_CHARS {
        return Err(PipelineError::Input(format!(
            "Instruction too short: {len} chars (minimum {MIN_INSTRUCTION_CHARS})"
        )));
    }
    if len > MAX_INSTRUCTION_CHARS {
        return Err(PipelineError::Input(format!(
            "Instruction too long: {len} chars (maximum {MAX_INSTRUCTION_CHARS})"
        )));
    }

    if let Some(name) = &request.test_name {
        let name_len = name.chars().count();
        if name_len > MAX_TEST_NAME_CHARS {
            return Err(PipelineError::Input(format!(
                "Test name too long: {name_len} chars (maximum {MAX_TEST_NAME_CHARS})"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_request(instruction: &str) -> GenerateTestRequest {
        GenerateTestRequest {
            instruction: instruction.to_string(),
            test_name: None,
            execute_immediately: false,
        }
    }

    #[test]
    fn accepts_in_bounds_instruction() {
        assert!(check_request(&make_request("Go to example.com and check")).is_ok());
    }

    #[test]
    fn rejects_short_instruction() {
        let err = check_request(&make_request("too short")).unwrap_err();
        assert!(matches!(err, PipelineError::Input(_)));
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn rejects_overlong_instruction() {
        let err = check_request(&make_request(&"x".repeat(1001))).unwrap_err();
        assert!(err.to_string().contains("too long"));
    }

    #[test]
    fn boundary_lengths_are_accepted() {
        assert!(check_request(&make_request(&"x".repeat(10))).is_ok());
        assert!(check_request(&make_request(&"x".repeat(1000))).is_ok());
    }

    #[test]
    fn rejects_overlong_test_name() {
        let mut request = make_request("Go to example.com and check");
        request.test_name = Some("n".repeat(101));
        let err = check_request(&request).unwrap_err();
        assert!(err.to_string().contains("Test name too long"));
    }
}
