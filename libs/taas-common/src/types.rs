use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Request to generate (and optionally run) a Playwright test from a
/// natural-language instruction.
///
/// Field names are camelCase on the wire to match the frontend contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTestRequest {
    pub instruction: String,
    #[serde(default)]
    pub test_name: Option<String>,
    #[serde(default)]
    pub execute_immediately: bool,
}

/// Outcome of the heuristic checks applied to generated code.
///
/// `is_valid` is false exactly when `errors` is non-empty; warnings are
/// advisory and never block persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// A generated test file written to the store's directory.
///
/// Never mutated after the write; removed only by age-based cleanup or by
/// someone deleting it out from under us.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedTestFile {
    pub file_name: String,
    pub absolute_path: PathBuf,
    pub content: String,
}

/// Listing entry for a persisted test file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestFileInfo {
    pub file_name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
}

/// Aggregate counts from Playwright's JSON reporter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportStats {
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub expected: u32,
    #[serde(default)]
    pub unexpected: u32,
    #[serde(default)]
    pub flaky: u32,
    #[serde(default)]
    pub skipped: u32,
}

/// Playwright JSON reporter output, loosely typed.
///
/// Suites carry deeply nested per-case detail we pass through verbatim;
/// only `stats` is interpreted by this service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaywrightReport {
    #[serde(default)]
    pub stats: Option<ReportStats>,
    #[serde(default)]
    pub suites: Value,
    #[serde(default)]
    pub errors: Value,
}

/// Result of running one persisted test file through the external runner.
///
/// `parsed_report` is present iff stdout was valid reporter JSON; otherwise
/// the raw stdout is still preserved in `stdout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_report: Option<PlaywrightReport>,
    pub test_file: String,
    pub duration_ms: u64,
}

/// Final response for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResponse {
    pub success: bool,
    pub test_file: String,
    pub code: String,
    pub validation: ValidationResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_result: Option<ExecutionResult>,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_result_tracks_errors() {
        let ok = ValidationResult::new(vec![], vec!["slow".to_string()]);
        assert!(ok.is_valid);

        let bad = ValidationResult::new(vec!["missing import".to_string()], vec![]);
        assert!(!bad.is_valid);
    }

    #[test]
    fn request_defaults_execute_to_false() {
        let req: GenerateTestRequest =
            serde_json::from_str(r#"{"instruction": "Go to example.com"}"#).unwrap();
        assert_eq!(req.instruction, "Go to example.com");
        assert!(req.test_name.is_none());
        assert!(!req.execute_immediately);
    }

    #[test]
    fn report_parses_playwright_reporter_shape() {
        let raw = r#"{
            "config": {"rootDir": "/srv"},
            "suites": [{"title": "example.spec.ts", "specs": []}],
            "errors": [],
            "stats": {"startTime": "2025-01-01T00:00:00.000Z", "duration": 1234.5,
                      "expected": 2, "unexpected": 1, "flaky": 0, "skipped": 0}
        }"#;
        let report: PlaywrightReport = serde_json::from_str(raw).unwrap();
        let stats = report.stats.unwrap();
        assert_eq!(stats.expected, 2);
        assert_eq!(stats.unexpected, 1);
        assert!(report.suites.is_array());
    }

    #[test]
    fn report_rejects_non_object_stdout() {
        assert!(serde_json::from_str::<PlaywrightReport>("not json at all").is_err());
        assert!(serde_json::from_str::<PlaywrightReport>("[1, 2, 3]").is_err());
    }

    #[test]
    fn response_omits_execution_when_absent() {
        let resp = PipelineResponse {
            success: true,
            test_file: "tests/example-1.spec.ts".to_string(),
            code: "code".to_string(),
            validation: ValidationResult::new(vec![], vec![]),
            execution_result: None,
            generated_at: Utc::now(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("executionResult").is_none());
        assert!(json.get("testFile").is_some());
    }
}
