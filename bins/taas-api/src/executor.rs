/// Test Executor
///
/// **Responsibility:**
/// Run one persisted test file through the external Playwright runner and
/// turn whatever happens into an `ExecutionResult`.
///
/// **Critical property:**
/// `execute` never returns an error. Spawn failures, non-zero exits, and
/// timeouts all resolve to `success = false` with the cause in `stderr`;
/// captured output is never discarded.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use taas_common::types::{ExecutionResult, PlaywrightReport};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

/// Hard wall-clock bound on one runner invocation.
pub const EXECUTION_TIMEOUT: Duration = Duration::from_secs(60);

/// Invokes the test runner as a subprocess, requesting JSON reporter output.
///
/// The runner is a configurable command so alternate backends (or fakes in
/// tests) can stand in for `npx playwright test`.
#[derive(Debug, Clone)]
pub struct TestExecutor {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl Default for TestExecutor {
    fn default() -> Self {
        Self::with_runner(
            "npx",
            ["playwright".to_string(), "test".to_string()],
            EXECUTION_TIMEOUT,
        )
    }
}

impl TestExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_runner(
        program: impl Into<String>,
        args: impl IntoIterator<Item = String>,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().collect(),
            timeout,
        }
    }

    /// Run the file at `path` and report the outcome.
    ///
    /// On timeout the subprocess is killed (no hung runner survives the
    /// call). On normal exit stdout is parsed as a Playwright JSON report;
    /// unparseable stdout is preserved raw. Stderr is captured in every
    /// branch because the runner warns there even on success.
    pub async fn execute(&self, path: &Path) -> ExecutionResult {
        let test_file = path.display().to_string();
        let start = Instant::now();

        info!(test_file = %test_file, runner = %self.program, "Executing test file");

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .arg("--reporter=json")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                warn!(test_file = %test_file, error = %e, "Failed to spawn test runner");
                return self.failure(
                    test_file,
                    format!("Failed to spawn test runner '{}': {}", self.program, e),
                    start,
                );
            }
        };

        // kill_on_drop tears the child down when the timeout drops the
        // wait_with_output future.
        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!(test_file = %test_file, error = %e, "Test runner I/O failure");
                return self.failure(test_file, format!("Test runner failed: {}", e), start);
            }
            Err(_) => {
                warn!(
                    test_file = %test_file,
                    timeout_s = self.timeout.as_secs(),
                    "Test execution timed out"
                );
                return self.failure(
                    test_file,
                    format!(
                        "Test execution timed out after {} seconds",
                        self.timeout.as_secs()
                    ),
                    start,
                );
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let parsed_report = serde_json::from_str::<PlaywrightReport>(&stdout).ok();
        let success = output.status.success();
        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            test_file = %test_file,
            success,
            duration_ms,
            report_parsed = parsed_report.is_some(),
            "Test execution finished"
        );

        ExecutionResult {
            success,
            stdout,
            stderr,
            parsed_report,
            test_file,
            duration_ms,
        }
    }

    fn failure(&self, test_file: String, cause: String, start: Instant) -> ExecutionResult {
        ExecutionResult {
            success: false,
            stdout: String::new(),
            stderr: cause,
            parsed_report: None,
            test_file,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}
