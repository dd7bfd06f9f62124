/// Test File Store
///
/// **Responsibility:**
/// Sole owner of the generated-tests directory: deterministic naming,
/// persistence, enumeration, and age-based cleanup.
///
/// **Naming scheme:**
/// `<fragment>-<epochMillis>.spec.ts`, where the fragment is the requested
/// name sanitized to `[a-z0-9_-]`. The millisecond suffix is the only
/// uniqueness mechanism; two persists of the same fragment inside one
/// millisecond can collide (accepted risk, see DESIGN.md).

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use taas_common::types::PersistedTestFile;
use tokio::fs;
use tracing::{debug, warn};

/// Extension the store recognizes as its own files.
pub const SPEC_EXTENSION: &str = ".spec.ts";

const DEFAULT_FRAGMENT: &str = "generated-test";

#[derive(Debug, Clone)]
pub struct TestFileStore {
    dir: PathBuf,
}

impl TestFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write generated code to a new, uniquely named test file.
    ///
    /// A documentation header (test name, creation timestamp, run hint) is
    /// prepended to the code body. The directory is re-created if missing so
    /// an external `rm -rf` between calls self-heals.
    pub async fn persist(
        &self,
        code: &str,
        requested_name: Option<&str>,
    ) -> std::io::Result<PersistedTestFile> {
        let fragment = sanitize_name(requested_name.unwrap_or_default());
        let created_at = Utc::now();
        let file_name = format!(
            "{fragment}-{millis}{SPEC_EXTENSION}",
            millis = created_at.timestamp_millis()
        );

        let display_name = match requested_name {
            Some(name) if !name.trim().is_empty() => name.trim(),
            _ => DEFAULT_FRAGMENT,
        };
        let header = build_header(display_name, &created_at.to_rfc3339(), &file_name);
        let content = format!("{header}\n{code}\n");

        // Lazily-repeated precondition, not a one-time initializer.
        fs::create_dir_all(&self.dir).await?;

        let path = self.dir.join(&file_name);
        fs::write(&path, &content).await?;

        let absolute_path = fs::canonicalize(&path).await.unwrap_or(path);

        debug!(file = %file_name, bytes = content.len(), "Persisted test file");

        Ok(PersistedTestFile {
            file_name,
            absolute_path,
            content,
        })
    }

    /// Enumerate recognized test files.
    ///
    /// Filesystem enumeration order; callers must not assume sorting.
    /// A missing directory is an empty store, not an error.
    pub async fn list(&self) -> std::io::Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(SPEC_EXTENSION) {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Delete recognized files whose mtime is older than `max_age_ms`.
    ///
    /// Best-effort: individual file errors are logged and skipped, and the
    /// sweep itself never surfaces an error to the caller. Returns the number
    /// of files deleted.
    pub async fn cleanup(&self, max_age_ms: u64) -> usize {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(_) => return 0,
        };

        let now = SystemTime::now();
        let mut deleted = 0;

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Cleanup could not read directory entry");
                    break;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(SPEC_EXTENSION) {
                continue;
            }

            let modified = match entry.metadata().await.and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) => {
                    warn!(file = %name, error = %e, "Cleanup could not stat file");
                    continue;
                }
            };

            let age_ms = now
                .duration_since(modified)
                .map(|age| age.as_millis())
                .unwrap_or(0);

            if age_ms >= u128::from(max_age_ms) {
                match fs::remove_file(entry.path()).await {
                    Ok(()) => {
                        debug!(file = %name, age_ms = age_ms as u64, "Cleaned up test file");
                        deleted += 1;
                    }
                    Err(e) => warn!(file = %name, error = %e, "Cleanup failed to delete file"),
                }
            }
        }

        deleted
    }
}

/// Reduce a requested name to an identifier-safe, case-folded fragment.
/// Empty (or fully stripped) input falls back to the default fragment.
pub fn sanitize_name(name: &str) -> String {
    let fragment: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();

    if fragment.is_empty() {
        DEFAULT_FRAGMENT.to_string()
    } else {
        fragment
    }
}

fn build_header(test_name: &str, created_at: &str, file_name: &str) -> String {
    format!(
        "/**\n * Test: {test_name}\n * Generated: {created_at}\n * Run with: npx playwright test {file_name}\n */\n"
    )
}
