// Normalizes raw generator output into syntactically plausible script text.
// Pure and total: no I/O, no failure path. Validation is the real gate.

use lazy_static::lazy_static;
use regex::Regex;

/// Import line injected when the generator forgot it.
pub const PLAYWRIGHT_IMPORT: &str = "import { test, expect } from '@playwright/test';";

lazy_static! {
    // First fenced block, any declared language tag. Generators ignore the
    // "no markdown" instruction often enough that this stays load-bearing.
    static ref CODE_FENCE: Regex =
        Regex::new(r"(?s)```[a-zA-Z]*[ \t]*\r?\n(.*?)```").expect("fence regex");
}

/// Extract compilable script text from raw generator output.
///
/// Strips a fenced code block if present, trims surrounding whitespace, and
/// prepends the canonical Playwright import when none is referenced.
/// Idempotent: extracting already-extracted code returns it unchanged.
pub fn extract_code(raw: &str) -> String {
    let body = match CODE_FENCE.captures(raw) {
        Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(raw),
        None => raw,
    };

    let code = body.trim();

    let script = if code.contains("@playwright/test") {
        code.to_string()
    } else {
        format!("{PLAYWRIGHT_IMPORT}\n\n{code}")
    };

    // Re-trim so import injection into empty text stays idempotent.
    script.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN_TEST: &str = "import { test, expect } from '@playwright/test';\n\ntest('title', async ({ page }) => {\n  await page.goto('https://example.com');\n});";

    #[test]
    fn passes_clean_code_through_unchanged() {
        assert_eq!(extract_code(CLEAN_TEST), CLEAN_TEST);
    }

    #[test]
    fn strips_typescript_fence() {
        let raw = format!("```typescript\n{CLEAN_TEST}\n```");
        assert_eq!(extract_code(&raw), CLEAN_TEST);
    }

    #[test]
    fn strips_untagged_fence() {
        let raw = format!("```\n{CLEAN_TEST}\n```");
        assert_eq!(extract_code(&raw), CLEAN_TEST);
    }

    #[test]
    fn strips_fence_with_surrounding_prose() {
        let raw = format!("Here is your test:\n```ts\n{CLEAN_TEST}\n```\nLet me know!");
        assert_eq!(extract_code(&raw), CLEAN_TEST);
    }

    #[test]
    fn trims_whitespace() {
        let raw = format!("\n\n  {CLEAN_TEST}\n\n");
        assert_eq!(extract_code(&raw), CLEAN_TEST);
    }

    #[test]
    fn injects_import_when_missing() {
        let extracted = extract_code("test('x', async ({ page }) => {});");
        assert!(extracted.starts_with(PLAYWRIGHT_IMPORT));
        assert!(extracted.contains("test('x'"));
    }

    #[test]
    fn does_not_duplicate_existing_import() {
        let extracted = extract_code(CLEAN_TEST);
        assert_eq!(extracted.matches("@playwright/test").count(), 1);
    }

    #[test]
    fn injects_import_into_non_code_text() {
        let extracted = extract_code("not code");
        assert_eq!(extracted, format!("{PLAYWRIGHT_IMPORT}\n\nnot code"));
    }

    #[test]
    fn extraction_is_idempotent() {
        for raw in [
            CLEAN_TEST.to_string(),
            format!("```typescript\n{CLEAN_TEST}\n```"),
            "not code".to_string(),
            "".to_string(),
        ] {
            let once = extract_code(&raw);
            assert_eq!(extract_code(&once), once, "not idempotent for {raw:?}");
        }
    }
}
