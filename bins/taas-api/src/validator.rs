// Structural heuristics over generated script text.
// Substring checks, not a parser: false positives and negatives are an
// accepted tradeoff for a synchronous, I/O-free gate.

use taas_common::types::ValidationResult;

pub const ERR_MISSING_IMPORT: &str = "Missing required Playwright import";
pub const ERR_MISSING_TEST_FN: &str = "Missing test function definition";

const WARN_NO_AWAIT: &str =
    "No await usage found; page interactions may race the browser";
const WARN_FIXED_DELAY: &str =
    "setTimeout used without a waitFor; prefer polling waits over fixed delays";

/// Validate generated script text.
///
/// Errors block persistence; warnings ride along in the response.
/// Pure function of the input: identical text always yields an identical
/// result.
pub fn validate(code: &str) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if !code.contains("@playwright/test") {
        errors.push(ERR_MISSING_IMPORT.to_string());
    }

    if !code.contains("test(") {
        errors.push(ERR_MISSING_TEST_FN.to_string());
    }

    if !code.contains("await ") {
        warnings.push(WARN_NO_AWAIT.to_string());
    }

    if code.contains("setTimeout") && !code.contains("waitFor") {
        warnings.push(WARN_FIXED_DELAY.to_string());
    }

    ValidationResult::new(errors, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "import { test, expect } from '@playwright/test';\n\ntest('title check', async ({ page }) => {\n  await page.goto('https://example.com');\n  await expect(page).toHaveTitle(/Example/);\n});";

    #[test]
    fn accepts_well_formed_test() {
        let result = validate(VALID);
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn flags_missing_import() {
        let result = validate("test('x', async ({ page }) => { await page.goto('/'); });");
        assert!(!result.is_valid);
        assert!(result.errors.contains(&ERR_MISSING_IMPORT.to_string()));
    }

    #[test]
    fn flags_missing_test_declaration() {
        let result =
            validate("import { test, expect } from '@playwright/test';\nconst x = 1;");
        assert!(!result.is_valid);
        assert!(result.errors.contains(&ERR_MISSING_TEST_FN.to_string()));
    }

    #[test]
    fn collects_both_errors_in_order() {
        let result = validate("not code");
        assert_eq!(
            result.errors,
            vec![ERR_MISSING_IMPORT.to_string(), ERR_MISSING_TEST_FN.to_string()]
        );
    }

    #[test]
    fn warns_on_missing_await_without_failing() {
        let code = "import { test } from '@playwright/test';\ntest('sync', () => {});";
        let result = validate(code);
        assert!(result.is_valid);
        assert_eq!(result.warnings, vec![WARN_NO_AWAIT.to_string()]);
    }

    #[test]
    fn warns_on_settimeout_without_waitfor() {
        let code = format!("{VALID}\nsetTimeout(() => {{}}, 5000);");
        let result = validate(&code);
        assert!(result.is_valid);
        assert!(result.warnings.iter().any(|w| w.contains("setTimeout")));
    }

    #[test]
    fn settimeout_with_waitfor_is_clean() {
        let code = format!(
            "{VALID}\nawait page.waitForSelector('#done');\nsetTimeout(() => {{}}, 100);"
        );
        let result = validate(&code);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn validation_is_deterministic() {
        for code in [VALID, "not code", ""] {
            assert_eq!(validate(code), validate(code));
        }
    }
}
