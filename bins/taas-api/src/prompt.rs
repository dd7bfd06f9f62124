// Prompt construction for the upstream generator.
// Pure function of the instruction: same input, same prompt, byte for byte.

/// Build the generation prompt for a natural-language instruction.
///
/// The instruction is embedded verbatim inside quotes; everything around it
/// is a fixed contract the validator and extractor downstream rely on
/// (Playwright import present, a `test()` declaration, no markdown fencing).
pub fn build_prompt(instruction: &str) -> String {
    format!(
        r#"You are an expert in Playwright test automation. Generate a complete, runnable Playwright test in TypeScript for the following instruction:

"{instruction}"

Requirements:
1. The test must be runnable with `npx playwright test`
2. Use modern async/await syntax
3. Include all necessary imports
4. Add clear comments explaining each step
5. Handle common scenarios like navigation, clicks, form fills, and assertions
6. Include proper error handling and timeouts where appropriate
7. Use realistic selectors and waits for dynamic content
8. Make the test robust against minor page changes

Return ONLY the test code, no markdown fences and no explanation or extra text.

Example structure:
import {{ test, expect }} from '@playwright/test';

test('descriptive test name', async ({{ page }}) => {{
  // test steps here
}});
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_instruction_verbatim_in_quotes() {
        let prompt = build_prompt("Go to example.com and check the title");
        assert!(prompt.contains("\"Go to example.com and check the title\""));
    }

    #[test]
    fn carries_all_eight_requirements() {
        let prompt = build_prompt("anything");
        for n in 1..=8 {
            assert!(
                prompt.contains(&format!("\n{}. ", n)),
                "requirement {} missing",
                n
            );
        }
        assert!(prompt.contains("ONLY the test code"));
    }

    #[test]
    fn shows_expected_import_and_test_shape() {
        let prompt = build_prompt("anything");
        assert!(prompt.contains("import { test, expect } from '@playwright/test';"));
        assert!(prompt.contains("async ({ page })"));
    }

    #[test]
    fn is_deterministic() {
        assert_eq!(build_prompt("same input"), build_prompt("same input"));
    }
}
