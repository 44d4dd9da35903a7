//! Prompt construction for the test-generation model call.
//!
//! [`build_prompt`] is a pure function of its [`PromptInput`]: the same input
//! always yields the same bytes. The output is assembled from blank-line
//! separated sections in a fixed order:
//!
//! 1. instruction line (artifact kind, plus "in BDD style" for Gherkin)
//! 2. the user story, fenced in triple quotes
//! 3. optional `label: value` details and the automation style hint
//! 4. framework-specific notes, when the framework/test type pair has any
//! 5. the closing numbering and code-block instructions

use crate::types::{AutomationStyle, FormatType, Framework, TestType};
use std::fmt::Write as _;

const ROLE_PREAMBLE: &str = "You are a senior QA engineer. Based on the user story below, generate ";

const CLOSING_INSTRUCTIONS: &str = "Instructions:
- Number all manual test cases.
- For automation, include clean, working code for at least 2 key test cases.
- For BDD, follow Given-When-Then format.
- Use best practices for the selected framework.
- Put all code in fenced code blocks labeled with their language.";

const ROBOT_GHERKIN_NOTES: &str = "- Use *** Settings *** and *** Test Cases *** sections.
- Format each test case with Given / When / Then keywords.
- Use keywords like 'Input Text', 'Click Button', and 'Element Should Be Visible'.
- Include setup and teardown if necessary.";

const CYPRESS_GHERKIN_NOTES: &str = "- Use Cucumber-style syntax.
- Provide both .feature file and step definitions in JavaScript.
- Step definitions should use Cypress commands like cy.visit, cy.get, cy.type, etc.";

const PLAYWRIGHT_NOTES: &str = "- Use Playwright's sync Python API.
- Implement setup, actions, and assertions.
- Each test function should correspond to one scenario.";

/// When a notes entry applies, besides its framework matching.
#[derive(Debug, Clone, Copy)]
enum NotesTrigger {
    Gherkin,
    Automated,
}

/// Checked in order; the first matching entry wins.
const FRAMEWORK_NOTES: &[(Framework, NotesTrigger, &str)] = &[
    (Framework::RobotFramework, NotesTrigger::Gherkin, ROBOT_GHERKIN_NOTES),
    (Framework::Cypress, NotesTrigger::Gherkin, CYPRESS_GHERKIN_NOTES),
    (Framework::Playwright, NotesTrigger::Automated, PLAYWRIGHT_NOTES),
];

/// Everything the prompt depends on. Optional strings that are empty are
/// treated the same as absent ones.
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    pub user_story: &'a str,
    pub test_type: TestType,
    pub format_type: FormatType,
    pub framework: Option<Framework>,
    pub style: Option<AutomationStyle>,
    pub expected_result: Option<&'a str>,
    pub severity: Option<&'a str>,
    pub category: Option<&'a str>,
}

impl<'a> PromptInput<'a> {
    pub fn new(user_story: &'a str, test_type: TestType, format_type: FormatType) -> Self {
        Self {
            user_story,
            test_type,
            format_type,
            framework: None,
            style: None,
            expected_result: None,
            severity: None,
            category: None,
        }
    }
}

/// Build the model prompt for one generation request.
///
/// Framework and style are ignored for "Manual Only" requests, so a manual
/// prompt never names an automation framework.
pub fn build_prompt(input: &PromptInput<'_>) -> String {
    let automated = !input.format_type.is_manual_only();
    let framework = input.framework.filter(|_| automated);
    let style = input.style.filter(|_| automated);

    let mut sections: Vec<String> = Vec::with_capacity(5);

    let mut instruction = String::from(ROLE_PREAMBLE);
    instruction.push_str(&artifact_kind(input.format_type, framework));
    if input.test_type == TestType::Gherkin {
        instruction.push_str(" in BDD style");
    }
    instruction.push('.');
    sections.push(instruction);

    sections.push(format!("User Story:\n\"\"\"\n{}\n\"\"\"", input.user_story));

    let mut details = String::new();
    let labeled = [
        ("Expected Result", input.expected_result),
        ("Severity", input.severity),
        ("Test Category", input.category),
    ];
    for (label, value) in labeled {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            let _ = writeln!(details, "{label}: {value}");
        }
    }
    if let Some(style) = style {
        let _ = writeln!(
            details,
            "Use the {style} testing approach in the automation code."
        );
    }
    if !details.is_empty() {
        sections.push(details.trim_end().to_string());
    }

    if let Some(notes) = framework_notes(framework, input.test_type) {
        sections.push(notes.to_string());
    }

    sections.push(CLOSING_INSTRUCTIONS.to_string());

    let mut prompt = sections.join("\n\n");
    prompt.push('\n');
    prompt
}

fn artifact_kind(format_type: FormatType, framework: Option<Framework>) -> String {
    let scripts = match framework {
        Some(fw) => format!("automation test scripts using {fw}"),
        None => "automation test scripts".to_string(),
    };
    match format_type {
        FormatType::ManualOnly => "manual test cases".to_string(),
        FormatType::AutomationOnly => scripts,
        FormatType::Both => format!("manual test cases and {scripts}"),
    }
}

/// `framework` is already `None` for manual-only requests.
fn framework_notes(framework: Option<Framework>, test_type: TestType) -> Option<&'static str> {
    let framework = framework?;
    FRAMEWORK_NOTES
        .iter()
        .find(|(fw, trigger, _)| {
            *fw == framework
                && match trigger {
                    NotesTrigger::Gherkin => test_type == TestType::Gherkin,
                    NotesTrigger::Automated => true,
                }
        })
        .map(|(_, _, notes)| *notes)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn input(format_type: FormatType, framework: Option<Framework>) -> PromptInput<'static> {
        PromptInput {
            framework,
            ..PromptInput::new("User logs in with valid credentials", TestType::Functional, format_type)
        }
    }

    #[test]
    fn manual_functional_prompt_has_no_framework() {
        let prompt = build_prompt(&input(FormatType::ManualOnly, None));
        assert!(prompt.contains("manual test cases"));
        assert!(!prompt.contains("Framework"));
        assert!(!prompt.contains("automation test scripts"));
    }

    #[test]
    fn instruction_phrase_follows_format_mapping() {
        for fw in Framework::all() {
            let auto = build_prompt(&input(FormatType::AutomationOnly, Some(*fw)));
            assert!(auto.contains(&format!("generate automation test scripts using {fw}.")));
            assert!(!auto.contains("manual test cases and"));

            let both = build_prompt(&input(FormatType::Both, Some(*fw)));
            assert!(both.contains(&format!(
                "generate manual test cases and automation test scripts using {fw}."
            )));

            let manual = build_prompt(&input(FormatType::ManualOnly, Some(*fw)));
            assert!(manual.contains("generate manual test cases."));
            assert!(!manual.contains(fw.as_str()), "manual prompt named {fw}");
        }
    }

    #[test]
    fn gherkin_appends_bdd_style() {
        let p = PromptInput::new("story", TestType::Gherkin, FormatType::ManualOnly);
        assert!(build_prompt(&p).contains("generate manual test cases in BDD style."));
    }

    #[test]
    fn cypress_gherkin_gets_cucumber_notes() {
        let p = PromptInput {
            framework: Some(Framework::Cypress),
            ..PromptInput::new("story", TestType::Gherkin, FormatType::AutomationOnly)
        };
        let prompt = build_prompt(&p);
        assert!(prompt.contains("Cucumber-style syntax"));
        assert!(prompt.contains("automation test scripts using Cypress in BDD style."));
    }

    #[test]
    fn robot_notes_require_gherkin() {
        let functional = input(FormatType::AutomationOnly, Some(Framework::RobotFramework));
        assert!(!build_prompt(&functional).contains("*** Settings ***"));

        let gherkin = PromptInput {
            test_type: TestType::Gherkin,
            ..functional
        };
        assert!(build_prompt(&gherkin).contains("*** Settings ***"));
    }

    #[test]
    fn playwright_notes_for_any_automated_format() {
        let p = input(FormatType::Both, Some(Framework::Playwright));
        assert!(build_prompt(&p).contains("Playwright's sync Python API"));
    }

    #[test]
    fn cucumber_has_no_notes() {
        let p = PromptInput {
            test_type: TestType::Gherkin,
            ..input(FormatType::AutomationOnly, Some(Framework::Cucumber))
        };
        let prompt = build_prompt(&p);
        assert!(!prompt.contains("Cucumber-style syntax"));
        assert!(!prompt.contains("*** Settings ***"));
    }

    #[test]
    fn details_are_emitted_in_fixed_order_and_skip_empty() {
        let p = PromptInput {
            expected_result: Some("Dashboard is shown"),
            severity: Some(""),
            category: Some("Smoke"),
            ..input(FormatType::ManualOnly, None)
        };
        let prompt = build_prompt(&p);
        let expected = prompt.find("Expected Result: Dashboard is shown").unwrap();
        let category = prompt.find("Test Category: Smoke").unwrap();
        assert!(expected < category);
        assert!(!prompt.contains("Severity:"));
    }

    #[test]
    fn style_hint_only_for_automation() {
        let automated = PromptInput {
            style: Some(AutomationStyle::PageObjectModel),
            ..input(FormatType::AutomationOnly, Some(Framework::Playwright))
        };
        assert!(build_prompt(&automated)
            .contains("Use the Page Object Model testing approach in the automation code."));

        let manual = PromptInput {
            format_type: FormatType::ManualOnly,
            ..automated
        };
        assert!(!build_prompt(&manual).contains("testing approach"));
    }

    #[test]
    fn story_is_fenced_verbatim() {
        let story = "As a user\n  I want \"quotes\" kept\nso that nothing changes";
        let p = PromptInput::new(story, TestType::Negative, FormatType::ManualOnly);
        let prompt = build_prompt(&p);
        assert!(prompt.contains(&format!("User Story:\n\"\"\"\n{story}\n\"\"\"")));
    }

    #[test]
    fn sections_appear_in_order() {
        let p = PromptInput {
            severity: Some("High"),
            style: Some(AutomationStyle::Bdd),
            ..PromptInput {
                test_type: TestType::Gherkin,
                ..input(FormatType::Both, Some(Framework::RobotFramework))
            }
        };
        let prompt = build_prompt(&p);
        let positions = [
            prompt.find("You are a senior QA engineer").unwrap(),
            prompt.find("User Story:").unwrap(),
            prompt.find("Severity: High").unwrap(),
            prompt.find("Use the BDD testing approach").unwrap(),
            prompt.find("*** Settings ***").unwrap(),
            prompt.find("Instructions:").unwrap(),
        ];
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
    }

    #[test]
    fn prompt_is_deterministic() {
        let p = PromptInput {
            expected_result: Some("ok"),
            style: Some(AutomationStyle::DataDriven),
            ..input(FormatType::Both, Some(Framework::Cypress))
        };
        let first = build_prompt(&p);
        assert_eq!(first, build_prompt(&p));
    }
}
