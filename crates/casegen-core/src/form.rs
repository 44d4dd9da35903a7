use crate::error::{CasegenError, Result};
use crate::prompt::PromptInput;
use crate::record::ProjectRecord;
use crate::types::{AutomationStyle, FormatType, Framework, TestType};
use serde::{Deserialize, Serialize};

pub const REQUIRED_FIELDS_MESSAGE: &str = "Please complete all required fields.";

/// Raw values of the generation form, as submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub user_story: String,
    #[serde(default)]
    pub test_type: String,
    #[serde(default)]
    pub format_type: String,
    #[serde(default)]
    pub framework: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub expected_result: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// A form that passed validation. Automation fields are only present when
/// the output format includes automation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedForm {
    pub title: String,
    pub author: String,
    pub user_story: String,
    pub test_type: TestType,
    pub format_type: FormatType,
    pub framework: Option<Framework>,
    pub style: Option<AutomationStyle>,
    pub expected_result: Option<String>,
    pub severity: Option<String>,
    pub category: Option<String>,
}

impl GenerateForm {
    /// Check required fields and parse the option values. Runs before any
    /// external call is made.
    pub fn validate(&self) -> Result<ValidatedForm> {
        if [&self.title, &self.author, &self.user_story]
            .iter()
            .any(|v| v.trim().is_empty())
        {
            return Err(CasegenError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()));
        }
        let (test_type, format_type) = self.parse_kinds()?;

        let (framework, style) = if format_type.is_manual_only() {
            (None, None)
        } else {
            let framework = present(&self.framework)
                .map(str::parse::<Framework>)
                .transpose()?
                .ok_or_else(|| {
                    CasegenError::Validation(format!(
                        "Choose an automation framework for '{format_type}' output."
                    ))
                })?;
            let style = present(&self.style)
                .map(str::parse::<AutomationStyle>)
                .transpose()?;
            (Some(framework), style)
        };

        Ok(ValidatedForm {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            user_story: self.user_story.clone(),
            test_type,
            format_type,
            framework,
            style,
            expected_result: present(&self.expected_result).map(str::to_string),
            severity: present(&self.severity).map(str::to_string),
            category: present(&self.category).map(str::to_string),
        })
    }

    /// Validation for prompt previews, where title and author are not needed.
    pub fn validate_for_prompt(&self) -> Result<ValidatedForm> {
        let mut form = self.clone();
        if form.title.trim().is_empty() {
            form.title = "preview".to_string();
        }
        if form.author.trim().is_empty() {
            form.author = "preview".to_string();
        }
        form.validate()
    }

    fn parse_kinds(&self) -> Result<(TestType, FormatType)> {
        let test_type = if self.test_type.trim().is_empty() {
            TestType::Functional
        } else {
            self.test_type.parse()?
        };
        let format_type = if self.format_type.trim().is_empty() {
            FormatType::ManualOnly
        } else {
            self.format_type.parse()?
        };
        Ok((test_type, format_type))
    }
}

impl ValidatedForm {
    pub fn prompt_input(&self) -> PromptInput<'_> {
        PromptInput {
            user_story: &self.user_story,
            test_type: self.test_type,
            format_type: self.format_type,
            framework: self.framework,
            style: self.style,
            expected_result: self.expected_result.as_deref(),
            severity: self.severity.as_deref(),
            category: self.category.as_deref(),
        }
    }

    pub fn into_record(
        self,
        author_email: impl Into<String>,
        timestamp: impl Into<String>,
        output: impl Into<String>,
    ) -> ProjectRecord {
        ProjectRecord {
            title: self.title,
            author: self.author,
            author_email: author_email.into(),
            timestamp: timestamp.into(),
            test_type: self.test_type,
            format_type: self.format_type,
            framework: self.framework,
            style: self.style,
            expected_result: self.expected_result,
            severity: self.severity,
            category: self.category,
            user_story: self.user_story,
            output: output.into(),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> GenerateForm {
        GenerateForm {
            title: "Login".into(),
            author: "Ada".into(),
            user_story: "User logs in with valid credentials".into(),
            test_type: "Functional".into(),
            format_type: "Manual Only".into(),
            ..Default::default()
        }
    }

    #[test]
    fn blank_required_fields_fail_validation() {
        for blank in ["title", "author", "user_story"] {
            let mut f = form();
            match blank {
                "title" => f.title = "  ".into(),
                "author" => f.author = String::new(),
                _ => f.user_story = "\n".into(),
            }
            let err = f.validate().unwrap_err();
            assert!(
                matches!(&err, CasegenError::Validation(m) if m == REQUIRED_FIELDS_MESSAGE),
                "{blank}: {err}"
            );
        }
    }

    #[test]
    fn manual_only_drops_framework_and_style() {
        let f = GenerateForm {
            framework: Some("Cypress".into()),
            style: Some("BDD".into()),
            ..form()
        };
        let v = f.validate().unwrap();
        assert_eq!(v.framework, None);
        assert_eq!(v.style, None);
    }

    #[test]
    fn automation_requires_framework() {
        let f = GenerateForm {
            format_type: "Automation Only".into(),
            framework: Some(" ".into()),
            ..form()
        };
        assert!(matches!(f.validate(), Err(CasegenError::Validation(_))));

        let ok = GenerateForm {
            framework: Some("Playwright".into()),
            style: Some("Page Object Model".into()),
            ..f
        }
        .validate()
        .unwrap();
        assert_eq!(ok.framework, Some(Framework::Playwright));
        assert_eq!(ok.style, Some(AutomationStyle::PageObjectModel));
    }

    #[test]
    fn unknown_option_values_are_rejected() {
        let f = GenerateForm {
            test_type: "Exploratory".into(),
            ..form()
        };
        assert!(matches!(f.validate(), Err(CasegenError::InvalidTestType(_))));
    }

    #[test]
    fn blank_optionals_become_none() {
        let f = GenerateForm {
            expected_result: Some(String::new()),
            severity: Some("High".into()),
            category: None,
            ..form()
        };
        let v = f.validate().unwrap();
        assert_eq!(v.expected_result, None);
        assert_eq!(v.severity.as_deref(), Some("High"));
    }

    #[test]
    fn into_record_carries_every_field() {
        let v = GenerateForm {
            format_type: "Both".into(),
            framework: Some("Robot Framework".into()),
            expected_result: Some("Dashboard".into()),
            ..form()
        }
        .validate()
        .unwrap();
        let r = v.into_record("ada@x.io", "2024-05-01_10-00-00", "1. Do it");
        assert_eq!(r.author_email, "ada@x.io");
        assert_eq!(r.format_type, FormatType::Both);
        assert_eq!(r.framework, Some(Framework::RobotFramework));
        assert_eq!(r.expected_result.as_deref(), Some("Dashboard"));
        assert_eq!(r.output, "1. Do it");
    }

    #[test]
    fn prompt_preview_needs_only_the_story() {
        let f = GenerateForm {
            title: String::new(),
            author: String::new(),
            ..form()
        };
        assert!(f.validate().is_err());
        let v = f.validate_for_prompt().unwrap();
        assert!(crate::prompt::build_prompt(&v.prompt_input()).contains("manual test cases"));
    }
}
