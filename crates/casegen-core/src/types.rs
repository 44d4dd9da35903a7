use crate::error::CasegenError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed options offered by the severity selector.
pub const SEVERITIES: &[&str] = &["Low", "Medium", "High", "Critical"];

/// Fixed options offered by the test category selector.
pub const CATEGORIES: &[&str] = &["Regression", "Smoke", "Integration", "System", "Exploratory"];

/// Lowercase, collapse punctuation and whitespace into single dashes.
/// `"BDD (Gherkin)"` becomes `"bdd-gherkin"`.
fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

// ---------------------------------------------------------------------------
// TestType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestType {
    Functional,
    Negative,
    #[serde(rename = "BDD (Gherkin)")]
    Gherkin,
}

impl TestType {
    pub fn all() -> &'static [TestType] {
        &[TestType::Functional, TestType::Negative, TestType::Gherkin]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TestType::Functional => "Functional",
            TestType::Negative => "Negative",
            TestType::Gherkin => "BDD (Gherkin)",
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TestType {
    type Err = CasegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "functional" => Ok(TestType::Functional),
            "negative" => Ok(TestType::Negative),
            "bdd-gherkin" | "bdd" | "gherkin" => Ok(TestType::Gherkin),
            _ => Err(CasegenError::InvalidTestType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// FormatType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatType {
    #[serde(rename = "Manual Only")]
    ManualOnly,
    #[serde(rename = "Automation Only")]
    AutomationOnly,
    Both,
}

impl FormatType {
    pub fn all() -> &'static [FormatType] {
        &[
            FormatType::ManualOnly,
            FormatType::AutomationOnly,
            FormatType::Both,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FormatType::ManualOnly => "Manual Only",
            FormatType::AutomationOnly => "Automation Only",
            FormatType::Both => "Both",
        }
    }

    pub fn is_manual_only(self) -> bool {
        self == FormatType::ManualOnly
    }
}

impl fmt::Display for FormatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FormatType {
    type Err = CasegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "manual-only" | "manual" => Ok(FormatType::ManualOnly),
            "automation-only" | "automation" => Ok(FormatType::AutomationOnly),
            "both" => Ok(FormatType::Both),
            _ => Err(CasegenError::InvalidFormatType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Framework
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Framework {
    #[serde(rename = "Robot Framework")]
    RobotFramework,
    Cypress,
    Cucumber,
    Playwright,
}

impl Framework {
    pub fn all() -> &'static [Framework] {
        &[
            Framework::RobotFramework,
            Framework::Cypress,
            Framework::Cucumber,
            Framework::Playwright,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Framework::RobotFramework => "Robot Framework",
            Framework::Cypress => "Cypress",
            Framework::Cucumber => "Cucumber",
            Framework::Playwright => "Playwright",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Framework {
    type Err = CasegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "robot-framework" | "robot" => Ok(Framework::RobotFramework),
            "cypress" => Ok(Framework::Cypress),
            "cucumber" => Ok(Framework::Cucumber),
            "playwright" => Ok(Framework::Playwright),
            _ => Err(CasegenError::InvalidFramework(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// AutomationStyle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AutomationStyle {
    #[serde(rename = "BDD")]
    Bdd,
    #[serde(rename = "Data-Driven")]
    DataDriven,
    #[serde(rename = "Page Object Model")]
    PageObjectModel,
    #[serde(rename = "Keyword-Driven")]
    KeywordDriven,
}

impl AutomationStyle {
    pub fn all() -> &'static [AutomationStyle] {
        &[
            AutomationStyle::Bdd,
            AutomationStyle::DataDriven,
            AutomationStyle::PageObjectModel,
            AutomationStyle::KeywordDriven,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AutomationStyle::Bdd => "BDD",
            AutomationStyle::DataDriven => "Data-Driven",
            AutomationStyle::PageObjectModel => "Page Object Model",
            AutomationStyle::KeywordDriven => "Keyword-Driven",
        }
    }
}

impl fmt::Display for AutomationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AutomationStyle {
    type Err = CasegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "bdd" => Ok(AutomationStyle::Bdd),
            "data-driven" => Ok(AutomationStyle::DataDriven),
            "page-object-model" | "pom" => Ok(AutomationStyle::PageObjectModel),
            "keyword-driven" => Ok(AutomationStyle::KeywordDriven),
            _ => Err(CasegenError::InvalidStyle(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
