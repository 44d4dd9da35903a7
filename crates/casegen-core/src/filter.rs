use crate::record::ProjectRecord;
use crate::types::TestType;
use serde::{Deserialize, Serialize};

/// Search predicates over saved records. Absent predicates match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Case-insensitive substring of the title.
    #[serde(default)]
    pub title: Option<String>,
    /// Exact test type.
    #[serde(default)]
    pub test_type: Option<TestType>,
    /// Case-insensitive substring of the output or the title.
    #[serde(default)]
    pub keyword: Option<String>,
}

impl RecordFilter {
    pub fn is_empty(&self) -> bool {
        self.title_needle().is_none() && self.test_type.is_none() && self.keyword_needle().is_none()
    }

    pub fn matches(&self, record: &ProjectRecord) -> bool {
        if let Some(needle) = self.title_needle() {
            if !record.title.to_lowercase().contains(&needle) {
                return false;
            }
        }
        if let Some(test_type) = self.test_type {
            if record.test_type != test_type {
                return false;
            }
        }
        if let Some(needle) = self.keyword_needle() {
            if !record.output.to_lowercase().contains(&needle)
                && !record.title.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }

    /// Records satisfying every supplied predicate, in input order.
    pub fn apply(&self, records: Vec<ProjectRecord>) -> Vec<ProjectRecord> {
        if self.is_empty() {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }

    fn title_needle(&self) -> Option<String> {
        needle(self.title.as_deref())
    }

    fn keyword_needle(&self) -> Option<String> {
        needle(self.keyword.as_deref())
    }
}

/// Blank predicates behave as absent ones.
fn needle(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FormatType;

    fn record(title: &str, test_type: TestType, output: &str) -> ProjectRecord {
        ProjectRecord {
            title: title.to_string(),
            author: "ada".to_string(),
            author_email: "ada@x.io".to_string(),
            timestamp: "2024-05-01_10-00-00".to_string(),
            test_type,
            format_type: FormatType::ManualOnly,
            framework: None,
            style: None,
            expected_result: None,
            severity: None,
            category: None,
            user_story: "story".to_string(),
            output: output.to_string(),
        }
    }

    fn sample() -> Vec<ProjectRecord> {
        vec![
            record("Login Page", TestType::Functional, "1. Enter password"),
            record("Checkout", TestType::Negative, "1. Expired card is rejected"),
            record("Login API", TestType::Gherkin, "Scenario: token refresh"),
        ]
    }

    #[test]
    fn empty_filter_is_identity() {
        let records = sample();
        assert_eq!(RecordFilter::default().apply(records.clone()), records);

        let blank = RecordFilter {
            title: Some("  ".into()),
            test_type: None,
            keyword: Some(String::new()),
        };
        assert!(blank.is_empty());
        assert_eq!(blank.apply(records.clone()), records);
    }

    #[test]
    fn title_is_case_insensitive_substring() {
        let f = RecordFilter {
            title: Some("login".into()),
            ..Default::default()
        };
        let out = f.apply(sample());
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.title.to_lowercase().contains("login")));
    }

    #[test]
    fn test_type_is_exact() {
        let f = RecordFilter {
            test_type: Some(TestType::Negative),
            ..Default::default()
        };
        let out = f.apply(sample());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Checkout");
    }

    #[test]
    fn keyword_searches_output_and_title() {
        let by_output = RecordFilter {
            keyword: Some("EXPIRED".into()),
            ..Default::default()
        };
        assert_eq!(by_output.apply(sample())[0].title, "Checkout");

        let by_title = RecordFilter {
            keyword: Some("api".into()),
            ..Default::default()
        };
        assert_eq!(by_title.apply(sample())[0].title, "Login API");
    }

    #[test]
    fn predicates_combine_with_and() {
        let f = RecordFilter {
            title: Some("login".into()),
            test_type: Some(TestType::Gherkin),
            keyword: Some("token".into()),
        };
        let out = f.apply(sample());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Login API");

        let none = RecordFilter {
            title: Some("login".into()),
            test_type: Some(TestType::Negative),
            keyword: None,
        };
        assert!(none.apply(sample()).is_empty());
    }
}
