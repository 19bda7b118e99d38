//! Milestone plan files
//!
//! A plan lists the milestones a project wants and which issues belong in
//! each, either by number or by label. It replaces the hand-maintained
//! assignment tables that otherwise end up hard-coded in scripts.
//!
//! ```toml
//! [[milestone]]
//! title = "Landing Page v1"
//! description = "Initial improvements to the landing page"
//! due_on = "2025-07-15"
//! issues = [1, 4, 5, 10]
//!
//! [[milestone.labels]]
//! label = "landing-page"
//! priority = "high-priority"
//! ```

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A parsed plan file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MilestonePlan {
    /// Milestones in the order they should be created
    #[serde(default, rename = "milestone")]
    pub milestones: Vec<PlannedMilestone>,
}

/// A milestone and the issues that belong to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedMilestone {
    /// Milestone title, used to match existing milestones
    pub title: String,
    /// Milestone description
    #[serde(default)]
    pub description: String,
    /// Due date, `YYYY-MM-DD` or RFC 3339
    #[serde(default)]
    pub due_on: Option<String>,
    /// Issue numbers assigned directly
    #[serde(default)]
    pub issues: Vec<u64>,
    /// Label rules; every open issue matching a rule is assigned
    #[serde(default)]
    pub labels: Vec<LabelRule>,
}

/// Select open issues carrying a label, optionally narrowed by a priority label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRule {
    pub label: String,
    #[serde(default)]
    pub priority: Option<String>,
}

impl LabelRule {
    pub fn new(label: impl Into<String>, priority: Option<String>) -> Self {
        Self {
            label: label.into(),
            priority,
        }
    }

    /// The `labels` query value: all listed labels must match
    pub fn query(&self) -> String {
        match &self.priority {
            Some(priority) => format!("{},{}", self.label, priority),
            None => self.label.clone(),
        }
    }
}

impl PlannedMilestone {
    /// Parsed due date, if any
    pub fn due_date(&self) -> Result<Option<DateTime<Utc>>> {
        self.due_on.as_deref().map(parse_due_date).transpose()
    }
}

impl MilestonePlan {
    /// Load and validate a plan file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
            .map_err(|e| Error::Plan(format!("{}: {}", path.display(), e)))
    }

    /// Parse and validate plan text
    pub fn parse(contents: &str) -> Result<Self> {
        let plan: Self = toml::from_str(contents)
            .map_err(|e| Error::Plan(format!("Failed to parse plan: {}", e)))?;
        plan.validate()?;
        Ok(plan)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for milestone in &self.milestones {
            if milestone.title.trim().is_empty() {
                return Err(Error::Plan("Milestone title is required".to_string()));
            }
            if !seen.insert(milestone.title.as_str()) {
                return Err(Error::Plan(format!(
                    "Milestone '{}' is listed more than once",
                    milestone.title
                )));
            }
            milestone.due_date()?;
        }
        Ok(())
    }

    /// Look up a planned milestone by title
    pub fn milestone(&self, title: &str) -> Option<&PlannedMilestone> {
        self.milestones.iter().find(|m| m.title == title)
    }
}

/// Parse a due date
///
/// Accepts `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp.
pub fn parse_due_date(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            Error::Plan(format!(
                "Invalid due date '{}'. Expected YYYY-MM-DD",
                input
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[milestone]]
title = "Landing Page v1"
description = "Initial improvements to the landing page"
due_on = "2025-07-15"
issues = [1, 4, 5, 10]

[[milestone.labels]]
label = "landing-page"
priority = "high-priority"

[[milestone]]
title = "MVP Release"
due_on = "2025-10-01T00:00:00Z"
"#;

    #[test]
    fn test_parse_plan() {
        let plan = MilestonePlan::parse(SAMPLE).unwrap();
        assert_eq!(plan.milestones.len(), 2);

        let landing = plan.milestone("Landing Page v1").unwrap();
        assert_eq!(landing.issues, vec![1, 4, 5, 10]);
        assert_eq!(
            landing.labels,
            vec![LabelRule::new("landing-page", Some("high-priority".to_string()))]
        );

        let mvp = plan.milestone("MVP Release").unwrap();
        assert!(mvp.description.is_empty());
        assert!(mvp.issues.is_empty());
        assert_eq!(
            mvp.due_date().unwrap().unwrap().to_rfc3339(),
            "2025-10-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_label_rule_query() {
        assert_eq!(LabelRule::new("detail-page", None).query(), "detail-page");
        assert_eq!(
            LabelRule::new("landing-page", Some("medium-priority".to_string())).query(),
            "landing-page,medium-priority"
        );
    }

    #[test]
    fn test_duplicate_titles_rejected() {
        let toml = r#"
[[milestone]]
title = "A"

[[milestone]]
title = "A"
"#;
        let err = MilestonePlan::parse(toml).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_invalid_due_date_rejected() {
        let toml = r#"
[[milestone]]
title = "A"
due_on = "next tuesday"
"#;
        assert!(MilestonePlan::parse(toml).is_err());
    }

    #[test]
    fn test_parse_due_date() {
        let date = parse_due_date("2025-07-15").unwrap();
        assert_eq!(date.format("%Y-%m-%dT%H:%M:%SZ").to_string(), "2025-07-15T00:00:00Z");
        assert!(parse_due_date("15/07/2025").is_err());
    }

    #[test]
    fn test_demo_plan_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../demos/milestones.toml");
        let plan = MilestonePlan::load_from_file(&path).unwrap();
        assert_eq!(plan.milestones.len(), 5);
        assert_eq!(
            plan.milestone("MVP Release").unwrap().labels[0].query(),
            "landing-page,medium-priority"
        );
    }

    #[test]
    fn test_empty_plan() {
        let plan = MilestonePlan::parse("").unwrap();
        assert!(plan.milestones.is_empty());
    }
}
