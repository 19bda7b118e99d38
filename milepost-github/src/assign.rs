//! Applying issue-to-milestone assignments
//!
//! Every way of choosing assignments (a static table, a label query, an
//! interactive pick) ends in the same [`apply_assignments`] call. Failures
//! are recorded per item and never stop the batch.

use std::fmt;
use std::str::FromStr;

use milepost_core::LabelRule;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{Error, Issue, MilestoneApi, Result};

/// A desired `(issue, milestone)` pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    pub issue: u64,
    pub milestone: u64,
}

impl Assignment {
    pub fn new(issue: u64, milestone: u64) -> Self {
        Self { issue, milestone }
    }

    /// Assign every issue in `issues` to `milestone`
    pub fn all_to(issues: &[&Issue], milestone: u64) -> Vec<Self> {
        issues
            .iter()
            .map(|issue| Self::new(issue.number, milestone))
            .collect()
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} -> milestone #{}", self.issue, self.milestone)
    }
}

impl FromStr for Assignment {
    type Err = Error;

    /// Parse `ISSUE:MILESTONE`, e.g. `12:2`
    fn from_str(s: &str) -> Result<Self> {
        let (issue, milestone) = s
            .split_once(':')
            .ok_or_else(|| Error::Parse(format!("Expected ISSUE:MILESTONE, got '{}'", s)))?;

        let parse = |part: &str| {
            part.trim()
                .trim_start_matches('#')
                .parse::<u64>()
                .map_err(|_| Error::Parse(format!("Invalid number '{}' in '{}'", part, s)))
        };

        Ok(Self::new(parse(issue)?, parse(milestone)?))
    }
}

/// What happened to one assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentOutcome {
    pub assignment: Assignment,
    /// Failure message, `None` on success
    pub error: Option<String>,
}

impl AssignmentOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcomes of a batch, in the order the assignments were given
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentReport {
    pub outcomes: Vec<AssignmentOutcome>,
}

impl AssignmentReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &AssignmentOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Apply assignments one after another
pub async fn apply_assignments<A>(api: &A, assignments: &[Assignment]) -> AssignmentReport
where
    A: MilestoneApi + ?Sized,
{
    apply_assignments_with(api, assignments, |_| {}).await
}

/// Apply assignments, calling `on_outcome` after each request
pub async fn apply_assignments_with<A, F>(
    api: &A,
    assignments: &[Assignment],
    mut on_outcome: F,
) -> AssignmentReport
where
    A: MilestoneApi + ?Sized,
    F: FnMut(&AssignmentOutcome),
{
    let mut report = AssignmentReport::default();

    for &assignment in assignments {
        let outcome = match api
            .set_issue_milestone(assignment.issue, assignment.milestone)
            .await
        {
            Ok(()) => AssignmentOutcome {
                assignment,
                error: None,
            },
            Err(e) => {
                warn!(issue = assignment.issue, milestone = assignment.milestone, error = %e, "Failed to assign issue");
                AssignmentOutcome {
                    assignment,
                    error: Some(e.to_string()),
                }
            }
        };

        on_outcome(&outcome);
        report.outcomes.push(outcome);
    }

    info!(
        succeeded = report.succeeded(),
        failed = report.failed_count(),
        "Applied assignments"
    );

    report
}

/// Assignments for every open issue matching `rule`
pub async fn label_assignments<A>(
    api: &A,
    rule: &LabelRule,
    milestone: u64,
) -> Result<Vec<Assignment>>
where
    A: MilestoneApi + ?Sized,
{
    let query = rule.query();
    let issues = api.list_issues(Some(query.as_str())).await?;
    let refs: Vec<&Issue> = issues.iter().collect();
    Ok(Assignment::all_to(&refs, milestone))
}

/// Issues that are not yet in `milestone`
pub fn not_in_milestone(issues: &[Issue], milestone: u64) -> Vec<&Issue> {
    issues
        .iter()
        .filter(|issue| !issue.in_milestone(milestone))
        .collect()
}

/// Drop repeated pairs, keeping the first occurrence
pub fn dedup_assignments(assignments: Vec<Assignment>) -> Vec<Assignment> {
    let mut seen = std::collections::HashSet::new();
    assignments
        .into_iter()
        .filter(|a| seen.insert(*a))
        .collect()
}
