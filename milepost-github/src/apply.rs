//! Bringing a repository in line with a milestone plan
//!
//! Existing milestones are matched by title, missing ones are created, and the
//! plan's issue lists and label rules are then resolved against the real
//! milestone numbers before assignment.

use milepost_core::{MilestonePlan, PlannedMilestone};
use tracing::{debug, info, warn};

use crate::assign::{apply_assignments_with, dedup_assignments, label_assignments};
use crate::{
    Assignment, AssignmentOutcome, AssignmentReport, MilestoneApi, NewMilestone, Result,
    StateFilter,
};

/// Options for applying a plan
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Report what would happen without creating or assigning anything
    pub dry_run: bool,
}

/// How a planned milestone was resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MilestoneResolution {
    /// Already present in the repository
    Existing(u64),
    /// Created by this run
    Created(u64),
    /// Would be created (dry run)
    Pending,
    /// Creation failed
    Failed(String),
}

impl MilestoneResolution {
    pub fn number(&self) -> Option<u64> {
        match self {
            MilestoneResolution::Existing(n) | MilestoneResolution::Created(n) => Some(*n),
            MilestoneResolution::Pending | MilestoneResolution::Failed(_) => None,
        }
    }
}

/// Result of applying a plan
#[derive(Debug, Clone, Default)]
pub struct ApplyResult {
    /// Planned milestone titles with their resolution, in plan order
    pub milestones: Vec<(String, MilestoneResolution)>,
    /// Assignments derived from the plan
    pub planned: Vec<Assignment>,
    /// Outcomes of the assignments (empty on a dry run)
    pub report: AssignmentReport,
    /// Non-fatal errors (failed label lookups)
    pub errors: Vec<String>,
}

impl ApplyResult {
    /// Number of milestone resolutions matching `pred`
    pub fn count(&self, pred: impl Fn(&MilestoneResolution) -> bool) -> usize {
        self.milestones.iter().filter(|(_, r)| pred(r)).count()
    }
}

/// Apply `plan` to the repository behind `api`
///
/// Only listing the existing milestones is fatal; every later failure is
/// recorded in the result and the run continues.
pub async fn apply_plan<A, F>(
    api: &A,
    plan: &MilestonePlan,
    options: &ApplyOptions,
    on_outcome: F,
) -> Result<ApplyResult>
where
    A: MilestoneApi + ?Sized,
    F: FnMut(&AssignmentOutcome),
{
    let mut result = ApplyResult::default();

    let existing = api.list_milestones(StateFilter::All).await?;
    debug!(count = existing.len(), "Existing milestones");

    for planned in &plan.milestones {
        let resolution = match existing.iter().find(|m| m.title == planned.title) {
            Some(found) => {
                info!(title = %planned.title, number = found.number, "Milestone already exists, skipping");
                MilestoneResolution::Existing(found.number)
            }
            None if options.dry_run => {
                info!(title = %planned.title, "[DRY RUN] Would create milestone");
                MilestoneResolution::Pending
            }
            None => create_planned(api, planned).await,
        };
        result.milestones.push((planned.title.clone(), resolution));
    }

    let mut assignments = Vec::new();
    for (planned, (_, resolution)) in plan.milestones.iter().zip(&result.milestones) {
        let Some(number) = resolution.number() else {
            continue;
        };

        assignments.extend(planned.issues.iter().map(|&issue| Assignment::new(issue, number)));

        for rule in &planned.labels {
            match label_assignments(api, rule, number).await {
                Ok(found) => assignments.extend(found),
                Err(e) => {
                    warn!(label = %rule.query(), error = %e, "Failed to list issues for label");
                    result
                        .errors
                        .push(format!("Failed to list issues labelled '{}': {}", rule.query(), e));
                }
            }
        }
    }

    result.planned = dedup_assignments(assignments);

    if options.dry_run {
        info!(count = result.planned.len(), "[DRY RUN] Would apply assignments");
    } else {
        result.report = apply_assignments_with(api, &result.planned, on_outcome).await;
    }

    Ok(result)
}

async fn create_planned<A>(api: &A, planned: &PlannedMilestone) -> MilestoneResolution
where
    A: MilestoneApi + ?Sized,
{
    let new = match NewMilestone::from_planned(planned) {
        Ok(new) => new,
        Err(e) => return MilestoneResolution::Failed(e.to_string()),
    };

    match api.create_milestone(&new).await {
        Ok(created) => MilestoneResolution::Created(created.number),
        Err(e) => {
            warn!(title = %planned.title, error = %e, "Failed to create milestone");
            MilestoneResolution::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{issue, milestone, Call, FakeApi};

    const PLAN: &str = r#"
[[milestone]]
title = "Landing Page v1"
due_on = "2025-07-15"
issues = [1, 4]

[[milestone.labels]]
label = "landing-page"
priority = "high-priority"

[[milestone]]
title = "Activities Page v1"
issues = [12, 13]

[[milestone]]
title = "Booking Flow v1"
issues = [16]
"#;

    fn plan() -> MilestonePlan {
        MilestonePlan::parse(PLAN).unwrap()
    }

    #[tokio::test]
    async fn test_creates_missing_and_uses_server_numbers() {
        let mut api = FakeApi::with_milestones(vec![milestone(7, "Landing Page v1")]);
        api.issues.insert(
            Some("landing-page,high-priority".to_string()),
            vec![issue(4, "Map", None), issue(5, "Navigation", None)],
        );

        let result = apply_plan(&api, &plan(), &ApplyOptions::default(), |_| {})
            .await
            .unwrap();

        assert_eq!(
            result.milestones,
            vec![
                ("Landing Page v1".to_string(), MilestoneResolution::Existing(7)),
                ("Activities Page v1".to_string(), MilestoneResolution::Created(8)),
                ("Booking Flow v1".to_string(), MilestoneResolution::Created(9)),
            ]
        );
        // Duplicate (4, 7) from the label rule is applied once
        assert_eq!(
            api.assignments(),
            vec![(1, 7), (4, 7), (5, 7), (12, 8), (13, 8), (16, 9)]
        );
        assert_eq!(result.report.succeeded(), 6);
        assert_eq!(api.calls()[0], Call::ListMilestones(StateFilter::All));
    }

    #[tokio::test]
    async fn test_failed_creation_skips_its_assignments() {
        let api = FakeApi {
            failing_titles: ["Activities Page v1".to_string()].into_iter().collect(),
            ..Default::default()
        };

        let result = apply_plan(&api, &plan(), &ApplyOptions::default(), |_| {})
            .await
            .unwrap();

        assert!(matches!(
            result.milestones[1].1,
            MilestoneResolution::Failed(_)
        ));
        assert_eq!(api.assignments(), vec![(1, 1), (4, 1), (16, 2)]);
        assert_eq!(result.count(|r| matches!(r, MilestoneResolution::Created(_))), 2);
    }

    #[tokio::test]
    async fn test_dry_run_changes_nothing() {
        let api = FakeApi::with_milestones(vec![milestone(3, "Booking Flow v1")]);
        let options = ApplyOptions { dry_run: true };

        let result = apply_plan(&api, &plan(), &options, |_| {}).await.unwrap();

        assert!(api.assignments().is_empty());
        assert!(!api.calls().iter().any(|c| matches!(c, Call::Create(_))));
        assert_eq!(result.planned, vec![Assignment::new(16, 3)]);
        assert!(result.report.is_empty());
        assert_eq!(result.count(|r| *r == MilestoneResolution::Pending), 2);
    }

    #[tokio::test]
    async fn test_listing_failure_is_fatal() {
        let api = FakeApi {
            fail_listing: true,
            ..Default::default()
        };

        let err = apply_plan(&api, &plan(), &ApplyOptions::default(), |_| {})
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(api.calls().len(), 1);
    }
}
