//! Issue listing and milestone assignment

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::client::{decode, expect_status};
use crate::{Error, GitHubClient, Result};

/// Page size used for issue listings
pub const ISSUES_PER_PAGE: u8 = 100;

/// Milestone an issue currently belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneRef {
    pub number: u64,
    pub title: String,
}

/// GitHub issue representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue number
    pub number: u64,
    /// Issue title
    pub title: String,
    /// Current milestone, if any
    pub milestone: Option<MilestoneRef>,
    /// Label names
    pub labels: Vec<String>,
}

impl Issue {
    /// Whether the issue already sits in `milestone`
    pub fn in_milestone(&self, milestone: u64) -> bool {
        self.milestone.as_ref().is_some_and(|m| m.number == milestone)
    }
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    number: u64,
    title: String,
    #[serde(default)]
    milestone: Option<MilestoneRef>,
    #[serde(default)]
    labels: Vec<RawLabel>,
}

#[derive(Debug, Deserialize)]
struct RawLabel {
    name: String,
}

impl From<RawIssue> for Issue {
    fn from(issue: RawIssue) -> Self {
        Issue {
            number: issue.number,
            title: issue.title,
            milestone: issue.milestone,
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
        }
    }
}

/// Drop pull requests and decode the remaining items
///
/// The issues endpoint also returns pull requests; they are recognised by the
/// presence of a `pull_request` key, whatever its value.
fn issues_from_items(items: Vec<Value>) -> Result<Vec<Issue>> {
    items
        .into_iter()
        .filter(|item| {
            item.as_object()
                .is_some_and(|obj| !obj.contains_key("pull_request"))
        })
        .map(|item| {
            serde_json::from_value::<RawIssue>(item)
                .map(Issue::from)
                .map_err(|e| Error::Parse(format!("Failed to parse issue: {}", e)))
        })
        .collect()
}

impl GitHubClient {
    /// List open issues, optionally filtered by label
    ///
    /// `label` may combine several labels with commas; issues must carry all
    /// of them. Returns at most one page of [`ISSUES_PER_PAGE`] items, pull
    /// requests excluded.
    pub async fn list_issues(&self, label: Option<&str>) -> Result<Vec<Issue>> {
        debug!(?label, "Listing issues");

        let per_page = ISSUES_PER_PAGE.to_string();
        let mut query = vec![("state", "open"), ("per_page", per_page.as_str())];
        if let Some(label) = label {
            query.push(("labels", label));
        }

        let response = self
            .http()
            .get(self.repo_url("/issues"))
            .query(&query)
            .send()
            .await?;
        let response = expect_status(response, StatusCode::OK).await?;
        let items: Vec<Value> = decode(response).await?;
        let issues = issues_from_items(items)?;

        info!(count = issues.len(), "Fetched issues");

        Ok(issues)
    }

    /// Set the milestone of an issue; the server must answer 200
    ///
    /// Repeating the call with the same arguments is harmless.
    pub async fn set_issue_milestone(&self, issue: u64, milestone: u64) -> Result<()> {
        debug!(issue, milestone, "Assigning issue to milestone");

        let response = self
            .http()
            .patch(self.repo_url(&format!("/issues/{}", issue)))
            .json(&json!({ "milestone": milestone }))
            .send()
            .await?;
        expect_status(response, StatusCode::OK).await?;

        info!(issue, milestone, "Assigned issue to milestone");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::client_for;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn issue_json(number: u64, title: &str) -> Value {
        json!({
            "number": number,
            "title": title,
            "state": "open",
            "milestone": null,
            "labels": [{ "name": "landing-page", "color": "ededed" }]
        })
    }

    #[test]
    fn test_pull_requests_are_dropped() {
        let mut pr = issue_json(2, "A pull request");
        pr["pull_request"] = json!({ "url": "https://api.github.com/repos/o/r/pulls/2" });
        let mut null_pr = issue_json(3, "Marker present but null");
        null_pr["pull_request"] = Value::Null;

        let issues =
            issues_from_items(vec![issue_json(1, "Real issue"), pr, null_pr]).unwrap();

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].number, 1);
        assert_eq!(issues[0].labels, vec!["landing-page".to_string()]);
    }

    #[test]
    fn test_issue_milestone_reference() {
        let mut item = issue_json(4, "Has milestone");
        item["milestone"] = json!({ "number": 2, "title": "Activities Page v1", "state": "open" });

        let issues = issues_from_items(vec![item]).unwrap();
        assert_eq!(
            issues[0].milestone,
            Some(MilestoneRef {
                number: 2,
                title: "Activities Page v1".to_string()
            })
        );
        assert!(issues[0].in_milestone(2));
        assert!(!issues[0].in_milestone(3));
    }

    #[tokio::test]
    async fn test_list_issues_requests_one_page_of_open_issues() {
        let server = MockServer::start().await;
        let mut pr = issue_json(9, "PR");
        pr["pull_request"] = json!({});

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/issues"))
            .and(query_param("state", "open"))
            .and(query_param("per_page", "100"))
            .and(query_param("labels", "landing-page,high-priority"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([issue_json(1, "Search"), pr, issue_json(4, "Map")])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let issues = client_for(&server)
            .list_issues(Some("landing-page,high-priority"))
            .await
            .unwrap();

        let numbers: Vec<u64> = issues.iter().map(|i| i.number).collect();
        assert_eq!(numbers, vec![1, 4]);
    }

    #[tokio::test]
    async fn test_list_issues_failure_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/issues"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_issues(None).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_set_issue_milestone_is_repeatable() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/repos/owner/repo/issues/12"))
            .and(body_json(json!({ "milestone": 2 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(issue_json(12, "Grid")))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.set_issue_milestone(12, 2).await.unwrap();
        client.set_issue_milestone(12, 2).await.unwrap();
    }

    #[tokio::test]
    async fn test_set_issue_milestone_failure() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/repos/owner/repo/issues/99"))
            .respond_with(ResponseTemplate::new(422).set_body_string("Validation Failed"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .set_issue_milestone(99, 2)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(422));
        assert!(err.to_string().contains("Validation Failed"));
    }
}
