//! Typed GraphQL operations used by the contribution pipeline

use super::gateway::Query;
use super::model::Repository;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct LoginVariables {
    pub login: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WindowVariables {
    pub login: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchVariables {
    pub search_query: String,
    pub after: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountVariables {
    pub q: String,
}

/// When the account was created
#[derive(Debug)]
pub struct UserCreatedAt;

#[derive(Debug, Deserialize)]
pub struct UserCreatedAtData {
    pub user: Option<CreatedAtUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedAtUser {
    pub created_at: DateTime<Utc>,
}

impl Query for UserCreatedAt {
    const NAME: &'static str = "user creation date query";
    const DOCUMENT: &'static str = "query($login: String!) { user(login: $login) { createdAt } }";

    type Variables = LoginVariables;
    type Data = UserCreatedAtData;
}

/// Repositories the user committed to within one time window
#[derive(Debug)]
pub struct ContributionsInWindow;

#[derive(Debug, Deserialize)]
pub struct ContributionsData {
    pub user: Option<ContributionsUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsUser {
    pub contributions_collection: ContributionsCollection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsCollection {
    #[serde(default)]
    pub commit_contributions_by_repository: Vec<RepositoryContribution>,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryContribution {
    pub repository: Option<Repository>,
}

impl Query for ContributionsInWindow {
    const NAME: &'static str = "contributions query";
    const DOCUMENT: &'static str = "
        query($login: String!, $from: DateTime!, $to: DateTime!) {
          user(login: $login) {
            contributionsCollection(from: $from, to: $to) {
              commitContributionsByRepository {
                repository {
                  name
                  nameWithOwner
                  url
                  owner { login url avatarUrl __typename }
                }
              }
            }
          }
        }
    ";

    type Variables = WindowVariables;
    type Data = ContributionsData;
}

/// One page of merged pull requests authored by the user
#[derive(Debug)]
pub struct MergedPullRequestSearch;

#[derive(Debug, Deserialize)]
pub struct SearchData {
    pub search: SearchConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConnection {
    pub page_info: PageInfo,
    #[serde(default)]
    pub edges: Vec<SearchEdge>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchEdge {
    pub node: Option<SearchNode>,
}

/// Non pull request nodes come back as empty objects.
#[derive(Debug, Deserialize)]
pub struct SearchNode {
    #[serde(default)]
    pub repository: Option<Repository>,
}

impl Query for MergedPullRequestSearch {
    const NAME: &'static str = "merged pull request search";
    const DOCUMENT: &'static str = "
        query($searchQuery: String!, $after: String) {
          search(query: $searchQuery, type: ISSUE, first: 100, after: $after) {
            pageInfo { hasNextPage endCursor }
            edges {
              node {
                ... on PullRequest {
                  repository {
                    name
                    nameWithOwner
                    url
                    owner { login url avatarUrl __typename }
                  }
                }
              }
            }
          }
        }
    ";

    type Variables = SearchVariables;
    type Data = SearchData;
}

/// Number of issues matching a search, used to count merged pull requests in one repository
#[derive(Debug)]
pub struct MergedPullRequestCount;

#[derive(Debug, Deserialize)]
pub struct CountData {
    pub search: IssueCount,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCount {
    pub issue_count: u64,
}

impl Query for MergedPullRequestCount {
    const NAME: &'static str = "merged pull request count";
    const DOCUMENT: &'static str = "query($q: String!) { search(query: $q, type: ISSUE) { issueCount } }";

    type Variables = CountVariables;
    type Data = CountData;
}

/// Search predicate for merged pull requests authored by `login`
#[must_use]
pub fn merged_prs_by(login: &str) -> String {
    format!("is:pr is:merged author:{login}")
}

/// Search predicate for merged pull requests authored by `login` in one repository
#[must_use]
pub fn merged_prs_in_repo_by(name_with_owner: &str, login: &str) -> String {
    format!("repo:{name_with_owner} {}", merged_prs_by(login))
}
