use super::paged_rest::RestClient;
use super::{AccountKind, PrivacyLevel, Provider, ProviderName, Sponsor, Sponsorship};
use crate::Result;
use crate::config::Config;
use chrono::{DateTime, Utc};
use ohno::bail;
use reqwest::header::HeaderName;
use serde::Deserialize;
use std::collections::BTreeMap;

const LOG_TARGET: &str = "    gitlab";
const TIER_NAME: &str = "Contributor";
const PRIVATE_TOKEN: &str = "private-token";

/// Commit statistics for one author of a GitLab project. GitLab identifies authors by email only.
#[derive(Debug, Deserialize)]
struct GitlabContributor {
    email: String,
    commits: u64,
}

#[derive(Debug, Deserialize)]
struct GitlabUser {
    username: String,
    avatar_url: String,
    web_url: String,
}

/// Weighted records for everyone who committed to one GitLab project.
#[derive(Debug, Clone)]
pub struct GitlabContributorsProvider {
    api_url: String,
}

impl GitlabContributorsProvider {
    #[must_use]
    pub fn new(api_url: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
        }
    }
}

impl Provider for GitlabContributorsProvider {
    fn name(&self) -> ProviderName {
        ProviderName::GitlabContributors
    }

    async fn fetch_sponsors(&self, config: &Config) -> Result<Vec<Sponsorship>> {
        let section = &config.gitlab_contributors;
        let token = section.token.as_deref().or(config.token.as_deref()).unwrap_or_default();

        let Some(repo_id) = section.repo_id else {
            bail!("GitLab project id is required for the gitlabContributors provider");
        };

        fetch_gitlab_contributors(&self.api_url, token, repo_id, section.min_contributions, Utc::now()).await
    }
}

/// List the committers of project `repo_id` with at least `min_contributions` commits,
/// resolved to GitLab accounts.
///
/// Committers whose email cannot be matched to an account are skipped.
pub async fn fetch_gitlab_contributors(
    api_url: &str,
    token: &str,
    repo_id: u64,
    min_contributions: u64,
    now: DateTime<Utc>,
) -> Result<Vec<Sponsorship>> {
    if token.is_empty() {
        bail!("GitLab token is required for the gitlabContributors provider");
    }

    let client = RestClient::new(api_url, HeaderName::from_static(PRIVATE_TOKEN), "", token)?;
    let contributors: Vec<GitlabContributor> = client
        .get_all_pages(&format!("projects/{repo_id}/repository/contributors"), &[("sort", "desc")])
        .await?;

    log::info!(target: LOG_TARGET, "Fetched {} contributor(s) of project {repo_id}", contributors.len());

    let mut sponsorships = Vec::new();
    for contributor in contributors.into_iter().filter(|c| c.commits >= min_contributions) {
        match find_user(&client, &contributor.email).await {
            Ok(Some(user)) => sponsorships.push(into_sponsorship(user, contributor.commits, now)),
            Ok(None) => log::debug!(target: LOG_TARGET, "No GitLab account matches '{}'", contributor.email),
            Err(e) => log::warn!(target: LOG_TARGET, "Could not fetch user details for '{}': {e:#}", contributor.email),
        }
    }

    Ok(sponsorships)
}

async fn find_user(client: &RestClient, email: &str) -> Result<Option<GitlabUser>> {
    let users: Vec<GitlabUser> = client.get_json(client.url("users", &[("search", email)])?).await?;
    Ok(users.into_iter().next())
}

#[expect(clippy::cast_precision_loss, reason = "commit counts are far below 2^52")]
fn into_sponsorship(user: GitlabUser, commits: u64, now: DateTime<Utc>) -> Sponsorship {
    Sponsorship {
        sponsor: Sponsor {
            kind: AccountKind::User,
            name: user.username.clone(),
            login: user.username,
            avatar_url: user.avatar_url,
            link_url: Some(user.web_url),
            social_logins: BTreeMap::new(),
        },
        is_one_time: false,
        weight: commits as f64,
        privacy_level: PrivacyLevel::Public,
        tier_name: TIER_NAME.to_string(),
        created_at: now,
        provider: ProviderName::GitlabContributors,
        raw: None,
    }
}
