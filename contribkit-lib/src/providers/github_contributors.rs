use super::paged_rest::RestClient;
use super::{AccountKind, PrivacyLevel, Provider, ProviderName, Sponsor, Sponsorship};
use crate::Result;
use crate::config::Config;
use chrono::{DateTime, Utc};
use ohno::bail;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use std::collections::BTreeMap;

const LOG_TARGET: &str = "    github";
const TIER_NAME: &str = "Contributor";

/// One entry of the GitHub repository contributors listing
#[derive(Debug, Deserialize)]
struct Contributor {
    login: String,
    contributions: u64,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    html_url: Option<String>,
    avatar_url: String,
}

/// Weighted records for everyone who committed to one GitHub repository.
#[derive(Debug, Clone)]
pub struct ContributorsProvider {
    rest_url: String,
}

impl ContributorsProvider {
    #[must_use]
    pub fn new(rest_url: &str) -> Self {
        Self {
            rest_url: rest_url.to_string(),
        }
    }
}

impl Provider for ContributorsProvider {
    fn name(&self) -> ProviderName {
        ProviderName::GithubContributors
    }

    async fn fetch_sponsors(&self, config: &Config) -> Result<Vec<Sponsorship>> {
        let section = &config.github_contributors;
        let token = section.token.as_deref().or(config.token.as_deref()).unwrap_or_default();
        let login = section.login.as_deref().or(config.login.as_deref()).unwrap_or_default();
        let repo = section.repo.as_deref().unwrap_or_default();

        fetch_contributors(&self.rest_url, token, login, repo, section.min_contributions, Utc::now()).await
    }
}

/// List the contributors of `login/repo` with at least `min_contributions` commits.
pub async fn fetch_contributors(
    rest_url: &str,
    token: &str,
    login: &str,
    repo: &str,
    min_contributions: u64,
    now: DateTime<Utc>,
) -> Result<Vec<Sponsorship>> {
    if token.is_empty() {
        bail!("GitHub token is required for the githubContributors provider");
    }

    if login.is_empty() {
        bail!("GitHub login is required for the githubContributors provider");
    }

    if repo.is_empty() {
        bail!("GitHub repository is required for the githubContributors provider");
    }

    let client = RestClient::new(rest_url, AUTHORIZATION, "bearer ", token)?;
    let contributors: Vec<Contributor> = client
        .get_all_pages(&format!("repos/{login}/{repo}/contributors"), &[])
        .await?;

    log::info!(target: LOG_TARGET, "Fetched {} contributor(s) of '{login}/{repo}'", contributors.len());

    Ok(contributors
        .into_iter()
        .filter(|c| c.kind == "User" && c.contributions >= min_contributions)
        .map(|c| into_sponsorship(c, now))
        .collect())
}

#[expect(clippy::cast_precision_loss, reason = "commit counts are far below 2^52")]
fn into_sponsorship(contributor: Contributor, now: DateTime<Utc>) -> Sponsorship {
    Sponsorship {
        sponsor: Sponsor {
            kind: AccountKind::User,
            name: contributor.login.clone(),
            login: contributor.login,
            avatar_url: contributor.avatar_url,
            link_url: contributor.html_url.or(contributor.url),
            social_logins: BTreeMap::new(),
        },
        is_one_time: false,
        weight: contributor.contributions as f64,
        privacy_level: PrivacyLevel::Public,
        tier_name: TIER_NAME.to_string(),
        created_at: now,
        provider: ProviderName::GithubContributors,
        raw: None,
    }
}
