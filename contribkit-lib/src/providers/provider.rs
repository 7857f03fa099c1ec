use super::Sponsorship;
use super::crowdin_contributors::CrowdinContributorsProvider;
use super::github_contributions::ContributionsProvider;
use super::github_contributors::ContributorsProvider;
use super::gitlab_contributors::GitlabContributorsProvider;
use crate::Result;
use crate::config::Config;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, join_all};
use ohno::{EnrichableExt, bail};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

const LOG_TARGET: &str = " providers";

/// Default GitHub GraphQL endpoint
pub const GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";

/// Default GitHub REST API base
pub const GITHUB_REST_URL: &str = "https://api.github.com";

/// Default GitLab REST API base
pub const GITLAB_API_URL: &str = "https://gitlab.com/api/v4";

/// Default Crowdin REST API base
pub const CROWDIN_API_URL: &str = "https://api.crowdin.com/api/v2";

/// Identifies a data source. The string forms double as the `provider` tag on emitted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ProviderName {
    GithubContributions,
    GithubContributors,
    GitlabContributors,
    CrowdinContributors,
}

/// A source of weighted records.
pub trait Provider: Send + Sync {
    fn name(&self) -> ProviderName;

    fn fetch_sponsors(&self, config: &Config) -> impl Future<Output = Result<Vec<Sponsorship>>> + Send;
}

/// Remote API locations used by the providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub github_graphql: String,
    pub github_rest: String,
    pub gitlab_api: String,
    pub crowdin_api: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            github_graphql: GITHUB_GRAPHQL_URL.to_string(),
            github_rest: GITHUB_REST_URL.to_string(),
            gitlab_api: GITLAB_API_URL.to_string(),
            crowdin_api: CROWDIN_API_URL.to_string(),
        }
    }
}

fn is_set(value: Option<&String>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

/// Pick the providers implied by which settings are present.
#[must_use]
pub fn guess_providers(config: &Config) -> Vec<ProviderName> {
    let mut names = Vec::new();

    if is_set(config.github_contributions.login.as_ref().or(config.login.as_ref())) {
        names.push(ProviderName::GithubContributions);
    }

    let contributors = &config.github_contributors;
    if is_set(contributors.repo.as_ref()) && is_set(contributors.token.as_ref().or(config.token.as_ref())) {
        names.push(ProviderName::GithubContributors);
    }

    let gitlab = &config.gitlab_contributors;
    if gitlab.repo_id.is_some() && is_set(gitlab.token.as_ref().or(config.token.as_ref())) {
        names.push(ProviderName::GitlabContributors);
    }

    // The shared token belongs to GitHub, so only a Crowdin token counts here.
    let crowdin = &config.crowdin_contributors;
    if crowdin.project_id.is_some() && is_set(crowdin.token.as_ref()) {
        names.push(ProviderName::CrowdinContributors);
    }

    names
}

/// Resolve the providers to run: the configured list with duplicates removed, or a guess.
pub fn resolve_providers(config: &Config) -> Result<Vec<ProviderName>> {
    let names = if config.providers.is_empty() {
        guess_providers(config)
    } else {
        let mut unique = Vec::with_capacity(config.providers.len());
        for name in &config.providers {
            if !unique.contains(name) {
                unique.push(*name);
            }
        }
        unique
    };

    if names.is_empty() {
        bail!("no provider is configured; set a login, repository, or project id for at least one provider");
    }

    Ok(names)
}

fn fetch_one<'a>(name: ProviderName, config: &'a Config, endpoints: &'a Endpoints) -> BoxFuture<'a, Result<Vec<Sponsorship>>> {
    match name {
        ProviderName::GithubContributions => async move {
            ContributionsProvider::new(&endpoints.github_graphql).fetch_sponsors(config).await
        }
        .boxed(),
        ProviderName::GithubContributors => async move {
            ContributorsProvider::new(&endpoints.github_rest).fetch_sponsors(config).await
        }
        .boxed(),
        ProviderName::GitlabContributors => async move {
            GitlabContributorsProvider::new(&endpoints.gitlab_api).fetch_sponsors(config).await
        }
        .boxed(),
        ProviderName::CrowdinContributors => async move {
            CrowdinContributorsProvider::new(&endpoints.crowdin_api).fetch_sponsors(config).await
        }
        .boxed(),
    }
}

/// Run every resolved provider concurrently and concatenate their records in provider order.
pub async fn fetch_all(config: &Config, endpoints: &Endpoints) -> Result<Vec<Sponsorship>> {
    let names = resolve_providers(config)?;
    log::info!(target: LOG_TARGET, "Fetching from providers: {}", names.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "));

    let results = join_all(names.iter().map(|&name| fetch_one(name, config, endpoints))).await;

    let mut all = Vec::new();
    for (name, result) in names.iter().zip(results) {
        let sponsorships = result.map_err(|e| e.enrich_with(|| format!("fetching from provider '{name}'")))?;
        log::info!(target: LOG_TARGET, "Provider '{name}' returned {} record(s)", sponsorships.len());
        all.extend(sponsorships);
    }

    Ok(all)
}
