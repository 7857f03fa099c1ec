//! Weighted records from the pull requests a user got merged, grouped by repository owner.
//!
//! Repositories are discovered two ways, the contribution timeline and the merged pull request
//! search, and merged into one [`RepoMap`](repo_map::RepoMap). Each repository is then measured
//! with an exact merged pull request count, counts are summed per owning account, and the totals
//! are scaled into record weights.
//!
//! Only a missing login or token stops the pipeline. Every remote failure after that point is
//! logged and degrades to an empty or zero result.

mod aggregate;
mod best_effort;
mod gateway;
mod measure;
mod model;
mod queries;
mod repo_map;
mod scaling;
mod search;
mod timeline;

pub use gateway::{Gateway, GatewayError, RemoteError};
pub use scaling::Scaling;
pub use timeline::{YearWindow, year_windows};

use super::{Provider, ProviderName, Sponsorship};
use crate::Result;
use crate::config::Config;
use chrono::{DateTime, Utc};
use ohno::bail;
use repo_map::RepoMap;

const LOG_TARGET: &str = "   contrib";

/// Tuning knobs for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContributionOptions {
    pub scaling: Scaling,

    /// Upper bound on pages read from the merged pull request search
    pub max_search_pages: usize,

    /// Number of per-repository counts requested concurrently
    pub batch_size: usize,
}

impl Default for ContributionOptions {
    fn default() -> Self {
        Self {
            scaling: Scaling::default(),
            max_search_pages: 10,
            batch_size: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContributionsProvider {
    graphql_url: String,
}

impl ContributionsProvider {
    #[must_use]
    pub fn new(graphql_url: &str) -> Self {
        Self {
            graphql_url: graphql_url.to_string(),
        }
    }
}

impl Provider for ContributionsProvider {
    fn name(&self) -> ProviderName {
        ProviderName::GithubContributions
    }

    async fn fetch_sponsors(&self, config: &Config) -> Result<Vec<Sponsorship>> {
        let section = &config.github_contributions;
        let login = section.login.as_deref().or(config.login.as_deref()).unwrap_or_default();
        let token = section.token.as_deref().or(config.token.as_deref()).unwrap_or_default();

        let options = ContributionOptions {
            scaling: Scaling {
                max: section.max_contributions,
                logarithmic: section.logarithmic_scaling,
            },
            max_search_pages: section.max_search_pages,
            batch_size: section.batch_size,
        };

        fetch_contributions(&self.graphql_url, token, login, options, Utc::now()).await
    }
}

/// Run the full discovery, measurement, aggregation, and scaling pipeline for `login`.
///
/// `now` closes the last timeline window and stamps every emitted record.
pub async fn fetch_contributions(
    graphql_url: &str,
    token: &str,
    login: &str,
    options: ContributionOptions,
    now: DateTime<Utc>,
) -> Result<Vec<Sponsorship>> {
    if login.is_empty() {
        bail!("GitHub login is required for the githubContributions provider");
    }

    if token.is_empty() {
        bail!("GitHub token is required for the githubContributions provider");
    }

    let gateway = Gateway::new(token, graphql_url)?;
    log::info!(target: LOG_TARGET, "Fetching merged pull request contributions for '{login}'");

    let mut repos = RepoMap::new();

    timeline::discover(&gateway, login, now, &mut repos).await;
    log::info!(target: LOG_TARGET, "Found {} repositories from the contribution timeline", repos.len());

    let before_search = repos.len();
    search::discover(&gateway, login, options.max_search_pages, &mut repos).await;
    log::info!(
        target: LOG_TARGET,
        "Found {} additional repositories from the merged pull request search ({} total)",
        repos.len() - before_search,
        repos.len()
    );

    let measured = measure::measure(&gateway, repos.repositories(), login, options.batch_size).await;

    let aggregates = aggregate::aggregate_by_owner(measured);
    log::info!(target: LOG_TARGET, "Aggregated contributions into {} owner(s)", aggregates.len());
    aggregate::log_consolidated_owners(&aggregates);

    if let Some(description) = options.scaling.describe() {
        log::info!(target: LOG_TARGET, "Applying {description}");
    }

    Ok(scaling::project(aggregates, options.scaling, now))
}
