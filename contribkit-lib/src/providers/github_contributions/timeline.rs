//! Repository discovery from the user's contribution timeline.
//!
//! GitHub only answers contribution queries for a bounded window, so the account's lifetime
//! is walked one calendar year (UTC) at a time.

use super::best_effort::or_logged_default;
use super::gateway::{Gateway, GatewayError};
use super::model::Repository;
use super::queries::{ContributionsInWindow, LoginVariables, UserCreatedAt, WindowVariables};
use super::repo_map::RepoMap;
use chrono::{DateTime, Datelike, TimeZone, Utc};

const LOG_TARGET: &str = "  timeline";

/// One query window. `from` and `to` are both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearWindow {
    pub year: i32,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Split `[created, now]` into calendar-year windows.
///
/// The first window starts at `created` and the last ends at `now`; every other boundary
/// falls on Jan 1 00:00:00 or Dec 31 23:59:59 UTC. Returns nothing when `created` is after `now`.
#[must_use]
pub fn year_windows(created: DateTime<Utc>, now: DateTime<Utc>) -> Vec<YearWindow> {
    if created > now {
        return Vec::new();
    }

    (created.year()..=now.year())
        .filter_map(|year| {
            let from = if year == created.year() {
                created
            } else {
                Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()?
            };

            let to = if year == now.year() {
                now
            } else {
                Utc.with_ymd_and_hms(year, 12, 31, 23, 59, 59).single()?
            };

            Some(YearWindow { year, from, to })
        })
        .collect()
}

/// Add every repository the user committed to over the account's lifetime to `repos`.
///
/// A failed creation-date lookup skips this strategy entirely; a failed window is skipped on
/// its own. Neither is reported to the caller.
pub async fn discover(gateway: &Gateway, login: &str, now: DateTime<Utc>, repos: &mut RepoMap) {
    log::info!(target: LOG_TARGET, "Fetching contribution timeline to discover repositories");

    let created = match account_created(gateway, login).await {
        Ok(created) => created,
        Err(e) => {
            log::warn!(target: LOG_TARGET, "Contribution timeline discovery failed: {e:#}");
            return;
        }
    };

    let windows = year_windows(created, now);
    log::info!(target: LOG_TARGET, "Querying contributions across {} year(s)", windows.len());

    for window in &windows {
        let found = or_logged_default(contributions_in(gateway, login, window).await, LOG_TARGET, || {
            format!("Contributions query for {}", window.year)
        });
        repos.extend(found);
    }
}

async fn account_created(gateway: &Gateway, login: &str) -> Result<DateTime<Utc>, GatewayError> {
    let data = gateway
        .execute::<UserCreatedAt>(&LoginVariables { login: login.to_string() })
        .await?;

    data.user
        .map(|user| user.created_at)
        .ok_or_else(|| GatewayError::remote(format!("user '{login}' not found")))
}

async fn contributions_in(gateway: &Gateway, login: &str, window: &YearWindow) -> Result<Vec<Repository>, GatewayError> {
    let data = gateway
        .execute::<ContributionsInWindow>(&WindowVariables {
            login: login.to_string(),
            from: window.from,
            to: window.to,
        })
        .await?;

    let user = data
        .user
        .ok_or_else(|| GatewayError::remote(format!("user '{login}' not found")))?;

    Ok(user
        .contributions_collection
        .commit_contributions_by_repository
        .into_iter()
        .filter_map(|contribution| contribution.repository)
        .filter(|repo| !repo.name_with_owner.is_empty())
        .collect())
}
