use super::paged_rest::{RestClient, download_json};
use super::{AccountKind, PrivacyLevel, Provider, ProviderName, Sponsor, Sponsorship};
use crate::Result;
use crate::config::Config;
use chrono::{DateTime, SecondsFormat, Utc};
use core::time::Duration;
use ohno::bail;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const LOG_TARGET: &str = "   crowdin";
const TIER_NAME: &str = "Translator";
const PROFILE_URL: &str = "https://crowdin.com/profile";
const REPORT_NAME: &str = "top-members";

/// Status checks before a report that never finishes is given up on.
const MAX_STATUS_CHECKS: u32 = 30;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Crowdin wraps every response body in a `data` member.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Project {
    created_at: String,
}

#[derive(Debug, Serialize)]
struct ReportRequest<'a> {
    name: &'a str,
    schema: ReportSchema<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportSchema<'a> {
    unit: &'a str,
    format: &'a str,
    date_from: &'a str,
    date_to: &'a str,
}

#[derive(Debug, Deserialize)]
struct ReportStatus {
    identifier: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct DownloadLink {
    url: String,
}

#[derive(Debug, Deserialize)]
struct MemberEntry {
    user: Member,
    translated: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Member {
    username: String,
    avatar_url: String,
    #[serde(default)]
    joined_at: Option<DateTime<Utc>>,
}

/// Weighted records for the translators of one Crowdin project, from its top-members report.
#[derive(Debug, Clone)]
pub struct CrowdinContributorsProvider {
    api_url: String,
    poll_interval: Duration,
}

impl CrowdinContributorsProvider {
    #[must_use]
    pub fn new(api_url: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Wait `interval` between checks of a report that is still being generated.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Provider for CrowdinContributorsProvider {
    fn name(&self) -> ProviderName {
        ProviderName::CrowdinContributors
    }

    async fn fetch_sponsors(&self, config: &Config) -> Result<Vec<Sponsorship>> {
        let section = &config.crowdin_contributors;
        let token = section.token.as_deref().or(config.token.as_deref()).unwrap_or_default();

        if token.is_empty() {
            bail!("Crowdin token is required for the crowdinContributors provider");
        }

        let Some(project_id) = section.project_id else {
            bail!("Crowdin project id is required for the crowdinContributors provider");
        };

        let client = RestClient::new(&self.api_url, AUTHORIZATION, "Bearer ", token)?;
        let report_url = generate_report(&client, project_id, self.poll_interval, Utc::now()).await?;
        let entries: Envelope<Vec<MemberEntry>> = download_json(&report_url).await?;

        log::info!(target: LOG_TARGET, "Report for project {project_id} lists {} member(s)", entries.data.len());

        Ok(into_sponsorships(entries.data, section.min_translations))
    }
}

/// Ask Crowdin for a top-members report covering the project's whole life and wait until it
/// can be downloaded. Returns the pre-signed download URL.
async fn generate_report(client: &RestClient, project_id: u64, poll_interval: Duration, now: DateTime<Utc>) -> Result<String> {
    let project: Envelope<Project> = client.get_json(client.url(&format!("projects/{project_id}"), &[])?).await?;

    let date_to = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    let request = ReportRequest {
        name: REPORT_NAME,
        schema: ReportSchema {
            unit: "words",
            format: "json",
            date_from: &project.data.created_at,
            date_to: &date_to,
        },
    };

    let reports_path = format!("projects/{project_id}/reports");
    let created: Envelope<ReportStatus> = client.post_json(client.url(&reports_path, &[])?, &request).await?;
    let identifier = created.data.identifier;
    let mut status = created.data.status;

    let status_path = format!("{reports_path}/{identifier}");
    let mut checks = 0;
    while status != "finished" {
        if status == "failed" {
            bail!("Crowdin report '{identifier}' for project {project_id} failed");
        }

        checks += 1;
        if checks > MAX_STATUS_CHECKS {
            bail!("Crowdin report '{identifier}' for project {project_id} did not finish after {MAX_STATUS_CHECKS} checks");
        }

        log::debug!(target: LOG_TARGET, "Report '{identifier}' is '{status}', checking again in {poll_interval:?}");
        tokio::time::sleep(poll_interval).await;

        let current: Envelope<ReportStatus> = client.get_json(client.url(&status_path, &[])?).await?;
        status = current.data.status;
    }

    let link: Envelope<DownloadLink> = client.get_json(client.url(&format!("{status_path}/download"), &[])?).await?;
    Ok(link.data.url)
}

#[expect(clippy::cast_precision_loss, reason = "translation thresholds are far below 2^52")]
fn into_sponsorships(entries: Vec<MemberEntry>, min_translations: u64) -> Vec<Sponsorship> {
    let now = Utc::now();
    let min = min_translations as f64;

    entries
        .into_iter()
        .filter(|entry| entry.translated > min)
        .map(|entry| into_sponsorship(entry, now))
        .collect()
}

fn into_sponsorship(entry: MemberEntry, now: DateTime<Utc>) -> Sponsorship {
    let member = entry.user;
    Sponsorship {
        sponsor: Sponsor {
            kind: AccountKind::User,
            link_url: Some(format!("{PROFILE_URL}/{}", member.username)),
            name: member.username.clone(),
            login: member.username,
            avatar_url: member.avatar_url,
            social_logins: BTreeMap::new(),
        },
        is_one_time: false,
        weight: entry.translated,
        privacy_level: PrivacyLevel::Public,
        tier_name: TIER_NAME.to_string(),
        created_at: member.joined_at.unwrap_or(now),
        provider: ProviderName::CrowdinContributors,
        raw: None,
    }
}
