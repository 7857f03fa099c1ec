use super::ProviderName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::Display;

/// Kind of account behind a sponsor or repository owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
pub enum AccountKind {
    User,
    Organization,
}

/// Whether a sponsorship may be shown publicly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrivacyLevel {
    Public,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sponsor {
    #[serde(rename = "type")]
    pub kind: AccountKind,
    pub login: String,
    pub name: String,
    pub avatar_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,

    /// Logins of the same account on other platforms, keyed by platform name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub social_logins: BTreeMap<String, String>,
}

/// A single weighted record emitted by a provider.
///
/// The weight is serialized as `monthlyDollars` so that contribution-based providers
/// and sponsorship-based providers share one output shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sponsorship {
    pub sponsor: Sponsor,
    pub is_one_time: bool,
    #[serde(rename = "monthlyDollars")]
    pub weight: f64,
    pub privacy_level: PrivacyLevel,
    pub tier_name: String,
    pub created_at: DateTime<Utc>,
    pub provider: ProviderName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<RawPayload>,
}

/// Provider-specific data preserved alongside a record for auditing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPayload {
    Contributions(ContributionAudit),
}

/// How a contribution-based weight was derived for one owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionAudit {
    pub owner: AuditOwner,
    pub total_prs: u64,
    pub scaled_prs: f64,
    pub repo_count: usize,
    pub repos: Vec<RepoContribution>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditOwner {
    #[serde(rename = "type")]
    pub kind: AccountKind,
    pub login: String,
    pub url: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoContribution {
    pub name_with_owner: String,
    pub url: String,
    pub merged_prs: u64,
}
