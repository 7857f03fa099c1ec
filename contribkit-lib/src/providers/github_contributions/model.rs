use crate::providers::AccountKind;
use serde::{Deserialize, Serialize};

/// The account that owns a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub login: String,
    pub url: String,
    pub avatar_url: String,
    #[serde(rename = "__typename")]
    pub kind: AccountKind,
}

impl Owner {
    /// Owners are told apart by kind and login together.
    #[must_use]
    pub fn key(&self) -> OwnerKey<'_> {
        OwnerKey {
            kind: self.kind,
            login: &self.login,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerKey<'a> {
    pub kind: AccountKind,
    pub login: &'a str,
}

/// A repository found by one of the discovery strategies.
///
/// `name_with_owner` (`"<owner>/<name>"`) is the identity key, kept exactly as the API returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub name_with_owner: String,
    pub url: String,
    pub owner: Owner,
}

/// A repository annotated with the number of merged pull requests the user authored there
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasuredRepository<'a> {
    pub repository: &'a Repository,
    pub merged_prs: u64,
}

#[cfg(test)]
pub(super) fn repo(name_with_owner: &str, kind: AccountKind) -> Repository {
    let (owner, name) = name_with_owner.split_once('/').unwrap_or((name_with_owner, name_with_owner));
    Repository {
        name: name.to_string(),
        name_with_owner: name_with_owner.to_string(),
        url: format!("https://github.com/{name_with_owner}"),
        owner: Owner {
            login: owner.to_string(),
            url: format!("https://github.com/{owner}"),
            avatar_url: format!("https://avatars.githubusercontent.com/{owner}"),
            kind,
        },
    }
}
