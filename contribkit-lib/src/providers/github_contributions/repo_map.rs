use super::model::Repository;
use std::collections::HashMap;

/// Repositories found by the discovery strategies, one entry per `name_with_owner`.
///
/// Inserting an identity that is already present replaces the stored description but keeps
/// its original position, so iteration follows first-discovery order.
#[derive(Debug, Default)]
pub struct RepoMap {
    index: HashMap<String, usize>,
    repos: Vec<Repository>,
}

impl RepoMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a repository. Repositories with an empty identity are ignored.
    ///
    /// Returns `true` when the identity was not seen before.
    pub fn upsert(&mut self, repo: Repository) -> bool {
        if repo.name_with_owner.is_empty() {
            return false;
        }

        if let Some(&slot) = self.index.get(&repo.name_with_owner) {
            self.repos[slot] = repo;
            false
        } else {
            let _ = self.index.insert(repo.name_with_owner.clone(), self.repos.len());
            self.repos.push(repo);
            true
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.repos.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    #[must_use]
    pub fn contains(&self, name_with_owner: &str) -> bool {
        self.index.contains_key(name_with_owner)
    }

    #[must_use]
    pub fn repositories(&self) -> &[Repository] {
        &self.repos
    }
}

impl Extend<Repository> for RepoMap {
    fn extend<T: IntoIterator<Item = Repository>>(&mut self, iter: T) {
        for repo in iter {
            let _ = self.upsert(repo);
        }
    }
}
