use super::model::{MeasuredRepository, Owner, OwnerKey, Repository};
use std::collections::HashMap;

const LOG_TARGET: &str = " aggregate";

/// How many multi-repository owners are listed in the diagnostic log
const CONSOLIDATED_LOG_LIMIT: usize = 10;

/// The summed merged pull request count for one owner.
///
/// `repos` keeps the order in which repositories were measured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerAggregate<'a> {
    pub owner: &'a Owner,
    pub total_prs: u64,
    pub repos: Vec<MeasuredRepository<'a>>,
}

/// Group measured repositories by owning account, in order of first appearance.
///
/// Every input is expected to carry a positive count.
#[must_use]
pub fn aggregate_by_owner<'a>(measured: impl IntoIterator<Item = MeasuredRepository<'a>>) -> Vec<OwnerAggregate<'a>> {
    let mut index: HashMap<OwnerKey<'a>, usize> = HashMap::new();
    let mut aggregates: Vec<OwnerAggregate<'a>> = Vec::new();

    for entry in measured {
        debug_assert!(entry.merged_prs > 0, "zero counts are filtered out before aggregation");

        let repository: &'a Repository = entry.repository;
        let owner = &repository.owner;
        if let Some(&slot) = index.get(&owner.key()) {
            let aggregate = &mut aggregates[slot];
            aggregate.total_prs += entry.merged_prs;
            aggregate.repos.push(entry);
        } else {
            let _ = index.insert(owner.key(), aggregates.len());
            aggregates.push(OwnerAggregate {
                owner,
                total_prs: entry.merged_prs,
                repos: vec![entry],
            });
        }
    }

    aggregates
}

/// Log the owners whose weight comes from more than one repository.
pub fn log_consolidated_owners(aggregates: &[OwnerAggregate<'_>]) {
    if !log::log_enabled!(target: LOG_TARGET, log::Level::Info) {
        return;
    }

    let mut consolidated: Vec<_> = aggregates.iter().filter(|a| a.repos.len() > 1).collect();
    if consolidated.is_empty() {
        return;
    }

    consolidated.sort_by(|a, b| b.repos.len().cmp(&a.repos.len()));

    log::info!(target: LOG_TARGET, "Consolidated {} owner(s) with multiple repositories:", consolidated.len());
    for aggregate in consolidated.iter().take(CONSOLIDATED_LOG_LIMIT) {
        log::info!(
            target: LOG_TARGET,
            "  - {}: {} repositories, {} merged pull requests",
            aggregate.owner.login,
            aggregate.repos.len(),
            aggregate.total_prs
        );
    }

    if consolidated.len() > CONSOLIDATED_LOG_LIMIT {
        log::info!(target: LOG_TARGET, "  ... and {} more", consolidated.len() - CONSOLIDATED_LOG_LIMIT);
    }
}
