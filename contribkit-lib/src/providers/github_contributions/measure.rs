use super::best_effort::or_logged_default;
use super::gateway::Gateway;
use super::model::{MeasuredRepository, Repository};
use super::queries::{CountVariables, MergedPullRequestCount, merged_prs_in_repo_by};
use futures_util::future::join_all;

const LOG_TARGET: &str = "   measure";

/// Count the merged pull requests `login` authored in each repository.
///
/// Requests go out `batch_size` at a time and each batch settles before the next one starts.
/// A failed count is logged and treated as zero. Only repositories with a positive count are
/// returned, in input order.
pub async fn measure<'a>(gateway: &Gateway, repos: &'a [Repository], login: &str, batch_size: usize) -> Vec<MeasuredRepository<'a>> {
    log::info!(target: LOG_TARGET, "Fetching merged pull request counts per repository");

    let batch_size = batch_size.max(1);
    let total = repos.len();
    let mut measured = Vec::new();
    let mut processed = 0;

    for batch in repos.chunks(batch_size) {
        let counts = join_all(batch.iter().map(|repo| merged_pr_count(gateway, repo, login))).await;

        measured.extend(
            batch
                .iter()
                .zip(counts)
                .filter(|&(_, merged_prs)| merged_prs > 0)
                .map(|(repository, merged_prs)| MeasuredRepository { repository, merged_prs }),
        );

        processed += batch.len();
        if processed < total {
            log::info!(target: LOG_TARGET, "Processed pull request batches for {processed}/{total} repositories");
        }
    }

    log::info!(
        target: LOG_TARGET,
        "Found merged pull requests in {} of {total} repositories",
        measured.len()
    );

    measured
}

async fn merged_pr_count(gateway: &Gateway, repo: &Repository, login: &str) -> u64 {
    let result = gateway
        .execute::<MergedPullRequestCount>(&CountVariables {
            q: merged_prs_in_repo_by(&repo.name_with_owner, login),
        })
        .await
        .map(|data| data.search.issue_count);

    or_logged_default(result, LOG_TARGET, || format!("Pull request count for '{}'", repo.name_with_owner))
}
