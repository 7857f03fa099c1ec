//! Repository discovery through the merged pull request search

use super::gateway::{Gateway, GatewayError};
use super::queries::{MergedPullRequestSearch, SearchVariables, merged_prs_by};
use super::repo_map::RepoMap;

const LOG_TARGET: &str = "    search";

/// Add every repository holding a merged pull request by `login` to `repos`, reading at most
/// `max_pages` pages.
///
/// A failure ends the walk; repositories from pages already read stay in `repos`.
pub async fn discover(gateway: &Gateway, login: &str, max_pages: usize, repos: &mut RepoMap) {
    log::info!(target: LOG_TARGET, "Searching for repositories with merged pull requests");

    match walk_pages(gateway, login, max_pages, repos).await {
        Ok(pages) => log::debug!(target: LOG_TARGET, "Merged pull request search read {pages} page(s)"),
        Err(e) => log::warn!(target: LOG_TARGET, "Merged pull request search failed: {e:#}"),
    }
}

async fn walk_pages(gateway: &Gateway, login: &str, max_pages: usize, repos: &mut RepoMap) -> Result<usize, GatewayError> {
    let search_query = merged_prs_by(login);
    let mut after = None;
    let mut pages = 0;

    while pages < max_pages {
        let data = gateway
            .execute::<MergedPullRequestSearch>(&SearchVariables {
                search_query: search_query.clone(),
                after: after.take(),
            })
            .await?;
        pages += 1;

        repos.extend(data.search.edges.into_iter().filter_map(|edge| edge.node?.repository));

        let page_info = data.search.page_info;
        match page_info.end_cursor {
            Some(cursor) if page_info.has_next_page => {
                if pages < max_pages {
                    log::info!(target: LOG_TARGET, "Merged pull request search page {pages}, {} repositories so far", repos.len());
                }
                after = Some(cursor);
            }
            _ => break,
        }
    }

    Ok(pages)
}
