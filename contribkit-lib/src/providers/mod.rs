//! Data sources and the weighted record model they produce.
//!
//! Each provider turns one external service into a list of [`Sponsorship`] records sharing a
//! single shape, so later stages never need to know where a record came from.

mod crowdin_contributors;
pub mod github_contributions;
mod github_contributors;
mod gitlab_contributors;
mod paged_rest;
mod provider;
mod sponsorship;

pub use crowdin_contributors::CrowdinContributorsProvider;
pub use github_contributors::ContributorsProvider;
pub use gitlab_contributors::GitlabContributorsProvider;
pub use provider::{
    CROWDIN_API_URL, Endpoints, GITHUB_GRAPHQL_URL, GITHUB_REST_URL, GITLAB_API_URL, Provider, ProviderName, fetch_all, guess_providers,
    resolve_providers,
};
pub use sponsorship::{
    AccountKind, AuditOwner, ContributionAudit, PrivacyLevel, RawPayload, RepoContribution, Sponsor, Sponsorship,
};
