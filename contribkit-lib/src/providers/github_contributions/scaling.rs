use super::aggregate::OwnerAggregate;
use crate::providers::{
    AuditOwner, ContributionAudit, PrivacyLevel, ProviderName, RawPayload, RepoContribution, Sponsor, Sponsorship,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

const TIER_NAME: &str = "Repository";

/// Transform applied to an owner's merged pull request total before it becomes a weight.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Scaling {
    /// Upper bound on any emitted weight
    pub max: Option<f64>,

    /// Replace the total `n` with `log10(n + 1) * 10`
    pub logarithmic: bool,
}

impl Scaling {
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "pull request totals are far below 2^52")]
    pub fn apply(self, total: u64) -> f64 {
        let mut scaled = total as f64;

        if self.logarithmic && total > 0 {
            scaled = (scaled + 1.0).log10() * 10.0;
        }

        if let Some(max) = self.max
            && scaled > max
        {
            scaled = max;
        }

        scaled
    }

    /// Describe the active transforms for logging, or `None` when the weight is the raw total.
    #[must_use]
    pub fn describe(self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(max) = self.max {
            parts.push(format!("max cap: {max}"));
        }
        if self.logarithmic {
            parts.push("logarithmic scaling enabled".to_string());
        }

        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

/// Turn owner aggregates into records sorted by raw total, highest first.
///
/// Sorting uses the unscaled total so that scaling only changes magnitudes.
#[must_use]
pub fn project(mut aggregates: Vec<OwnerAggregate<'_>>, scaling: Scaling, now: DateTime<Utc>) -> Vec<Sponsorship> {
    aggregates.sort_by(|a, b| b.total_prs.cmp(&a.total_prs));

    aggregates
        .into_iter()
        .map(|aggregate| {
            let weight = scaling.apply(aggregate.total_prs);
            let owner = aggregate.owner;

            let link_url = match aggregate.repos.as_slice() {
                [single] => single.repository.url.clone(),
                _ => owner.url.clone(),
            };

            let audit = ContributionAudit {
                owner: AuditOwner {
                    kind: owner.kind,
                    login: owner.login.clone(),
                    url: owner.url.clone(),
                    avatar_url: owner.avatar_url.clone(),
                },
                total_prs: aggregate.total_prs,
                scaled_prs: weight,
                repo_count: aggregate.repos.len(),
                repos: aggregate
                    .repos
                    .iter()
                    .map(|m| RepoContribution {
                        name_with_owner: m.repository.name_with_owner.clone(),
                        url: m.repository.url.clone(),
                        merged_prs: m.merged_prs,
                    })
                    .collect(),
            };

            Sponsorship {
                sponsor: Sponsor {
                    kind: owner.kind,
                    login: owner.login.clone(),
                    name: owner.login.clone(),
                    avatar_url: owner.avatar_url.clone(),
                    link_url: Some(link_url),
                    social_logins: BTreeMap::from([("github".to_string(), owner.login.clone())]),
                },
                is_one_time: false,
                weight,
                privacy_level: PrivacyLevel::Public,
                tier_name: TIER_NAME.to_string(),
                created_at: now,
                provider: ProviderName::GithubContributions,
                raw: Some(RawPayload::Contributions(audit)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::AccountKind;
    use crate::providers::github_contributions::aggregate::aggregate_by_owner;
    use crate::providers::github_contributions::model::{MeasuredRepository, repo};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_identity_scaling() {
        let scaling = Scaling::default();
        assert!((scaling.apply(0) - 0.0).abs() < f64::EPSILON);
        assert!((scaling.apply(8) - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_logarithmic_scaling() {
        let scaling = Scaling {
            max: None,
            logarithmic: true,
        };

        assert!((scaling.apply(8) - 9.542_425_094).abs() < 1e-6);
        assert!((scaling.apply(9) - 10.0).abs() < 1e-9);
        assert!((scaling.apply(0) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cap_applies_after_logarithmic_scaling() {
        let scaling = Scaling {
            max: Some(5.0),
            logarithmic: true,
        };
        assert!((scaling.apply(8) - 5.0).abs() < f64::EPSILON);

        let uncapped_below = Scaling {
            max: Some(20.0),
            logarithmic: true,
        };
        assert!((uncapped_below.apply(8) - 9.542_425_094).abs() < 1e-6);
    }

    #[test]
    fn test_no_weight_exceeds_cap() {
        for logarithmic in [false, true] {
            let scaling = Scaling {
                max: Some(12.5),
                logarithmic,
            };
            for total in [0, 1, 5, 12, 13, 100, 10_000] {
                assert!(scaling.apply(total) <= 12.5);
            }
        }
    }

    #[test]
    fn test_scaling_is_monotonic() {
        for scaling in [
            Scaling::default(),
            Scaling {
                max: Some(3.0),
                logarithmic: false,
            },
            Scaling {
                max: None,
                logarithmic: true,
            },
        ] {
            let weights: Vec<_> = (0..200).map(|n| scaling.apply(n)).collect();
            assert!(weights.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_describe() {
        assert_eq!(Scaling::default().describe(), None);
        assert_eq!(
            Scaling {
                max: Some(50.0),
                logarithmic: true
            }
            .describe()
            .as_deref(),
            Some("max cap: 50, logarithmic scaling enabled")
        );
    }

    #[test]
    fn test_project_sorts_by_raw_total_and_links() {
        let solo = repo("solo/tool", AccountKind::User);
        let b = repo("acme/b", AccountKind::Organization);
        let c = repo("acme/c", AccountKind::Organization);

        let aggregates = aggregate_by_owner([
            MeasuredRepository {
                repository: &solo,
                merged_prs: 2,
            },
            MeasuredRepository {
                repository: &b,
                merged_prs: 5,
            },
            MeasuredRepository {
                repository: &c,
                merged_prs: 3,
            },
        ]);

        let records = project(
            aggregates,
            Scaling {
                max: Some(5.0),
                logarithmic: true,
            },
            now(),
        );

        assert_eq!(records.len(), 2);

        assert_eq!(records[0].sponsor.login, "acme");
        assert_eq!(records[0].sponsor.kind, AccountKind::Organization);
        assert_eq!(records[0].sponsor.link_url.as_deref(), Some("https://github.com/acme"));
        assert!((records[0].weight - 5.0).abs() < f64::EPSILON);

        assert_eq!(records[1].sponsor.login, "solo");
        assert_eq!(records[1].sponsor.link_url.as_deref(), Some("https://github.com/solo/tool"));
        assert!((records[1].weight - 3.0_f64.log10() * 10.0).abs() < 1e-9);

        for record in &records {
            assert!(!record.is_one_time);
            assert_eq!(record.privacy_level, PrivacyLevel::Public);
            assert_eq!(record.tier_name, "Repository");
            assert_eq!(record.provider, ProviderName::GithubContributions);
            assert_eq!(record.created_at, now());
            assert_eq!(record.sponsor.social_logins.get("github"), Some(&record.sponsor.login));
        }

        let Some(RawPayload::Contributions(audit)) = &records[0].raw else {
            unreachable!("expected a contribution audit");
        };
        assert_eq!(audit.total_prs, 8);
        assert_eq!(audit.repo_count, 2);
        assert!((audit.scaled_prs - 5.0).abs() < f64::EPSILON);
        assert_eq!(audit.repos[0].name_with_owner, "acme/b");
        assert_eq!(audit.repos[1].merged_prs, 3);
    }

    #[test]
    fn test_project_order_survives_capping() {
        let big = repo("big/x", AccountKind::User);
        let small = repo("small/x", AccountKind::User);

        let aggregates = aggregate_by_owner([
            MeasuredRepository {
                repository: &small,
                merged_prs: 3,
            },
            MeasuredRepository {
                repository: &big,
                merged_prs: 40,
            },
        ]);

        let records = project(
            aggregates,
            Scaling {
                max: Some(1.0),
                logarithmic: false,
            },
            now(),
        );

        let logins: Vec<_> = records.iter().map(|r| r.sponsor.login.as_str()).collect();
        assert_eq!(logins, ["big", "small"]);
    }
}
