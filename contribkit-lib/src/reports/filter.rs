use crate::providers::Sponsorship;
use core::fmt::{Display, Formatter};
use core::str::FromStr;
use ohno::{AppError, app_err};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl Comparison {
    const fn symbol(self) -> &'static str {
        match self {
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
        }
    }
}

/// A threshold on record weight, written as `<N`, `<=N`, `>N`, or `>=N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeightFilter {
    comparison: Comparison,
    threshold: i64,
}

impl WeightFilter {
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "thresholds are small integers")]
    pub fn matches(&self, weight: f64) -> bool {
        let threshold = self.threshold as f64;
        match self.comparison {
            Comparison::Less => weight < threshold,
            Comparison::LessOrEqual => weight <= threshold,
            Comparison::Greater => weight > threshold,
            Comparison::GreaterOrEqual => weight >= threshold,
        }
    }

    /// Keep only the records whose weight passes the filter.
    pub fn retain(&self, records: &mut Vec<Sponsorship>) {
        records.retain(|record| self.matches(record.weight));
    }
}

impl FromStr for WeightFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        // Two-character operators first so `<=` is not read as `<` followed by `=N`.
        let (comparison, rest) = [
            Comparison::LessOrEqual,
            Comparison::GreaterOrEqual,
            Comparison::Less,
            Comparison::Greater,
        ]
        .into_iter()
        .find_map(|c| trimmed.strip_prefix(c.symbol()).map(|rest| (c, rest)))
        .ok_or_else(|| app_err!("unable to parse filter '{s}': expected one of <N, <=N, >N, >=N"))?;

        let threshold = rest
            .trim()
            .parse::<i64>()
            .map_err(|e| app_err!("unable to parse filter '{s}': {e}"))?;

        Ok(Self { comparison, threshold })
    }
}

impl TryFrom<String> for WeightFilter {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WeightFilter> for String {
    fn from(filter: WeightFilter) -> Self {
        filter.to_string()
    }
}

impl Display for WeightFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}{}", self.comparison.symbol(), self.threshold)
    }
}
