use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProcessingError;
use crate::utils::constants::MEAN_ROUNDING_DIGITS;
use crate::utils::format::round_to;

/// Reduction applied across cities (daily stage) or across days (roll-ups)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    Mean,
    Max,
    Min,
}

impl Statistic {
    pub const ALL: [Statistic; 3] = [Statistic::Mean, Statistic::Max, Statistic::Min];

    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::Max => "max",
            Statistic::Min => "min",
        }
    }

    /// Reduce the non-missing values; `None` when nothing is left to reduce.
    pub fn reduce<I>(&self, values: I) -> Option<f64>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().filter(|v| !v.is_nan());

        match self {
            Statistic::Mean => {
                let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
                (count > 0).then(|| sum / count as f64)
            }
            Statistic::Max => {
                let first = values.next()?;
                Some(values.fold(first, f64::max))
            }
            Statistic::Min => {
                let first = values.next()?;
                Some(values.fold(first, f64::min))
            }
        }
    }

    /// Reduction used by the monthly and yearly roll-ups. Means are rounded,
    /// extrema are kept as-is.
    pub fn roll_up<I>(&self, values: I) -> Option<f64>
    where
        I: IntoIterator<Item = f64>,
    {
        let reduced = self.reduce(values)?;
        match self {
            Statistic::Mean => Some(round_to(reduced, MEAN_ROUNDING_DIGITS)),
            Statistic::Max | Statistic::Min => Some(reduced),
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Statistic {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mean" => Ok(Statistic::Mean),
            "max" => Ok(Statistic::Max),
            "min" => Ok(Statistic::Min),
            other => Err(ProcessingError::InvalidFormat(format!(
                "Unknown statistic: '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_skips_missing_values() {
        let values = vec![10.0, f64::NAN, 20.0, 30.0];

        assert_eq!(Statistic::Mean.reduce(values.clone()), Some(20.0));
        assert_eq!(Statistic::Max.reduce(values.clone()), Some(30.0));
        assert_eq!(Statistic::Min.reduce(values), Some(10.0));
    }

    #[test]
    fn test_reduce_empty_is_missing() {
        for stat in Statistic::ALL {
            assert_eq!(stat.reduce(Vec::new()), None);
            assert_eq!(stat.reduce(vec![f64::NAN]), None);
        }
    }

    #[test]
    fn test_roll_up_rounds_only_means() {
        assert_eq!(Statistic::Mean.roll_up(vec![1.0, 2.0, 2.0]), Some(1.7));
        assert_eq!(Statistic::Max.roll_up(vec![1.23, 4.56]), Some(4.56));
        assert_eq!(Statistic::Min.roll_up(vec![1.23, 4.56]), Some(1.23));
    }

    #[test]
    fn test_mean_roll_up_halves_round_to_even() {
        assert_eq!(Statistic::Mean.roll_up(vec![10.0, 10.5]), Some(10.2));
        assert_eq!(Statistic::Mean.roll_up(vec![0.2, 0.3]), Some(0.2));
        assert_eq!(Statistic::Mean.roll_up(vec![0.2, 0.5]), Some(0.4));
    }

    #[test]
    fn test_statistic_parsing() {
        assert_eq!("mean".parse::<Statistic>().unwrap(), Statistic::Mean);
        assert_eq!(" MAX ".parse::<Statistic>().unwrap(), Statistic::Max);
        assert!("median".parse::<Statistic>().is_err());
        assert_eq!(Statistic::Min.to_string(), "min");
    }
}
