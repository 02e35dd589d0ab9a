//! Population statistics snapshots.

use serde::{Deserialize, Serialize};

/// Minimum, mean and maximum of one attribute over the live population
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub min: i64,
    pub mean: f64,
    pub max: i64,
}

impl Summary {
    /// Summarize a sequence of values. An empty sequence gives all zeros.
    pub fn of(values: impl IntoIterator<Item = i64>) -> Self {
        let mut count = 0u64;
        let mut sum = 0i128;
        let mut min = i64::MAX;
        let mut max = i64::MIN;

        for value in values {
            count += 1;
            sum += value as i128;
            min = min.min(value);
            max = max.max(value);
        }

        if count == 0 {
            return Self::default();
        }

        Self {
            min,
            mean: sum as f64 / count as f64,
            max,
        }
    }
}

/// State of the whole ecosystem at one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationStats {
    pub tick: u64,
    pub population: usize,
    pub total_food: u64,
    pub total_keys: u64,
    pub age: Summary,
    pub mouths: Summary,
    pub energy: Summary,
}

impl PopulationStats {
    pub fn is_extinct(&self) -> bool {
        self.population == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_of_values() {
        let summary = Summary::of([4, -2, 10]);
        assert_eq!(summary.min, -2);
        assert_eq!(summary.max, 10);
        assert!((summary.mean - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary_of_nothing() {
        let summary = Summary::of(std::iter::empty());
        assert_eq!(summary, Summary::default());
    }

    #[test]
    fn test_extinct() {
        let stats = PopulationStats::default();
        assert!(stats.is_extinct());
    }
}
