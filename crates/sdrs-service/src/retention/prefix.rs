//! Calendar-bucketed object prefixes.
//!
//! Objects under a dataset are laid out as `dataset/YYYY/MM/DD/HH/...`. A
//! time window is translated into the smallest list of such prefixes whose
//! buckets tile the window at the configured granularity. The start of the
//! window is floored to its bucket; the partially elapsed bucket holding the
//! end of the window is left out so nothing younger than the window end is
//! ever matched.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, TimeZone, Timelike, Utc};

use sdrs_core::config::PrefixGranularity;

use super::path::with_trailing_slash;

/// Generates time-bucketed prefixes for a dataset path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixGenerator {
    granularity: PrefixGranularity,
}

impl PrefixGenerator {
    /// Create a generator for the given granularity.
    pub fn new(granularity: PrefixGranularity) -> Self {
        Self { granularity }
    }

    /// Prefixes under `dataset_path` covering `[start, end)`, oldest first.
    pub fn generate(
        &self,
        dataset_path: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<String> {
        let base = with_trailing_slash(dataset_path);
        self.buckets(start, end)
            .into_iter()
            .map(|(bucket_start, _)| format!("{base}{}", self.format(bucket_start)))
            .collect()
    }

    /// Half-open calendar buckets `[bucket_start, bucket_end)` tiling the
    /// window, oldest first.
    pub fn buckets(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        let mut buckets = Vec::new();
        if end <= start {
            return buckets;
        }

        let Some(mut cursor) = self.floor(start) else {
            return buckets;
        };
        while let Some(next) = self.advance(cursor) {
            if next > end {
                break;
            }
            buckets.push((cursor, next));
            cursor = next;
        }
        buckets
    }

    /// Start of the bucket containing `at`.
    fn floor(&self, at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let date = match self.granularity {
            PrefixGranularity::Year => NaiveDate::from_ymd_opt(at.year(), 1, 1)?,
            PrefixGranularity::Month => NaiveDate::from_ymd_opt(at.year(), at.month(), 1)?,
            PrefixGranularity::Day | PrefixGranularity::Hour => at.date_naive(),
        };
        let hour = match self.granularity {
            PrefixGranularity::Hour => at.hour(),
            _ => 0,
        };
        Some(Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0)?))
    }

    /// Start of the bucket following the one starting at `bucket_start`.
    fn advance(&self, bucket_start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.granularity {
            PrefixGranularity::Year => bucket_start.checked_add_months(Months::new(12)),
            PrefixGranularity::Month => bucket_start.checked_add_months(Months::new(1)),
            PrefixGranularity::Day => bucket_start.checked_add_signed(Duration::days(1)),
            PrefixGranularity::Hour => bucket_start.checked_add_signed(Duration::hours(1)),
        }
    }

    fn format(&self, bucket_start: DateTime<Utc>) -> String {
        match self.granularity {
            PrefixGranularity::Year => bucket_start.format("%Y/").to_string(),
            PrefixGranularity::Month => bucket_start.format("%Y/%m/").to_string(),
            PrefixGranularity::Day => bucket_start.format("%Y/%m/%d/").to_string(),
            PrefixGranularity::Hour => bucket_start.format("%Y/%m/%d/%H/").to_string(),
        }
    }
}

impl Default for PrefixGenerator {
    fn default() -> Self {
        Self::new(PrefixGranularity::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_daily_prefixes() {
        let generator = PrefixGenerator::new(PrefixGranularity::Day);
        let prefixes = generator.generate("dataset", at(2024, 2, 27, 13), at(2024, 3, 2, 0));
        assert_eq!(
            prefixes,
            [
                "dataset/2024/02/27/",
                "dataset/2024/02/28/",
                "dataset/2024/02/29/",
                "dataset/2024/03/01/",
            ]
        );
    }

    #[test]
    fn test_partial_end_bucket_is_excluded() {
        let generator = PrefixGenerator::new(PrefixGranularity::Day);
        let prefixes = generator.generate("d/", at(2024, 1, 1, 0), at(2024, 1, 3, 5));
        assert_eq!(prefixes, ["d/2024/01/01/", "d/2024/01/02/"]);
    }

    #[test]
    fn test_each_granularity_format() {
        let start = at(2023, 11, 30, 22);
        let end = at(2025, 1, 1, 0);

        let year = PrefixGenerator::new(PrefixGranularity::Year).generate("d", start, end);
        assert_eq!(year, ["d/2023/", "d/2024/"]);

        let month = PrefixGenerator::new(PrefixGranularity::Month).generate("d", start, end);
        assert_eq!(month.first().map(String::as_str), Some("d/2023/11/"));
        assert_eq!(month.last().map(String::as_str), Some("d/2024/12/"));
        assert_eq!(month.len(), 14);

        let hour =
            PrefixGenerator::new(PrefixGranularity::Hour).generate("d", start, at(2023, 12, 1, 1));
        assert_eq!(hour, ["d/2023/11/30/22/", "d/2023/11/30/23/", "d/2023/12/01/00/"]);
    }

    #[test]
    fn test_empty_window() {
        let generator = PrefixGenerator::default();
        assert!(generator.generate("d", at(2024, 1, 2, 0), at(2024, 1, 1, 0)).is_empty());
        assert!(generator.generate("d", at(2024, 1, 1, 0), at(2024, 1, 1, 0)).is_empty());
        assert!(generator.generate("d", at(2024, 1, 1, 3), at(2024, 1, 1, 20)).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let generator = PrefixGenerator::new(PrefixGranularity::Hour);
        let first = generator.generate("d", at(2024, 5, 1, 0), at(2024, 5, 3, 7));
        let second = generator.generate("d", at(2024, 5, 1, 0), at(2024, 5, 3, 7));
        assert_eq!(first, second);
    }

    #[test]
    fn test_buckets_tile_window() {
        let start = Utc.with_ymd_and_hms(2023, 12, 15, 7, 31, 12).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 4, 2, 18, 5, 0).unwrap();

        for granularity in [
            PrefixGranularity::Year,
            PrefixGranularity::Month,
            PrefixGranularity::Day,
            PrefixGranularity::Hour,
        ] {
            let generator = PrefixGenerator::new(granularity);
            let buckets = generator.buckets(start, end);

            for pair in buckets.windows(2) {
                assert_eq!(pair[0].1, pair[1].0, "gap or overlap at {granularity}");
            }
            if let Some((first_start, first_end)) = buckets.first() {
                assert!(*first_start <= start && start < *first_end);
            }
            if let Some((_, last_end)) = buckets.last() {
                assert!(*last_end <= end);
                let following = generator.advance(*last_end).unwrap();
                assert!(following > end);
            }

            let prefixes = generator.generate("d", start, end);
            let mut unique = prefixes.clone();
            unique.dedup();
            assert_eq!(unique.len(), prefixes.len());
        }
    }
}
