//! Human-readable summary of an extracted street list.

use std::collections::BTreeMap;
use std::fmt;

use streetwise_core::StreetEntity;

/// Label used for streets without a suffix.
pub const NO_SUFFIX: &str = "NO_SUFFIX";

/// How many of the longest streets a summary lists.
pub const LONGEST_STREETS: usize = 10;

/// Aggregate figures for one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct StreetSummary {
    /// Region key or dataset name.
    pub region: String,
    /// Number of streets.
    pub total_streets: usize,
    /// Sum of street lengths in miles.
    pub total_miles: f64,
    /// Mean street length in miles; zero for an empty list.
    pub average_miles: f64,
    /// Street counts per suffix, with [`NO_SUFFIX`] for empty suffixes.
    pub suffix_counts: BTreeMap<String, usize>,
    /// Full names and lengths of the longest streets, longest first.
    pub longest: Vec<(String, f64)>,
}

impl StreetSummary {
    /// Summarise `streets`.
    ///
    /// # Examples
    /// ```
    /// use streetwise_data::StreetSummary;
    ///
    /// let summary = StreetSummary::from_streets("empty", &[]);
    /// assert_eq!(summary.total_streets, 0);
    /// assert_eq!(summary.average_miles, 0.0);
    /// ```
    #[must_use]
    pub fn from_streets(region: impl Into<String>, streets: &[StreetEntity]) -> Self {
        let total_miles: f64 = streets.iter().map(|street| street.length_miles).sum();
        let average_miles = match u32::try_from(streets.len()) {
            Ok(0) | Err(_) => 0.0,
            Ok(count) => total_miles / f64::from(count),
        };
        let mut suffix_counts = BTreeMap::new();
        for street in streets {
            let suffix = if street.suffix.is_empty() {
                NO_SUFFIX
            } else {
                street.suffix.as_str()
            };
            *suffix_counts.entry(suffix.to_owned()).or_insert(0) += 1;
        }
        let mut by_length: Vec<&StreetEntity> = streets.iter().collect();
        by_length.sort_by(|a, b| b.length_miles.total_cmp(&a.length_miles));
        let longest = by_length
            .into_iter()
            .take(LONGEST_STREETS)
            .map(|street| (street.full_name.clone(), street.length_miles))
            .collect();
        Self {
            region: region.into(),
            total_streets: streets.len(),
            total_miles,
            average_miles,
            suffix_counts,
            longest,
        }
    }
}

impl fmt::Display for StreetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "STREET DATA SUMMARY FOR {}",
            self.region.to_uppercase().replace('-', " ")
        )?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Total Streets: {}", self.total_streets)?;
        writeln!(f, "Total Miles: {:.2}", self.total_miles)?;
        writeln!(f, "Average Length: {:.2} miles", self.average_miles)?;
        writeln!(f)?;
        writeln!(f, "Street Types:")?;
        for (suffix, count) in &self.suffix_counts {
            writeln!(f, "  {suffix}: {count}")?;
        }
        writeln!(f)?;
        writeln!(f, "Longest Streets:")?;
        for (rank, (name, miles)) in self.longest.iter().enumerate() {
            writeln!(f, "  {:2}. {name}: {miles:.2} miles", rank + 1)?;
        }
        write!(f, "{rule}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn street(full_name: &str, suffix: &str, miles: f64) -> StreetEntity {
        StreetEntity {
            id: full_name.to_lowercase().replace(' ', "_"),
            base_name: full_name.to_owned(),
            suffix: suffix.to_owned(),
            full_name: full_name.to_owned(),
            geometry: Vec::new(),
            length_miles: miles,
            city: "Testville".to_owned(),
            state: "CA".to_owned(),
        }
    }

    #[rstest]
    fn counts_suffixes_and_averages() {
        let streets = vec![
            street("OAK ST", "ST", 1.0),
            street("ELM ST", "ST", 2.0),
            street("BROADWAY", "", 3.0),
        ];
        let summary = StreetSummary::from_streets("testville", &streets);

        assert_eq!(summary.total_streets, 3);
        assert_eq!(summary.total_miles, 6.0);
        assert_eq!(summary.average_miles, 2.0);
        assert_eq!(summary.suffix_counts.get("ST"), Some(&2));
        assert_eq!(summary.suffix_counts.get(NO_SUFFIX), Some(&1));
        assert_eq!(summary.longest.first().map(|(name, _)| name.as_str()), Some("BROADWAY"));
    }

    #[rstest]
    fn lists_at_most_ten_longest() {
        let streets: Vec<StreetEntity> = (1..=12)
            .map(|n| street(&format!("STREET {n}"), "ST", f64::from(n)))
            .collect();
        let summary = StreetSummary::from_streets("testville", &streets);

        assert_eq!(summary.longest.len(), LONGEST_STREETS);
        assert_eq!(summary.longest[0], ("STREET 12".to_owned(), 12.0));
        assert_eq!(summary.longest[9], ("STREET 3".to_owned(), 3.0));
    }

    #[rstest]
    fn renders_a_titled_report() {
        let summary =
            StreetSummary::from_streets("san-francisco", &[street("MARKET ST", "ST", 3.456)]);
        let text = summary.to_string();

        assert!(text.contains("STREET DATA SUMMARY FOR SAN FRANCISCO"));
        assert!(text.contains("Total Miles: 3.46"));
        assert!(text.contains("   1. MARKET ST: 3.46 miles"));
    }
}
