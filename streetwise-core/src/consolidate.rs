//! Merge entities that share a base name and suffix.

use std::collections::HashMap;

use log::info;

use crate::geometry::round_to_hundredths;
use crate::street::StreetEntity;

/// Merge same-named entities and sort the result by base name.
///
/// Entities are keyed by `(base_name, suffix)`, so "MISSION ST" and a
/// suffix-less "MISSION" remain separate. Within a key the first entity seen
/// supplies the identifying fields, polylines are concatenated in first-seen
/// order and lengths are summed then rounded to hundredths. Singletons pass
/// through unchanged. Sorting is stable and byte-wise on the base name.
///
/// # Examples
/// ```
/// use streetwise_core::{StreetEntity, consolidate};
///
/// let street = |id: &str, miles: f64| StreetEntity {
///     id: id.to_owned(),
///     base_name: "MARKET".to_owned(),
///     suffix: "ST".to_owned(),
///     full_name: "MARKET ST".to_owned(),
///     geometry: Vec::new(),
///     length_miles: miles,
///     city: "San Francisco".to_owned(),
///     state: "CA".to_owned(),
/// };
/// let merged = consolidate(vec![street("a", 1.0), street("b", 2.5)]);
/// assert_eq!(merged.len(), 1);
/// assert_eq!(merged[0].length_miles, 3.5);
/// assert_eq!(merged[0].id, "a");
/// ```
#[must_use]
pub fn consolidate(entities: Vec<StreetEntity>) -> Vec<StreetEntity> {
    let before = entities.len();
    let mut slots: HashMap<(String, String), usize> = HashMap::new();
    let mut groups: Vec<Vec<StreetEntity>> = Vec::new();

    for entity in entities {
        let key = (entity.base_name.clone(), entity.suffix.clone());
        if let Some(group) = slots.get(&key).and_then(|slot| groups.get_mut(*slot)) {
            group.push(entity);
        } else {
            slots.insert(key, groups.len());
            groups.push(vec![entity]);
        }
    }

    let mut merged: Vec<StreetEntity> = groups.into_iter().filter_map(merge_group).collect();
    merged.sort_by(|a, b| a.base_name.cmp(&b.base_name));
    info!("Consolidated {before} streets into {}", merged.len());
    merged
}

fn merge_group(group: Vec<StreetEntity>) -> Option<StreetEntity> {
    let mut members = group.into_iter();
    let mut first = members.next()?;
    let mut merged_any = false;
    let mut total = first.length_miles;
    for member in members {
        merged_any = true;
        total += member.length_miles;
        first.geometry.extend(member.geometry);
    }
    if merged_any {
        first.length_miles = round_to_hundredths(total);
    }
    Some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::LatLon;
    use rstest::rstest;

    fn street(id: &str, base: &str, suffix: &str, miles: f64, lines: usize) -> StreetEntity {
        let line = vec![LatLon::new(37.0, -122.0), LatLon::new(37.01, -122.0)];
        StreetEntity {
            id: id.to_owned(),
            base_name: base.to_owned(),
            suffix: suffix.to_owned(),
            full_name: format!("{base} {suffix}").trim().to_owned(),
            geometry: vec![line; lines],
            length_miles: miles,
            city: "San Francisco".to_owned(),
            state: "CA".to_owned(),
        }
    }

    #[rstest]
    fn merges_same_name_and_suffix() {
        let merged = consolidate(vec![
            street("sf_way_1", "MARKET", "ST", 1.0, 1),
            street("sf_rel_2", "MARKET", "ST", 2.5, 3),
        ]);
        assert_eq!(merged.len(), 1);
        let market = merged.first().expect("merged street");
        assert_eq!(market.length_miles, 3.5);
        assert_eq!(market.polyline_count(), 4);
        assert_eq!(market.id, "sf_way_1");
    }

    #[rstest]
    fn keeps_distinct_suffixes_apart() {
        let merged = consolidate(vec![
            street("a", "MISSION", "ST", 1.0, 1),
            street("b", "MISSION", "", 0.4, 1),
        ]);
        let suffixes: Vec<&str> = merged.iter().map(|s| s.suffix.as_str()).collect();
        assert_eq!(suffixes, vec!["ST", ""]);
    }

    #[rstest]
    fn sorts_by_base_name() {
        let merged = consolidate(vec![
            street("a", "VALENCIA", "ST", 1.0, 1),
            street("b", "10TH", "AVE", 1.0, 1),
            street("c", "ALAMO", "", 1.0, 1),
        ]);
        let names: Vec<&str> = merged.iter().map(|s| s.base_name.as_str()).collect();
        assert_eq!(names, vec!["10TH", "ALAMO", "VALENCIA"]);
    }

    #[rstest]
    fn rounds_summed_lengths() {
        let merged = consolidate(vec![
            street("a", "OAK", "ST", 0.1, 1),
            street("b", "OAK", "ST", 0.2, 1),
        ]);
        assert_eq!(merged.first().map(|s| s.length_miles), Some(0.3));
    }

    #[rstest]
    fn empty_input_yields_empty_output() {
        assert!(consolidate(Vec::new()).is_empty());
    }
}
