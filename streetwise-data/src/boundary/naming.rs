//! Name normalisation for boundary URLs and cache files.

/// Lowercase two-letter codes for the 50 states and the District of
/// Columbia, keyed by lowercase full name.
const STATE_CODES: &[(&str, &str)] = &[
    ("alabama", "al"),
    ("alaska", "ak"),
    ("arizona", "az"),
    ("arkansas", "ar"),
    ("california", "ca"),
    ("colorado", "co"),
    ("connecticut", "ct"),
    ("delaware", "de"),
    ("florida", "fl"),
    ("georgia", "ga"),
    ("hawaii", "hi"),
    ("idaho", "id"),
    ("illinois", "il"),
    ("indiana", "in"),
    ("iowa", "ia"),
    ("kansas", "ks"),
    ("kentucky", "ky"),
    ("louisiana", "la"),
    ("maine", "me"),
    ("maryland", "md"),
    ("massachusetts", "ma"),
    ("michigan", "mi"),
    ("minnesota", "mn"),
    ("mississippi", "ms"),
    ("missouri", "mo"),
    ("montana", "mt"),
    ("nebraska", "ne"),
    ("nevada", "nv"),
    ("new hampshire", "nh"),
    ("new jersey", "nj"),
    ("new mexico", "nm"),
    ("new york", "ny"),
    ("north carolina", "nc"),
    ("north dakota", "nd"),
    ("ohio", "oh"),
    ("oklahoma", "ok"),
    ("oregon", "or"),
    ("pennsylvania", "pa"),
    ("rhode island", "ri"),
    ("south carolina", "sc"),
    ("south dakota", "sd"),
    ("tennessee", "tn"),
    ("texas", "tx"),
    ("utah", "ut"),
    ("vermont", "vt"),
    ("virginia", "va"),
    ("washington", "wa"),
    ("west virginia", "wv"),
    ("wisconsin", "wi"),
    ("wyoming", "wy"),
    ("district of columbia", "dc"),
];

/// Lowercase two-letter code for a state name or abbreviation.
///
/// Any two-letter alphabetic input is taken to already be a code.
///
/// # Examples
/// ```
/// use streetwise_data::boundary::state_code;
///
/// assert_eq!(state_code("CA").as_deref(), Some("ca"));
/// assert_eq!(state_code(" New York ").as_deref(), Some("ny"));
/// assert_eq!(state_code("Atlantis"), None);
/// ```
#[must_use]
pub fn state_code(state: &str) -> Option<String> {
    let lowered = state.trim().to_lowercase();
    if lowered.chars().count() == 2 && lowered.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some(lowered);
    }
    STATE_CODES
        .iter()
        .find(|(name, _)| *name == lowered)
        .map(|(_, code)| (*code).to_owned())
}

/// URL slug for a city name: lowercase, punctuation removed, runs of
/// whitespace and hyphens collapsed to one hyphen.
///
/// # Examples
/// ```
/// use streetwise_data::boundary::city_slug;
///
/// assert_eq!(city_slug("San Francisco"), "san-francisco");
/// assert_eq!(city_slug("St. Louis"), "st-louis");
/// assert_eq!(city_slug("Winston -- Salem"), "winston-salem");
/// ```
#[must_use]
pub fn city_slug(city: &str) -> String {
    let kept: String = city
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '_' | '-'))
        .collect();
    kept.split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// File stem for a city's cached boundary or dataset, e.g.
/// `san_francisco_ca`.
#[must_use]
pub fn file_stem(city: &str, state: Option<&str>) -> String {
    let name = city.to_lowercase().replace(' ', "_").replace(',', "");
    match state {
        Some(code) => format!("{name}_{}", code.to_lowercase().replace(' ', "_")),
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("California", Some("ca"))]
    #[case("ca", Some("ca"))]
    #[case("District of Columbia", Some("dc"))]
    #[case("WEST VIRGINIA", Some("wv"))]
    #[case("C4", None)]
    #[case("Cal", None)]
    #[case("", None)]
    fn maps_states_to_codes(#[case] state: &str, #[case] expected: Option<&str>) {
        assert_eq!(state_code(state).as_deref(), expected);
    }

    #[rstest]
    fn every_state_and_dc_is_listed() {
        assert_eq!(STATE_CODES.len(), 51);
    }

    #[rstest]
    #[case("  Los Angeles  ", "los-angeles")]
    #[case("Coeur d'Alene", "coeur-dalene")]
    #[case("Lees-Summit", "lees-summit")]
    #[case("-Boise-", "boise")]
    #[case("Ca\u{f1}on City", "ca\u{f1}on-city")]
    fn slugs_city_names(#[case] city: &str, #[case] expected: &str) {
        assert_eq!(city_slug(city), expected);
    }

    #[rstest]
    #[case("San Francisco", Some("CA"), "san_francisco_ca")]
    #[case("Washington, D.C.", Some("District of Columbia"), "washington_d.c._district_of_columbia")]
    #[case("Boise", None, "boise")]
    fn builds_file_stems(#[case] city: &str, #[case] state: Option<&str>, #[case] expected: &str) {
        assert_eq!(file_stem(city, state), expected);
    }
}
