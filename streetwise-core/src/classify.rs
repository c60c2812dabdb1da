//! Road classification and street-name normalisation.
//!
//! Two decisions are made per named entity: whether the name denotes a
//! highway rather than a city street, and how the name splits into a base
//! name and a standardised suffix.

use log::{debug, info};

use crate::assemble::StreetCandidate;
use crate::geometry::round_to_hundredths;
use crate::street::{ExtractionContext, StreetEntity};

/// Substrings that mark a name as a highway, freeway or expressway.
///
/// Leading and trailing spaces are significant: `" HIGHWAY"` must not match
/// `"HIGHWAYMAN"` at the start of a name.
const HIGHWAY_PATTERNS: &[&str] = &[
    " FREEWAY",
    " HIGHWAY",
    " EXPRESSWAY",
    "INTERSTATE ",
    "STATE ROUTE",
    "WA 520",
    "WA 522",
    "WA 305",
    "WA 304",
    "US 101",
    "US 1",
    "I-5",
    "I-405",
    "I-90",
    "LINCOLN HIGHWAY",
    "PACIFIC HIGHWAY",
    "COAST HIGHWAY",
    "PANORAMIC HIGHWAY",
    "SHORELINE HIGHWAY",
    "REDWOOD HIGHWAY",
    "EASTSHORE HIGHWAY",
    "GREAT HIGHWAY",
    "GOLDEN STATE FREEWAY",
    "HARBOR FREEWAY",
    "HOLLYWOOD FREEWAY",
    "SANTA MONICA FREEWAY",
    "SAN DIEGO FREEWAY",
    "VENTURA FREEWAY",
    "BAYSHORE FREEWAY",
    "NIMITZ FREEWAY",
    "EASTSHORE FREEWAY",
    "HUNTERS POINT EXPRESSWAY",
    "FORMER PRIMARY STATE HIGHWAY",
    "FORMER SECONDARY STATE HIGHWAY",
    "49 MILE SCENIC",
];

/// Suffix tokens whose presence marks a digit-only name as a numbered street.
const NUMBERED_STREET_MARKERS: &[&str] = &[
    "ST", "AVE", "BLVD", "RD", "WAY", "PL", "CT", "LN", "DR", "TER",
];

/// Bare route numbers longer than this are not treated as route numbers.
const MAX_ROUTE_NUMBER_DIGITS: usize = 4;

/// Names that are complete without a suffix.
const SUFFIXLESS_NAMES: &[&str] = &[
    "BROADWAY",
    "THE EMBARCADERO",
    "LOMBARD",
    "MARKET",
    "MISSION",
    "VALENCIA",
    "CASTRO",
    "FILLMORE",
    "DIVISADERO",
    "GEARY",
    "CALIFORNIA",
    "SACRAMENTO",
    "CLAY",
    "WASHINGTON",
    "JACKSON",
    "PACIFIC",
    "UNION",
    "GREEN",
    "VALLEJO",
    "THE PRESIDIO",
    "GOLDEN GATE PARK",
    "LINCOLN PARK",
];

/// Map a lowercase suffix word to its standard abbreviation.
fn standard_suffix(word: &str) -> Option<&'static str> {
    let abbreviation = match word {
        "street" | "st" => "ST",
        "avenue" | "ave" => "AVE",
        "boulevard" | "blvd" => "BLVD",
        "drive" | "dr" => "DR",
        "road" | "rd" => "RD",
        "way" => "WAY",
        "place" | "pl" => "PL",
        "court" | "ct" => "CT",
        "lane" | "ln" => "LN",
        "circle" | "cir" => "CIR",
        "terrace" | "ter" => "TER",
        _ => return None,
    };
    Some(abbreviation)
}

/// A normalised street name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreetName {
    /// Uppercase name without its suffix; never empty for a usable name.
    pub base: String,
    /// Standard abbreviation such as `"ST"`, or empty.
    pub suffix: String,
}

impl StreetName {
    /// Base name and suffix joined by a space, trimmed.
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.suffix.is_empty() {
            self.base.clone()
        } else {
            format!("{} {}", self.base, self.suffix)
        }
    }
}

/// Whether a name designates a highway rather than a city street.
///
/// # Examples
/// ```
/// use streetwise_core::is_excluded_road_name;
///
/// assert!(is_excluded_road_name("US 101"));
/// assert!(is_excluded_road_name("280"));
/// assert!(!is_excluded_road_name("101st Avenue"));
/// ```
#[must_use]
pub fn is_excluded_road_name(name: &str) -> bool {
    let upper = name.to_uppercase();

    if upper.contains("MILE") && upper.contains("SCENIC") {
        return true;
    }
    if HIGHWAY_PATTERNS.iter().any(|pattern| upper.contains(pattern)) {
        return true;
    }

    let compact: String = upper.chars().filter(|c| *c != ' ').collect();
    is_digits(&compact)
        && compact.chars().count() <= MAX_ROUTE_NUMBER_DIGITS
        && !NUMBERED_STREET_MARKERS
            .iter()
            .any(|marker| upper.contains(marker))
}

/// Split a raw name into base name and standard suffix.
///
/// The name is uppercased and trimmed first. Normalising the
/// [`StreetName::full_name`] of a result yields the same result again.
///
/// # Examples
/// ```
/// use streetwise_core::parse_street_name;
///
/// let name = parse_street_name("Main Street");
/// assert_eq!((name.base.as_str(), name.suffix.as_str()), ("MAIN", "ST"));
///
/// let numbered = parse_street_name("West 3rd");
/// assert_eq!((numbered.base.as_str(), numbered.suffix.as_str()), ("WEST 3RD", ""));
/// ```
#[must_use]
pub fn parse_street_name(raw: &str) -> StreetName {
    let name = raw.trim().to_uppercase();
    let whole = |text: String| StreetName {
        base: text,
        suffix: String::new(),
    };

    if SUFFIXLESS_NAMES.contains(&name.as_str()) {
        return whole(name);
    }

    let tokens: Vec<&str> = name.split_whitespace().collect();
    let Some((last, rest)) = tokens.split_last() else {
        return whole(name);
    };
    if rest.is_empty() {
        return whole(name);
    }

    let last_lower = last.to_lowercase();
    if let Some(suffix) = standard_suffix(&last_lower) {
        return StreetName {
            base: rest.join(" "),
            suffix: suffix.to_owned(),
        };
    }

    // Ordinals such as "3RD" are self-descriptive and carry no suffix.
    whole(name)
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

/// Drop highway-named candidates and normalise the names of the rest.
///
/// Lengths are rounded to hundredths of a mile and identifiers are derived
/// from the context city and the source element.
#[must_use]
pub fn classify(candidates: Vec<StreetCandidate>, context: &ExtractionContext) -> Vec<StreetEntity> {
    let total = candidates.len();
    let streets: Vec<StreetEntity> = candidates
        .into_iter()
        .filter_map(|candidate| {
            if is_excluded_road_name(&candidate.name) {
                debug!("Skipping highway/freeway: {}", candidate.name);
                return None;
            }
            let name = parse_street_name(&candidate.name);
            if name.base.is_empty() {
                debug!("Skipping unnamed candidate {}", candidate.source);
                return None;
            }
            Some(StreetEntity {
                id: context.entity_id(candidate.source),
                full_name: name.full_name(),
                base_name: name.base,
                suffix: name.suffix,
                geometry: candidate.geometry,
                length_miles: round_to_hundredths(candidate.length_miles),
                city: context.city.clone(),
                state: context.state.clone(),
            })
        })
        .collect();
    info!(
        "Classified {} of {total} candidates as city streets",
        streets.len()
    );
    streets
}
