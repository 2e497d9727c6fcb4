//! Region text to coordinate resolution

use std::sync::Arc;

use gb_core::Coordinate;

use super::gazetteer::Gazetteer;

/// Administrative center used when nothing matches (Moscow)
pub const NATIONAL_CENTER: Coordinate = Coordinate::new(55.7558, 37.6173);

/// Resolves free-text regions to coordinates.
///
/// Implementations must be total: every input, including the empty string,
/// yields a coordinate.
pub trait RegionResolver: Send + Sync {
    fn resolve(&self, region: &str) -> Coordinate;
}

/// Which step of the heuristic produced a coordinate
#[derive(Debug, Clone, PartialEq)]
pub enum MatchKind {
    /// Region text equals a gazetteer name
    Exact,
    /// A gazetteer name contains the region text or the other way round
    Substring(String),
    /// A single word of the region text matched a gazetteer name
    Word { word: String, entry: String },
    /// No match, default coordinate used
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub coordinate: Coordinate,
    pub kind: MatchKind,
}

/// Gazetteer lookup with substring and word-level fallbacks.
///
/// Steps run cheapest and most specific first:
/// 1. exact, case-sensitive name
/// 2. substring in either direction, first entry in gazetteer order
/// 3. any whitespace-separated word (case-folded) contained in, or
///    containing, a case-folded name, words in text order then entries in
///    gazetteer order
/// 4. the default coordinate
pub struct GazetteerResolver {
    gazetteer: Arc<Gazetteer>,
    default: Coordinate,
}

impl GazetteerResolver {
    pub fn new(gazetteer: Arc<Gazetteer>, default: Coordinate) -> Self {
        Self { gazetteer, default }
    }

    /// Built-in city table with the national center as fallback
    pub fn russian_cities() -> Self {
        Self::new(Arc::new(Gazetteer::russian_cities().clone()), NATIONAL_CENTER)
    }

    pub fn with_default(mut self, default: Coordinate) -> Self {
        self.default = default;
        self
    }

    pub fn default_coordinate(&self) -> Coordinate {
        self.default
    }

    /// Resolve and report which step matched
    pub fn resolve_detailed(&self, region: &str) -> Resolution {
        if let Some(coordinate) = self.gazetteer.get(region) {
            return Resolution {
                coordinate,
                kind: MatchKind::Exact,
            };
        }

        // Every string contains the empty string, so blank text would
        // otherwise match the first entry.
        if region.trim().is_empty() {
            return self.fallback();
        }

        for entry in self.gazetteer.iter() {
            if region.contains(entry.name.as_str()) || entry.name.contains(region) {
                return Resolution {
                    coordinate: entry.coordinate,
                    kind: MatchKind::Substring(entry.name.clone()),
                };
            }
        }

        let folded = region.to_lowercase();
        for word in folded.split_whitespace() {
            for entry in self.gazetteer.iter() {
                if entry.folded.contains(word) || word.contains(entry.folded.as_str()) {
                    return Resolution {
                        coordinate: entry.coordinate,
                        kind: MatchKind::Word {
                            word: word.to_string(),
                            entry: entry.name.clone(),
                        },
                    };
                }
            }
        }

        tracing::trace!("No gazetteer match for region '{}'", region);
        self.fallback()
    }

    fn fallback(&self) -> Resolution {
        Resolution {
            coordinate: self.default,
            kind: MatchKind::Fallback,
        }
    }
}

impl RegionResolver for GazetteerResolver {
    fn resolve(&self, region: &str) -> Coordinate {
        self.resolve_detailed(region).coordinate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> GazetteerResolver {
        GazetteerResolver::russian_cities()
    }

    fn city(name: &str) -> Coordinate {
        Gazetteer::russian_cities().get(name).unwrap()
    }

    #[test]
    fn test_exact_match() {
        let resolution = resolver().resolve_detailed("Пермь");
        assert_eq!(resolution.kind, MatchKind::Exact);
        assert_eq!(resolution.coordinate, city("Пермь"));
    }

    #[test]
    fn test_substring_region_contains_city() {
        let resolution = resolver().resolve_detailed("г. Казань");
        assert_eq!(resolution.kind, MatchKind::Substring("Казань".to_string()));
    }

    #[test]
    fn test_substring_city_contains_region() {
        let resolution = resolver().resolve_detailed("Петербург");
        assert_eq!(resolution.kind, MatchKind::Substring("Санкт-Петербург".to_string()));
    }

    #[test]
    fn test_substring_tie_broken_by_gazetteer_order() {
        // Both Самара and Тольятти occur; Самара is declared first
        let resolution = resolver().resolve_detailed("Тольятти и Самара");
        assert_eq!(resolution.kind, MatchKind::Substring("Самара".to_string()));

        let reordered = GazetteerResolver::new(
            Arc::new(Gazetteer::from_entries(vec![
                ("Тольятти".to_string(), city("Тольятти")),
                ("Самара".to_string(), city("Самара")),
            ])),
            NATIONAL_CENTER,
        );
        assert_eq!(reordered.resolve("Тольятти и Самара"), city("Тольятти"));
    }

    #[test]
    fn test_word_level_match() {
        let resolution = resolver().resolve_detailed("Нижний Тагил");
        assert_eq!(
            resolution.kind,
            MatchKind::Word {
                word: "нижний".to_string(),
                entry: "Нижний Новгород".to_string(),
            }
        );
        assert_eq!(resolution.coordinate, city("Нижний Новгород"));
    }

    #[test]
    fn test_word_level_is_case_insensitive() {
        assert_eq!(resolver().resolve("УФА и пригороды"), city("Уфа"));
    }

    #[test]
    fn test_unmatched_region_falls_back() {
        let resolution = resolver().resolve_detailed("Республика Саха (Якутия)");
        assert_eq!(resolution.kind, MatchKind::Fallback);
        assert_eq!(resolution.coordinate, NATIONAL_CENTER);
    }

    #[test]
    fn test_blank_text_falls_back() {
        assert_eq!(resolver().resolve_detailed("").kind, MatchKind::Fallback);
        assert_eq!(resolver().resolve_detailed("   ").kind, MatchKind::Fallback);
    }

    #[test]
    fn test_custom_default() {
        let resolver = resolver().with_default(Coordinate::new(61.524, 105.3188));
        assert_eq!(resolver.resolve("Чукотка"), Coordinate::new(61.524, 105.3188));
    }
}
