//! Static gazetteer of known place names
//!
//! Iteration order is declaration order and is part of the contract: the
//! heuristic resolver takes the first matching entry, so reordering entries
//! can change which city an ambiguous region resolves to.

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use gb_core::Coordinate;

/// Major Russian cities, in resolver priority order
const RUSSIAN_CITIES: &[(&str, f64, f64)] = &[
    ("Москва", 55.7558, 37.6173),
    ("Санкт-Петербург", 59.9311, 30.3609),
    ("Новосибирск", 55.0084, 82.9357),
    ("Екатеринбург", 56.8431, 60.6454),
    ("Казань", 55.8304, 49.0661),
    ("Нижний Новгород", 56.2965, 43.9361),
    ("Челябинск", 55.1644, 61.4368),
    ("Самара", 53.2001, 50.15),
    ("Омск", 54.9885, 73.3242),
    ("Ростов-на-Дону", 47.2357, 39.7015),
    ("Уфа", 54.7388, 55.9721),
    ("Красноярск", 56.0184, 92.8672),
    ("Пермь", 58.0105, 56.2502),
    ("Волгоград", 48.7080, 44.5133),
    ("Воронеж", 51.6720, 39.1843),
    ("Саратов", 51.5924, 46.0348),
    ("Краснодар", 45.0355, 38.9753),
    ("Тольятти", 53.5303, 49.3461),
    ("Ижевск", 56.8527, 53.2118),
    ("Ульяновск", 54.3142, 48.4031),
];

static DEFAULT_GAZETTEER: Lazy<Gazetteer> = Lazy::new(|| {
    Gazetteer::from_entries(
        RUSSIAN_CITIES
            .iter()
            .map(|&(name, lat, lng)| (name.to_string(), Coordinate::new(lat, lng))),
    )
});

/// One gazetteer entry with its case-folded key
#[derive(Debug, Clone)]
pub struct GazetteerEntry {
    pub name: String,
    pub folded: String,
    pub coordinate: Coordinate,
}

/// Ordered, immutable place-name table
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    entries: IndexMap<String, GazetteerEntry>,
}

impl Gazetteer {
    /// Build from `(name, coordinate)` pairs. A repeated name keeps its first
    /// position and takes the last coordinate.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, Coordinate)>) -> Self {
        let mut map = IndexMap::new();
        for (name, coordinate) in entries {
            let entry = GazetteerEntry {
                folded: name.to_lowercase(),
                name: name.clone(),
                coordinate,
            };
            map.insert(name, entry);
        }
        Self { entries: map }
    }

    /// The built-in table of 20 major Russian cities
    pub fn russian_cities() -> &'static Gazetteer {
        &DEFAULT_GAZETTEER
    }

    /// Exact, case-sensitive lookup
    pub fn get(&self, name: &str) -> Option<Coordinate> {
        self.entries.get(name).map(|entry| entry.coordinate)
    }

    /// Entries in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &GazetteerEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let gazetteer = Gazetteer::russian_cities();
        assert_eq!(gazetteer.len(), 20);
        assert_eq!(gazetteer.get("Казань"), Some(Coordinate::new(55.8304, 49.0661)));
        assert_eq!(gazetteer.get("казань"), None);
        assert_eq!(gazetteer.iter().next().map(|e| e.name.as_str()), Some("Москва"));
    }

    #[test]
    fn test_declaration_order_preserved() {
        let gazetteer = Gazetteer::from_entries(vec![
            ("Б".to_string(), Coordinate::new(1.0, 1.0)),
            ("А".to_string(), Coordinate::new(2.0, 2.0)),
            ("Б".to_string(), Coordinate::new(3.0, 3.0)),
        ]);

        let names: Vec<&str> = gazetteer.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Б", "А"]);
        assert_eq!(gazetteer.get("Б"), Some(Coordinate::new(3.0, 3.0)));
    }
}
