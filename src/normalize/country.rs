//! Country identifier tables and normalization.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::GreeceSpelling;

/// EU member ISO2 tokens accepted on input. Contains both `EL` and `GR`;
/// the set denotes 28 member states, with Greece present under two spellings.
const EU_ISO2: [&str; 29] = [
    "AT", "BE", "BG", "CY", "CZ", "DE", "DK", "EE", "EL", "ES", "FI", "FR", "GR", "HR", "HU",
    "IE", "IT", "LT", "LU", "LV", "MT", "NL", "PL", "PT", "RO", "SE", "SI", "SK", "UK",
];

const ISO3_TO_ISO2: [(&str, &str); 28] = [
    ("AUT", "AT"), ("BEL", "BE"), ("BGR", "BG"), ("HRV", "HR"), ("CYP", "CY"), ("CZE", "CZ"),
    ("DNK", "DK"), ("EST", "EE"), ("FIN", "FI"), ("FRA", "FR"), ("DEU", "DE"), ("GRC", "EL"),
    ("HUN", "HU"), ("IRL", "IE"), ("ITA", "IT"), ("LVA", "LV"), ("LTU", "LT"), ("LUX", "LU"),
    ("MLT", "MT"), ("NLD", "NL"), ("POL", "PL"), ("PRT", "PT"), ("ROU", "RO"), ("SVK", "SK"),
    ("SVN", "SI"), ("ESP", "ES"), ("SWE", "SE"), ("GBR", "UK"),
];

/// Eurostat extractions label countries by name
const NAME_TO_ISO2: [(&str, &str); 30] = [
    ("Austria", "AT"), ("Belgium", "BE"), ("Bulgaria", "BG"), ("Croatia", "HR"),
    ("Cyprus", "CY"), ("Czechia", "CZ"), ("Czech Republic", "CZ"), ("Denmark", "DK"),
    ("Estonia", "EE"), ("Finland", "FI"), ("France", "FR"), ("Germany", "DE"),
    ("Greece", "EL"), ("Hungary", "HU"), ("Ireland", "IE"), ("Italy", "IT"),
    ("Latvia", "LV"), ("Lithuania", "LT"), ("Luxembourg", "LU"), ("Malta", "MT"),
    ("Netherlands", "NL"), ("Poland", "PL"), ("Portugal", "PT"), ("Romania", "RO"),
    ("Slovakia", "SK"), ("Slovenia", "SI"), ("Spain", "ES"), ("Sweden", "SE"),
    ("United Kingdom", "UK"), ("UK", "UK"),
];

/// Alias tables mapping raw country tokens to one canonical ISO2 key space.
///
/// Tokens with no entry in any table are unresolvable: the caller drops the
/// row and counts it, never defaults it.
#[derive(Debug, Clone)]
pub struct CountryTables {
    greece: GreeceSpelling,
    iso3: FxHashMap<&'static str, &'static str>,
    names: FxHashMap<&'static str, &'static str>,
    eu_iso2: FxHashSet<&'static str>,
}

impl CountryTables {
    /// Build the tables with the chosen canonical Greece spelling
    #[must_use]
    pub fn new(greece: GreeceSpelling) -> Self {
        Self {
            greece,
            iso3: ISO3_TO_ISO2.iter().copied().collect(),
            names: NAME_TO_ISO2.iter().copied().collect(),
            eu_iso2: EU_ISO2.iter().copied().collect(),
        }
    }

    /// Canonical two-letter code for Greece under this run's convention
    #[must_use]
    pub fn canonical_greece(&self) -> &'static str {
        self.greece.code()
    }

    /// Normalize a raw country token (ISO2, ISO3, or enumerated name) to
    /// the canonical ISO2 code. Returns `None` for unresolvable tokens.
    #[must_use]
    pub fn normalize(&self, token: &str) -> Option<String> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        if token.len() == 2 {
            let upper = token.to_ascii_uppercase();
            if self.eu_iso2.contains(upper.as_str()) {
                return Some(self.canonicalize_iso2(&upper));
            }
            // fall through: two-letter names like "UK" also live in the name table
        }
        if token.len() == 3 {
            let upper = token.to_ascii_uppercase();
            if let Some(iso2) = self.iso3.get(upper.as_str()) {
                return Some(self.canonicalize_iso2(iso2));
            }
        }
        self.names
            .get(token)
            .map(|iso2| self.canonicalize_iso2(iso2))
    }

    /// Whether a canonical ISO2 code belongs to the EU membership set
    #[must_use]
    pub fn is_eu(&self, iso2: &str) -> bool {
        self.eu_iso2.contains(iso2)
    }

    /// The canonical member codes under this run's Greece convention,
    /// sorted, one entry per member state
    #[must_use]
    pub fn member_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = EU_ISO2
            .iter()
            .map(|c| self.canonicalize_iso2(c))
            .collect();
        codes.sort();
        codes.dedup();
        codes
    }

    /// ISO3 codes of the member set, for sources keyed on ISO3
    #[must_use]
    pub fn member_iso3(&self) -> Vec<&'static str> {
        let mut codes: Vec<&'static str> = ISO3_TO_ISO2.iter().map(|(iso3, _)| *iso3).collect();
        codes.sort_unstable();
        codes
    }

    fn canonicalize_iso2(&self, iso2: &str) -> String {
        if iso2 == "EL" || iso2 == "GR" {
            self.canonical_greece().to_string()
        } else {
            iso2.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_converge_to_one_code() {
        let tables = CountryTables::new(GreeceSpelling::El);
        for token in ["DE", "DEU", "Germany"] {
            assert_eq!(tables.normalize(token).as_deref(), Some("DE"));
        }
    }

    #[test]
    fn greece_spelling_is_configurable_and_bidirectional() {
        let el = CountryTables::new(GreeceSpelling::El);
        for token in ["EL", "GR", "GRC", "Greece"] {
            assert_eq!(el.normalize(token).as_deref(), Some("EL"), "token {token}");
        }
        let gr = CountryTables::new(GreeceSpelling::Gr);
        for token in ["EL", "GR", "GRC", "Greece"] {
            assert_eq!(gr.normalize(token).as_deref(), Some("GR"), "token {token}");
        }
    }

    #[test]
    fn unknown_tokens_are_unresolved() {
        let tables = CountryTables::new(GreeceSpelling::El);
        assert_eq!(tables.normalize("US"), None);
        assert_eq!(tables.normalize("Atlantis"), None);
        assert_eq!(tables.normalize(""), None);
    }

    #[test]
    fn member_codes_have_one_entry_per_state() {
        let tables = CountryTables::new(GreeceSpelling::El);
        let codes = tables.member_codes();
        assert_eq!(codes.len(), 28);
        assert!(codes.contains(&"EL".to_string()));
        assert!(!codes.contains(&"GR".to_string()));
    }
}
