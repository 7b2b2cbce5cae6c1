//! Industry identifier tables: IFR → NACE Rev. 2 crosswalk and names.

use rustc_hash::{FxHashMap, FxHashSet};

/// IFR industry code → KLEMS NACE Rev. 2 manufacturing bucket.
///
/// Many-to-one by construction: several detailed IFR codes fold into one
/// NACE bucket. This is deliberate low-resolution harmonization; codes with
/// no entry are dropped rather than pooled into an "other" bucket.
const IFR_TO_NACE: [(&str, &str); 24] = [
    ("10-12", "C10-C12"),
    ("13-15", "C13-C15"),
    ("16", "C16-C18"),
    ("17-18", "C16-C18"),
    ("19", "C19"),
    ("19-22", "C20-C21"),
    ("20", "C20-C21"),
    ("20-21", "C20-C21"),
    ("20-23", "C20-C21"),
    ("21", "C21"),
    ("22", "C22-C23"),
    ("23", "C22-C23"),
    ("24", "C24-C25"),
    ("24-25", "C24-C25"),
    ("25", "C24-C25"),
    ("26", "C26-C27"),
    ("26-27", "C26-C27"),
    ("27", "C26-C27"),
    ("28", "C28"),
    ("29", "C29-C30"),
    ("29-30", "C29-C30"),
    ("30", "C29-C30"),
    ("D", "C"),
    ("D_other", "C31-C33"),
];

/// NACE Rev. 2 manufacturing bucket display names
const NACE_NAMES: [(&str, &str); 13] = [
    ("C10-C12", "Food, beverages, tobacco"),
    ("C13-C15", "Textiles, apparel, leather"),
    ("C16-C18", "Wood, paper, printing"),
    ("C19", "Coke, refined petroleum"),
    ("C20-C21", "Chemicals, pharmaceuticals"),
    ("C21", "Pharmaceuticals"),
    ("C22-C23", "Rubber, plastics, non-metallic minerals"),
    ("C24-C25", "Basic metals, fabricated metal"),
    ("C26-C27", "Computer, electronic, electrical equipment"),
    ("C28", "Machinery and equipment n.e.c."),
    ("C29-C30", "Motor vehicles, other transport"),
    ("C31-C33", "Furniture, other manufacturing, repair"),
    ("C", "Manufacturing total"),
];

/// Editorially-chosen high robot-use industries. Static classification,
/// not data-derived.
const HIGH_ROBOT_NACE: [&str; 3] = ["C26-C27", "C28", "C29-C30"];

/// Static crosswalk from detailed industry codes to the canonical NACE
/// Rev. 2 manufacturing taxonomy.
#[derive(Debug, Clone)]
pub struct IndustryCrosswalk {
    ifr_to_nace: FxHashMap<&'static str, &'static str>,
    names: FxHashMap<&'static str, &'static str>,
    high_robot: FxHashSet<&'static str>,
}

impl IndustryCrosswalk {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ifr_to_nace: IFR_TO_NACE.iter().copied().collect(),
            names: NACE_NAMES.iter().copied().collect(),
            high_robot: HIGH_ROBOT_NACE.iter().copied().collect(),
        }
    }

    /// Map an IFR industry code to its NACE bucket, or `None` if the code
    /// has no entry (the row is dropped, not defaulted)
    #[must_use]
    pub fn to_nace(&self, ifr_code: &str) -> Option<&'static str> {
        self.ifr_to_nace.get(ifr_code.trim()).copied()
    }

    /// Whether an IFR industry code is known to the crosswalk
    #[must_use]
    pub fn contains(&self, ifr_code: &str) -> bool {
        self.ifr_to_nace.contains_key(ifr_code.trim())
    }

    /// Display name of a NACE bucket
    #[must_use]
    pub fn name_of(&self, nace: &str) -> Option<&'static str> {
        self.names.get(nace).copied()
    }

    /// Whether a NACE bucket is in the static high robot-use set
    #[must_use]
    pub fn is_high_robot(&self, nace: &str) -> bool {
        self.high_robot.contains(nace)
    }

    /// The distinct NACE buckets reachable through the crosswalk, sorted
    #[must_use]
    pub fn nace_buckets(&self) -> Vec<&'static str> {
        let mut buckets: Vec<&'static str> = self.ifr_to_nace.values().copied().collect();
        buckets.sort_unstable();
        buckets.dedup();
        buckets
    }
}

impl Default for IndustryCrosswalk {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a NACE Rev. 2 division number falls in manufacturing (10–33).
/// Used when folding ind1990 weights into NACE2 divisions.
#[must_use]
pub const fn is_manufacturing_division(division: i64) -> bool {
    division >= 10 && division <= 33
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crosswalk_is_many_to_one() {
        let xwalk = IndustryCrosswalk::new();
        assert_eq!(xwalk.to_nace("20"), Some("C20-C21"));
        assert_eq!(xwalk.to_nace("20-21"), Some("C20-C21"));
        assert_eq!(xwalk.to_nace("19-22"), Some("C20-C21"));
    }

    #[test]
    fn unmapped_codes_are_dropped_not_defaulted() {
        let xwalk = IndustryCrosswalk::new();
        assert_eq!(xwalk.to_nace("99"), None);
        assert!(!xwalk.contains("000"));
    }

    #[test]
    fn high_robot_set_is_static() {
        let xwalk = IndustryCrosswalk::new();
        assert!(xwalk.is_high_robot("C28"));
        assert!(xwalk.is_high_robot("C26-C27"));
        assert!(!xwalk.is_high_robot("C10-C12"));
    }

    #[test]
    fn manufacturing_division_bounds() {
        assert!(is_manufacturing_division(10));
        assert!(is_manufacturing_division(33));
        assert!(!is_manufacturing_division(9));
        assert!(!is_manufacturing_division(34));
    }
}
