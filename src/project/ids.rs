//! Canonical component identifiers.
//!
//! Component ids are opaque to the rest of Rapuma; the only rule is that they
//! come from this fixed table (three-letter book codes plus the peripheral
//! codes), compared in lower case.

use crate::core::RapumaError;
use std::collections::HashSet;

/// Every id a component may carry, in canonical order.
pub const CANONICAL_IDS: &[&str] = &[
    // Front and back matter
    "frt", "int", "cov",
    // Old Testament
    "gen", "exo", "lev", "num", "deu", "jos", "jdg", "rut", "1sa", "2sa", "1ki", "2ki", "1ch",
    "2ch", "ezr", "neh", "est", "job", "psa", "pro", "ecc", "sng", "isa", "jer", "lam", "ezk",
    "dan", "hos", "jol", "amo", "oba", "jon", "mic", "nam", "hab", "zep", "hag", "zec", "mal",
    // New Testament
    "mat", "mrk", "luk", "jhn", "act", "rom", "1co", "2co", "gal", "eph", "php", "col", "1th",
    "2th", "1ti", "2ti", "tit", "phm", "heb", "jas", "1pe", "2pe", "1jn", "2jn", "3jn", "jud",
    "rev",
    // Deuterocanon
    "tob", "jdt", "esg", "wis", "sir", "bar", "lje", "s3y", "sus", "bel", "1ma", "2ma", "3ma",
    "4ma", "1es", "2es", "man", "ps2", "oda", "pss", "eza", "5ez", "6ez", "dag", "ps3", "2ba",
    "lba", "jub", "eno", "1mq", "2mq", "3mq", "rep", "4ba", "lao",
    // Peripherals
    "bak", "oth", "cnc", "glo", "tdx", "ndx", "xxa", "xxb", "xxc", "xxd", "xxe", "xxf", "xxg",
];

/// Whether `cid` is a canonical id. Comparison ignores case.
#[must_use]
pub fn is_canonical(cid: &str) -> bool {
    let lower = cid.to_ascii_lowercase();
    CANONICAL_IDS.contains(&lower.as_str())
}

/// One-based position of `cid` in the canonical table. Outputs named with it
/// sort in canonical order.
#[must_use]
pub fn canonical_number(cid: &str) -> Option<usize> {
    let lower = cid.to_ascii_lowercase();
    CANONICAL_IDS.iter().position(|id| *id == lower).map(|i| i + 1)
}

/// Normalise and check a requested component list.
///
/// Returns the lower-cased ids in request order, or the first invalid or
/// duplicated id as an error.
pub fn validate_cids<S: AsRef<str>>(cids: &[S]) -> Result<Vec<String>, RapumaError> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(cids.len());
    for cid in cids {
        let cid = cid.as_ref().trim().to_ascii_lowercase();
        if !is_canonical(&cid) {
            return Err(RapumaError::InvalidComponentId {
                reason: "not a known component identifier".to_string(),
                cid,
            });
        }
        if !seen.insert(cid.clone()) {
            return Err(RapumaError::DuplicateComponentId {
                cid,
            });
        }
        out.push(cid);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_cids() {
        assert_eq!(validate_cids(&["GEN", "exo"]).unwrap(), vec!["gen", "exo"]);
        assert!(matches!(
            validate_cids(&["gen", "xyz"]),
            Err(RapumaError::InvalidComponentId { cid, .. }) if cid == "xyz"
        ));
        assert!(matches!(
            validate_cids(&["gen", "Gen"]),
            Err(RapumaError::DuplicateComponentId { cid }) if cid == "gen"
        ));
    }

    #[test]
    fn test_canonical_number_follows_table_order() {
        assert_eq!(canonical_number("frt"), Some(1));
        assert_eq!(canonical_number("GEN"), Some(4));
        assert!(canonical_number("mal") < canonical_number("mat"));
        assert_eq!(canonical_number("xyz"), None);
    }

    #[test]
    fn test_table_has_no_duplicates() {
        let unique: HashSet<_> = CANONICAL_IDS.iter().collect();
        assert_eq!(unique.len(), CANONICAL_IDS.len());
    }
}
