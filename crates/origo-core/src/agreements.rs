//! Trade agreement membership tables.
//!
//! A material is *originating* when its origin code belongs to the
//! originating set of the agreement in force. This module is the single
//! source of truth for that set; the value alternatives, the wholly-obtained
//! check and the derived calculations all go through [`is_originating`].

use lazy_static::lazy_static;
use std::collections::BTreeMap;

/// EU member state codes. The literal region code "EU" is accepted alongside.
const EU_MEMBERS: &[&str] = &[
    "AT", "BE", "BG", "HR", "CY", "CZ", "DK", "EE", "FI", "FR", "DE", "GR",
    "HU", "IE", "IT", "LV", "LT", "LU", "MT", "NL", "PL", "PT", "RO", "SK",
    "SI", "ES", "SE",
];

lazy_static! {
    /// Partner codes per agreement, keyed by upper-cased agreement code.
    /// The EU side is implicit in every entry.
    static ref PARTNERS: BTreeMap<&'static str, Vec<&'static str>> = {
        let mut m = BTreeMap::new();
        m.insert("CETA", vec!["CA"]);
        m.insert("TCA", vec!["GB", "UK"]);
        m.insert("EU-UK", vec!["GB", "UK"]);
        m.insert("EU-JAPAN", vec!["JP"]);
        m.insert("EPA-JP", vec!["JP"]);
        m.insert("EU-KOREA", vec!["KR"]);
        m.insert(
            "PEM",
            vec![
                "CH", "NO", "IS", "LI", "TR", "FO", "MA", "TN", "DZ", "EG",
                "IL", "JO", "LB", "PS", "GE", "MD", "UA", "AL", "BA", "ME",
                "MK", "RS", "XK",
            ],
        );
        m
    };
}

/// Whether `origin` qualifies as originating under `agreement`.
///
/// Unknown agreements fall back to the EU-only set, so a material marked
/// "EU" or with an EU member code still counts while partner-side inputs do
/// not. Codes compare case-insensitively.
pub fn is_originating(agreement: &str, origin: &str) -> bool {
    let origin = origin.trim().to_ascii_uppercase();
    if origin == "EU" || EU_MEMBERS.contains(&origin.as_str()) {
        return true;
    }

    let agreement = agreement.trim().to_ascii_uppercase();
    PARTNERS
        .get(agreement.as_str())
        .is_some_and(|partners| partners.contains(&origin.as_str()))
}
