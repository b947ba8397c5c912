// src/normalize.rs
//
// Pure free-text normalizers. Nothing here touches the session; parse
// failures degrade to empty or unset values instead of propagating.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::debug;

use crate::record::CaseRecord;

/// Ordinal word forms for 1–30, the range the auditor's street index uses.
/// Numbers outside this range pass through verbatim; that is a documented
/// limitation of the source data, not something to widen silently.
static ORDINAL_WORDS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("1", "First"),
        ("2", "Second"),
        ("3", "Third"),
        ("4", "Fourth"),
        ("5", "Fifth"),
        ("6", "Sixth"),
        ("7", "Seventh"),
        ("8", "Eighth"),
        ("9", "Ninth"),
        ("10", "Tenth"),
        ("11", "Eleventh"),
        ("12", "Twelfth"),
        ("13", "Thirteenth"),
        ("14", "Fourteenth"),
        ("15", "Fifteenth"),
        ("16", "Sixteenth"),
        ("17", "Seventeenth"),
        ("18", "Eighteenth"),
        ("19", "Nineteenth"),
        ("20", "Twentieth"),
        ("21", "Twenty First"),
        ("22", "Twenty Second"),
        ("23", "Twenty Third"),
        ("24", "Twenty Fourth"),
        ("25", "Twenty Fifth"),
        ("26", "Twenty Sixth"),
        ("27", "Twenty Seventh"),
        ("28", "Twenty Eighth"),
        ("29", "Twenty Ninth"),
        ("30", "Thirtieth"),
    ])
});

fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

/// Convert the first numeric ordinal token in `text` ("3RD", "21") into its
/// word form ("Third", "Twenty First"). Unmapped numbers and texts without a
/// numeric token come back unchanged.
pub fn ordinal_to_words(text: &str) -> String {
    for token in text.split_whitespace() {
        let key = if is_numeric(token) {
            token
        } else if token.is_ascii()
            && token.len() > 2
            && is_numeric(&token[..token.len() - 2])
            && matches!(&token[token.len() - 2..], "ST" | "ND" | "RD" | "TH")
        {
            &token[..token.len() - 2]
        } else {
            continue;
        };
        return match ORDINAL_WORDS.get(key) {
            Some(word) => (*word).to_string(),
            None => text.to_string(),
        };
    }
    text.to_string()
}

/// Structured address; consumed by the property search, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAddress {
    pub street_no: String,
    pub street_name: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl ParsedAddress {
    /// Too sparse to drive a property search.
    pub fn is_unusable(&self) -> bool {
        self.street_no.is_empty() && self.street_name.is_empty()
    }
}

/// Split a free-text postal address. First comma segment is the street, last
/// is "city state zip". A street of fewer than two tokens yields the
/// all-empty sentinel meaning "no usable address".
pub fn parse_address(address: &str) -> ParsedAddress {
    let segments: Vec<&str> = address.split(',').collect();
    let street: Vec<&str> = segments[0].split_whitespace().collect();
    if street.len() < 2 {
        return ParsedAddress::default();
    }

    let street_no = street[0].to_string();
    // A one-character second token is a direction marker ("E 3RD AVE");
    // the street name is the token after it.
    let street_name = if street[1].len() > 1 {
        ordinal_to_words(street[1])
    } else if street.len() > 2 {
        ordinal_to_words(street[2])
    } else {
        String::new()
    };

    let tail: Vec<&str> = if segments.len() > 1 {
        segments.last().unwrap().split_whitespace().collect()
    } else {
        Vec::new()
    };

    ParsedAddress {
        street_no,
        street_name,
        city: tail.first().unwrap_or(&"").to_string(),
        state: tail.get(1).unwrap_or(&"").to_string(),
        zip: tail.get(2).unwrap_or(&"").to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct NameParts {
    first: String,
    middle: String,
    last: String,
}

/// Split a "Last, First Middle" name into parts. `None` for empty input; a
/// name without a comma is all last-name.
fn split_name(full: &str) -> Option<NameParts> {
    let full = full.trim();
    if full.is_empty() {
        return None;
    }
    let (last, rest) = match full.split_once(", ") {
        Some((last, rest)) => (last, rest),
        None => (full, ""),
    };
    let mut given = rest.split(' ').filter(|t| !t.is_empty());
    Some(NameParts {
        first: given.next().unwrap_or("").to_string(),
        middle: given.next().unwrap_or("").to_string(),
        last: last.to_string(),
    })
}

/// Parse `case_name` into the decedent name slots. No-op when unset/empty.
pub fn parse_decedent_name(record: &mut CaseRecord) {
    let Some(parts) = record.case_name.as_deref().and_then(split_name) else {
        debug!(case = %record.caseno, "no case name to parse");
        return;
    };
    record.decedent_first = Some(parts.first);
    record.decedent_middle = Some(parts.middle);
    record.decedent_last = Some(parts.last);
}

/// Parse `admin_name` into the fiduciary name slots. No-op when unset/empty.
pub fn parse_admin_name(record: &mut CaseRecord) {
    let Some(parts) = record.admin_name.as_deref().and_then(split_name) else {
        return;
    };
    record.admin_first = Some(parts.first);
    record.admin_middle = Some(parts.middle);
    record.admin_last = Some(parts.last);
}

/// Parse `attorney_name` into the attorney name slots. No-op when unset/empty.
pub fn parse_attorney_name(record: &mut CaseRecord) {
    let Some(parts) = record.attorney_name.as_deref().and_then(split_name) else {
        return;
    };
    record.attorney_first = Some(parts.first);
    record.attorney_middle = Some(parts.middle);
    record.attorney_last = Some(parts.last);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinal_tokens_map_to_words() {
        assert_eq!(ordinal_to_words("3RD"), "Third");
        assert_eq!(ordinal_to_words("1ST"), "First");
        assert_eq!(ordinal_to_words("21"), "Twenty First");
        assert_eq!(ordinal_to_words("30"), "Thirtieth");
    }

    #[test]
    fn every_supported_number_has_a_word() {
        for n in 1..=30 {
            let token = n.to_string();
            assert_ne!(ordinal_to_words(&token), token, "no word form for {n}");
        }
    }

    #[test]
    fn unsupported_tokens_pass_through() {
        assert_eq!(ordinal_to_words("42ND"), "42ND");
        assert_eq!(ordinal_to_words("31"), "31");
        assert_eq!(ordinal_to_words("MAIN ST"), "MAIN ST");
        assert_eq!(ordinal_to_words(""), "");
    }

    #[test]
    fn address_with_direction_marker() {
        let parsed = parse_address("123 E 3RD AVE, Columbus OH 43215");
        assert_eq!(
            parsed,
            ParsedAddress {
                street_no: "123".to_string(),
                street_name: "Third".to_string(),
                city: "Columbus".to_string(),
                state: "OH".to_string(),
                zip: "43215".to_string(),
            }
        );
    }

    #[test]
    fn plain_street_name_is_kept() {
        let parsed = parse_address("456 OAKWOOD AVE, Columbus OH 43206");
        assert_eq!(parsed.street_no, "456");
        assert_eq!(parsed.street_name, "OAKWOOD");
        assert_eq!(parsed.zip, "43206");
    }

    #[test]
    fn single_token_address_is_unusable() {
        let parsed = parse_address("NoStreetNumberOnly");
        assert_eq!(parsed, ParsedAddress::default());
        assert!(parsed.is_unusable());
    }

    #[test]
    fn address_without_comma_has_no_city_segment() {
        let parsed = parse_address("789 5TH AVE");
        assert_eq!(parsed.street_no, "789");
        assert_eq!(parsed.street_name, "Fifth");
        assert_eq!(parsed.city, "");
        assert_eq!(parsed.state, "");
        assert_eq!(parsed.zip, "");
    }

    #[test]
    fn decedent_name_is_split_into_parts() {
        let mut record = CaseRecord::new("2024ES1");
        record.case_name = Some("DOE, JOHN MICHAEL".to_string());
        parse_decedent_name(&mut record);
        assert_eq!(record.decedent_first.as_deref(), Some("JOHN"));
        assert_eq!(record.decedent_middle.as_deref(), Some("MICHAEL"));
        assert_eq!(record.decedent_last.as_deref(), Some("DOE"));
    }

    #[test]
    fn name_without_middle_leaves_middle_empty() {
        let mut record = CaseRecord::new("2024ES1");
        record.admin_name = Some("SMITH, JANE".to_string());
        parse_admin_name(&mut record);
        assert_eq!(record.admin_first.as_deref(), Some("JANE"));
        assert_eq!(record.admin_middle.as_deref(), Some(""));
        assert_eq!(record.admin_last.as_deref(), Some("SMITH"));
    }

    #[test]
    fn name_without_comma_is_all_last_name() {
        let mut record = CaseRecord::new("2024ES1");
        record.attorney_name = Some("ESTATE OF UNKNOWN".to_string());
        parse_attorney_name(&mut record);
        assert_eq!(record.attorney_first.as_deref(), Some(""));
        assert_eq!(record.attorney_last.as_deref(), Some("ESTATE OF UNKNOWN"));
    }

    #[test]
    fn missing_case_name_is_a_no_op() {
        let mut record = CaseRecord::new("2024ES1");
        parse_decedent_name(&mut record);
        assert_eq!(record.decedent_first, None);
        assert_eq!(record.decedent_middle, None);
        assert_eq!(record.decedent_last, None);

        record.case_name = Some(String::new());
        parse_decedent_name(&mut record);
        assert_eq!(record.decedent_last, None);
    }
}
