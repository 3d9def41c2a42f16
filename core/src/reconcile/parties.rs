use crate::error::{CoreError, CoreResult, EntityClass};
use crate::model::{is_not_specified, Address, Party, NOT_SPECIFIED};
use crate::normalize::parse_address;
use crate::reconcile::fields;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::{debug, warn};

pub const MIN_PARTIES: usize = 2;
const MIN_NAME_CHARS: usize = 4;

/// Case-insensitive substring denylist for placeholder party names.
pub const PLACEHOLDER_NAMES: &[&str] = &[
    "party a", "party b", "party 1", "party 2", "party one", "party two",
    "company a", "company b", "company 1", "company 2", "company one", "company two",
    "not specified", "not available", "to be determined", "tbd", "n/a",
    "first party", "second party", "third party", "contractor", "client",
    "supplier", "customer", "vendor", "buyer", "seller", "licensor", "licensee",
];

fn entity_indicator_regex() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        // Long forms match any case; short forms only as written.
        Regex::new(
            r"(?i:\b(?:inc|incorporated|llc|l\.l\.c|ltd|limited|corp|corporation|company|international|holdings?|group|enterprises|pte|pty|gmbh|plc|llp)\b)|\b(?:AG|SA|SAS|LP|Co)\b",
        )
        .expect("entity indicator regex")
    })
}

pub fn has_entity_indicator(name: &str) -> bool {
    entity_indicator_regex().is_match(name)
}

pub fn is_placeholder_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    PLACEHOLDER_NAMES.iter().any(|p| lower.contains(p))
}

fn is_capitalized_phrase(name: &str) -> bool {
    name.chars().next().map(|c| c.is_uppercase()).unwrap_or(false)
        && name.split_whitespace().count() >= 2
}

/// Why a candidate name is not a real party, or `None` when it is acceptable.
pub fn party_name_defect(name: &str) -> Option<String> {
    let name = name.trim();
    if name.chars().count() < MIN_NAME_CHARS {
        return Some(format!("name too short: '{}'", name));
    }
    if is_placeholder_name(name) {
        return Some(format!("generic placeholder name: '{}'", name));
    }
    if !has_entity_indicator(name) && !is_capitalized_phrase(name) {
        return Some(format!(
            "no legal-entity indicator or proper-noun structure: '{}'",
            name
        ));
    }
    None
}

/// Strip quotes, and a leading "the" when what remains is itself an entity name.
pub fn display_name(legal_name: &str) -> String {
    let cleaned: String = legal_name
        .chars()
        .filter(|c| !matches!(c, '"' | '\'' | '“' | '”' | '‘' | '’'))
        .collect();
    let cleaned = cleaned.trim();
    if let (Some(head), Some(rest)) = (cleaned.get(..4), cleaned.get(4..)) {
        let rest = rest.trim();
        if head.eq_ignore_ascii_case("the ") && !rest.is_empty() && has_entity_indicator(rest) {
            return rest.to_string();
        }
    }
    cleaned.to_string()
}

fn structured_address(v: &Value) -> Address {
    let get = |k: &str| fields::text(v, k).unwrap_or_default();
    Address {
        street: get("street"),
        city: get("city"),
        state: get("state"),
        country: get("country"),
        postal_code: fields::text(v, "postalCode")
            .or_else(|| fields::text(v, "postal_code"))
            .unwrap_or_default(),
    }
}

fn address_of(raw: &Value) -> (Address, String) {
    match raw.get("address") {
        Some(v @ Value::Object(_)) => {
            let a = structured_address(v);
            let line = [&a.street, &a.city, &a.state, &a.country, &a.postal_code]
                .into_iter()
                .filter(|s| !is_not_specified(s))
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            (a, line)
        }
        Some(Value::String(s)) if !is_not_specified(s) => (parse_address(s), s.trim().to_string()),
        _ => (Address::default(), String::new()),
    }
}

pub fn reconcile_parties(raw: &[Value]) -> CoreResult<Vec<Party>> {
    let mut parties = Vec::new();
    for candidate in raw {
        let Some(legal_name) = fields::text(candidate, "legal_name")
            .or_else(|| fields::text(candidate, "legalName"))
            .or_else(|| fields::text(candidate, "name"))
        else {
            debug!("party candidate without a name skipped");
            continue;
        };
        if let Some(defect) = party_name_defect(&legal_name) {
            warn!(%defect, "rejected party candidate");
            continue;
        }
        let (address, line) = address_of(candidate);
        parties.push(Party {
            id: format!("party_{}", parties.len() + 1),
            name: display_name(&legal_name),
            legal_name,
            location: if line.is_empty() {
                NOT_SPECIFIED.to_string()
            } else {
                line
            },
            address,
            role: fields::text(candidate, "role").unwrap_or_else(|| "Contract Party".to_string()),
            entity_type: fields::text(candidate, "entity_type")
                .or_else(|| fields::text(candidate, "entityType"))
                .unwrap_or_else(|| "Company".to_string()),
        });
    }
    if parties.len() < MIN_PARTIES {
        return Err(CoreError::reconciliation(
            EntityClass::Parties,
            format!(
                "{} valid part{} identified, minimum {} required",
                parties.len(),
                if parties.len() == 1 { "y" } else { "ies" },
                MIN_PARTIES
            ),
        ));
    }
    Ok(parties)
}
