use crate::error::{CoreError, CoreResult, EntityClass};
use crate::model::KeyTerm;
use crate::reconcile::fields;
use serde_json::Value;

pub fn reconcile_key_terms(raw: &[Value]) -> CoreResult<Vec<KeyTerm>> {
    let terms: Vec<KeyTerm> = raw
        .iter()
        .filter_map(|t| {
            let term = fields::text(t, "term")?;
            Some(KeyTerm {
                term,
                definition: fields::text(t, "definition")
                    .unwrap_or_else(|| "As defined in the contract".to_string()),
                importance: fields::text(t, "importance")
                    .map(|s| fields::title_case(&s))
                    .unwrap_or_else(|| "Medium".to_string()),
            })
        })
        .collect();
    if terms.is_empty() {
        return Err(CoreError::reconciliation(
            EntityClass::KeyTerms,
            "no key terms identified",
        ));
    }
    Ok(terms)
}
