use crate::error::{CoreError, CoreResult, EntityClass};
use crate::model::{Pricing, ProductItem, NOT_SPECIFIED};
use crate::normalize::{detect_currency, extract_numeric_value, first_quantity, infer_unit};
use crate::reconcile::fields;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::warn;

/// Legal boilerplate that shows up where a product name should be.
pub const FRAGMENT_PHRASES: &[&str] = &[
    "listed in", "as specified", "pursuant to", "will be deemed", "shall be",
    "according to", "in accordance with", "as defined", "as described",
    "products and services", "goods and services", "deliverables",
    "items", "materials", "components", "such products", "said products",
    "services as specified", "contract deliverables", "work product",
    "subject matter", "scope of work", "statement of work", "exhibit",
    "schedule", "appendix", "attachment", "addendum",
];

const DETERMINERS: &[&str] = &["the", "all", "any", "such", "said", "these", "those"];
const GENERIC_NOUNS: &[&str] = &["product", "products", "service", "services", "item", "deliverable", "goods"];

pub fn is_fragment_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    FRAGMENT_PHRASES.iter().any(|f| lower.contains(f))
}

fn all_lower_re() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^[a-z\s]+$").expect("lowercase regex"))
}

fn all_upper_re() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^[A-Z\s]+$").expect("uppercase regex"))
}

pub fn product_name_defect(name: &str) -> Option<String> {
    let name = name.trim();
    if name.chars().count() <= 3 {
        return Some(format!("product name too short: '{}'", name));
    }
    if is_fragment_name(name) {
        return Some(format!("product name is a text fragment: '{}'", name));
    }
    let first_word = name.split_whitespace().next().unwrap_or("").to_lowercase();
    if name.split_whitespace().count() > 1 && DETERMINERS.contains(&first_word.as_str()) {
        return Some(format!("product name starts with a determiner: '{}'", name));
    }
    if all_lower_re().is_match(name) || all_upper_re().is_match(name) {
        return Some(format!("product name has no proper casing: '{}'", name));
    }
    if GENERIC_NOUNS.contains(&name.to_lowercase().as_str()) {
        return Some(format!("product name is a generic noun: '{}'", name));
    }
    if !name.chars().next().map(|c| c.is_uppercase() || c.is_ascii_digit()).unwrap_or(false) {
        return Some(format!("product name is not capitalized: '{}'", name));
    }
    None
}

pub fn product_category(name: &str) -> &'static str {
    let n = name.to_lowercase();
    if n.contains("book") {
        "Intellectual Property"
    } else if ["supplement", "vitamin", "health", "organic", "formula", "protein"]
        .iter()
        .any(|k| n.contains(k))
    {
        "Health Products"
    } else if ["software", "license", "licence", "subscription", "saas"].iter().any(|k| n.contains(k)) {
        "Software"
    } else if n.contains("new product") {
        "Future Deliverables"
    } else {
        "Contract Deliverable"
    }
}

/// Explicit numeric field first, then the first number in the quantity text.
fn quantity_of(raw: &Value) -> Option<(f64, String)> {
    let text = fields::text(raw, "quantity_text")
        .or_else(|| fields::text(raw, "quantity"))
        .unwrap_or_default();
    let q = fields::number(raw, "quantity_numeric")
        .or_else(|| raw.get("quantity").and_then(|v| v.as_f64()))
        .or_else(|| first_quantity(&text))?;
    (q > 0.0).then_some((q, text))
}

/// `contract_currency` is used when the price text carries no currency of its own.
pub fn reconcile_products(raw: &[Value], contract_currency: &str) -> CoreResult<Vec<ProductItem>> {
    let mut products = Vec::new();
    for candidate in raw {
        let Some(name) = fields::text(candidate, "name") else {
            continue;
        };
        if let Some(defect) = product_name_defect(&name) {
            warn!(%defect, "rejected product candidate");
            continue;
        }
        let Some((quantity, quantity_text)) = quantity_of(candidate) else {
            warn!(product = %name, "rejected product without a positive quantity");
            continue;
        };
        let unit = fields::text(candidate, "unit")
            .or_else(|| infer_unit(&quantity_text))
            .unwrap_or_else(|| "units".to_string());

        let price_text = fields::text(candidate, "price").unwrap_or_default();
        let unit_price = extract_numeric_value(&price_text).unwrap_or(0.0);
        let currency = detect_currency(&price_text).unwrap_or(contract_currency);
        let total_price = if unit_price > 0.0 { unit_price * quantity } else { 0.0 };

        products.push(ProductItem {
            id: format!("product_{}", products.len() + 1),
            description: fields::text_or_sentinel(candidate, "description"),
            quantity,
            unit,
            category: product_category(&name).to_string(),
            specifications: fields::text_or_sentinel(candidate, "specifications"),
            delivery_terms: fields::text(candidate, "delivery_terms")
                .or_else(|| fields::text(candidate, "schedule_reference"))
                .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            pricing: Pricing {
                unit_price,
                currency: currency.to_string(),
                total_price,
                minimum_order: fields::text_or_sentinel(candidate, "minimum_order"),
            },
            name,
        });
    }
    if products.is_empty() {
        return Err(CoreError::reconciliation(
            EntityClass::Products,
            "no valid products or services identified",
        ));
    }
    Ok(products)
}
