//! Model payload → canonical [`ContractData`].
//!
//! All-or-nothing: the first entity class that fails its contract aborts the whole document,
//! and nothing partially populated is ever returned.

pub mod analytics;
pub mod compliance;
pub mod fields;
pub mod parties;
pub mod payload;
pub mod products;
pub mod risks;
pub mod structure;
pub mod terms;
pub mod timeline;

use crate::adapters::interface::is_unavailable;
use crate::config::PipelineConfig;
use crate::determinism::sha256_hex;
use crate::error::{CoreError, CoreResult, EntityClass};
use crate::extract::{
    ContractTypeExtractor, ContractValueExtractor, CurrencyExtractor, EffectiveDateExtractor,
    ExclusivityExtractor, FieldSource, FieldSources, GoverningLawExtractor, TerritoryExtractor,
    TextFieldExtractor, TitleExtractor,
};
use crate::mapping::{build_clause_map, MapSource};
use crate::model::{
    ContractData, ContractInfo, ContractTerm, FinancialTerms, Metadata, NOT_SPECIFIED,
};
use crate::normalize::{extract_numeric_value, normalize_date, years_after, MAX_TERM_YEARS};
use payload::{parse_ai_payload, RepairReport};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;

const EXTRACTED_TEXT_PREVIEW: usize = 1000;

/// Document facts the reconciler needs besides the model payload.
#[derive(Debug, Clone)]
pub struct ReconcileContext<'a> {
    pub document_text: &'a str,
    pub total_pages: u32,
    /// RFC 3339 timestamp; its date part is the "as of" date for completion and deadlines.
    pub analysis_date: &'a str,
    pub file_name: &'a str,
    pub file_size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub contract: ContractData,
    pub repair: RepairReport,
    pub map_source: Option<MapSource>,
    pub field_sources: BTreeMap<String, FieldSource>,
}

fn as_of_date(analysis_date: &str) -> CoreResult<String> {
    analysis_date
        .get(..10)
        .and_then(normalize_date)
        .ok_or_else(|| {
            CoreError::InvalidInput(format!(
                "analysis date must start with YYYY-MM-DD, got '{}'",
                analysis_date
            ))
        })
}

fn term_years(basics: &Value) -> Option<f64> {
    let years = match basics.get("contract_term_years") {
        Some(Value::Number(_)) => fields::number(basics, "contract_term_years"),
        _ => fields::text(basics, "contract_term_years").and_then(|t| extract_numeric_value(&t)),
    };
    years.filter(|y| *y > 0.0 && *y <= MAX_TERM_YEARS)
}

fn years_label(years: f64) -> String {
    if years.fract() == 0.0 {
        format!("{} years", years as u64)
    } else {
        format!("{} years", years)
    }
}

fn notice_period(raw_timeline: &[Value]) -> String {
    raw_timeline
        .iter()
        .filter_map(|e| fields::text(e, "notice_required"))
        .find(|n| n.to_lowercase().contains("notice"))
        .map(|n| match timeline::notice_offset_days(&n) {
            180 => "6 months".to_string(),
            90 => "3 months".to_string(),
            days => format!("{} days", days),
        })
        .unwrap_or_else(|| NOT_SPECIFIED.to_string())
}

pub fn contract_term(basics: &Value, raw_timeline: &[Value]) -> ContractTerm {
    let years = term_years(basics);
    let auto_renewal = fields::boolean(basics, "auto_renewal").unwrap_or(false);
    ContractTerm {
        initial_term: years.map(years_label).unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        renewal_type: if auto_renewal { "Automatic" } else { "Manual" }.to_string(),
        renewal_period: match years {
            Some(y) if auto_renewal => years_label(y),
            _ => NOT_SPECIFIED.to_string(),
        },
        notice_period: notice_period(raw_timeline),
        auto_renewal,
    }
}

/// Explicit expiration, else effective date plus `365 * term` days, else the sentinel.
pub fn expiration_date(basics: &Value, effective_date: &str) -> String {
    if let Some(d) = fields::text(basics, "expiration_date").and_then(|d| normalize_date(&d)) {
        return d;
    }
    term_years(basics)
        .and_then(|y| years_after(effective_date, y))
        .unwrap_or_else(|| NOT_SPECIFIED.to_string())
}

fn financial_terms(financial: &Value, contract_value: f64, currency: &str) -> FinancialTerms {
    FinancialTerms {
        payment_terms: fields::text_or_sentinel(financial, "payment_terms"),
        total_value: fields::text(financial, "total_value")
            .and_then(|t| extract_numeric_value(&t))
            .unwrap_or(contract_value),
        payment_schedule: fields::text_or_sentinel(financial, "payment_schedule"),
        late_payment_penalties: fields::text_or_sentinel(financial, "late_payment_penalties"),
        currency: currency.to_string(),
        minimum_order_requirements: fields::text_or_sentinel(financial, "minimum_order_requirements"),
    }
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(EXTRACTED_TEXT_PREVIEW) {
        Some((i, _)) => format!("{}...", &text[..i]),
        None => text.to_string(),
    }
}

pub fn reconcile(
    raw_ai: &str,
    ctx: &ReconcileContext<'_>,
    cfg: &PipelineConfig,
) -> CoreResult<Reconciliation> {
    let as_of = as_of_date(ctx.analysis_date)?;
    if is_unavailable(raw_ai) {
        // The model is the only source for parties; nothing downstream may be fabricated.
        return Err(CoreError::reconciliation(
            EntityClass::Parties,
            "generative model unavailable, no extraction to reconcile",
        ));
    }
    let (payload, repair) = parse_ai_payload(raw_ai)?;

    let empty = Value::Object(Default::default());
    let basics = fields::object(&payload, "contract_basics").unwrap_or(&empty);
    let financial = fields::object(&payload, "financial_details").unwrap_or(&empty);
    let raw_timeline = fields::array(&payload, "timeline_events");

    let parties = parties::reconcile_parties(fields::array(&payload, "parties"))?;
    let timeline = timeline::reconcile_timeline(raw_timeline, &as_of)?;
    let risks = risks::reconcile_risks(fields::array(&payload, "risk_factors"))?;
    let key_terms = terms::reconcile_key_terms(fields::array(&payload, "key_terms"))?;

    let src = FieldSources {
        basics,
        financial,
        document_text: ctx.document_text,
    };
    let mut field_sources = BTreeMap::new();
    let mut record = |field: &str, source: FieldSource| {
        field_sources.insert(field.to_string(), source);
    };

    let currency = CurrencyExtractor.extract(&src);
    record(CurrencyExtractor.field(), currency.source);
    let products = products::reconcile_products(
        fields::array(&payload, "products_services"),
        &currency.value,
    )?;

    let title = TitleExtractor.extract(&src);
    record(TitleExtractor.field(), title.source);
    let contract_type = ContractTypeExtractor.extract(&src);
    record(ContractTypeExtractor.field(), contract_type.source);
    let effective = EffectiveDateExtractor.extract(&src);
    record(EffectiveDateExtractor.field(), effective.source);
    let governing_law = GoverningLawExtractor.extract(&src);
    record(GoverningLawExtractor.field(), governing_law.source);
    let territory = TerritoryExtractor.extract(&src);
    record(TerritoryExtractor.field(), territory.source);
    let exclusivity = ExclusivityExtractor.extract(&src);
    record(ExclusivityExtractor.field(), exclusivity.source);
    let value = ContractValueExtractor.extract(&src);
    record(ContractValueExtractor.field(), value.source);

    let (clause_risk_map, map_source) = build_clause_map(
        fields::array(&payload, "clause_risk_mapping"),
        ctx.document_text,
        &risks,
        ctx.total_pages,
        &cfg.mapping,
    );

    let contract_info = ContractInfo {
        expiration_date: expiration_date(basics, &effective.value),
        contract_term: contract_term(basics, raw_timeline),
        financial_terms: financial_terms(financial, value.value, &currency.value),
        title: title.value,
        contract_type: contract_type.value,
        effective_date: effective.value,
        value: value.value,
        currency: currency.value,
        governing_law: governing_law.value.clone(),
        parties,
        territory: territory.value,
        exclusivity: exclusivity.value,
    };

    let contract = ContractData {
        analytics: analytics::compute_analytics(&risks, &timeline, ctx.document_text, &as_of),
        document_structure: structure::detect_structure(ctx.document_text, ctx.total_pages),
        compliance_requirements: compliance::detect_compliance(ctx.document_text),
        metadata: Metadata {
            analysis_date: ctx.analysis_date.to_string(),
            analysis_version: env!("CARGO_PKG_VERSION").to_string(),
            extracted_text: preview(ctx.document_text),
            file_name: ctx.file_name.to_string(),
            file_size: ctx.file_size,
            total_pages: ctx.total_pages,
            jurisdiction: governing_law.value,
            source_sha256: sha256_hex(ctx.document_text.as_bytes()),
            payload_repaired: repair.changed(),
        },
        contract_info,
        timeline,
        risks,
        key_terms,
        products,
        clause_risk_map,
    };

    info!(
        parties = contract.contract_info.parties.len(),
        timeline = contract.timeline.len(),
        risks = contract.risks.len(),
        products = contract.products.len(),
        clause_map = contract.clause_risk_map.len(),
        "reconciled AI payload"
    );

    Ok(Reconciliation {
        contract,
        repair,
        map_source,
        field_sources,
    })
}
