//! Prompt text for the generative collaborator. Only the JSON keys matter to the reconciler.

const EXTRACTION_SCHEMA: &str = r#"{
  "contract_basics": {"title": "", "type": "", "effective_date": "YYYY-MM-DD", "expiration_date": "YYYY-MM-DD",
    "contract_value": "", "governing_law": "", "contract_term_years": 0, "auto_renewal": false, "territory": ""},
  "parties": [{"legal_name": "", "common_name": "", "address": "", "role": "", "entity_type": ""}],
  "financial_details": {"payment_terms": "", "total_value": "", "payment_schedule": "",
    "late_payment_penalties": "", "currency": "", "minimum_order_requirements": ""},
  "timeline_events": [{"date": "YYYY-MM-DD", "event": "", "type": "milestone|deadline|renewal|termination|payment",
    "responsible_party": "", "notice_required": "", "notice_deadline": "YYYY-MM-DD", "priority": "high|medium|low"}],
  "risk_factors": [{"risk_title": "", "description": "", "category": "High|Medium|Low", "impact": "",
    "likelihood": "", "risk_score": 20, "mitigation": ""}],
  "products_services": [{"name": "", "description": "", "quantity_text": "", "quantity_numeric": 0, "unit": "",
    "specifications": "", "price": "", "schedule_reference": ""}],
  "key_terms": [{"term": "", "definition": "", "importance": "Critical|High|Medium"}],
  "clause_risk_mapping": [{"clause": "", "risk_level": "high|medium|low", "page": 1, "description": ""}]
}"#;

fn head(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

pub fn extraction_prompt(document_text: &str, char_limit: usize) -> String {
    format!(
        "You are a legal contract analyst. Extract the data stated in the contract below.\n\
         Use exact legal names, exact dates (YYYY-MM-DD) and exact amounts. Do not invent values.\n\
         Every risk needs a numeric risk_score between 20 and 95.\n\n\
         CONTRACT TEXT:\n\"\"\"{}\"\"\"\n\n\
         Return a single JSON object with this structure:\n{}\n",
        head(document_text.trim(), char_limit),
        EXTRACTION_SCHEMA
    )
}

pub fn chunk_prompt(chunk_text: &str, context: Option<&str>) -> String {
    let context = context
        .map(|c| format!("Context from earlier:\n{}\n\n", c))
        .unwrap_or_default();
    format!(
        "{}Summarize this section of a contract in plain English.\n\n\"\"\"{}\"\"\"\n\n\
         Format your answer as:\nParties: ...\nObligations: ...\nTermination Triggers: ...\n\
         Ambiguities/Risks: ...\nTakeaway: ...\n",
        context, chunk_text
    )
}

pub fn full_summary_prompt(document_text: &str) -> String {
    format!(
        "Analyze the complete contract below and give a structured overview under these headings:\n\
         CONTRACT OVERVIEW, PARTIES, FINANCIAL TERMS, TIMELINE, SCOPE OF WORK, RISK ASSESSMENT,\n\
         TERMINATION AND DISPUTES, KEY RECOMMENDATIONS.\n\n\"\"\"{}\"\"\"\n",
        document_text.trim()
    )
}
