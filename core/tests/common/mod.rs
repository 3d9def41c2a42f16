#![allow(dead_code)]

use contract_risk_core::reconcile::ReconcileContext;

pub const ANALYSIS_DATE: &str = "2024-06-01T00:00:00Z";

pub const CONTRACT_TEXT: &str = "SUPPLY AGREEMENT

This Supply Agreement is entered into as of January 15, 2024 between Northwind Traders Inc. \
(\"Supplier\") and Helvetia Foods AG (\"Buyer\").

1. Definitions
1.1 \"Products\" means Organic Whey Protein Powder in 150gm units.
1.2 \"Territory\" means Canada.

2. Payment Terms
2.1 Buyer shall pay each invoice within 45 days. Late payments accrue interest of 1.5% per month.
2.2 The total contract value is USD 250,000.
\x0c
3. Indemnification
3.1 Supplier shall indemnify Buyer against third-party claims arising from defective Products.

4. Termination
4.1 Termination for convenience: either party may terminate on 90 days written notice.
4.2 Supplier may suspend deliveries at its sole discretion.

5. Governing Law
5.1 This Agreement is governed by the laws of Ontario.
";

pub const AI_RESPONSE: &str = r#"Here is the extraction you asked for:
```json
{
  "contract_basics": {
    "title": "Supply Agreement",
    "type": "Supply Agreement",
    "effective_date": "2024-01-15",
    "expiration_date": "2026-01-15",
    "contract_value": "USD 250,000",
    "currency": "USD",
    "governing_law": "Ontario",
    "territory": "Canada",
    "exclusivity": "false",
    "contract_term_years": "2 years",
    "auto_renewal": "false"
  },
  "parties": [
    {"legal_name": "Northwind Traders Inc.", "role": "Supplier", "entity_type": "Corporation"},
    {"legal_name": "Helvetia Foods AG", "role": "Buyer", "entity_type": "Corporation"}
  ],
  "financial_details": {
    "payment_terms": "Net 45 days from invoice",
    "total_value": "250000",
    "payment_schedule": "Per delivery",
    "late_payment_penalties": "1.5% per month"
  },
  "products_services": [
    {
      "name": "Organic Whey Protein Powder",
      "quantity_text": "15,000 jars",
      "quantity_numeric": 15000,
      "unit": "150gm units",
      "price": "$12.50 per jar"
    }
  ],
  "timeline_events": [
    {"date": "2024-01-15", "event": "Agreement effective", "type": "milestone"},
    {"date": "2024-09-01", "event": "First delivery due", "type": "delivery"},
    {"date": "2026-01-15", "event": "Agreement expires", "type": "termination",
     "notice_required": "Yes, 90 days notice required"}
  ],
  "risk_factors": [
    {"risk_title": "Supplier may suspend deliveries at its sole discretion", "category": "High", "risk_score": 90},
    {"risk_title": "Late payment interest accrues monthly", "category": "Commercial", "risk_score": 55},
    {"risk_title": "Indemnity limited to third-party claims", "category": "Legal", "risk_score": 25}
  ],
  "key_terms": [
    {"term": "Products", "definition": "Organic Whey Protein Powder", "importance": "high"}
  ],
  "clause_risk_mapping": [
    {"clause": "Section 4.2 Suspension", "risk_level": "high", "page": 2, "description": "Unilateral suspension of deliveries"}
  ]
}
```"#;

pub fn context() -> ReconcileContext<'static> {
    ReconcileContext {
        document_text: CONTRACT_TEXT,
        total_pages: 2,
        analysis_date: ANALYSIS_DATE,
        file_name: "supply_agreement.txt",
        file_size: CONTRACT_TEXT.len() as u64,
    }
}
