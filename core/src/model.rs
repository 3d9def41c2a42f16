use serde::{Deserialize, Serialize};

/// Explicit marker for a soft field the source did not supply. Never a fabricated value.
pub const NOT_SPECIFIED: &str = "Not specified";

pub fn is_not_specified(s: &str) -> bool {
    let t = s.trim();
    t.is_empty() || t.eq_ignore_ascii_case(NOT_SPECIFIED) || t.eq_ignore_ascii_case("null")
}

/// Canonical reconciled contract. Built once per document; never partially populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractData {
    pub contract_info: ContractInfo,
    pub timeline: Vec<TimelineEvent>,
    pub risks: Vec<RiskItem>,
    pub key_terms: Vec<KeyTerm>,
    pub products: Vec<ProductItem>,
    pub clause_risk_map: Vec<ClauseRiskMapEntry>,
    pub analytics: Analytics,
    pub document_structure: DocumentStructure,
    pub compliance_requirements: Vec<ComplianceRequirement>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfo {
    pub title: String,
    #[serde(rename = "type")]
    pub contract_type: String,
    pub effective_date: String,
    pub expiration_date: String,
    pub value: f64,
    pub currency: String,
    pub governing_law: String,
    pub parties: Vec<Party>,
    pub contract_term: ContractTerm,
    pub territory: String,
    pub exclusivity: bool,
    pub financial_terms: FinancialTerms,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub id: String,
    pub name: String,
    pub legal_name: String,
    pub address: Address,
    pub role: String,
    pub entity_type: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractTerm {
    pub initial_term: String,
    pub renewal_type: String,
    pub renewal_period: String,
    pub notice_period: String,
    pub auto_renewal: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialTerms {
    pub payment_terms: String,
    pub total_value: f64,
    pub payment_schedule: String,
    pub late_payment_penalties: String,
    pub currency: String,
    pub minimum_order_requirements: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub id: String,
    pub date: String,
    pub event: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub responsible_party: String,
    pub notice_required: bool,
    pub notice_deadline: String,
    pub priority: String,
    pub completed: bool,
    pub consequences: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskItem {
    pub id: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub impact: String,
    pub likelihood: String,
    pub risk_score: u32,
    pub urgency: String,
    pub mitigation: String,
    pub recommendations: Vec<String>,
    pub mitigation_strategies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyTerm {
    pub term: String,
    pub definition: String,
    pub importance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub quantity: f64,
    pub unit: String,
    pub category: String,
    pub specifications: String,
    pub delivery_terms: String,
    pub pricing: Pricing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub unit_price: f64,
    pub currency: String,
    pub total_price: f64,
    pub minimum_order: String,
}

/// Percentages of the page, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClauseRiskMapEntry {
    pub clause: String,
    pub risk_level: String,
    pub page: u32,
    pub position: Region,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl RiskDistribution {
    pub fn total(&self) -> u32 {
        self.high + self.medium + self.low
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub compliance_score: u32,
    pub financial_health: u32,
    pub operational_risk: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractComplexity {
    pub text_length: usize,
    pub estimated_reading_time: usize,
    pub legal_complexity: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub overall_risk_score: u32,
    pub risk_distribution: RiskDistribution,
    pub completion_rate: u32,
    pub critical_deadlines: u32,
    pub total_clauses: u32,
    pub risky_clauses: u32,
    pub performance_metrics: PerformanceMetrics,
    pub contract_complexity: ContractComplexity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSection {
    pub title: String,
    pub start_page: u32,
    pub end_page: u32,
    pub clauses: Vec<String>,
    pub risk_level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStructure {
    pub sections: Vec<DocumentSection>,
    pub total_pages: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceRequirement {
    pub regulation: String,
    pub requirement: String,
    pub status: String,
    pub deadline: String,
    pub responsible: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub analysis_date: String,
    pub analysis_version: String,
    pub extracted_text: String,
    pub file_name: String,
    pub file_size: u64,
    pub total_pages: u32,
    pub jurisdiction: String,
    pub source_sha256: String,
    pub payload_repaired: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_detection() {
        assert!(is_not_specified("Not specified"));
        assert!(is_not_specified("  not SPECIFIED "));
        assert!(is_not_specified(""));
        assert!(!is_not_specified("Net 45 days"));
    }

    #[test]
    fn type_fields_serialize_as_type() {
        let ev = TimelineEvent {
            id: "event_1".to_string(),
            date: "2024-01-01".to_string(),
            event: "Start".to_string(),
            event_type: "milestone".to_string(),
            responsible_party: NOT_SPECIFIED.to_string(),
            notice_required: false,
            notice_deadline: NOT_SPECIFIED.to_string(),
            priority: "medium".to_string(),
            completed: true,
            consequences: String::new(),
        };
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["type"], "milestone");
        assert_eq!(v["noticeRequired"], false);
    }
}
