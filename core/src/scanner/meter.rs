use crate::scanner::global::GlobalFlag;
use crate::scanner::rules::RiskLevel;
use serde::{Deserialize, Serialize};

pub const COMPONENT_CAP: u32 = 50;

/// Display band for a 0..=100 meter value.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RiskBand {
    LOW,
    MEDIUM,
    HIGH,
}

impl RiskBand {
    /// > 70 HIGH, > 40 MEDIUM, otherwise LOW
    pub fn from_meter(meter: u32) -> Self {
        if meter > 70 {
            RiskBand::HIGH
        } else if meter > 40 {
            RiskBand::MEDIUM
        } else {
            RiskBand::LOW
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::LOW => "Low",
            RiskBand::MEDIUM => "Medium",
            RiskBand::HIGH => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskMeter {
    pub clause_component: u32,
    pub global_component: u32,
    pub value: u32,
    pub band: RiskBand,
}

/// `min(avg_clause_weight * 10, 50) + min(sum(global severities), 50)`, floored.
///
/// Each half is capped independently. Zero chunks contribute an average of 0.
pub fn compute_risk_meter(levels: &[RiskLevel], flags: &[GlobalFlag]) -> RiskMeter {
    let clause_component = if levels.is_empty() {
        0
    } else {
        let sum: u64 = levels.iter().map(|l| l.weight() as u64).sum();
        // floor(min(10 * sum / n, 50)) in exact integer arithmetic
        ((10 * sum) / levels.len() as u64).min(COMPONENT_CAP as u64) as u32
    };
    let global_sum: u64 = flags.iter().map(|f| f.severity as u64).sum();
    let global_component = global_sum.min(COMPONENT_CAP as u64) as u32;
    let value = clause_component + global_component;
    RiskMeter {
        clause_component,
        global_component,
        value,
        band: RiskBand::from_meter(value),
    }
}
