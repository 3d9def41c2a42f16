use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rubric {
    pub rubric_version: String,
    pub min_score: u32,
    pub checks: Vec<RubricCheck>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RubricCheck {
    pub check_id: String,
    pub weight: u32,
    pub description: String,
}

impl Rubric {
    pub fn weight_of(&self, check_id: &str) -> u32 {
        self.checks
            .iter()
            .find(|c| c.check_id == check_id)
            .map(|c| c.weight)
            .unwrap_or(0)
    }

    pub fn total_weight(&self) -> u32 {
        self.checks.iter().map(|c| c.weight).sum()
    }
}

pub fn rubric_v1() -> Rubric {
    let json = include_str!("rubric_v1.json");
    serde_json::from_str(json).expect("embedded rubric v1 JSON must parse")
}
