use contract_risk_core::config::QualityConfig;
use contract_risk_core::model::ContractData;
use contract_risk_core::validator::QualityGate;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!(
            "usage: analysis_validator <STRICT|SCORE_ONLY> <contract_analysis.json> <document.txt> [raw_ai_response]"
        );
        std::process::exit(2);
    }
    let strict_blockers = match args[1].as_str() {
        "STRICT" => true,
        "SCORE_ONLY" => false,
        other => {
            eprintln!("invalid mode: {}", other);
            std::process::exit(2);
        }
    };

    let read = |p: &str| match std::fs::read_to_string(p) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("cannot read {}: {}", p, e);
            std::process::exit(1);
        }
    };
    let analysis = read(args[2].as_str());
    let document = read(args[3].as_str());
    // Without the raw response, the reconciled JSON itself stands in as the model output.
    let raw_ai = args.get(4).map(|p| read(p.as_str())).unwrap_or_else(|| analysis.clone());

    let contract: ContractData = match serde_json::from_str(&analysis) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("validator error: {}", e);
            std::process::exit(1);
        }
    };

    let gate = QualityGate::new(QualityConfig {
        strict_blockers,
        ..QualityConfig::default()
    });
    let report = gate.evaluate(&contract, &raw_ai, &document);
    match serde_json::to_string_pretty(&report) {
        Ok(s) => println!("{}", s),
        Err(e) => {
            eprintln!("validator error: {}", e);
            std::process::exit(1);
        }
    }
    if report.passed() {
        std::process::exit(0);
    } else {
        std::process::exit(1);
    }
}
