//! Contract Invariant Tests
//!
//! These tests verify the non-negotiable guarantees.

use stratforge_core::{
    hashing::canonical_json,
    model::{BudgetPlan, Channel, ContentStrategyPlan, Kpi},
    planner::categorize,
    GeneratedBy, ProcessingOptions, ProducerError, StrategyInput, StrategyOutput,
    StrategySynthesizer, Timeframe,
};

fn techstart_input() -> StrategyInput {
    StrategyInput {
        business_name: "TechStart Solutions".to_string(),
        industry: "technology".to_string(),
        target_audience: "Small business owners".to_string(),
        budget: 50_000,
        objectives: vec![
            "Increase brand awareness".to_string(),
            "Generate leads".to_string(),
            "Drive website traffic".to_string(),
        ],
        timeframe: Timeframe::SixMonths,
        current_challenges: "Limited brand recognition".to_string(),
        competitor_info: None,
        existing_marketing: None,
    }
}

#[test]
fn invariant_synthesis_is_deterministic() {
    let synth = StrategySynthesizer::default();
    let input = techstart_input();

    let first = canonical_json(&synth.process_strategy(&input)).unwrap();
    for _ in 0..5 {
        let again = canonical_json(&synth.process_strategy(&input)).unwrap();
        assert_eq!(first, again);
    }

    // Independent instances agree too
    let other = StrategySynthesizer::default();
    assert_eq!(first, canonical_json(&other.process_strategy(&input)).unwrap());
}

#[test]
fn invariant_output_is_complete() {
    let synth = StrategySynthesizer::default();
    let input = techstart_input();
    let output = synth.process_strategy(&input).output;

    assert!(output.executive_summary.contains("TechStart Solutions"));
    assert!(output.executive_summary.contains("technology"));
    assert!(!output.target_audience.is_empty());
    assert!(!output.marketing_channels.is_empty());
    assert!(!output.content_strategy.is_empty());
    assert_eq!(output.timeline.len(), 3);
    assert!(!output.kpis.is_empty());
    assert!(!output.recommendations.is_empty());
    assert_eq!(output.budget.total, 50_000);
}

#[test]
fn invariant_every_objective_has_a_kpi() {
    let synth = StrategySynthesizer::default();
    let mut input = techstart_input();
    input.objectives.push("Boost sales this quarter".to_string());
    input.objectives.push("Become the friendliest shop in town".to_string());

    let output = synth.process_strategy(&input).output;
    for objective in &input.objectives {
        for category in categorize(objective) {
            assert!(
                output.kpis.iter().any(|k| category.matches_metric(&k.metric)),
                "no KPI for {objective:?} ({category:?})"
            );
        }
    }
    // The unmatched objective falls back to the generic growth KPI
    assert!(output.kpis.iter().any(|k| k.metric == "Overall Growth"));
}

#[test]
fn invariant_budget_is_conserved_exactly() {
    let synth = StrategySynthesizer::default();
    let industries = ["technology", "healthcare", "retail", "Underwater Basket Weaving"];
    let budgets = [1, 7, 99, 1_001, 33_333, 50_000, 123_457, 9_999_999];

    for industry in industries {
        for budget in budgets {
            let mut input = techstart_input();
            input.industry = industry.to_string();
            input.budget = budget;

            let plan = synth.process_strategy(&input).output.budget;
            assert!(plan.is_balanced(), "{industry}/{budget}: {plan:?}");
            assert_eq!(plan.total, budget);
        }
    }
}

#[test]
fn invariant_channels_match_budget_lines() {
    let synth = StrategySynthesizer::default();
    let output = synth.process_strategy(&techstart_input()).output;

    for channel in &output.marketing_channels {
        let line = output
            .budget
            .channels
            .iter()
            .find(|l| l.channel == channel.name)
            .expect("every channel has a budget line");
        assert_eq!(channel.budget_allocation, line.amount);
    }
}

#[test]
fn invariant_unknown_industry_and_empty_objectives_still_produce() {
    let synth = StrategySynthesizer::default();
    let mut input = techstart_input();
    input.industry = "Quantum Gardening".to_string();
    input.objectives.clear();

    let result = synth.process_strategy(&input);
    assert_eq!(result.generated_by, GeneratedBy::Fallback);
    assert!(result.output.executive_summary.contains("Quantum Gardening"));
    assert!(!result.output.kpis.is_empty());
    assert!(synth.validate_output(&result.output, &input).valid);
}

#[test]
fn invariant_producer_output_is_validated() {
    let synth = StrategySynthesizer::default();
    let input = techstart_input();

    // Unbalanced budget from an external producer
    let broken = |_: &StrategyInput| -> Result<StrategyOutput, ProducerError> {
        Ok(StrategyOutput {
            executive_summary: "TechStart Solutions in technology".to_string(),
            target_audience: vec![],
            marketing_channels: vec![Channel {
                name: "SEO".to_string(),
                budget_allocation: 10,
                percentage: 100,
                description: String::new(),
                tactics: vec![],
                timeline: String::new(),
                expected_roi: String::new(),
            }],
            content_strategy: ContentStrategyPlan::default(),
            timeline: vec![],
            budget: BudgetPlan { total: 50_000, channels: vec![], contingency: 0 },
            kpis: vec![Kpi {
                metric: "Brand Awareness".to_string(),
                target: String::new(),
                frequency: String::new(),
                measurement_method: String::new(),
            }],
            recommendations: vec![],
        })
    };

    let strict = ProcessingOptions { fallback_to_rules: false };
    let err = synth.process_with_producer(&input, &broken, strict).unwrap_err();
    assert!(err.to_string().contains("rejected"));

    let result = synth
        .process_with_producer(&input, &broken, ProcessingOptions::default())
        .unwrap();
    assert_eq!(result.generated_by, GeneratedBy::Fallback);
    assert!(result.output.budget.is_balanced());
}

#[test]
fn invariant_valid_producer_output_is_accepted() {
    let synth = StrategySynthesizer::default();
    let input = techstart_input();
    let rules = synth.process_strategy(&input).output;

    let producer = move |_: &StrategyInput| -> Result<StrategyOutput, ProducerError> { Ok(rules.clone()) };
    let result = synth
        .process_with_producer(&input, &producer, ProcessingOptions::default())
        .unwrap();
    assert_eq!(result.generated_by, GeneratedBy::Ai);
}

#[test]
fn invariant_fingerprint_ignores_key_order() {
    let a: StrategyInput = serde_json::from_str(
        r#"{"businessName":"A","industry":"retail","targetAudience":"x","budget":1000,
            "objectives":["Generate leads"],"timeframe":"3-months"}"#,
    )
    .unwrap();
    let b: StrategyInput = serde_json::from_str(
        r#"{"timeframe":"3-months","objectives":["Generate leads"],"budget":1000,
            "targetAudience":"x","industry":"retail","businessName":"A"}"#,
    )
    .unwrap();

    assert_eq!(
        StrategySynthesizer::fingerprint(&a).unwrap(),
        StrategySynthesizer::fingerprint(&b).unwrap()
    );
}
