//! Strategy Synthesizer - Single Entry Point
//!
//! The rules engine is the default producer. Output from any other producer
//! must pass [`Validator`] before it is accepted.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::budget::BudgetAllocator;
use crate::catalog::{Catalog, CatalogError};
use crate::config::EngineConfig;
use crate::hashing::{input_fingerprint, VariantSeed};
use crate::model::{GeneratedBy, StrategyInput, StrategyOutput, SynthesisResult};
use crate::money::format_currency;
use crate::planner::{ContentPlan, ContentPlanner};
use crate::validation::{ValidationReport, Validator};

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Strategy producer failed: {0}")]
    ProducerFailed(#[from] ProducerError),

    #[error("Producer output rejected: {0}")]
    Rejected(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ProducerError {
    #[error("producer unavailable: {0}")]
    Unavailable(String),

    #[error("producer returned malformed output: {0}")]
    Malformed(String),
}

/// Alternate source of strategies, e.g. an AI collaborator.
///
/// Output is validated against the same rules as the rules engine.
pub trait StrategyProducer {
    fn produce(&self, input: &StrategyInput) -> Result<StrategyOutput, ProducerError>;
}

impl<F> StrategyProducer for F
where
    F: Fn(&StrategyInput) -> Result<StrategyOutput, ProducerError>,
{
    fn produce(&self, input: &StrategyInput) -> Result<StrategyOutput, ProducerError> {
        self(input)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingOptions {
    /// Use the rules engine when the producer fails or is rejected.
    pub fallback_to_rules: bool,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self { fallback_to_rules: true }
    }
}

#[derive(Debug)]
pub struct StrategySynthesizer {
    planner: ContentPlanner,
    allocator: BudgetAllocator,
    validator: Validator,
}

impl StrategySynthesizer {
    pub fn new(catalog: Arc<Catalog>, config: &EngineConfig) -> Self {
        Self {
            planner: ContentPlanner::new(catalog, config),
            allocator: BudgetAllocator::new(config.contingency_percent),
            validator: Validator::new(),
        }
    }

    /// Built-in catalog, overlaid with `config.catalog_dir` when set.
    pub fn from_config(config: &EngineConfig) -> Result<Self, CatalogError> {
        let catalog = match &config.catalog_dir {
            Some(dir) => Catalog::load_from_dir(dir)?,
            None => Catalog::builtin(),
        };
        Ok(Self::new(Arc::new(catalog), config))
    }

    pub fn catalog(&self) -> &Catalog {
        self.planner.catalog()
    }

    /// Rules-engine synthesis. Never fails: unknown industries and empty
    /// objective lists degrade to defaults.
    pub fn process_strategy(&self, input: &StrategyInput) -> SynthesisResult {
        let plan = self.planner.plan(input);
        if !plan.industry_recognized {
            warn!(industry = %input.industry, "Unknown industry, using default catalog");
        }

        let output = self.assemble(input, plan);
        info!(
            industry = %input.industry,
            channels = output.marketing_channels.len(),
            kpis = output.kpis.len(),
            budget = output.budget.total,
            "Synthesized strategy"
        );

        SynthesisResult { generated_by: GeneratedBy::Fallback, output }
    }

    /// Try `producer` first; its output must pass validation.
    pub fn process_with_producer(
        &self,
        input: &StrategyInput,
        producer: &dyn StrategyProducer,
        options: ProcessingOptions,
    ) -> Result<SynthesisResult, SynthesisError> {
        let failure = match producer.produce(input) {
            Ok(output) => {
                let report = self.validator.validate(&output, input);
                if report.valid {
                    info!(industry = %input.industry, "Accepted producer strategy");
                    return Ok(SynthesisResult { generated_by: GeneratedBy::Ai, output });
                }
                SynthesisError::Rejected(report.summary())
            }
            Err(e) => SynthesisError::ProducerFailed(e),
        };

        if !options.fallback_to_rules {
            return Err(failure);
        }
        warn!(error = %failure, "Producer strategy unusable, falling back to rules engine");
        Ok(self.process_strategy(input))
    }

    pub fn validate_output(&self, output: &StrategyOutput, input: &StrategyInput) -> ValidationReport {
        self.validator.validate(output, input)
    }

    /// SHA-256 of the canonical request JSON.
    pub fn fingerprint(input: &StrategyInput) -> Result<String, SynthesisError> {
        Ok(input_fingerprint(input)?)
    }

    fn assemble(&self, input: &StrategyInput, plan: ContentPlan) -> StrategyOutput {
        let budget = self.allocator.allocate(input.budget, &plan.weights).into_plan(input.budget);

        // Budget lines come back in weight-table order, which is channel order.
        let mut channels = plan.channels;
        for (channel, line) in channels.iter_mut().zip(&budget.channels) {
            channel.budget_allocation = line.amount;
            channel.percentage = line.percentage;
        }

        StrategyOutput {
            executive_summary: executive_summary(input, budget.contingency),
            target_audience: plan.personas,
            marketing_channels: channels,
            content_strategy: plan.content_strategy,
            timeline: plan.timeline,
            budget,
            kpis: plan.kpis,
            recommendations: plan.recommendations,
        }
    }
}

impl Default for StrategySynthesizer {
    fn default() -> Self {
        Self::new(Arc::new(Catalog::builtin()), &EngineConfig::default())
    }
}

fn objectives_phrase(objectives: &[String]) -> String {
    let items: Vec<String> = objectives
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .take(3)
        .map(|o| o.to_lowercase())
        .collect();
    match items.as_slice() {
        [] => "sustainable growth".to_string(),
        [one] => one.clone(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}

/// Business name and industry always appear verbatim.
fn executive_summary(input: &StrategyInput, contingency: u64) -> String {
    let name = &input.business_name;
    let industry = &input.industry;
    let objectives = objectives_phrase(&input.objectives);
    let budget = format_currency(input.budget);
    let timeframe = input.timeframe.label();

    match VariantSeed::from_input(input).pick("executive-summary", 3) {
        0 => format!(
            "This comprehensive marketing strategy for {name} focuses on {objectives} over a \
             {timeframe} period. With a budget of {budget}, the strategy leverages digital-first \
             approaches tailored to the {industry} industry. The plan addresses current challenges \
             while building sustainable growth through targeted audience engagement and measurable outcomes."
        ),
        1 => format!(
            "{name} will pursue {objectives} across the next {timeframe} with a planned investment \
             of {budget}. Channel priorities, content themes and milestones are tailored to the \
             {industry} industry, and {} is held in reserve so the plan can respond to early results.",
            format_currency(contingency)
        ),
        _ => format!(
            "Over the next {timeframe}, {name} will invest {budget} in a focused marketing program \
             built for the {industry} industry. The strategy concentrates on {objectives}, starting \
             with a measurement foundation and then scaling the channels that prove most efficient."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Timeframe;

    fn input(name: &str, industry: &str, budget: u64) -> StrategyInput {
        StrategyInput {
            business_name: name.to_string(),
            industry: industry.to_string(),
            target_audience: "Small business owners".to_string(),
            budget,
            objectives: vec!["Increase brand awareness".to_string(), "Generate leads".to_string()],
            timeframe: Timeframe::SixMonths,
            current_challenges: "Low awareness".to_string(),
            competitor_info: None,
            existing_marketing: None,
        }
    }

    #[test]
    fn test_rules_output_passes_own_validation() {
        let synth = StrategySynthesizer::default();
        for industry in ["technology", "healthcare", "finance", "retail", "education", "hospitality", "Space Tourism"] {
            for budget in [1, 999, 20_000, 50_000, 250_000] {
                let input = input("Acme & Sons", industry, budget);
                let result = synth.process_strategy(&input);
                assert_eq!(result.generated_by, GeneratedBy::Fallback);
                let report = synth.validate_output(&result.output, &input);
                assert!(report.violations.is_empty(), "{industry}/{budget}: {:?}", report.violations);
            }
        }
    }

    #[test]
    fn test_summary_names_business_and_industry_in_every_variant() {
        let synth = StrategySynthesizer::default();
        let mut seen = std::collections::HashSet::new();
        for i in 0..40 {
            let name = format!("Company {i}");
            let result = synth.process_strategy(&input(&name, "Financial Services", 10_000));
            let summary = &result.output.executive_summary;
            assert!(summary.contains(&name));
            assert!(summary.contains("Financial Services"));
            seen.insert(summary.split_whitespace().next().map(str::to_string));
        }
        assert!(seen.len() > 1);
    }

    #[test]
    fn test_objectives_phrase() {
        assert_eq!(objectives_phrase(&[]), "sustainable growth");
        let items: Vec<String> = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
        assert_eq!(objectives_phrase(&items[..2]), "a and b");
        assert_eq!(objectives_phrase(&items), "a, b, and c");
    }

    #[test]
    fn test_channel_amounts_match_budget_lines() {
        let synth = StrategySynthesizer::default();
        let output = synth.process_strategy(&input("Acme", "technology", 50_000)).output;
        for (channel, line) in output.marketing_channels.iter().zip(&output.budget.channels) {
            assert_eq!(channel.name, line.channel);
            assert_eq!(channel.budget_allocation, line.amount);
        }
    }

    #[test]
    fn test_repeated_channel_names_keep_their_own_amounts() {
        let synth = StrategySynthesizer::default();
        let input = input("Acme", "retail", 10_000);
        let mut plan = synth.planner.plan(&input);
        let first = plan.channels[0].clone();
        let weight = plan.weights[0].weight * 3.0;
        plan.channels.push(first.clone());
        plan.weights.push(crate::budget::ChannelWeight::new(first.name, weight));

        let output = synth.assemble(&input, plan);
        let channel_sum: u64 = output.marketing_channels.iter().map(|c| c.budget_allocation).sum();
        let line_sum: u64 = output.budget.channels.iter().map(|l| l.amount).sum();
        assert_eq!(channel_sum, line_sum);
        let last = output.marketing_channels.len() - 1;
        assert_ne!(
            output.marketing_channels[0].budget_allocation,
            output.marketing_channels[last].budget_allocation
        );
    }

    #[test]
    fn test_valid_producer_output_is_marked_ai() {
        let synth = StrategySynthesizer::default();
        let input = input("Acme", "technology", 50_000);
        let canned = synth.process_strategy(&input).output;
        let producer = move |_: &StrategyInput| -> Result<StrategyOutput, ProducerError> {
            Ok(canned.clone())
        };
        let result = synth
            .process_with_producer(&input, &producer, ProcessingOptions::default())
            .unwrap();
        assert_eq!(result.generated_by, GeneratedBy::Ai);
    }

    #[test]
    fn test_rejected_producer_output() {
        let synth = StrategySynthesizer::default();
        let input = input("Acme", "technology", 50_000);
        let mut broken = synth.process_strategy(&input).output;
        broken.budget.contingency += 1;
        let producer = move |_: &StrategyInput| -> Result<StrategyOutput, ProducerError> {
            Ok(broken.clone())
        };

        let fallback = synth
            .process_with_producer(&input, &producer, ProcessingOptions::default())
            .unwrap();
        assert_eq!(fallback.generated_by, GeneratedBy::Fallback);

        let strict = ProcessingOptions { fallback_to_rules: false };
        let err = synth.process_with_producer(&input, &producer, strict).unwrap_err();
        assert!(matches!(err, SynthesisError::Rejected(msg) if msg.contains("budget_conservation")));
    }

    #[test]
    fn test_failing_producer_without_fallback() {
        let synth = StrategySynthesizer::default();
        let producer = |_: &StrategyInput| -> Result<StrategyOutput, ProducerError> {
            Err(ProducerError::Unavailable("timeout".to_string()))
        };
        let err = synth
            .process_with_producer(
                &input("Acme", "retail", 5_000),
                &producer,
                ProcessingOptions { fallback_to_rules: false },
            )
            .unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }
}
