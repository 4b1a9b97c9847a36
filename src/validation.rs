//! Validation System - Rule/Policy Separation
//!
//! Rules produce structured violations against a strategy and the request it
//! answers. Policy (errors block, warnings are recorded) lives in [`Validator`].
//! Every producer, rules engine or external, is held to the same rules.

use serde::{Deserialize, Serialize};

use crate::model::{StrategyInput, StrategyOutput};
use crate::planner::{categorize, KpiCategory, PHASE_NAMES};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

impl ValidationViolation {
    fn error(rule: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            severity: ViolationSeverity::Error,
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    fn expected(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    fn warning(mut self) -> Self {
        self.severity = ViolationSeverity::Warning;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationViolation> {
        self.violations
            .iter()
            .filter(|v| v.severity == ViolationSeverity::Error)
    }

    /// `rule: message` pairs of the blocking violations, joined with `; `.
    pub fn summary(&self) -> String {
        self.errors()
            .map(|v| format!("{}: {}", v.rule, v.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Validation rule trait - produces violations
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, output: &StrategyOutput, input: &StrategyInput) -> Vec<ValidationViolation>;
}

// --- Concrete Rules ---

pub struct CompletenessRule;

impl ValidationRule for CompletenessRule {
    fn name(&self) -> &'static str { "completeness" }

    fn validate(&self, output: &StrategyOutput, _input: &StrategyInput) -> Vec<ValidationViolation> {
        let mut violations = vec![];
        let minimums = [
            ("persona", output.target_audience.len()),
            ("marketing channel", output.marketing_channels.len()),
            ("KPI", output.kpis.len()),
            ("recommendation", output.recommendations.len()),
        ];
        for (what, count) in minimums {
            if count == 0 {
                violations.push(
                    ValidationViolation::error(self.name(), format!("No {what} present"))
                        .expected(format!("at least 1 {what}"), "0"),
                );
            }
        }

        if output.timeline.len() != PHASE_NAMES.len() {
            violations.push(
                ValidationViolation::error(self.name(), "Timeline must have exactly 3 phases")
                    .expected("3 phases", format!("{} phases", output.timeline.len())),
            );
        }
        if output.executive_summary.trim().is_empty() {
            violations.push(ValidationViolation::error(self.name(), "Executive summary is empty"));
        }
        violations
    }
}

pub struct BudgetConservationRule;

impl ValidationRule for BudgetConservationRule {
    fn name(&self) -> &'static str { "budget_conservation" }

    fn validate(&self, output: &StrategyOutput, input: &StrategyInput) -> Vec<ValidationViolation> {
        let budget = &output.budget;
        let mut violations = vec![];

        if budget.total != input.budget {
            violations.push(
                ValidationViolation::error(self.name(), "Budget total differs from requested budget")
                    .expected(input.budget.to_string(), budget.total.to_string()),
            );
        }
        if !budget.is_balanced() {
            violations.push(
                ValidationViolation::error(self.name(), "Channel amounts plus contingency do not equal total")
                    .expected(
                        budget.total.to_string(),
                        (budget.allocated() + u128::from(budget.contingency)).to_string(),
                    ),
            );
        }
        violations
    }
}

pub struct ExecutiveSummaryRule;

impl ValidationRule for ExecutiveSummaryRule {
    fn name(&self) -> &'static str { "executive_summary" }

    fn validate(&self, output: &StrategyOutput, input: &StrategyInput) -> Vec<ValidationViolation> {
        [("business name", &input.business_name), ("industry", &input.industry)]
            .into_iter()
            .filter(|(_, value)| !output.executive_summary.contains(value.as_str()))
            .map(|(what, value)| {
                ValidationViolation::error(self.name(), format!("Executive summary does not name the {what}"))
                    .expected(format!("contains \"{value}\""), "missing")
            })
            .collect()
    }
}

pub struct KpiCoverageRule;

impl ValidationRule for KpiCoverageRule {
    fn name(&self) -> &'static str { "kpi_coverage" }

    fn validate(&self, output: &StrategyOutput, input: &StrategyInput) -> Vec<ValidationViolation> {
        let mut required: Vec<KpiCategory> = vec![];
        for objective in &input.objectives {
            for category in categorize(objective) {
                if !required.contains(&category) {
                    required.push(category);
                }
            }
        }

        required
            .into_iter()
            .filter(|category| !output.kpis.iter().any(|k| category.matches_metric(&k.metric)))
            .map(|category| {
                ValidationViolation::error(self.name(), format!("No KPI covers objective category {category:?}"))
                    .expected(format!("metric mentioning one of {:?}", category.metric_keywords()), "none")
            })
            .collect()
    }
}

/// Channel amounts should agree with the budget line of the same name.
pub struct ChannelAllocationRule;

impl ValidationRule for ChannelAllocationRule {
    fn name(&self) -> &'static str { "channel_allocation" }

    fn validate(&self, output: &StrategyOutput, _input: &StrategyInput) -> Vec<ValidationViolation> {
        output
            .marketing_channels
            .iter()
            .filter_map(|channel| {
                let line = output.budget.channels.iter().find(|l| l.channel == channel.name);
                match line {
                    Some(line) if line.amount == channel.budget_allocation => None,
                    Some(line) => Some(
                        ValidationViolation::error(
                            self.name(),
                            format!("Channel {} allocation differs from its budget line", channel.name),
                        )
                        .expected(line.amount.to_string(), channel.budget_allocation.to_string())
                        .warning(),
                    ),
                    None => Some(
                        ValidationViolation::error(
                            self.name(),
                            format!("Channel {} has no budget line", channel.name),
                        )
                        .warning(),
                    ),
                }
            })
            .collect()
    }
}

/// Validator orchestrates rules and applies policy
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(CompletenessRule),
                Box::new(BudgetConservationRule),
                Box::new(ExecutiveSummaryRule),
                Box::new(KpiCoverageRule),
                Box::new(ChannelAllocationRule),
            ],
        }
    }

    pub fn with_rule(mut self, rule: Box<dyn ValidationRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Errors make the report invalid; warnings are recorded only.
    pub fn validate(&self, output: &StrategyOutput, input: &StrategyInput) -> ValidationReport {
        let violations: Vec<_> = self
            .rules
            .iter()
            .flat_map(|rule| rule.validate(output, input))
            .collect();
        let valid = !violations.iter().any(|v| v.severity == ViolationSeverity::Error);
        ValidationReport { valid, violations }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.rules.iter().map(|r| r.name()).collect();
        f.debug_struct("Validator").field("rules", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BudgetLine, BudgetPlan, Channel, Kpi, Persona, Timeframe, TimelinePhase};

    fn input() -> StrategyInput {
        StrategyInput {
            business_name: "Acme".to_string(),
            industry: "retail".to_string(),
            target_audience: "Shoppers".to_string(),
            budget: 1_000,
            objectives: vec!["Boost sales".to_string(), "Build brand".to_string()],
            timeframe: Timeframe::SixMonths,
            current_challenges: String::new(),
            competitor_info: None,
            existing_marketing: None,
        }
    }

    fn output() -> StrategyOutput {
        let phase = |name: &str| TimelinePhase {
            phase: name.to_string(),
            duration: "Months 1-2".to_string(),
            activities: vec!["Plan".to_string()],
            deliverables: vec![],
        };
        let kpi = |metric: &str| Kpi {
            metric: metric.to_string(),
            target: "10%".to_string(),
            frequency: "Monthly".to_string(),
            measurement_method: "Analytics".to_string(),
        };
        StrategyOutput {
            executive_summary: "Acme plans growth in the retail market.".to_string(),
            target_audience: vec![Persona {
                name: "Shopper".to_string(),
                demographics: String::new(),
                psychographics: String::new(),
                description: String::new(),
                pain_points: vec![],
                preferred_channels: vec![],
            }],
            marketing_channels: vec![Channel {
                name: "Digital".to_string(),
                budget_allocation: 900,
                percentage: 90,
                description: String::new(),
                tactics: vec![],
                timeline: String::new(),
                expected_roi: String::new(),
            }],
            content_strategy: Default::default(),
            timeline: vec![phase("Foundation"), phase("Growth"), phase("Scale")],
            budget: BudgetPlan {
                total: 1_000,
                channels: vec![BudgetLine { channel: "Digital".to_string(), amount: 900, percentage: 90 }],
                contingency: 100,
            },
            kpis: vec![kpi("Revenue Growth"), kpi("Brand Awareness")],
            recommendations: vec!["Do more".to_string()],
        }
    }

    #[test]
    fn test_valid_strategy_passes() {
        let report = Validator::new().validate(&output(), &input());
        assert!(report.valid, "{:?}", report.violations);
        assert!(report.violations.is_empty());
    }

    #[test]
    fn test_unbalanced_budget_is_error() {
        let mut out = output();
        out.budget.contingency = 99;
        let report = Validator::new().validate(&out, &input());
        assert!(!report.valid);
        assert!(report.summary().contains("budget_conservation"));
    }

    #[test]
    fn test_missing_kpi_category_is_error() {
        let mut out = output();
        out.kpis.retain(|k| k.metric != "Brand Awareness");
        let report = Validator::new().validate(&out, &input());
        assert!(!report.valid);
        assert_eq!(report.violations[0].rule, "kpi_coverage");
    }

    #[test]
    fn test_summary_must_name_business_and_industry() {
        let mut out = output();
        out.executive_summary = "A plan.".to_string();
        let report = Validator::new().validate(&out, &input());
        assert_eq!(report.errors().count(), 2);
    }

    #[test]
    fn test_timeline_phase_count() {
        let mut out = output();
        out.timeline.pop();
        let report = Validator::new().validate(&out, &input());
        assert!(!report.valid);
        assert_eq!(report.violations[0].expected.as_deref(), Some("3 phases"));
    }

    #[test]
    fn test_channel_mismatch_is_warning_only() {
        let mut out = output();
        out.marketing_channels[0].budget_allocation = 850;
        let report = Validator::new().validate(&out, &input());
        assert!(report.valid);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].severity, ViolationSeverity::Warning);
    }
}
