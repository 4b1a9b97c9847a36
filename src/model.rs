//! Canonical strategy data model.
//!
//! One shape for every producer: the rules engine and any external AI
//! producer both emit [`StrategyOutput`], and the exporter never looks at
//! where it came from.

use serde::{Deserialize, Serialize};

use crate::money::deserialize_units;

/// Validated request for a marketing strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyInput {
    pub business_name: String,
    pub industry: String,
    pub target_audience: String,
    /// Whole currency units.
    #[serde(deserialize_with = "deserialize_units")]
    pub budget: u64,
    pub objectives: Vec<String>,
    pub timeframe: Timeframe,
    #[serde(default)]
    pub current_challenges: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitor_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_marketing: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "3-months", alias = "1-3-months")]
    ThreeMonths,
    #[serde(rename = "6-months", alias = "3-6-months")]
    SixMonths,
    #[serde(rename = "12-months", alias = "6-12-months")]
    TwelveMonths,
    #[serde(rename = "18-months")]
    EighteenMonths,
    #[serde(rename = "24-months", alias = "12-24-months")]
    TwentyFourMonths,
}

impl Timeframe {
    pub fn months(self) -> u32 {
        match self {
            Self::ThreeMonths => 3,
            Self::SixMonths => 6,
            Self::TwelveMonths => 12,
            Self::EighteenMonths => 18,
            Self::TwentyFourMonths => 24,
        }
    }

    pub fn label(self) -> String {
        format!("{} months", self.months())
    }

    pub fn is_long_term(self) -> bool {
        self.months() >= 12
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub name: String,
    #[serde(default)]
    pub demographics: String,
    #[serde(default)]
    pub psychographics: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub preferred_channels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub name: String,
    #[serde(deserialize_with = "deserialize_units")]
    pub budget_allocation: u64,
    #[serde(default)]
    pub percentage: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tactics: Vec<String>,
    #[serde(default)]
    pub timeline: String,
    #[serde(default, rename = "expectedROI")]
    pub expected_roi: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentType {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentStrategyPlan {
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub content_types: Vec<ContentType>,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub distribution: Vec<String>,
}

impl ContentStrategyPlan {
    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
            && self.content_types.is_empty()
            && self.frequency.is_empty()
            && self.distribution.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePhase {
    pub phase: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub deliverables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetLine {
    pub channel: String,
    #[serde(deserialize_with = "deserialize_units")]
    pub amount: u64,
    #[serde(default)]
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPlan {
    #[serde(deserialize_with = "deserialize_units")]
    pub total: u64,
    pub channels: Vec<BudgetLine>,
    #[serde(deserialize_with = "deserialize_units")]
    pub contingency: u64,
}

impl BudgetPlan {
    /// Sum of channel amounts, widened so malformed external plans cannot overflow.
    pub fn allocated(&self) -> u128 {
        self.channels.iter().map(|line| u128::from(line.amount)).sum()
    }

    /// `sum(channels) + contingency == total`, exactly.
    pub fn is_balanced(&self) -> bool {
        self.allocated() + u128::from(self.contingency) == u128::from(self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    pub metric: String,
    #[serde(default)]
    pub target: String,
    #[serde(default, alias = "timeframe")]
    pub frequency: String,
    #[serde(default, alias = "measurement")]
    pub measurement_method: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyOutput {
    pub executive_summary: String,
    pub target_audience: Vec<Persona>,
    pub marketing_channels: Vec<Channel>,
    #[serde(default)]
    pub content_strategy: ContentStrategyPlan,
    pub timeline: Vec<TimelinePhase>,
    pub budget: BudgetPlan,
    pub kpis: Vec<Kpi>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GeneratedBy {
    /// Produced by an external AI collaborator.
    Ai,
    /// Produced by the deterministic rules engine.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisResult {
    pub generated_by: GeneratedBy,
    pub output: StrategyOutput,
}
