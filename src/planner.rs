//! Content Planner - personas, channels, content, timeline, KPIs and
//! recommendations derived from a validated request.
//!
//! Pure function of the request plus the injected catalog and engine
//! parameters. No randomness: wherever two requests may differ cosmetically,
//! the choice is made with [`VariantSeed`].

use std::sync::Arc;

use crate::budget::ChannelWeight;
use crate::catalog::{Catalog, IndustryProfile, PhaseTemplate};
use crate::config::EngineConfig;
use crate::hashing::VariantSeed;
use crate::model::{
    Channel, ContentStrategyPlan, Kpi, Persona, StrategyInput, TimelinePhase, Timeframe,
};

pub const PHASE_NAMES: [&str; 3] = ["Foundation", "Growth", "Scale"];

const THEMES_PER_PLAN: usize = 4;

/// Objective keyword families; each yields one KPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KpiCategory {
    BrandAwareness,
    LeadGeneration,
    Traffic,
    Revenue,
    Engagement,
    CustomerRetention,
    CustomerAcquisition,
    ProductLaunch,
    /// Fallback for objectives that match no family.
    Growth,
}

struct KpiTemplate {
    metric: &'static str,
    target: &'static str,
    frequency: &'static str,
    measurement: &'static str,
}

impl KpiCategory {
    pub const RECOGNIZED: [KpiCategory; 8] = [
        Self::BrandAwareness,
        Self::LeadGeneration,
        Self::Traffic,
        Self::Revenue,
        Self::Engagement,
        Self::CustomerRetention,
        Self::CustomerAcquisition,
        Self::ProductLaunch,
    ];

    /// Lowercase substrings that place an objective in this family.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::BrandAwareness => &["brand", "awareness", "visibility", "recognition"],
            Self::LeadGeneration => &["lead"],
            Self::Traffic => &["traffic", "visitor"],
            Self::Revenue => &["revenue", "sales"],
            Self::Engagement => &["engagement", "engage"],
            Self::CustomerRetention => &["retention", "retain", "loyalty", "churn"],
            Self::CustomerAcquisition => &["acquisition", "acquire", "new customers"],
            Self::ProductLaunch => &["launch"],
            Self::Growth => &["growth"],
        }
    }

    /// Lowercase substrings a KPI metric must contain to count for this family.
    pub fn metric_keywords(self) -> &'static [&'static str] {
        match self {
            Self::BrandAwareness => &["brand", "awareness"],
            Self::LeadGeneration => &["lead"],
            Self::Traffic => &["traffic"],
            Self::Revenue => &["revenue", "sales"],
            Self::Engagement => &["engagement"],
            Self::CustomerRetention => &["retention", "churn"],
            Self::CustomerAcquisition => &["acquisition"],
            Self::ProductLaunch => &["launch"],
            Self::Growth => &["growth"],
        }
    }

    pub fn matches_objective(self, objective: &str) -> bool {
        let objective = objective.to_lowercase();
        self.keywords().iter().any(|k| objective.contains(k))
    }

    pub fn matches_metric(self, metric: &str) -> bool {
        let metric = metric.to_lowercase();
        self.metric_keywords().iter().any(|k| metric.contains(k))
    }

    fn template(self) -> KpiTemplate {
        let (metric, target, frequency, measurement) = match self {
            Self::BrandAwareness => (
                "Brand Awareness",
                "50% increase in brand mentions",
                "Quarterly",
                "Brand lift surveys and social listening",
            ),
            Self::LeadGeneration => (
                "Lead Generation",
                "100 qualified leads/month",
                "Monthly",
                "CRM lead tracking",
            ),
            Self::Traffic => (
                "Website Traffic",
                "50% increase in sessions",
                "Monthly",
                "Web analytics",
            ),
            Self::Revenue => (
                "Revenue Growth",
                "25% increase",
                "Monthly",
                "Sales and attribution reporting",
            ),
            Self::Engagement => (
                "Engagement Rate",
                "5% average engagement rate",
                "Monthly",
                "Social and email analytics",
            ),
            Self::CustomerRetention => (
                "Customer Retention Rate",
                "15% reduction in churn",
                "Quarterly",
                "Cohort retention reports",
            ),
            Self::CustomerAcquisition => (
                "Customer Acquisition",
                "50 new customers/month",
                "Monthly",
                "CRM and attribution reporting",
            ),
            Self::ProductLaunch => (
                "Product Launch Adoption",
                "500 adopters within 90 days",
                "Monthly",
                "Product analytics and sign-up tracking",
            ),
            Self::Growth => (
                "Overall Growth",
                "20% improvement over baseline",
                "Quarterly",
                "Performance dashboard review",
            ),
        };
        KpiTemplate { metric, target, frequency, measurement }
    }
}

/// Recognised families for one objective, in [`KpiCategory::RECOGNIZED`] order.
pub fn categorize(objective: &str) -> Vec<KpiCategory> {
    KpiCategory::RECOGNIZED
        .into_iter()
        .filter(|c| c.matches_objective(objective))
        .collect()
}

/// Everything the synthesizer needs apart from money.
#[derive(Debug, Clone)]
pub struct ContentPlan {
    pub profile_key: String,
    pub industry_recognized: bool,
    pub personas: Vec<Persona>,
    /// Channels with zero allocation; amounts come from the allocator.
    pub channels: Vec<Channel>,
    pub weights: Vec<ChannelWeight>,
    pub content_strategy: ContentStrategyPlan,
    pub timeline: Vec<TimelinePhase>,
    pub kpis: Vec<Kpi>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ContentPlanner {
    catalog: Arc<Catalog>,
    high_budget_threshold: u64,
    daily_content_threshold: u64,
    weekly_content_threshold: u64,
    max_recommendations: usize,
    max_kpis: usize,
}

impl ContentPlanner {
    pub fn new(catalog: Arc<Catalog>, config: &EngineConfig) -> Self {
        Self {
            catalog,
            high_budget_threshold: config.high_budget_threshold,
            daily_content_threshold: config.daily_content_threshold,
            weekly_content_threshold: config.weekly_content_threshold,
            max_recommendations: config.max_recommendations.max(1),
            max_kpis: config.max_kpis.max(1),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn plan(&self, input: &StrategyInput) -> ContentPlan {
        let (profile, recognized) = self.catalog.resolve(&input.industry);
        let seed = VariantSeed::from_input(input);

        ContentPlan {
            profile_key: profile.key.clone(),
            industry_recognized: recognized,
            personas: personas(profile, input),
            channels: channels(profile, input.timeframe),
            weights: profile.weight_table(),
            content_strategy: self.content_strategy(profile, input, &seed),
            timeline: timeline(profile, input.timeframe),
            kpis: self.kpis(input),
            recommendations: self.recommendations(profile, input),
        }
    }

    fn content_strategy(
        &self,
        profile: &IndustryProfile,
        input: &StrategyInput,
        seed: &VariantSeed,
    ) -> ContentStrategyPlan {
        let pool = &profile.content_themes;
        let start = seed.pick("content-themes", pool.len());
        let themes = pool
            .iter()
            .cycle()
            .skip(start)
            .take(THEMES_PER_PLAN.min(pool.len()))
            .cloned()
            .collect();

        let frequency = if input.budget >= self.daily_content_threshold {
            "Daily"
        } else if input.budget >= self.weekly_content_threshold {
            "Weekly"
        } else {
            "Bi-weekly"
        };

        ContentStrategyPlan {
            themes,
            content_types: profile.content_types.clone(),
            frequency: frequency.to_string(),
            distribution: profile.distribution.clone(),
        }
    }

    fn kpis(&self, input: &StrategyInput) -> Vec<Kpi> {
        let mut categories: Vec<KpiCategory> = vec![];
        let mut unmatched = input.objectives.is_empty();
        for objective in &input.objectives {
            let matched = categorize(objective);
            if matched.is_empty() {
                unmatched = true;
            }
            for category in matched {
                if !categories.contains(&category) {
                    categories.push(category);
                }
            }
        }
        // The cap never drops a recognised family.
        let cap = self.max_kpis.max(categories.len());
        if unmatched {
            categories.push(KpiCategory::Growth);
        }
        categories.truncate(cap);

        let scale = input.budget >= self.high_budget_threshold;
        categories
            .into_iter()
            .map(|category| {
                let template = category.template();
                Kpi {
                    metric: template.metric.to_string(),
                    target: if scale {
                        double_first_number(template.target)
                    } else {
                        template.target.to_string()
                    },
                    frequency: template.frequency.to_string(),
                    measurement_method: template.measurement.to_string(),
                }
            })
            .collect()
    }

    fn recommendations(&self, profile: &IndustryProfile, input: &StrategyInput) -> Vec<String> {
        let mut out: Vec<String> = profile.recommendations.clone();

        let budget_tier: [&str; 2] = if input.budget >= self.high_budget_threshold {
            [
                "Consider hiring a dedicated marketing team or agency",
                "Invest in marketing automation tools",
            ]
        } else if input.budget >= self.weekly_content_threshold {
            [
                "Focus on 2-3 high-impact channels rather than spreading thin",
                "Invest in quality content creation",
            ]
        } else {
            [
                "Start with organic social media and content marketing",
                "Focus on email marketing for direct customer communication",
            ]
        };
        out.extend(budget_tier.iter().map(|s| s.to_string()));

        if has_text(&input.competitor_info) {
            out.push(
                "Differentiate messaging against named competitors and review their campaigns quarterly"
                    .to_string(),
            );
        }
        if has_text(&input.existing_marketing) {
            out.push(
                "Audit current marketing activity and carry proven tactics into the new plan"
                    .to_string(),
            );
        }

        out.extend(
            [
                "Implement comprehensive analytics tracking from day one",
                "Focus on high-ROI digital channels for maximum impact",
                "Create a consistent content calendar and publishing schedule",
                "Establish clear KPIs and review performance monthly",
                "Build an email list as an owned media asset",
            ]
            .iter()
            .map(|s| s.to_string()),
        );

        let mut seen = std::collections::HashSet::new();
        out.retain(|r| seen.insert(r.clone()));
        out.truncate(self.max_recommendations);
        out
    }
}

fn has_text(field: &Option<String>) -> bool {
    field.as_deref().map_or(false, |s| !s.trim().is_empty())
}

fn personas(profile: &IndustryProfile, input: &StrategyInput) -> Vec<Persona> {
    let mut personas = vec![Persona {
        name: "Primary Audience".to_string(),
        demographics: input.target_audience.clone(),
        psychographics: profile.psychographics.clone(),
        description: format!(
            "Core buyers for {} in the {} market",
            input.business_name, input.industry
        ),
        pain_points: pain_points(&input.current_challenges),
        preferred_channels: profile.preferred_channels.clone(),
    }];

    personas.extend(profile.personas.iter().map(|t| Persona {
        name: t.name.clone(),
        demographics: t.demographics.clone(),
        psychographics: profile.psychographics.clone(),
        description: t.description.clone(),
        pain_points: t.pain_points.clone(),
        preferred_channels: if t.preferred_channels.is_empty() {
            profile.preferred_channels.clone()
        } else {
            t.preferred_channels.clone()
        },
    }));
    personas
}

const PAIN_POINT_RULES: &[(&[&str], &str)] = &[
    (&["awareness", "recognition", "visibility", "unknown"], "Limited brand awareness"),
    (&["acquisition cost", "cac", "expensive"], "High customer acquisition costs"),
    (&["conversion", "convert"], "Low conversion rates"),
    (&["messag"], "Inconsistent messaging"),
    (&["online presence", "website", "seo"], "Limited online presence"),
    (&["competit"], "Intense competition for attention"),
    (&["data", "analytics", "tracking", "measure"], "Little visibility into what drives results"),
    (&["retention", "churn", "repeat"], "Customers not returning after first purchase"),
    (&["sales cycle"], "Long sales cycles"),
    (&["budget"], "Limited budget to reach the market"),
    (&["team", "expertise", "resources"], "Limited in-house marketing capacity"),
];

const MAX_PAIN_POINTS: usize = 4;

fn pain_points(challenges: &str) -> Vec<String> {
    let lowered = challenges.to_lowercase();
    let matched: Vec<String> = PAIN_POINT_RULES
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, pain)| pain.to_string())
        .take(MAX_PAIN_POINTS)
        .collect();

    if matched.is_empty() {
        vec![
            "Limited brand awareness".to_string(),
            "High customer acquisition costs".to_string(),
            "Low conversion rates".to_string(),
        ]
    } else {
        matched
    }
}

fn channels(profile: &IndustryProfile, timeframe: Timeframe) -> Vec<Channel> {
    profile
        .channels
        .iter()
        .map(|t| Channel {
            name: t.name.clone(),
            budget_allocation: 0,
            percentage: 0,
            description: t.description.clone(),
            tactics: t.tactics.clone(),
            timeline: timeframe.label(),
            expected_roi: t.expected_roi.clone(),
        })
        .collect()
}

/// Foundation ≈25%, Growth ≈40%, Scale the rest; each at least one month.
pub fn phase_durations(timeframe: Timeframe) -> [String; 3] {
    let months = timeframe.months();
    let foundation = ((months as f64) * 0.25).round().max(1.0) as u32;
    let growth = ((months as f64) * 0.4).round().max(1.0) as u32;
    let scale = months.saturating_sub(foundation + growth).max(1);

    let label = |start: u32, len: u32| {
        if len == 1 {
            format!("Month {start}")
        } else {
            format!("Months {}-{}", start, start + len - 1)
        }
    };
    [
        label(1, foundation),
        label(1 + foundation, growth),
        label(1 + foundation + growth, scale),
    ]
}

fn timeline(profile: &IndustryProfile, timeframe: Timeframe) -> Vec<TimelinePhase> {
    let templates: [&PhaseTemplate; 3] = [
        &profile.timeline.foundation,
        &profile.timeline.growth,
        &profile.timeline.scale,
    ];
    PHASE_NAMES
        .iter()
        .zip(templates)
        .zip(phase_durations(timeframe))
        .map(|((name, template), duration)| TimelinePhase {
            phase: name.to_string(),
            duration,
            activities: template.activities.clone(),
            deliverables: template.deliverables.clone(),
        })
        .collect()
}

/// Double the first integer in a target, e.g. `"100 leads"` -> `"200 leads"`.
fn double_first_number(target: &str) -> String {
    let Some(start) = target.find(|c: char| c.is_ascii_digit()) else {
        return target.to_string();
    };
    let end = target[start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(target.len(), |offset| start + offset);
    match target[start..end].parse::<u64>() {
        Ok(n) => format!("{}{}{}", &target[..start], n.saturating_mul(2), &target[end..]),
        Err(_) => target.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner() -> ContentPlanner {
        ContentPlanner::new(Arc::new(Catalog::builtin()), &EngineConfig::default())
    }

    fn input(industry: &str, budget: u64, objectives: &[&str]) -> StrategyInput {
        StrategyInput {
            business_name: "Northwind".to_string(),
            industry: industry.to_string(),
            target_audience: "Operations managers at logistics firms".to_string(),
            budget,
            objectives: objectives.iter().map(|s| s.to_string()).collect(),
            timeframe: Timeframe::TwelveMonths,
            current_challenges: "High acquisition cost and poor conversion on the website".to_string(),
            competitor_info: Some("Contoso".to_string()),
            existing_marketing: None,
        }
    }

    #[test]
    fn test_categorize_objectives() {
        assert_eq!(categorize("Increase brand awareness"), vec![KpiCategory::BrandAwareness]);
        assert_eq!(categorize("Generate leads"), vec![KpiCategory::LeadGeneration]);
        assert_eq!(categorize("Boost Sales revenue"), vec![KpiCategory::Revenue]);
        assert_eq!(
            categorize("Launch product and drive traffic"),
            vec![KpiCategory::Traffic, KpiCategory::ProductLaunch]
        );
        assert!(categorize("Be the best").is_empty());
    }

    #[test]
    fn test_kpis_cover_each_family_once_plus_growth() {
        let plan = planner().plan(&input(
            "technology",
            50_000,
            &["Increase brand awareness", "Brand recognition", "Generate leads", "Delight people"],
        ));
        let metrics: Vec<&str> = plan.kpis.iter().map(|k| k.metric.as_str()).collect();
        assert_eq!(metrics, vec!["Brand Awareness", "Lead Generation", "Overall Growth"]);
    }

    #[test]
    fn test_kpi_cap_keeps_recognised_families() {
        let config = EngineConfig { max_kpis: 1, ..EngineConfig::default() };
        let planner = ContentPlanner::new(Arc::new(Catalog::builtin()), &config);
        let plan = planner.plan(&input("retail", 10_000, &["More sales", "More traffic", "???"]));
        let metrics: Vec<&str> = plan.kpis.iter().map(|k| k.metric.as_str()).collect();
        assert_eq!(metrics, vec!["Revenue Growth", "Website Traffic"]);
    }

    #[test]
    fn test_empty_objectives_still_yield_a_kpi() {
        let plan = planner().plan(&input("retail", 10_000, &[]));
        assert_eq!(plan.kpis.len(), 1);
        assert_eq!(plan.kpis[0].metric, "Overall Growth");
    }

    #[test]
    fn test_high_budget_doubles_targets() {
        let plan = planner().plan(&input("technology", 150_000, &["Generate leads"]));
        assert_eq!(plan.kpis[0].target, "200 qualified leads/month");
        let plan = planner().plan(&input("technology", 15_000, &["Generate leads"]));
        assert_eq!(plan.kpis[0].target, "100 qualified leads/month");
    }

    #[test]
    fn test_double_first_number() {
        assert_eq!(double_first_number("25% increase"), "50% increase");
        assert_eq!(double_first_number("no digits"), "no digits");
        assert_eq!(double_first_number("500 adopters within 90 days"), "1000 adopters within 90 days");
    }

    #[test]
    fn test_phase_durations_cover_timeframe() {
        assert_eq!(phase_durations(Timeframe::ThreeMonths), ["Month 1", "Month 2", "Month 3"]);
        assert_eq!(phase_durations(Timeframe::TwelveMonths), ["Months 1-3", "Months 4-8", "Months 9-12"]);
        assert_eq!(phase_durations(Timeframe::TwentyFourMonths), ["Months 1-6", "Months 7-16", "Months 17-24"]);
    }

    #[test]
    fn test_timeline_always_three_named_phases() {
        for industry in ["technology", "retail", "unknown-industry"] {
            let plan = planner().plan(&input(industry, 20_000, &["Generate leads"]));
            let names: Vec<&str> = plan.timeline.iter().map(|p| p.phase.as_str()).collect();
            assert_eq!(names, PHASE_NAMES.to_vec());
            assert!(plan.timeline.iter().all(|p| !p.activities.is_empty()));
        }
    }

    #[test]
    fn test_pain_points_from_challenges() {
        let plan = planner().plan(&input("technology", 20_000, &["Generate leads"]));
        let primary = &plan.personas[0];
        assert_eq!(primary.demographics, "Operations managers at logistics firms");
        assert!(primary.pain_points.contains(&"High customer acquisition costs".to_string()));
        assert!(primary.pain_points.contains(&"Low conversion rates".to_string()));
        assert_eq!(pain_points("").len(), 3);
    }

    #[test]
    fn test_unknown_industry_uses_default_catalog() {
        let plan = planner().plan(&input("deep sea mining", 20_000, &["Generate leads"]));
        assert!(!plan.industry_recognized);
        assert_eq!(plan.profile_key, "default");
        assert!(!plan.channels.is_empty());
        assert_eq!(plan.weights.len(), plan.channels.len());
    }

    #[test]
    fn test_recommendations_capped_and_budget_aware() {
        let low = planner().plan(&input("retail", 5_000, &["Sales"]));
        let high = planner().plan(&input("retail", 500_000, &["Sales"]));
        assert!(low.recommendations.len() <= 8);
        assert_ne!(low.recommendations, high.recommendations);
        assert!(low
            .recommendations
            .iter()
            .any(|r| r.contains("competitors")));
        assert_eq!(low.content_strategy.frequency, "Bi-weekly");
        assert_eq!(high.content_strategy.frequency, "Daily");
    }

    #[test]
    fn test_theme_selection_is_stable() {
        let a = planner().plan(&input("education", 20_000, &["Generate leads"]));
        let b = planner().plan(&input("education", 20_000, &["Generate leads"]));
        assert_eq!(a.content_strategy.themes, b.content_strategy.themes);
        assert_eq!(a.content_strategy.themes.len(), 4);
    }
}
