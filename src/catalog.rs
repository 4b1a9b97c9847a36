//! Industry Catalog - read-only planning tables
//!
//! Each industry profile fixes the channel set, the weight table fed to the
//! allocator, persona and content templates, and timeline activities. The
//! built-in tables can be replaced per industry by JSON files; unknown
//! industries resolve to the default profile.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::budget::ChannelWeight;
use crate::model::ContentType;
use crate::ENGINE_VERSION;

pub const DEFAULT_PROFILE_KEY: &str = "default";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog I/O error ({0}): {1}")]
    Io(PathBuf, std::io::Error),

    #[error("Industry profile {0} requires engine >= {1}, current is {2}")]
    EngineVersionMismatch(String, String, String),

    #[error("Invalid version in industry profile {0}: {1}")]
    InvalidVersion(String, String),

    #[error("Invalid industry profile {0}: {1}")]
    InvalidProfile(String, String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryProfile {
    pub key: String,
    pub name: String,
    #[serde(default = "default_engine_min_version")]
    pub engine_min_version: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub psychographics: String,
    pub preferred_channels: Vec<String>,
    pub channels: Vec<ChannelTemplate>,
    #[serde(default)]
    pub personas: Vec<PersonaTemplate>,
    #[serde(default)]
    pub content_themes: Vec<String>,
    #[serde(default)]
    pub content_types: Vec<ContentType>,
    #[serde(default)]
    pub distribution: Vec<String>,
    pub timeline: TimelineTemplate,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

fn default_engine_min_version() -> String {
    crate::MIN_CATALOG_VERSION.to_string()
}

impl IndustryProfile {
    /// Weight table in catalog order, as fed to the allocator.
    pub fn weight_table(&self) -> Vec<ChannelWeight> {
        self.channels
            .iter()
            .map(|c| ChannelWeight::new(c.name.clone(), c.weight))
            .collect()
    }

    pub fn channel(&self, name: &str) -> Option<&ChannelTemplate> {
        self.channels.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelTemplate {
    pub name: String,
    pub weight: f64,
    pub description: String,
    #[serde(rename = "expectedROI")]
    pub expected_roi: String,
    #[serde(default)]
    pub tactics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaTemplate {
    pub name: String,
    pub demographics: String,
    pub description: String,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub preferred_channels: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTemplate {
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub deliverables: Vec<String>,
}

/// Ramp-up, scale and optimize roles, always in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineTemplate {
    pub foundation: PhaseTemplate,
    pub growth: PhaseTemplate,
    pub scale: PhaseTemplate,
}

/// Lookup key: trimmed, lowercase, `_` and spaces folded to `-`.
pub fn normalize_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

pub fn check_engine_version(profile: &IndustryProfile) -> Result<(), CatalogError> {
    let engine_ver = semver::Version::parse(ENGINE_VERSION)
        .map_err(|e| CatalogError::InvalidVersion("engine".into(), e.to_string()))?;
    let min_ver = semver::Version::parse(&profile.engine_min_version)
        .map_err(|e| CatalogError::InvalidVersion(profile.key.clone(), e.to_string()))?;

    if engine_ver < min_ver {
        return Err(CatalogError::EngineVersionMismatch(
            profile.key.clone(),
            profile.engine_min_version.clone(),
            ENGINE_VERSION.to_string(),
        ));
    }
    Ok(())
}

/// Structural checks every profile must pass before it is registered:
/// at least one channel, and channel names unique within the profile.
pub fn check_profile(profile: &IndustryProfile) -> Result<(), CatalogError> {
    if profile.channels.is_empty() {
        return Err(CatalogError::InvalidProfile(
            profile.key.clone(),
            "no channels".to_string(),
        ));
    }
    let mut seen = std::collections::BTreeSet::new();
    for channel in &profile.channels {
        if !seen.insert(channel.name.as_str()) {
            return Err(CatalogError::InvalidProfile(
                profile.key.clone(),
                format!("duplicate channel {}", channel.name),
            ));
        }
    }
    Ok(())
}

/// Immutable set of industry profiles plus the fallback profile.
#[derive(Debug, Clone)]
pub struct Catalog {
    profiles: BTreeMap<String, IndustryProfile>,
    aliases: BTreeMap<String, String>,
    default: IndustryProfile,
}

impl Catalog {
    pub fn builtin() -> Self {
        let mut catalog = Self {
            profiles: BTreeMap::new(),
            aliases: BTreeMap::new(),
            default: builtin::default_profile(),
        };
        for profile in builtin::profiles() {
            if let Err(e) = catalog.register(profile) {
                warn!(error = %e, "Skipping built-in industry profile");
            }
        }
        catalog
    }

    /// Built-in tables overlaid with every `*.json` profile in `dir`.
    ///
    /// Files that fail to parse or need a newer engine are skipped with a
    /// warning; a profile keyed `default` replaces the fallback profile.
    pub fn load_from_dir(dir: &Path) -> Result<Self, CatalogError> {
        let mut catalog = Self::builtin();
        if !dir.exists() {
            return Ok(catalog);
        }

        let mut paths = vec![];
        for entry in fs::read_dir(dir).map_err(|e| CatalogError::Io(dir.to_path_buf(), e))? {
            let path = entry.map_err(|e| CatalogError::Io(dir.to_path_buf(), e))?.path();
            if path.extension().map_or(false, |e| e == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable industry profile");
                    continue;
                }
            };
            let profile = match serde_json::from_str::<IndustryProfile>(&content) {
                Ok(profile) => profile,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping malformed industry profile");
                    continue;
                }
            };
            if let Err(e) = check_engine_version(&profile) {
                warn!(path = %path.display(), error = %e, "Skipping incompatible industry profile");
                continue;
            }
            let key = profile.key.clone();
            if let Err(e) = catalog.register(profile) {
                warn!(path = %path.display(), error = %e, "Skipping invalid industry profile");
                continue;
            }
            debug!(key = %key, path = %path.display(), "Loaded industry profile");
        }
        Ok(catalog)
    }

    /// Insert or replace a profile. Profiles failing [`check_profile`] are
    /// rejected and leave the catalog unchanged.
    pub fn register(&mut self, mut profile: IndustryProfile) -> Result<(), CatalogError> {
        check_profile(&profile)?;
        let key = normalize_key(&profile.key);
        profile.key = key.clone();
        if key == DEFAULT_PROFILE_KEY {
            self.default = profile;
            return Ok(());
        }
        for alias in &profile.aliases {
            self.aliases.insert(normalize_key(alias), key.clone());
        }
        self.profiles.insert(key, profile);
        Ok(())
    }

    pub fn get(&self, industry: &str) -> Option<&IndustryProfile> {
        let key = normalize_key(industry);
        self.profiles
            .get(&key)
            .or_else(|| self.aliases.get(&key).and_then(|k| self.profiles.get(k)))
    }

    /// Profile for `industry`, or the default profile. The flag tells
    /// whether the industry was recognised.
    pub fn resolve(&self, industry: &str) -> (&IndustryProfile, bool) {
        match self.get(industry) {
            Some(profile) => (profile, true),
            None => (&self.default, false),
        }
    }

    pub fn default_profile(&self) -> &IndustryProfile {
        &self.default
    }

    /// Recognised profiles in key order.
    pub fn list(&self) -> Vec<&IndustryProfile> {
        self.profiles.values().collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

mod builtin {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn channel(name: &str, weight: f64) -> ChannelTemplate {
        let (description, roi, tactics): (&str, &str, &[&str]) = match name {
            "Digital Marketing" => (
                "Online marketing channels including SEO, PPC, and social media",
                "200-400%",
                &["SEO", "Google Ads", "Facebook Ads", "Email Marketing"],
            ),
            "Content Marketing" => (
                "Educational and engaging content to attract and retain customers",
                "300-500%",
                &["Blog Posts", "Videos", "Whitepapers", "Case Studies"],
            ),
            "Social Media Marketing" => (
                "Engaging with audiences across social media platforms",
                "150-300%",
                &["Organic Posts", "Paid Ads", "Influencer Partnerships", "Community Building"],
            ),
            "Traditional Marketing" => (
                "Offline marketing channels and traditional advertising",
                "100-200%",
                &["Print Ads", "Radio", "Direct Mail", "Outdoor Advertising"],
            ),
            "Events & Webinars" => (
                "Live and virtual events that build credibility and capture high-intent leads",
                "150-250%",
                &["Webinars", "Industry Conferences", "Product Demos", "Executive Roundtables"],
            ),
            "Influencer Marketing" => (
                "Partnerships with creators who already hold the audience's trust",
                "200-350%",
                &["Micro-influencer Campaigns", "Affiliate Codes", "Product Seeding", "Co-created Content"],
            ),
            "Email Marketing" => (
                "Owned-audience nurture, onboarding and retention campaigns",
                "350-450%",
                &["Newsletters", "Nurture Sequences", "Segmentation", "Re-engagement Campaigns"],
            ),
            "Community Outreach" => (
                "Local partnerships, referrals and visible community presence",
                "120-250%",
                &["Referral Programs", "Local Sponsorships", "Partner Events", "Review Generation"],
            ),
            _ => (
                "Targeted marketing activity aligned with business objectives",
                "100-200%",
                &["Campaign Planning", "Performance Tracking"],
            ),
        };
        ChannelTemplate {
            name: name.to_string(),
            weight,
            description: description.to_string(),
            expected_roi: roi.to_string(),
            tactics: strings(tactics),
        }
    }

    fn persona(
        name: &str,
        demographics: &str,
        description: &str,
        pain_points: &[&str],
        preferred_channels: &[&str],
    ) -> PersonaTemplate {
        PersonaTemplate {
            name: name.to_string(),
            demographics: demographics.to_string(),
            description: description.to_string(),
            pain_points: strings(pain_points),
            preferred_channels: strings(preferred_channels),
        }
    }

    fn content(kind: &str, description: &str) -> ContentType {
        ContentType { kind: kind.to_string(), description: description.to_string() }
    }

    /// Shared phase skeleton plus one industry-specific activity and
    /// deliverable per phase.
    fn timeline(activities: [&str; 3], deliverables: [&str; 3]) -> TimelineTemplate {
        fn phase(base_act: &[&str], base_del: &[&str], act: &str, del: &str) -> PhaseTemplate {
            let mut activities = strings(base_act);
            activities.push(act.to_string());
            let mut deliverables = strings(base_del);
            deliverables.push(del.to_string());
            PhaseTemplate { activities, deliverables }
        }
        TimelineTemplate {
            foundation: phase(
                &["Set up analytics and conversion tracking", "Finalize brand guidelines", "Build content calendar"],
                &["Analytics dashboard", "Brand guide"],
                activities[0],
                deliverables[0],
            ),
            growth: phase(
                &["Launch priority channel campaigns", "Publish core content", "Monitor weekly performance"],
                &["Campaign launches", "Content library"],
                activities[1],
                deliverables[1],
            ),
            scale: phase(
                &["Reallocate budget toward top performers", "Scale winning tactics", "Test new channels"],
                &["Optimization report", "Scaling plan"],
                activities[2],
                deliverables[2],
            ),
        }
    }

    pub(super) fn profiles() -> Vec<IndustryProfile> {
        vec![
            IndustryProfile {
                key: "technology".into(),
                name: "Technology".into(),
                engine_min_version: default_engine_min_version(),
                aliases: strings(&["tech", "saas", "software", "it"]),
                psychographics: "Early adopters, value innovation and efficiency".into(),
                preferred_channels: strings(&["LinkedIn", "Google Ads", "Content Marketing", "Webinars"]),
                channels: vec![
                    channel("Digital Marketing", 0.5),
                    channel("Content Marketing", 0.25),
                    channel("Events & Webinars", 0.15),
                    channel("Traditional Marketing", 0.1),
                ],
                personas: vec![persona(
                    "Technical Decision Maker",
                    "IT directors and engineering leads, 30-50, mid-market and enterprise companies",
                    "Evaluates solutions on integration effort, security and total cost of ownership",
                    &["Integration complexity", "Security and compliance risk", "Proving ROI to leadership"],
                    &["LinkedIn", "Webinars", "Technical Documentation"],
                )],
                content_themes: strings(&[
                    "Product Innovation",
                    "Digital Transformation",
                    "Customer Success Stories",
                    "Industry Expertise",
                    "Security and Reliability",
                    "Technical Deep Dives",
                ]),
                content_types: vec![
                    content("Blog Posts", "Educational and informative articles"),
                    content("Case Studies", "Customer outcomes with measurable results"),
                    content("Webinars", "Live product walkthroughs and expert panels"),
                ],
                distribution: strings(&["Website", "LinkedIn", "Email", "Blog"]),
                timeline: timeline(
                    ["Document ideal customer profile and buying committee", "Run product demo webinar series", "Launch account-based campaigns for top accounts"],
                    ["ICP document", "Webinar recordings", "ABM playbook"],
                ),
                recommendations: strings(&[
                    "Leverage thought leadership content to build credibility",
                    "Focus on LinkedIn for B2B lead generation",
                ]),
            },
            IndustryProfile {
                key: "healthcare".into(),
                name: "Healthcare".into(),
                engine_min_version: default_engine_min_version(),
                aliases: strings(&["health", "medical", "wellness"]),
                psychographics: "Health-conscious, value trust and expertise".into(),
                preferred_channels: strings(&["Google Ads", "Content Marketing", "Email", "Referrals"]),
                channels: vec![
                    channel("Digital Marketing", 0.4),
                    channel("Content Marketing", 0.3),
                    channel("Email Marketing", 0.15),
                    channel("Community Outreach", 0.15),
                ],
                personas: vec![persona(
                    "Care Seeker",
                    "Adults 35-65 researching treatment options for themselves or family",
                    "Looks for credible providers, clear pricing and reassurance before booking",
                    &["Difficulty judging provider quality", "Unclear costs", "Long wait times"],
                    &["Google Search", "Email", "Patient Reviews"],
                )],
                content_themes: strings(&[
                    "Patient Education",
                    "Preventive Care",
                    "Provider Expertise",
                    "Patient Success Stories",
                    "Community Health",
                    "Care Access and Convenience",
                ]),
                content_types: vec![
                    content("Health Guides", "Plain-language explainers reviewed by clinicians"),
                    content("Patient Stories", "Consent-based testimonials and outcomes"),
                    content("Newsletters", "Seasonal care reminders and practice updates"),
                ],
                distribution: strings(&["Website", "Email", "Google Business Profile", "Blog"]),
                timeline: timeline(
                    ["Review messaging for regulatory compliance", "Launch patient referral program", "Expand local search presence to new locations"],
                    ["Compliance checklist", "Referral program", "Location pages"],
                ),
                recommendations: strings(&[
                    "Ensure all marketing complies with HIPAA regulations",
                    "Focus on educational content to build trust",
                ]),
            },
            IndustryProfile {
                key: "finance".into(),
                name: "Finance".into(),
                engine_min_version: default_engine_min_version(),
                aliases: strings(&["financial-services", "fintech", "banking", "insurance"]),
                psychographics: "Security-focused, value stability and growth".into(),
                preferred_channels: strings(&["LinkedIn", "Google Ads", "Email", "Webinars"]),
                channels: vec![
                    channel("Digital Marketing", 0.4),
                    channel("Content Marketing", 0.3),
                    channel("Events & Webinars", 0.15),
                    channel("Traditional Marketing", 0.15),
                ],
                personas: vec![persona(
                    "Financial Planner",
                    "Professionals and business owners 35-60 with growing assets",
                    "Wants trustworthy guidance and transparent fees before committing money",
                    &["Distrust of hidden fees", "Regulatory uncertainty", "Too little time to research"],
                    &["LinkedIn", "Email", "Financial Publications"],
                )],
                content_themes: strings(&[
                    "Financial Literacy",
                    "Market Insights",
                    "Security and Trust",
                    "Planning Milestones",
                    "Regulatory Updates",
                    "Client Success Stories",
                ]),
                content_types: vec![
                    content("Market Commentary", "Regular analysis of trends that affect clients"),
                    content("Calculators and Tools", "Interactive planning tools that capture intent"),
                    content("Webinars", "Expert sessions on planning topics"),
                ],
                distribution: strings(&["Website", "LinkedIn", "Email", "Partner Networks"]),
                timeline: timeline(
                    ["Complete compliance review of all claims", "Host quarterly market outlook webinar", "Launch advisor referral partnerships"],
                    ["Approved claims library", "Webinar series", "Partner agreements"],
                ),
                recommendations: strings(&[
                    "Build trust with transparent, compliance-approved educational content",
                    "Use webinars to convert research-stage prospects into consultations",
                ]),
            },
            IndustryProfile {
                key: "retail".into(),
                name: "Retail".into(),
                engine_min_version: default_engine_min_version(),
                aliases: strings(&["ecommerce", "e-commerce", "consumer-goods"]),
                psychographics: "Value-conscious, convenience-oriented shoppers".into(),
                preferred_channels: strings(&["Social Media", "Google Ads", "Email", "Influencer Marketing"]),
                channels: vec![
                    channel("Digital Marketing", 0.4),
                    channel("Social Media Marketing", 0.3),
                    channel("Traditional Marketing", 0.2),
                    channel("Influencer Marketing", 0.1),
                ],
                personas: vec![persona(
                    "Deal-Savvy Shopper",
                    "Adults 25-45 who compare prices across marketplaces before buying",
                    "Responds to timely offers, social proof and fast delivery",
                    &["Price comparison fatigue", "Shipping costs", "Uncertain product quality"],
                    &["Instagram", "Email", "Google Shopping"],
                )],
                content_themes: strings(&[
                    "Seasonal Collections",
                    "Customer Stories",
                    "Product Education",
                    "Behind the Brand",
                    "Exclusive Offers",
                    "Style and Usage Ideas",
                ]),
                content_types: vec![
                    content("Social Media Posts", "Engaging social content"),
                    content("Product Videos", "Short demonstrations and unboxings"),
                    content("Promotional Emails", "Segmented offers and launch announcements"),
                ],
                distribution: strings(&["Website", "Instagram", "Email", "Marketplaces"]),
                timeline: timeline(
                    ["Audit product pages and checkout flow", "Launch seasonal promotion calendar", "Introduce loyalty program"],
                    ["Conversion audit", "Promotion calendar", "Loyalty program"],
                ),
                recommendations: strings(&[
                    "Implement retargeting campaigns for abandoned carts",
                    "Use user-generated content for social proof",
                ]),
            },
            IndustryProfile {
                key: "education".into(),
                name: "Education".into(),
                engine_min_version: default_engine_min_version(),
                aliases: strings(&["edtech", "e-learning", "training"]),
                psychographics: "Knowledge-seekers, value quality and outcomes".into(),
                preferred_channels: strings(&["Social Media", "Google Ads", "Email", "Webinars"]),
                channels: vec![
                    channel("Digital Marketing", 0.35),
                    channel("Content Marketing", 0.3),
                    channel("Social Media Marketing", 0.2),
                    channel("Events & Webinars", 0.15),
                ],
                personas: vec![persona(
                    "Career Advancer",
                    "Learners 22-40 looking to upskill or change careers",
                    "Compares programs on outcomes, flexibility and cost",
                    &["Uncertain return on tuition", "Limited study time", "Too many similar programs"],
                    &["YouTube", "Instagram", "Email"],
                )],
                content_themes: strings(&[
                    "Learner Outcomes",
                    "Career Pathways",
                    "Faculty Expertise",
                    "Study Tips",
                    "Program Spotlights",
                    "Alumni Stories",
                ]),
                content_types: vec![
                    content("Open House Webinars", "Live program previews with Q&A"),
                    content("Alumni Videos", "Graduates describing outcomes"),
                    content("Guides", "Downloadable career and program guides"),
                ],
                distribution: strings(&["Website", "YouTube", "Email", "Social Media"]),
                timeline: timeline(
                    ["Map enrollment funnel and intake dates", "Run open house webinar series", "Launch alumni ambassador program"],
                    ["Enrollment funnel map", "Webinar schedule", "Ambassador program"],
                ),
                recommendations: strings(&[
                    "Align campaigns with enrollment cycles and intake deadlines",
                    "Feature alumni outcomes prominently in all channels",
                ]),
            },
            IndustryProfile {
                key: "hospitality".into(),
                name: "Hospitality".into(),
                engine_min_version: default_engine_min_version(),
                aliases: strings(&["travel", "restaurants", "food-and-beverage"]),
                psychographics: "Experience-driven, value atmosphere and reviews".into(),
                preferred_channels: strings(&["Instagram", "Google Ads", "Email", "Review Sites"]),
                channels: vec![
                    channel("Social Media Marketing", 0.35),
                    channel("Digital Marketing", 0.3),
                    channel("Influencer Marketing", 0.2),
                    channel("Email Marketing", 0.15),
                ],
                personas: vec![persona(
                    "Experience Seeker",
                    "Travelers and diners 25-55 planning occasions and trips",
                    "Chooses venues from photos, reviews and recommendations",
                    &["Inconsistent reviews", "Booking friction", "Generic experiences"],
                    &["Instagram", "Review Sites", "Email"],
                )],
                content_themes: strings(&[
                    "Signature Experiences",
                    "Local Guides",
                    "Guest Stories",
                    "Seasonal Events",
                    "Behind the Scenes",
                    "Special Offers",
                ]),
                content_types: vec![
                    content("Photo Stories", "Visual showcases of spaces and dishes"),
                    content("Event Announcements", "Seasonal menus, events and packages"),
                    content("Guest Newsletters", "Offers for past and returning guests"),
                ],
                distribution: strings(&["Website", "Instagram", "Email", "Review Platforms"]),
                timeline: timeline(
                    ["Claim and optimize review platform listings", "Launch seasonal event campaigns", "Start returning guest program"],
                    ["Optimized listings", "Event campaign kit", "Guest program"],
                ),
                recommendations: strings(&[
                    "Respond to every review to strengthen reputation signals",
                    "Partner with local creators to showcase signature experiences",
                ]),
            },
        ]
    }

    pub(super) fn default_profile() -> IndustryProfile {
        IndustryProfile {
            key: DEFAULT_PROFILE_KEY.into(),
            name: "General".into(),
            engine_min_version: default_engine_min_version(),
            aliases: vec![],
            psychographics: "Quality-focused, value-driven decision makers".into(),
            preferred_channels: strings(&["Social Media", "Google Ads", "Email", "Content Marketing"]),
            channels: vec![
                channel("Digital Marketing", 0.6),
                channel("Traditional Marketing", 0.3),
                channel("Content Marketing", 0.1),
            ],
            personas: vec![persona(
                "Value-Driven Buyer",
                "Decision makers 30-55 comparing providers in the category",
                "Weighs price against proven results and service quality",
                &["Difficulty comparing providers", "Limited time to evaluate options"],
                &["Google Search", "Email", "Social Media"],
            )],
            content_themes: strings(&[
                "Brand Awareness",
                "Lead Generation",
                "Customer Education",
                "Industry Expertise",
                "Customer Success Stories",
            ]),
            content_types: vec![
                content("Blog Posts", "Educational and informative articles"),
                content("Social Media Posts", "Engaging social content"),
            ],
            distribution: strings(&["Website", "Social Media", "Email", "Blog"]),
            timeline: timeline(
                ["Define positioning and core messages", "Launch first acquisition campaigns", "Expand into one additional channel"],
                ["Messaging framework", "Campaign reports", "Channel expansion plan"],
            ),
            recommendations: strings(&[
                "Test different messaging approaches with A/B testing",
                "Build partnerships with complementary businesses",
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  Technology "), "technology");
        assert_eq!(normalize_key("Financial_Services"), "financial-services");
        assert_eq!(normalize_key("food and  beverage"), "food-and-beverage");
    }

    #[test]
    fn test_resolve_known_alias_and_unknown() {
        let catalog = Catalog::builtin();
        let (profile, known) = catalog.resolve("technology");
        assert!(known);
        assert_eq!(profile.key, "technology");

        let (profile, known) = catalog.resolve("SaaS");
        assert!(known);
        assert_eq!(profile.key, "technology");

        let (profile, known) = catalog.resolve("underwater basket weaving");
        assert!(!known);
        assert_eq!(profile.key, DEFAULT_PROFILE_KEY);
    }

    #[test]
    fn test_builtin_profiles_are_well_formed() {
        let catalog = Catalog::builtin();
        let mut all = catalog.list();
        all.push(catalog.default_profile());
        for profile in all {
            assert!(!profile.channels.is_empty(), "{}", profile.key);
            assert!(profile.channels.iter().all(|c| c.weight > 0.0), "{}", profile.key);
            assert!(!profile.personas.is_empty(), "{}", profile.key);
            assert!(profile.content_themes.len() >= 4, "{}", profile.key);
            assert!(!profile.timeline.scale.activities.is_empty(), "{}", profile.key);
            assert!(check_engine_version(profile).is_ok());
            assert!(check_profile(profile).is_ok(), "{}", profile.key);
        }
    }

    #[test]
    fn test_load_from_dir_overrides_and_skips() {
        let dir = tempfile::tempdir().unwrap();
        let mut custom = Catalog::builtin().get("retail").cloned().unwrap();
        custom.channels.truncate(2);
        custom.channels[0].weight = 3.0;
        fs::write(dir.path().join("retail.json"), serde_json::to_string(&custom).unwrap()).unwrap();

        let mut future = custom.clone();
        future.key = "space-tourism".into();
        future.engine_min_version = "99.0.0".into();
        fs::write(dir.path().join("future.json"), serde_json::to_string(&future).unwrap()).unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

        let mut hollow = Catalog::builtin().get("technology").cloned().unwrap();
        hollow.channels.clear();
        fs::write(dir.path().join("technology.json"), serde_json::to_string(&hollow).unwrap()).unwrap();

        let mut doubled = Catalog::builtin().get("healthcare").cloned().unwrap();
        let mut copy = doubled.channels[0].clone();
        copy.weight *= 3.0;
        doubled.channels.push(copy);
        fs::write(dir.path().join("healthcare.json"), serde_json::to_string(&doubled).unwrap()).unwrap();

        let catalog = Catalog::load_from_dir(dir.path()).unwrap();
        let retail = catalog.get("retail").unwrap();
        assert_eq!(retail.channels.len(), 2);
        assert_eq!(retail.channels[0].weight, 3.0);
        assert!(catalog.get("space-tourism").is_none());

        // Rejected overlays keep the built-in profile
        let builtin = Catalog::builtin();
        assert_eq!(catalog.get("technology"), builtin.get("technology"));
        assert_eq!(catalog.get("healthcare"), builtin.get("healthcare"));
    }

    #[test]
    fn test_register_rejects_empty_and_duplicate_channels() {
        let mut catalog = Catalog::builtin();
        let original = catalog.default_profile().clone();

        let mut empty = original.clone();
        empty.channels.clear();
        let err = catalog.register(empty).unwrap_err();
        assert!(err.to_string().contains("no channels"));

        let mut doubled = original.clone();
        doubled.channels.push(doubled.channels[0].clone());
        let err = catalog.register(doubled).unwrap_err();
        assert!(err.to_string().contains("duplicate channel"));

        assert_eq!(catalog.default_profile(), &original);
    }
}
