//! StratForge Core - Marketing Strategy Compiler
//!
//! # The Five Laws (Non-Negotiable)
//! 1. One Canonical Shape
//! 2. The Budget Always Balances
//! 3. A Strategy Is Always Producible
//! 4. Deterministic Output
//! 5. Producers Suggest, Engine Validates

pub mod model;
pub mod money;
pub mod config;
pub mod catalog;
pub mod budget;
pub mod planner;
pub mod validation;
pub mod synthesis;
pub mod hashing;
pub mod branding;
pub mod filename;
pub mod export;

pub use model::{GeneratedBy, StrategyInput, StrategyOutput, SynthesisResult, Timeframe};
pub use config::{ConfigError, EngineConfig};
pub use catalog::{Catalog, CatalogError, IndustryProfile};
pub use budget::BudgetAllocator;
pub use planner::{ContentPlan, ContentPlanner, KpiCategory};
pub use validation::{ValidationReport, ValidationRule, ValidationViolation, Validator, ViolationSeverity};
pub use synthesis::{ProcessingOptions, ProducerError, StrategyProducer, StrategySynthesizer, SynthesisError};
pub use hashing::{canonical_json, input_fingerprint, sha256_hex};
pub use branding::{BrandingConfig, BrandingError, BrandingSource, BrandingStack, ResolvedBranding};
pub use export::{export_strategy, ExportError, ExportFormat, ExportOptions, ExportRenderer, ExportResult};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const MIN_CATALOG_VERSION: &str = "1.0.0";
