//! Export Renderer - canonical strategy to office documents
//!
//! One entry point, [`ExportRenderer::export`]. Format strings are parsed
//! here and nowhere else; branding is resolved once here and handed to the
//! selected [`FormatBuilder`] read-only.

mod docx;
mod ooxml;
mod pptx;
mod xlsx;

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::branding::{BrandingConfig, BrandingSource, BrandingStack, ResolvedBranding};
use crate::filename::export_filename;
use crate::hashing::sha256_hex;
use crate::model::StrategyOutput;

pub use docx::DocumentBuilder;
pub use pptx::SlideDeckBuilder;
pub use xlsx::SpreadsheetBuilder;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to render {section} for {format}: {message}")]
    Rendering {
        format: ExportFormat,
        section: String,
        message: String,
    },

    #[error("Failed to package {format} document: {message}")]
    Package { format: ExportFormat, message: String },
}

impl ExportError {
    pub(crate) fn rendering(format: ExportFormat, section: &str, e: impl fmt::Display) -> Self {
        Self::Rendering {
            format,
            section: section.to_string(),
            message: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pptx,
    Docx,
    Xlsx,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [Self::Pptx, Self::Docx, Self::Xlsx];

    /// Exact, case-sensitive match on `pptx`, `docx` or `xlsx`.
    pub fn parse(raw: &str) -> Result<Self, ExportError> {
        match raw {
            "pptx" => Ok(Self::Pptx),
            "docx" => Ok(Self::Docx),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Pptx => "pptx",
            Self::Docx => "docx",
            Self::Xlsx => "xlsx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Pptx => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
            Self::Docx => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customization: Option<BrandingConfig>,
    /// Printed on the title page and stored as the creation date. Without
    /// it the output carries no date at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_on: Option<NaiveDate>,
}

impl ExportOptions {
    pub fn new(format: impl Into<String>) -> Self {
        Self { format: format.into(), ..Self::default() }
    }

    pub fn with_customization(mut self, customization: BrandingConfig) -> Self {
        self.customization = Some(customization);
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.generated_on = Some(date);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    pub buffer: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
}

impl ExportResult {
    pub fn sha256(&self) -> String {
        sha256_hex(&self.buffer)
    }
}

/// Per-call values every builder needs besides the strategy and branding.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub business_name: &'a str,
    pub generated_on: Option<NaiveDate>,
}

impl RenderContext<'_> {
    pub fn date_label(&self) -> Option<String> {
        self.generated_on.map(|d| d.format("%B %-d, %Y").to_string())
    }

    pub fn title(&self) -> String {
        format!("{} - Marketing Strategy", self.business_name)
    }
}

/// Renders the canonical strategy into one container format.
pub trait FormatBuilder: Send + Sync {
    fn format(&self) -> ExportFormat;

    fn build(
        &self,
        output: &StrategyOutput,
        branding: &ResolvedBranding,
        ctx: &RenderContext<'_>,
    ) -> Result<Vec<u8>, ExportError>;
}

pub struct ExportRenderer {
    builders: BTreeMap<ExportFormat, Box<dyn FormatBuilder>>,
}

impl ExportRenderer {
    pub fn new() -> Self {
        let mut renderer = Self { builders: BTreeMap::new() };
        renderer.register(Box::new(SlideDeckBuilder));
        renderer.register(Box::new(DocumentBuilder));
        renderer.register(Box::new(SpreadsheetBuilder));
        renderer
    }

    /// Replace the builder for its format.
    pub fn register(&mut self, builder: Box<dyn FormatBuilder>) {
        self.builders.insert(builder.format(), builder);
    }

    pub fn export(
        &self,
        output: &StrategyOutput,
        business_name: &str,
        options: &ExportOptions,
    ) -> Result<ExportResult, ExportError> {
        self.export_layered(output, business_name, options, &BrandingStack::new())
    }

    /// Like [`export`](Self::export), with agency and client layers under
    /// the request's `customization`.
    pub fn export_layered(
        &self,
        output: &StrategyOutput,
        business_name: &str,
        options: &ExportOptions,
        layers: &BrandingStack,
    ) -> Result<ExportResult, ExportError> {
        let format = ExportFormat::parse(&options.format)?;
        let builder = self
            .builders
            .get(&format)
            .ok_or_else(|| ExportError::UnsupportedFormat(options.format.clone()))?;

        let mut stack = layers.clone();
        if let Some(customization) = &options.customization {
            stack.push(BrandingSource::Request, customization.clone());
        }
        let branding = stack
            .resolve()
            .map_err(|e| ExportError::rendering(format, "branding", e))?;
        debug!(%format, primary = %branding.primary_color, "Resolved branding");

        let ctx = RenderContext { business_name, generated_on: options.generated_on };
        let buffer = builder.build(output, &branding, &ctx)?;

        let result = ExportResult {
            buffer,
            filename: export_filename(business_name, format.extension()),
            mime_type: format.mime_type().to_string(),
        };
        info!(%format, filename = %result.filename, bytes = result.buffer.len(), "Exported strategy");
        Ok(result)
    }
}

impl Default for ExportRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Export with the default builders.
pub fn export_strategy(
    output: &StrategyOutput,
    business_name: &str,
    options: &ExportOptions,
) -> Result<ExportResult, ExportError> {
    ExportRenderer::new().export(output, business_name, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        for format in ExportFormat::ALL {
            assert_eq!(ExportFormat::parse(format.extension()).unwrap(), format);
        }
        let err = ExportFormat::parse("pdf").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported export format: pdf");
        assert!(ExportFormat::parse("PPTX").is_err());
    }

    #[test]
    fn test_mime_types() {
        assert!(ExportFormat::Docx.mime_type().ends_with("wordprocessingml.document"));
        assert!(ExportFormat::Xlsx.mime_type().ends_with("spreadsheetml.sheet"));
    }

    #[test]
    fn test_options_wire_shape() {
        let options: ExportOptions = serde_json::from_str(
            r##"{"format": "docx", "customization": {"primaryColor": "#123"}, "generatedOn": "2026-03-01"}"##,
        )
        .unwrap();
        assert_eq!(options.format, "docx");
        assert_eq!(options.generated_on, NaiveDate::from_ymd_opt(2026, 3, 1));
    }

    #[test]
    fn test_date_label() {
        let ctx = RenderContext {
            business_name: "Acme",
            generated_on: NaiveDate::from_ymd_opt(2026, 3, 1),
        };
        assert_eq!(ctx.date_label().as_deref(), Some("March 1, 2026"));
    }
}
