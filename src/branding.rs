//! Branding Authority - ordered white-label layering
//!
//! Agency defaults, then client workspace settings, then a per-request
//! override. Layers merge field by field with the last applied winning, and
//! the result is resolved once over the default theme before any builder
//! sees it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BrandingError {
    #[error("Invalid color for {field}: {value:?} (expected #RGB or #RRGGBB)")]
    InvalidColor { field: &'static str, value: String },
}

/// Where a branding layer comes from. Layers apply in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrandingSource {
    Agency,
    Client,
    Request,
}

/// Partially specified branding, as stored for agencies and clients or sent
/// with an export request. Unknown keys are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrandingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_light_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_font: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_font: Option<String>,
    #[serde(alias = "customFooterText", skip_serializing_if = "Option::is_none")]
    pub footer_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agency_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_company: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn overlay(base: &mut Option<String>, over: &Option<String>) {
    if let Some(value) = over.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        *base = Some(value.to_string());
    }
}

impl BrandingConfig {
    /// Apply `over` on top of `self`; blank strings and nulls do not shadow.
    pub fn merge(&mut self, over: &BrandingConfig) {
        overlay(&mut self.logo_url, &over.logo_url);
        overlay(&mut self.logo_light_url, &over.logo_light_url);
        overlay(&mut self.primary_color, &over.primary_color);
        overlay(&mut self.secondary_color, &over.secondary_color);
        overlay(&mut self.accent_color, &over.accent_color);
        overlay(&mut self.heading_font, &over.heading_font);
        overlay(&mut self.body_font, &over.body_font);
        overlay(&mut self.footer_text, &over.footer_text);
        overlay(&mut self.agency_name, &over.agency_name);
        overlay(&mut self.client_name, &over.client_name);
        overlay(&mut self.client_company, &over.client_company);
        for (key, value) in &over.extra {
            if !value.is_null() {
                self.extra.insert(key.clone(), value.clone());
            }
        }
    }

    pub fn resolve(&self) -> Result<ResolvedBranding, BrandingError> {
        let mut clean = BrandingConfig::default();
        clean.merge(self);
        clean.resolve_clean()
    }

    fn resolve_clean(self) -> Result<ResolvedBranding, BrandingError> {
        let theme = ResolvedBranding::default();
        let color = |field: &'static str, value: &Option<String>, fallback: &str| match value {
            Some(raw) => normalize_color(field, raw),
            None => Ok(fallback.to_string()),
        };

        Ok(ResolvedBranding {
            primary_color: color("primaryColor", &self.primary_color, &theme.primary_color)?,
            secondary_color: color("secondaryColor", &self.secondary_color, &theme.secondary_color)?,
            accent_color: color("accentColor", &self.accent_color, &theme.accent_color)?,
            heading_font: self.heading_font.unwrap_or(theme.heading_font),
            body_font: self.body_font.unwrap_or(theme.body_font),
            footer_text: self.footer_text,
            logo_url: self.logo_url,
            logo_light_url: self.logo_light_url,
            agency_name: self.agency_name,
            client_name: self.client_name,
            client_company: self.client_company,
            extra: self
                .extra
                .iter()
                .map(|(k, v)| (k.clone(), extra_text(v)))
                .collect(),
        })
    }
}

fn extra_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `#RGB`, `#RRGGBB`, with or without `#`, to uppercase `RRGGBB`.
pub fn normalize_color(field: &'static str, raw: &str) -> Result<String, BrandingError> {
    let hex = raw.trim().trim_start_matches('#');
    let invalid = || BrandingError::InvalidColor { field, value: raw.to_string() };

    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    match hex.len() {
        6 => Ok(hex.to_ascii_uppercase()),
        3 => Ok(hex
            .chars()
            .flat_map(|c| [c, c])
            .collect::<String>()
            .to_ascii_uppercase()),
        _ => Err(invalid()),
    }
}

/// Ordered branding layers.
#[derive(Debug, Clone, Default)]
pub struct BrandingStack {
    layers: Vec<(BrandingSource, BrandingConfig)>,
}

impl BrandingStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: BrandingSource, config: BrandingConfig) -> Self {
        self.push(source, config);
        self
    }

    pub fn push(&mut self, source: BrandingSource, config: BrandingConfig) {
        self.layers.push((source, config));
    }

    /// Agency, then client, then request; insertion order within a source.
    pub fn merged(&self) -> BrandingConfig {
        let mut layers: Vec<&(BrandingSource, BrandingConfig)> = self.layers.iter().collect();
        layers.sort_by_key(|(source, _)| *source);
        let mut merged = BrandingConfig::default();
        for (_, config) in layers {
            merged.merge(config);
        }
        merged
    }

    pub fn resolve(&self) -> Result<ResolvedBranding, BrandingError> {
        self.merged().resolve()
    }
}

/// Fully specified branding handed to every builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBranding {
    /// `RRGGBB`, no `#`.
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub heading_font: String,
    pub body_font: String,
    pub footer_text: Option<String>,
    pub logo_url: Option<String>,
    pub logo_light_url: Option<String>,
    pub agency_name: Option<String>,
    pub client_name: Option<String>,
    pub client_company: Option<String>,
    pub extra: BTreeMap<String, String>,
}

impl Default for ResolvedBranding {
    fn default() -> Self {
        Self {
            primary_color: "6366F1".to_string(),
            secondary_color: "1F2937".to_string(),
            accent_color: "F59E0B".to_string(),
            heading_font: "Calibri Light".to_string(),
            body_font: "Calibri".to_string(),
            footer_text: None,
            logo_url: None,
            logo_light_url: None,
            agency_name: None,
            client_name: None,
            client_company: None,
            extra: BTreeMap::new(),
        }
    }
}

impl ResolvedBranding {
    /// Footer line: explicit footer text, else "Prepared by <agency>".
    pub fn footer(&self) -> Option<String> {
        self.footer_text
            .clone()
            .or_else(|| self.agency_name.as_ref().map(|a| format!("Prepared by {a}")))
    }

    /// "Prepared for ..." line built from client name and company.
    pub fn prepared_for(&self) -> Option<String> {
        match (&self.client_name, &self.client_company) {
            (Some(name), Some(company)) => Some(format!("Prepared for {name}, {company}")),
            (Some(one), None) | (None, Some(one)) => Some(format!("Prepared for {one}")),
            (None, None) => None,
        }
    }

    /// Main logo, else the light-background variant.
    pub fn logo(&self) -> Option<&str> {
        self.logo_url.as_deref().or(self.logo_light_url.as_deref())
    }
}
