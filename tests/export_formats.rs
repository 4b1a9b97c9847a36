//! Export Contract Tests
//!
//! Format dispatch, filenames, branding and byte-level determinism across
//! the three container formats.

use std::io::{Cursor, Read};

use chrono::NaiveDate;
use stratforge_core::{
    export_strategy,
    model::{BudgetPlan, ContentStrategyPlan},
    BrandingConfig, BrandingSource, BrandingStack, ExportError, ExportFormat, ExportOptions,
    ExportRenderer, StrategyInput, StrategyOutput, StrategySynthesizer, Timeframe,
};

fn sample_output() -> StrategyOutput {
    let input = StrategyInput {
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
    };
    StrategySynthesizer::default().process_strategy(&input).output
}

fn minimal_output() -> StrategyOutput {
    StrategyOutput {
        executive_summary: "Minimal".to_string(),
        target_audience: vec![],
        marketing_channels: vec![],
        content_strategy: ContentStrategyPlan::default(),
        timeline: vec![],
        budget: BudgetPlan { total: 0, channels: vec![], contingency: 0 },
        kpis: vec![],
        recommendations: vec![],
    }
}

fn branding(json: &str) -> BrandingConfig {
    serde_json::from_str(json).unwrap()
}

fn part(buffer: &[u8], name: &str) -> Option<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(buffer)).unwrap();
    let mut file = archive.by_name(name).ok()?;
    let mut text = String::new();
    file.read_to_string(&mut text).unwrap();
    Some(text)
}

fn main_part(format: ExportFormat) -> &'static str {
    match format {
        ExportFormat::Pptx => "ppt/presentation.xml",
        ExportFormat::Docx => "word/document.xml",
        ExportFormat::Xlsx => "xl/workbook.xml",
    }
}

#[test]
fn export_rejects_unknown_format() {
    let err = export_strategy(&sample_output(), "Acme", &ExportOptions::new("pdf")).unwrap_err();
    assert!(matches!(err, ExportError::UnsupportedFormat(_)));
    assert!(err.to_string().contains("pdf"));
}

#[test]
fn export_every_format_yields_named_package() {
    let output = sample_output();
    for format in ExportFormat::ALL {
        let result =
            export_strategy(&output, "TechStart Solutions", &ExportOptions::new(format.extension())).unwrap();

        assert!(!result.buffer.is_empty());
        assert_eq!(result.filename, format!("TechStart_Solutions_Marketing_Strategy.{format}"));
        assert_eq!(result.mime_type, format.mime_type());

        let mut archive = zip::ZipArchive::new(Cursor::new(result.buffer.as_slice())).unwrap();
        assert_eq!(archive.by_index(0).unwrap().name(), "[Content_Types].xml");
        assert!(part(&result.buffer, main_part(format)).is_some(), "{format}");
        assert!(part(&result.buffer, "docProps/core.xml").is_some());
        // No extras, no custom properties
        assert!(part(&result.buffer, "docProps/custom.xml").is_none());
    }
}

#[test]
fn export_filename_for_empty_name() {
    let result = export_strategy(&sample_output(), "", &ExportOptions::new("pptx")).unwrap();
    assert_eq!(result.filename, "_Marketing_Strategy.pptx");
}

#[test]
fn export_minimal_output_in_every_format() {
    let output = minimal_output();
    for format in ExportFormat::ALL {
        let result = export_strategy(&output, "Acme", &ExportOptions::new(format.extension())).unwrap();
        assert!(!result.buffer.is_empty(), "{format}");
    }
}

#[test]
fn export_without_date_is_byte_identical() {
    let output = sample_output();
    let options = ExportOptions::new("docx")
        .with_customization(branding(r##"{"primaryColor": "#0F172A", "agencyName": "North & Co"}"##));
    for format in ExportFormat::ALL {
        let options = ExportOptions { format: format.extension().to_string(), ..options.clone() };
        let a = export_strategy(&output, "Acme", &options).unwrap();
        let b = export_strategy(&output, "Acme", &options).unwrap();
        assert_eq!(a.buffer, b.buffer, "{format}");
        assert_eq!(a.sha256(), b.sha256());
    }
}

#[test]
fn export_date_lands_on_title_page_and_core_properties() {
    let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    let result = export_strategy(&sample_output(), "Acme", &ExportOptions::new("docx").with_date(date)).unwrap();

    let document = part(&result.buffer, "word/document.xml").unwrap();
    assert!(document.contains("Generated on March 1, 2026"));
    assert!(document.contains("MARKETING STRATEGY"));
    assert!(document.contains("CONFIDENTIAL"));
    let core = part(&result.buffer, "docProps/core.xml").unwrap();
    assert!(core.contains("2026-03-01T00:00:00Z"));

    let undated = export_strategy(&sample_output(), "Acme", &ExportOptions::new("docx")).unwrap();
    let document = part(&undated.buffer, "word/document.xml").unwrap();
    assert!(!document.contains("Generated on"));
}

#[test]
fn export_document_sections() {
    let result = export_strategy(&sample_output(), "Acme", &ExportOptions::new("docx")).unwrap();
    let document = part(&result.buffer, "word/document.xml").unwrap();
    for heading in [
        "Executive Summary",
        "Target Audience Analysis",
        "Marketing Channels &amp; Budget Allocation",
        "Budget Summary",
        "Content Strategy",
        "Implementation Timeline",
        "Key Performance Indicators",
        "Recommendations",
    ] {
        assert!(document.contains(heading), "missing {heading}");
    }
    assert!(part(&result.buffer, "word/numbering.xml").is_some());
}

fn slide_parts(buffer: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(buffer)).unwrap();
    let names: Vec<String> = archive
        .file_names()
        .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
        .map(str::to_string)
        .collect();
    // Deck order, not archive order
    (1..=names.len())
        .map(|n| {
            let name = format!("ppt/slides/slide{n}.xml");
            assert!(names.contains(&name), "missing {name}");
            part(buffer, &name).unwrap()
        })
        .collect()
}

#[test]
fn export_slide_deck_covers_every_section() {
    let output = sample_output();
    let result = export_strategy(&output, "Acme", &ExportOptions::new("pptx")).unwrap();
    let slides = slide_parts(&result.buffer);

    // title, summary, personas, channels, budget, content, phases, kpis, recommendations
    let expected = 2 + output.target_audience.len() + 1 + 1 + 1 + output.timeline.len() + 1 + 1;
    assert_eq!(output.timeline.len(), 3);
    assert_eq!(slides.len(), expected);

    assert!(slides[0].contains("Marketing Strategy"));
    assert!(slides[1].contains("Executive Summary"));
    for (slide, persona) in slides[2..].iter().zip(&output.target_audience) {
        assert!(slide.contains(&format!("Target Audience: {}", persona.name)));
    }
    for title in [
        "Marketing Channels",
        "Budget Allocation",
        "Content Strategy",
        "Timeline: Foundation",
        "Timeline: Growth",
        "Timeline: Scale",
        "Key Performance Indicators",
        "Recommendations",
    ] {
        assert!(slides.iter().any(|s| s.contains(title)), "missing {title}");
    }
    assert!(slides.last().unwrap().contains("Recommendations"));

    let minimal = export_strategy(&minimal_output(), "Acme", &ExportOptions::new("pptx")).unwrap();
    let slides = slide_parts(&minimal.buffer);
    assert_eq!(slides.len(), 3);
    assert!(slides[1].contains("Executive Summary"));
    assert!(slides[2].contains("Budget Allocation"));
}

#[test]
fn export_workbook_has_fixed_sheets_and_numeric_money() {
    let result = export_strategy(&sample_output(), "Acme", &ExportOptions::new("xlsx")).unwrap();
    let workbook = part(&result.buffer, "xl/workbook.xml").unwrap();
    for sheet in [
        "Summary",
        "Target Audience",
        "Channels",
        "Budget",
        "Content Strategy",
        "Timeline",
        "KPIs",
        "Recommendations",
    ] {
        assert!(workbook.contains(&format!("name=\"{sheet}\"")), "missing {sheet}");
    }
    let budget = part(&result.buffer, "xl/worksheets/sheet4.xml").unwrap();
    assert!(budget.contains("<v>50000</v>"));
}

#[test]
fn export_partial_branding_keeps_defaults() {
    let options = ExportOptions::new("docx").with_customization(branding(r##"{"primaryColor": "#0a0"}"##));
    let result = export_strategy(&sample_output(), "Acme", &options).unwrap();

    let styles = part(&result.buffer, "word/styles.xml").unwrap();
    assert!(styles.contains("00AA00"));
    assert!(styles.contains("Calibri"));
    // No footer or logo configured
    assert!(part(&result.buffer, "word/footer1.xml").is_none());
    assert!(part(&result.buffer, "word/header1.xml").is_none());
}

#[test]
fn export_malformed_color_is_a_branding_failure() {
    let options = ExportOptions::new("pptx").with_customization(branding(r#"{"accentColor": "teal-ish"}"#));
    let err = export_strategy(&sample_output(), "Acme", &options).unwrap_err();
    match err {
        ExportError::Rendering { format, section, .. } => {
            assert_eq!(format, ExportFormat::Pptx);
            assert_eq!(section, "branding");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn export_footer_and_logo_reach_every_format() {
    let options = ExportOptions::new("pptx").with_customization(branding(
        r#"{"footerText": "Confidential - Acme", "logoUrl": "https://cdn.example.com/logo.png"}"#,
    ));
    let output = sample_output();

    let deck = export_strategy(&output, "Acme", &options).unwrap();
    let slide = part(&deck.buffer, "ppt/slides/slide2.xml").unwrap();
    assert!(slide.contains("Confidential - Acme"));
    let title_rels = part(&deck.buffer, "ppt/slides/_rels/slide1.xml.rels").unwrap();
    assert!(title_rels.contains("https://cdn.example.com/logo.png"));

    let options = ExportOptions { format: "docx".to_string(), ..options };
    let doc = export_strategy(&output, "Acme", &options).unwrap();
    assert!(part(&doc.buffer, "word/footer1.xml").unwrap().contains("Confidential - Acme"));
    let header_rels = part(&doc.buffer, "word/_rels/header1.xml.rels").unwrap();
    assert!(header_rels.contains("TargetMode=\"External\""));

    let options = ExportOptions { format: "xlsx".to_string(), ..options };
    let book = export_strategy(&output, "Acme", &options).unwrap();
    let summary = part(&book.buffer, "xl/worksheets/sheet1.xml").unwrap();
    assert!(summary.contains("<oddFooter>&amp;CConfidential - Acme</oddFooter>"));
    assert!(summary.contains("https://cdn.example.com/logo.png"));
}

#[test]
fn export_extra_fields_become_custom_properties() {
    let options = ExportOptions::new("xlsx").with_customization(branding(r#"{"region": "EMEA"}"#));
    let result = export_strategy(&sample_output(), "Acme", &options).unwrap();
    let custom = part(&result.buffer, "docProps/custom.xml").unwrap();
    assert!(custom.contains("name=\"region\""));
    assert!(custom.contains("EMEA"));
}

#[test]
fn export_request_branding_overrides_agency_layer() {
    let layers = BrandingStack::new().with(
        BrandingSource::Agency,
        branding(r##"{"primaryColor": "#111111", "agencyName": "Northwind"}"##),
    );
    let options = ExportOptions::new("pptx").with_customization(branding(r##"{"primaryColor": "#222222"}"##));
    let result = ExportRenderer::new()
        .export_layered(&sample_output(), "Acme", &options, &layers)
        .unwrap();

    let theme = part(&result.buffer, "ppt/theme/theme1.xml").unwrap();
    assert!(theme.contains("222222"));
    assert!(!theme.contains("111111"));
    let slide = part(&result.buffer, "ppt/slides/slide2.xml").unwrap();
    assert!(slide.contains("Prepared by Northwind"));
}
