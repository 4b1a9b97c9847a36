//! Multi-sheet workbook builder (SpreadsheetML).
//!
//! Eight fixed sheets, one per section. Strings are written inline so the
//! workbook needs no shared string table; money goes in numeric cells with a
//! currency format so it stays summable.

use super::ooxml::{
    content_type, rel_type, theme_xml, DocProps, Package, Relationships, ThemeColors, XmlError,
    XmlWriter, NS_RELATIONSHIPS,
};
use super::{ExportError, ExportFormat, FormatBuilder, RenderContext};
use crate::branding::ResolvedBranding;
use crate::budget::percentage_of;
use crate::model::StrategyOutput;
use tracing::warn;

const FORMAT: ExportFormat = ExportFormat::Xlsx;

const NS_SHEET: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Excel refuses to open a cell holding more than this many UTF-16 units.
const MAX_CELL_CHARS: usize = 32_767;

const CT_WORKBOOK: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const CT_WORKSHEET: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const CT_STYLES: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";

/// Indexes into `cellXfs` in [`styles_xml`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Plain = 0,
    Header = 1,
    Money = 2,
    Title = 3,
    Wrapped = 4,
    Label = 5,
}

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String, Style),
    Number(u64, Style),
    Blank,
}

impl Cell {
    fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into(), Style::Plain)
    }

    fn wrapped(value: impl Into<String>) -> Self {
        Self::Text(value.into(), Style::Wrapped)
    }

    fn label(value: impl Into<String>) -> Self {
        Self::Text(value.into(), Style::Label)
    }

    fn money(amount: u64) -> Self {
        Self::Number(amount, Style::Money)
    }

    fn percent(value: u32) -> Self {
        Self::Text(format!("{value}%"), Style::Plain)
    }
}

struct Sheet {
    name: &'static str,
    widths: Vec<u32>,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    fn new(name: &'static str, widths: &[u32]) -> Self {
        Self { name, widths: widths.to_vec(), rows: Vec::new() }
    }

    /// Sheet with a styled header row.
    fn table(name: &'static str, columns: &[(&str, u32)]) -> Self {
        let widths: Vec<u32> = columns.iter().map(|(_, w)| *w).collect();
        let mut sheet = Self::new(name, &widths);
        sheet.push(
            columns
                .iter()
                .map(|(title, _)| Cell::Text(title.to_string(), Style::Header))
                .collect(),
        );
        sheet
    }

    fn push(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    fn to_xml(&self, footer: Option<&str>) -> Result<Vec<u8>, XmlError> {
        let mut w = XmlWriter::new()?;
        w.start("worksheet", &[("xmlns", NS_SHEET), ("xmlns:r", NS_RELATIONSHIPS)])?;

        if !self.widths.is_empty() {
            w.start("cols", &[])?;
            for (i, width) in self.widths.iter().enumerate() {
                let col = (i + 1).to_string();
                let width = width.to_string();
                w.empty(
                    "col",
                    &[
                        ("min", col.as_str()),
                        ("max", col.as_str()),
                        ("width", width.as_str()),
                        ("customWidth", "1"),
                    ],
                )?;
            }
            w.end("cols")?;
        }

        w.start("sheetData", &[])?;
        for (r, row) in self.rows.iter().enumerate() {
            let row_ref = (r + 1).to_string();
            w.start("row", &[("r", row_ref.as_str())])?;
            for (c, cell) in row.iter().enumerate() {
                let cell_ref = format!("{}{}", column_name(c), row_ref);
                match cell {
                    Cell::Text(value, style) => {
                        let style = (*style as u8).to_string();
                        w.start(
                            "c",
                            &[("r", cell_ref.as_str()), ("s", style.as_str()), ("t", "inlineStr")],
                        )?;
                        w.start("is", &[])?;
                        w.leaf("t", &[("xml:space", "preserve")], clip_cell_text(value, &cell_ref))?;
                        w.end("is")?;
                        w.end("c")?;
                    }
                    Cell::Number(value, style) => {
                        let style = (*style as u8).to_string();
                        w.start("c", &[("r", cell_ref.as_str()), ("s", style.as_str())])?;
                        w.leaf("v", &[], &value.to_string())?;
                        w.end("c")?;
                    }
                    Cell::Blank => {}
                }
            }
            w.end("row")?;
        }
        w.end("sheetData")?;

        w.empty(
            "pageMargins",
            &[
                ("left", "0.7"),
                ("right", "0.7"),
                ("top", "0.75"),
                ("bottom", "0.75"),
                ("header", "0.3"),
                ("footer", "0.3"),
            ],
        )?;
        if let Some(text) = footer {
            w.start("headerFooter", &[])?;
            w.leaf("oddFooter", &[], &footer_code(text))?;
            w.end("headerFooter")?;
        }

        w.end("worksheet")?;
        Ok(w.finish())
    }
}

/// Longest prefix of `value` that fits in one cell, cut on a char boundary.
fn clip_cell_text<'a>(value: &'a str, cell_ref: &str) -> &'a str {
    let mut units = 0;
    for (i, c) in value.char_indices() {
        units += c.len_utf16();
        if units > MAX_CELL_CHARS {
            warn!(cell = cell_ref, length = value.len(), "Truncating text to the cell limit");
            return &value[..i];
        }
    }
    value
}

/// Zero-based column index to `A`, `B`, ... `Z`, `AA`, ...
fn column_name(index: usize) -> String {
    let mut n = index + 1;
    let mut name = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8(name).unwrap_or_default()
}

/// Centered footer. `&` starts a format code, so literal ampersands double.
fn footer_code(text: &str) -> String {
    format!("&C{}", text.replace('&', "&&"))
}

fn summary_sheet(output: &StrategyOutput, branding: &ResolvedBranding, ctx: &RenderContext<'_>) -> Sheet {
    let mut sheet = Sheet::new("Summary", &[24, 90]);
    sheet.push(vec![Cell::Text(ctx.title(), Style::Title)]);
    sheet.push(vec![]);
    sheet.push(vec![Cell::label("Business"), Cell::text(ctx.business_name)]);
    if let Some(line) = branding.prepared_for() {
        sheet.push(vec![Cell::label("Prepared for"), Cell::text(line)]);
    }
    if let Some(agency) = &branding.agency_name {
        sheet.push(vec![Cell::label("Prepared by"), Cell::text(agency.as_str())]);
    }
    if let Some(date) = ctx.date_label() {
        sheet.push(vec![Cell::label("Generated on"), Cell::text(date)]);
    }
    if let Some(logo) = branding.logo() {
        sheet.push(vec![Cell::label("Logo"), Cell::text(logo)]);
    }
    sheet.push(vec![Cell::label("Total budget"), Cell::money(output.budget.total)]);
    sheet.push(vec![Cell::label("Contingency"), Cell::money(output.budget.contingency)]);
    sheet.push(vec![]);
    sheet.push(vec![
        Cell::Text("Executive Summary".to_string(), Style::Header),
        Cell::Text(String::new(), Style::Header),
    ]);
    for block in output.executive_summary.split("\n\n").filter(|b| !b.trim().is_empty()) {
        sheet.push(vec![Cell::Blank, Cell::wrapped(block)]);
    }
    sheet
}

fn audience_sheet(output: &StrategyOutput) -> Sheet {
    let mut sheet = Sheet::table(
        "Target Audience",
        &[
            ("Persona", 24),
            ("Demographics", 36),
            ("Psychographics", 36),
            ("Pain Points", 48),
            ("Preferred Channels", 30),
        ],
    );
    for persona in &output.target_audience {
        sheet.push(vec![
            Cell::label(persona.name.as_str()),
            Cell::wrapped(persona.demographics.as_str()),
            Cell::wrapped(persona.psychographics.as_str()),
            Cell::wrapped(persona.pain_points.join("\n")),
            Cell::wrapped(persona.preferred_channels.join(", ")),
        ]);
    }
    sheet
}

fn channels_sheet(output: &StrategyOutput) -> Sheet {
    let mut sheet = Sheet::table(
        "Channels",
        &[
            ("Channel", 24),
            ("Budget", 14),
            ("Percentage", 12),
            ("Expected ROI", 16),
            ("Timeline", 18),
            ("Description", 40),
            ("Tactics", 48),
        ],
    );
    for channel in &output.marketing_channels {
        sheet.push(vec![
            Cell::label(channel.name.as_str()),
            Cell::money(channel.budget_allocation),
            Cell::percent(channel.percentage),
            Cell::text(channel.expected_roi.as_str()),
            Cell::text(channel.timeline.as_str()),
            Cell::wrapped(channel.description.as_str()),
            Cell::wrapped(channel.tactics.join("\n")),
        ]);
    }
    sheet
}

fn budget_sheet(output: &StrategyOutput) -> Sheet {
    let budget = &output.budget;
    let mut sheet = Sheet::table("Budget", &[("Line", 28), ("Amount", 16), ("Percentage", 12)]);
    for line in &budget.channels {
        sheet.push(vec![
            Cell::text(line.channel.as_str()),
            Cell::money(line.amount),
            Cell::percent(line.percentage),
        ]);
    }
    sheet.push(vec![
        Cell::text("Contingency"),
        Cell::money(budget.contingency),
        Cell::percent(percentage_of(budget.contingency, budget.total)),
    ]);
    sheet.push(vec![Cell::label("Total"), Cell::money(budget.total), Cell::percent(100)]);
    sheet
}

fn content_sheet(output: &StrategyOutput) -> Sheet {
    let content = &output.content_strategy;
    let mut sheet = Sheet::table("Content Strategy", &[("Item", 22), ("Detail", 70)]);
    for theme in &content.themes {
        sheet.push(vec![Cell::text("Theme"), Cell::wrapped(theme.as_str())]);
    }
    for kind in &content.content_types {
        let detail = if kind.description.is_empty() {
            kind.kind.clone()
        } else {
            format!("{}: {}", kind.kind, kind.description)
        };
        sheet.push(vec![Cell::text("Content type"), Cell::wrapped(detail)]);
    }
    if !content.frequency.is_empty() {
        sheet.push(vec![Cell::text("Frequency"), Cell::text(content.frequency.as_str())]);
    }
    if !content.distribution.is_empty() {
        sheet.push(vec![Cell::text("Distribution"), Cell::wrapped(content.distribution.join(", "))]);
    }
    sheet
}

fn timeline_sheet(output: &StrategyOutput) -> Sheet {
    let mut sheet = Sheet::table(
        "Timeline",
        &[("Phase", 22), ("Duration", 16), ("Activities", 50), ("Deliverables", 50)],
    );
    for phase in &output.timeline {
        sheet.push(vec![
            Cell::label(phase.phase.as_str()),
            Cell::text(phase.duration.as_str()),
            Cell::wrapped(phase.activities.join("\n")),
            Cell::wrapped(phase.deliverables.join("\n")),
        ]);
    }
    sheet
}

fn kpi_sheet(output: &StrategyOutput) -> Sheet {
    let mut sheet = Sheet::table(
        "KPIs",
        &[("Metric", 28), ("Target", 32), ("Frequency", 14), ("Measurement", 44)],
    );
    for kpi in &output.kpis {
        sheet.push(vec![
            Cell::label(kpi.metric.as_str()),
            Cell::text(kpi.target.as_str()),
            Cell::text(kpi.frequency.as_str()),
            Cell::wrapped(kpi.measurement_method.as_str()),
        ]);
    }
    sheet
}

fn recommendations_sheet(output: &StrategyOutput) -> Sheet {
    let mut sheet = Sheet::table("Recommendations", &[("#", 6), ("Recommendation", 90)]);
    for (i, recommendation) in (1u64..).zip(&output.recommendations) {
        sheet.push(vec![
            Cell::Number(i, Style::Plain),
            Cell::wrapped(recommendation.as_str()),
        ]);
    }
    sheet
}

fn workbook_xml(sheets: &[Sheet], sheet_rels: &[String]) -> Result<Vec<u8>, XmlError> {
    let mut w = XmlWriter::new()?;
    w.start("workbook", &[("xmlns", NS_SHEET), ("xmlns:r", NS_RELATIONSHIPS)])?;
    w.start("sheets", &[])?;
    for (i, (sheet, rel)) in sheets.iter().zip(sheet_rels).enumerate() {
        let id = (i + 1).to_string();
        w.empty(
            "sheet",
            &[("name", sheet.name), ("sheetId", id.as_str()), ("r:id", rel.as_str())],
        )?;
    }
    w.end("sheets")?;
    w.end("workbook")?;
    Ok(w.finish())
}

fn styles_xml(branding: &ResolvedBranding) -> Result<Vec<u8>, XmlError> {
    let mut w = XmlWriter::new()?;
    w.start("styleSheet", &[("xmlns", NS_SHEET)])?;

    w.start("numFmts", &[("count", "1")])?;
    w.empty("numFmt", &[("numFmtId", "164"), ("formatCode", "\"$\"#,##0")])?;
    w.end("numFmts")?;

    // (bold, size, color, face)
    let fonts = [
        (false, "11", branding.secondary_color.as_str(), branding.body_font.as_str()),
        (true, "11", "FFFFFF", branding.body_font.as_str()),
        (true, "16", branding.primary_color.as_str(), branding.heading_font.as_str()),
        (true, "11", branding.secondary_color.as_str(), branding.body_font.as_str()),
    ];
    w.start("fonts", &[("count", "4")])?;
    for (bold, size, color, face) in fonts {
        let argb = format!("FF{color}");
        w.start("font", &[])?;
        if bold {
            w.empty("b", &[])?;
        }
        w.empty("sz", &[("val", size)])?;
        w.empty("color", &[("rgb", argb.as_str())])?;
        w.empty("name", &[("val", face)])?;
        w.end("font")?;
    }
    w.end("fonts")?;

    let header_fill = format!("FF{}", branding.primary_color);
    w.start("fills", &[("count", "3")])?;
    for pattern in ["none", "gray125"] {
        w.start("fill", &[])?;
        w.empty("patternFill", &[("patternType", pattern)])?;
        w.end("fill")?;
    }
    w.start("fill", &[])?;
    w.start("patternFill", &[("patternType", "solid")])?;
    w.empty("fgColor", &[("rgb", header_fill.as_str())])?;
    w.empty("bgColor", &[("indexed", "64")])?;
    w.end("patternFill")?;
    w.end("fill")?;
    w.end("fills")?;

    w.start("borders", &[("count", "1")])?;
    w.empty("border", &[])?;
    w.end("borders")?;

    w.start("cellStyleXfs", &[("count", "1")])?;
    w.empty("xf", &[("numFmtId", "0"), ("fontId", "0"), ("fillId", "0"), ("borderId", "0")])?;
    w.end("cellStyleXfs")?;

    // Order must match `Style`.
    let xfs: [(&str, &str, &str, bool); 6] = [
        ("0", "0", "0", false),
        ("0", "1", "2", false),
        ("164", "0", "0", false),
        ("0", "2", "0", false),
        ("0", "0", "0", true),
        ("0", "3", "0", false),
    ];
    w.start("cellXfs", &[("count", "6")])?;
    for (num_fmt, font, fill, wrap) in xfs {
        let mut attrs = vec![
            ("numFmtId", num_fmt),
            ("fontId", font),
            ("fillId", fill),
            ("borderId", "0"),
            ("xfId", "0"),
        ];
        if num_fmt != "0" {
            attrs.push(("applyNumberFormat", "1"));
        }
        if font != "0" {
            attrs.push(("applyFont", "1"));
        }
        if fill != "0" {
            attrs.push(("applyFill", "1"));
        }
        if wrap {
            attrs.push(("applyAlignment", "1"));
            w.start("xf", &attrs)?;
            w.empty("alignment", &[("wrapText", "1"), ("vertical", "top")])?;
            w.end("xf")?;
        } else {
            w.empty("xf", &attrs)?;
        }
    }
    w.end("cellXfs")?;

    w.end("styleSheet")?;
    Ok(w.finish())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadsheetBuilder;

impl FormatBuilder for SpreadsheetBuilder {
    fn format(&self) -> ExportFormat {
        FORMAT
    }

    fn build(
        &self,
        output: &StrategyOutput,
        branding: &ResolvedBranding,
        ctx: &RenderContext<'_>,
    ) -> Result<Vec<u8>, ExportError> {
        let failed = |section: &'static str| move |e: XmlError| ExportError::rendering(FORMAT, section, e);

        let sheets = [
            summary_sheet(output, branding, ctx),
            audience_sheet(output),
            channels_sheet(output),
            budget_sheet(output),
            content_sheet(output),
            timeline_sheet(output),
            kpi_sheet(output),
            recommendations_sheet(output),
        ];

        let mut package = Package::new();
        let props = DocProps {
            title: ctx.title(),
            subject: "Marketing Strategy".to_string(),
            creator: branding.agency_name.clone().unwrap_or_else(|| "StratForge".to_string()),
            created: ctx.generated_on,
            custom: &branding.extra,
        };
        package.add_root("xl/workbook.xml", &props).map_err(failed("package"))?;

        let footer = branding.footer();
        let mut workbook_rels = Relationships::new();
        let mut sheet_rels = Vec::with_capacity(sheets.len());
        for (i, sheet) in sheets.iter().enumerate() {
            let target = format!("worksheets/sheet{}.xml", i + 1);
            let xml = sheet.to_xml(footer.as_deref()).map_err(failed(sheet.name))?;
            package.add(format!("xl/{target}"), CT_WORKSHEET, xml);
            sheet_rels.push(workbook_rels.add(rel_type::WORKSHEET, target));
        }
        workbook_rels.add(rel_type::STYLES, "styles.xml");
        workbook_rels.add(rel_type::THEME, "theme/theme1.xml");

        package.add(
            "xl/workbook.xml",
            CT_WORKBOOK,
            workbook_xml(&sheets, &sheet_rels).map_err(failed("workbook"))?,
        );
        package.add("xl/styles.xml", CT_STYLES, styles_xml(branding).map_err(failed("styles"))?);
        let colors = ThemeColors {
            primary: &branding.primary_color,
            secondary: &branding.secondary_color,
            accent: &branding.accent_color,
        };
        let theme = theme_xml("StratForge", &colors, &branding.heading_font, &branding.body_font)
            .map_err(failed("theme"))?;
        package.add("xl/theme/theme1.xml", content_type::THEME, theme);
        package
            .add_rels("xl/_rels/workbook.xml.rels", &workbook_rels)
            .map_err(failed("package"))?;

        package
            .finish()
            .map_err(|message| ExportError::Package { format: FORMAT, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_names() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
    }

    #[test]
    fn test_footer_code_escapes_ampersands() {
        assert_eq!(footer_code("Smith & Co"), "&CSmith && Co");
    }

    #[test]
    fn test_money_cells_are_numeric() {
        let mut sheet = Sheet::new("Budget", &[10, 10]);
        sheet.push(vec![Cell::text("Total"), Cell::money(50000)]);
        let xml = String::from_utf8(sheet.to_xml(None).unwrap()).unwrap();
        assert!(xml.contains("<c r=\"B1\" s=\"2\"><v>50000</v></c>"));
        assert!(xml.contains("<c r=\"A1\" s=\"0\" t=\"inlineStr\"><is><t xml:space=\"preserve\">Total</t></is></c>"));
        assert!(!xml.contains("headerFooter"));
    }

    #[test]
    fn test_long_text_is_clipped_to_cell_limit() {
        let mut sheet = Sheet::new("Summary", &[]);
        sheet.push(vec![Cell::wrapped("a".repeat(40_000)), Cell::text("short")]);
        let xml = String::from_utf8(sheet.to_xml(None).unwrap()).unwrap();
        assert!(xml.contains(&format!("<t xml:space=\"preserve\">{}</t>", "a".repeat(MAX_CELL_CHARS))));
        assert!(!xml.contains(&"a".repeat(MAX_CELL_CHARS + 1)));
        assert!(xml.contains(">short</t>"));
    }

    #[test]
    fn test_clip_respects_char_boundaries() {
        let text = "\u{1F600}".repeat(20_000);
        let clipped = clip_cell_text(&text, "A1");
        assert_eq!(clipped.chars().count(), MAX_CELL_CHARS / 2);
        assert_eq!(clip_cell_text("plain", "A1"), "plain");
    }

    #[test]
    fn test_footer_written_when_present() {
        let sheet = Sheet::new("Summary", &[]);
        let xml = String::from_utf8(sheet.to_xml(Some("A & B")).unwrap()).unwrap();
        assert!(xml.contains("<oddFooter>&amp;CA &amp;&amp; B</oddFooter>"));
    }
}
