//! Paginated document builder (WordprocessingML).
//!
//! Title page, then one Heading 1 section per populated part of the
//! strategy. Channel, budget and KPI data go into tables; lists become
//! bulleted paragraphs.

use super::ooxml::{
    rel_type, DocProps, Package, Relationships, XmlError, XmlWriter, NS_DRAWING, NS_PICTURE,
    NS_RELATIONSHIPS,
};
use super::{ExportError, ExportFormat, FormatBuilder, RenderContext};
use crate::branding::ResolvedBranding;
use crate::budget::percentage_of;
use crate::model::StrategyOutput;
use crate::money::format_currency;

const FORMAT: ExportFormat = ExportFormat::Docx;

const NS_WORD: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_WORD_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";

const CT_DOCUMENT: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const CT_STYLES: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
const CT_NUMBERING: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml";
const CT_HEADER: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml";
const CT_FOOTER: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";

/// Letter page with one-inch margins leaves 9360 twips of text width.
const TEXT_WIDTH: u32 = 9360;
const BULLET_NUM_ID: &str = "1";

struct DocComposer<'b> {
    w: XmlWriter,
    branding: &'b ResolvedBranding,
}

impl<'b> DocComposer<'b> {
    fn new(branding: &'b ResolvedBranding) -> Result<Self, XmlError> {
        let mut w = XmlWriter::new()?;
        w.start("w:document", &[("xmlns:w", NS_WORD), ("xmlns:r", NS_RELATIONSHIPS)])?;
        w.start("w:body", &[])?;
        Ok(Self { w, branding })
    }

    fn run(&mut self, text: &str, bold: bool, color: Option<&str>) -> Result<(), XmlError> {
        self.w.start("w:r", &[])?;
        if bold || color.is_some() {
            self.w.start("w:rPr", &[])?;
            if bold {
                self.w.empty("w:b", &[])?;
            }
            if let Some(color) = color {
                self.w.empty("w:color", &[("w:val", color)])?;
            }
            self.w.end("w:rPr")?;
        }
        self.w.leaf("w:t", &[("xml:space", "preserve")], text)?;
        self.w.end("w:r")
    }

    fn paragraph(&mut self, style: &str, centered: bool, text: &str) -> Result<(), XmlError> {
        self.w.start("w:p", &[])?;
        self.w.start("w:pPr", &[])?;
        self.w.empty("w:pStyle", &[("w:val", style)])?;
        if centered {
            self.w.empty("w:jc", &[("w:val", "center")])?;
        }
        self.w.end("w:pPr")?;
        self.run(text, false, None)?;
        self.w.end("w:p")
    }

    fn heading1(&mut self, text: &str) -> Result<(), XmlError> {
        self.paragraph("Heading1", false, text)
    }

    fn heading2(&mut self, text: &str) -> Result<(), XmlError> {
        self.paragraph("Heading2", false, text)
    }

    fn body(&mut self, text: &str) -> Result<(), XmlError> {
        self.paragraph("Normal", false, text)
    }

    /// Bold label followed by plain value on one line.
    fn labeled(&mut self, label: &str, value: &str) -> Result<(), XmlError> {
        if value.is_empty() {
            return Ok(());
        }
        self.w.start("w:p", &[])?;
        self.run(&format!("{label}: "), true, None)?;
        self.run(value, false, None)?;
        self.w.end("w:p")
    }

    fn bullets(&mut self, items: &[String]) -> Result<(), XmlError> {
        for item in items {
            self.w.start("w:p", &[])?;
            self.w.start("w:pPr", &[])?;
            self.w.empty("w:pStyle", &[("w:val", "ListBullet")])?;
            self.w.start("w:numPr", &[])?;
            self.w.empty("w:ilvl", &[("w:val", "0")])?;
            self.w.empty("w:numId", &[("w:val", BULLET_NUM_ID)])?;
            self.w.end("w:numPr")?;
            self.w.end("w:pPr")?;
            self.run(item, false, None)?;
            self.w.end("w:p")?;
        }
        Ok(())
    }

    fn page_break(&mut self) -> Result<(), XmlError> {
        self.w.start("w:p", &[])?;
        self.w.start("w:r", &[])?;
        self.w.empty("w:br", &[("w:type", "page")])?;
        self.w.end("w:r")?;
        self.w.end("w:p")
    }

    fn table(&mut self, header: &[&str], rows: &[Vec<String>]) -> Result<(), XmlError> {
        let cols = header.len().max(1) as u32;
        let col_w = (TEXT_WIDTH / cols).to_string();
        let primary = self.branding.primary_color.clone();

        self.w.start("w:tbl", &[])?;
        self.w.start("w:tblPr", &[])?;
        self.w.empty("w:tblStyle", &[("w:val", "TableGrid")])?;
        self.w.empty("w:tblW", &[("w:w", "5000"), ("w:type", "pct")])?;
        self.w.end("w:tblPr")?;
        self.w.start("w:tblGrid", &[])?;
        for _ in 0..cols {
            self.w.empty("w:gridCol", &[("w:w", col_w.as_str())])?;
        }
        self.w.end("w:tblGrid")?;

        self.w.start("w:tr", &[])?;
        for cell in header {
            self.cell(cell, &col_w, Some(primary.as_str()))?;
        }
        self.w.end("w:tr")?;
        for row in rows {
            self.w.start("w:tr", &[])?;
            for cell in row {
                self.cell(cell, &col_w, None)?;
            }
            self.w.end("w:tr")?;
        }
        self.w.end("w:tbl")?;
        // Word needs a paragraph between a table and what follows.
        self.w.empty("w:p", &[])
    }

    /// Header cells are shaded with the brand color and set in bold white.
    fn cell(&mut self, text: &str, width: &str, shade: Option<&str>) -> Result<(), XmlError> {
        self.w.start("w:tc", &[])?;
        self.w.start("w:tcPr", &[])?;
        self.w.empty("w:tcW", &[("w:w", width), ("w:type", "dxa")])?;
        if let Some(fill) = shade {
            self.w.empty("w:shd", &[("w:val", "clear"), ("w:color", "auto"), ("w:fill", fill)])?;
        }
        self.w.end("w:tcPr")?;
        self.w.start("w:p", &[])?;
        if shade.is_some() {
            self.run(text, true, Some("FFFFFF"))?;
        } else {
            self.run(text, false, None)?;
        }
        self.w.end("w:p")?;
        self.w.end("w:tc")
    }

    fn finish(mut self, header: Option<&str>, footer: Option<&str>) -> Result<Vec<u8>, XmlError> {
        self.w.start("w:sectPr", &[])?;
        if let Some(id) = header {
            self.w.empty("w:headerReference", &[("w:type", "default"), ("r:id", id)])?;
        }
        if let Some(id) = footer {
            self.w.empty("w:footerReference", &[("w:type", "default"), ("r:id", id)])?;
        }
        self.w.empty("w:pgSz", &[("w:w", "12240"), ("w:h", "15840")])?;
        self.w.empty(
            "w:pgMar",
            &[
                ("w:top", "1440"),
                ("w:right", "1440"),
                ("w:bottom", "1440"),
                ("w:left", "1440"),
                ("w:header", "720"),
                ("w:footer", "720"),
                ("w:gutter", "0"),
            ],
        )?;
        self.w.end("w:sectPr")?;
        self.w.end("w:body")?;
        self.w.end("w:document")?;
        Ok(self.w.finish())
    }
}

fn title_page(d: &mut DocComposer<'_>, ctx: &RenderContext<'_>) -> Result<(), XmlError> {
    d.paragraph("Subtitle", true, "MARKETING STRATEGY")?;
    d.paragraph("Title", true, ctx.business_name)?;
    if let Some(line) = d.branding.prepared_for() {
        d.paragraph("Subtitle", true, &line)?;
    }
    if let Some(date) = ctx.date_label() {
        d.paragraph("Subtitle", true, &format!("Generated on {date}"))?;
    }
    d.paragraph("Subtitle", true, "CONFIDENTIAL")?;
    d.page_break()
}

fn document_xml(
    output: &StrategyOutput,
    branding: &ResolvedBranding,
    ctx: &RenderContext<'_>,
    header: Option<&str>,
    footer: Option<&str>,
) -> Result<Vec<u8>, ExportError> {
    let failed = |section: &'static str| move |e: XmlError| ExportError::rendering(FORMAT, section, e);
    let mut d = DocComposer::new(branding).map_err(failed("document"))?;

    title_page(&mut d, ctx).map_err(failed("title"))?;

    d.heading1("Executive Summary")
        .and_then(|_| {
            for block in output.executive_summary.split("\n\n").filter(|b| !b.trim().is_empty()) {
                d.body(block)?;
            }
            Ok(())
        })
        .map_err(failed("executive summary"))?;

    if !output.target_audience.is_empty() {
        let render = |d: &mut DocComposer<'_>| -> Result<(), XmlError> {
            d.heading1("Target Audience Analysis")?;
            for persona in &output.target_audience {
                d.heading2(&persona.name)?;
                if !persona.description.is_empty() {
                    d.body(&persona.description)?;
                }
                d.labeled("Demographics", &persona.demographics)?;
                d.labeled("Psychographics", &persona.psychographics)?;
                if !persona.pain_points.is_empty() {
                    d.labeled("Pain points", &persona.pain_points.join("; "))?;
                }
                d.labeled("Preferred channels", &persona.preferred_channels.join(", "))?;
            }
            Ok(())
        };
        render(&mut d).map_err(failed("target audience"))?;
    }

    if !output.marketing_channels.is_empty() {
        let render = |d: &mut DocComposer<'_>| -> Result<(), XmlError> {
            d.heading1("Marketing Channels & Budget Allocation")?;
            let rows: Vec<Vec<String>> = output
                .marketing_channels
                .iter()
                .map(|c| {
                    vec![
                        c.name.clone(),
                        format_currency(c.budget_allocation),
                        format!("{}%", c.percentage),
                        c.tactics.first().cloned().unwrap_or_default(),
                    ]
                })
                .collect();
            d.table(&["Channel", "Budget", "Percentage", "Focus"], &rows)?;
            for channel in &output.marketing_channels {
                d.heading2(&channel.name)?;
                if !channel.description.is_empty() {
                    d.body(&channel.description)?;
                }
                d.labeled("Expected ROI", &channel.expected_roi)?;
                d.labeled("Timeline", &channel.timeline)?;
                d.bullets(&channel.tactics)?;
            }
            Ok(())
        };
        render(&mut d).map_err(failed("marketing channels"))?;
    }

    {
        let budget = &output.budget;
        let mut rows: Vec<Vec<String>> = budget
            .channels
            .iter()
            .map(|l| vec![l.channel.clone(), format_currency(l.amount), format!("{}%", l.percentage)])
            .collect();
        rows.push(vec![
            "Contingency".to_string(),
            format_currency(budget.contingency),
            format!("{}%", percentage_of(budget.contingency, budget.total)),
        ]);
        rows.push(vec!["Total".to_string(), format_currency(budget.total), "100%".to_string()]);
        d.heading1("Budget Summary")
            .and_then(|_| d.table(&["Line", "Amount", "Share"], &rows))
            .map_err(failed("budget"))?;
    }

    let content = &output.content_strategy;
    if !content.is_empty() {
        let render = |d: &mut DocComposer<'_>| -> Result<(), XmlError> {
            d.heading1("Content Strategy")?;
            if !content.themes.is_empty() {
                d.heading2("Content Themes")?;
                d.bullets(&content.themes)?;
            }
            if !content.content_types.is_empty() {
                d.heading2("Content Types")?;
                let types: Vec<String> = content
                    .content_types
                    .iter()
                    .map(|t| if t.description.is_empty() { t.kind.clone() } else { format!("{}: {}", t.kind, t.description) })
                    .collect();
                d.bullets(&types)?;
            }
            d.labeled("Publishing frequency", &content.frequency)?;
            d.labeled("Distribution", &content.distribution.join(", "))
        };
        render(&mut d).map_err(failed("content strategy"))?;
    }

    if !output.timeline.is_empty() {
        let render = |d: &mut DocComposer<'_>| -> Result<(), XmlError> {
            d.heading1("Implementation Timeline")?;
            for phase in &output.timeline {
                if phase.duration.is_empty() {
                    d.heading2(&phase.phase)?;
                } else {
                    d.heading2(&format!("{} ({})", phase.phase, phase.duration))?;
                }
                if !phase.activities.is_empty() {
                    d.body("Activities")?;
                    d.bullets(&phase.activities)?;
                }
                if !phase.deliverables.is_empty() {
                    d.body("Deliverables")?;
                    d.bullets(&phase.deliverables)?;
                }
            }
            Ok(())
        };
        render(&mut d).map_err(failed("timeline"))?;
    }

    if !output.kpis.is_empty() {
        let rows: Vec<Vec<String>> = output
            .kpis
            .iter()
            .map(|k| vec![k.metric.clone(), k.target.clone(), k.frequency.clone(), k.measurement_method.clone()])
            .collect();
        d.heading1("Key Performance Indicators")
            .and_then(|_| d.table(&["Metric", "Target", "Frequency", "Measurement"], &rows))
            .map_err(failed("kpis"))?;
    }

    if !output.recommendations.is_empty() {
        d.heading1("Recommendations")
            .and_then(|_| d.bullets(&output.recommendations))
            .map_err(failed("recommendations"))?;
    }

    d.finish(header, footer).map_err(failed("document"))
}

fn styles_xml(branding: &ResolvedBranding) -> Result<Vec<u8>, XmlError> {
    let mut w = XmlWriter::new()?;
    w.start("w:styles", &[("xmlns:w", NS_WORD)])?;

    w.start("w:docDefaults", &[])?;
    w.start("w:rPrDefault", &[])?;
    w.start("w:rPr", &[])?;
    let body_font = branding.body_font.as_str();
    w.empty("w:rFonts", &[("w:ascii", body_font), ("w:hAnsi", body_font), ("w:cs", body_font)])?;
    w.empty("w:sz", &[("w:val", "22")])?;
    w.end("w:rPr")?;
    w.end("w:rPrDefault")?;
    w.end("w:docDefaults")?;

    // (id, name, font, size in half-points, color, bold, space before)
    let styles = [
        ("Normal", "Normal", body_font, "22", branding.secondary_color.as_str(), false, "0"),
        ("Title", "Title", branding.heading_font.as_str(), "56", branding.primary_color.as_str(), true, "2400"),
        ("Subtitle", "Subtitle", body_font, "28", branding.secondary_color.as_str(), false, "240"),
        ("Heading1", "heading 1", branding.heading_font.as_str(), "32", branding.primary_color.as_str(), true, "400"),
        ("Heading2", "heading 2", branding.heading_font.as_str(), "26", branding.accent_color.as_str(), true, "240"),
        ("ListBullet", "List Bullet", body_font, "22", branding.secondary_color.as_str(), false, "0"),
        ("Footer", "footer", body_font, "18", branding.secondary_color.as_str(), false, "0"),
    ];
    for (id, name, font, size, color, bold, before) in styles {
        w.start("w:style", &[("w:type", "paragraph"), ("w:styleId", id)])?;
        w.empty("w:name", &[("w:val", name)])?;
        if id != "Normal" {
            w.empty("w:basedOn", &[("w:val", "Normal")])?;
            w.empty("w:next", &[("w:val", "Normal")])?;
        }
        if id.starts_with("Heading") {
            w.empty("w:qFormat", &[])?;
        }
        w.start("w:pPr", &[])?;
        w.empty("w:spacing", &[("w:before", before), ("w:after", "160")])?;
        if id == "ListBullet" {
            w.empty("w:ind", &[("w:left", "720"), ("w:hanging", "360")])?;
        }
        w.end("w:pPr")?;
        w.start("w:rPr", &[])?;
        w.empty("w:rFonts", &[("w:ascii", font), ("w:hAnsi", font), ("w:cs", font)])?;
        if bold {
            w.empty("w:b", &[])?;
        }
        w.empty("w:color", &[("w:val", color)])?;
        w.empty("w:sz", &[("w:val", size)])?;
        w.end("w:rPr")?;
        w.end("w:style")?;
    }

    w.start("w:style", &[("w:type", "table"), ("w:styleId", "TableGrid")])?;
    w.empty("w:name", &[("w:val", "Table Grid")])?;
    w.start("w:tblPr", &[])?;
    w.start("w:tblBorders", &[])?;
    for edge in ["w:top", "w:left", "w:bottom", "w:right", "w:insideH", "w:insideV"] {
        w.empty(edge, &[("w:val", "single"), ("w:sz", "4"), ("w:space", "0"), ("w:color", "CBD5E1")])?;
    }
    w.end("w:tblBorders")?;
    w.end("w:tblPr")?;
    w.end("w:style")?;

    w.end("w:styles")?;
    Ok(w.finish())
}

fn numbering_xml() -> Result<Vec<u8>, XmlError> {
    let mut w = XmlWriter::new()?;
    w.start("w:numbering", &[("xmlns:w", NS_WORD)])?;
    w.start("w:abstractNum", &[("w:abstractNumId", "0")])?;
    w.start("w:lvl", &[("w:ilvl", "0")])?;
    w.empty("w:start", &[("w:val", "1")])?;
    w.empty("w:numFmt", &[("w:val", "bullet")])?;
    w.empty("w:lvlText", &[("w:val", "\u{2022}")])?;
    w.empty("w:lvlJc", &[("w:val", "left")])?;
    w.start("w:pPr", &[])?;
    w.empty("w:ind", &[("w:left", "720"), ("w:hanging", "360")])?;
    w.end("w:pPr")?;
    w.end("w:lvl")?;
    w.end("w:abstractNum")?;
    w.start("w:num", &[("w:numId", BULLET_NUM_ID)])?;
    w.empty("w:abstractNumId", &[("w:val", "0")])?;
    w.end("w:num")?;
    w.end("w:numbering")?;
    Ok(w.finish())
}

/// Right-aligned logo, linked by URL.
fn header_xml(rel_id: &str) -> Result<Vec<u8>, XmlError> {
    let (cx, cy) = ("1371600", "457200");
    let mut w = XmlWriter::new()?;
    w.start(
        "w:hdr",
        &[
            ("xmlns:w", NS_WORD),
            ("xmlns:r", NS_RELATIONSHIPS),
            ("xmlns:wp", NS_WORD_DRAWING),
            ("xmlns:a", NS_DRAWING),
            ("xmlns:pic", NS_PICTURE),
        ],
    )?;
    w.start("w:p", &[])?;
    w.start("w:pPr", &[])?;
    w.empty("w:jc", &[("w:val", "right")])?;
    w.end("w:pPr")?;
    w.start("w:r", &[])?;
    w.start("w:drawing", &[])?;
    w.start("wp:inline", &[("distT", "0"), ("distB", "0"), ("distL", "0"), ("distR", "0")])?;
    w.empty("wp:extent", &[("cx", cx), ("cy", cy)])?;
    w.empty("wp:docPr", &[("id", "1"), ("name", "Logo")])?;
    w.start("wp:cNvGraphicFramePr", &[])?;
    w.empty("a:graphicFrameLocks", &[("noChangeAspect", "1")])?;
    w.end("wp:cNvGraphicFramePr")?;
    w.start("a:graphic", &[])?;
    w.start("a:graphicData", &[("uri", NS_PICTURE)])?;
    w.start("pic:pic", &[])?;
    w.start("pic:nvPicPr", &[])?;
    w.empty("pic:cNvPr", &[("id", "0"), ("name", "Logo")])?;
    w.empty("pic:cNvPicPr", &[])?;
    w.end("pic:nvPicPr")?;
    w.start("pic:blipFill", &[])?;
    w.empty("a:blip", &[("r:link", rel_id)])?;
    w.start("a:stretch", &[])?;
    w.empty("a:fillRect", &[])?;
    w.end("a:stretch")?;
    w.end("pic:blipFill")?;
    w.start("pic:spPr", &[])?;
    w.start("a:xfrm", &[])?;
    w.empty("a:off", &[("x", "0"), ("y", "0")])?;
    w.empty("a:ext", &[("cx", cx), ("cy", cy)])?;
    w.end("a:xfrm")?;
    w.start("a:prstGeom", &[("prst", "rect")])?;
    w.empty("a:avLst", &[])?;
    w.end("a:prstGeom")?;
    w.end("pic:spPr")?;
    w.end("pic:pic")?;
    w.end("a:graphicData")?;
    w.end("a:graphic")?;
    w.end("wp:inline")?;
    w.end("w:drawing")?;
    w.end("w:r")?;
    w.end("w:p")?;
    w.end("w:hdr")?;
    Ok(w.finish())
}

fn footer_xml(text: &str) -> Result<Vec<u8>, XmlError> {
    let mut w = XmlWriter::new()?;
    w.start("w:ftr", &[("xmlns:w", NS_WORD), ("xmlns:r", NS_RELATIONSHIPS)])?;
    w.start("w:p", &[])?;
    w.start("w:pPr", &[])?;
    w.empty("w:pStyle", &[("w:val", "Footer")])?;
    w.empty("w:jc", &[("w:val", "center")])?;
    w.end("w:pPr")?;
    w.start("w:r", &[])?;
    w.leaf("w:t", &[("xml:space", "preserve")], text)?;
    w.end("w:r")?;
    w.end("w:p")?;
    w.end("w:ftr")?;
    Ok(w.finish())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentBuilder;

impl FormatBuilder for DocumentBuilder {
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

        let mut package = Package::new();
        let props = DocProps {
            title: ctx.title(),
            subject: "Marketing Strategy".to_string(),
            creator: branding.agency_name.clone().unwrap_or_else(|| "StratForge".to_string()),
            created: ctx.generated_on,
            custom: &branding.extra,
        };
        package.add_root("word/document.xml", &props).map_err(failed("package"))?;

        let mut doc_rels = Relationships::new();
        doc_rels.add(rel_type::STYLES, "styles.xml");
        doc_rels.add(rel_type::NUMBERING, "numbering.xml");

        let header_id = match branding.logo() {
            Some(logo) => {
                let mut header_rels = Relationships::new();
                let image = header_rels.add_external(rel_type::IMAGE, logo);
                package.add("word/header1.xml", CT_HEADER, header_xml(&image).map_err(failed("header"))?);
                package
                    .add_rels("word/_rels/header1.xml.rels", &header_rels)
                    .map_err(failed("header"))?;
                Some(doc_rels.add(rel_type::HEADER, "header1.xml"))
            }
            None => None,
        };
        let footer_id = match branding.footer() {
            Some(text) => {
                package.add("word/footer1.xml", CT_FOOTER, footer_xml(&text).map_err(failed("footer"))?);
                Some(doc_rels.add(rel_type::FOOTER, "footer1.xml"))
            }
            None => None,
        };

        let document = document_xml(output, branding, ctx, header_id.as_deref(), footer_id.as_deref())?;
        package.add("word/document.xml", CT_DOCUMENT, document);
        package.add("word/styles.xml", CT_STYLES, styles_xml(branding).map_err(failed("styles"))?);
        package.add("word/numbering.xml", CT_NUMBERING, numbering_xml().map_err(failed("styles"))?);
        if !doc_rels.is_empty() {
            package
                .add_rels("word/_rels/document.xml.rels", &doc_rels)
                .map_err(failed("package"))?;
        }

        package
            .finish()
            .map_err(|message| ExportError::Package { format: FORMAT, message })
    }
}
