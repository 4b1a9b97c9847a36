//! Slide deck builder (PresentationML).
//!
//! Title, executive summary, one slide per persona, channels, budget,
//! content strategy, one slide per timeline phase, KPIs, recommendations.
//! Every slide carries the brand accent bar and, when set, the footer.

use super::ooxml::{
    content_type, rel_type, theme_xml, DocProps, Package, Relationships, ThemeColors, XmlError,
    XmlWriter, NS_DRAWING, NS_RELATIONSHIPS,
};
use super::{ExportError, ExportFormat, FormatBuilder, RenderContext};
use crate::branding::ResolvedBranding;
use crate::model::{Persona, StrategyOutput, TimelinePhase};
use crate::money::format_currency;

const FORMAT: ExportFormat = ExportFormat::Pptx;

const NS_PRESENTATION: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const CT_LAYOUT: &str = "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_MASTER: &str = "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";

// 16:9 in EMU.
const SLIDE_W: i64 = 12_192_000;
const SLIDE_H: i64 = 6_858_000;
const MARGIN: i64 = 457_200;
const GUTTER: i64 = 228_600;
const ROW_H: i64 = 370_840;

#[derive(Debug, Clone, Copy)]
struct Rect {
    x: i64,
    y: i64,
    cx: i64,
    cy: i64,
}

const TITLE: Rect = Rect { x: MARGIN, y: 381_000, cx: SLIDE_W - 2 * MARGIN, cy: 838_200 };
const BODY: Rect = Rect { x: MARGIN, y: 1_371_600, cx: SLIDE_W - 2 * MARGIN, cy: 4_754_880 };
const FOOTER: Rect = Rect { x: MARGIN, y: 6_355_080, cx: SLIDE_W - 2 * MARGIN, cy: 320_040 };

impl Rect {
    fn halves(self) -> (Rect, Rect) {
        let cx = (self.cx - GUTTER) / 2;
        (
            Rect { cx, ..self },
            Rect { x: self.x + cx + GUTTER, cx, ..self },
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Title,
    Subtitle,
    Heading,
    Body,
    Bullet,
    Footer,
}

struct Para<'t> {
    text: &'t str,
    style: Style,
}

fn para(text: &str, style: Style) -> Para<'_> {
    Para { text, style }
}

/// Writes one slide's shape tree and collects its relationships.
struct SlideComposer<'b> {
    w: XmlWriter,
    branding: &'b ResolvedBranding,
    rels: Relationships,
    next_id: u32,
}

impl<'b> SlideComposer<'b> {
    fn new(branding: &'b ResolvedBranding) -> Result<Self, XmlError> {
        let mut w = XmlWriter::new()?;
        w.start(
            "p:sld",
            &[("xmlns:a", NS_DRAWING), ("xmlns:r", NS_RELATIONSHIPS), ("xmlns:p", NS_PRESENTATION)],
        )?;
        w.start("p:cSld", &[])?;
        open_shape_tree(&mut w)?;

        let mut rels = Relationships::new();
        rels.add(rel_type::SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");

        let mut slide = Self { w, branding, rels, next_id: 2 };
        slide.accent_bar()?;
        Ok(slide)
    }

    fn id(&mut self) -> String {
        let id = self.next_id;
        self.next_id += 1;
        id.to_string()
    }

    fn xfrm(&mut self, tag: &str, rect: Rect) -> Result<(), XmlError> {
        let (x, y, cx, cy) = (rect.x.to_string(), rect.y.to_string(), rect.cx.to_string(), rect.cy.to_string());
        self.w.start(tag, &[])?;
        self.w.empty("a:off", &[("x", x.as_str()), ("y", y.as_str())])?;
        self.w.empty("a:ext", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
        self.w.end(tag)
    }

    fn rect_geometry(&mut self) -> Result<(), XmlError> {
        self.w.start("a:prstGeom", &[("prst", "rect")])?;
        self.w.empty("a:avLst", &[])?;
        self.w.end("a:prstGeom")
    }

    fn fill(&mut self, color: &str) -> Result<(), XmlError> {
        self.w.start("a:solidFill", &[])?;
        self.w.empty("a:srgbClr", &[("val", color)])?;
        self.w.end("a:solidFill")
    }

    fn accent_bar(&mut self) -> Result<(), XmlError> {
        let id = self.id();
        let primary = self.branding.primary_color.clone();
        self.w.start("p:sp", &[])?;
        self.w.start("p:nvSpPr", &[])?;
        self.w.empty("p:cNvPr", &[("id", id.as_str()), ("name", "Accent Bar")])?;
        self.w.empty("p:cNvSpPr", &[])?;
        self.w.empty("p:nvPr", &[])?;
        self.w.end("p:nvSpPr")?;
        self.w.start("p:spPr", &[])?;
        self.xfrm("a:xfrm", Rect { x: 0, y: 0, cx: SLIDE_W, cy: 152_400 })?;
        self.rect_geometry()?;
        self.fill(&primary)?;
        self.w.end("p:spPr")?;
        self.w.end("p:sp")
    }

    fn text_box(&mut self, name: &str, rect: Rect, paras: &[Para<'_>]) -> Result<(), XmlError> {
        let id = self.id();
        self.w.start("p:sp", &[])?;
        self.w.start("p:nvSpPr", &[])?;
        self.w.empty("p:cNvPr", &[("id", id.as_str()), ("name", name)])?;
        self.w.empty("p:cNvSpPr", &[("txBox", "1")])?;
        self.w.empty("p:nvPr", &[])?;
        self.w.end("p:nvSpPr")?;
        self.w.start("p:spPr", &[])?;
        self.xfrm("a:xfrm", rect)?;
        self.rect_geometry()?;
        self.w.empty("a:noFill", &[])?;
        self.w.end("p:spPr")?;

        self.w.start("p:txBody", &[])?;
        self.w.start("a:bodyPr", &[("wrap", "square"), ("rtlCol", "0")])?;
        self.w.empty("a:normAutofit", &[])?;
        self.w.end("a:bodyPr")?;
        self.w.empty("a:lstStyle", &[])?;
        for p in paras {
            self.paragraph(p)?;
        }
        self.w.end("p:txBody")?;
        self.w.end("p:sp")
    }

    fn paragraph(&mut self, p: &Para<'_>) -> Result<(), XmlError> {
        let b = self.branding;
        let (size, bold, color, font) = match p.style {
            Style::Title => ("4000", true, b.primary_color.as_str(), b.heading_font.as_str()),
            Style::Subtitle => ("2000", false, b.secondary_color.as_str(), b.body_font.as_str()),
            Style::Heading => ("2800", true, b.primary_color.as_str(), b.heading_font.as_str()),
            Style::Body => ("1600", false, b.secondary_color.as_str(), b.body_font.as_str()),
            Style::Bullet => ("1400", false, b.secondary_color.as_str(), b.body_font.as_str()),
            Style::Footer => ("1000", false, b.secondary_color.as_str(), b.body_font.as_str()),
        };
        let align = match p.style {
            Style::Title | Style::Subtitle | Style::Footer => "ctr",
            _ => "l",
        };

        self.w.start("a:p", &[])?;
        if p.style == Style::Bullet {
            self.w.start("a:pPr", &[("marL", "285750"), ("indent", "-285750"), ("algn", align)])?;
            self.w.empty("a:buChar", &[("char", "\u{2022}")])?;
        } else {
            self.w.start("a:pPr", &[("algn", align)])?;
            self.w.empty("a:buNone", &[])?;
        }
        self.w.end("a:pPr")?;

        self.w.start("a:r", &[])?;
        self.w.start("a:rPr", &[("lang", "en-US"), ("sz", size), ("b", if bold { "1" } else { "0" })])?;
        self.w.start("a:solidFill", &[])?;
        self.w.empty("a:srgbClr", &[("val", color)])?;
        self.w.end("a:solidFill")?;
        self.w.empty("a:latin", &[("typeface", font)])?;
        self.w.end("a:rPr")?;
        self.w.leaf("a:t", &[], p.text)?;
        self.w.end("a:r")?;
        self.w.end("a:p")
    }

    fn title(&mut self, text: &str) -> Result<(), XmlError> {
        self.text_box("Title", TITLE, &[para(text, Style::Heading)])
    }

    /// Optional heading line followed by one bullet per item.
    fn bullets(&mut self, rect: Rect, heading: Option<&str>, items: &[String]) -> Result<(), XmlError> {
        let mut paras: Vec<Para<'_>> = heading.map(|h| para(h, Style::Body)).into_iter().collect();
        paras.extend(items.iter().map(|i| para(i, Style::Bullet)));
        self.text_box("Content", rect, &paras)
    }

    fn table(&mut self, rect: Rect, header: &[&str], rows: &[Vec<String>]) -> Result<(), XmlError> {
        let id = self.id();
        let primary = self.branding.primary_color.clone();
        let secondary = self.branding.secondary_color.clone();
        let font = self.branding.body_font.clone();
        let cols = header.len().max(1) as i64;
        let col_w = rect.cx / cols;
        let height = ROW_H * (rows.len() as i64 + 1);

        self.w.start("p:graphicFrame", &[])?;
        self.w.start("p:nvGraphicFramePr", &[])?;
        self.w.empty("p:cNvPr", &[("id", id.as_str()), ("name", "Table")])?;
        self.w.start("p:cNvGraphicFramePr", &[])?;
        self.w.empty("a:graphicFrameLocks", &[("noGrp", "1")])?;
        self.w.end("p:cNvGraphicFramePr")?;
        self.w.empty("p:nvPr", &[])?;
        self.w.end("p:nvGraphicFramePr")?;
        self.xfrm("p:xfrm", Rect { cy: height, ..rect })?;
        self.w.start("a:graphic", &[])?;
        self.w.start("a:graphicData", &[("uri", "http://schemas.openxmlformats.org/drawingml/2006/table")])?;
        self.w.start("a:tbl", &[])?;
        self.w.empty("a:tblPr", &[("firstRow", "1"), ("bandRow", "1")])?;
        self.w.start("a:tblGrid", &[])?;
        for i in 0..cols {
            // Last column absorbs the rounding remainder.
            let w = if i == cols - 1 { rect.cx - col_w * (cols - 1) } else { col_w };
            self.w.empty("a:gridCol", &[("w", w.to_string().as_str())])?;
        }
        self.w.end("a:tblGrid")?;

        let row_h = ROW_H.to_string();
        self.w.start("a:tr", &[("h", row_h.as_str())])?;
        for cell in header {
            self.cell(cell, true, "FFFFFF", &primary, &font)?;
        }
        self.w.end("a:tr")?;
        for (i, row) in rows.iter().enumerate() {
            let band = if i % 2 == 0 { "FFFFFF" } else { "F3F4F6" };
            self.w.start("a:tr", &[("h", row_h.as_str())])?;
            for cell in row {
                self.cell(cell, false, &secondary, band, &font)?;
            }
            self.w.end("a:tr")?;
        }

        self.w.end("a:tbl")?;
        self.w.end("a:graphicData")?;
        self.w.end("a:graphic")?;
        self.w.end("p:graphicFrame")
    }

    fn cell(&mut self, text: &str, bold: bool, color: &str, fill: &str, font: &str) -> Result<(), XmlError> {
        self.w.start("a:tc", &[])?;
        self.w.start("a:txBody", &[])?;
        self.w.empty("a:bodyPr", &[])?;
        self.w.empty("a:lstStyle", &[])?;
        self.w.start("a:p", &[])?;
        self.w.start("a:r", &[])?;
        self.w.start("a:rPr", &[("lang", "en-US"), ("sz", "1200"), ("b", if bold { "1" } else { "0" })])?;
        self.fill(color)?;
        self.w.empty("a:latin", &[("typeface", font)])?;
        self.w.end("a:rPr")?;
        self.w.leaf("a:t", &[], text)?;
        self.w.end("a:r")?;
        self.w.end("a:p")?;
        self.w.end("a:txBody")?;
        self.w.start("a:tcPr", &[])?;
        self.fill(fill)?;
        self.w.end("a:tcPr")?;
        self.w.end("a:tc")
    }

    /// Logo linked by URL, not embedded.
    fn picture(&mut self, rect: Rect, url: &str) -> Result<(), XmlError> {
        let id = self.id();
        let rel = self.rels.add_external(rel_type::IMAGE, url);
        self.w.start("p:pic", &[])?;
        self.w.start("p:nvPicPr", &[])?;
        self.w.empty("p:cNvPr", &[("id", id.as_str()), ("name", "Logo")])?;
        self.w.start("p:cNvPicPr", &[])?;
        self.w.empty("a:picLocks", &[("noChangeAspect", "1")])?;
        self.w.end("p:cNvPicPr")?;
        self.w.empty("p:nvPr", &[])?;
        self.w.end("p:nvPicPr")?;
        self.w.start("p:blipFill", &[])?;
        self.w.empty("a:blip", &[("r:link", rel.as_str())])?;
        self.w.start("a:stretch", &[])?;
        self.w.empty("a:fillRect", &[])?;
        self.w.end("a:stretch")?;
        self.w.end("p:blipFill")?;
        self.w.start("p:spPr", &[])?;
        self.xfrm("a:xfrm", rect)?;
        self.rect_geometry()?;
        self.w.end("p:spPr")?;
        self.w.end("p:pic")
    }

    fn finish(mut self) -> Result<(Vec<u8>, Relationships), XmlError> {
        if let Some(footer) = self.branding.footer() {
            self.text_box("Footer", FOOTER, &[para(&footer, Style::Footer)])?;
        }
        self.w.end("p:spTree")?;
        self.w.end("p:cSld")?;
        self.w.start("p:clrMapOvr", &[])?;
        self.w.empty("a:masterClrMapping", &[])?;
        self.w.end("p:clrMapOvr")?;
        self.w.end("p:sld")?;
        Ok((self.w.finish(), self.rels))
    }
}

fn open_shape_tree(w: &mut XmlWriter) -> Result<(), XmlError> {
    w.start("p:spTree", &[])?;
    w.start("p:nvGrpSpPr", &[])?;
    w.empty("p:cNvPr", &[("id", "1"), ("name", "")])?;
    w.empty("p:cNvGrpSpPr", &[])?;
    w.empty("p:nvPr", &[])?;
    w.end("p:nvGrpSpPr")?;
    w.empty("p:grpSpPr", &[])
}

type Slide = (Vec<u8>, Relationships);

fn title_slide(output_title: &str, branding: &ResolvedBranding, ctx: &RenderContext<'_>) -> Result<Slide, XmlError> {
    let mut s = SlideComposer::new(branding)?;
    if let Some(logo) = branding.logo() {
        s.picture(Rect { x: (SLIDE_W - 1_828_800) / 2, y: 685_800, cx: 1_828_800, cy: 914_400 }, logo)?;
    }
    let mut lines = vec![para(ctx.business_name, Style::Title), para(output_title, Style::Subtitle)];
    let prepared_for = branding.prepared_for();
    if let Some(line) = &prepared_for {
        lines.push(para(line, Style::Subtitle));
    }
    let date = ctx.date_label();
    if let Some(date) = &date {
        lines.push(para(date, Style::Subtitle));
    }
    s.text_box("Title", Rect { x: MARGIN, y: 2_057_400, cx: SLIDE_W - 2 * MARGIN, cy: 2_743_200 }, &lines)?;
    s.finish()
}

fn text_slide(branding: &ResolvedBranding, title: &str, body: &str) -> Result<Slide, XmlError> {
    let mut s = SlideComposer::new(branding)?;
    s.title(title)?;
    let paras: Vec<Para<'_>> = body
        .split("\n\n")
        .filter(|p| !p.trim().is_empty())
        .map(|p| para(p, Style::Body))
        .collect();
    s.text_box("Content", BODY, &paras)?;
    s.finish()
}

fn persona_slide(branding: &ResolvedBranding, persona: &Persona) -> Result<Slide, XmlError> {
    let mut s = SlideComposer::new(branding)?;
    s.title(&format!("Target Audience: {}", persona.name))?;
    let (left, right) = BODY.halves();

    let mut profile = vec![];
    for (label, value) in [
        ("Demographics", &persona.demographics),
        ("Psychographics", &persona.psychographics),
        ("Description", &persona.description),
    ] {
        if !value.is_empty() {
            profile.push(format!("{label}: {value}"));
        }
    }
    s.bullets(left, Some("Profile"), &profile)?;

    let mut needs: Vec<String> = persona.pain_points.clone();
    if !persona.preferred_channels.is_empty() {
        needs.push(format!("Preferred channels: {}", persona.preferred_channels.join(", ")));
    }
    s.bullets(right, Some("Pain Points"), &needs)?;
    s.finish()
}

fn phase_slide(branding: &ResolvedBranding, phase: &TimelinePhase) -> Result<Slide, XmlError> {
    let mut s = SlideComposer::new(branding)?;
    let title = if phase.duration.is_empty() {
        format!("Timeline: {}", phase.phase)
    } else {
        format!("Timeline: {} ({})", phase.phase, phase.duration)
    };
    s.title(&title)?;
    let (left, right) = BODY.halves();
    s.bullets(left, Some("Activities"), &phase.activities)?;
    s.bullets(right, Some("Deliverables"), &phase.deliverables)?;
    s.finish()
}

fn slides(output: &StrategyOutput, branding: &ResolvedBranding, ctx: &RenderContext<'_>) -> Result<Vec<Slide>, ExportError> {
    let failed = |section: &'static str| move |e: XmlError| ExportError::rendering(FORMAT, section, e);
    let mut deck = vec![];

    deck.push(title_slide("Marketing Strategy", branding, ctx).map_err(failed("title"))?);
    deck.push(
        text_slide(branding, "Executive Summary", &output.executive_summary)
            .map_err(failed("executive summary"))?,
    );

    for persona in &output.target_audience {
        deck.push(persona_slide(branding, persona).map_err(failed("target audience"))?);
    }

    if !output.marketing_channels.is_empty() {
        let rows: Vec<Vec<String>> = output
            .marketing_channels
            .iter()
            .map(|c| {
                vec![
                    c.name.clone(),
                    format_currency(c.budget_allocation),
                    format!("{}%", c.percentage),
                    c.expected_roi.clone(),
                ]
            })
            .collect();
        let mut s = SlideComposer::new(branding).map_err(failed("marketing channels"))?;
        s.title("Marketing Channels")
            .and_then(|_| s.table(BODY, &["Channel", "Budget", "Share", "Expected ROI"], &rows))
            .map_err(failed("marketing channels"))?;
        deck.push(s.finish().map_err(failed("marketing channels"))?);
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
            format!("{}%", crate::budget::percentage_of(budget.contingency, budget.total)),
        ]);
        rows.push(vec!["Total".to_string(), format_currency(budget.total), "100%".to_string()]);
        let mut s = SlideComposer::new(branding).map_err(failed("budget"))?;
        s.title("Budget Allocation")
            .and_then(|_| s.table(BODY, &["Channel", "Amount", "Share"], &rows))
            .map_err(failed("budget"))?;
        deck.push(s.finish().map_err(failed("budget"))?);
    }

    let content = &output.content_strategy;
    if !content.is_empty() {
        let render = || -> Result<Slide, XmlError> {
            let mut s = SlideComposer::new(branding)?;
            s.title("Content Strategy")?;
            let (left, right) = BODY.halves();
            s.bullets(left, Some("Themes"), &content.themes)?;
            let mut right_items: Vec<String> = content
                .content_types
                .iter()
                .map(|t| if t.description.is_empty() { t.kind.clone() } else { format!("{}: {}", t.kind, t.description) })
                .collect();
            if !content.frequency.is_empty() {
                right_items.push(format!("Publishing frequency: {}", content.frequency));
            }
            if !content.distribution.is_empty() {
                right_items.push(format!("Distribution: {}", content.distribution.join(", ")));
            }
            s.bullets(right, Some("Formats and Cadence"), &right_items)?;
            s.finish()
        };
        deck.push(render().map_err(failed("content strategy"))?);
    }

    for phase in &output.timeline {
        deck.push(phase_slide(branding, phase).map_err(failed("timeline"))?);
    }

    if !output.kpis.is_empty() {
        let rows: Vec<Vec<String>> = output
            .kpis
            .iter()
            .map(|k| vec![k.metric.clone(), k.target.clone(), k.frequency.clone(), k.measurement_method.clone()])
            .collect();
        let mut s = SlideComposer::new(branding).map_err(failed("kpis"))?;
        s.title("Key Performance Indicators")
            .and_then(|_| s.table(BODY, &["Metric", "Target", "Frequency", "Measurement"], &rows))
            .map_err(failed("kpis"))?;
        deck.push(s.finish().map_err(failed("kpis"))?);
    }

    if !output.recommendations.is_empty() {
        let mut s = SlideComposer::new(branding).map_err(failed("recommendations"))?;
        s.title("Recommendations")
            .and_then(|_| s.bullets(BODY, None, &output.recommendations))
            .map_err(failed("recommendations"))?;
        deck.push(s.finish().map_err(failed("recommendations"))?);
    }

    Ok(deck)
}

fn presentation_xml(slide_rel_ids: &[String]) -> Result<Vec<u8>, XmlError> {
    let mut w = XmlWriter::new()?;
    w.start(
        "p:presentation",
        &[
            ("xmlns:a", NS_DRAWING),
            ("xmlns:r", NS_RELATIONSHIPS),
            ("xmlns:p", NS_PRESENTATION),
            ("saveSubsetFonts", "1"),
        ],
    )?;
    w.start("p:sldMasterIdLst", &[])?;
    w.empty("p:sldMasterId", &[("id", "2147483648"), ("r:id", "rId1")])?;
    w.end("p:sldMasterIdLst")?;
    w.start("p:sldIdLst", &[])?;
    for (i, rel) in slide_rel_ids.iter().enumerate() {
        let id = (256 + i).to_string();
        w.empty("p:sldId", &[("id", id.as_str()), ("r:id", rel.as_str())])?;
    }
    w.end("p:sldIdLst")?;
    w.empty("p:sldSz", &[("cx", SLIDE_W.to_string().as_str()), ("cy", SLIDE_H.to_string().as_str())])?;
    w.empty("p:notesSz", &[("cx", "6858000"), ("cy", "9144000")])?;
    w.end("p:presentation")?;
    Ok(w.finish())
}

fn master_xml() -> Result<Vec<u8>, XmlError> {
    let mut w = XmlWriter::new()?;
    w.start(
        "p:sldMaster",
        &[("xmlns:a", NS_DRAWING), ("xmlns:r", NS_RELATIONSHIPS), ("xmlns:p", NS_PRESENTATION)],
    )?;
    w.start("p:cSld", &[])?;
    open_shape_tree(&mut w)?;
    w.end("p:spTree")?;
    w.end("p:cSld")?;
    w.empty(
        "p:clrMap",
        &[
            ("bg1", "lt1"),
            ("tx1", "dk1"),
            ("bg2", "lt2"),
            ("tx2", "dk2"),
            ("accent1", "accent1"),
            ("accent2", "accent2"),
            ("accent3", "accent3"),
            ("accent4", "accent4"),
            ("accent5", "accent5"),
            ("accent6", "accent6"),
            ("hlink", "hlink"),
            ("folHlink", "folHlink"),
        ],
    )?;
    w.start("p:sldLayoutIdLst", &[])?;
    w.empty("p:sldLayoutId", &[("id", "2147483649"), ("r:id", "rId1")])?;
    w.end("p:sldLayoutIdLst")?;
    w.end("p:sldMaster")?;
    Ok(w.finish())
}

fn layout_xml() -> Result<Vec<u8>, XmlError> {
    let mut w = XmlWriter::new()?;
    w.start(
        "p:sldLayout",
        &[
            ("xmlns:a", NS_DRAWING),
            ("xmlns:r", NS_RELATIONSHIPS),
            ("xmlns:p", NS_PRESENTATION),
            ("type", "blank"),
            ("preserve", "1"),
        ],
    )?;
    w.start("p:cSld", &[("name", "Blank")])?;
    open_shape_tree(&mut w)?;
    w.end("p:spTree")?;
    w.end("p:cSld")?;
    w.start("p:clrMapOvr", &[])?;
    w.empty("a:masterClrMapping", &[])?;
    w.end("p:clrMapOvr")?;
    w.end("p:sldLayout")?;
    Ok(w.finish())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SlideDeckBuilder;

impl FormatBuilder for SlideDeckBuilder {
    fn format(&self) -> ExportFormat {
        FORMAT
    }

    fn build(
        &self,
        output: &StrategyOutput,
        branding: &ResolvedBranding,
        ctx: &RenderContext<'_>,
    ) -> Result<Vec<u8>, ExportError> {
        let deck = slides(output, branding, ctx)?;
        let failed = |e: XmlError| ExportError::rendering(FORMAT, "package", e);

        let mut package = Package::new();
        let props = DocProps {
            title: ctx.title(),
            subject: "Marketing Strategy".to_string(),
            creator: branding.agency_name.clone().unwrap_or_else(|| "StratForge".to_string()),
            created: ctx.generated_on,
            custom: &branding.extra,
        };
        package.add_root("ppt/presentation.xml", &props).map_err(failed)?;

        let mut pres_rels = Relationships::new();
        pres_rels.add(rel_type::SLIDE_MASTER, "slideMasters/slideMaster1.xml");
        pres_rels.add(rel_type::THEME, "theme/theme1.xml");
        let slide_ids: Vec<String> = (1..=deck.len())
            .map(|n| pres_rels.add(rel_type::SLIDE, format!("slides/slide{n}.xml")))
            .collect();

        package.add("ppt/presentation.xml", CT_PRESENTATION, presentation_xml(&slide_ids).map_err(failed)?);
        package.add_rels("ppt/_rels/presentation.xml.rels", &pres_rels).map_err(failed)?;

        let colors = ThemeColors {
            primary: &branding.primary_color,
            secondary: &branding.secondary_color,
            accent: &branding.accent_color,
        };
        let theme = theme_xml("StratForge", &colors, &branding.heading_font, &branding.body_font).map_err(failed)?;
        package.add("ppt/theme/theme1.xml", content_type::THEME, theme);

        package.add("ppt/slideMasters/slideMaster1.xml", CT_MASTER, master_xml().map_err(failed)?);
        let mut master_rels = Relationships::new();
        master_rels.add(rel_type::SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");
        master_rels.add(rel_type::THEME, "../theme/theme1.xml");
        package
            .add_rels("ppt/slideMasters/_rels/slideMaster1.xml.rels", &master_rels)
            .map_err(failed)?;

        package.add("ppt/slideLayouts/slideLayout1.xml", CT_LAYOUT, layout_xml().map_err(failed)?);
        let mut layout_rels = Relationships::new();
        layout_rels.add(rel_type::SLIDE_MASTER, "../slideMasters/slideMaster1.xml");
        package
            .add_rels("ppt/slideLayouts/_rels/slideLayout1.xml.rels", &layout_rels)
            .map_err(failed)?;

        for (n, (xml, rels)) in (1..).zip(deck) {
            package.add(format!("ppt/slides/slide{n}.xml"), CT_SLIDE, xml);
            package
                .add_rels(format!("ppt/slides/_rels/slide{n}.xml.rels"), &rels)
                .map_err(failed)?;
        }

        package
            .finish()
            .map_err(|message| ExportError::Package { format: FORMAT, message })
    }
}
