//! Office Open XML packaging shared by the three builders.
//!
//! Parts are buffered and written in insertion order after
//! `[Content_Types].xml`, with a fixed timestamp on every zip entry, so the
//! same inputs always produce the same bytes.

use std::collections::BTreeMap;
use std::io::{Cursor, Write};

use chrono::NaiveDate;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const NS_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const NS_PICTURE: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

const NS_PACKAGE_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

pub mod rel_type {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const CORE_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
    pub const EXTENDED_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
    pub const CUSTOM_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/custom-properties";
    pub const SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    pub const SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    pub const SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
    pub const THEME: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
    pub const STYLES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const HEADER: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";
    pub const FOOTER: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
    pub const WORKSHEET: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
    pub const IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const NUMBERING: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
}

pub mod content_type {
    pub const RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    pub const XML: &str = "application/xml";
    pub const CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";
    pub const EXTENDED_PROPERTIES: &str =
        "application/vnd.openxmlformats-officedocument.extended-properties+xml";
    pub const CUSTOM_PROPERTIES: &str =
        "application/vnd.openxmlformats-officedocument.custom-properties+xml";
    pub const THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct XmlError(String);

impl XmlError {
    fn from_display(e: impl std::fmt::Display) -> Self {
        Self(e.to_string())
    }
}

/// Thin event writer over an in-memory buffer.
pub struct XmlWriter {
    inner: Writer<Vec<u8>>,
}

impl XmlWriter {
    /// Starts with `<?xml version="1.0" encoding="UTF-8" standalone="yes"?>`.
    pub fn new() -> Result<Self, XmlError> {
        let mut inner = Writer::new(Vec::new());
        inner
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(XmlError::from_display)?;
        Ok(Self { inner })
    }

    pub fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), XmlError> {
        let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.event(Event::Start(element))
    }

    pub fn end(&mut self, name: &str) -> Result<(), XmlError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), XmlError> {
        let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.event(Event::Empty(element))
    }

    /// Escaped character data. Characters XML 1.0 cannot carry are dropped.
    pub fn text(&mut self, text: &str) -> Result<(), XmlError> {
        let clean: String = text
            .chars()
            .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
            .collect();
        self.event(Event::Text(BytesText::new(&clean)))
    }

    /// `<name attrs>text</name>`
    pub fn leaf(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<(), XmlError> {
        self.start(name, attrs)?;
        self.text(text)?;
        self.end(name)
    }

    pub fn finish(self) -> Vec<u8> {
        self.inner.into_inner()
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), XmlError> {
        self.inner.write_event(event).map_err(XmlError::from_display)
    }
}

#[derive(Debug, Clone)]
struct Relationship {
    id: String,
    kind: &'static str,
    target: String,
    external: bool,
}

/// One `.rels` part.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the new `rIdN`.
    pub fn add(&mut self, kind: &'static str, target: impl Into<String>) -> String {
        self.push(kind, target.into(), false)
    }

    pub fn add_external(&mut self, kind: &'static str, target: impl Into<String>) -> String {
        self.push(kind, target.into(), true)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, kind: &'static str, target: String, external: bool) -> String {
        let id = format!("rId{}", self.entries.len() + 1);
        self.entries.push(Relationship { id: id.clone(), kind, target, external });
        id
    }

    pub fn to_xml(&self) -> Result<Vec<u8>, XmlError> {
        let mut w = XmlWriter::new()?;
        w.start("Relationships", &[("xmlns", NS_PACKAGE_RELS)])?;
        for rel in &self.entries {
            let mut attrs = vec![
                ("Id", rel.id.as_str()),
                ("Type", rel.kind),
                ("Target", rel.target.as_str()),
            ];
            if rel.external {
                attrs.push(("TargetMode", "External"));
            }
            w.empty("Relationship", &attrs)?;
        }
        w.end("Relationships")?;
        Ok(w.finish())
    }
}

/// Document properties written to `docProps/`.
#[derive(Debug, Clone)]
pub struct DocProps<'a> {
    pub title: String,
    pub subject: String,
    pub creator: String,
    pub created: Option<NaiveDate>,
    pub custom: &'a BTreeMap<String, String>,
}

struct Part {
    path: String,
    data: Vec<u8>,
}

/// Buffered OPC package.
pub struct Package {
    parts: Vec<Part>,
    overrides: Vec<(String, String)>,
}

impl Package {
    pub fn new() -> Self {
        Self { parts: vec![], overrides: vec![] }
    }

    /// `path` is relative to the package root, without a leading `/`.
    pub fn add(&mut self, path: impl Into<String>, content_type: &str, data: Vec<u8>) {
        let path = path.into();
        self.overrides.push((format!("/{path}"), content_type.to_string()));
        self.parts.push(Part { path, data });
    }

    /// `.rels` parts are covered by the `rels` default content type.
    pub fn add_rels(&mut self, path: impl Into<String>, rels: &Relationships) -> Result<(), XmlError> {
        let data = rels.to_xml()?;
        self.parts.push(Part { path: path.into(), data });
        Ok(())
    }

    /// Root relationships plus core, app and (when non-empty) custom properties.
    pub fn add_root(&mut self, main_part: &str, props: &DocProps<'_>) -> Result<(), XmlError> {
        let mut rels = Relationships::new();
        rels.add(rel_type::OFFICE_DOCUMENT, main_part);
        rels.add(rel_type::CORE_PROPERTIES, "docProps/core.xml");
        rels.add(rel_type::EXTENDED_PROPERTIES, "docProps/app.xml");
        if !props.custom.is_empty() {
            rels.add(rel_type::CUSTOM_PROPERTIES, "docProps/custom.xml");
        }
        self.add_rels("_rels/.rels", &rels)?;

        self.add("docProps/core.xml", content_type::CORE_PROPERTIES, core_xml(props)?);
        self.add("docProps/app.xml", content_type::EXTENDED_PROPERTIES, app_xml()?);
        if !props.custom.is_empty() {
            self.add("docProps/custom.xml", content_type::CUSTOM_PROPERTIES, custom_xml(props.custom)?);
        }
        Ok(())
    }

    pub fn finish(self) -> Result<Vec<u8>, String> {
        let content_types = content_types_xml(&self.overrides).map_err(|e| e.to_string())?;

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());

        let parts = std::iter::once(("[Content_Types].xml", content_types.as_slice()))
            .chain(self.parts.iter().map(|p| (p.path.as_str(), p.data.as_slice())));
        for (path, data) in parts {
            zip.start_file(path, options).map_err(|e| format!("{path}: {e}"))?;
            zip.write_all(data).map_err(|e| format!("{path}: {e}"))?;
        }

        let cursor = zip.finish().map_err(|e| e.to_string())?;
        Ok(cursor.into_inner())
    }
}

impl Default for Package {
    fn default() -> Self {
        Self::new()
    }
}

fn content_types_xml(overrides: &[(String, String)]) -> Result<Vec<u8>, XmlError> {
    let mut w = XmlWriter::new()?;
    w.start("Types", &[("xmlns", NS_CONTENT_TYPES)])?;
    w.empty("Default", &[("Extension", "rels"), ("ContentType", content_type::RELATIONSHIPS)])?;
    w.empty("Default", &[("Extension", "xml"), ("ContentType", content_type::XML)])?;
    for (part, kind) in overrides {
        w.empty("Override", &[("PartName", part.as_str()), ("ContentType", kind.as_str())])?;
    }
    w.end("Types")?;
    Ok(w.finish())
}

fn core_xml(props: &DocProps<'_>) -> Result<Vec<u8>, XmlError> {
    let mut w = XmlWriter::new()?;
    w.start(
        "cp:coreProperties",
        &[
            ("xmlns:cp", "http://schemas.openxmlformats.org/package/2006/metadata/core-properties"),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    )?;
    w.leaf("dc:title", &[], &props.title)?;
    w.leaf("dc:subject", &[], &props.subject)?;
    w.leaf("dc:creator", &[], &props.creator)?;
    if let Some(date) = props.created {
        let stamp = format!("{}T00:00:00Z", date.format("%Y-%m-%d"));
        w.leaf("dcterms:created", &[("xsi:type", "dcterms:W3CDTF")], &stamp)?;
        w.leaf("dcterms:modified", &[("xsi:type", "dcterms:W3CDTF")], &stamp)?;
    }
    w.end("cp:coreProperties")?;
    Ok(w.finish())
}

fn app_xml() -> Result<Vec<u8>, XmlError> {
    let mut w = XmlWriter::new()?;
    w.start(
        "Properties",
        &[
            ("xmlns", "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"),
            ("xmlns:vt", "http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes"),
        ],
    )?;
    w.leaf("Application", &[], "StratForge")?;
    w.leaf("AppVersion", &[], &app_version())?;
    w.end("Properties")?;
    Ok(w.finish())
}

/// `XX.YYYY` as Office expects, from the crate version.
fn app_version() -> String {
    let version = semver::Version::parse(crate::ENGINE_VERSION)
        .unwrap_or_else(|_| semver::Version::new(1, 0, 0));
    format!("{:02}.{:04}", version.major, version.minor)
}

fn custom_xml(custom: &BTreeMap<String, String>) -> Result<Vec<u8>, XmlError> {
    let mut w = XmlWriter::new()?;
    w.start(
        "Properties",
        &[
            ("xmlns", "http://schemas.openxmlformats.org/officeDocument/2006/custom-properties"),
            ("xmlns:vt", "http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes"),
        ],
    )?;
    // pids start at 2; 0 and 1 are reserved.
    for (pid, (name, value)) in (2..).zip(custom) {
        let pid = pid.to_string();
        w.start(
            "property",
            &[
                ("fmtid", "{D5CDD505-2E9C-101B-9397-08002B2CF9AE}"),
                ("pid", pid.as_str()),
                ("name", name.as_str()),
            ],
        )?;
        w.leaf("vt:lpwstr", &[], value)?;
        w.end("property")?;
    }
    w.end("Properties")?;
    Ok(w.finish())
}

/// DrawingML theme carrying the brand colors and fonts.
pub fn theme_xml(name: &str, colors: &ThemeColors<'_>, heading_font: &str, body_font: &str) -> Result<Vec<u8>, XmlError> {
    let mut w = XmlWriter::new()?;
    w.start("a:theme", &[("xmlns:a", NS_DRAWING), ("name", name)])?;
    w.start("a:themeElements", &[])?;

    w.start("a:clrScheme", &[("name", name)])?;
    let scheme = [
        ("a:dk1", "000000"),
        ("a:lt1", "FFFFFF"),
        ("a:dk2", colors.secondary),
        ("a:lt2", "F3F4F6"),
        ("a:accent1", colors.primary),
        ("a:accent2", colors.secondary),
        ("a:accent3", colors.accent),
        ("a:accent4", "64748B"),
        ("a:accent5", "10B981"),
        ("a:accent6", "EF4444"),
        ("a:hlink", colors.primary),
        ("a:folHlink", colors.secondary),
    ];
    for (slot, value) in scheme {
        w.start(slot, &[])?;
        w.empty("a:srgbClr", &[("val", value)])?;
        w.end(slot)?;
    }
    w.end("a:clrScheme")?;

    w.start("a:fontScheme", &[("name", name)])?;
    for (slot, face) in [("a:majorFont", heading_font), ("a:minorFont", body_font)] {
        w.start(slot, &[])?;
        w.empty("a:latin", &[("typeface", face)])?;
        w.empty("a:ea", &[("typeface", "")])?;
        w.empty("a:cs", &[("typeface", "")])?;
        w.end(slot)?;
    }
    w.end("a:fontScheme")?;

    w.start("a:fmtScheme", &[("name", name)])?;
    w.start("a:fillStyleLst", &[])?;
    for _ in 0..3 {
        solid_fill(&mut w, "phClr")?;
    }
    w.end("a:fillStyleLst")?;
    w.start("a:lnStyleLst", &[])?;
    for width in ["6350", "12700", "19050"] {
        w.start("a:ln", &[("w", width)])?;
        solid_fill(&mut w, "phClr")?;
        w.end("a:ln")?;
    }
    w.end("a:lnStyleLst")?;
    w.start("a:effectStyleLst", &[])?;
    for _ in 0..3 {
        w.start("a:effectStyle", &[])?;
        w.empty("a:effectLst", &[])?;
        w.end("a:effectStyle")?;
    }
    w.end("a:effectStyleLst")?;
    w.start("a:bgFillStyleLst", &[])?;
    for _ in 0..3 {
        solid_fill(&mut w, "phClr")?;
    }
    w.end("a:bgFillStyleLst")?;
    w.end("a:fmtScheme")?;

    w.end("a:themeElements")?;
    w.end("a:theme")?;
    Ok(w.finish())
}

pub struct ThemeColors<'a> {
    pub primary: &'a str,
    pub secondary: &'a str,
    pub accent: &'a str,
}

fn solid_fill(w: &mut XmlWriter, scheme_color: &str) -> Result<(), XmlError> {
    w.start("a:solidFill", &[])?;
    w.empty("a:schemeClr", &[("val", scheme_color)])?;
    w.end("a:solidFill")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_text_is_escaped_and_control_chars_dropped() {
        let mut w = XmlWriter::new().unwrap();
        w.leaf("t", &[("k", "a\"b")], "Tom & Jerry <3\u{1}").unwrap();
        let xml = String::from_utf8(w.finish()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
        assert!(xml.contains("<t k=\"a&quot;b\">Tom &amp; Jerry &lt;3</t>"));
    }

    #[test]
    fn test_relationship_ids_and_external_mode() {
        let mut rels = Relationships::new();
        assert_eq!(rels.add(rel_type::SLIDE, "slides/slide1.xml"), "rId1");
        assert_eq!(rels.add_external(rel_type::IMAGE, "https://cdn.example.com/logo.png"), "rId2");
        let xml = String::from_utf8(rels.to_xml().unwrap()).unwrap();
        assert!(xml.contains("TargetMode=\"External\""));
    }

    #[test]
    fn test_package_is_deterministic_and_lists_parts() {
        let build = || {
            let custom = BTreeMap::from([("region".to_string(), "EMEA".to_string())]);
            let props = DocProps {
                title: "T".to_string(),
                subject: "S".to_string(),
                creator: "C".to_string(),
                created: None,
                custom: &custom,
            };
            let mut package = Package::new();
            package.add_root("word/document.xml", &props).unwrap();
            package.add("word/document.xml", "application/xml", b"<doc/>".to_vec());
            package.finish().unwrap()
        };
        let bytes = build();
        assert_eq!(bytes, build());

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.by_index(0).unwrap().name(), "[Content_Types].xml");
        let mut custom = String::new();
        archive.by_name("docProps/custom.xml").unwrap().read_to_string(&mut custom).unwrap();
        assert!(custom.contains("name=\"region\""));
        let mut types = String::new();
        archive.by_name("[Content_Types].xml").unwrap().read_to_string(&mut types).unwrap();
        assert!(types.contains("PartName=\"/word/document.xml\""));
    }
}
