//! Package plumbing: content types, relationships, properties, styles and settings.

use super::body::{self, jc_value, W_NS};
use super::xml::XmlWriter;
use super::{
    style_id, twips, STYLE_CAPTION, STYLE_DIAGRAM, STYLE_EQUATION, STYLE_REFERENCE,
    STYLE_TABLE_GRID, STYLE_TITLE,
};
use crate::model::{Document, Metadata, MAX_HEADING_LEVEL};
use crate::style::{EffectiveStyle, Role};

const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const PACKAGE_RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const OFFICE_RELS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CORE_NS: &str = "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";
const EXTENDED_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties";
const DC_NS: &str = "http://purl.org/dc/elements/1.1/";

const CT_RELS: &str = "application/vnd.openxmlformats-package.relationships+xml";
const CT_DOCUMENT: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const CT_STYLES: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
const CT_SETTINGS: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml";
const CT_CORE: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_EXTENDED: &str = "application/vnd.openxmlformats-officedocument.extended-properties+xml";

pub(crate) const DOCUMENT_PART: &str = "word/document.xml";

/// All parts of the package, in the order they are stored.
pub(crate) fn package_parts(doc: &Document) -> Vec<(&'static str, String)> {
    vec![
        ("[Content_Types].xml", content_types()),
        ("_rels/.rels", root_relationships()),
        ("docProps/core.xml", core_properties(doc.metadata())),
        ("docProps/app.xml", app_properties()),
        (DOCUMENT_PART, body::document_xml(doc)),
        ("word/styles.xml", styles(doc)),
        ("word/settings.xml", settings()),
        ("word/_rels/document.xml.rels", document_relationships()),
    ]
}

fn content_types() -> String {
    let mut w = XmlWriter::new();
    w.open("Types", &[("xmlns", CONTENT_TYPES_NS)]);
    w.empty("Default", &[("Extension", "rels"), ("ContentType", CT_RELS)]);
    w.empty(
        "Default",
        &[("Extension", "xml"), ("ContentType", "application/xml")],
    );
    for (part, content_type) in [
        ("/word/document.xml", CT_DOCUMENT),
        ("/word/styles.xml", CT_STYLES),
        ("/word/settings.xml", CT_SETTINGS),
        ("/docProps/core.xml", CT_CORE),
        ("/docProps/app.xml", CT_EXTENDED),
    ] {
        w.empty(
            "Override",
            &[("PartName", part), ("ContentType", content_type)],
        );
    }
    w.close("Types");
    w.finish()
}

fn relationships(targets: &[(&str, &str)]) -> String {
    let mut w = XmlWriter::new();
    w.open("Relationships", &[("xmlns", PACKAGE_RELS_NS)]);
    for (index, (kind, target)) in targets.iter().enumerate() {
        let id = format!("rId{}", index + 1);
        w.empty(
            "Relationship",
            &[("Id", id.as_str()), ("Type", *kind), ("Target", *target)],
        );
    }
    w.close("Relationships");
    w.finish()
}

fn root_relationships() -> String {
    let office_document = format!("{}/officeDocument", OFFICE_RELS);
    let extended = format!("{}/extended-properties", OFFICE_RELS);
    let core = format!("{}/metadata/core-properties", PACKAGE_RELS_NS);
    relationships(&[
        (office_document.as_str(), DOCUMENT_PART),
        (core.as_str(), "docProps/core.xml"),
        (extended.as_str(), "docProps/app.xml"),
    ])
}

fn document_relationships() -> String {
    let styles = format!("{}/styles", OFFICE_RELS);
    let settings = format!("{}/settings", OFFICE_RELS);
    relationships(&[
        (styles.as_str(), "styles.xml"),
        (settings.as_str(), "settings.xml"),
    ])
}

// No creation or modification dates: they would make repeated saves differ.
fn core_properties(metadata: &Metadata) -> String {
    let mut w = XmlWriter::new();
    w.open(
        "cp:coreProperties",
        &[("xmlns:cp", CORE_NS), ("xmlns:dc", DC_NS)],
    );
    if let Some(title) = &metadata.title {
        w.element("dc:title", title);
    }
    if let Some(author) = &metadata.author {
        w.element("dc:creator", author);
    }
    w.close("cp:coreProperties");
    w.finish()
}

fn app_properties() -> String {
    let mut w = XmlWriter::new();
    w.open("Properties", &[("xmlns", EXTENDED_NS)]);
    w.element("Application", env!("CARGO_PKG_NAME"));
    w.close("Properties");
    w.finish()
}

fn settings() -> String {
    let mut w = XmlWriter::new();
    w.open("w:settings", &[("xmlns:w", W_NS)]);
    w.empty("w:defaultTabStop", &[("w:val", "720")]);
    w.open("w:compat", &[]);
    w.empty(
        "w:compatSetting",
        &[
            ("w:name", "compatibilityMode"),
            ("w:uri", "http://schemas.microsoft.com/office/word"),
            ("w:val", "15"),
        ],
    );
    w.close("w:compat");
    w.close("w:settings");
    w.finish()
}

struct StyleDef {
    id: String,
    name: String,
    outline_level: Option<u8>,
    role: Role,
}

fn paragraph_styles() -> Vec<StyleDef> {
    let mut defs = vec![StyleDef {
        id: STYLE_TITLE.to_owned(),
        name: "Title".to_owned(),
        outline_level: None,
        role: Role::Title,
    }];
    for level in 1..=MAX_HEADING_LEVEL {
        let role = Role::Heading(level);
        defs.push(StyleDef {
            id: style_id(role).unwrap_or_default(),
            name: format!("heading {}", level),
            outline_level: Some(level - 1),
            role,
        });
    }
    for (id, name, role) in [
        (STYLE_CAPTION, "caption", Role::Caption),
        (STYLE_DIAGRAM, "Diagram", Role::Diagram),
        (STYLE_EQUATION, "Equation", Role::Equation),
        (STYLE_REFERENCE, "Reference", Role::Reference),
    ] {
        defs.push(StyleDef {
            id: id.to_owned(),
            name: name.to_owned(),
            outline_level: None,
            role,
        });
    }
    defs
}

/// Named styles mirroring the theme, so the file stays navigable in a word processor.
///
/// Runs carry their formatting directly; these definitions only need to agree with it.
fn styles(doc: &Document) -> String {
    let default = doc.default_style();
    let mut w = XmlWriter::new();
    w.open("w:styles", &[("xmlns:w", W_NS)]);

    w.open("w:docDefaults", &[]);
    w.open("w:rPrDefault", &[]);
    body::write_run_properties(&mut w, default);
    w.close("w:rPrDefault");
    w.open("w:pPrDefault", &[]);
    w.open("w:pPr", &[]);
    let body_spacing = doc.theme().spacing_for(Role::Body);
    w.empty(
        "w:spacing",
        &[
            ("w:before", twips(body_spacing.before).to_string().as_str()),
            ("w:after", twips(body_spacing.after).to_string().as_str()),
        ],
    );
    w.close("w:pPr");
    w.close("w:pPrDefault");
    w.close("w:docDefaults");

    w.open(
        "w:style",
        &[
            ("w:type", "paragraph"),
            ("w:default", "1"),
            ("w:styleId", "Normal"),
        ],
    );
    w.empty("w:name", &[("w:val", "Normal")]);
    w.empty("w:qFormat", &[]);
    w.close("w:style");

    for def in paragraph_styles() {
        let effective = doc.resolve_layers([doc.theme().style_for(def.role)]);
        write_paragraph_style(&mut w, &def, &effective, doc);
    }

    w.open(
        "w:style",
        &[("w:type", "table"), ("w:styleId", STYLE_TABLE_GRID)],
    );
    w.empty("w:name", &[("w:val", "Table Grid")]);
    w.open("w:tblPr", &[]);
    w.open("w:tblBorders", &[]);
    for edge in ["w:top", "w:left", "w:bottom", "w:right", "w:insideH", "w:insideV"] {
        w.empty(
            edge,
            &[
                ("w:val", "single"),
                ("w:sz", "4"),
                ("w:space", "0"),
                ("w:color", "auto"),
            ],
        );
    }
    w.close("w:tblBorders");
    w.close("w:tblPr");
    w.close("w:style");

    w.close("w:styles");
    w.finish()
}

fn write_paragraph_style(
    w: &mut XmlWriter,
    def: &StyleDef,
    effective: &EffectiveStyle,
    doc: &Document,
) {
    w.open(
        "w:style",
        &[("w:type", "paragraph"), ("w:styleId", def.id.as_str())],
    );
    w.empty("w:name", &[("w:val", def.name.as_str())]);
    w.empty("w:basedOn", &[("w:val", "Normal")]);
    w.empty("w:next", &[("w:val", "Normal")]);
    w.empty("w:qFormat", &[]);

    let spacing = doc.theme().spacing_for(def.role);
    w.open("w:pPr", &[]);
    if def.outline_level.is_some() {
        w.empty("w:keepNext", &[]);
    }
    w.empty(
        "w:spacing",
        &[
            ("w:before", twips(spacing.before).to_string().as_str()),
            ("w:after", twips(spacing.after).to_string().as_str()),
        ],
    );
    w.empty("w:jc", &[("w:val", jc_value(effective.alignment))]);
    if let Some(level) = def.outline_level {
        w.empty("w:outlineLvl", &[("w:val", level.to_string().as_str())]);
    }
    w.close("w:pPr");

    body::write_run_properties(w, effective);
    w.close("w:style");
}
