use quick_xml::escape::escape;

use super::layout::{Layout, Placeholder};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NAMESPACES: &str = concat!(
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#,
);

/// Build a slide part that repeats `layout`'s non-chrome placeholders, filling the
/// title placeholder with `title` and the secondary placeholder with `body`.
///
/// `body` is split on `\n`, one paragraph per line. Placeholders without text keep
/// an empty paragraph so the layout prompt text shows in editors.
pub fn slide_xml(layout: &Layout, title: &str, body: Option<&str>) -> String {
    let title_target = layout.title_placeholder();
    let body_target = layout.secondary_placeholder();

    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECLARATION);
    xml.push_str(&format!("<p:sld {NAMESPACES}>"));
    xml.push_str("<p:cSld><p:spTree>");
    xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
    xml.push_str(concat!(
        "<p:grpSpPr><a:xfrm>",
        r#"<a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
        r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/>"#,
        "</a:xfrm></p:grpSpPr>",
    ));

    for (offset, placeholder) in layout.content_placeholders().enumerate() {
        let text = if title_target.is_some_and(|t| std::ptr::eq(t, placeholder)) {
            Some(title)
        } else if body_target.is_some_and(|b| std::ptr::eq(b, placeholder)) {
            body
        } else {
            None
        };
        xml.push_str(&placeholder_shape(placeholder, offset as u32 + 2, text));
    }

    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:sld>");
    xml
}

fn placeholder_shape(placeholder: &Placeholder, id: u32, text: Option<&str>) -> String {
    let name = if placeholder.name.is_empty() {
        format!("Placeholder {}", id - 1)
    } else {
        placeholder.name.clone()
    };

    let mut ph = String::from("<p:ph");
    if placeholder.kind != "obj" {
        ph.push_str(&format!(r#" type="{}""#, escape(placeholder.kind.as_str())));
    }
    if let Some(orient) = &placeholder.orient {
        ph.push_str(&format!(r#" orient="{}""#, escape(orient.as_str())));
    }
    if let Some(sz) = &placeholder.sz {
        ph.push_str(&format!(r#" sz="{}""#, escape(sz.as_str())));
    }
    if placeholder.idx != 0 {
        ph.push_str(&format!(r#" idx="{}""#, placeholder.idx));
    }
    ph.push_str("/>");

    let mut xml = String::with_capacity(512);
    xml.push_str("<p:sp><p:nvSpPr>");
    xml.push_str(&format!(
        r#"<p:cNvPr id="{id}" name="{}"/>"#,
        escape(name.as_str())
    ));
    xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#);
    xml.push_str(&format!("<p:nvPr>{ph}</p:nvPr>"));
    xml.push_str("</p:nvSpPr><p:spPr/>");
    xml.push_str("<p:txBody><a:bodyPr/><a:lstStyle/>");
    match text {
        Some(text) => {
            for line in text.split('\n') {
                xml.push_str(&paragraph(line));
            }
        }
        None => xml.push_str("<a:p/>"),
    }
    xml.push_str("</p:txBody></p:sp>");
    xml
}

fn paragraph(line: &str) -> String {
    let line = line.trim_end_matches('\r');
    if line.is_empty() {
        return "<a:p/>".to_string();
    }
    format!(
        r#"<a:p><a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
        escape(escape_control_chars(line).as_str())
    )
}

/// Replace characters XML 1.0 cannot carry with the `_xHHHH_` form Office decodes.
fn escape_control_chars(line: &str) -> String {
    line.chars()
        .fold(String::with_capacity(line.len()), |mut out, c| {
            if is_xml_char(c) {
                out.push(c);
            } else {
                out.push_str(&format!("_x{:04X}_", c as u32));
            }
            out
        })
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Relationships part for a slide: a single link to its layout.
pub fn slide_rels_xml(layout_target: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="{}"/>"#,
            "</Relationships>"
        ),
        escape(layout_target)
    )
}
