use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::package::attr_string;
use crate::error::{Result, SlidesmithError};

/// A placeholder declared on a slide layout (`p:sp/p:nvSpPr/p:nvPr/p:ph`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// `type` attribute; `obj` when absent.
    pub kind: String,
    /// `idx` attribute; 0 when absent.
    pub idx: u32,
    pub name: String,
    pub orient: Option<String>,
    pub sz: Option<String>,
}

impl Placeholder {
    pub fn is_title(&self) -> bool {
        matches!(self.kind.as_str(), "title" | "ctrTitle")
    }

    /// Date, footer and slide-number placeholders are not copied onto new slides.
    pub fn is_chrome(&self) -> bool {
        matches!(self.kind.as_str(), "dt" | "ftr" | "sldNum")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Part name, e.g. `ppt/slideLayouts/slideLayout2.xml`.
    pub part: String,
    pub name: String,
    pub placeholders: Vec<Placeholder>,
}

impl Layout {
    pub fn parse(part: &str, xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut name = String::new();
        let mut placeholders = Vec::new();
        let mut current: Option<(String, Option<Placeholder>)> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"cSld" => name = attr(&e, b"name").unwrap_or_default(),
                    b"sp" => current = Some((String::new(), None)),
                    b"cNvPr" => capture_shape_name(&mut current, &e),
                    b"ph" => capture_placeholder(&mut current, &e),
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                    b"cNvPr" => capture_shape_name(&mut current, &e),
                    b"ph" => capture_placeholder(&mut current, &e),
                    _ => {}
                },
                Ok(Event::End(e)) => {
                    if e.local_name().as_ref() == b"sp" {
                        if let Some((shape_name, Some(mut ph))) = current.take() {
                            ph.name = shape_name;
                            placeholders.push(ph);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(SlidesmithError::Render(format!(
                        "Error parsing layout {part}: {e}"
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(Self {
            part: part.to_string(),
            name,
            placeholders,
        })
    }

    pub fn title_placeholder(&self) -> Option<&Placeholder> {
        self.placeholders.iter().find(|ph| ph.is_title())
    }

    /// Placeholder that receives the subtitle or bullet text: the one with `idx` 1,
    /// otherwise the first one that is neither a title nor chrome.
    pub fn secondary_placeholder(&self) -> Option<&Placeholder> {
        let mut candidates = self
            .placeholders
            .iter()
            .filter(|ph| !ph.is_title() && !ph.is_chrome());

        candidates
            .clone()
            .find(|ph| ph.idx == 1)
            .or_else(|| candidates.next())
    }

    /// Placeholders to reproduce on a slide built from this layout.
    pub fn content_placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.placeholders.iter().filter(|ph| !ph.is_chrome())
    }
}

fn attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key && a.key.prefix().is_none())
        .and_then(|a| attr_string(&a.value))
}

fn capture_shape_name(current: &mut Option<(String, Option<Placeholder>)>, e: &BytesStart) {
    if let Some((name, _)) = current.as_mut() {
        if name.is_empty() {
            *name = attr(e, b"name").unwrap_or_default();
        }
    }
}

fn capture_placeholder(current: &mut Option<(String, Option<Placeholder>)>, e: &BytesStart) {
    if let Some((_, ph)) = current.as_mut() {
        *ph = Some(Placeholder {
            kind: attr(e, b"type").unwrap_or_else(|| "obj".to_string()),
            idx: attr(e, b"idx").and_then(|v| v.parse().ok()).unwrap_or(0),
            name: String::new(),
            orient: attr(e, b"orient"),
            sz: attr(e, b"sz"),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TITLE_AND_CONTENT: &str = r#"<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld name="Title and Content"><p:spTree>
        <p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr></p:sp>
        <p:sp><p:nvSpPr><p:cNvPr id="3" name="Content Placeholder 2"/><p:cNvSpPr/><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr></p:sp>
        <p:sp><p:nvSpPr><p:cNvPr id="4" name="Date Placeholder 3"/><p:cNvSpPr/><p:nvPr><p:ph type="dt" sz="half" idx="10"/></p:nvPr></p:nvSpPr></p:sp>
        <p:sp><p:nvSpPr><p:cNvPr id="5" name="Decoration"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr></p:sp>
    </p:spTree></p:cSld></p:sldLayout>"#;

    #[test]
    fn parses_placeholders_with_defaults() {
        let layout = Layout::parse("ppt/slideLayouts/slideLayout2.xml", TITLE_AND_CONTENT)
            .expect("layout should parse");

        assert_eq!(layout.name, "Title and Content");
        assert_eq!(layout.placeholders.len(), 3);

        let body = &layout.placeholders[1];
        assert_eq!(body.kind, "obj");
        assert_eq!(body.idx, 1);
        assert_eq!(body.name, "Content Placeholder 2");

        let date = &layout.placeholders[2];
        assert!(date.is_chrome());
        assert_eq!(date.sz.as_deref(), Some("half"));
    }

    #[test]
    fn picks_title_and_secondary() {
        let layout = Layout::parse("l.xml", TITLE_AND_CONTENT).expect("parse");
        assert_eq!(layout.title_placeholder().map(|p| p.kind.as_str()), Some("title"));
        assert_eq!(layout.secondary_placeholder().map(|p| p.idx), Some(1));
        assert_eq!(layout.content_placeholders().count(), 2);
    }

    #[test]
    fn secondary_falls_back_to_first_body_placeholder() {
        let xml = r#"<p:sldLayout xmlns:p="p"><p:cSld name="Odd"><p:spTree>
            <p:sp><p:nvSpPr><p:cNvPr id="2" name="Footer"/><p:nvPr><p:ph type="ftr" idx="11"/></p:nvPr></p:nvSpPr></p:sp>
            <p:sp><p:nvSpPr><p:cNvPr id="3" name="Heading"/><p:nvPr><p:ph type="ctrTitle"/></p:nvPr></p:nvSpPr></p:sp>
            <p:sp><p:nvSpPr><p:cNvPr id="4" name="Text"/><p:nvPr><p:ph type="body" idx="13"/></p:nvPr></p:nvSpPr></p:sp>
        </p:spTree></p:cSld></p:sldLayout>"#;

        let layout = Layout::parse("l.xml", xml).expect("parse");
        assert_eq!(layout.secondary_placeholder().map(|p| p.idx), Some(13));
        assert!(layout.title_placeholder().expect("title").is_title());
    }

    #[test]
    fn layout_without_placeholders_has_no_targets() {
        let xml = r#"<p:sldLayout xmlns:p="p"><p:cSld name="Blank"><p:spTree/></p:cSld></p:sldLayout>"#;
        let layout = Layout::parse("l.xml", xml).expect("parse");
        assert!(layout.title_placeholder().is_none());
        assert!(layout.secondary_placeholder().is_none());
    }
}
