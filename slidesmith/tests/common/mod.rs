#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::json;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use slidesmith::config::{
    AnthropicConfig, ChatCompletionsConfig, GeminiConfig, ProvidersConfig,
};

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const RT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const RT_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const RT_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
const RT_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
const RT_THEME: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
const RT_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const RT_NOTES_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";

pub const PRESENTATION_CT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
pub const TEMPLATE_CT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml";

/// Provider settings pointing every backend at `base_url`.
pub fn providers_config(base_url: &str) -> ProvidersConfig {
    ProvidersConfig {
        openai: ChatCompletionsConfig {
            base_url: format!("{base_url}/openai/v1"),
            model: "gpt-3.5-turbo".to_string(),
        },
        aipipe: ChatCompletionsConfig {
            base_url: format!("{base_url}/aipipe/openai/v1"),
            model: "gpt-4o-mini".to_string(),
        },
        anthropic: AnthropicConfig {
            base_url: format!("{base_url}/anthropic/v1"),
            model: "claude-3-sonnet-20240229".to_string(),
            version: "2023-06-01".to_string(),
        },
        gemini: GeminiConfig {
            base_url: Some(format!(
                "{base_url}/v1beta/models/gemini-pro:generateContent"
            )),
            model: "gemini-pro".to_string(),
            version: "v1beta".to_string(),
        },
        timeout_secs: 5,
        temperature: 0.7,
        max_tokens: 1500,
    }
}

pub fn outline_json() -> String {
    json!({
        "title": "T",
        "slides": [
            {"type": "title", "title": "A", "subtitle": "B"},
            {"type": "content", "title": "C", "content": ["x", "y"]}
        ]
    })
    .to_string()
}

pub fn chat_completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
        ]
    })
}

pub fn anthropic_body(content: &str) -> serde_json::Value {
    json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": content}],
        "stop_reason": "end_turn"
    })
}

pub fn gemini_body(content: &str) -> serde_json::Value {
    json!({
        "candidates": [
            {"content": {"role": "model", "parts": [{"text": content}]}, "finishReason": "STOP"}
        ]
    })
}

/// Every entry of a zip archive, decoded as UTF-8.
pub fn zip_entries(bytes: &[u8]) -> BTreeMap<String, String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    let mut entries = BTreeMap::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).expect("zip entry");
        let mut data = Vec::new();
        file.read_to_end(&mut data).expect("read entry");
        entries.insert(
            file.name().to_string(),
            String::from_utf8_lossy(&data).into_owned(),
        );
    }
    entries
}

/// Slide part names listed in `ppt/slides/`, in slide-number order.
pub fn slide_parts(entries: &BTreeMap<String, String>) -> Vec<String> {
    let mut parts: Vec<(u32, String)> = entries
        .keys()
        .filter_map(|name| {
            let number = name
                .strip_prefix("ppt/slides/slide")?
                .strip_suffix(".xml")?
                .parse()
                .ok()?;
            Some((number, name.clone()))
        })
        .collect();
    parts.sort();
    parts.into_iter().map(|(_, name)| name).collect()
}

/// Paragraph texts of each `p:sp` shape in a slide, in document order.
pub fn shape_texts(xml: &str) -> Vec<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut shapes: Vec<Vec<String>> = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event().expect("slide xml") {
            Event::Start(e) => match e.local_name().as_ref() {
                b"sp" => shapes.push(Vec::new()),
                b"p" => {
                    if let Some(shape) = shapes.last_mut() {
                        shape.push(String::new());
                    }
                }
                b"t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"p" {
                    if let Some(shape) = shapes.last_mut() {
                        shape.push(String::new());
                    }
                }
            }
            Event::End(e) => {
                if e.local_name().as_ref() == b"t" {
                    in_text = false;
                }
            }
            Event::Text(t) if in_text => {
                let raw = std::str::from_utf8(t.as_ref()).expect("utf8");
                let text = quick_xml::escape::unescape(raw).expect("unescape");
                if let Some(line) = shapes.last_mut().and_then(|s| s.last_mut()) {
                    line.push_str(&text);
                }
            }
            Event::GeneralRef(r) if in_text => {
                let name = std::str::from_utf8(r.as_ref()).expect("utf8");
                let entity = format!("&{name};");
                let text = quick_xml::escape::unescape(&entity).expect("entity");
                if let Some(line) = shapes.last_mut().and_then(|s| s.last_mut()) {
                    line.push_str(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    shapes
}

/// The layout a slide's `.rels` points at.
pub fn slide_layout_target(entries: &BTreeMap<String, String>, slide_part: &str) -> String {
    let (dir, file) = slide_part.rsplit_once('/').expect("slide path");
    let rels = &entries[&format!("{dir}/_rels/{file}.rels")];
    let start = rels.find("Target=\"").expect("target") + "Target=\"".len();
    let end = rels[start..].find('"').expect("target end") + start;
    rels[start..end].to_string()
}

fn rels(items: &[(&str, &str, &str)]) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{RELS_NS}">"#
    );
    for (id, kind, target) in items {
        xml.push_str(&format!(
            r#"<Relationship Id="{id}" Type="{kind}" Target="{target}"/>"#
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn placeholder(id: u32, name: &str, ph: &str, text: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>{ph}</p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US"/><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp>"#
    )
}

fn sp_tree(shapes: &[String]) -> String {
    format!(
        r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree>"#,
        shapes.concat()
    )
}

fn layout(name: &str, shapes: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldLayout {NS} preserve="1"><p:cSld name="{name}">{}</p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        sp_tree(shapes)
    )
}

/// A widescreen "Corporate" template with three layouts and `existing_slides`
/// slides (each with a notes page), saved with `main_content_type`.
pub fn template_pptx(existing_slides: usize, main_content_type: &str) -> Vec<u8> {
    let mut parts: Vec<(String, String)> = Vec::new();

    let mut overrides = format!(
        r#"<Override PartName="/ppt/presentation.xml" ContentType="{main_content_type}"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/><Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#
    );
    for n in 1..=3 {
        overrides.push_str(&format!(
            r#"<Override PartName="/ppt/slideLayouts/slideLayout{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#
        ));
    }
    for n in 1..=existing_slides {
        overrides.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/><Override PartName="/ppt/notesSlides/notesSlide{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml"/>"#
        ));
    }
    parts.push((
        "[Content_Types].xml".into(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/>{overrides}</Types>"#
        ),
    ));

    parts.push((
        "_rels/.rels".into(),
        rels(&[(
            "rId1",
            RT_OFFICE_DOCUMENT,
            "ppt/presentation.xml",
        )]),
    ));

    let mut pres_rels: Vec<(String, String, String)> = vec![
        ("rId1".into(), format!("{RT}/slideMaster"), "slideMasters/slideMaster1.xml".into()),
        ("rId2".into(), format!("{RT}/theme"), "theme/theme1.xml".into()),
    ];
    let mut sld_ids = String::new();
    for n in 1..=existing_slides {
        let rid = format!("rId{}", n + 2);
        sld_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="{rid}"/>"#, 255 + n));
        pres_rels.push((rid, format!("{RT}/slide"), format!("slides/slide{n}.xml")));
    }
    let sld_id_lst = if existing_slides > 0 {
        format!("<p:sldIdLst>{sld_ids}</p:sldIdLst>")
    } else {
        String::new()
    };
    parts.push((
        "ppt/presentation.xml".into(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {NS}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>{sld_id_lst}<p:sldSz cx="12192000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#
        ),
    ));
    let pres_rel_refs: Vec<(&str, &str, &str)> = pres_rels
        .iter()
        .map(|(a, b, c)| (a.as_str(), b.as_str(), c.as_str()))
        .collect();
    parts.push(("ppt/_rels/presentation.xml.rels".into(), rels(&pres_rel_refs)));

    parts.push((
        "ppt/slideMasters/slideMaster1.xml".into(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldMaster {NS}><p:cSld>{}</p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/><p:sldLayoutId id="2147483650" r:id="rId2"/><p:sldLayoutId id="2147483651" r:id="rId3"/></p:sldLayoutIdLst></p:sldMaster>"#,
            sp_tree(&[placeholder(2, "Title Placeholder 1", r#"<p:ph type="title"/>"#, "Master title")])
        ),
    ));
    parts.push((
        "ppt/slideMasters/_rels/slideMaster1.xml.rels".into(),
        rels(&[
            ("rId1", RT_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml"),
            ("rId2", RT_SLIDE_LAYOUT, "../slideLayouts/slideLayout2.xml"),
            ("rId3", RT_SLIDE_LAYOUT, "../slideLayouts/slideLayout3.xml"),
            ("rId4", RT_THEME, "../theme/theme1.xml"),
        ]),
    ));

    parts.push((
        "ppt/slideLayouts/slideLayout1.xml".into(),
        layout(
            "Corporate Title",
            &[
                placeholder(2, "Title 1", r#"<p:ph type="ctrTitle"/>"#, "Title"),
                placeholder(3, "Subtitle 2", r#"<p:ph type="subTitle" idx="1"/>"#, "Subtitle"),
                placeholder(4, "Footer 3", r#"<p:ph type="ftr" sz="quarter" idx="11"/>"#, ""),
            ],
        ),
    ));
    parts.push((
        "ppt/slideLayouts/slideLayout2.xml".into(),
        layout(
            "Corporate Content",
            &[
                placeholder(2, "Title 1", r#"<p:ph type="title"/>"#, "Title"),
                placeholder(3, "Content 2", r#"<p:ph idx="1"/>"#, "Text"),
                placeholder(4, "Slide Number 3", r#"<p:ph type="sldNum" sz="quarter" idx="12"/>"#, ""),
            ],
        ),
    ));
    parts.push((
        "ppt/slideLayouts/slideLayout3.xml".into(),
        layout(
            "Section Header",
            &[placeholder(2, "Title 1", r#"<p:ph type="title"/>"#, "Section")],
        ),
    ));
    for n in 1..=3 {
        parts.push((
            format!("ppt/slideLayouts/_rels/slideLayout{n}.xml.rels"),
            rels(&[("rId1", RT_SLIDE_MASTER, "../slideMasters/slideMaster1.xml")]),
        ));
    }

    parts.push((
        "ppt/theme/theme1.xml".into(),
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Corporate"><a:themeElements><a:clrScheme name="Corporate"><a:dk1><a:srgbClr val="000000"/></a:dk1><a:lt1><a:srgbClr val="FFFFFF"/></a:lt1></a:clrScheme></a:themeElements></a:theme>"#.into(),
    ));

    for n in 1..=existing_slides {
        let notes_target = format!("../notesSlides/notesSlide{n}.xml");
        let slide_target = format!("../slides/slide{n}.xml");
        parts.push((
            format!("ppt/slides/slide{n}.xml"),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {NS}><p:cSld>{}</p:cSld></p:sld>"#,
                sp_tree(&[placeholder(2, "Title 1", r#"<p:ph type="title"/>"#, &format!("Old slide {n}"))])
            ),
        ));
        parts.push((
            format!("ppt/slides/_rels/slide{n}.xml.rels"),
            rels(&[
                ("rId1", RT_SLIDE_LAYOUT, "../slideLayouts/slideLayout2.xml"),
                ("rId2", RT_NOTES_SLIDE, notes_target.as_str()),
            ]),
        ));
        parts.push((
            format!("ppt/notesSlides/notesSlide{n}.xml"),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:notes {NS}><p:cSld>{}</p:cSld></p:notes>"#,
                sp_tree(&[])
            ),
        ));
        parts.push((
            format!("ppt/notesSlides/_rels/notesSlide{n}.xml.rels"),
            rels(&[("rId1", RT_SLIDE, slide_target.as_str())]),
        ));
    }

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644);

        for (name, xml) in &parts {
            zip.start_file(name.as_str(), options).unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buffer.into_inner()
}
