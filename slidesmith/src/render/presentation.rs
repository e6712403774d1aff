use std::fs;
use std::io::Write;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use tracing::debug;

use super::blank::blank_package;
use super::layout::Layout;
use super::package::{
    attr_string, rels_path_for, relative_target, resolve_target, ContentTypes, Package, CONTENT_TYPES_PART,
    RT_OFFICE_DOCUMENT, RT_SLIDE, RT_SLIDE_LAYOUT,
};
use super::slide::{slide_rels_xml, slide_xml};
use crate::error::{Result, SlidesmithError};

const RT_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_TEMPLATE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml";
const CT_SLIDESHOW: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideshow.main+xml";
const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const CT_RELS: &str = "application/vnd.openxmlformats-package.relationships+xml";

/// Section list extension; its entries name slide ids that no longer exist once slides are cleared.
const SECTION_LIST_EXT_URI: &str = "{521415D9-36F7-43E2-AB2F-B90AF26B5E84}";

/// Parts owned by slides, removed when no longer reachable.
const SLIDE_OWNED_PREFIXES: &[&str] = &["ppt/slides/", "ppt/notesSlides/", "ppt/comments/"];

const FIRST_SLIDE_ID: u32 = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
struct SlideRef {
    id: u32,
    rel_id: String,
}

/// An editable presentation package.
#[derive(Debug, Clone)]
pub struct Presentation {
    package: Package,
    main_part: String,
    slides: Vec<SlideRef>,
}

impl Presentation {
    pub fn blank() -> Result<Self> {
        Self::from_package(blank_package())
    }

    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| {
            SlidesmithError::Render(format!("Failed to open template {}: {e}", path.display()))
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_package(Package::from_bytes(bytes)?)
    }

    fn from_package(package: Package) -> Result<Self> {
        let main_part = package
            .relationships("")?
            .first_of_type(RT_OFFICE_DOCUMENT)
            .map(|rel| resolve_target("", &rel.target))
            .unwrap_or_else(|| "ppt/presentation.xml".to_string());

        if !package.contains(&main_part) {
            return Err(SlidesmithError::Render(format!(
                "Package has no presentation part at {main_part}"
            )));
        }

        let slides = id_list(&package.read_str(&main_part)?, b"sldId")?
            .into_iter()
            .filter_map(|(id, rel_id)| Some(SlideRef { id: id?, rel_id }))
            .collect();

        Ok(Self {
            package,
            main_part,
            slides,
        })
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Remove every slide along with the notes and comments that hang off it.
    /// Masters, layouts, theme and media stay in place.
    pub fn clear_slides(&mut self) -> Result<()> {
        let mut rels = self.package.relationships(&self.main_part)?;
        let slide_rel_ids: Vec<String> = rels
            .iter()
            .filter(|rel| rel.rel_type == RT_SLIDE)
            .map(|rel| rel.id.clone())
            .collect();

        for id in &slide_rel_ids {
            rels.remove(id);
        }
        self.package.set_relationships(&self.main_part, &rels);

        let removed = self.package.prune_unreachable(SLIDE_OWNED_PREFIXES)?;
        debug!(
            slides = self.slides.len(),
            removed_parts = removed.len(),
            "Cleared existing slides"
        );

        self.slides.clear();
        Ok(())
    }

    /// Layouts of the first slide master, in master order.
    pub fn layouts(&self) -> Result<Vec<Layout>> {
        let pres_rels = self.package.relationships(&self.main_part)?;
        let pres_xml = self.package.read_str(&self.main_part)?;

        let master_rel = id_list(&pres_xml, b"sldMasterId")?
            .into_iter()
            .find_map(|(_, rel_id)| pres_rels.get(&rel_id))
            .or_else(|| pres_rels.first_of_type(RT_SLIDE_MASTER))
            .ok_or_else(|| SlidesmithError::Render("Presentation has no slide master".into()))?;
        let master_part = resolve_target(&self.main_part, &master_rel.target);

        let master_rels = self.package.relationships(&master_part)?;
        let master_xml = self.package.read_str(&master_part)?;

        let mut layout_parts: Vec<String> = id_list(&master_xml, b"sldLayoutId")?
            .into_iter()
            .filter_map(|(_, rel_id)| master_rels.get(&rel_id))
            .map(|rel| resolve_target(&master_part, &rel.target))
            .collect();

        if layout_parts.is_empty() {
            layout_parts = master_rels
                .iter()
                .filter(|rel| rel.rel_type == RT_SLIDE_LAYOUT)
                .map(|rel| resolve_target(&master_part, &rel.target))
                .collect();
        }

        layout_parts
            .iter()
            .filter(|part| self.package.contains(part))
            .map(|part| Layout::parse(part, &self.package.read_str(part)?))
            .collect()
    }

    /// Append a slide built from `layout` and return its part name.
    pub fn add_slide(&mut self, layout: &Layout, title: &str, body: Option<&str>) -> Result<String> {
        let part = self.next_slide_part();

        self.package
            .put(part.clone(), slide_xml(layout, title, body).into_bytes());
        self.package.put(
            rels_path_for(&part),
            slide_rels_xml(&relative_target(&part, &layout.part)).into_bytes(),
        );

        let mut rels = self.package.relationships(&self.main_part)?;
        let rel_id = rels.add(RT_SLIDE, &relative_target(&self.main_part, &part));
        self.package.set_relationships(&self.main_part, &rels);

        let id = self
            .slides
            .iter()
            .map(|slide| slide.id + 1)
            .max()
            .unwrap_or(FIRST_SLIDE_ID)
            .max(FIRST_SLIDE_ID);
        self.slides.push(SlideRef { id, rel_id });

        Ok(part)
    }

    fn next_slide_part(&self) -> String {
        (1..)
            .map(|n| format!("ppt/slides/slide{n}.xml"))
            .find(|name| !self.package.contains(name))
            .unwrap_or_else(|| format!("ppt/slides/slide{}.xml", self.slides.len() + 1))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut package = self.package.clone();

        let pres_xml = package.read_str(&self.main_part)?;
        package.put(
            self.main_part.clone(),
            rewrite_presentation_xml(&pres_xml, &self.slides)?,
        );

        let mut types = ContentTypes::parse(&package.read_str(CONTENT_TYPES_PART)?)?;
        let needs_presentation_type = matches!(
            types.override_for(&self.main_part),
            None | Some(CT_TEMPLATE) | Some(CT_SLIDESHOW)
        );
        if needs_presentation_type {
            types.set_override(&self.main_part, CT_PRESENTATION);
        }
        types.retain_parts(&package);
        types.ensure_default("rels", CT_RELS);
        types.ensure_default("xml", "application/xml");
        let slide_parts: Vec<String> = package
            .part_names()
            .filter(|name| name.starts_with("ppt/slides/") && name.ends_with(".xml"))
            .filter(|name| !name.contains("/_rels/"))
            .map(str::to_string)
            .collect();
        for part in &slide_parts {
            types.set_override(part, CT_SLIDE);
        }
        package.put(CONTENT_TYPES_PART, types.to_xml());

        package.to_bytes()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        let mut file = fs::File::create(path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        Ok(())
    }
}

/// `(id, r:id)` pairs of every element named `item` (`sldId`, `sldMasterId`, `sldLayoutId`).
fn id_list(xml: &str, item: &[u8]) -> Result<Vec<(Option<u32>, String)>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == item => {
                let mut id = None;
                let mut rel_id = None;
                for attr in e.attributes().flatten() {
                    if attr.key.local_name().as_ref() != b"id" {
                        continue;
                    }
                    match attr.key.prefix() {
                        None => id = attr_string(&attr.value).and_then(|v| v.parse().ok()),
                        Some(_) => rel_id = attr_string(&attr.value),
                    }
                }
                if let Some(rel_id) = rel_id {
                    entries.push((id, rel_id));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SlidesmithError::Render(format!(
                    "Error parsing presentation XML: {e}"
                )))
            }
            _ => {}
        }
    }
    Ok(entries)
}

fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| attr_string(&a.value))
}

/// Prefix bound to the relationships namespace on the root element, if any.
fn relationships_prefix(root: &BytesStart) -> Option<String> {
    root.attributes().flatten().find_map(|a| {
        let key = std::str::from_utf8(a.key.as_ref()).ok()?;
        let prefix = key.strip_prefix("xmlns:")?;
        (attr_string(&a.value)? == R_NS).then(|| prefix.to_string())
    })
}

fn write_error(e: impl std::fmt::Display) -> SlidesmithError {
    SlidesmithError::Render(format!("Failed to write presentation XML: {e}"))
}

/// Re-emit `presentation.xml` with `p:sldIdLst` replaced by `slides`, dropping
/// custom shows and the section list, which refer to slides by id.
fn rewrite_presentation_xml(xml: &str, slides: &[SlideRef]) -> Result<Vec<u8>> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + slides.len() * 48));

    let mut prefix = String::from("p");
    let mut r_prefix = String::from("r");
    let mut depth = 0usize;
    let mut skip_depth = 0usize;
    let mut inserted = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| SlidesmithError::Render(format!("Error parsing presentation XML: {e}")))?;

        if skip_depth > 0 {
            match event {
                Event::Start(_) => skip_depth += 1,
                Event::End(_) => skip_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(e) => {
                let local = e.local_name();
                if depth == 0 {
                    if let Some(p) = e.name().prefix() {
                        prefix = String::from_utf8_lossy(p.as_ref()).into_owned();
                    }
                    match relationships_prefix(&e) {
                        Some(found) => r_prefix = found,
                        None => {
                            let mut root = e.to_owned();
                            root.push_attribute(("xmlns:r", R_NS));
                            depth += 1;
                            writer.write_event(Event::Start(root)).map_err(write_error)?;
                            continue;
                        }
                    }
                } else if is_skipped(depth, local.as_ref(), &e) {
                    skip_depth = 1;
                    continue;
                } else if depth == 1 && is_after_slide_list(local.as_ref()) && !inserted {
                    write_slide_list(&mut writer, &prefix, &r_prefix, slides);
                    inserted = true;
                }
                depth += 1;
                writer.write_event(Event::Start(e)).map_err(write_error)?;
            }
            Event::Empty(e) => {
                let local = e.local_name();
                if is_skipped(depth, local.as_ref(), &e) {
                    continue;
                }
                if depth == 1 && is_after_slide_list(local.as_ref()) && !inserted {
                    write_slide_list(&mut writer, &prefix, &r_prefix, slides);
                    inserted = true;
                }
                writer.write_event(Event::Empty(e)).map_err(write_error)?;
            }
            Event::End(e) => {
                if depth == 1 && !inserted {
                    write_slide_list(&mut writer, &prefix, &r_prefix, slides);
                    inserted = true;
                }
                depth = depth.saturating_sub(1);
                writer.write_event(Event::End(e)).map_err(write_error)?;
            }
            Event::Eof => break,
            other => writer.write_event(other).map_err(write_error)?,
        }
    }

    Ok(writer.into_inner())
}

/// Slide lists and custom shows directly under `p:presentation`, and the
/// section list extension wherever it appears.
fn is_skipped(depth: usize, local: &[u8], e: &BytesStart) -> bool {
    match local {
        b"sldIdLst" | b"custShowLst" => depth == 1,
        b"ext" => attr_value(e, b"uri").as_deref() == Some(SECTION_LIST_EXT_URI),
        _ => false,
    }
}

/// Elements that follow `p:sldIdLst` in `p:presentation`.
fn is_after_slide_list(local: &[u8]) -> bool {
    matches!(
        local,
        b"sldSz"
            | b"notesSz"
            | b"smartTags"
            | b"embeddedFontLst"
            | b"custShowLst"
            | b"photoAlbum"
            | b"custDataLst"
            | b"kinsoku"
            | b"defaultTextStyle"
            | b"modifyVerifier"
            | b"extLst"
    )
}

fn write_slide_list(writer: &mut Writer<Vec<u8>>, prefix: &str, r_prefix: &str, slides: &[SlideRef]) {
    if slides.is_empty() {
        return;
    }
    let out = writer.get_mut();
    out.extend_from_slice(format!("<{prefix}:sldIdLst>").as_bytes());
    for slide in slides {
        out.extend_from_slice(
            format!(
                r#"<{prefix}:sldId id="{}" {r_prefix}:id="{}"/>"#,
                slide.id, slide.rel_id
            )
            .as_bytes(),
        );
    }
    out.extend_from_slice(format!("</{prefix}:sldIdLst>").as_bytes());
}
