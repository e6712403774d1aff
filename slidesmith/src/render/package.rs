//! OPC package IO using zip + quick-xml
//!
//! A package is held fully in memory as a map from part name (zip entry name,
//! no leading slash) to bytes. Relationship and content-type parts are parsed
//! into small structs and serialized back on save.

use quick_xml::escape::{escape, unescape};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::io::{Cursor, Read, Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::{Result, SlidesmithError};

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub const PACKAGE_RELS_PART: &str = "_rels/.rels";

pub const RT_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const RT_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub const RT_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: BTreeMap<String, Vec<u8>>,
}

impl Package {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| SlidesmithError::Render(format!("Not a presentation package: {e}")))?;

        let mut parts = BTreeMap::new();
        for index in 0..archive.len() {
            let mut file = archive
                .by_index(index)
                .map_err(|e| SlidesmithError::Render(format!("Corrupt package entry: {e}")))?;
            if file.is_dir() {
                continue;
            }

            let name = file.name().trim_start_matches('/').to_string();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data).map_err(|e| {
                SlidesmithError::Render(format!("Failed to read {name} from package: {e}"))
            })?;
            parts.insert(name, data);
        }

        if !parts.contains_key(CONTENT_TYPES_PART) {
            return Err(SlidesmithError::Render(
                "Package is missing [Content_Types].xml".to_string(),
            ));
        }

        Ok(Self { parts })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.parts.get(name).map(Vec::as_slice)
    }

    pub fn read_str(&self, name: &str) -> Result<String> {
        let bytes = self
            .get(name)
            .ok_or_else(|| SlidesmithError::Render(format!("Package has no part {name}")))?;
        let text = String::from_utf8_lossy(bytes);
        Ok(text.trim_start_matches('\u{feff}').to_string())
    }

    pub fn put(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.parts.insert(name.into(), data.into());
    }

    /// Relationships of `part`, empty when the part has no `.rels` file.
    pub fn relationships(&self, part: &str) -> Result<Relationships> {
        let rels_name = rels_path_for(part);
        match self.get(&rels_name) {
            Some(_) => Relationships::parse(&self.read_str(&rels_name)?),
            None => Ok(Relationships::default()),
        }
    }

    pub fn set_relationships(&mut self, part: &str, rels: &Relationships) {
        self.put(rels_path_for(part), rels.to_xml());
    }

    /// Every part reachable from the package relationships.
    pub fn reachable_parts(&self) -> Result<BTreeSet<String>> {
        let mut reached = BTreeSet::new();
        let mut queue = VecDeque::new();

        for rel in self.relationships("")?.iter().filter(|r| !r.external) {
            queue.push_back(resolve_target("", &rel.target));
        }

        while let Some(part) = queue.pop_front() {
            if !self.contains(&part) || !reached.insert(part.clone()) {
                continue;
            }
            for rel in self.relationships(&part)?.iter().filter(|r| !r.external) {
                queue.push_back(resolve_target(&part, &rel.target));
            }
        }

        Ok(reached)
    }

    /// Drop unreachable parts under any of `prefixes`, along with their `.rels`.
    pub fn prune_unreachable(&mut self, prefixes: &[&str]) -> Result<Vec<String>> {
        let reachable = self.reachable_parts()?;

        let doomed: Vec<String> = self
            .parts
            .keys()
            .filter(|name| !name.contains("/_rels/") && !name.ends_with(".rels"))
            .filter(|name| prefixes.iter().any(|prefix| name.starts_with(prefix)))
            .filter(|name| !reachable.contains(*name))
            .cloned()
            .collect();

        for name in &doomed {
            self.parts.remove(name);
            self.parts.remove(&rels_path_for(name));
        }

        Ok(doomed)
    }

    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644);

        // [Content_Types].xml goes first so streaming readers can sniff the package.
        let ordered = self
            .parts
            .iter()
            .filter(|(name, _)| name.as_str() == CONTENT_TYPES_PART)
            .chain(
                self.parts
                    .iter()
                    .filter(|(name, _)| name.as_str() != CONTENT_TYPES_PART),
            );

        for (name, data) in ordered {
            zip.start_file(name.as_str(), options)
                .map_err(|e| SlidesmithError::Render(format!("Failed to write {name}: {e}")))?;
            zip.write_all(data)?;
        }

        zip.finish()
            .map_err(|e| SlidesmithError::Render(format!("Failed to finalize package: {e}")))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.write_to(Cursor::new(Vec::new()))?.into_inner())
    }
}

/// `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`; `""` -> `_rels/.rels`.
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None if part.is_empty() => PACKAGE_RELS_PART.to_string(),
        None => format!("_rels/{part}.rels"),
    }
}

fn part_dir(part: &str) -> &str {
    part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Resolve a relationship target relative to its source part.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => {
            let dir = part_dir(source_part);
            if dir.is_empty() {
                target.to_string()
            } else {
                format!("{dir}/{target}")
            }
        }
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Relative target from `source_part` to `target_part`, as written in `.rels` files.
pub fn relative_target(source_part: &str, target_part: &str) -> String {
    let from: Vec<&str> = part_dir(source_part)
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    let to: Vec<&str> = target_part.split('/').filter(|s| !s.is_empty()).collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();
    // Keep at least the file name in the target.
    let common = common.min(to.len().saturating_sub(1));

    let mut parts: Vec<&str> = std::iter::repeat("..").take(from.len() - common).collect();
    parts.extend_from_slice(&to[common..]);
    parts.join("/")
}

pub(crate) fn attr_string(value: &[u8]) -> Option<String> {
    let raw = std::str::from_utf8(value).ok()?;
    Some(
        unescape(raw)
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| raw.to_string()),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationships {
    items: Vec<Relationship>,
}

impl Relationships {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut items = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let mut id = None;
                        let mut target = None;
                        let mut rel_type = None;
                        let mut external = false;

                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"Id" => id = attr_string(&attr.value),
                                b"Target" => target = attr_string(&attr.value),
                                b"Type" => rel_type = attr_string(&attr.value),
                                b"TargetMode" => {
                                    external = attr.value.as_ref() == b"External";
                                }
                                _ => {}
                            }
                        }

                        if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                            items.push(Relationship {
                                id,
                                rel_type,
                                target,
                                external,
                            });
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(SlidesmithError::Render(format!(
                        "Error parsing relationships: {e}"
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(Self { items })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id)
    }

    pub fn first_of_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.rel_type == rel_type)
    }

    pub fn remove(&mut self, id: &str) -> Option<Relationship> {
        let position = self.items.iter().position(|r| r.id == id)?;
        Some(self.items.remove(position))
    }

    /// Add an internal relationship under the next free `rIdN` and return that id.
    pub fn add(&mut self, rel_type: &str, target: &str) -> String {
        let next = self
            .items
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId")?.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let id = format!("rId{next}");

        self.items.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            external: false,
        });
        id
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.items.len() * 160);
        xml.push_str(XML_DECLARATION);
        xml.push_str(&format!(r#"<Relationships xmlns="{RELATIONSHIPS_NS}">"#));
        for rel in &self.items {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}""#,
                escape(rel.id.as_str()),
                escape(rel.rel_type.as_str()),
                escape(rel.target.as_str())
            ));
            if rel.external {
                xml.push_str(r#" TargetMode="External""#);
            }
            xml.push_str("/>");
        }
        xml.push_str("</Relationships>");
        xml
    }
}

/// Parsed `[Content_Types].xml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypes {
    defaults: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut types = Self::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => {
                    let local = e.local_name();
                    let is_default = local.as_ref() == b"Default";
                    let is_override = local.as_ref() == b"Override";
                    if !is_default && !is_override {
                        buf.clear();
                        continue;
                    }

                    let mut key = None;
                    let mut content_type = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Extension" | b"PartName" => key = attr_string(&attr.value),
                            b"ContentType" => content_type = attr_string(&attr.value),
                            _ => {}
                        }
                    }

                    if let (Some(key), Some(content_type)) = (key, content_type) {
                        if is_default {
                            types.defaults.push((key.to_lowercase(), content_type));
                        } else {
                            types
                                .overrides
                                .push((key.trim_start_matches('/').to_string(), content_type));
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(SlidesmithError::Render(format!(
                        "Error parsing [Content_Types].xml: {e}"
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(types)
    }

    pub fn override_for(&self, part: &str) -> Option<&str> {
        self.overrides
            .iter()
            .find(|(name, _)| name == part)
            .map(|(_, ct)| ct.as_str())
    }

    pub fn ensure_default(&mut self, extension: &str, content_type: &str) {
        if !self.defaults.iter().any(|(ext, _)| ext == extension) {
            self.defaults
                .push((extension.to_string(), content_type.to_string()));
        }
    }

    pub fn set_override(&mut self, part: &str, content_type: &str) {
        match self.overrides.iter_mut().find(|(name, _)| name == part) {
            Some(entry) => entry.1 = content_type.to_string(),
            None => self
                .overrides
                .push((part.to_string(), content_type.to_string())),
        }
    }

    pub fn retain_parts(&mut self, package: &Package) {
        self.overrides.retain(|(name, _)| package.contains(name));
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.overrides.len() * 160);
        xml.push_str(XML_DECLARATION);
        xml.push_str(&format!(r#"<Types xmlns="{CONTENT_TYPES_NS}">"#));
        for (extension, content_type) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape(extension.as_str()),
                escape(content_type.as_str())
            ));
        }
        for (part, content_type) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="/{}" ContentType="{}"/>"#,
                escape(part.as_str()),
                escape(content_type.as_str())
            ));
        }
        xml.push_str("</Types>");
        xml
    }
}
