use super::package::{Package, CONTENT_TYPES_PART, PACKAGE_RELS_PART};

macro_rules! blank_part {
    ($path:literal) => {
        (
            $path,
            include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/resources/blank/", $path)),
        )
    };
}

const PARTS: &[(&str, &str)] = &[
    blank_part!("[Content_Types].xml"),
    blank_part!("_rels/.rels"),
    blank_part!("docProps/app.xml"),
    blank_part!("docProps/core.xml"),
    blank_part!("ppt/presentation.xml"),
    blank_part!("ppt/_rels/presentation.xml.rels"),
    blank_part!("ppt/presProps.xml"),
    blank_part!("ppt/viewProps.xml"),
    blank_part!("ppt/tableStyles.xml"),
    blank_part!("ppt/theme/theme1.xml"),
    blank_part!("ppt/slideMasters/slideMaster1.xml"),
    blank_part!("ppt/slideMasters/_rels/slideMaster1.xml.rels"),
    blank_part!("ppt/slideLayouts/slideLayout1.xml"),
    blank_part!("ppt/slideLayouts/_rels/slideLayout1.xml.rels"),
    blank_part!("ppt/slideLayouts/slideLayout2.xml"),
    blank_part!("ppt/slideLayouts/_rels/slideLayout2.xml.rels"),
];

/// Built-in 4:3 deck with one master and two layouts: "Title Slide" and "Title and Content".
pub fn blank_package() -> Package {
    let mut package = Package::new();
    for (name, xml) in PARTS {
        package.put(*name, xml.as_bytes().to_vec());
    }
    debug_assert!(package.contains(CONTENT_TYPES_PART));
    debug_assert!(package.contains(PACKAGE_RELS_PART));
    package
}
