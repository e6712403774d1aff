//! Outline to PPTX rendering
//!
//! Decks are edited as in-memory OPC packages: the built-in blank deck or an
//! uploaded template with its slides removed. Each outline entry becomes one
//! slide built from the first ("title") or second ("content") layout of the
//! first slide master.

mod blank;
mod layout;
mod package;
mod presentation;
mod slide;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

pub use layout::{Layout, Placeholder};
pub use package::Package;
pub use presentation::Presentation;

use crate::error::{Result, SlidesmithError};
use crate::models::{Outline, SlideSpec};

/// Render `outline` to a new file in `out_dir` and return its path.
///
/// With a template, its slides are discarded and its masters, layouts and theme
/// are reused. Without one, the built-in blank deck is used.
pub fn render(outline: &Outline, template: Option<&Path>, out_dir: &Path) -> Result<PathBuf> {
    let mut presentation = match template {
        Some(path) => {
            let mut presentation = Presentation::open(path)?;
            presentation.clear_slides()?;
            presentation
        }
        None => Presentation::blank()?,
    };

    build_slides(&mut presentation, outline)?;

    let path = out_dir.join(format!(
        "generated_{}_{}.pptx",
        std::process::id(),
        nanoid::nanoid!(10)
    ));
    presentation.save(&path)?;

    info!(
        slides = outline.slides.len(),
        template = template.is_some(),
        path = %path.display(),
        "Rendered presentation"
    );

    Ok(path)
}

/// Append one slide per outline entry, in order.
pub fn build_slides(presentation: &mut Presentation, outline: &Outline) -> Result<()> {
    let layouts = presentation.layouts()?;
    let title_layout = layouts
        .first()
        .ok_or_else(|| SlidesmithError::Render("Presentation has no slide layouts".into()))?;
    let content_layout = layouts.get(1).unwrap_or(title_layout);

    for spec in &outline.slides {
        let part = match spec {
            SlideSpec::Title { title, subtitle } => {
                presentation.add_slide(title_layout, title, Some(subtitle.as_str()))?
            }
            SlideSpec::Content { title, .. } => {
                let body = spec.body_text();
                presentation.add_slide(content_layout, title, Some(body.as_str()))?
            }
        };
        debug!(part = %part, title = spec.title(), "Added slide");
    }

    Ok(())
}
