use serde::{Deserialize, Serialize};

/// Structured presentation outline produced by the LLM and consumed by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Outline {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slides: Vec<SlideSpec>,
}

impl Outline {
    pub fn new(title: impl Into<String>, slides: Vec<SlideSpec>) -> Self {
        Self {
            title: title.into(),
            slides,
        }
    }
}

/// One slide of an [`Outline`], tagged by `type` on the wire.
///
/// Content slides carry their bullets under `content`, matching the prompt
/// format. Deserialization is lenient: unknown `type` values fall back to
/// [`SlideSpec::Content`] and missing text fields default to empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", from = "RawSlide")]
pub enum SlideSpec {
    Title {
        title: String,
        subtitle: String,
    },
    Content {
        title: String,
        #[serde(rename = "content")]
        bullets: Vec<String>,
    },
}

impl SlideSpec {
    pub fn title(&self) -> &str {
        match self {
            SlideSpec::Title { title, .. } | SlideSpec::Content { title, .. } => title,
        }
    }

    pub fn is_title(&self) -> bool {
        matches!(self, SlideSpec::Title { .. })
    }

    /// Text destined for the slide's secondary placeholder.
    ///
    /// Bullets are joined with `\n`; the renderer turns each line into a paragraph.
    pub fn body_text(&self) -> String {
        match self {
            SlideSpec::Title { subtitle, .. } => subtitle.clone(),
            SlideSpec::Content { bullets, .. } => bullets.join("\n"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BulletsField {
    Many(Vec<Option<String>>),
    One(String),
}

impl BulletsField {
    fn into_lines(self) -> Vec<String> {
        match self {
            BulletsField::Many(items) => items.into_iter().flatten().collect(),
            BulletsField::One(text) => text.lines().map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSlide {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    subtitle: Option<String>,
    #[serde(default, alias = "bullets")]
    content: Option<BulletsField>,
}

impl From<RawSlide> for SlideSpec {
    fn from(raw: RawSlide) -> Self {
        let title = raw.title.unwrap_or_default();
        let is_title = raw
            .kind
            .as_deref()
            .map(|kind| kind.trim().eq_ignore_ascii_case("title"))
            .unwrap_or(false);

        if is_title {
            SlideSpec::Title {
                title,
                subtitle: raw.subtitle.unwrap_or_default(),
            }
        } else {
            SlideSpec::Content {
                title,
                bullets: raw
                    .content
                    .map(BulletsField::into_lines)
                    .unwrap_or_default(),
            }
        }
    }
}
