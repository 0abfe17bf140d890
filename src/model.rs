use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::{
    foundation::core::{Canvas, Rgba8},
    foundation::error::{PosterError, PosterResult},
};

/// Text size/role class. Each tier maps to one [`FontSpec`] in the style sheet.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Tier {
    Title,
    Subtitle,
    Body,
    Small,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Tier::Title => "title",
            Tier::Subtitle => "subtitle",
            Tier::Body => "body",
            Tier::Small => "small",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Align {
    Left,
    Centered,
}

impl Default for Align {
    fn default() -> Self {
        Align::Left
    }
}

/// Ordered font candidates plus the requested pixel size.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FontSpec {
    pub candidates: Vec<PathBuf>,
    pub size_px: f32,
}

impl FontSpec {
    pub fn new(candidates: Vec<PathBuf>, size_px: f32) -> Self {
        Self {
            candidates,
            size_px,
        }
    }

    pub fn validate(&self) -> PosterResult<()> {
        if !self.size_px.is_finite() || self.size_px <= 0.0 {
            return Err(PosterError::validation(
                "font size_px must be finite and > 0",
            ));
        }
        Ok(())
    }
}

/// One logical line of poster text. Order within the document is the vertical flow.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextLine {
    pub text: String,
    #[serde(default)]
    pub align: Align,
    #[serde(default = "default_tier")]
    pub tier: Tier,
    #[serde(default)]
    pub color: Option<Rgba8>,
}

fn default_tier() -> Tier {
    Tier::Body
}

impl TextLine {
    pub fn left(text: impl Into<String>, tier: Tier) -> Self {
        Self {
            text: text.into(),
            align: Align::Left,
            tier,
            color: None,
        }
    }

    pub fn centered(text: impl Into<String>, tier: Tier) -> Self {
        Self {
            text: text.into(),
            align: Align::Centered,
            tier,
            color: None,
        }
    }

    pub fn with_color(mut self, color: Rgba8) -> Self {
        self.color = Some(color);
        self
    }

    /// Blank separator lines advance the cursor without emitting text.
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }

    /// List-marked lines always flow from the left margin.
    pub fn is_list_item(&self) -> bool {
        matches!(
            self.text.trim_start().chars().next(),
            Some('•' | '-' | '*')
        )
    }
}

/// Substring keyword set selecting lines that must render in the accent color.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HighlightRule {
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl HighlightRule {
    pub fn keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        self.keywords
            .iter()
            .any(|kw| !kw.is_empty() && text.contains(kw.as_str()))
    }
}

/// Decorative framing configured in style-sheet space; the layout engine
/// resolves each entry into absolute draw commands.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Decoration {
    /// Rectangle outline inset from every canvas edge.
    Border {
        inset: f64,
        thickness: f64,
        color: Rgba8,
    },
    /// Filled horizontal bar across the canvas. A zero-inset rule with a large
    /// thickness doubles as a header band.
    Rule {
        y: f64,
        inset: f64,
        thickness: f64,
        color: Rgba8,
    },
    /// Rounded box framing one line's measured text box, padded on all sides.
    LineBox {
        line: usize,
        padding: f64,
        corner_radius: f64,
        fill: Rgba8,
        #[serde(default)]
        outline: Option<Rgba8>,
        #[serde(default)]
        outline_width: f64,
    },
    /// Quarter-arc ornaments at the four canvas corners.
    CornerMarks {
        inset: f64,
        size: f64,
        thickness: f64,
        color: Rgba8,
    },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StyleSheet {
    pub canvas: Canvas,
    pub background: Rgba8,
    pub fonts: BTreeMap<Tier, FontSpec>,
    pub text_color: Rgba8,
    pub accent_color: Rgba8,
    pub line_pitch: f64, // default vertical advance per line
    #[serde(default)]
    pub tier_pitch: BTreeMap<Tier, f64>, // per-tier overrides
    pub start_offset: f64,
    #[serde(default = "default_left_margin")]
    pub left_margin: f64,
    #[serde(default)]
    pub highlight: HighlightRule,
    #[serde(default)]
    pub decorations: Vec<Decoration>,
}

fn default_left_margin() -> f64 {
    50.0
}

impl StyleSheet {
    /// Vertical advance for a line of the given tier.
    pub fn pitch_for(&self, tier: Tier) -> f64 {
        self.tier_pitch
            .get(&tier)
            .copied()
            .unwrap_or(self.line_pitch)
    }

    pub fn validate(&self) -> PosterResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(PosterError::validation("canvas width/height must be > 0"));
        }
        if !self.line_pitch.is_finite() || self.line_pitch <= 0.0 {
            return Err(PosterError::validation(
                "line_pitch must be finite and > 0",
            ));
        }
        for (tier, pitch) in &self.tier_pitch {
            if !pitch.is_finite() || *pitch <= 0.0 {
                return Err(PosterError::validation(format!(
                    "tier_pitch for '{tier}' must be finite and > 0"
                )));
            }
        }
        if !self.start_offset.is_finite() {
            return Err(PosterError::validation("start_offset must be finite"));
        }
        if !self.left_margin.is_finite() || self.left_margin < 0.0 {
            return Err(PosterError::validation(
                "left_margin must be finite and >= 0",
            ));
        }
        for spec in self.fonts.values() {
            spec.validate()?;
        }
        Ok(())
    }
}

/// A complete poster input: one style sheet plus the ordered line sequence.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PosterDoc {
    pub style: StyleSheet,
    pub lines: Vec<TextLine>,
}

impl PosterDoc {
    /// Deserialize a poster document from JSON. Parse failures are
    /// serialization errors; call [`PosterDoc::validate`] afterwards for
    /// semantic checks.
    pub fn from_json_reader(reader: impl std::io::Read) -> PosterResult<Self> {
        serde_json::from_reader(reader)
            .map_err(|e| PosterError::serde(format!("parse poster JSON: {e}")))
    }

    pub fn validate(&self) -> PosterResult<()> {
        self.style.validate()?;

        for line in &self.lines {
            if !self.style.fonts.contains_key(&line.tier) {
                return Err(PosterError::validation(format!(
                    "line '{}' uses tier '{}' but the style sheet maps no font for it",
                    line.text, line.tier
                )));
            }
        }

        for deco in &self.style.decorations {
            if let Decoration::LineBox { line, .. } = deco {
                match self.lines.get(*line) {
                    None => {
                        return Err(PosterError::validation(format!(
                            "line box references line {line} but the document has {} lines",
                            self.lines.len()
                        )));
                    }
                    Some(target) if target.is_blank() => {
                        return Err(PosterError::validation(format!(
                            "line box references line {line}, which is blank"
                        )));
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_doc() -> PosterDoc {
        let mut fonts = BTreeMap::new();
        fonts.insert(
            Tier::Body,
            FontSpec::new(vec![PathBuf::from("/no/such/font.ttf")], 24.0),
        );

        PosterDoc {
            style: StyleSheet {
                canvas: Canvas::new(800, 600),
                background: Rgba8::rgb(255, 255, 255),
                fonts,
                text_color: Rgba8::rgb(0, 0, 0),
                accent_color: Rgba8::rgb(220, 20, 60),
                line_pitch: 35.0,
                tier_pitch: BTreeMap::new(),
                start_offset: 120.0,
                left_margin: 50.0,
                highlight: HighlightRule::default(),
                decorations: vec![],
            },
            lines: vec![TextLine::left("일시: 2025년 1월 20일", Tier::Body)],
        }
    }

    #[test]
    fn json_roundtrip() {
        let doc = basic_doc();
        let s = serde_json::to_string_pretty(&doc).unwrap();
        let de: PosterDoc = serde_json::from_str(&s).unwrap();
        assert_eq!(doc, de);
    }

    #[test]
    fn from_json_reader_parses_and_flags_garbage() {
        let doc = basic_doc();
        let json = serde_json::to_string(&doc).unwrap();
        let de = PosterDoc::from_json_reader(json.as_bytes()).unwrap();
        assert_eq!(doc, de);

        let err = PosterDoc::from_json_reader(&b"{ not json"[..]).unwrap_err();
        assert!(err.to_string().contains("serialization error:"));
    }

    #[test]
    fn line_defaults_fill_in() {
        let de: TextLine = serde_json::from_str(r#"{ "text": "hello" }"#).unwrap();
        assert_eq!(de.align, Align::Left);
        assert_eq!(de.tier, Tier::Body);
        assert_eq!(de.color, None);
    }

    #[test]
    fn validate_rejects_zero_canvas() {
        let mut doc = basic_doc();
        doc.style.canvas.width = 0;
        let err = doc.validate().unwrap_err();
        assert!(err.to_string().contains("canvas"));
    }

    #[test]
    fn validate_rejects_unmapped_tier() {
        let mut doc = basic_doc();
        doc.lines.push(TextLine::centered("잠실 주경기장", Tier::Title));
        let err = doc.validate().unwrap_err();
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn validate_rejects_out_of_range_line_box() {
        let mut doc = basic_doc();
        doc.style.decorations.push(Decoration::LineBox {
            line: 9,
            padding: 20.0,
            corner_radius: 10.0,
            fill: Rgba8::rgb(245, 245, 245),
            outline: None,
            outline_width: 0.0,
        });
        assert!(doc.validate().is_err());
    }

    #[test]
    fn list_items_detected_by_leading_marker() {
        assert!(TextLine::left("• 최신 AI 기술 동향", Tier::Body).is_list_item());
        assert!(TextLine::left("  - item", Tier::Body).is_list_item());
        assert!(!TextLine::left("2025-02-15", Tier::Body).is_list_item());
        assert!(!TextLine::left("장소: 코엑스", Tier::Body).is_list_item());
    }

    #[test]
    fn highlight_matches_substring() {
        let rule = HighlightRule::keywords(["티켓", "가격"]);
        assert!(rule.matches("티켓 가격: VIP 150,000원"));
        assert!(!rule.matches("장소: 올림픽공원"));
        assert!(!HighlightRule::default().matches("티켓"));
    }

    #[test]
    fn tier_pitch_overrides_default() {
        let mut doc = basic_doc();
        doc.style.tier_pitch.insert(Tier::Title, 70.0);
        assert_eq!(doc.style.pitch_for(Tier::Title), 70.0);
        assert_eq!(doc.style.pitch_for(Tier::Body), 35.0);
    }
}
