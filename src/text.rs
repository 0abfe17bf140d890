use tracing::debug;

use crate::{
    font::{FallbackFont, LoadedFont, PosterFont},
    foundation::core::{Extent, Rgba8},
    foundation::error::{PosterError, PosterResult},
    render::RenderCaps,
};

/// Shared parley contexts for shaping poster text.
///
/// One shaper instance serves both measurement (layout engine) and glyph
/// generation (renderer), so registered font data is shared between them.
pub struct TextShaper {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgba8>,
}

impl Default for TextShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl TextShaper {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Register raw font bytes with the collection and report the primary
    /// family name, or `None` when the bytes do not parse as a font.
    pub fn register(&mut self, bytes: &[u8]) -> Option<String> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id)?;
        self.font_ctx
            .collection
            .family_name(family_id)
            .map(|name| name.to_string())
    }

    /// Shape a single run of text with a loaded face. Returns the broken
    /// layout; callers read line metrics or glyph runs from it.
    pub fn shape(
        &mut self,
        text: &str,
        font: &LoadedFont,
        brush: Rgba8,
    ) -> PosterResult<parley::Layout<Rgba8>> {
        if !font.size_px.is_finite() || font.size_px <= 0.0 {
            return Err(PosterError::layout(format!(
                "font size must be finite and > 0, got {}",
                font.size_px
            )));
        }
        let family_name = self.register(&font.bytes).ok_or_else(|| {
            PosterError::layout(format!(
                "font '{}' did not register a usable family",
                font.path.display()
            ))
        })?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font.size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

/// Measure the box a text run will occupy when drawn with `font`.
///
/// Uses shaped line metrics when the renderer supports them and the font is
/// a real face; anything else (fallback face, shaping failure, degenerate
/// result) drops to the coarse estimate without surfacing an error.
pub fn measure(
    shaper: &mut TextShaper,
    caps: RenderCaps,
    font: &PosterFont,
    text: &str,
) -> Extent {
    if text.is_empty() {
        return Extent::ZERO;
    }
    match font {
        // Cell geometry ignores the requested size, so fallback extents are
        // stable across tiers.
        PosterFont::Fallback(_) => fallback_extent(text),
        PosterFont::Loaded(f) => {
            if caps.supports_precise_metrics() {
                match precise_extent(shaper, f, text) {
                    Ok(extent) if extent.width > 0.0 => return extent,
                    Ok(_) => {
                        debug!(text_len = text.len(), "shaped extent was empty; using coarse estimate");
                    }
                    Err(e) => {
                        debug!(error = %e, "shaping failed; using coarse estimate");
                    }
                }
            }
            coarse_extent(text, f.size_px)
        }
    }
}

fn precise_extent(shaper: &mut TextShaper, font: &LoadedFont, text: &str) -> PosterResult<Extent> {
    let layout = shaper.shape(text, font, Rgba8::rgb(0, 0, 0))?;
    let mut width: f64 = 0.0;
    let mut height: f64 = 0.0;
    for line in layout.lines() {
        let m = line.metrics();
        width = width.max(f64::from(m.advance));
        height += f64::from(m.ascent + m.descent + m.leading);
    }
    Ok(Extent::new(width, height))
}

/// Character-count estimate used when shaped metrics are unavailable.
/// Full-width characters (Hangul, CJK, fullwidth forms) count as one em,
/// everything else as 0.6 em; height is a fixed 1.2 em.
pub(crate) fn coarse_extent(text: &str, size_px: f32) -> Extent {
    let size = f64::from(size_px);
    let width = text.chars().map(|c| size * char_width_factor(c)).sum();
    Extent::new(width, size * 1.2)
}

fn fallback_extent(text: &str) -> Extent {
    let count = text.chars().count() as f64;
    Extent::new(count * FallbackFont::ADVANCE, FallbackFont::LINE_HEIGHT)
}

fn char_width_factor(c: char) -> f64 {
    match c {
        '\u{1100}'..='\u{11FF}' // Hangul Jamo
        | '\u{3000}'..='\u{303F}' // CJK symbols and punctuation
        | '\u{3130}'..='\u{318F}' // Hangul compatibility Jamo
        | '\u{4E00}'..='\u{9FFF}' // CJK unified ideographs
        | '\u{AC00}'..='\u{D7A3}' // Hangul syllables
        | '\u{FF00}'..='\u{FF60}' => 1.0, // fullwidth forms
        _ => 0.6,
    }
}
