use std::path::Path;

use tracing::debug;

use crate::{
    font::{FontResolver, TierFonts},
    foundation::error::PosterResult,
    layout::layout_poster,
    model::{PosterDoc, StyleSheet},
    render::cpu::CpuRenderer,
    render::output::save_png,
    render::Bitmap,
    text::TextShaper,
};

/// Full poster pipeline: resolve fonts, lay out, rasterize, persist.
///
/// Holds the font resolver cache, the shaping contexts and the renderer's
/// font paints, so generating several posters reuses loaded font data.
/// Everything else is per-call.
#[derive(Default)]
pub struct PosterGenerator {
    resolver: FontResolver,
    shaper: TextShaper,
    renderer: CpuRenderer,
}

impl PosterGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the fonts a style sheet asks for without rendering anything.
    pub fn resolve_fonts(&mut self, style: &StyleSheet) -> TierFonts {
        TierFonts::resolve(style, &mut self.resolver, &mut self.shaper)
    }

    /// Validate, lay out and rasterize one poster.
    #[tracing::instrument(skip_all)]
    pub fn render_doc(&mut self, doc: &PosterDoc) -> PosterResult<Bitmap> {
        doc.validate()?;
        let fonts = TierFonts::resolve(&doc.style, &mut self.resolver, &mut self.shaper);
        let caps = self.renderer.caps();
        let commands = layout_poster(&doc.lines, &doc.style, &fonts, &mut self.shaper, caps)?;
        self.renderer.render(
            doc.style.canvas,
            doc.style.background,
            &commands,
            &mut self.shaper,
        )
    }

    /// Render one poster and write it as a PNG.
    pub fn generate(&mut self, doc: &PosterDoc, out: &Path) -> PosterResult<()> {
        let bitmap = self.render_doc(doc)?;
        save_png(&bitmap, out)?;
        debug!(path = %out.display(), "poster written");
        Ok(())
    }
}

/// One-shot generation for callers that do not need to reuse caches.
pub fn generate_poster(doc: &PosterDoc, out: &Path) -> PosterResult<()> {
    PosterGenerator::new().generate(doc, out)
}
