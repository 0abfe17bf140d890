use std::collections::HashMap;
use std::path::PathBuf;

use kurbo::Shape as _;

use crate::{
    font::{FallbackFont, LoadedFont, PosterFont},
    foundation::core::{BezPath, Canvas, Point, Rect, Rgba8, Vec2},
    foundation::error::{PosterError, PosterResult},
    layout::{Anchor, DrawCommand},
    render::{Bitmap, RenderCaps},
    text::TextShaper,
};

/// Curve flattening tolerance for rounded corners, arcs and stroke
/// expansion, in pixels.
const PATH_TOLERANCE: f64 = 0.1;

/// CPU rasterizer for poster draw commands.
///
/// Stateless across renders apart from the font paint cache: raw font bytes
/// are wrapped into `FontData` once per path and reused by later calls.
#[derive(Default)]
pub struct CpuRenderer {
    font_cache: HashMap<PathBuf, vello_cpu::peniko::FontData>,
}

impl CpuRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capabilities of this renderer, resolved once per render call.
    pub fn caps(&self) -> RenderCaps {
        RenderCaps::full()
    }

    /// Execute commands strictly in order onto a freshly cleared canvas.
    pub fn render(
        &mut self,
        canvas: Canvas,
        background: Rgba8,
        commands: &[DrawCommand],
        shaper: &mut TextShaper,
    ) -> PosterResult<Bitmap> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(PosterError::render("canvas width and height must be > 0"));
        }
        let width_u16: u16 = canvas
            .width
            .try_into()
            .map_err(|_| PosterError::render("canvas width exceeds u16"))?;
        let height_u16: u16 = canvas
            .height
            .try_into()
            .map_err(|_| PosterError::render("canvas height exceeds u16"))?;

        let mut pixmap = vello_cpu::Pixmap::new(width_u16, height_u16);
        clear_pixmap(
            &mut pixmap,
            premul_rgba8(background.r, background.g, background.b, background.a),
        );

        let mut ctx = vello_cpu::RenderContext::new(width_u16, height_u16);
        // `render_to_pixmap` overwrites the full buffer, so the background
        // clear must go through the context as the first fill.
        ctx.set_paint(color_to_cpu(background));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(canvas.width),
            f64::from(canvas.height),
        ));
        for cmd in commands {
            self.draw(&mut ctx, cmd, shaper)?;
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(Bitmap {
            width: canvas.width,
            height: canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn draw(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        cmd: &DrawCommand,
        shaper: &mut TextShaper,
    ) -> PosterResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        match cmd {
            DrawCommand::Text {
                x,
                y,
                text,
                font,
                color,
                anchor,
            } => match font {
                PosterFont::Loaded(f) => {
                    self.draw_shaped(ctx, *x, *y, *anchor, text, f, *color, shaper)
                }
                PosterFont::Fallback(_) => {
                    draw_boxes(ctx, *x, *y, *anchor, text, *color);
                    Ok(())
                }
            },
            DrawCommand::Border {
                rect,
                thickness,
                color,
            } => {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(color_to_cpu(*color));
                let t = *thickness;
                // Four filled bars; corner overlap is invisible at one color.
                ctx.fill_rect(&rect_to_cpu(Rect::new(rect.x0, rect.y0, rect.x1, rect.y0 + t)));
                ctx.fill_rect(&rect_to_cpu(Rect::new(rect.x0, rect.y1 - t, rect.x1, rect.y1)));
                ctx.fill_rect(&rect_to_cpu(Rect::new(rect.x0, rect.y0, rect.x0 + t, rect.y1)));
                ctx.fill_rect(&rect_to_cpu(Rect::new(rect.x1 - t, rect.y0, rect.x1, rect.y1)));
                Ok(())
            }
            DrawCommand::Rule { rect, color } => {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(color_to_cpu(*color));
                ctx.fill_rect(&rect_to_cpu(*rect));
                Ok(())
            }
            DrawCommand::RoundedBox {
                rect,
                radius,
                fill,
                outline,
                outline_width,
            } => {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                let path = kurbo::RoundedRect::from_rect(*rect, *radius).to_path(PATH_TOLERANCE);
                ctx.set_paint(color_to_cpu(*fill));
                ctx.fill_path(&bezpath_to_cpu(&path));
                if let Some(outline_color) = outline
                    && *outline_width > 0.0
                {
                    let stroked = kurbo::stroke(
                        path.elements().iter().copied(),
                        &kurbo::Stroke::new(*outline_width),
                        &kurbo::StrokeOpts::default(),
                        PATH_TOLERANCE,
                    );
                    ctx.set_paint(color_to_cpu(*outline_color));
                    ctx.fill_path(&bezpath_to_cpu(&stroked));
                }
                Ok(())
            }
            DrawCommand::CornerArc {
                center,
                radius,
                start,
                sweep,
                thickness,
                color,
            } => {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                let arc = kurbo::Arc {
                    center: *center,
                    radii: Vec2::new(*radius, *radius),
                    start_angle: *start,
                    sweep_angle: *sweep,
                    x_rotation: 0.0,
                };
                let stroked = kurbo::stroke(
                    arc.path_elements(PATH_TOLERANCE),
                    &kurbo::Stroke::new(*thickness),
                    &kurbo::StrokeOpts::default(),
                    PATH_TOLERANCE,
                );
                ctx.set_paint(color_to_cpu(*color));
                ctx.fill_path(&bezpath_to_cpu(&stroked));
                Ok(())
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_shaped(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        x: f64,
        y: f64,
        anchor: Anchor,
        text: &str,
        font: &LoadedFont,
        color: Rgba8,
        shaper: &mut TextShaper,
    ) -> PosterResult<()> {
        let layout = shaper.shape(text, font, color)?;
        let width = layout
            .lines()
            .map(|l| f64::from(l.metrics().advance))
            .fold(0.0, f64::max);
        let origin_x = match anchor {
            Anchor::TopLeft => x,
            Anchor::TopCenter => x - width / 2.0,
        };
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin_x, y)));

        let font_data = self.font_data_for(font);
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font_data)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }

    fn font_data_for(&mut self, font: &LoadedFont) -> vello_cpu::peniko::FontData {
        if let Some(data) = self.font_cache.get(&font.path) {
            return data.clone();
        }
        let data = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font.bytes.as_ref().clone()),
            0,
        );
        self.font_cache.insert(font.path.clone(), data.clone());
        data
    }
}

/// Fallback-face text: one hollow cell per non-whitespace character, fixed
/// cell geometry. Whitespace advances without painting.
fn draw_boxes(
    ctx: &mut vello_cpu::RenderContext,
    x: f64,
    y: f64,
    anchor: Anchor,
    text: &str,
    color: Rgba8,
) {
    let width = text.chars().count() as f64 * FallbackFont::ADVANCE;
    let origin_x = match anchor {
        Anchor::TopLeft => x,
        Anchor::TopCenter => x - width / 2.0,
    };

    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(color_to_cpu(color));
    for (i, c) in text.chars().enumerate() {
        if c.is_whitespace() {
            continue;
        }
        let x0 = origin_x + i as f64 * FallbackFont::ADVANCE + 1.0;
        let x1 = origin_x + (i + 1) as f64 * FallbackFont::ADVANCE - 1.0;
        let y0 = y + 2.0;
        let y1 = y + FallbackFont::LINE_HEIGHT - 2.0;
        ctx.fill_rect(&rect_to_cpu(Rect::new(x0, y0, x1, y0 + 1.0)));
        ctx.fill_rect(&rect_to_cpu(Rect::new(x0, y1 - 1.0, x1, y1)));
        ctx.fill_rect(&rect_to_cpu(Rect::new(x0, y0, x0 + 1.0, y1)));
        ctx.fill_rect(&rect_to_cpu(Rect::new(x1 - 1.0, y0, x1, y1)));
    }
}

fn premul_rgba8(r: u8, g: u8, b: u8, a: u8) -> [u8; 4] {
    let af = (a as u16) + 1;
    let premul = |c: u8| -> u8 { (((c as u16) * af) >> 8) as u8 };
    [premul(r), premul(g), premul(b), a]
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    let data = pixmap.data_as_u8_slice_mut();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}
