use std::f64::consts::{FRAC_PI_2, PI};

use tracing::debug;

use crate::{
    font::{PosterFont, TierFonts},
    foundation::core::{Point, Rect, Rgba8},
    foundation::error::{PosterError, PosterResult},
    model::{Align, Decoration, StyleSheet, TextLine},
    render::RenderCaps,
    text::{TextShaper, measure},
};

/// How a text command's (x, y) relates to the drawn string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    /// (x, y) is the top-left of the text box.
    TopLeft,
    /// x is the horizontal midpoint of the text box, y its top.
    TopCenter,
}

/// A fully position-resolved paint instruction. The renderer executes these
/// strictly in sequence; later commands occlude earlier ones.
#[derive(Clone, Debug)]
pub enum DrawCommand {
    Text {
        x: f64,
        y: f64,
        text: String,
        font: PosterFont,
        color: Rgba8,
        anchor: Anchor,
    },
    /// Rectangle outline of the given stroke thickness.
    Border {
        rect: Rect,
        thickness: f64,
        color: Rgba8,
    },
    /// Filled horizontal bar.
    Rule { rect: Rect, color: Rgba8 },
    /// Filled round-cornered rectangle with an optional outline.
    RoundedBox {
        rect: Rect,
        radius: f64,
        fill: Rgba8,
        outline: Option<Rgba8>,
        outline_width: f64,
    },
    /// Stroked quarter arc. Angles are radians in screen space (y down),
    /// measured from the positive x axis.
    CornerArc {
        center: Point,
        radius: f64,
        start: f64,
        sweep: f64,
        thickness: f64,
        color: Rgba8,
    },
}

/// Side length of the solid squares that stand in for corner arcs when the
/// renderer cannot stroke arcs.
const DEGRADED_CORNER_SIZE: f64 = 10.0;

struct PlacedLine {
    x: f64,
    y: f64,
}

/// Resolve a poster's lines and decorations into draw commands.
///
/// Vertical flow: the cursor starts at `start_offset` and advances by the
/// line's tier pitch after every line, blank or not; blank lines emit no
/// command. Horizontal placement is the left margin, except centered
/// non-list lines which split the leftover canvas width (clamped so text
/// wider than the canvas pins to x = 0 rather than going negative).
///
/// Output order fixes occlusion: filled decorations (rules, line boxes)
/// come first, then text, then outline decorations (border, corner marks).
#[tracing::instrument(skip_all, fields(lines = lines.len()))]
pub fn layout_poster(
    lines: &[TextLine],
    style: &StyleSheet,
    fonts: &TierFonts,
    shaper: &mut TextShaper,
    caps: RenderCaps,
) -> PosterResult<Vec<DrawCommand>> {
    let canvas_w = f64::from(style.canvas.width);
    let canvas_h = f64::from(style.canvas.height);

    let mut text_cmds = Vec::new();
    let mut placed: Vec<Option<PlacedLine>> = Vec::with_capacity(lines.len());
    let mut cursor = style.start_offset;

    for line in lines {
        let pitch = style.pitch_for(line.tier);
        if line.is_blank() {
            placed.push(None);
            cursor += pitch;
            continue;
        }
        let font = fonts.get(line.tier)?;

        let centered = line.align == Align::Centered && !line.is_list_item();
        let x = if centered {
            let extent = measure(shaper, caps, font, &line.text);
            ((canvas_w - extent.width) / 2.0).max(0.0)
        } else {
            style.left_margin
        };

        let color = if style.highlight.matches(&line.text) {
            style.accent_color
        } else {
            line.color.unwrap_or(style.text_color)
        };

        text_cmds.push(DrawCommand::Text {
            x,
            y: cursor,
            text: line.text.clone(),
            font: font.clone(),
            color,
            anchor: Anchor::TopLeft,
        });
        placed.push(Some(PlacedLine { x, y: cursor }));
        cursor += pitch;
    }

    let mut under = Vec::new();
    let mut over = Vec::new();
    for deco in &style.decorations {
        match deco {
            Decoration::Border {
                inset,
                thickness,
                color,
            } => over.push(DrawCommand::Border {
                rect: Rect::new(*inset, *inset, canvas_w - inset, canvas_h - inset),
                thickness: *thickness,
                color: *color,
            }),
            Decoration::Rule {
                y,
                inset,
                thickness,
                color,
            } => under.push(DrawCommand::Rule {
                rect: Rect::new(*inset, *y, canvas_w - inset, y + thickness),
                color: *color,
            }),
            Decoration::LineBox {
                line,
                padding,
                corner_radius,
                fill,
                outline,
                outline_width,
            } => {
                let target = lines.get(*line).zip(placed.get(*line).and_then(Option::as_ref));
                let Some((text_line, pos)) = target else {
                    return Err(PosterError::layout(format!(
                        "line box references line {line}, which is missing or blank"
                    )));
                };
                let font = fonts.get(text_line.tier)?;
                let extent = measure(shaper, caps, font, &text_line.text);
                under.push(DrawCommand::RoundedBox {
                    rect: Rect::new(
                        pos.x - padding,
                        pos.y - padding,
                        pos.x + extent.width + padding,
                        pos.y + extent.height + padding,
                    ),
                    radius: *corner_radius,
                    fill: *fill,
                    outline: *outline,
                    outline_width: *outline_width,
                });
            }
            Decoration::CornerMarks {
                inset,
                size,
                thickness,
                color,
            } => {
                if caps.supports_arc() {
                    let r = size / 2.0;
                    let corners = [
                        // Each arc opens toward the canvas interior.
                        (Point::new(inset + r, inset + r), PI),
                        (Point::new(canvas_w - inset - r, inset + r), 3.0 * FRAC_PI_2),
                        (Point::new(canvas_w - inset - r, canvas_h - inset - r), 0.0),
                        (Point::new(inset + r, canvas_h - inset - r), FRAC_PI_2),
                    ];
                    for (center, start) in corners {
                        over.push(DrawCommand::CornerArc {
                            center,
                            radius: r,
                            start,
                            sweep: FRAC_PI_2,
                            thickness: *thickness,
                            color: *color,
                        });
                    }
                } else {
                    let s = DEGRADED_CORNER_SIZE;
                    let anchors = [
                        (*inset, *inset),
                        (canvas_w - inset - s, *inset),
                        (canvas_w - inset - s, canvas_h - inset - s),
                        (*inset, canvas_h - inset - s),
                    ];
                    for (x, y) in anchors {
                        over.push(DrawCommand::RoundedBox {
                            rect: Rect::new(x, y, x + s, y + s),
                            radius: 0.0,
                            fill: *color,
                            outline: None,
                            outline_width: 0.0,
                        });
                    }
                }
            }
        }
    }

    let mut out = under;
    out.extend(text_cmds);
    out.extend(over);
    debug!(commands = out.len(), "layout resolved");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontResolver;
    use crate::foundation::core::Canvas;
    use crate::model::{FontSpec, HighlightRule, PosterDoc, Tier};
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    // Unresolvable candidates force the fallback face everywhere, which has
    // fixed 10x16 cells and keeps every expected coordinate exact.
    fn style(canvas: Canvas) -> StyleSheet {
        let mut fonts = BTreeMap::new();
        for tier in [Tier::Title, Tier::Subtitle, Tier::Body, Tier::Small] {
            fonts.insert(
                tier,
                FontSpec::new(vec![PathBuf::from("/no/such/font.ttf")], 24.0),
            );
        }
        StyleSheet {
            canvas,
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
        }
    }

    fn run(doc: &PosterDoc, caps: RenderCaps) -> PosterResult<Vec<DrawCommand>> {
        let mut resolver = FontResolver::new();
        let mut shaper = TextShaper::new();
        let fonts = TierFonts::resolve(&doc.style, &mut resolver, &mut shaper);
        layout_poster(&doc.lines, &doc.style, &fonts, &mut shaper, caps)
    }

    fn texts(cmds: &[DrawCommand]) -> Vec<(f64, f64, &str)> {
        cmds.iter()
            .filter_map(|c| match c {
                DrawCommand::Text { x, y, text, .. } => Some((*x, *y, text.as_str())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn cursor_advances_by_pitch_per_line() {
        let doc = PosterDoc {
            style: style(Canvas::new(800, 600)),
            lines: vec![
                TextLine::left("Date: 2025-02-15", Tier::Body),
                TextLine::left("Location: Hall A", Tier::Body),
            ],
        };
        let cmds = run(&doc, RenderCaps::full()).unwrap();
        assert_eq!(
            texts(&cmds),
            vec![
                (50.0, 120.0, "Date: 2025-02-15"),
                (50.0, 155.0, "Location: Hall A"),
            ]
        );
    }

    #[test]
    fn blank_lines_advance_without_emitting() {
        let doc = PosterDoc {
            style: style(Canvas::new(800, 600)),
            lines: vec![
                TextLine::left("Date: 2025-02-15", Tier::Body),
                TextLine::left("", Tier::Body),
                TextLine::left("Location: Hall A", Tier::Body),
            ],
        };
        let cmds = run(&doc, RenderCaps::full()).unwrap();
        assert_eq!(
            texts(&cmds),
            vec![
                (50.0, 120.0, "Date: 2025-02-15"),
                (50.0, 190.0, "Location: Hall A"),
            ]
        );
    }

    #[test]
    fn centered_line_splits_leftover_width() {
        let doc = PosterDoc {
            style: style(Canvas::new(800, 600)),
            lines: vec![TextLine::centered("hello", Tier::Title)],
        };
        let cmds = run(&doc, RenderCaps::full()).unwrap();
        // Fallback cells: 5 chars * 10px = 50px wide.
        assert_eq!(texts(&cmds), vec![(375.0, 120.0, "hello")]);
    }

    #[test]
    fn centered_overflow_clamps_to_left_edge() {
        let doc = PosterDoc {
            style: style(Canvas::new(40, 600)),
            lines: vec![TextLine::centered("hello", Tier::Body)],
        };
        let cmds = run(&doc, RenderCaps::full()).unwrap();
        assert_eq!(texts(&cmds)[0].0, 0.0);
    }

    #[test]
    fn list_items_never_center() {
        let doc = PosterDoc {
            style: style(Canvas::new(800, 600)),
            lines: vec![
                TextLine::centered("• 최신 AI 기술 동향", Tier::Body),
                TextLine::centered("- networking", Tier::Body),
            ],
        };
        let cmds = run(&doc, RenderCaps::full()).unwrap();
        for (x, _, _) in texts(&cmds) {
            assert_eq!(x, 50.0);
        }
    }

    #[test]
    fn highlight_wins_over_explicit_color() {
        let mut doc = PosterDoc {
            style: style(Canvas::new(800, 600)),
            lines: vec![
                TextLine::left("티켓 가격: 55,000원", Tier::Body)
                    .with_color(Rgba8::rgb(0, 0, 255)),
                TextLine::left("일반 안내", Tier::Body).with_color(Rgba8::rgb(0, 0, 255)),
            ],
        };
        doc.style.highlight = HighlightRule::keywords(["티켓"]);
        let cmds = run(&doc, RenderCaps::full()).unwrap();
        let colors: Vec<Rgba8> = cmds
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { color, .. } => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(colors, vec![Rgba8::rgb(220, 20, 60), Rgba8::rgb(0, 0, 255)]);
    }

    #[test]
    fn tier_pitch_overrides_line_pitch() {
        let mut doc = PosterDoc {
            style: style(Canvas::new(800, 600)),
            lines: vec![
                TextLine::centered("서울 재즈 페스티벌", Tier::Title),
                TextLine::left("2025년 5월 24일", Tier::Body),
            ],
        };
        doc.style.tier_pitch.insert(Tier::Title, 160.0);
        let cmds = run(&doc, RenderCaps::full()).unwrap();
        let ys: Vec<f64> = texts(&cmds).iter().map(|(_, y, _)| *y).collect();
        assert_eq!(ys, vec![120.0, 280.0]);
    }

    #[test]
    fn unmapped_tier_is_a_descriptive_error() {
        let mut doc = PosterDoc {
            style: style(Canvas::new(800, 600)),
            lines: vec![TextLine::left("hello", Tier::Small)],
        };
        doc.style.fonts.remove(&Tier::Small);
        let err = run(&doc, RenderCaps::full()).unwrap_err();
        assert!(err.to_string().contains("small"));
    }

    #[test]
    fn border_frames_paint_after_text() {
        let mut doc = PosterDoc {
            style: style(Canvas::new(800, 600)),
            lines: vec![TextLine::left("hello", Tier::Body)],
        };
        doc.style.decorations.push(Decoration::Border {
            inset: 20.0,
            thickness: 2.0,
            color: Rgba8::rgb(0, 0, 0),
        });
        let cmds = run(&doc, RenderCaps::full()).unwrap();
        let DrawCommand::Border { rect, thickness, .. } = &cmds[cmds.len() - 1] else {
            panic!("expected trailing border, got {:?}", cmds.last());
        };
        assert_eq!(*rect, Rect::new(20.0, 20.0, 780.0, 580.0));
        assert_eq!(*thickness, 2.0);
    }

    #[test]
    fn rules_paint_beneath_text() {
        // A zero-inset rule with a large thickness is a header band; title
        // text must land on top of it.
        let mut doc = PosterDoc {
            style: style(Canvas::new(600, 400)),
            lines: vec![TextLine::centered("주간 팀 미팅", Tier::Title)],
        };
        doc.style.decorations.push(Decoration::Rule {
            y: 0.0,
            inset: 0.0,
            thickness: 80.0,
            color: Rgba8::rgb(44, 62, 80),
        });
        let cmds = run(&doc, RenderCaps::full()).unwrap();
        let DrawCommand::Rule { rect, .. } = &cmds[0] else {
            panic!("expected leading rule, got {:?}", cmds.first());
        };
        assert_eq!(*rect, Rect::new(0.0, 0.0, 600.0, 80.0));
        assert!(matches!(cmds[1], DrawCommand::Text { .. }));
    }

    #[test]
    fn line_box_pads_the_measured_box() {
        let mut doc = PosterDoc {
            style: style(Canvas::new(800, 600)),
            lines: vec![TextLine::left("hello", Tier::Body)],
        };
        doc.style.decorations.push(Decoration::LineBox {
            line: 0,
            padding: 20.0,
            corner_radius: 10.0,
            fill: Rgba8::rgb(245, 245, 245),
            outline: Some(Rgba8::rgb(200, 200, 200)),
            outline_width: 2.0,
        });
        let cmds = run(&doc, RenderCaps::full()).unwrap();
        let DrawCommand::RoundedBox { rect, radius, .. } = &cmds[0] else {
            panic!("expected leading box, got {:?}", cmds.first());
        };
        // Text box is 50x16 at (50, 120); padded by 20 on all sides.
        assert_eq!(*rect, Rect::new(30.0, 100.0, 120.0, 156.0));
        assert_eq!(*radius, 10.0);
        assert!(matches!(cmds[1], DrawCommand::Text { .. }));
    }

    #[test]
    fn line_box_on_blank_line_errors() {
        let mut doc = PosterDoc {
            style: style(Canvas::new(800, 600)),
            lines: vec![TextLine::left("", Tier::Body)],
        };
        doc.style.decorations.push(Decoration::LineBox {
            line: 0,
            padding: 10.0,
            corner_radius: 5.0,
            fill: Rgba8::rgb(245, 245, 245),
            outline: None,
            outline_width: 0.0,
        });
        assert!(run(&doc, RenderCaps::full()).is_err());
    }

    #[test]
    fn corner_marks_emit_interior_facing_arcs() {
        let mut doc = PosterDoc {
            style: style(Canvas::new(800, 600)),
            lines: vec![],
        };
        doc.style.decorations.push(Decoration::CornerMarks {
            inset: 50.0,
            size: 50.0,
            thickness: 3.0,
            color: Rgba8::rgb(230, 126, 34),
        });
        let cmds = run(&doc, RenderCaps::full()).unwrap();
        let arcs: Vec<(Point, f64)> = cmds
            .iter()
            .filter_map(|c| match c {
                DrawCommand::CornerArc { center, start, radius, sweep, .. } => {
                    assert_eq!(*radius, 25.0);
                    assert_eq!(*sweep, FRAC_PI_2);
                    Some((*center, *start))
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            arcs,
            vec![
                (Point::new(75.0, 75.0), PI),
                (Point::new(725.0, 75.0), 3.0 * FRAC_PI_2),
                (Point::new(725.0, 525.0), 0.0),
                (Point::new(75.0, 525.0), FRAC_PI_2),
            ]
        );
    }

    #[test]
    fn corner_marks_degrade_to_squares_without_arc_support() {
        let mut doc = PosterDoc {
            style: style(Canvas::new(800, 600)),
            lines: vec![],
        };
        doc.style.decorations.push(Decoration::CornerMarks {
            inset: 50.0,
            size: 50.0,
            thickness: 3.0,
            color: Rgba8::rgb(230, 126, 34),
        });
        let cmds = run(&doc, RenderCaps::basic()).unwrap();
        let squares: Vec<Rect> = cmds
            .iter()
            .filter_map(|c| match c {
                DrawCommand::RoundedBox { rect, radius, .. } => {
                    assert_eq!(*radius, 0.0);
                    Some(*rect)
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            squares,
            vec![
                Rect::new(50.0, 50.0, 60.0, 60.0),
                Rect::new(740.0, 50.0, 750.0, 60.0),
                Rect::new(740.0, 540.0, 750.0, 550.0),
                Rect::new(50.0, 540.0, 60.0, 550.0),
            ]
        );
    }
}
