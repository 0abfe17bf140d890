//! Playbill renders synthetic event posters into PNG fixtures for OCR
//! pipeline testing.
//!
//! A poster is plain data (a [`PosterDoc`]: style sheet + ordered text
//! lines) that turns into pixels in four stages:
//!
//! 1. **Resolve**: ordered font candidate lists -> usable faces
//!    ([`FontResolver`]), degrading per tier to a built-in box-glyph face
//!    when nothing loads
//! 2. **Lay out**: lines + style + measured text -> position-resolved
//!    [`DrawCommand`] sequence
//! 3. **Render**: commands -> premultiplied RGBA8 [`Bitmap`] on the CPU
//! 4. **Persist**: bitmap -> RGB8 PNG, creating output directories
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: the same document on the same host
//!   produces byte-identical pixels; font degradation is silent, per tier.
//! - **No hidden font state**: candidate paths are caller data; only the
//!   resolver's per-path cache outlives a render call.
#![forbid(unsafe_code)]

mod font;
mod foundation;
mod layout;
mod model;
mod pipeline;
mod render;
mod text;

/// Built-in fixture posters (conference, concert, meeting, festival, party).
pub mod scenarios;

pub use font::{FallbackFont, FontResolver, LoadedFont, PosterFont, TierFonts};
pub use foundation::core::{Canvas, Extent, Point, Rect, Rgba8};
pub use foundation::error::{PosterError, PosterResult};
pub use layout::{Anchor, DrawCommand, layout_poster};
pub use model::{
    Align, Decoration, FontSpec, HighlightRule, PosterDoc, StyleSheet, TextLine, Tier,
};
pub use pipeline::{PosterGenerator, generate_poster};
pub use render::cpu::CpuRenderer;
pub use render::output::save_png;
pub use render::{Bitmap, RenderCaps};
pub use text::{TextShaper, measure};
