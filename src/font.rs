use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    foundation::error::{PosterError, PosterResult},
    model::{FontSpec, StyleSheet, Tier},
    text::TextShaper,
};

/// A candidate font file that loaded and parsed successfully.
#[derive(Clone, Debug)]
pub struct LoadedFont {
    pub path: PathBuf,
    /// Family name reported by the font itself, not the file name.
    pub family: String,
    pub bytes: Arc<Vec<u8>>,
    pub size_px: f32,
}

/// Built-in box-glyph face used when no candidate is usable.
///
/// Every non-whitespace character renders as a fixed hollow cell, so posters
/// stay legible as *structure* (line positions, decorations) even on hosts
/// with no fonts installed. The requested size is recorded but the cell
/// geometry never changes, which keeps fallback output deterministic.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FallbackFont {
    pub requested_px: f32,
}

impl FallbackFont {
    /// Horizontal advance per character cell, in pixels.
    pub const ADVANCE: f64 = 10.0;
    /// Vertical extent of a line of cells, in pixels.
    pub const LINE_HEIGHT: f64 = 16.0;
}

/// Outcome of font resolution for one tier.
#[derive(Clone, Debug)]
pub enum PosterFont {
    Loaded(LoadedFont),
    Fallback(FallbackFont),
}

impl PosterFont {
    pub fn size_px(&self) -> f32 {
        match self {
            PosterFont::Loaded(f) => f.size_px,
            PosterFont::Fallback(f) => f.requested_px,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, PosterFont::Fallback(_))
    }

    /// Short human-readable description for logs and `--dump-fonts`.
    pub fn describe(&self) -> String {
        match self {
            PosterFont::Loaded(f) => {
                format!("{} ({}) at {}px", f.family, f.path.display(), f.size_px)
            }
            PosterFont::Fallback(f) => {
                format!("built-in fallback (requested {}px)", f.requested_px)
            }
        }
    }
}

#[derive(Clone, Debug)]
enum CachedLoad {
    Loaded { bytes: Arc<Vec<u8>>, family: String },
    Unusable,
}

/// Resolves font candidate lists to usable faces, caching per-path outcomes.
///
/// The cache is the only state that outlives a single render call: repeated
/// renders with overlapping candidate lists read and parse each file once.
/// Both successful loads and failures are remembered, so a bad path costs
/// one probe rather than one per render.
#[derive(Default)]
pub struct FontResolver {
    cache: HashMap<PathBuf, CachedLoad>,
}

impl FontResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a candidate list to the first usable face, or the built-in
    /// fallback when none is. Never fails: an empty or fully-broken candidate
    /// list degrades to [`PosterFont::Fallback`].
    pub fn resolve(&mut self, spec: &FontSpec, shaper: &mut TextShaper) -> PosterFont {
        for path in &spec.candidates {
            match self.probe(path, shaper) {
                CachedLoad::Loaded { bytes, family } => {
                    debug!(path = %path.display(), family = %family, "font candidate accepted");
                    return PosterFont::Loaded(LoadedFont {
                        path: path.clone(),
                        family,
                        bytes,
                        size_px: spec.size_px,
                    });
                }
                CachedLoad::Unusable => continue,
            }
        }
        warn!(
            candidates = spec.candidates.len(),
            "no usable font among candidates; using built-in fallback"
        );
        PosterFont::Fallback(FallbackFont {
            requested_px: spec.size_px,
        })
    }

    fn probe(&mut self, path: &Path, shaper: &mut TextShaper) -> CachedLoad {
        if let Some(hit) = self.cache.get(path) {
            return hit.clone();
        }
        let outcome = match std::fs::read(path) {
            Ok(bytes) => match shaper.register(&bytes) {
                Some(family) => CachedLoad::Loaded {
                    bytes: Arc::new(bytes),
                    family,
                },
                None => {
                    debug!(path = %path.display(), "font file did not parse; skipping");
                    CachedLoad::Unusable
                }
            },
            Err(e) => {
                debug!(path = %path.display(), error = %e, "font file unreadable; skipping");
                CachedLoad::Unusable
            }
        };
        self.cache.insert(path.to_path_buf(), outcome.clone());
        outcome
    }
}

/// Per-tier resolved fonts for one render call.
pub struct TierFonts {
    by_tier: BTreeMap<Tier, PosterFont>,
}

impl TierFonts {
    /// Resolve every tier the style sheet maps. Resolution never fails; each
    /// tier independently degrades to the fallback face when needed.
    pub fn resolve(
        style: &StyleSheet,
        resolver: &mut FontResolver,
        shaper: &mut TextShaper,
    ) -> Self {
        let by_tier = style
            .fonts
            .iter()
            .map(|(tier, spec)| (*tier, resolver.resolve(spec, shaper)))
            .collect();
        Self { by_tier }
    }

    /// Look up the resolved font for a tier. A miss means the caller laid out
    /// a line whose tier was never given a font spec, which is a bug on their
    /// side, so the error is descriptive rather than silently degraded.
    pub fn get(&self, tier: Tier) -> PosterResult<&PosterFont> {
        self.by_tier.get(&tier).ok_or_else(|| {
            PosterError::font(format!(
                "no font resolved for tier '{tier}'; the style sheet maps {} tiers",
                self.by_tier.len()
            ))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tier, &PosterFont)> {
        self.by_tier.iter().map(|(t, f)| (*t, f))
    }
}
