pub mod cpu;
pub mod output;

/// Renderer capabilities, resolved once per render call and threaded through
/// layout so degradation decisions (coarse metrics, squares instead of arcs)
/// are made explicitly rather than by probe-and-catch at draw time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderCaps {
    pub precise_metrics: bool,
    pub arcs: bool,
}

impl RenderCaps {
    /// Everything the CPU rasterizer offers.
    pub fn full() -> Self {
        Self {
            precise_metrics: true,
            arcs: true,
        }
    }

    /// Coarse metrics, no arc strokes. Matches what a minimal raster
    /// backend can honor; layout degrades accordingly.
    pub fn basic() -> Self {
        Self {
            precise_metrics: false,
            arcs: false,
        }
    }

    pub fn supports_precise_metrics(&self) -> bool {
        self.precise_metrics
    }

    pub fn supports_arc(&self) -> bool {
        self.arcs
    }
}

/// A rendered poster raster.
#[derive(Clone, Debug)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    /// RGBA8, row-major. Premultiplied when the flag says so.
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_caps_enable_everything() {
        let caps = RenderCaps::full();
        assert!(caps.supports_precise_metrics());
        assert!(caps.supports_arc());
    }

    #[test]
    fn basic_caps_disable_everything() {
        let caps = RenderCaps::basic();
        assert!(!caps.supports_precise_metrics());
        assert!(!caps.supports_arc());
    }
}
