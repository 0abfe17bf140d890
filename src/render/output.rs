use std::path::Path;

use crate::{
    foundation::error::{PosterError, PosterResult},
    render::Bitmap,
};

/// Write a rendered poster as an RGB8 PNG, creating missing parent
/// directories. An unwritable path is fatal for this call; nothing is
/// retried and no partial output is left behind.
pub fn save_png(bitmap: &Bitmap, path: &Path) -> PosterResult<()> {
    let expected = bitmap.width as usize * bitmap.height as usize * 4;
    if bitmap.data.len() != expected {
        return Err(PosterError::render(
            "bitmap data size mismatch with width*height*4",
        ));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            PosterError::render(format!("create output dir '{}': {e}", parent.display()))
        })?;
    }

    let rgb = flatten_to_rgb8(&bitmap.data, bitmap.premultiplied);
    image::save_buffer_with_format(
        path,
        &rgb,
        bitmap.width,
        bitmap.height,
        image::ColorType::Rgb8,
        image::ImageFormat::Png,
    )
    .map_err(|e| PosterError::render(format!("write png '{}': {e}", path.display())))?;
    Ok(())
}

/// Composite RGBA8 over opaque black and drop the alpha channel. Rendered
/// posters are fully opaque, so this is normally a plain channel copy; the
/// translucent arms only matter for hand-built bitmaps.
fn flatten_to_rgb8(data: &[u8], premultiplied: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() / 4 * 3);
    for px in data.chunks_exact(4) {
        let a = u16::from(px[3]);
        if a == 255 {
            out.extend_from_slice(&px[..3]);
            continue;
        }
        let channel = |c: u8| -> u8 {
            let c = u16::from(c);
            let v = if premultiplied { c } else { mul_div255(c, a) };
            v.min(255) as u8
        };
        out.extend_from_slice(&[channel(px[0]), channel(px[1]), channel(px[2])]);
    }
    out
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}
