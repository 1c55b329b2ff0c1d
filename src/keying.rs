//! Per-pixel alpha keying against a near-black background.
//!
//! A pixel is background when `r < t && g < t && b < t` for threshold `t`.
//! Background pixels get alpha 0; every other pixel keeps its alpha as is,
//! so pre-existing transparency survives and alpha never increases. Colour
//! channels are never written.
//!
//! No pixel depends on any other, so a buffer can be split into disjoint
//! row bands and keyed in parallel with nothing shared between workers.

use image::RgbaImage;

/// Bytes per RGBA8 pixel.
const CHANNELS: usize = 4;

/// Minimum pixel count before keying is split across rayon workers.
pub const PARALLEL_MIN_PIXELS: usize = 512 * 512;

/// Approximate number of pixels handed to each parallel worker.
#[cfg(feature = "parallel")]
const BAND_PIXELS: usize = 64 * 1024;

/// Whether an `[r, g, b]` colour is near-black under `threshold`.
///
/// The comparison is strict: a pixel with `r == g == b == threshold` is not
/// background.
#[inline]
#[must_use]
pub fn is_background([r, g, b]: [u8; 3], threshold: u8) -> bool {
    r < threshold && g < threshold && b < threshold
}

/// Key out near-black pixels in a raw RGBA8 buffer.
///
/// `buf` is a row-major run of 4-byte pixels; a trailing partial pixel is
/// ignored. Returns how many pixels matched the background rule.
pub fn key_out_black(buf: &mut [u8], threshold: u8) -> usize {
    let mut keyed = 0;
    for px in buf.chunks_exact_mut(CHANNELS) {
        if is_background([px[0], px[1], px[2]], threshold) {
            px[3] = 0;
            keyed += 1;
        }
    }
    keyed
}

/// Key out near-black pixels of an image in place.
///
/// Large images are processed in row bands on the rayon pool when the
/// `parallel` feature is enabled. The result is identical either way.
/// Returns how many pixels matched the background rule.
pub fn key_image(image: &mut RgbaImage, threshold: u8) -> usize {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        let width = image.width() as usize;
        if width * image.height() as usize >= PARALLEL_MIN_PIXELS {
            let rows_per_band = (BAND_PIXELS / width).max(1);
            let buf: &mut [u8] = &mut *image;
            return buf
                .par_chunks_mut(rows_per_band * width * CHANNELS)
                .map(|band| key_out_black(band, threshold))
                .sum();
        }
    }

    key_out_black(image, threshold)
}
