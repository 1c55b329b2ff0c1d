//! Pluggable image codec used by the filter.
//!
//! The filter only ever sees raw RGBA8 pixels; turning bytes into pixels and
//! back is delegated to an [`ImageCodec`]. [`PngCodec`] is the default and is
//! backed by the `image` crate.

use std::io::Cursor;

use image::error::{LimitError, LimitErrorKind};
use image::{ImageError, ImageFormat, ImageReader, Limits, RgbaImage};

use crate::error::{Error, Result};

/// Decodes encoded bytes to RGBA8 pixels and encodes them back.
pub trait ImageCodec: Send + Sync {
    /// Decode `bytes` into a non-premultiplied RGBA8 image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the bytes are not a supported image.
    fn decode(&self, bytes: &[u8]) -> Result<RgbaImage>;

    /// Encode `image` into a format that keeps its alpha channel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if the pixels cannot be serialized.
    fn encode(&self, image: &RgbaImage) -> Result<Vec<u8>>;
}

/// Default codec: sniffs any format the `image` crate was built with on the
/// way in and always writes PNG on the way out.
#[derive(Debug, Clone, Default)]
pub struct PngCodec {
    limits: Option<Limits>,
}

impl PngCodec {
    /// Create a codec with the `image` crate's default decoding limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec that rejects inputs exceeding `limits` while decoding.
    #[must_use]
    pub fn with_limits(limits: Limits) -> Self {
        Self {
            limits: Some(limits),
        }
    }
}

impl ImageCodec for PngCodec {
    fn decode(&self, bytes: &[u8]) -> Result<RgbaImage> {
        let mut reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| Error::Decode(ImageError::IoError(e)))?;
        if let Some(limits) = &self.limits {
            reader.limits(limits.clone());
        }

        let format = reader.format();
        let decoded = reader.decode().map_err(Error::Decode)?;
        log::debug!(
            "decoded {format:?} image {}x{} ({:?})",
            decoded.width(),
            decoded.height(),
            decoded.color()
        );

        Ok(decoded.into_rgba8())
    }

    fn encode(&self, image: &RgbaImage) -> Result<Vec<u8>> {
        if image.width() == 0 || image.height() == 0 {
            return Err(Error::Encode(ImageError::Limits(LimitError::from_kind(
                LimitErrorKind::DimensionError,
            ))));
        }

        let mut out = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .map_err(Error::Encode)?;
        Ok(out)
    }
}
