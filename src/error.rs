//! Error types for the alpha-key crate.

/// Errors that can occur while keying out an image background.
///
/// Every variant is recoverable: callers are expected to log it and fall back
/// to the unprocessed image if they have one.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input bytes are not a recognized or valid image encoding.
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// The keyed pixel buffer could not be serialized to PNG.
    #[error("failed to encode PNG: {0}")]
    Encode(#[source] image::ImageError),

    /// The black threshold is outside `0..=255`.
    #[error("invalid black threshold {threshold}: must be between 0 and 255")]
    InvalidConfig {
        /// The rejected threshold value.
        threshold: i32,
    },

    /// A `data:` URI could not be turned into image bytes.
    #[error("invalid data URI: {0}")]
    InvalidDataUri(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested output format cannot carry an alpha channel.
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let io_err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io_err.to_string().contains("gone"));

        let config = Error::InvalidConfig { threshold: 256 };
        assert!(config.to_string().contains("256"));

        let uri = Error::InvalidDataUri("missing comma".to_string());
        assert!(uri.to_string().contains("missing comma"));

        let unsupported = Error::UnsupportedFormat("jpg".to_string());
        assert!(unsupported.to_string().contains("jpg"));
    }

    #[test]
    fn decode_error_keeps_decoder_diagnostic_as_source() {
        let inner = image::load_from_memory(b"not an image").unwrap_err();
        let inner_msg = inner.to_string();
        let err = Error::Decode(inner);

        let source = std::error::Error::source(&err).expect("decode error has a source");
        assert_eq!(source.to_string(), inner_msg);
        assert!(err.to_string().contains(&inner_msg));
    }
}
