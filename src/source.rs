//! Input normalisation and data URI helpers.
//!
//! Images reach the filter as a file path, an in-memory blob or a
//! `data:image/<fmt>;base64,<payload>` string. All three are reduced to a
//! byte slice before decoding.

use std::borrow::Cow;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{Error, Result};

/// Prefix of every data URI produced by this crate.
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Where an encoded image comes from.
#[derive(Debug, Clone, Copy)]
pub enum ImageSource<'a> {
    /// An image file on disk.
    Path(&'a Path),
    /// Encoded image bytes already in memory.
    Bytes(&'a [u8]),
    /// A base64 `data:` URI.
    DataUri(&'a str),
}

impl<'a> ImageSource<'a> {
    /// Interpret a command-line style argument: `data:` URIs are taken as
    /// such, anything else is a path.
    #[must_use]
    pub fn from_arg(arg: &'a str) -> Self {
        if is_data_uri(arg) {
            Self::DataUri(arg)
        } else {
            Self::Path(Path::new(arg))
        }
    }

    /// Read the encoded bytes. Blobs are borrowed, everything else is loaded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if a path cannot be read, or
    /// [`Error::InvalidDataUri`] if a data URI is malformed.
    pub fn read(&self) -> Result<Cow<'a, [u8]>> {
        match *self {
            Self::Path(path) => Ok(Cow::Owned(std::fs::read(path)?)),
            Self::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
            Self::DataUri(uri) => decode_data_uri(uri).map(Cow::Owned),
        }
    }
}

/// Check whether `s` starts with the `data:` scheme (case-insensitive).
#[must_use]
pub fn is_data_uri(s: &str) -> bool {
    s.get(..5).is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

/// Decode the payload of a base64 data URI.
///
/// ASCII whitespace inside the payload is skipped, so line-wrapped URIs are
/// accepted. The media type is not checked; the image decoder sniffs the
/// actual format from the bytes.
///
/// # Errors
///
/// Returns [`Error::InvalidDataUri`] if the scheme, the `,` separator or the
/// `;base64` marker is missing, or if the payload is not valid base64.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    if !is_data_uri(uri) {
        return Err(Error::InvalidDataUri("missing `data:` scheme".to_string()));
    }

    let (meta, payload) = uri[5..]
        .split_once(',')
        .ok_or_else(|| Error::InvalidDataUri("missing `,` before payload".to_string()))?;

    let base64 = meta
        .rsplit(';')
        .next()
        .is_some_and(|param| param.eq_ignore_ascii_case("base64"));
    if !base64 {
        return Err(Error::InvalidDataUri(format!(
            "expected a base64 payload, got `{meta}`"
        )));
    }

    let compact: Vec<u8> = payload
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(compact)
        .map_err(|e| Error::InvalidDataUri(format!("bad base64 payload: {e}")))
}

/// Wrap PNG bytes in a `data:image/png;base64,` URI.
#[must_use]
pub fn encode_data_uri(png: &[u8]) -> String {
    let mut uri = String::with_capacity(PNG_DATA_URI_PREFIX.len() + png.len().div_ceil(3) * 4);
    uri.push_str(PNG_DATA_URI_PREFIX);
    STANDARD.encode_string(png, &mut uri);
    uri
}
