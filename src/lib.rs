//! Turn near-black image backgrounds into real transparency.
//!
//! Generated product art is often rendered on a pure black background. This
//! crate decodes such an image, sets alpha to 0 on every pixel whose red,
//! green and blue values are all below a threshold, and re-encodes it as PNG
//! so it can be composited onto anything. Colour channels are never changed
//! and alpha is never raised, so keying an already keyed image is a no-op.
//!
//! # Quick Start
//!
//! ```no_run
//! use alpha_key::{AlphaKeyFilter, ThresholdConfig};
//!
//! let filter = AlphaKeyFilter::new(ThresholdConfig::default());
//! let input = std::fs::read("shirt.jpg").unwrap();
//! let png = filter.apply(&input).expect("background removal failed");
//! std::fs::write("shirt_keyed.png", png).unwrap();
//! ```
//!
//! # Data URIs
//!
//! Browser-facing callers pass images around as `data:` URIs. A failed
//! removal should never break the page, so the fallback variant hands back
//! the original image instead of an error.
//!
//! ```no_run
//! use alpha_key::{AlphaKeyFilter, ThresholdConfig};
//!
//! let filter = AlphaKeyFilter::new(ThresholdConfig::new(20).unwrap());
//! # let generated = String::new();
//! let shown = filter.apply_data_uri_or_original(&generated);
//! ```

#![deny(missing_docs)]

pub mod codec;
pub mod config;
pub mod error;
mod filter;
pub mod keying;
pub mod source;

pub use codec::{ImageCodec, PngCodec};
pub use config::{ThresholdConfig, DEFAULT_BLACK_THRESHOLD};
pub use error::{Error, Result};
pub use filter::{
    apply, default_output_path, ensure_png_output, is_supported_image, AlphaKeyFilter,
    ProcessResult,
};
pub use source::ImageSource;
