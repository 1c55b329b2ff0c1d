//! The alpha key filter and file-level processing built on it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::codec::{ImageCodec, PngCodec};
use crate::config::ThresholdConfig;
use crate::error::{Error, Result};
use crate::keying;
use crate::source::{self, ImageSource};

/// Result of processing a single image file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the processed file.
    pub path: PathBuf,
    /// Where the keyed PNG was written, if anything was written.
    pub output: Option<PathBuf>,
    /// Whether processing succeeded.
    pub success: bool,
    /// Number of pixels made transparent.
    pub keyed_pixels: usize,
    /// Total number of pixels in the image.
    pub total_pixels: usize,
    /// Human-readable status message.
    pub message: String,
}

impl ProcessResult {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            output: None,
            success: false,
            keyed_pixels: 0,
            total_pixels: 0,
            message: String::new(),
        }
    }

    fn failed(path: &Path, message: String) -> Self {
        Self {
            message,
            ..Self::new(path)
        }
    }

    /// Fraction of pixels made transparent, in `[0, 1]`.
    #[must_use]
    pub fn keyed_fraction(&self) -> f64 {
        if self.total_pixels == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            self.keyed_pixels as f64 / self.total_pixels as f64
        }
    }
}

/// Makes near-black backgrounds transparent.
///
/// Holds no per-image state: one filter can be shared by reference across
/// threads and every call owns its own pixel buffer. Either a complete PNG is
/// returned or an error, never a partially keyed image.
#[derive(Debug, Clone)]
pub struct AlphaKeyFilter<C = PngCodec> {
    codec: C,
    config: ThresholdConfig,
}

impl AlphaKeyFilter<PngCodec> {
    /// Create a filter using the default PNG codec.
    #[must_use]
    pub fn new(config: ThresholdConfig) -> Self {
        Self::with_codec(PngCodec::new(), config)
    }
}

impl Default for AlphaKeyFilter<PngCodec> {
    fn default() -> Self {
        Self::new(ThresholdConfig::default())
    }
}

impl<C: ImageCodec> AlphaKeyFilter<C> {
    /// Create a filter with a custom codec.
    #[must_use]
    pub fn with_codec(codec: C, config: ThresholdConfig) -> Self {
        Self { codec, config }
    }

    /// The threshold configuration in use.
    #[must_use]
    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Decode `encoded`, key out its near-black pixels and encode it as PNG.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the input is not a supported image and
    /// [`Error::Encode`] if the result cannot be serialized.
    pub fn apply(&self, encoded: &[u8]) -> Result<Vec<u8>> {
        self.apply_counted(encoded).map(|(png, _)| png)
    }

    /// Key out near-black pixels of an already decoded image in place.
    ///
    /// Returns the number of pixels matched as background.
    pub fn apply_image(&self, image: &mut RgbaImage) -> usize {
        let keyed = keying::key_image(image, self.config.black_threshold());
        log::debug!(
            "keyed {keyed} of {} pixels below threshold {}",
            image.len() / 4,
            self.config.black_threshold()
        );
        keyed
    }

    /// Like [`apply`](Self::apply), for any [`ImageSource`].
    ///
    /// # Errors
    ///
    /// Returns the source's read error, or any error from [`apply`](Self::apply).
    pub fn apply_source(&self, source: &ImageSource<'_>) -> Result<Vec<u8>> {
        let bytes = source.read()?;
        self.apply(&bytes)
    }

    /// Key a data URI and return the result as a PNG data URI.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDataUri`] for a malformed URI, otherwise any
    /// error from [`apply`](Self::apply).
    pub fn apply_data_uri(&self, uri: &str) -> Result<String> {
        let png = self.apply_source(&ImageSource::DataUri(uri))?;
        Ok(source::encode_data_uri(&png))
    }

    /// Key a data URI, falling back to the unmodified input on any error.
    ///
    /// The failure is logged at warn level.
    #[must_use]
    pub fn apply_data_uri_or_original(&self, uri: &str) -> String {
        match self.apply_data_uri(uri) {
            Ok(keyed) => keyed,
            Err(e) => {
                log::warn!("background removal failed, using original image: {e}");
                uri.to_string()
            }
        }
    }

    /// Process a single image file: load, key, save as PNG.
    ///
    /// Failures are reported in the returned [`ProcessResult`].
    #[must_use]
    pub fn process_file(&self, input: &Path, output: &Path) -> ProcessResult {
        let mut result = ProcessResult::new(input);

        if let Err(e) = ensure_png_output(output) {
            result.message = e.to_string();
            return result;
        }

        let bytes = match std::fs::read(input) {
            Ok(b) => b,
            Err(e) => {
                result.message = format!("Failed to load: {e}");
                return result;
            }
        };

        let (png, (keyed, total)) = match self.apply_counted(&bytes) {
            Ok(out) => out,
            Err(e) => {
                result.message = e.to_string();
                return result;
            }
        };
        result.keyed_pixels = keyed;
        result.total_pixels = total;

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    result.message = format!("Failed to create output directory: {e}");
                    return result;
                }
            }
        }

        match std::fs::write(output, png) {
            Ok(()) => {
                result.success = true;
                result.output = Some(output.to_path_buf());
                result.message = format!(
                    "Background removed ({:.1}% transparent)",
                    result.keyed_fraction() * 100.0
                );
            }
            Err(e) => {
                result.message = format!("Failed to save: {e}");
            }
        }

        result
    }

    /// Process all supported images in a directory.
    ///
    /// Each input `name.ext` is written to `output_dir/name.png`. When two
    /// inputs share a stem (`a.jpg`, `a.png`) the first in sorted order keeps
    /// the name and the others fail without writing. Files are processed in
    /// parallel when the `parallel` feature is enabled.
    #[must_use]
    pub fn process_directory(&self, input_dir: &Path, output_dir: &Path) -> Vec<ProcessResult> {
        let mut entries: Vec<PathBuf> = match std::fs::read_dir(input_dir) {
            Ok(rd) => rd
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
                .map(|e| e.path())
                .filter(|p| is_supported_image(p))
                .collect(),
            Err(e) => {
                return vec![ProcessResult::failed(
                    input_dir,
                    format!("Failed to read directory: {e}"),
                )];
            }
        };
        entries.sort();

        if !output_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(output_dir) {
                return vec![ProcessResult::failed(
                    output_dir,
                    format!("Failed to create output directory: {e}"),
                )];
            }
        }

        let jobs = assign_outputs(&entries, output_dir);
        let run = |(input, output): &(PathBuf, std::result::Result<PathBuf, String>)| match output {
            Ok(output) => self.process_file(input, output),
            Err(message) => ProcessResult::failed(input, message.clone()),
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            jobs.par_iter().map(run).collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            jobs.iter().map(run).collect()
        }
    }

    fn apply_counted(&self, encoded: &[u8]) -> Result<(Vec<u8>, (usize, usize))> {
        let mut image = self.codec.decode(encoded)?;
        let total = image.len() / 4;
        let keyed = self.apply_image(&mut image);
        let png = self.codec.encode(&image)?;
        Ok((png, (keyed, total)))
    }
}

/// Key out the near-black background of `encoded` with the default codec.
///
/// # Errors
///
/// Returns [`Error::Decode`] or [`Error::Encode`] as [`AlphaKeyFilter::apply`].
pub fn apply(encoded: &[u8], config: &ThresholdConfig) -> Result<Vec<u8>> {
    AlphaKeyFilter::new(*config).apply(encoded)
}

/// Check if a file has a supported input image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp" | "gif"
        ),
        None => false,
    }
}

/// Generate a default output path from an input path.
///
/// Example: `"shirt.jpg"` becomes `"shirt_keyed.png"`.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_keyed.png"))
}

/// Pair each input with its output path in `output_dir`.
///
/// `entries` must be sorted; an output path already claimed by an earlier
/// entry is reported as an error message for the later one.
fn assign_outputs(
    entries: &[PathBuf],
    output_dir: &Path,
) -> Vec<(PathBuf, std::result::Result<PathBuf, String>)> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    entries
        .iter()
        .map(|input| {
            let output = match input.file_stem() {
                Some(stem) => output_dir.join(format!("{}.png", stem.to_string_lossy())),
                None => return (input.clone(), Err("Missing file name".to_string())),
            };
            let assigned = match claimed.get(&output) {
                Some(owner) => Err(format!(
                    "Output name {} clashes with {}",
                    output.display(),
                    owner.display()
                )),
                None => {
                    claimed.insert(output.clone(), input);
                    Ok(output)
                }
            };
            (input.clone(), assigned)
        })
        .collect()
}

/// Check that `path` names a PNG file, the only format this crate writes.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`] if the extension is missing or not `png`.
pub fn ensure_png_output(path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("png") => Ok(()),
        Some(ext) => Err(Error::UnsupportedFormat(format!(
            "{ext} (output is always PNG)"
        ))),
        None => Err(Error::UnsupportedFormat(
            "missing extension (output is always PNG)".to_string(),
        )),
    }
}
