//! Pure Rust filter backend built on the `image` crate.
//!
//! Everything is statically linked into the binary.
//!
//! ## Operation mapping
//!
//! | Filter | Implementation |
//! |---|---|
//! | grayscale | `DynamicImage::grayscale` (alpha kept) |
//! | invert | `DynamicImage::invert` (alpha kept) |
//! | sepia, posterize, solarize, autocontrast | per-pixel passes in [`kernels`](super::kernels) |
//! | blur | `DynamicImage::blur` (Gaussian) |
//! | sharpen, find_edges, contour, emboss | 3×3 [`kernels::convolve`](super::kernels::convolve) |
//! | mirror | `DynamicImage::fliph` |
//! | rotate90 | `DynamicImage::rotate270` (a quarter turn counter-clockwise) |
//!
//! ## Output formats
//!
//! The encoder is picked from the output extension: JPEG (lossy, alpha
//! dropped), PNG, TIFF, and lossless WebP.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::kernels;
use super::params::{FilterParams, FilterRequest};
use crate::catalog::FilterKind;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use std::borrow::Cow;
use std::path::Path;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate.
///
/// See the [module docs](self) for the filter-to-function mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    if !path.is_file() {
        return Err(BackendError::SourceNotFound(path.to_path_buf()));
    }
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| BackendError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Apply one filter to a decoded image.
pub fn filter_image(img: DynamicImage, kind: FilterKind, params: &FilterParams) -> DynamicImage {
    match kind {
        FilterKind::Grayscale => img.grayscale(),
        FilterKind::Invert => {
            let mut img = img;
            img.invert();
            img
        }
        FilterKind::Sepia => {
            map_rgba(img, |buf| kernels::sepia(buf, params.sepia_intensity))
        }
        FilterKind::Posterize => {
            map_rgba(img, |buf| kernels::posterize(buf, params.posterize_bits))
        }
        FilterKind::Solarize => {
            map_rgba(img, |buf| kernels::solarize(buf, params.solarize_threshold))
        }
        FilterKind::Autocontrast => map_rgba(img, kernels::autocontrast),
        FilterKind::Blur => img.blur(params.blur_sigma),
        FilterKind::Sharpen => convolve(img, &kernels::SHARPEN),
        FilterKind::FindEdges => convolve(img, &kernels::FIND_EDGES),
        FilterKind::Contour => convolve(img, &kernels::CONTOUR),
        FilterKind::Emboss => convolve(img, &kernels::EMBOSS),
        FilterKind::Mirror => img.fliph(),
        FilterKind::Rotate90 => img.rotate270(),
    }
}

/// Run an in-place RGBA pass, then drop the alpha channel again if the
/// source never had one.
fn map_rgba(img: DynamicImage, pass: impl FnOnce(&mut RgbaImage)) -> DynamicImage {
    let had_alpha = img.color().has_alpha();
    let mut buf = img.into_rgba8();
    pass(&mut buf);
    restore_alpha(buf, had_alpha)
}

fn convolve(img: DynamicImage, kernel: &kernels::Kernel3) -> DynamicImage {
    let had_alpha = img.color().has_alpha();
    let out = kernels::convolve(&img.into_rgba8(), kernel);
    restore_alpha(out, had_alpha)
}

fn restore_alpha(buf: RgbaImage, had_alpha: bool) -> DynamicImage {
    let img = DynamicImage::ImageRgba8(buf);
    if had_alpha {
        img
    } else {
        DynamicImage::ImageRgb8(img.into_rgb8())
    }
}

/// JPEG has no alpha and no 16-bit support.
fn jpeg_compatible(img: &DynamicImage) -> Cow<'_, DynamicImage> {
    match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => Cow::Borrowed(img),
        DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_) => Cow::Owned(DynamicImage::ImageLuma8(img.to_luma8())),
        _ => Cow::Owned(DynamicImage::ImageRgb8(img.to_rgb8())),
    }
}

/// The WebP encoder only takes 8-bit buffers.
fn webp_compatible(img: &DynamicImage) -> Cow<'_, DynamicImage> {
    match img {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_) => Cow::Borrowed(img),
        _ if img.color().has_alpha() => Cow::Owned(DynamicImage::ImageRgba8(img.to_rgba8())),
        _ => Cow::Owned(DynamicImage::ImageRgb8(img.to_rgb8())),
    }
}

/// Save a DynamicImage to the given path, inferring format from extension.
fn save_image(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let encode_err = |e: image::ImageError| BackendError::Encode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    match ext.as_str() {
        "jpg" | "jpeg" => {
            let file = std::fs::File::create(path)?;
            let writer = std::io::BufWriter::new(file);
            let encoder = JpegEncoder::new_with_quality(writer, quality.clamp(1, 100) as u8);
            jpeg_compatible(img)
                .write_with_encoder(encoder)
                .map_err(encode_err)
        }
        "png" => img
            .save_with_format(path, ImageFormat::Png)
            .map_err(encode_err),
        "tif" | "tiff" => img
            .save_with_format(path, ImageFormat::Tiff)
            .map_err(encode_err),
        "webp" => webp_compatible(img)
            .save_with_format(path, ImageFormat::WebP)
            .map_err(encode_err),
        other => Err(BackendError::UnsupportedFormat(other.to_string())),
    }
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        if !path.is_file() {
            return Err(BackendError::SourceNotFound(path.to_path_buf()));
        }
        let (width, height) = image::image_dimensions(path).map_err(|e| BackendError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Dimensions { width, height })
    }

    fn apply(&self, request: &FilterRequest) -> Result<(), BackendError> {
        log::debug!(
            "applying {} to {} -> {}",
            request.kind,
            request.source.display(),
            request.output.display()
        );
        let img = load_image(&request.source)?;
        let filtered = filter_image(img, request.kind, &request.params);
        save_image(&filtered, &request.output, request.params.quality.value())
    }
}
