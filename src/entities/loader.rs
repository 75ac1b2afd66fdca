//! Image loading on top of the `image` crate.
//!
//! - `dimensions()`: header-only native size (EXIF orientation applied)
//! - `decode_scaled()`: full decode + aspect-correct scale to an exact target
//! - `animation_frames()` / `is_animated()`: GIF, animated WebP, APNG
//!
//! Everything here is thread-agnostic; `decode_scaled` runs on decode workers,
//! the animation helpers on the presentation thread.

use image::codecs::gif::GifDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{AnimationDecoder, DynamicImage, ImageDecoder, ImageFormat, ImageReader, RgbaImage};
use log::debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use super::geometry::Size;

/// Animated frames shorter than this play at this duration (browser behaviour).
pub const MIN_FRAME_DELAY: Duration = Duration::from_millis(20);

/// Image loading errors
#[derive(Debug)]
pub enum LoadError {
    Io(String),
    Image(String),
    UnsupportedFormat(String),
    /// Target size has a zero side.
    EmptyTarget,
    /// Source has a single frame (or no animation support).
    NotAnimated,
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "I/O error: {}", e),
            LoadError::Image(e) => write!(f, "Image error: {}", e),
            LoadError::UnsupportedFormat(e) => write!(f, "Unsupported format: {}", e),
            LoadError::EmptyTarget => write!(f, "Empty target size"),
            LoadError::NotAnimated => write!(f, "Not an animated image"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e.to_string())
    }
}

impl From<image::ImageError> for LoadError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::Unsupported(u) => LoadError::UnsupportedFormat(u.to_string()),
            image::ImageError::IoError(io) => LoadError::Io(io.to_string()),
            other => LoadError::Image(other.to_string()),
        }
    }
}

/// One frame of an animated image, already scaled for display.
#[derive(Debug, Clone)]
pub struct AnimationFrame {
    pub image: RgbaImage,
    pub delay: Duration,
}

/// Image loader (stateless)
pub struct Loader;

impl Loader {
    /// Read the native pixel size without decoding pixel data.
    ///
    /// Orientations that rotate by 90/270 degrees swap width and height so the
    /// size matches what `decode_scaled` will produce.
    pub fn dimensions(path: &Path) -> Result<Size, LoadError> {
        let mut decoder = ImageReader::open(path)?.with_guessed_format()?.into_decoder()?;
        let (width, height) = decoder.dimensions();
        let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
        let size = if swaps_axes(orientation) {
            Size::new(height, width)
        } else {
            Size::new(width, height)
        };
        debug!("Header {}: {}x{} ({:?})", path.display(), size.width, size.height, orientation);
        Ok(size)
    }

    /// Decode and scale to exactly `target`.
    ///
    /// The `image` decoders have no native scaled decoding, so this decodes at
    /// full size, fits into `target` keeping aspect, and force-resizes if the
    /// fitted result is still off by rounding.
    pub fn decode_scaled(path: &Path, target: Size) -> Result<RgbaImage, LoadError> {
        if target.is_empty() {
            return Err(LoadError::EmptyTarget);
        }

        let mut decoder = ImageReader::open(path)?.with_guessed_format()?.into_decoder()?;
        let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
        let mut img = DynamicImage::from_decoder(decoder)?;
        img.apply_orientation(orientation);

        let fitted = img.resize(target.width, target.height, FilterType::Triangle);
        if fitted.width() == target.width && fitted.height() == target.height {
            return Ok(fitted.into_rgba8());
        }
        Ok(image::imageops::resize(
            &fitted.into_rgba8(),
            target.width,
            target.height,
            FilterType::CatmullRom,
        ))
    }

    /// Full-size decode (standard single-image view).
    pub fn decode(path: &Path) -> Result<RgbaImage, LoadError> {
        let mut decoder = ImageReader::open(path)?.with_guessed_format()?.into_decoder()?;
        let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
        let mut img = DynamicImage::from_decoder(decoder)?;
        img.apply_orientation(orientation);
        Ok(img.into_rgba8())
    }

    /// True for multi-frame GIF, animated WebP, and APNG with more than one frame.
    ///
    /// Any read error counts as "not animated"; the static path will report it.
    pub fn is_animated(path: &Path) -> bool {
        let Ok(Some(format)) = detect_format(path) else {
            return false;
        };
        let Ok(file) = File::open(path) else {
            return false;
        };
        let reader = BufReader::new(file);

        match format {
            ImageFormat::Gif => GifDecoder::new(reader)
                .map(|d| d.into_frames().take(2).filter(Result::is_ok).count() > 1)
                .unwrap_or(false),
            ImageFormat::WebP => WebPDecoder::new(reader)
                .map(|d| d.has_animation())
                .unwrap_or(false),
            ImageFormat::Png => {
                let Ok(decoder) = PngDecoder::new(reader) else {
                    return false;
                };
                if !decoder.is_apng().unwrap_or(false) {
                    return false;
                }
                decoder
                    .apng()
                    .map(|d| d.into_frames().take(2).filter(Result::is_ok).count() > 1)
                    .unwrap_or(false)
            }
            _ => false,
        }
    }

    /// Decode every frame and scale it to exactly `target`.
    pub fn animation_frames(path: &Path, target: Size) -> Result<Vec<AnimationFrame>, LoadError> {
        if target.is_empty() {
            return Err(LoadError::EmptyTarget);
        }
        let format = detect_format(path)?
            .ok_or_else(|| LoadError::UnsupportedFormat(path.display().to_string()))?;
        let reader = BufReader::new(File::open(path)?);

        let frames = match format {
            ImageFormat::Gif => GifDecoder::new(reader)?.into_frames().collect_frames()?,
            ImageFormat::WebP => WebPDecoder::new(reader)?.into_frames().collect_frames()?,
            ImageFormat::Png => PngDecoder::new(reader)?.apng()?.into_frames().collect_frames()?,
            _ => return Err(LoadError::NotAnimated),
        };
        if frames.len() < 2 {
            return Err(LoadError::NotAnimated);
        }

        debug!("Animation {}: {} frames -> {}x{}", path.display(), frames.len(), target.width, target.height);

        Ok(frames
            .into_iter()
            .map(|frame| {
                let (num, denom) = frame.delay().numer_denom_ms();
                let delay = if denom == 0 {
                    MIN_FRAME_DELAY
                } else {
                    Duration::from_millis(u64::from(num) / u64::from(denom)).max(MIN_FRAME_DELAY)
                };
                let buffer = frame.into_buffer();
                let image = if buffer.dimensions() == (target.width, target.height) {
                    buffer
                } else {
                    image::imageops::resize(&buffer, target.width, target.height, FilterType::Triangle)
                };
                AnimationFrame { image, delay }
            })
            .collect())
    }
}

fn detect_format(path: &Path) -> Result<Option<ImageFormat>, LoadError> {
    Ok(ImageReader::open(path)?.with_guessed_format()?.format())
}

fn swaps_axes(orientation: Orientation) -> bool {
    matches!(
        orientation,
        Orientation::Rotate90
            | Orientation::Rotate270
            | Orientation::Rotate90FlipH
            | Orientation::Rotate270FlipH
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifEncoder;
    use image::{Delay, Frame, Rgba};

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> std::path::PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(w, h, Rgba([200, 10, 10, 255])).save(&path).unwrap();
        path
    }

    fn write_gif(dir: &Path, name: &str, frames: usize) -> std::path::PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        let mut encoder = GifEncoder::new(file);
        for i in 0..frames {
            let shade = (i * 60) as u8;
            let buffer = RgbaImage::from_pixel(8, 4, Rgba([shade, shade, 0, 255]));
            encoder
                .encode_frame(Frame::from_parts(buffer, 0, 0, Delay::from_numer_denom_ms(100, 1)))
                .unwrap();
        }
        drop(encoder);
        path
    }

    #[test]
    fn test_dimensions_reads_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", 320, 200);
        assert_eq!(Loader::dimensions(&path).unwrap(), Size::new(320, 200));
    }

    #[test]
    fn test_dimensions_missing_file() {
        assert!(matches!(
            Loader::dimensions(Path::new("/nonexistent/strip/a.png")),
            Err(LoadError::Io(_))
        ));
    }

    #[test]
    fn test_decode_scaled_hits_exact_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", 333, 200);
        // 333 * 0.5 = 166.5 -> layout rounds to 167; aspect fit alone gives 166 or 167
        let img = Loader::decode_scaled(&path, Size::new(167, 100)).unwrap();
        assert_eq!(img.dimensions(), (167, 100));
    }

    #[test]
    fn test_decode_scaled_rejects_empty_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", 10, 10);
        assert!(matches!(
            Loader::decode_scaled(&path, Size::new(0, 10)),
            Err(LoadError::EmptyTarget)
        ));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        assert!(Loader::decode_scaled(&path, Size::new(10, 10)).is_err());
    }

    #[test]
    fn test_animation_detection() {
        let dir = tempfile::tempdir().unwrap();
        let animated = write_gif(dir.path(), "anim.gif", 3);
        let still = write_gif(dir.path(), "still.gif", 1);
        let png = write_png(dir.path(), "p.png", 4, 4);

        assert!(Loader::is_animated(&animated));
        assert!(!Loader::is_animated(&still));
        assert!(!Loader::is_animated(&png));
    }

    #[test]
    fn test_animation_frames_scaled() {
        let dir = tempfile::tempdir().unwrap();
        let animated = write_gif(dir.path(), "anim.gif", 3);

        let frames = Loader::animation_frames(&animated, Size::new(16, 8)).unwrap();
        assert_eq!(frames.len(), 3);
        for frame in &frames {
            assert_eq!(frame.image.dimensions(), (16, 8));
            assert_eq!(frame.delay, Duration::from_millis(100));
        }

        let still = write_gif(dir.path(), "still.gif", 1);
        assert!(matches!(
            Loader::animation_frames(&still, Size::new(16, 8)),
            Err(LoadError::NotAnimated)
        ));
    }
}
