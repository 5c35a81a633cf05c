//! RGB565 image codec
//!
//! Cover art and save-state screenshots are decoded into packed RGB565
//! pixels, the native format of the launcher display. Two on-disk formats
//! are understood, detected by sniffing the leading bytes:
//!
//! ```text
//! PNG     any PNG the decoder accepts, converted to RGB565 by truncation
//! RAW565  [u16 width LE][u16 height LE][width*height u16 pixels LE]
//! ```
//!
//! Some RAW565 producers write files that are slightly off the exact size,
//! so the container is accepted when its length is within
//! [`RAW565_SIZE_TOLERANCE`] bytes of `4 + width * height * 2`.
//!
//! Images are transient: decode one, blit it, drop it. Nothing here caches.

use std::io;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat};
use thiserror::Error;
use tracing::{debug, error};

use crate::hal::FileSystem;

// ============================================================================
// Format Constants
// ============================================================================

/// Largest file `load_from_file` will read, regardless of its actual size
pub const MAX_FILE_SIZE: usize = 0x80000;

/// Smallest buffer `decode` will look at
pub const MIN_DATA_LEN: usize = 16;

/// RAW565 header: width and height as little-endian u16
pub const RAW565_HEADER_LEN: usize = 4;

/// Allowed difference between a RAW565 file's length and its exact size
pub const RAW565_SIZE_TOLERANCE: usize = 100;

const PNG_MAGIC: &[u8; 4] = b"\x89PNG";
const GIF_MAGIC: &[u8; 4] = b"GIF8";

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image data too short: {len} bytes (min {MIN_DATA_LEN})")]
    TooShort { len: usize },

    #[error("image format not recognized")]
    Unrecognized,

    #[error("unsupported image format: {0}")]
    Unsupported(&'static str),

    #[error("PNG codec error: {0}")]
    Png(#[from] image::ImageError),

    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("image alloc failed ({width}x{height})")]
    OutOfMemory { width: u32, height: u32 },

    #[error("unable to access image file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

// ============================================================================
// Image
// ============================================================================

/// A decoded RGB565 image, row-major, exclusively owned by its decoder's caller
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<u16>,
}

impl Image {
    /// Allocate a black image.
    ///
    /// Allocation failure is reported as an error rather than aborting.
    pub fn alloc(width: u32, height: u32) -> Result<Self, ImageError> {
        let len = pixel_count(width, height)?;

        let mut pixels = Vec::new();
        if pixels.try_reserve_exact(len).is_err() {
            error!("Image alloc failed ({}x{})", width, height);
            return Err(ImageError::OutOfMemory { width, height });
        }
        pixels.resize(len, 0);

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Wrap an existing pixel buffer. Its length must be exactly `width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u16>) -> Result<Self, ImageError> {
        if pixels.len() != pixel_count(width, height)? {
            return Err(ImageError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    /// Size of the pixel buffer in bytes
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.pixels.len() * 2
    }

    /// Pixel at (x, y), or `None` outside the image
    pub fn pixel(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}

impl core::fmt::Debug for Image {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

fn pixel_count(width: u32, height: u32) -> Result<usize, ImageError> {
    if width == 0 || height == 0 {
        return Err(ImageError::InvalidDimensions { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .filter(|count| count.checked_mul(2).is_some())
        .ok_or(ImageError::InvalidDimensions { width, height })
}

// ============================================================================
// Pixel Conversion
// ============================================================================

/// Pack 8-bit RGB into RGB565 by dropping the low bits (no rounding)
#[inline]
pub const fn rgb888_to_565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3)
}

/// Widen RGB565 back to 8 bits per channel by left shift only
#[inline]
pub const fn rgb565_to_888(pixel: u16) -> [u8; 3] {
    [
        (((pixel >> 11) & 0x1F) << 3) as u8,
        (((pixel >> 5) & 0x3F) << 2) as u8,
        ((pixel & 0x1F) << 3) as u8,
    ]
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode PNG or RAW565 data into an RGB565 image
pub fn decode(data: &[u8]) -> Result<Image, ImageError> {
    if data.len() < MIN_DATA_LEN {
        return Err(ImageError::TooShort { len: data.len() });
    }

    if data.starts_with(PNG_MAGIC) {
        decode_png(data).inspect_err(|err| error!("PNG parsing failed: {}", err))
    } else if data.starts_with(GIF_MAGIC) {
        Err(ImageError::Unsupported("GIF"))
    } else {
        decode_raw565(data).inspect_err(|_| error!("Image format not recognized!"))
    }
}

fn decode_png(data: &[u8]) -> Result<Image, ImageError> {
    let rgb = image::load_from_memory_with_format(data, ImageFormat::Png)?.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut img = Image::alloc(width, height)?;
    for (dst, src) in img.pixels.iter_mut().zip(rgb.pixels()) {
        let [r, g, b] = src.0;
        *dst = rgb888_to_565(r, g, b);
    }

    debug!("Decoded PNG {}x{}", width, height);
    Ok(img)
}

fn decode_raw565(data: &[u8]) -> Result<Image, ImageError> {
    let width = u16::from_le_bytes([data[0], data[1]]) as u32;
    let height = u16::from_le_bytes([data[2], data[3]]) as u32;

    let expected = RAW565_HEADER_LEN + width as usize * height as usize * 2;
    if expected.abs_diff(data.len()) > RAW565_SIZE_TOLERANCE {
        return Err(ImageError::Unrecognized);
    }

    let mut img = Image::alloc(width, height)?;

    // Short files leave the tail black, padded files have the excess ignored
    let payload = &data[RAW565_HEADER_LEN..];
    for (dst, src) in img.pixels.iter_mut().zip(payload.chunks_exact(2)) {
        *dst = u16::from_le_bytes([src[0], src[1]]);
    }

    debug!("Decoded RAW565 {}x{}", width, height);
    Ok(img)
}

/// Read at most [`MAX_FILE_SIZE`] bytes of `path` and decode them.
///
/// The read buffer is released before returning, whether or not decoding
/// succeeded.
pub fn load_from_file<F: FileSystem + ?Sized>(fs: &F, path: &str) -> Result<Image, ImageError> {
    let data = fs.read_bounded(path, MAX_FILE_SIZE).map_err(|source| {
        error!("Unable to load image file '{}'!", path);
        ImageError::Io {
            path: path.to_owned(),
            source,
        }
    })?;

    decode(&data)
}

// ============================================================================
// Encoding
// ============================================================================

/// Encode as a 24-bit PNG. Lossy: the low channel bits come back as zero.
pub fn encode(img: &Image) -> Result<Vec<u8>, ImageError> {
    let mut rgb = Vec::with_capacity(img.pixels.len() * 3);
    for &pixel in &img.pixels {
        rgb.extend_from_slice(&rgb565_to_888(pixel));
    }

    let mut out = Vec::new();
    PngEncoder::new(&mut out).write_image(&rgb, img.width, img.height, ExtendedColorType::Rgb8)?;
    Ok(out)
}

/// Encode as an exact-size RAW565 container
pub fn encode_raw565(img: &Image) -> Result<Vec<u8>, ImageError> {
    let (Ok(width), Ok(height)) = (u16::try_from(img.width), u16::try_from(img.height)) else {
        return Err(ImageError::InvalidDimensions {
            width: img.width,
            height: img.height,
        });
    };

    let mut out = Vec::with_capacity(RAW565_HEADER_LEN + img.byte_len());
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    for &pixel in &img.pixels {
        out.extend_from_slice(&pixel.to_le_bytes());
    }
    Ok(out)
}

/// Encode as PNG and write the result to `path`
pub fn save_png<F: FileSystem + ?Sized>(fs: &F, path: &str, img: &Image) -> Result<(), ImageError> {
    let data = encode(img)?;
    fs.write(path, &data).map_err(|source| {
        error!("Unable to save image file '{}'!", path);
        ImageError::Io {
            path: path.to_owned(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::StdFileSystem;

    fn raw565(width: u16, height: u16, extra: isize) -> (Vec<u8>, Vec<u16>) {
        let pixels: Vec<u16> = (0..width as u32 * height as u32)
            .map(|i| (i as u16).wrapping_mul(0x0821))
            .collect();
        let mut data = Vec::new();
        data.extend_from_slice(&width.to_le_bytes());
        data.extend_from_slice(&height.to_le_bytes());
        for pixel in &pixels {
            data.extend_from_slice(&pixel.to_le_bytes());
        }
        if extra >= 0 {
            data.resize(data.len() + extra as usize, 0xAA);
        } else {
            data.truncate(data.len() - extra.unsigned_abs());
        }
        (data, pixels)
    }

    fn png_rgb(width: u32, height: u32, rgb: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(rgb, width, height, ExtendedColorType::Rgb8)
            .unwrap();
        out
    }

    #[test]
    fn test_raw565_exact() {
        let (data, pixels) = raw565(16, 8, 0);
        let img = decode(&data).unwrap();
        assert_eq!((img.width(), img.height()), (16, 8));
        assert_eq!(img.pixels(), &pixels[..]);
        assert_eq!(img.byte_len(), 16 * 8 * 2);
    }

    #[test]
    fn test_raw565_trailing_padding() {
        let (exact, _) = raw565(10, 10, 0);
        let reference = decode(&exact).unwrap();

        let (padded, _) = raw565(10, 10, 100);
        assert_eq!(decode(&padded).unwrap(), reference);

        let (too_long, _) = raw565(10, 10, 101);
        assert!(matches!(decode(&too_long), Err(ImageError::Unrecognized)));
    }

    #[test]
    fn test_raw565_short_payload() {
        let (short, pixels) = raw565(10, 10, -100);
        let img = decode(&short).unwrap();
        assert_eq!(&img.pixels()[..50], &pixels[..50]);
        assert!(img.pixels()[50..].iter().all(|&p| p == 0));

        let (too_short, _) = raw565(10, 10, -101);
        assert!(decode(&too_short).is_err());
    }

    #[test]
    fn test_rejects_tiny_and_empty() {
        assert!(matches!(decode(&[0u8; 15]), Err(ImageError::TooShort { len: 15 })));
        let mut zero_width = vec![0u8; 20];
        zero_width[2] = 4;
        assert!(decode(&zero_width).is_err());
    }

    #[test]
    fn test_rejects_gif() {
        let mut gif = b"GIF89a".to_vec();
        gif.resize(64, 0);
        assert!(matches!(decode(&gif), Err(ImageError::Unsupported("GIF"))));
    }

    #[test]
    fn test_png_truncates_to_565() {
        let rgb = [
            0xFF, 0xFF, 0xFF, //
            0x87, 0x43, 0x21, //
            0x00, 0x00, 0x00, //
            0x07, 0x03, 0x07, //
        ];
        let img = decode(&png_rgb(2, 2, &rgb)).unwrap();
        assert_eq!((img.width(), img.height()), (2, 2));
        assert_eq!(img.pixels(), &[0xFFFF, 0x8204, 0x0000, 0x0000]);
        assert_eq!(img.pixel(1, 0), Some(0x8204));
        assert_eq!(img.pixel(2, 0), None);
    }

    #[test]
    fn test_encode_preserves_dimensions() {
        let rgb: Vec<u8> = (0..7 * 3 * 3).map(|i| (i * 11) as u8).collect();
        let img = decode(&png_rgb(7, 3, &rgb)).unwrap();

        let encoded = encode(&img).unwrap();
        let again = decode(&encoded).unwrap();
        assert_eq!((again.width(), again.height()), (7, 3));
        assert_eq!(again.pixels(), img.pixels());
    }

    #[test]
    fn test_encode_widens_by_shift() {
        assert_eq!(rgb565_to_888(0xFFFF), [248, 252, 248]);
        assert_eq!(rgb565_to_888(0x0000), [0, 0, 0]);
        assert_eq!(rgb888_to_565(248, 252, 248), 0xFFFF);
    }

    #[test]
    fn test_encode_raw565_is_exact() {
        let (data, _) = raw565(5, 4, 0);
        let img = decode(&data).unwrap();
        assert_eq!(encode_raw565(&img).unwrap(), data);
    }

    #[test]
    fn test_load_from_file_caps_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.raw");
        // 512x512 RAW565 is 4 bytes larger than the read cap
        let (data, pixels) = raw565(512, 512, 0);
        std::fs::write(&path, &data).unwrap();

        let img = load_from_file(&StdFileSystem, path.to_str().unwrap()).unwrap();
        assert_eq!((img.width(), img.height()), (512, 512));
        let last = pixels.len() - 1;
        assert_eq!(img.pixels()[..last - 1], pixels[..last - 1]);
        assert_eq!(img.pixels()[last], 0);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.png");
        let err = load_from_file(&StdFileSystem, path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ImageError::Io { .. }));
    }

    #[test]
    fn test_alloc_rejects_zero() {
        assert!(Image::alloc(0, 5).is_err());
        assert!(Image::from_pixels(2, 2, vec![0; 3]).is_err());
        assert_eq!(Image::alloc(3, 2).unwrap().byte_len(), 12);
    }
}
