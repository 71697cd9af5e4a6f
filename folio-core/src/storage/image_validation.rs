//! Image format detection for incoming uploads.
//!
//! Leading magic bytes are authoritative; the client-supplied file name is
//! only consulted for formats without a binary signature (SVG).

use tracing::debug;

/// Formats the gallery accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
    Avif,
    Gif,
    Bmp,
    Svg,
}

impl ImageFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Webp => "webp",
            ImageFormat::Avif => "avif",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Svg => "svg",
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "webp" => Some(ImageFormat::Webp),
            "avif" => Some(ImageFormat::Avif),
            "gif" => Some(ImageFormat::Gif),
            "bmp" => Some(ImageFormat::Bmp),
            "svg" => Some(ImageFormat::Svg),
            _ => None,
        }
    }
}

/// Why a payload was not accepted as an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// Payload is empty
    Empty,
    /// Neither the bytes nor the file name identify a supported format
    UnrecognizedFormat,
}

/// Validate image bytes by checking magic bytes.
pub fn validate_magic_bytes(data: &[u8]) -> Option<ImageFormat> {
    // JPEG: FF D8 FF
    if data.len() >= 3 && data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
        return Some(ImageFormat::Jpeg);
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.len() >= 8
        && data[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]
    {
        return Some(ImageFormat::Png);
    }

    // WebP: RIFF....WEBP
    if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return Some(ImageFormat::Webp);
    }

    // AVIF: ftyp box with avif/avis brand
    if data.len() >= 12
        && &data[4..8] == b"ftyp"
        && (&data[8..12] == b"avif" || &data[8..12] == b"avis")
    {
        return Some(ImageFormat::Avif);
    }

    // GIF: GIF87a or GIF89a
    if data.len() >= 6 && (&data[0..6] == b"GIF87a" || &data[0..6] == b"GIF89a") {
        return Some(ImageFormat::Gif);
    }

    // BMP: BM
    if data.len() >= 2 && &data[0..2] == b"BM" {
        return Some(ImageFormat::Bmp);
    }

    None
}

/// Detect the format of an upload from its bytes, falling back to the
/// extension of `file_name` for signature-less formats.
pub fn detect_image_format(
    data: &[u8],
    file_name: Option<&str>,
) -> Result<ImageFormat, InvalidReason> {
    if data.is_empty() {
        return Err(InvalidReason::Empty);
    }

    if let Some(format) = validate_magic_bytes(data) {
        return Ok(format);
    }

    let by_name = file_name
        .and_then(|name| name.rsplit_once('.'))
        .and_then(|(_, ext)| ImageFormat::from_extension(ext));

    match by_name {
        Some(ImageFormat::Svg) => Ok(ImageFormat::Svg),
        _ => {
            debug!(
                "Unrecognized image format, first 8 bytes: {:02X?}",
                &data[..8.min(data.len())]
            );
            Err(InvalidReason::UnrecognizedFormat)
        }
    }
}
