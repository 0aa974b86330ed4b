use std::io::{BufRead, Cursor, Seek};
use std::path::Path;

use anyhow::Context;
use image::{DynamicImage, ImageDecoder, ImageReader, imageops::FilterType};

use crate::foundation::core::PixelBuffer;
use crate::foundation::error::{RevealError, RevealResult};

/// Decode options for subject images.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SourceOpts {
    /// Downscale (keeping aspect) so the longer side is at most this many pixels.
    pub max_long_side: Option<u32>,
    /// Rotate/flip according to the EXIF orientation tag.
    pub apply_orientation: bool,
}

impl Default for SourceOpts {
    fn default() -> Self {
        Self {
            max_long_side: None,
            apply_orientation: true,
        }
    }
}

/// Decode an image file into a [`PixelBuffer`].
pub fn load_source(path: &Path, opts: &SourceOpts) -> RevealResult<PixelBuffer> {
    let reader = ImageReader::open(path)
        .with_context(|| format!("open image '{}'", path.display()))?;
    decode_reader(reader, opts)
}

/// Decode encoded image bytes into a [`PixelBuffer`].
pub fn load_source_from_memory(bytes: &[u8], opts: &SourceOpts) -> RevealResult<PixelBuffer> {
    decode_reader(ImageReader::new(Cursor::new(bytes)), opts)
}

fn decode_reader<R: BufRead + Seek>(
    reader: ImageReader<R>,
    opts: &SourceOpts,
) -> RevealResult<PixelBuffer> {
    if opts.max_long_side == Some(0) {
        return Err(RevealError::validation("max_long_side must be > 0 when set"));
    }

    let mut decoder = reader
        .with_guessed_format()
        .context("guess image format")?
        .into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut img = DynamicImage::from_decoder(decoder)?;
    if opts.apply_orientation {
        img.apply_orientation(orientation);
    }

    if let Some(max) = opts.max_long_side
        && img.width().max(img.height()) > max
    {
        img = img.resize(max, max, FilterType::Triangle);
    }

    tracing::debug!(width = img.width(), height = img.height(), "decoded source image");
    PixelBuffer::from_image(&img.to_rgba8())
}

#[cfg(test)]
#[path = "../../tests/unit/source/decode.rs"]
mod tests;
