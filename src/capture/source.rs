use anyhow::{Context, Result};

/// One uncompressed video frame, tightly packed RGB8.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// A live video surface the capture loop can rasterize.
///
/// `grab` may block briefly (it runs on a blocking worker) and returns
/// `None` while the surface has no dimensions yet (track not attached,
/// camera still warming up). That tick is skipped silently.
pub trait FrameSource: Send + Sync {
    fn grab(&self) -> Option<RawFrame>;
}

pub fn encode_jpeg(frame: &RawFrame, quality: u8) -> Result<Vec<u8>> {
    let mut jpeg = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, quality);
    encoder
        .encode(
            &frame.pixels,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgb8,
        )
        .context("jpeg encoding failed")?;
    Ok(jpeg)
}
