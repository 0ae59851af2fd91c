//! Camera frame buffers and the greyscale transform.
//!
//! - `FrameBuffer`: BGRA frame pulled from the host camera once per tick.
//! - `GreyBuffer`: single-channel luma derived from a `FrameBuffer`.
//! - `acquire()`: the only way to obtain a `FrameBuffer` from a camera. It enforces
//!   the device preconditions (enabled, buffer sized `height * width * 4`).
//!
//! Frames are transient: the controller drops them at the end of the tick once the
//! display and the recording scheduler have used them.

use anyhow::{anyhow, Context, Result};
use std::path::Path;

use crate::device::Camera;

/// Bytes per pixel in the camera layout (blue, green, red, alpha).
pub const BGRA_CHANNELS: usize = 4;

// Fixed-point (14-bit) luma weights for B, G, R.
const LUMA_B: u32 = 1868;
const LUMA_G: u32 = 9617;
const LUMA_R: u32 = 4899;
const LUMA_SHIFT: u32 = 14;

// ----------------------------------------------------------------------------
// FrameBuffer: raw camera image
// ----------------------------------------------------------------------------

/// Interleaved BGRA camera image.
#[derive(Debug)]
pub struct FrameBuffer {
    data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl FrameBuffer {
    /// Wrap a BGRA byte buffer, checking it matches the dimensions exactly.
    pub fn from_bgra(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected = bgra_len(width, height)?;
        if data.len() != expected {
            return Err(anyhow!(
                "camera buffer length mismatch: expected {} ({}x{}x{}), got {}",
                expected,
                width,
                height,
                BGRA_CHANNELS,
                data.len()
            ));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn as_bgra(&self) -> &[u8] {
        &self.data
    }

    /// Reorder to RGBA for encoders that expect it.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(BGRA_CHANNELS) {
            rgba.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
        }
        rgba
    }

    /// Persist the frame as a PNG file.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        let image = image::RgbaImage::from_raw(self.width, self.height, self.to_rgba())
            .ok_or_else(|| anyhow!("frame does not fit {}x{}", self.width, self.height))?;
        image
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("write snapshot {}", path.display()))?;
        Ok(())
    }
}

/// Pull the current frame from an enabled camera.
pub fn acquire<C: Camera + ?Sized>(camera: &mut C) -> Result<FrameBuffer> {
    if !camera.is_enabled() {
        return Err(anyhow!("camera read before enable()"));
    }
    let width = camera.width();
    let height = camera.height();
    let data = camera.image().context("read camera image")?;
    FrameBuffer::from_bgra(data, width, height)
}

fn bgra_len(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(BGRA_CHANNELS))
        .ok_or_else(|| anyhow!("frame dimensions overflow"))
}

// ----------------------------------------------------------------------------
// GreyBuffer: single-channel luma
// ----------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GreyBuffer {
    data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl GreyBuffer {
    pub fn as_luma(&self) -> &[u8] {
        &self.data
    }

    /// Replicate luma into three identical channels.
    pub fn to_rgb(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.data.len() * 3);
        for &y in &self.data {
            rgb.extend_from_slice(&[y, y, y]);
        }
        rgb
    }
}

/// Convert a BGRA frame to greyscale. Alpha is ignored.
pub fn to_greyscale(frame: &FrameBuffer) -> GreyBuffer {
    let data = frame
        .as_bgra()
        .chunks_exact(BGRA_CHANNELS)
        .map(|px| luma(px[0], px[1], px[2]))
        .collect();
    GreyBuffer {
        data,
        width: frame.width,
        height: frame.height,
    }
}

fn luma(b: u8, g: u8, r: u8) -> u8 {
    let weighted = b as u32 * LUMA_B + g as u32 * LUMA_G + r as u32 * LUMA_R;
    ((weighted + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT) as u8
}
