use anyhow::{anyhow, Result};

use crate::device::DisplaySurface;

/// One `paste_rgb` call as seen by the display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paste {
    pub rgb: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
    pub blend: bool,
}

/// Display surface that keeps the most recent image in memory.
pub struct MemoryDisplay {
    width: u32,
    height: u32,
    last: Option<Paste>,
    pastes: u64,
}

impl MemoryDisplay {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            last: None,
            pastes: 0,
        }
    }

    pub fn last_paste(&self) -> Option<&Paste> {
        self.last.as_ref()
    }

    pub fn paste_count(&self) -> u64 {
        self.pastes
    }
}

impl DisplaySurface for MemoryDisplay {
    fn paste_rgb(
        &mut self,
        rgb: &[u8],
        width: u32,
        height: u32,
        x: u32,
        y: u32,
        blend: bool,
    ) -> Result<()> {
        let expected = width as usize * height as usize * 3;
        if rgb.len() != expected {
            return Err(anyhow!(
                "RGB image length mismatch: expected {}, got {}",
                expected,
                rgb.len()
            ));
        }
        if x.saturating_add(width) > self.width || y.saturating_add(height) > self.height {
            return Err(anyhow!(
                "{}x{} image at ({}, {}) exceeds {}x{} display",
                width,
                height,
                x,
                y,
                self.width,
                self.height
            ));
        }
        self.last = Some(Paste {
            rgb: rgb.to_vec(),
            width,
            height,
            x,
            y,
            blend,
        });
        self.pastes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_images_larger_than_surface() {
        let mut display = MemoryDisplay::new(2, 2);
        assert!(display.paste_rgb(&[0; 27], 3, 3, 0, 0, false).is_err());
        assert!(display.paste_rgb(&[0; 12], 2, 2, 1, 0, false).is_err());
        assert_eq!(display.paste_count(), 0);
    }

    #[test]
    fn rejects_short_buffers() {
        let mut display = MemoryDisplay::new(2, 2);
        assert!(display.paste_rgb(&[0; 11], 2, 2, 0, 0, false).is_err());
    }
}
