use anyhow::Result;

use crate::device::DisplaySurface;
use crate::frame::GreyBuffer;

/// Show a greyscale frame on the display, replicated to RGB, at the origin.
pub fn render<D: DisplaySurface + ?Sized>(display: &mut D, grey: &GreyBuffer) -> Result<()> {
    let rgb = grey.to_rgb();
    display.paste_rgb(&rgb, grey.width, grey.height, 0, 0, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{to_greyscale, FrameBuffer};
    use crate::sim::MemoryDisplay;

    #[test]
    fn render_pastes_opaque_rgb_at_origin() -> Result<()> {
        let frame = FrameBuffer::from_bgra(vec![0, 0, 255, 255, 255, 255, 255, 255], 2, 1)?;
        let mut display = MemoryDisplay::new(2, 1);
        render(&mut display, &to_greyscale(&frame))?;

        let last = display.last_paste().expect("one paste");
        assert_eq!(last.rgb, vec![76, 76, 76, 255, 255, 255]);
        assert_eq!((last.x, last.y), (0, 0));
        assert!(!last.blend);
        assert_eq!(display.paste_count(), 1);
        Ok(())
    }
}
