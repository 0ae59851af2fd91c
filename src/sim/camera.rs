use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::device::Camera;

/// Configuration for a synthetic camera.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    pub width: u32,
    pub height: u32,
    /// Seed for sensor noise. Same seed, same frames.
    pub seed: u64,
    /// Peak per-channel noise amplitude.
    pub noise: u8,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 128,
            seed: 0,
            noise: 6,
        }
    }
}

/// Renders a forward view of a road with two lane markings that sway over time.
pub struct SyntheticCamera {
    config: CameraConfig,
    sampling_period_ms: Option<u32>,
    frame_count: u64,
    rng: StdRng,
}

impl SyntheticCamera {
    pub fn new(config: CameraConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            sampling_period_ms: None,
            frame_count: 0,
            rng,
        }
    }

    pub fn frames_captured(&self) -> u64 {
        self.frame_count
    }

    pub fn sampling_period_ms(&self) -> Option<u32> {
        self.sampling_period_ms
    }

    fn render(&mut self) -> Vec<u8> {
        let w = self.config.width as usize;
        let h = self.config.height as usize;
        let horizon = h / 3;
        let sway = (self.frame_count as f64 * 0.05).sin() * w as f64 * 0.08;

        let mut pixels = vec![0u8; w * h * 4];
        for y in 0..h {
            // 0 at the horizon, 1 at the bottom row.
            let depth = if y > horizon {
                (y - horizon) as f64 / (h - horizon).max(1) as f64
            } else {
                0.0
            };
            let center = w as f64 / 2.0 + sway * depth;
            let half_lane = w as f64 * (0.05 + 0.35 * depth);
            for x in 0..w {
                let (b, g, r) = if y <= horizon {
                    (200, 160, 110)
                } else {
                    let dx = (x as f64 - center).abs();
                    let marking = (dx - half_lane).abs() < 1.0 + 2.0 * depth;
                    if marking {
                        (235, 235, 235)
                    } else if dx > half_lane + 6.0 {
                        (60, 110, 70)
                    } else {
                        (85, 85, 90)
                    }
                };
                let offset = (y * w + x) * 4;
                pixels[offset] = self.jitter(b);
                pixels[offset + 1] = self.jitter(g);
                pixels[offset + 2] = self.jitter(r);
                pixels[offset + 3] = 255;
            }
        }
        pixels
    }

    fn jitter(&mut self, value: u8) -> u8 {
        if self.config.noise == 0 {
            return value;
        }
        let amplitude = self.config.noise as i16;
        let noise = self.rng.gen_range(-amplitude..=amplitude);
        (value as i16 + noise).clamp(0, 255) as u8
    }
}

impl Camera for SyntheticCamera {
    fn enable(&mut self, sampling_period_ms: u32) {
        log::info!(
            "SyntheticCamera: enabled {}x{} every {} ms",
            self.config.width,
            self.config.height,
            sampling_period_ms
        );
        self.sampling_period_ms = Some(sampling_period_ms);
    }

    fn is_enabled(&self) -> bool {
        self.sampling_period_ms.is_some()
    }

    fn width(&self) -> u32 {
        self.config.width
    }

    fn height(&self) -> u32 {
        self.config.height
    }

    fn image(&mut self) -> Result<Vec<u8>> {
        if !self.is_enabled() {
            return Err(anyhow!("SyntheticCamera: image() before enable()"));
        }
        self.frame_count += 1;
        Ok(self.render())
    }
}
