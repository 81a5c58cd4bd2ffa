use std::collections::HashMap;
use std::time::{Duration, Instant};

use image::RgbaImage;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::TimingConfig;
use crate::error::AssetError;
use crate::idle::entry::{letterbox, IdleImage};
use crate::render::{blit, scale_to};

/// Distance an image drifts over one dwell period
pub const DRIFT_DISTANCE: f32 = 100.0;

/// One image to draw this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleLayer {
    pub index: usize,
    pub offset: (i32, i32),
    pub alpha: u8,
}

/// The image being faded out, frozen where it was last drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FadingOut {
    index: usize,
    offset: (i32, i32),
}

/// Cross-fading ambient slideshow shown while nobody is tracked
pub struct IdleSlideshow<R: Rng = StdRng> {
    images: Vec<IdleImage>,
    dwell: Duration,
    fade: Duration,
    rng: R,
    /// Indices not yet shown in this round; popped from the back
    queue: Vec<usize>,
    current: Option<usize>,
    previous: Option<FadingOut>,
    switched_at: Option<Instant>,
    drift_angle: Option<u32>,
    drift: [f32; 2],
    offset: (i32, i32),
    scaled: HashMap<usize, RgbaImage>,
    scaled_for: (u32, u32),
}

impl IdleSlideshow<StdRng> {
    pub fn from_entropy(images: Vec<IdleImage>, timing: &TimingConfig) -> Result<Self, AssetError> {
        Self::new(images, timing, StdRng::from_entropy())
    }
}

impl<R: Rng> IdleSlideshow<R> {
    pub fn new(images: Vec<IdleImage>, timing: &TimingConfig, rng: R) -> Result<Self, AssetError> {
        if images.is_empty() {
            return Err(AssetError::NoIdleImages);
        }
        Ok(Self {
            images,
            dwell: timing.idle_image_timeout()?,
            fade: timing.fade_length()?,
            rng,
            queue: Vec::new(),
            current: None,
            previous: None,
            switched_at: None,
            drift_angle: None,
            drift: [0.0, 0.0],
            offset: (0, 0),
            scaled: HashMap::new(),
            scaled_for: (0, 0),
        })
    }

    /// Refill the queue when exhausted and switch images once the dwell time
    /// has passed. Returns true on a switch.
    pub fn advance(&mut self, now: Instant) -> bool {
        if self.queue.is_empty() {
            self.queue = (0..self.images.len()).collect();
            self.queue.shuffle(&mut self.rng);
            debug!("idle queue reshuffled: {:?}", self.queue);
        }

        let due = match self.switched_at {
            None => true,
            Some(at) => now > at + self.dwell,
        };
        if !due {
            return false;
        }

        let angle = match self.drift_angle {
            Some(prev) => (prev + 90 + self.rng.gen_range(0..=180)) % 360,
            None => self.rng.gen_range(0..360),
        };
        let direction = (angle as f32).to_radians();
        self.drift_angle = Some(angle);
        self.drift = [DRIFT_DISTANCE * direction.cos(), DRIFT_DISTANCE * direction.sin()];

        self.previous = self.current.map(|index| FadingOut {
            index,
            offset: self.offset,
        });
        self.current = self.queue.pop();
        self.offset = (0, 0);
        self.switched_at = Some(now);
        debug!(
            "idle image {:?} -> {:?}, drift {} deg",
            self.previous.map(|p| p.index),
            self.current,
            angle
        );
        true
    }

    /// Advance, then return the layers to draw bottom-up: the fading-out
    /// image (during the fade only) and the current image.
    pub fn frame(&mut self, now: Instant) -> Vec<IdleLayer> {
        self.advance(now);
        let (Some(current), Some(switched_at)) = (self.current, self.switched_at) else {
            return Vec::new();
        };

        let t = now.saturating_duration_since(switched_at).as_secs_f32();
        let fade = self.fade.as_secs_f32();
        let dwell = self.dwell.as_secs_f32();
        let mut layers = Vec::with_capacity(2);

        let alpha = if t < fade {
            if let Some(prev) = self.previous {
                layers.push(IdleLayer {
                    index: prev.index,
                    offset: prev.offset,
                    alpha: 255 - (255.0 * t / fade) as u8,
                });
            }
            (255.0 * t / fade) as u8
        } else {
            255
        };

        if dwell > 0.0 {
            self.offset = (
                (self.drift[0] * t / dwell) as i32,
                (self.drift[1] * t / dwell) as i32,
            );
        }
        layers.push(IdleLayer {
            index: current,
            offset: self.offset,
            alpha,
        });
        layers
    }

    /// Composite this frame's layers onto `surface`, each image fitted to the
    /// surface and shifted by its drift offset
    pub fn draw(&mut self, surface: &mut RgbaImage, now: Instant) {
        let size = surface.dimensions();
        if size != self.scaled_for {
            self.scaled.clear();
            self.scaled_for = size;
        }

        for layer in self.frame(now) {
            let source = &self.images[layer.index];
            let fit = letterbox((source.width, source.height), size);
            let scaled = self
                .scaled
                .entry(layer.index)
                .or_insert_with(|| scale_to(&source.image, fit.width, fit.height));
            blit(
                surface,
                scaled,
                fit.margin_x + layer.offset.0,
                fit.margin_y + layer.offset.1,
                layer.alpha,
            );
        }
    }

    /// Force a switch on the next frame
    pub fn reset(&mut self) {
        self.switched_at = None;
    }

    pub fn images(&self) -> &[IdleImage] {
        &self.images
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn previous(&self) -> Option<usize> {
        self.previous.map(|p| p.index)
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn drift_angle(&self) -> Option<u32> {
        self.drift_angle
    }

    pub fn drift(&self) -> [f32; 2] {
        self.drift
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    fn timing() -> TimingConfig {
        TimingConfig {
            idle_image_timeout_s: 5.0,
            fade_length_s: 1.0,
            reset_timeout_s: 3.0,
        }
    }

    fn images(n: usize) -> Vec<IdleImage> {
        (0..n)
            .map(|i| {
                let shade = (i * 60 + 60) as u8;
                IdleImage::new(
                    PathBuf::from(format!("{}.png", i)),
                    RgbaImage::from_pixel(16, 9, Rgba([shade, shade, shade, 255])),
                )
            })
            .collect()
    }

    fn slideshow(n: usize, seed: u64) -> IdleSlideshow<StdRng> {
        IdleSlideshow::new(images(n), &timing(), StdRng::seed_from_u64(seed)).unwrap()
    }

    fn secs(s: f32) -> Duration {
        Duration::from_secs_f32(s)
    }

    #[test]
    fn test_empty_set_is_fatal() {
        let result = IdleSlideshow::new(Vec::new(), &timing(), StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(AssetError::NoIdleImages)));
    }

    #[test]
    fn test_infinite_dwell_is_an_error() {
        let timing = TimingConfig {
            idle_image_timeout_s: f32::INFINITY,
            ..timing()
        };
        let result = IdleSlideshow::new(images(2), &timing, StdRng::seed_from_u64(0));
        assert!(matches!(
            result,
            Err(AssetError::InvalidTiming { field: "idle_image_timeout_s", .. })
        ));
    }

    #[test]
    fn test_first_frame_shows_single_image() {
        let mut show = slideshow(3, 1);
        let t0 = Instant::now();
        let layers = show.frame(t0);
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].alpha, 0);
        assert!(show.previous().is_none());
    }

    #[test]
    fn test_no_switch_before_dwell() {
        let mut show = slideshow(3, 2);
        let t0 = Instant::now();
        assert!(show.advance(t0));
        let first = show.current();
        assert!(!show.advance(t0 + secs(4.9)));
        assert!(!show.advance(t0 + secs(5.0)));
        assert_eq!(show.current(), first);
        assert!(show.advance(t0 + secs(5.1)));
        assert_ne!(show.current(), first);
        assert_eq!(show.previous(), first);
    }

    #[test]
    fn test_crossfade_alphas() {
        let mut show = slideshow(3, 3);
        let t0 = Instant::now();
        show.frame(t0);
        let t1 = t0 + secs(5.5);

        let layers = show.frame(t1);
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].alpha, 255);
        assert_eq!(layers[1].alpha, 0);
        assert_eq!(layers[0].index, show.previous().unwrap());
        assert_eq!(layers[1].index, show.current().unwrap());

        let mid = show.frame(t1 + secs(0.5));
        assert_eq!(mid.len(), 2);
        assert!((126..=128).contains(&mid[0].alpha));
        assert!((126..=128).contains(&mid[1].alpha));

        let done = show.frame(t1 + secs(1.0));
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].alpha, 255);
    }

    #[test]
    fn test_fading_image_keeps_last_position() {
        let mut show = slideshow(3, 4);
        let t0 = Instant::now();
        show.frame(t0);
        let last = show.frame(t0 + secs(4.0))[0].offset;

        let t1 = t0 + secs(5.5);
        let layers = show.frame(t1);
        assert_eq!(layers[0].offset, last);
        let later = show.frame(t1 + secs(0.7));
        assert_eq!(later[0].offset, last);
    }

    #[test]
    fn test_drift_interpolates_over_dwell() {
        let mut show = slideshow(2, 5);
        let t0 = Instant::now();
        show.frame(t0);
        let drift = show.drift();
        assert!(((drift[0].powi(2) + drift[1].powi(2)).sqrt() - DRIFT_DISTANCE).abs() < 1e-3);

        let half = show.frame(t0 + secs(2.5));
        assert_eq!(
            half[0].offset,
            ((drift[0] * 2.5 / 5.0) as i32, (drift[1] * 2.5 / 5.0) as i32)
        );

        // drifting continues after the fade has finished
        let later = show.frame(t0 + secs(4.5));
        assert_eq!(
            later[0].offset,
            ((drift[0] * 4.5 / 5.0) as i32, (drift[1] * 4.5 / 5.0) as i32)
        );
    }

    #[test]
    fn test_drift_angle_turns_at_least_90_degrees() {
        let mut show = slideshow(3, 6);
        let mut now = Instant::now();
        show.advance(now);
        let mut prev = show.drift_angle().unwrap();
        assert!(prev < 360);
        for _ in 0..20 {
            now += secs(5.1);
            show.advance(now);
            let angle = show.drift_angle().unwrap();
            assert!(angle < 360);
            let turn = (angle + 360 - prev) % 360;
            assert!((90..=270).contains(&turn), "turn {}", turn);
            prev = angle;
        }
    }

    #[test]
    fn test_each_image_once_per_round() {
        let mut show = slideshow(4, 7);
        let mut now = Instant::now();
        let mut shown = Vec::new();
        for _ in 0..4 {
            show.advance(now);
            shown.push(show.current().unwrap());
            now += secs(5.1);
        }
        let distinct: BTreeSet<_> = shown.iter().collect();
        assert_eq!(distinct.len(), 4);
    }

    #[test]
    fn test_queue_exhausted_then_reshuffled() {
        let mut show = slideshow(3, 8);
        let mut now = Instant::now();
        for _ in 0..3 {
            show.advance(now);
            now += secs(5.1);
        }
        assert_eq!(show.queue_len(), 0);

        assert!(show.advance(now));
        // refilled with all three, one already popped
        assert_eq!(show.queue_len(), 2);
        let mut round: BTreeSet<usize> = show.queue.iter().copied().collect();
        round.insert(show.current().unwrap());
        assert_eq!(round, (0..3).collect());
    }

    #[test]
    fn test_single_image_repeats() {
        let mut show = slideshow(1, 9);
        let t0 = Instant::now();
        show.advance(t0);
        show.advance(t0 + secs(5.1));
        assert_eq!(show.current(), Some(0));
        assert_eq!(show.previous(), Some(0));
    }

    #[test]
    fn test_reset_forces_switch() {
        let mut show = slideshow(3, 10);
        let t0 = Instant::now();
        show.advance(t0);
        show.reset();
        assert!(show.advance(t0 + secs(0.1)));
    }

    #[test]
    fn test_draw_composites_fitted_image() {
        let mut show = slideshow(1, 11);
        let mut surface = RgbaImage::from_pixel(320, 180, Rgba([0, 0, 0, 255]));
        let t0 = Instant::now();
        show.draw(&mut surface, t0);
        // alpha 0 on the switch frame
        assert!(surface.pixels().all(|p| p[0] == 0));

        let mut surface = RgbaImage::from_pixel(320, 180, Rgba([0, 0, 0, 255]));
        let image_index = show.current().unwrap();
        let shade = show.images()[image_index].image.get_pixel(0, 0)[0];
        show.draw(&mut surface, t0 + secs(1.0));
        // drift over 1s is at most 20px, so the centre stays covered
        assert_eq!(surface.get_pixel(160, 90)[0], shade);
    }
}
