use std::time::{Duration, Instant};

use image::RgbaImage;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AssetError;
use crate::idle::IdleSlideshow;
use crate::pose::UserId;
use crate::render::surface::BACKGROUND;
use crate::render::{blit, clear, fit_height, flip_horizontal, scale_to, DisplayFit};
use crate::skeleton::SkeletonComposer;
use crate::sensor::UserTracker;

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameOutcome {
    /// A skeleton was drawn this frame
    pub tracked: bool,
    /// A user is present but not yet tracked
    pub prompt: bool,
    /// Tracking confidence of the last drawn user
    pub confidence: Option<f32>,
    /// The idle slideshow filled the frame
    pub idle: bool,
    /// The tracker should be closed and reopened
    pub reset_sensor: bool,
}

/// Chooses between the skeleton and the idle slideshow every frame and
/// composites the display image
pub struct FrameDirector<R: Rng = StdRng> {
    composer: SkeletonComposer,
    slideshow: IdleSlideshow<R>,
    prompt: Option<RgbaImage>,
    mirrored: bool,
    reset_timeout: Duration,
    skeleton_surface: RgbaImage,
    frame: RgbaImage,
    fit: DisplayFit,
    last_user_at: Option<Instant>,
    untracked_user: bool,
    was_idle: bool,
    frame_count: u64,
}

impl<R: Rng> FrameDirector<R> {
    pub fn new(
        config: &Config,
        display_size: (u32, u32),
        composer: SkeletonComposer,
        slideshow: IdleSlideshow<R>,
        prompt: Option<RgbaImage>,
    ) -> Result<Self, AssetError> {
        let space = &config.render_space;
        let ratio = space.width as f32 / space.height.max(1) as f32;
        Ok(Self {
            composer,
            slideshow,
            prompt,
            mirrored: config.display.mirrored,
            reset_timeout: config.timing.reset_timeout()?,
            skeleton_surface: RgbaImage::new(space.width, space.height),
            frame: RgbaImage::new(display_size.0, display_size.1),
            fit: fit_height(ratio, display_size, config.display.aspect_ratio),
            last_user_at: None,
            untracked_user: false,
            was_idle: false,
            frame_count: 0,
        })
    }

    /// Run one frame. `tracker` is None while the sensor is unavailable.
    pub fn tick(&mut self, tracker: Option<&mut dyn UserTracker>, now: Instant) -> FrameOutcome {
        let mut outcome = FrameOutcome::default();
        clear(&mut self.frame);

        if let Some(tracker) = tracker {
            outcome.reset_sensor = self.track(tracker, now, &mut outcome);
            self.compose_skeleton();
        }

        if self.last_user_at.is_none() {
            if !self.was_idle {
                self.slideshow.reset();
            }
            clear(&mut self.frame);
            self.slideshow.draw(&mut self.frame, now);
            outcome.idle = true;
        }
        self.was_idle = outcome.idle;

        if self.untracked_user {
            self.draw_prompt();
        }
        outcome.prompt = self.untracked_user;
        outcome
    }

    /// Read users and draw tracked skeletons. Returns true when the sensor
    /// needs a reset.
    fn track(&mut self, tracker: &mut dyn UserTracker, now: Instant, outcome: &mut FrameOutcome) -> bool {
        clear(&mut self.skeleton_surface);
        let frame = match tracker.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("tracker read failed: {:#}", e);
                self.last_user_at = None;
                self.untracked_user = false;
                return true;
            }
        };
        self.frame_count += 1;

        if frame.users.is_empty() {
            self.untracked_user = false;
            self.last_user_at = None;
        }
        for user in &frame.users {
            if user.is_new {
                if !outcome.tracked {
                    self.untracked_user = true;
                }
                self.last_user_at = Some(now);
                info!("{}: new human id:{} detected", self.frame_count, user.id);
                if let Err(e) = tracker.start_skeleton_tracking(user.id) {
                    warn!("start tracking user {} failed: {:#}", user.id, e);
                }
            } else if user.is_tracked() {
                self.last_user_at = Some(now);
                let confidence = self.composer.draw_user(
                    &mut self.skeleton_surface,
                    user.id,
                    &user.skeleton,
                    tracker.projection(),
                );
                outcome.confidence = Some(confidence);
                self.untracked_user = false;
                outcome.tracked = true;
            } else if !outcome.tracked {
                self.untracked_user = true;
            }
        }

        let active: Vec<UserId> = frame.users.iter().map(|u| u.id).collect();
        self.composer.retain_users(&active);

        match self.last_user_at {
            Some(at) if now > at + self.reset_timeout => {
                for user in &frame.users {
                    if let Err(e) = tracker.stop_skeleton_tracking(user.id) {
                        warn!("stop tracking user {} failed: {:#}", user.id, e);
                    }
                }
                info!("{}: no user for {:?}, resetting tracking", self.frame_count, self.reset_timeout);
                self.last_user_at = None;
                true
            }
            _ => false,
        }
    }

    fn compose_skeleton(&mut self) {
        let source = if self.mirrored {
            flip_horizontal(&self.skeleton_surface)
        } else {
            self.skeleton_surface.clone()
        };
        let scaled = scale_to(&source, self.fit.width, self.fit.height);
        blit(&mut self.frame, &scaled, self.fit.margin_x, 0, 255);
    }

    /// Prompt image at 90% of the display width on a black band, flipped
    /// unless the display is mirrored
    fn draw_prompt(&mut self) {
        let Some(prompt) = &self.prompt else {
            return;
        };
        let (fw, fh) = self.frame.dimensions();
        let width = (fw as f32 * 0.9) as u32;
        let height = (prompt.height() as f32 * width as f32 / prompt.width().max(1) as f32) as u32;
        if width == 0 || height == 0 {
            return;
        }
        let band_width = (fw as f32 * 0.95) as u32;
        let band_height = height + band_width - width;
        let band = RgbaImage::from_pixel(band_width, band_height, BACKGROUND);
        blit(
            &mut self.frame,
            &band,
            (fw as i32 - band_width as i32) / 2,
            (fh as i32 - band_height as i32) / 2,
            255,
        );

        let mut scaled = scale_to(prompt, width, height);
        if !self.mirrored {
            scaled = flip_horizontal(&scaled);
        }
        blit(
            &mut self.frame,
            &scaled,
            (fw as i32 - width as i32) / 2,
            (fh as i32 - height as i32) / 2,
            255,
        );
    }

    /// Composited display image of the last tick
    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    pub fn composer(&self) -> &SkeletonComposer {
        &self.composer
    }

    pub fn slideshow(&self) -> &IdleSlideshow<R> {
        &self.slideshow
    }
}
