use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;

use skeleton_mirror::app::FrameDirector;
use skeleton_mirror::config::{Config, SensorConfig};
use skeleton_mirror::idle::{load_dir, IdleImage, IdleSlideshow};
use skeleton_mirror::render::MinifbDisplay;
use skeleton_mirror::sensor::{set_tilt, OscTracker, UserTracker};
use skeleton_mirror::skeleton::{BoneAtlas, SkeletonComposer};

const CONFIG_PATH: &str = "config.toml";

fn open_tracker(sensor: &SensorConfig) -> Option<Box<dyn UserTracker>> {
    match OscTracker::bind(&sensor.listen_addr, sensor.capture_size()) {
        Ok(tracker) => Some(Box::new(tracker)),
        Err(e) => {
            warn!("sensor unavailable, showing idle images only: {:#}", e);
            None
        }
    }
}

fn main() -> Result<()> {
    // the log level lives in the config, so a load failure is reported
    // once the subscriber is up
    let (config, config_error) = match Config::load(CONFIG_PATH) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    let log_level_filter = config
        .app
        .log_level
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::INFO);
    tracing_subscriber::fmt()
        .with_max_level(log_level_filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    info!("Skeleton Mirror ({})", env!("GIT_VERSION"));
    if let Some(e) = config_error {
        warn!("{} not loaded, using defaults: {:#}", CONFIG_PATH, e);
    }
    info!("Target FPS: {}", config.app.target_fps);
    info!(
        "Display: {} {}x{}, mirrored={}",
        if config.display.full_screen { "full screen" } else { "windowed" },
        config.display.windowed_width,
        config.display.windowed_height,
        config.display.mirrored
    );
    info!(
        "Idle: {}s per image, {}s fade, reset after {}s",
        config.timing.idle_image_timeout_s, config.timing.fade_length_s, config.timing.reset_timeout_s
    );

    let mut tracker: Option<Box<dyn UserTracker>> = None;
    if config.sensor.enabled {
        match set_tilt(&config.sensor.tilt_command, config.sensor.tilt_angle) {
            Ok(output) => info!("tilt {}: {}", config.sensor.tilt_angle, output.trim()),
            Err(e) => warn!("tilt failed: {:#}", e),
        }
        tracker = open_tracker(&config.sensor);
    } else {
        info!("Sensor disabled");
    }

    let atlas = BoneAtlas::load(&config.assets.bone_dir)?;
    info!("Bone images loaded from {}", config.assets.bone_dir);
    let images = load_dir(&config.assets.idle_dir)?;
    info!("{} idle images loaded from {}", images.len(), config.assets.idle_dir);
    let prompt = match &config.assets.prompt_image {
        Some(path) => Some(IdleImage::open(path)?.image),
        None => None,
    };

    let composer = SkeletonComposer::new(
        atlas,
        (config.render_space.x_adjust, config.render_space.y_adjust),
    );
    let slideshow = IdleSlideshow::from_entropy(images, &config.timing)?;
    let mut display = MinifbDisplay::new("Skeleton Mirror", &config.display)?;
    let mut director = FrameDirector::new(&config, display.size(), composer, slideshow, prompt)?;

    let frame_duration = Duration::from_secs_f64(1.0 / config.app.target_fps.max(1) as f64);
    let mut frame_count = 0u32;
    let mut fps_timer = Instant::now();
    let mut last_confidence = None;

    while display.is_open() {
        let frame_start = Instant::now();

        let active: Option<&mut dyn UserTracker> = match &mut tracker {
            Some(t) => Some(t.as_mut()),
            None => None,
        };
        let outcome = director.tick(active, frame_start);
        display.present(director.frame())?;

        if outcome.reset_sensor {
            // drop the socket before binding the same address again
            drop(tracker.take());
            tracker = open_tracker(&config.sensor);
        }
        if outcome.confidence.is_some() {
            last_confidence = outcome.confidence;
        }

        frame_count += 1;
        let elapsed = fps_timer.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            if config.app.show_fps {
                let fps = frame_count as f32 / elapsed;
                match last_confidence.take() {
                    Some(confidence) => info!("FPS: {:.1}, confidence: {:.2}", fps, confidence),
                    None => info!("FPS: {:.1}", fps),
                }
            }
            frame_count = 0;
            fps_timer = Instant::now();
        }

        if let Some(remaining) = frame_duration.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(remaining);
        }
    }

    info!("Shutting down...");
    Ok(())
}
