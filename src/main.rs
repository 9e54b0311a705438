use anyhow::{Context, Result};
use log::{info, warn};
use std::path::Path;
use std::time::{Duration, Instant};

use rig_retarget::config::Config;
use rig_retarget::motion::{load_sequence, Playback};
#[cfg(feature = "osc")]
use rig_retarget::osc::SnapshotSender;
use rig_retarget::rig::RigMapper;

const CONFIG_PATH: &str = "config.toml";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| CONFIG_PATH.to_string());
    let config = Config::load_or_default(&config_path);

    info!("rig-retarget {}", env!("GIT_VERSION"));
    info!("Motion: {}", config.playback.file);
    info!("Target FPS: {}, looping: {}", config.playback.target_fps, config.playback.looping);
    info!(
        "Rig: scale={}, snap_first_sample={} | Smooth: position={}, rotation={}",
        config.rig.scale, config.rig.snap_first_sample, config.smooth.position, config.smooth.rotation
    );

    let decoded = load_sequence(Path::new(&config.playback.file), config.playback.schema)
        .with_context(|| format!("Failed to load motion {}", config.playback.file))?;
    info!(
        "Loaded {} frames ({}), {} empty",
        decoded.sequence.len(),
        decoded.schema.as_str(),
        decoded.stats.empty_frames
    );

    #[cfg(feature = "osc")]
    let sender = if config.osc.enabled {
        info!("OSC target: {}", config.osc.addr);
        Some(SnapshotSender::new(&config.osc.addr)?)
    } else {
        None
    };
    #[cfg(not(feature = "osc"))]
    if config.osc.enabled {
        warn!("osc.enabled is set but this build has no OSC support");
    }

    let mut mapper = RigMapper::from_config(&config);
    let mut playback = Playback::new(decoded.sequence, config.playback.looping);

    let frame_duration = Duration::from_secs_f64(1.0 / config.playback.target_fps as f64);
    let mut frame_count = 0u32;
    let mut skipped_total = 0usize;
    let mut fps_timer = Instant::now();

    while let Some(frame) = playback.next_frame() {
        let loop_start = Instant::now();

        let report = mapper.update(frame);
        skipped_total += report.issues.len();

        #[cfg(feature = "osc")]
        if let Some(sender) = &sender {
            if let Err(e) = sender.send(&mapper.snapshot()) {
                warn!("OSC send failed: {:#}", e);
            }
        }

        // FPS表示
        frame_count += 1;
        let elapsed = fps_timer.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            info!(
                "FPS: {:.1} | frame {}/{} | segment issues {}",
                frame_count as f32 / elapsed,
                playback.position(),
                playback.len(),
                skipped_total
            );
            frame_count = 0;
            skipped_total = 0;
            fps_timer = Instant::now();
        }

        if let Some(rest) = frame_duration.checked_sub(loop_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    info!("Playback finished");
    Ok(())
}
