//! Herd Runtime
//!
//! Headless driver for the steering core. Spawns a crowd on a grid nav mesh,
//! drags a target around with a scripted pointer and reports how closely the
//! crowd follows.
//!
//! Run with: cargo run -p herd_runtime
//!       or: HERD_AGENTS=100 RUST_LOG=debug cargo run --bin herd

mod config;
mod frame;
mod pointer;
mod scene;

use config::RuntimeConfig;
use frame::FrameTiming;
use scene::Scene;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Herd v{}", env!("CARGO_PKG_VERSION"));

    let config = RuntimeConfig::load();
    config.log_summary();

    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    if let Err(e) = ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst)) {
        log::warn!("Ctrl-C handler not installed: {}", e);
    }

    if let Err(e) = run(&config, &running) {
        log::error!("Simulation aborted: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &RuntimeConfig, running: &AtomicBool) -> herd_core::Result<()> {
    let mut scene = Scene::build(config)?;
    let mut timing = FrameTiming::new(config.frame_rate);
    let frame_dt = config.frame_dt();
    let physics_dt = config.physics_dt();
    let mut next_report = config.report_interval_secs;

    while timing.total_time < config.duration_secs {
        if !running.load(Ordering::SeqCst) {
            log::info!("Interrupted at {:.2}s", timing.total_time);
            break;
        }

        timing.update(frame_dt);
        scene.frame(&mut timing, physics_dt)?;

        if config.report_interval_secs > 0.0 && timing.total_time >= next_report {
            next_report += config.report_interval_secs;
            report(&mut scene, &timing, physics_dt);
        }

        if config.real_time {
            std::thread::sleep(timing.remaining_budget());
        }
    }

    let stats = scene.stats();
    log::info!(
        "Done after {} frames ({:.1}s): {} agents, mean distance to target {:.2}",
        timing.frame,
        timing.total_time,
        stats.agents,
        stats.mean_distance
    );
    Ok(())
}

fn report(scene: &mut Scene, timing: &FrameTiming, physics_dt: f32) {
    let stats = scene.stats();
    let queries = scene.take_query_count();
    let target = scene.sim.target_position(scene.target);

    log::info!(
        "t={:>6.2}s agents={} mean_dist={:.2} max_dist={:.2} max_speed={:.2} path_queries={}",
        timing.total_time,
        stats.agents,
        stats.mean_distance,
        stats.max_distance,
        stats.max_speed,
        queries
    );
    log::debug!(
        "Target at {:?}, {:.0}/{} fps, {:.2} into next physics step",
        target,
        timing.avg_fps,
        timing.target_fps,
        timing.interpolation_factor(physics_dt)
    );
}
