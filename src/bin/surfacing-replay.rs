//! Replays a JSON script of shell events against a fresh engine and prints
//! the resulting log history.
//!
//! ```text
//! surfacing-replay script.json [config.json]
//! ```
//!
//! A script is an array of steps:
//!
//! ```json
//! [
//!   { "op": "select", "index": 1 },
//!   { "op": "available", "width": 800, "height": 600 },
//!   { "op": "draw" },
//!   { "op": "resized", "width": 400, "height": 300 },
//!   { "op": "destroyed" }
//! ]
//! ```

use std::fs;
use std::path::Path;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use surfacing::surface::{SurfaceHandle, SurfaceSize};
use surfacing::{SurfacingConfig, SurfacingEngine};

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Step {
    Available { width: u32, height: u32 },
    Resized { width: u32, height: u32 },
    Destroyed,
    Select { index: usize },
    Draw,
}

fn load_config(path: Option<&str>) -> Result<SurfacingConfig> {
    let Some(path) = path else {
        return Ok(SurfacingConfig::default());
    };
    let raw = fs::read_to_string(path).with_context(|| format!("cannot read config {path}"))?;
    let cfg: SurfacingConfig = serde_json::from_str(&raw).with_context(|| format!("invalid config {path}"))?;
    cfg.validate()?;
    Ok(cfg)
}

fn load_script(path: &Path) -> Result<Vec<Step>> {
    let raw = fs::read_to_string(path).with_context(|| format!("cannot read script {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid script {}", path.display()))
}

fn replay(engine: &SurfacingEngine, steps: &[Step]) {
    let mut surface: Option<SurfaceHandle> = None;

    for step in steps {
        log::debug!("step {step:?}");
        match *step {
            Step::Available { width, height } => {
                let handle = SurfaceHandle::new(SurfaceSize::new(width, height));
                surface = Some(handle);
                engine.on_surface_available(handle);
            }
            Step::Resized { width, height } => match surface.as_mut() {
                Some(handle) => {
                    handle.resize(SurfaceSize::new(width, height));
                    engine.on_surface_resized(handle.id(), width, height);
                }
                None => log::warn!("resize without a surface, skipped"),
            },
            Step::Destroyed => match surface.take() {
                Some(handle) => {
                    engine.on_surface_destroyed(handle.id());
                }
                None => log::warn!("destroy without a surface, skipped"),
            },
            Step::Select { index } => engine.on_selection_changed(index),
            Step::Draw => {
                engine.on_draw_requested();
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let Some(script) = args.get(1) else {
        bail!("usage: surfacing-replay <script.json> [config.json]");
    };

    let config = load_config(args.get(2).map(String::as_str))?;
    let steps = load_script(Path::new(script))?;

    let engine = SurfacingEngine::new(Some(config));
    for d in engine.descriptors() {
        log::info!("backend {}: {}", d.index, d.name);
    }

    replay(&engine, &steps);

    if let Some(history) = engine.log_history() {
        for line in history.lines() {
            println!("{line}");
        }
    }
    engine.shutdown();
    Ok(())
}
