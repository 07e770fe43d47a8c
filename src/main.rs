use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::PathBuf;

use particle_morph::cli::{Cli, Command};
use particle_morph::config::MorphConfig;
use particle_morph::core::TickClock;
use particle_morph::fireworks::{FireworkBurst, FireworkParams};
use particle_morph::loaders::{load_models, GltfSource};
use particle_morph::math::AABB;
use particle_morph::morph::{FrameOutput, InputScript, MorphSession, ScrollInput};

// === Constants ===

const MAX_CATCH_UP_TICKS: u32 = 4;
const RESOLUTION: [f32; 2] = [1920.0, 1080.0];

/// One line of `--json` output
#[derive(Debug, Serialize)]
struct TickReport {
    tick: u32,
    index: usize,
    next_index: usize,
    progress: f32,
    changed: bool,
    camera_position: [f32; 3],
    camera_target: [f32; 3],
}

impl TickReport {
    fn new(tick: u32, frame: &FrameOutput<'_>) -> Self {
        Self {
            tick,
            index: frame.index,
            next_index: frame.next_index,
            progress: frame.progress,
            changed: frame.change.is_some(),
            camera_position: frame.camera.position.to_array(),
            camera_target: frame.camera.target.to_array(),
        }
    }
}

struct MorphRun {
    models: Vec<String>,
    base_dir: Option<PathBuf>,
    script: Option<PathBuf>,
    wheel: f32,
    ticks: u32,
    realtime: bool,
    hz: f32,
    focus: Option<usize>,
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MorphConfig::from_json_file(path)?,
        None => MorphConfig::default(),
    };
    let mut rng = StdRng::seed_from_u64(cli.seed);

    match cli.command {
        Command::Morph {
            models,
            base_dir,
            script,
            wheel,
            ticks,
            realtime,
            hz,
            focus,
            json,
        } => {
            let run = MorphRun {
                models,
                base_dir,
                script,
                wheel,
                ticks,
                realtime,
                hz,
                focus,
                json,
            };
            run_morph(run, config, &mut rng, cli.no_ui)
        }
        Command::Firework { bursts } => run_fireworks(bursts, &mut rng, cli.no_ui),
    }
}

fn run_morph(run: MorphRun, config: MorphConfig, rng: &mut StdRng, quiet: bool) -> Result<()> {
    let script = match &run.script {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read input script: {:?}", path))?;
            Some(InputScript::from_json_str(&text).with_context(|| format!("Invalid input script: {:?}", path))?)
        }
        None => None,
    };

    let source = match &run.base_dir {
        Some(dir) => GltfSource::with_base_dir(dir),
        None => GltfSource::new(),
    };

    let batch = futures::executor::block_on(load_models(&source, &run.models));
    let failed = batch.failures().count();
    if failed > 0 {
        warn!("{} of {} models failed to load", failed, run.models.len());
    }
    let records = batch.into_models();

    let mut session = MorphSession::init(&records, config, rng).context("Failed to start morph session")?;
    if let Some(slot) = run.focus {
        if !session.focus_on(slot) {
            warn!("Cannot focus on model slot {}: no framing", slot);
        }
    }

    let input = session.input_sender();
    let mut step = |tick: u32, dt: f32| -> Result<()> {
        match &script {
            Some(script) => script.inputs_at(tick).for_each(|i| {
                input.send(i);
            }),
            None => {
                input.send(ScrollInput::Wheel { delta_y: run.wheel });
            }
        }

        let frame = session.update(dt)?;
        let report = TickReport::new(tick, &frame);

        if run.json {
            println!("{}", serde_json::to_string(&report)?);
        } else if !quiet {
            println!(
                "tick {:>5}  {} -> {}  progress {:.3}{}",
                report.tick,
                report.index,
                report.next_index,
                report.progress,
                if report.changed { "  *" } else { "" }
            );
        }
        Ok(())
    };

    if run.realtime {
        let mut clock = TickClock::new(run.hz, MAX_CATCH_UP_TICKS);
        let mut tick = 0;
        while tick < run.ticks {
            for _ in 0..clock.due_ticks() {
                if tick >= run.ticks {
                    break;
                }
                step(tick, clock.timestep())?;
                tick += 1;
            }
            std::thread::sleep(clock.until_next());
        }
    } else {
        let dt = 1.0 / run.hz.max(1.0);
        for tick in 0..run.ticks {
            step(tick, dt)?;
        }
    }

    let machine = session.machine();
    let uniforms = session.uniforms(RESOLUTION);
    info!(
        "Finished at index {} (value {:.3}, progress {:.3})",
        machine.index(),
        machine.scroll().value,
        uniforms.progress
    );
    if !quiet && !run.json {
        let camera = session.camera();
        println!(
            "Final: {} particles, model {} -> {}, camera at {:?} looking at {:?}",
            session.particle_count(),
            session.model_names()[machine.index()],
            session.model_names()[machine.next_index()],
            camera.position,
            camera.target
        );
    }

    session.dispose();
    Ok(())
}

fn run_fireworks(bursts: u32, rng: &mut StdRng, quiet: bool) -> Result<()> {
    let params = FireworkParams::default();

    for n in 0..bursts {
        let burst = FireworkBurst::random(rng);
        let layout = burst.layout(&params, rng);
        let bounds = AABB::from_points(&layout.positions).context("Firework produced no particles")?;

        if !quiet {
            println!(
                "burst {}: {} particles at {:?}, color {:?}, extent {:?}",
                n,
                layout.len(),
                burst.position,
                burst.color,
                bounds.size()
            );
        }
    }

    Ok(())
}
