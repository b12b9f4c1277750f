#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the ecosystem simulation at a fixed cadence.

mod config;

use std::{io, thread};

use anyhow::{Context, Result};
use clap::Parser;
use ecosystem_rendering::{RenderingBackend, Scene, TextRenderer};
use ecosystem_system_census::Census;
use ecosystem_system_seeding::seed;
use ecosystem_world::World;
use tracing::{info, warn};

use crate::config::{CliArgs, Settings};

/// Entry point for the ecosystem command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let settings = CliArgs::parse().resolve()?;
    let mut renderer = TextRenderer::new(io::stdout().lock(), settings.clear_screen);
    run(&settings, &mut renderer)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

fn run<B: RenderingBackend>(settings: &Settings, backend: &mut B) -> Result<()> {
    let mut world = World::with_seed(settings.width, settings.height, settings.seed)
        .context("failed to create world")?;
    let mut events = Vec::new();
    let placed = seed(&settings.population, &mut world, &mut events)
        .context("failed to seed initial population")?;
    info!(
        width = settings.width,
        height = settings.height,
        seed = settings.seed,
        %placed,
        "simulation started"
    );

    let mut census = Census::new();
    let mut iteration = 0_u64;
    loop {
        backend.present(&Scene::capture(&world, iteration))?;

        if world.occupied_cells_count() == 0 {
            warn!(iteration, "no occupied cells left, ecosystem collapsed");
            break;
        }
        if settings.max_ticks.is_some_and(|max| iteration >= max) {
            break;
        }

        thread::sleep(settings.interval);
        events.clear();
        world
            .tick(&mut events)
            .with_context(|| format!("tick {} failed", iteration + 1))?;
        let report = census.handle(&events, &world);
        info!(%report, "census");
        iteration += 1;
    }

    info!(ticks = iteration, "simulation finished");
    Ok(())
}
