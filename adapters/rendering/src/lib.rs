#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts and the plain-text renderer for ecosystem adapters.

use std::io::Write;

use anyhow::{Context, Result as AnyResult};
use ecosystem_core::{CellCoord, PopulationCounts};
use ecosystem_world::{query, World};

/// ANSI sequence that clears the terminal and homes the cursor.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Read-only snapshot of everything a frame displays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scene {
    /// Symbol rows, one per x coordinate, each holding `height` symbols.
    pub rows: Vec<Vec<char>>,
    /// Live entities per species.
    pub population: PopulationCounts,
    /// Iteration number shown in the status line.
    pub iteration: u64,
    /// Number of occupied cells.
    pub occupied_cells: usize,
}

impl Scene {
    /// Captures the world as it stands, labelled with the given iteration.
    #[must_use]
    pub fn capture(world: &World, iteration: u64) -> Self {
        let size = query::grid_size(world);
        let rows = (0..size.width())
            .map(|x| {
                (0..size.height())
                    .map(|y| query::cell_symbol(world, CellCoord::new(x, y)))
                    .collect()
            })
            .collect();

        Self {
            rows,
            population: query::population(world),
            iteration,
            occupied_cells: query::occupied_cells_count(world),
        }
    }
}

/// Rendering backend capable of presenting ecosystem scenes.
pub trait RenderingBackend {
    /// Presents a single frame.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

/// Backend that writes scenes as text, one grid line per x coordinate.
#[derive(Debug)]
pub struct TextRenderer<W> {
    output: W,
    clear_screen: bool,
}

impl<W: Write> TextRenderer<W> {
    /// Creates a renderer writing into `output`, optionally clearing the
    /// terminal before every frame.
    pub const fn new(output: W, clear_screen: bool) -> Self {
        Self {
            output,
            clear_screen,
        }
    }

    /// Consumes the renderer and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.output
    }
}

impl<W: Write> RenderingBackend for TextRenderer<W> {
    fn present(&mut self, scene: &Scene) -> AnyResult<()> {
        let frame = render_frame(scene);
        if self.clear_screen {
            self.output
                .write_all(CLEAR_SCREEN.as_bytes())
                .context("failed to clear terminal")?;
        }
        self.output
            .write_all(frame.as_bytes())
            .context("failed to write frame")?;
        self.output.flush().context("failed to flush frame")
    }
}

/// Formats the symbol grid followed by the population summary line.
#[must_use]
pub fn render_grid(scene: &Scene) -> String {
    let mut text = String::new();
    for row in &scene.rows {
        for symbol in row {
            text.push(*symbol);
            text.push(' ');
        }
        text.push('\n');
    }
    text.push_str(&scene.population.to_string());
    text.push('\n');
    text
}

/// Formats the per-iteration status line.
#[must_use]
pub fn status_line(scene: &Scene) -> String {
    format!(
        "Iteration: {} - Occupied Cells: {}",
        scene.iteration, scene.occupied_cells
    )
}

/// Formats a complete frame: grid, population summary, and status line.
#[must_use]
pub fn render_frame(scene: &Scene) -> String {
    let mut frame = render_grid(scene);
    frame.push_str(&status_line(scene));
    frame.push('\n');
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecosystem_core::Species;
    use ecosystem_world::Entity;

    fn scene() -> Scene {
        let mut world = World::new(2, 3).expect("valid dimensions");
        world
            .add_entity(Entity::new(Species::Carnivore, CellCoord::new(0, 1)))
            .expect("empty cell");
        world
            .add_entity(Entity::new(Species::Plant, CellCoord::new(1, 2)))
            .expect("empty cell");
        Scene::capture(&world, 4)
    }

    #[test]
    fn grid_prints_one_line_per_x() {
        assert_eq!(
            render_grid(&scene()),
            ". C . \n. . * \nPlants: 1, Herbivores: 0, Carnivores: 1\n"
        );
    }

    #[test]
    fn status_line_reports_iteration_and_occupancy() {
        assert_eq!(status_line(&scene()), "Iteration: 4 - Occupied Cells: 2");
    }

    #[test]
    fn text_renderer_clears_before_frame_when_requested() {
        let mut renderer = TextRenderer::new(Vec::new(), true);
        renderer.present(&scene()).expect("in-memory write");
        let written = String::from_utf8(renderer.into_inner()).expect("utf-8");
        assert!(written.starts_with(CLEAR_SCREEN));
        assert!(written.ends_with("Iteration: 4 - Occupied Cells: 2\n"));
    }

    #[test]
    fn text_renderer_without_clearing_writes_frame_only() {
        let mut renderer = TextRenderer::new(Vec::new(), false);
        renderer.present(&scene()).expect("in-memory write");
        let written = String::from_utf8(renderer.into_inner()).expect("utf-8");
        assert_eq!(written, render_frame(&scene()));
    }
}
