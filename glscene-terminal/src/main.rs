/// glscene terminal demos
///
/// Runs one of the demo scenes in the terminal:
///   - `shooter`: launch a ball at spinning target cubes
///   - `terrain <png>`: heightmap terrain with a spinning cube
///   - `showcase <obj>...`: OBJ models under a flying camera
///
/// Q/ESC quits; the other keys are listed in the status line.
use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use glscene_core::{LoadError, ShooterConfig, ShowcaseConfig, TerrainConfig};
use glscene_terminal::{showcase, terrain, Scene, ShooterScene, ShowcaseScene, TerminalApp, TerrainScene};

#[derive(Parser)]
#[command(name = "glscene-terminal", about = "WebGL demo scenes rendered as ASCII", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Shoot a ball at the target cubes
    Shooter {
        /// Number of balls available
        #[arg(long, default_value_t = ShooterConfig::default().shots)]
        shots: u32,
        /// Distance at which the ball hits a target
        #[arg(long, default_value_t = ShooterConfig::default().hit_radius)]
        hit_radius: f32,
    },
    /// Render terrain from a heightmap image
    Terrain {
        /// Image whose red channel holds the heights
        heightmap: PathBuf,
    },
    /// Fly the camera around OBJ models
    Showcase {
        /// House, statue and figure models, in that order
        #[arg(required = true, num_args = 1..=3)]
        models: Vec<String>,
        /// Camera fly-through duration in milliseconds
        #[arg(long, default_value_t = 10_000.0)]
        duration: f64,
    },
}

fn load_error(err: LoadError) -> io::Error {
    let kind = match &err {
        LoadError::Asset(_) => io::ErrorKind::NotFound,
        LoadError::Parse { .. } => io::ErrorKind::InvalidData,
    };
    io::Error::new(kind, err)
}

fn build_scene(command: Command) -> io::Result<Box<dyn Scene>> {
    let scene: Box<dyn Scene> = match command {
        Command::Shooter { shots, hit_radius } => Box::new(ShooterScene::new(ShooterConfig {
            shots,
            hit_radius,
            ..ShooterConfig::default()
        })),
        Command::Terrain { heightmap } => {
            let heightmap = terrain::load_heightmap(&heightmap)?;
            Box::new(TerrainScene::new(TerrainConfig::default(), &heightmap))
        }
        Command::Showcase { models, duration } => {
            let models = showcase::load_models(&models).map_err(load_error)?;
            Box::new(ShowcaseScene::new(ShowcaseConfig::default(), &models, duration))
        }
    };
    Ok(scene)
}

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let scene = build_scene(cli.command)?;

    let mut app = TerminalApp::new(scene)?;
    app.run()
}
