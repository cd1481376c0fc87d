use clap::Subcommand;
use std::path::PathBuf;

pub mod geo;
pub mod scene;
pub mod tricks;

#[derive(Subcommand)]
pub enum Commands {
    /// Scene graph bin operations
    Scene {
        #[command(subcommand)]
        command: SceneCommands,
    },

    /// tricks.bin operations
    Tricks {
        #[command(subcommand)]
        command: TricksCommands,
    },

    /// GEO file operations
    Geo {
        #[command(subcommand)]
        command: GeoCommands,
    },
}

#[derive(Subcommand)]
pub enum SceneCommands {
    /// Summarise the records of a scene graph bin
    Inspect {
        /// Scene graph bin
        path: PathBuf,

        /// Required checksum (0 accepts any)
        #[arg(long, default_value_t = scene_graph_crc())]
        crc: u32,
    },

    /// Load a whole map and list its top-level nodes
    Load {
        /// Map bin, inside the geobin directory of the game data root
        path: PathBuf,

        /// Game data root (defaults to the directory above geobin)
        #[arg(long)]
        data: Option<PathBuf>,

        /// JSON import configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write a JSON summary of the scene graph
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum TricksCommands {
    /// List geometry and texture modifiers
    Inspect {
        /// tricks.bin file
        path: PathBuf,

        /// Only list modifiers whose name contains this text
        #[arg(long)]
        filter: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum GeoCommands {
    /// Show textures and models of a GEO file
    Inspect {
        /// GEO file to inspect
        path: PathBuf,
    },

    /// Decode meshes to JSON
    Extract {
        /// Source GEO file
        path: PathBuf,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Only decode this model
        #[arg(long)]
        model: Option<String>,
    },

    /// Decode every model of every GEO file under a directory
    Validate {
        /// Directory to scan
        dir: PathBuf,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },
}

fn scene_graph_crc() -> u32 {
    crate::formats::scene_graph::SCENE_GRAPH_CRC
}

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Scene { command } => match command {
                SceneCommands::Inspect { path, crc } => scene::inspect(path, *crc),
                SceneCommands::Load {
                    path,
                    data,
                    config,
                    json,
                } => scene::load(path, data.as_deref(), config.as_deref(), json.as_deref()),
            },
            Commands::Tricks { command } => match command {
                TricksCommands::Inspect { path, filter } => tricks::inspect(path, filter.as_deref()),
            },
            Commands::Geo { command } => match command {
                GeoCommands::Inspect { path } => geo::inspect(path),
                GeoCommands::Extract { path, output, model } => geo::extract(path, output, model.as_deref()),
                GeoCommands::Validate { dir, quiet } => geo::validate(dir, *quiet),
            },
        }
    }
}
