use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

pub mod commands;
pub mod error;
mod templates;
pub mod util;

use commands::client::{ListReply, StoreClient};
use commands::config;
use commands::plot::{self, RenderOptions};
use commands::{project, server, trajectory};

#[derive(Parser, Debug)]
#[command(
    name = "handtrace",
    version,
    about = "Sample store and trajectory viewer for hand-tracking captures"
)]
struct Cli {
    /// Config file (default: ~/.handtrace/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the sample store HTTP server.
    Serve {
        /// Directory list and save paths are resolved against
        #[arg(long)]
        root: Option<String>,
        /// Static asset directory (relative paths are under the root)
        #[arg(long)]
        static_dir: Option<String>,
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Largest accepted request body
        #[arg(long)]
        max_body_bytes: Option<usize>,
    },

    /// Plot two vector fields of a capture file as 3D trajectories.
    View {
        /// JSON array of sample records
        file: PathBuf,
        /// The two fields to plot, comma separated
        #[arg(long, value_delimiter = ',')]
        fields: Option<Vec<String>>,
        /// Output SVG (default: next to the input)
        #[arg(long, short)]
        output: Option<PathBuf>,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        /// Rotation around the vertical axis, in radians
        #[arg(long, allow_negative_numbers = true)]
        yaw: Option<f64>,
        /// Elevation, in radians
        #[arg(long, allow_negative_numbers = true)]
        pitch: Option<f64>,
        /// Open the plot in the system viewer
        #[arg(long)]
        open: bool,
    },

    /// Send a local capture to a running store.
    Upload {
        file: PathBuf,
        /// Name to save under (default: the file name)
        #[arg(long)]
        name: Option<String>,
        /// Store base URL
        #[arg(long)]
        server: Option<String>,
    },

    /// List a directory on a running store.
    Ls {
        path: String,
        /// Store base URL
        #[arg(long)]
        server: Option<String>,
    },

    /// Write the store page and a default config.
    Init {
        /// Store root to set up
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Skip writing the config file
        #[arg(long)]
        no_config: bool,
    },
}

pub fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let load = || config::load_config(cli.config.as_deref());

    match cli.command {
        Commands::Serve {
            root,
            static_dir,
            host,
            port,
            max_body_bytes,
        } => {
            let mut cfg = load()?;
            if let Some(root) = root {
                cfg.root = root;
            }
            if let Some(static_dir) = static_dir {
                cfg.static_dir = static_dir;
            }
            if let Some(host) = host {
                cfg.host = host;
            }
            if let Some(port) = port {
                cfg.port = port;
            }
            if let Some(limit) = max_body_bytes {
                cfg.max_body_bytes = limit;
            }
            runtime()?.block_on(server::serve(&cfg))?;
        }
        Commands::View {
            file,
            fields,
            output,
            width,
            height,
            yaw,
            pitch,
            open,
        } => {
            let fields = match fields {
                Some(f) => f,
                None => load()?.fields,
            };
            let mut options = RenderOptions::for_input(&file);
            if let Some(output) = output {
                options.output = output;
            }
            options.width = width.unwrap_or(options.width);
            options.height = height.unwrap_or(options.height);
            options.yaw = yaw.unwrap_or(options.yaw);
            options.pitch = pitch.unwrap_or(options.pitch);

            let written = view(&file, &fields, &options)?;
            println!("{}", written.display());
            if open {
                plot::open_in_viewer(&written)?;
            }
        }
        Commands::Upload { file, name, server } => {
            let server = match server {
                Some(s) => s,
                None => load()?.server,
            };
            let client = StoreClient::new(&server);
            let saved = runtime()?.block_on(commands::client::upload_file(
                &client,
                &file,
                name.as_deref(),
            ))?;
            println!("okay: {saved}");
        }
        Commands::Ls { path, server } => {
            let server = match server {
                Some(s) => s,
                None => load()?.server,
            };
            let client = StoreClient::new(&server);
            match runtime()?.block_on(client.list(&path))? {
                ListReply::Files { files } => {
                    for file in files {
                        println!("{file}");
                    }
                }
                ListReply::Failed { error, kind } => {
                    anyhow::bail!("{error}: {}", kind.as_deref().unwrap_or("unknown"));
                }
            }
        }
        Commands::Init { dir, no_config } => {
            let config_file = if no_config {
                None
            } else {
                cli.config.clone().or_else(config::config_path)
            };
            for path in project::init_store(&dir, config_file.as_deref())? {
                println!("wrote {}", path.display());
            }
        }
    }

    Ok(())
}

/// Load `file`, extract both fields and render them. Nothing is written if any record is bad.
pub fn view(file: &Path, fields: &[String], options: &RenderOptions) -> anyhow::Result<PathBuf> {
    let [a, b] = fields else {
        anyhow::bail!("expected exactly two fields, got {}", fields.len());
    };

    let records = trajectory::load_records(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let pair = trajectory::extract_pair(&records, [a.as_str(), b.as_str()])?;
    Ok(plot::render(&pair, options)?)
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")
}
