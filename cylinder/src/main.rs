mod app;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use cylinder_core::DriverKind;
use log::info;
use std::path::PathBuf;

/// Scroll text across a serpentine WS281x LED panel
#[derive(Parser, Debug)]
#[command(name = "cylinder")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.config/cylinder/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured display driver
    #[arg(long, global = true, value_enum)]
    driver: Option<DriverArg>,

    /// Override the font sheet path
    #[arg(long, global = true)]
    font: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Listen for JSON display requests and scroll them as they arrive (default)
    Serve {
        /// Address to listen on, e.g. 0.0.0.0:7890
        #[arg(short, long)]
        listen: Option<String>,
    },
    /// Scroll one message and exit
    Show {
        text: String,
        /// Colour as #RRGGBB or #RGB
        #[arg(long, default_value = "#ffffff")]
        color: String,
        /// Frame delay in milliseconds
        #[arg(long)]
        delay: Option<u64>,
    },
    /// Light the strip one LED at a time
    Wipe {
        #[arg(long, default_value = "#ff0000")]
        color: String,
        /// Step delay in milliseconds
        #[arg(long)]
        delay: Option<u64>,
    },
    /// Turn every light off
    Clear,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DriverArg {
    Spi,
    Console,
}

impl From<DriverArg> for DriverKind {
    fn from(arg: DriverArg) -> Self {
        match arg {
            DriverArg::Spi => DriverKind::Spi,
            DriverArg::Console => DriverKind::Console,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = cylinder_core::Config::load(cli.config)?;
    if let Some(driver) = cli.driver {
        config.driver.kind = driver.into();
    }
    if let Some(font) = cli.font {
        config.font.sheet = font;
    }
    info!("Loaded configuration: {:?}", config);

    match cli.command.unwrap_or(Command::Serve { listen: None }) {
        Command::Serve { listen } => {
            if let Some(listen) = listen {
                config.listener.bind = listen;
            }
            let app = app::App::new(config)?;
            app.serve().await
        }
        Command::Show { text, color, delay } => {
            if let Some(delay) = delay {
                config.scroll.delay_ms = delay;
            }
            let app = app::App::new(config)?;
            app.show(text, &color).await
        }
        Command::Wipe { color, delay } => {
            if let Some(delay) = delay {
                config.scroll.wipe_delay_ms = delay;
            }
            let app = app::App::new(config)?;
            app.wipe(&color).await
        }
        Command::Clear => {
            let app = app::App::new(config)?;
            app.clear().await
        }
    }
}
