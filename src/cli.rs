// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "keyaxis")]
#[command(author, version, about = "Analog keyboard to virtual joystick axes")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Axis config file (default: ~/.config/keyaxis/keyaxis.cfg)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the axis config and print the resulting table
    #[command(visible_alias = "check")]
    CheckConfig,

    /// Write the default axis table (WASD) to the config file
    #[command(visible_alias = "init")]
    InitConfig {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Play a frame script through an in-memory keyboard
    #[command(visible_alias = "sim")]
    Simulate {
        /// Script file, one frame per line (KEY=TRAVEL tokens)
        #[arg(short, long)]
        script: PathBuf,

        /// Print plugin logs the way the host log shows them
        #[arg(long)]
        host_log: bool,
    },

    /// Drive a virtual joystick from the Wooting analog SDK
    #[cfg(all(feature = "wooting", feature = "uinput", target_os = "linux"))]
    Run {
        /// Frames per second
        #[arg(short, long, default_value = "120")]
        rate: u32,
    },
}
