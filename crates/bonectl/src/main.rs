// Tooling crate: unwrap/expect acceptable outside the pin path.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod commands;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use bone_hw::{Bone, PWM_TEMPLATE};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use platform::{HwConfig, PinState};

#[derive(Parser)]
#[command(name = "bonectl")]
#[command(about = "Pin mode, PWM, GPIO and analog control over sysfs", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory the kernel tree is resolved against (default: $BONE_SYSFS_ROOT or /)
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    /// JSON pin table (default: $BONE_PINS or the bundled BeagleBone table)
    #[arg(long, global = true)]
    pins: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Level {
    High,
    Low,
}

impl From<Level> for PinState {
    fn from(level: Level) -> Self {
        match level {
            Level::High => PinState::High,
            Level::Low => PinState::Low,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Route a pin to GPIO (mux mode 7) or PWM
    Mode {
        pin: String,
        /// Pad configuration, decimal or 0x-prefixed hex; mode bits 0b111 select GPIO
        #[arg(value_parser = commands::parse_pin_data)]
        data: u32,
        /// Overlay template for non-GPIO modes
        #[arg(default_value = PWM_TEMPLATE)]
        template: String,
    },
    /// Set PWM frequency and duty ratio, muxing the pin to PWM first
    Pwm {
        pin: String,
        /// Frequency in Hz
        freq: f64,
        /// Duty ratio, clamped to 0.0..=1.0
        duty: f64,
        /// Pad configuration used when muxing
        #[arg(long, default_value = "0x06", value_parser = commands::parse_pin_data)]
        data: u32,
        /// Use the already exported channel; leave the mux alone
        #[arg(long)]
        attach: bool,
    },
    /// Read PWM frequency and duty ratio back from the kernel
    PwmRead { pin: String },
    /// Drive a pin high or low
    GpioWrite {
        pin: String,
        #[arg(value_enum)]
        level: Level,
        /// Export the line and set it to output first
        #[arg(long)]
        export: bool,
    },
    /// Read a pin level
    GpioRead { pin: String },
    /// Read an analog input (0.0..=1.0 of 1.8 V)
    Ain { pin: String },
    /// Decode the pad configuration from the pinctrl debug dump
    Mux {
        pin: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show board name, revision, serial number and image tag
    Board {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn config(cli: &Cli) -> HwConfig {
    let mut config = HwConfig::from_env();
    if let Some(root) = &cli.root {
        config.sysfs_root.clone_from(root);
    }
    if let Some(pins) = &cli.pins {
        config.pin_table = Some(pins.clone());
    }
    config
}

fn run(cli: Cli) -> Result<String> {
    let config = config(&cli);
    let bone = Bone::from_config(&config).context("Failed to open board")?;

    match cli.command {
        Commands::Mode {
            pin,
            data,
            template,
        } => commands::mode(&bone, &pin, data, &template),
        Commands::Pwm {
            pin,
            freq,
            duty,
            data,
            attach,
        } => commands::pwm(&bone, &pin, freq, duty, data, attach),
        Commands::PwmRead { pin } => commands::pwm_read(&bone, &pin),
        Commands::GpioWrite { pin, level, export } => {
            commands::gpio_write(&bone, &pin, level.into(), export)
        }
        Commands::GpioRead { pin } => commands::gpio_read(&bone, &pin),
        Commands::Ain { pin } => commands::ain(&bone, &pin),
        Commands::Mux { pin, json } => commands::mux(&bone, &pin, json),
        Commands::Board { json } => commands::board(&bone, json),
    }
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
