mod layout;
mod svg;

use clap::{Parser, Subcommand};
use schem_common::db::parser::csv;
use schem_common::util::config::Config;
use schem_common::util::{check, generator, logger, visualization};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the circuit CSVs, place, route and render the schematic.
    Draw,
    /// Write a random benchmark circuit as a set of input CSVs.
    Generate {
        #[arg(long, default_value_t = 12)]
        chips: usize,
        #[arg(long, default_value_t = 20)]
        nets: usize,
        #[arg(long, default_value = "inputs")]
        output: String,
    },
}

fn main() -> anyhow::Result<()> {
    logger::init();
    let args = Args::parse();

    let config = if args.config.exists() {
        log::info!("Loading configuration from {:?}", args.config);
        let config_str = std::fs::read_to_string(&args.config)
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;
        toml::from_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?
    } else {
        log::warn!(
            "Configuration file {:?} not found. Using internal defaults.",
            args.config
        );
        Config::default()
    };

    match args.command.unwrap_or(Commands::Draw) {
        Commands::Generate {
            chips,
            nets,
            output,
        } => {
            generator::generate_random_circuit(&output, chips, nets)?;
            log::info!("Generated benchmark circuit under '{}'.", output);
        }
        Commands::Draw => {
            validate_input_paths(&config)?;
            prepare_output_dir(&config.input.output_svg)?;
            prepare_output_dir(&config.input.output_png)?;

            if run_draw(&config).is_err() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn validate_input_paths(config: &Config) -> anyhow::Result<()> {
    for path in [
        &config.input.datasheets_csv,
        &config.input.chips_csv,
        &config.input.connections_csv,
    ] {
        if !Path::new(path).exists() {
            return Err(anyhow::anyhow!("Input CSV file missing: {}", path));
        }
    }
    Ok(())
}

fn prepare_output_dir(path_str: &str) -> anyhow::Result<()> {
    if let Some(parent) = Path::new(path_str).parent() {
        if !parent.exists() && !parent.as_os_str().is_empty() {
            log::info!("Creating output directory: {:?}", parent);
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn run_draw(config: &Config) -> anyhow::Result<()> {
    let datasheets = csv::load_datasheets(&config.input.datasheets_csv)?;
    let chips = csv::load_chips(&config.input.chips_csv, &datasheets)?;
    let (connections, inputs, outputs) = csv::load_connections(&config.input.connections_csv)?;

    let db = layout::build_circuit(
        &datasheets,
        &chips,
        &connections,
        &inputs,
        &outputs,
        &config.layout,
        config.routing.obstacle_padding,
    )?;

    let outcome = schem_router::route(&db, &config.routing)?;
    for failure in outcome.failed.values() {
        let (from, to) = &failure.connection;
        log::warn!(
            "Unrouted {}.{} -> {}.{}: {}",
            from.chip,
            from.pin,
            to.chip,
            to.pin,
            failure.reason
        );
    }

    log::info!("Writing schematic SVG to {}", config.input.output_svg);
    svg::write_schematic(&db, &outcome, &config.input.output_svg)?;

    let png_width = 1600u32;
    let png_height =
        ((png_width as f64) * db.canvas.height() / db.canvas.width()).round() as u32;
    log::info!("Rendering schematic PNG to {}", config.input.output_png);
    visualization::draw_routed_circuit(
        &db,
        &outcome.routed,
        &config.input.output_png,
        png_width,
        png_height.max(1),
    );

    check::run(&db, &outcome.routed, config.routing.obstacle_padding)
        .map_err(|e| anyhow::anyhow!("Verification Failed: {}", e))?;

    Ok(())
}
