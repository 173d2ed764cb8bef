use std::{collections::BTreeMap, fs, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use canopy::{
    batch::{select_coverage, Planter},
    config::{ConfigLoader, StreetConfig},
    conversion_plan::{plan_asphalt_conversion, ConversionRequest},
    loader, logger,
    rng::{self, RngManager},
    species::Species,
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Tree placement on underused paved surfaces")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sample tree positions over every rectangle in a run config
    Trees {
        /// Path to the run config YAML file
        #[arg(long, default_value = "data/sf_demo.yaml")]
        config: PathBuf,

        /// Trees per square meter (uses the config density when omitted)
        #[arg(long)]
        density: Option<f64>,

        /// Share of rectangles to plant, between 0 and 1
        #[arg(long, default_value_t = 1.0)]
        percentage: f64,

        /// Override the config seed
        #[arg(long)]
        seed: Option<u64>,

        /// Write trees here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Turn a street centerline CSV into street-side rectangle JSON
    Streets {
        #[arg(long)]
        csv: PathBuf,

        /// Only keep rows with a positive PRKG_SPLY parking supply
        #[arg(long)]
        parking: bool,

        /// Distance from the centerline to each strip, in meters
        #[arg(long, default_value_t = 1.5)]
        offset: f64,

        /// Strip width in meters
        #[arg(long, default_value_t = 3.0)]
        width: f64,

        /// Defaults to <csv>_rectangles.json
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Estimate the cost and carbon of converting asphalt to planted area
    Plan {
        #[arg(long)]
        asphalt_sqft: f64,

        /// Species share as name=fraction, repeatable
        #[arg(long = "species", value_parser = parse_species_share)]
        species: Vec<(Species, f64)>,

        #[arg(long, default_value_t = 100.0)]
        spacing_sqft_per_tree: f64,

        #[arg(long, default_value_t = 10.0)]
        cost_removal_per_sqft: f64,

        #[arg(long, default_value_t = 5)]
        maintenance_years: u32,
    },
    /// Serve trees and conversion plans over HTTP
    Serve {
        #[arg(long, default_value = "data/sf_demo.yaml")]
        config: PathBuf,

        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },
}

fn parse_species_share(text: &str) -> Result<(Species, f64)> {
    let (name, fraction) = text
        .split_once('=')
        .ok_or_else(|| anyhow!("expected name=fraction, got '{text}'"))?;
    let species = Species::from_name(name.trim())
        .ok_or_else(|| anyhow!("unknown species '{}'", name.trim()))?;
    let fraction = fraction
        .trim()
        .parse::<f64>()
        .with_context(|| format!("invalid fraction in '{text}'"))?;
    Ok((species, fraction))
}

fn main() -> Result<()> {
    logger::setup();
    let cli = Cli::parse();
    let configs = ConfigLoader::new(".");

    match cli.command {
        Command::Trees {
            config,
            density,
            percentage,
            seed,
            output,
        } => {
            let config = configs.load(&config)?;
            let rectangles = config.load_rectangles()?;
            let rng = RngManager::from_optional_seed(seed.or(config.seed));
            let selected =
                select_coverage(&rectangles, percentage, &mut rng.stream(rng::SELECTION))?;
            let density = density.unwrap_or(config.density);
            let result = Planter::new(&rng).plant(&selected, density)?;
            let json = serde_json::to_string_pretty(&result.trees)?;
            match output {
                Some(path) => fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{json}"),
            }
            log::info!(
                "'{}': {} trees over {:.1} m2 (expected {})",
                config.name,
                result.summary.actual_tree_count,
                result.summary.total_area,
                result.summary.expected_tree_count
            );
        }
        Command::Streets {
            csv,
            parking,
            offset,
            width,
            output,
        } => {
            let street = StreetConfig {
                offset_meters: offset,
                width_meters: width,
            };
            let rectangles = if parking {
                loader::load_street_parking(&csv, &street)?.rectangles
            } else {
                loader::load_street_segments(&csv, &street)?
            };
            let output = output.unwrap_or_else(|| {
                let stem = csv.with_extension("");
                PathBuf::from(format!("{}_rectangles.json", stem.display()))
            });
            loader::write_rectangles_json(&output, &rectangles)?;
            println!(
                "Wrote {} rectangles to {}",
                rectangles.len(),
                output.display()
            );
        }
        Command::Plan {
            asphalt_sqft,
            species,
            spacing_sqft_per_tree,
            cost_removal_per_sqft,
            maintenance_years,
        } => {
            let distribution: BTreeMap<Species, f64> = species.into_iter().collect();
            let mut request = ConversionRequest::new(asphalt_sqft, distribution);
            request.spacing_sqft_per_tree = spacing_sqft_per_tree;
            request.cost_removal_per_sqft = cost_removal_per_sqft;
            request.maintenance_years = maintenance_years;
            let plan = plan_asphalt_conversion(&request)?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Serve { config, host, port } => {
            let config = configs.load(&config)?;
            let rectangles = config.load_rectangles()?;
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(web::run(WebServerConfig {
                rectangles,
                seed: config.seed,
                host: host.unwrap_or(config.server.host),
                port: port.unwrap_or(config.server.port),
            }))?;
        }
    }
    Ok(())
}
