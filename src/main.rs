//! Culvert Sizer - field culvert sizing CLI
//!
//! # Usage
//!
//! ```bash
//! # Size from flags
//! culvert-sizer size --top-width 1.0,1.1,0.9 --bottom-width 0.5 --depth 0.2,0.22
//!
//! # With transport and climate inputs, JSON output
//! culvert-sizer size --top-width 1.0 --bottom-width 0.5 --depth 0.2 \
//!     --debris high --sediment-cm 10 --log-diameter-m 0.5 --climate long-term --json
//!
//! # Size from a JSON inputs document and store the assessment
//! culvert-sizer save --input inputs.json --site-name "Km 14.2 crossing" --lat 49.3 --lon -123.1
//!
//! # Review stored assessments
//! culvert-sizer list
//! culvert-sizer report CUL-20240612-143005123 --format markdown --out report.md
//! ```
//!
//! # Environment Variables
//!
//! - `CULVERT_CONFIG`: Path to a sizing config TOML file
//! - `CULVERT_DB`: Assessment database directory (overrides `storage.db_path`)
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use culvert_sizer::config::SizingConfig;
use culvert_sizer::report::{self, ReportFormat};
use culvert_sizer::storage::{AssessmentStore, SledAssessmentStore};
use culvert_sizer::types::{
    AssessmentRecord, ClimateScenario, ClimateScenarioTag, DebrisRating, GpsFix, SiteMetadata,
    SizingInputs, StreamMeasurement, TransportParameters,
};
use culvert_sizer::SizingEngine;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "culvert-sizer")]
#[command(about = "Field culvert sizing: California Method, hydraulic area, transport and climate")]
#[command(version)]
struct CliArgs {
    /// Sizing config TOML (default: $CULVERT_CONFIG, then ./culvert_config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Assessment database directory (default: storage.db_path from config)
    #[arg(long, global = true, env = "CULVERT_DB")]
    db: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Size a culvert and print the result
    Size(SizeArgs),

    /// Size a culvert and store the assessment with its site metadata
    Save {
        #[command(flatten)]
        sizing: SizeArgs,
        #[command(flatten)]
        site: SiteArgs,
    },

    /// List stored assessments, newest first
    List {
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Print one stored assessment as JSON
    Show { id: String },

    /// Render a report for a stored assessment
    Report {
        id: String,
        /// markdown, json or text
        #[arg(long, default_value = "markdown")]
        format: ReportFormat,
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Delete a stored assessment
    Delete { id: String },

    /// Inspect or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,
    /// Validate a config file without using it
    Check { path: PathBuf },
}

#[derive(Args, Debug)]
struct SizeArgs {
    /// JSON inputs document (measurement, transport, climate); overrides flags
    #[arg(long)]
    input: Option<PathBuf>,

    /// Channel top width readings (m), repeat or comma-separate
    #[arg(long = "top-width", value_delimiter = ',')]
    top_widths: Vec<f64>,

    /// Channel bottom width (m)
    #[arg(long)]
    bottom_width: Option<f64>,

    /// Channel depth readings (m), repeat or comma-separate
    #[arg(long = "depth", value_delimiter = ',')]
    depths: Vec<f64>,

    /// Debris rating: low, medium or high (enables transport assessment)
    #[arg(long)]
    debris: Option<DebrisRating>,

    /// Sediment wedge depth (cm)
    #[arg(long)]
    sediment_cm: Option<f64>,

    /// Largest log diameter (m)
    #[arg(long)]
    log_diameter_m: Option<f64>,

    /// Climate scenario: none, near-term, long-term or custom
    #[arg(long)]
    climate: Option<String>,

    /// Custom climate uplift factor (> 1.0); wins over --climate
    #[arg(long)]
    climate_factor: Option<f64>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl SizeArgs {
    fn to_inputs(&self) -> Result<SizingInputs> {
        if let Some(path) = &self.input {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read inputs file {}", path.display()))?;
            return serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse inputs file {}", path.display()));
        }

        let Some(bottom_width) = self.bottom_width else {
            bail!("--bottom-width is required (or use --input)");
        };
        let measurement =
            StreamMeasurement::new(self.top_widths.clone(), bottom_width, self.depths.clone());

        let transport = match self.debris {
            Some(debris_rating) => Some(TransportParameters {
                debris_rating,
                sediment_depth_cm: self.sediment_cm.unwrap_or(0.0),
                max_log_diameter_m: self.log_diameter_m.unwrap_or(0.0),
            }),
            None if self.sediment_cm.is_some() || self.log_diameter_m.is_some() => {
                bail!("--debris is required when sediment or log diameter is given");
            }
            None => None,
        };

        let tag = self
            .climate
            .as_deref()
            .map(|s| s.parse::<ClimateScenarioTag>().unwrap_or(ClimateScenarioTag::Unrecognized));
        // A factor given alongside a named scenario keeps the tag for the record
        let climate = match (tag, self.climate_factor) {
            (Some(scenario), Some(factor)) => Some(ClimateScenario {
                scenario,
                custom_factor: Some(factor),
            }),
            (None, Some(factor)) => Some(ClimateScenario::custom(factor)),
            (Some(tag), None) => Some(ClimateScenario::named(tag)),
            (None, None) => None,
        };

        Ok(SizingInputs {
            measurement,
            transport,
            climate,
        })
    }
}

#[derive(Args, Debug)]
struct SiteArgs {
    #[arg(long)]
    site_name: String,
    #[arg(long)]
    road: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,
    #[arg(long)]
    gps_accuracy_m: Option<f64>,
    /// Photo file references, repeat for several
    #[arg(long = "photo")]
    photos: Vec<String>,
    #[arg(long)]
    notes: Option<String>,
    #[arg(long)]
    assessor: Option<String>,
}

impl SiteArgs {
    fn to_metadata(&self) -> SiteMetadata {
        let gps = match (self.lat, self.lon) {
            (Some(latitude), Some(longitude)) => Some(GpsFix {
                latitude,
                longitude,
                accuracy_m: self.gps_accuracy_m,
            }),
            _ => None,
        };
        SiteMetadata {
            site_name: self.site_name.clone(),
            road_name: self.road.clone(),
            location_description: self.location.clone(),
            gps,
            photos: self.photos.clone(),
            notes: self.notes.clone(),
            assessor: self.assessor.clone(),
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

fn load_config(path: Option<&PathBuf>) -> Result<SizingConfig> {
    match path {
        Some(p) => SizingConfig::load_from_file(p)
            .with_context(|| format!("Failed to load config {}", p.display())),
        None => Ok(SizingConfig::load()),
    }
}

fn open_store(db: Option<&PathBuf>, config: &SizingConfig) -> Result<SledAssessmentStore> {
    let path = db
        .cloned()
        .unwrap_or_else(|| PathBuf::from(&config.storage.db_path));
    SledAssessmentStore::open(&path)
        .with_context(|| format!("Failed to open assessment database {}", path.display()))
}

fn run_size(engine: &SizingEngine, args: &SizeArgs) -> Result<()> {
    let inputs = args.to_inputs()?;
    let result = engine.size_inputs(&inputs).context("Sizing failed")?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", report::render_text(&result));
    }
    Ok(())
}

fn run_save(
    engine: &SizingEngine,
    store: &dyn AssessmentStore,
    sizing: &SizeArgs,
    site: &SiteArgs,
) -> Result<()> {
    let inputs = sizing.to_inputs()?;
    let site = site.to_metadata();
    site.validate().context("Invalid site metadata")?;
    let result = engine.size_inputs(&inputs).context("Sizing failed")?;

    let record = AssessmentRecord::new(site, inputs, result, Utc::now());
    store.save(&record).context("Failed to store assessment")?;
    info!(id = %record.id, backend = store.backend_name(), "Assessment saved");

    if sizing.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("Saved assessment {}", record.id);
        println!("{}", report::render_text(&record.result));
    }
    Ok(())
}

fn run_list(store: &dyn AssessmentStore, limit: usize) -> Result<()> {
    let records = store.list(limit)?;
    if records.is_empty() {
        println!("No assessments stored.");
        return Ok(());
    }
    for r in records {
        println!(
            "{}  {}  {:<30}  {:>5} mm{}",
            r.id,
            r.created_at.format("%Y-%m-%d %H:%M"),
            r.site.site_name,
            r.result.recommended_size_mm,
            if r.result.requires_professional_design {
                "  [professional design]"
            } else {
                ""
            }
        );
    }
    Ok(())
}

fn fetch(store: &dyn AssessmentStore, id: &str) -> Result<AssessmentRecord> {
    store
        .get(id)?
        .with_context(|| format!("No assessment with id '{id}'"))
}

fn run_report(
    store: &dyn AssessmentStore,
    id: &str,
    format: ReportFormat,
    out: Option<&PathBuf>,
) -> Result<()> {
    let record = fetch(store, id)?;
    let rendered = report::render(&record, format)?;
    match out {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write report {}", path.display()))?;
            info!(id = %id, path = %path.display(), "Report written");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn run_config(command: &ConfigCommand, config: &SizingConfig) -> Result<()> {
    match command {
        ConfigCommand::Show => print!("{}", config.to_toml()?),
        ConfigCommand::Check { path } => match SizingConfig::load_from_file(path) {
            Ok(_) => println!("{}: OK", path.display()),
            Err(e) => bail!("{}: {e}", path.display()),
        },
    }
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    let args = CliArgs::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let logger = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if args.log_json {
        logger.json().init();
    } else {
        logger.init();
    }

    let config = load_config(args.config.as_ref())?;

    match &args.command {
        Command::Config(cmd) => run_config(cmd, &config),
        Command::Size(sizing) => {
            let engine = SizingEngine::new(config).context("Invalid sizing config")?;
            run_size(&engine, sizing)
        }
        Command::Save { sizing, site } => {
            let store = open_store(args.db.as_ref(), &config)?;
            let engine = SizingEngine::new(config).context("Invalid sizing config")?;
            run_save(&engine, &store, sizing, site)
        }
        Command::List { limit } => {
            let store = open_store(args.db.as_ref(), &config)?;
            run_list(&store, *limit)
        }
        Command::Show { id } => {
            let store = open_store(args.db.as_ref(), &config)?;
            let record = fetch(&store, id)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Command::Report { id, format, out } => {
            let store = open_store(args.db.as_ref(), &config)?;
            run_report(&store, id, *format, out.as_ref())
        }
        Command::Delete { id } => {
            let store = open_store(args.db.as_ref(), &config)?;
            store.delete(id).with_context(|| format!("Failed to delete '{id}'"))?;
            info!(id = %id, "Assessment deleted");
            println!("Deleted {id}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size_args(extra: &[&str]) -> SizeArgs {
        let mut argv = vec![
            "culvert-sizer",
            "size",
            "--top-width",
            "1.0,1.1",
            "--bottom-width",
            "0.5",
            "--depth",
            "0.2",
        ];
        argv.extend_from_slice(extra);
        match CliArgs::try_parse_from(argv).unwrap().command {
            Command::Size(args) => args,
            other => panic!("expected size command, got {other:?}"),
        }
    }

    #[test]
    fn test_climate_factor_keeps_named_scenario() {
        let inputs = size_args(&["--climate", "long-term", "--climate-factor", "1.3"])
            .to_inputs()
            .unwrap();
        let climate = inputs.climate.as_ref().unwrap();
        assert_eq!(climate.scenario, ClimateScenarioTag::LongTerm);
        assert_eq!(climate.custom_factor, Some(1.3));
        assert!(climate.validate().is_ok());

        let r = SizingEngine::default().size_inputs(&inputs).unwrap();
        assert!((r.climate_factor - 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_climate_factor_alone_is_custom() {
        let inputs = size_args(&["--climate-factor", "1.3"]).to_inputs().unwrap();
        assert_eq!(inputs.climate, Some(ClimateScenario::custom(1.3)));
    }

    #[test]
    fn test_flags_build_measurement_and_transport() {
        let inputs = size_args(&["--debris", "high", "--sediment-cm", "10"])
            .to_inputs()
            .unwrap();
        assert_eq!(inputs.measurement.top_widths_m, vec![1.0, 1.1]);
        let transport = inputs.transport.unwrap();
        assert_eq!(transport.debris_rating, DebrisRating::High);
        assert!(transport.max_log_diameter_m.abs() < f64::EPSILON);
        assert!(inputs.climate.is_none());
    }

    #[test]
    fn test_sediment_without_debris_rejected() {
        assert!(size_args(&["--sediment-cm", "10"]).to_inputs().is_err());
    }
}
