//! `csvdedupe` - find duplicate rows in one CSV file and write them back out
//! with a cluster id.

use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, info};

use csvdedupe_recon::output::{write_to, Destination};
use csvdedupe_recon::{
    ingest, read_source, reconcile_all, reconcile_unique, ClusterAssignment, Deduplicator,
    ExactKeyResolver, ResolutionFile,
};

use crate::config::{FieldDefinition, FileConfig, TrainingSettings};
use crate::{logging, CliError};

#[derive(Parser, Debug)]
#[command(name = "csvdedupe")]
#[command(about = "Deduplicate a CSV file, tagging rows that refer to the same entity")]
#[command(version)]
#[command(after_help = "\
Examples:
  csvdedupe people.csv --field_names name address city
  csvdedupe people.csv --field_names name city --output_file out.csv
  csvdedupe people.csv --field_names name city --clusters clusters.json
  csvdedupe people.csv --field_names name city --destructive
  cat people.csv | csvdedupe - --field_names name
  csvdedupe --config_file dedupe.json")]
pub struct DedupeArgs {
    /// CSV file to deduplicate (- for stdin)
    pub input: Option<PathBuf>,

    /// Path to configuration file (JSON, or TOML with a .toml extension)
    #[arg(long = "config_file")]
    pub config_file: Option<PathBuf>,

    /// Column names to pay attention to
    #[arg(long = "field_names", num_args = 1..)]
    pub field_names: Option<Vec<String>>,

    /// CSV file to store results (default: stdout)
    #[arg(long = "output_file")]
    pub output_file: Option<PathBuf>,

    /// Write one row per cluster instead of annotating every row
    #[arg(long)]
    pub destructive: bool,

    /// Clusters produced by an external resolution engine (JSON)
    #[arg(long)]
    pub clusters: Option<PathBuf>,

    /// Skip labeling examples and read training from training_file only
    #[arg(long = "skip_training")]
    pub skip_training: bool,

    /// Path to a new or existing file of labeled training examples
    #[arg(long = "training_file")]
    pub training_file: Option<PathBuf>,

    /// Number of random sample pairs to train off of
    #[arg(long = "sample_size")]
    pub sample_size: Option<u32>,

    /// Weight of recall relative to precision when picking a threshold
    #[arg(long = "recall_weight")]
    pub recall_weight: Option<u32>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Fully merged csvdedupe settings.
#[derive(Debug, Clone)]
pub struct DedupeSettings {
    pub input: PathBuf,
    pub field_names: Vec<String>,
    pub field_definition: Vec<FieldDefinition>,
    pub output: Destination,
    pub destructive: bool,
    pub clusters: Option<PathBuf>,
    pub training: TrainingSettings,
}

impl DedupeSettings {
    pub fn resolve(args: DedupeArgs) -> Result<Self, CliError> {
        let file = FileConfig::load_optional(args.config_file.as_deref())?;

        if file.input.len() > 1 {
            return Err(CliError::usage("csvdedupe takes exactly one input file")
                .with_hint("use csvlink to match two files"));
        }
        let input = args
            .input
            .or_else(|| file.input.first().map(PathBuf::from))
            .ok_or_else(|| {
                CliError::usage("no input file given")
                    .with_hint("Must provide either a config_file or input and field_names")
            })?;

        let field_names = args
            .field_names
            .or_else(|| file.field_names.clone())
            .filter(|f| !f.is_empty())
            .ok_or_else(|| {
                CliError::usage("no field names given")
                    .with_hint("Must provide either a config_file or input and field_names")
            })?;

        let field_definition = file
            .field_definition
            .clone()
            .unwrap_or_else(|| FieldDefinition::defaults_for(&field_names));

        let training = TrainingSettings::resolve(
            &file,
            args.skip_training,
            args.training_file,
            args.sample_size,
            args.recall_weight,
        );

        Ok(Self {
            input,
            field_names,
            field_definition,
            output: Destination::from_option(args.output_file.or(file.output_file).as_deref()),
            destructive: args.destructive || file.destructive.unwrap_or(false),
            clusters: args.clusters.or(file.clusters),
            training,
        })
    }

    /// Selected fields plus any extra field the definition mentions.
    fn required_fields(&self) -> Vec<String> {
        let mut fields = self.field_names.clone();
        for def in &self.field_definition {
            if !fields.contains(&def.field) {
                fields.push(def.field.clone());
            }
        }
        fields
    }
}

pub fn run(args: DedupeArgs) -> Result<(), CliError> {
    logging::init(args.verbose);
    let settings = DedupeSettings::resolve(args)?;
    execute(&settings)
}

pub fn execute(settings: &DedupeSettings) -> Result<(), CliError> {
    let text = read_source(&settings.input)?;
    let store = ingest(&text, &settings.required_fields(), None)?;

    info!("imported {} rows", store.len());
    let fields: Vec<&str> = settings.field_definition.iter().map(|d| d.field.as_str()).collect();
    info!("using fields: {:?}", fields);
    debug!(training = ?settings.training, "resolution engine settings");

    let clusters: Vec<ClusterAssignment> = match &settings.clusters {
        Some(path) => {
            info!("reading clusters from {}", path.display());
            ResolutionFile::load(path)?
                .into_clusters(&path.display().to_string())
                .map_err(|e| CliError::from(e).with_hint("csvdedupe reads clusters; pass matched pairs to csvlink"))?
        }
        None => {
            info!("clustering on exact normalized values");
            let fields = fields.iter().map(|f| f.to_string()).collect();
            ExactKeyResolver::new(fields).cluster(&store)?
        }
    };

    info!("# duplicate sets {}", clusters.len());

    let table = if settings.destructive {
        reconcile_unique(&clusters, &text)?
    } else {
        reconcile_all(&clusters, &text)?
    };

    write_to(&table, &settings.output)?;
    Ok(())
}
