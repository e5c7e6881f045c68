//! `csvlink` - match rows across two CSV files and write them side by side.

use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, info};

use csvdedupe_recon::output::{write_to, Destination};
use csvdedupe_recon::{
    ingest, read_source, reconcile_linked, DatasetTag, ExactKeyResolver, JoinMode, Linker, MatchedPair,
    ResolutionFile,
};

use crate::config::{FieldDefinition, FileConfig, TrainingSettings};
use crate::{logging, CliError};

#[derive(Parser, Debug)]
#[command(name = "csvlink")]
#[command(about = "Link two CSV files, joining rows that refer to the same entity")]
#[command(version)]
#[command(after_help = "\
Examples:
  csvlink stores_a.csv stores_b.csv --field_names name zip
  csvlink a.csv b.csv --field_names_1 store zip --field_names_2 business_name postal_code
  csvlink a.csv b.csv --field_names name --inner_join --output_file linked.csv
  csvlink a.csv b.csv --field_names name --matches pairs.json
  csvlink --config_file link.toml")]
pub struct LinkArgs {
    /// The two CSV files to operate on
    pub input: Vec<PathBuf>,

    /// Path to configuration file (JSON, or TOML with a .toml extension)
    #[arg(long = "config_file")]
    pub config_file: Option<PathBuf>,

    /// Column names shared by both files
    #[arg(long = "field_names", num_args = 1..)]
    pub field_names: Option<Vec<String>>,

    /// Column names for the first file
    #[arg(long = "field_names_1", num_args = 1..)]
    pub field_names_1: Option<Vec<String>>,

    /// Column names for the second file, in the same order as field_names_1
    #[arg(long = "field_names_2", num_args = 1..)]
    pub field_names_2: Option<Vec<String>>,

    /// Only return matches between the two files
    #[arg(long = "inner_join")]
    pub inner_join: bool,

    /// Matched pairs produced by an external resolution engine (JSON)
    #[arg(long)]
    pub matches: Option<PathBuf>,

    /// CSV file to store results (default: stdout)
    #[arg(long = "output_file")]
    pub output_file: Option<PathBuf>,

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

/// Fully merged csvlink settings.
#[derive(Debug, Clone)]
pub struct LinkSettings {
    pub input_1: PathBuf,
    pub input_2: PathBuf,
    pub field_names_1: Vec<String>,
    pub field_names_2: Vec<String>,
    pub field_definition: Vec<FieldDefinition>,
    pub join: JoinMode,
    pub matches: Option<PathBuf>,
    pub output: Destination,
    pub training: TrainingSettings,
}

impl LinkSettings {
    pub fn resolve(args: LinkArgs) -> Result<Self, CliError> {
        let file = FileConfig::load_optional(args.config_file.as_deref())?;

        let inputs: Vec<PathBuf> = if args.input.is_empty() {
            file.input.iter().map(PathBuf::from).collect()
        } else {
            args.input
        };
        let [input_1, input_2]: [PathBuf; 2] = inputs
            .try_into()
            .map_err(|_| CliError::usage("You must provide two input files."))?;
        if input_1.as_os_str() == "-" && input_2.as_os_str() == "-" {
            return Err(CliError::usage("only one input file can be read from stdin")
                .with_hint("save one of the inputs to a file first"));
        }

        let field_names = args.field_names.or_else(|| file.field_names.clone());
        let field_names_1 = args.field_names_1.or_else(|| file.field_names_1.clone());
        let field_names_2 = args.field_names_2.or_else(|| file.field_names_2.clone());

        let (field_names_1, field_names_2) = match (field_names, field_names_1, field_names_2) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                return Err(CliError::usage(
                    "You should only define field_names or individual dataset fields (field_names_1 and field_names_2)",
                ))
            }
            (Some(shared), None, None) => (shared.clone(), shared),
            (None, Some(f1), Some(f2)) => (f1, f2),
            _ => {
                return Err(CliError::usage(
                    "You must provide field_names or field_names_1 and field_names_2",
                ))
            }
        };

        if field_names_1.is_empty() {
            return Err(CliError::usage("field names must not be empty"));
        }
        if field_names_1.len() != field_names_2.len() {
            return Err(CliError::usage(format!(
                "field_names_1 has {} names but field_names_2 has {}",
                field_names_1.len(),
                field_names_2.len()
            ))
            .with_hint("field_names_2[i] is compared against field_names_1[i]"));
        }

        let field_definition = file
            .field_definition
            .clone()
            .unwrap_or_else(|| FieldDefinition::defaults_for(&field_names_1));
        if let Some(def) = field_definition.iter().find(|d| !field_names_1.contains(&d.field)) {
            return Err(CliError::usage(format!(
                "field_definition uses '{}', which is not in field_names_1",
                def.field
            ))
            .with_hint("only the fields named for both files are compared"));
        }

        let training = TrainingSettings::resolve(
            &file,
            args.skip_training,
            args.training_file,
            args.sample_size,
            args.recall_weight,
        );

        let join = if args.inner_join || file.inner_join.unwrap_or(false) {
            JoinMode::Inner
        } else {
            JoinMode::Outer
        };

        Ok(Self {
            input_1,
            input_2,
            field_names_1,
            field_names_2,
            field_definition,
            join,
            matches: args.matches.or(file.matches),
            output: Destination::from_option(args.output_file.or(file.output_file).as_deref()),
            training,
        })
    }
}

pub fn run(args: LinkArgs) -> Result<(), CliError> {
    logging::init(args.verbose);
    let settings = LinkSettings::resolve(args)?;
    execute(&settings)
}

pub fn execute(settings: &LinkSettings) -> Result<(), CliError> {
    let text_1 = read_source(&settings.input_1)?;
    let text_2 = read_source(&settings.input_2)?;

    let left = ingest(&text_1, &settings.field_names_1, Some(DatasetTag::Input1))?;
    let mut right = ingest(&text_2, &settings.field_names_2, Some(DatasetTag::Input2))?;
    if settings.field_names_1 != settings.field_names_2 {
        right = right.remap_fields(&settings.field_names_2, &settings.field_names_1);
    }

    info!("imported {} rows from file 1", left.len());
    info!("imported {} rows from file 2", right.len());
    let fields: Vec<String> = settings.field_definition.iter().map(|d| d.field.clone()).collect();
    info!("using fields: {:?}", fields);
    debug!(training = ?settings.training, "resolution engine settings");

    let pairs: Vec<MatchedPair> = match &settings.matches {
        Some(path) => {
            info!("reading matches from {}", path.display());
            ResolutionFile::load(path)?
                .into_matched_pairs(&path.display().to_string())
                .map_err(|e| CliError::from(e).with_hint("csvlink reads matched pairs; pass clusters to csvdedupe"))?
        }
        None => {
            info!("linking on exact normalized values");
            ExactKeyResolver::new(fields)
                .link(&left, &right)?
                .into_iter()
                .map(|p| p.pair)
                .collect()
        }
    };

    info!("# duplicate sets {}", pairs.len());

    let table = reconcile_linked(&pairs, &text_1, &text_2, settings.join)?;
    write_to(&table, &settings.output)?;
    Ok(())
}
