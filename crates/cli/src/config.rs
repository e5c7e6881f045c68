//! Config file loading.
//!
//! Settings come from an optional JSON or TOML file; command-line flags
//! override whatever the file says.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::CliError;

pub const DEFAULT_TRAINING_FILE: &str = "training.json";
pub const DEFAULT_SAMPLE_SIZE: u32 = 1500;
pub const DEFAULT_RECALL_WEIGHT: u32 = 2;

/// One entry of the resolver's field model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldDefinition {
    pub field: String,
    #[serde(rename = "type", default = "default_field_type")]
    pub kind: String,
}

fn default_field_type() -> String {
    "String".into()
}

impl FieldDefinition {
    /// One `String` field per selected column.
    pub fn defaults_for(fields: &[String]) -> Vec<Self> {
        fields
            .iter()
            .map(|f| Self { field: f.clone(), kind: default_field_type() })
            .collect()
    }
}

/// Everything a config file may set. All keys are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// One path for csvdedupe, two for csvlink. A single string is accepted.
    #[serde(deserialize_with = "one_or_many")]
    pub input: Vec<String>,
    pub field_names: Option<Vec<String>>,
    pub field_names_1: Option<Vec<String>>,
    pub field_names_2: Option<Vec<String>>,
    pub field_definition: Option<Vec<FieldDefinition>>,
    pub output_file: Option<PathBuf>,
    pub skip_training: Option<bool>,
    pub training_file: Option<PathBuf>,
    pub sample_size: Option<u32>,
    pub recall_weight: Option<u32>,
    pub destructive: Option<bool>,
    pub inner_join: Option<bool>,
    pub clusters: Option<PathBuf>,
    pub matches: Option<PathBuf>,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

impl FileConfig {
    /// Parse config text. TOML when `path` ends in `.toml`, JSON otherwise.
    pub fn parse(text: &str, path: &Path) -> Result<Self, CliError> {
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            toml::from_str(text)
                .map_err(|e| CliError::usage(format!("invalid config file {}: {e}", path.display())))
        } else {
            serde_json::from_str(text)
                .map_err(|e| CliError::usage(format!("invalid config file {}: {e}", path.display())))
        }
    }

    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path).map_err(|_| {
            CliError::usage(format!(
                "Could not find config file {}. Did you name it correctly?",
                path.display()
            ))
        })?;
        Self::parse(&text, path)
    }

    /// Load `path` if given, otherwise start from an empty config.
    pub fn load_optional(path: Option<&Path>) -> Result<Self, CliError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}

/// Settings owned by the resolution engine. Carried through so they can be
/// reported, never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingSettings {
    pub skip_training: bool,
    pub training_file: PathBuf,
    pub sample_size: u32,
    pub recall_weight: u32,
}

impl TrainingSettings {
    pub fn resolve(
        file: &FileConfig,
        skip_training: bool,
        training_file: Option<PathBuf>,
        sample_size: Option<u32>,
        recall_weight: Option<u32>,
    ) -> Self {
        Self {
            skip_training: skip_training || file.skip_training.unwrap_or(false),
            training_file: training_file
                .or_else(|| file.training_file.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TRAINING_FILE)),
            sample_size: sample_size.or(file.sample_size).unwrap_or(DEFAULT_SAMPLE_SIZE),
            recall_weight: recall_weight.or(file.recall_weight).unwrap_or(DEFAULT_RECALL_WEIGHT),
        }
    }
}
