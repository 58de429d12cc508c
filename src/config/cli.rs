use crate::config::toml_config::PredictorConfig;
use crate::utils::error::{PredictorError, Result};
use crate::utils::validation::{validate_path, Validate};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "hardness-predict")]
#[command(about = "Predict steel hardness after heat treatment from composition and process parameters")]
pub struct CliArgs {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path to the model artifact (overrides the config file)
    #[arg(short, long)]
    pub model: Option<String>,

    /// JSON file holding one object of feature values
    #[arg(short, long, conflicts_with_all = ["batch", "sample"])]
    pub input: Option<PathBuf>,

    /// Feature value as NAME=VALUE (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE", conflicts_with_all = ["batch", "sample"])]
    pub assignments: Vec<String>,

    /// CSV file with one set of features per row
    #[arg(long, conflicts_with = "sample")]
    pub batch: Option<PathBuf>,

    /// Where to write batch results (stdout when omitted)
    #[arg(short, long, requires = "batch")]
    pub output: Option<PathBuf>,

    /// Predict the built-in sample steel
    #[arg(long)]
    pub sample: bool,

    /// List the expected features and exit
    #[arg(long)]
    pub print_contract: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

impl CliArgs {
    /// 合併設定檔與命令列參數，命令列優先
    pub fn resolve_config(&self) -> Result<PredictorConfig> {
        let mut config = match &self.config {
            Some(path) => PredictorConfig::from_file(path)?,
            None => PredictorConfig::default(),
        };

        if let Some(model) = &self.model {
            config.model.path = model.clone();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn has_input(&self) -> bool {
        self.input.is_some() || !self.assignments.is_empty() || self.batch.is_some() || self.sample
    }
}

impl Validate for CliArgs {
    fn validate(&self) -> Result<()> {
        if let Some(model) = &self.model {
            validate_path("--model", model)?;
        }
        if !self.print_contract && !self.has_input() {
            return Err(PredictorError::InvalidInputError {
                message: "no input given; use --input, --set, --batch or --sample".to_string(),
            });
        }
        Ok(())
    }
}
