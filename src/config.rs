//! YAML analysis configuration.
//!
//! Every section is optional; omitted sections and fields fall back to the
//! built-in defaults, so an empty file is a valid configuration.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, bail, ensure};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    advisor::AdvisorThresholds, classify::ClassifierThresholds, cli::InitConfigArgs,
    formulas::FormulaCatalog, io_utils,
};

const CURRENT_CONFIG_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub version: Option<String>,
    pub classifier: ClassifierThresholds,
    pub advisor: AdvisorThresholds,
    pub formulas: FormulaCatalog,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            version: Some(CURRENT_CONFIG_VERSION.to_string()),
            classifier: ClassifierThresholds::default(),
            advisor: AdvisorThresholds::default(),
            formulas: FormulaCatalog::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let reader = BufReader::new(file);
        let config: AnalysisConfig =
            serde_yaml::from_reader(reader).context("Parsing config YAML")?;
        config.validate()?;
        debug!("Loaded analysis config from {path:?}");
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: AnalysisConfig = serde_yaml::from_str(text).context("Parsing config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Serializing config to YAML string")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let file = File::create(path).with_context(|| format!("Creating config file {path:?}"))?;
        serde_yaml::to_writer(file, self).context("Writing config YAML")
    }

    pub fn validate(&self) -> Result<()> {
        let classifier = &self.classifier;
        ensure!(
            classifier.categorical_max_ratio > 0.0 && classifier.categorical_max_ratio <= 1.0,
            "classifier.categorical_max_ratio must be in (0, 1], got {}",
            classifier.categorical_max_ratio
        );
        ensure!(
            classifier.categorical_min_unique <= classifier.categorical_max_unique,
            "classifier.categorical_min_unique ({}) exceeds categorical_max_unique ({})",
            classifier.categorical_min_unique,
            classifier.categorical_max_unique
        );
        let advisor = &self.advisor;
        ensure!(
            advisor.numeric_min_ratio >= 0.0 && advisor.numeric_min_ratio < 1.0,
            "advisor.numeric_min_ratio must be in [0, 1), got {}",
            advisor.numeric_min_ratio
        );
        ensure!(
            advisor.categorical_min_unique <= advisor.categorical_max_unique,
            "advisor.categorical_min_unique ({}) exceeds categorical_max_unique ({})",
            advisor.categorical_min_unique,
            advisor.categorical_max_unique
        );
        self.formulas.validate()
    }
}

pub fn execute(args: &InitConfigArgs) -> Result<()> {
    let config = AnalysisConfig::default();
    if io_utils::is_dash(&args.output) {
        print!("{}", config.to_yaml_string()?);
        return Ok(());
    }
    if args.output.exists() && !args.force {
        bail!(
            "{:?} already exists; pass --force to overwrite it",
            args.output
        );
    }
    config.save(&args.output)?;
    info!("Default analysis configuration written to {:?}", args.output);
    Ok(())
}
