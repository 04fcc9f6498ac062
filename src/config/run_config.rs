use crate::continuous::{AdjustMethod, ContinuousParams, RollStrategy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_roll_strategy() -> RollStrategy {
    RollStrategy::Volume
}

fn default_adjust_method() -> AdjustMethod {
    AdjustMethod::Backward
}

//one continuous-series job inside a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuousJob {
    //product code; none means every product found in the data
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default = "default_roll_strategy")]
    pub roll_strategy: RollStrategy,
    #[serde(default = "default_adjust_method")]
    pub adjust_method: AdjustMethod,
    #[serde(default)]
    pub contract_months: Option<Vec<u32>>,
    #[serde(default)]
    pub dominant_days: i64,
    #[serde(default)]
    pub rollover_days: i64,
}

impl Default for ContinuousJob {
    fn default() -> Self {
        ContinuousJob {
            product: None,
            roll_strategy: default_roll_strategy(),
            adjust_method: default_adjust_method(),
            contract_months: None,
            dominant_days: 0,
            rollover_days: 0,
        }
    }
}

impl ContinuousJob {
    //converts to builder parameters
    pub fn to_params(&self) -> ContinuousParams {
        ContinuousParams {
            roll_strategy: self.roll_strategy,
            adjust_method: self.adjust_method,
            contract_months: self.contract_months.clone(),
            dominant_days: self.dominant_days,
            rollover_days: self.rollover_days,
        }
    }
}

//complete batch-run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfiguration {
    pub data_path: PathBuf,
    pub output_dir: PathBuf,
    pub jobs: Vec<ContinuousJob>,
}

impl Default for BatchConfiguration {
    fn default() -> Self {
        BatchConfiguration {
            data_path: PathBuf::from("bars.csv"),
            output_dir: PathBuf::from("continuous"),
            jobs: vec![ContinuousJob::default()],
        }
    }
}

impl BatchConfiguration {
    //load configuration from a JSON file
    pub fn from_json_file(path: &PathBuf) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: BatchConfiguration = serde_json::from_str(&contents)?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
