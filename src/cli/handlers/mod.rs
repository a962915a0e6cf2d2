mod run;
mod schema;
mod serve;

pub use run::handle_run;
pub use schema::handle_schema;
pub use serve::handle_serve;

use crate::config::ShelfConfig;
use crate::error::{Result, ShelfError};
use crate::graphql::{OperationPipeline, build_schema};
use crate::storage::DataStore;
use std::path::Path;
use std::sync::Arc;

/// Common context passed to all command handlers
pub struct CommandContext {
    pub config: ShelfConfig,
    pub store: Arc<DataStore>,
}

impl CommandContext {
    /// Load config and dataset. `data` overrides the config's dataset path.
    pub fn load(config_path: Option<&Path>, data: Option<&Path>) -> Result<Self> {
        let mut config = ShelfConfig::load_or_default(config_path)?;
        if let Some(data) = data {
            config.data.path = Some(data.to_path_buf());
        }

        let store = match &config.data.path {
            Some(path) => DataStore::load(path)?,
            None => DataStore::builtin()?,
        };

        Ok(Self {
            config,
            store: Arc::new(store),
        })
    }

    /// Build and check the schema. Every structural issue is logged before failing.
    pub fn build_pipeline(&self) -> Result<OperationPipeline> {
        let schema = build_schema(Arc::clone(&self.store), &self.config.schema).map_err(|issues| {
            for issue in &issues {
                tracing::error!(%issue, "invalid schema");
            }
            ShelfError::Schema(issues)
        })?;
        Ok(OperationPipeline::new(schema))
    }
}
