// `uci` object
//
// Staged configuration access. `set` only stages a change in the session's
// delta; nothing touches /etc/config until `commit`, and services pick the
// change up on `reload_config`.

use serde_json::json;
use tracing::debug;

use crate::client::Client;
use crate::envelope::{Args, to_args};
use crate::error::Error;
use crate::models::{UciChanges, UciChangesPayload, UciConfigs, UciRequest, UciValues};

const OBJECT: &str = "uci";

impl Client {
    /// Names of all configs under /etc/config.
    pub async fn uci_configs(&mut self) -> Result<Vec<String>, Error> {
        let configs: UciConfigs = self.invoke(OBJECT, "configs", &Args::new()).await?;
        Ok(configs.configs)
    }

    /// Read a config, section or option.
    pub async fn uci_get(&mut self, request: &UciRequest) -> Result<UciValues, Error> {
        debug!(config = %request.config, "uci get");
        let args = to_args(request)?;
        self.invoke(OBJECT, "get", &args).await
    }

    /// Stage new option values on the selected section(s).
    pub async fn uci_set(&mut self, request: &UciRequest) -> Result<(), Error> {
        debug!(config = %request.config, "uci set");
        let args = to_args(request)?;
        self.invoke_unit(OBJECT, "set", &args).await
    }

    /// Uncommitted changes, for one config or all of them.
    pub async fn uci_changes(&mut self, config: Option<&str>) -> Result<UciChanges, Error> {
        let args = match config {
            Some(config) => to_args(&json!({ "config": config }))?,
            None => Args::new(),
        };
        let payload: UciChangesPayload = self.invoke(OBJECT, "changes", &args).await?;
        Ok(payload.changes)
    }

    /// Write the staged changes of `config` to flash.
    pub async fn uci_commit(&mut self, config: &str) -> Result<(), Error> {
        debug!(config, "uci commit");
        let args = to_args(&json!({ "config": config }))?;
        self.invoke_unit(OBJECT, "commit", &args).await
    }

    /// Ask procd to reload services whose config changed.
    pub async fn uci_reload_config(&mut self) -> Result<(), Error> {
        self.invoke_unit(OBJECT, "reload_config", &Args::new()).await
    }
}
