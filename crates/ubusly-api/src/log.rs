// `log` object: the logd ring buffer.

use serde_json::json;
use tracing::debug;

use crate::client::Client;
use crate::envelope::to_args;
use crate::error::Error;
use crate::models::{LogEntries, LogRead};

const OBJECT: &str = "log";

impl Client {
    /// Read buffered log lines, newest last.
    pub async fn log_read(&mut self, read: LogRead) -> Result<LogEntries, Error> {
        debug!(lines = read.lines, "reading log");
        let args = to_args(&read)?;
        self.invoke(OBJECT, "read", &args).await
    }

    /// Append a message to the system log.
    pub async fn log_write(&mut self, event: &str) -> Result<(), Error> {
        let args = to_args(&json!({ "event": event }))?;
        self.invoke_unit(OBJECT, "write", &args).await
    }
}
