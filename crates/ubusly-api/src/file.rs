// `file` object (rpcd-mod-file)
//
// Directory listing, stat, read/write and command execution on the router.
// The plugin is optional, so a NotFound status is rewrapped with an install
// hint before it reaches the caller.

use serde_json::json;
use tracing::debug;

use crate::client::Client;
use crate::envelope::to_args;
use crate::error::Error;
use crate::models::{ExecResult, FileContent, FileEntries, FileStat, FileWrite};

const OBJECT: &str = "file";
const PACKAGE: &str = "rpcd-mod-file";

impl Client {
    /// List a directory.
    pub async fn file_list(&mut self, path: &str) -> Result<FileEntries, Error> {
        debug!(path, "listing directory");
        let args = to_args(&json!({ "path": path }))?;
        self.invoke(OBJECT, "list", &args)
            .await
            .map_err(|e| e.with_module_hint(PACKAGE))
    }

    pub async fn file_stat(&mut self, path: &str) -> Result<FileStat, Error> {
        let args = to_args(&json!({ "path": path }))?;
        self.invoke(OBJECT, "stat", &args)
            .await
            .map_err(|e| e.with_module_hint(PACKAGE))
    }

    /// Read a file. rpcd returns the contents as text.
    pub async fn file_read(&mut self, path: &str) -> Result<FileContent, Error> {
        debug!(path, "reading file");
        let args = to_args(&json!({ "path": path }))?;
        self.invoke(OBJECT, "read", &args)
            .await
            .map_err(|e| e.with_module_hint(PACKAGE))
    }

    /// Write (or append to) a file.
    pub async fn file_write(&mut self, write: &FileWrite) -> Result<(), Error> {
        debug!(path = %write.path, bytes = write.data.len(), "writing file");
        let args = to_args(write)?;
        self.invoke_unit(OBJECT, "write", &args)
            .await
            .map_err(|e| e.with_module_hint(PACKAGE))
    }

    /// Run `command` with `params` and collect its exit code and output.
    ///
    /// The session ACL must grant `exec` on the command path under the
    /// `file` scope; otherwise rpcd answers with PermissionDenied.
    pub async fn file_exec(&mut self, command: &str, params: &[&str]) -> Result<ExecResult, Error> {
        debug!(command, "executing command");
        let args = to_args(&json!({ "command": command, "params": params }))?;
        self.invoke(OBJECT, "exec", &args)
            .await
            .map_err(|e| e.with_module_hint(PACKAGE))
    }
}
