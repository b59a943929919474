//! Folders under the configured root folder.

use crate::client::ConnectClient;
use crate::error::{ConnectError, ConnectResult};
use crate::transport::ConnectTransport;
use crate::types::ActionParams;
use log::info;

impl<T: ConnectTransport> ConnectClient<T> {
    fn root_folder_id(&self) -> ConnectResult<&str> {
        self.config()
            .root_folder_id
            .as_deref()
            .ok_or_else(|| ConnectError::Config("No root folder id configured".into()))
    }

    /// Create a folder under the root folder and return its `sco-id`.
    pub async fn create_folder(&self, name: &str, url_path: &str) -> ConnectResult<String> {
        let params = ActionParams::new()
            .with("type", "folder")
            .with("name", name)
            .with("folder-id", self.root_folder_id()?)
            .with("depth", 1)
            .with("url-path", url_path);
        let resp = self.invoke("sco-update", params).await?;
        let sco_id = resp.require_str(&["sco", "sco-id"])?;
        info!("Created folder '{}' ({})", name, sco_id);
        Ok(sco_id)
    }

    /// The `sco-id` of the folder called `name` directly under the root
    /// folder, if there is one.
    pub async fn check_folder(&self, name: &str) -> ConnectResult<Option<String>> {
        let params = ActionParams::new()
            .with("sco-id", self.root_folder_id()?)
            .with("filter-type", "folder")
            .with("filter-name", name);
        let resp = self.invoke("sco-contents", params).await?;
        let found = resp
            .items(&["scos", "sco"])
            .into_iter()
            .find_map(|sco| sco.get("sco-id").and_then(|v| v.as_str()))
            .map(str::to_string);
        Ok(found)
    }
}
