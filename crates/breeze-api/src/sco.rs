//! Content object (SCO) lookups shared by folders and meetings.

use crate::client::ConnectClient;
use crate::error::ConnectResult;
use crate::response::ActionResponse;
use crate::transport::ConnectTransport;
use crate::types::ActionParams;

impl<T: ConnectTransport> ConnectClient<T> {
    /// `sco-info` for one content object.
    pub async fn get_sco_info(&self, sco_id: &str) -> ConnectResult<ActionResponse> {
        self.invoke("sco-info", ActionParams::new().with("sco-id", sco_id))
            .await
    }

    /// The URL path of a content object, e.g. `/weekly/`.
    ///
    /// Combine with [`ConnectClient::url_base`] for a full join link.
    pub async fn get_url(&self, sco_id: &str) -> ConnectResult<String> {
        let resp = self.get_sco_info(sco_id).await?;
        match resp.str_at(&["sco", "url-path"]) {
            Some(path) => Ok(path.to_string()),
            None => resp.require_str(&["sco", "sco-url"]),
        }
    }
}
