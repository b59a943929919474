//! Meetings: listing, creation and updates.
//!
//! Begin and end dates go through [`normalize_date`] first; text that does
//! not parse fails with `InvalidDate` before anything is sent.

use crate::client::ConnectClient;
use crate::dates::normalize_date;
use crate::error::ConnectResult;
use crate::response::ActionResponse;
use crate::transport::ConnectTransport;
use crate::types::{ActionParams, MeetingUpdate};
use log::info;

impl<T: ConnectTransport> ConnectClient<T> {
    /// `report-my-meetings`. Expired meetings are filtered out unless
    /// `show_all` is set.
    pub async fn get_all_meetings(&self, show_all: bool) -> ConnectResult<ActionResponse> {
        let mut params = ActionParams::new();
        if !show_all {
            params.insert("filter-expired", "false");
        }
        self.invoke("report-my-meetings", params).await
    }

    /// Create a meeting in `folder_id` and return its `sco-id`.
    pub async fn create_meeting(
        &self,
        folder_id: &str,
        name: &str,
        date_begin: &str,
        date_end: &str,
        url_path: &str,
    ) -> ConnectResult<String> {
        let offset = self.config().utc_offset()?;
        let params = ActionParams::new()
            .with("type", "meeting")
            .with("name", name)
            .with("folder-id", folder_id)
            .with("date-begin", normalize_date(date_begin, offset)?)
            .with("date-end", normalize_date(date_end, offset)?)
            .with("url-path", url_path);
        let resp = self.invoke("sco-update", params).await?;
        let sco_id = resp.require_str(&["sco", "sco-id"])?;
        info!("Created meeting '{}' ({}) in folder {}", name, sco_id, folder_id);
        Ok(sco_id)
    }

    /// Change the given fields of an existing meeting.
    pub async fn update_meeting(&self, sco_id: &str, update: &MeetingUpdate) -> ConnectResult<ActionResponse> {
        let offset = self.config().utc_offset()?;
        let mut params = ActionParams::new().with("sco-id", sco_id);
        if let Some(ref name) = update.name {
            params.insert("name", name);
        }
        if let Some(ref begin) = update.date_begin {
            params.insert("date-begin", normalize_date(begin, offset)?);
        }
        if let Some(ref end) = update.date_end {
            params.insert("date-end", normalize_date(end, offset)?);
        }
        if let Some(ref path) = update.url_path {
            params.insert("url-path", path);
        }
        self.invoke("sco-update", params).await
    }
}
