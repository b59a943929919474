//! User accounts: lookup by email, creation, updates, listing and password changes.

use crate::client::ConnectClient;
use crate::error::{ConnectError, ConnectResult};
use crate::response::ActionResponse;
use crate::transport::ConnectTransport;
use crate::types::{ActionParams, NewUser, Principal};
use log::debug;

impl<T: ConnectTransport> ConnectClient<T> {
    /// Look up a user by email and return the whole `principal-list` answer.
    ///
    /// An empty list is `NotFound`.
    pub async fn get_user_by_email(&self, email: &str) -> ConnectResult<ActionResponse> {
        let resp = self
            .invoke("principal-list", ActionParams::new().with("filter-email", email))
            .await?;
        if resp.is_empty_at(&["principal-list"]) {
            return Err(ConnectError::NotFound(format!("Cannot find user {}", email)));
        }
        Ok(resp)
    }

    /// Look up a user by email and return only its principal id.
    ///
    /// When several principals match, the first one wins.
    pub async fn get_user_id_by_email(&self, email: &str) -> ConnectResult<String> {
        let resp = self.get_user_by_email(email).await?;
        let first = resp
            .items(&["principal-list", "principal"])
            .into_iter()
            .next()
            .ok_or_else(|| ConnectError::NotFound(format!("Cannot find user {}", email)))?;
        let principal = Principal::from_node(first)?;
        debug!("Resolved {} to principal {}", email, principal.principal_id);
        Ok(principal.principal_id)
    }

    /// Create a principal (`principal-update` without a `principal-id`).
    pub async fn create_user(&self, user: &NewUser) -> ConnectResult<ActionResponse> {
        let params = ActionParams::new()
            .with("first-name", &user.first_name)
            .with("last-name", &user.last_name)
            .with("email", &user.email)
            .with("password", &user.password)
            .with("type", &user.principal_type)
            .with("has-children", 0);
        self.invoke("principal-update", params).await
    }

    /// Update the user registered under `email` with arbitrary fields.
    ///
    /// The principal id is resolved first; a `principal-id` in `data` is
    /// overwritten by the resolved one.
    pub async fn update_user(&self, email: &str, data: ActionParams) -> ConnectResult<ActionResponse> {
        let principal_id = self.get_user_id_by_email(email).await?;
        let mut params = data;
        params.insert("principal-id", principal_id);
        self.invoke("principal-update", params).await
    }

    /// Every principal visible to the session, attributes flattened.
    pub async fn get_users_list(&self) -> ConnectResult<Vec<Principal>> {
        let resp = self.invoke("principal-list", ActionParams::new()).await?;
        resp.items(&["principal-list", "principal"])
            .into_iter()
            .map(Principal::from_node)
            .collect()
    }

    /// Set a new password for `user_id`.
    pub async fn change_password(&self, user_id: &str, password: &str) -> ConnectResult<ActionResponse> {
        let params = ActionParams::new()
            .with("user-id", user_id)
            .with("password", password)
            .with("password-verify", password);
        self.invoke("user-update-pwd", params).await
    }
}
