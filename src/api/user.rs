use reqwest::Method;

use super::ApiEndpoint;
use crate::models::user::GroupUserRequest;
use crate::models::ApiResponse;
use crate::version::UpdateStrategy;
use crate::{StationCommand, UniFiClient, UniFiError, UniFiResult, User};

/// Provides methods for managing client-station (user) records on a site.
///
/// Users are looked up by controller-assigned id or by MAC address, created
/// and updated through the controller's write endpoints, and commanded
/// (block, unblock, forget) through the station manager.
pub struct UserApi<'a> {
    client: &'a UniFiClient,
}

impl<'a> ApiEndpoint for UserApi<'a> {
    fn client(&self) -> &UniFiClient {
        self.client
    }
}

impl<'a> UserApi<'a> {
    /// Creates a new user API instance.
    ///
    /// This method is intended for internal use by the UniFi client.
    pub(crate) fn new(client: &'a UniFiClient) -> Self {
        Self { client }
    }

    fn site_endpoint(&self, path: &str) -> String {
        format!("/api/s/{}/{}", self.client.site(), path)
    }

    /// Looks up a user by MAC address.
    ///
    /// Uses the `stat/user` endpoint, which returns slightly different
    /// information than [`UserApi::get`] — for example the live IP is only
    /// available here.
    ///
    /// # Errors
    ///
    /// Returns [`UniFiError::NotFound`] if the controller does not report
    /// exactly one record for the MAC.
    pub async fn get_by_mac(&self, mac: impl Into<String>) -> UniFiResult<User> {
        let mac = mac.into().to_lowercase();
        let endpoint = self.site_endpoint(&format!("stat/user/{mac}"));

        let response: ApiResponse<User> =
            self.client.request(Method::GET, &endpoint, None::<()>).await?;

        response.into_single()
    }

    /// Looks up a user by controller-assigned id via the REST endpoint.
    ///
    /// [`UserApi::get_by_mac`] returns slightly different information (for
    /// example the IP) as it uses a different endpoint.
    pub async fn get(&self, id: &str) -> UniFiResult<User> {
        let endpoint = self.site_endpoint(&format!("rest/user/{id}"));

        let response: ApiResponse<User> =
            self.client.request(Method::GET, &endpoint, None::<()>).await?;

        response.into_single()
    }

    /// Lists all user records on the site.
    pub async fn list(&self) -> UniFiResult<Vec<User>> {
        let endpoint = self.site_endpoint("rest/user");

        let response: ApiResponse<User> =
            self.client.request(Method::GET, &endpoint, None::<()>).await?;

        response.into_data()
    }

    /// Creates a user record.
    ///
    /// The record should not carry an id; the controller assigns one and the
    /// created record is returned.
    ///
    /// # Errors
    ///
    /// Returns [`UniFiError::MalformedResponse`] if the controller's batch
    /// response is missing the per-object wrapper, and
    /// [`UniFiError::NotFound`] if the wrapper contains no created record.
    pub async fn create(&self, user: &User) -> UniFiResult<User> {
        self.group_write(user).await
    }

    /// Updates a user record, selecting the wire protocol by controller
    /// version.
    ///
    /// Controllers at or above 6.0.43 take a replace-style `PUT` on the
    /// per-record REST endpoint followed by a fresh read of the record; the
    /// read's result is returned rather than the write's echo. Older (or
    /// unknown-version) controllers take the same `group/user` write that
    /// create uses, and its echoed record is trusted.
    ///
    /// # Errors
    ///
    /// Returns [`UniFiError::ConfigurationError`] if the record has no id.
    pub async fn update(&self, user: &User) -> UniFiResult<User> {
        let id = user
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                UniFiError::ConfigurationError("User id is required for update".into())
            })?;

        let version = self.client.controller_version();
        match UpdateStrategy::for_version(version.as_deref()) {
            UpdateStrategy::RestWriteThenRead => {
                let endpoint = self.site_endpoint(&format!("rest/user/{id}"));

                let response: ApiResponse<User> =
                    self.client.request(Method::PUT, &endpoint, Some(user)).await?;
                // The write's echo may be partial or stale; classify its
                // metadata and discard the data. The follow-up read must not
                // be issued until the write has returned without error.
                response.into_data()?;

                self.get(id).await
            }
            UpdateStrategy::LegacyGroupWrite => self.group_write(user).await,
        }
    }

    /// Blocks a station from the network.
    ///
    /// # Errors
    ///
    /// Returns [`UniFiError::NotFound`] unless the controller reports
    /// exactly one affected record.
    pub async fn block(&self, mac: impl Into<String>) -> UniFiResult<User> {
        let command = StationCommand::BlockSta {
            mac: mac.into().to_lowercase(),
        };
        self.require_one_affected(self.stamgr(&command).await?)
    }

    /// Unblocks a previously blocked station.
    ///
    /// # Errors
    ///
    /// Returns [`UniFiError::NotFound`] unless the controller reports
    /// exactly one affected record.
    pub async fn unblock(&self, mac: impl Into<String>) -> UniFiResult<User> {
        let command = StationCommand::UnblockSta {
            mac: mac.into().to_lowercase(),
        };
        self.require_one_affected(self.stamgr(&command).await?)
    }

    /// Forgets a station, removing it from the controller's station table.
    ///
    /// This is a soft removal, not guaranteed physical deletion.
    ///
    /// # Errors
    ///
    /// Returns [`UniFiError::NotFound`] unless the controller reports
    /// exactly one affected record.
    pub async fn forget(&self, mac: impl Into<String>) -> UniFiResult<User> {
        let command = StationCommand::ForgetSta {
            macs: vec![mac.into().to_lowercase()],
        };
        self.require_one_affected(self.stamgr(&command).await?)
    }

    /// Executes a station-management command against `cmd/stamgr`.
    ///
    /// Returns the affected records without a cardinality check: commands
    /// like a bulk forget can affect several stations, so how many records
    /// are acceptable is the caller's decision.
    pub async fn stamgr(&self, command: &StationCommand) -> UniFiResult<Vec<User>> {
        let endpoint = self.site_endpoint("cmd/stamgr");

        let response: ApiResponse<User> =
            self.client.request(Method::POST, &endpoint, Some(command)).await?;

        response.into_data()
    }

    /// "The controller didn't report affecting a record" is treated the same
    /// as "the MAC doesn't exist".
    fn require_one_affected(&self, mut affected: Vec<User>) -> UniFiResult<User> {
        if affected.len() != 1 {
            return Err(UniFiError::NotFound);
        }
        Ok(affected.remove(0))
    }

    /// Writes a record through `group/user`, the batch endpoint shared by
    /// create and legacy update.
    ///
    /// The response nests a second `{meta, data}` envelope per submitted
    /// object: the outer envelope reports batch-level status, the inner one
    /// the per-object result.
    async fn group_write(&self, user: &User) -> UniFiResult<User> {
        let endpoint = self.site_endpoint("group/user");
        let body = GroupUserRequest::new(user);

        let response: ApiResponse<ApiResponse<User>> =
            self.client.request(Method::POST, &endpoint, Some(body)).await?;

        let mut objects = response.into_data()?;
        if objects.len() != 1 {
            return Err(UniFiError::MalformedResponse(format!(
                "expected one object result from group/user, got {}",
                objects.len()
            )));
        }

        objects.remove(0).into_single()
    }
}
