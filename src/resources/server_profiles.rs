//! Server profiles and the read-only helper endpoints around them.
//!
//! Besides plain CRUD, the appliance exposes several "available-*" lookups
//! that take the profile's context (enclosure group, hardware type, ...) as
//! query parameters; [`ProfileQuery`] carries that context.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::connection::Connection;
use crate::error::Result;
use crate::models::{merge_defaults, Resource};
use crate::query::{append_query, QueryParams};
use crate::resource::{DeleteOutcome, RequestOptions, ResourceClient, ResourceRef};
use crate::task_monitor::TaskMonitor;

/// Context parameters for the server profile lookup endpoints.
///
/// Set fields are rendered sorted by their wire name so the same context
/// always yields the same address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileQuery {
    /// `enclosureGroupUri`
    pub enclosure_group_uri: Option<String>,
    /// `functionType`: `Ethernet` or `FibreChannel`
    pub function_type: Option<String>,
    /// `profileUri`
    pub profile_uri: Option<String>,
    /// `serverHardwareTypeUri`
    pub server_hardware_type_uri: Option<String>,
    /// `serverHardwareUri`
    pub server_hardware_uri: Option<String>,
    /// `storageSystemId`
    pub storage_system_id: Option<String>,
    /// `view`
    pub view: Option<String>,
}

impl ProfileQuery {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the enclosure group URI.
    pub fn with_enclosure_group_uri(mut self, uri: impl Into<String>) -> Self {
        self.enclosure_group_uri = Some(uri.into());
        self
    }

    /// Sets the network function type.
    pub fn with_function_type(mut self, function_type: impl Into<String>) -> Self {
        self.function_type = Some(function_type.into());
        self
    }

    /// Sets the server profile URI.
    pub fn with_profile_uri(mut self, uri: impl Into<String>) -> Self {
        self.profile_uri = Some(uri.into());
        self
    }

    /// Sets the server hardware type URI.
    pub fn with_server_hardware_type_uri(mut self, uri: impl Into<String>) -> Self {
        self.server_hardware_type_uri = Some(uri.into());
        self
    }

    /// Sets the server hardware URI.
    pub fn with_server_hardware_uri(mut self, uri: impl Into<String>) -> Self {
        self.server_hardware_uri = Some(uri.into());
        self
    }

    /// Sets the storage system id.
    pub fn with_storage_system_id(mut self, id: impl Into<String>) -> Self {
        self.storage_system_id = Some(id.into());
        self
    }

    /// Sets the view.
    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.view = Some(view.into());
        self
    }

    /// Renders the set fields as a query string without a leading `?`.
    pub fn to_query_string(&self) -> String {
        // Already in wire-name order.
        let fields = [
            ("enclosureGroupUri", &self.enclosure_group_uri),
            ("functionType", &self.function_type),
            ("profileUri", &self.profile_uri),
            ("serverHardwareTypeUri", &self.server_hardware_type_uri),
            ("serverHardwareUri", &self.server_hardware_uri),
            ("storageSystemId", &self.storage_system_id),
            ("view", &self.view),
        ];

        fields
            .iter()
            .filter_map(|(name, value)| {
                value
                    .as_deref()
                    .map(|v| format!("{}={}", name, urlencoding::encode(v)))
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Server profiles.
pub struct ServerProfiles {
    client: ResourceClient,
    defaults: Resource,
}

impl ServerProfiles {
    /// Collection path.
    pub const URI: &'static str = "/rest/server-profiles";

    /// Creates the facade.
    pub fn new(connection: Arc<dyn Connection>, task_monitor: TaskMonitor) -> Self {
        Self {
            client: ResourceClient::with_task_monitor(connection, Self::URI, task_monitor),
            defaults: super::object(json!({"type": "ServerProfileV5"})),
        }
    }

    /// Underlying resource client.
    pub fn client(&self) -> &ResourceClient {
        &self.client
    }

    /// Creates a server profile.
    pub async fn create(&self, resource: &Resource, options: &RequestOptions) -> Result<Value> {
        let data = merge_defaults(&self.defaults, resource);
        self.client.create(&data, options).await
    }

    /// Updates the server profile at `id_or_uri`.
    ///
    /// MAC addresses and serial numbers chosen at creation are immutable; the
    /// appliance silently keeps the original values.
    pub async fn update(&self, resource: &Resource, id_or_uri: &str) -> Result<Value> {
        let uri = self.client.build_uri(id_or_uri)?;
        let data = merge_defaults(&self.defaults, resource);
        self.client
            .update(&data, &RequestOptions::new().with_uri(uri))
            .await
    }

    /// Applies one PATCH operation, e.g. `replace /templateCompliance Compliant`.
    pub async fn patch(
        &self,
        id_or_uri: &str,
        operation: &str,
        path: &str,
        value: Value,
        options: &RequestOptions,
    ) -> Result<Value> {
        self.client.patch(id_or_uri, operation, path, value, options).await
    }

    /// Deletes a server profile.
    pub async fn delete<'a>(
        &self,
        resource: impl Into<ResourceRef<'a>>,
        options: &RequestOptions,
    ) -> Result<DeleteOutcome> {
        self.client.delete(resource, options).await
    }

    /// Lists server profiles.
    pub async fn get_all(&self, params: &QueryParams) -> Result<Vec<Value>> {
        self.client.get_all(params, None).await
    }

    /// Gets one server profile by id or URI.
    pub async fn get(&self, id_or_uri: &str) -> Result<Value> {
        self.client.get(id_or_uri).await
    }

    /// Gets the server profiles whose `field` equals `value`.
    pub async fn get_by(&self, field: &str, value: &str) -> Result<Vec<Value>> {
        self.client.get_by(field, value, None).await
    }

    /// Gets the server profile with the given name.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Value>> {
        self.client.get_by_name(name).await
    }

    /// Gets the server profile JSON schema.
    pub async fn get_schema(&self) -> Result<Value> {
        self.client.get_schema().await
    }

    /// Gets the changes needed to bring a profile back in line with its template.
    pub async fn get_compliance_preview(&self, id_or_uri: &str) -> Result<Value> {
        let uri = format!("{}/compliance-preview", self.client.build_uri(id_or_uri)?);
        self.client.get(&uri).await
    }

    /// Gets the status messages of a server profile.
    pub async fn get_messages(&self, id_or_uri: &str) -> Result<Value> {
        let uri = format!("{}/messages", self.client.build_uri(id_or_uri)?);
        self.client.get(&uri).await
    }

    /// Gets the ports available to a profile in the given context.
    pub async fn get_profile_ports(&self, query: &ProfileQuery) -> Result<Value> {
        let uri = self.lookup_uri("/profile-ports", None, query)?;
        self.client.get(&uri).await
    }

    /// Previews a profile moved to different hardware or enclosure group.
    ///
    /// Returns the profile as it would look on the target; nothing is changed.
    pub async fn get_transformation(&self, id_or_uri: &str, query: &ProfileQuery) -> Result<Value> {
        let uri = self.lookup_uri("/transformation", Some(id_or_uri), query)?;
        self.client.get(&uri).await
    }

    /// Gets the networks a profile could connect to.
    pub async fn get_available_networks(&self, query: &ProfileQuery) -> Result<Value> {
        let uri = self.lookup_uri("/available-networks", None, query)?;
        self.client.get(&uri).await
    }

    /// Gets the servers a profile could be assigned to.
    pub async fn get_available_servers(&self, query: &ProfileQuery) -> Result<Value> {
        let uri = self.lookup_uri("/available-servers", None, query)?;
        self.client.get(&uri).await
    }

    /// Gets one storage system with the volumes and ports a profile could use.
    pub async fn get_available_storage_system(&self, query: &ProfileQuery) -> Result<Value> {
        let uri = self.lookup_uri("/available-storage-system", None, query)?;
        self.client.get(&uri).await
    }

    /// Lists the storage systems a profile could use, following pagination.
    pub async fn get_available_storage_systems(
        &self,
        params: &QueryParams,
        query: &ProfileQuery,
    ) -> Result<Vec<Value>> {
        let uri = self.lookup_uri("/available-storage-systems", None, query)?;
        self.client.get_all(params, Some(&uri)).await
    }

    /// Gets the boot targets a profile could use.
    pub async fn get_available_targets(&self, query: &ProfileQuery) -> Result<Value> {
        let uri = self.lookup_uri("/available-targets", None, query)?;
        self.client.get(&uri).await
    }

    fn lookup_uri(&self, suffix: &str, id_or_uri: Option<&str>, query: &ProfileQuery) -> Result<String> {
        let base = match id_or_uri {
            Some(id_or_uri) => self.client.build_uri(id_or_uri)?,
            None => Self::URI.to_string(),
        };
        let uri = append_query(&format!("{}{}", base, suffix), &query.to_query_string());
        tracing::debug!(uri = %uri, "Server profile lookup");
        Ok(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::test_support::{resource, setup};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_profile_query_sorted_by_wire_name() {
        let query = ProfileQuery::new()
            .with_view("FibreChannel")
            .with_server_hardware_uri("/rest/server-hardware/1")
            .with_server_hardware_type_uri("/rest/server-hardware-types/2")
            .with_enclosure_group_uri("/rest/enclosure-groups/3");

        assert_eq!(
            query.to_query_string(),
            "enclosureGroupUri=%2Frest%2Fenclosure-groups%2F3\
             &serverHardwareTypeUri=%2Frest%2Fserver-hardware-types%2F2\
             &serverHardwareUri=%2Frest%2Fserver-hardware%2F1&view=FibreChannel"
        );
    }

    #[tokio::test]
    async fn test_create_adds_type() {
        let (mock, monitor) = setup();
        let profiles = ServerProfiles::new(mock.clone(), monitor);

        profiles
            .create(&resource(json!({"name": "Profile101"})), &RequestOptions::new())
            .await
            .unwrap();

        assert_eq!(
            mock.calls()[0].body,
            Some(json!({"type": "ServerProfileV5", "name": "Profile101"}))
        );
    }

    #[tokio::test]
    async fn test_update_targets_given_id() {
        let (mock, monitor) = setup();
        let profiles = ServerProfiles::new(mock.clone(), monitor);

        profiles
            .update(&resource(json!({"name": "Renamed"})), "4ff2327f")
            .await
            .unwrap();

        let call = &mock.calls()[0];
        assert_eq!(call.method, "PUT");
        assert_eq!(call.uri, "/rest/server-profiles/4ff2327f");
        assert_eq!(call.body.as_ref().unwrap()["type"], "ServerProfileV5");
    }

    #[tokio::test]
    async fn test_patch_compliance() {
        let (mock, monitor) = setup();
        let profiles = ServerProfiles::new(mock.clone(), monitor);

        profiles
            .patch(
                "/rest/server-profiles/1",
                "replace",
                "/templateCompliance",
                json!("Compliant"),
                &RequestOptions::new(),
            )
            .await
            .unwrap();

        assert_eq!(
            mock.calls()[0].body,
            Some(json!([{"op": "replace", "path": "/templateCompliance", "value": "Compliant"}]))
        );
    }

    #[tokio::test]
    async fn test_compliance_preview_and_messages() {
        let (mock, monitor) = setup();
        mock.on_get("/rest/server-profiles/1/compliance-preview", json!({"isOnlineUpdate": true}))
            .on_get("/rest/server-profiles/1/messages", json!({"serverHardware": []}));
        let profiles = ServerProfiles::new(mock.clone(), monitor);

        assert_eq!(
            profiles.get_compliance_preview("1").await.unwrap()["isOnlineUpdate"],
            true
        );
        assert!(profiles.get_messages("/rest/server-profiles/1").await.is_ok());
    }

    #[tokio::test]
    async fn test_transformation_uses_profile_address() {
        let (mock, monitor) = setup();
        let expected = "/rest/server-profiles/1/transformation\
                        ?enclosureGroupUri=%2Frest%2Fenclosure-groups%2Feg\
                        &serverHardwareTypeUri=%2Frest%2Fserver-hardware-types%2Fsht";
        mock.on_get(expected, json!({"serverProfile": {}}));
        let profiles = ServerProfiles::new(mock.clone(), monitor);

        let query = ProfileQuery::new()
            .with_server_hardware_type_uri("/rest/server-hardware-types/sht")
            .with_enclosure_group_uri("/rest/enclosure-groups/eg");
        profiles.get_transformation("1", &query).await.unwrap();

        assert_eq!(mock.get_uris(), vec![expected]);
    }

    #[tokio::test]
    async fn test_available_lookups_use_collection_address() {
        let (mock, monitor) = setup();
        mock.on_get(
            "/rest/server-profiles/available-networks?functionType=Ethernet",
            json!({"ethernetNetworks": []}),
        )
        .on_get("/rest/server-profiles/available-servers", json!([]))
        .on_get(
            "/rest/server-profiles/available-storage-system?storageSystemId=s1",
            json!({}),
        )
        .on_get(
            "/rest/server-profiles/available-targets?profileUri=%2Frest%2Fserver-profiles%2F1",
            json!({"targets": []}),
        )
        .on_get(
            "/rest/server-profiles/profile-ports?serverHardwareUri=%2Frest%2Fserver-hardware%2Fh",
            json!({"ports": []}),
        );
        let profiles = ServerProfiles::new(mock.clone(), monitor);

        profiles
            .get_available_networks(&ProfileQuery::new().with_function_type("Ethernet"))
            .await
            .unwrap();
        profiles.get_available_servers(&ProfileQuery::new()).await.unwrap();
        profiles
            .get_available_storage_system(&ProfileQuery::new().with_storage_system_id("s1"))
            .await
            .unwrap();
        profiles
            .get_available_targets(&ProfileQuery::new().with_profile_uri("/rest/server-profiles/1"))
            .await
            .unwrap();
        profiles
            .get_profile_ports(&ProfileQuery::new().with_server_hardware_uri("/rest/server-hardware/h"))
            .await
            .unwrap();

        assert_eq!(mock.get_uris().len(), 5);
    }

    #[tokio::test]
    async fn test_available_storage_systems_paginates() {
        let (mock, monitor) = setup();
        mock.on_get(
            "/rest/server-profiles/available-storage-systems\
             ?enclosureGroupUri=%2Frest%2Fenclosure-groups%2Feg&start=0&count=-1",
            json!({"members": [{"id": "s1"}], "nextPageUri": "/rest/server-profiles/available-storage-systems?page=2"}),
        )
        .on_get(
            "/rest/server-profiles/available-storage-systems?page=2",
            json!({"members": [{"id": "s2"}]}),
        );
        let profiles = ServerProfiles::new(mock.clone(), monitor);

        let systems = profiles
            .get_available_storage_systems(
                &QueryParams::new(),
                &ProfileQuery::new().with_enclosure_group_uri("/rest/enclosure-groups/eg"),
            )
            .await
            .unwrap();

        assert_eq!(systems, vec![json!({"id": "s1"}), json!({"id": "s2"})]);
    }

    #[tokio::test]
    async fn test_get_by_name_and_schema() {
        let (mock, monitor) = setup();
        mock.on_get(
            "/rest/server-profiles?start=0&count=-1&filter=%22%27name%27%3D%27Profile101%27%22",
            json!({"members": [{"name": "Profile101"}]}),
        )
        .on_get("/rest/server-profiles/schema", json!({"title": "ServerProfile"}));
        let profiles = ServerProfiles::new(mock.clone(), monitor);

        let profile = profiles.get_by_name("Profile101").await.unwrap();
        assert_eq!(profile, Some(json!({"name": "Profile101"})));
        assert_eq!(profiles.get_schema().await.unwrap()["title"], "ServerProfile");
    }
}
