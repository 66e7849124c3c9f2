//! SAN managers and the SAN providers they are registered through.

use std::sync::Arc;

use serde_json::Value;

use crate::connection::Connection;
use crate::error::Result;
use crate::models::Resource;
use crate::query::QueryParams;
use crate::resource::{DeleteOutcome, RequestOptions, ResourceClient, ResourceRef};
use crate::task_monitor::TaskMonitor;

/// SAN device managers and the providers that register them.
pub struct SanManagers {
    client: ResourceClient,
    providers: ResourceClient,
}

impl SanManagers {
    /// Collection path.
    pub const URI: &'static str = "/rest/fc-sans/device-managers";

    /// Provider collection path.
    pub const PROVIDER_URI: &'static str = "/rest/fc-sans/providers";

    /// Creates the facade.
    pub fn new(connection: Arc<dyn Connection>, task_monitor: TaskMonitor) -> Self {
        Self {
            client: ResourceClient::with_task_monitor(connection.clone(), Self::URI, task_monitor.clone()),
            providers: ResourceClient::with_task_monitor(connection, Self::PROVIDER_URI, task_monitor),
        }
    }

    /// Underlying resource client.
    pub fn client(&self) -> &ResourceClient {
        &self.client
    }

    /// Lists SAN managers.
    pub async fn get_all(&self, params: &QueryParams) -> Result<Vec<Value>> {
        self.client.get_all(params, None).await
    }

    /// Gets one SAN manager by id or URI.
    pub async fn get(&self, id_or_uri: &str) -> Result<Value> {
        self.client.get(id_or_uri).await
    }

    /// Updates the SAN manager at `id_or_uri`.
    pub async fn update(&self, resource: &Resource, id_or_uri: &str) -> Result<Value> {
        let uri = self.client.build_uri(id_or_uri)?;
        self.client
            .update(resource, &RequestOptions::new().with_uri(uri))
            .await
    }

    /// Registers a SAN manager with a provider.
    ///
    /// # Arguments
    ///
    /// * `resource` - Connection info of the device manager
    /// * `provider_id_or_uri` - Provider id, or its full URI
    /// * `options` - Task timeout and headers; `options.uri` is replaced
    pub async fn add(
        &self,
        resource: &Resource,
        provider_id_or_uri: &str,
        options: &RequestOptions,
    ) -> Result<Value> {
        let uri = format!("{}/device-managers", self.providers.build_uri(provider_id_or_uri)?);
        tracing::debug!(uri = %uri, "Adding SAN manager");
        self.client
            .create(resource, &options.clone().with_uri(uri))
            .await
    }

    /// Gets the URI of the provider with the given name.
    pub async fn get_provider_uri(&self, provider_name: &str) -> Result<Option<String>> {
        let provider = self.providers.get_by_name(provider_name).await?;
        Ok(provider
            .as_ref()
            .and_then(|p| p.get("uri"))
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    /// Gets the default connection info of the provider with the given name.
    pub async fn get_default_connection_info(&self, provider_name: &str) -> Result<Option<Value>> {
        let provider = self.providers.get_by_name(provider_name).await?;
        Ok(provider.and_then(|mut p| p.get_mut("defaultConnectionInfo").map(Value::take)))
    }

    /// Removes a SAN manager.
    pub async fn remove<'a>(
        &self,
        resource: impl Into<ResourceRef<'a>>,
        options: &RequestOptions,
    ) -> Result<DeleteOutcome> {
        self.client.delete(resource, options).await
    }

    /// Gets the SAN manager with the given name.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Value>> {
        self.client.get_by_name(name).await
    }
}
