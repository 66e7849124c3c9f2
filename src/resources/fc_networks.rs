//! Fibre Channel networks.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::connection::Connection;
use crate::error::Result;
use crate::models::{merge_defaults, Resource};
use crate::query::QueryParams;
use crate::resource::{DeleteOutcome, RequestOptions, ResourceClient, ResourceRef};
use crate::task_monitor::TaskMonitor;

/// Fibre Channel networks.
pub struct FcNetworks {
    client: ResourceClient,
    defaults: Resource,
}

impl FcNetworks {
    /// Collection path.
    pub const URI: &'static str = "/rest/fc-networks";

    /// Creates the facade.
    pub fn new(connection: Arc<dyn Connection>, task_monitor: TaskMonitor) -> Self {
        Self {
            client: ResourceClient::with_task_monitor(connection, Self::URI, task_monitor),
            defaults: super::object(json!({
                "autoLoginRedistribution": false,
                "type": "fc-networkV2",
                "linkStabilityTime": 30,
                "fabricType": "FabricAttach",
            })),
        }
    }

    /// Underlying resource client.
    pub fn client(&self) -> &ResourceClient {
        &self.client
    }

    /// Lists FC networks.
    pub async fn get_all(&self, params: &QueryParams) -> Result<Vec<Value>> {
        self.client.get_all(params, None).await
    }

    /// Gets one FC network by id or URI.
    pub async fn get(&self, id_or_uri: &str) -> Result<Value> {
        self.client.get(id_or_uri).await
    }

    /// Gets the FC networks whose `field` equals `value`.
    pub async fn get_by(&self, field: &str, value: &str) -> Result<Vec<Value>> {
        self.client.get_by(field, value, None).await
    }

    /// Creates an FC network, filling in the default fabric settings.
    pub async fn create(&self, resource: &Resource, options: &RequestOptions) -> Result<Value> {
        let data = merge_defaults(&self.defaults, resource);
        self.client.create(&data, options).await
    }

    /// Updates an FC network; the representation must carry its `uri`.
    pub async fn update(&self, resource: &Resource, options: &RequestOptions) -> Result<Value> {
        let data = merge_defaults(&self.defaults, resource);
        self.client.update(&data, options).await
    }

    /// Deletes an FC network.
    pub async fn delete<'a>(
        &self,
        resource: impl Into<ResourceRef<'a>>,
        options: &RequestOptions,
    ) -> Result<DeleteOutcome> {
        self.client.delete(resource, options).await
    }
}
