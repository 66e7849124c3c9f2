//! Storage volumes and their snapshots.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::connection::Connection;
use crate::error::{OneViewError, Result};
use crate::models::{merge_defaults, Resource};
use crate::query::QueryParams;
use crate::resource::{DeleteOutcome, RequestOptions, ResourceClient, ResourceRef};
use crate::task_monitor::TaskMonitor;

const INVALID_VOLUME_URI: &str =
    "when no snapshot uri is provided, a volume id or volume uri is required";

/// Storage volumes.
pub struct Volumes {
    client: ResourceClient,
    snapshot_defaults: Resource,
}

impl Volumes {
    /// Collection path.
    pub const URI: &'static str = "/rest/storage-volumes";

    /// Creates the facade.
    pub fn new(connection: Arc<dyn Connection>, task_monitor: TaskMonitor) -> Self {
        Self {
            client: ResourceClient::with_task_monitor(connection, Self::URI, task_monitor),
            snapshot_defaults: super::object(json!({"type": "Snapshot"})),
        }
    }

    /// Underlying resource client.
    pub fn client(&self) -> &ResourceClient {
        &self.client
    }

    /// Lists volumes.
    pub async fn get_all(&self, params: &QueryParams) -> Result<Vec<Value>> {
        self.client.get_all(params, None).await
    }

    /// Gets one volume by id or URI.
    pub async fn get(&self, id_or_uri: &str) -> Result<Value> {
        self.client.get(id_or_uri).await
    }

    /// Gets the volumes whose `field` equals `value`.
    pub async fn get_by(&self, field: &str, value: &str) -> Result<Vec<Value>> {
        self.client.get_by(field, value, None).await
    }

    /// Creates a volume, or adds an existing one to management.
    pub async fn create(&self, resource: &Resource, options: &RequestOptions) -> Result<Value> {
        self.client.create(resource, options).await
    }

    /// Updates a volume; `options.force` applies it despite storage system warnings.
    pub async fn update(&self, resource: &Resource, options: &RequestOptions) -> Result<Value> {
        self.client.update(resource, options).await
    }

    /// Deletes a volume.
    ///
    /// With `export_only` the volume is only removed from management and
    /// kept on the storage system. The choice travels in the `exportOnly`
    /// header, which is always sent.
    pub async fn delete<'a>(
        &self,
        resource: impl Into<ResourceRef<'a>>,
        export_only: bool,
        options: &RequestOptions,
    ) -> Result<DeleteOutcome> {
        let options = options
            .clone()
            .with_header("exportOnly", if export_only { "true" } else { "false" });
        self.client.delete(resource, &options).await
    }

    fn snapshot_uri(&self, volume_id_or_uri: Option<&str>, snapshot_id_or_uri: Option<&str>) -> Result<String> {
        if let Some(snapshot) = snapshot_id_or_uri.filter(|s| s.contains('/')) {
            return Ok(snapshot.to_string());
        }

        let volume = volume_id_or_uri
            .filter(|v| !v.is_empty())
            .ok_or_else(|| OneViewError::invalid_argument(INVALID_VOLUME_URI))?;

        Ok(format!(
            "{}/snapshots/{}",
            self.client.build_uri(volume)?,
            snapshot_id_or_uri.unwrap_or_default()
        ))
    }

    /// Lists the snapshots of a volume.
    pub async fn get_snapshots(&self, volume_id_or_uri: &str, params: &QueryParams) -> Result<Vec<Value>> {
        let uri = self.snapshot_uri(Some(volume_id_or_uri), None)?;
        self.client.get_all(params, Some(&uri)).await
    }

    /// Creates a snapshot of a volume.
    pub async fn create_snapshot(
        &self,
        volume_id_or_uri: &str,
        snapshot: &Resource,
        options: &RequestOptions,
    ) -> Result<Value> {
        let uri = self.snapshot_uri(Some(volume_id_or_uri), None)?;
        let data = merge_defaults(&self.snapshot_defaults, snapshot);
        self.client
            .create(&data, &options.clone().with_uri(uri))
            .await
    }

    /// Gets one snapshot.
    ///
    /// # Arguments
    ///
    /// * `snapshot_id_or_uri` - Snapshot id, or its full URI
    /// * `volume_id_or_uri` - Owning volume; required unless a full snapshot URI is given
    ///
    /// # Errors
    ///
    /// Returns `OneViewError::InvalidArgument` if only a snapshot id is given.
    pub async fn get_snapshot(&self, snapshot_id_or_uri: &str, volume_id_or_uri: Option<&str>) -> Result<Value> {
        let uri = self.snapshot_uri(volume_id_or_uri, Some(snapshot_id_or_uri))?;
        self.client.get(&uri).await
    }

    /// Deletes a snapshot; pass its full URI or its representation.
    pub async fn delete_snapshot<'a>(
        &self,
        resource: impl Into<ResourceRef<'a>>,
        options: &RequestOptions,
    ) -> Result<DeleteOutcome> {
        self.client.delete(resource, options).await
    }

    /// Gets the snapshots of a volume whose `field` equals `value`.
    pub async fn get_snapshot_by(&self, volume_id_or_uri: &str, field: &str, value: &str) -> Result<Vec<Value>> {
        let uri = self.snapshot_uri(Some(volume_id_or_uri), None)?;
        self.client.get_by(field, value, Some(&uri)).await
    }

    /// Lists the volumes with extra managed storage paths that `repair` can remove.
    pub async fn get_extra_managed_storage_volume_paths(&self, params: &QueryParams) -> Result<Vec<Value>> {
        let uri = format!("{}/repair?alertFixType=ExtraManagedStorageVolumePaths", Self::URI);
        self.client.get_all(params, Some(&uri)).await
    }

    /// Removes the extra presentations of a volume.
    pub async fn repair(&self, volume_id_or_uri: &str, options: &RequestOptions) -> Result<Value> {
        let data = super::object(json!({
            "type": "ExtraManagedStorageVolumePaths",
            "resourceUri": self.client.build_uri(volume_id_or_uri)?,
        }));
        let options = options
            .clone()
            .with_uri(format!("{}/repair", Self::URI))
            .with_header("Accept-Language", "en_US");
        self.client.create(&data, &options).await
    }

    /// Lists the volumes that can be attached to server profiles.
    pub async fn get_attachable_volumes(&self, params: &QueryParams) -> Result<Vec<Value>> {
        let uri = format!("{}/attachable-volumes", Self::URI);
        self.client.get_all(params, Some(&uri)).await
    }
}
