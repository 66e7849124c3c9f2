//! Typed facades over the generic [`ResourceClient`](crate::resource::ResourceClient).
//!
//! Each facade is bound to one fixed base path and carries the default
//! field values the appliance expects on create and update. Caller-supplied
//! fields always win over defaults.

mod enclosure_groups;
mod fc_networks;
mod san_managers;
mod server_profiles;
mod switches;
mod volumes;

pub use enclosure_groups::EnclosureGroups;
pub use fc_networks::FcNetworks;
pub use san_managers::SanManagers;
pub use server_profiles::{ProfileQuery, ServerProfiles};
pub use switches::Switches;
pub use volumes::Volumes;

use serde_json::Value;

use crate::models::Resource;

/// Turns a `json!` object literal into a [`Resource`]; anything else is empty.
pub(crate) fn object(value: Value) -> Resource {
    match value {
        Value::Object(map) => map,
        _ => Resource::new(),
    }
}
