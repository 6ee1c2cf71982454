use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A registration is the identity and access record of an application. It is what gets listed when a user asks
/// which applications exist, and it is the only thing consulted when deciding whether a user may see one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct RegistrationRecord {
    /// Unique identifier for the application.
    pub name: String,

    /// Opaque identity-provider group ids that are allowed to access the application. The order of this list has no
    /// meaning; two registrations with the same groups in a different order share an authorization answer.
    pub access_groups: Vec<String>,

    /// The ssh url of the source repository the application is built from.
    pub clone_url: String,
}

impl RegistrationRecord {
    pub fn new(name: &str, access_groups: &[&str], clone_url: &str) -> Self {
        RegistrationRecord {
            name: name.into(),
            access_groups: access_groups.iter().map(|group| group.to_string()).collect(),
            clone_url: clone_url.into(),
        }
    }
}
