use serde::{Deserialize, Serialize};

use super::Id;

/// Projection of a marketplace account document. Accounts are owned by the
/// main marketplace service; this crate only ever reads display names.
#[derive(Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub name: String,
}
