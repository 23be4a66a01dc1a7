use crate::Id;
use serde::{Deserialize, Serialize};

/// A user record as returned by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: Id,
    pub email: String,
    pub display_name: String,
}
