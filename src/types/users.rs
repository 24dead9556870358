use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ListHeader, WhoWhen};
use crate::serde_util::{null_as_default, string_or_number};

/// Response of `GET /users`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsersListResponse {
    #[serde(default)]
    pub header: ListHeader,
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: Vec<UserView>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserView {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_external: bool,
    #[serde(default)]
    pub created: WhoWhen,
    #[serde(default)]
    pub changed: WhoWhen,
    #[serde(default)]
    pub last_login: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uri: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
