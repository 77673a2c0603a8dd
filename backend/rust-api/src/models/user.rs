use serde::{Deserialize, Serialize};

/// User stored in the "users" collection. Accounts are managed by the
/// identity provider; this service only reads them for author names.
///
/// Admin rights are not stored here. They come from the `role` claim of the
/// request's JWT (see `JwtClaims::is_admin`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
}
