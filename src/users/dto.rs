use serde::{Deserialize, Serialize};

use crate::fields::{Fields, Value};

/// Request body for `POST /user`.
///
/// Fields are optional so that a missing one surfaces as a validation
/// failure naming it rather than as a decode error.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Request body for `PUT /user/{id}`. `None` means "leave unchanged".
#[derive(Debug, Default, Deserialize)]
pub struct UserPatch {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedUser {
    pub id: i64,
}

impl Fields for CreateUserRequest {
    fn field(&self, name: &str) -> Option<Value<'_>> {
        match name {
            "username" => self.username.as_deref().map(Value::Text),
            "password" => self.password.as_deref().map(Value::Text),
            _ => None,
        }
    }
}

impl Fields for UserPatch {
    fn field(&self, name: &str) -> Option<Value<'_>> {
        match name {
            "username" => self.username.as_deref().map(Value::Text),
            "password" => self.password.as_deref().map(Value::Text),
            _ => None,
        }
    }
}
