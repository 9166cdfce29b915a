use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{domain::roles::Role, models::Profile};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoleUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Role,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateRoleResponse {
    pub user: RoleUser,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub items: Vec<Profile>,
}
