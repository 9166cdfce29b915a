mod common;

use storefront_admin_api::{
    domain::roles::Role,
    dto::users::UpdateRoleRequest,
    entity::Users,
    error::AppError,
    middleware::auth::AccessContext,
    services::user_service::{self, parse_assignable_role, plan_role_change},
};
use sea_orm::EntityTrait;
use uuid::Uuid;

#[test]
fn assignable_roles_exclude_superadmin() {
    assert_eq!(parse_assignable_role("moderador").unwrap(), Role::Moderador);
    assert_eq!(parse_assignable_role("admin").unwrap(), Role::Admin);
    assert_eq!(parse_assignable_role("user").unwrap(), Role::User);
    assert!(matches!(parse_assignable_role("superadmin"), Err(AppError::Forbidden(_))));
    assert!(matches!(parse_assignable_role("owner"), Err(AppError::BadRequest(_))));
}

#[test]
fn superadmin_cannot_change_own_role() {
    let me = Uuid::new_v4();
    let result = plan_role_change(me, me, Role::Superadmin, Role::Admin);
    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[test]
fn superadmin_may_demote_another_superadmin() {
    let result = plan_role_change(Uuid::new_v4(), Uuid::new_v4(), Role::Superadmin, Role::User);
    assert_eq!(result.unwrap(), Role::User);
}

#[test]
fn promotion_to_superadmin_is_refused() {
    let result = plan_role_change(Uuid::new_v4(), Uuid::new_v4(), Role::User, Role::Superadmin);
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn role_update_flow() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let storage = tempfile::tempdir()?;
    let state = common::setup_state(&database_url, storage.path()).await?;

    let superadmin = common::create_user(&state, Role::Superadmin, "root").await?;
    let root_ctx = AccessContext::for_profile(superadmin.clone());
    let target = common::create_user(&state, Role::User, "target").await?;

    let resp = user_service::update_role(
        &state,
        &root_ctx,
        UpdateRoleRequest {
            user_id: target.id,
            role: "moderador".into(),
        },
    )
    .await?;
    let user = resp.data.unwrap().user;
    assert_eq!(user.id, target.id);
    assert_eq!(user.role, Role::Moderador);
    let stored = Users::find_by_id(target.id).one(&state.orm).await?.unwrap();
    assert_eq!(stored.role, Role::Moderador);

    // Admins can reach the panel but not manage roles.
    let admin_ctx = common::access_for(&state, Role::Admin, "admin").await?;
    let denied = user_service::update_role(
        &state,
        &admin_ctx,
        UpdateRoleRequest {
            user_id: target.id,
            role: "admin".into(),
        },
    )
    .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let own = user_service::update_role(
        &state,
        &root_ctx,
        UpdateRoleRequest {
            user_id: superadmin.id,
            role: "admin".into(),
        },
    )
    .await;
    assert!(matches!(own, Err(AppError::BadRequest(_))));

    let missing = user_service::update_role(
        &state,
        &root_ctx,
        UpdateRoleRequest {
            user_id: Uuid::new_v4(),
            role: "admin".into(),
        },
    )
    .await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    let anonymous = user_service::update_role(
        &state,
        &AccessContext::anonymous(),
        UpdateRoleRequest {
            user_id: target.id,
            role: "admin".into(),
        },
    )
    .await;
    assert!(matches!(anonymous, Err(AppError::Unauthorized)));

    Ok(())
}
