use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use uuid::Uuid;

use crate::{
    audit::{AuditAction, log_audit_best_effort},
    domain::roles::Role,
    dto::users::{RoleUser, UpdateRoleRequest, UpdateRoleResponse, UserList},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    error::{AppError, AppResult},
    middleware::auth::AccessContext,
    models::Profile,
    response::{ApiResponse, Meta},
    routes::params::UserListQuery,
    state::AppState,
};

/// Roles reachable through the role-update operation.
pub fn parse_assignable_role(raw: &str) -> AppResult<Role> {
    let role: Role = raw.parse().map_err(AppError::BadRequest)?;
    if role == Role::Superadmin {
        return Err(AppError::Forbidden(
            "superadmin role cannot be assigned here; it must be granted out-of-band".into(),
        ));
    }
    Ok(role)
}

/// Guard for a role change already cleared by the capability check.
///
/// Only a superadmin changing their own record is blocked. Demoting a
/// different superadmin is allowed.
pub fn plan_role_change(
    caller_id: Uuid,
    target_id: Uuid,
    target_role: Role,
    requested: Role,
) -> AppResult<Role> {
    if requested == Role::Superadmin {
        return Err(AppError::Forbidden(
            "superadmin role cannot be assigned here; it must be granted out-of-band".into(),
        ));
    }
    if target_role == Role::Superadmin && target_id == caller_id {
        return Err(AppError::BadRequest(
            "a superadmin cannot change their own role".into(),
        ));
    }
    Ok(requested)
}

pub async fn update_role(
    state: &AppState,
    access: &AccessContext,
    payload: UpdateRoleRequest,
) -> AppResult<ApiResponse<UpdateRoleResponse>> {
    let caller = access.require_role_manager()?;
    let requested = parse_assignable_role(&payload.role)?;

    let target = Users::find_by_id(payload.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let role = plan_role_change(caller.id, target.id, target.role, requested)?;
    let previous = target.role;

    let mut active: UserActive = target.into();
    active.role = Set(role);
    let updated = active.update(&state.orm).await?;

    tracing::info!(
        actor = %caller.id,
        target = %updated.id,
        from = %previous,
        to = %updated.role,
        "role updated"
    );

    log_audit_best_effort(
        &state.pool,
        Some(caller.id),
        AuditAction::RoleUpdate,
        "users",
        serde_json::json!({
            "user_id": updated.id,
            "from": previous.as_str(),
            "to": updated.role.as_str(),
        }),
    )
    .await;

    let user = RoleUser {
        id: updated.id,
        email: updated.email,
        full_name: updated.full_name,
        role: updated.role,
    };
    Ok(ApiResponse::success(
        "Role updated",
        UpdateRoleResponse { user },
        Some(Meta::empty()),
    ))
}

pub async fn list_users(
    state: &AppState,
    access: &AccessContext,
    query: UserListQuery,
) -> AppResult<ApiResponse<UserList>> {
    access.require_role_manager()?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(role) = query.role.as_deref().filter(|r| !r.is_empty()) {
        let role: Role = role.parse().map_err(AppError::BadRequest)?;
        condition = condition.add(UserCol::Role.eq(role));
    }
    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(UserCol::Email).ilike(pattern.clone()))
                .add(Expr::col(UserCol::FullName).ilike(pattern)),
        );
    }

    let finder = Users::find()
        .filter(condition)
        .order_by_asc(UserCol::Email);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Profile::from)
        .collect();

    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(Meta::new(page, limit, total)),
    ))
}
