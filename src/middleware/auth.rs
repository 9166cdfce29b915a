use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::{
    domain::roles::{Capabilities, Role},
    dto::auth::Claims,
    entity::Users,
    error::AppError,
    models::Profile,
    state::AppState,
};

/// Caller identity taken from a valid bearer token.
///
/// Only the subject is kept; roles are always read from the stored profile.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_str = headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::Unauthorized)?
        .to_str()
        .map_err(|_| AppError::Unauthorized)?;

    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized)
}

pub fn decode_user(headers: &HeaderMap, secret: &str) -> Result<AuthUser, AppError> {
    let token = bearer_token(headers)?;
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized)?;

    let user_id = Uuid::parse_str(&decoded.claims.sub).map_err(|_| AppError::Unauthorized)?;

    Ok(AuthUser { user_id })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        decode_user(&parts.headers, &state.config.jwt_secret)
    }
}

/// The reusable admin gate: who is calling and what they may do.
///
/// Extraction never fails. A missing session or a failed profile lookup both
/// degrade to a context with no capabilities, and the `require_*` methods turn
/// that into 401/403 at the handler boundary.
#[derive(Debug, Clone)]
pub struct AccessContext {
    pub user: Option<AuthUser>,
    pub profile: Option<Profile>,
    pub capabilities: Capabilities,
}

impl AccessContext {
    pub fn anonymous() -> Self {
        Self {
            user: None,
            profile: None,
            capabilities: Capabilities::none(),
        }
    }

    pub fn from_profile(user: AuthUser, profile: Option<Profile>) -> Self {
        let capabilities = Capabilities::for_role(profile.as_ref().map(|p| p.role));
        Self {
            user: Some(user),
            profile,
            capabilities,
        }
    }

    /// Context for a known profile, as if its owner had presented a valid token.
    pub fn for_profile(profile: Profile) -> Self {
        let user = AuthUser {
            user_id: profile.id,
        };
        Self::from_profile(user, Some(profile))
    }

    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().map(|p| p.role)
    }

    pub fn actor_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.user_id)
    }

    fn require(&self, allowed: bool) -> Result<&Profile, AppError> {
        if self.user.is_none() {
            return Err(AppError::Unauthorized);
        }
        match &self.profile {
            Some(profile) if allowed => Ok(profile),
            _ => Err(AppError::forbidden()),
        }
    }

    pub fn require_admin(&self) -> Result<&Profile, AppError> {
        self.require(self.capabilities.has_access)
    }

    pub fn require_delete(&self) -> Result<&Profile, AppError> {
        self.require(self.capabilities.can_delete)
    }

    pub fn require_role_manager(&self) -> Result<&Profile, AppError> {
        self.require(self.capabilities.can_manage_roles)
    }
}

pub async fn resolve_access(state: &AppState, headers: &HeaderMap) -> AccessContext {
    let user = match decode_user(headers, &state.config.jwt_secret) {
        Ok(user) => user,
        Err(_) => return AccessContext::anonymous(),
    };

    let profile = match Users::find_by_id(user.user_id).one(&state.orm).await {
        Ok(Some(model)) => Some(Profile::from(model)),
        Ok(None) => {
            tracing::warn!(user_id = %user.user_id, "token for unknown profile");
            None
        }
        Err(err) => {
            tracing::warn!(user_id = %user.user_id, error = %err, "profile lookup failed");
            None
        }
    };

    AccessContext::from_profile(user, profile)
}

impl FromRequestParts<AppState> for AccessContext {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(resolve_access(state, &parts.headers).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn profile(role: Role) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            email: "staff@example.com".into(),
            full_name: None,
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn anonymous_is_unauthorized() {
        let ctx = AccessContext::anonymous();
        assert_eq!(ctx.capabilities, Capabilities::none());
        assert!(matches!(ctx.require_admin(), Err(AppError::Unauthorized)));
    }

    #[test]
    fn missing_profile_is_forbidden() {
        let user = AuthUser {
            user_id: Uuid::new_v4(),
        };
        let ctx = AccessContext::from_profile(user, None);
        assert_eq!(ctx.capabilities, Capabilities::none());
        assert!(matches!(ctx.require_admin(), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn moderator_can_access_but_not_delete() {
        let ctx = AccessContext::for_profile(profile(Role::Moderador));
        assert!(ctx.require_admin().is_ok());
        assert!(matches!(ctx.require_delete(), Err(AppError::Forbidden(_))));
        assert!(matches!(ctx.require_role_manager(), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn superadmin_has_everything() {
        let ctx = AccessContext::for_profile(profile(Role::Superadmin));
        assert!(ctx.require_admin().is_ok());
        assert!(ctx.require_delete().is_ok());
        assert!(ctx.require_role_manager().is_ok());
    }

    #[test]
    fn role_claim_grants_nothing_without_a_profile() {
        let user = decode_user(&bearer_headers("superadmin"), "test-secret");
        assert!(user.is_err());

        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            role: "superadmin".into(),
            iat: 0,
            exp: (Utc::now().timestamp() + 3600) as usize,
        };
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        let user = decode_user(&bearer_headers(&token), "test-secret").unwrap();
        let ctx = AccessContext::from_profile(user, None);
        assert!(matches!(ctx.require_role_manager(), Err(AppError::Forbidden(_))));
    }

    fn bearer_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, format!("Bearer {token}").parse().unwrap());
        headers
    }

    #[test]
    fn bearer_parsing() {
        let mut headers = HeaderMap::new();
        assert!(matches!(bearer_token(&headers), Err(AppError::Unauthorized)));
        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert!(matches!(bearer_token(&headers), Err(AppError::Unauthorized)));
        headers.insert(header::AUTHORIZATION, "Bearer abc.def".parse().unwrap());
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def");
    }
}
