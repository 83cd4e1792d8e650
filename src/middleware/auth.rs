use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    dto::auth::Claims,
    entity::user_roles::{Column as RoleCol, Entity as UserRoles},
    error::{AppError, AppResult},
    state::AppState,
};

pub const ADMIN_ROLE: &str = "admin";

/// Caller identity taken from a verified bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: Option<String>,
}

pub async fn has_role(state: &AppState, user: &AuthUser, role: &str) -> AppResult<bool> {
    let count = UserRoles::find()
        .filter(RoleCol::UserId.eq(user.user_id))
        .filter(RoleCol::Role.eq(role))
        .count(&state.orm)
        .await?;
    Ok(count > 0)
}

pub async fn ensure_admin(state: &AppState, user: &AuthUser) -> AppResult<()> {
    if !has_role(state, user, ADMIN_ROLE).await? {
        tracing::warn!(user_id = %user.user_id, "admin access denied");
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn decode_token(token: &str, secret: &str) -> AppResult<AuthUser> {
    let mut validation = Validation::default();
    validation.validate_aud = false;

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

    Ok(AuthUser {
        user_id,
        email: decoded.claims.email,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?
            .trim();

        decode_token(token, &state.config.jwt_secret)
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;

    fn token(sub: &str, exp_offset: i64, secret: &str) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            email: Some("buyer@example.com".into()),
            role: Some("authenticated".into()),
            exp: (chrono::Utc::now().timestamp() + exp_offset) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn decodes_valid_token() {
        let user_id = Uuid::new_v4();
        let user = decode_token(&token(&user_id.to_string(), 3600, "s3cret"), "s3cret").unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.email.as_deref(), Some("buyer@example.com"));
    }

    #[test]
    fn rejects_wrong_secret_and_expired_tokens() {
        let sub = Uuid::new_v4().to_string();
        assert!(matches!(
            decode_token(&token(&sub, 3600, "other"), "s3cret"),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            decode_token(&token(&sub, -3600, "s3cret"), "s3cret"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn rejects_non_uuid_subject() {
        assert!(matches!(
            decode_token(&token("not-a-uuid", 3600, "s3cret"), "s3cret"),
            Err(AppError::Unauthorized(_))
        ));
    }
}
