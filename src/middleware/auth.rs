use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::decode_token;
use crate::database::models::UserType;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Identity resolved from a verified bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i32,
    pub email: String,
    pub user_type: UserType,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.user_type == UserType::Admin
    }

    pub fn require_admin(&self) -> ApiResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Admin access required"))
        }
    }

    /// Owner of the resource, or an admin
    pub fn require_owner(&self, owner_id: i32, message: &str) -> ApiResult<()> {
        if self.id == owner_id || self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden(message))
        }
    }
}

/// Why a presented token was not accepted; reported only by routes that need a session
#[derive(Clone, Debug)]
struct RejectedIdentity(ApiError);

/// Global identity middleware.
///
/// Requests without a usable `Authorization` header continue anonymously. The
/// reason a token was refused is kept for the `AuthUser` extractor, so only
/// routes that need a session report it.
pub async fn resolve_identity(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match identify(&state, &headers).await {
        Ok(Some(user)) => {
            request.extensions_mut().insert(user);
        }
        Ok(None) => {}
        Err(err @ ApiError::Internal(_)) => return Err(err),
        Err(rejected) => {
            request.extensions_mut().insert(RejectedIdentity(rejected));
        }
    }
    Ok(next.run(request).await)
}

async fn identify(state: &AppState, headers: &HeaderMap) -> ApiResult<Option<AuthUser>> {
    let Some(token) = extract_jwt_from_headers(headers)? else {
        return Ok(None);
    };

    let claims = decode_token(&state.config.security, &token).map_err(|e| {
        tracing::warn!("Token rejected: {}", e);
        ApiError::unauthorized("Invalid or expired token")
    })?;

    // The account may have been removed or changed role since the token was issued
    let user = state
        .storage
        .get_user(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

    if user.user_type != claims.user_type {
        tracing::warn!(user_id = user.id, "Token role does not match account");
        return Err(ApiError::forbidden("Token role does not match account"));
    }

    Ok(Some(AuthUser {
        id: user.id,
        email: user.email,
        user_type: user.user_type,
    }))
}

/// Extract the bearer token, if an Authorization header was sent at all
fn extract_jwt_from_headers(headers: &HeaderMap) -> ApiResult<Option<String>> {
    let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
        Some(_) => Err(ApiError::unauthorized("Empty bearer token")),
        None => Err(ApiError::unauthorized(
            "Authorization header must use Bearer token format",
        )),
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }
        match parts.extensions.get::<RejectedIdentity>() {
            Some(RejectedIdentity(reason)) => Err(reason.clone()),
            None => Err(ApiError::authentication_required()),
        }
    }
}

/// Session whose account is an admin; rejects before the body is read
#[derive(Clone, Debug)]
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        user.require_admin()?;
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn missing_header_is_anonymous() {
        assert_eq!(extract_jwt_from_headers(&HeaderMap::new()).unwrap(), None);
    }

    #[test]
    fn extracts_bearer_token() {
        let token = extract_jwt_from_headers(&headers("Bearer abc.def.ghi")).unwrap();
        assert_eq!(token.as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn rejects_other_schemes() {
        let err = extract_jwt_from_headers(&headers("Basic dXNlcjpwYXNz")).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert!(extract_jwt_from_headers(&headers("Bearer   ")).is_err());
    }

    #[test]
    fn admin_checks() {
        let user = AuthUser {
            id: 1,
            email: "a@example.com".into(),
            user_type: UserType::Recruiter,
        };
        assert!(matches!(user.require_admin(), Err(ApiError::Forbidden(_))));
        assert!(user.require_owner(1, "nope").is_ok());
        assert!(user.require_owner(2, "nope").is_err());
    }
}
