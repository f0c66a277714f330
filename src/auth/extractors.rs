use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use super::jwt::JwtKeys;
use crate::{
    error::{AppError, AppResult, NO_TOKEN, TOKEN_FAILED},
    state::AppState,
    store::UserStore,
    users::repo_types::{Role, User},
};

/// Identity resolved from a bearer token. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Returns the token from `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Resolves request headers to a live user.
///
/// Every token failure (bad signature, expiry, garbage, deleted user) yields
/// the same `Unauthenticated` error; the reason is only logged.
pub async fn authenticate<U>(headers: &HeaderMap, keys: &JwtKeys, users: &U) -> AppResult<CurrentUser>
where
    U: UserStore + ?Sized,
{
    let token = bearer_token(headers).ok_or(AppError::Unauthenticated(NO_TOKEN))?;

    let claims = keys.verify(token).map_err(|reason| {
        debug!(%reason, "token rejected");
        AppError::Unauthenticated(TOKEN_FAILED)
    })?;

    let user = users.find_user(claims.sub).await?.ok_or_else(|| {
        warn!(user_id = %claims.sub, "token for unknown user");
        AppError::Unauthenticated(TOKEN_FAILED)
    })?;

    Ok(CurrentUser::from(&user))
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(&parts.headers, &state.keys, state.store.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        store::MemoryStore,
        users::repo_types::NewUser,
    };

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value.parse().unwrap());
        headers
    }

    async fn setup() -> (JwtKeys, MemoryStore, User) {
        let keys = JwtKeys::new(&AppConfig::fake().jwt);
        let store = MemoryStore::default();
        let user = store
            .insert_user(NewUser {
                name: "Alice".into(),
                email: "alice@example.com".into(),
                password_hash: "$argon2id$stub".into(),
                role: Role::User,
            })
            .await
            .unwrap();
        (keys, store, user)
    }

    fn assert_unauthenticated(result: AppResult<CurrentUser>, expected: &str) {
        match result {
            Err(AppError::Unauthenticated(msg)) => assert_eq!(msg, expected),
            other => panic!("expected Unauthenticated, got {other:?}"),
        }
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers_with("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers_with("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers_with("Basic abc")), None);
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
        assert_eq!(bearer_token(&headers_with("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn resolves_valid_token_to_user() {
        let (keys, store, user) = setup().await;
        let token = keys.issue(user.id).unwrap();
        let me = authenticate(&headers_with(&format!("Bearer {token}")), &keys, &store)
            .await
            .expect("authenticated");
        assert_eq!(me.id, user.id);
        assert_eq!(me.email, "alice@example.com");
        assert_eq!(me.role, Role::User);
    }

    #[tokio::test]
    async fn missing_header_is_unauthenticated() {
        let (keys, store, _) = setup().await;
        assert_unauthenticated(authenticate(&HeaderMap::new(), &keys, &store).await, NO_TOKEN);
    }

    #[tokio::test]
    async fn bad_tokens_are_indistinguishable() {
        let (keys, store, user) = setup().await;
        let foreign = JwtKeys::new(&crate::config::JwtConfig {
            secret: "other".into(),
            ..AppConfig::fake().jwt
        })
        .issue(user.id)
        .unwrap();

        for token in ["invalid_token_12345", foreign.as_str()] {
            let res = authenticate(&headers_with(&format!("Bearer {token}")), &keys, &store).await;
            assert_unauthenticated(res, TOKEN_FAILED);
        }
    }

    #[tokio::test]
    async fn token_for_deleted_user_is_rejected() {
        let (keys, store, user) = setup().await;
        let token = keys.issue(user.id).unwrap();
        store.delete_user(user.id).await.unwrap();
        let res = authenticate(&headers_with(&format!("Bearer {token}")), &keys, &store).await;
        assert_unauthenticated(res, TOKEN_FAILED);
    }

    #[test]
    fn identity_serialization_omits_password() {
        let me = CurrentUser {
            id: Uuid::new_v4(),
            name: "Alice".into(),
            email: "alice@example.com".into(),
            role: Role::Admin,
        };
        let json = serde_json::to_value(&me).unwrap();
        assert_eq!(json["role"], "admin");
        assert!(json.get("password_hash").is_none());
    }
}
