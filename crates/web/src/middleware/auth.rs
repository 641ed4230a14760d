use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use storage::{Database, models::User, repository::session::SessionRepository};
use uuid::Uuid;

use crate::error::WebError;

/// Caller identity resolved from the bearer token, inserted into request
/// extensions for every API request.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser {
    pub token: Option<Uuid>,
    pub user: Option<User>,
}

impl CurrentUser {
    pub fn require(&self) -> Result<&User, WebError> {
        self.user.as_ref().ok_or(WebError::Unauthorized)
    }

    pub fn require_admin(&self) -> Result<&User, WebError> {
        let user = self.require()?;
        if !user.is_admin {
            return Err(WebError::Forbidden);
        }
        Ok(user)
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_admin)
    }
}

/// Extracts the session id from `Authorization: Bearer <uuid>`. The scheme
/// name is matched case-insensitively; anything unparseable yields `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<Uuid> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    Uuid::parse_str(token.trim()).ok()
}

/// Resolves the caller for every API request. A missing, malformed, unknown
/// or expired token leaves the caller anonymous; routes that need an identity
/// reject it through [`require_user`] or [`require_admin`].
pub async fn resolve_session(
    State(db): State<Database>,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let sent_credentials = req.headers().contains_key(AUTHORIZATION);

    let current = match bearer_token(req.headers()) {
        Some(session_id) => {
            let user = SessionRepository::new(db.pool())
                .find_user(session_id, Utc::now())
                .await?;
            match user {
                Some(user) => CurrentUser {
                    token: Some(session_id),
                    user: Some(user),
                },
                None => {
                    tracing::debug!("Unknown or expired session token, treating as anonymous");
                    CurrentUser::default()
                }
            }
        }
        None => {
            if sent_credentials {
                tracing::debug!("Malformed Authorization header, treating as anonymous");
            }
            CurrentUser::default()
        }
    };

    req.extensions_mut().insert(current);
    Ok(next.run(req).await)
}

pub async fn require_user(req: Request, next: Next) -> Result<Response, WebError> {
    current_user(&req).require()?;
    Ok(next.run(req).await)
}

pub async fn require_admin(req: Request, next: Next) -> Result<Response, WebError> {
    current_user(&req).require_admin()?;
    Ok(next.run(req).await)
}

fn current_user(req: &Request) -> CurrentUser {
    req.extensions()
        .get::<CurrentUser>()
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Utc;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn user(is_admin: bool) -> User {
        User {
            user_id: Uuid::new_v4(),
            username: "rekkusu".to_string(),
            is_admin,
            is_runner: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_missing_header_is_anonymous() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_valid_bearer_token() {
        let id = Uuid::new_v4();
        assert_eq!(bearer_token(&headers(&format!("Bearer {}", id))), Some(id));
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let id = Uuid::new_v4();
        for scheme in ["bearer", "BEARER", "BeArEr"] {
            assert_eq!(
                bearer_token(&headers(&format!("{} {}", scheme, id))),
                Some(id)
            );
        }
    }

    #[test]
    fn test_malformed_tokens_are_anonymous() {
        let id = Uuid::new_v4();
        for value in [
            "Basic abc".to_string(),
            "Bearer not-a-uuid".to_string(),
            "Bearer".to_string(),
            "token".to_string(),
            format!("Token {}", id),
        ] {
            assert_eq!(bearer_token(&headers(&value)), None);
        }
    }

    #[test]
    fn test_role_checks() {
        let anonymous = CurrentUser::default();
        assert!(matches!(anonymous.require(), Err(WebError::Unauthorized)));
        assert!(matches!(anonymous.require_admin(), Err(WebError::Unauthorized)));

        let player = CurrentUser { token: Some(Uuid::new_v4()), user: Some(user(false)) };
        assert!(player.require().is_ok());
        assert!(matches!(player.require_admin(), Err(WebError::Forbidden)));
        assert!(!player.is_admin());

        let admin = CurrentUser { token: Some(Uuid::new_v4()), user: Some(user(true)) };
        assert!(admin.require_admin().is_ok());
        assert!(admin.is_admin());
    }
}
