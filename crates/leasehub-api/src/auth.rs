use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use leasehub_db::Database;
use leasehub_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Marketplace rule: usernames are 6-12 chars, passwords at least 8.
    // Counted in characters, not bytes; usernames are not ASCII-only.
    let username_chars = req.username.chars().count();
    if username_chars < 6 || username_chars > 12 {
        return Err(ApiError::Validation(
            "username must be 6-12 characters".into(),
        ));
    }
    if req.password.chars().count() < 8 {
        return Err(ApiError::Validation(
            "password must be at least 8 characters".into(),
        ));
    }

    // Check if username is taken
    if state.db.get_user_by_username(&req.username)?.is_some() {
        return Err(ApiError::Validation("user already exists".into()));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|_| ApiError::Internal)?
        .to_string();

    let user_id = Uuid::new_v4();

    state
        .db
        .create_user(&user_id.to_string(), &req.username, &password_hash)?;

    let token =
        create_token(&state.jwt_secret, user_id, &req.username).map_err(|_| ApiError::Internal)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse { user_id, token }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .get_user_by_username(&req.username)?
        .ok_or(ApiError::Auth("invalid username or password"))?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password).map_err(|_| ApiError::Internal)?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Auth("invalid username or password"))?;

    let user_id: Uuid = user.id.parse().map_err(|_| ApiError::Internal)?;

    let token =
        create_token(&state.jwt_secret, user_id, &user.username).map_err(|_| ApiError::Internal)?;

    Ok(Json(LoginResponse {
        user_id,
        username: user.username,
        token,
    }))
}

fn create_token(secret: &str, user_id: Uuid, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use jsonwebtoken::{DecodingKey, Validation, decode};
    use leasehub_db::Database;

    fn state() -> AppState {
        Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            jwt_secret: "test-secret".into(),
        })
    }

    async fn do_register(
        state: &AppState,
        username: &str,
        password: &str,
    ) -> Result<axum::response::Response, ApiError> {
        register(
            State(state.clone()),
            Json(RegisterRequest {
                username: username.into(),
                password: password.into(),
            }),
        )
        .await
        .map(IntoResponse::into_response)
    }

    async fn do_login(
        state: &AppState,
        username: &str,
        password: &str,
    ) -> Result<axum::response::Response, ApiError> {
        login(
            State(state.clone()),
            Json(LoginRequest {
                username: username.into(),
                password: password.into(),
            }),
        )
        .await
        .map(IntoResponse::into_response)
    }

    async fn body_json<T: serde::de::DeserializeOwned>(resp: axum::response::Response) -> T {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn register_then_login_round_trip() {
        let state = state();

        let resp = do_register(&state, "alice012", "hunter2hunter2").await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let reg: RegisterResponse = body_json(resp).await;

        // The issued token decodes against the configured secret and
        // carries the right identity
        let data = decode::<Claims>(
            &reg.token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(data.claims.sub, reg.user_id);
        assert_eq!(data.claims.username, "alice012");

        // The stored hash verifies the original password, not anything else
        let resp = do_login(&state, "alice012", "hunter2hunter2").await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: LoginResponse = body_json(resp).await;
        assert_eq!(body.user_id, reg.user_id);
        assert_eq!(body.username, "alice012");
    }

    #[tokio::test]
    async fn register_rejects_out_of_range_credentials() {
        let state = state();

        for (username, password) in [
            ("five5", "longenough1"),        // username too short
            ("thirteenchars", "longenough1"), // username too long
            ("alice012", "seven77"),         // password too short
        ] {
            let err = do_register(&state, username, password).await.err().unwrap();
            assert!(matches!(err, ApiError::Validation(_)), "{username}/{password}");
        }

        // Limits count characters: 6 accented chars is 8 bytes but valid
        let resp = do_register(&state, "véraqü", "password123").await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn register_rejects_taken_username() {
        let state = state();

        do_register(&state, "alice012", "hunter2hunter2").await.unwrap();
        let err = do_register(&state, "alice012", "otherpassword").await.err().unwrap();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_unknown_user() {
        let state = state();
        do_register(&state, "alice012", "hunter2hunter2").await.unwrap();

        let err = do_login(&state, "alice012", "wrongpassword").await.err().unwrap();
        assert!(matches!(err, ApiError::Auth(_)));

        let err = do_login(&state, "nobody9999", "hunter2hunter2").await.err().unwrap();
        assert!(matches!(err, ApiError::Auth(_)));
    }
}
