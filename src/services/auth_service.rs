use crate::{
    auth::{
        Claims, TokenBundle,
        jwt::{JwtKeys, decode_token, encode_token, make_access_claims},
        password::{hash_password, verify_password},
    },
    db::entities::user,
    error::AppError,
    services::user_service::UserService,
};

pub const MAX_USERNAME_LEN: usize = 150;

pub struct AuthService<'a> {
    users: UserService,
    jwt: &'a JwtKeys,
    access_ttl_secs: usize,
}

impl<'a> AuthService<'a> {
    pub fn new(users: UserService, jwt: &'a JwtKeys, access_ttl_secs: usize) -> Self {
        Self {
            users,
            jwt,
            access_ttl_secs,
        }
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<TokenBundle, AppError> {
        let username = normalize_username(username)?;
        if self.users.find_by_username(username).await?.is_some() {
            return Err(AppError::conflict("User already exists"));
        }

        let password_hash = hash_password(password)?;
        let user = self.users.create_user(username, &password_hash).await?;
        tracing::info!(username = %user.username, "registered user");
        self.issue_token(&user)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<TokenBundle, AppError> {
        let user = self
            .users
            .find_by_username(username.trim())
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::unauthorized("Invalid credentials"));
        }

        let now = chrono::Utc::now().fixed_offset();
        self.users.set_last_login(&user.id, &now).await?;
        self.issue_token(&user)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode_token(self.jwt, token)
    }

    fn issue_token(&self, user: &user::Model) -> Result<TokenBundle, AppError> {
        let claims = make_access_claims(&user.id, &user.username, self.access_ttl_secs);
        Ok(TokenBundle {
            access_token: encode_token(self.jwt, &claims)?,
            token_type: "Bearer",
            expires_in: self.access_ttl_secs,
        })
    }
}

fn normalize_username(username: &str) -> Result<&str, AppError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::bad_request("Username required"));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AppError::bad_request(format!(
            "Username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }
    Ok(username)
}
