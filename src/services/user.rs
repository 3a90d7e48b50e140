//! User service
//!
//! Staff accounts and authentication:
//! - Login with username and password, returning a signed bearer token
//! - Resolving a bearer token back to the stored user
//! - Creating and listing staff accounts
//! - Public self-registration of `user` accounts

use crate::db::repositories::UserRepository;
use crate::models::{CreateUserInput, User, UserProfile, UserRole};
use crate::services::password::{hash_password, verify_password};
use crate::services::token::{TokenError, TokenService};
use anyhow::Context;
use serde::Serialize;
use std::sync::Arc;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Token could not be verified, or its user no longer exists
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    TokenExpired,

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Username or email already taken
    #[error("User already exists: {0}")]
    UserExists(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Successful login: the bearer token plus the public profile
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub user: UserProfile,
}

/// Input for user login
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

impl LoginInput {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// User service for managing staff accounts and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    tokens: TokenService,
}

impl UserService {
    pub fn new(user_repo: Arc<dyn UserRepository>, tokens: TokenService) -> Self {
        Self { user_repo, tokens }
    }

    /// Login with credentials.
    ///
    /// Unknown usernames and wrong passwords produce the same
    /// `AuthenticationError("Invalid credentials")`.
    pub async fn login(&self, input: LoginInput) -> Result<LoginResult, UserServiceError> {
        let invalid = || UserServiceError::AuthenticationError("Invalid credentials".to_string());

        let user = self
            .user_repo
            .get_by_username(&input.username)
            .await
            .context("Failed to get user by username")?
            .ok_or_else(invalid)?;

        let password_valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;
        if !password_valid {
            return Err(invalid());
        }

        let token = self
            .tokens
            .issue(&user)
            .map_err(|e| UserServiceError::InternalError(anyhow::anyhow!(e)))?;

        tracing::info!("User {} logged in", user.username);

        Ok(LoginResult {
            token,
            user: UserProfile::from(&user),
        })
    }

    /// Resolve a bearer token to its user.
    ///
    /// The user is re-read from the store, so a token for a deleted account
    /// stops working immediately.
    pub async fn authenticate(&self, token: &str) -> Result<User, UserServiceError> {
        let claims = self.tokens.verify(token).map_err(|e| match e {
            TokenError::Expired => UserServiceError::TokenExpired,
            other => UserServiceError::InvalidToken(other.to_string()),
        })?;

        self.user_repo
            .get_by_id(claims.id)
            .await
            .context("Failed to get user by ID")?
            .ok_or_else(|| UserServiceError::InvalidToken("User not found".to_string()))
    }

    /// Create a staff account with a hashed password
    pub async fn create_user(&self, input: CreateUserInput) -> Result<User, UserServiceError> {
        Self::validate_create_input(&input)?;

        if self
            .user_repo
            .get_by_username(&input.username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Username '{}' is already taken",
                input.username
            )));
        }

        if self
            .user_repo
            .get_by_email(&input.email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Email '{}' is already registered",
                input.email
            )));
        }

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;
        let user = User::new(
            input.username.trim().to_string(),
            password_hash,
            input.role,
            input.email.trim().to_string(),
            input.name.trim().to_string(),
        );

        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create user")?;

        tracing::info!("Created {} account {}", created.role, created.username);
        Ok(created)
    }

    /// Public sign-up. The account always gets the `user` role and, when no
    /// username is given, logs in with its email address.
    pub async fn register(
        &self,
        username: Option<String>,
        email: String,
        password: String,
        name: String,
    ) -> Result<User, UserServiceError> {
        let username = username
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| email.trim().to_string());
        self.create_user(CreateUserInput {
            username,
            password,
            role: UserRole::User,
            email,
            name,
        })
        .await
    }

    pub async fn get_by_id(&self, id: uuid::Uuid) -> Result<Option<User>, UserServiceError> {
        Ok(self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user by ID")?)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, UserServiceError> {
        Ok(self.user_repo.list().await.context("Failed to list users")?)
    }

    fn validate_create_input(input: &CreateUserInput) -> Result<(), UserServiceError> {
        if input.username.trim().is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }

        if input.name.trim().is_empty() {
            return Err(UserServiceError::ValidationError(
                "Name cannot be empty".to_string(),
            ));
        }

        if input.password.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Password cannot be empty".to_string(),
            ));
        }

        if !input.email.contains('@') {
            return Err(UserServiceError::ValidationError(
                "Invalid email format".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::MemoryUserRepository;
    use crate::models::UserRole;

    fn setup_service() -> UserService {
        UserService::new(
            MemoryUserRepository::boxed(),
            TokenService::new("test-secret", 24),
        )
    }

    fn input(username: &str, email: &str, role: UserRole) -> CreateUserInput {
        CreateUserInput {
            username: username.to_string(),
            password: "password123".to_string(),
            role,
            email: email.to_string(),
            name: username.to_uppercase(),
        }
    }

    #[tokio::test]
    async fn test_login_success() {
        let service = setup_service();
        service
            .create_user(input("sales1", "sales1@example.com", UserRole::SalesTeam))
            .await
            .unwrap();

        let result = service.login(LoginInput::new("sales1", "password123")).await.unwrap();
        assert_eq!(result.user.username, "sales1");
        assert_eq!(result.user.role, UserRole::SalesTeam);

        let user = service.authenticate(&result.token).await.unwrap();
        assert_eq!(user.username, "sales1");
    }

    #[tokio::test]
    async fn test_login_wrong_password_fails() {
        let service = setup_service();
        service
            .create_user(input("admin", "admin@example.com", UserRole::Admin))
            .await
            .unwrap();

        let result = service.login(LoginInput::new("admin", "nope")).await;
        assert!(
            matches!(result, Err(UserServiceError::AuthenticationError(ref m)) if m == "Invalid credentials")
        );
    }

    #[tokio::test]
    async fn test_login_nonexistent_user_fails() {
        let service = setup_service();
        let result = service.login(LoginInput::new("ghost", "password123")).await;
        assert!(matches!(result, Err(UserServiceError::AuthenticationError(_))));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_garbage() {
        let service = setup_service();
        assert!(matches!(
            service.authenticate("garbage").await,
            Err(UserServiceError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_unknown_user() {
        let service = setup_service();
        let stranger = User::new(
            "stranger".to_string(),
            String::new(),
            UserRole::Admin,
            "s@example.com".to_string(),
            "S".to_string(),
        );
        let token = TokenService::new("test-secret", 24).issue(&stranger).unwrap();

        assert!(matches!(
            service.authenticate(&token).await,
            Err(UserServiceError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn test_create_duplicate_username_fails() {
        let service = setup_service();
        service
            .create_user(input("maria", "maria@example.com", UserRole::MarketingManager))
            .await
            .unwrap();

        let result = service
            .create_user(input("maria", "other@example.com", UserRole::SalesTeam))
            .await;
        assert!(matches!(result, Err(UserServiceError::UserExists(_))));
    }

    #[tokio::test]
    async fn test_create_duplicate_email_fails() {
        let service = setup_service();
        service
            .create_user(input("maria", "same@example.com", UserRole::MarketingManager))
            .await
            .unwrap();

        let result = service
            .create_user(input("jon", "SAME@example.com", UserRole::SalesTeam))
            .await;
        assert!(matches!(result, Err(UserServiceError::UserExists(_))));
    }

    #[tokio::test]
    async fn test_create_invalid_input_fails() {
        let service = setup_service();
        let mut bad = input("", "x@example.com", UserRole::User);
        assert!(matches!(
            service.create_user(bad.clone()).await,
            Err(UserServiceError::ValidationError(_))
        ));

        bad.username = "ok".to_string();
        bad.email = "not-an-email".to_string();
        assert!(matches!(
            service.create_user(bad).await,
            Err(UserServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_register_creates_plain_user() {
        let service = setup_service();
        let user = service
            .register(
                None,
                "buyer@agro.et".to_string(),
                "password123".to_string(),
                "Abebe".to_string(),
            )
            .await
            .unwrap();
        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.username, "buyer@agro.et");

        let result = service.login(LoginInput::new("buyer@agro.et", "password123")).await;
        assert_eq!(result.unwrap().user.role, UserRole::User);

        let duplicate = service
            .register(
                Some("other".to_string()),
                "BUYER@agro.et".to_string(),
                "password123".to_string(),
                "Other".to_string(),
            )
            .await;
        assert!(matches!(duplicate, Err(UserServiceError::UserExists(_))));
    }

    #[tokio::test]
    async fn test_password_is_hashed() {
        let service = setup_service();
        let user = service
            .create_user(input("admin", "admin@example.com", UserRole::Admin))
            .await
            .unwrap();

        assert_ne!(user.password_hash, "password123");
        assert!(verify_password("password123", &user.password_hash).unwrap());
    }
}
