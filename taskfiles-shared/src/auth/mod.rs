/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Bearer token issuing and validation (HS256)
/// - [`middleware`]: Request auth context and header parsing for Axum
///
/// # Example
///
/// ```no_run
/// use taskfiles_shared::auth::password::{hash_password, verify_password};
/// use taskfiles_shared::auth::jwt::{create_token, Claims, JwtSettings};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user123")?;
/// assert!(verify_password("user123", &hash)?);
///
/// let settings = JwtSettings::new(std::env::var("JWT_SECRET")?, "TasksApi", "TasksWebApp");
/// let claims = Claims::new(2, "user", "user@example.com", "User", &settings);
/// let token = create_token(&claims, &settings)?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
