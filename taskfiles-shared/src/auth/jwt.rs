/// JWT token generation and validation
///
/// Bearer tokens are signed with HS256 and carry the caller's username, user
/// id, email and role. Validation checks the signature, issuer, audience,
/// `exp` and `nbf` with zero leeway and fails closed on anything else.
///
/// # Example
///
/// ```
/// use taskfiles_shared::auth::jwt::{create_token, validate_token, Claims, JwtSettings};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = JwtSettings::new("a-secret-that-is-at-least-32-bytes!!", "TasksApi", "TasksWebApp");
///
/// let claims = Claims::new(1, "admin", "admin@example.com", "Admin", &settings);
/// let token = create_token(&claims, &settings)?;
///
/// let validated = validate_token(&token, &settings)?;
/// assert_eq!(validated.sub, "admin");
/// assert_eq!(validated.role, "Admin");
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Default token lifetime (7 days)
pub const DEFAULT_EXPIRATION_HOURS: i64 = 24 * 7;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token signature does not match the configured secret
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token was issued by someone else
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },

    /// Token was issued for another audience
    #[error("Invalid audience: expected {expected}")]
    InvalidAudience { expected: String },
}

/// Signing secret and the issuer/audience pair a service accepts
#[derive(Debug, Clone)]
pub struct JwtSettings {
    /// HMAC secret (at least 32 bytes in production)
    pub secret: String,

    /// `iss` claim written to and required on tokens
    pub issuer: String,

    /// `aud` claim written to and required on tokens
    pub audience: String,

    /// Lifetime of newly issued tokens
    pub expiration: Duration,
}

impl JwtSettings {
    /// Creates settings with the default 7 day expiration
    pub fn new(
        secret: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            expiration: Duration::hours(DEFAULT_EXPIRATION_HOURS),
        }
    }

    /// Overrides the token lifetime
    pub fn with_expiration(mut self, expiration: Duration) -> Self {
        self.expiration = expiration;
        self
    }
}

/// JWT claims
///
/// `sub` is the username, which is what request handlers record as
/// `created_by`/`uploaded_by`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - username
    pub sub: String,

    /// Numeric user id
    pub uid: i64,

    /// User email
    pub email: String,

    /// Role name ("Admin", "User")
    pub role: String,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims expiring after `settings.expiration`
    pub fn new(
        user_id: i64,
        username: &str,
        email: &str,
        role: &str,
        settings: &JwtSettings,
    ) -> Self {
        Self::with_expiration(user_id, username, email, role, settings, settings.expiration)
    }

    /// Creates claims with a custom lifetime
    ///
    /// A negative duration produces an already-expired token, which tests use
    /// to exercise rejection.
    pub fn with_expiration(
        user_id: i64,
        username: &str,
        email: &str,
        role: &str,
        settings: &JwtSettings,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;
        // nbf must not be after exp or jsonwebtoken reports ImmatureSignature
        // for expired test tokens instead of ExpiredSignature.
        let not_before = now.min(expiration);

        Self {
            sub: username.to_string(),
            uid: user_id,
            email: email.to_string(),
            role: role.to_string(),
            iss: settings.issuer.clone(),
            aud: settings.audience.clone(),
            iat: not_before.timestamp(),
            exp: expiration.timestamp(),
            nbf: not_before.timestamp(),
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Expiration as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

/// Signs claims into a compact JWT
pub fn create_token(claims: &Claims, settings: &JwtSettings) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(settings.secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT and returns its claims
///
/// # Errors
///
/// - `Expired` if `exp` is in the past (no leeway)
/// - `InvalidSignature` if the token was signed with another secret
/// - `InvalidIssuer` / `InvalidAudience` on claim mismatch
/// - `ValidationError` for anything else (malformed token, wrong algorithm)
pub fn validate_token(token: &str, settings: &JwtSettings) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(settings.secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[settings.issuer.as_str()]);
    validation.set_audience(&[settings.audience.as_str()]);
    validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidSignature,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
            expected: settings.issuer.clone(),
        },
        jsonwebtoken::errors::ErrorKind::InvalidAudience => JwtError::InvalidAudience {
            expected: settings.audience.clone(),
        },
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn settings() -> JwtSettings {
        JwtSettings::new(SECRET, "TasksApi", "TasksWebApp")
    }

    #[test]
    fn test_default_expiration_is_seven_days() {
        assert_eq!(settings().expiration, Duration::days(7));
    }

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new(7, "user", "user@example.com", "User", &settings());

        assert_eq!(claims.sub, "user");
        assert_eq!(claims.uid, 7);
        assert_eq!(claims.role, "User");
        assert_eq!(claims.iss, "TasksApi");
        assert_eq!(claims.aud, "TasksWebApp");
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_create_and_validate_token() {
        let settings = settings();
        let claims = Claims::new(1, "admin", "admin@example.com", "Admin", &settings);
        let token = create_token(&claims, &settings).expect("Should create token");

        let validated = validate_token(&token, &settings).expect("Should validate token");
        assert_eq!(validated.sub, "admin");
        assert_eq!(validated.uid, 1);
        assert_eq!(validated.email, "admin@example.com");
        assert_eq!(validated.role, "Admin");
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = Claims::new(1, "admin", "admin@example.com", "Admin", &settings());
        let token = create_token(&claims, &settings()).unwrap();

        let other = JwtSettings::new("another-secret-key-at-least-32-bytes", "TasksApi", "TasksWebApp");
        let result = validate_token(&token, &other);
        assert!(matches!(result, Err(JwtError::InvalidSignature)));
    }

    #[test]
    fn test_validate_expired_token() {
        let settings = settings();
        let claims = Claims::with_expiration(
            1,
            "admin",
            "admin@example.com",
            "Admin",
            &settings,
            Duration::seconds(-3600),
        );
        assert!(claims.is_expired());

        let token = create_token(&claims, &settings).unwrap();
        let result = validate_token(&token, &settings);
        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_wrong_issuer() {
        let files = JwtSettings::new(SECRET, "FilesApi", "TasksWebApp");
        let claims = Claims::new(1, "admin", "admin@example.com", "Admin", &files);
        let token = create_token(&claims, &files).unwrap();

        let result = validate_token(&token, &settings());
        assert!(matches!(result, Err(JwtError::InvalidIssuer { .. })));
    }

    #[test]
    fn test_validate_wrong_audience() {
        let other = JwtSettings::new(SECRET, "TasksApi", "FilesWebApp");
        let claims = Claims::new(1, "admin", "admin@example.com", "Admin", &other);
        let token = create_token(&claims, &other).unwrap();

        let result = validate_token(&token, &settings());
        assert!(matches!(result, Err(JwtError::InvalidAudience { .. })));
    }

    #[test]
    fn test_validate_garbage() {
        assert!(validate_token("not-a-jwt", &settings()).is_err());
        assert!(validate_token("", &settings()).is_err());
    }
}
