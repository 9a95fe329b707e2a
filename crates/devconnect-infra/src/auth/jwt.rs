//! JWT session token service.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use devconnect_core::domain::Role;
use devconnect_core::ports::{AuthError, SessionClaims, TokenClaims, TokenService};

const DEFAULT_SECRET: &str = "change-me-in-production";

/// Upper bound on token lifetime (one year).
pub const MAX_EXPIRATION_HOURS: i64 = 24 * 365;

/// JWT token service configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            // 30 days
            expiration_hours: 720,
            issuer: "devconnect".to_string(),
        }
    }
}

impl JwtConfig {
    /// Read `JWT_SECRET`, `JWT_EXPIRATION_HOURS` and `JWT_ISSUER`.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_SECRET.to_string());

        if secret == DEFAULT_SECRET {
            let is_production = std::env::var("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false);

            if is_production {
                tracing::error!(
                    "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
                );
            } else {
                tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
            }
        }

        let defaults = Self::default();
        Self {
            secret,
            expiration_hours: expiration_hours(
                std::env::var("JWT_EXPIRATION_HOURS").ok().as_deref(),
                defaults.expiration_hours,
            ),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
        }
    }
}

/// Parse a token lifetime in hours, bounded to `1..=MAX_EXPIRATION_HOURS`.
fn expiration_hours(raw: Option<&str>, default: i64) -> i64 {
    let Some(raw) = raw else {
        return default;
    };

    match raw.trim().parse::<i64>() {
        Ok(hours) if (1..=MAX_EXPIRATION_HOURS).contains(&hours) => hours,
        Ok(hours) => {
            let bounded = hours.clamp(1, MAX_EXPIRATION_HOURS);
            tracing::warn!(hours, bounded, "JWT_EXPIRATION_HOURS out of range");
            bounded
        }
        Err(_) => {
            tracing::warn!(value = %raw, "JWT_EXPIRATION_HOURS is not a number, using default");
            default
        }
    }
}

/// Wire form of the session claims.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    picture: Option<String>,
    role: Role,
    exp: i64,
    iat: i64,
    iss: String,
}

/// HS256 JWT token service.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(mut config: JwtConfig) -> Self {
        config.expiration_hours = config.expiration_hours.clamp(1, MAX_EXPIRATION_HOURS);
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            encoding_key,
            decoding_key,
            config,
        }
    }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, AuthError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| AuthError::InvalidToken("timestamp out of range".to_string()))
}

impl TokenService for JwtTokenService {
    fn generate_token(&self, claims: &SessionClaims) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + TimeDelta::hours(self.config.expiration_hours);

        let wire = Claims {
            sub: claims.id.to_string(),
            name: claims.name.clone(),
            email: claims.email.clone(),
            picture: claims.picture.clone(),
            role: claims.role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::default(), &wire, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;
        let wire = token_data.claims;

        let id = Uuid::parse_str(&wire.sub).map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(TokenClaims {
            claims: SessionClaims {
                id,
                name: wire.name,
                email: wire.email,
                picture: wire.picture,
                role: wire.role,
            },
            issued_at: timestamp(wire.iat)?,
            expires_at: timestamp(wire.exp)?,
        })
    }

    fn expiration_seconds(&self) -> i64 {
        self.config.expiration_hours * 3600
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key".to_string(),
            expiration_hours: 1,
            issuer: "test-issuer".to_string(),
        }
    }

    fn claims() -> SessionClaims {
        SessionClaims {
            id: Uuid::new_v4(),
            name: Some("Grace".to_string()),
            email: "grace@example.com".to_string(),
            picture: None,
            role: Role::Admin,
        }
    }

    #[test]
    fn test_round_trip_preserves_claims() {
        let service = JwtTokenService::new(test_config());
        let original = claims();

        let token = service.generate_token(&original).unwrap();
        let decoded = service.validate_token(&token).unwrap();

        assert_eq!(decoded.claims, original);
        assert!(decoded.expires_at > decoded.issued_at);
    }

    #[test]
    fn test_validate_invalid_token() {
        let service = JwtTokenService::new(test_config());

        let result = service.validate_token("invalid-token");

        assert!(matches!(result.unwrap_err(), AuthError::InvalidToken(_)));
    }

    #[test]
    fn test_validate_wrong_secret() {
        let signer = JwtTokenService::new(test_config());
        let verifier = JwtTokenService::new(JwtConfig {
            secret: "other-secret".to_string(),
            ..test_config()
        });

        let token = signer.generate_token(&claims()).unwrap();
        assert!(verifier.validate_token(&token).is_err());
    }

    #[test]
    fn test_validate_wrong_issuer_token() {
        let service1 = JwtTokenService::new(JwtConfig {
            issuer: "issuer1".to_string(),
            ..test_config()
        });
        let service2 = JwtTokenService::new(JwtConfig {
            issuer: "issuer2".to_string(),
            ..test_config()
        });

        let token = service1.generate_token(&claims()).unwrap();

        assert!(service2.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token() {
        let service = JwtTokenService::new(test_config());
        let now = Utc::now().timestamp();
        let stale = Claims {
            sub: Uuid::new_v4().to_string(),
            name: None,
            email: "x@example.com".to_string(),
            picture: None,
            role: Role::User,
            exp: now - 7200,
            iat: now - 10800,
            iss: "test-issuer".to_string(),
        };
        let token = encode(
            &Header::default(),
            &stale,
            &EncodingKey::from_secret(b"test-secret-key"),
        )
        .unwrap();

        assert!(matches!(
            service.validate_token(&token).unwrap_err(),
            AuthError::TokenExpired
        ));
    }

    #[test]
    fn test_unknown_role_rejected() {
        let service = JwtTokenService::new(test_config());
        let now = Utc::now().timestamp();
        let forged = serde_json::json!({
            "sub": Uuid::new_v4().to_string(),
            "email": "x@example.com",
            "role": "ROOT",
            "exp": now + 3600,
            "iat": now,
            "iss": "test-issuer",
        });
        let token = encode(
            &Header::default(),
            &forged,
            &EncodingKey::from_secret(b"test-secret-key"),
        )
        .unwrap();

        assert!(matches!(
            service.validate_token(&token).unwrap_err(),
            AuthError::InvalidToken(_)
        ));
    }

    #[test]
    fn test_expiration_seconds() {
        let service = JwtTokenService::new(JwtConfig {
            expiration_hours: 24,
            ..test_config()
        });

        assert_eq!(service.expiration_seconds(), 86400);
    }

    #[test]
    fn test_expiration_hours_bounded() {
        assert_eq!(expiration_hours(None, 720), 720);
        assert_eq!(expiration_hours(Some(" 48 "), 720), 48);
        assert_eq!(expiration_hours(Some("soon"), 720), 720);
        assert_eq!(expiration_hours(Some("0"), 720), 1);
        assert_eq!(
            expiration_hours(Some("9223372036854775807"), 720),
            MAX_EXPIRATION_HOURS
        );
    }

    #[test]
    fn test_oversized_lifetime_is_clamped() {
        let service = JwtTokenService::new(JwtConfig {
            expiration_hours: i64::MAX,
            ..test_config()
        });

        assert_eq!(service.expiration_seconds(), MAX_EXPIRATION_HOURS * 3600);
        let token = service.generate_token(&claims()).unwrap();
        assert!(service.validate_token(&token).is_ok());
    }
}
