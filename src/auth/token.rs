// JWT creation and validation

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::error::AuthError;
use crate::config::Config;

/// Discriminator carried in every token; consumers must check it before
/// trusting the rest of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims shared by both token kinds.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
    /// Fresh per token, so two tokens issued for the same subject within the
    /// same second still differ value-wise.
    pub jti: Uuid,
    #[serde(rename = "type")]
    pub kind: TokenKind,
}

/// Access/refresh token pair issued by login and refresh.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Stateless JWT codec keyed by the configured secret and algorithm.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    /// Build the codec from configuration.
    ///
    /// Panics on an unknown algorithm name; that is a startup-time
    /// configuration error.
    pub fn new(config: &Config) -> Self {
        let algorithm = config
            .jwt_algorithm
            .parse::<Algorithm>()
            .unwrap_or_else(|_| panic!("Unsupported JWT algorithm: {}", config.jwt_algorithm));

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret_key.as_bytes()),
            algorithm,
            access_ttl: Duration::minutes(config.jwt_access_token_expire_minutes),
            refresh_ttl: Duration::days(config.jwt_refresh_token_expire_days),
        }
    }

    /// Create a signed token of the given kind with an explicit lifetime.
    pub fn create(&self, subject: Uuid, kind: TokenKind, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4(),
            kind,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Create an access token with the configured lifetime.
    pub fn create_access_token(&self, subject: Uuid) -> Result<String, AuthError> {
        self.create(subject, TokenKind::Access, self.access_ttl)
    }

    /// Create a refresh token with the configured lifetime.
    pub fn create_refresh_token(&self, subject: Uuid) -> Result<String, AuthError> {
        self.create(subject, TokenKind::Refresh, self.refresh_ttl)
    }

    /// Create both tokens for one subject.
    pub fn create_pair(&self, subject: Uuid) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.create_access_token(subject)?,
            refresh_token: self.create_refresh_token(subject)?,
        })
    }

    /// Decode and verify a token.
    ///
    /// Returns `None` on every failure class: expired, malformed, wrong
    /// signature, wrong algorithm. Expiry is checked without leeway.
    pub fn decode(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_service() -> TokenService {
        TokenService::new(&Config::for_tests())
    }

    #[test]
    fn access_token_roundtrips_subject_and_kind() {
        let service = test_service();
        let subject = Uuid::new_v4();

        let token = service.create_access_token(subject).unwrap();
        let claims = service.decode(&token).unwrap();

        assert_eq!(claims.sub, subject);
        assert_eq!(claims.kind, TokenKind::Access);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn refresh_token_carries_refresh_kind() {
        let service = test_service();
        let token = service.create_refresh_token(Uuid::new_v4()).unwrap();
        let claims = service.decode(&token).unwrap();

        assert_eq!(claims.kind, TokenKind::Refresh);
    }

    #[test]
    fn configured_lifetimes_apply() {
        let service = test_service();

        let access = service.create_access_token(Uuid::new_v4()).unwrap();
        let claims = service.decode(&access).unwrap();
        assert_eq!(claims.exp - claims.iat, 30 * 60);

        let refresh = service.create_refresh_token(Uuid::new_v4()).unwrap();
        let claims = service.decode(&refresh).unwrap();
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
    }

    #[test]
    fn expired_token_decodes_to_none() {
        let service = test_service();
        let token = service
            .create(Uuid::new_v4(), TokenKind::Access, Duration::seconds(-10))
            .unwrap();

        assert!(service.decode(&token).is_none());
    }

    #[test]
    fn malformed_tokens_decode_to_none() {
        let service = test_service();

        assert!(service.decode("").is_none());
        assert!(service.decode("not.a.token").is_none());
        assert!(service
            .decode("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.invalid.signature")
            .is_none());
    }

    #[test]
    fn foreign_secret_decodes_to_none() {
        let issuer = test_service();
        let mut other_config = Config::for_tests();
        other_config.jwt_secret_key = "a_completely_different_secret".to_string();
        let verifier = TokenService::new(&other_config);

        let token = issuer.create_access_token(Uuid::new_v4()).unwrap();

        assert!(issuer.decode(&token).is_some());
        assert!(verifier.decode(&token).is_none());
    }

    #[test]
    fn pair_tokens_differ_and_carry_their_kinds() {
        let service = test_service();
        let pair = service.create_pair(Uuid::new_v4()).unwrap();

        assert_ne!(pair.access_token, pair.refresh_token);
        assert_eq!(
            service.decode(&pair.access_token).unwrap().kind,
            TokenKind::Access
        );
        assert_eq!(
            service.decode(&pair.refresh_token).unwrap().kind,
            TokenKind::Refresh
        );
    }

    #[test]
    fn same_second_tokens_are_unique() {
        let service = test_service();
        let subject = Uuid::new_v4();

        let first = service.create_access_token(subject).unwrap();
        let second = service.create_access_token(subject).unwrap();

        assert_ne!(first, second);
    }

    proptest! {
        #[test]
        fn prop_roundtrip_preserves_subject(raw in any::<u128>(), ttl_secs in 1i64..100_000) {
            let service = test_service();
            let subject = Uuid::from_u128(raw);

            let token = service.create(subject, TokenKind::Access, Duration::seconds(ttl_secs)).unwrap();
            let claims = service.decode(&token).unwrap();

            prop_assert_eq!(claims.sub, subject);
            prop_assert_eq!(claims.exp - claims.iat, ttl_secs);
        }

        #[test]
        fn prop_random_strings_are_rejected(garbage in "[a-zA-Z0-9]{10,60}") {
            let service = test_service();
            prop_assert!(service.decode(&garbage).is_none());
        }
    }
}
