use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id in the identity provider
    pub tenant_id: String,
    pub role: String, // "owner" | "staff" | "admin"
    pub exp: i64,
    pub iat: i64,
    pub token_type: String, // "access"
}

/// Verifies access tokens issued by the identity service. Issuing is only
/// used by tooling and tests.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires_in: i64,
}

impl JwtService {
    pub fn new(secret: &str, access_expires_in: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expires_in: access_expires_in,
        }
    }

    pub fn generate_access_token(&self, user_id: &str, tenant_id: &str, role: &str) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.access_token_expires_in);

        let claims = Claims {
            sub: user_id.to_string(),
            tenant_id: tenant_id.to_string(),
            role: role.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type: "access".to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AppError::JwtError)
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(AppError::JwtError)
    }

    pub fn verify_access_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.verify_token(token)?;

        if claims.token_type != "access" {
            return Err(AppError::AuthError("Invalid access token type".to_string()));
        }
        if claims.tenant_id.is_empty() {
            return Err(AppError::AuthError("Token is not bound to a tenant".to_string()));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_carries_tenant() {
        let svc = JwtService::new("test-secret", 600);
        let token = svc.generate_access_token("u-1", "iron-gym", "owner").unwrap();
        let claims = svc.verify_access_token(&token).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.tenant_id, "iron-gym");
        assert_eq!(claims.role, "owner");
    }

    #[test]
    fn test_rejects_token_from_other_secret() {
        let issuer = JwtService::new("secret-a", 600);
        let verifier = JwtService::new("secret-b", 600);
        let token = issuer.generate_access_token("u-1", "iron-gym", "owner").unwrap();
        assert!(verifier.verify_access_token(&token).is_err());
    }

    #[test]
    fn test_rejects_token_without_tenant() {
        let svc = JwtService::new("test-secret", 600);
        let token = svc.generate_access_token("u-1", "", "owner").unwrap();
        assert!(matches!(
            svc.verify_access_token(&token),
            Err(AppError::AuthError(_))
        ));
    }
}
