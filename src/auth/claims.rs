use serde::{Deserialize, Serialize};

/// User role. Stored as text in the users table and carried in the access
/// token; admins bypass every ownership check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// JWT payload used for authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,    // user ID
    pub role: Role,  // caller role, enforced by the todo service
    pub iat: usize,  // issued at (unix timestamp)
    pub exp: usize,  // expires at (unix timestamp)
    pub iss: String, // issuer
    pub aud: String, // audience
}

/// Authenticated caller, resolved from a verified access token. This is the
/// only identity the service layer ever sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: i64,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&Claims> for Principal {
    fn from(claims: &Claims) -> Self {
        Self {
            id: claims.sub,
            role: claims.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    }

    #[test]
    fn principal_from_claims_carries_id_and_role() {
        let claims = Claims {
            sub: 42,
            role: Role::Admin,
            iat: 0,
            exp: 0,
            iss: "iss".into(),
            aud: "aud".into(),
        };
        let principal = Principal::from(&claims);
        assert_eq!(principal.id, 42);
        assert!(principal.is_admin());
    }
}
