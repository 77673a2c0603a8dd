use super::{ServiceError, ServiceResult};
use crate::middlewares::auth::JwtClaims;

/// Allows the action only for admins or the author of the entity.
pub fn ensure_admin_or_author(
    claims: &JwtClaims,
    author_id: &str,
    entity: &str,
) -> ServiceResult<()> {
    if claims.is_admin() || claims.sub == author_id {
        return Ok(());
    }

    tracing::warn!(
        user_id = %claims.sub,
        author_id = %author_id,
        "Prohibited operation: the logged in user is not the author of the {}, nor an administrator.",
        entity
    );
    Err(ServiceError::forbidden(format!(
        "Prohibited operation: you are not the author of the {}, nor an administrator.",
        entity
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str, role: &str) -> JwtClaims {
        JwtClaims {
            sub: sub.to_string(),
            username: sub.to_string(),
            role: role.to_string(),
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn author_is_allowed() {
        assert!(ensure_admin_or_author(&claims("u1", "user"), "u1", "quiz").is_ok());
    }

    #[test]
    fn admin_is_allowed_on_foreign_entities() {
        assert!(ensure_admin_or_author(&claims("root", "admin"), "u1", "quiz").is_ok());
    }

    #[test]
    fn stranger_is_denied() {
        let result = ensure_admin_or_author(&claims("u2", "user"), "u1", "tip");
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    }
}
