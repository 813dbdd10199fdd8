use uuid::Uuid;

/// Contexto de sesión explícito. Se inyecta en los actores que lo
/// necesitan al construirlos, en lugar de leer un token ambiental.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: Uuid,
    pub auth_token: Option<String>,
}

impl SessionContext {
    pub fn authenticated(token: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            auth_token: Some(token.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            auth_token: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_token.is_some()
    }
}
