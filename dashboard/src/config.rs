use std::env;

use common::constants::{DEFAULT_AI_BASE_URL, DEFAULT_API_BASE_URL};

/// Configuración inyectada por entorno. Las URLs base nunca se
/// hardcodean en la lógica.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub ai_base_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_base_url: env::var("QUOVI_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            ai_base_url: env::var("QUOVI_AI_URL")
                .unwrap_or_else(|_| DEFAULT_AI_BASE_URL.to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
