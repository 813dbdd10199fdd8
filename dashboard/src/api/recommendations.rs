use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use common::types::errors::ApiError;
use common::types::position::Position;
use common::types::restaurant::RestaurantWithDistance;

use crate::api::{Preferences, RecommendationBackend};

/// Cliente HTTP del servicio de descubrimiento con IA.
pub struct HttpRecommendationApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRecommendationApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[derive(Serialize)]
struct DiscoverBody<'a> {
    preferencias: &'a Preferences,
    ubicacion: Position,
    top_n: u32,
}

#[derive(Deserialize)]
struct DiscoverResponse {
    #[serde(default)]
    recomendaciones: Vec<RestaurantWithDistance>,
}

#[async_trait]
impl RecommendationBackend for HttpRecommendationApi {
    async fn discover(
        &self,
        preferences: &Preferences,
        position: Position,
        top_n: u32,
    ) -> Result<Vec<RestaurantWithDistance>, ApiError> {
        let response = self
            .http
            .post(format!("{}/ai/discover", self.base_url))
            .json(&DiscoverBody {
                preferencias: preferences,
                ubicacion: position,
                top_n,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = body
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("error del servicio de recomendaciones")
                .to_string();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: DiscoverResponse = response.json().await?;
        Ok(parsed.recomendaciones)
    }
}
