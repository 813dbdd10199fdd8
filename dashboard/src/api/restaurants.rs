use async_trait::async_trait;
use serde::Serialize;

use common::session::SessionContext;
use common::types::errors::ApiError;
use common::types::position::Position;
use common::types::restaurant::{Dish, RestaurantId, RestaurantWithDistance};

use crate::api::{Envelope, RestaurantBackend, SearchQuery};

/// Cliente HTTP del backend de restaurantes.
pub struct HttpRestaurantApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRestaurantApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn auth_header(session: &SessionContext) -> Option<String> {
        session.auth_token.as_ref().map(|t| format!("Bearer {}", t))
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = body
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("error desconocido")
                .to_string();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.data)
    }
}

#[derive(Serialize)]
struct NearbyBody {
    latitud: f64,
    longitud: f64,
    radio: f64,
}

#[derive(Serialize)]
struct AddFavoriteBody {
    #[serde(rename = "idRestaurante")]
    id_restaurante: RestaurantId,
}

#[async_trait]
impl RestaurantBackend for HttpRestaurantApi {
    async fn nearby(
        &self,
        position: Position,
        radius_km: f64,
    ) -> Result<Vec<RestaurantWithDistance>, ApiError> {
        let response = self
            .http
            .post(format!("{}/restaurantes/cercanos", self.base_url))
            .json(&NearbyBody {
                latitud: position.latitud,
                longitud: position.longitud,
                radio: radius_km,
            })
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<RestaurantWithDistance>, ApiError> {
        let response = self
            .http
            .post(format!("{}/restaurantes/buscar", self.base_url))
            .json(query)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn favorites(
        &self,
        session: &SessionContext,
        position: Option<Position>,
    ) -> Result<Vec<RestaurantWithDistance>, ApiError> {
        let mut request = self.http.get(format!("{}/favoritos", self.base_url));
        if let Some(position) = position {
            request = request.query(&[
                ("lat", position.latitud.to_string()),
                ("lng", position.longitud.to_string()),
            ]);
        }
        if let Some(auth) = Self::auth_header(session) {
            request = request.header("Authorization", auth);
        }
        Self::parse(request.send().await?).await
    }

    async fn add_favorite(
        &self,
        session: &SessionContext,
        id: RestaurantId,
    ) -> Result<(), ApiError> {
        let mut request = self
            .http
            .post(format!("{}/favoritos", self.base_url))
            .json(&AddFavoriteBody { id_restaurante: id });
        if let Some(auth) = Self::auth_header(session) {
            request = request.header("Authorization", auth);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: "no se pudo agregar el favorito".to_string(),
            });
        }
        Ok(())
    }

    async fn remove_favorite(
        &self,
        session: &SessionContext,
        id: RestaurantId,
    ) -> Result<(), ApiError> {
        let mut request = self
            .http
            .delete(format!("{}/favoritos/{}", self.base_url, id));
        if let Some(auth) = Self::auth_header(session) {
            request = request.header("Authorization", auth);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: "no se pudo eliminar el favorito".to_string(),
            });
        }
        Ok(())
    }

    async fn dishes(&self, id: RestaurantId) -> Result<Vec<Dish>, ApiError> {
        let response = self
            .http
            .get(format!("{}/restaurantes/{}/platillos", self.base_url, id))
            .send()
            .await?;
        Self::parse(response).await
    }
}
