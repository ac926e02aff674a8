//! Backend adapter - JSON over HTTP
//!
//! ## Responsibilities
//!
//! - The four console endpoints: bulk camera GeoJSON, camera creation,
//!   shape save, location GeoJSON
//! - CSRF handling: the `csrftoken` cookie captured off responses is
//!   replayed as `X-CSRFToken` on every POST
//!
//! Flows talk to the backend through the `GeoBackend` trait so tests can
//! substitute a counting mock.

pub mod types;

#[cfg(test)]
pub(crate) mod mock;

use crate::error::{Error, Result};
use crate::geometry::FeatureCollection;
use std::future::Future;
use std::time::Duration;
use tokio::sync::RwLock;
use types::{
    CameraProperties, CreateCameraRequest, CreateCameraResponse, LocationProperties,
    LocationsRequest, SaveShapeRequest, StatusResponse,
};
use url::Url;

/// CSRF cookie/header pair the backend expects
const CSRF_COOKIE: &str = "csrftoken";
const CSRF_HEADER: &str = "X-CSRFToken";

/// Backend operations the console flows depend on
pub trait GeoBackend: Send + Sync + 'static {
    /// `GET /cameras/api/geojson/` - bulk load of existing cameras
    fn fetch_cameras_geojson(
        &self,
    ) -> impl Future<Output = Result<FeatureCollection<CameraProperties>>> + Send;

    /// `POST /cameras/add/` - create a camera
    fn create_camera(
        &self,
        request: CreateCameraRequest,
    ) -> impl Future<Output = Result<CreateCameraResponse>> + Send;

    /// `POST /save/` - persist a drawn shape
    fn save_shape(
        &self,
        request: SaveShapeRequest,
    ) -> impl Future<Output = Result<StatusResponse>> + Send;

    /// `POST /get_locations_geojson/` - fetch selected locations
    fn fetch_locations_geojson(
        &self,
        ids: Vec<u64>,
    ) -> impl Future<Output = Result<FeatureCollection<LocationProperties>>> + Send;
}

/// BackendClient instance
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
    csrf_token: RwLock<Option<String>>,
}

impl BackendClient {
    /// Create a client for the backend at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid backend URL {}: {}", base_url, e)))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .expect("Failed to build HTTP client");

        Ok(Self {
            http,
            base_url,
            csrf_token: RwLock::new(None),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("invalid endpoint {}: {}", path, e)))
    }

    /// Capture the CSRF cookie whenever the backend sets one
    async fn remember_csrf(&self, resp: &reqwest::Response) {
        for cookie in resp.cookies() {
            if cookie.name() == CSRF_COOKIE {
                *self.csrf_token.write().await = Some(cookie.value().to_string());
            }
        }
    }

    async fn post_json<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response> {
        let url = self.endpoint(path)?;
        let mut request = self.http.post(url).json(body);

        let token = self.csrf_token.read().await.clone();
        if let Some(token) = token {
            request = request.header(CSRF_HEADER, token);
        }

        let resp = request.send().await?;
        self.remember_csrf(&resp).await;
        Ok(resp)
    }

    /// Turn a non-2xx response into an API error carrying the server's
    /// message when it sent one
    async fn read_error(resp: reqwest::Response) -> Error {
        let status = resp.status().as_u16();
        let message = match resp.json::<StatusResponse>().await {
            Ok(body) => body.message.unwrap_or_default(),
            Err(_) => String::new(),
        };
        Error::Api { status, message }
    }
}

impl GeoBackend for BackendClient {
    async fn fetch_cameras_geojson(&self) -> Result<FeatureCollection<CameraProperties>> {
        let url = self.endpoint("/cameras/api/geojson/")?;
        let resp = self.http.get(url).send().await?;
        self.remember_csrf(&resp).await;

        if !resp.status().is_success() {
            return Err(Self::read_error(resp).await);
        }
        Ok(resp.json().await?)
    }

    async fn create_camera(&self, request: CreateCameraRequest) -> Result<CreateCameraResponse> {
        let resp = self.post_json("/cameras/add/", &request).await?;
        if !resp.status().is_success() {
            return Err(Self::read_error(resp).await);
        }
        Ok(resp.json().await?)
    }

    async fn save_shape(&self, request: SaveShapeRequest) -> Result<StatusResponse> {
        let resp = self.post_json("/save/", &request).await?;
        if !resp.status().is_success() {
            return Err(Self::read_error(resp).await);
        }
        Ok(resp.json().await?)
    }

    async fn fetch_locations_geojson(
        &self,
        ids: Vec<u64>,
    ) -> Result<FeatureCollection<LocationProperties>> {
        let resp = self
            .post_json("/get_locations_geojson/", &LocationsRequest { ids })
            .await?;
        if !resp.status().is_success() {
            return Err(Self::read_error(resp).await);
        }
        Ok(resp.json().await?)
    }
}
