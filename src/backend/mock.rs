//! Counting backend mock for flow tests

use super::types::{
    CameraProperties, CreateCameraRequest, CreateCameraResponse, LocationProperties,
    SaveShapeRequest, StatusResponse,
};
use super::GeoBackend;
use crate::error::{Error, Result};
use crate::geometry::{Feature, FeatureCollection};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// How the mock answers mutating calls
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// `{status: "success"}`
    Success,
    /// 2xx transport but `{status: "error", message}`
    Rejected(String),
    /// Non-2xx response carrying a server message
    ApiError(String),
    /// Transport failure (backend unreachable)
    Unreachable,
}

pub struct MockBackend {
    pub create_calls: AtomicUsize,
    pub save_calls: AtomicUsize,
    pub fetch_camera_calls: AtomicUsize,
    pub fetch_location_calls: AtomicUsize,
    pub last_create: Mutex<Option<CreateCameraRequest>>,
    pub last_save: Mutex<Option<SaveShapeRequest>>,
    pub create_outcome: Mutex<MockOutcome>,
    pub save_outcome: Mutex<MockOutcome>,
    pub fetch_cameras_outcome: Mutex<MockOutcome>,
    pub cameras: Mutex<Vec<Feature<CameraProperties>>>,
    pub locations: Mutex<Vec<Feature<LocationProperties>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            create_calls: AtomicUsize::new(0),
            save_calls: AtomicUsize::new(0),
            fetch_camera_calls: AtomicUsize::new(0),
            fetch_location_calls: AtomicUsize::new(0),
            last_create: Mutex::new(None),
            last_save: Mutex::new(None),
            create_outcome: Mutex::new(MockOutcome::Success),
            save_outcome: Mutex::new(MockOutcome::Success),
            fetch_cameras_outcome: Mutex::new(MockOutcome::Success),
            cameras: Mutex::new(Vec::new()),
            locations: Mutex::new(Vec::new()),
        }
    }

    pub fn set_create_outcome(&self, outcome: MockOutcome) {
        *self.create_outcome.lock().unwrap() = outcome;
    }

    pub fn set_save_outcome(&self, outcome: MockOutcome) {
        *self.save_outcome.lock().unwrap() = outcome;
    }

    pub fn set_fetch_cameras_outcome(&self, outcome: MockOutcome) {
        *self.fetch_cameras_outcome.lock().unwrap() = outcome;
    }

    pub fn created(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn saved(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    fn status_result(outcome: MockOutcome) -> Result<StatusResponse> {
        match outcome {
            MockOutcome::Success => Ok(StatusResponse {
                status: "success".to_string(),
                message: None,
            }),
            MockOutcome::Rejected(message) => Ok(StatusResponse {
                status: "error".to_string(),
                message: Some(message),
            }),
            MockOutcome::ApiError(message) => Err(Error::Api {
                status: 500,
                message,
            }),
            MockOutcome::Unreachable => Err(Error::Internal("backend unreachable".to_string())),
        }
    }
}

impl GeoBackend for MockBackend {
    async fn fetch_cameras_geojson(&self) -> Result<FeatureCollection<CameraProperties>> {
        self.fetch_camera_calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.fetch_cameras_outcome.lock().unwrap().clone();
        match outcome {
            MockOutcome::Unreachable => {
                return Err(Error::Internal("backend unreachable".to_string()))
            }
            MockOutcome::ApiError(message) => {
                return Err(Error::Api {
                    status: 500,
                    message,
                })
            }
            _ => {}
        }
        Ok(FeatureCollection {
            collection_type: "FeatureCollection".to_string(),
            features: self.cameras.lock().unwrap().clone(),
        })
    }

    async fn create_camera(&self, request: CreateCameraRequest) -> Result<CreateCameraResponse> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_create.lock().unwrap() = Some(request);

        let outcome = self.create_outcome.lock().unwrap().clone();
        match outcome {
            MockOutcome::Success => Ok(CreateCameraResponse {
                status: "success".to_string(),
                message: Some("Camera added successfully!".to_string()),
                camera_id: Some(7),
            }),
            MockOutcome::Rejected(message) => Ok(CreateCameraResponse {
                status: "error".to_string(),
                message: Some(message),
                camera_id: None,
            }),
            MockOutcome::ApiError(message) => Err(Error::Api {
                status: 500,
                message,
            }),
            MockOutcome::Unreachable => Err(Error::Internal("backend unreachable".to_string())),
        }
    }

    async fn save_shape(&self, request: SaveShapeRequest) -> Result<StatusResponse> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_save.lock().unwrap() = Some(request);
        let outcome = self.save_outcome.lock().unwrap().clone();
        Self::status_result(outcome)
    }

    async fn fetch_locations_geojson(
        &self,
        _ids: Vec<u64>,
    ) -> Result<FeatureCollection<LocationProperties>> {
        self.fetch_location_calls.fetch_add(1, Ordering::SeqCst);
        Ok(FeatureCollection {
            collection_type: "FeatureCollection".to_string(),
            features: self.locations.lock().unwrap().clone(),
        })
    }
}
