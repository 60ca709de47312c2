//! Test doubles for the remote content store

#![allow(dead_code)]

use async_trait::async_trait;
use cmsedit_editor::{ContentApi, SaveError, SaveRequest};
use std::collections::HashSet;
use std::sync::Mutex;
use tokio::sync::{Barrier, Notify};

/// Records every request; documents listed in `failing` get a 500
#[derive(Default)]
pub struct RecordingApi {
    pub requests: Mutex<Vec<SaveRequest>>,
    pub failing: HashSet<String>,
}

impl RecordingApi {
    pub fn failing(documents: &[&str]) -> Self {
        Self {
            failing: documents.iter().map(|d| d.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request_for(&self, document_id: &str) -> Option<SaveRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.document_id == document_id)
            .cloned()
    }
}

#[async_trait]
impl ContentApi for RecordingApi {
    async fn save_document(&self, request: &SaveRequest) -> Result<(), SaveError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.failing.contains(&request.document_id) {
            Err(SaveError::Status(500))
        } else {
            Ok(())
        }
    }
}

/// Holds every write open until `release` is notified
#[derive(Default)]
pub struct GatedApi {
    pub started: Notify,
    pub release: Notify,
    pub requests: Mutex<Vec<SaveRequest>>,
    /// Status every released write fails with
    pub fail_with: Option<u16>,
}

impl GatedApi {
    pub fn failing(status: u16) -> Self {
        Self {
            fail_with: Some(status),
            ..Self::default()
        }
    }
}

#[async_trait]
impl ContentApi for GatedApi {
    async fn save_document(&self, request: &SaveRequest) -> Result<(), SaveError> {
        self.requests.lock().unwrap().push(request.clone());
        self.started.notify_one();
        self.release.notified().await;
        match self.fail_with {
            Some(status) => Err(SaveError::Status(status)),
            None => Ok(()),
        }
    }
}

/// Completes a write only once `writers` writes are waiting together
pub struct BarrierApi {
    barrier: Barrier,
}

impl BarrierApi {
    pub fn new(writers: usize) -> Self {
        Self {
            barrier: Barrier::new(writers),
        }
    }
}

#[async_trait]
impl ContentApi for BarrierApi {
    async fn save_document(&self, _request: &SaveRequest) -> Result<(), SaveError> {
        self.barrier.wait().await;
        Ok(())
    }
}
