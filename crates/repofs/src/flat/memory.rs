//! In-memory uploads store.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use super::api::{Upload, UploadsApi};
use crate::error::{Error, Result};

/// In-memory uploads service. Keeps every upload, duplicates included, in
/// upload order.
#[derive(Default)]
pub struct InMemoryUploads {
    uploads: RwLock<Vec<(Upload, Vec<u8>)>>,
    next_id: AtomicUsize,
    faults: Mutex<VecDeque<Error>>,
    calls: AtomicUsize,
}

impl InMemoryUploads {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an upload (builder form).
    pub fn with_upload(self, filename: &str, content: impl Into<Vec<u8>>) -> Self {
        self.insert(filename, content);
        self
    }

    /// Seed an upload without counting a call.
    pub fn insert(&self, filename: &str, content: impl Into<Vec<u8>>) -> Upload {
        let content = content.into();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let upload = Upload {
            id: id.to_string(),
            filename: filename.to_string(),
            size: content.len() as u64,
            created_at: Some(Utc::now()),
        };
        self.uploads
            .write()
            .unwrap()
            .push((upload.clone(), content));
        upload
    }

    /// Make the next call fail with `error`. Queued faults fire in order.
    pub fn fail_next(&self, error: Error) {
        self.faults.lock().unwrap().push_back(error);
    }

    /// Number of API calls served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Filenames in upload order.
    pub fn filenames(&self) -> Vec<String> {
        self.uploads
            .read()
            .unwrap()
            .iter()
            .map(|(u, _)| u.filename.clone())
            .collect()
    }

    fn begin_call(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.faults.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl UploadsApi for InMemoryUploads {
    async fn list(&self) -> Result<Vec<Upload>> {
        self.begin_call()?;
        Ok(self
            .uploads
            .read()
            .unwrap()
            .iter()
            .map(|(u, _)| u.clone())
            .collect())
    }

    async fn upload(&self, filename: &str, content: &[u8]) -> Result<Upload> {
        self.begin_call()?;
        Ok(self.insert(filename, content))
    }

    async fn download(&self, id: &str) -> Result<Vec<u8>> {
        self.begin_call()?;
        self.uploads
            .read()
            .unwrap()
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| Error::not_found(id))
    }
}
