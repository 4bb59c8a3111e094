use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;

use super::error::StorageError;
use super::key::validate_key;
use super::traits::StorageBackend;

/// In-memory backend that records every call and can be told to fail.
#[derive(Default)]
pub struct MemoryBackend {
    objects: Mutex<HashMap<String, Bytes>>,
    put_keys: Mutex<Vec<String>>,
    delete_keys: Mutex<Vec<String>>,
    failing_puts: AtomicUsize,
    fail_deletes: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` `put_object` calls fail with a transient error.
    pub fn fail_next_puts(&self, n: usize) {
        self.failing_puts.store(n, Ordering::SeqCst);
    }

    /// Make every `delete_object` call fail until reset.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Keys passed to `put_object`, in call order (including failed calls).
    pub fn put_calls(&self) -> Vec<String> {
        self.put_keys.lock().unwrap().clone()
    }

    /// Keys passed to `delete_object`, in call order (including failed calls).
    pub fn delete_calls(&self) -> Vec<String> {
        self.delete_keys.lock().unwrap().clone()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        self.put_keys.lock().unwrap().push(key.to_string());
        validate_key(key)?;

        let remaining = self.failing_puts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_puts.store(remaining - 1, Ordering::SeqCst);
            return Err(StorageError::Backend("injected put failure".into()));
        }

        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        self.delete_keys.lock().unwrap().push(key.to_string());
        validate_key(key)?;

        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("injected delete failure".into()));
        }

        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}
