//! Seams to the browser host.
//!
//! The background process never talks to the browser directly. It asks a
//! [`TabNavigator`] to move tabs, a [`KeyValueStorage`] to persist data and
//! a [`Clock`] for the calendar date, so each can be replaced in tests or
//! by a different host shell.

use std::collections::{HashMap, HashSet};
use std::future::{ready, Future};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use serde_json::Value;

use crate::managers::redirect_guard::Generation;
use crate::types::errors::{NavigationError, StorageError};

/// Asynchronous "navigate tab to URL" operation exposed by the host.
///
/// `redirect` identifies this replacement navigation. A host that reports
/// completion on its own hands it back so the report only ends this
/// redirect's suppression window.
pub trait TabNavigator: Send + Sync + 'static {
    fn navigate_tab(
        &self,
        tab_id: i64,
        url: &str,
        redirect: Generation,
    ) -> impl Future<Output = Result<(), NavigationError>> + Send;
}

/// The extension's private persistent key-value store.
pub trait KeyValueStorage: Send + Sync + 'static {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Value>, StorageError>> + Send;
    fn set(&self, key: &str, value: Value) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Source of the current calendar date.
pub trait Clock: Send + Sync + 'static {
    fn today(&self) -> NaiveDate;
}

/// Wall clock in UTC, the same day boundary the viewer page uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// A clock pinned to a settable date.
#[derive(Debug, Clone)]
pub struct FixedClock {
    date: Arc<Mutex<NaiveDate>>,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Arc::new(Mutex::new(date)),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        *self.date.lock() = date;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.date.lock()
    }
}

/// Navigator that records every request and answers with a preset result.
///
/// Lets tests observe the replacement navigations the interceptor issues.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    calls: Arc<Mutex<Vec<(i64, String)>>>,
    reject_with: Arc<Mutex<Option<String>>>,
    closed: Arc<Mutex<HashSet<i64>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following navigation fail with `reason`.
    pub fn reject_all(&self, reason: &str) {
        *self.reject_with.lock() = Some(reason.to_string());
    }

    /// Makes navigations of `tab_id` fail as if the tab had been closed.
    pub fn close_tab(&self, tab_id: i64) {
        self.closed.lock().insert(tab_id);
    }

    pub fn calls(&self) -> Vec<(i64, String)> {
        self.calls.lock().clone()
    }
}

impl TabNavigator for RecordingNavigator {
    fn navigate_tab(
        &self,
        tab_id: i64,
        url: &str,
        _redirect: Generation,
    ) -> impl Future<Output = Result<(), NavigationError>> + Send {
        self.calls.lock().push((tab_id, url.to_string()));
        let closed = self.closed.lock().contains(&tab_id);
        let rejection = self.reject_with.lock().clone();
        async move {
            tokio::task::yield_now().await;
            if closed {
                return Err(NavigationError::TabNotFound(tab_id));
            }
            match rejection {
                Some(reason) => Err(NavigationError::Rejected(reason)),
                None => Ok(()),
            }
        }
    }
}

/// Process-local storage, lost on exit. Can be told to fail reads or
/// writes to exercise degraded paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, Value>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Writes a raw value, bypassing failure injection.
    pub fn insert_raw(&self, key: &str, value: Value) {
        self.entries.lock().insert(key.to_string(), value);
    }

    pub fn raw(&self, key: &str) -> Option<Value> {
        self.entries.lock().get(key).cloned()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Value>, StorageError>> + Send {
        let result = if self.fail_reads.load(Ordering::SeqCst) {
            Err(StorageError::Read(format!("read of '{}' refused", key)))
        } else {
            Ok(self.entries.lock().get(key).cloned())
        };
        ready(result)
    }

    fn set(&self, key: &str, value: Value) -> impl Future<Output = Result<(), StorageError>> + Send {
        let result = if self.fail_writes.load(Ordering::SeqCst) {
            Err(StorageError::Write(format!("write of '{}' refused", key)))
        } else {
            self.entries.lock().insert(key.to_string(), value);
            Ok(())
        };
        ready(result)
    }
}
