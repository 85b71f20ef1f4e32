//! Test helpers shared by the unit tests.

use crate::api::client::Backend;
use crate::api::mock::{sample_data, MockBackend, DEFAULT_PAGE_SIZE};
use crate::api::request::Request;
use crate::api::types::{Employee, Transaction};
use color_eyre::{eyre::eyre, Result};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Backend that serves mock data and records every request it receives.
#[derive(Clone)]
pub struct RecordingBackend {
  inner: MockBackend,
  calls: Arc<Mutex<Vec<Request>>>,
  fail_next: Arc<AtomicBool>,
}

impl RecordingBackend {
  pub fn new(employees: Vec<Employee>, transactions: Vec<Transaction>, page_size: usize) -> Self {
    Self {
      inner: MockBackend::new(employees, transactions, page_size),
      calls: Arc::new(Mutex::new(Vec::new())),
      fail_next: Arc::new(AtomicBool::new(false)),
    }
  }

  /// The built-in sample data, 18 transactions in pages of 5.
  pub fn sample() -> Self {
    let (employees, transactions) = sample_data();
    Self::new(employees, transactions, DEFAULT_PAGE_SIZE)
  }

  /// Make the next request fail with a server error.
  pub fn fail_next(&self) {
    self.fail_next.store(true, Ordering::SeqCst);
  }

  pub fn calls(&self) -> Vec<Request> {
    self.calls.lock().unwrap().clone()
  }

  pub fn call_count(&self) -> usize {
    self.calls.lock().unwrap().len()
  }

  pub fn endpoint_calls(&self, endpoint: crate::api::request::Endpoint) -> usize {
    self
      .calls
      .lock()
      .unwrap()
      .iter()
      .filter(|r| r.endpoint() == endpoint)
      .count()
  }
}

impl Backend for RecordingBackend {
  async fn request(&self, request: &Request) -> Result<Value> {
    self.calls.lock().unwrap().push(request.clone());

    if self.fail_next.swap(false, Ordering::SeqCst) {
      return Err(eyre!("500 Internal Server Error"));
    }

    self.inner.request(request).await
  }
}
