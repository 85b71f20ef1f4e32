//! In-process backend serving built-in sample data.
//!
//! Used when no API url is configured, and as the data source of the test
//! fakes.

use crate::config::DemoConfig;
use color_eyre::{eyre::eyre, Result};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::client::Backend;
use super::request::Request;
use super::types::{Employee, PaginatedResponse, Transaction};

pub const DEFAULT_PAGE_SIZE: usize = 5;

struct MockData {
  employees: Vec<Employee>,
  transactions: Vec<Transaction>,
}

#[derive(Clone)]
pub struct MockBackend {
  data: Arc<Mutex<MockData>>,
  page_size: usize,
  latency: Duration,
}

impl MockBackend {
  pub fn new(employees: Vec<Employee>, transactions: Vec<Transaction>, page_size: usize) -> Self {
    Self {
      data: Arc::new(Mutex::new(MockData {
        employees,
        transactions,
      })),
      page_size: page_size.max(1),
      latency: Duration::ZERO,
    }
  }

  /// Sample data set with the configured page size and latency.
  pub fn demo(config: &DemoConfig) -> Self {
    let (employees, transactions) = sample_data();
    Self::new(employees, transactions, config.page_size)
      .with_latency(Duration::from_millis(config.latency_ms))
  }

  /// Delay every response to mimic a remote server.
  pub fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = latency;
    self
  }

  fn respond(&self, request: &Request) -> Result<Value> {
    let mut data = self
      .data
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let body = match request {
      Request::Employees => serde_json::to_value(&data.employees)?,
      Request::PaginatedTransactions { page } => {
        let page = page.unwrap_or(0) as usize;
        let start = page * self.page_size;
        if start > 0 && start >= data.transactions.len() {
          return Err(eyre!("Invalid page {}", page));
        }

        let end = (start + self.page_size).min(data.transactions.len());
        let next_page = if end < data.transactions.len() {
          Some(page as u32 + 1)
        } else {
          None
        };

        serde_json::to_value(PaginatedResponse {
          data: &data.transactions[start..end],
          next_page,
        })?
      }
      Request::TransactionsByEmployee { employee_id } => {
        if employee_id.is_empty() {
          return Err(eyre!("Employee id cannot be empty"));
        }
        let employee_transactions: Vec<&Transaction> = data
          .transactions
          .iter()
          .filter(|t| &t.employee.id == employee_id)
          .collect();
        serde_json::to_value(employee_transactions)?
      }
      Request::SetTransactionApproval {
        transaction_id,
        value,
      } => {
        let transaction = data
          .transactions
          .iter_mut()
          .find(|t| &t.id == transaction_id)
          .ok_or_else(|| eyre!("Invalid transaction {}", transaction_id))?;
        transaction.approved = *value;
        Value::Null
      }
    };

    Ok(body)
  }
}

impl Backend for MockBackend {
  async fn request(&self, request: &Request) -> Result<Value> {
    if !self.latency.is_zero() {
      tokio::time::sleep(self.latency).await;
    }
    self.respond(request)
  }
}

/// Build a transaction for sample data and tests.
pub fn transaction(id: &str, amount: f64, employee: &Employee, merchant: &str, date: &str) -> Transaction {
  Transaction {
    id: id.to_string(),
    amount,
    employee: employee.clone(),
    merchant: merchant.to_string(),
    date: date.to_string(),
    approved: false,
    extra: Map::new(),
  }
}

const SAMPLE_EMPLOYEES: &[(&str, &str, &str)] = &[
  ("4f6ea7c4", "James", "Smith"),
  ("b7a5c0fe", "Mary", "Johnson"),
  ("2c8ad3b1", "Robert", "Williams"),
  ("93e1f04d", "Patricia", "Brown"),
];

const SAMPLE_TRANSACTIONS: &[(usize, f64, &str, &str)] = &[
  (0, 289.84, "Social Media Ads Inc", "2022-01-04"),
  (1, 42.10, "Blue Bottle Coffee", "2022-01-05"),
  (2, 1250.00, "Delta Air Lines", "2022-01-07"),
  (3, 98.45, "Office Depot", "2022-01-08"),
  (0, 15.99, "Slack Technologies", "2022-01-10"),
  (1, 620.30, "Marriott Hotels", "2022-01-11"),
  (2, 33.75, "Uber", "2022-01-12"),
  (3, 410.00, "AWS", "2022-01-14"),
  (0, 76.20, "Sweetgreen", "2022-01-15"),
  (1, 5.49, "Starbucks", "2022-01-17"),
  (2, 189.99, "Best Buy", "2022-01-18"),
  (3, 12.00, "Zoom Video", "2022-01-20"),
  (0, 540.60, "Hilton", "2022-01-21"),
  (1, 64.35, "Lyft", "2022-01-23"),
  (2, 22.18, "Chipotle", "2022-01-24"),
  (3, 305.00, "United Airlines", "2022-01-26"),
  (0, 48.00, "Dropbox", "2022-01-27"),
  (1, 130.42, "Staples", "2022-01-29"),
];

/// The built-in sample employees and transactions.
pub fn sample_data() -> (Vec<Employee>, Vec<Transaction>) {
  let employees: Vec<Employee> = SAMPLE_EMPLOYEES
    .iter()
    .map(|(id, first, last)| Employee::new(id, first, last))
    .collect();

  let transactions = SAMPLE_TRANSACTIONS
    .iter()
    .enumerate()
    .map(|(i, (employee, amount, merchant, date))| {
      transaction(
        &format!("tx-{:04}", i + 1),
        *amount,
        &employees[*employee],
        merchant,
        date,
      )
    })
    .collect();

  (employees, transactions)
}
