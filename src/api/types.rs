use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Id of the placeholder employee that stands for "no filter selected".
pub const EMPTY_EMPLOYEE_ID: &str = "";

/// An employee as returned by the backend.
///
/// Profile fields beyond the name are kept as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
  pub id: String,
  pub first_name: String,
  pub last_name: String,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl Employee {
  pub fn new(id: &str, first_name: &str, last_name: &str) -> Self {
    Self {
      id: id.to_string(),
      first_name: first_name.to_string(),
      last_name: last_name.to_string(),
      extra: Map::new(),
    }
  }

  /// The sentinel shown first in the employee filter.
  pub fn empty() -> Self {
    Self::new(EMPTY_EMPLOYEE_ID, "All", "Employees")
  }

  pub fn is_empty_employee(&self) -> bool {
    self.id == EMPTY_EMPLOYEE_ID
  }

  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

/// A card transaction. Every transaction belongs to exactly one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
  pub id: String,
  pub amount: f64,
  pub employee: Employee,
  pub merchant: String,
  pub date: String,
  pub approved: bool,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// One page of a cursor-paginated listing.
///
/// `next_page == None` means there is nothing left to fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
  pub data: T,
  pub next_page: Option<u32>,
}
