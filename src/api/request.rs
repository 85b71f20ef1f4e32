use serde_json::{json, Value};
use std::fmt;

/// The closed set of backend endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
  Employees,
  PaginatedTransactions,
  TransactionsByEmployee,
  SetTransactionApproval,
}

impl Endpoint {
  pub fn name(&self) -> &'static str {
    match self {
      Self::Employees => "employees",
      Self::PaginatedTransactions => "paginatedTransactions",
      Self::TransactionsByEmployee => "transactionsByEmployee",
      Self::SetTransactionApproval => "setTransactionApproval",
    }
  }
}

impl fmt::Display for Endpoint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// A request to the backend: an endpoint plus its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
  /// Every employee, unpaginated
  Employees,
  /// One page of all transactions; `None` is the first page
  PaginatedTransactions { page: Option<u32> },
  /// Every transaction of one employee
  TransactionsByEmployee { employee_id: String },
  /// Flip the approval flag of a transaction
  SetTransactionApproval { transaction_id: String, value: bool },
}

impl Request {
  pub fn paginated(page: Option<u32>) -> Self {
    Self::PaginatedTransactions { page }
  }

  pub fn by_employee(employee_id: &str) -> Self {
    Self::TransactionsByEmployee {
      employee_id: employee_id.to_string(),
    }
  }

  pub fn set_approval(transaction_id: &str, value: bool) -> Self {
    Self::SetTransactionApproval {
      transaction_id: transaction_id.to_string(),
      value,
    }
  }

  pub fn endpoint(&self) -> Endpoint {
    match self {
      Self::Employees => Endpoint::Employees,
      Self::PaginatedTransactions { .. } => Endpoint::PaginatedTransactions,
      Self::TransactionsByEmployee { .. } => Endpoint::TransactionsByEmployee,
      Self::SetTransactionApproval { .. } => Endpoint::SetTransactionApproval,
    }
  }

  /// Parameters in their wire form.
  pub fn params(&self) -> Value {
    match self {
      Self::Employees => json!({}),
      Self::PaginatedTransactions { page } => json!({ "page": page }),
      Self::TransactionsByEmployee { employee_id } => json!({ "employeeId": employee_id }),
      Self::SetTransactionApproval {
        transaction_id,
        value,
      } => json!({ "transactionId": transaction_id, "value": value }),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_endpoint_names() {
    assert_eq!(Request::Employees.endpoint().name(), "employees");
    assert_eq!(
      Request::paginated(None).endpoint().to_string(),
      "paginatedTransactions"
    );
    assert_eq!(
      Request::by_employee("e1").endpoint(),
      Endpoint::TransactionsByEmployee
    );
  }

  #[test]
  fn test_params_wire_form() {
    assert_eq!(Request::paginated(None).params(), json!({ "page": null }));
    assert_eq!(Request::paginated(Some(2)).params(), json!({ "page": 2 }));
    assert_eq!(
      Request::by_employee("e1").params(),
      json!({ "employeeId": "e1" })
    );
    assert_eq!(
      Request::set_approval("t1", true).params(),
      json!({ "transactionId": "t1", "value": true })
    );
  }
}
