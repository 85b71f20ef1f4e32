//! Cache keys for backend requests.

use sha2::{Digest, Sha256};

use crate::cache::QueryKey;

use super::request::Request;

impl QueryKey for Request {
  fn cache_hash(&self) -> String {
    // serde_json keeps object keys sorted, so equal params serialize equally
    let input = format!("{}:{}", self.endpoint(), self.params());

    // SHA256 hash for stable, fixed-length keys
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
  }

  fn namespace(&self) -> &'static str {
    self.endpoint().name()
  }

  fn description(&self) -> String {
    match self {
      Self::Employees => "all employees".to_string(),
      Self::PaginatedTransactions { page } => match page {
        Some(p) => format!("transactions page {}", p),
        None => "transactions first page".to_string(),
      },
      Self::TransactionsByEmployee { employee_id } => {
        format!("transactions of employee {}", employee_id)
      }
      Self::SetTransactionApproval {
        transaction_id,
        value,
      } => format!("set approval of {} to {}", transaction_id, value),
    }
  }
}
