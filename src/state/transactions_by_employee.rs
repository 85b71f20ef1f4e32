use color_eyre::Result;
use tokio::sync::watch;
use tracing::debug;

use crate::api::cached_client::CachedClient;
use crate::api::client::Backend;
use crate::api::request::Request;
use crate::api::types::Transaction;

/// Every transaction of the selected employee. Not paginated.
pub struct TransactionsByEmployeeState<B: Backend> {
  client: CachedClient<B>,
  data: Option<Vec<Transaction>>,
}

impl<B: Backend> TransactionsByEmployeeState<B> {
  pub fn new(client: CachedClient<B>) -> Self {
    Self { client, data: None }
  }

  pub fn data(&self) -> Option<&[Transaction]> {
    self.data.as_deref()
  }

  pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
    self.client.subscribe_loading()
  }

  pub async fn fetch_by_id(&mut self, employee_id: &str) -> Result<()> {
    let transactions: Vec<Transaction> = self
      .client
      .fetch_with_cache(&Request::by_employee(employee_id))
      .await?;
    debug!(employee_id, count = transactions.len(), "employee transactions loaded");
    self.set_data(Some(transactions));
    Ok(())
  }

  pub fn set_data(&mut self, data: Option<Vec<Transaction>>) {
    self.data = data;
  }

  pub fn invalidate_data(&mut self) {
    self.set_data(None);
  }

  /// Patch the approval flag of a held transaction. Returns whether it was found.
  pub fn set_approval(&mut self, transaction_id: &str, approved: bool) -> bool {
    self
      .data
      .as_mut()
      .and_then(|data| data.iter_mut().find(|t| t.id == transaction_id))
      .map(|t| t.approved = approved)
      .is_some()
  }
}
