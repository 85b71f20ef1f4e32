use color_eyre::Result;
use tokio::sync::watch;
use tracing::debug;

use crate::api::cached_client::CachedClient;
use crate::api::client::Backend;
use crate::api::request::Request;
use crate::api::types::Employee;

/// The full employee list, loaded lazily.
pub struct EmployeesState<B: Backend> {
  client: CachedClient<B>,
  data: Option<Vec<Employee>>,
}

impl<B: Backend> EmployeesState<B> {
  pub fn new(client: CachedClient<B>) -> Self {
    Self { client, data: None }
  }

  /// `None` until the first successful fetch.
  pub fn data(&self) -> Option<&[Employee]> {
    self.data.as_deref()
  }

  pub fn loading(&self) -> bool {
    self.client.loading()
  }

  pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
    self.client.subscribe_loading()
  }

  pub async fn fetch_all(&mut self) -> Result<()> {
    let employees: Vec<Employee> = self.client.fetch_with_cache(&Request::Employees).await?;
    debug!(count = employees.len(), "employees loaded");
    self.data = Some(employees);
    Ok(())
  }

  pub fn invalidate_data(&mut self) {
    self.data = None;
  }
}
