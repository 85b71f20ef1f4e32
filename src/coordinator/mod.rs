//! Application root: composes the state components and decides what the
//! transaction list shows.
//!
//! The displayed list is derived on every read: an employee's transactions
//! when they are loaded, else the paginated transactions. No separate mode
//! flag is stored.

mod actor;

pub use actor::{spawn, CoordinatorHandle};

use color_eyre::Result;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::api::cached_client::CachedClient;
use crate::api::client::Backend;
use crate::api::request::{Endpoint, Request};
use crate::api::types::{Employee, Transaction, EMPTY_EMPLOYEE_ID};
use crate::cache::CacheStorage;
use crate::state::{EmployeesState, PaginatedTransactionsState, TransactionsByEmployeeState};

/// Which data source feeds the transaction list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
  #[default]
  AllEmployees,
  ByEmployee,
}

/// User intents the coordinator reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  /// Initial load; ignored once employees are loaded or loading
  Load,
  /// Filter by employee id, or clear the filter with `EMPTY_EMPLOYEE_ID`
  SelectEmployee(String),
  /// Fetch the next page. `after` is the cursor of the list the user saw;
  /// the command is dropped once the list has moved past it.
  ViewMore { after: Option<u32> },
  /// Approve or unapprove a transaction
  ToggleApproval {
    transaction_id: String,
    approved: bool,
  },
  /// Drop every cached response and start over
  Refresh,
}

/// Receivers for every loading flag, for the UI to watch.
#[derive(Debug, Clone)]
pub struct LoadingFlags {
  /// Initial load / refresh in progress
  pub all: watch::Receiver<bool>,
  pub employees: watch::Receiver<bool>,
  pub transactions: watch::Receiver<bool>,
  pub by_employee: watch::Receiver<bool>,
  pub approval: watch::Receiver<bool>,
}

impl LoadingFlags {
  pub fn any(&self) -> bool {
    *self.all.borrow()
      || *self.employees.borrow()
      || *self.transactions.borrow()
      || *self.by_employee.borrow()
      || *self.approval.borrow()
  }
}

/// Immutable view of the coordinator, published after every command.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
  /// Bumped after every handled command
  pub version: u64,
  pub employees: Option<Vec<Employee>>,
  pub transactions: Option<Vec<Transaction>>,
  pub mode: Mode,
  pub view_more_visible: bool,
  /// Cursor of the paginated list, echoed back by `ViewMore`
  pub next_page: Option<u32>,
  pub selected_employee: String,
  /// Message of the last failed command, cleared by the next success
  pub error: Option<String>,
}

pub struct Coordinator<B: Backend> {
  employees: EmployeesState<B>,
  paginated: PaginatedTransactionsState<B>,
  by_employee: TransactionsByEmployeeState<B>,
  approvals: CachedClient<B>,
  selected_employee: String,
  loading_all: watch::Sender<bool>,
}

impl<B: Backend> Coordinator<B> {
  pub fn new(backend: B, storage: Arc<dyn CacheStorage>) -> Self {
    let client = CachedClient::new(backend, storage);
    let (loading_all, _) = watch::channel(false);

    Self {
      employees: EmployeesState::new(client.sibling()),
      paginated: PaginatedTransactionsState::new(client.sibling()),
      by_employee: TransactionsByEmployeeState::new(client.sibling()),
      approvals: client,
      selected_employee: EMPTY_EMPLOYEE_ID.to_string(),
      loading_all,
    }
  }

  pub fn employees(&self) -> Option<&[Employee]> {
    self.employees.data()
  }

  /// What the transaction list shows right now.
  pub fn transactions(&self) -> Option<&[Transaction]> {
    match self.by_employee.data() {
      Some(transactions) => Some(transactions),
      None => self.paginated.data().map(|page| page.data.as_slice()),
    }
  }

  pub fn mode(&self) -> Mode {
    if self.by_employee.data().is_some() {
      Mode::ByEmployee
    } else {
      Mode::AllEmployees
    }
  }

  pub fn view_more_visible(&self) -> bool {
    self.mode() == Mode::AllEmployees && self.paginated.has_more()
  }

  /// Cursor the next "view more" would fetch.
  pub fn next_page(&self) -> Option<u32> {
    self.paginated.data().and_then(|page| page.next_page)
  }

  pub fn needs_initial_load(&self) -> bool {
    self.employees.data().is_none() && !self.employees.loading()
  }

  pub fn loading_flags(&self) -> LoadingFlags {
    LoadingFlags {
      all: self.loading_all.subscribe(),
      employees: self.employees.subscribe_loading(),
      transactions: self.paginated.subscribe_loading(),
      by_employee: self.by_employee.subscribe_loading(),
      approval: self.approvals.subscribe_loading(),
    }
  }

  pub fn snapshot(&self, version: u64, error: Option<String>) -> Snapshot {
    Snapshot {
      version,
      employees: self.employees().map(<[Employee]>::to_vec),
      transactions: self.transactions().map(<[Transaction]>::to_vec),
      mode: self.mode(),
      view_more_visible: self.view_more_visible(),
      next_page: self.next_page(),
      selected_employee: self.selected_employee.clone(),
      error,
    }
  }

  pub async fn handle(&mut self, command: Command) -> Result<()> {
    match command {
      Command::Load => self.load().await,
      Command::SelectEmployee(employee_id) => self.select_employee(&employee_id).await,
      Command::ViewMore { after } => {
        if after != self.next_page() {
          debug!(?after, next_page = ?self.next_page(), "dropping stale view more");
          return Ok(());
        }
        self.view_more().await
      }
      Command::ToggleApproval {
        transaction_id,
        approved,
      } => self.toggle_approval(&transaction_id, approved).await,
      Command::Refresh => self.refresh().await,
    }
  }

  /// Initial load, only while employees have never been loaded.
  pub async fn load(&mut self) -> Result<()> {
    if !self.needs_initial_load() {
      debug!("employees already loaded, skipping initial load");
      return Ok(());
    }
    self.load_all_transactions().await
  }

  /// Reset both transaction sources, then load employees followed by the
  /// first page of transactions.
  pub async fn load_all_transactions(&mut self) -> Result<()> {
    info!("loading employees and transactions");
    self.loading_all.send_replace(true);
    self.paginated.invalidate_data();
    self.by_employee.invalidate_data();

    let result = self.fetch_employees_then_first_page().await;

    self.loading_all.send_replace(false);
    result
  }

  async fn fetch_employees_then_first_page(&mut self) -> Result<()> {
    self.employees.fetch_all().await?;
    self.paginated.fetch_all().await
  }

  pub async fn select_employee(&mut self, employee_id: &str) -> Result<()> {
    info!(employee_id, "employee filter changed");
    self.selected_employee = employee_id.to_string();

    if employee_id == EMPTY_EMPLOYEE_ID {
      self.by_employee.set_data(None);
      self.paginated.invalidate_data();
      self.paginated.fetch_all().await
    } else {
      self.paginated.invalidate_data();
      self.by_employee.fetch_by_id(employee_id).await
    }
  }

  /// Append the next page. Does nothing while the control is hidden.
  pub async fn view_more(&mut self) -> Result<()> {
    if !self.view_more_visible() {
      debug!("view more not available");
      return Ok(());
    }
    self.paginated.fetch_all().await
  }

  /// Persist an approval change, then drop cached transaction lists so later
  /// reads see it.
  pub async fn toggle_approval(&mut self, transaction_id: &str, approved: bool) -> Result<()> {
    info!(transaction_id, approved, "setting transaction approval");
    let _: Value = self
      .approvals
      .fetch_without_cache(&Request::set_approval(transaction_id, approved))
      .await?;

    self.approvals.clear_cache_by_endpoint(&[
      Endpoint::PaginatedTransactions,
      Endpoint::TransactionsByEmployee,
    ])?;

    let paginated = self.paginated.set_approval(transaction_id, approved);
    let by_employee = self.by_employee.set_approval(transaction_id, approved);
    debug!(paginated, by_employee, "patched approval in held data");
    Ok(())
  }

  /// Clear the cache and the filter, then load everything again.
  pub async fn refresh(&mut self) -> Result<()> {
    info!("refreshing all data");
    self.approvals.clear_cache()?;
    self.selected_employee = EMPTY_EMPLOYEE_ID.to_string();
    self.employees.invalidate_data();
    self.load_all_transactions().await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{MemoryStorage, QueryKey};
  use crate::testing::RecordingBackend;

  const PATRICIA: &str = "93e1f04d";

  fn coordinator(backend: &RecordingBackend) -> Coordinator<RecordingBackend> {
    Coordinator::new(backend.clone(), Arc::new(MemoryStorage::new()))
  }

  async fn loaded(backend: &RecordingBackend) -> Coordinator<RecordingBackend> {
    let mut coordinator = coordinator(backend);
    coordinator.handle(Command::Load).await.unwrap();
    coordinator
  }

  fn shown_ids(coordinator: &Coordinator<RecordingBackend>) -> Vec<String> {
    coordinator
      .transactions()
      .unwrap_or_default()
      .iter()
      .map(|t| t.id.clone())
      .collect()
  }

  #[tokio::test]
  async fn test_initial_state() {
    let backend = RecordingBackend::sample();
    let coordinator = coordinator(&backend);

    assert!(coordinator.needs_initial_load());
    assert!(coordinator.transactions().is_none());
    assert_eq!(coordinator.mode(), Mode::AllEmployees);
    assert!(!coordinator.view_more_visible());
    assert_eq!(coordinator.selected_employee.as_str(), EMPTY_EMPLOYEE_ID);
  }

  #[tokio::test]
  async fn test_initial_load_order() {
    let backend = RecordingBackend::sample();
    let coordinator = loaded(&backend).await;

    assert_eq!(
      backend.calls(),
      vec![Request::Employees, Request::paginated(None)]
    );
    assert_eq!(coordinator.employees().map(|e| e.len()), Some(4));
    assert_eq!(shown_ids(&coordinator).len(), 5);
    assert!(coordinator.view_more_visible());
    assert!(!*coordinator.loading_flags().all.borrow());
  }

  #[tokio::test]
  async fn test_load_is_skipped_once_employees_exist() {
    let backend = RecordingBackend::sample();
    let mut coordinator = loaded(&backend).await;

    coordinator.handle(Command::Load).await.unwrap();

    assert_eq!(backend.call_count(), 2);
  }

  #[tokio::test]
  async fn test_failed_initial_load_clears_loading() {
    let backend = RecordingBackend::sample();
    let mut coordinator = coordinator(&backend);

    backend.fail_next();
    assert!(coordinator.handle(Command::Load).await.is_err());

    assert!(!*coordinator.loading_flags().all.borrow());
    assert!(coordinator.needs_initial_load());
    // employees failed, so the page was never requested
    assert_eq!(backend.calls(), vec![Request::Employees]);
  }

  #[tokio::test]
  async fn test_select_employee_shows_only_their_transactions() {
    let backend = RecordingBackend::sample();
    let mut coordinator = loaded(&backend).await;
    coordinator
      .handle(Command::ViewMore { after: Some(1) })
      .await
      .unwrap();

    coordinator
      .handle(Command::SelectEmployee(PATRICIA.to_string()))
      .await
      .unwrap();

    assert_eq!(coordinator.mode(), Mode::ByEmployee);
    assert!(!coordinator.view_more_visible());
    let shown = coordinator.transactions().unwrap();
    assert_eq!(shown.len(), 4);
    assert!(shown.iter().all(|t| t.employee.id == PATRICIA));
    assert_eq!(coordinator.selected_employee.as_str(), PATRICIA);
  }

  #[tokio::test]
  async fn test_clearing_filter_shows_fresh_first_page() {
    let backend = RecordingBackend::sample();
    let mut coordinator = loaded(&backend).await;
    coordinator.view_more().await.unwrap();
    coordinator.select_employee(PATRICIA).await.unwrap();

    coordinator.select_employee(EMPTY_EMPLOYEE_ID).await.unwrap();

    assert_eq!(coordinator.mode(), Mode::AllEmployees);
    let expected: Vec<String> = (1..=5).map(|i| format!("tx-{:04}", i)).collect();
    assert_eq!(shown_ids(&coordinator), expected);
    assert!(coordinator.view_more_visible());
  }

  #[tokio::test]
  async fn test_view_more_with_stale_cursor_is_dropped() {
    let backend = RecordingBackend::sample();
    let mut coordinator = loaded(&backend).await;
    assert_eq!(coordinator.next_page(), Some(1));

    coordinator
      .handle(Command::ViewMore { after: Some(3) })
      .await
      .unwrap();
    coordinator
      .handle(Command::ViewMore { after: None })
      .await
      .unwrap();

    assert_eq!(shown_ids(&coordinator).len(), 5);
    assert_eq!(backend.endpoint_calls(Endpoint::PaginatedTransactions), 1);

    coordinator
      .handle(Command::ViewMore { after: Some(1) })
      .await
      .unwrap();
    assert_eq!(shown_ids(&coordinator).len(), 10);
    assert_eq!(coordinator.next_page(), Some(2));
  }

  #[tokio::test]
  async fn test_view_more_hidden_when_single_page() {
    let (employees, transactions) = crate::api::mock::sample_data();
    let backend = RecordingBackend::new(employees, transactions[..3].to_vec(), 5);
    let mut coordinator = loaded(&backend).await;

    assert_eq!(shown_ids(&coordinator).len(), 3);
    assert!(!coordinator.view_more_visible());

    coordinator.view_more().await.unwrap();
    assert_eq!(backend.call_count(), 2);
  }

  #[tokio::test]
  async fn test_view_more_twice_appends_pages() {
    let backend = RecordingBackend::sample();
    let mut coordinator = loaded(&backend).await;

    coordinator.view_more().await.unwrap();
    coordinator.view_more().await.unwrap();

    assert_eq!(shown_ids(&coordinator).len(), 15);
    // employees are not refetched by view more
    assert_eq!(backend.endpoint_calls(Endpoint::Employees), 1);
    assert_eq!(backend.endpoint_calls(Endpoint::PaginatedTransactions), 3);
  }

  #[tokio::test]
  async fn test_view_more_ignored_in_employee_mode() {
    let backend = RecordingBackend::sample();
    let mut coordinator = loaded(&backend).await;
    coordinator.select_employee(PATRICIA).await.unwrap();
    let before = backend.call_count();

    coordinator.view_more().await.unwrap();

    assert_eq!(backend.call_count(), before);
  }

  #[tokio::test]
  async fn test_failed_employee_fetch_keeps_list_source_exclusive() {
    let backend = RecordingBackend::sample();
    let mut coordinator = loaded(&backend).await;

    backend.fail_next();
    assert!(coordinator.select_employee(PATRICIA).await.is_err());

    // paginated data was dropped before the request, nothing stale remains
    assert!(coordinator.transactions().is_none());
    assert!(!coordinator.view_more_visible());
  }

  #[tokio::test]
  async fn test_toggle_approval_purges_transaction_caches() {
    let backend = RecordingBackend::sample();
    let storage = Arc::new(MemoryStorage::new());
    let mut coordinator = Coordinator::new(backend.clone(), storage.clone());
    coordinator.load().await.unwrap();

    coordinator.toggle_approval("tx-0002", true).await.unwrap();
    assert!(coordinator.transactions().unwrap()[1].approved);
    assert!(!storage.has(&Request::paginated(None).cache_key()).unwrap());
    assert!(storage.has(&Request::Employees.cache_key()).unwrap());

    coordinator.select_employee(EMPTY_EMPLOYEE_ID).await.unwrap();

    // first page requested again and reflects the change
    assert_eq!(backend.endpoint_calls(Endpoint::PaginatedTransactions), 2);
    assert!(coordinator.transactions().unwrap()[1].approved);
  }

  #[tokio::test]
  async fn test_refresh_resets_filter() {
    let backend = RecordingBackend::sample();
    let mut coordinator = loaded(&backend).await;
    coordinator.select_employee(PATRICIA).await.unwrap();

    coordinator.handle(Command::Refresh).await.unwrap();

    assert_eq!(coordinator.selected_employee.as_str(), EMPTY_EMPLOYEE_ID);
    assert_eq!(coordinator.mode(), Mode::AllEmployees);
    assert_eq!(shown_ids(&coordinator).len(), 5);
    assert_eq!(backend.endpoint_calls(Endpoint::Employees), 2);
  }

  #[tokio::test]
  async fn test_snapshot_reflects_state() {
    let backend = RecordingBackend::sample();
    let coordinator = loaded(&backend).await;

    let snapshot = coordinator.snapshot(7, None);
    assert_eq!(snapshot.version, 7);
    assert_eq!(snapshot.employees.map(|e| e.len()), Some(4));
    assert_eq!(snapshot.transactions.map(|t| t.len()), Some(5));
    assert!(snapshot.view_more_visible);
    assert_eq!(snapshot.mode, Mode::AllEmployees);
    assert_eq!(snapshot.next_page, Some(1));
  }
}
