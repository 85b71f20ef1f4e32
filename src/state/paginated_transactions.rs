use color_eyre::Result;
use tokio::sync::watch;
use tracing::debug;

use crate::api::cached_client::CachedClient;
use crate::api::client::Backend;
use crate::api::request::Request;
use crate::api::types::{PaginatedResponse, Transaction};

/// All transactions, accumulated page by page.
///
/// The cursor for the next fetch is the `next_page` of the data held so far.
pub struct PaginatedTransactionsState<B: Backend> {
  client: CachedClient<B>,
  data: Option<PaginatedResponse<Vec<Transaction>>>,
}

impl<B: Backend> PaginatedTransactionsState<B> {
  pub fn new(client: CachedClient<B>) -> Self {
    Self { client, data: None }
  }

  pub fn data(&self) -> Option<&PaginatedResponse<Vec<Transaction>>> {
    self.data.as_ref()
  }

  pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
    self.client.subscribe_loading()
  }

  /// Whether another page can be requested.
  pub fn has_more(&self) -> bool {
    matches!(&self.data, Some(page) if page.next_page.is_some())
  }

  /// Fetch the next page and append it to the data held so far.
  ///
  /// Without data this fetches the first page. Once the last page has been
  /// merged this is a no-op.
  pub async fn fetch_all(&mut self) -> Result<()> {
    let page = match &self.data {
      None => None,
      Some(previous) => match previous.next_page {
        Some(next) => Some(next),
        None => {
          debug!("transactions exhausted, not fetching");
          return Ok(());
        }
      },
    };

    let response: PaginatedResponse<Vec<Transaction>> = self
      .client
      .fetch_with_cache(&Request::paginated(page))
      .await?;
    debug!(
      ?page,
      count = response.data.len(),
      next_page = ?response.next_page,
      "transactions page loaded"
    );

    self.data = Some(match self.data.take() {
      None => response,
      Some(mut previous) => {
        previous.data.extend(response.data);
        PaginatedResponse {
          data: previous.data,
          next_page: response.next_page,
        }
      }
    });

    Ok(())
  }

  /// Forget the pages held so far. The cache is left alone.
  pub fn invalidate_data(&mut self) {
    self.data = None;
  }

  /// Patch the approval flag of a held transaction. Returns whether it was found.
  pub fn set_approval(&mut self, transaction_id: &str, approved: bool) -> bool {
    self
      .data
      .as_mut()
      .and_then(|page| page.data.iter_mut().find(|t| t.id == transaction_id))
      .map(|t| t.approved = approved)
      .is_some()
  }
}
