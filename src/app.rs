use crate::coordinator::{Command, CoordinatorHandle, LoadingFlags, Snapshot};
use crate::event::{Event, EventHandler};
use crate::ui;
use crate::ui::components::{EmployeeFilter, EmployeeFilterEvent, KeyResult};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::debug;

/// Main application state
pub struct App {
  /// Running coordinator
  coordinator: CoordinatorHandle,

  /// Latest coordinator snapshot
  snapshot: Snapshot,

  /// Employee filter and its picker
  filter: EmployeeFilter,

  /// Highlighted row in the transaction list
  selected: usize,

  title: String,

  /// Where the data comes from, for the header
  source: String,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(coordinator: CoordinatorHandle, title: String, source: String) -> Self {
    let snapshot = coordinator.snapshot();
    Self {
      coordinator,
      snapshot,
      filter: EmployeeFilter::new(),
      selected: 0,
      title,
      source,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.main_loop(&mut terminal).await;

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn main_loop<W: Backend>(&mut self, terminal: &mut Terminal<W>) -> Result<()> {
    let mut events = EventHandler::new(Duration::from_millis(250));
    let mut snapshots = self.coordinator.subscribe();

    // Initial data load
    self.coordinator.send(Command::Load)?;

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      tokio::select! {
        event = events.next() => match event {
          Some(event) => self.handle_event(event)?,
          None => break,
        },
        changed = snapshots.changed() => {
          if changed.is_err() {
            break;
          }
          let snapshot = snapshots.borrow_and_update().clone();
          self.apply_snapshot(snapshot);
        }
      }
    }

    Ok(())
  }

  fn handle_event(&mut self, event: Event) -> Result<()> {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => Ok(()), // UI refresh happens automatically
    }
  }

  fn apply_snapshot(&mut self, snapshot: Snapshot) {
    debug!(version = snapshot.version, error = ?snapshot.error, "applying snapshot");
    self
      .filter
      .set_employees(snapshot.employees.as_deref(), &snapshot.selected_employee);

    let len = snapshot.transactions.as_ref().map_or(0, Vec::len);
    if self.selected >= len {
      self.selected = len.saturating_sub(1);
    }

    self.snapshot = snapshot;
  }

  fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
    match self.filter.handle_key(key) {
      KeyResult::Event(EmployeeFilterEvent::Selected(employee_id)) => {
        self.selected = 0;
        return self.coordinator.send(Command::SelectEmployee(employee_id));
      }
      KeyResult::Event(EmployeeFilterEvent::Cancelled) | KeyResult::Handled => return Ok(()),
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
      KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.should_quit = true;
      }

      // Navigation
      KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
      KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),

      KeyCode::Char('f') => {
        // The filter is disabled during the initial load
        if !*self.loading().all.borrow() {
          self.filter.show();
        }
      }
      KeyCode::Enter | KeyCode::Char('m') => {
        if self.snapshot.view_more_visible && !*self.loading().transactions.borrow() {
          self.coordinator.view_more(self.snapshot.next_page)?;
        }
      }
      KeyCode::Char(' ') => {
        if let Some(transaction) = self
          .snapshot
          .transactions
          .as_ref()
          .and_then(|t| t.get(self.selected))
        {
          self.coordinator.send(Command::ToggleApproval {
            transaction_id: transaction.id.clone(),
            approved: !transaction.approved,
          })?;
        }
      }
      KeyCode::Char('r') => {
        self.selected = 0;
        self.coordinator.send(Command::Refresh)?;
      }
      _ => debug!(?key, "unbound key"),
    }

    Ok(())
  }

  fn move_selection(&mut self, delta: i32) {
    let len = self.snapshot.transactions.as_ref().map_or(0, Vec::len);
    if len > 0 {
      self.selected = (self.selected as i32 + delta).rem_euclid(len as i32) as usize;
    }
  }

  // Accessors for UI rendering
  pub fn snapshot(&self) -> &Snapshot {
    &self.snapshot
  }

  pub fn loading(&self) -> &LoadingFlags {
    self.coordinator.loading()
  }

  pub fn filter(&self) -> &EmployeeFilter {
    &self.filter
  }

  pub fn selected(&self) -> usize {
    self.selected
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn source(&self) -> &str {
    &self.source
  }
}
