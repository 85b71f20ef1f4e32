use super::KeyResult;
use crate::api::types::Employee;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};

/// Events emitted by the employee filter that the app needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmployeeFilterEvent {
  /// Employee chosen (the sentinel id clears the filter)
  Selected(String),
  /// Picker closed without a choice
  Cancelled,
}

/// Employee filter: the current choice plus a picker overlay.
///
/// Options are the sentinel followed by every employee. Until employees are
/// loaded there are no options at all.
#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
  active: bool,
  options: Vec<Employee>,
  /// Index of the applied choice
  current: usize,
  /// Cursor while the picker is open
  cursor: usize,
}

impl EmployeeFilter {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Replace the options, keeping the applied choice by id.
  pub fn set_employees(&mut self, employees: Option<&[Employee]>, selected_id: &str) {
    self.options = match employees {
      Some(employees) => std::iter::once(Employee::empty())
        .chain(employees.iter().cloned())
        .collect(),
      None => Vec::new(),
    };
    self.current = self
      .options
      .iter()
      .position(|e| e.id == selected_id)
      .unwrap_or(0);
  }

  pub fn current(&self) -> Option<&Employee> {
    self.options.get(self.current)
  }

  /// Label of the applied choice
  pub fn label(&self) -> String {
    self
      .current()
      .map(Employee::full_name)
      .unwrap_or_else(|| Employee::empty().full_name())
  }

  /// Open the picker. Nothing happens without options.
  pub fn show(&mut self) {
    if self.options.is_empty() {
      return;
    }
    self.active = true;
    self.cursor = self.current;
  }

  pub fn hide(&mut self) {
    self.active = false;
  }

  /// Handle a key event
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<EmployeeFilterEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => {
        self.hide();
        KeyResult::Event(EmployeeFilterEvent::Cancelled)
      }
      KeyCode::Enter => {
        self.hide();
        match self.options.get(self.cursor) {
          Some(employee) => {
            self.current = self.cursor;
            KeyResult::Event(EmployeeFilterEvent::Selected(employee.id.clone()))
          }
          None => KeyResult::Event(EmployeeFilterEvent::Cancelled),
        }
      }
      KeyCode::Char('j') | KeyCode::Down => {
        if !self.options.is_empty() {
          self.cursor = (self.cursor + 1) % self.options.len();
        }
        KeyResult::Handled
      }
      KeyCode::Char('k') | KeyCode::Up => {
        if !self.options.is_empty() {
          self.cursor = if self.cursor == 0 {
            self.options.len() - 1
          } else {
            self.cursor - 1
          };
        }
        KeyResult::Handled
      }
      _ => KeyResult::Handled,
    }
  }

  /// Render the picker overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active || self.options.is_empty() {
      return;
    }

    let max_name_len = self
      .options
      .iter()
      .map(|e| e.full_name().len())
      .max()
      .unwrap_or(10);
    let width = (max_name_len as u16 + 6)
      .min(area.width.saturating_sub(4))
      .max(20);
    let height = (self.options.len() as u16 + 2)
      .min(area.height.saturating_sub(4))
      .max(3);

    // Center the overlay
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay_area = Rect::new(x, y, width, height).intersection(area);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Filter by employee ");

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let items: Vec<ListItem> = self
      .options
      .iter()
      .map(|employee| {
        let style = if employee.is_empty_employee() {
          Style::default().fg(Color::DarkGray)
        } else {
          Style::default().fg(Color::Cyan)
        };
        ListItem::new(Line::from(Span::styled(employee.full_name(), style)))
      })
      .collect();

    let list =
      List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    state.select(Some(self.cursor));

    frame.render_stateful_widget(list, inner, &mut state);
  }
}
