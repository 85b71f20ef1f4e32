pub mod components;
mod renderfns;
mod views;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use views::TransactionListProps;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Transaction list
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  let snapshot = app.snapshot();
  let loading = app.loading();

  let filter = if snapshot.employees.is_none() && *loading.employees.borrow() {
    "Loading employees...".to_string()
  } else {
    app.filter().label()
  };
  renderfns::draw_header(frame, chunks[0], app.title(), app.source(), &filter);

  let props = TransactionListProps {
    transactions: snapshot.transactions.as_deref(),
    mode: snapshot.mode,
    selected: app.selected(),
    loading: *loading.all.borrow() || *loading.by_employee.borrow(),
    view_more_visible: snapshot.view_more_visible,
    view_more_loading: *loading.transactions.borrow(),
  };
  views::draw_transactions(frame, chunks[1], &props);

  app.filter().render_overlay(frame, chunks[1]);

  draw_status_bar(frame, chunks[2], app);
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
  let (content, style) = match &app.snapshot().error {
    Some(error) => (format!(" Error: {}", error), Style::default().fg(Color::Red)),
    None if app.loading().any() => (" loading...".to_string(), Style::default().fg(Color::Yellow)),
    None => {
      let hint = " j/k:nav  f:filter  Enter:view more  Space:approve  r:refresh  q:quit";
      (hint.to_string(), Style::default().fg(Color::DarkGray))
    }
  };

  let paragraph = Paragraph::new(content).style(style);
  frame.render_widget(paragraph, area);
}
