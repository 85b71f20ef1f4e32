use crate::api::types::Transaction;
use crate::coordinator::Mode;
use crate::ui::renderfns::{approval_color, format_amount, truncate};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// Everything the transaction list needs to render.
pub struct TransactionListProps<'a> {
  /// `None` while nothing has been loaded
  pub transactions: Option<&'a [Transaction]>,
  pub mode: Mode,
  pub selected: usize,
  pub loading: bool,
  pub view_more_visible: bool,
  /// A page fetch is in flight, "view more" is disabled
  pub view_more_loading: bool,
}

pub fn draw_transactions(frame: &mut Frame, area: Rect, props: &TransactionListProps) {
  let label = match props.mode {
    Mode::AllEmployees => "All transactions",
    Mode::ByEmployee => "Employee transactions",
  };
  let title = match props.transactions {
    Some(transactions) if !props.loading => format!(" {} ({}) ", label, transactions.len()),
    _ => format!(" {} (loading...) ", label),
  };

  let mut block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  if props.view_more_visible {
    let (label, style) = if props.view_more_loading {
      (" loading more... ", Style::default().fg(Color::DarkGray))
    } else {
      (" <Enter> view more ", Style::default().fg(Color::Cyan))
    };
    block = block.title_bottom(Line::from(Span::styled(label, style)).right_aligned());
  }

  let transactions = match props.transactions {
    Some(transactions) if !transactions.is_empty() => transactions,
    _ => {
      let content = if props.transactions.is_some() {
        "No transactions."
      } else {
        ""
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }
  };

  let items: Vec<ListItem> = transactions.iter().map(transaction_line).collect();

  let list = List::new(items)
    .block(block)
    .highlight_style(
      Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

  let mut state = ListState::default();
  state.select(Some(props.selected.min(transactions.len() - 1)));

  frame.render_stateful_widget(list, area, &mut state);
}

fn transaction_line(transaction: &Transaction) -> ListItem<'static> {
  let check = if transaction.approved { "[x]" } else { "[ ]" };

  let line = Line::from(vec![
    Span::styled(
      check.to_string(),
      Style::default().fg(approval_color(transaction.approved)),
    ),
    Span::raw(" "),
    Span::styled(
      format!("{:<10}", truncate(&transaction.date, 10)),
      Style::default().fg(Color::DarkGray),
    ),
    Span::raw(" "),
    Span::styled(
      format!("{:<24}", truncate(&transaction.merchant, 24)),
      Style::default().fg(Color::White),
    ),
    Span::raw(" "),
    Span::styled(
      format!("{:>12}", format_amount(transaction.amount)),
      Style::default().fg(Color::Yellow),
    ),
    Span::raw("  "),
    Span::styled(
      truncate(&transaction.employee.full_name(), 24),
      Style::default().fg(Color::Cyan),
    ),
  ]);
  ListItem::new(line)
}
