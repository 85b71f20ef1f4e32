use ratatui::prelude::Color;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Format an amount as dollars with thousands separators
pub fn format_amount(amount: f64) -> String {
  let cents = (amount.abs() * 100.0).round() as u64;
  let whole = (cents / 100).to_string();

  let mut grouped = String::new();
  for (i, c) in whole.chars().enumerate() {
    if i > 0 && (whole.len() - i) % 3 == 0 {
      grouped.push(',');
    }
    grouped.push(c);
  }

  let sign = if amount < 0.0 { "-" } else { "" };
  format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Get the display color for a transaction's approval state
pub fn approval_color(approved: bool) -> Color {
  if approved {
    Color::Green
  } else {
    Color::White
  }
}
