use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar with title, data source, filter and shortcuts
pub fn draw_header(frame: &mut Frame, area: Rect, title: &str, source: &str, filter: &str) {
  let header = Line::from(vec![
    Span::styled(format!(" {} ", title), Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ", display_source(source)),
      Style::default().fg(Color::White),
    ),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ", filter),
      Style::default().fg(Color::Yellow).bold(),
    ),
    Span::raw("  "),
    // Shortcuts - keys and brackets highlighted, descriptions dimmed
    Span::styled("<f>", Style::default().fg(Color::Cyan)),
    Span::styled(" filter", Style::default().fg(Color::DarkGray)),
    Span::raw("   "),
    Span::styled("<r>", Style::default().fg(Color::Cyan)),
    Span::styled(" refresh", Style::default().fg(Color::DarkGray)),
    Span::raw("   "),
    Span::styled("<q>", Style::default().fg(Color::Cyan)),
    Span::styled(" quit", Style::default().fg(Color::DarkGray)),
  ]);

  let paragraph = Paragraph::new(header).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}

/// Strip the scheme and trailing slash from a backend url
fn display_source(source: &str) -> &str {
  source
    .strip_prefix("https://")
    .or_else(|| source.strip_prefix("http://"))
    .unwrap_or(source)
    .trim_end_matches('/')
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_display_source() {
    assert_eq!(
      display_source("https://api.example.com/v1/"),
      "api.example.com/v1"
    );
    assert_eq!(display_source("http://localhost:8080/"), "localhost:8080");
    assert_eq!(display_source("demo data"), "demo data");
  }
}
