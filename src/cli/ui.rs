use super::app::App;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
};

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(1),     // Output area grows
                Constraint::Length(10), // Input area sized for multi-line SQL
            ]
            .as_ref(),
        )
        .split(f.area());

    // Output area: show only the last messages that fit.
    let inner_height = chunks[0].height.saturating_sub(2) as usize; // -2 for borders
    let skip_count = app.messages.len().saturating_sub(inner_height);

    let messages: Vec<ListItem> = app
        .messages
        .iter()
        .skip(skip_count)
        .map(|line| ListItem::new(line.clone()))
        .collect();

    let messages_panel = List::new(messages)
        .block(Block::default().borders(Borders::ALL).title(" Output "))
        .style(Style::default().fg(Color::White));

    f.render_widget(messages_panel, chunks[0]);

    // Input area
    let textarea_rect = chunks[1];
    f.render_widget(&app.textarea, textarea_rect);

    // Example-query popup, anchored above the input pane.
    if app.popup_open && !app.examples.is_empty() {
        let width = 44u16.min(f.area().width);
        let height = (app.examples.len() as u16 + 2).min(f.area().height);

        let area = Rect::new(
            textarea_rect.x + 1,
            textarea_rect.y.saturating_sub(height),
            width,
            height,
        );

        f.render_widget(Clear, area); // Clear underlying text

        let items: Vec<ListItem> = app
            .examples
            .iter()
            .map(|example| ListItem::new(example.name))
            .collect();

        let mut state = ListState::default();
        state.select(Some(app.example_index));

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Example Queries "),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol(">> ");

        f.render_stateful_widget(list, area, &mut state);
    }
}
