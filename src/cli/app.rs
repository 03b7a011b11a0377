use super::ui;
use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use healthtrack::{Database, QueryOutcome};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use std::io;
use tui_textarea::TextArea;

/// Canned statements from the query tool's sidebar.
pub struct ExampleQuery {
    pub name: &'static str,
    pub sql: &'static str,
}

fn example_queries() -> Vec<ExampleQuery> {
    vec![
        ExampleQuery {
            name: "List all patients",
            sql: "SELECT * FROM patients",
        },
        ExampleQuery {
            name: "Count patients by gender",
            sql: "SELECT gender, COUNT(*) AS count FROM patients GROUP BY gender",
        },
        ExampleQuery {
            name: "Patients with insurance",
            sql: "SELECT first_name, last_name, insurance_provider FROM patients \
                  WHERE insurance_provider IS NOT NULL",
        },
        ExampleQuery {
            name: "Recently added",
            sql: "SELECT * FROM patients ORDER BY created_at DESC LIMIT 5",
        },
    ]
}

pub struct App<'a> {
    pub textarea: TextArea<'a>,
    pub messages: Vec<Line<'static>>,
    pub db: Database,
    pub exit: bool,

    // Example-query popup state
    pub examples: Vec<ExampleQuery>,
    pub example_index: usize,
    pub popup_open: bool,

    // Kept for the JSON dump (Ctrl+J)
    pub last_outcome: Option<QueryOutcome>,
}

impl<'a> App<'a> {
    pub fn new(db: Database) -> Self {
        let textarea = Self::new_textarea();

        Self {
            textarea,
            messages: vec![
                Line::from(vec![Span::styled(
                    "Welcome to the HealthTrack SQL console!",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )]),
                Line::from(
                    "Ctrl+E executes, Tab lists example queries, Ctrl+J dumps the last result as JSON.",
                ),
                Line::from("--------------------------------------------------"),
            ],
            db,
            exit: false,
            examples: example_queries(),
            example_index: 0,
            popup_open: false,
            last_outcome: None,
        }
    }

    fn new_textarea() -> TextArea<'static> {
        let mut textarea = TextArea::default();
        textarea.set_placeholder_text(
            "Enter SQL (Press 'Ctrl+E' to execute, 'Tab' for examples, 'Esc' to quit)",
        );
        textarea.set_block(
            ratatui::widgets::Block::default()
                .borders(ratatui::widgets::Borders::ALL)
                .title(" SQL Input "),
        );
        textarea
    }

    fn reset_textarea(&mut self) {
        self.textarea = Self::new_textarea();
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.run_loop(&mut terminal).await;

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        if let Err(err) = res {
            println!("{:?}", err);
        }

        Ok(())
    }

    async fn run_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| ui::draw(f, self))?;

            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    // Navigation inside the examples popup
                    if self.popup_open {
                        match key.code {
                            KeyCode::Down => {
                                self.example_index = (self.example_index + 1) % self.examples.len();
                                continue;
                            }
                            KeyCode::Up => {
                                self.example_index = (self.example_index + self.examples.len() - 1)
                                    % self.examples.len();
                                continue;
                            }
                            KeyCode::Enter | KeyCode::Tab => {
                                self.accept_example();
                                continue;
                            }
                            KeyCode::Esc => {
                                self.popup_open = false;
                                continue;
                            }
                            _ => {
                                // Anything else falls through to the editor.
                                self.popup_open = false;
                            }
                        }
                    }

                    // Standard editor control
                    match key.code {
                        KeyCode::Esc => {
                            self.exit = true;
                            return Ok(());
                        }
                        KeyCode::Char('e') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            self.execute_input().await;
                        }
                        KeyCode::Char('j') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            self.dump_last_as_json();
                        }
                        KeyCode::Tab => {
                            self.popup_open = true;
                            self.example_index = 0;
                        }
                        _ => {
                            self.textarea.input(key);
                        }
                    }
                }
            }
            if self.exit {
                return Ok(());
            }
        }
    }

    fn accept_example(&mut self) {
        let sql = self.examples[self.example_index].sql;
        self.reset_textarea();
        self.textarea.insert_str(sql);
        self.popup_open = false;
    }

    async fn execute_input(&mut self) {
        let input = self.textarea.lines().join("\n");
        if input.trim().is_empty() {
            return;
        }

        // 1. Log the query
        self.messages.push(Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Yellow)),
            Span::raw(input.clone()),
        ]));

        // 2. Clear input
        self.reset_textarea();

        // 3. Execute and log the outcome. Failures arrive as data, so a bad
        //    statement renders inline and the console keeps going.
        let outcome = self.db.execute_query(&input, Vec::new()).await;
        if outcome.success {
            if outcome.rows.is_empty() {
                self.messages.push(Line::from(Span::styled(
                    "OK.",
                    Style::default().fg(Color::Green),
                )));
            } else {
                self.messages.push(Line::from(Span::styled(
                    format!("Success. {} row(s) found:", outcome.rows.row_count()),
                    Style::default().fg(Color::Green),
                )));
                for line in outcome.rows.format_table() {
                    self.messages.push(Line::raw(line));
                }
            }
        } else {
            self.messages.push(Line::from(Span::styled(
                format!("Error: {}", outcome.error.as_deref().unwrap_or("unknown")),
                Style::default().fg(Color::Red),
            )));
        }
        self.last_outcome = Some(outcome);

        self.messages.push(Line::from(Span::styled(
            "-".repeat(50),
            Style::default().fg(Color::DarkGray),
        )));
    }

    fn dump_last_as_json(&mut self) {
        let Some(outcome) = &self.last_outcome else {
            self.messages.push(Line::from(Span::styled(
                "Nothing to dump yet.",
                Style::default().fg(Color::DarkGray),
            )));
            return;
        };

        match serde_json::to_string_pretty(&outcome.rows) {
            Ok(json) => {
                for line in json.lines() {
                    self.messages.push(Line::raw(line.to_string()));
                }
            }
            Err(err) => {
                self.messages.push(Line::from(Span::styled(
                    format!("JSON error: {}", err),
                    Style::default().fg(Color::Red),
                )));
            }
        }
    }
}
