use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame, Terminal,
};
use serde::{Deserialize, Serialize};
use std::io::stdout;

use column_picker::columns::{Align, ColumnDefinition, ColumnVisibility};
use column_picker::config::Config;
use column_picker::storage::FileStore;
use column_picker::utils::logging::{init_tracing, LogRingBuffer};
use column_picker::widgets::{ColumnPickerAction, ColumnPickerWidget};

const STORAGE_KEY: &str = "demo-orders";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum OrderColumn {
    Id,
    Customer,
    Status,
    Region,
    Amount,
    Notes,
    Discount,
    Actions,
}

fn order_columns(with_discount: bool) -> Vec<ColumnDefinition<OrderColumn>> {
    let mut columns = vec![
        ColumnDefinition::new(OrderColumn::Id, "ID")
            .pinned_start()
            .always_visible()
            .width(6),
        ColumnDefinition::new(OrderColumn::Customer, "Customer")
            .sortable()
            .width(16),
        ColumnDefinition::new(OrderColumn::Status, "Status").width(10),
        ColumnDefinition::new(OrderColumn::Region, "Region").width(8),
        ColumnDefinition::new(OrderColumn::Amount, "Amount")
            .align(Align::Right)
            .width(10),
        ColumnDefinition::new(OrderColumn::Notes, "Notes")
            .default_hidden()
            .min_width(12),
    ];
    if with_discount {
        columns.push(
            ColumnDefinition::new(OrderColumn::Discount, "Discount")
                .align(Align::Right)
                .width(9),
        );
    }
    columns.push(
        ColumnDefinition::new(OrderColumn::Actions, "Actions")
            .pinned_end()
            .width(8),
    );
    columns
}

fn cell_text(row: usize, column: OrderColumn) -> String {
    match column {
        OrderColumn::Id => format!("{}", 1000 + row),
        OrderColumn::Customer => {
            ["Acme Ltd", "Globex", "Initech", "Umbrella", "Hooli"][row % 5].to_string()
        }
        OrderColumn::Status => ["open", "shipped", "held"][row % 3].to_string(),
        OrderColumn::Region => ["EMEA", "APAC", "AMER"][row % 3].to_string(),
        OrderColumn::Amount => format!("{:.2}", 125.5 * (row + 1) as f64),
        OrderColumn::Notes => format!("note #{}", row),
        OrderColumn::Discount => format!("{}%", (row * 5) % 25),
        OrderColumn::Actions => "[edit]".to_string(),
    }
}

struct DemoApp {
    columns: ColumnVisibility<OrderColumn, FileStore>,
    picker: ColumnPickerWidget<OrderColumn>,
    with_discount: bool,
    header_area: Rect,
    logs: LogRingBuffer,
}

impl DemoApp {
    fn new(config: &Config, logs: LogRingBuffer) -> Result<Self> {
        let storage = FileStore::from_config(&config.storage)?;
        tracing::info!(target: "demo", "Column layouts stored in {}", storage.directory().display());

        let columns = ColumnVisibility::new(storage, STORAGE_KEY, order_columns(false));
        let mut picker = ColumnPickerWidget::new(config.display.clone());
        picker.sync(&columns);

        Ok(Self {
            columns,
            picker,
            with_discount: false,
            header_area: Rect::default(),
            logs,
        })
    }

    fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if self.picker.is_open() {
                        let action = self.picker.handle_key(key);
                        self.apply(action);
                        continue;
                    }
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('c') => {
                            self.picker.sync(&self.columns);
                            self.picker.open(self.header_area);
                        }
                        KeyCode::Char('f') => self.toggle_discount_column(),
                        _ => {}
                    }
                }
                Event::Mouse(mouse) => {
                    let action = self.picker.handle_mouse(mouse);
                    self.apply(action);
                }
                _ => {}
            }
        }
    }

    fn apply(&mut self, action: ColumnPickerAction<OrderColumn>) {
        if self.columns.apply(&action) {
            self.picker.sync(&self.columns);
        }
    }

    /// Add or remove a column at runtime, as a feature flag would
    fn toggle_discount_column(&mut self) {
        self.with_discount = !self.with_discount;
        self.columns.reconcile(order_columns(self.with_discount));
        self.picker.sync(&self.columns);
        tracing::info!(
            target: "demo",
            "Discount column {}",
            if self.with_discount { "enabled" } else { "disabled" }
        );
    }

    fn draw(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3)])
            .split(f.area());

        self.draw_table(f, chunks[0]);
        self.draw_status(f, chunks[1]);
        self.picker.render(f);
    }

    fn draw_table(&mut self, f: &mut Frame, area: Rect) {
        let visible = self.columns.visible_definitions();

        let widths: Vec<Constraint> = visible
            .iter()
            .map(|def| match (def.width, def.min_width) {
                (Some(width), _) => Constraint::Length(width),
                (None, Some(min)) => Constraint::Min(min),
                (None, None) => Constraint::Fill(1),
            })
            .collect();

        let header = Row::new(
            visible
                .iter()
                .map(|def| Cell::from(def.label.clone()))
                .collect::<Vec<_>>(),
        )
        .style(Style::default().add_modifier(Modifier::BOLD).fg(Color::Yellow));

        let rows: Vec<Row> = (0..20)
            .map(|row| {
                Row::new(
                    visible
                        .iter()
                        .map(|def| {
                            let text = cell_text(row, def.field);
                            let line = match def.align {
                                Align::Left => Line::from(text),
                                Align::Center => Line::from(text).centered(),
                                Align::Right => Line::from(text).right_aligned(),
                            };
                            Cell::from(line)
                        })
                        .collect::<Vec<_>>(),
                )
            })
            .collect();

        let table = Table::new(rows, widths).header(header).block(
            Block::default().borders(Borders::ALL).title(format!(
                " Orders ({} of {} columns) ",
                visible.len(),
                self.columns.ordered_columns().len()
            )),
        );

        // Header row sits just inside the border
        self.header_area = Rect::new(area.x, area.y + 1, area.width.saturating_sub(1), 1);
        f.render_widget(table, area);
    }

    fn draw_status(&self, f: &mut Frame, area: Rect) {
        let latest = self
            .logs
            .latest()
            .map(|entry| entry.format_for_display())
            .unwrap_or_default();
        let help = "c: columns  f: toggle discount column  q: quit";

        let status = Paragraph::new(vec![Line::from(help), Line::from(latest)])
            .block(Block::default().borders(Borders::TOP))
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(status, area);
    }
}

fn main() -> Result<()> {
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: could not load config ({}), using defaults", e);
        Config::default()
    });
    let logs = init_tracing(&config.logging.filter);
    let mut app = DemoApp::new(&config, logs)?;

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let result = app.run(&mut terminal);

    // Cleanup
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor()?;

    result.context("Demo execution failed")
}
