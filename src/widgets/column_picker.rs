use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
    Frame,
};
use std::collections::{HashMap, HashSet};

use crate::columns::{ColumnDefinition, ColumnField, ColumnVisibility, MoveDirection, Pinned};
use crate::config::config::DisplayConfig;
use crate::storage::KeyValueStore;

/// One line of the picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerRow<F> {
    pub field: F,
    pub label: String,
    /// Column is currently shown
    pub checked: bool,
    /// False for always-visible columns
    pub toggle_enabled: bool,
    /// Pinned rows get no move controls
    pub pinned: Pinned,
    pub can_move_up: bool,
    pub can_move_down: bool,
}

/// Build picker rows from the effective order.
///
/// Move controls are disabled at either end of the order and next to a
/// pinned column, matching what `ColumnVisibility::move_column` accepts.
/// Fields without a definition are skipped.
pub fn picker_rows<F: ColumnField>(
    definitions: &[ColumnDefinition<F>],
    effective_order: &[F],
    hidden: &HashSet<F>,
) -> Vec<PickerRow<F>> {
    let mut by_field: HashMap<&F, &ColumnDefinition<F>> = HashMap::with_capacity(definitions.len());
    for def in definitions {
        by_field.entry(&def.field).or_insert(def);
    }
    let is_pinned = |index: usize| {
        effective_order
            .get(index)
            .and_then(|field| by_field.get(field))
            .is_some_and(|def| def.is_pinned())
    };

    effective_order
        .iter()
        .enumerate()
        .filter_map(|(index, field)| {
            let def = by_field.get(field)?;
            let movable = !def.is_pinned();
            Some(PickerRow {
                field: field.clone(),
                label: def.label.clone(),
                checked: !hidden.contains(field),
                toggle_enabled: !def.always_visible,
                pinned: def.pinned,
                can_move_up: movable && index > 0 && !is_pinned(index - 1),
                can_move_down: movable
                    && index + 1 < effective_order.len()
                    && !is_pinned(index + 1),
            })
        })
        .collect()
}

/// Intents emitted by the picker for the host to apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnPickerAction<F> {
    None,
    Close,
    Toggle(F, bool),
    Move(F, MoveDirection),
    Reset,
}

/// Transient picker state, reset every time the picker opens
#[derive(Debug, Clone, Default)]
pub struct ColumnPickerState {
    pub open: bool,

    /// Rect the overlay hangs from (its bottom-right corner)
    pub anchor: Option<Rect>,

    pub selected: usize,
    pub list_state: ListState,

    /// Where the overlay was last drawn, for mouse hit-testing
    pub area: Option<Rect>,
}

/// Blank cells between the label and the move controls
const ROW_GAP: usize = 2;

/// Display widths of the spans making up a picker row, shared by rendering
/// and mouse hit-testing
#[derive(Debug, Clone, Copy)]
struct RowLayout {
    check: usize,
    label: usize,
    up: usize,
    down: usize,
    pinned: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowTarget {
    Toggle,
    Move(MoveDirection),
}

impl RowLayout {
    /// Checkbox, space and the padded label
    fn toggle_end(&self) -> usize {
        self.check + 1 + self.label
    }

    fn controls_start(&self) -> usize {
        self.toggle_end() + ROW_GAP
    }

    fn total(&self) -> usize {
        self.controls_start() + (self.up + 1 + self.down).max(self.pinned)
    }

    /// What a click `x` cells into the row lands on
    fn hit(&self, x: usize, pinned: bool) -> Option<RowTarget> {
        if x < self.toggle_end() {
            return Some(RowTarget::Toggle);
        }
        if pinned {
            return None;
        }
        let up = self.controls_start();
        let down = up + self.up + 1;
        if (up..up + self.up).contains(&x) {
            Some(RowTarget::Move(MoveDirection::Up))
        } else if (down..down + self.down).contains(&x) {
            Some(RowTarget::Move(MoveDirection::Down))
        } else {
            None
        }
    }
}

/// Anchored overlay listing every column with visibility and order controls
pub struct ColumnPickerWidget<F> {
    state: ColumnPickerState,
    rows: Vec<PickerRow<F>>,
    display: DisplayConfig,
}

impl<F: ColumnField> ColumnPickerWidget<F> {
    pub fn new(display: DisplayConfig) -> Self {
        Self {
            state: ColumnPickerState::default(),
            rows: Vec::new(),
            display,
        }
    }

    pub fn open(&mut self, anchor: Rect) {
        self.state = ColumnPickerState {
            open: true,
            anchor: Some(anchor),
            ..ColumnPickerState::default()
        };
        tracing::debug!(target: "picker", "Opened at {:?}", anchor);
    }

    pub fn close(&mut self) {
        self.state.open = false;
        self.state.anchor = None;
        self.state.area = None;
        tracing::debug!(target: "picker", "Closed");
    }

    pub fn is_open(&self) -> bool {
        self.state.open
    }

    pub fn anchor(&self) -> Option<Rect> {
        self.state.anchor
    }

    pub fn state(&self) -> &ColumnPickerState {
        &self.state
    }

    pub fn rows(&self) -> &[PickerRow<F>] {
        &self.rows
    }

    pub fn selected_row(&self) -> Option<&PickerRow<F>> {
        self.rows.get(self.state.selected)
    }

    pub fn set_rows(&mut self, rows: Vec<PickerRow<F>>) {
        self.rows = rows;
        self.state.selected = self.state.selected.min(self.rows.len().saturating_sub(1));
    }

    /// Refresh rows from the store's current layout
    pub fn sync<S: KeyValueStore>(&mut self, columns: &ColumnVisibility<F, S>) {
        self.set_rows(picker_rows(
            columns.definitions(),
            columns.ordered_columns(),
            columns.hidden_columns(),
        ));
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ColumnPickerAction<F> {
        if !self.state.open {
            return ColumnPickerAction::None;
        }

        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.close();
                ColumnPickerAction::Close
            }
            KeyCode::Up if shift => self.move_selected(MoveDirection::Up),
            KeyCode::Down if shift => self.move_selected(MoveDirection::Down),
            KeyCode::Char('K') => self.move_selected(MoveDirection::Up),
            KeyCode::Char('J') => self.move_selected(MoveDirection::Down),
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.selected = self.state.selected.saturating_sub(1);
                ColumnPickerAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.state.selected + 1 < self.rows.len() {
                    self.state.selected += 1;
                }
                ColumnPickerAction::None
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.state.selected = 0;
                ColumnPickerAction::None
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.state.selected = self.rows.len().saturating_sub(1);
                ColumnPickerAction::None
            }
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_row(self.state.selected),
            KeyCode::Char('r') => ColumnPickerAction::Reset,
            _ => ColumnPickerAction::None,
        }
    }

    /// Handle mouse input: clicking outside dismisses, clicking a checkbox
    /// or label toggles the row, clicking an arrow moves it
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> ColumnPickerAction<F> {
        if !self.state.open {
            return ColumnPickerAction::None;
        }
        let MouseEventKind::Down(MouseButton::Left) = mouse.kind else {
            return ColumnPickerAction::None;
        };

        // Not drawn yet, so nothing can be inside it
        let inside = self.state.area.filter(|area| {
            mouse.column >= area.x
                && mouse.column < area.right()
                && mouse.row >= area.y
                && mouse.row < area.bottom()
        });
        let Some(area) = inside else {
            self.close();
            return ColumnPickerAction::Close;
        };

        // Skip the borders
        if mouse.row == area.y
            || mouse.row + 1 >= area.bottom()
            || mouse.column == area.x
            || mouse.column + 1 >= area.right()
        {
            return ColumnPickerAction::None;
        }
        let index = usize::from(mouse.row - area.y - 1) + self.state.list_state.offset();
        let Some(row) = self.rows.get(index) else {
            return ColumnPickerAction::None;
        };
        let pinned = row.pinned.is_pinned();

        self.state.selected = index;
        let x = usize::from(mouse.column - area.x - 1);
        match self.layout().hit(x, pinned) {
            Some(RowTarget::Toggle) => self.toggle_row(index),
            Some(RowTarget::Move(direction)) => self.move_selected(direction),
            None => ColumnPickerAction::None,
        }
    }

    fn toggle_row(&self, index: usize) -> ColumnPickerAction<F> {
        match self.rows.get(index) {
            Some(row) if row.toggle_enabled => {
                ColumnPickerAction::Toggle(row.field.clone(), !row.checked)
            }
            _ => ColumnPickerAction::None,
        }
    }

    fn move_selected(&mut self, direction: MoveDirection) -> ColumnPickerAction<F> {
        let Some(row) = self.rows.get(self.state.selected) else {
            return ColumnPickerAction::None;
        };

        let allowed = match direction {
            MoveDirection::Up => row.can_move_up,
            MoveDirection::Down => row.can_move_down,
        };
        if !allowed {
            return ColumnPickerAction::None;
        }

        let field = row.field.clone();
        // Keep the cursor on the column being moved
        match direction {
            MoveDirection::Up => self.state.selected -= 1,
            MoveDirection::Down => self.state.selected += 1,
        }
        ColumnPickerAction::Move(field, direction)
    }

    fn layout(&self) -> RowLayout {
        let icons = &self.display.icons;
        let width = |text: &str| Span::raw(text).width();
        RowLayout {
            check: width(icons.checked.as_str()).max(width(icons.unchecked.as_str())),
            label: self
                .rows
                .iter()
                .map(|row| width(row.label.as_str()))
                .max()
                .unwrap_or(0),
            up: width(icons.up.as_str()),
            down: width(icons.down.as_str()),
            pinned: width(icons.pinned.as_str()),
        }
    }

    /// Where the overlay goes: top-right corner under the anchor's
    /// bottom-right corner, kept inside `frame`. Centered without an anchor.
    pub fn popup_area(&self, frame: Rect) -> Rect {
        let content = u16::try_from(self.layout().total()).unwrap_or(u16::MAX);
        let wanted_width = content.saturating_add(4).max(self.display.min_width);
        let width = wanted_width.min(frame.width);
        let rows = u16::try_from(self.rows.len()).unwrap_or(u16::MAX);
        let wanted_height = rows.saturating_add(2).min(self.display.max_height.max(3));
        let height = wanted_height.min(frame.height);

        let (x, y) = match self.state.anchor {
            Some(anchor) => {
                let x = anchor.right().saturating_sub(width);
                let y = if anchor.bottom().saturating_add(height) <= frame.bottom() {
                    anchor.bottom()
                } else {
                    frame.bottom().saturating_sub(height)
                };
                (x, y)
            }
            None => (
                frame.x + (frame.width - width) / 2,
                frame.y + (frame.height - height) / 2,
            ),
        };

        let x = x.clamp(frame.x, frame.right().saturating_sub(width).max(frame.x));
        let y = y.clamp(frame.y, frame.bottom().saturating_sub(height).max(frame.y));
        Rect::new(x, y, width, height)
    }

    fn row_line(&self, row: &PickerRow<F>, layout: &RowLayout) -> Line<'static> {
        let icons = &self.display.icons;
        let enabled = Style::default();
        let disabled = Style::default().fg(Color::DarkGray);

        let check = if row.checked {
            &icons.checked
        } else {
            &icons.unchecked
        };
        let label_style = if row.checked { enabled } else { disabled };

        let check_span = Span::styled(
            check.clone(),
            if row.toggle_enabled { enabled } else { disabled },
        );
        let label_span = Span::styled(row.label.clone(), label_style);
        let check_pad = layout.check.saturating_sub(check_span.width());
        let label_pad = layout.label.saturating_sub(label_span.width());

        let mut spans = vec![
            check_span,
            Span::raw(" ".repeat(check_pad + 1)),
            label_span,
            Span::raw(" ".repeat(label_pad + ROW_GAP)),
        ];

        if row.pinned.is_pinned() {
            spans.push(Span::styled(icons.pinned.clone(), disabled));
        } else {
            spans.push(Span::styled(
                icons.up.clone(),
                if row.can_move_up { enabled } else { disabled },
            ));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                icons.down.clone(),
                if row.can_move_down { enabled } else { disabled },
            ));
        }

        Line::from(spans)
    }

    pub fn render(&mut self, f: &mut Frame) {
        if !self.state.open {
            return;
        }

        let area = self.popup_area(f.area());
        self.state.area = Some(area);

        let layout = self.layout();
        let items: Vec<ListItem> = self
            .rows
            .iter()
            .map(|row| ListItem::new(self.row_line(row, &layout)))
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Columns ")
            .title_bottom(Line::from(format!(
                " {} r reset · esc close ",
                self.display.icons.reset
            )))
            .border_style(Style::default().fg(Color::Cyan));

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        self.state.list_state.select(if self.rows.is_empty() {
            None
        } else {
            Some(self.state.selected)
        });

        f.render_widget(Clear, area);
        f.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn defs() -> Vec<ColumnDefinition<&'static str>> {
        vec![
            ColumnDefinition::new("a", "Alpha").pinned_start().always_visible(),
            ColumnDefinition::new("b", "Bravo"),
            ColumnDefinition::new("c", "Charlie"),
            ColumnDefinition::new("d", "Delta").pinned_end(),
        ]
    }

    fn widget() -> ColumnPickerWidget<&'static str> {
        let mut widget = ColumnPickerWidget::new(DisplayConfig::default());
        widget.set_rows(picker_rows(
            &defs(),
            &["a", "b", "c", "d"],
            &HashSet::from(["c"]),
        ));
        widget.open(Rect::new(0, 0, 60, 1));
        widget
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_rows_disable_moves_into_pinned_zones() {
        let rows = picker_rows(&defs(), &["a", "b", "c", "d"], &HashSet::from(["c"]));

        assert_eq!(rows.len(), 4);
        assert!(!rows[0].toggle_enabled);
        assert!(!rows[0].can_move_up && !rows[0].can_move_down);
        assert!(!rows[1].can_move_up);
        assert!(rows[1].can_move_down);
        assert!(rows[2].can_move_up);
        assert!(!rows[2].can_move_down);
        assert!(!rows[2].checked);
        assert_eq!(rows[3].pinned, Pinned::End);
    }

    #[test]
    fn test_rows_skip_unknown_fields() {
        let rows = picker_rows(&defs(), &["a", "ghost", "b"], &HashSet::new());
        let fields: Vec<&str> = rows.iter().map(|row| row.field).collect();
        assert_eq!(fields, vec!["a", "b"]);
    }

    #[test]
    fn test_keys_produce_intents() {
        let mut picker = widget();

        // Always-visible row cannot be toggled
        assert_eq!(picker.handle_key(key(KeyCode::Char(' '))), ColumnPickerAction::None);

        picker.handle_key(key(KeyCode::Down));
        assert_eq!(picker.selected_row().map(|row| row.field), Some("b"));
        assert_eq!(
            picker.handle_key(key(KeyCode::Char(' '))),
            ColumnPickerAction::Toggle("b", false)
        );
        assert_eq!(
            picker.handle_key(key(KeyCode::Char('K'))),
            ColumnPickerAction::None
        );
        assert_eq!(
            picker.handle_key(KeyEvent::new(KeyCode::Down, KeyModifiers::SHIFT)),
            ColumnPickerAction::Move("b", MoveDirection::Down)
        );
        assert_eq!(picker.state().selected, 2);
        assert_eq!(picker.handle_key(key(KeyCode::Char('r'))), ColumnPickerAction::Reset);
    }

    #[test]
    fn test_escape_closes() {
        let mut picker = widget();
        assert_eq!(picker.handle_key(key(KeyCode::Esc)), ColumnPickerAction::Close);
        assert!(!picker.is_open());
        assert_eq!(picker.handle_key(key(KeyCode::Char(' '))), ColumnPickerAction::None);
    }

    #[test]
    fn test_open_resets_selection() {
        let mut picker = widget();
        picker.handle_key(key(KeyCode::End));
        assert_eq!(picker.state().selected, 3);

        picker.open(Rect::new(0, 0, 10, 1));
        assert_eq!(picker.state().selected, 0);
    }

    #[test]
    fn test_popup_hangs_below_anchor() {
        let picker = widget();
        let area = picker.popup_area(Rect::new(0, 0, 80, 24));

        assert_eq!(area.y, 1);
        assert_eq!(area.right(), 60);
        assert_eq!(area.height, 6);
    }

    #[test]
    fn test_popup_stays_inside_frame() {
        let mut picker = widget();
        picker.open(Rect::new(70, 20, 5, 1));
        let frame = Rect::new(0, 0, 30, 10);
        let area = picker.popup_area(frame);

        assert!(area.right() <= frame.right());
        assert!(area.bottom() <= frame.bottom());
    }

    #[test]
    fn test_render_and_click() {
        let mut picker = widget();
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal.draw(|f| picker.render(f)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|line| line.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n");
        assert!(text.contains("Columns"));
        assert!(text.contains("Charlie"));

        let area = picker.state().area.unwrap();
        let click = |column, row| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };

        // Third list row is "c", currently hidden
        assert_eq!(
            picker.handle_mouse(click(area.x + 2, area.y + 3)),
            ColumnPickerAction::Toggle("c", true)
        );
        assert_eq!(
            picker.handle_mouse(click(area.right() + 1, area.y)),
            ColumnPickerAction::Close
        );
        assert!(!picker.is_open());
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn draw(picker: &mut ColumnPickerWidget<&'static str>) -> ratatui::buffer::Buffer {
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal.draw(|f| picker.render(f)).unwrap();
        terminal.backend().buffer().clone()
    }

    /// Column of the first cell on line `y` showing `symbol`
    fn find_symbol(buffer: &ratatui::buffer::Buffer, y: u16, symbol: &str) -> u16 {
        (0..buffer.area.width)
            .find(|&x| buffer[(x, y)].symbol() == symbol)
            .unwrap_or_else(|| panic!("{symbol} not drawn on line {y}"))
    }

    #[test]
    fn test_click_on_arrows_moves() {
        let mut picker = widget();
        let buffer = draw(&mut picker);
        let area = picker.state().area.unwrap();
        let (bravo, charlie) = (area.y + 2, area.y + 3);

        let up = find_symbol(&buffer, charlie, "↑");
        assert_eq!(
            picker.handle_mouse(click(up, charlie)),
            ColumnPickerAction::Move("c", MoveDirection::Up)
        );
        assert_eq!(picker.state().selected, 1);

        // Bravo sits under a pinned column
        let up = find_symbol(&buffer, bravo, "↑");
        assert_eq!(picker.handle_mouse(click(up, bravo)), ColumnPickerAction::None);
        let down = find_symbol(&buffer, bravo, "↓");
        assert_eq!(
            picker.handle_mouse(click(down, bravo)),
            ColumnPickerAction::Move("b", MoveDirection::Down)
        );
        assert!(picker.is_open());
    }

    #[test]
    fn test_click_on_pin_or_gap_does_nothing() {
        let mut picker = widget();
        let buffer = draw(&mut picker);
        let area = picker.state().area.unwrap();
        let (charlie, delta) = (area.y + 3, area.y + 4);

        let pin = find_symbol(&buffer, delta, "📌");
        assert_eq!(picker.handle_mouse(click(pin, delta)), ColumnPickerAction::None);

        // Between the label and the arrows
        let up = find_symbol(&buffer, charlie, "↑");
        assert_eq!(picker.handle_mouse(click(up - 1, charlie)), ColumnPickerAction::None);

        // Label toggles
        let label = find_symbol(&buffer, delta, "D");
        assert_eq!(
            picker.handle_mouse(click(label, delta)),
            ColumnPickerAction::Toggle("d", false)
        );
    }

    #[test]
    fn test_outside_click_before_first_render_closes() {
        let mut picker = widget();
        assert!(picker.state().area.is_none());

        assert_eq!(picker.handle_mouse(click(79, 11)), ColumnPickerAction::Close);
        assert!(!picker.is_open());
    }

    #[test]
    fn test_wide_labels_keep_arrows_aligned() {
        let defs = vec![
            ColumnDefinition::new("a", "Name"),
            ColumnDefinition::new("b", "名前"),
            ColumnDefinition::new("c", "Notes 📝"),
        ];
        let mut picker = ColumnPickerWidget::new(DisplayConfig::default());
        picker.set_rows(picker_rows(&defs, &["a", "b", "c"], &HashSet::new()));
        picker.open(Rect::new(0, 0, 60, 1));
        let buffer = draw(&mut picker);
        let area = picker.state().area.unwrap();

        let columns: Vec<u16> = (1..=3)
            .map(|line| find_symbol(&buffer, area.y + line, "↓"))
            .collect();
        assert_eq!(columns, vec![columns[0]; 3]);

        let down = columns[1];
        assert_eq!(
            picker.handle_mouse(click(down, area.y + 2)),
            ColumnPickerAction::Move("b", MoveDirection::Down)
        );
    }

    #[test]
    fn test_popup_size_saturates() {
        let mut picker = ColumnPickerWidget::new(DisplayConfig::default());
        let long = "x".repeat(usize::from(u16::MAX) + 10);
        let defs = vec![ColumnDefinition::new("a", long.as_str())];
        picker.set_rows(picker_rows(&defs, &["a"], &HashSet::new()));
        picker.open(Rect::new(0, 0, 10, 1));

        let frame = Rect::new(0, 0, 80, 24);
        let area = picker.popup_area(frame);
        assert_eq!(area.width, frame.width);
    }
}
