use anyhow::Result;
use car_catalog::{Catalog, CatalogError, Category, Vehicle, VehicleId};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

/// Percentage taken off the selected vehicle by the discount key
const QUICK_DISCOUNT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Catalog,
    PriceLowToHigh,
    PriceHighToLow,
    Summary,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Catalog => Page::PriceLowToHigh,
            Page::PriceLowToHigh => Page::PriceHighToLow,
            Page::PriceHighToLow => Page::Summary,
            Page::Summary => Page::Catalog,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Catalog => Page::Summary,
            Page::PriceLowToHigh => Page::Catalog,
            Page::PriceHighToLow => Page::PriceLowToHigh,
            Page::Summary => Page::PriceHighToLow,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Catalog => "Catalog",
            Page::PriceLowToHigh => "Price ↑",
            Page::PriceHighToLow => "Price ↓",
            Page::Summary => "Summary",
        }
    }

    fn has_table(&self) -> bool {
        *self != Page::Summary
    }
}

pub struct App {
    pub catalog: Catalog,
    /// Handles shown on the current page, in display order
    pub rows: Vec<VehicleId>,
    pub state: TableState,
    pub current_page: Page,
    pub filter: Option<Category>,
    pub show_detail: bool,
    pub message: Option<String>,
}

impl App {
    pub fn new(catalog: Catalog) -> Self {
        let mut app = Self {
            catalog,
            rows: Vec::new(),
            state: TableState::default(),
            current_page: Page::Catalog,
            filter: None,
            show_detail: false,
            message: None,
        };
        app.refresh();
        app
    }

    /// Re-read the rows for the current page, keeping the cursor in range
    pub fn refresh(&mut self) {
        self.rows = match (self.current_page, self.filter) {
            (Page::Catalog, Some(category)) => self.catalog.category_ids(category).collect(),
            (Page::PriceLowToHigh, _) => self.catalog.ascending_ids().collect(),
            (Page::PriceHighToLow, _) => self.catalog.descending_ids().collect(),
            _ => self.catalog.ids().collect(),
        };

        let selected = match (self.state.selected(), self.rows.len()) {
            (_, 0) => None,
            (Some(i), len) => Some(i.min(len - 1)),
            (None, _) => Some(0),
        };
        self.state.select(selected);
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn selected_id(&self) -> Option<VehicleId> {
        self.state.selected().and_then(|i| self.rows.get(i)).copied()
    }

    pub fn selected_vehicle(&self) -> Option<&Vehicle> {
        self.selected_id().and_then(|id| self.catalog.get(id))
    }

    pub fn apply_filter(&mut self, category: Category) {
        self.filter = Some(category);
        self.current_page = Page::Catalog;
        self.state.select(Some(0));
        self.refresh();
    }

    pub fn clear_filter(&mut self) {
        self.filter = None;
        self.state.select(Some(0));
        self.refresh();
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
        self.refresh();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
        self.refresh();
    }

    pub fn discount_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };

        self.message = Some(match self.catalog.apply_discount_by_id(id, QUICK_DISCOUNT) {
            Ok(()) => {
                let price = self.catalog.get(id).map(Vehicle::price).unwrap_or_default();
                log::info!("discounted {} by {}%", id, QUICK_DISCOUNT);
                format!("Discounted {}% → ${:.2}", QUICK_DISCOUNT, price)
            }
            Err(err) => error_message(err),
        });

        // Price order may have changed; keep the cursor on the same vehicle
        self.refresh();
        if let Some(position) = self.rows.iter().position(|row| *row == id) {
            self.state.select(Some(position));
        }
    }

    pub fn remove_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };

        self.message = Some(match self.catalog.remove_by_id(id) {
            Some(vehicle) => {
                log::info!("removed {} {} ({})", vehicle.make(), vehicle.model(), id);
                format!("Removed {} {}", vehicle.make(), vehicle.model())
            }
            None => error_message(CatalogError::UnknownHandle(id)),
        });
        self.refresh();
    }

    pub fn next(&mut self) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }
        let i = self.state.selected().map_or(0, |i| (i + 20).min(len - 1));
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let i = self.state.selected().map_or(0, |i| i.saturating_sub(20));
        self.state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.rows.is_empty() {
            self.state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.rows.is_empty() {
            self.state.select(Some(self.rows.len() - 1));
        }
    }
}

fn error_message(err: CatalogError) -> String {
    log::warn!("{}", err);
    format!("Error: {}", err)
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let Event::Key(key) = event::read()? else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Enter => app.toggle_detail(),
            KeyCode::BackTab => app.previous_page(),
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    app.previous_page();
                } else {
                    app.next_page();
                }
            }
            KeyCode::Char('1') => app.apply_filter(Category::Sedan),
            KeyCode::Char('2') => app.apply_filter(Category::Suv),
            KeyCode::Char('3') => app.apply_filter(Category::Truck),
            KeyCode::Char('c') => app.clear_filter(),
            KeyCode::Char('-') => app.discount_selected(),
            KeyCode::Char('x') | KeyCode::Delete => app.remove_selected(),
            KeyCode::Down | KeyCode::Char('j') => app.next(),
            KeyCode::Up | KeyCode::Char('k') => app.previous(),
            KeyCode::PageDown => app.page_down(),
            KeyCode::PageUp => app.page_up(),
            KeyCode::Home => app.select_first(),
            KeyCode::End => app.select_last(),
            _ => {}
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.show_detail && app.current_page.has_table() {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        render_table(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else if app.current_page.has_table() {
        render_table(f, chunks[1], app);
    } else {
        render_summary(f, chunks[1], app);
    }

    render_status_bar(f, chunks[2], app);
}

fn category_color(category: Category) -> Color {
    match category {
        Category::Sedan => Color::Cyan,
        Category::Suv => Color::Green,
        Category::Truck => Color::Yellow,
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [
        Page::Catalog,
        Page::PriceLowToHigh,
        Page::PriceHighToLow,
        Page::Summary,
    ];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Total: {}", app.catalog.len()),
        Style::default().fg(Color::White),
    ));
    for category in Category::ALL {
        tab_spans.push(Span::raw("  "));
        tab_spans.push(Span::styled(
            format!("{} {}", category, app.catalog.category_ids(category).count()),
            Style::default().fg(category_color(category)),
        ));
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Year", "Make", "Model", "Type", "Price", "Insurance/yr"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let catalog = &app.catalog;
    let rows = app
        .rows
        .iter()
        .filter_map(|id| catalog.get(*id))
        .map(|vehicle| {
            let color = category_color(vehicle.category());
            let cells = vec![
                Cell::from(vehicle.year().to_string()),
                Cell::from(truncate(vehicle.make(), 18)),
                Cell::from(truncate(vehicle.model(), 24)),
                Cell::from(vehicle.category().as_str()).style(Style::default().fg(color)),
                Cell::from(format!("{:.2}", vehicle.price())),
                Cell::from(format!("{:.2}", vehicle.insurance_estimate())),
            ];
            Row::new(cells).height(1)
        });

    let title = match (app.current_page, app.filter) {
        (Page::Catalog, Some(category)) => format!(" {}s ", category),
        (page, _) => format!(" {} ", page.title()),
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(20),
            Constraint::Length(26),
            Constraint::Length(7),
            Constraint::Length(12),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, app.rows.len()),
        Style::default().fg(Color::Cyan),
    )];

    if let Some(category) = app.filter {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(
            format!("Filter: {}", category),
            Style::default().fg(Color::Green),
        ));
        status_spans.push(Span::raw(" ("));
        status_spans.push(Span::styled("c", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" clear)"));
    }

    if let Some(message) = &app.message {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(message.as_str(), Style::default().fg(Color::Magenta)));
    }

    for (key, action) in [
        ("Enter", "Details"),
        ("Tab", "Page"),
        ("1-3", "Filter"),
        ("-", "Discount"),
        ("x", "Remove"),
    ] {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(key, Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(format!(" {}", action)));
    }
    status_spans.push(Span::raw(" | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

fn render_summary(f: &mut Frame, area: Rect, app: &App) {
    let stats = app.catalog.stats();
    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

    let mut content = vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            "  Catalog Summary",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Vehicles: ", label),
            Span::raw(stats.total.to_string()),
        ]),
    ];

    for (category, count) in &stats.by_category {
        content.push(Line::from(vec![
            Span::raw("    "),
            Span::styled(
                format!("{:<6}", category.as_str()),
                Style::default().fg(category_color(*category)),
            ),
            Span::raw(format!(" {:>5}", count)),
        ]));
    }

    content.extend([
        Line::from(""),
        Line::from(vec![
            Span::styled("  Total value: ", label),
            Span::raw(format!("${:.2}", stats.total_value)),
        ]),
        Line::from(vec![
            Span::styled("  Average price: ", label),
            Span::raw(format!("${:.2}", stats.average_price)),
        ]),
        Line::from(vec![
            Span::styled("  Insurance (all): ", label),
            Span::raw(format!("${:.2}/yr", stats.total_insurance)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Price index height: ", label),
            Span::raw(app.catalog.index_height().to_string()),
        ]),
    ]);

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Summary "),
    );

    f.render_widget(paragraph, area);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Vehicle Details ");

    let Some(vehicle) = app.selected_vehicle() else {
        f.render_widget(Paragraph::new("No vehicle selected").block(block), area);
        return;
    };

    let mut content = vec![Line::from("")];
    for line in vehicle.to_string().lines() {
        let line = match line.split_once(": ") {
            Some((key, value)) => Line::from(vec![
                Span::styled(
                    format!("  {}: ", key),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::raw(value.to_string()),
            ]),
            None => Line::from(Span::styled(
                format!("  {}", line),
                Style::default()
                    .fg(category_color(vehicle.category()))
                    .add_modifier(Modifier::BOLD),
            )),
        };
        content.push(line);
    }

    content.extend([
        Line::from(""),
        Line::from("  ─────────────────────────────────────"),
        Line::from(vec![
            Span::styled("  ID: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::styled(vehicle.id().to_string(), Style::default().fg(Color::Green)),
        ]),
        Line::from(vec![
            Span::styled(
                "  Listed: ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(vehicle.listed_at().format("%Y-%m-%d %H:%M:%S").to_string()),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "  Press Enter to close",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )]),
    ]);

    f.render_widget(Paragraph::new(content).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(Catalog::with_samples().unwrap())
    }

    fn models(app: &App) -> Vec<String> {
        app.rows
            .iter()
            .filter_map(|id| app.catalog.get(*id))
            .map(|v| v.model().to_string())
            .collect()
    }

    #[test]
    fn test_pages_follow_catalog_views() {
        let mut app = app();
        assert_eq!(models(&app), vec!["Camry", "CR-V", "F-150"]);
        assert_eq!(app.state.selected(), Some(0));

        app.next_page();
        assert_eq!(app.current_page, Page::PriceLowToHigh);
        assert_eq!(models(&app), vec!["Camry", "CR-V", "F-150"]);

        app.next_page();
        assert_eq!(models(&app), vec!["F-150", "CR-V", "Camry"]);

        app.previous_page();
        app.previous_page();
        app.previous_page();
        assert_eq!(app.current_page, Page::Summary);
    }

    #[test]
    fn test_filter() {
        let mut app = app();
        app.apply_filter(Category::Truck);
        assert_eq!(models(&app), vec!["F-150"]);

        app.clear_filter();
        assert_eq!(app.rows.len(), 3);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = app();
        app.previous();
        assert_eq!(app.state.selected(), Some(2));
        app.next();
        assert_eq!(app.state.selected(), Some(0));
        app.page_down();
        assert_eq!(app.state.selected(), Some(2));
        app.page_up();
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_discount_keeps_selection_on_vehicle() {
        let mut app = app();
        app.current_page = Page::PriceLowToHigh;
        app.refresh();
        app.state.select(Some(1)); // CR-V at 32000

        for _ in 0..5 {
            app.discount_selected();
        }

        // 32000 * 0.95^5 ≈ 24761 drops below the Camry
        assert_eq!(models(&app), vec!["CR-V", "Camry", "F-150"]);
        assert_eq!(app.selected_vehicle().unwrap().model(), "CR-V");
        assert!(app.catalog.is_consistent());
    }

    #[test]
    fn test_remove_selected() {
        let mut app = app();
        app.select_last();
        app.remove_selected();

        assert_eq!(models(&app), vec!["Camry", "CR-V"]);
        assert_eq!(app.state.selected(), Some(1));
        assert_eq!(app.message.as_deref(), Some("Removed Ford F-150"));

        app.remove_selected();
        app.remove_selected();
        assert!(app.rows.is_empty());
        assert_eq!(app.state.selected(), None);
        app.remove_selected();
        assert!(app.catalog.is_empty());
    }

    #[test]
    fn test_empty_table_keeps_no_selection() {
        let mut app = App::new(Catalog::new());
        assert_eq!(app.state.selected(), None);

        app.page_up();
        app.page_down();
        app.select_first();
        app.select_last();
        app.next();
        app.previous();
        assert_eq!(app.state.selected(), None);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Camry", 10), "Camry");
        assert_eq!(truncate("Grand Cherokee L", 10), "Grand C...");
    }
}
