//! Ratatui-based terminal UI.
//!
//! A sortable, filterable comparison table with demand tabs, and a detail
//! pane for the selected GPU (earnings projections plus a rate chart).

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs},
};

use crate::app::pipeline::{self, CompareOutput};
use crate::config::Config;
use crate::domain::{DemandTier, MergedDevice};
use crate::error::AppError;
use crate::view::{
    DemandFilter, HOURS_PER_DAY, RecordFilter, SortColumn, SortState, estimate_earnings, filter_records, format_band,
    format_band_counted, format_price, format_range, format_rate, format_rate_range,
};

mod plotters_chart;

use plotters_chart::{RatePlottersChart, RateSeries};

/// Start the TUI. With `debug`, a match bundle is written after every fetch.
pub fn run(config: Config, debug: bool) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::upstream(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, debug);
    app.refresh();
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::upstream(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::upstream(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: Config,
    debug: bool,
    run: Option<CompareOutput>,
    sort: SortState,
    filter: RecordFilter,
    editing_filter: bool,
    /// Current view of `run.merged` (filtered, then sorted).
    rows: Vec<MergedDevice>,
    table_state: TableState,
    status: String,
}

impl App {
    fn new(config: Config, debug: bool) -> Self {
        Self {
            config,
            debug,
            run: None,
            sort: SortState::default(),
            filter: RecordFilter::default(),
            editing_filter: false,
            rows: Vec::new(),
            table_state: TableState::default(),
            status: "Fetching GPU data...".to_string(),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::upstream(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::upstream(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::upstream(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_filter {
            self.handle_filter_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Char('/') => {
                self.editing_filter = true;
                self.status = "Filter: type to search, Enter/Esc to finish.".to_string();
            }
            KeyCode::Tab => {
                self.filter.demand = self.filter.demand.next();
                self.rebuild_rows();
                self.status = format!("demand: {}", self.filter.demand.display_name());
            }
            KeyCode::Char('s') => self.sort_by(self.sort.column.next()),
            KeyCode::Char('S') => self.sort_by(self.sort.column.prev()),
            KeyCode::Enter | KeyCode::Char('t') => self.sort_by(self.sort.column),
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('d') => self.write_debug_bundle(),
            _ => {}
        }
        false
    }

    fn handle_filter_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc | KeyCode::Enter => {
                self.editing_filter = false;
                self.status = format!("{} of {} GPUs shown.", self.rows.len(), self.total_rows());
            }
            KeyCode::Backspace => {
                self.filter.text.pop();
                self.rebuild_rows();
            }
            KeyCode::Char(c) => {
                self.filter.text.push(c);
                self.rebuild_rows();
            }
            _ => {}
        }
    }

    /// Header-click semantics: same column flips, a new column starts descending.
    fn sort_by(&mut self, column: SortColumn) {
        self.sort = self.sort.toggle(column);
        self.rebuild_rows();
        self.status = format!(
            "sort: {} {}",
            self.sort.column.display_name(),
            self.sort.direction.arrow()
        );
    }

    fn move_selection(&mut self, delta: isize) {
        if self.rows.is_empty() {
            self.table_state.select(None);
            return;
        }
        let last = self.rows.len() - 1;
        let current = self.table_state.selected().unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(last);
        self.table_state.select(Some(next));
    }

    fn refresh(&mut self) {
        match pipeline::run_compare(&self.config) {
            Ok(run) => {
                let degraded: Vec<&str> = [&run.snapshot.salad, &run.snapshot.vast]
                    .into_iter()
                    .filter(|r| r.is_degraded())
                    .map(|r| r.kind.display_name())
                    .collect();
                self.status = if degraded.is_empty() {
                    format!("Loaded {} GPUs.", run.merged.len())
                } else {
                    format!("Loaded {} GPUs; unavailable: {}.", run.merged.len(), degraded.join(", "))
                };
                self.run = Some(run);
                self.rebuild_rows();
                if self.debug {
                    self.write_debug_bundle();
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "refresh failed");
                self.status = format!("Fetch failed: {err}");
            }
        }
    }

    fn write_debug_bundle(&mut self) {
        let Some(run) = &self.run else {
            self.status = "No data loaded yet.".to_string();
            return;
        };
        self.status = match crate::debug::write_match_bundle(&run.snapshot, &run.diagnostics) {
            Ok(path) => format!("Wrote debug bundle: {}", path.display()),
            Err(err) => format!("Debug write failed: {err}"),
        };
    }

    fn rebuild_rows(&mut self) {
        let merged = self.run.as_ref().map(|r| r.merged.as_slice()).unwrap_or_default();
        let filter = &self.filter;
        self.rows = self.sort.apply(&filter_records(merged, |d| filter.matches(d)));

        let selected = match self.table_state.selected() {
            _ if self.rows.is_empty() => None,
            Some(i) => Some(i.min(self.rows.len() - 1)),
            None => Some(0),
        };
        self.table_state.select(selected);
    }

    fn total_rows(&self) -> usize {
        self.run.as_ref().map(|r| r.merged.len()).unwrap_or(0)
    }

    fn selected_device(&self) -> Option<&MergedDevice> {
        self.table_state.selected().and_then(|i| self.rows.get(i))
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_tabs(frame, chunks[1]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(chunks[2]);
        self.draw_table(frame, body[0]);
        self.draw_detail(frame, body[1]);

        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("gpuc", Style::default().fg(Color::Cyan)),
            Span::raw(" GPU earnings vs rental prices"),
        ]));

        if let Some(run) = &self.run {
            let sources = [&run.snapshot.salad, &run.snapshot.vast]
                .iter()
                .map(|r| format!("{}: {} ({})", r.kind.display_name(), r.status_label(), r.records))
                .collect::<Vec<_>>()
                .join(" | ");
            lines.push(Line::from(Span::styled(
                format!(
                    "{sources} | matched {}/{} | fetched {}",
                    run.diagnostics.matched,
                    run.diagnostics.primary_total,
                    run.snapshot.fetched_at.format("%H:%M:%S UTC"),
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let titles = DemandFilter::ALL.iter().map(|f| f.display_name()).collect::<Vec<_>>();
        let selected = DemandFilter::ALL
            .iter()
            .position(|f| *f == self.filter.demand)
            .unwrap_or(0);

        let filter_label = if self.editing_filter {
            format!(" filter: {}_ ", self.filter.text)
        } else if self.filter.text.is_empty() {
            " / to filter ".to_string()
        } else {
            format!(" filter: {} ", self.filter.text)
        };

        let tabs = Tabs::new(titles)
            .select(selected)
            .block(Block::default().borders(Borders::ALL).title(filter_label))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White));
        frame.render_widget(tabs, area);
    }

    fn draw_table(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let header_cells = [
            SortColumn::Name,
            SortColumn::Ram,
            SortColumn::Demand,
            SortColumn::HourlyRate,
            SortColumn::DailyRate,
            SortColumn::VastUnverified,
            SortColumn::VastVerified,
        ]
        .into_iter()
        .map(|column| {
            let label = column.display_name();
            if column == self.sort.column {
                Cell::from(format!("{label} {}", self.sort.direction.arrow()))
                    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            } else {
                Cell::from(label)
            }
        });
        let header = Row::new(header_cells).style(Style::default().add_modifier(Modifier::BOLD));

        let rows = self.rows.iter().map(|d| {
            let avg = d.earning_rates_primary.avg_earning_rate;
            let secondary = &d.earning_rates_secondary;
            Row::new(vec![
                Cell::from(d.display_name.clone()),
                Cell::from(
                    d.recommended_specs
                        .ram_gb
                        .map(|v| format!("{v:.0}GB"))
                        .unwrap_or_else(|| "-".to_string()),
                ),
                Cell::from(d.demand().display_name()).style(demand_style(d)),
                Cell::from(format_rate(avg)),
                Cell::from(format_price(avg.map(|v| v * HOURS_PER_DAY))),
                Cell::from(format_band(secondary.unverified.as_ref())),
                Cell::from(format_band(secondary.verified.as_ref())),
            ])
        });

        let widths = [
            Constraint::Min(14),
            Constraint::Length(7),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(15),
            Constraint::Length(15),
        ];

        let title = format!("GPUs ({}/{})", self.rows.len(), self.total_rows());
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().title(title).borders(Borders::ALL))
            .row_highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn draw_detail(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Details").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(device) = self.selected_device() else {
            let msg = if self.run.is_none() { "Waiting for data..." } else { "No GPU selected." };
            frame.render_widget(Paragraph::new(msg).style(Style::default().fg(Color::Yellow)), inner);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(12), Constraint::Min(0)])
            .split(inner);

        frame.render_widget(Paragraph::new(Text::from(detail_lines(device))), chunks[0]);

        let series = RateSeries::for_device(device);
        if series.is_empty() {
            frame.render_widget(
                Paragraph::new("No rate data.").style(Style::default().fg(Color::Gray)),
                chunks[1],
            );
            return;
        }
        let widget = RatePlottersChart {
            series: &series,
            y_label: "USD/hr",
        };
        frame.render_widget(widget, chunks[1]);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  s/S sort column  Enter flip  Tab demand  / filter  r refresh  d debug  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn detail_lines(device: &MergedDevice) -> Vec<Line<'static>> {
    let est = estimate_earnings(device);
    let secondary = &device.earning_rates_secondary;
    let label = Style::default().fg(Color::Gray);

    let mut lines = vec![
        Line::from(Span::styled(
            device.display_name.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(device.name.clone(), label)),
    ];
    if !device.variant_names.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("variants: {}", device.variant_names.join(", ")),
            label,
        )));
    }
    let demand = match device.utilization_pct {
        Some(pct) => format!("{pct:.0}% ({})", device.demand().display_name()),
        None => device.demand().display_name().to_string(),
    };
    lines.push(Line::from(vec![Span::styled("demand  ", label), Span::raw(demand)]));
    lines.push(Line::from(vec![
        Span::styled("hourly  ", label),
        Span::raw(format!("{} avg, {}", format_rate(est.average_hourly), format_rate_range(est.hourly))),
    ]));
    lines.push(Line::from(vec![Span::styled("daily   ", label), Span::raw(format_range(est.daily))]));
    lines.push(Line::from(vec![Span::styled("weekly  ", label), Span::raw(format_range(est.weekly))]));
    lines.push(Line::from(vec![
        Span::styled("top 25% ", label),
        Span::raw(format!("{}/hr, {}/day", format_rate(est.top25_hourly), format_price(est.top25_daily))),
    ]));
    lines.push(Line::from(vec![
        Span::styled("vast unverified  ", label),
        Span::raw(format_band_counted(secondary.unverified.as_ref())),
    ]));
    lines.push(Line::from(vec![
        Span::styled("vast verified    ", label),
        Span::raw(format_band_counted(secondary.verified.as_ref())),
    ]));
    lines
}

fn demand_style(device: &MergedDevice) -> Style {
    match device.demand() {
        DemandTier::High => Style::default().fg(Color::Green),
        DemandTier::Moderate => Style::default().fg(Color::Yellow),
        DemandTier::Low => Style::default().fg(Color::Red),
        DemandTier::Unknown => Style::default().fg(Color::Gray),
    }
}
