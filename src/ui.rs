use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::{App, InputMode};
use crate::stats::{bar_width, format_average, summarize};
use crate::theme::type_color;
use crate::types::{capitalize, Pokemon};

// ===============================
// Top-level draw
// ===============================
pub fn draw(f: &mut Frame, app: &mut App) {
    if app.loading() {
        app.tick_spinner();
    }

    let search_expanded = app.input_mode() == InputMode::Search || !app.search_text().is_empty();

    let mut constraints: Vec<Constraint> = Vec::with_capacity(5);
    constraints.push(Constraint::Length(1)); // header
    if search_expanded {
        constraints.push(Constraint::Length(3)); // search input
    }
    constraints.push(Constraint::Length(1)); // type chips
    constraints.push(Constraint::Min(0)); // table
    constraints.push(Constraint::Length(2)); // footer

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    let mut idx = 0usize;
    header(f, chunks[idx], app);
    idx += 1;
    if search_expanded {
        search_bar(f, chunks[idx], app);
        idx += 1;
    }
    type_bar(f, chunks[idx], app);
    idx += 1;
    body(f, chunks[idx], app);
    idx += 1;
    footer(f, chunks[idx], app);

    // Overlays render last
    if app.input_mode() == InputMode::Types {
        draw_type_picker(f, app);
    }
    if let Some(p) = app.selected() {
        draw_details_modal(f, app, p);
    }
    if app.toast_message().is_some() {
        draw_toast_modal(f, app);
    }
}

// ===============================
// Header / Search / Types
// ===============================
fn header(f: &mut Frame, area: Rect, app: &App) {
    let th = app.theme();
    let mut spans = vec![Span::styled(
        " Pokedex Table ",
        Style::default().fg(th.accent).add_modifier(Modifier::BOLD),
    )];
    if app.loading() {
        spans.push(Span::styled(
            format!("{} loading page {}…", app.spinner_char(), app.pagination().page()),
            Style::default().fg(th.dim),
        ));
    } else if let Some(err) = app.last_error() {
        spans.push(Span::styled(
            format!("error: {err} (r to reload)"),
            Style::default().fg(th.bad),
        ));
    }

    let filter = app.filter();
    if !filter.text().is_empty() {
        spans.push(Span::styled(
            format!(" │ name~\"{}\"", filter.text()),
            Style::default().fg(th.dim),
        ));
    }
    if !filter.types().is_empty() {
        let names: Vec<&str> = filter.types().iter().map(String::as_str).collect();
        spans.push(Span::styled(
            format!(" │ types: {}", names.join(", ")),
            Style::default().fg(th.dim),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn search_bar(f: &mut Frame, area: Rect, app: &App) {
    let th = app.theme();
    let focused = app.input_mode() == InputMode::Search;
    let text = app.search_text();

    let (content, style) = if text.is_empty() {
        ("Search by Name", Style::default().fg(th.dim))
    } else {
        (text, Style::default().fg(if focused { th.accent } else { th.fg }))
    };
    let border = if focused { th.accent } else { th.border };

    let paragraph = Paragraph::new(content).style(style).block(
        Block::default()
            .title(" Search ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(paragraph, area);

    if focused && area.width > 2 {
        let x = area.x + 1 + (text.chars().count().min(area.width.saturating_sub(2) as usize) as u16);
        f.set_cursor_position((x, area.y + 1));
    }
}

fn type_bar(f: &mut Frame, area: Rect, app: &App) {
    let th = app.theme();
    let selected = app.filter().types();
    let mut spans = vec![Span::styled(" Types: ", Style::default().fg(th.dim))];
    if selected.is_empty() {
        spans.push(Span::styled(
            "Select Pokemon by types (t)",
            Style::default().fg(th.dim).add_modifier(Modifier::ITALIC),
        ));
    } else {
        for t in selected {
            spans.push(type_tag(t));
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled("(x clears)", Style::default().fg(th.dim)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ===============================
// Table
// ===============================
fn body(f: &mut Frame, area: Rect, app: &mut App) {
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 8;

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        // No rows on screen, so clicks must not map to any
        app.set_table_area(Rect::default());
        too_small(f, area, app, MIN_WIDTH, MIN_HEIGHT);
        return;
    }

    app.set_table_area(area);
    let th = *app.theme();
    let visible = app.visible_rows();
    let shown = visible.len();
    let on_page = app.rows().len();

    let title = if shown < on_page {
        format!(" Pokemon ({shown} / {on_page}) ")
    } else {
        format!(" Pokemon ({on_page}) ")
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(th.border));

    if visible.is_empty() {
        let msg = if app.loading() {
            format!("{} Loading…", app.spinner_char())
        } else if app.rows().is_empty() {
            "No records".to_string()
        } else {
            "No Pokemon on this page match the current filters".to_string()
        };
        let p = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(th.dim))
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let rows: Vec<Row> = visible.iter().map(|p| table_row(p, th.fg, th.dim)).collect();
    let header = Row::new(["ID", "Name", "Image", "Type", "Total", "Average"])
        .style(Style::default().fg(th.heading).add_modifier(Modifier::BOLD));
    let widths = [
        Constraint::Length(6),
        Constraint::Min(12),
        Constraint::Length(12),
        Constraint::Length(24),
        Constraint::Length(6),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(
            Style::default()
                .bg(th.highlight)
                .fg(th.bg)
                .add_modifier(Modifier::BOLD),
        );

    let cursor = app.cursor();
    let state = app.table_state_mut();
    state.select(Some(cursor));
    f.render_stateful_widget(table, area, state);
}

fn table_row(p: &Pokemon, text: Color, dim: Color) -> Row<'static> {
    let summary = summarize(&p.stats);
    let mut tags = Vec::with_capacity(p.types.len() * 2);
    for (i, t) in p.types.iter().enumerate() {
        if i > 0 {
            tags.push(Span::raw(" "));
        }
        tags.push(type_tag(t));
    }

    Row::new(vec![
        Cell::from(p.id.to_string()).style(Style::default().fg(dim)),
        Cell::from(p.name.clone()).style(Style::default().fg(text).add_modifier(Modifier::BOLD)),
        Cell::from(image_label(p.image.as_deref())).style(Style::default().fg(dim)),
        Cell::from(Line::from(tags)),
        Cell::from(summary.total.to_string()),
        Cell::from(format_average(summary.average)),
    ])
}

fn type_tag(name: &str) -> Span<'static> {
    Span::styled(
        format!(" {name} "),
        Style::default().bg(type_color(name)).fg(Color::Black),
    )
}

/// Last path segment of the sprite URL (`25.png`), or `-`.
pub fn image_label(url: Option<&str>) -> String {
    url.and_then(|u| u.rsplit('/').find(|s| !s.is_empty()))
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn too_small(f: &mut Frame, area: Rect, app: &App, min_w: u16, min_h: u16) {
    let th = app.theme();
    let warning_text = format!(
        "Terminal too small!\n\nMinimum size: {}×{}\nCurrent size: {}×{}",
        min_w, min_h, area.width, area.height
    );
    let warning = Paragraph::new(warning_text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(th.bad).add_modifier(Modifier::BOLD))
        .wrap(Wrap { trim: true });
    f.render_widget(warning, area);
}

// ===============================
// Footer
// ===============================
fn footer(f: &mut Frame, area: Rect, app: &App) {
    let th = app.theme();
    let key = |k: &'static str| Span::styled(k, Style::default().fg(th.accent));

    let hints = Line::from(vec![
        key("↑/↓"),
        Span::raw(" move │ "),
        key("Enter"),
        Span::raw(" details │ "),
        key("/"),
        Span::raw(" search │ "),
        key("t"),
        Span::raw(" types │ "),
        key("←/→"),
        Span::raw(" page │ "),
        key("+"),
        Span::raw(" rows │ "),
        key("q"),
        Span::raw(" quit"),
    ]);

    let pg = app.pagination();
    let mut status = vec![
        Span::styled(
            pg.range_label(app.total_items(), app.rows().len()),
            Style::default().fg(th.fg),
        ),
        Span::raw(format!(
            " │ page {}/{} │ {} per page",
            pg.page(),
            app.total_pages(),
            pg.per_page()
        )),
    ];
    if let Some((toast, is_error)) = app.toast_message() {
        let color = if is_error { th.bad } else { th.good };
        status.push(Span::raw(" │ "));
        status.push(Span::styled(toast, Style::default().fg(color).add_modifier(Modifier::BOLD)));
    }
    status.push(Span::styled(format!(" │ FPS {}", app.fps()), Style::default().fg(th.dim)));

    f.render_widget(Paragraph::new(vec![hints, Line::from(status)]), area);
}

// ===============================
// Overlays
// ===============================
fn centered(area: Rect, pct_w: u16, pct_h: u16) -> Rect {
    let width = (area.width * pct_w) / 100;
    let height = (area.height * pct_h) / 100;
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

fn draw_type_picker(f: &mut Frame, app: &App) {
    let th = app.theme();
    let overlay = centered(f.area(), 40, 70);
    f.render_widget(Clear, overlay);

    let block = Block::default()
        .title(" Select Pokemon by types ")
        .title_bottom(" Space toggle · x clear · Enter/Esc close ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(th.accent))
        .style(Style::default().bg(th.bg));

    let options = app.type_options();
    if options.is_empty() {
        let msg = match app.types_error() {
            Some(err) => format!("Could not load types: {err}"),
            None => format!("{} Loading types…", app.spinner_char()),
        };
        f.render_widget(
            Paragraph::new(msg).wrap(Wrap { trim: true }).style(Style::default().fg(th.dim)).block(block),
            overlay,
        );
        return;
    }

    let items: Vec<ListItem> = options
        .iter()
        .map(|o| {
            let mark = if app.filter().has_type(&o.value) { "[x] " } else { "[ ] " };
            ListItem::new(Line::from(vec![
                Span::raw(mark),
                Span::styled(o.label.clone(), Style::default().fg(type_color(&o.value))),
            ]))
        })
        .collect();

    let mut st = ListState::default();
    st.select(Some(app.type_cursor().min(options.len() - 1)));
    let list = List::new(items)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .block(block);
    f.render_stateful_widget(list, overlay, &mut st);
}

fn draw_details_modal(f: &mut Frame, app: &App, p: &Pokemon) {
    let th = app.theme();
    let overlay = centered(f.area(), 60, 80);
    f.render_widget(Clear, overlay);

    let block = Block::default()
        .title(format!(" {} ", capitalize(&p.name)))
        .title_bottom(" Esc close ")
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(th.accent))
        .style(Style::default().bg(th.bg));
    let inner = block.inner(overlay);
    f.render_widget(block, overlay);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(vec![
        Span::styled(format!("#{} ", p.id), Style::default().fg(th.dim)),
        Span::styled(p.name.clone(), Style::default().fg(th.fg).add_modifier(Modifier::BOLD)),
    ]));
    lines.push(Line::from(Span::styled(
        p.image.clone().unwrap_or_else(|| "(no image)".to_string()),
        Style::default().fg(th.dim),
    )));
    let mut tags = Vec::new();
    for t in &p.types {
        tags.push(type_tag(t));
        tags.push(Span::raw(" "));
    }
    lines.push(Line::from(tags));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Statistics",
        Style::default().fg(th.heading).add_modifier(Modifier::BOLD),
    )));

    const NAME_W: usize = 16;
    let bar_room = inner.width.saturating_sub(NAME_W as u16 + 8);
    let max_stat = p.stats.iter().map(|s| s.base_stat).max().unwrap_or(0).max(255);
    for s in &p.stats {
        let bar = "█".repeat(bar_width(s.base_stat, max_stat, bar_room) as usize);
        lines.push(Line::from(vec![
            Span::styled(format!("{:<width$}", s.name, width = NAME_W), Style::default().fg(th.fg)),
            Span::raw(": "),
            Span::styled(format!("{:>4} ", s.base_stat), Style::default().fg(th.fg).add_modifier(Modifier::BOLD)),
            Span::styled(bar, Style::default().fg(th.good)),
        ]));
    }

    let summary = summarize(&p.stats);
    lines.push(Line::default());
    lines.push(Line::from(vec![
        Span::styled("Total EVs: ", Style::default().fg(th.dim)),
        Span::styled(summary.total.to_string(), Style::default().fg(th.heading)),
        Span::styled("   Average: ", Style::default().fg(th.dim)),
        Span::styled(format_average(summary.average), Style::default().fg(th.heading)),
    ]));

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_toast_modal(f: &mut Frame, app: &App) {
    let th = app.theme();
    let Some((message, is_error)) = app.toast_message() else {
        return;
    };

    let area = f.area();
    let width = ((area.width * 4) / 10).max(20).min(area.width);
    let height = 3u16.min(area.height);
    let overlay = Rect {
        x: (area.width.saturating_sub(width)) / 2,
        y: area.height.saturating_sub(height + 3),
        width,
        height,
    };
    f.render_widget(Clear, overlay);

    let color = if is_error { th.bad } else { th.good };
    let icon = if is_error { "✗" } else { "✓" };
    let text = Paragraph::new(format!("{icon} {message}"))
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color)),
        );
    f.render_widget(text, overlay);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_label_takes_last_segment() {
        assert_eq!(
            image_label(Some("https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/25.png")),
            "25.png"
        );
        assert_eq!(image_label(Some("https://x/y/")), "y");
        assert_eq!(image_label(None), "-");
    }

    #[test]
    fn centered_rect_fits_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let r = centered(outer, 60, 50);
        assert_eq!((r.width, r.height), (60, 20));
        assert_eq!((r.x, r.y), (20, 10));
    }
}
