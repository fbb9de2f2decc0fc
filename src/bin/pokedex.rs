// Native binary for Pokedex - Terminal UI mode

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    fs::OpenOptions,
    io,
    path::Path,
    time::{Duration, Instant},
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::task::JoinHandle;

use pokedex::{
    app::{App, InputMode},
    config::load,
    source::{load_types, run_fetcher, HttpSource},
    types::{AppEvent, PageRequest},
    ui,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (safe to ignore if not found)
    let _ = dotenvy::dotenv();

    let cfg = load().context("Failed to load configuration")?;
    init_logging(&cfg.log_file)?;
    log::info!("Pokedex starting");
    cfg.log_summary();

    let source = HttpSource::new(&cfg)?;

    // app + channels
    let (tx, rx) = unbounded_channel::<AppEvent>();
    let (fetch_tx, fetch_rx) = unbounded_channel::<PageRequest>();

    let types_task: JoinHandle<()> = {
        let source = source.clone();
        let tx = tx.clone();
        tokio::spawn(async move { load_types(&source, &tx).await })
    };
    let fetch_task: JoinHandle<Result<()>> =
        tokio::spawn(run_fetcher(source, cfg.detail_concurrency, fetch_rx, tx));

    // terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(&cfg, Some(fetch_tx));
    app.request_page();

    // main loop
    let res = run_loop(&mut app, &mut terminal, rx).await;

    // cleanup (also on loop errors, so the shell is usable again)
    fetch_task.abort();
    types_task.abort();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = res {
        log::error!("Pokedex exited with error: {e:#}");
    } else {
        log::info!("Pokedex exited");
    }
    res
}

/// The UI owns the terminal, so logs go to a file.
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

async fn run_loop(
    app: &mut App,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut rx: UnboundedReceiver<AppEvent>,
) -> Result<()> {
    let mut last_frame = Instant::now();
    let mut first = true;

    loop {
        // frame budget (coalesced renders)
        let frame_ms = 1000u32.saturating_div(app.fps()) as u64;
        let budget = Duration::from_millis(frame_ms.max(1));
        let wait = budget.saturating_sub(last_frame.elapsed());

        // input or fetch events
        if event::poll(wait)? {
            match event::read()? {
                Event::Key(k) => {
                    if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                        handle_key(app, k);
                    }
                }
                Event::Mouse(m) => handle_mouse(app, m),
                _ => {}
            }
        }
        while let Ok(ev) = rx.try_recv() {
            app.on_event(ev);
        }

        if first || last_frame.elapsed() >= budget {
            terminal.draw(|f| ui::draw(f, app))?;
            last_frame = Instant::now();
            first = false;
        }
        if app.quit_flag() {
            break;
        }
    }
    Ok(())
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.click(mouse.column, mouse.row),
        MouseEventKind::ScrollUp => app.scroll(false),
        MouseEventKind::ScrollDown => app.scroll(true),
        _ => {}
    }
}

fn handle_key(app: &mut App, k: KeyEvent) {
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (k.code, k.modifiers) {
        app.on_event(AppEvent::Quit);
        return;
    }

    // Detail overlay swallows everything but its close keys
    if app.selected().is_some() {
        if matches!(
            k.code,
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q')
        ) {
            app.close_details();
        }
        return;
    }

    // Search input: live filtering while typing
    if app.input_mode() == InputMode::Search {
        match k.code {
            KeyCode::Char(c) => app.search_add_char(c),
            KeyCode::Backspace => app.search_backspace(),
            KeyCode::Enter => app.finish_search(),
            KeyCode::Esc => app.clear_search(),
            KeyCode::Up => app.up(),
            KeyCode::Down => app.down(),
            _ => {}
        }
        return;
    }

    // Type picker overlay
    if app.input_mode() == InputMode::Types {
        match k.code {
            KeyCode::Up | KeyCode::Char('k') => app.type_picker_up(),
            KeyCode::Down | KeyCode::Char('j') => app.type_picker_down(),
            KeyCode::Char(' ') => app.toggle_type_at_cursor(),
            KeyCode::Char('x') => app.clear_types(),
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('t') => app.close_type_picker(),
            _ => {}
        }
        return;
    }

    // Normal mode keys
    match (k.code, k.modifiers) {
        (KeyCode::Char('q'), _) => app.on_event(AppEvent::Quit),

        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => app.up(),
        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => app.down(),
        (KeyCode::Home, _) => app.home(),
        (KeyCode::End, _) => app.end(),
        (KeyCode::Enter, _) => app.open_selected(),

        (KeyCode::Left, _) | (KeyCode::PageUp, _) => app.prev_page(),
        (KeyCode::Right, _) | (KeyCode::PageDown, _) => app.next_page(),
        (KeyCode::Char('g'), _) => app.first_page(),
        (KeyCode::Char('G'), _) => app.last_page(),
        (KeyCode::Char('+'), _) => app.cycle_per_page(),
        (KeyCode::Char('r'), _) => app.reload(),

        (KeyCode::Char('/'), _) => app.start_search(),
        (KeyCode::Esc, _) => app.clear_search(),
        (KeyCode::Char('t'), _) => app.open_type_picker(),
        (KeyCode::Char('x'), _) => app.clear_types(),

        (KeyCode::Char('o'), KeyModifiers::CONTROL) => app.cycle_fps(),
        _ => {}
    }
}
