mod app;
mod bank;
mod config;
mod event;
mod session;
mod store;
mod tabbar;
mod ui;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::info;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};
use ratatui::{Frame, Terminal};

use app::{App, Route};
use bank::library::PackLibrary;
use bank::normalize;
use config::Config;
use event::{AppEvent, EventHandler};
use store::kv::KvStore;
use ui::components::card_view::CardView;
use ui::components::drill_summary::DrillSummary;
use ui::components::pack_list::PackList;
use ui::components::question_view::QuestionView;
use ui::components::tab_bar::TabBar;
use ui::layout::AppLayout;

#[derive(Parser)]
#[command(name = "quizdr", version, about = "Terminal study trainer with flashcards and exam drills")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, value_name = "DIR", help = "Data directory override")]
    data_dir: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Import a question pack from a JSON file, then exit")]
    import: Option<PathBuf>,

    #[arg(long, default_value = "error", help = "Log level filter")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .parse_filters(&cli.log_level)
        .init();

    let mut config = Config::load().unwrap_or_default();
    config.normalize_roles();
    if let Some(theme_name) = cli.theme {
        config.theme = theme_name;
    }

    if let Some(ref path) = cli.import {
        return run_import(path, cli.data_dir);
    }

    let mut app = App::new(config, cli.data_dir)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// One-shot import from the command line: validate the file, upsert it into
/// storage, report what was kept.
fn run_import(path: &Path, data_dir: Option<PathBuf>) -> Result<()> {
    let store = match data_dir {
        Some(dir) => KvStore::with_base_dir(dir)?,
        None => KvStore::new()?,
    };
    let library = PackLibrary::new();

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&content).context("file is not valid JSON")?;
    let pack = normalize::normalize_pack_checked(&value)
        .with_context(|| format!("{} is not a usable question pack", path.display()))?;

    let raw_count = value
        .get("questions")
        .and_then(|q| q.as_array())
        .map(|q| q.len())
        .unwrap_or(0);
    let dropped = raw_count.saturating_sub(pack.len());

    library.upsert_pack(&store, pack.clone())?;
    info!("imported pack {} into {}", pack.pack_id, store.base_dir().display());

    if dropped > 0 {
        println!(
            "Imported \"{}\" v{}: {} questions kept, {} malformed dropped.",
            pack.title,
            pack.version,
            pack.len(),
            dropped
        );
    } else {
        println!(
            "Imported \"{}\" v{}: {} questions.",
            pack.title,
            pack.version,
            pack.len()
        );
    }
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Resize | AppEvent::Idle => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore Repeat and Release so held keys don't double-fire actions.
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    // Any keypress retires the previous status notice.
    app.notice = None;

    match app.current_route() {
        Route::Practice => handle_practice_key(app, key),
        Route::Cards => handle_cards_key(app, key),
        Route::Review => handle_review_key(app, key),
        Route::Packs => handle_packs_key(app, key),
        Route::Profile => handle_profile_key(app, key),
        Route::PracticeDrill | Route::ReviewDrill => handle_drill_key(app, key),
    }
}

/// Keys shared by every tab page. Returns true when the key was consumed.
fn handle_tab_page_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            true
        }
        KeyCode::Tab => {
            app.next_tab();
            true
        }
        KeyCode::BackTab => {
            app.prev_tab();
            true
        }
        KeyCode::Char('?') => {
            app.peek_profile();
            true
        }
        KeyCode::Char(ch @ '1'..='9') => {
            let idx = ch as usize - '1' as usize;
            if idx < app.tabbar.len() {
                app.select_tab(idx);
            }
            true
        }
        _ => false,
    }
}

fn handle_practice_key(app: &mut App, key: KeyEvent) {
    if handle_tab_page_key(app, key) {
        return;
    }
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.practice_select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.practice_select_prev(),
        KeyCode::Enter => app.start_practice_drill(),
        _ => {}
    }
}

fn handle_cards_key(app: &mut App, key: KeyEvent) {
    if handle_tab_page_key(app, key) {
        return;
    }
    match key.code {
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Down | KeyCode::Char('j') => {
            app.browse.next(&app.deck)
        }
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Up | KeyCode::Char('k') => {
            app.browse.prev(&app.deck)
        }
        KeyCode::Enter | KeyCode::Char(' ') => app.browse.flip(),
        KeyCode::Char('c') => app.toggle_collect(),
        KeyCode::Char('f') => app.browse.toggle_filter(),
        _ => {}
    }
}

fn handle_review_key(app: &mut App, key: KeyEvent) {
    if handle_tab_page_key(app, key) {
        return;
    }
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            let count = app.wrongs.len();
            if count > 0 {
                app.review_selected = (app.review_selected + 1).min(count - 1);
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.review_selected = app.review_selected.saturating_sub(1);
        }
        KeyCode::Enter => app.start_review_drill(),
        _ => {}
    }
}

fn handle_packs_key(app: &mut App, key: KeyEvent) {
    // Confirmation dialog takes priority
    if app.packs_confirm_delete {
        match key.code {
            KeyCode::Char('y') => app.confirm_delete_pack(),
            KeyCode::Char('n') | KeyCode::Esc => app.cancel_delete_pack(),
            _ => {}
        }
        return;
    }

    if handle_tab_page_key(app, key) {
        return;
    }
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.packs_select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.packs_select_prev(),
        KeyCode::Char('x') | KeyCode::Delete => app.request_delete_pack(),
        _ => {}
    }
}

fn handle_profile_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.close_profile_peek();
        return;
    }
    if handle_tab_page_key(app, key) {
        return;
    }
}

fn handle_drill_key(app: &mut App, key: KeyEvent) {
    let finished = app.quiz.as_ref().map(|q| q.is_finished()).unwrap_or(true);
    if finished {
        match key.code {
            KeyCode::Char('r') => app.retry_drill(),
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => app.end_drill(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.end_drill(),
        KeyCode::Down | KeyCode::Char('j') => {
            if let Some(quiz) = app.quiz.as_mut() {
                quiz.select_next();
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            if let Some(quiz) = app.quiz.as_mut() {
                quiz.select_prev();
            }
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            let revealed = app.quiz.as_ref().map(|q| q.revealed()).unwrap_or(false);
            if revealed {
                app.advance_question();
            } else {
                app.reveal_answer();
                // A question with no options cannot be answered; skip it.
                let still_hidden = app.quiz.as_ref().map(|q| !q.revealed()).unwrap_or(false);
                if still_hidden {
                    app.advance_question();
                }
            }
        }
        _ => {}
    }
}

fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = AppLayout::new(area);

    render_header(frame, app, layout.header);

    match app.current_route() {
        Route::Practice => render_practice(frame, app, layout.main),
        Route::Cards => render_cards(frame, app, layout.main),
        Route::Review => render_review(frame, app, layout.main),
        Route::Packs => render_packs(frame, app, layout.main),
        Route::Profile => render_profile(frame, app, layout.main),
        Route::PracticeDrill | Route::ReviewDrill => render_drill(frame, app, layout.main),
    }

    let tab_bar = TabBar::new(app.tabbar.tabs(), app.tabbar.cur_idx(), app.theme);
    frame.render_widget(tab_bar, layout.tab_bar);

    render_footer(frame, app, layout.footer);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;

    let total_questions: usize = app.packs.iter().map(|p| p.len()).sum();
    let info = format!(
        " {} packs | {} questions | {} missed",
        app.packs.len(),
        total_questions,
        app.wrongs.len(),
    );

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " quizdr ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info,
            Style::default().fg(colors.muted()).bg(colors.header_bg()),
        ),
    ]))
    .block(Block::bordered().border_style(Style::default().fg(colors.border())))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_practice(frame: &mut Frame, app: &App, area: Rect) {
    let list = PackList::new("Choose a pack", &app.packs, app.practice_selected, app.theme);
    frame.render_widget(list, area);
}

fn render_cards(frame: &mut Frame, app: &App, area: Rect) {
    let view = CardView::new(&app.deck, &app.browse, app.theme);
    frame.render_widget(view, area);
}

fn render_review(frame: &mut Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;

    let block = Block::bordered()
        .title(format!(" Missed questions ({}) ", app.wrongs.len()))
        .border_style(Style::default().fg(colors.border_focused()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.wrongs.is_empty() {
        let hint = Paragraph::new(Line::from(Span::styled(
            "Nothing here. Questions you miss in a drill collect on this page.",
            Style::default().fg(colors.muted()),
        )));
        frame.render_widget(hint, inner);
        return;
    }

    // Resolve ids against the in-memory pack list; ids from since-deleted
    // packs show as bare ids.
    let lines: Vec<Line> = app
        .wrongs
        .ids()
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let is_selected = i == app.review_selected;
            let indicator = if is_selected { ">" } else { " " };
            let text = match app
                .packs
                .iter()
                .flat_map(|p| p.questions.iter())
                .find(|q| &q.id == id)
            {
                Some(q) => format!(" {indicator} {} · {}", q.chapter, q.title),
                None => format!(" {indicator} {id}"),
            };
            let style = if is_selected {
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            Line::from(Span::styled(text, style))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_packs(frame: &mut Frame, app: &App, area: Rect) {
    let list = PackList::new(
        "Manage imported packs",
        &app.packs,
        app.packs_selected,
        app.theme,
    );
    frame.render_widget(list, area);

    if app.packs_confirm_delete {
        render_delete_confirm(frame, app, area);
    }
}

fn render_delete_confirm(frame: &mut Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let popup = ui::layout::centered_rect(40, 30, area);
    frame.render_widget(Clear, popup);

    let title = app
        .packs
        .get(app.packs_selected)
        .map(|p| p.title.clone())
        .unwrap_or_default();

    let block = Block::bordered()
        .title(" Delete pack? ")
        .border_style(Style::default().fg(colors.warning()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("Remove \"{title}\" and its questions?"),
            Style::default().fg(colors.fg()),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[y] delete   [n] keep",
            Style::default().fg(colors.muted()),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false }),
        inner,
    );
}

fn render_profile(frame: &mut Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;

    let block = Block::bordered()
        .title(" Profile ")
        .border_style(Style::default().fg(colors.border_focused()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let total_questions: usize = app.packs.iter().map(|p| p.len()).sum();
    let roles = if app.config.roles.is_empty() {
        "none".to_string()
    } else {
        app.config.roles.join(", ")
    };

    let rows = vec![
        ("Roles", roles),
        ("Theme", app.theme.name.clone()),
        ("Packs", format!("{}", app.packs.len())),
        ("Questions", format!("{total_questions}")),
        (
            "Cards collected",
            format!("{}/{}", app.deck.collected_count(), app.deck.len()),
        ),
        ("Missed questions", format!("{}", app.wrongs.len())),
        ("Data directory", app.store.base_dir().display().to_string()),
        ("Version", env!("CARGO_PKG_VERSION").to_string()),
    ];

    let lines: Vec<Line> = rows
        .into_iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(
                    format!(" {label:<18}"),
                    Style::default().fg(colors.muted()),
                ),
                Span::styled(value, Style::default().fg(colors.fg())),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_drill(frame: &mut Frame, app: &App, area: Rect) {
    let Some(quiz) = app.quiz.as_ref() else {
        return;
    };

    if quiz.is_finished() {
        let summary = DrillSummary::new(quiz, app.theme);
        frame.render_widget(summary, area);
    } else {
        let view = QuestionView::new(quiz, app.theme);
        frame.render_widget(view, area);
    }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;

    if let Some(notice) = &app.notice {
        let line = Paragraph::new(Line::from(Span::styled(
            format!(" {notice}"),
            Style::default().fg(colors.warning()),
        )));
        frame.render_widget(line, area);
        return;
    }

    let revealed = app.quiz.as_ref().map(|q| q.revealed()).unwrap_or(false);
    let hints = match app.current_route() {
        Route::Practice => " [j/k] Select pack  [Enter] Drill  [Tab] Next tab  [?] Profile  [q] Quit ",
        Route::Cards => " [h/l] Browse  [Space] Flip  [c] Collect  [f] Collected only  [q] Quit ",
        Route::Review => " [Enter] Review missed  [j/k] Scroll  [Tab] Next tab  [q] Quit ",
        Route::Packs => " [j/k] Select  [x] Delete  [Tab] Next tab  [q] Quit ",
        Route::Profile => " [Esc] Back  [Tab] Next tab  [q] Quit ",
        Route::PracticeDrill | Route::ReviewDrill => {
            if revealed {
                " [Enter] Next question  [Esc] End drill "
            } else {
                " [j/k] Select  [Enter] Check answer  [Esc] End drill "
            }
        }
    };

    let footer = Paragraph::new(Line::from(Span::styled(
        hints,
        Style::default().fg(colors.muted()),
    )));
    frame.render_widget(footer, area);
}
