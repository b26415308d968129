pub mod app_dirs;
pub mod chime;
pub mod config;
pub mod runtime;
pub mod session;
pub mod timer;
pub mod ui;

use crate::{
    chime::{Chime, SilentChime, TerminalBell},
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{AppEvent, CrosstermEventSource, EventSource, Runner},
    session::{FileSessionStore, RepeatSlot, SessionRecord, SessionStore},
    timer::{Completion, Timer},
    ui::ui,
};
use chrono::Utc;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

/// One engine tick per second, per the countdown contract.
const TICK_RATE_MS: u64 = 1000;

/// Completion notice stays up for this many ticks (~seconds).
const NOTICE_TICKS: u8 = 3;

/// minimal meditation timer tui with session history
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A minimal terminal meditation timer: countdown with progress, a persisted history of your last ten sessions, and one-key repeat of any previous session."
)]
pub struct Cli {
    /// initial session length, minutes component (0-59)
    #[clap(short = 'm', long)]
    minutes: Option<u32>,

    /// initial session length, seconds component (0-59)
    #[clap(short = 's', long)]
    seconds: Option<u32>,

    /// disable the completion bell
    #[clap(long)]
    no_bell: bool,

    /// pause a running countdown while the duration editor is open
    #[clap(long)]
    pause_on_edit: bool,
}

impl Cli {
    /// Overlay CLI flags on the loaded config for this run.
    fn apply(&self, cfg: &mut Config) {
        if self.minutes.is_some() || self.seconds.is_some() {
            let minutes = self.minutes.unwrap_or(0).min(59);
            let seconds = self.seconds.unwrap_or(0).min(59);
            cfg.default_duration_secs = minutes * 60 + seconds;
        }
        if self.no_bell {
            cfg.bell_enabled = false;
        }
        if self.pause_on_edit {
            cfg.edit_pauses_timer = true;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Welcome,
    Timer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Minutes,
    Seconds,
}

/// Inline minutes/seconds form on the timer screen.
#[derive(Debug, Clone)]
pub struct EditForm {
    pub minutes: String,
    pub seconds: String,
    pub field: EditField,
}

impl EditForm {
    pub fn for_duration(secs: u32) -> Self {
        Self {
            minutes: (secs / 60).min(59).to_string(),
            seconds: (secs % 60).to_string(),
            field: EditField::Minutes,
        }
    }

    fn active_mut(&mut self) -> &mut String {
        match self.field {
            EditField::Minutes => &mut self.minutes,
            EditField::Seconds => &mut self.seconds,
        }
    }

    pub fn push_char(&mut self, c: char) {
        let field = self.active_mut();
        if field.len() < 2 {
            field.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.active_mut().pop();
    }

    pub fn next_field(&mut self) {
        self.field = match self.field {
            EditField::Minutes => EditField::Seconds,
            EditField::Seconds => EditField::Minutes,
        };
    }

    /// Non-numeric entry coerces to 0; both components clamp to 0..=59.
    pub fn parsed(&self) -> (u32, u32) {
        let minutes = self.minutes.trim().parse::<u32>().unwrap_or(0).min(59);
        let seconds = self.seconds.trim().parse::<u32>().unwrap_or(0).min(59);
        (minutes, seconds)
    }
}

/// Transient message line shown on the timer screen.
#[derive(Debug, Clone)]
pub struct Notice {
    pub title: String,
    pub body: String,
    pub ticks_left: u8,
}

impl Notice {
    pub fn completion() -> Self {
        Self {
            title: "Session completed".into(),
            body: "Great job! Your meditation session is complete.".into(),
            ticks_left: NOTICE_TICKS,
        }
    }
}

/// Page-level controller: owns the timer, the injected session store, and
/// the per-screen UI state.
pub struct App {
    pub state: AppState,
    pub config: Config,
    pub timer: Timer,
    pub sessions: Box<dyn SessionStore>,
    pub history: Vec<SessionRecord>,
    pub selected: usize,
    pub repeat: RepeatSlot,
    /// Held only while the timer screen is up.
    pub chime: Option<Box<dyn Chime>>,
    pub edit: Option<EditForm>,
    pub notice: Option<Notice>,
}

impl App {
    pub fn new(config: Config, sessions: Box<dyn SessionStore>) -> Self {
        let history = sessions.list();
        let timer = Timer::new(config.default_duration_secs);
        Self {
            state: AppState::Welcome,
            config,
            timer,
            sessions,
            history,
            selected: 0,
            repeat: RepeatSlot::default(),
            chime: None,
            edit: None,
            notice: None,
        }
    }

    pub fn refresh_history(&mut self) {
        self.history = self.sessions.list();
        self.selected = self.selected.min(self.history.len().saturating_sub(1));
    }

    /// Enter the timer screen. A pending repeat request takes precedence
    /// over the configured default and is consumed here.
    pub fn enter_timer(&mut self) {
        let duration = self
            .repeat
            .take()
            .unwrap_or(self.config.default_duration_secs);
        self.timer = Timer::new(duration);
        self.chime = Some(if self.config.bell_enabled {
            Box::new(TerminalBell)
        } else {
            Box::new(SilentChime)
        });
        self.edit = None;
        self.notice = None;
        self.state = AppState::Timer;
    }

    /// Back to the welcome screen. In-progress countdown state is discarded
    /// and the chime is released no matter how the screen is left.
    pub fn leave_timer(&mut self) {
        self.chime = None;
        self.edit = None;
        self.notice = None;
        self.timer.reset();
        self.refresh_history();
        self.state = AppState::Welcome;
    }

    pub fn on_tick(&mut self) {
        if let Some(notice) = &mut self.notice {
            notice.ticks_left = notice.ticks_left.saturating_sub(1);
            if notice.ticks_left == 0 {
                self.notice = None;
            }
        }

        if self.state == AppState::Timer {
            if let Some(completion) = self.timer.tick() {
                self.complete(completion);
            }
        }
    }

    fn complete(&mut self, completion: Completion) {
        if let Some(chime) = &self.chime {
            chime.ring();
        }
        // Zero-progress sessions are never persisted
        if completion.elapsed > 0 {
            let _ = self.sessions.append(completion.elapsed as u64, Utc::now());
        }
        self.notice = Some(Notice::completion());
        self.timer.reset();
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.history.len() {
            self.selected += 1;
        }
    }

    pub fn delete_selected(&mut self) {
        if let Some(record) = self.history.get(self.selected) {
            let _ = self.sessions.delete(&record.id);
            self.refresh_history();
        }
    }

    /// Repeat the selected session: hand its duration to the next timer
    /// screen through the one-shot slot.
    pub fn repeat_selected(&mut self) {
        if let Some(record) = self.history.get(self.selected) {
            self.repeat.set(record.duration as u32);
            self.enter_timer();
        }
    }

    pub fn open_edit(&mut self) {
        if self.config.edit_pauses_timer {
            self.timer.pause();
        }
        self.edit = Some(EditForm::for_duration(self.timer.duration));
    }

    pub fn apply_edit(&mut self) {
        if let Some(form) = self.edit.take() {
            let (minutes, seconds) = form.parsed();
            self.timer.set_duration(minutes, seconds);
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut config = FileConfigStore::new().load();
    cli.apply(&mut config);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, Box::new(FileSessionStore::new()));
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: EventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui(app, f))?;

        match runner.step() {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
                {
                    break;
                }

                match app.state {
                    AppState::Welcome => match key.code {
                        KeyCode::Esc | KeyCode::Char('q') => break,
                        KeyCode::Char('n') => app.enter_timer(),
                        KeyCode::Enter => app.repeat_selected(),
                        KeyCode::Char('d') => app.delete_selected(),
                        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
                        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
                        _ => {}
                    },
                    AppState::Timer => {
                        if app.edit.is_some() {
                            match key.code {
                                KeyCode::Esc => app.cancel_edit(),
                                KeyCode::Enter => app.apply_edit(),
                                KeyCode::Tab => {
                                    if let Some(form) = &mut app.edit {
                                        form.next_field();
                                    }
                                }
                                KeyCode::Backspace => {
                                    if let Some(form) = &mut app.edit {
                                        form.backspace();
                                    }
                                }
                                KeyCode::Char(c) => {
                                    if let Some(form) = &mut app.edit {
                                        form.push_char(c);
                                    }
                                }
                                _ => {}
                            }
                        } else {
                            match key.code {
                                KeyCode::Esc => app.leave_timer(),
                                KeyCode::Char(' ') => app.timer.toggle(),
                                KeyCode::Char('r') => app.timer.reset(),
                                KeyCode::Char('e') => app.open_edit(),
                                _ => {}
                            }
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
