pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
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
    io::{self, stdin, Write as _},
    path::PathBuf,
    time::Duration,
};

use kondi::engine::{Cue, TimerEngine, TimerMode};
use kondi::program::Program;
use kondi::queue::{build_exercise_queue, build_program_queue, RestPlan, StepKind};
use kondi::runtime::{AppEvent, CrosstermEventSource, EventSource, Runner};
use kondi::settings::{FileSettingsStore, Settings, SettingsStore};
use kondi::store::{create_program, FileProgramStore, ProgramStore};
use kondi::summary::{self, ProgramSummary};
use kondi::workout_log::{FileWorkoutStore, WorkoutLog, WorkoutStore};

const TICK_RATE_MS: u64 = 1000;

/// fitness interval timer tui with workout programs and training history
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal fitness timer: define programs of exercises (sets × reps × timed moves with rests), then run them as an interval countdown with pause, skip and jump controls."
)]
pub struct Cli {
    /// open this program directly
    #[clap(short = 'p', long)]
    program: Option<String>,

    /// default rest between exercises, free text ("1 minute", "45 sec", "90")
    #[clap(long, default_value = "1 minute")]
    rest: String,

    /// print saved programs and exit
    #[clap(long)]
    list: bool,

    /// storage directory override (defaults to the platform data dir)
    #[clap(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Home,
    NewProgram,
    ProgramView,
    ExerciseTimer,
    ProgramTimer,
}

pub struct App {
    pub programs: Vec<Program>,
    pub program_store: FileProgramStore,
    pub settings: Settings,
    pub workout_log: WorkoutLog,
    pub workout_store: FileWorkoutStore,
    pub state: AppState,
    pub name_input: String,
    pub selected_program: usize,
    pub current_program: Option<usize>,
    pub selected_exercise: usize,
    pub default_rest_text: String,
    pub engine: TimerEngine,
    pub rest_plan: Option<RestPlan>,
    pub summary: Option<ProgramSummary>,
    pub flash: Option<String>,
    pub flash_ttl: u8,
    pub countdown_word: Option<&'static str>,
    pub error: Option<String>,
}

impl App {
    pub fn new(cli: &Cli) -> Self {
        let (program_store, settings_store, workout_store) = match &cli.data_dir {
            Some(dir) => (
                FileProgramStore::with_path(dir.join("programs.json")),
                FileSettingsStore::with_path(dir.join("settings.json")),
                FileWorkoutStore::with_path(dir.join("workouts.json")),
            ),
            None => (
                FileProgramStore::new(),
                FileSettingsStore::new(),
                FileWorkoutStore::new(),
            ),
        };

        let programs = program_store.load();
        let settings = settings_store.load();
        let workout_log = workout_store.load();

        let mut app = Self {
            programs,
            program_store,
            settings,
            workout_log,
            workout_store,
            state: AppState::Home,
            name_input: String::new(),
            selected_program: 0,
            current_program: None,
            selected_exercise: 0,
            default_rest_text: cli.rest.clone(),
            engine: TimerEngine::new(TimerMode::Program, settings.audio),
            rest_plan: None,
            summary: None,
            flash: None,
            flash_ttl: 0,
            countdown_word: None,
            error: None,
        };

        if let Some(name) = &cli.program {
            if let Some(index) = app.programs.iter().position(|p| &p.name == name) {
                app.current_program = Some(index);
                app.state = AppState::ProgramView;
            } else {
                app.error = Some(format!("program '{name}' not found"));
            }
        }
        app
    }

    pub fn current_program(&self) -> Option<&Program> {
        self.current_program.and_then(|i| self.programs.get(i))
    }

    /// Rest plan as it would be used for the next run, for roadmap display.
    pub fn preview_rest_plan(&self) -> Option<RestPlan> {
        let program = self.current_program()?;
        Some(RestPlan::for_program(
            program,
            self.default_rest_text.clone(),
            self.settings.colors.rest_color,
        ))
    }

    /// Re-read the saved collection before any list/lookup; the store is
    /// the source of truth, not this struct.
    fn reload_programs(&mut self) {
        self.programs = self.program_store.load();
        if self.selected_program >= self.programs.len() {
            self.selected_program = self.programs.len().saturating_sub(1);
        }
    }

    fn open_selected_program(&mut self) {
        self.reload_programs();
        if self.selected_program < self.programs.len() {
            self.current_program = Some(self.selected_program);
            self.selected_exercise = 0;
            self.error = None;
            self.state = AppState::ProgramView;
        }
    }

    fn submit_new_program(&mut self) {
        match create_program(&self.program_store, &self.name_input) {
            Ok(program) => {
                self.reload_programs();
                if let Some(index) = self.programs.iter().position(|p| p.id == program.id) {
                    self.selected_program = index;
                }
                self.error = None;
                self.state = AppState::Home;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    fn start_exercise_timer(&mut self) {
        let Some(program) = self.current_program() else {
            return;
        };
        let Some(exercise) = program.exercises.get(self.selected_exercise) else {
            return;
        };

        match build_exercise_queue(exercise) {
            Ok(queue) => {
                self.engine = TimerEngine::new(TimerMode::Exercise, self.settings.audio);
                match self.engine.start(queue) {
                    Ok(cues) => {
                        self.error = None;
                        self.summary = None;
                        self.state = AppState::ExerciseTimer;
                        self.apply_cues(cues);
                    }
                    Err(e) => self.error = Some(e.to_string()),
                }
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    fn start_program_timer(&mut self) {
        let Some(program) = self.current_program() else {
            return;
        };
        let rest_plan = RestPlan::for_program(
            program,
            self.default_rest_text.clone(),
            self.settings.colors.rest_color,
        );

        match build_program_queue(program, &rest_plan) {
            Ok(queue) => {
                self.engine = TimerEngine::new(TimerMode::Program, self.settings.audio);
                match self.engine.start(queue) {
                    Ok(cues) => {
                        self.rest_plan = Some(rest_plan);
                        self.error = None;
                        self.state = AppState::ProgramTimer;
                        self.refresh_summary();
                        self.apply_cues(cues);
                    }
                    Err(e) => self.error = Some(e.to_string()),
                }
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    /// Stop-then-start over a freshly built queue, so edits made since the
    /// last start take effect.
    fn restart_timer(&mut self) {
        self.engine.stop();
        match self.state {
            AppState::ExerciseTimer => self.start_exercise_timer(),
            AppState::ProgramTimer => self.start_program_timer(),
            _ => {}
        }
    }

    fn refresh_summary(&mut self) {
        if self.state != AppState::ProgramTimer {
            return;
        }
        let (Some(program), Some(rest_plan)) = (self.current_program(), self.rest_plan.as_ref())
        else {
            return;
        };
        self.summary = Some(summary::project(
            program,
            rest_plan,
            self.engine.queue(),
            self.engine.index(),
        ));
    }

    fn apply_cues(&mut self, cues: Vec<Cue>) {
        let mut step_changed = false;
        for cue in cues {
            match cue {
                Cue::Sound(token) => {
                    self.flash = Some(token.to_string());
                    self.flash_ttl = 2;
                    ring_bell();
                }
                Cue::Speak(word) => {
                    self.countdown_word = Some(word);
                }
                Cue::StepChanged => {
                    step_changed = true;
                    self.countdown_word = None;
                }
                Cue::Finished => {
                    step_changed = true;
                    self.countdown_word = None;
                    if self.state == AppState::ProgramTimer {
                        self.record_completed_workout();
                    }
                }
            }
        }
        if step_changed {
            self.refresh_summary();
        }
    }

    fn record_completed_workout(&mut self) {
        let duration = self
            .summary
            .as_ref()
            .map(|s| ui::format_minutes_seconds(s.total_seconds))
            .unwrap_or_default();
        self.workout_log
            .record(chrono::Local::now().date_naive(), duration);
        if let Err(e) = self.workout_store.save(&self.workout_log) {
            self.error = Some(format!("could not save workout history: {e}"));
        }
    }

    fn on_tick(&mut self) {
        if self.flash_ttl > 0 {
            self.flash_ttl -= 1;
            if self.flash_ttl == 0 {
                self.flash = None;
            }
        }

        let cues = self.engine.on_tick();
        self.apply_cues(cues);
        self.refresh_summary();
    }

    fn toggle_pause(&mut self) {
        if self.engine.is_paused() {
            self.engine.resume();
        } else if self.engine.is_running() {
            self.engine.pause();
        }
    }

    fn leave_timer(&mut self) {
        self.engine.stop();
        self.summary = None;
        self.rest_plan = None;
        self.flash = None;
        self.countdown_word = None;
        self.state = AppState::ProgramView;
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return false;
        }

        match self.state {
            AppState::Home => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return false,
                KeyCode::Up => {
                    self.selected_program = self.selected_program.saturating_sub(1);
                }
                KeyCode::Down => {
                    if self.selected_program + 1 < self.programs.len() {
                        self.selected_program += 1;
                    }
                }
                KeyCode::Enter => self.open_selected_program(),
                KeyCode::Char('n') => {
                    self.name_input.clear();
                    self.error = None;
                    self.state = AppState::NewProgram;
                }
                _ => {}
            },
            AppState::NewProgram => match key.code {
                KeyCode::Esc => {
                    self.error = None;
                    self.state = AppState::Home;
                }
                KeyCode::Enter => self.submit_new_program(),
                KeyCode::Backspace => {
                    self.name_input.pop();
                }
                KeyCode::Char(c) => self.name_input.push(c),
                _ => {}
            },
            AppState::ProgramView => match key.code {
                KeyCode::Esc => {
                    self.current_program = None;
                    self.error = None;
                    self.state = AppState::Home;
                }
                KeyCode::Up => {
                    self.selected_exercise = self.selected_exercise.saturating_sub(1);
                }
                KeyCode::Down => {
                    let count = self.current_program().map_or(0, |p| p.exercises.len());
                    if self.selected_exercise + 1 < count {
                        self.selected_exercise += 1;
                    }
                }
                KeyCode::Enter => self.start_exercise_timer(),
                KeyCode::Char('p') => self.start_program_timer(),
                _ => {}
            },
            AppState::ExerciseTimer => match key.code {
                KeyCode::Esc => self.leave_timer(),
                KeyCode::Char(' ') => self.toggle_pause(),
                KeyCode::Char('r') => self.restart_timer(),
                KeyCode::Char('s') => self.engine.stop(),
                KeyCode::Char('m') => {
                    let cues = self.engine.skip_move();
                    self.apply_cues(cues);
                }
                KeyCode::Char('n') => {
                    let cues = self.engine.skip_to_next_rep();
                    self.apply_cues(cues);
                }
                KeyCode::Char('t') => {
                    let cues = self.engine.skip_to_next_set();
                    self.apply_cues(cues);
                }
                KeyCode::Char('b') => {
                    let cues = self.engine.skip_set_rest();
                    self.apply_cues(cues);
                }
                _ => {}
            },
            AppState::ProgramTimer => match key.code {
                KeyCode::Esc => self.leave_timer(),
                KeyCode::Char(' ') => self.toggle_pause(),
                KeyCode::Char('r') => self.restart_timer(),
                KeyCode::Char('s') => {
                    self.engine.stop();
                    self.refresh_summary();
                }
                KeyCode::Char('e') => {
                    let cues = self.engine.skip_exercise();
                    self.apply_cues(cues);
                }
                KeyCode::Char('t') => {
                    let cues = self.engine.skip_to_next_set();
                    self.apply_cues(cues);
                }
                KeyCode::Char('b') => {
                    // one key, dispatched on the active rest kind
                    let cues = match self.engine.current_step().map(|s| s.kind) {
                        Some(StepKind::ProgramRest) => self.engine.skip_program_rest(),
                        Some(StepKind::SetRest) => self.engine.skip_set_rest(),
                        _ => Vec::new(),
                    };
                    self.apply_cues(cues);
                }
                KeyCode::Right => {
                    let cues = self.engine.step_forward();
                    self.apply_cues(cues);
                }
                KeyCode::Left => {
                    let cues = self.engine.step_backward();
                    self.apply_cues(cues);
                }
                KeyCode::Char(c @ '1'..='9') => {
                    let index = c as usize - '1' as usize;
                    let cues = self.engine.jump_to_exercise(index);
                    self.apply_cues(cues);
                }
                _ => {}
            },
        }
        true
    }
}

fn ring_bell() {
    let mut out = io::stdout();
    let _ = out.write_all(b"\x07");
    let _ = out.flush();
}

fn print_program_list(cli: &Cli) {
    let store = match &cli.data_dir {
        Some(dir) => FileProgramStore::with_path(dir.join("programs.json")),
        None => FileProgramStore::new(),
    };
    let programs = store.load();
    if programs.is_empty() {
        println!("no saved programs");
        return;
    }
    for program in programs {
        let total: u32 = program.exercises.iter().map(|e| e.total_seconds()).sum();
        println!(
            "{:<24} {} exercise(s), ~{}",
            program.name,
            program.exercises.len(),
            ui::format_minutes_seconds(total)
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.list {
        print_program_list(&cli);
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&cli);
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );
    let result = run_loop(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop<B: Backend, E: EventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if !app.handle_key(key) {
                    break;
                }
            }
        }
    }
    Ok(())
}
