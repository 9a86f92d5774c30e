use anyhow::{Context, Result};
use clap::Parser;
use maze_chase_core::{
    CellKind, Direction, Position,
    enemy::{Enemy, Personality},
    level::Level,
    player::Player,
    random::SeededRandom,
    simulation::{Command, GameStatus, Rules, Simulation, SimulationView},
};
use ratatui::{
    crossterm::{
        self,
        event::{self, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use serde::Serialize;
use std::{
    fs::File,
    io::{self, Stdout},
    path::{Path, PathBuf},
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Seed for enemy behavior; a fresh one is drawn when omitted
    #[arg(short, long)]
    seed: Option<u64>,
    /// Simulation ticks per second
    #[arg(short, long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=1000))]
    tick_rate: u32,
    /// JSON file overriding gameplay rules
    #[arg(short, long, value_name = "RULES_FILE")]
    rules: Option<PathBuf>,
    /// Write logs to this file (filtered by RUST_LOG, default "info")
    #[arg(long, value_name = "LOG_FILE")]
    log_file: Option<PathBuf>,
    /// Run this many ticks without a terminal and print a JSON summary
    #[arg(long, value_name = "TICKS")]
    headless: Option<u64>,
}

struct App {
    /// The core simulation.
    simulation: Simulation<SeededRandom>,
    /// Flag to control the main loop.
    should_quit: bool,
}

impl App {
    fn new(simulation: Simulation<SeededRandom>) -> Self {
        App {
            simulation,
            should_quit: false,
        }
    }

    /// Routes one command to the simulation, keeping quitting for ourselves.
    fn handle(&mut self, command: Command) {
        match command {
            Command::Quit => self.should_quit = true,
            other => self.simulation.apply(other),
        }
    }

    /// Handles one step of the simulation.
    fn tick(&mut self) {
        self.simulation.tick();
    }
}

/// Final state printed by `--headless`.
#[derive(Debug, Serialize)]
struct Summary {
    ticks: u64,
    score: u32,
    lives: u32,
    status: GameStatus,
    remaining_pickups: usize,
    player: Position,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref())?;

    let rules = load_rules(args.rules.as_deref())?;
    let rng = match args.seed {
        Some(seed) => SeededRandom::new(seed),
        None => SeededRandom::from_entropy(),
    };
    let level = Level::classic().context("Built-in maze is invalid")?;
    let simulation = Simulation::new(level, rules, rng);
    info!(seed = ?args.seed, tick_rate = args.tick_rate, "starting");

    if let Some(ticks) = args.headless {
        return run_headless(simulation, ticks);
    }

    // Set up the terminal
    let mut terminal = setup_terminal()?;
    let mut app = App::new(simulation);
    let tick_rate = Duration::from_secs(1) / args.tick_rate;
    let result = run_app(&mut terminal, &mut app, tick_rate);

    // Restore the terminal even if the loop failed
    restore_terminal(&mut terminal)?;
    result
}

/// Installs a file-backed subscriber; without a log file nothing is recorded.
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

/// Reads gameplay rules from JSON; fields left out keep their defaults.
fn load_rules(path: Option<&Path>) -> Result<Rules> {
    let Some(path) = path else {
        return Ok(Rules::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules file: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse rules file: {}", path.display()))
}

/// Runs without input or rendering and prints where the game ended up.
fn run_headless(mut simulation: Simulation<SeededRandom>, ticks: u64) -> Result<()> {
    for _ in 0..ticks {
        if simulation.status().is_terminal() {
            break;
        }
        simulation.tick();
    }
    let view = simulation.view();
    let summary = Summary {
        ticks: view.tick,
        score: view.score,
        lives: view.lives,
        status: view.status,
        remaining_pickups: view.maze.remaining_pickups(),
        player: view.player.position,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Maps a key press to a game command.
fn command_for(code: KeyCode) -> Option<Command> {
    let command = match code {
        KeyCode::Up | KeyCode::Char('w') => Command::SetDirection(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') => Command::SetDirection(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') => Command::SetDirection(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') => Command::SetDirection(Direction::Right),
        KeyCode::Char('r') => Command::Restart,
        KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
        _ => return None,
    };
    Some(command)
}

/// Runs the main loop of the TUI application.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, &app.simulation.view()))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        // Drain every pending key so the next tick sees all of them
        let mut pending = crossterm::event::poll(timeout)?;
        while pending {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(command) = command_for(key.code) {
                        app.handle(command);
                    }
                }
            }
            pending = crossterm::event::poll(Duration::ZERO)?;
        }

        if app.should_quit {
            break;
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }
    Ok(())
}

/// Renders the user interface.
fn ui(frame: &mut Frame, view: &SimulationView) {
    let [map_area, status_area, help_area] = Layout::vertical([
        Constraint::Min(view.maze.height() as u16 + 2),
        Constraint::Length(3),
        Constraint::Length(2),
    ])
    .areas(frame.area());

    render_map(frame, map_area, view);
    render_status(frame, status_area, view);

    let help_text = Paragraph::new("Arrows/WASD to steer, 'r' to restart, 'q' or 'Esc' to quit.")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, help_area);
}

/// Renders score, lives and the end-of-game banner.
fn render_status(frame: &mut Frame, area: Rect, view: &SimulationView) {
    let mut spans = vec![Span::raw(format!(
        "Score: {}   Lives: {}   Pickups left: {}",
        view.score,
        view.lives,
        view.maze.remaining_pickups()
    ))];
    match view.status {
        GameStatus::Playing => {}
        GameStatus::Won => spans.push(Span::styled(
            "   YOU WIN! Press 'r' to restart.",
            Style::default().fg(Color::Yellow).bold(),
        )),
        GameStatus::Lost => spans.push(Span::styled(
            "   GAME OVER! Press 'r' to restart.",
            Style::default().fg(Color::Red).bold(),
        )),
    }
    let status = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(status, area);
}

/// The cell an entity is drawn in: the one under the center of its tile-sized sprite.
fn sprite_cell(position: Position) -> (i32, i32) {
    Position::new(position.x + 0.5, position.y + 0.5).cell()
}

fn player_span(player: &Player) -> Span<'static> {
    // The glyph's open side faces the direction of travel.
    let glyph = if player.mouth() < 15 {
        "O"
    } else {
        match player.direction {
            Direction::Right => "<",
            Direction::Left => ">",
            Direction::Up => "v",
            Direction::Down => "^",
        }
    };
    Span::styled(glyph, Style::default().fg(Color::Yellow).bold())
}

fn enemy_span(enemy: &Enemy) -> Span<'static> {
    let color = if enemy.is_vulnerable() {
        Color::Blue
    } else {
        match enemy.personality {
            Personality::Aggressive => Color::Red,
            Personality::Moderate => Color::Rgb(255, 184, 255),
            Personality::Timid => Color::Cyan,
            Personality::Erratic => Color::Rgb(255, 184, 82),
        }
    };
    Span::styled("M", Style::default().fg(color).bold())
}

fn cell_span(cell: CellKind) -> Span<'static> {
    match cell {
        CellKind::Wall => Span::styled("#", Style::default().fg(Color::Blue)),
        CellKind::Pickup => Span::styled(".", Style::default().fg(Color::White)),
        CellKind::PowerPickup => Span::styled("o", Style::default().fg(Color::White).bold()),
        CellKind::Empty => Span::raw(" "),
    }
}

/// Renders the maze with the player and enemies on top.
fn render_map(frame: &mut Frame, area: Rect, view: &SimulationView) {
    let maze = view.maze;
    let player_cell = sprite_cell(view.player.position);
    let mut lines: Vec<Line> = Vec::with_capacity(maze.height());

    for (y, row) in maze.cells().rows().enumerate() {
        let spans: Vec<Span> = row
            .iter()
            .enumerate()
            .map(|(x, &cell)| {
                let here = (x as i32, y as i32);
                // Enemies are drawn over the player so a touch is visible.
                if let Some(enemy) = view
                    .enemies
                    .iter()
                    .find(|enemy| sprite_cell(enemy.position) == here)
                {
                    enemy_span(enemy)
                } else if player_cell == here {
                    player_span(view.player)
                } else {
                    cell_span(cell)
                }
            })
            .collect();
        lines.push(Line::from(spans));
    }

    let map_paragraph = Paragraph::new(lines)
        .block(Block::default().title("Maze Chase").borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(map_paragraph, area);
}
