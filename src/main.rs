use clap::Parser;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use log::warn;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, BufRead, Stdout, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

use mystery_maze::save::Saver;
use mystery_maze::{Dir, GameConfig, LossReason, Phase, Pos, PowerUpEffect, Session, Tile};

const CELL_W: usize = 2;
const DEFAULT_RENDER_FPS: u64 = 60;

/// A maze chase: reach the exit, dodge the enemy, beat the clock.
#[derive(Parser)]
#[command(about, version)]
struct Args {
    /// Maze width in cells (odd, at least 5)
    #[arg(long, default_value_t = 21)]
    width: usize,

    /// Maze height in cells (odd, at least 5)
    #[arg(long, default_value_t = 21)]
    height: usize,

    /// Seed for the random source (omit for entropy)
    #[arg(long)]
    seed: Option<u64>,

    /// Level time limit in seconds
    #[arg(long, default_value_t = 120)]
    time_limit: u64,

    /// Puzzle obstacles per level
    #[arg(long, default_value_t = 2)]
    obstacles: usize,

    /// Per-axis enemy spawn exclusion around the player
    #[arg(long, default_value_t = 5)]
    spawn_distance: usize,

    /// Grow both maze dimensions by this much per level (even)
    #[arg(long, default_value_t = 0)]
    grow: usize,

    /// Include the enemy-freeze power-up effect in the draw
    #[arg(long, default_value_t = false)]
    freeze: bool,

    /// Render frames per second
    #[arg(long, default_value_t = DEFAULT_RENDER_FPS)]
    fps: u64,

    /// Enable debug messages
    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

impl Args {
    fn config(&self) -> GameConfig {
        GameConfig {
            width: self.width,
            height: self.height,
            obstacle_count: self.obstacles,
            freeze_effect: self.freeze,
            min_spawn_distance: self.spawn_distance,
            base_time_limit: Duration::from_secs(self.time_limit),
            growth_per_level: self.grow,
            ..GameConfig::default()
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Enemy,
    Wall,
    Open,
    Exit,
    Obstacle,
    PowerUp,
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

struct Renderer {
    last: Vec<Cell>,
    width: usize,
    height: usize,
    last_hud: String,
    last_status: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    fn new(width: usize, height: usize) -> Self {
        Self {
            last: vec![
                Cell {
                    glyph: Glyph::Open,
                    color: Color::Reset,
                };
                width * height
            ],
            width,
            height,
            last_hud: String::new(),
            last_status: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }
}

/// How the run ended, for the post-game report.
struct Outcome {
    loss: Option<LossReason>,
    level: u32,
    elapsed: Duration,
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    if args.debug {
        std::env::set_var("RUST_LOG", "debug");
    }
    env_logger::init();

    if !pre_game_menu()? {
        return Ok(());
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let session = match Session::new(args.config(), Instant::now(), &mut rng) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, session, &mut rng, args.fps);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    if let Ok(outcome) = &result {
        report_outcome(outcome);
    }
    result.map(|_| ())
}

fn pre_game_menu() -> io::Result<bool> {
    let stdin = io::stdin();
    loop {
        println!("Welcome to the Mystery Maze Game!");
        println!("1. Start Game");
        println!("2. Instructions");
        println!("3. Quit");
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(false);
        }
        match line.trim() {
            "1" => return Ok(true),
            "2" => print_instructions(),
            "3" => return Ok(false),
            _ => println!("Invalid choice. Please enter 1, 2, or 3.\n"),
        }
    }
}

fn print_instructions() {
    println!();
    println!("Move with the W/A/S/D keys or the arrows.");
    println!("Reach the yellow exit tile in the bottom-right corner.");
    println!("Avoid the red enemy, it explores the maze on its own.");
    println!("Purple blocks ask an arithmetic question; three wrong");
    println!("answers in a row end the game.");
    println!("The cyan power-up grants a random bonus.");
    println!("Press j to save, l to load, q to quit.");
    println!("Beat the clock: each level has a time limit.");
    println!();
}

fn run(
    stdout: &mut Stdout,
    mut session: Session,
    rng: &mut StdRng,
    render_fps: u64,
) -> io::Result<Outcome> {
    let mut renderer = Renderer::new(session.grid().width(), session.grid().height());
    let frame_time = Duration::from_micros(1_000_000 / render_fps.max(1));
    let saver = Saver::new(PathBuf::from("."));
    let mut answer_buf = String::new();
    let mut status = String::new();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                continue;
            }
            let now = Instant::now();
            match session.phase() {
                Phase::Playing => match key.code {
                    KeyCode::Char('q') => {
                        return Ok(Outcome {
                            loss: None,
                            level: session.level(),
                            elapsed: session.elapsed(now),
                        });
                    }
                    KeyCode::Char('w') | KeyCode::Up => {
                        session.attempt_move(Dir::Up, now, rng);
                    }
                    KeyCode::Char('s') | KeyCode::Down => {
                        session.attempt_move(Dir::Down, now, rng);
                    }
                    KeyCode::Char('a') | KeyCode::Left => {
                        session.attempt_move(Dir::Left, now, rng);
                    }
                    KeyCode::Char('d') | KeyCode::Right => {
                        session.attempt_move(Dir::Right, now, rng);
                    }
                    KeyCode::Char('j') => match saver.save(&session.save_state()) {
                        Ok(()) => status = "Game saved!".into(),
                        Err(err) => {
                            warn!("save failed: {err}");
                            status = "Could not save the game.".into();
                        }
                    },
                    KeyCode::Char('l') => match saver.load() {
                        Ok(Some(data)) => {
                            session.restore(data);
                            status = "Game loaded.".into();
                        }
                        Ok(None) => status = "No saved game found.".into(),
                        Err(err) => {
                            warn!("load failed: {err}");
                            status = "Could not load the game.".into();
                        }
                    },
                    _ => {}
                },
                Phase::AwaitingAnswer => match key.code {
                    KeyCode::Char(c) if c.is_ascii_digit() && answer_buf.len() < 6 => {
                        answer_buf.push(c);
                    }
                    KeyCode::Backspace => {
                        answer_buf.pop();
                    }
                    KeyCode::Enter => {
                        if let Ok(value) = answer_buf.parse::<i32>() {
                            session.answer(value, now);
                        }
                        answer_buf.clear();
                    }
                    _ => {}
                },
                Phase::LevelComplete => match key.code {
                    KeyCode::Char('y') => {
                        if let Err(err) = session.advance_level(now, rng) {
                            warn!("cannot build next level: {err}");
                            return Ok(Outcome {
                                loss: None,
                                level: session.level(),
                                elapsed: Duration::ZERO,
                            });
                        }
                        renderer = Renderer::new(session.grid().width(), session.grid().height());
                        status.clear();
                    }
                    KeyCode::Char('n') | KeyCode::Char('q') => {
                        return Ok(Outcome {
                            loss: None,
                            level: session.level(),
                            elapsed: session.elapsed(now),
                        });
                    }
                    _ => {}
                },
                Phase::Lost(reason) => {
                    if key.code == KeyCode::Char('q') {
                        return Ok(Outcome {
                            loss: Some(reason),
                            level: session.level(),
                            elapsed: session.elapsed(now),
                        });
                    }
                }
            }
        }

        let now = Instant::now();
        session.tick(now, rng);
        if let Some(effect) = session.take_power_up_effect() {
            status = match effect {
                PowerUpEffect::ExtraTime => format!(
                    "Power-up: time extended by {} seconds!",
                    session.config().extra_time.as_secs()
                ),
                PowerUpEffect::Teleport => "Power-up: teleported to a new position!".into(),
                PowerUpEffect::Freeze => "Power-up: the enemies freeze!".into(),
            };
        }

        render(stdout, &session, &mut renderer, now, &answer_buf, &status)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn report_outcome(outcome: &Outcome) {
    let minutes = outcome.elapsed.as_secs() / 60;
    let seconds = outcome.elapsed.as_secs() % 60;
    match outcome.loss {
        Some(LossReason::Caught) => println!("Game Over! The enemy caught you!"),
        Some(LossReason::TimedOut) => println!("Time's up! Game Over!"),
        Some(LossReason::PuzzleExhausted) => {
            println!("Incorrect! You have no attempts left. Game Over!")
        }
        None => println!("Thanks for playing!"),
    }
    println!(
        "You reached level {}. Elapsed time: {} minutes and {} seconds.",
        outcome.level, minutes, seconds
    );
}

fn render(
    stdout: &mut Stdout,
    session: &Session,
    renderer: &mut Renderer,
    now: Instant,
    answer_buf: &str,
    status: &str,
) -> io::Result<()> {
    let needed_h = (renderer.height + 3) as u16;
    let needed_w = (renderer.width * CELL_W) as u16;

    stdout.queue(MoveTo(0, 0))?;

    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        );
        stdout.queue(Print(msg))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(());
    }

    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - needed_h) / 2 + 1;
    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
    }

    let remaining = session.remaining_time(now);
    let hud = format!(
        "Level: {}  Time Remaining: {}:{:02}  (q quit, j save, l load)",
        session.level(),
        remaining.as_secs() / 60,
        remaining.as_secs() % 60
    );
    if renderer.needs_full || hud != renderer.last_hud {
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y - 1))?;
        stdout.queue(SetForegroundColor(Color::White))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(Print(&hud))?;
        stdout.queue(ResetColor)?;
        renderer.last_hud = hud;
    }

    for y in 0..renderer.height {
        for x in 0..renderer.width {
            let pos = Pos::new(x, y);
            let cell = cell_for(session, pos);
            let idx = y * renderer.width + x;
            if renderer.needs_full || cell != renderer.last[idx] {
                renderer.last[idx] = cell;
                draw_cell(stdout, renderer, x, y, cell)?;
            }
        }
    }

    let line = match session.phase() {
        Phase::AwaitingAnswer => match session.question() {
            Some((question, attempts)) => {
                format!("Solve to pass ({attempts} attempts left): {question} {answer_buf}_")
            }
            None => String::new(),
        },
        Phase::LevelComplete => format!(
            "Congratulations! Level {} complete. Continue? (y/n)",
            session.level()
        ),
        Phase::Lost(LossReason::Caught) => "The enemy caught you! Press q.".into(),
        Phase::Lost(LossReason::TimedOut) => "Time's up! Press q.".into(),
        Phase::Lost(LossReason::PuzzleExhausted) => "No attempts left! Press q.".into(),
        Phase::Playing => status.to_string(),
    };
    if renderer.needs_full || line != renderer.last_status {
        stdout.queue(MoveTo(
            renderer.origin_x,
            renderer.origin_y + renderer.height as u16,
        ))?;
        stdout.queue(SetForegroundColor(Color::White))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(Print(&line))?;
        stdout.queue(ResetColor)?;
        renderer.last_status = line;
    }
    renderer.needs_full = false;

    stdout.flush()?;
    Ok(())
}

fn cell_for(session: &Session, pos: Pos) -> Cell {
    if pos == session.player() {
        return Cell {
            glyph: Glyph::Player,
            color: Color::Green,
        };
    }
    if session.enemy_positions().any(|e| e == pos) {
        return Cell {
            glyph: Glyph::Enemy,
            color: Color::Red,
        };
    }
    if session.power_up() == Some(pos) {
        return Cell {
            glyph: Glyph::PowerUp,
            color: Color::Cyan,
        };
    }
    match session.grid().tile(pos) {
        Tile::Wall => Cell {
            glyph: Glyph::Wall,
            color: Color::Blue,
        },
        Tile::Open => Cell {
            glyph: Glyph::Open,
            color: Color::Reset,
        },
        Tile::Exit => Cell {
            glyph: Glyph::Exit,
            color: Color::Yellow,
        },
        Tile::Obstacle => Cell {
            glyph: Glyph::Obstacle,
            color: Color::Magenta,
        },
    }
}

fn draw_cell(
    stdout: &mut Stdout,
    renderer: &Renderer,
    x: usize,
    y: usize,
    cell: Cell,
) -> io::Result<()> {
    let (text, color) = match cell.glyph {
        Glyph::Player => ("@ ", cell.color),
        Glyph::Enemy => ("▲ ", cell.color),
        Glyph::Wall => ("██", cell.color),
        Glyph::Open => ("  ", cell.color),
        Glyph::Exit => ("▒▒", cell.color),
        Glyph::Obstacle => ("??", cell.color),
        Glyph::PowerUp => ("◆ ", cell.color),
    };
    let x_pos = renderer.origin_x + (x * CELL_W) as u16;
    let y_pos = renderer.origin_y + y as u16;
    stdout.queue(MoveTo(x_pos, y_pos))?;
    stdout.queue(SetForegroundColor(color))?;
    stdout.queue(Print(text))?;
    let w = UnicodeWidthStr::width(text);
    if w < CELL_W {
        for _ in 0..(CELL_W - w) {
            stdout.queue(Print(' '))?;
        }
    }
    stdout.queue(ResetColor)?;
    Ok(())
}
