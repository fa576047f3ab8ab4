mod ai;
mod battle;
mod config;
mod data;
mod ecs;
mod error;
mod fog;
mod map;
mod render;
mod scripted_input;
mod session;

use std::{io::Write, path::PathBuf};

use battle::{BattleAction, Skill};
use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::*;
use clap::Parser;
use config::GameConfig;
use data::items::EquipSlot;
use error::GameError;
use scripted_input::ScriptedInput;
use session::{Command, GameSession, SessionState};

const HEADLESS_DT: f32 = 1.0 / 60.0;

#[derive(Parser)]
#[command(name = "zombiedungeon")]
#[command(about = "Escape a fog-shrouded maze before the zombies and the clock get you")]
#[command(version)]
struct Cli {
    /// JSON config file; missing fields fall back to defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fixed seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Plain-text key script replayed before live input
    #[arg(long)]
    script: Option<PathBuf>,

    /// Run without a terminal window (needs --script to do anything useful)
    #[arg(long)]
    headless: bool,

    /// Frames to simulate in headless mode
    #[arg(long, default_value_t = 3600)]
    ticks: u32,

    /// Write log lines to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Verbose logging (-v, -vv for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

struct ZombieDungeonState {
    session: GameSession,
    script: Option<ScriptedInput>,
}

impl GameState for ZombieDungeonState {
    fn tick(&mut self, ctx: &mut BTerm) {
        let scripted = self.script.as_mut().and_then(ScriptedInput::next_key);
        if let Some(key) = scripted.or(ctx.key) {
            if key == VirtualKeyCode::Escape {
                log::info!("Quit requested on level {}", self.session.level().number);
                ctx.quit();
                return;
            }
            if let Some(command) = command_for_key(self.session.state(), key) {
                self.session.command(command);
            }
        }
        self.session.tick(ctx.frame_time_ms / 1000.0);
        render::draw_session(ctx, &self.session);
    }
}

fn command_for_key(state: SessionState, key: VirtualKeyCode) -> Option<Command> {
    match state {
        SessionState::Playing => match key {
            VirtualKeyCode::Left | VirtualKeyCode::A | VirtualKeyCode::H => {
                Some(Command::Move(Point::new(-1, 0)))
            }
            VirtualKeyCode::Right | VirtualKeyCode::D | VirtualKeyCode::L => {
                Some(Command::Move(Point::new(1, 0)))
            }
            VirtualKeyCode::Up | VirtualKeyCode::W | VirtualKeyCode::K => {
                Some(Command::Move(Point::new(0, -1)))
            }
            VirtualKeyCode::Down | VirtualKeyCode::S | VirtualKeyCode::J => {
                Some(Command::Move(Point::new(0, 1)))
            }
            VirtualKeyCode::Z => Some(Command::Unequip(EquipSlot::Weapon)),
            VirtualKeyCode::X => Some(Command::Unequip(EquipSlot::Shield)),
            VirtualKeyCode::C => Some(Command::Unequip(EquipSlot::Head)),
            VirtualKeyCode::V => Some(Command::Unequip(EquipSlot::Body)),
            other => item_slot(other, 9).map(Command::UseItem),
        },
        SessionState::Battle => match key {
            VirtualKeyCode::Q => Some(Command::Battle(BattleAction::Skill(Skill::Attack))),
            VirtualKeyCode::W => Some(Command::Battle(BattleAction::Skill(Skill::Defend))),
            VirtualKeyCode::E => Some(Command::Battle(BattleAction::Skill(Skill::Heal))),
            VirtualKeyCode::R => Some(Command::Battle(BattleAction::Skill(Skill::Special))),
            other => item_slot(other, 3).map(Command::UseItem),
        },
        SessionState::GameOver => match key {
            VirtualKeyCode::Return => Some(Command::Restart),
            _ => None,
        },
    }
}

fn item_slot(key: VirtualKeyCode, limit: usize) -> Option<usize> {
    let slot = match key {
        VirtualKeyCode::Key1 => 0,
        VirtualKeyCode::Key2 => 1,
        VirtualKeyCode::Key3 => 2,
        VirtualKeyCode::Key4 => 3,
        VirtualKeyCode::Key5 => 4,
        VirtualKeyCode::Key6 => 5,
        VirtualKeyCode::Key7 => 6,
        VirtualKeyCode::Key8 => 7,
        VirtualKeyCode::Key9 => 8,
        _ => return None,
    };
    (slot < limit).then_some(slot)
}

fn init_logging(verbosity: u8, log_file: Option<&PathBuf>) {
    let mut builder = env_logger::Builder::new();
    let base_level = match verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);
    builder.parse_env("RUST_LOG");
    if let Some(path) = log_file {
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
        {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(err) => eprintln!("Cannot open log file {}: {err}", path.display()),
        }
    }
    builder.format(|fmt, record| {
        let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
        writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
    });
    let _ = builder.try_init();
}

fn load_config(cli: &Cli) -> Result<GameConfig, GameError> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    Ok(config)
}

fn run_headless(config: GameConfig, mut script: Option<ScriptedInput>, ticks: u32) {
    let mut session = GameSession::new(config);
    for _ in 0..ticks {
        if let Some(key) = script.as_mut().and_then(ScriptedInput::next_key) {
            if key == VirtualKeyCode::Escape {
                break;
            }
            if let Some(command) = command_for_key(session.state(), key) {
                session.command(command);
            }
        }
        session.tick(HEADLESS_DT);
    }

    let hp = session
        .world()
        .player_stats()
        .map_or(0, |stats| stats.hp);
    log::info!(
        "Headless run finished: seed {} level {} state {:?} hp {} time left {:.1}s",
        session.seed(),
        session.level().number,
        session.state(),
        hp,
        session.time_left()
    );
    if let Some(unused) = script.as_ref().map(ScriptedInput::remaining).filter(|n| *n > 0) {
        log::warn!("{unused} scripted keys were never replayed");
    }
    for line in session.messages().iter().rev() {
        println!("{line}");
    }
}

fn main() -> BError {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_ref());
    let config = load_config(&cli)?;
    let script = cli
        .script
        .as_ref()
        .map(ScriptedInput::from_file)
        .transpose()?;

    if cli.headless {
        run_headless(config, script, cli.ticks);
        return Ok(());
    }

    let context = BTermBuilder::simple80x50()
        .with_title("Zombie Dungeon")
        .build()
        .map_err(|err| GameError::Terminal(err.to_string()))?;
    let game_state = ZombieDungeonState {
        session: GameSession::new(config),
        script,
    };
    main_loop(context, game_state)
}
