mod data;
mod ecs;
mod map;
mod render;
mod save;
mod scripted_input;
mod session;

use std::path::PathBuf;

use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::*;
use log::warn;

use map::Facing;
use render::{GlowPulse, LOG_MAX_ENTRIES};
use scripted_input::ScriptedInput;
use session::{GameSession, Intent, Outcome};

const MONSTER_TICK_MS: f32 = 300.0;
const GLOW_TICK_MS: f32 = 80.0;
const MAP_ORIGIN_X: i32 = 4;
const MAP_ORIGIN_Y: i32 = 6;
const LOG_PANEL_START: i32 = 33;

struct LabyrinthShell {
    session: GameSession,
    script: Option<ScriptedInput>,
    glow: GlowPulse,
    message_log: Vec<String>,
    monster_clock: f32,
    glow_clock: f32,
}

impl LabyrinthShell {
    fn new(session: GameSession, script: Option<ScriptedInput>) -> Self {
        Self {
            session,
            script,
            glow: GlowPulse::new(),
            message_log: Vec::new(),
            monster_clock: 0.0,
            glow_clock: 0.0,
        }
    }

    fn dispatch_key(&mut self, key: VirtualKeyCode) {
        let intent = match key {
            VirtualKeyCode::W | VirtualKeyCode::Up => Intent::Move(Facing::Up),
            VirtualKeyCode::A | VirtualKeyCode::Left => Intent::Move(Facing::Left),
            VirtualKeyCode::S | VirtualKeyCode::Down => Intent::Move(Facing::Down),
            VirtualKeyCode::D | VirtualKeyCode::Right => Intent::Move(Facing::Right),
            VirtualKeyCode::Space => Intent::Interact,
            VirtualKeyCode::V => Intent::Save,
            VirtualKeyCode::L => Intent::Load,
            VirtualKeyCode::H => Intent::Help,
            _ => return,
        };
        self.session.apply(intent);
    }

    fn flush_story(&mut self) {
        for entry in self.session.drain_story() {
            self.message_log.insert(0, entry);
        }
        self.message_log.truncate(LOG_MAX_ENTRIES);
    }

    fn draw(&mut self, ctx: &mut BTerm) {
        ctx.cls();
        render::draw_status(ctx, &self.session);
        render::draw_map(
            ctx,
            &self.session,
            Point::new(MAP_ORIGIN_X, MAP_ORIGIN_Y),
            &self.glow,
        );
        render::draw_log(ctx, &self.message_log, LOG_PANEL_START);
        if let Some(outcome) = self.session.outcome() {
            let line = match outcome {
                Outcome::Won => data::WIN_BANNER,
                Outcome::Lost => data::LOSS_BANNER,
            };
            render::draw_banner(ctx, outcome, line);
        }
    }
}

impl GameState for LabyrinthShell {
    fn tick(&mut self, ctx: &mut BTerm) {
        // Terminal states park on the banner until any key ends the run.
        if self.session.outcome().is_some() {
            self.flush_story();
            self.draw(ctx);
            if ctx.key.is_some() {
                ctx.quitting = true;
            }
            return;
        }

        if let Some(key) = ctx.key {
            self.dispatch_key(key);
        }

        self.glow_clock += ctx.frame_time_ms;
        while self.glow_clock >= GLOW_TICK_MS {
            self.glow.step();
            self.glow_clock -= GLOW_TICK_MS;
        }

        self.monster_clock += ctx.frame_time_ms;
        while self.monster_clock >= MONSTER_TICK_MS {
            if ctx.key.is_none() {
                if let Some(next) = self.script.as_mut().and_then(ScriptedInput::next_key) {
                    self.dispatch_key(next);
                }
            }
            self.session.monster_tick();
            self.monster_clock -= MONSTER_TICK_MS;
        }

        self.flush_story();
        self.draw(ctx);
    }
}

fn script_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--script" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

fn main() -> BError {
    env_logger::init();

    let script = script_path_from_args().and_then(|path| match ScriptedInput::from_file(&path) {
        Ok(script) => Some(script),
        Err(err) => {
            warn!("ignoring unreadable script {}: {err}", path.display());
            None
        }
    });

    let context = BTermBuilder::simple80x50()
        .with_title("The Cursed Labyrinth")
        .build()?;
    let shell = LabyrinthShell::new(GameSession::new(save::SAVE_FILE), script);
    main_loop(context, shell)
}
