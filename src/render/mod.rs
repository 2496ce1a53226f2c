use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::*;

use crate::map::{GRID_DIM, Terrain, chebyshev};
use crate::session::{GameSession, Outcome};

/// Story entries the log panel shows; the shell truncates to the same bound.
pub const LOG_MAX_ENTRIES: usize = 12;

/// Oscillates smoothly between 0.3 and 0.9 in 0.07 steps; drives the item and
/// exit shimmer. Cosmetic only.
pub struct GlowPulse {
    alpha: f32,
    rising: bool,
}

impl GlowPulse {
    pub const fn new() -> Self {
        Self {
            alpha: 0.5,
            rising: true,
        }
    }

    pub fn step(&mut self) {
        if self.rising {
            self.alpha += 0.07;
            if self.alpha >= 0.9 {
                self.rising = false;
            }
        } else {
            self.alpha -= 0.07;
            if self.alpha <= 0.3 {
                self.rising = true;
            }
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }
}

pub fn draw_map(ctx: &mut BTerm, session: &GameSession, origin: Point, glow: &GlowPulse) {
    let def = session.def();
    let player = session.player_point();

    for y in 0..GRID_DIM {
        for x in 0..GRID_DIM {
            let point = Point::new(x, y);
            let terrain = session
                .grid()
                .terrain_at(point)
                .unwrap_or(Terrain::Wall);
            let (glyph, mut color) = match terrain {
                Terrain::Wall | Terrain::Hedge => ('#', def.theme.wall),
                Terrain::Floor => ('.', def.theme.floor),
                Terrain::Decoration => ('T', def.theme.decoration),
                Terrain::Objective(_) => ('*', RGB::from_u8(255, 215, 0)),
                Terrain::Exit => ('>', RGB::from_u8(255, 215, 0)),
                Terrain::Gate => ('&', RGB::from_u8(200, 0, 200)),
            };
            let shimmer = terrain == Terrain::Exit
                || (matches!(terrain, Terrain::Objective(_))
                    && !session.has_objective_item()
                    && chebyshev(player, point) <= 2);
            if shimmer {
                color = color * glow.alpha();
            }
            ctx.set(
                origin.x + x,
                origin.y + y,
                color,
                RGB::named(BLACK),
                glyph as u16,
            );
        }
    }

    session.each_renderable(|point, renderable| {
        ctx.set(
            origin.x + point.x,
            origin.y + point.y,
            renderable.color,
            RGB::named(BLACK),
            renderable.glyph,
        );
    });
}

pub fn draw_status(ctx: &mut BTerm, session: &GameSession) {
    let header = format!("Level {} · {}", session.level(), session.def().name);
    ctx.print_color_centered(1, RGB::named(YELLOW), RGB::named(BLACK), &header);
    let objective = format!("Objective: {}", session.objective_text());
    ctx.print_color_centered(3, RGB::named(LIGHT_CYAN), RGB::named(BLACK), &objective);
}

pub fn draw_log(ctx: &mut BTerm, log: &[String], start_y: i32) {
    let width = ctx.get_char_size().0 as i32;
    let visible = log.len().min(LOG_MAX_ENTRIES) as i32;
    let top = (start_y - 1).max(0);
    ctx.draw_box(
        0,
        top,
        width - 1,
        visible + 2,
        RGB::named(DARK_GRAY),
        RGB::named(BLACK),
    );
    ctx.print_color(2, top + 1, RGB::named(WHITE), RGB::named(BLACK), "Story Log");
    for (row, entry) in log.iter().take(LOG_MAX_ENTRIES).enumerate() {
        ctx.print(2, top + 2 + row as i32, entry);
    }
}

pub fn draw_banner(ctx: &mut BTerm, outcome: Outcome, line: &str) {
    let (color, title) = match outcome {
        Outcome::Won => (RGB::named(GOLD), "VICTORY"),
        Outcome::Lost => (RGB::named(RED), "GAME OVER"),
    };
    ctx.print_color_centered(24, color, RGB::named(BLACK), title);
    ctx.print_color_centered(26, RGB::named(WHITE), RGB::named(BLACK), line);
    ctx.print_color_centered(
        28,
        RGB::named(GRAY),
        RGB::named(BLACK),
        "Press any key to leave the labyrinth.",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glow_pulse_stays_bounded_and_reverses() {
        let mut glow = GlowPulse::new();
        let mut seen_low = false;
        let mut seen_high = false;
        for _ in 0..200 {
            glow.step();
            assert!(glow.alpha() > 0.2 && glow.alpha() < 1.0);
            if glow.alpha() <= 0.31 {
                seen_low = true;
            }
            if glow.alpha() >= 0.89 {
                seen_high = true;
            }
        }
        assert!(seen_low && seen_high);
    }
}
