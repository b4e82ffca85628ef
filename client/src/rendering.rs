use crate::interpolation::RenderPosition;
use macroquad::prelude::*;
use shared::message::ClientId;
use std::collections::HashMap;

const MARGIN: f32 = 20.0;
const PLAYER_RADIUS: f32 = 8.0;

/// Draws smoothed player positions scaled into the current window.
pub struct Renderer {
    font_size: f32,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer { font_size: 16.0 }
    }

    /// Maps a world coordinate onto the window, given the largest coordinate
    /// seen so far on that axis.
    pub fn scale(value: f32, max_seen: i32, extent: f32) -> f32 {
        (value / max_seen.max(1) as f32) * (extent - MARGIN).max(0.0)
    }

    pub fn render(&mut self, players: &HashMap<ClientId, RenderPosition>, bounds: (i32, i32)) {
        clear_background(Color::from_rgba(25, 25, 25, 255));

        let width = screen_width();
        let height = screen_height();

        for (id, pos) in players {
            let px = Self::scale(pos.x, bounds.0, width);
            let py = Self::scale(pos.y, bounds.1, height);

            draw_circle(px, py, PLAYER_RADIUS, Color::from_rgba(0, 200, 0, 255));
            draw_text(&id.to_string(), px + 10.0, py, self.font_size, WHITE);
        }

        self.draw_ui(players.len());
    }

    fn draw_ui(&mut self, player_count: usize) {
        let player_text = format!("{} players", player_count);
        draw_text(&player_text, 10.0, 20.0, self.font_size, WHITE);
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_scale_maps_max_to_far_edge() {
        assert_approx_eq!(Renderer::scale(1500.0, 1500, 820.0), 800.0);
        assert_approx_eq!(Renderer::scale(0.0, 1500, 820.0), 0.0);
        assert_approx_eq!(Renderer::scale(750.0, 1500, 620.0), 300.0);
    }

    #[test]
    fn test_scale_degenerate_inputs() {
        assert_approx_eq!(Renderer::scale(0.0, 0, 820.0), 0.0);
        assert_approx_eq!(Renderer::scale(5.0, 0, 10.0), 0.0);
    }
}
