//! Shared input handling: normalized events, click-target registry, and
//! pixel→cell conversion.
//!
//! Rendering code registers rectangular click targets with semantic
//! action IDs each frame; the mouse handler converts the browser's pixel
//! coordinates into terminal cells and hit-tests against them. Keeping
//! the geometry pure keeps tap handling unit-testable.

use ratzilla::ratatui::layout::Rect;

/// All possible input events, normalized from keyboard, mouse, and touch
/// sources.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A key press.
    Key(char),
    /// A click/tap on a registered target, identified by a semantic
    /// action ID (see `game::actions`).
    Click(u16),
}

/// A region on screen that can be tapped/clicked to trigger an action.
#[derive(Debug, Clone)]
pub struct ClickTarget {
    /// Rectangular hit region in terminal cell coordinates.
    pub rect: Rect,
    pub action_id: u16,
}

/// Shared state between the render loop and the click handler. Targets
/// are cleared and re-registered every frame so they always match what
/// is on screen.
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            terminal_cols: 0,
            terminal_rows: 0,
        }
    }

    pub fn clear_targets(&mut self) {
        self.targets.clear();
    }

    /// Register a rectangular click target.
    pub fn add_click_target(&mut self, rect: Rect, action_id: u16) {
        self.targets.push(ClickTarget { rect, action_id });
    }

    /// Convenience: register a full-width target on one row of `area`.
    pub fn add_row_target(&mut self, area: Rect, row: u16, action_id: u16) {
        if row >= area.y && row < area.y + area.height {
            self.targets.push(ClickTarget {
                rect: Rect::new(area.x, row, area.width, 1),
                action_id,
            });
        }
    }

    /// Hit-test a terminal cell against all registered targets. When
    /// targets overlap, the last registered one wins, matching the usual
    /// UI layering where later elements sit on top.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<u16> {
        self.targets.iter().rev().find_map(|t| {
            let r = &t.rect;
            if col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height {
                Some(t.action_id)
            } else {
                None
            }
        })
    }
}

impl Default for ClickState {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a pixel coordinate (relative to the grid container) into a
/// terminal cell. Returns `None` outside the grid or for degenerate
/// dimensions.
pub fn pixel_to_cell(
    click_x: f64,
    click_y: f64,
    grid_width: f64,
    grid_height: f64,
    cols: u16,
    rows: u16,
) -> Option<(u16, u16)> {
    if grid_width <= 0.0 || grid_height <= 0.0 || cols == 0 || rows == 0 {
        return None;
    }
    if click_x < 0.0 || click_y < 0.0 {
        return None;
    }
    let col = (click_x / (grid_width / cols as f64)) as u16;
    let row = (click_y / (grid_height / rows as f64)) as u16;
    if col >= cols || row >= rows {
        return None;
    }
    Some((col, row))
}

/// Whether a screen width (in columns) should use the stacked layout.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 80
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── hit_test ───────────────────────────────────────────────

    #[test]
    fn hit_test_basic() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 10, 80, 1), 1);
        cs.add_click_target(Rect::new(0, 11, 80, 2), 2);

        assert_eq!(cs.hit_test(5, 10), Some(1));
        assert_eq!(cs.hit_test(79, 11), Some(2));
        assert_eq!(cs.hit_test(0, 12), Some(2));
        assert_eq!(cs.hit_test(5, 13), None);
        assert_eq!(cs.hit_test(5, 9), None);
    }

    #[test]
    fn hit_test_respects_horizontal_bounds() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(10, 5, 20, 1), 7);
        assert_eq!(cs.hit_test(9, 5), None);
        assert_eq!(cs.hit_test(10, 5), Some(7));
        assert_eq!(cs.hit_test(29, 5), Some(7));
        assert_eq!(cs.hit_test(30, 5), None);
    }

    #[test]
    fn hit_test_last_registered_wins() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 0, 80, 10), 1); // backdrop
        cs.add_click_target(Rect::new(10, 2, 10, 1), 2); // button on top
        assert_eq!(cs.hit_test(12, 2), Some(2));
        assert_eq!(cs.hit_test(5, 2), Some(1));
    }

    #[test]
    fn row_target_clips_to_area() {
        let area = Rect::new(2, 5, 40, 4);
        let mut cs = ClickState::new();
        cs.add_row_target(area, 6, 3);
        cs.add_row_target(area, 20, 4); // outside the area, ignored
        assert_eq!(cs.targets.len(), 1);
        assert_eq!(cs.hit_test(2, 6), Some(3));
    }

    #[test]
    fn clear_targets_empties_registry() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 0, 10, 1), 1);
        cs.clear_targets();
        assert_eq!(cs.hit_test(0, 0), None);
    }

    // ── pixel_to_cell ──────────────────────────────────────────

    #[test]
    fn pixel_to_cell_basic() {
        // 80×30 terminal in a 640×450 grid → 8px × 15px cells.
        assert_eq!(pixel_to_cell(0.0, 0.0, 640.0, 450.0, 80, 30), Some((0, 0)));
        assert_eq!(pixel_to_cell(7.9, 14.9, 640.0, 450.0, 80, 30), Some((0, 0)));
        assert_eq!(pixel_to_cell(8.0, 15.0, 640.0, 450.0, 80, 30), Some((1, 1)));
        assert_eq!(
            pixel_to_cell(639.0, 449.0, 640.0, 450.0, 80, 30),
            Some((79, 29))
        );
    }

    #[test]
    fn pixel_to_cell_out_of_bounds() {
        assert_eq!(pixel_to_cell(640.0, 10.0, 640.0, 450.0, 80, 30), None);
        assert_eq!(pixel_to_cell(10.0, 450.0, 640.0, 450.0, 80, 30), None);
        assert_eq!(pixel_to_cell(-1.0, 10.0, 640.0, 450.0, 80, 30), None);
        assert_eq!(pixel_to_cell(10.0, -0.1, 640.0, 450.0, 80, 30), None);
    }

    #[test]
    fn pixel_to_cell_degenerate_dimensions() {
        assert_eq!(pixel_to_cell(10.0, 10.0, 0.0, 450.0, 80, 30), None);
        assert_eq!(pixel_to_cell(10.0, 10.0, 640.0, 0.0, 80, 30), None);
        assert_eq!(pixel_to_cell(10.0, 10.0, 640.0, 450.0, 0, 30), None);
        assert_eq!(pixel_to_cell(10.0, 10.0, 640.0, 450.0, 80, 0), None);
    }

    #[test]
    fn pixel_to_cell_fractional_cells() {
        // 24 rows in 400px → ≈16.67px per row.
        assert_eq!(pixel_to_cell(0.0, 16.0, 100.0, 400.0, 10, 24), Some((0, 0)));
        assert_eq!(pixel_to_cell(0.0, 17.0, 100.0, 400.0, 10, 24), Some((0, 1)));
    }

    // ── full pipeline ──────────────────────────────────────────

    #[test]
    fn click_pipeline_pixel_to_action() {
        let mut cs = ClickState::new();
        cs.terminal_cols = 80;
        cs.terminal_rows = 30;
        cs.add_click_target(Rect::new(20, 12, 16, 3), 42);

        let grid_w = 640.0;
        let grid_h = 450.0;
        // Center of the target: col 27, row 13.
        let (col, row) =
            pixel_to_cell(27.5 * 8.0, 13.5 * 15.0, grid_w, grid_h, 80, 30).unwrap();
        assert_eq!((col, row), (27, 13));
        assert_eq!(cs.hit_test(col, row), Some(42));

        // A tap just outside the target hits nothing.
        let (col, row) = pixel_to_cell(5.0, 5.0, grid_w, grid_h, 80, 30).unwrap();
        assert_eq!(cs.hit_test(col, row), None);
    }

    #[test]
    fn narrow_layout_threshold() {
        assert!(is_narrow_layout(40));
        assert!(is_narrow_layout(79));
        assert!(!is_narrow_layout(80));
        assert!(!is_narrow_layout(120));
    }
}
