//! Reusable clickable UI components.
//!
//! [`ClickableList`] pairs rendered lines with click actions so render
//! code never hand-computes row offsets for targets, and a line's
//! target moves automatically when lines are inserted above it.

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::text::Line;

use crate::input::ClickState;

/// A builder that annotates lines as clickable while they are added.
///
/// # Example
/// ```ignore
/// let mut cl = ClickableList::new();
/// cl.push(Line::from("Header (not clickable)"));
/// cl.push_clickable(Line::from("[B] Buy"), BUY_MULTIPLIER);
/// cl.register_targets(area, &mut cs, 1, 1);
/// let widget = Paragraph::new(cl.into_lines()).block(block);
/// f.render_widget(widget, area);
/// ```
pub struct ClickableList<'a> {
    lines: Vec<Line<'a>>,
    /// `(line_index, action_id)` pairs.
    actions: Vec<(u16, u16)>,
}

impl<'a> ClickableList<'a> {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Add a non-clickable line.
    pub fn push(&mut self, line: Line<'a>) {
        self.lines.push(line);
    }

    /// Add a clickable line with a semantic action ID.
    pub fn push_clickable(&mut self, line: Line<'a>, action_id: u16) {
        let idx = self.lines.len() as u16;
        self.actions.push((idx, action_id));
        self.lines.push(line);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Consume the builder, returning the lines for rendering.
    pub fn into_lines(self) -> Vec<Line<'a>> {
        self.lines
    }

    /// Register click targets for all clickable lines.
    ///
    /// Each logical line is assumed to occupy exactly one visual row (the
    /// lists here never wrap). `top_offset`/`bottom_offset` account for
    /// block borders around the content.
    pub fn register_targets(
        &self,
        area: Rect,
        cs: &mut ClickState,
        top_offset: u16,
        bottom_offset: u16,
    ) {
        let content_y = area.y + top_offset;
        let content_end = area.y + area.height.saturating_sub(bottom_offset);
        for &(line_idx, action_id) in &self.actions {
            let row = content_y + line_idx;
            if row >= content_end {
                continue;
            }
            cs.add_row_target(area, row, action_id);
        }
    }
}

impl<'a> Default for ClickableList<'a> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ClickState;

    #[test]
    fn clickable_rows_register_at_their_lines() {
        let mut cl = ClickableList::new();
        cl.push(Line::from("header"));
        cl.push_clickable(Line::from("item 0"), 10);
        cl.push_clickable(Line::from("item 1"), 11);
        cl.push(Line::from("footer"));
        assert_eq!(cl.len(), 4);

        // Block with Borders::ALL → content starts one row in.
        let area = Rect::new(0, 5, 60, 10);
        let mut cs = ClickState::new();
        cl.register_targets(area, &mut cs, 1, 1);

        assert_eq!(cs.targets.len(), 2);
        assert_eq!(cs.hit_test(10, 7), Some(10)); // line 1 → row 5+1+1
        assert_eq!(cs.hit_test(10, 8), Some(11));
        assert_eq!(cs.hit_test(10, 6), None); // header
        assert_eq!(cs.hit_test(10, 9), None); // footer
    }

    #[test]
    fn targets_clipped_by_area_height() {
        let mut cl = ClickableList::new();
        for i in 0..10 {
            cl.push_clickable(Line::from(format!("item {}", i)), 100 + i);
        }
        // Only 3 content rows fit inside the bordered area.
        let area = Rect::new(0, 0, 40, 5);
        let mut cs = ClickState::new();
        cl.register_targets(area, &mut cs, 1, 1);

        assert_eq!(cs.targets.len(), 3);
        assert_eq!(cs.hit_test(0, 1), Some(100));
        assert_eq!(cs.hit_test(0, 3), Some(102));
        assert_eq!(cs.hit_test(0, 4), None);
    }

    #[test]
    fn borderless_area_starts_at_first_row() {
        let mut cl = ClickableList::new();
        cl.push_clickable(Line::from("only"), 5);
        let area = Rect::new(3, 7, 20, 2);
        let mut cs = ClickState::new();
        cl.register_targets(area, &mut cs, 0, 0);
        assert_eq!(cs.hit_test(3, 7), Some(5));
    }

    #[test]
    fn interleaved_static_lines_shift_targets() {
        let mut cl = ClickableList::new();
        cl.push_clickable(Line::from("a"), 1);
        cl.push(Line::from("divider"));
        cl.push_clickable(Line::from("b"), 2);

        let area = Rect::new(0, 0, 20, 5);
        let mut cs = ClickState::new();
        cl.register_targets(area, &mut cs, 0, 0);
        assert_eq!(cs.hit_test(0, 0), Some(1));
        assert_eq!(cs.hit_test(0, 1), None);
        assert_eq!(cs.hit_test(0, 2), Some(2));
    }
}
