//! Result panel model: the rows of the last search, visibility, the
//! highlighted row and where the panel sits on screen.

use crate::locality::Locality;

/// A screen rectangle in terminal cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounds {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Bounds {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    pub fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    pub fn contains(&self, column: u16, row: u16) -> bool {
        column >= self.x && column < self.right() && row >= self.y && row < self.bottom()
    }
}

/// Rows a panel needs to show one result inside its border.
pub const MIN_PANEL_ROWS: u16 = 3;

/// Where the result panel goes for a field group.
///
/// The panel spans the field group horizontally and starts `glow` rows below
/// the locality field. Its height is `height_percent` of the rows left in the
/// viewport below the locality field, raised to [`MIN_PANEL_ROWS`] when the
/// viewport has room and never past the bottom of the viewport.
pub fn panel_bounds(
    group: Bounds,
    locality: Bounds,
    viewport: Bounds,
    glow: u16,
    height_percent: u8,
) -> Bounds {
    let top = locality.bottom().saturating_add(glow);
    let remaining = viewport.bottom().saturating_sub(locality.bottom());
    let available = viewport.bottom().saturating_sub(top);

    let scaled = (u32::from(remaining) * u32::from(height_percent) / 100) as u16;
    let height = scaled.max(MIN_PANEL_ROWS).min(available);

    Bounds::new(group.x, top, group.width, height)
}

/// The drop-down list of lookup results.
#[derive(Debug, Clone)]
pub struct ResultPanel {
    id: String,
    rows: Vec<Locality>,
    visible: bool,
    highlighted: Option<usize>,
    offset: usize,
    bounds: Bounds,
}

impl ResultPanel {
    /// A hidden, empty panel with a fresh id.
    pub fn new() -> Self {
        Self {
            id: format!("panel-{}", uuid::Uuid::new_v4().simple()),
            rows: Vec::new(),
            visible: false,
            highlighted: None,
            offset: 0,
            bounds: Bounds::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn rows(&self) -> &[Locality] {
        &self.rows
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// Index of the first row drawn.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.keep_highlight_in_view();
    }

    /// Number of rows that fit inside the border.
    pub fn capacity(&self) -> usize {
        usize::from(self.bounds.height.saturating_sub(2))
    }

    /// Replace every row with `results`.
    pub fn render(&mut self, results: Vec<Locality>) {
        self.rows = results;
        self.highlighted = if self.rows.is_empty() { None } else { Some(0) };
        self.offset = 0;
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Hide the panel and drop its rows.
    pub fn close(&mut self) {
        self.hide();
        self.clear();
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.highlighted = None;
        self.offset = 0;
    }

    pub fn highlight_next(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        self.highlighted = Some(match self.highlighted {
            Some(i) if i + 1 < self.rows.len() => i + 1,
            Some(i) => i,
            None => 0,
        });
        self.keep_highlight_in_view();
    }

    pub fn highlight_prev(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        self.highlighted = Some(self.highlighted.map_or(0, |i| i.saturating_sub(1)));
        self.keep_highlight_in_view();
    }

    /// Row under a screen position, if the panel is visible and the position
    /// falls on a drawn row.
    pub fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        if !self.visible || !self.bounds.contains(column, row) {
            return None;
        }
        let inner_top = self.bounds.y + 1;
        if row < inner_top || row + 1 >= self.bounds.bottom() {
            return None;
        }
        let index = self.offset + usize::from(row - inner_top);
        (index < self.rows.len()).then_some(index)
    }

    /// The record at `index`, if the panel currently shows one there.
    pub fn row(&self, index: usize) -> Option<&Locality> {
        if self.visible {
            self.rows.get(index)
        } else {
            None
        }
    }

    fn keep_highlight_in_view(&mut self) {
        let Some(index) = self.highlighted else {
            return;
        };
        let capacity = self.capacity().max(1);
        if index < self.offset {
            self.offset = index;
        } else if index >= self.offset + capacity {
            self.offset = index + 1 - capacity;
        }
    }
}

impl Default for ResultPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> Vec<Locality> {
        (0..n)
            .map(|i| Locality::new(format!("PLACE {i}"), "VIC", format!("30{i:02}")))
            .collect()
    }

    #[test]
    fn bounds_follow_locality_and_viewport_percentage() {
        let viewport = Bounds::new(0, 0, 80, 43);
        let group = Bounds::new(2, 1, 60, 3);
        let locality = Bounds::new(2, 1, 36, 3);

        let panel = panel_bounds(group, locality, viewport, 0, 25);
        // 39 rows remain below the locality box, a quarter of them is 9.
        assert_eq!(panel, Bounds::new(2, 4, 60, 9));

        let with_glow = panel_bounds(group, locality, viewport, 1, 25);
        assert_eq!(with_glow.y, 5);
    }

    #[test]
    fn bounds_never_pass_the_viewport_bottom() {
        let viewport = Bounds::new(0, 0, 80, 10);
        let locality = Bounds::new(0, 6, 40, 3);

        let panel = panel_bounds(locality, locality, viewport, 0, 100);
        assert_eq!(panel.bottom(), 10);

        let tiny = panel_bounds(locality, locality, viewport, 0, 1);
        assert_eq!(tiny.height, 1);
    }

    #[test]
    fn small_percentages_still_leave_room_for_one_row() {
        let viewport = Bounds::new(0, 0, 60, 11);
        let locality = Bounds::new(1, 6, 58, 1);

        // 4 rows remain and a quarter of them rounds down to one.
        let panel = panel_bounds(locality, locality, viewport, 0, 25);
        assert_eq!(panel.height, MIN_PANEL_ROWS);

        let mut results = ResultPanel::new();
        results.set_bounds(panel);
        assert_eq!(results.capacity(), 1);
    }

    #[test]
    fn render_replaces_previous_rows() {
        let mut panel = ResultPanel::new();
        panel.render(rows(3));
        panel.highlight_next();
        panel.render(rows(1));

        assert_eq!(panel.rows().len(), 1);
        assert_eq!(panel.highlighted(), Some(0));

        panel.render(Vec::new());
        assert_eq!(panel.highlighted(), None);
    }

    #[test]
    fn hit_test_maps_screen_rows_inside_the_border() {
        let mut panel = ResultPanel::new();
        panel.set_bounds(Bounds::new(0, 4, 40, 5));
        panel.render(rows(10));

        // Hidden panels never report hits.
        assert_eq!(panel.row_at(3, 5), None);

        panel.show();
        assert_eq!(panel.row_at(3, 4), None); // top border
        assert_eq!(panel.row_at(3, 5), Some(0));
        assert_eq!(panel.row_at(3, 7), Some(2));
        assert_eq!(panel.row_at(3, 8), None); // bottom border
        assert_eq!(panel.row_at(45, 5), None);
    }

    #[test]
    fn highlight_scrolls_the_visible_window() {
        let mut panel = ResultPanel::new();
        panel.set_bounds(Bounds::new(0, 0, 40, 5)); // three rows inside
        panel.render(rows(6));
        panel.show();

        for _ in 0..4 {
            panel.highlight_next();
        }
        assert_eq!(panel.highlighted(), Some(4));
        assert_eq!(panel.offset(), 2);
        assert_eq!(panel.row_at(1, 1), Some(2));

        for _ in 0..10 {
            panel.highlight_prev();
        }
        assert_eq!(panel.highlighted(), Some(0));
        assert_eq!(panel.offset(), 0);
    }

    #[test]
    fn panel_ids_are_unique() {
        assert_ne!(ResultPanel::new().id(), ResultPanel::new().id());
    }
}
