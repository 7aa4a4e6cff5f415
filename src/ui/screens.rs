/// Cursor over the visible list. The list itself is derived on every draw,
/// so the screen only remembers which row is highlighted and clamps it
/// whenever the list length may have changed.
#[derive(Default)]
pub(crate) struct ResultsScreen {
    pub(crate) selected: usize,
}

impl ResultsScreen {
    pub(crate) fn move_selection(&mut self, offset: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let len = len as isize;
        let mut new = self.selected as isize + offset;
        if new < 0 {
            new = 0;
        }
        if new >= len {
            new = len - 1;
        }
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    pub(crate) fn ensure_in_bounds(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    /// First row to draw so the selection stays inside a window of
    /// `capacity` rows.
    pub(crate) fn window_start(&self, capacity: usize, len: usize) -> usize {
        let capacity = capacity.max(1);
        let mut start = if self.selected >= capacity {
            self.selected + 1 - capacity
        } else {
            0
        };
        if start + capacity > len {
            start = len.saturating_sub(capacity);
        }
        start
    }
}
