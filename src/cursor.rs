use crate::types::{Margins, Pt, Size};

/// Vertical write position and page index for one report generation.
#[derive(Debug, Clone)]
pub struct ReportCursor {
    page_size: Size,
    margins: Margins,
    y: Pt,
    page: usize,
}

impl ReportCursor {
    pub fn new(page_size: Size, margins: Margins) -> Self {
        Self {
            page_size,
            margins,
            y: margins.top,
            page: 1,
        }
    }

    pub fn y(&self) -> Pt {
        self.y
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> Size {
        self.page_size
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn left(&self) -> Pt {
        self.margins.left
    }

    pub fn right(&self) -> Pt {
        self.page_size.width - self.margins.right
    }

    pub fn content_width(&self) -> Pt {
        (self.right() - self.left()).max(Pt::ZERO)
    }

    /// Lowest y any body content may reach.
    pub fn bottom_limit(&self) -> Pt {
        self.page_size.height - self.margins.bottom
    }

    pub fn printable_height(&self) -> Pt {
        (self.bottom_limit() - self.margins.top).max(Pt::ZERO)
    }

    pub fn remaining_height(&self) -> Pt {
        (self.bottom_limit() - self.y).max(Pt::ZERO)
    }

    pub fn is_at_top(&self) -> bool {
        self.y <= self.margins.top
    }

    pub fn fits(&self, needed: Pt) -> bool {
        self.y + needed <= self.bottom_limit()
    }

    pub fn advance(&mut self, amount: Pt) {
        self.y += amount;
    }

    pub(crate) fn next_page(&mut self) {
        self.page += 1;
        self.y = self.margins.top;
    }

    pub(crate) fn move_to(&mut self, y: Pt) {
        self.y = y;
    }
}
