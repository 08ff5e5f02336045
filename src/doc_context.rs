/// Position of one page within the finished document, known only once
/// composition is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageContext {
    pub page_number: usize,
    pub total_pages: usize,
}

impl PageContext {
    pub fn new(page_number: usize, total_pages: usize) -> Self {
        Self {
            page_number,
            total_pages,
        }
    }

    pub fn footer_label(&self) -> String {
        format!("Page {} of {}", self.page_number, self.total_pages)
    }
}
