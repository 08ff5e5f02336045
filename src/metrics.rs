#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionMetrics {
    pub name: &'static str,
    pub start_page: usize,
    pub end_page: usize,
    pub page_breaks: usize,
    pub lines: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportMetrics {
    pub sections: Vec<SectionMetrics>,
    pub page_count: usize,
    pub page_breaks: usize,
    pub lines: usize,
    pub total_bytes: usize,
}

impl ReportMetrics {
    pub fn section(&self, name: &str) -> Option<&SectionMetrics> {
        self.sections.iter().find(|section| section.name == name)
    }
}
