use crate::types::Pt;

/// Base-14 Helvetica variants. These are never embedded, so measuring uses
/// the published AFM advance widths below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontStyle {
    Normal,
    Bold,
    Oblique,
}

impl FontStyle {
    pub fn base_font_name(self) -> &'static str {
        match self {
            FontStyle::Normal => "Helvetica",
            FontStyle::Bold => "Helvetica-Bold",
            FontStyle::Oblique => "Helvetica-Oblique",
        }
    }

    pub(crate) fn resource_name(self) -> &'static str {
        match self {
            FontStyle::Normal => "F1",
            FontStyle::Bold => "F2",
            FontStyle::Oblique => "F3",
        }
    }

    pub(crate) const ALL: [FontStyle; 3] = [FontStyle::Normal, FontStyle::Bold, FontStyle::Oblique];
}

// Advance widths in 1/1000 em for U+0020..=U+007E.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

fn glyph_width(style: FontStyle, ch: char) -> u16 {
    let table = match style {
        FontStyle::Bold => &HELVETICA_BOLD_WIDTHS,
        FontStyle::Normal | FontStyle::Oblique => &HELVETICA_WIDTHS,
    };
    match ch {
        ' '..='~' => table[(ch as usize) - 0x20],
        '\u{2022}' => 350,
        '\u{2013}' => 556,
        '\u{2014}' => 1000,
        '\u{2018}' | '\u{2019}' => 222,
        '\u{201C}' | '\u{201D}' => 333,
        '\u{00A0}' => 278,
        _ => 556,
    }
}

pub fn measure_text_width(style: FontStyle, font_size: Pt, text: &str) -> Pt {
    let units: i64 = text.chars().map(|ch| glyph_width(style, ch) as i64).sum();
    let units = units.clamp(0, i32::MAX as i64) as i32;
    font_size.mul_ratio(units, 1000)
}

/// Greedy word wrap. Explicit newlines start a new line; words wider than
/// `max_width` are broken between characters. Blank input yields no lines.
pub fn wrap_text(style: FontStyle, font_size: Pt, text: &str, max_width: Pt) -> Vec<String> {
    let max_width = max_width.max(Pt::from_i32(1));
    let space = measure_text_width(style, font_size, " ");
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_width = Pt::ZERO;
        for word in paragraph.split_whitespace() {
            let word_width = measure_text_width(style, font_size, word);
            if current.is_empty() {
                if word_width <= max_width {
                    current.push_str(word);
                    current_width = word_width;
                    continue;
                }
            } else if current_width + space + word_width <= max_width {
                current.push(' ');
                current.push_str(word);
                current_width += space + word_width;
                continue;
            } else {
                lines.push(std::mem::take(&mut current));
                current_width = Pt::ZERO;
                if word_width <= max_width {
                    current.push_str(word);
                    current_width = word_width;
                    continue;
                }
            }

            // Word alone does not fit: hard-break it.
            for ch in word.chars() {
                let ch_width = glyph_width(style, ch);
                let ch_width = font_size.mul_ratio(ch_width as i32, 1000);
                if !current.is_empty() && current_width + ch_width > max_width {
                    lines.push(std::mem::take(&mut current));
                    current_width = Pt::ZERO;
                }
                current.push(ch);
                current_width += ch_width;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}
