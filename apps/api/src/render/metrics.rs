//! Static font-metric tables for the three base-14 Helvetica faces used by
//! the renderer.
//!
//! Character widths are in em units (relative to font size), taken from the
//! Adobe AFM files for the base-14 set, so no font program ships with the
//! binary. Tables cover ASCII 0x20..=0x7E (95 printable characters);
//! index = (char as usize) - 32. Non-ASCII characters fall back to
//! `average_char_width`, which tolerates the occasional typographic glyph
//! (en dash, bullet, middle dot) without a full Unicode table.

/// The three faces embedded in every output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
    Oblique,
}

impl Font {
    /// PDF base font name for the face.
    pub fn base_name(self) -> &'static [u8] {
        match self {
            Font::Regular => b"Helvetica",
            Font::Bold => b"Helvetica-Bold",
            Font::Oblique => b"Helvetica-Oblique",
        }
    }

    /// Page resource name (`/F1`..`/F3`).
    pub fn resource_name(self) -> &'static [u8] {
        match self {
            Font::Regular => b"F1",
            Font::Bold => b"F2",
            Font::Oblique => b"F3",
        }
    }
}

/// Static character-width table for one face. Widths are em units at 1em.
pub struct FontMetricTable {
    widths: [f32; 95],
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Measures the rendered width of a string in points at the given size.
    pub fn measure_str(&self, s: &str, size: f32) -> f32 {
        let em: f32 = s
            .chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.average_char_width
                }
            })
            .sum();
        em * size
    }

    /// Greedy word-wrap at `max_width` points. A word wider than the line is
    /// emitted on its own line rather than split.
    pub fn wrap(&self, s: &str, size: f32, max_width: f32) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in s.split_whitespace() {
            let word_w = self.measure_str(word, size);
            let space_w = if current.is_empty() {
                0.0
            } else {
                self.space_width * size
            };

            if !current.is_empty() && current_width + space_w + word_w > max_width {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }
            if !current.is_empty() {
                current.push(' ');
                current_width += self.space_width * size;
            }
            current.push_str(word);
            current_width += word_w;
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }
}

/// Helvetica (and Helvetica-Oblique, which shares its metrics).
#[rustfmt::skip]
static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0     1     2     3     4     5     6     7     8     9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :     ;     <     =     >     ?     @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [     \     ]     ^     _     `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {     |     }     ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.513,
    space_width: 0.278,
};

/// Helvetica-Bold.
#[rustfmt::skip]
static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0     1     2     3     4     5     6     7     8     9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :     ;     <     =     >     ?     @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [     \     ]     ^     _     `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {     |     }     ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.536,
    space_width: 0.278,
};

/// Returns the static metric table for a face.
pub fn metrics(font: Font) -> &'static FontMetricTable {
    match font {
        Font::Regular | Font::Oblique => &HELVETICA_TABLE,
        Font::Bold => &HELVETICA_BOLD_TABLE,
    }
}
