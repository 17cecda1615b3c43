//! Paginated page canvas over `pdf-writer`.
//!
//! The canvas owns a top-down cursor on an A4 page and starts a new page
//! whenever a drawing call would pass the bottom margin, so callers lay out
//! content strictly top-to-bottom and never deal with page breaks. Fonts are
//! the base-14 Helvetica faces; no font program is embedded.

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};

use crate::render::metrics::{metrics, Font};

pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
pub const MARGIN: f32 = 50.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const FACES: [Font; 3] = [Font::Regular, Font::Bold, Font::Oblique];

/// Ratio of font size to baseline-to-baseline distance.
const LINE_SPACING: f32 = 1.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// A styled fragment of a single visual line.
pub struct TextRun<'a> {
    pub text: &'a str,
    pub font: Font,
    pub size: f32,
    pub color: (f32, f32, f32),
}

pub struct PageCanvas {
    pdf: Pdf,
    next_ref: i32,
    catalog_id: Ref,
    page_tree_id: Ref,
    font_ids: [Ref; 3],
    content: Content,
    content_ids: Vec<Ref>,
    /// Cursor: top of the next line, in PDF user space (origin bottom-left).
    y: f32,
}

impl PageCanvas {
    pub fn new() -> Self {
        let catalog_id = Ref::new(1);
        let page_tree_id = Ref::new(2);
        let font_ids = [Ref::new(3), Ref::new(4), Ref::new(5)];

        Self {
            pdf: Pdf::new(),
            next_ref: 6,
            catalog_id,
            page_tree_id,
            font_ids,
            content: Content::new(),
            content_ids: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn alloc(&mut self) -> Ref {
        let id = Ref::new(self.next_ref);
        self.next_ref += 1;
        id
    }

    /// Pages emitted so far, including the one in progress.
    pub fn page_count(&self) -> usize {
        self.content_ids.len() + 1
    }

    /// Closes the in-progress page and starts a fresh one.
    fn break_page(&mut self) {
        let data = std::mem::replace(&mut self.content, Content::new()).finish();
        let id = self.alloc();
        self.pdf.stream(id, &data);
        self.content_ids.push(id);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Starts a new page if `height` points do not fit above the bottom
    /// margin.
    fn ensure_room(&mut self, height: f32) {
        if self.y - height < MARGIN {
            self.break_page();
        }
    }

    fn line_height(size: f32) -> f32 {
        size * LINE_SPACING
    }

    /// Draws one visual line composed of consecutive styled runs.
    pub fn draw_runs(&mut self, runs: &[TextRun<'_>], align: Align, indent: f32) {
        let total_width: f32 = runs
            .iter()
            .map(|r| metrics(r.font).measure_str(r.text, r.size))
            .sum();
        let max_size = runs.iter().map(|r| r.size).fold(0.0_f32, f32::max);

        self.ensure_room(Self::line_height(max_size));

        let x = match align {
            Align::Left => MARGIN + indent,
            Align::Center => (MARGIN + (CONTENT_WIDTH - total_width) / 2.0).max(MARGIN),
            Align::Right => (PAGE_WIDTH - MARGIN - total_width).max(MARGIN),
        };
        let baseline = self.y - max_size;

        self.content.begin_text();
        self.content.next_line(x, baseline);
        for run in runs {
            let (r, g, b) = run.color;
            self.content.set_fill_rgb(r, g, b);
            self.content
                .set_font(Name(run.font.resource_name()), run.size);
            self.content.show(Str(&encode(run.text)));
        }
        self.content.end_text();

        self.y -= Self::line_height(max_size);
    }

    /// Draws a single-style line.
    pub fn text_line(
        &mut self,
        text: &str,
        font: Font,
        size: f32,
        color: (f32, f32, f32),
        align: Align,
    ) {
        self.draw_runs(
            &[TextRun {
                text,
                font,
                size,
                color,
            }],
            align,
            0.0,
        );
    }

    /// Draws a word-wrapped paragraph at `indent`. With a `bullet_prefix`,
    /// the first line carries the prefix and continuation lines get a
    /// hanging indent of the prefix width.
    pub fn paragraph(
        &mut self,
        text: &str,
        font: Font,
        size: f32,
        color: (f32, f32, f32),
        indent: f32,
        bullet_prefix: Option<&str>,
    ) {
        let table = metrics(font);
        let prefix_width = bullet_prefix
            .map(|p| table.measure_str(p, size))
            .unwrap_or(0.0);
        let wrap_width = CONTENT_WIDTH - indent - prefix_width;

        for (i, line) in table.wrap(text, size, wrap_width).into_iter().enumerate() {
            let (line, line_indent) = match (i, bullet_prefix) {
                (0, Some(prefix)) => (format!("{prefix}{line}"), indent),
                _ => (line, indent + prefix_width),
            };
            self.draw_runs(
                &[TextRun {
                    text: &line,
                    font,
                    size,
                    color,
                }],
                Align::Left,
                line_indent,
            );
        }
    }

    /// Horizontal separator rule across the content width.
    pub fn hrule(&mut self, color: (f32, f32, f32)) {
        self.space(5.0);
        self.ensure_room(12.0);
        let (r, g, b) = color;
        self.content.set_stroke_rgb(r, g, b);
        self.content.set_line_width(0.5);
        self.content.move_to(MARGIN, self.y);
        self.content.line_to(PAGE_WIDTH - MARGIN, self.y);
        self.content.stroke();
        self.space(12.0);
    }

    /// Moves the cursor down without drawing.
    pub fn space(&mut self, points: f32) {
        self.y -= points;
    }

    /// Finalizes the document and returns the PDF bytes.
    pub fn finish(mut self) -> Vec<u8> {
        self.break_page();

        let page_ids: Vec<Ref> = (0..self.content_ids.len()).map(|_| self.alloc()).collect();

        self.pdf
            .pages(self.page_tree_id)
            .kids(page_ids.iter().copied())
            .count(page_ids.len() as i32);

        for (page_id, content_id) in page_ids.iter().zip(&self.content_ids) {
            let mut page = self.pdf.page(*page_id);
            page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
            page.parent(self.page_tree_id);
            page.contents(*content_id);
            let mut resources = page.resources();
            let mut fonts = resources.fonts();
            for (face, font_id) in FACES.iter().zip(&self.font_ids) {
                fonts.pair(Name(face.resource_name()), *font_id);
            }
            fonts.finish();
            resources.finish();
            page.finish();
        }

        for (face, font_id) in FACES.iter().zip(&self.font_ids) {
            self.pdf
                .type1_font(*font_id)
                .base_font(Name(face.base_name()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
        }

        self.pdf.catalog(self.catalog_id).pages(self.page_tree_id);
        self.pdf.finish()
    }
}

/// Maps text to WinAnsi bytes (the fonts declare `/Encoding
/// /WinAnsiEncoding`). ASCII and the Latin-1 block pass through, so accented
/// names render as written; the typographic characters the layout uses get
/// their WinAnsi slots; anything else degrades to `?`.
fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{00A0}'..='\u{00FF}' => c as u8,
            '\u{2013}' => 0x96, // en dash
            '\u{2014}' => 0x97, // em dash
            '\u{2018}' => 0x91, // left single quote
            '\u{2019}' => 0x92, // right single quote
            '\u{201C}' => 0x93, // left double quote
            '\u{201D}' => 0x94, // right double quote
            '\u{2022}' => 0x95, // bullet
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: (f32, f32, f32) = (0.0, 0.0, 0.0);

    #[test]
    fn test_encode_ascii_passthrough() {
        assert_eq!(encode("Ada Lovelace (1815)"), b"Ada Lovelace (1815)");
    }

    #[test]
    fn test_encode_typographic_characters() {
        assert_eq!(encode("\u{2013}"), vec![0x96]);
        assert_eq!(encode("\u{2022}"), vec![0x95]);
        assert_eq!(encode("\u{00B7}"), vec![0xB7]);
    }

    #[test]
    fn test_encode_latin1_accents_pass_through() {
        assert_eq!(encode("Jos\u{e9} Mu\u{f1}oz"), b"Jos\xe9 Mu\xf1oz");
    }

    #[test]
    fn test_encode_unmapped_degrades_to_question_mark() {
        assert_eq!(encode("\u{4F60}"), b"?");
    }

    #[test]
    fn test_empty_canvas_produces_one_page_pdf() {
        let canvas = PageCanvas::new();
        let bytes = canvas.finish();
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(bytes.windows(5).any(|w| w == b"/Page"));
    }

    #[test]
    fn test_overflow_flows_onto_new_page() {
        let mut canvas = PageCanvas::new();
        // ~75 lines at 10pt * 1.3 spacing exceeds one A4 content column.
        for i in 0..75 {
            canvas.text_line(&format!("line {i}"), Font::Regular, 10.0, BLACK, Align::Left);
        }
        assert!(canvas.page_count() >= 2, "got {} pages", canvas.page_count());
        let bytes = canvas.finish();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_single_page_until_full() {
        let mut canvas = PageCanvas::new();
        for _ in 0..10 {
            canvas.text_line("short line", Font::Regular, 10.0, BLACK, Align::Left);
        }
        assert_eq!(canvas.page_count(), 1);
    }

    #[test]
    fn test_paragraph_wraps_long_text() {
        let mut canvas = PageCanvas::new();
        let before = canvas.y;
        let text = "word ".repeat(60);
        canvas.paragraph(&text, Font::Regular, 10.0, BLACK, 0.0, None);
        // More than one line consumed.
        assert!(before - canvas.y > PageCanvas::line_height(10.0) * 1.5);
    }
}
