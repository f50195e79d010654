//! Text layout for the PDF output: greedy word wrapping and a page cursor.
//!
//! Nothing here knows about PDF objects. `paginate` produces positioned lines
//! grouped by page and `pdf_writer` turns them into content streams.

use crate::config::PdfSettings;
use crate::models::ChapterContent;

/// Breaks `text` into lines no wider than `max_width`.
///
/// Words are separated by any whitespace and rejoined with single spaces. A
/// word that is wider than `max_width` on its own gets a line to itself.
/// Empty input produces a single empty line.
pub fn wrap_text<F>(text: &str, max_width: f32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        let candidate = format!("{} {}", current, word);
        if measure(&candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    lines.push(current);
    lines
}

/// Fixed dimensions of every page of a document, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_bottom: f32,
    pub font_size: f32,
    pub leading: f32,
}

/// Where the next line goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutState {
    /// 0-based page index.
    pub page: usize,
    /// Baseline of the next line.
    pub y: f32,
}

/// Result of placing one line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub state: LayoutState,
    pub baseline: f32,
    pub page_break: bool,
}

impl PageGeometry {
    pub fn from_settings(settings: &PdfSettings) -> Self {
        Self {
            width: settings.page_width_pt(),
            height: settings.page_height_pt(),
            margin_left: settings.margin_left_pt(),
            margin_bottom: settings.margin_bottom_pt(),
            font_size: settings.font_size_pt,
            leading: settings.leading_pt(),
        }
    }

    pub fn text_width(&self) -> f32 {
        self.width - 2.0 * self.margin_left
    }

    /// Baseline of the first line of a page, one font size below the top
    /// margin.
    pub fn first_baseline(&self) -> f32 {
        self.height - self.margin_bottom - self.font_size
    }

    pub fn start(&self) -> LayoutState {
        LayoutState {
            page: 0,
            y: self.first_baseline(),
        }
    }

    pub fn next_page(&self, state: LayoutState) -> LayoutState {
        LayoutState {
            page: state.page + 1,
            y: self.first_baseline(),
        }
    }

    /// Places a line, breaking to a new page first when the cursor has
    /// dropped below the bottom margin.
    pub fn append_line(&self, state: LayoutState) -> Placement {
        let (state, page_break) = if state.y < self.margin_bottom {
            (self.next_page(state), true)
        } else {
            (state, false)
        };

        Placement {
            baseline: state.y,
            page_break,
            state: LayoutState {
                y: state.y - self.leading,
                ..state
            },
        }
    }

    /// Moves the cursor down one line without drawing; never breaks a page.
    pub fn skip_line(&self, state: LayoutState) -> LayoutState {
        LayoutState {
            y: state.y - self.leading,
            ..state
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
}

struct Paginator<'a> {
    settings: &'a PdfSettings,
    geometry: PageGeometry,
    state: LayoutState,
    pages: Vec<Page>,
}

impl<'a> Paginator<'a> {
    fn new(settings: &'a PdfSettings) -> Self {
        let geometry = PageGeometry::from_settings(settings);
        Self {
            settings,
            geometry,
            state: geometry.start(),
            pages: Vec::new(),
        }
    }

    fn line(&mut self, text: &str) {
        if text.is_empty() {
            self.blank();
            return;
        }

        let placement = self.geometry.append_line(self.state);
        self.state = placement.state;
        while self.pages.len() <= self.state.page {
            self.pages.push(Page::default());
        }
        self.pages[self.state.page].lines.push(PlacedLine {
            text: text.to_string(),
            x: self.geometry.margin_left,
            y: placement.baseline,
        });
    }

    fn blank(&mut self) {
        self.state = self.geometry.skip_line(self.state);
    }

    fn paragraph(&mut self, text: &str) {
        let font = self.settings.font;
        let size = self.settings.font_size_pt;
        for line in wrap_text(text, self.geometry.text_width(), |s| font.text_width(s, size)) {
            self.line(&line);
        }
    }

    /// One dash per title character, cut to the text width.
    fn underline(&mut self, title: &str) {
        let font = self.settings.font;
        let size = self.settings.font_size_pt;
        let width = self.geometry.text_width();
        let fits = (width / font.text_width("-", size)).floor() as usize;

        let mut underline = "-".repeat(title.chars().count().min(fits));
        while !underline.is_empty() && font.text_width(&underline, size) > width {
            underline.pop();
        }
        self.line(&underline);
    }

    fn chapter(&mut self, chapter: &ChapterContent) {
        if !self.pages.is_empty() {
            self.state = self.geometry.next_page(self.state);
        }

        self.paragraph(&chapter.title);
        self.underline(&chapter.title);
        self.blank();

        for (i, paragraph) in chapter.paragraphs.iter().enumerate() {
            if i > 0 {
                self.blank();
            }
            self.paragraph(&paragraph.text);
        }

        self.blank();
        self.blank();
    }
}

/// Lays out `chapters` in order; each chapter starts on a new page.
pub fn paginate(chapters: &[ChapterContent], settings: &PdfSettings) -> Vec<Page> {
    let mut paginator = Paginator::new(settings);
    for chapter in chapters {
        paginator.chapter(chapter);
    }
    paginator.pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::BuiltinFont;
    use crate::models::Paragraph;

    fn chars(s: &str) -> f32 {
        s.chars().count() as f32
    }

    const TEXT: &str = "The Legions of Terror marched at dawn while the Squire \
        watched from the walls of Summerholm and wondered whether the Lone \
        Swordsman would come again before the harvest was done";

    #[test]
    fn wrapped_lines_fit_and_rejoin() {
        for width in [10.0, 17.0, 25.0, 40.0, 200.0] {
            let lines = wrap_text(TEXT, width, chars);
            assert!(lines.iter().all(|l| chars(l) <= width), "width {}", width);
            assert_eq!(lines.join(" "), TEXT);
        }
    }

    #[test]
    fn wrap_is_greedy() {
        let lines = wrap_text("aa bb cc dd", 5.0, chars);
        assert_eq!(lines, vec!["aa bb", "cc dd"]);
    }

    #[test]
    fn overlong_word_sits_alone() {
        let lines = wrap_text("a extraordinarily b", 5.0, chars);
        assert_eq!(lines, vec!["a", "extraordinarily", "b"]);
        assert_eq!(wrap_text("   ", 5.0, chars), vec![""]);
    }

    fn geometry() -> PageGeometry {
        PageGeometry {
            width: 200.0,
            height: 100.0,
            margin_left: 10.0,
            margin_bottom: 10.0,
            font_size: 10.0,
            leading: 20.0,
        }
    }

    #[test]
    fn append_line_breaks_below_bottom_margin() {
        let geometry = geometry();
        let mut state = geometry.start();
        assert_eq!(state.y, 80.0);

        let mut baselines = Vec::new();
        let mut breaks = Vec::new();
        for _ in 0..5 {
            let placement = geometry.append_line(state);
            baselines.push((placement.state.page, placement.baseline));
            breaks.push(placement.page_break);
            state = placement.state;
        }

        assert_eq!(
            baselines,
            vec![(0, 80.0), (0, 60.0), (0, 40.0), (0, 20.0), (1, 80.0)]
        );
        assert_eq!(breaks, vec![false, false, false, false, true]);
    }

    #[test]
    fn skip_line_never_breaks() {
        let geometry = geometry();
        let state = LayoutState { page: 2, y: 5.0 };
        assert_eq!(geometry.skip_line(state), LayoutState { page: 2, y: -15.0 });
    }

    fn chapter(title: &str, words: usize) -> ChapterContent {
        ChapterContent {
            title: title.to_string(),
            paragraphs: vec![Paragraph::plain(vec!["word"; words].join(" "))],
        }
    }

    #[test]
    fn chapters_start_on_new_pages() {
        let settings = PdfSettings::default();
        let pages = paginate(&[chapter("Prologue", 10), chapter("Chapter 1", 10)], &settings);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].lines[0].text, "Prologue");
        assert_eq!(pages[0].lines[1].text, "--------");
        assert_eq!(pages[1].lines[0].text, "Chapter 1");
        assert_eq!(pages[1].lines[0].x, 72.0);
    }

    #[test]
    fn page_count_grows_with_text() {
        let settings = PdfSettings {
            page_height_in: 4.0,
            font: BuiltinFont::TimesRoman,
            ..PdfSettings::default()
        };
        let mut previous = 0;
        for words in (0..3000).step_by(150) {
            let pages = paginate(&[chapter("Chapter 1", words)], &settings).len();
            assert!(pages >= previous, "{} words gave {} pages", words, pages);
            previous = pages;
        }
        assert!(previous > 1);
    }

    #[test]
    fn lines_stay_inside_margins() {
        let settings = PdfSettings::default();
        let geometry = PageGeometry::from_settings(&settings);
        let pages = paginate(&[chapter("Chapter 7", 2000)], &settings);
        for line in pages.iter().flat_map(|p| &p.lines) {
            assert!(line.y >= geometry.margin_bottom);
            assert!(line.y <= geometry.first_baseline());
            assert!(settings.font.text_width(&line.text, settings.font_size_pt) <= geometry.text_width());
        }
    }

    #[test]
    fn long_title_underline_is_cut_to_text_width() {
        let settings = PdfSettings::default();
        let geometry = PageGeometry::from_settings(&settings);
        let title = "The Long and Winding Road of the Squire Who Would Not Kneel, Part Two".repeat(3);
        let pages = paginate(&[chapter(&title, 10)], &settings);

        let underline = pages[0]
            .lines
            .iter()
            .find(|line| line.text.starts_with('-'))
            .unwrap();
        let width = settings.font.text_width(&underline.text, settings.font_size_pt);
        assert!(width <= geometry.text_width());
        assert!(underline.text.chars().count() < title.chars().count());

        let short = paginate(&[chapter("Chapter 7", 10)], &settings);
        assert_eq!(short[0].lines[1].text, "---------");
    }
}
