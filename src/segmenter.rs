//! Splits a flat, ordered chapter list into the books of the series.
//!
//! Serials that restart their chapter numbering for every book ("Chapter 1"
//! shows up once per book) and bracket books with a prologue and an epilogue
//! can be divided from their titles alone:
//!
//! - an epilogue closes the open segment and forms a segment of its own,
//! - a chapter whose number does not increase over the previous title's
//!   number starts a new segment,
//! - a prologue that directly follows a chapter starts a new segment.
//!
//! Only the first run of digits in a title is considered, so "Chapter 10.5"
//! counts as chapter 10.

use std::sync::LazyLock;

use regex::Regex;

static EPILOGUE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bEpilogue\b").unwrap());
static CHAPTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bChapter \d+\b").unwrap());
static PROLOGUE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bPrologue\b").unwrap());
static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleKind {
    Epilogue,
    /// Carries the first number found in the title.
    Chapter(Option<u64>),
    Prologue,
    Other,
}

impl TitleKind {
    pub fn classify(title: &str) -> Self {
        if EPILOGUE.is_match(title) {
            TitleKind::Epilogue
        } else if CHAPTER.is_match(title) {
            TitleKind::Chapter(first_number(title))
        } else if PROLOGUE.is_match(title) {
            TitleKind::Prologue
        } else {
            TitleKind::Other
        }
    }
}

/// First run of ASCII digits in `title`, if it fits in a `u64`.
pub fn first_number(title: &str) -> Option<u64> {
    DIGITS
        .find(title)
        .and_then(|m| m.as_str().parse().ok())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<T> {
    /// 1-based position in the output.
    pub number: usize,
    pub items: Vec<T>,
}

struct Segmenter<T> {
    segments: Vec<Segment<T>>,
    open: Vec<T>,
}

impl<T> Segmenter<T> {
    fn new() -> Self {
        Self {
            segments: Vec::new(),
            open: Vec::new(),
        }
    }

    fn flush(&mut self) {
        if !self.open.is_empty() {
            let items = std::mem::take(&mut self.open);
            self.emit(items);
        }
    }

    fn emit(&mut self, items: Vec<T>) {
        self.segments.push(Segment {
            number: self.segments.len() + 1,
            items,
        });
    }
}

/// Groups `items` into segments using the title returned by `title_of`.
///
/// The result partitions the input: every item lands in exactly one
/// non-empty segment and the original order is kept.
pub fn segment_by_title<T, F>(items: Vec<T>, title_of: F) -> Vec<Segment<T>>
where
    F: Fn(&T) -> &str,
{
    let mut state = Segmenter::new();
    let mut previous: Option<(TitleKind, Option<u64>)> = None;

    for item in items {
        let title = title_of(&item);
        let kind = TitleKind::classify(title);
        let number = first_number(title);

        match kind {
            TitleKind::Epilogue => {
                state.flush();
                state.emit(vec![item]);
            }
            TitleKind::Chapter(current) => {
                let restarted = match (current, previous.and_then(|(_, n)| n)) {
                    (Some(current), Some(prev)) => current <= prev,
                    _ => false,
                };
                if restarted {
                    state.flush();
                }
                state.open.push(item);
            }
            TitleKind::Prologue => {
                if matches!(previous, Some((TitleKind::Chapter(_), _))) {
                    state.flush();
                }
                state.open.push(item);
            }
            TitleKind::Other => state.open.push(item),
        }

        previous = Some((kind, number));
    }

    state.flush();
    state.segments
}
