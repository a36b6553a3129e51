//! A4 word-list PDF.
//!
//! Layout is computed in millimetres from the top-left corner, then encoded
//! with `lopdf` using the built-in Helvetica faces. Before each entry the
//! full block height is measured; if it does not fit above the bottom
//! margin the entry starts a new page.

use lopdf::{
    Document, Object, Stream, StringFormat,
    content::{Content, Operation},
    dictionary,
};

use super::{ExportContext, ExportError, Fields};
use crate::model::Word;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 20.0;
/// Characters per wrapped line of meaning/example text.
pub const WRAP_COLUMNS: usize = 90;

const PT_PER_MM: f32 = 72.0 / 25.4;
const TITLE_SIZE: f32 = 20.0;
const HEADER_SIZE: f32 = 12.0;
const WORD_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 11.0;
const FIRST_ENTRY_Y: f32 = 70.0;
const WORD_ADVANCE: f32 = 10.0;
const SHORT_LINE_ADVANCE: f32 = 7.0;
const WRAPPED_LINE_ADVANCE: f32 = 6.0;
const PARAGRAPH_GAP: f32 = 2.0;
const RULE_OFFSET: f32 = 2.0;
const ENTRY_GAP: f32 = 15.0;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Mark {
    Text {
        x: f32,
        y: f32,
        size: f32,
        bold: bool,
        text: String,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
    },
}

#[cfg(test)]
impl Mark {
    const fn y(&self) -> f32 {
        match self {
            Self::Text { y, .. } | Self::Rule { y, .. } => *y,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct PageLayout {
    pub marks: Vec<Mark>,
}

/// One entry's lines before placement.
struct Block {
    lines: Vec<(String, f32, f32, bool)>,
}

impl Block {
    fn of(index: usize, word: &Word) -> Self {
        let fields = Fields::of(word);
        let mut lines = vec![(
            format!("{}. {}", index + 1, fields.word),
            WORD_SIZE,
            WORD_ADVANCE,
            true,
        )];

        if !fields.phonetic.is_empty() {
            lines.push((
                format!("   Phonetic: {}", fields.phonetic),
                BODY_SIZE,
                SHORT_LINE_ADVANCE,
                false,
            ));
        }
        push_wrapped(&mut lines, "Meaning", fields.meaning);
        if !fields.example.is_empty() {
            push_wrapped(&mut lines, "Example", fields.example);
        }
        if !fields.example_translation.is_empty() {
            push_wrapped(&mut lines, "Translation", fields.example_translation);
        }
        if !fields.category.is_empty() {
            lines.push((
                format!("   Category: {}", fields.category),
                BODY_SIZE,
                SHORT_LINE_ADVANCE,
                false,
            ));
        }
        Self { lines }
    }

    /// Height from the first baseline down to the separator rule.
    fn height(&self) -> f32 {
        self.lines.iter().map(|(_, _, advance, _)| advance).sum::<f32>() + RULE_OFFSET
    }
}

fn push_wrapped(lines: &mut Vec<(String, f32, f32, bool)>, label: &str, text: &str) {
    let wrapped = wrap(&format!("   {label}: {text}"), WRAP_COLUMNS);
    let count = wrapped.len();
    for (i, line) in wrapped.into_iter().enumerate() {
        let advance = if i + 1 == count {
            WRAPPED_LINE_ADVANCE + PARAGRAPH_GAP
        } else {
            WRAPPED_LINE_ADVANCE
        };
        lines.push((line, BODY_SIZE, advance, false));
    }
}

/// Greedy word wrap by character count; over-long words are split.
pub(crate) fn wrap(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for chunk in chars.chunks(columns.max(1)) {
            let piece: String = chunk.iter().collect();
            let needed = if current_len == 0 {
                chunk.len()
            } else {
                current_len + 1 + chunk.len()
            };
            if needed > columns && current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(&piece);
            current_len += chunk.len();
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Place the header and every entry onto pages.
pub(crate) fn layout(words: &[Word], ctx: &ExportContext) -> Vec<PageLayout> {
    let bottom = PAGE_HEIGHT_MM - MARGIN_MM;
    let mut pages = Vec::new();
    let mut page = PageLayout::default();

    let header = [
        ("Vocabulary".to_string(), 20.0, TITLE_SIZE, true),
        (format!("Scope: {}", ctx.scope), 35.0, HEADER_SIZE, false),
        (format!("Generated: {}", ctx.date()), 45.0, HEADER_SIZE, false),
        (format!("Total: {} words", words.len()), 55.0, HEADER_SIZE, false),
    ];
    for (text, y, size, bold) in header {
        page.marks.push(Mark::Text {
            x: MARGIN_MM,
            y,
            size,
            bold,
            text,
        });
    }

    let mut y = FIRST_ENTRY_Y;
    for (index, word) in words.iter().enumerate() {
        let block = Block::of(index, word);
        if y + block.height() > bottom && y > MARGIN_MM {
            pages.push(std::mem::take(&mut page));
            y = MARGIN_MM;
        }

        for (text, size, advance, bold) in block.lines {
            page.marks.push(Mark::Text {
                x: MARGIN_MM,
                y,
                size,
                bold,
                text,
            });
            y += advance;
        }
        page.marks.push(Mark::Rule {
            x1: MARGIN_MM,
            x2: PAGE_WIDTH_MM - MARGIN_MM,
            y: y + RULE_OFFSET,
        });
        y += ENTRY_GAP;
    }
    pages.push(page);
    pages
}

/// Encode `text` for a WinAnsi Type1 font; characters outside Latin-1
/// become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u8::try_from(u32::from(c)) {
            Ok(b) if b >= 0x20 && !(0x7F..0xA0).contains(&b) => b,
            _ => b'?',
        })
        .collect()
}

fn to_pt_y(y_mm: f32) -> f32 {
    (PAGE_HEIGHT_MM - y_mm) * PT_PER_MM
}

fn page_content(page: &PageLayout) -> Content {
    let mut ops = Vec::new();
    for mark in &page.marks {
        match mark {
            Mark::Text {
                x,
                y,
                size,
                bold,
                text,
            } => {
                let font = if *bold { "F2" } else { "F1" };
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new("Tf", vec![font.into(), (*size).into()]));
                ops.push(Operation::new(
                    "Td",
                    vec![(x * PT_PER_MM).into(), to_pt_y(*y).into()],
                ));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(win_ansi(text), StringFormat::Literal)],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
            Mark::Rule { x1, x2, y } => {
                let grey: f32 = 200.0 / 255.0;
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new(
                    "RG",
                    vec![grey.into(), grey.into(), grey.into()],
                ));
                ops.push(Operation::new("w", vec![0.5_f32.into()]));
                ops.push(Operation::new(
                    "m",
                    vec![(x1 * PT_PER_MM).into(), to_pt_y(*y).into()],
                ));
                ops.push(Operation::new(
                    "l",
                    vec![(x2 * PT_PER_MM).into(), to_pt_y(*y).into()],
                ));
                ops.push(Operation::new("S", vec![]));
                ops.push(Operation::new("Q", vec![]));
            }
        }
    }
    Content { operations: ops }
}

/// # Errors
///
/// Returns an error only if content encoding or serialization fails.
pub fn render(words: &[Word], ctx: &ExportContext) -> Result<Vec<u8>, ExportError> {
    let pages = layout(words, ctx);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in &pages {
        let content = page_content(page).encode()?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = i64::try_from(kids.len()).unwrap_or(i64::MAX);
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                (PAGE_WIDTH_MM * PT_PER_MM).into(),
                (PAGE_HEIGHT_MM * PT_PER_MM).into(),
            ],
        }),
    );
    let catalog = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog);

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures;

    fn ctx() -> ExportContext {
        ExportContext::new("Travel", fixtures::at())
    }

    #[test]
    fn empty_list_is_single_header_page() {
        let pages = layout(&[], &ctx());
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].marks.len(), 4);

        let bytes = render(&[], &ctx()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn long_lists_paginate_without_crossing_bottom_margin() {
        let words: Vec<_> = (1..=25).map(fixtures::full).collect();
        let pages = layout(&words, &ctx());
        assert!(pages.len() > 1);
        for page in &pages {
            for mark in &page.marks {
                assert!(mark.y() <= PAGE_HEIGHT_MM - MARGIN_MM + RULE_OFFSET);
            }
        }

        let bytes = render(&words, &ctx()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), pages.len());
    }

    #[test]
    fn entries_are_never_split_across_pages() {
        let words: Vec<_> = (1..=25).map(fixtures::full).collect();
        let pages = layout(&words, &ctx());
        for page in &pages[1..] {
            match &page.marks[0] {
                Mark::Text { text, bold, .. } => {
                    assert!(*bold, "page starts mid-entry with {text}");
                }
                Mark::Rule { .. } => panic!("page starts with a rule"),
            }
        }
    }

    #[test]
    fn entry_lines_follow_fixed_order() {
        let pages = layout(&[fixtures::full(1)], &ctx());
        let texts: Vec<&str> = pages[0]
            .marks
            .iter()
            .filter_map(|m| match m {
                Mark::Text { text, .. } => Some(text.as_str()),
                Mark::Rule { .. } => None,
            })
            .skip(4)
            .collect();
        assert_eq!(texts[0], "1. itinerary");
        assert!(texts[1].starts_with("   Phonetic:"));
        assert!(texts[2].starts_with("   Meaning:"));
        assert!(texts[3].starts_with("   Example:"));
        assert!(texts[4].starts_with("   Translation:"));
        assert!(texts[5].starts_with("   Category:"));
        assert!(matches!(pages[0].marks.last(), Some(Mark::Rule { .. })));
    }

    #[test]
    fn wrap_respects_columns() {
        let text = "word ".repeat(50);
        let lines = wrap(&text, 20);
        assert!(lines.iter().all(|l| l.chars().count() <= 20));
        assert_eq!(lines.join(" "), text.trim());
        assert_eq!(wrap("", 20), [""]);
        assert_eq!(wrap(&"x".repeat(45), 20).len(), 3);
    }

    #[test]
    fn non_latin_text_is_replaced() {
        assert_eq!(win_ansi("café 词"), b"caf\xE9 ?");
    }
}
