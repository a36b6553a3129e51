use std::fmt::Write as _;

use super::{ExportContext, Fields};
use crate::model::Word;

/// Markdown document: heading, scope/date/total lines, then one `## N. word`
/// section per entry separated by `---` rules. Empty optional fields are
/// left out of an entry.
#[must_use]
pub fn render(words: &[Word], ctx: &ExportContext) -> String {
    let mut md = String::from("# Vocabulary\n\n");
    let _ = writeln!(md, "**Scope:** {}  ", ctx.scope);
    let _ = writeln!(md, "**Generated:** {}  ", ctx.date());
    let _ = writeln!(md, "**Total:** {} words\n", words.len());
    md.push_str("---\n\n");

    for (index, word) in words.iter().enumerate() {
        let fields = Fields::of(word);
        let _ = writeln!(md, "## {}. {}\n", index + 1, fields.word);
        if !fields.phonetic.is_empty() {
            let _ = writeln!(md, "**Phonetic:** `{}`\n", fields.phonetic);
        }
        let _ = writeln!(md, "**Meaning:** {}\n", fields.meaning);
        if !fields.example.is_empty() {
            let _ = writeln!(md, "**Example:** {}\n", fields.example);
        }
        if !fields.example_translation.is_empty() {
            let _ = writeln!(
                md,
                "**Example translation:** {}\n",
                fields.example_translation
            );
        }
        if !fields.category.is_empty() {
            let _ = writeln!(md, "**Category:** {}\n", fields.category);
        }
        md.push_str("---\n\n");
    }
    md
}
