//! Spreadsheet-friendly CSV: UTF-8 with BOM, every field quoted, `\n` rows.

use ::csv::{QuoteStyle, Terminator, WriterBuilder};

use super::{ExportContext, ExportError, Fields};
use crate::model::Word;

/// UTF-8 byte-order mark; spreadsheet apps use it to detect the encoding.
pub const BOM: &[u8] = b"\xEF\xBB\xBF";

pub const HEADERS: [&str; 8] = [
    "word",
    "phonetic",
    "meaning",
    "example",
    "example_translation",
    "category",
    "created_at",
    "upvotes",
];

/// # Errors
///
/// Returns an error only if the CSV writer fails.
pub fn render(words: &[Word], _ctx: &ExportContext) -> Result<Vec<u8>, ExportError> {
    let mut out = BOM.to_vec();
    {
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(&mut out);

        writer.write_record(HEADERS)?;
        for word in words {
            let fields = Fields::of(word);
            let created = word.created_at.format("%Y-%m-%d").to_string();
            let upvotes = word.upvotes.to_string();
            writer.write_record([
                fields.word,
                fields.phonetic,
                fields.meaning,
                fields.example,
                fields.example_translation,
                fields.category,
                created.as_str(),
                upvotes.as_str(),
            ])?;
        }
        writer.flush()?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures;

    fn text(bytes: &[u8]) -> &str {
        std::str::from_utf8(bytes.strip_prefix(BOM).unwrap()).unwrap()
    }

    #[test]
    fn starts_with_bom_and_header() {
        let ctx = ExportContext::new("all", fixtures::at());
        let bytes = render(&[], &ctx).unwrap();
        assert!(bytes.starts_with(BOM));
        assert_eq!(
            text(&bytes),
            "\"word\",\"phonetic\",\"meaning\",\"example\",\"example_translation\",\"category\",\"created_at\",\"upvotes\"\n"
        );
    }

    #[test]
    fn quotes_commas_and_escapes_quotes() {
        let ctx = ExportContext::new("all", fixtures::at());
        let words = [fixtures::word(1, "a,b", "x\"y")];
        let bytes = render(&words, &ctx).unwrap();
        let row = text(&bytes).lines().nth(1).unwrap();
        assert_eq!(row, r#""a,b","","x""y","","","","2024-03-09","0""#);
    }

    #[test]
    fn full_row_keeps_column_order() {
        let ctx = ExportContext::new("Travel", fixtures::at());
        let bytes = render(&[fixtures::full(1)], &ctx).unwrap();
        let row = text(&bytes).lines().nth(1).unwrap();
        assert!(row.starts_with("\"itinerary\",\"/aɪˈtɪnəˌrɛri/\",\"a planned route"));
        assert!(row.ends_with("\"Travel\",\"2024-03-09\",\"7\""));
    }

    #[test]
    fn embedded_newlines_stay_in_one_field() {
        let ctx = ExportContext::new("all", fixtures::at());
        let words = [fixtures::word(1, "line", "one\ntwo")];
        let bytes = render(&words, &ctx).unwrap();

        let mut reader = ::csv::Reader::from_reader(bytes.strip_prefix(BOM).unwrap());
        let rows: Vec<::csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][2], "one\ntwo");
    }
}
