//! Front-matter and body rendering.
//!
//! A rendered document looks like:
//!
//! ```text
//! ---
//! title: "A \"quoted\" title"
//! collection: talks
//! permalink: /talks/2021-06-01-a-quoted-title
//! date: 2021-06-01
//! ---
//!
//! [More information here](https://example.org)
//!
//! Description paragraph.
//! ```
//!
//! Sections are separated by one blank line and the file ends with exactly
//! one newline. With no body sections the document is the front matter alone.

use crate::dates::validate_iso_date;
use crate::naming::{DocumentName, slugify};
use crate::record::{NormalizedRecord, RecordError};
use crate::schema::{BodySection, DocumentSchema, FrontMatterField};
use crate::types::RenderedDocument;
use maud::html;

/// Front-matter block delimiter.
pub const DELIMITER: &str = "---";

/// Escape a value for a double-quoted scalar.
///
/// Backslashes must be doubled before quotes are escaped; the other order
/// would double the backslash that escapes each quote.
pub fn escape_scalar(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// `"<escaped text>"`
pub fn quote_scalar(text: &str) -> String {
    format!("\"{}\"", escape_scalar(text))
}

/// Google Scholar search link for a title with no paper URL.
fn scholar_search(title: &str) -> String {
    // maud leaves single quotes alone.
    let query = html! { (title.replace(' ', "+")) }
        .into_string()
        .replace('\'', "&#x27;");
    format!(
        "Use [Google Scholar](https://scholar.google.com/scholar?q={query}) for full citation"
    )
}

fn front_matter_line(
    field: &FrontMatterField,
    record: &NormalizedRecord,
    permalink: &str,
    date: &str,
) -> Option<String> {
    match field {
        FrontMatterField::Quoted { key, field } => {
            Some(format!("{key}: {}", quote_scalar(record.get(field))))
        }
        FrontMatterField::OptionalQuoted { key, field } => {
            let value = record.get(field);
            (!value.is_empty()).then(|| format!("{key}: {}", quote_scalar(value)))
        }
        FrontMatterField::QuotedOr {
            key,
            field,
            default,
        } => {
            let value = record.get(field);
            let value = if value.is_empty() { default } else { value };
            Some(format!("{key}: {}", quote_scalar(value)))
        }
        FrontMatterField::Literal { key, value } => Some(format!("{key}: {value}")),
        FrontMatterField::Permalink => Some(format!("permalink: {permalink}")),
        FrontMatterField::Date => Some(format!("date: {date}")),
    }
}

fn body_section(
    section: &BodySection,
    record: &NormalizedRecord,
    title: &str,
) -> Option<String> {
    match section {
        BodySection::Link { field, label } => {
            let url = record.get(field);
            (!url.is_empty()).then(|| format!("[{label}]({url})"))
        }
        BodySection::Text { field } => {
            let value = record.get(field);
            (!value.is_empty()).then(|| value.to_string())
        }
        BodySection::Prefixed { field, prefix } => {
            let value = record.get(field);
            (!value.is_empty()).then(|| format!("{prefix}{value}"))
        }
        BodySection::LinkOrScholarSearch { field, label } => {
            let url = record.get(field);
            if url.is_empty() {
                Some(scholar_search(title))
            } else {
                Some(format!("[{label}]({url})"))
            }
        }
    }
}

/// Join front-matter lines and body sections into the final text.
pub fn compose(front_matter: &[String], body: &[String]) -> String {
    let mut document = String::from(DELIMITER);
    document.push('\n');
    for line in front_matter {
        document.push_str(line);
        document.push('\n');
    }
    document.push_str(DELIMITER);
    if !body.is_empty() {
        document.push_str("\n\n");
        document.push_str(&body.join("\n\n"));
    }
    let trimmed_len = document.trim_end().len();
    document.truncate(trimmed_len);
    document.push('\n');
    document
}

/// Render one record as described by `schema`.
///
/// Fails when a required field is empty or the date is not a real calendar
/// date; everything else about a record is optional.
pub fn render_document(
    schema: &DocumentSchema,
    record: &NormalizedRecord,
) -> Result<RenderedDocument, RecordError> {
    let missing = record.missing(&schema.required);
    if !missing.is_empty() {
        return Err(RecordError::MissingRequiredValue(missing));
    }

    let date = validate_iso_date(record.get(&schema.date_field))?;
    let title = record.get(&schema.title_field);
    let slug = match schema.slug_field.as_deref().map(|f| record.get(f)) {
        Some(custom) if !custom.is_empty() => custom.to_string(),
        _ => slugify(title, &schema.slug_fallback),
    };

    let name = DocumentName::new(date, &slug);
    let permalink = name.permalink(&schema.permalink_prefix);

    let front_matter: Vec<String> = schema
        .front_matter
        .iter()
        .filter_map(|field| front_matter_line(field, record, &permalink, date))
        .collect();
    let body: Vec<String> = schema
        .body
        .iter()
        .filter_map(|section| body_section(section, record, title))
        .collect();

    Ok(RenderedDocument {
        filename: name.filename(),
        content: compose(&front_matter, &body),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn unescape(scalar: &str) -> String {
        let inner = &scalar[1..scalar.len() - 1];
        inner.replace("\\\"", "\"").replace("\\\\", "\\")
    }

    fn publication() -> Record {
        Record::new()
            .with("pub_date", "2021-03-04")
            .with("title", "Fast Things")
            .with("venue", "Journal of Speed")
            .with("citation", "Doe, J. (2021). Fast Things.")
    }

    #[test]
    fn escaping_doubles_backslashes_before_quotes() {
        assert_eq!(escape_scalar(r#"a\"b"#), r#"a\\\"b"#);
        assert_eq!(quote_scalar("plain"), "\"plain\"");
    }

    #[test]
    fn escaping_round_trips() {
        let title = r#"The "Best" \path\ to C:\dir"#;
        let quoted = quote_scalar(title);
        assert!(quoted.starts_with('"') && quoted.ends_with('"'));
        assert_eq!(unescape(&quoted), title);
    }

    #[test]
    fn publication_document_layout() {
        let doc = render_document(&DocumentSchema::publications(), &publication().normalized())
            .unwrap();

        assert_eq!(doc.filename, "2021-03-04-fast-things.md");
        assert_eq!(
            doc.content,
            "---\n\
             title: \"Fast Things\"\n\
             collection: publications\n\
             permalink: /publication/2021-03-04-fast-things\n\
             date: 2021-03-04\n\
             venue: \"Journal of Speed\"\n\
             citation: \"Doe, J. (2021). Fast Things.\"\n\
             ---\n\
             \n\
             Recommended citation: Doe, J. (2021). Fast Things.\n"
        );
    }

    #[test]
    fn publication_optional_fields_in_order() {
        let record = publication()
            .with("excerpt", "Short summary.")
            .with("paper_url", "https://x.org/p.pdf")
            .with("slides_url", "https://x.org/s.pdf")
            .normalized();
        let doc = render_document(&DocumentSchema::publications(), &record).unwrap();

        let front: Vec<&str> = doc.content.lines().take(11).collect();
        assert_eq!(front[6], "excerpt: \"Short summary.\"");
        assert_eq!(front[7], "paperurl: \"https://x.org/p.pdf\"");
        assert_eq!(front[8], "slidesurl: \"https://x.org/s.pdf\"");
        assert_eq!(front[9], "citation: \"Doe, J. (2021). Fast Things.\"");
        assert!(doc.content.ends_with(
            "---\n\n[Download paper](https://x.org/p.pdf)\n\n\
             [Download slides](https://x.org/s.pdf)\n\n\
             Short summary.\n\n\
             Recommended citation: Doe, J. (2021). Fast Things.\n"
        ));
    }

    #[test]
    fn url_slug_overrides_title_slug() {
        let record = publication().with("url_slug", "custom-slug").normalized();
        let doc = render_document(&DocumentSchema::publications(), &record).unwrap();
        assert_eq!(doc.filename, "2021-03-04-custom-slug.md");
        assert!(doc.content.contains("permalink: /publication/2021-03-04-custom-slug\n"));
    }

    #[test]
    fn talk_without_body_is_front_matter_only() {
        let record = Record::new()
            .with("title", "Hello")
            .with("date", "2022-10-01")
            .normalized();
        let doc = render_document(&DocumentSchema::talks(), &record).unwrap();
        assert_eq!(
            doc.content,
            "---\n\
             title: \"Hello\"\n\
             collection: talks\n\
             type: \"Talk\"\n\
             permalink: /talks/2022-10-01-hello\n\
             date: 2022-10-01\n\
             ---\n"
        );
    }

    #[test]
    fn talk_with_location_and_body() {
        let record = Record::new()
            .with("title", "Hello")
            .with("date", "2022-10-01")
            .with("type", "Tutorial")
            .with("location", "Paris, France")
            .with("talk_url", "https://t.org")
            .with("description", "  Words.  ")
            .normalized();
        let doc = render_document(&DocumentSchema::talks(), &record).unwrap();
        assert!(doc.content.contains("type: \"Tutorial\"\n"));
        assert!(doc.content.contains("location: \"Paris, France\"\n---\n"));
        assert!(
            doc.content
                .ends_with("---\n\n[More information here](https://t.org)\n\nWords.\n")
        );
    }

    #[test]
    fn missing_required_values_are_reported_in_order() {
        let record = Record::new().with("title", "nan").normalized();
        let err = render_document(&DocumentSchema::talks(), &record).unwrap_err();
        match err {
            RecordError::MissingRequiredValue(fields) => assert_eq!(fields, ["title", "date"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_iso_date_is_rejected() {
        let record = publication().with("pub_date", "2021-02-30").normalized();
        assert!(matches!(
            render_document(&DocumentSchema::publications(), &record),
            Err(RecordError::InvalidDate { .. })
        ));
    }

    #[test]
    fn bibtex_without_url_links_scholar_search() {
        let record = Record::new()
            .with("title", "Cats & Dogs")
            .with("date", "2019-05-01")
            .with("venue", "Pets Journal")
            .with("citation", "\"Cats & Dogs.\" Pets Journal 2019.")
            .normalized();
        let doc = render_document(&DocumentSchema::bibtex("publications", "/publication/"), &record)
            .unwrap();
        assert!(doc.content.contains(
            "Use [Google Scholar](https://scholar.google.com/scholar?q=Cats+&amp;+Dogs) for full citation\n"
        ));
        assert!(!doc.content.contains("paperurl"));
    }

    #[test]
    fn scholar_query_escapes_single_quotes() {
        assert_eq!(
            scholar_search("Don't Panic"),
            "Use [Google Scholar](https://scholar.google.com/scholar?q=Don&#x27;t+Panic) for full citation"
        );
        assert_eq!(
            scholar_search("\"A\" <b> 'c'"),
            "Use [Google Scholar](https://scholar.google.com/scholar?q=&quot;A&quot;+&lt;b&gt;+&#x27;c&#x27;) for full citation"
        );
    }

    #[test]
    fn bibtex_with_note_and_url() {
        let record = Record::new()
            .with("title", "T")
            .with("date", "2019-05-01")
            .with("venue", "V")
            .with("citation", "C")
            .with("note", "Best paper award")
            .with("url", "https://doi.org/1")
            .normalized();
        let doc = render_document(&DocumentSchema::bibtex("publications", "/publication/"), &record)
            .unwrap();
        assert!(doc.content.contains("excerpt: \"Best paper award\"\npaperurl: \"https://doi.org/1\"\ncitation: \"C\"\n"));
        assert!(
            doc.content
                .ends_with("---\n\nBest paper award\n\n[Access paper here](https://doi.org/1)\n")
        );
    }

    #[test]
    fn compose_trims_trailing_whitespace_to_one_newline() {
        let text = compose(&["a: 1".into()], &["body  \n\n".into()]);
        assert_eq!(text, "---\na: 1\n---\n\nbody\n");
    }
}
