//! Citation strings for BibTeX-sourced publications.

use crate::record::normalize;

/// One author as the bibliography parser split it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    pub first: String,
    pub last: String,
}

impl Author {
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            last: last.into(),
        }
    }

    /// `first last`, normalized; empty when both parts are.
    pub fn full_name(&self) -> String {
        let first = normalize(Some(&self.first));
        let last = normalize(Some(&self.last));
        normalize(Some(&format!("{first} {last}")))
    }
}

/// `Authors, "Title." Venue year.` with empty segments left out.
pub fn build_citation(authors: &[Author], title: &str, venue: &str, year: &str) -> String {
    let author_text = authors
        .iter()
        .map(Author::full_name)
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    let quoted_title = format!("\"{title}.\"");
    let dated_year = format!("{year}.");
    [author_text.as_str(), &quoted_title, venue, &dated_year]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_citation() {
        let authors = [Author::new("Ada", "Lovelace"), Author::new("Charles", "Babbage")];
        assert_eq!(
            build_citation(&authors, "Notes on the Engine", "Journal of Machines", "1843"),
            "Ada Lovelace, Charles Babbage \"Notes on the Engine.\" Journal of Machines 1843."
        );
    }

    #[test]
    fn empty_author_list_has_no_leading_segment() {
        assert_eq!(
            build_citation(&[], "Solo", "Venue", "2020"),
            "\"Solo.\" Venue 2020."
        );
    }

    #[test]
    fn blank_authors_are_dropped() {
        let authors = [
            Author::new("", " "),
            Author::new("Grace", "Hopper"),
            Author::new("nan", "None"),
        ];
        assert_eq!(
            build_citation(&authors, "Compilers", "", "1952"),
            "Grace Hopper \"Compilers.\" 1952."
        );
    }

    #[test]
    fn single_name_author() {
        assert_eq!(Author::new("", "Plato").full_name(), "Plato");
    }
}
