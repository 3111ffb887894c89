//! Declarative descriptions of the document kinds.
//!
//! Publications, talks and BibTeX publications differ only in which fields
//! they require, which front-matter keys they emit (and in what order), and
//! which body sections follow. A [`DocumentSchema`] captures exactly that, and
//! [`render_document`](crate::render::render_document) is the one renderer
//! that reads it.

/// One `key: value` line of the front matter, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontMatterField {
    /// Quoted value of a required field; always emitted.
    Quoted { key: String, field: String },
    /// Quoted value, emitted only when the field is non-empty.
    OptionalQuoted { key: String, field: String },
    /// Quoted value, `default` when the field is empty.
    QuotedOr {
        key: String,
        field: String,
        default: String,
    },
    /// Bare constant, e.g. `collection: talks`.
    Literal { key: String, value: String },
    /// `permalink: <prefix><stem>`
    Permalink,
    /// `date: YYYY-MM-DD`
    Date,
}

/// One paragraph of the document body. Empty sections are left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodySection {
    /// `[label](value)`
    Link { field: String, label: String },
    /// The value itself.
    Text { field: String },
    /// `<prefix><value>`
    Prefixed { field: String, prefix: String },
    /// `[label](value)`, or a Google Scholar search for the title when the
    /// field is empty.
    LinkOrScholarSearch { field: String, label: String },
}

/// Everything that distinguishes one kind of generated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSchema {
    /// Label used in the summary line (`publications`, `talks`, ...).
    pub name: String,
    pub permalink_prefix: String,
    /// Slug used when the title yields nothing.
    pub slug_fallback: String,
    /// Field holding the `YYYY-MM-DD` date.
    pub date_field: String,
    /// Field holding the title the slug is derived from.
    pub title_field: String,
    /// Field whose non-empty value replaces the derived slug.
    pub slug_field: Option<String>,
    /// Fields that must be non-empty for a record to be rendered.
    pub required: Vec<String>,
    pub front_matter: Vec<FrontMatterField>,
    pub body: Vec<BodySection>,
}

fn quoted(key: &str, field: &str) -> FrontMatterField {
    FrontMatterField::Quoted {
        key: key.into(),
        field: field.into(),
    }
}

fn optional(key: &str, field: &str) -> FrontMatterField {
    FrontMatterField::OptionalQuoted {
        key: key.into(),
        field: field.into(),
    }
}

fn literal(key: &str, value: &str) -> FrontMatterField {
    FrontMatterField::Literal {
        key: key.into(),
        value: value.into(),
    }
}

fn link(field: &str, label: &str) -> BodySection {
    BodySection::Link {
        field: field.into(),
        label: label.into(),
    }
}

fn text(field: &str) -> BodySection {
    BodySection::Text {
        field: field.into(),
    }
}

fn strings(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

impl DocumentSchema {
    /// Publications from `publications.tsv`.
    pub fn publications() -> Self {
        Self {
            name: "publications".into(),
            permalink_prefix: "/publication/".into(),
            slug_fallback: "publication".into(),
            date_field: "pub_date".into(),
            title_field: "title".into(),
            slug_field: Some("url_slug".into()),
            required: strings(&["pub_date", "title", "venue", "citation"]),
            front_matter: vec![
                quoted("title", "title"),
                literal("collection", "publications"),
                FrontMatterField::Permalink,
                FrontMatterField::Date,
                quoted("venue", "venue"),
                optional("excerpt", "excerpt"),
                optional("paperurl", "paper_url"),
                optional("slidesurl", "slides_url"),
                quoted("citation", "citation"),
            ],
            body: vec![
                link("paper_url", "Download paper"),
                link("slides_url", "Download slides"),
                text("excerpt"),
                BodySection::Prefixed {
                    field: "citation".into(),
                    prefix: "Recommended citation: ".into(),
                },
            ],
        }
    }

    /// Talks from `talks.tsv`.
    pub fn talks() -> Self {
        Self {
            name: "talks".into(),
            permalink_prefix: "/talks/".into(),
            slug_fallback: "talk".into(),
            date_field: "date".into(),
            title_field: "title".into(),
            slug_field: Some("url_slug".into()),
            required: strings(&["title", "date"]),
            front_matter: vec![
                quoted("title", "title"),
                literal("collection", "talks"),
                FrontMatterField::QuotedOr {
                    key: "type".into(),
                    field: "type".into(),
                    default: "Talk".into(),
                },
                FrontMatterField::Permalink,
                FrontMatterField::Date,
                optional("venue", "venue"),
                optional("location", "location"),
            ],
            body: vec![link("talk_url", "More information here"), text("description")],
        }
    }

    /// Publications from one BibTeX source.
    ///
    /// The entry is flattened beforehand into `title`, `date`, `venue`,
    /// `citation`, `note` and `url` fields.
    pub fn bibtex(collection_name: &str, collection_permalink: &str) -> Self {
        Self {
            name: "pubsFromBib".into(),
            permalink_prefix: collection_permalink.into(),
            slug_fallback: "publication".into(),
            date_field: "date".into(),
            title_field: "title".into(),
            slug_field: None,
            // Title and venue presence is checked while flattening the entry.
            required: strings(&["date"]),
            front_matter: vec![
                quoted("title", "title"),
                literal("collection", collection_name),
                FrontMatterField::Permalink,
                FrontMatterField::Date,
                quoted("venue", "venue"),
                optional("excerpt", "note"),
                optional("paperurl", "url"),
                quoted("citation", "citation"),
            ],
            body: vec![
                text("note"),
                BodySection::LinkOrScholarSearch {
                    field: "url".into(),
                    label: "Access paper here".into(),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_fields_per_kind() {
        assert_eq!(
            DocumentSchema::publications().required,
            ["pub_date", "title", "venue", "citation"]
        );
        assert_eq!(DocumentSchema::talks().required, ["title", "date"]);
    }

    #[test]
    fn bibtex_schema_uses_source_collection() {
        let schema = DocumentSchema::bibtex("papers", "/papers/");
        assert_eq!(schema.permalink_prefix, "/papers/");
        assert!(schema.front_matter.contains(&FrontMatterField::Literal {
            key: "collection".into(),
            value: "papers".into()
        }));
        assert!(schema.slug_field.is_none());
    }

    #[test]
    fn every_kind_emits_title_first() {
        for schema in [
            DocumentSchema::publications(),
            DocumentSchema::talks(),
            DocumentSchema::bibtex("publications", "/publication/"),
        ] {
            assert_eq!(schema.front_matter[0], quoted("title", "title"), "{}", schema.name);
        }
    }
}
