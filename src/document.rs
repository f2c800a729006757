//! Defines the [`Document`] type and the parsing of post source files. A
//! post source file is structured as follows:
//!
//! 1. Initial frontmatter fence (`---`)
//! 2. YAML frontmatter with fields `Title`, `Date`, and optionally `Author`,
//!    `Categories` and `Tags`
//! 3. Terminal frontmatter fence (`---`)
//! 4. Markdown body, possibly containing directive lines
//!
//! For example:
//!
//! ```md
//! ---
//! Title: Hello, world!
//! Date: 2013-05-01T10:00:00
//! Categories: [Python]
//! ---
//! .. summary:: A first post.
//!
//! # Hello
//! ```
//!
//! A directive line starts at column 0 with `.. name::`; the whitespace
//! separated words after `::` are its arguments.

use crate::env::{Filing, FilingPair, Metadata};
use chrono::{NaiveDate, NaiveDateTime, ParseError};
use pulldown_cmark::{html, Options, Parser};
use serde::Deserialize;
use std::fmt;

/// A directive occurrence in a document body.
#[derive(Clone, Debug, PartialEq)]
pub struct Directive {
    pub name: String,
    pub arguments: Vec<String>,
}

impl Directive {
    /// Parses a directive line, returning `None` for ordinary lines.
    fn parse(line: &str) -> Option<Directive> {
        let rest = line.strip_prefix(".. ")?;
        let (name, arguments) = rest.split_once("::")?;
        if name.is_empty() || name.contains(char::is_whitespace) {
            return None;
        }
        Some(Directive {
            name: name.to_owned(),
            arguments: arguments.split_whitespace().map(String::from).collect(),
        })
    }

    /// The arguments as string slices, the form hooks take them in.
    pub fn argument_strs(&self) -> Vec<&str> {
        self.arguments.iter().map(String::as_str).collect()
    }
}

/// A parsed post source file.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    /// The plain-text title.
    pub title: String,

    /// The metadata record. The summary is always `None` here; it's set by
    /// the directive hook.
    pub metadata: Metadata,

    /// The directives named in `known`, in document order.
    pub directives: Vec<Directive>,

    /// Directive lines with names not in `known`. These are left in the
    /// body.
    pub unknown_directives: Vec<String>,
}

#[derive(Deserialize)]
struct Frontmatter {
    #[serde(rename = "Title")]
    title: String,

    #[serde(rename = "Date")]
    date: String,

    #[serde(default, rename = "Author")]
    author: Option<String>,

    #[serde(default, rename = "Categories")]
    categories: Vec<String>,

    #[serde(default, rename = "Tags")]
    tags: Vec<String>,
}

impl Document {
    /// Parses a post. `known` lists the directive names the host has
    /// handlers for; `default_author` applies when the frontmatter names no
    /// author.
    pub fn parse(input: &str, known: &[&str], default_author: &str) -> Result<Document> {
        fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
            const FENCE: &str = "---";
            if !input.starts_with(FENCE) {
                return Err(Error::FrontmatterMissingStartFence);
            }
            match input[FENCE.len()..].find(FENCE) {
                None => Err(Error::FrontmatterMissingEndFence),
                Some(offset) => Ok((
                    FENCE.len(),                        // yaml_start
                    FENCE.len() + offset,               // yaml_stop
                    FENCE.len() + offset + FENCE.len(), // body_start
                )),
            }
        }

        let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
        let frontmatter: Frontmatter = serde_yaml::from_str(&input[yaml_start..yaml_stop])?;

        let mut directives = Vec::new();
        let mut unknown_directives = Vec::new();
        let mut markdown = String::with_capacity(input.len() - body_start);
        let mut fenced = false;
        for line in input[body_start..].lines() {
            if line.starts_with("```") || line.starts_with("~~~") {
                fenced = !fenced;
            }
            match Directive::parse(line).filter(|_| !fenced) {
                Some(directive) if known.contains(&directive.name.as_str()) => {
                    directives.push(directive)
                }
                Some(directive) => {
                    unknown_directives.push(directive.name);
                    markdown.push_str(line);
                    markdown.push('\n');
                }
                None => {
                    markdown.push_str(line);
                    markdown.push('\n');
                }
            }
        }

        let mut metadata = Metadata::new(
            parse_date(&frontmatter.date)?,
            frontmatter
                .author
                .unwrap_or_else(|| default_author.to_owned()),
        );
        metadata.filing = Filing {
            categories: filing_pairs(&frontmatter.categories),
            tags: filing_pairs(&frontmatter.tags),
        };
        metadata.body = to_html(&markdown);

        Ok(Document {
            title: frontmatter.title,
            metadata,
            directives,
            unknown_directives,
        })
    }
}

fn filing_pairs(labels: &[String]) -> Vec<FilingPair> {
    labels
        .iter()
        .map(|label| (slug::slugify(label), label.clone()))
        .collect()
}

/// Parses a frontmatter date. Dates without a time are taken at midnight.
fn parse_date(date: &str) -> Result<NaiveDateTime> {
    const FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];
    let date = date.trim();
    for format in FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(date, format) {
            return Ok(parsed);
        }
    }
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")?;
    day.and_hms_opt(0, 0, 0)
        .ok_or_else(|| Error::InvalidDate(date.to_owned()))
}

fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut body = String::new();
    html::push_html(&mut body, Parser::new_ext(markdown, options));
    body
}

/// Represents the result of a [`Document`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Document`].
#[derive(Debug)]
pub enum Error {
    /// Returned when a post source file is missing its starting frontmatter
    /// fence (`---`).
    FrontmatterMissingStartFence,

    /// Returned when a post source file is missing its terminal frontmatter
    /// fence (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when the frontmatter `Date` isn't a recognized date.
    DateTimeParse(ParseError),

    /// Returned when the frontmatter `Date` parses but isn't a valid
    /// timestamp.
    InvalidDate(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => {
                write!(f, "Post must begin with `---`")
            }
            Error::FrontmatterMissingEndFence => {
                write!(f, "Missing closing `---`")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::DateTimeParse(err) => write!(f, "Parsing `Date`: {}", err),
            Error::InvalidDate(date) => write!(f, "Invalid `Date`: {}", date),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingStartFence => None,
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::DateTimeParse(err) => Some(err),
            Error::InvalidDate(_) => None,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<ParseError> for Error {
    /// Converts a [`ParseError`] into an [`Error`]. It allows us to use the
    /// `?` operator when parsing dates.
    fn from(err: ParseError) -> Error {
        Error::DateTimeParse(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const KNOWN: &[&str] = &["summary"];

    #[test]
    fn test_parse_post() -> Result<()> {
        let doc = Document::parse(
            "---\n\
             Title: Hello, world!\n\
             Date: 2013-05-01T10:00:00\n\
             Author: Alice\n\
             Categories: [Python]\n\
             Tags: [Open Source, GIS]\n\
             ---\n\
             .. summary:: A   first\tpost.\n\
             \n\
             Some *text*.\n",
            KNOWN,
            "Nobody",
        )?;

        assert_eq!(doc.title, "Hello, world!");
        assert_eq!(doc.metadata.date.to_string(), "2013-05-01 10:00:00");
        assert_eq!(doc.metadata.author, "Alice");
        assert_eq!(
            doc.metadata.filing.categories,
            vec![("python".to_owned(), "Python".to_owned())]
        );
        assert_eq!(
            doc.metadata.filing.tags,
            vec![
                ("open-source".to_owned(), "Open Source".to_owned()),
                ("gis".to_owned(), "GIS".to_owned()),
            ]
        );
        assert_eq!(
            doc.directives,
            vec![Directive {
                name: "summary".to_owned(),
                arguments: vec!["A".to_owned(), "first".to_owned(), "post.".to_owned()],
            }]
        );
        assert_eq!(doc.metadata.summary, None);
        assert_eq!(doc.metadata.body, "<p>Some <em>text</em>.</p>\n");
        Ok(())
    }

    #[test]
    fn test_directive_without_arguments() -> Result<()> {
        let doc = Document::parse(
            "---\nTitle: T\nDate: 2013-05-01\n---\n.. summary::\nBody\n",
            KNOWN,
            "Nobody",
        )?;
        assert_eq!(doc.directives.len(), 1);
        assert!(doc.directives[0].arguments.is_empty());
        assert_eq!(doc.metadata.author, "Nobody");
        assert_eq!(doc.metadata.date.to_string(), "2013-05-01 00:00:00");
        Ok(())
    }

    #[test]
    fn test_unknown_and_fenced_directives_stay_in_body() -> Result<()> {
        let doc = Document::parse(
            "---\nTitle: T\nDate: 2013-05-01\n---\n\
             .. note:: something\n\
             \n\
             ```\n\
             .. summary:: not a directive\n\
             ```\n",
            KNOWN,
            "Nobody",
        )?;
        assert!(doc.directives.is_empty());
        assert_eq!(doc.unknown_directives, vec!["note"]);
        assert!(doc.metadata.body.contains(".. note:: something"));
        assert!(doc.metadata.body.contains(".. summary:: not a directive"));
        Ok(())
    }

    #[test]
    fn test_directive_parse() {
        assert_eq!(Directive::parse("plain text"), None);
        assert_eq!(Directive::parse("..summary:: x"), None);
        assert_eq!(Directive::parse(".. two words:: x"), None);
        assert_eq!(Directive::parse(" .. summary:: x"), None);
        assert_eq!(
            Directive::parse(".. summary:: x y").map(|d| d.argument_strs().join("|")),
            Some("x|y".to_owned())
        );
    }

    #[test]
    fn test_missing_fences() {
        assert!(matches!(
            Document::parse("Title: T\n", KNOWN, ""),
            Err(Error::FrontmatterMissingStartFence)
        ));
        assert!(matches!(
            Document::parse("---\nTitle: T\n", KNOWN, ""),
            Err(Error::FrontmatterMissingEndFence)
        ));
    }

    #[test]
    fn test_bad_date() {
        assert!(matches!(
            Document::parse("---\nTitle: T\nDate: yesterday\n---\n", KNOWN, ""),
            Err(Error::DateTimeParse(_))
        ));
    }

    #[test]
    fn test_date_formats() -> Result<()> {
        assert_eq!(
            parse_date("2013-05-01 10:30")?.to_string(),
            "2013-05-01 10:30:00"
        );
        assert_eq!(
            parse_date("2013-05-01 10:30:15")?.to_string(),
            "2013-05-01 10:30:15"
        );
        assert_eq!(
            parse_date(" 2013-05-01T10:30:15.5 ")?.to_string(),
            "2013-05-01 10:30:15.500"
        );
        Ok(())
    }
}
