//! Support for deriving an Atom feed from the posts of a build. See
//! [`FeedContext::build`] for the entry point; rendering the context into XML
//! lives in [`crate::write`].

use crate::env::BuildEnv;
use crate::tag_uri::TagUri;
use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, Timelike};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::ParseError;

/// The `xml:lang` of every feed.
pub const LANGUAGE: &str = "en-us";

/// The site-level settings a feed is derived from.
#[derive(Clone, Debug)]
pub struct FeedConfig {
    /// The project title, used as the feed title.
    pub title: String,

    /// The base URL of the site. Post links are formed by appending the
    /// document name, so this should end with a slash.
    pub website: String,

    /// The site tagline, used as the feed subtitle.
    pub subtitle: String,

    /// The rights statement of the feed.
    pub rights: String,

    /// The date minted into the feed-level tag URI.
    pub blog_date: String,

    /// The maximum number of entries in the feed.
    pub posts_per_page: usize,
}

/// One `<entry>` of the feed.
#[derive(Clone, Debug, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub id: String,
    pub link: String,

    /// The post summary. `None` and `Some("")` render differently.
    pub summary: Option<String>,

    /// Category labels followed by tag labels.
    pub categories: Vec<String>,
    pub published: String,

    /// The modification time of the post's source file.
    pub updated: String,
    pub author: String,
    pub content: String,
}

/// Everything the feed template needs.
#[derive(Clone, Debug, PartialEq)]
pub struct FeedContext {
    pub title: String,
    pub id: String,
    pub link: String,
    pub subtitle: String,
    pub rights: String,
    pub language: String,
    pub version: String,
    pub updated: String,
    pub entries: Vec<FeedEntry>,
}

impl FeedContext {
    /// Derives the feed from the first `posts_per_page` posts of `env`, in the
    /// order the host put them (most recent first). Returns `None` when the
    /// build has no posts.
    pub fn build(config: &FeedConfig, env: &BuildEnv) -> Result<Option<FeedContext>> {
        if env.blog_posts.is_empty() {
            debug!("no posts, nothing to syndicate");
            return Ok(None);
        }

        let tag = TagUri::parse(&config.website)?;
        let entries = env
            .blog_posts
            .iter()
            .take(config.posts_per_page)
            .map(|docname| feed_entry(config, env, &tag, docname))
            .collect::<Result<Vec<FeedEntry>>>()?;

        // The feed was last updated when its most recent post was.
        let updated = match entries.first() {
            Some(entry) => entry.updated.clone(),
            None => {
                debug!(
                    posts = env.blog_posts.len(),
                    posts_per_page = config.posts_per_page,
                    "no entries fit in the feed, skipping"
                );
                return Ok(None);
            }
        };

        Ok(Some(FeedContext {
            title: config.title.clone(),
            id: tag.feed_id(&config.blog_date),
            link: config.website.clone(),
            subtitle: config.subtitle.clone(),
            rights: config.rights.clone(),
            language: LANGUAGE.to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            updated,
            entries,
        }))
    }
}

fn feed_entry(
    config: &FeedConfig,
    env: &BuildEnv,
    tag: &TagUri,
    docname: &str,
) -> Result<FeedEntry> {
    let metadata = env
        .blog_metadata
        .get(docname)
        .ok_or_else(|| Error::MissingMetadata(docname.to_owned()))?;

    let published = isoformat(&metadata.date);
    let entry_date = published.split('T').next().unwrap_or_default();

    Ok(FeedEntry {
        title: env.titles.get(docname).cloned().unwrap_or_default(),
        id: tag.entry_id(entry_date, docname),
        link: format!("{}{}.html", config.website, docname),
        summary: metadata.summary.clone(),
        categories: metadata.filing.labels(),
        updated: modified(&env.source_path(docname))?,
        published,
        author: metadata.author.clone(),
        content: metadata.body.clone(),
    })
}

/// Formats a naive timestamp as ISO 8601. Fractional seconds are printed as
/// six digits (microseconds) when there are any, and left out otherwise.
pub fn isoformat(date: &NaiveDateTime) -> String {
    match date.nanosecond() {
        0 => date.format("%Y-%m-%dT%H:%M:%S").to_string(),
        _ => date.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
    }
}

/// Returns the modification time of `path` in the local time zone as an
/// ISO 8601 timestamp with offset. Sub-second precision is truncated to
/// microseconds and printed as six digits, or left out when it is zero.
fn modified(path: &Path) -> Result<String> {
    let mtime = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|err| Error::SourceFile {
            path: path.to_owned(),
            err,
        })?;
    let local = DateTime::<Local>::from(mtime);
    let local = local
        .with_nanosecond(local.nanosecond() / 1_000 * 1_000)
        .unwrap_or(local);
    let format = match local.nanosecond() {
        0 => SecondsFormat::Secs,
        _ => SecondsFormat::Micros,
    };
    Ok(local.to_rfc3339_opts(format, false))
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post's source file can't be stat'ed. A post without
    /// a backing file means the build environment is inconsistent.
    SourceFile { path: PathBuf, err: std::io::Error },

    /// Returned when a post is listed but has no metadata record.
    MissingMetadata(String),

    /// Returned when the site URL can't be parsed.
    Url(ParseError),

    /// Returned when the feed template can't be parsed or executed.
    Template(String),

    /// Returned for other I/O errors, e.g., writing the feed file.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::SourceFile { path, err } => {
                write!(f, "Reading source file '{}': {}", path.display(), err)
            }
            Error::MissingMetadata(docname) => {
                write!(f, "No metadata for post '{}'", docname)
            }
            Error::Url(err) => write!(f, "Parsing site URL: {}", err),
            Error::Template(err) => write!(f, "Rendering feed template: {}", err),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::SourceFile { path: _, err } => Some(err),
            Error::MissingMetadata(_) => None,
            Error::Url(err) => Some(err),
            Error::Template(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator in fallible feed operations.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator when parsing the site URL.
    fn from(err: ParseError) -> Error {
        Error::Url(err)
    }
}
