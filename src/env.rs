//! Defines the [`BuildEnv`] type, the per-build state shared between the host
//! and the extension. The host populates it while parsing documents; the
//! extension mutates [`Metadata::summary`] during parsing and reads everything
//! else once the build has finished.

use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A `(key, label)` pair filing a post under a category or tag. The key is
/// the slugified label.
pub type FilingPair = (String, String);

/// Categorization data attached to a post.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filing {
    pub categories: Vec<FilingPair>,
    pub tags: Vec<FilingPair>,
}

impl Filing {
    /// Returns the category labels followed by the tag labels, dropping the
    /// keys.
    pub fn labels(&self) -> Vec<String> {
        self.categories
            .iter()
            .chain(self.tags.iter())
            .map(|(_, label)| label.clone())
            .collect()
    }
}

/// The metadata record for a single post.
#[derive(Clone, Debug, PartialEq)]
pub struct Metadata {
    /// The publish date of the post.
    pub date: NaiveDateTime,

    /// The author of the post.
    pub author: String,

    /// The fully rendered (HTML) body of the post.
    pub body: String,

    /// Categories and tags.
    pub filing: Filing,

    /// The summary set by the `summary` directive. `None` unless the
    /// directive appeared in the document.
    pub summary: Option<String>,
}

impl Metadata {
    pub fn new(date: NaiveDateTime, author: impl Into<String>) -> Metadata {
        Metadata {
            date,
            author: author.into(),
            body: String::new(),
            filing: Filing::default(),
            summary: None,
        }
    }
}

/// The build environment. One instance exists per build and is passed
/// explicitly to every hook.
#[derive(Debug)]
pub struct BuildEnv {
    /// The directory containing post source files.
    pub srcdir: PathBuf,

    /// The directory into which build artifacts are written.
    pub outdir: PathBuf,

    /// The extension of post source files, including the leading dot.
    pub source_suffix: String,

    /// Post document names, most recent first.
    pub blog_posts: Vec<String>,

    /// Metadata for every parsed post, keyed by document name.
    pub blog_metadata: HashMap<String, Metadata>,

    /// The plain-text title of every parsed document.
    pub titles: HashMap<String, String>,
}

impl BuildEnv {
    pub fn new(srcdir: &Path, outdir: &Path, source_suffix: &str) -> BuildEnv {
        BuildEnv {
            srcdir: srcdir.to_owned(),
            outdir: outdir.to_owned(),
            source_suffix: source_suffix.to_owned(),
            blog_posts: Vec::new(),
            blog_metadata: HashMap::new(),
            titles: HashMap::new(),
        }
    }

    /// Registers a parsed post. Posts are appended in the order they are
    /// added; call [`BuildEnv::sort_posts`] once all posts are in.
    pub fn add_post(&mut self, docname: &str, title: &str, metadata: Metadata) {
        self.titles.insert(docname.to_owned(), title.to_owned());
        self.blog_metadata.insert(docname.to_owned(), metadata);
        self.blog_posts.push(docname.to_owned());
    }

    /// Orders `blog_posts` most recent first. Posts sharing a date are
    /// ordered by document name so builds are reproducible.
    pub fn sort_posts(&mut self) {
        let metadata = &self.blog_metadata;
        self.blog_posts.sort_by(|a, b| {
            let date = |docname: &String| metadata.get(docname).map(|m| m.date);
            date(b).cmp(&date(a)).then_with(|| a.cmp(b))
        });
    }

    /// Returns the path of the source file backing `docname`.
    pub fn source_path(&self, docname: &str) -> PathBuf {
        self.srcdir.join(format!("{}{}", docname, self.source_suffix))
    }
}
