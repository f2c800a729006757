//! Loads the project configuration from a `rutherford.yaml` file. See
//! [`Config::from_directory`].

use crate::feed::FeedConfig;
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The name of the project file.
pub const PROJECT_FILE: &str = "rutherford.yaml";

#[derive(Deserialize)]
struct PageSize(usize);
impl Default for PageSize {
    fn default() -> Self {
        PageSize(10)
    }
}

fn default_blog_date() -> String {
    "2013".to_owned()
}

fn default_source_suffix() -> String {
    ".md".to_owned()
}

#[derive(Deserialize)]
struct Project {
    website: String,
    project: String,

    #[serde(default)]
    tagline: String,

    #[serde(default)]
    posts_per_page: PageSize,

    #[serde(default = "default_blog_date")]
    blog_date: String,

    #[serde(default)]
    rights: String,

    #[serde(default)]
    author: String,

    #[serde(default = "default_source_suffix")]
    source_suffix: String,

    #[serde(default)]
    feed_template: Option<PathBuf>,
}

/// The resolved configuration for a build.
#[derive(Clone, Debug)]
pub struct Config {
    /// The settings the feed is derived from.
    pub feed: FeedConfig,

    /// The author of posts whose frontmatter doesn't name one.
    pub author: String,

    /// The extension of post source files, including the leading dot.
    pub source_suffix: String,

    /// A template replacing the built-in feed template, resolved against
    /// the project root.
    pub feed_template: Option<PathBuf>,

    /// The directory containing the post sources (`{project root}/posts`).
    pub posts_source_directory: PathBuf,

    /// The directory into which the feed is written.
    pub output_directory: PathBuf,
}

impl Config {
    /// Searches `dir` and its ancestors for a project file and loads the
    /// first one found. When `output_directory` is `None`, the output goes
    /// to `{project root}/_build`.
    pub fn from_directory(dir: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.is_file() {
            return Config::from_project_file(&path, output_directory);
        }
        match dir.parent() {
            Some(parent) => Config::from_directory(parent, output_directory),
            None => Err(Error::MissingProjectFile),
        }
    }

    /// Loads the project file at `path`.
    pub fn from_project_file(path: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let file = File::open(path).map_err(|err| Error::OpenProjectFile {
            path: path.to_owned(),
            err,
        })?;
        let project: Project = serde_yaml::from_reader(file)?;
        let project_root = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(Config::from_project(project, project_root, output_directory))
    }

    fn from_project(
        project: Project,
        project_root: &Path,
        output_directory: Option<&Path>,
    ) -> Config {
        Config {
            feed: FeedConfig {
                title: project.project,
                website: project.website,
                subtitle: project.tagline,
                rights: project.rights,
                blog_date: project.blog_date,
                posts_per_page: project.posts_per_page.0,
            },
            author: project.author,
            source_suffix: project.source_suffix,
            feed_template: project
                .feed_template
                .map(|relpath| project_root.join(relpath)),
            posts_source_directory: project_root.join("posts"),
            output_directory: match output_directory {
                Some(dir) => dir.to_owned(),
                None => project_root.join("_build"),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading the project configuration.
#[derive(Debug)]
pub enum Error {
    /// Returned when no ancestor of the starting directory holds a project
    /// file.
    MissingProjectFile,

    /// Returned when the project file can't be opened.
    OpenProjectFile { path: PathBuf, err: std::io::Error },

    /// Returned when the project file isn't valid YAML or lacks required
    /// fields.
    DeserializeYaml(serde_yaml::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingProjectFile => {
                write!(f, "Could not find `{}` in any parent directory", PROJECT_FILE)
            }
            Error::OpenProjectFile { path, err } => {
                write!(f, "Opening project file '{}': {}", path.display(), err)
            }
            Error::DeserializeYaml(err) => write!(f, "Loading configuration: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingProjectFile => None,
            Error::OpenProjectFile { path: _, err } => Some(err),
            Error::DeserializeYaml(err) => Some(err),
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
