//! Exports the [`build_site`] function which drives a build: parsing the post
//! sources into a [`BuildEnv`] ([`crate::document`]), dispatching directives
//! to the extension, and signalling the extension once the build has
//! finished, successfully or not.

use crate::config::Config;
use crate::document::{Document, Error as DocumentError};
use crate::env::BuildEnv;
use crate::extension::Extension;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Builds the site from a [`Config`] object, handing the result to
/// `extension`. When parsing fails, the extension is still told the build
/// finished (with the error) before the error is returned.
pub fn build_site<E: Extension>(config: &Config, extension: &E) -> Result<BuildEnv> {
    let mut env = BuildEnv::new(
        &config.posts_source_directory,
        &config.output_directory,
        &config.source_suffix,
    );

    let parsed = parse_posts(&mut env, config, extension);
    let err = parsed.err();
    extension
        .on_build_finished(
            &env,
            err.as_ref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
        )
        .map_err(|err| Error::Extension(Box::new(err)))?;

    match err {
        Some(err) => Err(err),
        None => Ok(env),
    }
}

/// Walks `env.srcdir` for post sources, adds each post to `env` and runs the
/// directives it contains. Leaves `env.blog_posts` ordered most recent first.
fn parse_posts<E: Extension>(env: &mut BuildEnv, config: &Config, extension: &E) -> Result<()> {
    let known = extension.directives();
    for result in WalkDir::new(&env.srcdir).sort_by_file_name() {
        let entry = result?;
        if !entry.file_type().is_file() {
            continue;
        }
        let docname = match docname(&env.srcdir, entry.path(), &config.source_suffix) {
            Some(docname) => docname,
            None => continue,
        };

        let input = std::fs::read_to_string(entry.path())?;
        let document = Document::parse(&input, known, &config.author).map_err(|err| {
            Error::Parse {
                path: entry.path().to_owned(),
                err,
            }
        })?;
        for name in &document.unknown_directives {
            warn!(docname = %docname, directive = %name, "unknown directive");
        }

        debug!(docname = %docname, "parsed post");
        env.add_post(&docname, &document.title, document.metadata);
        for directive in &document.directives {
            extension.on_directive(env, &docname, &directive.name, &directive.argument_strs());
        }
    }

    env.sort_posts();
    info!(posts = env.blog_posts.len(), "parsed posts");
    Ok(())
}

/// Returns the document name of the source file at `path`: its path relative
/// to `srcdir` without `suffix`, with `/` separators. Returns `None` for
/// files that aren't post sources.
fn docname(srcdir: &Path, path: &Path, suffix: &str) -> Option<String> {
    let relative = path.strip_prefix(srcdir).ok()?;
    let components = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<&str>>>()?;
    let joined = components.join("/");
    match joined.strip_suffix(suffix) {
        Some(name) if !name.is_empty() && !name.ends_with('/') => Some(name.to_owned()),
        _ => None,
    }
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post source file can't be parsed.
    Parse { path: PathBuf, err: DocumentError },

    /// Returned for errors walking the posts directory.
    WalkDir(walkdir::Error),

    /// Returned when the extension fails at the end of the build.
    Extension(Box<dyn std::error::Error>),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse { path, err } => {
                write!(f, "Parsing post '{}': {}", path.display(), err)
            }
            Error::WalkDir(err) => err.fmt(f),
            Error::Extension(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse { path: _, err } => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Extension(err) => Some(err.as_ref()),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}
