//! The `summary` directive. From RFC 4287 section 4.2.13, `atom:summary`
//! "conveys a short summary, abstract, or excerpt of an entry"; it should not
//! duplicate the title or the content.
//!
//! The directive is not rendered into the document. Its arguments are stored
//! in the post's metadata and handed to the feed template.

use crate::env::BuildEnv;
use tracing::debug;

/// The name authors use to invoke the directive (`.. summary:: ...`).
pub const SUMMARY: &str = "summary";

pub struct SummaryDirective;

impl SummaryDirective {
    /// Joins `arguments` with single spaces and stores the result as the
    /// summary of `docname`. Documents the host never registered as posts
    /// have no metadata record and are left alone.
    pub fn run(env: &mut BuildEnv, docname: &str, arguments: &[&str]) {
        let summary = arguments.join(" ");
        match env.blog_metadata.get_mut(docname) {
            Some(metadata) => metadata.summary = Some(summary),
            None => debug!(docname = %docname, "summary directive outside of a post, ignoring"),
        }
    }
}
