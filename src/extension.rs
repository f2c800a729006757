//! Defines the [`Extension`] trait, the fixed set of lifecycle hooks a host
//! calls into, and [`Rutherford`], the Atom feed extension implementing them.

use crate::directive::{SummaryDirective, SUMMARY};
use crate::env::BuildEnv;
use crate::feed::{FeedConfig, FeedContext, Result};
use crate::write::FeedWriter;
use gtmpl::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};

/// The hooks a host invokes over the course of a build. Hosts register
/// extensions directly; there is no discovery.
pub trait Extension {
    type Error: std::error::Error + 'static;

    /// The directive names this extension handles.
    fn directives(&self) -> &[&'static str] {
        &[]
    }

    /// Called while `docname` is parsed, once per occurrence of one of
    /// [`Extension::directives`].
    fn on_directive(&self, _env: &mut BuildEnv, _docname: &str, _name: &str, _arguments: &[&str]) {}

    /// Called with the template context of every HTML page the host renders.
    fn on_page_context(&self, _context: &mut HashMap<String, Value>) {}

    /// Called once when the build is over. `err` is the error that ended the
    /// build early, if any.
    fn on_build_finished(
        &self,
        env: &BuildEnv,
        err: Option<&(dyn std::error::Error + 'static)>,
    ) -> std::result::Result<(), Self::Error>;
}

/// Adds the `summary` directive and writes an Atom feed of the most recent
/// posts when the build finishes.
pub struct Rutherford {
    feed: FeedConfig,

    /// A template replacing the built-in one.
    template: Option<PathBuf>,
}

impl Rutherford {
    pub fn new(feed: FeedConfig, template: Option<PathBuf>) -> Rutherford {
        Rutherford { feed, template }
    }

    /// Builds the feed from `env` and writes it into the output directory.
    /// Returns the path of the feed, or `None` when there are no posts.
    pub fn generate_feed(&self, env: &BuildEnv) -> Result<Option<PathBuf>> {
        let context = match FeedContext::build(&self.feed, env)? {
            Some(context) => context,
            None => return Ok(None),
        };
        let writer = match &self.template {
            Some(path) => FeedWriter::from_file(path)?,
            None => FeedWriter::builtin()?,
        };
        let path = writer.write(&context, &env.outdir)?;
        info!(
            path = %path.display(),
            entries = context.entries.len(),
            "wrote feed"
        );
        Ok(Some(path))
    }
}

impl Extension for Rutherford {
    type Error = crate::feed::Error;

    fn directives(&self) -> &[&'static str] {
        &[SUMMARY]
    }

    fn on_directive(&self, env: &mut BuildEnv, docname: &str, name: &str, arguments: &[&str]) {
        if name == SUMMARY {
            SummaryDirective::run(env, docname, arguments);
        }
    }

    /// Makes the rights statement available to page templates.
    fn on_page_context(&self, context: &mut HashMap<String, Value>) {
        context.insert("rights".to_owned(), Value::String(self.feed.rights.clone()));
    }

    fn on_build_finished(
        &self,
        env: &BuildEnv,
        err: Option<&(dyn std::error::Error + 'static)>,
    ) -> Result<()> {
        if let Some(err) = err {
            warn!(error = %err, "error found at build-finished, feed not written");
            return Ok(());
        }
        self.generate_feed(env).map(|_| ())
    }
}
