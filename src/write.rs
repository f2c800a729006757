//! Renders a [`FeedContext`] through the Atom template and writes the result
//! to disk.

use crate::feed::{Error, FeedContext, Result};
use gtmpl::{Context, Template, Value};
use std::fs::File;
use std::path::{Path, PathBuf};

/// The name of the feed file inside the output directory.
pub const FEED_FILE_NAME: &str = "feed.atom";

/// The built-in Atom 1.0 template.
const FEED_TEMPLATE: &str = include_str!("templates/feed.xml");

/// Responsible for templating and writing the feed file.
pub struct FeedWriter {
    template: Template,
}

impl FeedWriter {
    /// Creates a writer using the built-in Atom template.
    pub fn builtin() -> Result<FeedWriter> {
        FeedWriter::parse(FEED_TEMPLATE)
    }

    /// Creates a writer from a user-supplied template file.
    pub fn from_file(path: &Path) -> Result<FeedWriter> {
        use std::io::Read;
        let mut contents = String::new();
        File::open(path)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .map_err(|err| Error::SourceFile {
                path: path.to_owned(),
                err,
            })?;
        FeedWriter::parse(&contents)
    }

    fn parse(contents: &str) -> Result<FeedWriter> {
        let mut template = Template::default();
        template
            .parse(contents)
            .map_err(|e| Error::Template(e.to_string()))?;
        Ok(FeedWriter { template })
    }

    /// Renders `context` to a string.
    pub fn render(&self, context: &FeedContext) -> Result<String> {
        let context = Context::from(Value::from(context))
            .map_err(|e| Error::Template(e.to_string()))?;
        self.template
            .render(&context)
            .map_err(|e| Error::Template(e.to_string()))
    }

    /// Renders `context` and writes it to `{outdir}/feed.atom`, returning the
    /// path of the written file. The feed is rendered completely before the
    /// file is touched, and the old file is replaced in a single rename, so a
    /// failed render leaves any previous feed as it was. If the rename fails,
    /// the partially written file is removed.
    pub fn write(&self, context: &FeedContext, outdir: &Path) -> Result<PathBuf> {
        let xml = self.render(context)?;

        std::fs::create_dir_all(outdir)?;
        let path = outdir.join(FEED_FILE_NAME);
        let partial = outdir.join(format!(".{}.partial", FEED_FILE_NAME));
        std::fs::write(&partial, xml.as_bytes())?;
        if let Err(err) = std::fs::rename(&partial, &path) {
            let _ = std::fs::remove_file(&partial);
            return Err(err.into());
        }
        Ok(path)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::env::{BuildEnv, Filing};
    use crate::feed::test::{add_post, config, date};
    use atom_syndication::Feed;
    use chrono::DateTime;
    use std::io::BufReader;

    fn context(dir: &tempfile::TempDir) -> Result<FeedContext> {
        let mut env = BuildEnv::new(&dir.path().join("posts"), &dir.path().join("out"), ".md");
        add_post(&mut env, "2013-06-01-second", date(2013, 6, 1, 9), 1_370_077_200);
        add_post(&mut env, "2013-05-01-hello", date(2013, 5, 1, 10), 1_367_402_400);
        {
            let hello = env.blog_metadata.get_mut("2013-05-01-hello").unwrap();
            hello.filing = Filing {
                categories: vec![("python".to_owned(), "Python".to_owned())],
                tags: vec![("fish-chips".to_owned(), "Fish & Chips".to_owned())],
            };
        }
        env.blog_metadata
            .get_mut("2013-06-01-second")
            .unwrap()
            .summary = Some("A <short> summary".to_owned());
        Ok(FeedContext::build(&config(), &env)?.unwrap())
    }

    #[test]
    fn test_render_builtin_template() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let context = context(&dir)?;
        let xml = FeedWriter::builtin()?.render(&context)?;

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("<feed xmlns=\"http://www.w3.org/2005/Atom\" xml:lang=\"en-us\">"));
        assert!(xml.contains("<id>tag:example.com,2013:blog</id>"));
        assert!(xml.contains("<subtitle>Just an example</subtitle>"));
        assert!(!xml.contains("<rights>"));
        assert!(xml.contains(&format!("<updated>{}</updated>", context.updated)));
        assert!(xml.contains("<id>tag:example.com,2013-05-01:blog:hello</id>"));
        assert!(xml.contains("<published>2013-05-01T10:00:00</published>"));
        assert!(xml.contains("<category term=\"Python\"/>"));
        assert!(xml.contains("<category term=\"Fish &amp; Chips\"/>"));
        assert!(xml.contains("<name>Alice</name>"));
        assert!(xml.contains(
            "<content type=\"html\">&lt;p&gt;2013-05-01-hello&lt;/p&gt;</content>"
        ));
        assert_eq!(xml.matches("<entry>").count(), 2);
        assert!(xml.trim_end().ends_with("</feed>"));
        Ok(())
    }

    #[test]
    fn test_render_summary_only_when_present() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut context = context(&dir)?;
        let writer = FeedWriter::builtin()?;

        let xml = writer.render(&context)?;
        assert_eq!(xml.matches("<summary>").count(), 1);
        assert!(xml.contains("<summary>A &lt;short&gt; summary</summary>"));

        context.entries[1].summary = Some(String::new());
        let xml = writer.render(&context)?;
        assert!(xml.contains("<summary></summary>"));
        assert_eq!(xml.matches("<summary>").count(), 2);
        Ok(())
    }

    #[test]
    fn test_entries_keep_context_order() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let xml = FeedWriter::builtin()?.render(&context(&dir)?)?;
        let second = xml.find("blog:second</id>").unwrap();
        let hello = xml.find("blog:hello</id>").unwrap();
        assert!(second < hello);
        Ok(())
    }

    #[test]
    fn test_write_is_reproducible() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let context = context(&dir)?;
        let writer = FeedWriter::builtin()?;
        let outdir = dir.path().join("out");

        let path = writer.write(&context, &outdir)?;
        assert_eq!(path, outdir.join(FEED_FILE_NAME));
        let first = std::fs::read(&path)?;
        writer.write(&context, &outdir)?;
        assert_eq!(std::fs::read(&path)?, first);
        assert!(!outdir.join(".feed.atom.partial").exists());
        Ok(())
    }

    #[test]
    fn test_failed_rename_removes_partial_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let context = context(&dir)?;
        let outdir = dir.path().join("out");
        // A non-empty directory can't be replaced by a file.
        std::fs::create_dir_all(outdir.join(FEED_FILE_NAME).join("occupied"))?;

        assert!(matches!(
            FeedWriter::builtin()?.write(&context, &outdir),
            Err(Error::Io(_))
        ));
        assert!(!outdir.join(".feed.atom.partial").exists());
        assert!(outdir.join(FEED_FILE_NAME).is_dir());
        Ok(())
    }

    #[test]
    fn test_written_feed_is_valid_atom() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let context = context(&dir)?;
        let path = FeedWriter::builtin()?.write(&context, &dir.path().join("out"))?;
        let feed = Feed::read_from(BufReader::new(File::open(path)?))?;

        assert_eq!(feed.id(), "tag:example.com,2013:blog");
        assert_eq!(
            feed.updated().timestamp(),
            DateTime::parse_from_rfc3339(&context.updated)?.timestamp()
        );
        let ids: Vec<&str> = feed.entries().iter().map(|e| e.id()).collect();
        assert_eq!(
            ids,
            vec![
                "tag:example.com,2013-06-01:blog:second",
                "tag:example.com,2013-05-01:blog:hello",
            ]
        );

        let second = &feed.entries()[0];
        assert!(second.categories().is_empty());
        assert_eq!(
            second.summary().map(|s| s.value.as_str()),
            Some("A <short> summary")
        );

        let hello = &feed.entries()[1];
        let terms: Vec<&str> = hello.categories().iter().map(|c| c.term()).collect();
        assert_eq!(terms, vec!["Python", "Fish & Chips"]);
        assert!(hello.summary().is_none());
        assert_eq!(
            hello.content().and_then(|c| c.value()),
            Some("<p>2013-05-01-hello</p>")
        );
        Ok(())
    }

    #[test]
    fn test_custom_template() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let template = dir.path().join("feed.xml");
        std::fs::write(
            &template,
            "{{.title}}:{{range .entries}}[{{.id}}]{{end}}",
        )?;
        let xml = FeedWriter::from_file(&template)?.render(&context(&dir)?)?;
        assert_eq!(
            xml,
            "Example:[tag:example.com,2013-06-01:blog:second]\
             [tag:example.com,2013-05-01:blog:hello]"
        );
        Ok(())
    }

    #[test]
    fn test_missing_template_file() {
        match FeedWriter::from_file(Path::new("/nonexistent/feed.xml")) {
            Err(Error::SourceFile { err, .. }) => {
                assert_eq!(err.kind(), std::io::ErrorKind::NotFound)
            }
            _ => panic!("wanted a source file error"),
        }
    }
}
