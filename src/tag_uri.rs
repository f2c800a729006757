//! Mints RFC 4151 `tag:` URIs for the feed and its entries. Feed readers
//! deduplicate entries by id, so the derivation here must not change once
//! ids have been published.

use url::{ParseError, Url};

/// The number of leading characters dropped from a post's document name when
/// building its entry id. Post names start with their creation date as a
/// directory (`2013/05/01/`) or a prefix (`2013-05-01-`), both 11 characters
/// long, and that date already appears in the id.
pub const DATE_PREFIX_LEN: usize = 11;

/// The authority and path parts shared by every tag URI minted for a site.
#[derive(Clone, Debug, PartialEq)]
pub struct TagUri {
    /// The authority of the site URL exactly as written, including any
    /// userinfo and port.
    pub authority: String,

    /// The site URL path without leading or trailing slashes and with inner
    /// slashes replaced by colons (e.g., `/a/b/` becomes `a:b`).
    pub path: String,
}

impl TagUri {
    /// Parses the site's base URL into a [`TagUri`]. The URL must be
    /// absolute, but the authority and path are taken verbatim from
    /// `website`: case, default ports, userinfo and unencoded characters
    /// are all kept.
    pub fn parse(website: &str) -> Result<TagUri, ParseError> {
        Url::parse(website)?;
        let (authority, path) = split_authority(website);
        Ok(TagUri {
            authority: authority.to_owned(),
            path: path.trim_matches('/').replace('/', ":"),
        })
    }

    /// The id of the feed itself, dated with the blog's epoch.
    pub fn feed_id(&self, blog_date: &str) -> String {
        format!("tag:{},{}:{}", self.authority, blog_date, self.path)
    }

    /// The id of a single entry. `entry_date` is the `YYYY-MM-DD` publish date
    /// of the post.
    pub fn entry_id(&self, entry_date: &str, docname: &str) -> String {
        format!(
            "tag:{},{}:{}:{}",
            self.authority,
            entry_date,
            self.path,
            strip_date_prefix(docname)
        )
    }
}

/// Splits an absolute URL into its raw authority and path. The authority
/// runs from `//` to the next `/`, `?` or `#`; the path from there to the
/// next `?` or `#`. URLs without `//` have an empty authority.
fn split_authority(website: &str) -> (&str, &str) {
    let rest = match website.split_once(':') {
        Some((_, rest)) => rest,
        None => website,
    };
    let rest = match rest.find(|c: char| c == '?' || c == '#') {
        Some(end) => &rest[..end],
        None => rest,
    };
    match rest.strip_prefix("//") {
        Some(rest) => match rest.find('/') {
            Some(slash) => rest.split_at(slash),
            None => (rest, ""),
        },
        None => ("", rest),
    }
}

/// Drops the first [`DATE_PREFIX_LEN`] characters of `docname`. Names shorter
/// than the prefix yield an empty string.
fn strip_date_prefix(docname: &str) -> &str {
    match docname.char_indices().nth(DATE_PREFIX_LEN) {
        Some((i, _)) => &docname[i..],
        None => "",
    }
}
