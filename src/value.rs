//! Converts the feed types into [`Value`]s for templating. Every string is
//! XML-escaped on the way in, so templates can interpolate fields directly.

use crate::feed::{FeedContext, FeedEntry};
use gtmpl_value::Value;
use pulldown_cmark::escape::escape_html;
use std::collections::HashMap;

/// Escapes `&`, `<`, `>` and `"` in `s`.
pub fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    // Writing into a `String` can't fail.
    let _ = escape_html(&mut escaped, s);
    escaped
}

fn text(s: &str) -> Value {
    Value::String(escape(s))
}

impl From<&FeedEntry> for Value {
    /// Converts a [`FeedEntry`] into a [`Value::Object`]. A missing summary
    /// becomes [`Value::Nil`] with `has_summary` false; an empty one stays an
    /// empty string with `has_summary` true.
    fn from(entry: &FeedEntry) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), text(&entry.title));
        m.insert("id".to_owned(), text(&entry.id));
        m.insert("link".to_owned(), text(&entry.link));
        m.insert(
            "summary".to_owned(),
            match &entry.summary {
                Some(summary) => text(summary),
                None => Value::Nil,
            },
        );
        m.insert("has_summary".to_owned(), Value::Bool(entry.summary.is_some()));
        m.insert(
            "categories".to_owned(),
            Value::Array(entry.categories.iter().map(|c| text(c)).collect()),
        );
        m.insert("published".to_owned(), text(&entry.published));
        m.insert("updated".to_owned(), text(&entry.updated));
        m.insert("author".to_owned(), text(&entry.author));
        m.insert("content".to_owned(), text(&entry.content));
        Value::Object(m)
    }
}

impl From<&FeedContext> for Value {
    /// Converts a [`FeedContext`] into a [`Value::Object`] whose `entries`
    /// field keeps the context's entry order.
    fn from(context: &FeedContext) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), text(&context.title));
        m.insert("id".to_owned(), text(&context.id));
        m.insert("link".to_owned(), text(&context.link));
        m.insert("subtitle".to_owned(), text(&context.subtitle));
        m.insert("rights".to_owned(), text(&context.rights));
        m.insert("language".to_owned(), text(&context.language));
        m.insert("version".to_owned(), text(&context.version));
        m.insert("updated".to_owned(), text(&context.updated));
        m.insert(
            "entries".to_owned(),
            Value::Array(context.entries.iter().map(Value::from).collect()),
        );
        Value::Object(m)
    }
}
