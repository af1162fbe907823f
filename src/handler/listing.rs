//! Directory listing module
//!
//! Renders a plain HTML index for directories without an index file.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped in a path segment used as a relative link
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'\'')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Directory contents, sorted by name
#[derive(Debug, Clone)]
pub struct DirectoryListing {
    entries: Vec<ListingEntry>,
}

impl DirectoryListing {
    pub fn new(mut entries: Vec<ListingEntry>) -> Self {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Self { entries }
    }

    pub fn entries(&self) -> &[ListingEntry] {
        &self.entries
    }

    pub fn render_html(&self) -> String {
        let mut html = String::from(
            "<!doctype html>\n<meta name=\"viewport\" content=\"width=device-width\">\n<pre>\n",
        );
        for entry in &self.entries {
            let suffix = if entry.is_dir { "/" } else { "" };
            let mut href = utf8_percent_encode(&entry.name, SEGMENT).to_string();
            // "a:b" would otherwise read as a URL scheme
            if href.contains(':') {
                href.insert_str(0, "./");
            }
            html.push_str(&format!(
                "<a href=\"{href}{suffix}\">{}{suffix}</a>\n",
                escape_html(&entry.name)
            ));
        }
        html.push_str("</pre>\n");
        html
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&#34;")
        .replace('\'', "&#39;")
}
