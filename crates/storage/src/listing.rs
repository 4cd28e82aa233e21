//! Parser for `aws s3 ls --human-readable` output.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*PRE\s+(?P<name>.*)$").expect("valid prefix pattern"));

static FILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s(?:Bytes|KiB|MiB|GiB|TiB)\s+(?P<name>.*)$").expect("valid file pattern")
});

/// One parsed listing line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingEntry {
    /// Common prefix, e.g. `dir1/`.
    Prefix(String),
    /// Object key relative to the listed prefix.
    File(String),
}

/// Parse one line; `None` for blank lines, unrecognized lines, empty names
/// and directory markers (file names ending in `/`).
pub fn parse_listing_line(line: &str) -> Option<ListingEntry> {
    let line = line.trim_end_matches('\r');
    if line.is_empty() {
        return None;
    }

    if let Some(caps) = PREFIX_RE.captures(line) {
        let name = &caps["name"];
        return (!name.is_empty()).then(|| ListingEntry::Prefix(name.to_string()));
    }

    let caps = FILE_RE.captures(line)?;
    let name = &caps["name"];
    (!name.is_empty() && !name.ends_with('/')).then(|| ListingEntry::File(name.to_string()))
}

/// Prefixes and files, each in listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub prefixes: Vec<String>,
    pub files: Vec<String>,
}

impl Listing {
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty() && self.files.is_empty()
    }
}

pub fn parse_listing(output: &str) -> Listing {
    let mut listing = Listing::default();
    for entry in output.lines().filter_map(parse_listing_line) {
        match entry {
            ListingEntry::Prefix(name) => listing.prefixes.push(name),
            ListingEntry::File(name) => listing.files.push(name),
        }
    }
    listing
}
