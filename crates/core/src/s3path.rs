//! String helpers for `s3://bucket/key/...` paths.
//!
//! Segments are joined and split on `/` with POSIX semantics: a component
//! starting with `/` restarts the path, and trailing slashes on inputs
//! collapse into a single separator. No URL encoding is performed.

/// URI scheme every object path carries.
pub const S3_PROTOCOL: &str = "s3://";

/// One argument to [`join`]: a single segment or a sequence that is flattened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPart<'a> {
    Segment(&'a str),
    Segments(&'a [&'a str]),
}

impl<'a> From<&'a str> for PathPart<'a> {
    fn from(value: &'a str) -> Self {
        PathPart::Segment(value)
    }
}

impl<'a, 'b> From<&'b &'a str> for PathPart<'a> {
    fn from(value: &'b &'a str) -> Self {
        PathPart::Segment(value)
    }
}

impl<'a> From<&'a String> for PathPart<'a> {
    fn from(value: &'a String) -> Self {
        PathPart::Segment(value.as_str())
    }
}

impl<'a, 'b: 'a> From<&'a [&'b str]> for PathPart<'a> {
    fn from(value: &'a [&'b str]) -> Self {
        PathPart::Segments(value)
    }
}

impl<'a, 'b: 'a, const N: usize> From<&'a [&'b str; N]> for PathPart<'a> {
    fn from(value: &'a [&'b str; N]) -> Self {
        PathPart::Segments(value.as_slice())
    }
}

impl<'a, 'b: 'a> From<&'a Vec<&'b str>> for PathPart<'a> {
    fn from(value: &'a Vec<&'b str>) -> Self {
        PathPart::Segments(value.as_slice())
    }
}

/// Join `base` with every part, flattening sequence parts in order.
///
/// ```
/// use awswrap_core::s3path::{join, PathPart};
///
/// let path = join("s3://b", [PathPart::from("p1/"), PathPart::from(&["p2/", "f.txt"])]);
/// assert_eq!(path, "s3://b/p1/p2/f.txt");
/// ```
pub fn join<'a, I, P>(base: &str, parts: I) -> String
where
    I: IntoIterator<Item = P>,
    P: Into<PathPart<'a>>,
{
    let mut path = base.to_string();
    for part in parts {
        match part.into() {
            PathPart::Segment(segment) => push_segment(&mut path, segment),
            PathPart::Segments(segments) => {
                for segment in segments {
                    push_segment(&mut path, segment);
                }
            }
        }
    }
    path
}

fn push_segment(path: &mut String, segment: &str) {
    if segment.starts_with('/') {
        path.clear();
    } else if !path.is_empty() && !path.ends_with('/') {
        path.push('/');
    }
    path.push_str(segment);
}

/// Split into `(parent, last segment)`.
pub fn split(target: &str) -> (String, String) {
    let cut = target.rfind('/').map_or(0, |i| i + 1);
    let (head, tail) = target.split_at(cut);
    let head = if head.chars().all(|c| c == '/') {
        head
    } else {
        head.trim_end_matches('/')
    };
    (head.to_string(), tail.to_string())
}

pub fn basename(target: &str) -> String {
    split(target).1
}

pub fn dirname(target: &str) -> String {
    split(target).0
}

/// Scheme plus bucket, e.g. `s3://bucket`.
pub fn root_path(target: &str) -> String {
    to_list(target).swap_remove(0)
}

/// Bucket name without the scheme.
pub fn bucket_name(target: &str) -> String {
    strip_protocol(target)
        .split('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Full ordered segment list; segment 0 is always scheme-qualified.
pub fn to_list(target: &str) -> Vec<String> {
    let mut segments: Vec<String> = strip_protocol(target)
        .split('/')
        .map(str::to_string)
        .collect();
    // split always yields at least one element
    segments[0] = format!("{S3_PROTOCOL}{}", segments[0]);
    segments
}

/// Bucket and object key, the pair an object store fetch needs.
pub fn bucket_and_key(target: &str) -> (String, String) {
    let key = to_list(target)
        .get(1..)
        .map(|rest| rest.join("/"))
        .unwrap_or_default();
    (bucket_name(target), key)
}

fn strip_protocol(target: &str) -> &str {
    target.strip_prefix(S3_PROTOCOL).unwrap_or(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "s3://test.com/prefix1/prefix2/file1.txt";

    #[test]
    fn join_sequence_argument() {
        let expected = "s3://test.com/prefix1/prefix2/file1.txt";
        for args in [
            vec!["prefix1", "prefix2", "file1.txt"],
            vec!["prefix1/", "prefix2/", "file1.txt"],
            vec!["prefix1/prefix2/", "file1.txt"],
        ] {
            assert_eq!(join("s3://test.com", [&args]), expected);
        }
    }

    #[test]
    fn join_mixed_arguments() {
        assert_eq!(
            join("s3://test.com", [PathPart::from("prefix1"), PathPart::from(&["prefix2", "file1.txt"])]),
            FULL
        );
        assert_eq!(
            join("s3://test.com", [PathPart::from("prefix1/"), PathPart::from(&["prefix2/", "file1.txt"])]),
            FULL
        );
        assert_eq!(
            join(
                "s3://test.com",
                [PathPart::from("prefix1/"), PathPart::from(&["prefix2/prefix3", "file1.txt"])]
            ),
            "s3://test.com/prefix1/prefix2/prefix3/file1.txt"
        );
        assert_eq!(
            join("s3://b", [PathPart::from("p1/"), PathPart::from(&["p2/", "f.txt"])]),
            "s3://b/p1/p2/f.txt"
        );
    }

    #[test]
    fn join_variadic_segments() {
        assert_eq!(join("s3://test.com", ["prefix1", "prefix2", "file1.txt"]), FULL);
        assert_eq!(join("s3://test.com", ["prefix1/", "prefix2/", "file1.txt"]), FULL);
        assert_eq!(join("s3://test.com", ["prefix1/prefix2/", "file1.txt"]), FULL);
        assert_eq!(join("s3://test.com", ["prefix1/prefix2", "file1.txt"]), FULL);
    }

    #[test]
    fn join_absolute_segment_restarts() {
        assert_eq!(join("s3://b/p1", ["/tmp", "x"]), "/tmp/x");
    }

    #[test]
    fn join_base_with_trailing_slash() {
        assert_eq!(join("s3://b/", ["k"]), "s3://b/k");
    }

    #[test]
    fn split_parent_and_last() {
        assert_eq!(
            split(FULL),
            ("s3://test.com/prefix1/prefix2".to_string(), "file1.txt".to_string())
        );
        assert_eq!(split("file1.txt"), (String::new(), "file1.txt".to_string()));
        assert_eq!(split("s3://b/dir/"), ("s3://b/dir".to_string(), String::new()));
    }

    #[test]
    fn basename_and_dirname() {
        assert_eq!(basename(FULL), "file1.txt");
        assert_eq!(dirname(FULL), "s3://test.com/prefix1/prefix2");
    }

    #[test]
    fn root_and_bucket() {
        assert_eq!(root_path(FULL), "s3://test.com");
        assert_eq!(bucket_name(FULL), "test.com");
        assert_eq!(root_path("s3://only-bucket"), "s3://only-bucket");
    }

    #[test]
    fn bucket_name_is_root_without_scheme() {
        for path in [FULL, "s3://sales/2024/q1.csv", "s3://s3bucket/k", "s3://b"] {
            let root = root_path(path);
            assert_eq!(bucket_name(path), root.strip_prefix(S3_PROTOCOL).unwrap());
        }
    }

    #[test]
    fn bucket_starting_with_scheme_letters_is_kept() {
        assert_eq!(bucket_name("s3://s3-logs/x"), "s3-logs");
        assert_eq!(to_list("s3://sales/x"), vec!["s3://sales", "x"]);
    }

    #[test]
    fn to_list_breakdown() {
        assert_eq!(
            to_list(FULL),
            vec!["s3://test.com", "prefix1", "prefix2", "file1.txt"]
        );
    }

    #[test]
    fn to_list_of_join_round_trips() {
        let root = "s3://bucket";
        for (a, b, c) in [
            ("seg1", "seg2", "seg3"),
            ("seg1/", "seg2/", "seg3"),
            ("seg1/", "seg2", "seg3"),
        ] {
            assert_eq!(
                to_list(&join(root, [a, b, c])),
                vec![root, "seg1", "seg2", "seg3"]
            );
        }
    }

    #[test]
    fn bucket_and_key_for_output_location() {
        assert_eq!(
            bucket_and_key("s3://results/athena/abc-123.csv"),
            ("results".to_string(), "athena/abc-123.csv".to_string())
        );
        assert_eq!(bucket_and_key("s3://results"), ("results".to_string(), String::new()));
    }
}
