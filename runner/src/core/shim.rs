//! Compatibility shim for schemas whose `datasource` block omits `url`.
//!
//! Newer Prisma schemas may leave the connection URL out of the datasource
//! block, which the bundled CLI rejects. The shim injects
//! `url = env("DB_URL")` into a copy of the document.
//!
//! Detection is a pattern match, not a parse: the first
//! `datasource <name> {` header is taken and its body runs to the first `}`.
//! A `}` inside a quoted string within the block ends the body early; that
//! case is not handled.

use std::ops::Range;
use std::sync::LazyLock;

use regex::bytes::Regex;
use tracing::{debug, info};

/// Text inserted directly after the datasource block's opening brace.
pub const INJECTED_URL_LINE: &str = "\n  url = env(\"DB_URL\")";

static DATASOURCE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"datasource\s+(?-u:\w)+\s+\{([^}]+)\}").expect("datasource pattern is valid")
});

static URL_PROPERTY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u:\b)url\s*=").expect("url pattern is valid"));

/// Outcome of inspecting a schema document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShimResult {
    /// No datasource block, or it already declares `url`.
    Unchanged,
    /// Fresh copy of the document with the url line injected.
    Patched {
        document: Vec<u8>,
        /// Byte range of the injected text within `document`.
        injected: Range<usize>,
    },
}

impl ShimResult {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, ShimResult::Unchanged)
    }
}

/// Byte range `[start, end)` of the first datasource block body.
pub fn datasource_body(document: &[u8]) -> Option<Range<usize>> {
    DATASOURCE_BLOCK
        .captures(document)
        .and_then(|caps| caps.get(1))
        .map(|body| body.range())
}

/// Decide whether `document` needs the url shim and build the patched copy.
pub fn evaluate(document: &[u8]) -> ShimResult {
    let Some(body) = datasource_body(document) else {
        debug!("no datasource block found");
        return ShimResult::Unchanged;
    };

    if URL_PROPERTY.is_match(&document[body.clone()]) {
        debug!("datasource block already declares url");
        return ShimResult::Unchanged;
    }

    let insert_at = body.start;
    let mut patched = Vec::with_capacity(document.len() + INJECTED_URL_LINE.len());
    patched.extend_from_slice(&document[..insert_at]);
    patched.extend_from_slice(INJECTED_URL_LINE.as_bytes());
    patched.extend_from_slice(&document[insert_at..]);

    info!("injected url = env(\"DB_URL\") into datasource block for compatibility");
    ShimResult::Patched {
        document: patched,
        injected: insert_at..insert_at + INJECTED_URL_LINE.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patched(document: &[u8]) -> (Vec<u8>, Range<usize>) {
        match evaluate(document) {
            ShimResult::Patched { document, injected } => (document, injected),
            ShimResult::Unchanged => panic!("expected patched document"),
        }
    }

    #[test]
    fn injects_url_into_postgres_datasource() {
        let input = b"datasource db {\n  provider = \"postgresql\"\n}\n";
        let (document, _) = patched(input);
        assert_eq!(
            String::from_utf8(document).expect("utf8"),
            "datasource db {\n  url = env(\"DB_URL\")\n  provider = \"postgresql\"\n}\n"
        );
    }

    #[test]
    fn existing_url_is_left_alone() {
        for body in [
            "url = env(\"X\")",
            "url=env(\"X\")",
            "url   =   env(\"X\")",
            "url\t= \"postgres://localhost\"",
        ] {
            let document = format!("datasource db {{\n  provider = \"sqlite\"\n  {body}\n}}\n");
            assert_eq!(evaluate(document.as_bytes()), ShimResult::Unchanged, "{body}");
        }
    }

    #[test]
    fn url_substring_does_not_count_as_url() {
        let input = b"datasource db {\n  provider = \"mysql\"\n  shadowurl = \"x\"\n}\n";
        assert!(!evaluate(input).is_unchanged());
    }

    #[test]
    fn non_ascii_letter_before_url_is_a_word_boundary() {
        let input = "datasource db {\n  éurl = \"x\"\n}\n";
        assert_eq!(evaluate(input.as_bytes()), ShimResult::Unchanged);
    }

    #[test]
    fn datasource_name_is_ascii_only() {
        let input = "datasource dbé {\n  provider = \"sqlite\"\n}\n";
        assert_eq!(evaluate(input.as_bytes()), ShimResult::Unchanged);
    }

    #[test]
    fn document_without_datasource_is_unchanged() {
        let input = b"generator client {\n  provider = \"go run github.com/steebchen/prisma-client-go\"\n}\n\nmodel User {\n  id String @id\n}\n";
        assert_eq!(evaluate(input), ShimResult::Unchanged);
        assert_eq!(evaluate(b""), ShimResult::Unchanged);
    }

    #[test]
    fn patch_preserves_every_original_byte() {
        let input: &[u8] = b"// header\ngenerator client {\n  provider = \"x\"\n}\n\ndatasource db {\n  provider = \"postgresql\"\n}\n\nmodel Post {\n  id Int @id\n}\n";
        let body = datasource_body(input).expect("body");
        let (document, injected) = patched(input);

        assert_eq!(document.len(), input.len() + INJECTED_URL_LINE.len());
        assert_eq!(injected, body.start..body.start + INJECTED_URL_LINE.len());
        assert_eq!(&document[..body.start], &input[..body.start]);
        assert_eq!(&document[injected.clone()], INJECTED_URL_LINE.as_bytes());
        assert_eq!(&document[injected.end..], &input[body.start..]);
    }

    #[test]
    fn patching_is_idempotent() {
        let input = b"datasource db {\n  provider = \"sqlite\"\n}\n";
        let (document, _) = patched(input);
        assert_eq!(evaluate(&document), ShimResult::Unchanged);
    }

    #[test]
    fn only_first_datasource_is_considered() {
        let input = b"datasource a {\n  provider = \"sqlite\"\n  url = \"file:a.db\"\n}\ndatasource b {\n  provider = \"sqlite\"\n}\n";
        assert_eq!(evaluate(input), ShimResult::Unchanged);

        let input = b"datasource a {\n  provider = \"sqlite\"\n}\ndatasource b {\n  provider = \"sqlite\"\n}\n";
        let (document, injected) = patched(input);
        assert_eq!(injected.start, "datasource a {".len());
        assert_eq!(
            document.len() - input.len(),
            INJECTED_URL_LINE.len(),
            "second block must not be patched"
        );
    }

    #[test]
    fn body_ends_at_first_closing_brace() {
        let input = b"datasource db {\n  provider = \"a}b\"\n  url = env(\"X\")\n}\n";
        let body = datasource_body(input).expect("body");
        assert_eq!(&input[body], b"\n  provider = \"a");
    }

    #[test]
    fn non_utf8_bytes_outside_block_survive() {
        let mut input = vec![0xff, 0xfe, b'\n'];
        input.extend_from_slice(b"datasource db {\n  provider = \"sqlite\"\n}\n");
        let (document, injected) = patched(&input);
        assert_eq!(&document[..3], &[0xff, 0xfe, b'\n']);
        assert_eq!(&document[injected.end..], &input[injected.start..]);
    }
}
