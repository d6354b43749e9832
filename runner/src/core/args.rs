//! Locating and rewriting the `--schema` flag in a raw Prisma argument list.

const SCHEMA_FLAG: &str = "--schema";
const SCHEMA_FLAG_JOINED: &str = "--schema=";

/// How the schema flag was spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagEncoding {
    /// `--schema <value>` as two tokens.
    Split,
    /// `--schema=<value>` as one token.
    Joined,
}

/// First schema flag found in an argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaFlag<'a> {
    /// Index of the token holding the flag itself.
    pub index: usize,
    pub encoding: FlagEncoding,
    pub value: &'a str,
}

/// Find the first `--schema` flag, scanning left to right.
///
/// A trailing `--schema` with no value token after it is skipped.
pub fn find_schema_flag(args: &[String]) -> Option<SchemaFlag<'_>> {
    for (index, arg) in args.iter().enumerate() {
        if arg == SCHEMA_FLAG
            && let Some(value) = args.get(index + 1)
        {
            return Some(SchemaFlag {
                index,
                encoding: FlagEncoding::Split,
                value,
            });
        }
        if let Some(value) = arg.strip_prefix(SCHEMA_FLAG_JOINED) {
            return Some(SchemaFlag {
                index,
                encoding: FlagEncoding::Joined,
                value,
            });
        }
    }
    None
}

/// Return the schema path passed on the command line, if any.
pub fn locate_schema(args: &[String]) -> Option<&str> {
    find_schema_flag(args).map(|flag| flag.value)
}

/// Point the schema flag at `path`.
///
/// The first schema flag keeps its encoding and position; without one,
/// `--schema <path>` is appended. The input is left untouched.
pub fn rewrite_schema_arg(args: &[String], path: &str) -> Vec<String> {
    let mut rewritten = args.to_vec();
    match find_schema_flag(args) {
        Some(SchemaFlag {
            index,
            encoding: FlagEncoding::Split,
            ..
        }) => rewritten[index + 1] = path.to_string(),
        Some(SchemaFlag {
            index,
            encoding: FlagEncoding::Joined,
            ..
        }) => rewritten[index] = format!("{SCHEMA_FLAG_JOINED}{path}"),
        None => {
            rewritten.push(SCHEMA_FLAG.to_string());
            rewritten.push(path.to_string());
        }
    }
    rewritten
}
