//! Directory skip rules.

/// How a skip rule compares against a directory name.
#[derive(Debug, Clone, Copy)]
enum Match {
    Exact,
    Prefix,
}

/// System, trash and metadata folders that never contain library media.
const SKIPPED_DIRECTORIES: &[(&str, Match)] = &[
    (".git", Match::Exact),
    ("node_modules", Match::Exact),
    ("@eadir", Match::Exact),
    ("#recycle", Match::Exact),
    ("@recycle", Match::Exact),
    ("$recycle.bin", Match::Exact),
    ("system volume information", Match::Exact),
    (".trash", Match::Prefix),
    (".spotlight-v100", Match::Exact),
    (".fseventsd", Match::Exact),
    (".appledouble", Match::Exact),
    ("lost+found", Match::Exact),
    ("#snapshot", Match::Exact),
    (".@__thumb", Match::Exact),
];

/// Whether a directory with this name should not be descended into.
pub fn should_skip_directory(name: &str) -> bool {
    let name = name.to_lowercase();
    SKIPPED_DIRECTORIES.iter().any(|(rule, kind)| match kind {
        Match::Exact => name == *rule,
        Match::Prefix => name.starts_with(rule),
    })
}
