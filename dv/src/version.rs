use std::fmt::Write;

/// Build the `--version` text shared by the command line tools.
///
/// `release` is the git tag at HEAD and `commit` the HEAD hash; either is
/// omitted when empty (e.g. builds outside a git checkout).
pub fn version_banner(tool_name: &str, version: &str, release: &str, commit: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{tool_name}");
    let _ = writeln!(out, "License: GNU AGPL v3 (AGPL-3.0-only)");
    let _ = writeln!(out);

    let _ = writeln!(out, "\tVersion:     {version}");
    for (label, value) in [("Git tag:    ", release), ("Git commit: ", commit)] {
        if !value.is_empty() {
            let _ = writeln!(out, "\t{label} {value}");
        }
    }
    out
}

pub fn print_cli_version_banner(tool_name: &str, version: &str, release: &str, commit: &str) {
    print!("{}", version_banner(tool_name, version, release, commit));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_without_git_metadata() {
        let banner = version_banner("DV Player", "1.2.3", "", "");
        assert!(banner.starts_with("DV Player\n"));
        assert!(banner.contains("\tVersion:     1.2.3\n"));
        assert!(!banner.contains("Git"));
    }

    #[test]
    fn test_banner_with_tag_and_commit() {
        let banner = version_banner("DV Info Tool", "0.0.0", "v1.0", "abc123");
        assert!(banner.contains("\tGit tag:     v1.0\n"));
        assert!(banner.ends_with("\tGit commit:  abc123\n"));
    }
}
