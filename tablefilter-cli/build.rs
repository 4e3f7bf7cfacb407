// Build script to inject a version string from git tags
//
// Falls back to CARGO_PKG_VERSION when git is unavailable or the tree is
// not a repository.

use std::process::Command;

fn main() {
    let version = git_version().unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=TABLEFILTER_VERSION={}", version);
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");
}

fn git_version() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();

    match described.strip_prefix('v') {
        // "v0.2.0" or "v0.2.0-3-gabc123": keep the tag's version
        Some(tagged) => Some(tagged.split('-').next().unwrap_or(tagged).to_string()),
        // Untagged "abc123" or "abc123-dirty": package version plus commit
        None => Some(format!("{}-{}", env!("CARGO_PKG_VERSION"), described)),
    }
}
