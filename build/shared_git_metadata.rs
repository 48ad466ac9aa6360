use std::process::Command;

/// Run git with `args`, returning trimmed stdout or an empty string.
fn git_output(args: &[&str]) -> String {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_default()
}

pub fn emit_git_metadata() {
    // Re-run when HEAD or tags move so the version banner stays current.
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=../build/shared_git_metadata.rs");
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=../.git/refs");
    println!("cargo:rerun-if-changed=../.git/packed-refs");

    println!("cargo:rustc-env=GIT_COMMIT={}", git_output(&["rev-list", "-1", "HEAD"]));
    // Only set when HEAD is directly tagged
    println!(
        "cargo:rustc-env=RELEASE_VERSION={}",
        git_output(&["tag", "--points-at", "HEAD"])
    );
}
