//! Embeds `GIT_HASH` and `BUILD_TIME` for `mtadeploy --version`

use std::process::Command;

use chrono::Utc;

/// Short revision of the checkout, or "unknown" outside a git work tree
fn git_revision() -> String {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output();
    match output {
        Ok(out) if out.status.success() => {
            let revision = String::from_utf8_lossy(&out.stdout).trim().to_string();
            if revision.is_empty() {
                "unknown".to_string()
            } else {
                revision
            }
        }
        _ => "unknown".to_string(),
    }
}

fn main() {
    println!("cargo:rustc-env=GIT_HASH={}", git_revision());
    println!(
        "cargo:rustc-env=BUILD_TIME={}",
        Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    );

    // The package sits one level below the repository root.
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=build.rs");
}
