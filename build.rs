// SPDX-License-Identifier: GPL-3.0-only

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-env-changed=PROMO_STUDIO_VERSION");

    // Packagers can pin the version string explicitly
    let version = match std::env::var("PROMO_STUDIO_VERSION") {
        Ok(v) => v,
        Err(_) => git_version().unwrap_or_else(|| {
            std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "unknown".to_string())
        }),
    };

    println!("cargo::rustc-env=STUDIO_BUILD_VERSION={}", version);
}

/// `git describe` output with the leading `v` stripped, or None outside a checkout
fn git_version() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--match", "v*"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let described = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if described.is_empty() {
        return None;
    }
    Some(described.strip_prefix('v').unwrap_or(&described).to_string())
}
