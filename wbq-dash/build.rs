//! Embeds build identification into wbq-dash
//!
//! Sets GIT_HASH, BUILD_TIMESTAMP and BUILD_PROFILE for `env!`. When
//! SOURCE_DATE_EPOCH is set the timestamp is taken from it so packaged
//! builds are reproducible.

use std::process::Command;

use chrono::{DateTime, Local, SecondsFormat, Utc};

fn git_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    (!hash.is_empty()).then(|| hash.to_string())
}

fn build_timestamp() -> String {
    let pinned = std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|secs| secs.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

    match pinned {
        Some(at) => at.to_rfc3339_opts(SecondsFormat::Secs, true),
        None => Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
    }
}

fn main() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!(
        "cargo:rustc-env=GIT_HASH={}",
        git_hash().unwrap_or_else(|| "unknown".to_string())
    );
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", build_timestamp());
    println!("cargo:rustc-env=BUILD_PROFILE={}", profile);
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
}
