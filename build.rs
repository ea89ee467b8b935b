use std::process::Command;

/// Short commit hash for `/api/v1/health`; `UNIPAY_BUILD_VERSION` wins when set
/// (container builds have no `.git`).
fn build_version() -> String {
    if let Ok(version) = std::env::var("UNIPAY_BUILD_VERSION") {
        if !version.trim().is_empty() {
            return version.trim().to_string();
        }
    }

    Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|hash| !hash.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    println!("cargo:rustc-env=GIT_HASH={}", build_version());
    println!("cargo:rerun-if-env-changed=UNIPAY_BUILD_VERSION");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads");
    println!("cargo:rerun-if-changed=migrations");
}
