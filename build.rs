// Build script to extract version from Cargo.toml
// and optionally override patch version from CI/CD pipeline

use std::env;

fn main() {
    let version = env::var("CARGO_PKG_VERSION").expect("CARGO_PKG_VERSION not set");

    let parts: Vec<&str> = version.split('.').collect();
    if parts.len() != 3 {
        panic!("Invalid version format in Cargo.toml: {}", version);
    }

    let major = parts[0];
    let minor = parts[1];
    let patch = parts[2];

    // Release builds stamp the patch segment from the pipeline
    let final_patch =
        env::var("TELEPROMPTER_PATCH_VERSION").unwrap_or_else(|_| patch.to_string());

    let final_version = format!("{}.{}.{}", major, minor, final_patch);

    println!("cargo:rustc-env=TELEPROMPTER_VERSION={}", final_version);

    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-changed=migrations");
    println!("cargo:rerun-if-env-changed=TELEPROMPTER_PATCH_VERSION");
}
