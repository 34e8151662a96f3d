use std::process::Command;

fn git_sha(repo_root: &str) -> Option<String> {
    let out = Command::new("git")
        .args(["-C", repo_root, "rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let sha = String::from_utf8_lossy(&out.stdout).trim().to_string();
    (!sha.is_empty()).then_some(sha)
}

fn main() {
    println!("cargo:rerun-if-env-changed=TEMPO_BUILD_SHA");

    // Packaged builds have no .git; let the packager pass the revision in.
    let sha = std::env::var("TEMPO_BUILD_SHA").ok().filter(|s| !s.is_empty()).or_else(|| {
        let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
        git_sha(&format!("{manifest_dir}/.."))
    });

    println!("cargo:rustc-env=TEMPO_BUILD_SHA={}", sha.as_deref().unwrap_or("unknown"));
}
