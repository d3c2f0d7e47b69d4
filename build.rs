use std::process::Command;

fn git_output(args: &[&str]) -> Option<String> {
    let out = Command::new("git").args(args).output().ok()?;
    out.status
        .success()
        .then(|| String::from_utf8_lossy(&out.stdout).trim().to_string())
}

/// Revision reported by `/api/v1/health`. `BUILD_REVISION` wins, for builds
/// outside a git checkout.
fn revision() -> String {
    if let Some(rev) = std::env::var("BUILD_REVISION").ok().filter(|r| !r.is_empty()) {
        return rev;
    }
    match git_output(&["rev-parse", "--short", "HEAD"]) {
        Some(hash) => {
            let dirty = git_output(&["status", "--porcelain", "--untracked-files=no"])
                .is_some_and(|s| !s.is_empty());
            if dirty { format!("{hash}-dirty") } else { hash }
        }
        None => "unknown".to_string(),
    }
}

fn main() {
    println!("cargo:rustc-env=GIT_HASH={}", revision());
    println!("cargo:rerun-if-env-changed=BUILD_REVISION");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
}
