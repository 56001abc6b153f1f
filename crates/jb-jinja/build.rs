//! Embeds the resolved MiniJinja version for `jb template:version`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const FALLBACK_VERSION: &str = "2";

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_default());

    let version = match find_lock_file(&manifest_dir) {
        Some(lock_path) => {
            println!("cargo:rerun-if-changed={}", lock_path.display());
            match fs::read_to_string(&lock_path)
                .ok()
                .and_then(|lock| locked_version(&lock, "minijinja"))
            {
                Some(version) => version,
                None => {
                    println!(
                        "cargo:warning=minijinja is not listed in {}; reporting version {}",
                        lock_path.display(),
                        FALLBACK_VERSION
                    );
                    FALLBACK_VERSION.to_string()
                }
            }
        }
        None => {
            println!(
                "cargo:warning=no Cargo.lock found above {}; reporting minijinja version {}",
                manifest_dir.display(),
                FALLBACK_VERSION
            );
            FALLBACK_VERSION.to_string()
        }
    };
    println!("cargo:rustc-env=JB_MINIJINJA_VERSION={version}");
}

/// Nearest `Cargo.lock` in `dir` or one of its ancestors.
fn find_lock_file(dir: &Path) -> Option<PathBuf> {
    dir.ancestors()
        .map(|ancestor| ancestor.join("Cargo.lock"))
        .find(|candidate| candidate.is_file())
}

/// Find `version = "..."` of the `[[package]]` entry named `name`.
fn locked_version(lock: &str, name: &str) -> Option<String> {
    let wanted = format!("name = \"{name}\"");
    let mut lines = lock.lines();
    while let Some(line) = lines.next() {
        if line.trim() != wanted {
            continue;
        }
        let next = lines.next()?.trim();
        let version = next.strip_prefix("version = \"")?.strip_suffix('"')?;
        return Some(version.to_string());
    }
    None
}
