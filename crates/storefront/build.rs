//! Build script for the storefront crate.
//!
//! Stamps `main.css` with a short content hash so the stylesheet can be
//! served with a long cache lifetime.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Hex characters of the digest kept in the file name.
const HASH_LEN: usize = 8;

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let static_css = Path::new(&manifest_dir).join("static/css");
    let source = static_css.join("main.css");

    println!("cargo:rerun-if-changed={}", source.display());

    let Ok(content) = fs::read(&source) else {
        println!("cargo:warning=main.css not found, serving unhashed stylesheet");
        println!("cargo:rustc-env=CSS_HASH=");
        return;
    };

    let digest = format!("{:x}", Sha256::digest(&content));
    let hash = digest.get(..HASH_LEN).unwrap_or(&digest);
    println!("cargo:rustc-env=CSS_HASH={hash}");

    // Templates link `/static/css/derived/main.<hash>.css`
    let derived = static_css.join("derived");
    fs::create_dir_all(&derived).expect("Failed to create derived CSS directory");
    fs::copy(&source, derived.join(format!("main.{hash}.css")))
        .expect("Failed to copy hashed stylesheet");
}
