use std::env;
use std::fs;
use std::path::Path;

/// Copies the workspace `config.toml` next to the built binary
fn main() {
    println!("cargo:rerun-if-changed=../../config.toml");

    let Ok(out_dir) = env::var("OUT_DIR") else {
        return;
    };
    let profile = env::var("PROFILE").unwrap_or_else(|_| "debug".into());

    // OUT_DIR is target/<profile>/build/backend-xxx/out
    let Some(target_dir) = Path::new(&out_dir)
        .ancestors()
        .find(|p| p.ends_with(&profile))
    else {
        println!("cargo:warning=Could not find target profile directory, config.toml not copied");
        return;
    };

    let Some(workspace_root) = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
    else {
        return;
    };

    let source_config = workspace_root.join("config.toml");
    let dest_config = target_dir.join("config.toml");

    if source_config.exists() {
        if let Err(e) = fs::copy(&source_config, &dest_config) {
            println!("cargo:warning=Failed to copy config.toml: {}", e);
        }
    } else {
        println!(
            "cargo:warning=config.toml not found at {:?}, using default config",
            source_config
        );
    }
}
