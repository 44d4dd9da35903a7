use anyhow::Context;
use casegen_core::{config::Config, io, paths, record::ProjectStore};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing casegen in: {}", root.display());

    let dir = paths::casegen_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let config_path = paths::config_path(root);
    let config = if config_path.exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
        Config::load(root).context("failed to read config.yaml")?
    } else {
        let cfg = Config::default();
        cfg.save(root).context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
        cfg
    };

    let store = ProjectStore::from_config(root, &config);
    if store.dir().is_dir() {
        println!("  exists:  {}", store.dir().display());
    } else {
        io::ensure_dir(store.dir())
            .with_context(|| format!("failed to create {}", store.dir().display()))?;
        println!("  created: {}", store.dir().display());
    }

    println!();
    println!(
        "Set {} and {} (environment or .env) before running `casegen ui`.",
        config.model.api_key_env, config.identity.api_key_env
    );
    Ok(())
}
