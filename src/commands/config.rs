use crate::commands::Session;
use crate::services::config::starter_toml;
use crate::services::output::print_one;
use anyhow::Context;
use std::path::Path;

pub fn handle_show(json: bool, session: &Session) -> anyhow::Result<()> {
    let masked = session.cfg.masked();
    if json {
        return print_one(true, masked, |_| String::new());
    }
    println!("# source: {}", session.source.describe());
    print!("{}", toml::to_string_pretty(&masked)?);
    Ok(())
}

pub fn handle_init(json: bool, path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite",
            path.display()
        );
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    std::fs::write(path, starter_toml()?)
        .with_context(|| format!("cannot write {}", path.display()))?;
    print_one(json, path.display().to_string(), |p| format!("wrote {}", p))
}
