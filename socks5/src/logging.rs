use anyhow::Result;
use log::LevelFilter;

/// Installs env_logger on stderr at `level`. `RUST_LOG`, when set, is
/// applied on top.
pub fn init(level: LevelFilter) -> Result<()> {
    env_logger::Builder::new()
        .filter_level(level)
        .target(env_logger::Target::Stderr)
        .parse_default_env()
        .try_init()?;
    Ok(())
}
