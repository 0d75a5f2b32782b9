//! `pmcheck init-config` - write a configuration file with every default spelled out

use std::path::Path;

use anyhow::bail;
use pmcheck_e2e::SuiteConfig;

use crate::output::print_success;

pub fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    SuiteConfig::default().save(path)?;
    print_success(&format!("Wrote default configuration to {}", path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pmcheck.toml");

        init(&path, false).unwrap();
        assert_eq!(SuiteConfig::load(&path).unwrap(), SuiteConfig::default());

        assert!(init(&path, false).is_err());
        init(&path, true).unwrap();
    }
}
