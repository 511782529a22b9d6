//! restdb init command

use clap::Args;
use shared::{RestConfig, DEFAULT_CONFIG_FILE};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct InitCommand {
    /// Directory to write the config file into
    #[arg(default_value = ".")]
    pub directory: PathBuf,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

impl InitCommand {
    pub fn run(&self) -> anyhow::Result<()> {
        let path = self.write_template()?;
        println!("✓ Wrote {}", path.display());
        println!("  Set url and apiKey, or export RESTDB_URL and RESTDB_API_KEY");
        Ok(())
    }

    fn write_template(&self) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(&self.directory)?;
        let path = self.directory.join(DEFAULT_CONFIG_FILE);

        if is_initialized(&self.directory) && !self.force {
            anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
        }

        let template = RestConfig::new("https://your-project.supabase.co", "");
        std::fs::write(&path, serde_json::to_string_pretty(&template)?)?;
        Ok(path)
    }
}

/// True when `dir` already holds a config file
pub fn is_initialized(dir: &Path) -> bool {
    dir.join(DEFAULT_CONFIG_FILE).exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_loadable_template() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = InitCommand {
            directory: dir.path().to_path_buf(),
            force: false,
        };

        let path = cmd.write_template().unwrap();
        assert!(is_initialized(dir.path()));

        let config = RestConfig::from_file(&path).unwrap();
        assert_eq!(config.url, "https://your-project.supabase.co");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "{}").unwrap();

        let cmd = InitCommand {
            directory: dir.path().to_path_buf(),
            force: false,
        };
        assert!(cmd.write_template().is_err());

        let cmd = InitCommand {
            directory: dir.path().to_path_buf(),
            force: true,
        };
        assert!(cmd.write_template().is_ok());
    }
}
