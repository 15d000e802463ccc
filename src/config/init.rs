// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates cutover.yml template files.

use std::path::Path;

use humantime_serde::re::humantime::format_duration;

use crate::error::{Error, Result};

use super::{CONFIG_FILENAME, Config};

/// Write a commented `cutover.yml` into `dir`. Refuses to overwrite unless `force`.
pub fn init_config(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let yaml = generate_template_yaml(&Config::template());
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(config: &Config) -> String {
    format!(
        r#"steady_state:
  # Time between two instance health polls
  poll_interval: {}
  # How long to wait for a group to become healthy when a task sets no timeout
  default_timeout: {}
"#,
        format_duration(config.steady_state.poll_interval),
        format_duration(config.steady_state.default_timeout),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_back_to_defaults() {
        let yaml = generate_template_yaml(&Config::template());
        assert_eq!(Config::from_yaml(&yaml).unwrap(), Config::default());
    }
}
