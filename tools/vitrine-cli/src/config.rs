//! Config file discovery and scaffolding.

use std::path::{Path, PathBuf};

use anyhow::Result;
use vitrine_commerce::StoreConfig;

/// File names searched for, in order, in each directory.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["vitrine.toml", ".vitrine.toml", "vitrine.json"];

/// Find a config file in `start` or any parent directory.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    })
}

/// Render a commented config file holding `config`.
pub fn generate_default_config(config: &StoreConfig) -> Result<String> {
    let body = config.to_toml_string()?;
    Ok(format!(
        "# Vitrine store configuration\n\
         #\n\
         # Amounts are in minor units (centavos for BRL).\n\
         # Shipping is free when the cart subtotal is strictly above\n\
         # free_shipping_threshold_cents.\n\n{body}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_config_parses_back() {
        let config = StoreConfig::default();
        let rendered = generate_default_config(&config).unwrap();
        assert!(rendered.starts_with("# Vitrine store configuration"));
        assert_eq!(StoreConfig::from_toml_str(&rendered).unwrap(), config);
    }

    #[test]
    fn test_find_config_walks_up() {
        let root = std::env::temp_dir().join(format!("vitrine-cli-{}", std::process::id()));
        let nested = root.join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join(".vitrine.toml"), "").unwrap();

        assert_eq!(find_config_file(&nested), Some(root.join(".vitrine.toml")));

        std::fs::remove_dir_all(&root).unwrap();
    }
}
