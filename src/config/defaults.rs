//! Default configuration values

use super::schema::Config;

/// Get the default configuration
pub fn default_config() -> Config {
    Config::default()
}

/// Built-in defaults as config file YAML, printed by `config defaults`
pub fn default_config_yaml() -> String {
    serde_yaml::to_string(&default_config()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_yaml_parses_back() {
        let yaml = default_config_yaml();
        let config: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config, default_config());
    }
}
