use std::path::PathBuf;

pub const HISTORY_FILE_VAR: &str = "MTG_HISTORY_FILE";
pub const LOG_FILTER_VAR: &str = "MTG_LOG";

/// Settings resolved from the environment; command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliConfig {
    /// Where calculation history is persisted. History is off when unset.
    pub history_file: Option<PathBuf>,
    /// `tracing-subscriber` filter directive, e.g. `mortgage_tools_core=debug`.
    pub log_filter: Option<String>,
}

impl CliConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            history_file: non_empty(HISTORY_FILE_VAR).map(PathBuf::from),
            log_filter: non_empty(LOG_FILTER_VAR),
        }
    }

    /// Apply the `--history-file` flag over the environment value.
    pub fn with_history_flag(mut self, flag: Option<String>) -> Self {
        if let Some(path) = flag {
            self.history_file = Some(PathBuf::from(path));
        }
        self
    }

    /// Filter used when initialising logging: `MTG_LOG` wins, then `--verbose`.
    pub fn log_directive(&self, verbose: bool) -> String {
        match (&self.log_filter, verbose) {
            (Some(filter), _) => filter.clone(),
            (None, true) => "debug".to_string(),
            (None, false) => "warn".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_empty_environment() {
        let config = CliConfig::from_lookup(lookup(&[]));
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.log_directive(false), "warn");
        assert_eq!(config.log_directive(true), "debug");
    }

    #[test]
    fn test_reads_variables() {
        let config = CliConfig::from_lookup(lookup(&[
            (HISTORY_FILE_VAR, "/tmp/mtg-history.json"),
            (LOG_FILTER_VAR, "mortgage_tools_core=trace"),
        ]));
        assert_eq!(
            config.history_file,
            Some(PathBuf::from("/tmp/mtg-history.json"))
        );
        assert_eq!(config.log_directive(false), "mortgage_tools_core=trace");
    }

    #[test]
    fn test_blank_values_ignored() {
        let config = CliConfig::from_lookup(lookup(&[(HISTORY_FILE_VAR, "  ")]));
        assert_eq!(config.history_file, None);
    }

    #[test]
    fn test_flag_overrides_env() {
        let config = CliConfig::from_lookup(lookup(&[(HISTORY_FILE_VAR, "env.json")]))
            .with_history_flag(Some("flag.json".into()));
        assert_eq!(config.history_file, Some(PathBuf::from("flag.json")));

        let kept = CliConfig::from_lookup(lookup(&[(HISTORY_FILE_VAR, "env.json")]))
            .with_history_flag(None);
        assert_eq!(kept.history_file, Some(PathBuf::from("env.json")));
    }
}
