use crate::models::{PowerRoles, SensorCatalog};
use crate::series::{ReconcilePolicy, TimeRange};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub sensors: SensorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    #[serde(default = "default_table")]
    pub table: String,
    // Optional single-user sign-in; without it reads use the anon key
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_table() -> String {
    "home_assistant_data".into()
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
}

fn default_api_host() -> String {
    "0.0.0.0".into()
}

fn default_api_port() -> u16 {
    8080
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_range")]
    pub default_range: TimeRange,
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    #[serde(default)]
    pub policy: ReconcilePolicy,
}

fn default_range() -> TimeRange {
    TimeRange::SixHours
}

fn default_refresh_interval_ms() -> u64 {
    120_000
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_range: default_range(),
            refresh_interval_ms: default_refresh_interval_ms(),
            policy: ReconcilePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorsConfig {
    #[serde(default)]
    pub power: PowerRoles,
    #[serde(default)]
    pub catalog: SensorCatalog,
}

impl Config {
    /// Load YAML from disk, substitute $(VAR)/${VAR} with env vars, then parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let raw = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("reading {}", path.as_ref().display()))?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, anyhow::Error> {
        let expanded = expand_env_placeholders(raw)?;
        let mut cfg: Self = serde_yaml::from_str(&expanded)?;

        if let Ok(url) = std::env::var("SUPABASE_URL") {
            cfg.supabase.url = url;
        }
        if let Ok(key) = std::env::var("SUPABASE_ANON_KEY") {
            cfg.supabase.anon_key = key;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        if self.supabase.url.trim().is_empty() {
            bail!("supabase.url cannot be empty");
        }
        if self.supabase.anon_key.trim().is_empty() {
            bail!("supabase.anon_key cannot be empty");
        }
        if self.supabase.email.is_some() != self.supabase.password.is_some() {
            bail!("supabase.email and supabase.password must be set together");
        }
        if self.api.port == 0 {
            bail!("api.port cannot be 0");
        }
        if self.dashboard.refresh_interval_ms == 0 {
            bail!("dashboard.refresh_interval_ms cannot be 0");
        }
        if self.sensors.power.production == self.sensors.power.consumption {
            bail!("sensors.power.production and sensors.power.consumption must differ");
        }
        Ok(())
    }
}

/// Expand $(VAR) and ${VAR} placeholders using environment variables.
fn expand_env_placeholders(input: &str) -> Result<String, anyhow::Error> {
    let mut out = String::with_capacity(input.len());
    let mut it = input.chars().peekable();

    while let Some(c) = it.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let close = match it.peek().copied() {
            Some('$') => {
                it.next();
                out.push('$');
                continue;
            }
            Some('(') => ')',
            Some('{') => '}',
            _ => {
                out.push('$');
                continue;
            }
        };
        it.next();
        let var = take_placeholder(&mut it, close)
            .with_context(|| format!("unterminated env placeholder: missing '{}'", close))?;
        let val = std::env::var(&var)
            .with_context(|| format!("missing environment variable: {}", var))?;
        out.push_str(&val);
    }

    Ok(out)
}

/// Collects characters up to `close`, `None` when the input ends first.
fn take_placeholder(chars: &mut impl Iterator<Item = char>, close: char) -> Option<String> {
    let mut name = String::new();
    loop {
        match chars.next()? {
            c if c == close => return Some(name),
            c => name.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SensorKind;
    use serial_test::serial;

    const MINIMAL: &str = r#"
supabase:
  url: "https://project.supabase.co"
  anon_key: "anon"
"#;

    #[test]
    #[serial]
    fn test_minimal_config_uses_defaults() {
        let cfg = Config::from_yaml(MINIMAL).unwrap();

        assert_eq!(cfg.supabase.table, "home_assistant_data");
        assert_eq!(cfg.api.port, 8080);
        assert_eq!(cfg.dashboard.default_range, TimeRange::SixHours);
        assert_eq!(cfg.dashboard.refresh_interval_ms, 120_000);
        assert_eq!(cfg.dashboard.policy, ReconcilePolicy::ForwardFill);
        assert_eq!(cfg.sensors.power, PowerRoles::default());
        assert_eq!(cfg.sensors.catalog.sensors(SensorKind::Temperature).len(), 3);
    }

    #[test]
    #[serial]
    fn test_placeholders_are_expanded() {
        std::env::set_var("DASH_TEST_URL", "https://expanded.supabase.co");
        std::env::set_var("DASH_TEST_KEY", "k$y");

        let yaml = r#"
supabase:
  url: "$(DASH_TEST_URL)"
  anon_key: "${DASH_TEST_KEY}"
  password: "pa$$word"
  email: "me@example.com"
"#;
        let cfg = Config::from_yaml(yaml).unwrap();

        assert_eq!(cfg.supabase.url, "https://expanded.supabase.co");
        assert_eq!(cfg.supabase.anon_key, "k$y");
        assert_eq!(cfg.supabase.password.as_deref(), Some("pa$word"));

        std::env::remove_var("DASH_TEST_URL");
        std::env::remove_var("DASH_TEST_KEY");
    }

    #[test]
    #[serial]
    fn test_missing_placeholder_variable_fails() {
        let err = expand_env_placeholders("url: $(DASH_TEST_DOES_NOT_EXIST)").unwrap_err();
        assert!(err.to_string().contains("DASH_TEST_DOES_NOT_EXIST"));
        assert!(expand_env_placeholders("url: ${UNTERMINATED").is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides_yaml() {
        std::env::set_var("SUPABASE_URL", "https://override.supabase.co");
        let cfg = Config::from_yaml(MINIMAL);
        std::env::remove_var("SUPABASE_URL");

        assert_eq!(cfg.unwrap().supabase.url, "https://override.supabase.co");
    }

    #[test]
    #[serial]
    fn test_validation_rejects_bad_values() {
        let same_roles = format!(
            "{}\nsensors:\n  power:\n    production: sensor.x\n    consumption: sensor.x\n",
            MINIMAL
        );
        assert!(Config::from_yaml(&same_roles).is_err());

        let zero_refresh = format!("{}\ndashboard:\n  refresh_interval_ms: 0\n", MINIMAL);
        assert!(Config::from_yaml(&zero_refresh).is_err());

        let half_credentials = format!("{}  email: me@example.com\n", MINIMAL);
        assert!(Config::from_yaml(&half_credentials).is_err());
    }

    #[test]
    #[serial]
    fn test_example_config_parses() {
        for (var, value) in [
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("DASHBOARD_EMAIL", "me@example.com"),
            ("DASHBOARD_PASSWORD", "secret"),
        ] {
            std::env::set_var(var, value);
        }
        let cfg = Config::from_yaml(include_str!("../config/config.example.yaml"));
        for var in [
            "SUPABASE_URL",
            "SUPABASE_ANON_KEY",
            "DASHBOARD_EMAIL",
            "DASHBOARD_PASSWORD",
        ] {
            std::env::remove_var(var);
        }

        let cfg = cfg.unwrap();
        assert_eq!(cfg.supabase.email.as_deref(), Some("me@example.com"));
        assert_eq!(
            cfg.sensors.catalog.full_selection(),
            SensorCatalog::default().full_selection()
        );
    }

    #[test]
    #[serial]
    fn test_dashboard_section_parses_tokens() {
        let yaml = format!(
            "{}\ndashboard:\n  default_range: \"24h\"\n  policy: strict_coincidence\n",
            MINIMAL
        );
        let cfg = Config::from_yaml(&yaml).unwrap();

        assert_eq!(cfg.dashboard.default_range, TimeRange::OneDay);
        assert_eq!(cfg.dashboard.policy, ReconcilePolicy::StrictCoincidence);
    }
}
