use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub connection: ConnectionSettings,
    #[serde(default)]
    pub window: WindowSettings,
    #[serde(default)]
    pub view: ViewSettings,
    #[serde(default)]
    pub notify: NotifySettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub address: String,
    pub websocket_path: String,
    pub last_session_path: String,
    /// Upper bound for every HTTP request to the server.
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            address: "localhost:3636".to_string(),
            websocket_path: "/websocket".to_string(),
            last_session_path: "/chart/last".to_string(),
            request_timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ConnectionSettings {
    pub connect_timeout_ms: u64,
    pub reconnect_prompt_delay_ms: u64,
}

impl ConnectionSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn reconnect_prompt_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_prompt_delay_ms)
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 1500,
            reconnect_prompt_delay_ms: 5000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WindowSettings {
    pub channels: usize,
    pub live_capacity: usize,
    pub history_capacity: usize,
    pub live_interval_seconds: f64,
    pub seed_value: f64,
    pub axis_ticks: usize,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            channels: 1,
            live_capacity: 2400,
            history_capacity: 1000,
            live_interval_seconds: 15.0,
            seed_value: 0.0,
            axis_ticks: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ViewSettings {
    pub listen_addr: String,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NotifySettings {
    pub bell: bool,
    pub user_stop_marker: String,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            bell: false,
            user_stop_marker: "stopped".to_string(),
        }
    }
}

/// Load `config/dashboard.*` (optional) overlaid with `REGEN_*` variables,
/// e.g. `REGEN_SERVER__ADDRESS=box.local:3636`.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("REGEN").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
