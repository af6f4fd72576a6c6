use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::defs::DEFAULT_INTER_ANNOUNCEMENT_DELAY;
use crate::player::{PlayerSettings, SoundDelays};

pub const DEFAULT_CONFIG_PATH: &str = "conf/announcer.conf";

#[derive(Debug, Clone)]
pub struct AnnouncerConfig {
    pub database_url: String,
    pub game_id: Option<String>,
    pub poll_interval: u64,
    pub timeout: u64,
    pub language: String,
    pub voice: Option<String>,
    pub speech_rate: f32,
    pub inter_announcement_delay_ms: u64,
    pub sound_delays: SoundDelays,
    pub speech_program: String,
    pub speech_args: Vec<String>,
    pub announce_backlog: bool,
    pub announce_numbers: bool,
    pub muted: bool,
    pub log_level: String,
}

impl Default for AnnouncerConfig {
    fn default() -> Self {
        Self {
            database_url: "http://127.0.0.1:9000".to_string(),
            game_id: None,
            poll_interval: 2,
            timeout: 30,
            language: "en-IN".to_string(),
            voice: None,
            speech_rate: 1.0,
            inter_announcement_delay_ms: DEFAULT_INTER_ANNOUNCEMENT_DELAY.as_millis() as u64,
            sound_delays: SoundDelays::default(),
            speech_program: "espeak-ng".to_string(),
            speech_args: vec!["-v".to_string(), "{voice}".to_string(), "-s".to_string(), "{rate}".to_string()],
            announce_backlog: false,
            announce_numbers: true,
            muted: false,
            log_level: "info".to_string(),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn parse_millis(config_map: &HashMap<String, String>, key: &str, default: Duration) -> Duration {
    config_map
        .get(key)
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

impl AnnouncerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Self::from_str_content(&content)
    }

    pub fn from_str_content(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config_map = parse_config(content)?;
        let defaults = Self::default();

        let database_url = config_map
            .get("database_url")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.database_url);

        let game_id = config_map.get("game_id").filter(|id| !id.is_empty()).cloned();

        let poll_interval = config_map
            .get("poll_interval")
            .and_then(|p| p.parse::<u64>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(defaults.poll_interval);

        let timeout = config_map
            .get("timeout")
            .and_then(|t| t.parse::<u64>().ok())
            .unwrap_or(defaults.timeout);

        let language = config_map.get("language").cloned().unwrap_or(defaults.language);

        let voice = config_map.get("voice").filter(|v| !v.is_empty()).cloned();

        let speech_rate = config_map
            .get("speech_rate")
            .and_then(|r| r.parse::<f32>().ok())
            .filter(|r| *r > 0.0)
            .unwrap_or(defaults.speech_rate);

        let inter_announcement_delay_ms = config_map
            .get("inter_announcement_delay_ms")
            .and_then(|d| d.parse::<u64>().ok())
            .unwrap_or(defaults.inter_announcement_delay_ms);

        let sound_delays = SoundDelays {
            win: parse_millis(&config_map, "sound_delay_win_ms", defaults.sound_delays.win),
            jackpot: parse_millis(&config_map, "sound_delay_jackpot_ms", defaults.sound_delays.jackpot),
            fanfare: parse_millis(&config_map, "sound_delay_fanfare_ms", defaults.sound_delays.fanfare),
            applause: parse_millis(&config_map, "sound_delay_applause_ms", defaults.sound_delays.applause),
        };

        let speech_program = config_map.get("speech_program").cloned().unwrap_or(defaults.speech_program);

        let speech_args = config_map
            .get("speech_args")
            .map(|args| args.split_whitespace().map(str::to_string).collect())
            .unwrap_or(defaults.speech_args);

        let announce_backlog = config_map
            .get("announce_backlog")
            .and_then(|b| parse_bool(b))
            .unwrap_or(defaults.announce_backlog);

        let announce_numbers = config_map
            .get("announce_numbers")
            .and_then(|b| parse_bool(b))
            .unwrap_or(defaults.announce_numbers);

        let muted = config_map.get("muted").and_then(|b| parse_bool(b)).unwrap_or(defaults.muted);

        let log_level = config_map.get("log_level").cloned().unwrap_or(defaults.log_level);

        Ok(AnnouncerConfig {
            database_url,
            game_id,
            poll_interval,
            timeout,
            language,
            voice,
            speech_rate,
            inter_announcement_delay_ms,
            sound_delays,
            speech_program,
            speech_args,
            announce_backlog,
            announce_numbers,
            muted,
            log_level,
        })
    }

    pub fn load_or_default() -> Self {
        Self::load_from_or_default(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from_or_default<P: AsRef<Path>>(config_path: P) -> Self {
        let config_path = config_path.as_ref();
        match Self::from_file(config_path) {
            Ok(config) => {
                log::info!("Loaded announcer configuration from {}", config_path.display());
                config
            }
            Err(e) => {
                log::warn!("Could not load config from {}: {}. Using defaults.", config_path.display(), e);
                Self::default()
            }
        }
    }

    pub fn inter_announcement_delay(&self) -> Duration {
        Duration::from_millis(self.inter_announcement_delay_ms)
    }

    pub fn player_settings(&self) -> PlayerSettings {
        PlayerSettings {
            language: self.language.clone(),
            preferred_voice: self.voice.clone(),
            rate: self.speech_rate,
            sound_delays: self.sound_delays.clone(),
        }
    }
}

fn parse_config(content: &str) -> Result<HashMap<String, String>, Box<dyn std::error::Error>> {
    let mut config = HashMap::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Parse key = value pairs
        match line.split_once('=') {
            Some((key, value)) => {
                let key = key.trim().to_string();
                let value = value.trim().to_string();
                config.insert(key, value);
            }
            None => return Err(format!("line {}: expected 'key = value', got '{}'", line_no + 1, line).into()),
        }
    }

    Ok(config)
}
