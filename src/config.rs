/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to defaults if the file is missing, unreadable or invalid;
/// missing keys take their individual defaults.
///
/// ```toml
/// [rules]
/// enemy_move_period = 30   # ticks between enemy steps
/// refill_delay = 120       # ticks until a dug brick returns
/// initial_lives = 3
///
/// [timing]
/// frame_ms = 16
/// move_cooldown_ms = 150
/// level_pause_ms = 2000
/// victory_pause_ms = 2000
///
/// [general]
/// levels_dir = "levels"
/// levels = [1, 2]
/// ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub rules: RulesConfig,
    pub timing: TimingConfig,
    pub levels_dir: PathBuf,
    pub levels: Vec<usize>,
}

/// Simulation constants, in ticks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RulesConfig {
    pub enemy_move_period: u64,
    pub refill_delay: u64,
    pub initial_lives: u32,
}

/// Front-end pacing, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    pub frame_ms: u64,
    pub move_cooldown_ms: u64,
    pub level_pause_ms: u64,
    pub victory_pause_ms: u64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        TomlRules::default().into()
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        TomlTiming::default().into()
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_enemy_move_period")]
    enemy_move_period: u64,
    #[serde(default = "default_refill_delay")]
    refill_delay: u64,
    #[serde(default = "default_initial_lives")]
    initial_lives: u32,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
    #[serde(default = "default_move_cooldown")]
    move_cooldown_ms: u64,
    #[serde(default = "default_level_pause")]
    level_pause_ms: u64,
    #[serde(default = "default_victory_pause")]
    victory_pause_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
    #[serde(default = "default_levels")]
    levels: Vec<usize>,
}

// ── Defaults ──

fn default_enemy_move_period() -> u64 { 30 }
fn default_refill_delay() -> u64 { 120 }
fn default_initial_lives() -> u32 { 3 }

fn default_frame_ms() -> u64 { 16 }       // ~60 ticks per second
fn default_move_cooldown() -> u64 { 150 }
fn default_level_pause() -> u64 { 2000 }
fn default_victory_pause() -> u64 { 2000 }

fn default_levels_dir() -> String { "levels".into() }
fn default_levels() -> Vec<usize> { vec![1, 2] }

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            enemy_move_period: default_enemy_move_period(),
            refill_delay: default_refill_delay(),
            initial_lives: default_initial_lives(),
        }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            frame_ms: default_frame_ms(),
            move_cooldown_ms: default_move_cooldown(),
            level_pause_ms: default_level_pause(),
            victory_pause_ms: default_victory_pause(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
            levels: default_levels(),
        }
    }
}

impl From<TomlRules> for RulesConfig {
    fn from(t: TomlRules) -> Self {
        RulesConfig {
            enemy_move_period: t.enemy_move_period,
            refill_delay: t.refill_delay,
            initial_lives: t.initial_lives,
        }
    }
}

impl From<TomlTiming> for TimingConfig {
    fn from(t: TomlTiming) -> Self {
        TimingConfig {
            frame_ms: t.frame_ms,
            move_cooldown_ms: t.move_cooldown_ms,
            level_pause_ms: t.level_pause_ms,
            victory_pause_ms: t.victory_pause_ms,
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::resolve(toml_cfg, &search_dirs)
    }

    /// Parse a config document. Relative `levels_dir` stays relative.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let toml_cfg: TomlConfig = toml::from_str(text)?;
        Ok(Self::resolve(toml_cfg, &[]))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text)
    }

    fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if Path::new(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        let mut levels = toml_cfg.general.levels;
        if levels.is_empty() {
            log::warn!("config lists no levels, using defaults");
            levels = default_levels();
        }

        GameConfig {
            rules: toml_cfg.rules.into(),
            timing: toml_cfg.timing.into(),
            levels_dir,
            levels,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::resolve(TomlConfig::default(), &[])
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// First readable, valid `config.toml` in `search_dirs`; defaults otherwise.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        let parsed = std::fs::read_to_string(&path)
            .map_err(|source| ConfigError::Read { path: path.clone(), source })
            .and_then(|text| toml::from_str::<TomlConfig>(&text).map_err(ConfigError::from));
        match parsed {
            Ok(cfg) => {
                log::info!("config loaded from {}", path.display());
                return cfg;
            }
            Err(e @ ConfigError::Parse(_)) => {
                log::warn!("{}: {e}; using default settings", path.display());
                return TomlConfig::default();
            }
            Err(e) => log::warn!("{e}"),
        }
    }
    log::debug!("no config.toml found, using default settings");
    TomlConfig::default()
}
