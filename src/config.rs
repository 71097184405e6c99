/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD, or
/// `~/.local/share/snakegrid`. Missing file or missing keys fall back
/// to defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use tracing_subscriber::filter::LevelFilter;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub view: ViewConfig,
    /// PNG sprite sheet; `None` means the procedural template.
    pub sprite_template: Option<PathBuf>,
    pub log: LogConfig,
}

#[derive(Clone, Debug)]
pub struct ViewConfig {
    pub frame_ms: u64,
    pub event_interval_ms: u64,
    pub border: usize,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub level: LevelFilter,
    pub file: PathBuf,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    view: TomlView,
    #[serde(default)]
    sprite: TomlSprite,
    #[serde(default)]
    log: TomlLog,
}

#[derive(Deserialize, Debug)]
struct TomlView {
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
    #[serde(default = "default_event_interval")]
    event_interval_ms: u64,
    #[serde(default = "default_border")]
    border: usize,
}

#[derive(Deserialize, Debug, Default)]
struct TomlSprite {
    #[serde(default)]
    template: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_level")]
    level: String,
    #[serde(default = "default_log_file")]
    file: String,
}

// ── Defaults ──

fn default_frame_ms() -> u64 { 30 }
fn default_event_interval() -> u64 { 120 }
fn default_border() -> usize { 1 }
fn default_level() -> String { "info".into() }
fn default_log_file() -> String { "snakegrid.log".into() }

impl Default for TomlView {
    fn default() -> Self {
        TomlView {
            frame_ms: default_frame_ms(),
            event_interval_ms: default_event_interval(),
            border: default_border(),
        }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog {
            level: default_level(),
            file: default_log_file(),
        }
    }
}

// ── Loading ──

impl ClientConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) `~/.local/share/snakegrid`.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::resolve(toml_cfg, &search_dirs)
    }

    fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let level = parse_level(&toml_cfg.log.level).unwrap_or_else(|| {
            eprintln!("Warning: unknown log level {:?}, using info", toml_cfg.log.level);
            LevelFilter::INFO
        });

        // Relative sprite paths are looked up next to config.toml.
        let sprite_template = toml_cfg.sprite.template.map(|t| {
            let path = PathBuf::from(&t);
            if path.is_absolute() {
                path
            } else {
                search_dirs.iter()
                    .map(|d| d.join(&t))
                    .find(|p| p.is_file())
                    .unwrap_or(path)
            }
        });

        ClientConfig {
            view: ViewConfig {
                frame_ms: toml_cfg.view.frame_ms.max(1),
                event_interval_ms: toml_cfg.view.event_interval_ms,
                border: toml_cfg.view.border,
            },
            sprite_template,
            log: LogConfig {
                level,
                file: PathBuf::from(toml_cfg.log.file),
            },
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::resolve(TomlConfig::default(), &[])
    }
}

fn parse_level(s: &str) -> Option<LevelFilter> {
    match s.to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::OFF),
        "error" => Some(LevelFilter::ERROR),
        "warn" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        _ => None,
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data home (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/snakegrid)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/snakegrid");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match read_toml(&path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    eprintln!("Warning: {e}");
                    eprintln!("Using default settings.");
                    return TomlConfig::default();
                }
            }
        }
    }
    TomlConfig::default()
}

fn read_toml(path: &Path) -> Result<TomlConfig, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read {}: {e}", path.display()))?;
    toml::from_str::<TomlConfig>(&text)
        .map_err(|e| format!("{} parse error: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ClientConfig {
        ClientConfig::resolve(toml::from_str(text).unwrap(), &[])
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = parse("");
        assert_eq!(cfg.view.frame_ms, 30);
        assert_eq!(cfg.view.event_interval_ms, 120);
        assert_eq!(cfg.view.border, 1);
        assert!(cfg.sprite_template.is_none());
        assert_eq!(cfg.log.level, LevelFilter::INFO);
        assert_eq!(cfg.log.file, PathBuf::from("snakegrid.log"));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = parse("[view]\nevent_interval_ms = 40\n\n[log]\nlevel = \"DEBUG\"\n");
        assert_eq!(cfg.view.event_interval_ms, 40);
        assert_eq!(cfg.view.frame_ms, 30);
        assert_eq!(cfg.log.level, LevelFilter::DEBUG);
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let cfg = parse("[log]\nlevel = \"loud\"\n");
        assert_eq!(cfg.log.level, LevelFilter::INFO);
    }

    #[test]
    fn absolute_sprite_path_is_kept() {
        let cfg = parse("[sprite]\ntemplate = \"/tmp/snake.png\"\n");
        assert_eq!(cfg.sprite_template, Some(PathBuf::from("/tmp/snake.png")));
    }

    #[test]
    fn zero_frame_time_is_clamped() {
        let cfg = parse("[view]\nframe_ms = 0\n");
        assert_eq!(cfg.view.frame_ms, 1);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("snakegrid-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[view\nframe_ms = ").unwrap();
        let result = read_toml(&path);
        let _ = std::fs::remove_file(&path);
        assert!(result.is_err());
    }
}
