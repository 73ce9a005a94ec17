use std::io::ErrorKind;
use std::path::PathBuf;
use std::{env, fs, io};

use serde::Deserialize;

pub const CFG_FILE_NAME: &str = "inkdrop.toml";

/// Environment override for the backend address, so deployments can point
/// the front-end somewhere else without touching the config file.
pub const BACKEND_URL_ENV: &str = "INKDROP_BACKEND_URL";

#[derive(Deserialize)]
pub struct Backend {
    pub base_url: String,
}

#[derive(Deserialize)]
pub struct Paths {
    pub template_dir: PathBuf,
    pub public_dir: PathBuf,
}

#[derive(Deserialize)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

#[derive(Deserialize)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize)]
pub struct Metrics {
    pub location: Option<PathBuf>,
    pub time_slot_secs: Option<i64>,
}

#[derive(Deserialize)]
pub struct Config {
    pub backend: Backend,
    pub paths: Paths,
    pub server: Server,
    pub log: Option<Log>,
    pub metrics: Option<Metrics>,
}

fn parse_path(path: PathBuf) -> PathBuf {
    if path.starts_with("${exe_dir}") {
        let cur_exe = env::current_exe().unwrap();
        let exe_dir = cur_exe.parent().unwrap().to_str().unwrap();
        let str_path = path.to_str().unwrap();
        PathBuf::from(str_path.replace("${exe_dir}", exe_dir))
    } else {
        path
    }
}

pub fn read_config(cfg_path: &PathBuf) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.to_str().unwrap(), e))),
    };

    let mut cfg: Config = match toml::from_str::<Config>(cfg_content.as_str()) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.paths = Paths {
        template_dir: parse_path(cfg.paths.template_dir),
        public_dir: parse_path(cfg.paths.public_dir),
    };

    if let Ok(base_url) = env::var(BACKEND_URL_ENV) {
        cfg.backend.base_url = base_url;
    }

    Ok(cfg)
}

fn find_config_path() -> Option<PathBuf> {
    let exe_path = env::current_exe().unwrap();
    let exe_dir = exe_path.parent().unwrap();
    let cur_dir = env::current_dir().unwrap();

    if exe_dir.join(CFG_FILE_NAME).exists() {
        return Some(exe_dir.join(CFG_FILE_NAME));
    }

    if cur_dir.join(CFG_FILE_NAME).exists() {
        return Some(cur_dir.join(CFG_FILE_NAME));
    }

    let cfg_dir = dirs::config_dir().expect("Could not find user config dir");
    if cfg_dir.join(CFG_FILE_NAME).exists() {
        return Some(cfg_dir.join(CFG_FILE_NAME));
    }

    None
}

pub fn open_config(cfg_path: Option<PathBuf>) -> Result<Config, String> {
    let config_path = cfg_path.unwrap_or(match find_config_path() {
        None => return Err("Could not find InkDrop configuration".to_string()),
        Some(x) => x,
    });

    println!("Reading config from {}", config_path.to_str().unwrap());
    match read_config(&config_path) {
        Ok(config) => Ok(config),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CFG_SRC: &str = r##"
[backend]
base_url = "http://10.0.1.20:5000"

[paths]
template_dir = "res/template"
public_dir = "res/public"

[server]
address = "0.0.0.0"
port = 8080

[log]
level = "Info"
log_to_console = true

[metrics]
location = "logs/metrics.log"
time_slot_secs = 60
"##;

    #[test]
    fn test_parse_config() {
        let cfg: Config = toml::from_str(CFG_SRC).unwrap();
        assert_eq!(cfg.backend.base_url, "http://10.0.1.20:5000");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.paths.template_dir, PathBuf::from("res/template"));
        assert!(cfg.log.is_some());
        assert_eq!(cfg.metrics.as_ref().unwrap().time_slot_secs, Some(60));
    }

    #[test]
    fn test_optional_tables_can_be_missing() {
        let minimal = r##"
[backend]
base_url = "http://localhost:5000"

[paths]
template_dir = "template"
public_dir = "public"

[server]
address = "127.0.0.1"
port = 8080
"##;
        let cfg: Config = toml::from_str(minimal).unwrap();
        assert!(cfg.log.is_none());
        assert!(cfg.metrics.is_none());
    }
}
