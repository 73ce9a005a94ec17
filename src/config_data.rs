use std::fs::File;
use std::io;
use std::io::Write;
use std::path::PathBuf;

use crate::config::CFG_FILE_NAME;

const CONFIG_SAMPLE: &str = r#"# Address of the blog backend API. When deploying, point this at the
# address the front-end instance can actually reach; it can also be
# overridden with the INKDROP_BACKEND_URL environment variable.
[backend]
base_url = "http://localhost:5000"

# For the file locations, if you want them relative to the executable
# directory, use ${exe_dir}/location
[paths]
template_dir = "res/template"
public_dir = "res/public"

[server]
address = "0.0.0.0"
port = 8080

# [log]
# level = "Info"
# log_to_console = true
# location = "logs/inkdrop.log"

# [metrics]
# location = "logs/metrics.log"
# time_slot_secs = 60
"#;

pub fn write_sample_cfg(file_path: &PathBuf) -> io::Result<()> {
    let mut file = File::create(file_path)?;
    file.write_all(CONFIG_SAMPLE.as_bytes())
}

/// Writes the sample config to the given path, or to the user config dir
/// when no path is supplied. Returns where it landed.
pub fn generate_cfg(config_path: &Option<PathBuf>) -> io::Result<PathBuf> {
    let path: PathBuf = if let Some(ref path) = config_path {
        path.clone()
    } else {
        let cfg_dir = dirs::config_dir().expect("Could not find user config dir");
        cfg_dir.join(CFG_FILE_NAME)
    };

    write_sample_cfg(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use crate::config::Config;

    use super::*;

    #[test]
    fn test_sample_cfg_parses() {
        let cfg: Config = toml::from_str(CONFIG_SAMPLE).unwrap();
        assert_eq!(cfg.backend.base_url, "http://localhost:5000");
        assert_eq!(cfg.server.port, 8080);
        assert!(cfg.log.is_none());
        assert!(cfg.metrics.is_none());
    }
}
