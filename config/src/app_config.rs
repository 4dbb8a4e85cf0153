use directories::ProjectDirs;
use std::{
    env,
    path::PathBuf,
};

lazy_static::lazy_static! {
    static ref CONFIG_FOLDER: Option<PathBuf> = env::var("SEVONE_EXPORTER_CONFIG_DIR")
        .ok()
        .map(PathBuf::from);
}

/// Directory searched for `config.yaml` when no `--config` is given.
pub fn get_config_dir() -> PathBuf {
    if let Some(dir) = CONFIG_FOLDER.clone() {
        dir
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "sevone", "sevone-exporter")
}
