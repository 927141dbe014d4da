use directories::ProjectDirs;
use std::{
    env,
    path::PathBuf,
};

pub(crate) const PROJECT_NAME: &str = "NIFI_EXPORTER";

lazy_static::lazy_static! {
    static ref CONFIG_FOLDER: Option<PathBuf> = env::var(format!("{PROJECT_NAME}_CONFIG"))
        .ok()
        .map(PathBuf::from);
}

/// Directory searched for `config.yaml` when no file is given explicitly.
pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "apache", "nifi-exporter")
}
