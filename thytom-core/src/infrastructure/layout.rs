// thytom-core/src/infrastructure/layout.rs
//
// Where templates, configuration, extensions and results live.

use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Overrides home detection: `THYTOM_HOME=/srv/export thytom -f ids.txt`
pub const HOME_ENV: &str = "THYTOM_HOME";
pub const CONFIG_FILE_NAME: &str = "thytom.properties";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    home: PathBuf,
    sql_dir: PathBuf,
    conf_dir: PathBuf,
    lib_dir: PathBuf,
    out_dir: PathBuf,
}

impl Layout {
    /// `THYTOM_HOME` if set, else the executable's directory when it looks
    /// like an installation (has a `*sql*` or `*conf*` directory), else the
    /// working directory.
    pub fn discover() -> Self {
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            info!(home = ?home, "Using home directory from {}", HOME_ENV);
            return Self::from_home(PathBuf::from(home));
        }

        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));

        match exe_dir {
            Some(dir) if looks_like_home(&dir) => {
                info!(home = ?dir, "Using executable directory as home");
                Self::from_home(dir)
            }
            _ => Self::from_home(PathBuf::from(".")),
        }
    }

    pub fn from_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let layout = Self {
            sql_dir: resolve_dir(&home, "sql"),
            conf_dir: resolve_dir(&home, "conf"),
            lib_dir: resolve_dir(&home, "lib"),
            out_dir: home.join("out"),
            home,
        };
        debug!(?layout, "Resolved directory layout");
        layout
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn sql_dir(&self) -> &Path {
        &self.sql_dir
    }

    pub fn lib_dir(&self) -> &Path {
        &self.lib_dir
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.conf_dir.join(CONFIG_FILE_NAME)
    }
}

fn looks_like_home(dir: &Path) -> bool {
    find_dir_containing(dir, "sql").is_some() || find_dir_containing(dir, "conf").is_some()
}

/// Exact name first, then the first directory whose name contains `token`.
fn resolve_dir(home: &Path, token: &str) -> PathBuf {
    let exact = home.join(token);
    if exact.is_dir() {
        return exact;
    }
    find_dir_containing(home, token).unwrap_or(exact)
}

fn find_dir_containing(parent: &Path, token: &str) -> Option<PathBuf> {
    WalkDir::new(parent)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .find(|e| e.file_type().is_dir() && e.file_name().to_string_lossy().contains(token))
        .map(|e| e.into_path())
}
