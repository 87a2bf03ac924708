use dirs::home_dir;
use std::path::Path;
use std::path::PathBuf;

const HUDDLE_HOME_ENV: &str = "HUDDLE_HOME";
const DEFAULT_DIR_NAME: &str = ".huddle";

/// Returns the directory holding Huddle's `config.toml` and logs.
///
/// - If `HUDDLE_HOME` is set, the value must exist and be a directory. The
///   value will be canonicalized and this function will Err otherwise.
/// - If `HUDDLE_HOME` is not set, this returns `~/.huddle` without checking
///   that it exists.
pub fn find_huddle_home() -> std::io::Result<PathBuf> {
    let huddle_home_env = std::env::var(HUDDLE_HOME_ENV)
        .ok()
        .filter(|val| !val.is_empty());
    find_huddle_home_from_env(huddle_home_env.as_deref())
}

fn find_huddle_home_from_env(huddle_home_env: Option<&str>) -> std::io::Result<PathBuf> {
    match huddle_home_env {
        Some(val) => canonical_dir(Path::new(val), val),
        None => {
            let mut p = home_dir().ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Could not find home directory",
                )
            })?;
            p.push(DEFAULT_DIR_NAME);
            Ok(p)
        }
    }
}

fn canonical_dir(path: &Path, raw: &str) -> std::io::Result<PathBuf> {
    let metadata = std::fs::metadata(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{HUDDLE_HOME_ENV} points to {raw:?}, but that path does not exist"),
        ),
        _ => std::io::Error::new(
            err.kind(),
            format!("failed to read {HUDDLE_HOME_ENV} {raw:?}: {err}"),
        ),
    })?;

    if !metadata.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{HUDDLE_HOME_ENV} points to {raw:?}, but that path is not a directory"),
        ));
    }

    path.canonicalize().map_err(|err| {
        std::io::Error::new(
            err.kind(),
            format!("failed to canonicalize {HUDDLE_HOME_ENV} {raw:?}: {err}"),
        )
    })
}
