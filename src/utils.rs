use std::path::PathBuf;

/// Fallback bundle location when running from the repository checkout
const DEV_PUBLIC_DIR: &str = "../../molten-rosette";

/// Resolve the static frontend directory.
///
/// An explicitly configured directory wins; otherwise `static` is used when
/// it exists, then the development checkout path.
pub fn get_public_dir(configured: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = configured {
        return dir;
    }

    let static_dir = PathBuf::from("static");
    if static_dir.exists() {
        static_dir
    } else {
        PathBuf::from(DEV_PUBLIC_DIR)
    }
}

/// Initialize the tracing subscriber (RUST_LOG, default "info")
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_public_dir_wins() {
        let dir = get_public_dir(Some(PathBuf::from("/srv/frontend")));
        assert_eq!(dir, PathBuf::from("/srv/frontend"));
    }
}
