//! Shared utilities for integration tests.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use servlet_resolver::config::load_config_str;
use servlet_resolver::registry::BindingRegistry;

static NEXT_FILE: AtomicUsize = AtomicUsize::new(0);

/// Write `content` to a fresh file under the system temp directory.
#[allow(dead_code)]
pub fn write_config(content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "servlet-resolver-test-{}-{}",
        std::process::id(),
        NEXT_FILE.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("resolver.toml");
    std::fs::write(&path, content).unwrap();
    path
}

/// Registry built from inline TOML; panics on rejected records.
#[allow(dead_code)]
pub fn registry(toml: &str) -> BindingRegistry {
    let config = load_config_str(toml).unwrap();
    let (registry, report) = BindingRegistry::from_config(&config);
    assert!(report.is_clean(), "unexpected rejections: {:?}", report.rejected);
    registry
}
