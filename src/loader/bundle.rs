//! Sample bundles: named raw sample arrays delivered in one download.

use crate::{ChipwaveError, Result};
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;

/// Raw sample arrays keyed by sample name
pub type SampleBindings = HashMap<String, Vec<f32>>;

/// Bundle loading capability used by the bulk loader
pub trait BundleLoader: Send + Sync {
    /// Load every binding defined by the bundle `name`
    fn load_bundle(&self, name: &str) -> impl Future<Output = Result<SampleBindings>> + Send;
}

/// Loads bundles stored as `<dir>/<name>.json` objects of `name: [samples]`
#[derive(Debug, Clone)]
pub struct JsonBundleLoader {
    dir: PathBuf,
}

impl JsonBundleLoader {
    /// Load bundles from `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonBundleLoader { dir: dir.into() }
    }

    /// Path of a bundle file
    pub fn bundle_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

impl BundleLoader for JsonBundleLoader {
    async fn load_bundle(&self, name: &str) -> Result<SampleBindings> {
        let path = self.bundle_path(name);
        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| ChipwaveError::Bundle(format!("{}: {}", path.display(), e)))?;
        serde_json::from_slice(&data)
            .map_err(|e| ChipwaveError::Bundle(format!("{}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_json_bundle_roundtrip_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("drums.json"),
            r#"{"kick": [0.0, 0.5, -0.5], "hat": [0.25]}"#,
        )
        .unwrap();

        let bindings = JsonBundleLoader::new(dir.path())
            .load_bundle("drums")
            .await
            .unwrap();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings["kick"], vec![0.0, 0.5, -0.5]);
    }

    #[tokio::test]
    async fn test_missing_and_malformed_bundles() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "[1, 2").unwrap();
        let loader = JsonBundleLoader::new(dir.path());

        assert!(matches!(
            loader.load_bundle("absent").await,
            Err(ChipwaveError::Bundle(_))
        ));
        assert!(matches!(
            loader.load_bundle("broken").await,
            Err(ChipwaveError::Bundle(_))
        ));
    }
}
