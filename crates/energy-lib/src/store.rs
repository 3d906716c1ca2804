//! Model artifact loading and the process-wide model handle
//!
//! This module provides:
//! - Reading the trained model file with size and checksum validation
//! - A load-once handle that shares the model read-only across requests

use crate::error::{EnergyError, Result};
use crate::predictor::{OnnxPredictor, Predictor};
use anyhow::Context;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{debug, info};

/// Default upper bound on the model file size (50 MiB)
pub const DEFAULT_MAX_MODEL_BYTES: usize = 50 * 1024 * 1024;

/// Configuration for reading the model artifact
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum model size in bytes
    pub max_model_bytes: usize,
    /// Expected SHA-256 of the file, hex encoded
    pub expected_checksum: Option<String>,
    /// Version label; defaults to the file stem
    pub version: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_model_bytes: DEFAULT_MAX_MODEL_BYTES,
            expected_checksum: None,
            version: None,
        }
    }
}

/// A model file read from disk and verified
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    pub version: String,
    pub path: PathBuf,
    pub checksum: String,
    pub size_bytes: usize,
    pub loaded_at: i64,
    pub bytes: Vec<u8>,
}

impl ModelArtifact {
    /// Read and validate the model file at `path`
    pub fn load(path: impl AsRef<Path>, config: &StoreConfig) -> Result<Self> {
        let path = path.as_ref();
        Self::read(path, config).map_err(EnergyError::ModelLoad)
    }

    fn read(path: &Path, config: &StoreConfig) -> anyhow::Result<Self> {
        let size = fs::metadata(path)
            .with_context(|| format!("Failed to read model file {}", path.display()))?
            .len();
        check_size(size, config.max_model_bytes)
            .with_context(|| format!("Rejected model file {}", path.display()))?;

        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read model file {}", path.display()))?;
        // The file may have changed since the metadata call
        check_size(bytes.len() as u64, config.max_model_bytes)
            .with_context(|| format!("Rejected model file {}", path.display()))?;

        let checksum = compute_checksum(&bytes);
        if let Some(expected) = &config.expected_checksum {
            if !checksum.eq_ignore_ascii_case(expected.trim()) {
                anyhow::bail!(
                    "Checksum mismatch: expected {}, got {}",
                    expected.trim(),
                    checksum
                );
            }
            debug!(checksum = %checksum, "Model checksum validated");
        }

        let version = config.version.clone().unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "unknown".to_string())
        });

        info!(
            version = %version,
            path = %path.display(),
            size = bytes.len(),
            checksum = %checksum,
            "Model artifact loaded"
        );

        Ok(Self {
            version,
            path: path.to_path_buf(),
            checksum,
            size_bytes: bytes.len(),
            loaded_at: chrono::Utc::now().timestamp(),
            bytes,
        })
    }
}

fn check_size(size: u64, max_bytes: usize) -> anyhow::Result<()> {
    if size == 0 {
        anyhow::bail!("Model file is empty");
    }
    if size > max_bytes as u64 {
        anyhow::bail!("Model size {} exceeds maximum {}", size, max_bytes);
    }
    Ok(())
}

/// Compute SHA256 checksum of data
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Process-wide, read-only model handle
///
/// The model is loaded at most once; concurrent first callers wait on the
/// same load. Once set, the handle is never replaced.
#[derive(Default)]
pub struct SharedModel {
    model: OnceLock<Arc<dyn Predictor>>,
    load_lock: Mutex<()>,
}

impl SharedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle that already holds a model
    pub fn with_model(model: Arc<dyn Predictor>) -> Self {
        let shared = Self::new();
        // Freshly created cell, cannot already be set
        let _ = shared.model.set(model);
        shared
    }

    pub fn get(&self) -> Option<Arc<dyn Predictor>> {
        self.model.get().cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    /// Return the model, running `load` if this is the first use
    ///
    /// A failed load leaves the handle empty so a later call may retry.
    pub fn get_or_load<F>(&self, load: F) -> Result<Arc<dyn Predictor>>
    where
        F: FnOnce() -> Result<Arc<dyn Predictor>>,
    {
        if let Some(model) = self.model.get() {
            return Ok(model.clone());
        }

        let _guard = self
            .load_lock
            .lock()
            .map_err(|e| EnergyError::ModelLoad(anyhow::anyhow!("Lock poisoned: {}", e)))?;

        if let Some(model) = self.model.get() {
            return Ok(model.clone());
        }

        let model = load()?;
        let _ = self.model.set(model.clone());
        Ok(model)
    }

    /// Load the ONNX model at `path` on first use
    pub fn get_or_load_onnx(
        &self,
        path: impl AsRef<Path>,
        config: &StoreConfig,
    ) -> Result<Arc<dyn Predictor>> {
        self.get_or_load(|| {
            let artifact = ModelArtifact::load(path, config)?;
            let predictor =
                OnnxPredictor::from_artifact(&artifact).map_err(EnergyError::ModelLoad)?;
            Ok(Arc::new(predictor) as Arc<dyn Predictor>)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeatureRecord;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::NamedTempFile;

    struct ConstantModel(f64);

    impl Predictor for ConstantModel {
        fn predict(&self, _features: &FeatureRecord) -> anyhow::Result<f64> {
            Ok(self.0)
        }

        fn model_version(&self) -> &str {
            "constant"
        }
    }

    fn model_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_compute_checksum() {
        let data = b"test data";
        let checksum = compute_checksum(data);
        assert_eq!(checksum.len(), 64);
        assert_eq!(checksum, compute_checksum(data));
        assert_ne!(checksum, compute_checksum(b"other data"));
    }

    #[test]
    fn test_artifact_load_records_metadata() {
        let file = model_file(b"model-bytes");
        let config = StoreConfig {
            version: Some("gb-2016".to_string()),
            ..StoreConfig::default()
        };
        let artifact = ModelArtifact::load(file.path(), &config).unwrap();
        assert_eq!(artifact.version, "gb-2016");
        assert_eq!(artifact.size_bytes, 11);
        assert_eq!(artifact.checksum, compute_checksum(b"model-bytes"));
        assert_eq!(artifact.bytes, b"model-bytes");
    }

    #[test]
    fn test_artifact_version_defaults_to_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("energisight_model.onnx");
        std::fs::write(&path, b"abc").unwrap();
        let artifact = ModelArtifact::load(&path, &StoreConfig::default()).unwrap();
        assert_eq!(artifact.version, "energisight_model");
    }

    #[test]
    fn test_checksum_verification() {
        let file = model_file(b"model-bytes");
        let good = StoreConfig {
            expected_checksum: Some(compute_checksum(b"model-bytes").to_uppercase()),
            ..StoreConfig::default()
        };
        assert!(ModelArtifact::load(file.path(), &good).is_ok());

        let bad = StoreConfig {
            expected_checksum: Some(compute_checksum(b"tampered")),
            ..StoreConfig::default()
        };
        let err = ModelArtifact::load(file.path(), &bad).unwrap_err();
        assert!(matches!(err, EnergyError::ModelLoad(_)));
        let cause = std::error::Error::source(&err).unwrap();
        assert!(cause.to_string().contains("Checksum mismatch"));
    }

    #[test]
    fn test_empty_and_oversized_files_rejected() {
        let empty = model_file(b"");
        assert!(matches!(
            ModelArtifact::load(empty.path(), &StoreConfig::default()),
            Err(EnergyError::ModelLoad(_))
        ));

        let big = model_file(&[0u8; 32]);
        let config = StoreConfig {
            max_model_bytes: 16,
            ..StoreConfig::default()
        };
        assert!(matches!(
            ModelArtifact::load(big.path(), &config),
            Err(EnergyError::ModelLoad(_))
        ));
    }

    #[test]
    fn test_oversized_file_rejected_from_metadata() {
        // Sparse file: reported length is large, nothing is written
        let file = NamedTempFile::new().unwrap();
        file.as_file().set_len(64 * 1024 * 1024).unwrap();
        let config = StoreConfig {
            max_model_bytes: 1024,
            ..StoreConfig::default()
        };

        let err = ModelArtifact::load(file.path(), &config).unwrap_err();
        assert!(matches!(err, EnergyError::ModelLoad(_)));
        let chain = format!("{:#}", anyhow::Error::from(err));
        assert!(chain.contains("Model size 67108864 exceeds maximum 1024"), "{}", chain);
    }

    #[test]
    fn test_missing_file_is_model_load_error() {
        let err = ModelArtifact::load("/nonexistent/model.onnx", &StoreConfig::default())
            .unwrap_err();
        assert!(matches!(err, EnergyError::ModelLoad(_)));
    }

    #[test]
    fn test_shared_model_loads_once_across_threads() {
        let shared = Arc::new(SharedModel::new());
        let loads = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let shared = shared.clone();
                let loads = loads.clone();
                std::thread::spawn(move || {
                    shared
                        .get_or_load(|| {
                            loads.fetch_add(1, Ordering::SeqCst);
                            Ok(Arc::new(ConstantModel(1.0)) as Arc<dyn Predictor>)
                        })
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(shared.is_loaded());
    }

    #[test]
    fn test_failed_load_leaves_handle_empty() {
        let shared = SharedModel::new();
        let result = shared.get_or_load(|| {
            Err(EnergyError::ModelLoad(anyhow::anyhow!("disk on fire")))
        });
        assert!(result.is_err());
        assert!(!shared.is_loaded());

        let model = shared
            .get_or_load(|| Ok(Arc::new(ConstantModel(2.0)) as Arc<dyn Predictor>))
            .unwrap();
        assert_eq!(model.model_version(), "constant");
    }

    #[test]
    fn test_with_model_skips_loader() {
        let shared = SharedModel::with_model(Arc::new(ConstantModel(3.0)));
        let model = shared
            .get_or_load(|| panic!("loader must not run"))
            .unwrap();
        assert_eq!(model.model_version(), "constant");
    }
}
