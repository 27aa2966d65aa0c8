// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Locates, and on first run downloads, the sentence embedding model.

use std::path::{Path, PathBuf};

use krishi_core::error::KrishiError;
use tracing::info;

const MODEL_URL: &str = "https://huggingface.co/onnx-community/all-MiniLM-L6-v2-ONNX/resolve/main/onnx/model_quantized.onnx";
const TOKENIZER_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/tokenizer.json";

/// Resolves `<data_dir>/models/<model_name>/{model.onnx,tokenizer.json}`.
#[derive(Debug, Clone)]
pub struct ModelManager {
    data_dir: PathBuf,
    model_name: String,
}

impl ModelManager {
    pub fn new(data_dir: impl Into<PathBuf>, model_name: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            model_name: model_name.into(),
        }
    }

    pub fn model_dir(&self) -> PathBuf {
        self.data_dir.join("models").join(&self.model_name)
    }

    pub fn model_path(&self) -> PathBuf {
        self.model_dir().join("model.onnx")
    }

    pub fn tokenizer_path(&self) -> PathBuf {
        self.model_dir().join("tokenizer.json")
    }

    pub fn is_model_available(&self) -> bool {
        self.model_path().exists() && self.tokenizer_path().exists()
    }

    /// Returns the model and tokenizer paths, downloading missing files
    /// when `download` is set.
    pub async fn ensure_model(&self, download: bool) -> Result<(PathBuf, PathBuf), KrishiError> {
        if self.is_model_available() {
            return Ok((self.model_path(), self.tokenizer_path()));
        }
        if !download {
            return Err(KrishiError::Embedding(format!(
                "embedding model missing from {} and auto_download is off",
                self.model_dir().display()
            )));
        }

        let dir = self.model_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| KrishiError::Internal(format!("failed to create {}: {e}", dir.display())))?;

        for (dest, url) in [
            (self.model_path(), MODEL_URL),
            (self.tokenizer_path(), TOKENIZER_URL),
        ] {
            if dest.exists() {
                continue;
            }
            info!(url, dest = %dest.display(), "downloading embedding model file");
            if let Err(e) = download_file(url, &dest).await {
                let _ = tokio::fs::remove_file(&dest).await;
                return Err(e);
            }
        }

        info!(dir = %dir.display(), "embedding model ready");
        Ok((self.model_path(), self.tokenizer_path()))
    }
}

async fn download_file(url: &str, dest: &Path) -> Result<(), KrishiError> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| KrishiError::Internal(format!("failed to download {url}: {e}")))?;
    if !response.status().is_success() {
        return Err(KrishiError::Internal(format!(
            "download of {url} failed with status {}",
            response.status()
        )));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| KrishiError::Internal(format!("failed to read {url}: {e}")))?;
    tokio::fs::write(dest, &bytes)
        .await
        .map_err(|e| KrishiError::Internal(format!("failed to write {}: {e}", dest.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_live_under_data_dir() {
        let mgr = ModelManager::new("/srv/krishi", "all-MiniLM-L6-v2");
        assert_eq!(
            mgr.model_path(),
            PathBuf::from("/srv/krishi/models/all-MiniLM-L6-v2/model.onnx")
        );
        assert_eq!(
            mgr.tokenizer_path(),
            PathBuf::from("/srv/krishi/models/all-MiniLM-L6-v2/tokenizer.json")
        );
    }

    #[tokio::test]
    async fn missing_model_without_download_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = ModelManager::new(dir.path(), "all-MiniLM-L6-v2");
        assert!(!mgr.is_model_available());
        let err = mgr.ensure_model(false).await.unwrap_err();
        assert!(err.to_string().contains("auto_download"));
    }

    #[tokio::test]
    async fn present_files_skip_download() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = ModelManager::new(dir.path(), "mini");
        std::fs::create_dir_all(mgr.model_dir()).unwrap();
        std::fs::write(mgr.model_path(), b"onnx").unwrap();
        std::fs::write(mgr.tokenizer_path(), b"{}").unwrap();

        let (model, tokenizer) = mgr.ensure_model(false).await.unwrap();
        assert_eq!(model, mgr.model_path());
        assert_eq!(tokenizer, mgr.tokenizer_path());
    }
}
