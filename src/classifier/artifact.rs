// Model artifact: the single blob a fitted model is persisted as.
//
// Layout is a compact JSON envelope around the model payload:
//
//   {"format":"truthlens-model","version":1,"trained_at":"...",
//    "checksum":"<sha256 hex of payload>","model":{...}}
//
// The payload is kept as raw JSON on both sides so the checksum covers the
// exact bytes written. Floats are written and parsed round-trip exact.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use sha2::{Digest, Sha256};
use tracing::info;

use super::model::FittedModel;
use crate::error::{ClassifierError, Result};

pub const FORMAT_TAG: &str = "truthlens-model";
pub const FORMAT_VERSION: u32 = 1;

/// Default artifact file name inside a model directory.
pub const MODEL_FILE: &str = "model.json";

#[derive(Serialize)]
struct EnvelopeOut<'a> {
    format: &'a str,
    version: u32,
    trained_at: DateTime<Utc>,
    checksum: String,
    model: &'a RawValue,
}

#[derive(Deserialize)]
struct EnvelopeIn<'a> {
    format: String,
    version: u32,
    trained_at: DateTime<Utc>,
    checksum: String,
    #[serde(borrow)]
    model: &'a RawValue,
}

/// A model together with the metadata stored beside it.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModel {
    pub model: FittedModel,
    pub trained_at: DateTime<Utc>,
}

fn checksum(payload: &str) -> String {
    hex::encode(Sha256::digest(payload.as_bytes()))
}

/// Serialize `model` into artifact bytes, stamped with the current time.
pub fn save(model: &FittedModel) -> Result<Vec<u8>> {
    save_with_timestamp(model, Utc::now())
}

pub fn save_with_timestamp(model: &FittedModel, trained_at: DateTime<Utc>) -> Result<Vec<u8>> {
    let payload = serde_json::to_string(model)
        .map_err(|e| ClassifierError::serialization(format!("cannot encode model: {e}")))?;
    let raw = RawValue::from_string(payload)
        .map_err(|e| ClassifierError::serialization(format!("cannot encode model: {e}")))?;

    let envelope = EnvelopeOut {
        format: FORMAT_TAG,
        version: FORMAT_VERSION,
        trained_at,
        checksum: checksum(raw.get()),
        model: &raw,
    };
    serde_json::to_vec(&envelope)
        .map_err(|e| ClassifierError::serialization(format!("cannot encode artifact: {e}")))
}

/// Parse artifact bytes back into a model.
pub fn load(bytes: &[u8]) -> Result<FittedModel> {
    load_with_metadata(bytes).map(|loaded| loaded.model)
}

pub fn load_with_metadata(bytes: &[u8]) -> Result<LoadedModel> {
    let envelope: EnvelopeIn<'_> = serde_json::from_slice(bytes)
        .map_err(|e| ClassifierError::serialization(format!("not a model artifact: {e}")))?;

    if envelope.format != FORMAT_TAG {
        return Err(ClassifierError::serialization(format!(
            "unexpected format tag {:?}",
            envelope.format
        )));
    }
    if envelope.version != FORMAT_VERSION {
        return Err(ClassifierError::serialization(format!(
            "unsupported artifact version {} (this build reads version {FORMAT_VERSION})",
            envelope.version
        )));
    }

    let payload = envelope.model.get();
    if checksum(payload) != envelope.checksum.to_ascii_lowercase() {
        return Err(ClassifierError::serialization(
            "checksum mismatch; the artifact is corrupt or was edited",
        ));
    }

    let model: FittedModel = serde_json::from_str(payload)
        .map_err(|e| ClassifierError::serialization(format!("malformed model payload: {e}")))?;
    model.validate()?;

    Ok(LoadedModel {
        model,
        trained_at: envelope.trained_at,
    })
}

/// Write the artifact to `path`, creating parent directories as needed.
pub fn save_to_file(model: &FittedModel, path: &Path) -> Result<PathBuf> {
    let bytes = save(model)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "Saved model artifact");
    Ok(path.to_path_buf())
}

pub fn load_from_file(path: &Path) -> Result<LoadedModel> {
    let bytes = fs::read(path)?;
    let loaded = load_with_metadata(&bytes)?;
    info!(
        path = %path.display(),
        vocabulary = loaded.model.vectorizer().vocabulary_size(),
        trained_at = %loaded.trained_at,
        "Loaded model artifact"
    );
    Ok(loaded)
}
