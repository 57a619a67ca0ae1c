//! Serialization of learned parameters.
//!
//! Every `*Params` struct is plain data and gets [`SerializableParams`] for free
//! through the serde blanket impl. Two encodings are supported: compact bincode
//! (the default for files written by this crate) and JSON for artifacts produced
//! by external training jobs.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ConfigurationError;

/// Parameter representations that can be written to and read from bytes.
pub trait SerializableParams: Sized {
    fn to_bytes(&self) -> Result<Vec<u8>, ConfigurationError>;

    fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigurationError>;

    fn to_json(&self) -> Result<Vec<u8>, ConfigurationError>;

    fn from_json(bytes: &[u8]) -> Result<Self, ConfigurationError>;

    /// Encode in the given format.
    fn encode(&self, format: ArtifactFormat) -> Result<Vec<u8>, ConfigurationError> {
        match format {
            ArtifactFormat::Bincode => self.to_bytes(),
            ArtifactFormat::Json => self.to_json(),
        }
    }

    /// Decode from the given format.
    fn decode(bytes: &[u8], format: ArtifactFormat) -> Result<Self, ConfigurationError> {
        match format {
            ArtifactFormat::Bincode => Self::from_bytes(bytes),
            ArtifactFormat::Json => Self::from_json(bytes),
        }
    }

    /// Write to `path`, picking the format from its extension.
    fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigurationError> {
        let path = path.as_ref();
        let bytes = self.encode(ArtifactFormat::for_path(path))?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Read from `path`, picking the format from its extension.
    fn read_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Self::decode(&bytes, ArtifactFormat::for_path(path))
    }
}

impl<T> SerializableParams for T
where
    T: Serialize + DeserializeOwned,
{
    fn to_bytes(&self) -> Result<Vec<u8>, ConfigurationError> {
        Ok(bincode::serialize(self)?)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigurationError> {
        Ok(bincode::deserialize(bytes)?)
    }

    fn to_json(&self) -> Result<Vec<u8>, ConfigurationError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    fn from_json(bytes: &[u8]) -> Result<Self, ConfigurationError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// On-disk encoding of learned parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ArtifactFormat {
    #[default]
    Bincode,
    Json,
}

impl ArtifactFormat {
    /// `.json` files are JSON; everything else is bincode.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ArtifactFormat::Json,
            _ => ArtifactFormat::Bincode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        weights: Vec<f64>,
        bias: f64,
    }

    #[test]
    fn test_format_for_path() {
        assert_eq!(
            ArtifactFormat::for_path(Path::new("model.json")),
            ArtifactFormat::Json
        );
        assert_eq!(
            ArtifactFormat::for_path(Path::new("model.JSON")),
            ArtifactFormat::Json
        );
        assert_eq!(
            ArtifactFormat::for_path(Path::new("model.bin")),
            ArtifactFormat::Bincode
        );
        assert_eq!(
            ArtifactFormat::for_path(Path::new("model")),
            ArtifactFormat::Bincode
        );
    }

    #[test]
    fn test_file_round_trip_both_formats() {
        let sample = Sample {
            weights: vec![1.5, -2.0],
            bias: 0.25,
        };
        let dir = std::env::temp_dir();
        for name in ["immo_price_sample.bin", "immo_price_sample.json"] {
            let path = dir.join(name);
            sample.write_file(&path).unwrap();
            let loaded = Sample::read_file(&path).unwrap();
            assert_eq!(loaded, sample);
            std::fs::remove_file(&path).ok();
        }
    }

    #[test]
    fn test_json_file_is_readable_text() {
        let path = std::env::temp_dir().join("immo_price_sample_text.json");
        Sample {
            weights: vec![3.0],
            bias: 1.0,
        }
        .write_file(&path)
        .unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"weights\""));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("immo_price_does_not_exist.bin");
        let err = Sample::read_file(&path).unwrap_err();
        assert!(matches!(err, ConfigurationError::Io(_)));
    }
}
