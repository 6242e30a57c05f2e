//! Request and response documents exchanged with Concourse.
//!
//! The request arrives on stdin as a [`ResourceDescriptor`]; exactly one
//! response document ([`CheckResponse`] or [`VersionResponse`]) is written to
//! stdout per invocation.

use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::io::Read;

/// Name reported in the metadata of `in`/`out` responses.
pub const METADATA_NAME: &str = "fly_cli";

/// The JSON request read from stdin.
///
/// Missing or `null` fields decode as empty strings; nothing else is validated.
///
/// ```
/// use flykit::ResourceDescriptor;
///
/// let request = r#"{"source":{"path":"/usr/local/bin"},"version":{"cli":"7.9.1"}}"#;
/// let descriptor = ResourceDescriptor::from_reader(request.as_bytes()).unwrap();
/// assert_eq!(descriptor.version.cli, "7.9.1");
/// assert!(descriptor.source.url.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Where fly lives and where to download it from.
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: Source,
    /// The pinned version and target platform.
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: PinnedVersion,
}

/// The `source` block of a resource definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Directory holding an existing fly binary (used by `check` and `out`).
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,
    /// Download location of the fly archive (used by the installer).
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
}

/// The `version` block of a resource definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedVersion {
    /// The pinned fly version string, e.g. `7.9.1`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cli: String,
    /// Target OS/architecture, e.g. `linux-amd64`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub platform: String,
}

impl ResourceDescriptor {
    /// Decode the first JSON document from `reader`.
    ///
    /// Bytes after the first document are left unread. A top-level `null`
    /// decodes as an empty descriptor.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let mut stream = serde_json::Deserializer::from_reader(reader).into_iter::<Option<Self>>();
        match stream.next() {
            Some(descriptor) => Ok(descriptor?.unwrap_or_default()),
            None => Err(crate::Error::InvalidDescriptor(
                "no JSON document on stdin".to_string(),
            )),
        }
    }

    /// The metadata attached to `in`/`out` responses.
    #[must_use]
    pub fn metadata(&self) -> Vec<MetadataEntry> {
        vec![MetadataEntry {
            name: METADATA_NAME.to_string(),
            platform: self.version.platform.clone(),
        }]
    }
}

/// A single version record, serialized as `{"ref": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRef {
    /// The version string.
    #[serde(rename = "ref")]
    pub reference: String,
}

impl VersionRef {
    /// Create a version record.
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
        }
    }
}

/// Response of `check`: the pinned version, then the observed one if it changed.
pub type CheckResponse = Vec<VersionRef>;

/// One metadata entry of an `in`/`out` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    /// Always [`METADATA_NAME`].
    pub name: String,
    /// The platform from the request.
    pub platform: String,
}

/// Response of `in` and `out`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionResponse {
    /// The reported version.
    pub version: VersionRef,
    /// Static metadata about the tool.
    pub metadata: Vec<MetadataEntry>,
}

impl VersionResponse {
    /// Build a response for `reference` with the descriptor's metadata.
    pub fn new(reference: impl Into<String>, descriptor: &ResourceDescriptor) -> Self {
        Self {
            version: VersionRef::new(reference),
            metadata: descriptor.metadata(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    const FULL_REQUEST: &str = r#"{
        "source": {
            "path": "/usr/local/bin",
            "url": "https://github.com/concourse/concourse/releases/download/v7.9.1/fly-7.9.1-linux-amd64.tgz"
        },
        "version": {
            "cli": "7.9.1",
            "platform": "linux-amd64"
        }
    }"#;

    #[test]
    fn test_decode_full_request() {
        let descriptor = ResourceDescriptor::from_reader(FULL_REQUEST.as_bytes()).unwrap();
        assert_eq!(descriptor.source.path, "/usr/local/bin");
        assert!(descriptor.source.url.ends_with("fly-7.9.1-linux-amd64.tgz"));
        assert_eq!(descriptor.version.cli, "7.9.1");
        assert_eq!(descriptor.version.platform, "linux-amd64");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let descriptor = ResourceDescriptor::from_reader(r#"{"source":{}}"#.as_bytes()).unwrap();
        assert_eq!(descriptor, ResourceDescriptor::default());
    }

    #[test]
    fn test_null_fields_default_to_empty() {
        let request = r#"{"source":{"path":null,"url":"u"},"version":null}"#;
        let descriptor = ResourceDescriptor::from_reader(request.as_bytes()).unwrap();
        assert_eq!(descriptor.source.path, "");
        assert_eq!(descriptor.source.url, "u");
        assert_eq!(descriptor.version, PinnedVersion::default());
    }

    #[test]
    fn test_null_request_is_empty_descriptor() {
        let descriptor = ResourceDescriptor::from_reader("null\n".as_bytes()).unwrap();
        assert_eq!(descriptor, ResourceDescriptor::default());
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let request = r#"{"Source":{"path":"/opt"},"source":{"URL":"u"}}"#;
        let descriptor = ResourceDescriptor::from_reader(request.as_bytes()).unwrap();
        assert_eq!(descriptor.source, Source::default());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let request = r#"{"source":{"url":"u","extra":1},"params":{"x":true}}"#;
        let descriptor = ResourceDescriptor::from_reader(request.as_bytes()).unwrap();
        assert_eq!(descriptor.source.url, "u");
    }

    #[test]
    fn test_only_first_document_is_read() {
        let request = r#"{"version":{"cli":"7.9.1"}} this is not json"#;
        let descriptor = ResourceDescriptor::from_reader(request.as_bytes()).unwrap();
        assert_eq!(descriptor.version.cli, "7.9.1");
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let result = ResourceDescriptor::from_reader("{\"source\":".as_bytes());
        assert!(matches!(result, Err(Error::InvalidDescriptor(_))));
    }

    #[test]
    fn test_wrong_field_type_is_rejected() {
        let result = ResourceDescriptor::from_reader(r#"{"version":{"cli":7.9}}"#.as_bytes());
        assert!(matches!(result, Err(Error::InvalidDescriptor(_))));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let result = ResourceDescriptor::from_reader("   \n".as_bytes());
        assert!(matches!(result, Err(Error::InvalidDescriptor(_))));
    }

    #[test]
    fn test_version_ref_serializes_as_ref() {
        let json = serde_json::to_string(&VersionRef::new("7.9.1")).unwrap();
        assert_eq!(json, r#"{"ref":"7.9.1"}"#);
    }

    #[test]
    fn test_check_response_shape() {
        let response: CheckResponse = vec![VersionRef::new("7.8.0"), VersionRef::new("7.9.1")];
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"[{"ref":"7.8.0"},{"ref":"7.9.1"}]"#);
    }

    #[test]
    fn test_version_response_shape() {
        let descriptor = ResourceDescriptor::from_reader(FULL_REQUEST.as_bytes()).unwrap();
        let response = VersionResponse::new("7.9.1", &descriptor);
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(
            json,
            r#"{"version":{"ref":"7.9.1"},"metadata":[{"name":"fly_cli","platform":"linux-amd64"}]}"#
        );
    }
}
