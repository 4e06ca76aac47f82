//! Upload of an exported avatar.
//!
//! avakit does not ship an HTTP client. It builds the multipart request
//! described by an `uploadConfig` and hands it to an [`Uploader`].

use crate::error::{AvatarError, Result};
use crate::render::EncodedImage;
use crate::types::{HttpMethod, UploadConfig};

/// Form field name used when the configuration does not set one.
pub const DEFAULT_FIELD_NAME: &str = "avatar";

/// A plain text form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

/// The encoded image as a multipart file field.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub field_name: String,
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Everything needed to perform an upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub endpoint: String,
    pub method: HttpMethod,
    /// Extra headers, sorted by name.
    pub headers: Vec<(String, String)>,
    pub file: FilePart,
    /// Additional form fields, sorted by name, sent after the file.
    pub fields: Vec<FormField>,
}

impl UploadRequest {
    /// Build the request for `image` from an `uploadConfig`.
    pub fn prepare(config: &UploadConfig, image: &EncodedImage) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(AvatarError::Upload {
                message: "uploadConfig.endpoint is empty".to_string(),
            });
        }

        let headers = config
            .headers
            .iter()
            .flatten()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let fields = config
            .additional_data
            .iter()
            .flatten()
            .map(|(name, value)| FormField {
                name: name.clone(),
                value: value.clone(),
            })
            .collect();

        Ok(Self {
            endpoint: config.endpoint.clone(),
            method: config.method.unwrap_or_default(),
            headers,
            file: FilePart {
                field_name: config
                    .field_name
                    .clone()
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| DEFAULT_FIELD_NAME.to_string()),
                file_name: format!("avatar.{}", image.format.extension()),
                content_type: image.format.mime_type(),
                bytes: image.bytes.clone(),
            },
            fields,
        })
    }
}

/// The server's answer to an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResponse {
    pub status: u16,
    pub status_text: String,
    pub body: Vec<u8>,
}

impl UploadResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs the transfer of a prepared request.
pub trait Uploader {
    /// Send the request. Transport failures are `AvatarError::Upload`.
    fn send(&self, request: &UploadRequest) -> Result<UploadResponse>;
}

/// Prepare and send an upload. A non-2xx response is an error; there is
/// no retry.
pub fn upload<U: Uploader + ?Sized>(
    config: &UploadConfig,
    image: &EncodedImage,
    uploader: &U,
) -> Result<UploadResponse> {
    let request = UploadRequest::prepare(config, image)?;
    let response = uploader.send(&request)?;
    if !response.is_success() {
        return Err(AvatarError::Upload {
            message: format!("{} {}", response.status, response.status_text),
        });
    }
    Ok(response)
}
