use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError};

use crate::error::{Result, SlidesmithError};

/// Raw `POST /generate` form fields, as received.
#[derive(Debug, Default)]
pub struct GenerateForm {
    pub input_text: Option<String>,
    pub guidance: Option<String>,
    pub api_key: Option<String>,
    pub provider: Option<String>,
    pub template: Option<TemplateUpload>,
}

#[derive(Debug, Clone)]
pub struct TemplateUpload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// A form whose required fields are present and non-blank.
#[derive(Debug)]
pub struct GenerateRequest {
    pub input_text: String,
    pub guidance: Option<String>,
    pub api_key: String,
    pub provider: String,
    pub template: Option<TemplateUpload>,
}

fn malformed(e: MultipartError) -> SlidesmithError {
    SlidesmithError::Validation(format!("Invalid multipart body: {}", e.body_text()))
}

impl GenerateForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = field.name().unwrap_or("").to_string();

            match name.as_str() {
                "input_text" => form.input_text = Some(field.text().await.map_err(malformed)?),
                "guidance" => form.guidance = Some(field.text().await.map_err(malformed)?),
                "api_key" => form.api_key = Some(field.text().await.map_err(malformed)?),
                "provider" => form.provider = Some(field.text().await.map_err(malformed)?),
                "pptx_file" => {
                    let file_name = field.file_name().unwrap_or("").to_string();
                    let bytes = field.bytes().await.map_err(malformed)?;
                    // Browsers send an empty part when no file was picked.
                    if !file_name.is_empty() && !bytes.is_empty() {
                        form.template = Some(TemplateUpload { file_name, bytes });
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    pub fn validate(self) -> Result<GenerateRequest> {
        fn required(value: Option<String>) -> Result<String> {
            value
                .filter(|v| !v.trim().is_empty())
                .ok_or(SlidesmithError::MissingField)
        }

        Ok(GenerateRequest {
            input_text: required(self.input_text)?,
            api_key: required(self.api_key)?.trim().to_string(),
            provider: required(self.provider)?,
            guidance: self.guidance.filter(|g| !g.trim().is_empty()),
            template: self.template,
        })
    }
}
