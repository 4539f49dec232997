use crate::services::ServiceError;
use actix_multipart::{Field, Multipart};
use common::requests::ImportRequest;
use futures_util::StreamExt;

pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Parts of a ranking upload form.
///
/// - `json`: `ImportRequest` metadata (`{"round_id": "..."}`)
/// - `round_id`: plain-text alternative to the `json` part
/// - `file`: the workbook
#[derive(Default)]
pub struct RankingUpload {
    pub round_id: Option<String>,
    pub file: Option<UploadedFile>,
}

pub async fn read_upload(
    mut payload: Multipart,
    max_bytes: usize,
) -> Result<RankingUpload, ServiceError> {
    let mut upload = RankingUpload::default();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| ServiceError::Upload(e.to_string()))?;
        let part_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match part_name.as_deref() {
            Some("file") => {
                let name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();
                let bytes = read_field(&mut field, max_bytes).await?;
                upload.file = Some(UploadedFile { name, bytes });
            }
            Some("json") => {
                let bytes = read_field(&mut field, max_bytes).await?;
                let request: ImportRequest = serde_json::from_slice(&bytes)
                    .map_err(|e| ServiceError::Upload(format!("invalid json part: {}", e)))?;
                upload.round_id = request.round_id;
            }
            Some("round_id") => {
                let bytes = read_field(&mut field, max_bytes).await?;
                upload.round_id = Some(String::from_utf8_lossy(&bytes).into_owned());
            }
            _ => {}
        }
    }

    Ok(upload)
}

async fn read_field(field: &mut Field, max_bytes: usize) -> Result<Vec<u8>, ServiceError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| ServiceError::Upload(e.to_string()))?;
        if bytes.len() + chunk.len() > max_bytes {
            return Err(ServiceError::Upload(format!(
                "upload exceeds the {} byte limit",
                max_bytes
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}
