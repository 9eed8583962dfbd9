//! Upload handlers: the HTML form flow and its JSON twin.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Html,
    Json,
};
use tracing::{info, warn};

use crate::errors::{ApiError, AppError};
use crate::models::{ExtractionResult, UploadedDocument};
use crate::render::{extraction_page, UPLOAD_FORM};
use crate::state::AppState;
use crate::storage::is_pdf_filename;

/// Name of the multipart field carrying the résumé.
const FILE_FIELD: &str = "file";

/// GET /
pub async fn upload_form() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}

/// POST /upload
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Html<String>, AppError> {
    let result = process_upload(&state, multipart).await?;
    Ok(Html(extraction_page(&result)))
}

/// POST /api/v1/resumes/parse
pub async fn handle_parse_api(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractionResult>, ApiError> {
    let result = process_upload(&state, multipart).await?;
    Ok(Json(result))
}

async fn process_upload(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ExtractionResult, AppError> {
    let multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => {
            warn!("Upload rejected, not a multipart request: {rejection}");
            return Err(AppError::NoFile);
        }
    };

    let Some(document) = read_upload(multipart).await? else {
        warn!("Upload rejected, no '{FILE_FIELD}' field");
        return Err(AppError::NoFile);
    };
    info!(
        "Upload received: {} ({} bytes)",
        document.file_name,
        document.bytes.len()
    );

    if !is_pdf_filename(&document.file_name) {
        warn!("Upload rejected, not a PDF: {}", document.file_name);
        return Err(AppError::InvalidFileType);
    }

    let path = state.uploads.save(&document).await?;
    info!("Stored upload at {}", path.display());

    let result = state.extractor.extract_from_file(&path).await?;
    if result.is_empty() {
        info!("No contact details or entities found in {}", path.display());
    }
    info!(
        phone = result.contact.phone.is_some(),
        email = result.contact.email.is_some(),
        education = result.entities.education.len(),
        work_experience = result.entities.work_experience.len(),
        "Extraction complete"
    );
    Ok(result)
}

/// Returns the first `file` field that carries a filename. Other fields are skipped.
async fn read_upload(mut multipart: Multipart) -> Result<Option<UploadedDocument>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field.bytes().await?;
        return Ok(Some(UploadedDocument { file_name, bytes }));
    }
    Ok(None)
}
