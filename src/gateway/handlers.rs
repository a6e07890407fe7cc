use super::error::ApiError;
use super::AppState;
use crate::intake::allowed_file;
use axum::{
    extract::{multipart::Field, rejection::FormRejection, FromRequest, Multipart, Request, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    Form, Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub answer: String,
}

/// A file part of the submitted form.
struct FormFile {
    filename: String,
    data: Vec<u8>,
}

/// The fields `POST /api/` cares about.
#[derive(Default)]
struct AskForm {
    question: Option<String>,
    file: Option<FormFile>,
}

/// `GET /`: static service description.
pub async fn index() -> Json<Value> {
    Json(json!({
        "name": "TDS Solver API",
        "description": "An API for automatically answering IIT Madras' TDS graded assignments",
        "usage": "Send POST requests to /api/ with 'question' and optional 'file'"
    }))
}

/// `POST /api/`: answer a question, optionally about an uploaded file.
pub async fn ask(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<AnswerResponse>, ApiError> {
    let form = read_form(request).await?;
    let question = form.question.ok_or(ApiError::MissingQuestion)?;

    let mut stored = None;
    if let Some(file) = form.file {
        if file.filename.is_empty() {
            return Err(ApiError::NoFileSelected);
        }
        if allowed_file(&file.filename) {
            let upload = state
                .storage
                .store(&file.filename, &file.data)
                .await
                .map_err(ApiError::Storage)?;
            stored = Some(upload);
        } else {
            debug!(filename = %file.filename, "Ignoring upload with unsupported extension");
        }
    }

    let answer = state
        .solver
        .answer(&question, stored.as_ref().map(|s| &s.file))
        .await;
    info!(source = ?answer.source, with_file = stored.is_some(), "Question answered");

    Ok(Json(AnswerResponse {
        answer: answer.text,
    }))
}

/// Read `question` and `file` from a multipart or URL-encoded body.
///
/// Other bodies carry no form fields, which surfaces as a missing question.
/// Failing to read the body itself, such as going over the size limit, is an error.
async fn read_form(request: Request) -> Result<AskForm, ApiError> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    if !is_multipart {
        let fields = match Form::<HashMap<String, String>>::from_request(request, &()).await {
            Ok(Form(fields)) => fields,
            Err(e @ FormRejection::BytesRejection(_)) => return Err(e.into()),
            Err(e) => {
                debug!(reason = %e.body_text(), "Body carries no form fields");
                HashMap::new()
            }
        };
        return Ok(AskForm {
            question: fields.get("question").cloned(),
            file: None,
        });
    }

    let mut multipart = Multipart::from_request(request, &()).await?;
    let mut form = AskForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("question") if form.question.is_none() => {
                form.question = Some(field.text().await?);
            }
            Some("file") if form.file.is_none() => {
                let filename = match field.file_name() {
                    Some(name) => name.to_string(),
                    // An empty file input still declares `filename=""`
                    None if declares_filename(&field) => String::new(),
                    // A plain text part named "file" is not an upload
                    None => continue,
                };
                let data = field.bytes().await?.to_vec();
                form.file = Some(FormFile { filename, data });
            }
            _ => {}
        }
    }
    Ok(form)
}

fn declares_filename(field: &Field<'_>) -> bool {
    field
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("filename="))
}
