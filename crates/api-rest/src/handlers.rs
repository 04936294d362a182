//! HTTP handlers.
//!
//! Entity ids in paths and bodies are the stable ids from item version tags. Handlers that act on
//! the drive first bridge the entity id to a drive item through its list-item id.

use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use docbridge_core::{
    build_hierarchy, find_by_id, immediate_children_of,
    pdf::{merge_pdfs, page_count, pdf_file_name_for},
    timesheet,
    validation::validate_item_name,
    ContentKind, CoreError, EntityId,
};
use graph_client::{CopyOutcome, GraphError};

use crate::error::{api_error, from_core, from_graph, ApiError};
use crate::AppState;
use api_shared::{dto, HealthService};

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = dto::HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks. Does not contact the content service.
#[axum::debug_handler]
pub async fn health(State(_state): State<AppState>) -> Json<dto::HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/folders",
    responses(
        (status = 200, description = "Folder forest; each node has name, serverID, parentID, children and rawItem"),
        (status = 502, description = "Content service error", body = dto::ErrorRes)
    )
)]
/// Returns the whole library as a forest of nested nodes.
#[axum::debug_handler]
pub async fn list_folders(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let items = state
        .graph
        .list_items()
        .await
        .map_err(|e| from_graph("List folders", e))?;

    let forest = build_hierarchy(&items);
    let body = serde_json::to_value(&forest).map_err(|e| {
        tracing::error!("Serialise forest error: {:?}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    })?;
    Ok(Json(body))
}

#[utoipa::path(
    get,
    path = "/folders/{id}",
    params(("id" = String, Path, description = "Entity id of the folder")),
    responses(
        (status = 200, description = "Subtree rooted at the folder"),
        (status = 404, description = "No item with that id", body = dto::ErrorRes),
        (status = 502, description = "Content service error", body = dto::ErrorRes)
    )
)]
/// Returns one node of the forest with its descendants attached.
#[axum::debug_handler]
pub async fn get_folder(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let items = state
        .graph
        .list_items()
        .await
        .map_err(|e| from_graph("Get folder", e))?;

    let forest = build_hierarchy(&items);
    let node = find_by_id(&forest, &EntityId::new(id.as_str())).ok_or_else(|| {
        api_error(StatusCode::NOT_FOUND, format!("Folder not found: {id}"))
    })?;
    let body = serde_json::to_value(node).map_err(|e| {
        tracing::error!("Serialise folder error: {:?}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    })?;
    Ok(Json(body))
}

#[utoipa::path(
    get,
    path = "/folders/{id}/subfolders",
    params(("id" = String, Path, description = "Entity id of the folder")),
    responses(
        (status = 200, description = "Immediate subfolders", body = dto::SubfoldersRes),
        (status = 404, description = "No item with that id", body = dto::ErrorRes),
        (status = 502, description = "Content service error", body = dto::ErrorRes)
    )
)]
/// Lists the direct subfolders of a folder, sorted by name, with the folder's parent.
#[axum::debug_handler]
pub async fn list_subfolders(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<dto::SubfoldersRes>, ApiError> {
    let items = state
        .graph
        .list_items()
        .await
        .map_err(|e| from_graph("List subfolders", e))?;

    let listing = immediate_children_of(
        &items,
        &EntityId::new(id.as_str()),
        Some(&ContentKind::Folder),
    )
    .map_err(|e| from_core("List subfolders", e))?;

    Ok(Json(dto::SubfoldersRes {
        name: listing.name,
        parent_id: listing.parent_id.map(EntityId::into_string),
        parent_name: listing.parent_name,
        subfolders: listing
            .children
            .into_iter()
            .map(|child| dto::SubfolderEntry {
                name: child.name,
                id: child.id.into_string(),
            })
            .collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/folders",
    request_body = dto::CreateFolderReq,
    responses(
        (status = 201, description = "Folder created", body = dto::CreateFolderRes),
        (status = 400, description = "Invalid folder name", body = dto::ErrorRes),
        (status = 404, description = "Parent not found", body = dto::ErrorRes),
        (status = 409, description = "A folder with that name exists", body = dto::ErrorRes),
        (status = 502, description = "Content service error", body = dto::ErrorRes)
    )
)]
/// Creates a folder inside an existing folder.
///
/// # Errors
/// Returns `409 Conflict` if the parent already contains an item with that name.
#[axum::debug_handler]
pub async fn create_folder(
    State(state): State<AppState>,
    Json(req): Json<dto::CreateFolderReq>,
) -> Result<(StatusCode, Json<dto::CreateFolderRes>), ApiError> {
    let name = validate_item_name(&req.name).map_err(|e| from_core("Create folder", e))?;

    let parent = state
        .graph
        .drive_item_for_entity(&EntityId::new(req.parent_id))
        .await
        .map_err(|e| from_graph("Create folder", e))?;
    let created = state
        .graph
        .create_folder(&parent.id, name.as_str())
        .await
        .map_err(|e| from_graph("Create folder", e))?;

    Ok((
        StatusCode::CREATED,
        Json(dto::CreateFolderRes {
            id: created.id,
            name: created.name,
            web_url: created.web_url,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/folders/copy",
    request_body = dto::CopyFolderReq,
    responses(
        (status = 200, description = "Copy finished", body = dto::CopyFolderRes),
        (status = 202, description = "Copy running in the background", body = dto::CopyFolderRes),
        (status = 400, description = "Invalid name", body = dto::ErrorRes),
        (status = 404, description = "Destination not found", body = dto::ErrorRes),
        (status = 500, description = "No template folder configured", body = dto::ErrorRes),
        (status = 502, description = "Content service error", body = dto::ErrorRes)
    )
)]
/// Copies the configured template folder into a destination folder.
#[axum::debug_handler]
pub async fn copy_template_folder(
    State(state): State<AppState>,
    Json(req): Json<dto::CopyFolderReq>,
) -> Result<(StatusCode, Json<dto::CopyFolderRes>), ApiError> {
    let Some(template_id) = state.cfg.template_folder_id() else {
        tracing::error!("Copy folder error: no template folder configured");
        return Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "No template folder is configured",
        ));
    };

    let new_name = req
        .name
        .as_deref()
        .map(validate_item_name)
        .transpose()
        .map_err(|e| from_core("Copy folder", e))?;

    let destination = state
        .graph
        .drive_item_for_entity(&EntityId::new(req.destination_id))
        .await
        .map_err(|e| from_graph("Copy folder", e))?;
    let outcome = state
        .graph
        .copy_item(
            template_id.as_str(),
            &destination.id,
            new_name.as_ref().map(|name| name.as_str()),
        )
        .await
        .map_err(|e| from_graph("Copy folder", e))?;

    Ok(match outcome {
        CopyOutcome::Accepted { monitor_url } => (
            StatusCode::ACCEPTED,
            Json(dto::CopyFolderRes {
                status: "accepted".into(),
                monitor_url,
            }),
        ),
        CopyOutcome::Completed => (
            StatusCode::OK,
            Json(dto::CopyFolderRes {
                status: "completed".into(),
                monitor_url: None,
            }),
        ),
    })
}

#[utoipa::path(
    post,
    path = "/upload_file",
    request_body = dto::UploadFileReq,
    responses(
        (status = 200, description = "File uploaded", body = dto::UploadFileRes),
        (status = 400, description = "Invalid name or content", body = dto::ErrorRes),
        (status = 404, description = "Destination folder not found", body = dto::ErrorRes),
        (status = 502, description = "Content service error", body = dto::ErrorRes)
    )
)]
/// Uploads a base64 file into the folder identified by `server_id`.
#[axum::debug_handler]
pub async fn upload_file(
    State(state): State<AppState>,
    Json(req): Json<dto::UploadFileReq>,
) -> Result<Json<dto::UploadFileRes>, ApiError> {
    let file_name = validate_item_name(&req.file_name).map_err(|e| from_core("Upload file", e))?;
    let content = decode_base64("file_data", &req.file_data)?;

    let folder = state
        .graph
        .drive_item_for_entity(&EntityId::new(req.server_id))
        .await
        .map_err(|e| from_graph("Upload file", e))?;
    let uploaded = state
        .graph
        .upload_file(&folder.id, file_name.as_str(), content)
        .await
        .map_err(|e| from_graph("Upload file", e))?;

    let file_url = uploaded.web_url.ok_or_else(|| {
        from_graph(
            "Upload file",
            GraphError::UnexpectedResponse("uploaded item has no webUrl".into()),
        )
    })?;

    Ok(Json(dto::UploadFileRes {
        message: "File uploaded successfully".into(),
        file_url,
    }))
}

#[utoipa::path(
    post,
    path = "/delete_file",
    request_body = dto::DeleteFileReq,
    responses(
        (status = 200, description = "File deleted", body = dto::DeleteFileRes),
        (status = 404, description = "File not found", body = dto::ErrorRes),
        (status = 502, description = "Content service error", body = dto::ErrorRes)
    )
)]
/// Deletes the file behind a web URL previously returned by the facade.
#[axum::debug_handler]
pub async fn delete_file(
    State(state): State<AppState>,
    Json(req): Json<dto::DeleteFileReq>,
) -> Result<Json<dto::DeleteFileRes>, ApiError> {
    let not_found = |e: GraphError| match e {
        GraphError::NotFound(_) => {
            tracing::warn!(file_url = %req.file_url, "delete requested for missing file");
            api_error(
                StatusCode::NOT_FOUND,
                format!("File not found: {}", req.file_url),
            )
        }
        other => from_graph("Delete file", other),
    };

    let item = state
        .graph
        .resolve_share_url(&req.file_url)
        .await
        .map_err(not_found)?;
    state
        .graph
        .delete_item(&item.id)
        .await
        .map_err(not_found)?;

    Ok(Json(dto::DeleteFileRes {
        message: "File deleted successfully".into(),
        file_url: req.file_url,
    }))
}

#[utoipa::path(
    post,
    path = "/convert_doc_to_pdf/{server_id}",
    params(("server_id" = String, Path, description = "Entity id of the document")),
    request_body = dto::ConvertDocReq,
    responses(
        (status = 200, description = "Rendered document with the PDF appended", body = dto::ConvertDocRes),
        (status = 400, description = "Appended PDF is invalid", body = dto::ErrorRes),
        (status = 404, description = "Document not found", body = dto::ErrorRes),
        (status = 415, description = "Document cannot be rendered as PDF", body = dto::ErrorRes),
        (status = 502, description = "Content service error", body = dto::ErrorRes)
    )
)]
/// Renders a document as PDF, appends the supplied PDF and stores the result next to the source.
///
/// The merged PDF is always returned. `sharepoint_file_url` is omitted when storing it fails.
#[axum::debug_handler]
pub async fn convert_doc_to_pdf(
    State(state): State<AppState>,
    AxumPath(server_id): AxumPath<String>,
    Json(req): Json<dto::ConvertDocReq>,
) -> Result<Json<dto::ConvertDocRes>, ApiError> {
    let appended = decode_base64("pdf_to_append_b64", &req.pdf_to_append_b64)?;
    page_count(&appended).map_err(|e| {
        from_core(
            "Convert document",
            CoreError::InvalidInput(format!("pdf_to_append_b64 is not a readable PDF: {e}")),
        )
    })?;

    let document = state
        .graph
        .drive_item_for_entity(&EntityId::new(server_id))
        .await
        .map_err(|e| from_graph("Convert document", e))?;
    let rendered = state
        .graph
        .render_pdf(&document.id)
        .await
        .map_err(|e| from_graph("Convert document", e))?;

    let merged = merge_pdfs(&rendered, &appended).map_err(|e| {
        tracing::error!("Convert document error: {:?}", e);
        api_error(
            StatusCode::BAD_GATEWAY,
            format!("rendered document could not be merged: {e}"),
        )
    })?;

    let file_name = pdf_file_name_for(document.name.as_deref().unwrap_or_default());
    let sharepoint_file_url = match document.parent_id() {
        Some(parent_id) => match state
            .graph
            .upload_file(parent_id, &file_name, merged.clone())
            .await
        {
            Ok(uploaded) => uploaded.web_url,
            Err(e) => {
                tracing::error!("Store merged PDF error: {:?}", e);
                None
            }
        },
        None => {
            tracing::warn!(document = %document.id, "document has no parent folder, merged PDF not stored");
            None
        }
    };

    Ok(Json(dto::ConvertDocRes {
        combined_pdf_base64: STANDARD.encode(&merged),
        sharepoint_file_url,
    }))
}

#[utoipa::path(
    post,
    path = "/timesheets/aggregate",
    request_body = dto::AggregateTimesheetReq,
    responses(
        (status = 200, description = "Hours per project and person", body = dto::AggregateTimesheetRes),
        (status = 400, description = "Invalid CSV", body = dto::ErrorRes)
    )
)]
/// Aggregates a base64 timesheet CSV export.
#[axum::debug_handler]
pub async fn aggregate_timesheet(
    State(_state): State<AppState>,
    Json(req): Json<dto::AggregateTimesheetReq>,
) -> Result<Json<dto::AggregateTimesheetRes>, ApiError> {
    let csv_bytes = decode_base64("csv_base64", &req.csv_base64)?;
    let summary = timesheet::aggregate_timesheet(csv_bytes.as_slice())
        .map_err(|e| from_core("Aggregate timesheet", e))?;
    let summary_csv = summary
        .to_csv()
        .map_err(|e| from_core("Aggregate timesheet", e))?;

    Ok(Json(dto::AggregateTimesheetRes {
        rows: summary
            .rows
            .into_iter()
            .map(|row| dto::TimesheetRowRes {
                project: row.project,
                person: row.person,
                hours: row.hours,
            })
            .collect(),
        total_hours: summary.total_hours,
        summary_csv,
    }))
}

fn decode_base64(field: &str, value: &str) -> Result<Vec<u8>, ApiError> {
    STANDARD.decode(value.trim()).map_err(|e| {
        tracing::error!("Decode {} error: {:?}", field, e);
        api_error(
            StatusCode::BAD_REQUEST,
            format!("{field} is not valid base64"),
        )
    })
}
