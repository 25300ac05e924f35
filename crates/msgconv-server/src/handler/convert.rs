//! The upload-convert-stream pipeline behind `POST /`.
//!
//! Strictly sequential within one request: the multipart body is fully
//! ingested into the scoped workspace, then the converter runs, then the
//! artifact is streamed back. The workspace travels with the response
//! body on the success path and is dropped (removed) on every other
//! path.

use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use msgconv_core::{ArtifactStream, Outcome, Workspace};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::handler::{ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for conversion requests.
const TRACING_TARGET: &str = "msgconv_server::handler::convert";

/// Multipart field name carrying the uploaded document.
const UPLOAD_FIELD: &str = "msg";

/// Content type of the converted artifact.
const EML_CONTENT_TYPE: &str = "message/rfc822";

/// Converts an uploaded `.msg` document and streams back the `.eml`
/// artifact.
///
/// Form data:
/// - `msg`: the binary document to convert (other fields are ignored)
async fn convert_msg(
    State(state): State<ServiceState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response> {
    // Wrong content type: reject before any filesystem state exists.
    let multipart = multipart.map_err(|rejection| {
        tracing::debug!(
            target: TRACING_TARGET,
            error = %rejection,
            "rejecting non-multipart request"
        );
        ErrorKind::MultipartRequired
    })?;

    let workspace = create_workspace(&state)?;

    let Some(input) = ingest_upload(multipart, &workspace).await? else {
        tracing::debug!(target: TRACING_TARGET, "multipart body carried no msg field");
        return Err(ErrorKind::MissingInput.into());
    };

    let output = workspace.artifact_path(&input);
    let outcome = state.invoker().invoke(&input, &output).await;

    match outcome {
        Outcome::Succeeded => {
            // The stream takes the workspace with it; teardown happens
            // when the body completes or the client disconnects.
            let stream = ArtifactStream::open(workspace, &output).await.map_err(|err| {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %err,
                    output = %output.display(),
                    "converter reported success but artifact is unreadable"
                );
                ErrorKind::Internal
            })?;

            let content_type = [(header::CONTENT_TYPE, HeaderValue::from_static(EML_CONTENT_TYPE))];
            Ok((content_type, Body::from_stream(stream)).into_response())
        }
        Outcome::FailedNonZero { status, stderr } => {
            tracing::debug!(
                target: TRACING_TARGET,
                status = ?status.code(),
                "returning converter diagnostics to the client"
            );
            Err(ErrorKind::ConversionFailed.with_detail(stderr))
        }
        Outcome::TimedOut | Outcome::LaunchError(_) => Err(ErrorKind::ConversionFailed.into()),
    }
}

/// Creates the per-request workspace under the configured root.
fn create_workspace(state: &ServiceState) -> Result<Workspace> {
    let created = match &state.config().workspace_root {
        Some(root) => Workspace::create_in(root),
        None => Workspace::create(),
    };

    created.map_err(|err| {
        tracing::error!(target: TRACING_TARGET, error = %err, "failed to create workspace");
        ErrorKind::Internal.into()
    })
}

/// Streams the `msg` part of the multipart body into the workspace.
///
/// Fields are consumed in arrival order; any field not named `msg` is
/// drained and ignored. Returns the stored input path, or `None` when
/// the body held no `msg` part. Part bytes are written chunk by chunk,
/// never buffering a whole part in memory.
async fn ingest_upload(mut multipart: Multipart, workspace: &Workspace) -> Result<Option<PathBuf>> {
    let mut stored = None;

    loop {
        let field = multipart.next_field().await.map_err(|err| {
            tracing::error!(target: TRACING_TARGET, error = %err, "failed to read multipart field");
            ErrorKind::Internal
        })?;

        let Some(mut field) = field else { break };

        if field.name() != Some(UPLOAD_FIELD) {
            tracing::debug!(
                target: TRACING_TARGET,
                field = field.name().unwrap_or("<unnamed>"),
                "ignoring unrecognized field"
            );
            continue;
        }

        let path = workspace.input_path(field.file_name());

        tracing::debug!(
            target: TRACING_TARGET,
            filename = ?field.file_name(),
            path = %path.display(),
            "storing uploaded document"
        );

        let mut file = File::create(&path).await.map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %err,
                path = %path.display(),
                "failed to create upload file"
            );
            ErrorKind::Internal
        })?;

        while let Some(chunk) = field.chunk().await.map_err(|err| {
            tracing::error!(target: TRACING_TARGET, error = %err, "failed to read upload chunk");
            ErrorKind::Internal
        })? {
            file.write_all(&chunk).await.map_err(|err| {
                tracing::error!(target: TRACING_TARGET, error = %err, "failed to write upload chunk");
                ErrorKind::Internal
            })?;
        }

        file.flush().await.map_err(|err| {
            tracing::error!(target: TRACING_TARGET, error = %err, "failed to flush upload file");
            ErrorKind::Internal
        })?;

        stored = Some(path);
    }

    Ok(stored)
}

/// Returns a [`Router`] with the conversion route.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/", post(convert_msg))
}
