// Copyright 2022 Zinc Labs Inc. and Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use tscompute::{
    value::{ComputeRequest, ComputeResponse},
    ComputeError, Func, Issue,
};

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub issues: Vec<Issue>,
}

/// Maps computation errors onto HTTP responses.
#[derive(Debug)]
pub struct ApiError(ComputeError);

impl From<ComputeError> for ApiError {
    fn from(err: ComputeError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!("Computation failed: {}", self.0);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = ErrorResponse {
            issues: self.0.issues(),
        };
        (status, Json(body)).into_response()
    }
}

pub async fn execute(
    Path(compute_name): Path<String>,
    body: Bytes,
) -> Result<Json<ComputeResponse>, ApiError> {
    let start_time = Instant::now();

    // reject unknown names before looking at the payload
    Func::parse(&compute_name)?;
    let request: ComputeRequest = serde_json::from_slice(&body).map_err(invalid_request)?;

    let response = run_blocking(move || tscompute::execute(&request, &compute_name)).await?;
    tracing::info!("execute time: {:?}", start_time.elapsed());

    Ok(Json(response))
}

pub async fn healthz() -> &'static str {
    "OK"
}

/// Runs `f` on the blocking pool. A panic inside `f` surfaces as an internal
/// error instead of tearing down the connection.
async fn run_blocking<F, T>(f: F) -> Result<T, ComputeError>
where
    F: FnOnce() -> Result<T, ComputeError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ComputeError::Internal(format!("computation task failed: {e}")))?
}

fn invalid_request(err: serde_json::Error) -> ComputeError {
    let code = match err.classify() {
        Category::Data => "invalid_request",
        Category::Io | Category::Syntax | Category::Eof => "invalid_json",
    };
    ComputeError::validation(Issue::new(code, err.to_string(), Vec::<String>::new()))
}
