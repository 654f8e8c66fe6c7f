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

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::functions::Func;

pub const CODE_INVALID_COMPUTE_NAME: &str = "invalid_compute_name";
pub const CODE_INVALID_TIMESTAMP: &str = "invalid_timestamp";
pub const CODE_INVALID_PARAMETER: &str = "invalid_parameter";
pub const CODE_INTERNAL_ERROR: &str = "internal_error";

/// A single problem found in a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub code: String,
    pub message: String,
    /// Location of the offending value, outermost field first.
    pub path: Vec<String>,
}

impl Issue {
    pub fn new<I, S>(code: &str, message: impl Into<String>, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            code: code.to_owned(),
            message: message.into(),
            path: path.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Invalid compute name '{name}'. Valid options: {}", Func::names().join(", "))]
    UnknownComputation { name: String },

    #[error("Validation failed: {}", describe(.0))]
    Validation(Vec<Issue>),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn describe(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(|issue| issue.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ComputeError {
    pub fn validation(issue: Issue) -> Self {
        ComputeError::Validation(vec![issue])
    }

    /// Prepends `prefix` to the path of every validation issue.
    pub fn within<S: AsRef<str>>(self, prefix: &[S]) -> Self {
        match self {
            ComputeError::Validation(issues) => ComputeError::Validation(
                issues
                    .into_iter()
                    .map(|mut issue| {
                        let mut path = prefix
                            .iter()
                            .map(|s| s.as_ref().to_owned())
                            .collect::<Vec<_>>();
                        path.append(&mut issue.path);
                        issue.path = path;
                        issue
                    })
                    .collect(),
            ),
            other => other,
        }
    }

    /// Renders the error as the issue list reported to callers.
    pub fn issues(&self) -> Vec<Issue> {
        match self {
            ComputeError::UnknownComputation { .. } => vec![Issue::new(
                CODE_INVALID_COMPUTE_NAME,
                self.to_string(),
                ["compute_name"],
            )],
            ComputeError::Validation(issues) => issues.clone(),
            ComputeError::Internal(msg) => vec![Issue::new(
                CODE_INTERNAL_ERROR,
                msg.clone(),
                Vec::<String>::new(),
            )],
        }
    }

    /// Whether the caller sent something wrong, as opposed to a failure on
    /// our side.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ComputeError::Internal(_))
    }
}

pub type Result<T> = std::result::Result<T, ComputeError>;
