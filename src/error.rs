// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to create Kubernetes client: {0}")]
    Client(String),
}

impl ControllerError {
    /// HTTP status code of a Kubernetes API error response, if this is one
    pub fn api_code(&self) -> Option<u16> {
        match self {
            ControllerError::Kube(kube::Error::Api(resp)) => Some(resp.code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.api_code() == Some(404)
    }

    pub fn is_already_exists(&self) -> bool {
        self.api_code() == Some(409)
    }
}

pub type Result<T> = std::result::Result<T, ControllerError>;
