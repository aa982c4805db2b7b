// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Domain types shared by the change feed and the reconciler.

pub mod endpoint;
pub mod event;

pub use endpoint::RdsEndpoint;
pub use event::{ConfigMapEvent, ObjectKey};
