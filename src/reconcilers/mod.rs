// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reconcilers that react to change feed events.

pub mod service;

pub use service::{build_service, Outcome, ServiceReconciler};
