// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes client creation and the Service store.

pub mod client;
pub mod services;

pub use client::connect;
pub use services::{KubeServiceStore, ServiceStore};
