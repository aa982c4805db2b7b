// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Change feed: watches labelled ConfigMaps and emits Added/Updated/Removed events.

pub mod cache;
pub mod change_feed;

pub use change_feed::ChangeFeed;
