// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Filtered ConfigMap subscription delivering ordered lifecycle events.

use crate::config::Config;
use crate::feed::cache::WatchCache;
use crate::types::ConfigMapEvent;
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::{Api, Client};
use kube_runtime::{watcher, WatchStreamExt};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

type WatchStream = BoxStream<'static, watcher::Result<watcher::Event<ConfigMap>>>;

/// Subscription to ConfigMaps carrying the watched label.
pub struct ChangeFeed {
    api: Api<ConfigMap>,
    label: String,
    namespace: Option<String>,
    resync_interval: Option<Duration>,
}

impl ChangeFeed {
    pub fn new(client: Client, config: &Config) -> Self {
        let api = match &config.namespace {
            Some(namespace) => Api::namespaced(client, namespace),
            None => Api::all(client),
        };

        Self {
            api,
            label: config.label_to_watch.clone(),
            namespace: config.namespace.clone(),
            resync_interval: config.resync_interval,
        }
    }

    /// Watch parameters: a bare label key is an "exists" selector
    pub fn watcher_config(&self) -> watcher::Config {
        watcher::Config::default().labels(&self.label)
    }

    /// Start watching.
    ///
    /// The stream never yields errors: failed lists and watches are logged and
    /// retried with backoff, and the relist that follows repairs whatever was
    /// missed in between.
    pub fn subscribe(self) -> impl Stream<Item = ConfigMapEvent> + Send + 'static {
        info!(
            label = %self.label,
            namespace = self.namespace.as_deref().unwrap_or("<all>"),
            resync = ?self.resync_interval,
            "Subscribing to ConfigMaps"
        );

        let watch = watcher(self.api.clone(), self.watcher_config())
            .default_backoff()
            .boxed();

        FeedState::new(watch, self.label, self.resync_interval).into_stream()
    }
}

struct FeedState {
    watch: WatchStream,
    cache: WatchCache,
    pending: VecDeque<ConfigMapEvent>,
    resync: Option<Interval>,
}

impl FeedState {
    fn new(watch: WatchStream, label: String, resync_interval: Option<Duration>) -> Self {
        let resync = resync_interval.map(|period| {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        Self {
            watch,
            cache: WatchCache::new(label),
            pending: VecDeque::new(),
            resync,
        }
    }

    fn into_stream(self) -> impl Stream<Item = ConfigMapEvent> + Send + 'static {
        stream::unfold(self, |mut state| async move {
            let event = state.next_event().await?;
            Some((event, state))
        })
    }

    async fn next_event(&mut self) -> Option<ConfigMapEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }

            tokio::select! {
                item = self.watch.next() => match item {
                    Some(Ok(event)) => self.pending.extend(self.cache.apply(event)),
                    Some(Err(e)) => warn!("ConfigMap watch failed, will retry: {}", e),
                    None => {
                        warn!("ConfigMap watch stream ended");
                        return None;
                    }
                },
                _ = next_resync(&mut self.resync) => {
                    debug!(objects = self.cache.len(), "Resyncing watched ConfigMaps");
                    self.pending.extend(self.cache.resync());
                }
            }
        }
    }
}

/// Completes on the next resync tick, never when resync is disabled
async fn next_resync(resync: &mut Option<Interval>) {
    match resync {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
