#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use lookout::*;
use parking_lot::Mutex;

pub fn instances(names: &[&str]) -> Vec<Instance> {
    names.iter().map(|name| Instance::new(*name)).collect()
}

pub fn post(url: &str, instance: &str) -> PostRecord {
    PostRecord {
        content_url: url.to_string(),
        author_name: "Jane Doe".to_string(),
        author_handle: "@janedoe".to_string(),
        text: "hello".to_string(),
        timestamp: "2023-11-14T08:30:00+00:00".to_string(),
        media_url: None,
        source_instance: Instance::new(instance),
    }
}

/// Reports a fixed latency per instance; instances mapped to `None` (or not
/// mapped at all) fail.
pub struct FakeProbe {
    latencies: HashMap<Instance, Option<u64>>,
    delay: Duration,
    calls: Mutex<Vec<Instance>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeProbe {
    pub fn new(latencies: &[(&str, Option<u64>)]) -> Self {
        Self {
            latencies: latencies
                .iter()
                .map(|(name, latency)| (Instance::new(*name), *latency))
                .collect(),
            delay: Duration::from_millis(20),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> Vec<Instance> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Probe for FakeProbe {
    async fn check(&self, instance: &Instance) -> Option<ProbeOutcome> {
        self.calls.lock().push(instance.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.latencies
            .get(instance)
            .copied()
            .flatten()
            .map(|latency_ms| ProbeOutcome {
                instance: instance.clone(),
                latency_ms,
            })
    }
}

/// Serves a post from the listed instances and fails everywhere else.
pub struct FakeFetcher {
    working: HashMap<Instance, String>,
    attempts: Mutex<Vec<Instance>>,
}

impl FakeFetcher {
    pub fn new(working: &[(&str, &str)]) -> Self {
        Self {
            working: working
                .iter()
                .map(|(name, url)| (Instance::new(*name), url.to_string()))
                .collect(),
            attempts: Mutex::new(Vec::new()),
        }
    }

    pub fn attempts(&self) -> Vec<Instance> {
        self.attempts.lock().clone()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, instance: &Instance, handle: &str) -> Result<PostRecord> {
        self.attempts.lock().push(instance.clone());
        match self.working.get(instance) {
            Some(url) => Ok(post(url, instance.as_str())),
            None => Err(LookoutError::Fetch {
                instance: instance.clone(),
                cause: format!("no timeline for {handle} on {instance}"),
            }),
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub fail: bool,
    pub delivered: Mutex<Vec<PostRecord>>,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self { fail: true, delivered: Mutex::new(Vec::new()) }
    }

    pub fn delivered(&self) -> Vec<PostRecord> {
        self.delivered.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, post: &PostRecord) -> Result<()> {
        if self.fail {
            return Err(LookoutError::Delivery("webhook returned HTTP 500".to_string()));
        }
        self.delivered.lock().push(post.clone());
        Ok(())
    }
}
