use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::metadata::{MetadataLookup, ProviderSet};

/// In-flight call counter that several lookups can share.
#[derive(Default)]
pub struct InFlight {
    calls: AtomicUsize,
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Scriptable lookup that records how it was called.
pub struct FakeLookup<T> {
    answers: HashMap<String, T>,
    fallback: Option<T>,
    latency_ms: Option<(u64, u64)>,
    panic_on: Option<String>,
    own: InFlight,
    shared: Option<Arc<InFlight>>,
}

impl<T> FakeLookup<T> {
    pub fn new() -> Self {
        Self {
            answers: HashMap::new(),
            fallback: None,
            latency_ms: None,
            panic_on: None,
            own: InFlight::default(),
            shared: None,
        }
    }

    pub fn answer(mut self, title: &str, value: T) -> Self {
        self.answers.insert(title.to_string(), value);
        self
    }

    pub fn always(mut self, value: T) -> Self {
        self.fallback = Some(value);
        self
    }

    /// Sleep a random duration in `[min, max]` milliseconds per call.
    pub fn latency(mut self, min: u64, max: u64) -> Self {
        self.latency_ms = Some((min, max));
        self
    }

    pub fn panic_on(mut self, title: &str) -> Self {
        self.panic_on = Some(title.to_string());
        self
    }

    /// Also count calls in `tracker`, shared with other lookups.
    pub fn tracked(mut self, tracker: &Arc<InFlight>) -> Self {
        self.shared = Some(tracker.clone());
        self
    }

    pub fn calls(&self) -> usize {
        self.own.calls()
    }

    pub fn max_in_flight(&self) -> usize {
        self.own.peak()
    }

    fn trackers(&self) -> impl Iterator<Item = &InFlight> {
        std::iter::once(&self.own).chain(self.shared.as_deref())
    }
}

#[async_trait]
impl<T> MetadataLookup<T> for FakeLookup<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn lookup(&self, title: &str) -> Option<T> {
        self.trackers().for_each(InFlight::enter);

        if let Some((min, max)) = self.latency_ms {
            let millis = rand::thread_rng().gen_range(min..=max);
            tokio::time::sleep(Duration::from_millis(millis)).await;
        } else {
            tokio::task::yield_now().await;
        }

        self.trackers().for_each(InFlight::exit);

        if self.panic_on.as_deref() == Some(title) {
            panic!("lookup exploded for {title}");
        }

        self.answers
            .get(title)
            .cloned()
            .or_else(|| self.fallback.clone())
    }
}

/// Fakes for each role, kept around so tests can inspect them.
pub struct FakeProviders {
    pub cover_image: Arc<FakeLookup<String>>,
    pub episode_count: Arc<FakeLookup<u32>>,
    pub audience_score: Arc<FakeLookup<f64>>,
    pub classification: Arc<FakeLookup<String>>,
}

impl FakeProviders {
    pub fn new() -> Self {
        Self {
            cover_image: Arc::new(FakeLookup::new()),
            episode_count: Arc::new(FakeLookup::new()),
            audience_score: Arc::new(FakeLookup::new()),
            classification: Arc::new(FakeLookup::new()),
        }
    }

    pub fn provider_set(&self) -> ProviderSet {
        ProviderSet {
            cover_image: self.cover_image.clone(),
            episode_count: self.episode_count.clone(),
            audience_score: self.audience_score.clone(),
            classification: self.classification.clone(),
        }
    }
}
