use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, warn, Instrument};

use ag_core::filters::{FilterValue, Filters};
use ag_core::notify::Toast;
use ag_core::ports::{ApiError, NotifierPort, ResourceReadPort};
use ag_core::realtime::{FeedUpdate, LiveResource, RealtimeEvent};

/// What became of a list refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The response was applied; carries the item count.
    Applied(usize),
    /// A newer request was issued meanwhile; the response was dropped.
    Stale,
    Failed(ApiError),
}

/// A filtered list page kept in sync with the realtime channel.
pub struct ListingFeed<R: LiveResource> {
    reader: Arc<dyn ResourceReadPort<R>>,
    notifier: Arc<dyn NotifierPort>,
    filters: Mutex<Filters>,
    items: Mutex<Vec<R>>,
    latest_request: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<R: LiveResource> ListingFeed<R> {
    pub fn new(reader: Arc<dyn ResourceReadPort<R>>, notifier: Arc<dyn NotifierPort>) -> Self {
        Self {
            reader,
            notifier,
            filters: Mutex::new(Filters::new()),
            items: Mutex::new(Vec::new()),
            latest_request: AtomicU64::new(0),
        }
    }

    pub fn items(&self) -> Vec<R> {
        lock(&self.items).clone()
    }

    pub fn filters(&self) -> Filters {
        lock(&self.filters).clone()
    }

    /// Query string the next refresh will use.
    pub fn query_string(&self) -> String {
        lock(&self.filters).to_query_string()
    }

    /// Re-fetches with the current filters.
    ///
    /// Only the response of the most recently issued request is applied.
    pub async fn refresh(&self) -> RefreshOutcome {
        let ticket = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
        let filters = self.filters();
        let span = info_span!(
            "usecase.listing_feed.refresh",
            resource = R::PATH,
            ticket,
            query = %filters.to_query_string()
        );

        async move {
            let result = self.reader.list(&filters).await;

            if self.latest_request.load(Ordering::SeqCst) != ticket {
                debug!("discarding stale listing response");
                return RefreshOutcome::Stale;
            }

            match result {
                Ok(items) => {
                    let count = items.len();
                    *lock(&self.items) = items;
                    debug!(count, "listing refreshed");
                    RefreshOutcome::Applied(count)
                }
                Err(err) => {
                    warn!(error = %err, "listing fetch failed");
                    self.notifier.notify(Toast::error(err.user_message()));
                    RefreshOutcome::Failed(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Replaces all filters and re-fetches.
    pub async fn apply_filters(&self, filters: Filters) -> RefreshOutcome {
        *lock(&self.filters) = filters;
        self.refresh().await
    }

    /// Changes one filter and re-fetches.
    pub async fn set_filter(
        &self,
        key: impl Into<String>,
        value: impl Into<FilterValue>,
    ) -> RefreshOutcome {
        lock(&self.filters).set(key, value);
        self.refresh().await
    }

    pub async fn clear_filters(&self) -> RefreshOutcome {
        lock(&self.filters).clear();
        self.refresh().await
    }

    /// Applies a pushed event. Returns whether the list changed.
    ///
    /// New items go to the top regardless of the active filters; an item
    /// already listed is not added twice.
    pub fn apply_event(&self, event: &RealtimeEvent) -> bool {
        let Some(update) = R::feed_update(event) else {
            return false;
        };

        let mut items = lock(&self.items);
        match update {
            FeedUpdate::Prepend(item) => {
                if items.iter().any(|existing| existing.id() == item.id()) {
                    debug!(id = %item.id(), "pushed item already listed");
                    return false;
                }
                items.insert(0, item);
                true
            }
            FeedUpdate::Replace(item) => {
                match items.iter_mut().find(|existing| existing.id() == item.id()) {
                    Some(slot) => {
                        *slot = item;
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// Applies pushed events until `cancel` fires or the channel closes.
    pub async fn follow(
        &self,
        mut events: broadcast::Receiver<RealtimeEvent>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                event = events.recv() => match event {
                    Ok(event) => {
                        self.apply_event(&event);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, resource = R::PATH, "listing feed lagged behind realtime events");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ag_core::ids::DemandId;
    use ag_core::marketplace::{Demand, Produce};
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::{oneshot, Mutex as AsyncMutex};

    fn demand(id: &str, crop: &str) -> Demand {
        serde_json::from_value(json!({"_id": id, "crop": crop, "quantity": 1.0})).unwrap()
    }

    struct Catalog {
        queries: std::sync::Mutex<Vec<String>>,
        items: Vec<Demand>,
    }

    #[async_trait]
    impl ResourceReadPort<Demand> for Catalog {
        async fn list(&self, filters: &Filters) -> Result<Vec<Demand>, ApiError> {
            self.queries.lock().unwrap().push(filters.to_query_string());
            Ok(self.items.clone())
        }

        async fn get(&self, id: &DemandId) -> Result<Demand, ApiError> {
            self.items
                .iter()
                .find(|d| &d.id == id)
                .cloned()
                .ok_or(ApiError::Http {
                    status: 404,
                    message: None,
                })
        }
    }

    #[derive(Default)]
    struct Silent;

    impl NotifierPort for Silent {
        fn notify(&self, _: Toast) {}
    }

    #[tokio::test]
    async fn filters_reach_the_reader_without_empty_values() {
        let catalog = Arc::new(Catalog {
            queries: Default::default(),
            items: vec![demand("d1", "maize")],
        });
        let feed = ListingFeed::new(catalog.clone(), Arc::new(Silent));

        let outcome = feed
            .apply_filters(
                Filters::new()
                    .with("crop", "maize")
                    .with("county", "")
                    .with("minPrice", 50)
                    .with("maxPrice", ""),
            )
            .await;

        assert_eq!(outcome, RefreshOutcome::Applied(1));
        assert_eq!(
            catalog.queries.lock().unwrap().as_slice(),
            ["?crop=maize&minPrice=50".to_string()]
        );
    }

    #[tokio::test]
    async fn pushed_items_are_prepended_once() {
        let catalog = Arc::new(Catalog {
            queries: Default::default(),
            items: vec![demand("d1", "maize")],
        });
        let feed = ListingFeed::new(catalog, Arc::new(Silent));
        feed.refresh().await;

        let pushed = RealtimeEvent::NewDemand(demand("d2", "beans"));
        assert!(feed.apply_event(&pushed));
        assert!(!feed.apply_event(&pushed));

        let ids: Vec<_> = feed.items().into_iter().map(|d| d.id.to_string()).collect();
        assert_eq!(ids, ["d2", "d1"]);
    }

    #[tokio::test]
    async fn unrelated_events_are_ignored() {
        let catalog = Arc::new(Catalog {
            queries: Default::default(),
            items: Vec::new(),
        });
        let feed: ListingFeed<Demand> = ListingFeed::new(catalog, Arc::new(Silent));
        let listing: Produce =
            serde_json::from_value(json!({"_id": "p1", "crop": "maize"})).unwrap();

        assert!(!feed.apply_event(&RealtimeEvent::NewListing(listing)));
        assert!(feed.items().is_empty());
    }

    /// Reader whose first call blocks until released, so a second request can
    /// overtake it.
    struct Gated {
        first_release: AsyncMutex<Option<oneshot::Receiver<()>>>,
    }

    #[async_trait]
    impl ResourceReadPort<Demand> for Gated {
        async fn list(&self, filters: &Filters) -> Result<Vec<Demand>, ApiError> {
            let gate = self.first_release.lock().await.take();
            if let Some(release) = gate {
                let _ = release.await;
                return Ok(vec![demand("old", "stale")]);
            }
            let crop = filters.get("crop").and_then(FilterValue::render);
            Ok(vec![demand("new", crop.as_deref().unwrap_or("any"))])
        }

        async fn get(&self, _: &DemandId) -> Result<Demand, ApiError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn older_response_arriving_late_is_discarded() {
        let (release, first_release) = oneshot::channel();
        let reader = Arc::new(Gated {
            first_release: AsyncMutex::new(Some(first_release)),
        });
        let feed = Arc::new(ListingFeed::new(reader, Arc::new(Silent)));

        let slow = {
            let feed = feed.clone();
            tokio::spawn(async move { feed.refresh().await })
        };
        tokio::task::yield_now().await;

        let fast = feed.set_filter("crop", "beans").await;
        release.send(()).unwrap();
        let slow = slow.await.unwrap();

        assert_eq!(fast, RefreshOutcome::Applied(1));
        assert_eq!(slow, RefreshOutcome::Stale);
        assert_eq!(feed.items()[0].crop, "beans");
    }
}
