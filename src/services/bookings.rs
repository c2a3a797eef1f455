use std::cmp::Reverse;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::models::{AuthUser, Booking};
use crate::services::store::{DocumentStore, Filter};

/// How many bookings the recent view keeps after sorting.
pub const RECENT_LIMIT: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct PendingRequests {
    pub bookings: Vec<Booking>,
    pub loading: bool,
}

impl Default for PendingRequests {
    fn default() -> Self {
        // The dashboard shows a spinner until the first refresh lands.
        Self {
            bookings: Vec::new(),
            loading: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentBookings {
    pub bookings: Vec<Booking>,
    pub pending_count: usize,
    pub loading: bool,
}

impl Default for RecentBookings {
    fn default() -> Self {
        Self {
            bookings: Vec::new(),
            pending_count: 0,
            loading: true,
        }
    }
}

impl RecentBookings {
    fn empty() -> Self {
        Self {
            bookings: Vec::new(),
            pending_count: 0,
            loading: false,
        }
    }
}

/// The two booking feeds of one dashboard session. Each refresh re-queries
/// the store; nothing is observed live.
pub struct BookingFeeds {
    store: Arc<dyn DocumentStore>,
    collection: String,
    pending: Mutex<PendingRequests>,
    recent: Mutex<RecentBookings>,
    pending_generation: AtomicU64,
    recent_generation: AtomicU64,
}

impl BookingFeeds {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
            pending: Mutex::new(PendingRequests::default()),
            recent: Mutex::new(RecentBookings::default()),
            pending_generation: AtomicU64::new(0),
            recent_generation: AtomicU64::new(0),
        }
    }

    pub fn pending_view(&self) -> PendingRequests {
        self.pending.lock().unwrap().clone()
    }

    pub fn recent_view(&self) -> RecentBookings {
        self.recent.lock().unwrap().clone()
    }

    /// Fetches the professional's pending booking requests, newest first by
    /// creation timestamp. Without a user nothing is fetched and the prior
    /// state stays as-is.
    pub async fn refresh_pending(&self, user: Option<&AuthUser>) -> PendingRequests {
        // Every call moves the feed to a new generation; whatever is still in
        // flight for an older one gets discarded on completion.
        let generation = self.pending_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(user) = user else {
            return self.pending_view();
        };

        self.pending.lock().unwrap().loading = true;

        let filters = [
            Filter::eq("professionalId", user.uid.as_str()),
            Filter::eq("status", "pending"),
        ];
        let mut bookings = match self.store.query(&self.collection, &filters).await {
            Ok(docs) => docs.iter().map(Booking::from_document).collect::<Vec<_>>(),
            Err(e) => {
                // Query failures never reach the caller; the dashboard just
                // shows an empty list.
                tracing::error!(uid = %user.uid, error = %e, "failed to fetch booking requests");
                Vec::new()
            }
        };
        bookings.sort_by_key(|b| Reverse(b.created_at));

        self.commit_pending(generation, PendingRequests { bookings, loading: false })
    }

    /// Fetches the professional's three most recent bookings by scheduled
    /// datetime, plus the pending count over everything fetched. Without a
    /// user the view resets to empty immediately.
    pub async fn refresh_recent(&self, user: Option<&AuthUser>) -> RecentBookings {
        let generation = self.recent_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(user) = user else {
            return self.commit_recent(generation, RecentBookings::empty());
        };

        self.recent.lock().unwrap().loading = true;

        let filters = [Filter::eq("professionalId", user.uid.as_str())];
        let view = match self.store.query(&self.collection, &filters).await {
            Ok(docs) => {
                let mut bookings = docs.iter().map(Booking::from_document).collect::<Vec<_>>();
                // Undated records sort after every dated one.
                bookings.sort_by_key(|b| Reverse(b.scheduled_at));
                let pending_count = bookings.iter().filter(|b| b.status.is_pending()).count();
                bookings.truncate(RECENT_LIMIT);
                RecentBookings {
                    bookings,
                    pending_count,
                    loading: false,
                }
            }
            Err(e) => {
                tracing::error!(uid = %user.uid, error = %e, "failed to fetch recent bookings");
                RecentBookings::empty()
            }
        };

        self.commit_recent(generation, view)
    }

    fn commit_pending(&self, generation: u64, view: PendingRequests) -> PendingRequests {
        if self.pending_generation.load(Ordering::SeqCst) == generation {
            *self.pending.lock().unwrap() = view;
        }
        self.pending_view()
    }

    fn commit_recent(&self, generation: u64, view: RecentBookings) -> RecentBookings {
        if self.recent_generation.load(Ordering::SeqCst) == generation {
            *self.recent.lock().unwrap() = view;
        }
        self.recent_view()
    }
}
