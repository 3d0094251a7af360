use crate::clock::LocalClock;
use crate::storage::JsonFileStore;
use crate::store::CounterStore;
use std::sync::Arc;

pub type AppStore = CounterStore<JsonFileStore, LocalClock>;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<AppStore>,
}

impl AppState {
    pub fn new(store: AppStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}
