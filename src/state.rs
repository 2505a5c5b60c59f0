use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    bookings::repo::BookingStore,
    config::AppConfig,
    db::PgStore,
    password::CredentialHasher,
    users::repo::UserStore,
};

#[derive(Clone)]
pub struct AppState {
    pub hasher: Arc<CredentialHasher>,
    pub users: Arc<dyn UserStore>,
    pub bookings: Arc<dyn BookingStore>,
}

impl AppState {
    pub fn init(config: &AppConfig, db: PgPool) -> anyhow::Result<Self> {
        let hasher = Arc::new(CredentialHasher::new(&config.hashing)?);
        let store = Arc::new(PgStore::new(db));
        Ok(Self::from_parts(hasher, store.clone(), store))
    }

    pub fn from_parts(
        hasher: Arc<CredentialHasher>,
        users: Arc<dyn UserStore>,
        bookings: Arc<dyn BookingStore>,
    ) -> Self {
        Self {
            hasher,
            users,
            bookings,
        }
    }
}

#[cfg(test)]
impl AppState {
    pub(crate) fn fake() -> Self {
        Self::fake_with_memory().0
    }

    /// Also hands back the store so tests can look at stored rows directly.
    pub(crate) fn fake_with_memory() -> (Self, Arc<crate::memory::MemoryStore>) {
        let store = Arc::new(crate::memory::MemoryStore::default());
        let hasher = Arc::new(crate::password::test_hasher());
        (Self::from_parts(hasher, store.clone(), store.clone()), store)
    }
}
