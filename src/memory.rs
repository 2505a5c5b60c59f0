//! In-process store used by unit and router tests.
//!
//! Mirrors the constraints the Postgres schema enforces: unique usernames,
//! the booking owner foreign key with cascading deletes, and the booking
//! time-order check.

use std::{collections::BTreeMap, sync::Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    bookings::{
        dto::BookingPatch,
        repo::{BookingStore, BOOKING_COLUMNS},
        repo_types::{Booking, NewBooking},
        services::{time_order_violation, unknown_owner},
    },
    error::AppError,
    patch::ensure_not_empty,
    users::{
        dto::UserPatch,
        repo::{UserStore, USER_COLUMNS},
        repo_types::{NewUser, User},
    },
};

#[derive(Default)]
pub(crate) struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    last_user_id: i64,
    last_booking_id: i64,
    users: BTreeMap<i64, User>,
    bookings: BTreeMap<i64, Booking>,
}

impl Inner {
    fn username_taken(&self, username: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.username == username && Some(u.id) != except)
    }

    fn check_booking(&self, booking: &Booking) -> Result<(), AppError> {
        if !self.users.contains_key(&booking.user_id) {
            return Err(AppError::Validation(unknown_owner()));
        }
        if booking.start_time >= booking.end_time {
            return Err(AppError::Validation(time_order_violation()));
        }
        Ok(())
    }
}

impl MemoryStore {
    pub(crate) fn list_users(&self) -> Vec<User> {
        self.inner.lock().unwrap().users.values().cloned().collect()
    }

    pub(crate) fn list_bookings(&self) -> Vec<Booking> {
        self.inner.lock().unwrap().bookings.values().cloned().collect()
    }
}

fn username_conflict() -> AppError {
    AppError::Conflict("username already taken".to_string())
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: &NewUser) -> Result<i64, AppError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.username_taken(&user.username, None) {
            return Err(username_conflict());
        }
        inner.last_user_id += 1;
        let id = inner.last_user_id;
        inner.users.insert(
            id,
            User {
                id,
                username: user.username.clone(),
                password_hash: user.password_hash.clone(),
                created_at: user.created_at,
                updated_at: user.updated_at,
            },
        );
        Ok(id)
    }

    async fn find(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.inner.lock().unwrap().users.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(self.list_users())
    }

    async fn update(&self, id: i64, patch: &UserPatch) -> Result<u64, AppError> {
        ensure_not_empty(patch, &USER_COLUMNS)?;
        let mut inner = self.inner.lock().unwrap();
        if !inner.users.contains_key(&id) {
            return Ok(0);
        }
        if let Some(username) = &patch.username {
            if inner.username_taken(username, Some(id)) {
                return Err(username_conflict());
            }
        }
        let Some(user) = inner.users.get_mut(&id) else {
            return Ok(0);
        };
        if let Some(username) = &patch.username {
            user.username = username.clone();
        }
        if let Some(hash) = &patch.password {
            user.password_hash = hash.clone();
        }
        user.updated_at = OffsetDateTime::now_utc();
        Ok(1)
    }

    async fn delete(&self, id: i64) -> Result<u64, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(_) = inner.users.remove(&id) else {
            return Ok(0);
        };
        inner.bookings.retain(|_, b| b.user_id != id);
        Ok(1)
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn insert(&self, booking: &NewBooking) -> Result<i64, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let mut row = Booking {
            id: 0,
            user_id: booking.user_id,
            start_time: booking.start_time,
            end_time: booking.end_time,
            note: booking.note.clone(),
        };
        inner.check_booking(&row)?;
        inner.last_booking_id += 1;
        row.id = inner.last_booking_id;
        inner.bookings.insert(row.id, row.clone());
        Ok(row.id)
    }

    async fn find(&self, id: i64) -> Result<Option<Booking>, AppError> {
        Ok(self.inner.lock().unwrap().bookings.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Booking>, AppError> {
        Ok(self.list_bookings())
    }

    async fn update(&self, id: i64, patch: &BookingPatch) -> Result<u64, AppError> {
        ensure_not_empty(patch, &BOOKING_COLUMNS)?;
        let mut inner = self.inner.lock().unwrap();
        let Some(mut row) = inner.bookings.get(&id).cloned() else {
            return Ok(0);
        };
        if let Some(user_id) = patch.user_id {
            row.user_id = user_id;
        }
        if let Some(start) = patch.start_time {
            row.start_time = start;
        }
        if let Some(end) = patch.end_time {
            row.end_time = end;
        }
        if let Some(note) = &patch.note {
            row.note = note.clone();
        }
        inner.check_booking(&row)?;
        inner.bookings.insert(id, row);
        Ok(1)
    }

    async fn delete(&self, id: i64) -> Result<u64, AppError> {
        let removed = self.inner.lock().unwrap().bookings.remove(&id);
        Ok(u64::from(removed.is_some()))
    }
}
