use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::Result;
use autoscale_cuckoo_filter::CuckooFilter;
use once_cell::sync::Lazy;
use tracing::info;

use crate::store::Store;

/// Expected capacity and false-positive rate.
const FILTER_CAPACITY: usize = 10_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static USERNAME_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

/// Set once every stored name has been loaded. Until then a miss proves nothing.
static WARMED: AtomicBool = AtomicBool::new(false);

fn read() -> RwLockReadGuard<'static, CuckooFilter<String>> {
    USERNAME_FILTER.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write() -> RwLockWriteGuard<'static, CuckooFilter<String>> {
    USERNAME_FILTER.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Usernames are compared trimmed and lower-cased everywhere.
#[inline]
pub fn normalize(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Check if a username might be taken (false positives possible)
pub fn might_exist(username: &str) -> bool {
    read().contains(&normalize(username))
}

pub fn is_warm() -> bool {
    WARMED.load(Ordering::Acquire)
}

pub fn insert(username: &str) {
    write().add(&normalize(username));
}

pub fn remove(username: &str) {
    write().remove(&normalize(username));
}

/// Loads every account and pending request name into the filter.
pub async fn warmup_username_filter(store: Arc<dyn Store>, batch_size: usize) -> Result<()> {
    let (users, pending) = futures::try_join!(store.list_users(), store.list_pending_users())?;

    let names: Vec<String> = users
        .iter()
        .map(|u| normalize(&u.username))
        .chain(pending.iter().map(|p| normalize(&p.username)))
        .collect();

    for chunk in names.chunks(batch_size.max(1)) {
        insert_batch(chunk);
    }

    WARMED.store(true, Ordering::Release);
    info!(total = names.len(), "Username filter warmup complete");
    Ok(())
}

/// Insert a batch of normalized usernames
fn insert_batch(usernames: &[String]) {
    let mut filter = write();
    for username in usernames {
        filter.add(username);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_ignore_case_and_padding() {
        insert("  Filter.Probe.One ");
        assert!(might_exist("filter.probe.one"));
        remove("FILTER.PROBE.ONE");
        assert!(!might_exist("filter.probe.one"));
    }
}
