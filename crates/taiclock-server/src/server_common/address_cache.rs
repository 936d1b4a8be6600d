// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

use std::net::IpAddr;
use std::sync::Arc;

use dashmap::DashMap;

/// Default number of addresses kept before the cache is cleared.
pub const DEFAULT_ADDRESS_CACHE_CAPACITY: usize = 65_536;

/// Interned source-address strings used as rate-limit keys.
///
/// Purely an optimization: formatting an address always gives the same
/// string. The cache is cleared once it reaches capacity, so a flood of
/// distinct sources cannot grow it without bound.
#[derive(Debug)]
pub struct AddressCache {
    keys: DashMap<IpAddr, Arc<str>>,
    capacity: usize,
}

impl Default for AddressCache {
    fn default() -> Self {
        AddressCache::new(DEFAULT_ADDRESS_CACHE_CAPACITY)
    }
}

impl AddressCache {
    /// Create a cache holding at most `capacity` addresses.
    pub fn new(capacity: usize) -> Self {
        AddressCache {
            keys: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Return the string form of `addr`, formatting it on first sight.
    pub fn key_for(&self, addr: IpAddr) -> Arc<str> {
        if let Some(key) = self.keys.get(&addr) {
            return Arc::clone(key.value());
        }
        if self.keys.len() >= self.capacity {
            self.keys.clear();
        }
        let key = self
            .keys
            .entry(addr)
            .or_insert_with(|| Arc::from(addr.to_string()));
        Arc::clone(key.value())
    }

    /// Number of cached addresses.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
