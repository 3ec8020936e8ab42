//! The data-access facade.
//!
//! `Db` pairs a `DbClient` with a `Transport` and exposes one method per
//! store operation. Each method issues exactly one request, except
//! `update_user_by_customer_id`, which looks the user up and then patches
//! it, strictly in that order.

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::DbClient;
use crate::config::DbConfig;
use crate::error::{DbError, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Attributes, Item, User};

/// Source of `createdAt` timestamps, in milliseconds since the Unix epoch.
pub trait Clock {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

pub struct Db<T = UreqTransport, C = SystemClock> {
    client: DbClient,
    transport: T,
    clock: C,
}

impl Db {
    /// Facade over the blocking `ureq` transport.
    pub fn new(config: &DbConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> Db<T> {
    pub fn with_transport(config: &DbConfig, transport: T) -> Self {
        Self {
            client: DbClient::new(&config.base_url),
            transport,
            clock: SystemClock,
        }
    }
}

impl<T: Transport, C: Clock> Db<T, C> {
    pub fn with_clock<K: Clock>(self, clock: K) -> Db<T, K> {
        Db {
            client: self.client,
            transport: self.transport,
            clock,
        }
    }

    // --- users ---

    pub fn get_user(&self, uid: &str) -> Result<Option<User>> {
        let response = self.send(self.client.build_get_user(uid))?;
        self.client.parse_get_user(response)
    }

    pub fn get_user_by_customer_id(&self, customer_id: &str) -> Result<Option<User>> {
        let response = self.send(self.client.build_get_user_by_customer_id(customer_id))?;
        self.client.parse_get_user_by_customer_id(response)
    }

    pub fn create_user(&self, uid: &str, attributes: &Attributes) -> Result<User> {
        let response = self.send(self.client.build_create_user(uid, attributes)?)?;
        self.client.parse_create_user(response)
    }

    pub fn update_user(&self, uid: &str, attributes: &Attributes) -> Result<Option<User>> {
        let response = self.send(self.client.build_update_user(uid, attributes)?)?;
        self.client.parse_update_user(response)
    }

    /// Fails with `DbError::CustomerNotFound` when no user carries
    /// `customer_id`; the patch request is never sent in that case.
    pub fn update_user_by_customer_id(
        &self,
        customer_id: &str,
        attributes: &Attributes,
    ) -> Result<Option<User>> {
        let user = self
            .get_user_by_customer_id(customer_id)?
            .ok_or_else(|| DbError::CustomerNotFound(customer_id.to_string()))?;
        self.update_user(&user.id, attributes)
    }

    // --- items ---

    pub fn get_item(&self, id: &str) -> Result<Option<Item>> {
        let response = self.send(self.client.build_get_item(id))?;
        self.client.parse_get_item(response)
    }

    /// Newest first; ordering is done by the store.
    pub fn get_items_by_owner(&self, owner: &str) -> Result<Vec<Item>> {
        let response = self.send(self.client.build_get_items_by_owner(owner))?;
        self.client.parse_get_items_by_owner(response)
    }

    pub fn create_item(&self, attributes: &Attributes) -> Result<Item> {
        let created_at = self.clock.now_millis();
        let response = self.send(self.client.build_create_item(attributes, created_at)?)?;
        self.client.parse_create_item(response)
    }

    pub fn update_item(&self, id: &str, attributes: &Attributes) -> Result<Option<Item>> {
        let response = self.send(self.client.build_update_item(id, attributes)?)?;
        self.client.parse_update_item(response)
    }

    pub fn delete_item(&self, id: &str) -> Result<Option<Value>> {
        let response = self.send(self.client.build_delete_item(id))?;
        self.client.parse_delete_item(response)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = request.method.as_str();
        let url = request.url.clone();
        debug!(method, %url, "store request");

        let response = self.transport.execute(request)?;
        if response.is_success() || response.status == 404 {
            debug!(method, %url, status = response.status, "store response");
        } else {
            warn!(method, %url, status = response.status, "store request failed");
        }
        Ok(response)
    }
}
