//! Session registry: maps charger identifiers to their live connection

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{info, warn};
use uuid::Uuid;

use super::connection::Connection;

/// Thread-safe registry of live charger connections, one per identifier.
///
/// Registering an identifier that is already present replaces the old
/// handle without closing its socket ("last connection wins").
pub struct SessionRegistry {
    sessions: DashMap<String, Connection>,
}

/// Shared, reference-counted session registry
pub type SharedSessionRegistry = Arc<SessionRegistry>;

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Wrap in `Arc` for shared ownership
    pub fn shared() -> SharedSessionRegistry {
        Arc::new(Self::new())
    }

    /// Install `connection`, returning the handle it replaced, if any.
    pub fn register(&self, connection: Connection) -> Option<Connection> {
        self.register_with(connection, || ()).0
    }

    /// Install `connection` and run `f` before the entry lock is released.
    ///
    /// A close of the same identifier cannot interleave with `f`.
    pub fn register_with<T>(
        &self,
        connection: Connection,
        f: impl FnOnce() -> T,
    ) -> (Option<Connection>, T) {
        let charge_point_id = connection.charge_point_id.clone();
        let connection_id = connection.connection_id;
        let (replaced, output) = match self.sessions.entry(charge_point_id.clone()) {
            Entry::Occupied(mut entry) => {
                let previous = entry.insert(connection);
                (Some(previous), f())
            }
            Entry::Vacant(entry) => {
                let _guard = entry.insert(connection);
                (None, f())
            }
        };

        match &replaced {
            Some(previous) => warn!(
                charge_point_id = charge_point_id.as_str(),
                %connection_id,
                previous_connection_id = %previous.connection_id,
                "Charge point reconnected, replacing previous session"
            ),
            None => info!(
                charge_point_id = charge_point_id.as_str(),
                %connection_id,
                "Registered charge point session"
            ),
        }

        (replaced, output)
    }

    /// Remove the session for `charge_point_id` only if it is still the one
    /// identified by `connection_id`. Returns whether an entry was removed.
    pub fn unregister(&self, charge_point_id: &str, connection_id: Uuid) -> bool {
        self.unregister_with(charge_point_id, connection_id, || ()).is_some()
    }

    /// Like [`unregister`](Self::unregister), running `f` under the entry
    /// lock when the entry is removed. Returns `f`'s output, or `None` for a
    /// stale or unknown connection.
    pub fn unregister_with<T>(
        &self,
        charge_point_id: &str,
        connection_id: Uuid,
        f: impl FnOnce() -> T,
    ) -> Option<T> {
        match self.sessions.entry(charge_point_id.to_string()) {
            Entry::Occupied(entry) if entry.get().connection_id == connection_id => {
                let output = f();
                entry.remove();
                info!(charge_point_id, %connection_id, "Unregistered charge point session");
                Some(output)
            }
            Entry::Occupied(_) => {
                info!(
                    charge_point_id,
                    %connection_id,
                    "Stale connection closed, newer session kept"
                );
                None
            }
            Entry::Vacant(_) => None,
        }
    }

    pub fn lookup(&self, charge_point_id: &str) -> Option<Connection> {
        self.sessions.get(charge_point_id).map(|conn| conn.clone())
    }

    /// Queue a message on the current connection for `charge_point_id`
    pub fn send_to(&self, charge_point_id: &str, message: String) -> Result<(), String> {
        match self.lookup(charge_point_id) {
            Some(conn) if conn.is_open() => conn.send(message),
            Some(_) => Err(format!("Charge point {} connection is closed", charge_point_id)),
            None => Err(format!("Charge point {} not connected", charge_point_id)),
        }
    }

    pub fn is_connected(&self, charge_point_id: &str) -> bool {
        self.sessions
            .get(charge_point_id)
            .map_or(false, |conn| conn.is_open())
    }

    pub fn connected_ids(&self) -> Vec<String> {
        self.sessions.iter().map(|r| r.key().clone()).collect()
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    /// Drop every handle. Writer tasks end once their sender is gone.
    pub fn clear(&self) -> usize {
        let count = self.sessions.len();
        self.sessions.clear();
        count
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
