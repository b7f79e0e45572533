//! Client identity resolution.

use little_chat_model::ClientId;

use crate::Error;
use crate::storage::KeyValueStore;

/// The storage key of the client identifier.
pub const CLIENT_ID_KEY: &str = "clientId";

/// The resolved client identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Identity {
    /// The identifier in use.
    pub client_id: ClientId,
    /// Whether the identifier was generated just now. A new client has no
    /// stored conversations yet.
    pub is_new: bool,
}

/// Adopts the stored client identifier, or generates and persists a new
/// one if none exists.
pub fn resolve(store: &dyn KeyValueStore) -> Result<Identity, Error> {
    let stored = store
        .get(CLIENT_ID_KEY)
        .map_err(|err| Error::storage(err, "failed to read client id"))?;
    if let Some(id) = stored.filter(|id| !id.is_empty()) {
        debug!("adopted stored client id {id}");
        return Ok(Identity {
            client_id: ClientId::new(id),
            is_new: false,
        });
    }

    let client_id = ClientId::generate();
    store
        .set(CLIENT_ID_KEY, client_id.as_str())
        .map_err(|err| Error::storage(err, "failed to persist client id"))?;
    info!("generated new client id {client_id}");

    Ok(Identity {
        client_id,
        is_new: true,
    })
}
