use std::sync::Arc;

use crate::engine::{MemStore, Persistence};
use crate::stores::{CartStore, CartSummary, FavoritesStore};
use crate::{KeyValueStore, Result, Session, StorefrontConfig};

/// The shopper-side state for one process: both stores over one key-value store,
/// plus the session they are displayed for.
///
/// Construct it once at startup and hand references to the views that need it.
pub struct Storefront {
    pub cart: CartStore,
    pub favorites: FavoritesStore,
    session: Session,
}

impl Storefront {
    /// Rehydrates both stores from `kv`.
    pub fn with_store(kv: Arc<dyn KeyValueStore>, config: &StorefrontConfig) -> Self {
        let cart = CartStore::open(kv.clone(), &config.cart_key);
        let favorites = FavoritesStore::open(kv, &config.favorites_key);
        Self {
            cart,
            favorites,
            session: Session::anonymous(),
        }
    }

    /// A storefront whose stores never touch disk.
    pub fn in_memory(config: &StorefrontConfig) -> Self {
        Self::with_store(Arc::new(MemStore::in_memory()), config)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn set_session(&mut self, session: Session) {
        self.session = session;
    }

    pub fn cart_summary(&self) -> CartSummary {
        self.cart.summary(&self.session)
    }

    /// Whether both stores still persist their mutations.
    pub fn is_durable(&self) -> bool {
        self.cart.is_durable() && self.favorites.is_durable()
    }
}

fn open_persistent(config: &StorefrontConfig) -> Result<Arc<dyn KeyValueStore>> {
    let persistence = Arc::new(Persistence::new(&config.data_dir)?);
    Ok(Arc::new(MemStore::open(persistence)?))
}

/// Opens the storefront state under `config.data_dir`.
///
/// If the directory cannot be created or read, the storefront still opens, backed
/// by a non-persistent store.
///
/// # Examples
///
/// ```no_run
/// use storefront_state::{sdk, StorefrontConfig};
///
/// let storefront = sdk::open(&StorefrontConfig::from_env());
/// println!("{} items in the bag", storefront.cart.total_items());
/// ```
pub fn open(config: &StorefrontConfig) -> Storefront {
    match open_persistent(config) {
        Ok(kv) => Storefront::with_store(kv, config),
        Err(e) => {
            log::warn!(
                "Could not open data dir {:?}: {}. Running without persistence",
                config.data_dir, e
            );
            Storefront::in_memory(config)
        }
    }
}
