//! Static adapter factory.

use std::sync::Arc;

use kstore_adapter::{Adapter, AdapterConfig, CookieAdapter, StorageAdapter};
use tracing::debug;

use crate::error::{SdkError, SdkResult};
use crate::kind::AdapterKind;
use crate::platform::Platform;

/// Build the adapter of `kind` over the matching store of `platform`.
///
/// Fails with `NotSupported` when the platform lacks that store or the
/// store reports itself unavailable.
pub fn create_adapter(
    kind: AdapterKind,
    platform: &Platform,
    config: AdapterConfig,
) -> SdkResult<Box<dyn Adapter>> {
    let adapter: Box<dyn Adapter> = match kind {
        AdapterKind::LocalStore => {
            Box::new(StorageAdapter::with_config(require(platform.local(), kind)?, config)?)
        }
        AdapterKind::SessionStore => {
            Box::new(StorageAdapter::with_config(require(platform.session(), kind)?, config)?)
        }
        AdapterKind::Cookie => {
            Box::new(CookieAdapter::with_config(require(platform.cookies(), kind)?, config)?)
        }
    };
    debug!(%kind, prefix = adapter.key_prefix(), events = adapter.supports_events(), "adapter selected");
    Ok(adapter)
}

fn require<T: ?Sized>(driver: Option<Arc<T>>, kind: AdapterKind) -> SdkResult<Arc<T>> {
    driver.ok_or_else(|| SdkError::not_supported(format!("{kind} on this platform")))
}
