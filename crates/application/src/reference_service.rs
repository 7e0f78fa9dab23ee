use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use evaldesk_domain::{ReferenceOptionSet, ReferenceSource};
use tokio::sync::RwLock;
use tracing::warn;

use crate::ReferenceDataGateway;

/// Load state of one reference option set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionSetState {
    /// The fetch has been issued but has not produced values.
    ///
    /// A failed fetch stays here: a source that never loaded never becomes
    /// ready, which keeps submission disabled.
    Loading,
    /// The backend confirmed this option list.
    Loaded(ReferenceOptionSet),
}

/// Per-dialog-session cache of reference option sets.
///
/// Created fresh on every dialog open and discarded on close; option lists
/// may change server-side between opens, so nothing is reused.
pub struct ReferenceDataCache {
    gateway: Arc<dyn ReferenceDataGateway>,
    states: RwLock<HashMap<ReferenceSource, OptionSetState>>,
}

impl ReferenceDataCache {
    /// Creates an empty cache over the option gateway.
    #[must_use]
    pub fn new(gateway: Arc<dyn ReferenceDataGateway>) -> Self {
        Self {
            gateway,
            states: RwLock::new(HashMap::new()),
        }
    }

    /// Fetches every listed source.
    ///
    /// A failed fetch leaves that source in [`OptionSetState::Loading`] and
    /// logs the failure; it never propagates, the dialog opens regardless
    /// and submission stays blocked until a reopen succeeds.
    pub async fn load_all(&self, sources: &[ReferenceSource]) {
        {
            let mut states = self.states.write().await;
            for source in sources {
                states.insert(*source, OptionSetState::Loading);
            }
        }

        for source in sources {
            match self.gateway.fetch_options(*source).await {
                Ok(options) => {
                    self.states
                        .write()
                        .await
                        .insert(*source, OptionSetState::Loaded(options));
                }
                Err(error) => {
                    warn!(
                        source = source.as_str(),
                        error = %error,
                        "reference option fetch failed"
                    );
                }
            }
        }
    }

    /// Returns whether every listed source is loaded with at least one value.
    pub async fn all_ready(&self, sources: &[ReferenceSource]) -> bool {
        let states = self.states.read().await;
        sources.iter().all(|source| {
            matches!(
                states.get(source),
                Some(OptionSetState::Loaded(options)) if !options.is_empty()
            )
        })
    }

    /// Returns the loaded values for one source.
    pub async fn options(&self, source: ReferenceSource) -> Option<Vec<String>> {
        match self.states.read().await.get(&source) {
            Some(OptionSetState::Loaded(options)) => Some(options.values().to_vec()),
            _ => None,
        }
    }

    /// Returns every loaded option set, keyed by source.
    pub async fn snapshot(&self) -> BTreeMap<ReferenceSource, ReferenceOptionSet> {
        self.states
            .read()
            .await
            .iter()
            .filter_map(|(source, state)| match state {
                OptionSetState::Loaded(options) => Some((*source, options.clone())),
                OptionSetState::Loading => None,
            })
            .collect()
    }
}
