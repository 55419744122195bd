//! Tables mounted on the current page, keyed by container selector.

use std::sync::Arc;

use dashmap::DashMap;

use crate::config::TableConfig;
use crate::error::TableError;
use crate::host::Host;
use crate::table::{AjaxTable, LoadOutcome, RowBinder, TableEvent};

/// Owns the tables of one page load. Dropping the registry (or calling
/// [`TableRegistry::clear`]) on unload releases them.
pub struct TableRegistry {
    host: Host,
    tables: DashMap<String, Arc<AjaxTable>>,
}

impl TableRegistry {
    pub fn new(host: Host) -> Self {
        Self {
            host,
            tables: DashMap::new(),
        }
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    /// Initializes and registers a table. A container that is not on this
    /// page is skipped quietly; other setup errors are logged.
    pub fn mount(
        &self,
        config: TableConfig,
        row_binder: Option<RowBinder>,
    ) -> Option<Arc<AjaxTable>> {
        let container = config.container.clone();
        match AjaxTable::initialize(config, &self.host, row_binder) {
            Ok(table) => {
                let table = Arc::new(table);
                if self
                    .tables
                    .insert(container.clone(), Arc::clone(&table))
                    .is_some()
                {
                    tracing::warn!("Replaced existing table bound to {}", container);
                }
                Some(table)
            }
            Err(TableError::ContainerNotFound(_)) => None,
            Err(e) => {
                tracing::warn!("Could not mount table {}: {}", container, e);
                None
            }
        }
    }

    pub fn get(&self, container: &str) -> Option<Arc<AjaxTable>> {
        self.tables.get(container).map(|entry| Arc::clone(entry.value()))
    }

    pub fn unmount(&self, container: &str) -> Option<Arc<AjaxTable>> {
        self.tables.remove(container).map(|(_, table)| table)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn clear(&self) {
        self.tables.clear();
    }

    /// Replays the current location into every mounted table after
    /// back/forward navigation.
    pub async fn dispatch_popstate(&self) -> Vec<(String, LoadOutcome)> {
        let tables: Vec<(String, Arc<AjaxTable>)> = self
            .tables
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();
        let mut outcomes = Vec::with_capacity(tables.len());
        for (container, table) in tables {
            let outcome = table.handle(TableEvent::PopState).await;
            outcomes.push((container, outcome));
        }
        outcomes
    }
}
