use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::bank::{Bank, BankError, BankSource, SourceVersion};

struct CachedBank {
    version: SourceVersion,
    bank: Arc<Bank>,
}

/// Memoizes bank loads per source identity, recomputing when the source version changes.
#[derive(Default)]
pub struct BankCache {
    banks: RwLock<HashMap<String, CachedBank>>,
}

impl BankCache {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn load(&self, source: &dyn BankSource) -> Result<Arc<Bank>, BankError> {
        let identity = source.identity();
        let version = match source.version()? {
            Some(version) => version,
            None => return self.missing(source),
        };

        {
            let map = self.banks.read();
            if let Some(cached) = map.get(&identity) {
                if cached.version == version {
                    debug!("Bank cache hit for {}", identity);
                    return Ok(Arc::clone(&cached.bank));
                }
            }
        }

        let bytes = match source.read()? {
            Some(bytes) => bytes,
            None => return self.missing(source),
        };
        let bank = Arc::new(Bank::parse(&bytes, source.format(), &identity)?);
        info!("Loaded {} questions from {}", bank.len(), identity);

        let mut map = self.banks.write();
        map.insert(
            identity,
            CachedBank {
                version,
                bank: Arc::clone(&bank),
            },
        );
        Ok(bank)
    }

    /// Loads every source and merges them into one deduplicated bank.
    pub fn load_all(&self, sources: &[Box<dyn BankSource>]) -> Result<Bank, BankError> {
        let banks = sources
            .iter()
            .map(|source| self.load(source.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Bank::merge(banks.iter().map(|bank| bank.as_ref())))
    }

    pub fn invalidate(&self, identity: &str) {
        self.banks.write().remove(identity);
    }

    fn missing(&self, source: &dyn BankSource) -> Result<Arc<Bank>, BankError> {
        let identity = source.identity();
        self.invalidate(&identity);
        if source.is_optional() {
            debug!("Optional bank {} is missing, using an empty bank", identity);
            Ok(Arc::new(Bank::default()))
        } else {
            Err(BankError::MissingSource { name: identity })
        }
    }
}
