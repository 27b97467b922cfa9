use crate::domain::model::{FontIdentity, InstallOutcome, TypefaceEntry};
use crate::utils::error::Result;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;

type Outcome<H> = Option<Result<TypefaceEntry<H>>>;

enum Slot<H> {
    Ready(TypefaceEntry<H>),
    Installing(watch::Receiver<Outcome<H>>),
}

enum Claim<H> {
    Ready(TypefaceEntry<H>),
    Wait(watch::Receiver<Outcome<H>>),
    Lead(watch::Sender<Outcome<H>>),
}

/// Grow-only map from font identity to installed typeface.
///
/// Installs go through a per-identity gate: for each identity at most one
/// materializer runs at a time, and every concurrent caller receives the
/// result of that single run. Failed installs release the slot so a later
/// call can try again. Different identities only share the short critical
/// section that guards the map.
pub struct TypefaceRegistry<H> {
    slots: Mutex<HashMap<FontIdentity, Slot<H>>>,
}

impl<H> Default for TypefaceRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> TypefaceRegistry<H> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<FontIdentity, Slot<H>>> {
        // The map is never left half-updated, so a poisoned lock is still usable.
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the installed entry for `family`; never waits on an install
    /// in progress.
    pub fn lookup(&self, family: &str) -> Option<TypefaceEntry<H>> {
        match self.lock().get(family) {
            Some(Slot::Ready(entry)) => Some(entry.clone()),
            _ => None,
        }
    }

    pub fn contains(&self, family: &str) -> bool {
        self.lookup(family).is_some()
    }

    /// Number of installed typefaces.
    pub fn len(&self) -> usize {
        self.lock()
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Installed family names in sorted order.
    pub fn families(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .lock()
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Ready(_)))
            .map(|(identity, _)| identity.as_str().to_string())
            .collect();
        names.sort();
        names
    }

    fn claim(&self, identity: &FontIdentity) -> Claim<H> {
        let mut slots = self.lock();
        match slots.get(identity) {
            Some(Slot::Ready(entry)) => Claim::Ready(entry.clone()),
            Some(Slot::Installing(rx)) => Claim::Wait(rx.clone()),
            None => {
                let (tx, rx) = watch::channel(None);
                slots.insert(identity.clone(), Slot::Installing(rx));
                Claim::Lead(tx)
            }
        }
    }

    /// Returns the entry for `identity`, running `materializer` only if no
    /// entry exists and no other caller is already installing it.
    pub async fn install_or_reuse<F, Fut>(
        &self,
        identity: &FontIdentity,
        materializer: F,
    ) -> Result<(TypefaceEntry<H>, InstallOutcome)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<H>>,
    {
        let tx = loop {
            match self.claim(identity) {
                Claim::Ready(entry) => return Ok((entry, InstallOutcome::Reused)),
                Claim::Lead(tx) => break tx,
                Claim::Wait(mut rx) => {
                    tracing::debug!("Waiting for in-flight install of '{}'", identity);
                    let outcome = rx.wait_for(|o| o.is_some()).await.map(|o| (*o).clone());
                    match outcome {
                        Ok(Some(Ok(entry))) => return Ok((entry, InstallOutcome::Reused)),
                        Ok(Some(Err(err))) => return Err(err),
                        // installer went away without a result; claim again
                        Ok(None) | Err(_) => continue,
                    }
                }
            }
        };

        let mut guard = SlotGuard {
            registry: self,
            identity,
            armed: true,
        };

        tracing::debug!("Materializing typeface for '{}'", identity);
        let result = materializer()
            .await
            .map(|handle| TypefaceEntry::new(identity.clone(), handle));
        guard.armed = false;

        {
            let mut slots = self.lock();
            match &result {
                Ok(entry) => {
                    slots.insert(identity.clone(), Slot::Ready(entry.clone()));
                }
                Err(err) => {
                    tracing::warn!("Install of '{}' failed, releasing slot: {}", identity, err);
                    slots.remove(identity);
                }
            }
        }
        tx.send_replace(Some(result.clone()));

        result.map(|entry| (entry, InstallOutcome::Installed))
    }
}

/// Releases an `Installing` slot if the leading future is dropped before the
/// materializer finishes.
struct SlotGuard<'a, H> {
    registry: &'a TypefaceRegistry<H>,
    identity: &'a FontIdentity,
    armed: bool,
}

impl<H> Drop for SlotGuard<'_, H> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut slots = self.registry.lock();
        if matches!(slots.get(self.identity), Some(Slot::Installing(_))) {
            slots.remove(self.identity);
        }
    }
}
