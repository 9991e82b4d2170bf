//! Access to the list of annotatable assets.

use crate::error::{LandmarkerError, Result};

/// Sequential access to assets. Fetching the assets themselves happens
/// elsewhere; the session only moves the cursor and waits for readiness.
pub trait AssetNavigator {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the current asset, `None` for an empty list.
    fn index(&self) -> Option<usize>;

    fn asset_id(&self, index: usize) -> Option<String>;

    /// Move the cursor. Out-of-range indices fail and leave it in place.
    fn go_to(&mut self, index: usize) -> Result<()>;

    fn current_id(&self) -> Option<String> {
        self.index().and_then(|i| self.asset_id(i))
    }

    fn has_next(&self) -> bool {
        self.index().is_some_and(|i| i + 1 < self.len())
    }

    fn has_previous(&self) -> bool {
        self.index().is_some_and(|i| i > 0)
    }
}

/// An in-memory list of asset ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetList {
    ids: Vec<String>,
    index: Option<usize>,
}

impl AssetList {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        let index = (!ids.is_empty()).then_some(0);
        Self { ids, index }
    }
}

impl AssetNavigator for AssetList {
    fn len(&self) -> usize {
        self.ids.len()
    }

    fn index(&self) -> Option<usize> {
        self.index
    }

    fn asset_id(&self, index: usize) -> Option<String> {
        self.ids.get(index).cloned()
    }

    fn go_to(&mut self, index: usize) -> Result<()> {
        if index >= self.ids.len() {
            return Err(LandmarkerError::AssetIndexOutOfRange {
                index,
                count: self.ids.len(),
            });
        }
        self.index = Some(index);
        Ok(())
    }
}
