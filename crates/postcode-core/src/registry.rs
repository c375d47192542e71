//! Field groups attached to a screen, keyed by host id.

use crate::controller::FieldGroupController;
use crate::error::Result;
use crate::options::FieldGroupOptions;

/// Owns every attached controller. Attachment order is kept so hosts can be
/// laid out and focused in the order they were attached.
#[derive(Default)]
pub struct FieldGroupRegistry {
    groups: Vec<FieldGroupController>,
}

impl FieldGroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a controller to `host`. A host that already has one keeps it
    /// and `options` are ignored.
    pub fn attach(
        &mut self,
        host: &str,
        options: FieldGroupOptions,
    ) -> Result<&mut FieldGroupController> {
        let index = match self.position(host) {
            Some(index) => index,
            None => {
                self.groups.push(FieldGroupController::attach(host, options)?);
                self.groups.len() - 1
            }
        };
        Ok(&mut self.groups[index])
    }

    /// Detach and tear down the controller of `host`.
    pub fn detach(&mut self, host: &str) -> bool {
        match self.position(host) {
            Some(index) => {
                self.groups.remove(index).teardown();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, host: &str) -> Option<&FieldGroupController> {
        self.groups.iter().find(|g| g.host() == host)
    }

    pub fn get_mut(&mut self, host: &str) -> Option<&mut FieldGroupController> {
        self.groups.iter_mut().find(|g| g.host() == host)
    }

    pub fn by_index(&self, index: usize) -> Option<&FieldGroupController> {
        self.groups.get(index)
    }

    pub fn by_index_mut(&mut self, index: usize) -> Option<&mut FieldGroupController> {
        self.groups.get_mut(index)
    }

    pub fn position(&self, host: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.host() == host)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldGroupController> {
        self.groups.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FieldGroupController> {
        self.groups.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
