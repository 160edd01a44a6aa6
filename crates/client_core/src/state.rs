use serde_json::Value;
use shared::domain::{CapabilitiesSummary, DescriptionId, DeviceDescription, StatusSnapshot};

/// Everything a repository page renders, owned by the client.
#[derive(Debug, Clone, Default)]
pub struct RepositoryState {
    pub descriptions: Vec<DeviceDescription>,
    /// Set once the initial list fetch succeeded.
    pub descriptions_loaded: bool,
    pub example: Option<Value>,
    /// Editable text submitted by `add_from_input`.
    pub input: String,
    pub status: StatusSnapshot,
    pub loading_status: bool,
    /// Field-level validation errors from the last failed create.
    pub validation_errors: Option<Vec<String>>,
    pub capabilities: Option<CapabilitiesSummary>,
}

impl RepositoryState {
    pub fn position_of(&self, id: &DescriptionId) -> Option<usize> {
        self.descriptions
            .iter()
            .position(|description| description.id() == id)
    }

    pub fn find(&self, id: &DescriptionId) -> Option<&DeviceDescription> {
        self.position_of(id).map(|index| &self.descriptions[index])
    }

    pub(crate) fn remove_first(&mut self, id: &DescriptionId) -> Option<DeviceDescription> {
        self.position_of(id)
            .map(|index| self.descriptions.remove(index))
    }
}

/// Change notifications published after each state mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum RepositoryEvent {
    DescriptionsLoaded { count: usize },
    DescriptionAdded(DeviceDescription),
    DescriptionRemoved(DescriptionId),
    RepositoryCleared,
    ExampleLoaded,
    InputChanged,
    StatusLoading(bool),
    StatusUpdated(StatusSnapshot),
    ValidationErrorsChanged(Option<Vec<String>>),
    CapabilitiesUpdated,
}
