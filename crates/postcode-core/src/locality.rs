use serde::{Deserialize, Serialize};

/// A single locality record as returned by the postcode API.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Locality {
    /// Locality / suburb name, e.g. "RICHMOND".
    pub locality: String,

    /// State or territory abbreviation, e.g. "VIC".
    pub state: String,

    /// Four digit postcode, kept as text to preserve leading zeros ("0870").
    pub postcode: String,
}

impl Locality {
    pub fn new(
        locality: impl Into<String>,
        state: impl Into<String>,
        postcode: impl Into<String>,
    ) -> Self {
        Self {
            locality: locality.into(),
            state: state.into(),
            postcode: postcode.into(),
        }
    }
}

impl std::fmt::Display for Locality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.locality, self.state, self.postcode)
    }
}

/// The values of the three linked fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValues {
    pub locality: String,
    pub state: String,
    pub postcode: String,
}

impl FieldValues {
    pub fn is_empty(&self) -> bool {
        self.locality.is_empty() && self.state.is_empty() && self.postcode.is_empty()
    }
}

impl From<&Locality> for FieldValues {
    fn from(record: &Locality) -> Self {
        Self {
            locality: record.locality.clone(),
            state: record.state.clone(),
            postcode: record.postcode.clone(),
        }
    }
}

/// The locality / state / postcode triple owned by a controller.
///
/// `live` is what the user currently sees. `committed` is the last triple
/// confirmed by selecting a result row; it is only ever replaced whole, so
/// it can never hold a locality from one record and a postcode from another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldGroup {
    live: FieldValues,
    committed: Option<FieldValues>,
}

impl FieldGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> &FieldValues {
        &self.live
    }

    pub fn committed(&self) -> Option<&FieldValues> {
        self.committed.as_ref()
    }

    /// Replace the live locality text while the user is typing.
    pub(crate) fn edit_locality(&mut self, text: &str) {
        self.live.locality.clear();
        self.live.locality.push_str(text);
    }

    /// Set live and committed values together from one record.
    pub(crate) fn commit(&mut self, record: &Locality) {
        let values = FieldValues::from(record);
        self.live = values.clone();
        self.committed = Some(values);
    }

    /// Put the live values back to the last committed triple, or empty.
    pub(crate) fn revert(&mut self) {
        self.live = self.committed.clone().unwrap_or_default();
    }

    /// Clear live and committed values.
    pub(crate) fn reset(&mut self) {
        self.live = FieldValues::default();
        self.committed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_sets_live_and_committed_together() {
        let mut group = FieldGroup::new();
        group.commit(&Locality::new("RICHMOND", "VIC", "3121"));

        assert_eq!(group.live().postcode, "3121");
        assert_eq!(group.committed(), Some(group.live()));
    }

    #[test]
    fn revert_without_commit_empties_live_values() {
        let mut group = FieldGroup::new();
        group.edit_locality("Ric");
        group.revert();

        assert!(group.live().is_empty());
        assert!(group.committed().is_none());
    }

    #[test]
    fn revert_restores_whole_committed_triple() {
        let mut group = FieldGroup::new();
        group.commit(&Locality::new("PARKVILLE", "VIC", "3052"));
        group.edit_locality("Spri");
        group.revert();

        assert_eq!(group.live().locality, "PARKVILLE");
        assert_eq!(group.live().state, "VIC");
    }
}
