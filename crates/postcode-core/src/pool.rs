//! In-memory pool of Australian postcodes with the locality search rules of
//! the postcode API.

use std::path::Path;

use tracing::info;

use crate::error::{PostcodeError, Result};
use crate::locality::Locality;

/// Minimum number of characters a locality search needs.
pub const MIN_LOCALITY_LENGTH: usize = 3;

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;

/// Why a locality search produced no localities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRejection {
    /// API status code (400 or 404).
    pub code: u16,
    /// Human-readable reason.
    pub text: String,
}

/// Every known locality, sorted by locality, state and postcode.
#[derive(Debug, Clone, Default)]
pub struct PostcodePool {
    postcodes: Vec<Locality>,
}

impl PostcodePool {
    pub fn from_records(mut postcodes: Vec<Locality>) -> Self {
        postcodes.sort();
        postcodes.dedup();
        Self { postcodes }
    }

    /// Load a JSON array of `{locality, state, postcode}` records.
    pub fn load_json(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PostcodeError::Pool(format!("Failed to read {}: {e}", path.display()))
        })?;
        let records: Vec<Locality> = serde_json::from_str(&contents)?;
        let pool = Self::from_records(records);
        info!("Loaded {} postcodes into pool", pool.len());
        Ok(pool)
    }

    pub fn len(&self) -> usize {
        self.postcodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postcodes.is_empty()
    }

    /// Case-insensitive partial match on the locality name.
    pub fn search(&self, locality: &str) -> Vec<Locality> {
        let needle = locality.to_uppercase();
        self.postcodes
            .iter()
            .filter(|pc| pc.locality.to_uppercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Search with the API's validation rules applied first.
    pub fn search_by_locality(
        &self,
        locality: &str,
    ) -> std::result::Result<Vec<Locality>, SearchRejection> {
        if locality.chars().count() < MIN_LOCALITY_LENGTH {
            return Err(SearchRejection {
                code: STATUS_BAD_REQUEST,
                text: format!(
                    "Must have at least {MIN_LOCALITY_LENGTH} characters: '{locality}'"
                ),
            });
        }

        if !locality.chars().all(is_locality_char) {
            return Err(SearchRejection {
                code: STATUS_BAD_REQUEST,
                text: format!(
                    "'{locality}' is invalid. Accept only letters, space, hyphen and \
                     single quote characters."
                ),
            });
        }

        let localities = self.search(locality);
        if localities.is_empty() {
            return Err(SearchRejection {
                code: STATUS_NOT_FOUND,
                text: format!("No localities matched '{locality}'"),
            });
        }
        Ok(localities)
    }
}

fn is_locality_char(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, ' ' | ',' | '-' | '\'')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> PostcodePool {
        PostcodePool::from_records(vec![
            Locality::new("TAMBAR SPRINGS", "NSW", "2381"),
            Locality::new("SPRINGVALE", "VIC", "3171"),
            Locality::new("ALICE SPRINGS", "NT", "0870"),
            Locality::new("SPRINGLANDS", "QLD", "4804"),
            Locality::new("O'CONNOR", "ACT", "2602"),
            Locality::new("SPRINGVALE", "VIC", "3171"),
        ])
    }

    #[test]
    fn records_are_sorted_and_deduplicated() {
        let pool = pool();
        assert_eq!(pool.len(), 5);
        let all = pool.search("");
        assert_eq!(all[0].locality, "ALICE SPRINGS");
        assert_eq!(all[4].locality, "TAMBAR SPRINGS");
    }

    #[test]
    fn search_is_a_case_insensitive_partial_match() {
        let found = pool().search("springva");
        assert_eq!(found, vec![Locality::new("SPRINGVALE", "VIC", "3171")]);

        let spring = pool().search("Spring");
        assert_eq!(spring.len(), 4);
    }

    #[test]
    fn short_queries_are_rejected() {
        let err = pool().search_by_locality("Sp").unwrap_err();
        assert_eq!(err.code, STATUS_BAD_REQUEST);
        assert_eq!(err.text, "Must have at least 3 characters: 'Sp'");
    }

    #[test]
    fn invalid_characters_are_rejected() {
        let err = pool().search_by_locality("%^& Spring").unwrap_err();
        assert_eq!(err.code, STATUS_BAD_REQUEST);
        assert!(err.text.starts_with("'%^& Spring' is invalid."));

        assert!(pool().search_by_locality("o'con").is_ok());
    }

    #[test]
    fn no_match_is_not_found() {
        let err = pool().search_by_locality("xyz").unwrap_err();
        assert_eq!(err.code, STATUS_NOT_FOUND);
        assert_eq!(err.text, "No localities matched 'xyz'");
    }

    #[test]
    fn load_json_reads_an_array_of_records() {
        let path = std::env::temp_dir().join(format!(
            "aust-postcode-pool-{}.json",
            uuid::Uuid::new_v4().simple()
        ));
        std::fs::write(
            &path,
            r#"[{"locality":"RICHMOND","state":"VIC","postcode":"3121"},
                {"locality":"RICHMOND","state":"NSW","postcode":"2753"}]"#,
        )
        .unwrap();

        let pool = PostcodePool::load_json(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(pool.len(), 2);
        assert_eq!(pool.search("rich")[0].state, "NSW");
    }

    #[test]
    fn load_json_reports_missing_files() {
        let err = PostcodePool::load_json(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, PostcodeError::Pool(_)));
    }
}
