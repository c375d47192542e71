//! Response envelope of the postcode API.
//!
//! Every reply carries a `status` object; only `status.code == 200` comes
//! with `data.localities`:
//!
//! ```json
//! { "status": { "code": 200, "text": "" },
//!   "data": { "localities": [ { "locality": "ALICE SPRINGS", "state": "NT", "postcode": "0870" } ] } }
//! ```

use serde::{Deserialize, Serialize};

use postcode_core::pool::{SearchRejection, STATUS_OK};
use postcode_core::Locality;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiStatus {
    pub code: u16,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalitiesData {
    #[serde(default)]
    pub localities: Vec<Locality>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResponse {
    pub status: ApiStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<LocalitiesData>,
}

impl LookupResponse {
    pub fn ok(localities: Vec<Locality>) -> Self {
        Self {
            status: ApiStatus {
                code: STATUS_OK,
                text: String::new(),
            },
            data: Some(LocalitiesData { localities }),
        }
    }

    pub fn rejected(rejection: SearchRejection) -> Self {
        Self {
            status: ApiStatus {
                code: rejection.code,
                text: rejection.text,
            },
            data: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status.code == STATUS_OK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_successful_envelope() {
        let body = r#"{"status":{"code":200,"text":""},
            "data":{"localities":[{"locality":"ALICE SPRINGS","state":"NT","postcode":"0870"}]}}"#;
        let resp: LookupResponse = serde_json::from_str(body).unwrap();
        assert!(resp.is_ok());
        assert_eq!(resp.data.unwrap().localities[0].postcode, "0870");
    }

    #[test]
    fn parses_a_rejection_without_data() {
        let body = r#"{"status":{"code":404,"text":"No localities matched 'xyz'"}}"#;
        let resp: LookupResponse = serde_json::from_str(body).unwrap();
        assert!(!resp.is_ok());
        assert!(resp.data.is_none());
        assert_eq!(resp.status.text, "No localities matched 'xyz'");
    }
}
