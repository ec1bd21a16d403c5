//! Request and response bodies for the game API.

use common::config::RequestSignature;
use common::{Error, RoundResult};
use serde::{Deserialize, Serialize};

/// Body of the "current round" request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentRoundRequest<'a> {
    pub type_id: u32,
    pub language: u32,
    pub random: &'a str,
    pub signature: &'a str,
    pub timestamp: i64,
}

impl<'a> CurrentRoundRequest<'a> {
    pub fn new(type_id: u32, language: u32, sig: &'a RequestSignature, timestamp: i64) -> Self {
        Self {
            type_id,
            language,
            random: &sig.random,
            signature: &sig.signature,
            timestamp,
        }
    }
}

/// Body of the "recent rounds list" request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentRoundsRequest<'a> {
    pub page_size: u32,
    pub page_no: u32,
    pub type_id: u32,
    pub language: u32,
    pub random: &'a str,
    pub signature: &'a str,
    pub timestamp: i64,
}

/// `{code, data, msg}` wrapper every endpoint answers with.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub msg: String,
}

impl<T> Envelope<T> {
    /// Unwrap the payload; any non-zero `code` becomes [`Error::Api`].
    pub fn into_data(self) -> Result<T, Error> {
        if self.code != 0 {
            return Err(Error::Api {
                code: self.code,
                msg: self.msg,
            });
        }
        self.data.ok_or_else(|| Error::Api {
            code: self.code,
            msg: "response missing data".into(),
        })
    }
}

/// `data` payload of the recent-rounds endpoint.
#[derive(Debug, Deserialize)]
pub struct RoundList {
    #[serde(default)]
    pub list: Vec<RoundResult>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Colour, RoundMetadata};

    #[test]
    fn test_current_round_body_field_names() {
        let sig = RequestSignature {
            random: "r".into(),
            signature: "S".into(),
        };
        let body = serde_json::to_value(CurrentRoundRequest::new(1, 0, &sig, 1_700_000_000)).unwrap();
        assert_eq!(body["typeId"], 1);
        assert_eq!(body["language"], 0);
        assert_eq!(body["random"], "r");
        assert_eq!(body["signature"], "S");
        assert_eq!(body["timestamp"], 1_700_000_000i64);
    }

    #[test]
    fn test_recent_rounds_body_field_names() {
        let body = serde_json::to_value(RecentRoundsRequest {
            page_size: 20,
            page_no: 1,
            type_id: 1,
            language: 0,
            random: "r",
            signature: "S",
            timestamp: 5,
        })
        .unwrap();
        assert_eq!(body["pageSize"], 20);
        assert_eq!(body["pageNo"], 1);
    }

    #[test]
    fn test_success_envelope() {
        let raw = r#"{"code":0,"msg":"Succeed","data":{"issueNumber":"20240101100010999","endTime":1700000060000}}"#;
        let env: Envelope<RoundMetadata> = serde_json::from_str(raw).unwrap();
        let meta = env.into_data().unwrap();
        assert_eq!(meta.issue_number, "20240101100010999");
    }

    #[test]
    fn test_error_envelope_without_data() {
        let raw = r#"{"code":5,"msg":"Signature error"}"#;
        let env: Envelope<RoundList> = serde_json::from_str(raw).unwrap();
        match env.into_data() {
            Err(Error::Api { code, msg }) => {
                assert_eq!(code, 5);
                assert_eq!(msg, "Signature error");
            }
            other => panic!("expected Api error, got {:?}", other.map(|l| l.list.len())),
        }
    }

    #[test]
    fn test_round_list_payload() {
        let raw = r#"{"code":0,"msg":"","data":{"list":[
            {"issueNumber":"3","number":"8","colour":"red"},
            {"issueNumber":"2","number":"5","colour":"green,violet"}
        ]}}"#;
        let env: Envelope<RoundList> = serde_json::from_str(raw).unwrap();
        let list = env.into_data().unwrap().list;
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].issue_number, "3");
        assert_eq!(list[1].colour, Colour::Green);
        assert!(list[1].violet);
    }
}
