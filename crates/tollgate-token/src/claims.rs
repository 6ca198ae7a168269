//! Claim checking and the verdicts built from it.
//!
//! Verification produces a [`CheckedClaims`]: every registered claim is
//! either its validated value or a sentinel. [`CheckedClaims::classify`]
//! turns that into a [`TokenStatus`]; an expired `exp` always wins over an
//! invalid `iss`/`iat`/`nbf`.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tollgate_core::{Classification, Grant};

/// Outcome of checking one registered claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimCheck<T> {
    Valid(T),
    Expired,
    Invalid,
}

impl<T> ClaimCheck<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, ClaimCheck::Valid(_))
    }

    pub fn valid(self) -> Option<T> {
        match self {
            ClaimCheck::Valid(v) => Some(v),
            _ => None,
        }
    }
}

/// Sentinels serialize as `"EXPIRED"` / `"INVALID"` in place of the value.
impl<T: Serialize> Serialize for ClaimCheck<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ClaimCheck::Valid(v) => v.serialize(serializer),
            ClaimCheck::Expired => serializer.serialize_str(Classification::Expired.as_str()),
            ClaimCheck::Invalid => serializer.serialize_str(Classification::Invalid.as_str()),
        }
    }
}

/// A token payload after every registered claim has been checked.
#[derive(Debug, Clone, Serialize)]
pub struct CheckedClaims {
    pub iss: ClaimCheck<String>,
    pub exp: ClaimCheck<i64>,
    pub iat: ClaimCheck<i64>,
    pub nbf: ClaimCheck<i64>,
    /// Every other payload entry, untouched.
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl CheckedClaims {
    /// Check the temporal claims of `payload` at time `now`.
    ///
    /// `iss` must already hold the recovered issuer; the caller compares it.
    pub fn check(
        mut payload: Map<String, Value>,
        iss: ClaimCheck<String>,
        now: i64,
        leeway: i64,
    ) -> Self {
        payload.remove("iss");
        let exp = check_expiration(payload.remove("exp").as_ref(), now);
        let iat = check_issued_at(payload.remove("iat").as_ref(), now, leeway);
        let nbf = check_not_before(payload.remove("nbf").as_ref(), now, leeway);
        Self {
            iss,
            exp,
            iat,
            nbf,
            rest: payload,
        }
    }

    /// Overall verdict. `exp` is consulted first.
    pub fn classification(&self) -> Classification {
        if !self.exp.is_valid() {
            Classification::Expired
        } else if !(self.iss.is_valid() && self.iat.is_valid() && self.nbf.is_valid()) {
            Classification::Invalid
        } else {
            Classification::Valid
        }
    }

    pub fn classify(self) -> TokenStatus {
        match self.classification() {
            Classification::Expired => TokenStatus::Expired,
            Classification::Invalid => TokenStatus::Invalid,
            Classification::Valid => match (
                self.iss.valid(),
                self.exp.valid(),
                self.iat.valid(),
                self.nbf.valid(),
            ) {
                (Some(issuer), Some(expires_at), Some(issued_at), Some(not_before)) => {
                    TokenStatus::Valid(VerifiedClaims::new(
                        issuer, expires_at, issued_at, not_before, self.rest,
                    ))
                }
                _ => TokenStatus::Invalid,
            },
        }
    }
}

fn timestamp(value: Option<&Value>) -> Option<i64> {
    let value = value?;
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
}

/// `now` must be strictly before `exp`. Missing or non-numeric is expired.
fn check_expiration(value: Option<&Value>, now: i64) -> ClaimCheck<i64> {
    match timestamp(value) {
        Some(exp) if now < exp => ClaimCheck::Valid(exp),
        _ => ClaimCheck::Expired,
    }
}

fn check_issued_at(value: Option<&Value>, now: i64, leeway: i64) -> ClaimCheck<i64> {
    match timestamp(value) {
        Some(iat) if iat <= now.saturating_add(leeway) => ClaimCheck::Valid(iat),
        _ => ClaimCheck::Invalid,
    }
}

fn check_not_before(value: Option<&Value>, now: i64, leeway: i64) -> ClaimCheck<i64> {
    match timestamp(value) {
        Some(nbf) if nbf <= now.saturating_add(leeway) => ClaimCheck::Valid(nbf),
        _ => ClaimCheck::Invalid,
    }
}

/// Claims of a token that passed every check.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedClaims {
    /// Recovered issuer identity.
    pub issuer: String,
    pub expires_at: i64,
    pub issued_at: i64,
    pub not_before: i64,
    /// Authorized endpoint/method pairs in token order.
    pub grants: Vec<Grant>,
    /// Payload entries that are neither registered claims nor grants.
    pub extra: Map<String, Value>,
}

impl VerifiedClaims {
    fn new(
        issuer: String,
        expires_at: i64,
        issued_at: i64,
        not_before: i64,
        rest: Map<String, Value>,
    ) -> Self {
        let mut indexed = Vec::new();
        let mut extra = Map::new();
        for (key, value) in rest {
            let grant = key
                .parse::<usize>()
                .ok()
                .zip(value.as_str().and_then(|s| s.parse::<Grant>().ok()));
            match grant {
                Some(entry) => indexed.push(entry),
                None => {
                    extra.insert(key, value);
                }
            }
        }
        indexed.sort_by_key(|(index, _)| *index);

        Self {
            issuer,
            expires_at,
            issued_at,
            not_before,
            grants: indexed.into_iter().map(|(_, grant)| grant).collect(),
            extra,
        }
    }

    /// Whether the token authorizes `method` on `endpoint`.
    pub fn permits(&self, endpoint: &str, method: &str) -> bool {
        self.grants.iter().any(|g| g.matches(endpoint, method))
    }

    /// The flat claim mapping: `iss`, `exp`, `iat`, `nbf`, then `"0"`, `"1"`, ...
    pub fn claim_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("iss".into(), Value::from(self.issuer.clone()));
        map.insert("exp".into(), Value::from(self.expires_at));
        map.insert("iat".into(), Value::from(self.issued_at));
        map.insert("nbf".into(), Value::from(self.not_before));
        for (index, grant) in self.grants.iter().enumerate() {
            map.insert(index.to_string(), Value::from(grant.to_string()));
        }
        for (key, value) in &self.extra {
            map.insert(key.clone(), value.clone());
        }
        map
    }
}

/// Result of verifying a presented token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenStatus {
    Valid(VerifiedClaims),
    Expired,
    Invalid,
}

impl TokenStatus {
    pub fn classification(&self) -> Classification {
        match self {
            TokenStatus::Valid(_) => Classification::Valid,
            TokenStatus::Expired => Classification::Expired,
            TokenStatus::Invalid => Classification::Invalid,
        }
    }

    pub fn claims(&self) -> Option<&VerifiedClaims> {
        match self {
            TokenStatus::Valid(claims) => Some(claims),
            _ => None,
        }
    }

    pub fn into_claims(self) -> Option<VerifiedClaims> {
        match self {
            TokenStatus::Valid(claims) => Some(claims),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: i64 = 1_700_000_000;

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn issuer() -> ClaimCheck<String> {
        ClaimCheck::Valid("tollgate".to_string())
    }

    #[test]
    fn test_valid_payload() {
        let checked = CheckedClaims::check(
            payload(json!({
                "iat": NOW, "nbf": NOW, "exp": NOW + 60, "iss": "sealed",
                "0": "orders/GET", "1": "v1/orders/POST"
            })),
            issuer(),
            NOW,
            0,
        );
        let TokenStatus::Valid(claims) = checked.classify() else {
            panic!("expected a valid token");
        };
        assert_eq!(claims.issuer, "tollgate");
        assert_eq!(
            claims.grants,
            vec![Grant::new("orders", "GET"), Grant::new("v1/orders", "POST")]
        );
        assert!(claims.permits("v1/orders", "POST"));
        assert!(!claims.permits("orders", "DELETE"));
        assert!(claims.extra.is_empty());
    }

    #[test]
    fn test_leeway_saturates_at_edge_of_time() {
        let checked = CheckedClaims::check(
            payload(json!({
                "iat": i64::MAX, "nbf": i64::MAX, "exp": i64::MAX, "iss": "sealed",
                "0": "orders/GET"
            })),
            issuer(),
            NOW,
            i64::MAX,
        );
        assert_eq!(checked.iat, ClaimCheck::Valid(i64::MAX));
        assert_eq!(checked.nbf, ClaimCheck::Valid(i64::MAX));
        assert_eq!(checked.classification(), Classification::Valid);
    }

    #[test]
    fn test_exp_is_strict() {
        let checked = CheckedClaims::check(
            payload(json!({"iat": NOW, "nbf": NOW, "exp": NOW})),
            issuer(),
            NOW,
            60,
        );
        assert_eq!(checked.exp, ClaimCheck::Expired);
        assert_eq!(checked.classification(), Classification::Expired);
    }

    #[test]
    fn test_expired_beats_invalid() {
        let checked = CheckedClaims::check(
            payload(json!({"iat": "yesterday", "exp": NOW - 10})),
            ClaimCheck::Invalid,
            NOW,
            0,
        );
        assert_eq!(checked.iat, ClaimCheck::Invalid);
        assert_eq!(checked.nbf, ClaimCheck::Invalid);
        assert_eq!(checked.classify(), TokenStatus::Expired);
    }

    #[test]
    fn test_missing_exp_is_expired() {
        let checked =
            CheckedClaims::check(payload(json!({"iat": NOW, "nbf": NOW})), issuer(), NOW, 0);
        assert_eq!(checked.classification(), Classification::Expired);
    }

    #[test]
    fn test_future_iat_and_nbf_within_leeway() {
        let checked = CheckedClaims::check(
            payload(json!({"iat": NOW + 30, "nbf": NOW + 30, "exp": NOW + 600})),
            issuer(),
            NOW,
            60,
        );
        assert_eq!(checked.classification(), Classification::Valid);

        let checked = CheckedClaims::check(
            payload(json!({"iat": NOW, "nbf": NOW + 120, "exp": NOW + 600})),
            issuer(),
            NOW,
            60,
        );
        assert_eq!(checked.nbf, ClaimCheck::Invalid);
        assert_eq!(checked.classification(), Classification::Invalid);
    }

    #[test]
    fn test_bad_issuer_is_invalid() {
        let checked = CheckedClaims::check(
            payload(json!({"iat": NOW, "nbf": NOW, "exp": NOW + 60})),
            ClaimCheck::Invalid,
            NOW,
            0,
        );
        assert_eq!(checked.classify(), TokenStatus::Invalid);
    }

    #[test]
    fn test_sentinels_serialize_in_place() {
        let checked = CheckedClaims::check(
            payload(json!({"iat": NOW + 999, "nbf": NOW, "exp": NOW - 1, "0": "users/GET"})),
            issuer(),
            NOW,
            0,
        );
        let value = serde_json::to_value(&checked).unwrap();
        assert_eq!(
            value,
            json!({
                "iss": "tollgate", "exp": "EXPIRED", "iat": "INVALID", "nbf": NOW,
                "0": "users/GET"
            })
        );
    }

    #[test]
    fn test_claim_map_order() {
        let TokenStatus::Valid(claims) = CheckedClaims::check(
            payload(json!({
                "iat": NOW, "nbf": NOW, "exp": NOW + 5,
                "1": "b/POST", "0": "a/GET", "scope": "internal"
            })),
            issuer(),
            NOW,
            0,
        )
        .classify() else {
            panic!("expected a valid token");
        };

        let keys: Vec<_> = claims.claim_map().keys().cloned().collect();
        assert_eq!(keys, ["iss", "exp", "iat", "nbf", "0", "1", "scope"]);
        assert_eq!(claims.claim_map()["0"], json!("a/GET"));
    }
}
