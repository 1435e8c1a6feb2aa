use serde::{Deserialize, Serialize};

/// Status reported by the readiness endpoint.
pub const READY_STATUS: &str = "ready";

/// Body of the readiness response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthRes {
    pub ok: bool,
    pub status: String,
}

/// Readiness check used by the relay's HTTP surface.
///
/// The check is unrelated to the relay protocol: if the process can answer, it is ready.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Returns the fixed readiness response.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            status: READY_STATUS.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_the_fixed_body() {
        let body = serde_json::to_value(HealthService::check_health()).expect("serialize");
        assert_eq!(body, serde_json::json!({ "ok": true, "status": "ready" }));
    }
}
