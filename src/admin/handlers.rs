use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::admin::AdminState;
use crate::config::{ConfigError, ServerConfig, ServiceSettings};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub config_generation: u64,
}

/// Partial update of [`ServiceSettings`]; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceSettingsPatch {
    pub site_url: Option<String>,
    pub api_prefix: Option<String>,
    pub tls_strict_transport: Option<bool>,
    pub tls_strict_transport_max_age: Option<u64>,
    pub tls_strict_transport_include_subdomains: Option<bool>,
    pub enable_developer: Option<bool>,
    pub experimental_enable_hardened_mode: Option<bool>,
}

impl ServiceSettingsPatch {
    pub fn apply(self, settings: &mut ServiceSettings) {
        if let Some(v) = self.site_url {
            settings.site_url = v;
        }
        if let Some(v) = self.api_prefix {
            settings.api_prefix = v;
        }
        if let Some(v) = self.tls_strict_transport {
            settings.tls_strict_transport = v;
        }
        if let Some(v) = self.tls_strict_transport_max_age {
            settings.tls_strict_transport_max_age = v;
        }
        if let Some(v) = self.tls_strict_transport_include_subdomains {
            settings.tls_strict_transport_include_subdomains = v;
        }
        if let Some(v) = self.enable_developer {
            settings.enable_developer = v;
        }
        if let Some(v) = self.experimental_enable_hardened_mode {
            settings.experimental_enable_hardened_mode = v;
        }
    }
}

const REDACTED: &str = "********";

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        config_generation: state.store.snapshot().generation(),
    })
}

pub async fn get_config(State(state): State<AdminState>) -> Json<ServerConfig> {
    let mut config = state.store.snapshot().config().clone();
    if !config.admin.api_key.is_empty() {
        config.admin.api_key = REDACTED.to_string();
    }
    Json(config)
}

pub async fn patch_service(
    State(state): State<AdminState>,
    Json(patch): Json<ServiceSettingsPatch>,
) -> Result<Json<ServiceSettings>, (StatusCode, Json<Value>)> {
    match state.store.update_config(|cfg| patch.apply(&mut cfg.service)) {
        Ok(snapshot) => Ok(Json(snapshot.service().clone())),
        Err(ConfigError::Validation(errors)) => {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            Err((StatusCode::BAD_REQUEST, Json(json!({ "errors": messages }))))
        }
        Err(e) => {
            tracing::error!(error = %e, "Service settings update failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "errors": [e.to_string()] })),
            ))
        }
    }
}
