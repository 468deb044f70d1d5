use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::handlers::SuccessResponse;
use crate::state::AppState;
use common::evidence::{clean_ocr_text, normalize_soc_explanation};
use common::telemetry;

/// Absent or null text is echoed back as null
#[derive(Debug, Deserialize)]
pub struct EvidenceTextRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EvidenceTextResponse {
    pub text: Option<String>,
}

/// Normalize a SOC control explanation using the configured framework names
#[tracing::instrument(skip(state, req))]
pub async fn normalize_explanation(
    State(state): State<AppState>,
    Json(req): Json<EvidenceTextRequest>,
) -> Json<SuccessResponse<EvidenceTextResponse>> {
    let text = req.text.map(|raw| {
        telemetry::record_evidence_normalized("soc_explanation");
        normalize_soc_explanation(&raw, &state.config.evidence)
    });

    Json(SuccessResponse::new(EvidenceTextResponse { text }))
}

/// Clean an OCR-extracted evidence field value
#[tracing::instrument(skip(req))]
pub async fn clean_ocr(
    Json(req): Json<EvidenceTextRequest>,
) -> Json<SuccessResponse<EvidenceTextResponse>> {
    let text = req.text.map(|raw| {
        telemetry::record_evidence_normalized("ocr");
        clean_ocr_text(&raw)
    });

    Json(SuccessResponse::new(EvidenceTextResponse { text }))
}
