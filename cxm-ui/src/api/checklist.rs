//! Static checklist routine endpoint

use axum::Json;
use cxm_common::checklist::{self, ChecklistItem};
use serde::Serialize;

/// Checklist table response
#[derive(Debug, Serialize)]
pub struct ChecklistResponse {
    pub items: &'static [ChecklistItem],
    pub total: usize,
}

/// GET /api/checklist
///
/// The fixed routine, in execution order. Identical for every client and
/// every request.
pub async fn get_checklist() -> Json<ChecklistResponse> {
    Json(ChecklistResponse {
        items: checklist::CHECKLIST_ITEMS,
        total: checklist::total_item_count(),
    })
}
