// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

//! Public site settings endpoint.

use axum::{extract::State, Json};

use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::SiteSettings;

/// Site branding and presentation settings.
///
/// Defaults are served until an admin saves an edit.
#[utoipa::path(
    get,
    path = "/v1/settings",
    tag = "Settings",
    responses(
        (status = 200, description = "Current site settings", body = SiteSettings)
    )
)]
pub async fn get_settings(State(state): State<AppState>) -> Result<Json<SiteSettings>, ApiError> {
    Ok(Json(state.settings.load()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::test_app;

    #[tokio::test]
    async fn defaults_are_served_before_any_edit() {
        let app = test_app();
        let Json(settings) = get_settings(State(app.state.clone())).await.unwrap();
        assert_eq!(settings.site_name, "CasinoFound");
        assert_eq!(settings.default_language, "pt");
    }
}
