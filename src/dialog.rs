//! Hook run when the host renders its damage-roll dialog.

use tracing::{debug, warn};

use crate::config::Config;
use crate::extractor;
use crate::formatter;
use crate::types::EstimateType;

/// Extra height the dialog needs for the estimate line.
const EXTRA_HEIGHT_PX: u32 = 44;

/// What the host hands over when the dialog is rendered.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct DialogPayload {
    /// Raw markup-tagged damage formula.
    pub formula: String,
    /// Current dialog height, if the host reports one.
    #[serde(default)]
    pub height_px: Option<u32>,
    /// Whether the viewing user holds the GM role.
    #[serde(default)]
    pub viewer_is_gm: bool,
}

/// Changes the host should apply to the dialog.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DialogUpdate {
    /// Fragment appended to the roll button's content.
    pub button_html: String,
    /// The bare estimate text inside `button_html`.
    pub display: String,
    /// New dialog height, grown to fit the estimate line.
    pub height_px: Option<u32>,
}

/// Decide whether and what to add to a freshly rendered damage dialog.
///
/// Returns `None` when the viewer may not see the estimate, when the estimate
/// is disabled, or when the formula cannot be estimated. Failures are logged
/// and swallowed so the dialog itself always renders.
pub fn on_damage_dialog_rendered(payload: &DialogPayload, config: &Config) -> Option<DialogUpdate> {
    if config.only_gm && !payload.viewer_is_gm {
        debug!("estimate restricted to the GM");
        return None;
    }

    if config.estimate_type == EstimateType::Disabled {
        debug!("estimate disabled");
        return None;
    }

    let summary = match extractor::extract_damage(&payload.formula) {
        Err(e) => {
            warn!(error = %e, formula = %payload.formula, "skipping damage estimate");
            return None;
        },
        Ok(summary) => summary,
    };

    let display = formatter::format_estimate(&summary, config.estimate_type)?;
    return Some(DialogUpdate {
        button_html: formatter::wrap_html(&display),
        display,
        height_px: payload.height_px.map(|height| return height.saturating_add(EXTRA_HEIGHT_PX)),
    });
}
