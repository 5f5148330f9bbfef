//! Query parameters shared by several endpoints

use serde::Deserialize;

/// `?historic=true` includes closed versions in listings
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct HistoricParams {
    #[serde(default)]
    pub historic: bool,
}
