//! Menu Model

use serde::{Deserialize, Serialize};

/// Menu node kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum MenuKind {
    /// Navigation directory
    Directory,
    /// Routable page
    #[default]
    Menu,
    /// Action / permission holder, never routable
    Button,
}

impl MenuKind {
    pub fn is_routable(self) -> bool {
        !matches!(self, MenuKind::Button)
    }
}

/// Menu entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Menu {
    pub id: i64,
    pub parent_id: i64,
    pub menu_name: String,
    pub order_num: i32,
    /// Route path, or an absolute URL for external links
    pub path: String,
    pub component: Option<String>,
    /// Route query string passed through to the UI
    pub query: Option<String>,
    /// Opens as an external link
    pub is_frame: bool,
    /// Page is kept alive by the UI shell
    pub is_cache: bool,
    pub menu_type: MenuKind,
    pub visible: bool,
    pub is_active: bool,
    /// Permission string, e.g. `"system:user:list"`
    pub perms: Option<String>,
    pub icon: String,
}

impl Menu {
    /// Non-blank permission string, if any
    pub fn permission(&self) -> Option<&str> {
        self.perms
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}
