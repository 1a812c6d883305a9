//! Route Tree Builder
//!
//! Turns the flat, permission-filtered menu list into the nested route tree
//! consumed by the UI shell. Each node goes through four rules, first match
//! wins:
//!
//! 1. directory with children: always-shown wrapper, `noRedirect`
//! 2. top-level page (not an external link): `Layout` wrapper at `/` with a
//!    single child carrying the real route
//! 3. top-level external link: `/` with title/icon only and an `InnerLink`
//!    child whose `link` is the URL
//! 4. anything else: emitted as-is
//!
//! The menu list is indexed once; recursion never goes back to the store.

use shared::models::{Menu, MenuKind, RouteMeta, RouteNode};

use super::hierarchy::{ChildIndex, ROOT_ID, is_top_level};

pub const LAYOUT: &str = "Layout";
pub const PARENT_VIEW: &str = "ParentView";
pub const INNER_LINK: &str = "InnerLink";
pub const NO_REDIRECT: &str = "noRedirect";

/// Builds the route tree from menus sorted by parent, then order
///
/// Buttons are never routable and are skipped.
pub fn build_routes(menus: &[Menu]) -> Vec<RouteNode> {
    let routable: Vec<&Menu> = menus
        .iter()
        .filter(|m| m.menu_type.is_routable())
        .collect();
    let index = ChildIndex::new(&routable);
    build_level(&index, ROOT_ID)
}

fn build_level(index: &ChildIndex<'_, &Menu>, parent_id: i64) -> Vec<RouteNode> {
    index
        .children_of(parent_id)
        .iter()
        .map(|menu| build_node(index, menu))
        .collect()
}

fn build_node(index: &ChildIndex<'_, &Menu>, menu: &Menu) -> RouteNode {
    let path = router_path(menu);
    let mut node = RouteNode {
        name: route_name(&path),
        path,
        hidden: !menu.visible,
        redirect: None,
        component: component(menu),
        query: menu.query.clone(),
        always_show: None,
        meta: Some(meta(menu)),
        children: Vec::new(),
    };

    if menu.menu_type == MenuKind::Directory && index.has_children(menu.id) {
        node.always_show = Some(true);
        node.redirect = Some(NO_REDIRECT.to_string());
        node.children = build_level(index, menu.id);
    } else if is_page_wrapper(menu) {
        node.meta = None;
        node.children = vec![RouteNode {
            name: route_name(&menu.path),
            path: menu.path.clone(),
            hidden: false,
            redirect: None,
            component: menu.component.clone().unwrap_or_default(),
            query: menu.query.clone(),
            always_show: None,
            meta: Some(meta(menu)),
            children: Vec::new(),
        }];
    } else if is_top_level(&menu) && is_external_link(menu) {
        node.path = "/".to_string();
        node.name = String::new();
        node.meta = Some(RouteMeta {
            title: menu.menu_name.clone(),
            icon: menu.icon.clone(),
            ..RouteMeta::default()
        });
        let child_path = inner_link_path(&menu.path);
        node.children = vec![RouteNode {
            name: route_name(&child_path),
            path: child_path,
            hidden: false,
            redirect: None,
            component: INNER_LINK.to_string(),
            query: None,
            always_show: None,
            meta: Some(RouteMeta {
                title: menu.menu_name.clone(),
                icon: menu.icon.clone(),
                no_cache: false,
                link: Some(menu.path.clone()),
            }),
            children: Vec::new(),
        }];
    }
    node
}

fn meta(menu: &Menu) -> RouteMeta {
    RouteMeta {
        title: menu.menu_name.clone(),
        icon: menu.icon.clone(),
        no_cache: !menu.is_cache,
        link: is_http(&menu.path).then(|| menu.path.clone()),
    }
}

/// Top-level page rendered inside the shared layout
fn is_page_wrapper(menu: &Menu) -> bool {
    is_top_level(&menu) && menu.menu_type == MenuKind::Menu && !menu.is_frame
}

/// External-link flag set and an absolute http(s) target
fn is_external_link(menu: &Menu) -> bool {
    menu.is_frame && is_http(&menu.path)
}

pub fn is_http(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// Route path of a node before any rule rewrites it
pub fn router_path(menu: &Menu) -> String {
    if !is_top_level(&menu) && is_external_link(menu) {
        return "/".to_string();
    }
    if is_top_level(&menu) && menu.menu_type == MenuKind::Directory && !menu.is_frame {
        return format!("/{}", menu.path.trim_start_matches('/'));
    }
    if is_page_wrapper(menu) {
        return "/".to_string();
    }
    menu.path.clone()
}

/// Component of a node before any rule rewrites it
pub fn component(menu: &Menu) -> String {
    let explicit = menu.component.as_deref().filter(|c| !c.trim().is_empty());
    match explicit {
        Some(component) if !is_page_wrapper(menu) => component.to_string(),
        None if !is_top_level(&menu) && is_external_link(menu) => INNER_LINK.to_string(),
        None if !is_top_level(&menu) && menu.menu_type == MenuKind::Directory => {
            PARENT_VIEW.to_string()
        }
        _ => LAYOUT.to_string(),
    }
}

/// Path without leading slashes, first character upper-cased
pub fn route_name(path: &str) -> String {
    let trimmed = path.trim_start_matches('/');
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Router-safe path for an external URL rendered in-app
///
/// `https://www.example.com:8080/docs` → `example/com/8080/docs`
pub fn inner_link_path(url: &str) -> String {
    url.replace("http://", "")
        .replace("https://", "")
        .replace("www.", "")
        .replace(['.', ':'], "/")
}
