//! Role-gated menu
//!
//! A flat table: every entry declares the roles that may see it. `None`
//! in an allowed set stands for the unauthenticated session.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::models::Role;

/// Dashboard views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum View {
    #[serde(rename = "pagina-inicial")]
    Landing,
    #[serde(rename = "dashboard")]
    Dashboard,
    #[serde(rename = "clientes")]
    Customers,
    #[serde(rename = "pedidos")]
    Orders,
    #[serde(rename = "produtos")]
    Products,
    #[serde(rename = "agenda")]
    Schedule,
    #[serde(rename = "fornecedores")]
    Suppliers,
    #[serde(rename = "relatorios")]
    Reports,
    #[serde(rename = "financeiro")]
    Finance,
    #[serde(rename = "configuracoes")]
    Settings,
}

impl View {
    pub fn id(self) -> &'static str {
        match self {
            View::Landing => "pagina-inicial",
            View::Dashboard => "dashboard",
            View::Customers => "clientes",
            View::Orders => "pedidos",
            View::Products => "produtos",
            View::Schedule => "agenda",
            View::Suppliers => "fornecedores",
            View::Reports => "relatorios",
            View::Finance => "financeiro",
            View::Settings => "configuracoes",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for View {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MENU.iter()
            .map(|entry| entry.view)
            .find(|view| view.id() == s)
            .ok_or_else(|| ModelError::UnknownView(s.to_string()))
    }
}

/// One menu entry and the sessions allowed to see it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    pub view: View,
    pub label: &'static str,
    allowed: &'static [Option<Role>],
}

impl MenuEntry {
    pub fn allows(&self, role: Option<Role>) -> bool {
        self.allowed.contains(&role)
    }
}

const EVERYONE: &[Option<Role>] = &[Some(Role::Admin), Some(Role::Attendant), None];
const STAFF: &[Option<Role>] = &[Some(Role::Admin), Some(Role::Attendant)];
const ADMIN_ONLY: &[Option<Role>] = &[Some(Role::Admin)];

const fn entry(view: View, label: &'static str, allowed: &'static [Option<Role>]) -> MenuEntry {
    MenuEntry {
        view,
        label,
        allowed,
    }
}

/// Master menu, in display order
pub const MENU: &[MenuEntry] = &[
    entry(View::Landing, "Página Inicial", EVERYONE),
    entry(View::Dashboard, "Dashboard", STAFF),
    entry(View::Customers, "Clientes", STAFF),
    entry(View::Orders, "Pedidos", STAFF),
    entry(View::Products, "Produtos", STAFF),
    entry(View::Schedule, "Agenda", STAFF),
    entry(View::Suppliers, "Fornecedores", STAFF),
    entry(View::Reports, "Relatórios", STAFF),
    entry(View::Finance, "Financeiro", ADMIN_ONLY),
    entry(View::Settings, "Configurações", ADMIN_ONLY),
];

/// Entries the session may see, in menu order
pub fn visible_menu(role: Option<Role>) -> Vec<&'static MenuEntry> {
    MENU.iter().filter(|entry| entry.allows(role)).collect()
}

pub fn can_view(view: View, role: Option<Role>) -> bool {
    MENU.iter()
        .find(|entry| entry.view == view)
        .is_some_and(|entry| entry.allows(role))
}

/// The view actually shown: a view the session may not see falls back to the landing page
pub fn resolve_view(requested: View, role: Option<Role>) -> View {
    if can_view(requested, role) {
        requested
    } else {
        View::Landing
    }
}

/// Where a session lands after an auth state change
pub fn home_view(role: Option<Role>) -> View {
    match role {
        Some(_) => View::Dashboard,
        None => View::Landing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(role: Option<Role>) -> Vec<&'static str> {
        visible_menu(role).iter().map(|e| e.view.id()).collect()
    }

    #[test]
    fn test_unauthenticated_sees_only_landing() {
        assert_eq!(ids(None), vec!["pagina-inicial"]);
    }

    #[test]
    fn test_attendant_sees_staff_entries_in_order() {
        assert_eq!(
            ids(Some(Role::Attendant)),
            vec![
                "pagina-inicial",
                "dashboard",
                "clientes",
                "pedidos",
                "produtos",
                "agenda",
                "fornecedores",
                "relatorios",
            ]
        );
    }

    #[test]
    fn test_admin_additionally_sees_finance_and_settings() {
        let admin = ids(Some(Role::Admin));
        assert_eq!(admin.len(), MENU.len());
        assert_eq!(&admin[8..], &["financeiro", "configuracoes"]);
    }

    #[test]
    fn test_resolve_view_falls_back_to_landing() {
        assert_eq!(resolve_view(View::Finance, Some(Role::Attendant)), View::Landing);
        assert_eq!(resolve_view(View::Finance, Some(Role::Admin)), View::Finance);
        assert_eq!(resolve_view(View::Customers, None), View::Landing);
        assert_eq!(resolve_view(View::Landing, None), View::Landing);
    }

    #[test]
    fn test_view_ids_round_trip() {
        for entry in MENU {
            assert_eq!(entry.view.id().parse::<View>().unwrap(), entry.view);
        }
        assert!("admin".parse::<View>().is_err());
        assert_eq!(home_view(Some(Role::Attendant)), View::Dashboard);
        assert_eq!(home_view(None), View::Landing);
    }
}
