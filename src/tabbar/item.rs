/// Badge shown on a tab: a plain dot, a count, or short free text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TabBadge {
    Dot,
    Count(u32),
    Text(String),
}

/// One bottom-bar tab. An empty `roles` list means the tab is visible to
/// everyone; otherwise the user needs at least one of the listed roles.
#[derive(Clone, Debug, PartialEq)]
pub struct TabItem {
    pub label: String,
    pub icon: String,
    pub path: String,
    pub roles: Vec<String>,
    pub badge: Option<TabBadge>,
}

impl TabItem {
    pub fn new(label: &str, icon: &str, path: &str) -> Self {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        Self {
            label: label.to_string(),
            icon: icon.to_string(),
            path,
            roles: Vec::new(),
            badge: None,
        }
    }

    pub fn restricted_to(mut self, roles: &[&str]) -> Self {
        self.roles = roles.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn visible_to(&self, user_roles: &[String]) -> bool {
        self.roles.is_empty() || self.roles.iter().any(|r| user_roles.contains(r))
    }
}

/// The full tab set before role filtering. Pack management is reserved for
/// admins; everything else is open.
pub fn default_tabs() -> Vec<TabItem> {
    vec![
        TabItem::new("Practice", "✎", "/practice"),
        TabItem::new("Cards", "❐", "/cards"),
        TabItem::new("Review", "↻", "/review"),
        TabItem::new("Packs", "⇪", "/packs").restricted_to(&["admin"]),
        TabItem::new("Profile", "♟", "/profile"),
    ]
}

pub fn visible_tabs(tabs: &[TabItem], user_roles: &[String]) -> Vec<TabItem> {
    tabs.iter()
        .filter(|t| t.visible_to(user_roles))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(names: &[&str]) -> Vec<String> {
        names.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn unrestricted_tabs_are_always_visible() {
        let tab = TabItem::new("Practice", "✎", "/practice");
        assert!(tab.visible_to(&roles(&["user"])));
        assert!(tab.visible_to(&roles(&[])));
    }

    #[test]
    fn restricted_tabs_need_a_matching_role() {
        let tab = TabItem::new("Packs", "⇪", "/packs").restricted_to(&["admin"]);
        assert!(!tab.visible_to(&roles(&["user"])));
        assert!(tab.visible_to(&roles(&["admin", "user"])));
        assert!(!tab.visible_to(&roles(&[])));
    }

    #[test]
    fn a_userless_session_sees_only_unrestricted_tabs() {
        let visible = visible_tabs(&default_tabs(), &roles(&[]));
        assert!(visible.iter().all(|t| t.roles.is_empty()));
        assert!(!visible.is_empty());
    }

    #[test]
    fn default_tabs_hide_pack_management_from_plain_users() {
        let user_tabs = visible_tabs(&default_tabs(), &roles(&["user"]));
        assert!(user_tabs.iter().all(|t| t.path != "/packs"));

        let admin_tabs = visible_tabs(&default_tabs(), &roles(&["admin", "user"]));
        assert!(admin_tabs.iter().any(|t| t.path == "/packs"));
        assert_eq!(admin_tabs.len(), default_tabs().len());
    }

    #[test]
    fn paths_are_normalized_to_a_leading_slash() {
        let tab = TabItem::new("Cards", "❐", "cards");
        assert_eq!(tab.path, "/cards");
    }
}
