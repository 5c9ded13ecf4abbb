use crate::store::kv::{self, KvStore};
use crate::tabbar::item::{TabBadge, TabItem};

/// Active-tab state over an already role-filtered tab list. The current
/// index persists across runs; badges and `prev_idx` are session-only.
pub struct TabBarState {
    tabs: Vec<TabItem>,
    cur_idx: usize,
    prev_idx: usize,
}

impl TabBarState {
    /// Starts from the persisted index, falling back to 0 when the stored
    /// value does not fit the current tab list (a role change can shrink it).
    pub fn new(tabs: Vec<TabItem>, store: &KvStore) -> Self {
        let stored: usize = store.get(kv::keys::TAB_INDEX, 0);
        let cur_idx = if stored < tabs.len() { stored } else { 0 };
        Self {
            tabs,
            cur_idx,
            prev_idx: cur_idx,
        }
    }

    pub fn tabs(&self) -> &[TabItem] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn cur_idx(&self) -> usize {
        self.cur_idx
    }

    pub fn prev_idx(&self) -> usize {
        self.prev_idx
    }

    pub fn current(&self) -> Option<&TabItem> {
        self.tabs.get(self.cur_idx)
    }

    /// Remembers the current index so a transient override can be undone
    /// with [`Self::restore_prev_idx`].
    pub fn stash_prev_idx(&mut self) {
        self.prev_idx = self.cur_idx;
    }

    /// Activates a tab and persists the choice. Out-of-range indexes fall
    /// back to 0 so the persisted value always addresses a real tab.
    pub fn set_cur_idx(&mut self, store: &KvStore, idx: usize) {
        let idx = if idx < self.tabs.len() { idx } else { 0 };
        self.cur_idx = idx;
        let _ = store.set(kv::keys::TAB_INDEX, &idx);
    }

    /// Syncs the active tab from a route path. `"/"` always means the first
    /// tab. A path matching no tab leaves the index alone as long as some
    /// tab page is still open underneath (a sub-page reached from a tab);
    /// with no tab page open at all it falls back to the first tab.
    pub fn set_auto_cur_idx(&mut self, store: &KvStore, path: &str, open_paths: &[String]) {
        if path == "/" {
            self.set_cur_idx(store, 0);
            return;
        }
        let path = normalize_path(path);
        match self.tabs.iter().position(|t| t.path == path) {
            Some(idx) => self.set_cur_idx(store, idx),
            None => {
                let tab_page_open = open_paths
                    .iter()
                    .any(|p| self.is_tab_path(p));
                if !tab_page_open {
                    self.set_cur_idx(store, 0);
                }
            }
        }
    }

    /// Undoes a transient override. The refreshed `prev_idx` comes from
    /// storage rather than memory, matching how the index is shared with
    /// whoever else writes the key.
    pub fn restore_prev_idx(&mut self, store: &KvStore) {
        if self.prev_idx == self.cur_idx {
            return;
        }
        self.set_cur_idx(store, self.prev_idx);
        self.prev_idx = store.get(kv::keys::TAB_INDEX, 0);
    }

    /// In-place badge update on the role-filtered list. Not persisted.
    pub fn set_badge(&mut self, idx: usize, badge: Option<TabBadge>) {
        if let Some(tab) = self.tabs.get_mut(idx) {
            tab.badge = badge;
        }
    }

    pub fn position_of(&self, path: &str) -> Option<usize> {
        let path = normalize_path(path);
        self.tabs.iter().position(|t| t.path == path)
    }

    pub fn is_tab_path(&self, path: &str) -> bool {
        self.position_of(path).is_some()
    }
}

/// Strips any query string and guarantees a leading slash, so routes
/// carrying parameters still match their tab.
fn normalize_path(path: &str) -> String {
    let bare = path.split('?').next().unwrap_or(path);
    if bare.starts_with('/') {
        bare.to_string()
    } else {
        format!("/{bare}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabbar::item::default_tabs;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, KvStore) {
        let dir = TempDir::new().unwrap();
        let store = KvStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    fn state(store: &KvStore) -> TabBarState {
        TabBarState::new(default_tabs(), store)
    }

    #[test]
    fn starts_at_zero_on_fresh_storage() {
        let (_dir, store) = test_store();
        let tabbar = state(&store);
        assert_eq!(tabbar.cur_idx(), 0);
        assert_eq!(tabbar.prev_idx(), 0);
    }

    #[test]
    fn restores_persisted_index_when_in_range() {
        let (_dir, store) = test_store();
        let mut tabbar = state(&store);
        tabbar.set_cur_idx(&store, 2);

        let reloaded = state(&store);
        assert_eq!(reloaded.cur_idx(), 2);
    }

    #[test]
    fn out_of_range_persisted_index_falls_back_to_zero() {
        let (_dir, store) = test_store();
        store.set(kv::keys::TAB_INDEX, &42usize).unwrap();
        let tabbar = state(&store);
        assert_eq!(tabbar.cur_idx(), 0);
    }

    #[test]
    fn set_cur_idx_clamps_out_of_range_to_zero() {
        let (_dir, store) = test_store();
        let mut tabbar = state(&store);
        tabbar.set_cur_idx(&store, 99);
        assert_eq!(tabbar.cur_idx(), 0);
        assert_eq!(store.get(kv::keys::TAB_INDEX, 7usize), 0);
    }

    #[test]
    fn root_path_always_selects_the_first_tab() {
        let (_dir, store) = test_store();
        let mut tabbar = state(&store);
        tabbar.set_cur_idx(&store, 3);
        tabbar.set_auto_cur_idx(&store, "/", &[]);
        assert_eq!(tabbar.cur_idx(), 0);
    }

    #[test]
    fn matching_path_selects_that_tab_ignoring_query() {
        let (_dir, store) = test_store();
        let mut tabbar = state(&store);
        tabbar.set_auto_cur_idx(&store, "/review?from=drill", &[]);
        assert_eq!(tabbar.current().unwrap().path, "/review");

        tabbar.set_auto_cur_idx(&store, "cards", &[]);
        assert_eq!(tabbar.current().unwrap().path, "/cards");
    }

    #[test]
    fn unmatched_path_keeps_index_while_a_tab_page_is_open() {
        let (_dir, store) = test_store();
        let mut tabbar = state(&store);
        tabbar.set_cur_idx(&store, 2);
        tabbar.set_auto_cur_idx(
            &store,
            "/review/drill",
            &["/review".to_string(), "/review/drill".to_string()],
        );
        assert_eq!(tabbar.cur_idx(), 2);
    }

    #[test]
    fn unmatched_path_with_no_tab_page_open_falls_back_to_zero() {
        let (_dir, store) = test_store();
        let mut tabbar = state(&store);
        tabbar.set_cur_idx(&store, 2);
        tabbar.set_auto_cur_idx(&store, "/somewhere/else", &["/somewhere/else".to_string()]);
        assert_eq!(tabbar.cur_idx(), 0);
    }

    #[test]
    fn restore_prev_idx_round_trips_a_transient_override() {
        let (_dir, store) = test_store();
        let mut tabbar = state(&store);
        tabbar.set_cur_idx(&store, 1);
        tabbar.stash_prev_idx();
        tabbar.set_cur_idx(&store, 4);

        tabbar.restore_prev_idx(&store);
        assert_eq!(tabbar.cur_idx(), 1);
        assert_eq!(tabbar.prev_idx(), 1);
        assert_eq!(store.get(kv::keys::TAB_INDEX, 9usize), 1);
    }

    #[test]
    fn restore_prev_idx_is_a_no_op_when_already_there() {
        let (_dir, store) = test_store();
        let mut tabbar = state(&store);
        tabbar.set_cur_idx(&store, 2);
        tabbar.stash_prev_idx();
        tabbar.restore_prev_idx(&store);
        assert_eq!(tabbar.cur_idx(), 2);
    }

    #[test]
    fn restore_prev_idx_rereads_prev_from_storage() {
        let (_dir, store) = test_store();
        let mut tabbar = state(&store);
        tabbar.set_cur_idx(&store, 1);
        tabbar.stash_prev_idx();
        tabbar.set_cur_idx(&store, 4);

        // Another writer touches the key between override and restore; the
        // refreshed prev_idx reflects storage, not the in-memory history.
        store.set(kv::keys::TAB_INDEX, &3usize).unwrap();
        tabbar.restore_prev_idx(&store);
        assert_eq!(tabbar.cur_idx(), 1);
        assert_eq!(tabbar.prev_idx(), 1, "set_cur_idx persisted 1 before the re-read");
    }

    #[test]
    fn badges_mutate_in_place_without_persistence() {
        let (dir, store) = test_store();
        let mut tabbar = state(&store);
        tabbar.set_badge(2, Some(TabBadge::Count(3)));
        assert_eq!(tabbar.tabs()[2].badge, Some(TabBadge::Count(3)));
        tabbar.set_badge(2, None);
        assert_eq!(tabbar.tabs()[2].badge, None);
        tabbar.set_badge(99, Some(TabBadge::Dot));
        assert!(!dir.path().join("app-tabbar-index.json").exists());
    }
}
