use std::path::PathBuf;

use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::bank::cards::CardDeck;
use crate::bank::library::PackLibrary;
use crate::bank::pack::QuestionPack;
use crate::bank::wrong_set::WrongSet;
use crate::config::Config;
use crate::session::browse::CardBrowse;
use crate::session::quiz::QuizSession;
use crate::store::kv::KvStore;
use crate::tabbar::item::{TabBadge, default_tabs, visible_tabs};
use crate::tabbar::state::TabBarState;
use crate::ui::theme::Theme;

/// Every page the shell can show. Tab pages sit at the bottom of the page
/// stack; drill pages and the profile peek stack on top of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Practice,
    Cards,
    Review,
    Packs,
    Profile,
    PracticeDrill,
    ReviewDrill,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Practice => "/practice",
            Route::Cards => "/cards",
            Route::Review => "/review",
            Route::Packs => "/packs",
            Route::Profile => "/profile",
            Route::PracticeDrill => "/practice/drill",
            Route::ReviewDrill => "/review/drill",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/practice" => Some(Route::Practice),
            "/cards" => Some(Route::Cards),
            "/review" => Some(Route::Review),
            "/packs" => Some(Route::Packs),
            "/profile" => Some(Route::Profile),
            "/practice/drill" => Some(Route::PracticeDrill),
            "/review/drill" => Some(Route::ReviewDrill),
            _ => None,
        }
    }
}

pub struct App {
    pub theme: &'static Theme,
    pub config: Config,
    pub store: KvStore,
    pub library: PackLibrary,
    /// Pack list as of the last storage mutation, so drawing never hits disk.
    pub packs: Vec<QuestionPack>,
    pub deck: CardDeck,
    pub wrongs: WrongSet,
    pub tabbar: TabBarState,
    pub page_stack: Vec<Route>,
    pub quiz: Option<QuizSession>,
    pub browse: CardBrowse,
    pub practice_selected: usize,
    pub packs_selected: usize,
    pub packs_confirm_delete: bool,
    pub review_selected: usize,
    pub notice: Option<String>,
    pub should_quit: bool,
    rng: SmallRng,
}

impl App {
    pub fn new(config: Config, data_dir: Option<PathBuf>) -> Result<Self> {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));

        let store = match data_dir {
            Some(dir) => KvStore::with_base_dir(dir)?,
            None => KvStore::new()?,
        };

        let library = PackLibrary::new();
        let deck = CardDeck::load(&store);
        let wrongs = WrongSet::load(&store);
        let tabs = visible_tabs(&default_tabs(), &config.roles);
        let tabbar = TabBarState::new(tabs, &store);

        let initial = tabbar
            .current()
            .and_then(|tab| Route::from_path(&tab.path))
            .unwrap_or(Route::Practice);

        let mut app = Self {
            theme,
            config,
            store,
            library,
            packs: Vec::new(),
            deck,
            wrongs,
            tabbar,
            page_stack: vec![initial],
            quiz: None,
            browse: CardBrowse::new(),
            practice_selected: 0,
            packs_selected: 0,
            packs_confirm_delete: false,
            review_selected: 0,
            notice: None,
            should_quit: false,
            rng: SmallRng::from_entropy(),
        };
        app.refresh_packs();
        app.sync_review_badge();
        Ok(app)
    }

    /// Re-reads the pack list after anything rewrote it in storage.
    pub fn refresh_packs(&mut self) {
        self.packs = self.library.all_packs(&self.store);
    }

    pub fn current_route(&self) -> Route {
        self.page_stack.last().copied().unwrap_or(Route::Practice)
    }

    pub fn open_paths(&self) -> Vec<String> {
        self.page_stack
            .iter()
            .map(|r| r.path().to_string())
            .collect()
    }

    /// Route behind the tab at `idx`, for tab switches.
    fn tab_route(&self, idx: usize) -> Route {
        self.tabbar
            .tabs()
            .get(idx)
            .and_then(|tab| Route::from_path(&tab.path))
            .unwrap_or(Route::Practice)
    }

    /// Switches to a tab: the page stack collapses to that tab's page.
    pub fn select_tab(&mut self, idx: usize) {
        self.tabbar.set_cur_idx(&self.store, idx);
        let route = self.tab_route(self.tabbar.cur_idx());
        self.page_stack = vec![route];
        self.quiz = None;
        self.packs_confirm_delete = false;
    }

    pub fn next_tab(&mut self) {
        if !self.tabbar.is_empty() {
            let next = (self.tabbar.cur_idx() + 1) % self.tabbar.len();
            self.select_tab(next);
        }
    }

    pub fn prev_tab(&mut self) {
        if !self.tabbar.is_empty() {
            let len = self.tabbar.len();
            let prev = (self.tabbar.cur_idx() + len - 1) % len;
            self.select_tab(prev);
        }
    }

    fn push_route(&mut self, route: Route) {
        self.page_stack.push(route);
        let open = self.open_paths();
        self.tabbar.set_auto_cur_idx(&self.store, route.path(), &open);
    }

    /// Leaves the top page and re-syncs the tab highlight to whatever page
    /// is now on top.
    pub fn pop_route(&mut self) {
        if self.page_stack.len() > 1 {
            self.page_stack.pop();
        }
        let open = self.open_paths();
        let path = self.current_route().path();
        self.tabbar.set_auto_cur_idx(&self.store, path, &open);
    }

    /// Opens the profile page on top of the current tab, remembering where
    /// we came from so closing it can jump back.
    pub fn peek_profile(&mut self) {
        if self.current_route() == Route::Profile {
            return;
        }
        if let Some(profile_idx) = self.tabbar.position_of(Route::Profile.path()) {
            self.tabbar.stash_prev_idx();
            self.tabbar.set_cur_idx(&self.store, profile_idx);
            self.page_stack.push(Route::Profile);
        }
    }

    pub fn close_profile_peek(&mut self) {
        if self.page_stack.len() > 1 && self.current_route() == Route::Profile {
            self.page_stack.pop();
            self.tabbar.restore_prev_idx(&self.store);
        }
    }

    fn build_practice_session(&mut self) -> Option<QuizSession> {
        let pack_id = self.packs.get(self.practice_selected)?.pack_id.clone();
        let mut questions = self.library.pack_questions(&self.store, &pack_id);
        if questions.is_empty() {
            return None;
        }
        if self.config.shuffle_questions {
            questions.shuffle(&mut self.rng);
        }
        if self.config.drill_size > 0 && questions.len() > self.config.drill_size {
            questions.truncate(self.config.drill_size);
        }
        Some(QuizSession::new(questions))
    }

    fn build_review_session(&mut self) -> Option<QuizSession> {
        let mut questions = self.library.wrong_questions(&self.store);
        if questions.is_empty() {
            return None;
        }
        if self.config.shuffle_questions {
            questions.shuffle(&mut self.rng);
        }
        Some(QuizSession::new(questions))
    }

    pub fn start_practice_drill(&mut self) {
        match self.build_practice_session() {
            Some(session) => {
                self.quiz = Some(session);
                self.push_route(Route::PracticeDrill);
            }
            None => self.notice = Some("This pack has no questions to drill.".to_string()),
        }
    }

    pub fn start_review_drill(&mut self) {
        match self.build_review_session() {
            Some(session) => {
                self.quiz = Some(session);
                self.push_route(Route::ReviewDrill);
            }
            None => self.notice = Some("Nothing to review. Missed questions land here.".to_string()),
        }
    }

    /// Locks in the selected answer and records the outcome in the wrong
    /// set: a miss marks the question, a correct answer clears it.
    pub fn reveal_answer(&mut self) {
        let Some(quiz) = self.quiz.as_mut() else {
            return;
        };
        if let Some(outcome) = quiz.reveal() {
            let result = if outcome.correct {
                self.wrongs.clear(&self.store, &outcome.question_id)
            } else {
                self.wrongs.mark(&self.store, &outcome.question_id)
            };
            if result.is_err() {
                self.notice = Some("Could not save progress to disk.".to_string());
            }
            self.sync_review_badge();
        }
    }

    pub fn advance_question(&mut self) {
        if let Some(quiz) = self.quiz.as_mut() {
            quiz.advance();
        }
    }

    pub fn retry_drill(&mut self) {
        let rebuilt = match self.current_route() {
            Route::PracticeDrill => self.build_practice_session(),
            Route::ReviewDrill => self.build_review_session(),
            _ => None,
        };
        match rebuilt {
            Some(session) => self.quiz = Some(session),
            None => self.end_drill(),
        }
    }

    pub fn end_drill(&mut self) {
        self.quiz = None;
        self.pop_route();
    }

    pub fn toggle_collect(&mut self) {
        if let Some(index) = self.browse.current_index(&self.deck) {
            if self.deck.toggle_collected(&self.store, index).is_err() {
                self.notice = Some("Could not save collection to disk.".to_string());
            }
        }
    }

    pub fn pack_count(&self) -> usize {
        self.packs.len()
    }

    pub fn practice_select_next(&mut self) {
        let count = self.pack_count();
        if count > 0 {
            self.practice_selected = (self.practice_selected + 1) % count;
        }
    }

    pub fn practice_select_prev(&mut self) {
        let count = self.pack_count();
        if count > 0 {
            self.practice_selected = (self.practice_selected + count - 1) % count;
        }
    }

    pub fn packs_select_next(&mut self) {
        let count = self.pack_count();
        if count > 0 {
            self.packs_selected = (self.packs_selected + 1) % count;
        }
    }

    pub fn packs_select_prev(&mut self) {
        let count = self.pack_count();
        if count > 0 {
            self.packs_selected = (self.packs_selected + count - 1) % count;
        }
    }

    /// Asks for confirmation before deleting the selected imported pack.
    /// The built-in pack is not deletable.
    pub fn request_delete_pack(&mut self) {
        match self.packs.get(self.packs_selected) {
            Some(pack) if pack.pack_id == "builtin" => {
                self.notice = Some("The built-in pack cannot be removed.".to_string());
            }
            Some(_) => self.packs_confirm_delete = true,
            None => {}
        }
    }

    pub fn confirm_delete_pack(&mut self) {
        self.packs_confirm_delete = false;
        let Some(pack) = self.packs.get(self.packs_selected) else {
            return;
        };
        let pack_id = pack.pack_id.clone();
        let title = pack.title.clone();
        if self.library.remove_pack(&self.store, &pack_id).is_err() {
            self.notice = Some("Could not update stored packs.".to_string());
            return;
        }
        self.refresh_packs();
        self.notice = Some(format!("Removed pack \"{title}\"."));
        let count = self.pack_count();
        if self.packs_selected >= count && count > 0 {
            self.packs_selected = count - 1;
        }
        if self.practice_selected >= count && count > 0 {
            self.practice_selected = count - 1;
        }
    }

    pub fn cancel_delete_pack(&mut self) {
        self.packs_confirm_delete = false;
    }

    /// Keeps the review tab badge equal to the current wrong-set size.
    pub fn sync_review_badge(&mut self) {
        if let Some(idx) = self.tabbar.position_of(Route::Review.path()) {
            let badge = match self.wrongs.len() {
                0 => None,
                n => Some(TabBadge::Count(n as u32)),
            };
            self.tabbar.set_badge(idx, badge);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_app() -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.roles = vec!["admin".to_string(), "user".to_string()];
        let app = App::new(config, Some(dir.path().to_path_buf())).unwrap();
        (dir, app)
    }

    #[test]
    fn route_paths_round_trip() {
        for route in [
            Route::Practice,
            Route::Cards,
            Route::Review,
            Route::Packs,
            Route::Profile,
            Route::PracticeDrill,
            Route::ReviewDrill,
        ] {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
        assert_eq!(Route::from_path("/nope"), None);
    }

    #[test]
    fn starts_on_the_persisted_tab() {
        let (_dir, mut app) = test_app();
        assert_eq!(app.current_route(), Route::Practice);
        app.select_tab(2);
        assert_eq!(app.current_route(), Route::Review);

        let config = app.config.clone();
        let dir = app.store.base_dir().to_path_buf();
        drop(app);
        let app = App::new(config, Some(dir)).unwrap();
        assert_eq!(app.current_route(), Route::Review);
    }

    #[test]
    fn practice_drill_pushes_and_pops_routes() {
        let (_dir, mut app) = test_app();
        app.start_practice_drill();
        assert_eq!(app.current_route(), Route::PracticeDrill);
        assert!(app.quiz.is_some());
        assert_eq!(
            app.tabbar.cur_idx(),
            0,
            "drill page keeps the practice tab highlighted"
        );

        app.end_drill();
        assert_eq!(app.current_route(), Route::Practice);
        assert!(app.quiz.is_none());
    }

    #[test]
    fn review_drill_needs_wrong_questions() {
        let (_dir, mut app) = test_app();
        app.select_tab(2);
        app.start_review_drill();
        assert_eq!(app.current_route(), Route::Review, "no wrong questions yet");
        assert!(app.notice.is_some());
    }

    #[test]
    fn answering_wrong_marks_and_badges_then_correct_clears() {
        let (_dir, mut app) = test_app();
        app.start_practice_drill();

        // Pick a wrong option on purpose: move off the correct one.
        let correct = app
            .quiz
            .as_ref()
            .unwrap()
            .current()
            .unwrap()
            .correct_option_index()
            .unwrap();
        if correct == 0 {
            app.quiz.as_mut().unwrap().select_next();
        }
        let question_id = app.quiz.as_ref().unwrap().current().unwrap().id.clone();
        app.reveal_answer();
        assert!(app.wrongs.contains(&question_id));
        let review_idx = app.tabbar.position_of("/review").unwrap();
        assert_eq!(
            app.tabbar.tabs()[review_idx].badge,
            Some(TabBadge::Count(1))
        );

        // Retry and answer the same first question correctly.
        app.retry_drill();
        let correct = app
            .quiz
            .as_ref()
            .unwrap()
            .current()
            .unwrap()
            .correct_option_index()
            .unwrap();
        for _ in 0..correct {
            app.quiz.as_mut().unwrap().select_next();
        }
        app.reveal_answer();
        assert!(!app.wrongs.contains(&question_id));
        assert_eq!(app.tabbar.tabs()[review_idx].badge, None);
    }

    #[test]
    fn profile_peek_restores_the_previous_tab() {
        let (_dir, mut app) = test_app();
        app.select_tab(1);
        app.peek_profile();
        assert_eq!(app.current_route(), Route::Profile);
        let profile_idx = app.tabbar.position_of("/profile").unwrap();
        assert_eq!(app.tabbar.cur_idx(), profile_idx);

        app.close_profile_peek();
        assert_eq!(app.current_route(), Route::Cards);
        assert_eq!(app.tabbar.cur_idx(), 1);
    }

    #[test]
    fn plain_users_have_no_packs_tab() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        let app = App::new(config, Some(dir.path().to_path_buf())).unwrap();
        assert!(app.tabbar.position_of("/packs").is_none());
        assert_eq!(app.tabbar.len(), 4);
    }

    #[test]
    fn builtin_pack_cannot_be_deleted() {
        let (_dir, mut app) = test_app();
        app.select_tab(3);
        assert_eq!(app.current_route(), Route::Packs);
        app.packs_selected = 0;
        app.request_delete_pack();
        assert!(!app.packs_confirm_delete);
        assert!(app.notice.as_deref().unwrap_or("").contains("built-in"));
    }

    #[test]
    fn deleting_an_imported_pack_refreshes_the_cached_list() {
        let (_dir, mut app) = test_app();
        let raw = serde_json::json!({
            "packId": "extra",
            "title": "Extra",
            "version": "1",
            "questions": [{
                "id": 1,
                "chapter": "c",
                "title": "t",
                "answer": "A",
                "analysis": "",
                "options": [{"label": "A", "value": "yes"}],
            }],
        });
        let pack = crate::bank::normalize::normalize_pack(&raw).unwrap();
        app.library.upsert_pack(&app.store, pack).unwrap();
        app.refresh_packs();
        assert_eq!(app.pack_count(), 2);

        app.packs_selected = 1;
        app.request_delete_pack();
        assert!(app.packs_confirm_delete);
        app.confirm_delete_pack();
        assert_eq!(app.pack_count(), 1);
        assert_eq!(app.packs_selected, 0);
        assert!(app.notice.as_deref().unwrap_or("").contains("Extra"));
    }
}
