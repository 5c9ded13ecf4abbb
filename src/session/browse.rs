use crate::bank::cards::CardDeck;

/// Cursor state for flipping through flashcards, with an optional
/// collected-only filter. Holds indexes into the deck rather than cards so
/// collect toggles show up without copying.
pub struct CardBrowse {
    cursor: usize,
    show_back: bool,
    collected_only: bool,
}

impl CardBrowse {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            show_back: false,
            collected_only: false,
        }
    }

    pub fn show_back(&self) -> bool {
        self.show_back
    }

    pub fn collected_only(&self) -> bool {
        self.collected_only
    }

    pub fn visible_indices(&self, deck: &CardDeck) -> Vec<usize> {
        deck.cards()
            .iter()
            .enumerate()
            .filter(|(_, card)| !self.collected_only || card.collected)
            .map(|(i, _)| i)
            .collect()
    }

    /// Position within the visible cards, clamped when the filter shrank
    /// the list under the cursor.
    pub fn position(&self, deck: &CardDeck) -> usize {
        let visible = self.visible_indices(deck);
        if visible.is_empty() {
            0
        } else {
            self.cursor.min(visible.len() - 1)
        }
    }

    /// Deck index of the card under the cursor.
    pub fn current_index(&self, deck: &CardDeck) -> Option<usize> {
        let visible = self.visible_indices(deck);
        visible.get(self.position(deck)).copied()
    }

    pub fn next(&mut self, deck: &CardDeck) {
        let count = self.visible_indices(deck).len();
        if count > 0 {
            self.cursor = (self.position(deck) + 1) % count;
            self.show_back = false;
        }
    }

    pub fn prev(&mut self, deck: &CardDeck) {
        let count = self.visible_indices(deck).len();
        if count > 0 {
            self.cursor = (self.position(deck) + count - 1) % count;
            self.show_back = false;
        }
    }

    pub fn flip(&mut self) {
        self.show_back = !self.show_back;
    }

    pub fn toggle_filter(&mut self) {
        self.collected_only = !self.collected_only;
        self.cursor = 0;
        self.show_back = false;
    }
}

impl Default for CardBrowse {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::kv::KvStore;
    use tempfile::TempDir;

    fn test_deck() -> (TempDir, KvStore, CardDeck) {
        let dir = TempDir::new().unwrap();
        let store = KvStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let deck = CardDeck::load(&store);
        (dir, store, deck)
    }

    #[test]
    fn browsing_wraps_and_resets_the_flip() {
        let (_dir, _store, deck) = test_deck();
        let mut browse = CardBrowse::new();
        browse.flip();
        assert!(browse.show_back());

        browse.next(&deck);
        assert!(!browse.show_back(), "moving shows the next card's front");
        assert_eq!(browse.position(&deck), 1);

        browse.prev(&deck);
        browse.prev(&deck);
        assert_eq!(browse.position(&deck), deck.len() - 1, "prev wraps to the end");
    }

    #[test]
    fn filter_narrows_to_collected_cards() {
        let (_dir, store, mut deck) = test_deck();
        deck.toggle_collected(&store, 1).unwrap();
        deck.toggle_collected(&store, 3).unwrap();

        let mut browse = CardBrowse::new();
        browse.toggle_filter();
        assert_eq!(browse.visible_indices(&deck), vec![1, 3]);
        assert_eq!(browse.current_index(&deck), Some(1));

        browse.next(&deck);
        assert_eq!(browse.current_index(&deck), Some(3));
    }

    #[test]
    fn empty_filtered_view_is_harmless() {
        let (_dir, _store, deck) = test_deck();
        let mut browse = CardBrowse::new();
        browse.toggle_filter();
        assert!(browse.visible_indices(&deck).is_empty());
        assert_eq!(browse.current_index(&deck), None);
        browse.next(&deck);
        browse.prev(&deck);
        assert_eq!(browse.position(&deck), 0);
    }

    #[test]
    fn cursor_clamps_when_uncollecting_under_it() {
        let (_dir, store, mut deck) = test_deck();
        deck.toggle_collected(&store, 0).unwrap();
        deck.toggle_collected(&store, 2).unwrap();

        let mut browse = CardBrowse::new();
        browse.toggle_filter();
        browse.next(&deck);
        assert_eq!(browse.current_index(&deck), Some(2));

        // Uncollect the card under the cursor; the cursor clamps to the
        // remaining card instead of pointing past the end.
        deck.toggle_collected(&store, 2).unwrap();
        assert_eq!(browse.current_index(&deck), Some(0));
    }
}
