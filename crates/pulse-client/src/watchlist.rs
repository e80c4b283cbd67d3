use crate::storage::Storage;
use anyhow::Result;
use pulse_common::{symbols, DEFAULT_SYMBOLS};

/// Storage key of the JSON-encoded symbol array.
pub const WATCHLIST_KEY: &str = "watchlist";

/// The ordered set of tracked symbols, plus the "active" one shown in detail.
///
/// Every change to the list is written through to `S` before the mutating
/// call returns.
#[derive(Debug)]
pub struct Watchlist<S: Storage> {
    storage: S,
    symbols: Vec<String>,
    active: Option<String>,
}

impl<S: Storage> Watchlist<S> {
    /// Load the saved list if there is a usable one, else start from
    /// [`DEFAULT_SYMBOLS`]. The first entry becomes active.
    pub fn load(storage: S) -> Self {
        let symbols = storage
            .get(WATCHLIST_KEY)
            .and_then(|raw| match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(saved) => Some(saved),
                Err(e) => {
                    log::warn!("ignoring malformed saved watchlist: {e}");
                    None
                }
            })
            .map(|saved| {
                let mut list: Vec<String> = Vec::with_capacity(saved.len());
                for symbol in saved.iter().filter_map(|s| symbols::normalize(s)) {
                    if !list.contains(&symbol) {
                        list.push(symbol);
                    }
                }
                list
            })
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect());

        let active = symbols.first().cloned();
        Watchlist {
            storage,
            symbols,
            active,
        }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Append `symbol` and make it active. Returns `false` (and changes
    /// nothing) for blank or already-tracked symbols. A failed save leaves
    /// the list and the active symbol as they were.
    pub fn add(&mut self, symbol: &str) -> Result<bool> {
        let Some(symbol) = symbols::normalize(symbol) else {
            return Ok(false);
        };
        if self.contains(&symbol) {
            return Ok(false);
        }

        let mut next = self.symbols.clone();
        next.push(symbol.clone());
        self.commit(next)?;
        self.active = Some(symbol);
        Ok(true)
    }

    /// Drop `symbol` from the list. If it was active, the first remaining
    /// entry takes over; an emptied list leaves nothing active.
    pub fn remove(&mut self, symbol: &str) -> Result<bool> {
        let Some(symbol) = symbols::normalize(symbol) else {
            return Ok(false);
        };
        if !self.contains(&symbol) {
            return Ok(false);
        }

        let next = self.symbols.iter().filter(|s| **s != symbol).cloned().collect();
        self.commit(next)?;
        self.reselect();
        Ok(true)
    }

    /// Make a tracked symbol active; unknown symbols are ignored.
    pub fn select(&mut self, symbol: &str) -> bool {
        match symbols::normalize(symbol).filter(|s| self.contains(s)) {
            Some(symbol) => {
                self.active = Some(symbol);
                true
            }
            None => false,
        }
    }

    fn reselect(&mut self) {
        let still_listed = self.active.as_deref().is_some_and(|a| self.contains(a));
        if !still_listed {
            self.active = self.symbols.first().cloned();
        }
    }

    /// Save `next`, and only once that succeeded make it the current list.
    fn commit(&mut self, next: Vec<String>) -> Result<()> {
        let raw = serde_json::to_string(&next)?;
        self.storage.set(WATCHLIST_KEY, raw)?;
        self.symbols = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn saved(symbols: &str) -> MemoryStorage {
        let mut storage = MemoryStorage::new();
        storage.set(WATCHLIST_KEY, symbols.to_string()).unwrap();
        storage
    }

    fn stored(list: &Watchlist<MemoryStorage>) -> Vec<String> {
        serde_json::from_str(&list.storage().get(WATCHLIST_KEY).unwrap()).unwrap()
    }

    #[test]
    fn starts_from_defaults() {
        let list = Watchlist::load(MemoryStorage::new());
        assert_eq!(list.symbols(), DEFAULT_SYMBOLS);
        assert_eq!(list.active(), Some("AAPL"));
    }

    #[test]
    fn reloads_saved_list() {
        let list = Watchlist::load(saved(r#"["meta", "NFLX", "META", " "]"#));
        assert_eq!(list.symbols(), ["META", "NFLX"]);
        assert_eq!(list.active(), Some("META"));
    }

    #[test]
    fn malformed_or_empty_saves_fall_back_to_defaults() {
        for raw in ["not json", "{\"a\":1}", "[1, 2]", "[]", "[\"  \"]"] {
            let list = Watchlist::load(saved(raw));
            assert_eq!(list.symbols(), DEFAULT_SYMBOLS, "saved: {raw}");
        }
    }

    #[test]
    fn add_is_idempotent() {
        let mut list = Watchlist::load(MemoryStorage::new());
        assert!(!list.add("msft").unwrap());
        assert!(!list.add("   ").unwrap());
        assert_eq!(list.symbols(), DEFAULT_SYMBOLS);
        assert_eq!(list.active(), Some("AAPL"));
    }

    #[test]
    fn add_appends_persists_and_activates() {
        let mut list = Watchlist::load(MemoryStorage::new());
        assert!(list.add(" goog ").unwrap());
        assert_eq!(list.symbols().last().map(String::as_str), Some("GOOG"));
        assert_eq!(list.active(), Some("GOOG"));
        assert_eq!(stored(&list), list.symbols());
    }

    #[test]
    fn removing_the_active_symbol_reselects_first() {
        let mut list = Watchlist::load(saved(r#"["AAPL","MSFT","TSLA"]"#));
        assert!(list.remove("aapl").unwrap());
        assert_eq!(list.symbols(), ["MSFT", "TSLA"]);
        assert_eq!(list.active(), Some("MSFT"));
        assert_eq!(stored(&list), ["MSFT", "TSLA"]);
    }

    #[test]
    fn removing_another_symbol_keeps_active() {
        let mut list = Watchlist::load(saved(r#"["AAPL","MSFT","TSLA"]"#));
        assert!(list.select("tsla"));
        assert!(list.remove("MSFT").unwrap());
        assert_eq!(list.active(), Some("TSLA"));
        assert!(!list.remove("MSFT").unwrap());
    }

    #[test]
    fn emptied_list_has_no_active_symbol() {
        let mut list = Watchlist::load(saved(r#"["AAPL"]"#));
        assert!(list.remove("AAPL").unwrap());
        assert!(list.is_empty());
        assert_eq!(list.active(), None);
        assert_eq!(stored(&list), Vec::<String>::new());
    }

    /// A store whose writes always fail, e.g., a read-only disk.
    struct ReadOnly(MemoryStorage);

    impl Storage for ReadOnly {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key)
        }

        fn set(&mut self, _key: &str, _value: String) -> Result<()> {
            anyhow::bail!("read-only store")
        }
    }

    #[test]
    fn failed_save_changes_nothing() {
        let mut list = Watchlist::load(ReadOnly(MemoryStorage::new()));

        assert!(list.add("goog").is_err());
        assert_eq!(list.symbols(), DEFAULT_SYMBOLS);
        assert_eq!(list.active(), Some("AAPL"));

        assert!(list.remove("AAPL").is_err());
        assert_eq!(list.symbols(), DEFAULT_SYMBOLS);
        assert_eq!(list.active(), Some("AAPL"));
    }

    #[test]
    fn select_ignores_untracked_symbols() {
        let mut list = Watchlist::load(MemoryStorage::new());
        assert!(!list.select("ZZZZ"));
        assert!(list.select("nvda"));
        assert_eq!(list.active(), Some("NVDA"));
    }
}
