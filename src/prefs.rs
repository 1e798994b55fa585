use crate::store::Store;

pub const FAVORITES_KEY: &str = "crypto-dashboard:favorites";
pub const THEME_KEY: &str = "crypto-dashboard:theme";
pub const BACKGROUND_KEY: &str = "crypto-dashboard:background";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundStyle {
    #[default]
    Soft,
    Mesh,
    Paper,
}

impl BackgroundStyle {
    pub const ALL: [BackgroundStyle; 3] = [
        BackgroundStyle::Soft,
        BackgroundStyle::Mesh,
        BackgroundStyle::Paper,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BackgroundStyle::Soft => "soft",
            BackgroundStyle::Mesh => "mesh",
            BackgroundStyle::Paper => "paper",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|bg| bg.as_str() == s)
    }

    pub fn next(self) -> Self {
        match self {
            BackgroundStyle::Soft => BackgroundStyle::Mesh,
            BackgroundStyle::Mesh => BackgroundStyle::Paper,
            BackgroundStyle::Paper => BackgroundStyle::Soft,
        }
    }
}

/// Favorite coin ids. Insertion order is kept for storage, membership is set-like.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Favorites {
    ids: Vec<String>,
}

impl Favorites {
    pub fn from_ids<I: IntoIterator<Item = String>>(ids: I) -> Self {
        let mut out = Self::default();
        for id in ids {
            if !out.contains(&id) {
                out.ids.push(id);
            }
        }
        out
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|f| f == id)
    }

    /// Adds `id` if absent, removes it if present. Returns whether it is now a favorite.
    pub fn toggle(&mut self, id: &str) -> bool {
        if let Some(pos) = self.ids.iter().position(|f| f == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    #[cfg(test)]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn encode(&self) -> String {
        serde_json::to_string(&self.ids).unwrap_or_else(|_| "[]".to_string())
    }

    /// Decodes a stored JSON array; anything else yields an empty set.
    pub fn decode(raw: &str) -> Self {
        match serde_json::from_str::<Vec<String>>(raw) {
            Ok(ids) => Self::from_ids(ids),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed favorites entry");
                Self::default()
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    pub favorites: Favorites,
    pub theme: ThemeMode,
    pub background: BackgroundStyle,
}

impl Preferences {
    /// Reads every preference, falling back to its default when absent,
    /// malformed, or unreadable.
    pub fn load(store: &Store) -> Self {
        let favorites = read(store, FAVORITES_KEY)
            .map(|raw| Favorites::decode(&raw))
            .unwrap_or_default();
        let theme = read(store, THEME_KEY)
            .and_then(|raw| ThemeMode::parse(&raw))
            .unwrap_or_default();
        let background = read(store, BACKGROUND_KEY)
            .and_then(|raw| BackgroundStyle::parse(&raw))
            .unwrap_or_default();

        Self {
            favorites,
            theme,
            background,
        }
    }

    pub fn save_favorites(&self, store: &Store) {
        write(store, FAVORITES_KEY, &self.favorites.encode());
    }

    pub fn save_theme(&self, store: &Store) {
        write(store, THEME_KEY, self.theme.as_str());
    }

    pub fn save_background(&self, store: &Store) {
        write(store, BACKGROUND_KEY, self.background.as_str());
    }
}

fn read(store: &Store, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read preference");
            None
        }
    }
}

fn write(store: &Store, key: &str, value: &str) {
    if let Err(e) = store.set(key, value) {
        tracing::warn!(key, error = %e, "Failed to persist preference");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_store_is_empty() {
        let store = Store::open_in_memory().unwrap();
        let prefs = Preferences::load(&store);
        assert_eq!(prefs.favorites.len(), 0);
        assert_eq!(prefs.theme, ThemeMode::Light);
        assert_eq!(prefs.background, BackgroundStyle::Soft);
    }

    #[test]
    fn defaults_when_entries_are_corrupt() {
        let store = Store::open_in_memory().unwrap();
        store.set(FAVORITES_KEY, "{not json").unwrap();
        store.set(THEME_KEY, "neon").unwrap();
        store.set(BACKGROUND_KEY, "").unwrap();
        let prefs = Preferences::load(&store);
        assert_eq!(prefs.favorites.len(), 0);
        assert_eq!(prefs.theme, ThemeMode::Light);
        assert_eq!(prefs.background, BackgroundStyle::Soft);

        store.set(FAVORITES_KEY, r#"[1, 2]"#).unwrap();
        assert_eq!(Preferences::load(&store).favorites.len(), 0);
    }

    #[test]
    fn theme_round_trips_through_store() {
        let store = Store::open_in_memory().unwrap();
        let mut prefs = Preferences::load(&store);
        prefs.theme = prefs.theme.toggled();
        prefs.save_theme(&store);
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        assert_eq!(Preferences::load(&store).theme, ThemeMode::Dark);
    }

    #[test]
    fn favorites_keep_insertion_order_and_drop_duplicates() {
        let store = Store::open_in_memory().unwrap();
        store
            .set(FAVORITES_KEY, r#"["solana","bitcoin","solana"]"#)
            .unwrap();
        let prefs = Preferences::load(&store);
        assert_eq!(prefs.favorites.ids(), &["solana", "bitcoin"]);

        prefs.save_favorites(&store);
        assert_eq!(
            store.get(FAVORITES_KEY).unwrap().as_deref(),
            Some(r#"["solana","bitcoin"]"#)
        );
    }

    #[test]
    fn toggle_twice_restores_set() {
        let original = Favorites::from_ids(["bitcoin".to_string(), "ethereum".to_string()]);
        for id in ["bitcoin", "ethereum", "dogecoin"] {
            let mut favs = original.clone();
            favs.toggle(id);
            favs.toggle(id);
            let mut a: Vec<_> = favs.ids().to_vec();
            let mut b: Vec<_> = original.ids().to_vec();
            a.sort();
            b.sort();
            assert_eq!(a, b, "toggling {} twice", id);
        }
    }

    #[test]
    fn toggle_reports_membership() {
        let mut favs = Favorites::default();
        assert!(favs.toggle("bitcoin"));
        assert!(favs.contains("bitcoin"));
        assert_eq!(favs.len(), 1);
        assert!(!favs.toggle("bitcoin"));
        assert!(!favs.contains("bitcoin"));
    }

    #[test]
    fn background_cycle_and_parse() {
        for bg in BackgroundStyle::ALL {
            assert_eq!(BackgroundStyle::parse(bg.as_str()), Some(bg));
        }
        assert_eq!(BackgroundStyle::Paper.next(), BackgroundStyle::Soft);
    }
}
