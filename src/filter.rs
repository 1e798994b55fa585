use crate::prefs::Favorites;
use crate::types::Coin;

/// Coins whose name or symbol contains `query` (case-insensitive, trimmed),
/// restricted to favorites when `favorites_only` is set. Source order is kept.
pub fn filter_coins<'a>(
    coins: &'a [Coin],
    query: &str,
    favorites_only: bool,
    favorites: &Favorites,
) -> Vec<&'a Coin> {
    let needle = query.trim().to_lowercase();
    coins
        .iter()
        .filter(|c| {
            needle.is_empty()
                || c.name.to_lowercase().contains(&needle)
                || c.symbol.to_lowercase().contains(&needle)
        })
        .filter(|c| !favorites_only || favorites.contains(&c.id))
        .collect()
}

/// Keeps `current` if it is in `filtered`, otherwise falls back to the first
/// visible coin, or `None` when nothing is visible.
pub fn repair_selection(filtered: &[&Coin], current: Option<&str>) -> Option<String> {
    let first = filtered.first()?;
    match current {
        Some(id) if filtered.iter().any(|c| c.id == id) => Some(id.to_string()),
        _ => Some(first.id.clone()),
    }
}
