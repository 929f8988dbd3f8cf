//! Catalog of templates and boards
//!
//! Holds the fetched lists together with the favorite set and the current
//! view, and owns the favorite toggle.

pub mod filter;
pub mod item;

pub use filter::{ListedItem, ViewOption, ViewSelection, filter_items};
pub use item::{Board, DisplayItem, Template};

use crate::api::types::{DashboardRecord, TemplateRecord};
use crate::consts::cli_consts::storage_keys;
use crate::favorites::FavoriteSet;
use crate::store::{PreferenceStore, PreferenceStoreExt, StoreError};
use std::sync::Arc;

pub const NO_DATA: &str = "No data found";
pub const NO_MATCHES: &str = "No matching items found";

pub struct Catalog {
    store: Arc<dyn PreferenceStore>,
    templates: Vec<Template>,
    boards: Vec<Board>,
    favorites: FavoriteSet,
    pub view: ViewSelection,
}

impl Catalog {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        let favorites = FavoriteSet::load(store.as_ref());
        Self {
            store,
            templates: Vec::new(),
            boards: Vec::new(),
            favorites,
            view: ViewSelection::default(),
        }
    }

    pub fn set_templates(&mut self, records: Vec<TemplateRecord>) {
        self.templates = records.into_iter().map(Template::from).collect();
    }

    pub fn set_boards(&mut self, records: Vec<DashboardRecord>) {
        self.boards = records.into_iter().map(Board::from).collect();
    }

    pub fn favorites(&self) -> &FavoriteSet {
        &self.favorites
    }

    /// The list for the current view.
    pub fn listed(&self) -> Vec<ListedItem> {
        filter_items(&self.templates, &self.boards, &self.favorites, &self.view)
    }

    /// Flips one favorite and persists the whole set.
    ///
    /// The set is re-read from the store first so a toggle made by another
    /// process is not lost; the caller mirrors the result to the server.
    pub fn toggle_favorite(&mut self, id: u64) -> Result<Vec<ListedItem>, StoreError> {
        let mut favorites = FavoriteSet::load(self.store.as_ref());
        favorites.toggle(id);
        favorites.save(self.store.as_ref())?;
        self.favorites = favorites;
        Ok(self.listed())
    }

    /// What to show when [`Catalog::listed`] is empty.
    pub fn empty_message(&self) -> &'static str {
        if self.templates.is_empty() && self.boards.is_empty() {
            NO_DATA
        } else {
            NO_MATCHES
        }
    }

    pub fn find(&self, id: u64) -> Option<DisplayItem> {
        self.templates
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .map(DisplayItem::Template)
            .or_else(|| {
                self.boards
                    .iter()
                    .find(|b| b.id == id)
                    .cloned()
                    .map(DisplayItem::Board)
            })
    }

    /// Looks an item up and records it as opened.
    pub fn open(&self, id: u64) -> Result<Option<DisplayItem>, StoreError> {
        let Some(item) = self.find(id) else {
            return Ok(None);
        };
        remember_opened(self.store.as_ref(), &item)?;
        Ok(Some(item))
    }
}

/// Upserts `item` into the opened-items cache, keyed by id.
pub fn remember_opened(store: &dyn PreferenceStore, item: &DisplayItem) -> Result<(), StoreError> {
    let mut opened: Vec<DisplayItem> = store.get_or_default(storage_keys::OPENED_DASHBOARDS);
    match opened.iter_mut().find(|o| o.id() == item.id()) {
        Some(existing) => *existing = item.clone(),
        None => opened.push(item.clone()),
    }
    store.set(storage_keys::OPENED_DASHBOARDS, &opened)
}

/// A previously opened item, if the cache has it.
pub fn opened_item(store: &dyn PreferenceStore, id: u64) -> Option<DisplayItem> {
    let opened: Vec<DisplayItem> = store.get_or_default(storage_keys::OPENED_DASHBOARDS);
    opened.into_iter().find(|o| o.id() == id)
}
