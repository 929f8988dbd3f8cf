//! List filtering: view option, search term and favorites-first ordering.

use super::item::{Board, DisplayItem, Template, Visibility};
use crate::favorites::FavoriteSet;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Which slice of the catalog the list shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum ViewOption {
    #[default]
    #[strum(to_string = "All Boards", serialize = "all")]
    AllBoards,
    #[strum(to_string = "Private Boards", serialize = "private")]
    PrivateBoards,
    #[strum(to_string = "Favorites", serialize = "favorites")]
    Favorites,
    #[strum(to_string = "Public Board", serialize = "public")]
    PublicBoard,
    #[strum(to_string = "Templates", serialize = "templates")]
    Templates,
}

impl ViewOption {
    /// The next option in menu order, wrapping around.
    pub fn next(self) -> Self {
        let options: Vec<ViewOption> = ViewOption::iter().collect();
        let index = options.iter().position(|o| *o == self).unwrap_or(0);
        options[(index + 1) % options.len()]
    }
}

/// Search term and view option. Lives only as long as the view does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSelection {
    pub search_term: String,
    pub selected_option: ViewOption,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListedItem {
    pub item: DisplayItem,
    pub is_favorite: bool,
}

/// Case-insensitive substring match. An empty term matches everything.
pub fn matches_search(name: &str, term: &str) -> bool {
    term.is_empty() || name.to_lowercase().contains(&term.to_lowercase())
}

fn templates_of(templates: &[Template]) -> impl Iterator<Item = DisplayItem> + '_ {
    templates.iter().cloned().map(DisplayItem::Template)
}

fn boards_where<'a>(
    boards: &'a [Board],
    keep: impl Fn(&Board) -> bool + 'a,
) -> impl Iterator<Item = DisplayItem> + 'a {
    boards
        .iter()
        .filter(move |b| keep(b))
        .cloned()
        .map(DisplayItem::Board)
}

/// Builds the list shown for `view`.
///
/// The result only ever contains fetched items. Outside the favorites view,
/// favorites come first and both groups keep their source order.
pub fn filter_items(
    templates: &[Template],
    boards: &[Board],
    favorites: &FavoriteSet,
    view: &ViewSelection,
) -> Vec<ListedItem> {
    let source: Vec<DisplayItem> = match view.selected_option {
        ViewOption::Templates => templates_of(templates).collect(),
        ViewOption::PublicBoard => {
            boards_where(boards, |b| b.visibility == Visibility::Public).collect()
        }
        ViewOption::PrivateBoards => {
            boards_where(boards, |b| b.visibility != Visibility::Public).collect()
        }
        ViewOption::Favorites => templates_of(templates)
            .chain(boards_where(boards, |_| true))
            .filter(|item| favorites.is_favorite(item.id()))
            .collect(),
        ViewOption::AllBoards => templates_of(templates)
            .chain(boards_where(boards, |_| true))
            .collect(),
    };

    let mut listed: Vec<ListedItem> = source
        .into_iter()
        .filter(|item| matches_search(item.display_name(), &view.search_term))
        .map(|item| ListedItem {
            is_favorite: favorites.is_favorite(item.id()),
            item,
        })
        .collect();

    if view.selected_option != ViewOption::Favorites {
        // sort_by_key is stable
        listed.sort_by_key(|l| !l.is_favorite);
    }
    listed
}
