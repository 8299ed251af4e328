use std::num::NonZeroUsize;

use log::debug;

use crate::catalog::query::{CatalogQueryConfig, Selection, SortMode};

/// Query selection owned by one displayed catalog view.
///
/// Changing the category (from navigation or in the view) resets subcategory, color
/// and page. Changing subcategory or color resets the page. Changing the sort keeps
/// the page. The engine itself never clamps pages, so every facet change here
/// returns to page 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    config: CatalogQueryConfig,
}

impl QueryState {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self {
            config: CatalogQueryConfig::with_page_size(page_size),
        }
    }

    pub fn config(&self) -> &CatalogQueryConfig {
        &self.config
    }

    /// Applies an externally driven category, e.g. a `?category=` route parameter.
    /// `None` means the route carries no category.
    pub fn navigate(&mut self, category: Option<&str>) {
        let category = category.map_or(Selection::All, Selection::from);
        debug!("Navigated to category {}", category);
        self.reset_category(category);
    }

    pub fn select_category(&mut self, category: impl Into<Selection>) {
        self.reset_category(category.into());
    }

    pub fn select_subcategory(&mut self, subcategory: impl Into<Selection>) {
        self.config.subcategory = subcategory.into();
        self.config.page = 1;
    }

    pub fn select_color(&mut self, color: impl Into<Selection>) {
        self.config.color = color.into();
        self.config.page = 1;
    }

    pub fn select_sort(&mut self, sort: SortMode) {
        self.config.sort = sort;
    }

    pub fn go_to_page(&mut self, page: u32) {
        self.config.page = page.max(1);
    }

    /// Moves forward one page, stopping at `total_pages`.
    pub fn next_page(&mut self, total_pages: usize) {
        let last = u32::try_from(total_pages).unwrap_or(u32::MAX).max(1);
        if self.config.page < last {
            self.config.page += 1;
        }
    }

    /// Moves back one page, stopping at 1.
    pub fn previous_page(&mut self) {
        self.config.page = self.config.page.saturating_sub(1).max(1);
    }

    /// Resets every facet and the page; the sort mode stays.
    pub fn clear_filters(&mut self) {
        self.reset_category(Selection::All);
    }

    fn reset_category(&mut self, category: Selection) {
        self.config.category = category;
        self.config.subcategory = Selection::All;
        self.config.color = Selection::All;
        self.config.page = 1;
    }
}
