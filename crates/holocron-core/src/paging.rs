//! Page arithmetic and the page-number strip shown under the results.

use serde::{Deserialize, Serialize};

use crate::person::PAGE_SIZE;

/// Pages shown in full before the strip collapses into ellipses.
const MAX_VISIBLE_PAGES: usize = 5;

/// Pages needed for `count` records; 0 when there are none.
pub fn total_pages(count: usize) -> usize { count.div_ceil(PAGE_SIZE) }

/// Index of the first record on `page` (1-based). Page 0 is treated as 1.
pub fn page_offset(page: usize) -> usize {
  page.saturating_sub(1) * PAGE_SIZE
}

pub fn has_previous(current: usize) -> bool { current > 1 }

pub fn has_next(current: usize, total: usize) -> bool { current < total }

/// One entry in the page-number strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "page", rename_all = "snake_case")]
pub enum PageLink {
  Page(usize),
  Ellipsis,
}

/// The page-number strip for `current` of `total`.
///
/// Up to five pages are listed in full. Beyond that the strip keeps the first
/// and last page plus the neighbours of `current`, with an ellipsis wherever
/// a run of pages is skipped.
pub fn page_window(current: usize, total: usize) -> Vec<PageLink> {
  if total <= MAX_VISIBLE_PAGES {
    return (1..=total).map(PageLink::Page).collect();
  }

  let mut links = vec![PageLink::Page(1)];
  let start = current.saturating_sub(1).max(2);
  let end = (current + 1).min(total - 1);

  if start > 2 {
    links.push(PageLink::Ellipsis);
  }
  links.extend((start..=end).map(PageLink::Page));
  if end < total - 1 {
    links.push(PageLink::Ellipsis);
  }
  links.push(PageLink::Page(total));
  links
}
