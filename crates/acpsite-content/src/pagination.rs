//! Previous/next links and breadcrumb trails.

use serde::Serialize;

use acpsite_mdx::{format_title, DOCS_PREFIX};

use crate::navigation::{NavItem, NavSection};
use crate::source::doc_href;

/// Title of the first breadcrumb.
pub const ROOT_CRUMB: &str = "Docs";

/// Neighbours of a document in navigation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub prev: Option<NavItem>,
    pub next: Option<NavItem>,
}

/// Find the items before and after `current_href` in the flattened tree.
///
/// Both sides are empty when the href is not listed.
pub fn paginate(sections: &[NavSection], current_href: &str) -> Pagination {
    let items: Vec<&NavItem> = sections.iter().flat_map(|s| s.items.iter()).collect();

    let Some(index) = items.iter().position(|item| item.href == current_href) else {
        return Pagination::default();
    };

    Pagination {
        prev: index.checked_sub(1).map(|i| items[i].clone()),
        next: items.get(index + 1).map(|item| (*item).clone()),
    }
}

/// One link in a breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub title: String,
    pub href: String,
}

impl Breadcrumb {
    fn new(title: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            href: href.into(),
        }
    }
}

/// Breadcrumb trail for a document.
///
/// Starts at the docs root, adds one crumb per parent segment titled from the
/// segment name, and ends with the document itself.
pub fn breadcrumbs(slug: &[String], title: &str) -> Vec<Breadcrumb> {
    let mut crumbs = vec![Breadcrumb::new(ROOT_CRUMB, DOCS_PREFIX)];

    let Some((last, parents)) = slug.split_last() else {
        return crumbs;
    };

    let mut href = DOCS_PREFIX.to_string();
    for segment in parents {
        href.push('/');
        href.push_str(segment);
        crumbs.push(Breadcrumb::new(format_title(segment), href.clone()));
    }

    let title = if title.trim().is_empty() {
        format_title(last)
    } else {
        title.to_string()
    };
    crumbs.push(Breadcrumb::new(title, doc_href(slug)));

    crumbs
}
