//! View state and its query-string form.
//!
//! List filters and the current page live in `ViewState`; a `Route` pairs that
//! with the resource being viewed. Both map to and from the location strings
//! accepted on the command line, e.g. `/dashboard/posts?search=rust&page=2`.

use thiserror::Error;
use url::form_urlencoded;

use crate::filter::FilterState;
use crate::models::ResourceKind;

const SEARCH_PARAM: &str = "search";
const USER_ID_PARAM: &str = "userId";
const PAGE_PARAM: &str = "page";

/// Path prefix the dashboard routes live under.
const DASHBOARD_PREFIX: &str = "dashboard";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RouteError {
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Unrecognized location: {0}")]
    Unrecognized(String),
}

/// Filters plus requested page for one list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub filters: FilterState,
    /// Requested page, 1-based. May exceed the page count until corrected.
    pub page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            filters: FilterState::default(),
            page: 1,
        }
    }
}

impl ViewState {
    /// Read `search`, `userId` and `page`. A leading `?` is ignored, the first
    /// occurrence of a parameter wins, and a missing or unusable page is 1.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut search = None;
        let mut user_id = None;
        let mut page = None;

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                SEARCH_PARAM if search.is_none() => search = Some(value.into_owned()),
                USER_ID_PARAM if user_id.is_none() => user_id = Some(value.into_owned()),
                PAGE_PARAM if page.is_none() => page = Some(parse_page(&value)),
                _ => {}
            }
        }

        Self {
            filters: FilterState {
                search: search.unwrap_or_default(),
                user_id: user_id.unwrap_or_default(),
            },
            page: page.unwrap_or(1),
        }
    }

    /// Inverse of `from_query`. Empty filters and page 1 are omitted.
    pub fn to_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if !self.filters.search.is_empty() {
            serializer.append_pair(SEARCH_PARAM, &self.filters.search);
        }
        if !self.filters.user_id.is_empty() {
            serializer.append_pair(USER_ID_PARAM, &self.filters.user_id);
        }
        if self.page > 1 {
            serializer.append_pair(PAGE_PARAM, &self.page.to_string());
        }
        serializer.finish()
    }

    /// Changing a filter always returns to the first page.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filters.search = search.into();
        self.page = 1;
    }

    pub fn set_user_id(&mut self, user_id: impl Into<String>) {
        self.filters.user_id = user_id.into();
        self.page = 1;
    }

    pub fn reset_filters(&mut self) {
        self.filters = FilterState::default();
        self.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Replace an out-of-range requested page with the clamped one. Nothing
    /// changes while the list is empty. Returns whether the page changed.
    pub fn correct_page(&mut self, effective: usize, total_pages: usize) -> bool {
        if self.page != effective && total_pages > 0 {
            self.page = effective;
            true
        } else {
            false
        }
    }
}

fn parse_page(raw: &str) -> usize {
    raw.trim().parse::<usize>().ok().filter(|&p| p > 0).unwrap_or(1)
}

/// A dashboard location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    List { kind: ResourceKind, view: ViewState },
    /// Raw segment and id, validated only when the record is resolved.
    Detail { segment: String, id: String },
}

impl Default for Route {
    fn default() -> Self {
        Route::List {
            kind: ResourceKind::Users,
            view: ViewState::default(),
        }
    }
}

impl Route {
    /// Parse `/dashboard/<resource>[/<id>][?query]`. The `/dashboard` prefix
    /// and leading slash are optional; an empty path is the users list.
    pub fn parse(location: &str) -> Result<Self, RouteError> {
        let (path, query) = match location.split_once('?') {
            Some((path, query)) => (path, query),
            None => (location, ""),
        };

        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.first() == Some(&DASHBOARD_PREFIX) {
            segments.remove(0);
        }

        match segments.as_slice() {
            [] => Ok(Route::List {
                kind: ResourceKind::Users,
                view: ViewState::from_query(query),
            }),
            [segment] => {
                let kind = ResourceKind::from_segment(segment)
                    .ok_or_else(|| RouteError::UnknownResource(segment.to_string()))?;
                Ok(Route::List {
                    kind,
                    view: ViewState::from_query(query),
                })
            }
            [segment, id] => Ok(Route::Detail {
                segment: segment.to_string(),
                id: id.to_string(),
            }),
            _ => Err(RouteError::Unrecognized(location.to_string())),
        }
    }

    pub fn to_location(&self) -> String {
        match self {
            Route::List { kind, view } => {
                let query = view.to_query();
                if query.is_empty() {
                    format!("/{}/{}", DASHBOARD_PREFIX, kind.segment())
                } else {
                    format!("/{}/{}?{}", DASHBOARD_PREFIX, kind.segment(), query)
                }
            }
            Route::Detail { segment, id } => format!("/{}/{}/{}", DASHBOARD_PREFIX, segment, id),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_query_reads_all_params() {
        let view = ViewState::from_query("?search=ana%20maria&userId=4&page=3");
        assert_eq!(view.filters.search, "ana maria");
        assert_eq!(view.filters.user_id, "4");
        assert_eq!(view.page, 3);
    }

    #[test]
    fn test_from_query_defaults() {
        assert_eq!(ViewState::from_query(""), ViewState::default());
        assert_eq!(ViewState::from_query("page=0").page, 1);
        assert_eq!(ViewState::from_query("page=-2").page, 1);
        assert_eq!(ViewState::from_query("page=abc").page, 1);
    }

    #[test]
    fn test_first_param_wins() {
        let view = ViewState::from_query("search=a&search=b&page=2&page=5");
        assert_eq!(view.filters.search, "a");
        assert_eq!(view.page, 2);
    }

    #[test]
    fn test_to_query_omits_defaults() {
        assert_eq!(ViewState::default().to_query(), "");

        let mut view = ViewState::default();
        view.set_search("rust & go");
        view.set_page(2);
        assert_eq!(view.to_query(), "search=rust+%26+go&page=2");

        view.set_page(1);
        assert_eq!(view.to_query(), "search=rust+%26+go");
    }

    #[test]
    fn test_query_round_trip() {
        let mut view = ViewState::default();
        view.set_user_id("7");
        view.set_search("Ana");
        view.set_page(4);
        assert_eq!(ViewState::from_query(&view.to_query()), view);
    }

    #[test]
    fn test_filter_changes_reset_page() {
        let mut view = ViewState::from_query("page=3");
        view.set_search("x");
        assert_eq!(view.page, 1);

        view.set_page(3);
        view.set_user_id("2");
        assert_eq!(view.page, 1);

        view.set_page(3);
        view.reset_filters();
        assert_eq!(view, ViewState::default());
    }

    #[test]
    fn test_correct_page() {
        let mut view = ViewState::from_query("page=9");
        assert!(view.correct_page(3, 3));
        assert_eq!(view.page, 3);
        assert_eq!(view.to_query(), "page=3");

        // empty list leaves the requested page alone
        let mut view = ViewState::from_query("page=9");
        assert!(!view.correct_page(1, 0));
        assert_eq!(view.page, 9);

        // clamping down to page 1 drops the parameter
        let mut view = ViewState::from_query("page=4");
        assert!(view.correct_page(1, 1));
        assert_eq!(view.to_query(), "");
    }

    #[test]
    fn test_route_parse_variants() {
        assert_eq!(Route::parse("").unwrap(), Route::default());
        assert_eq!(Route::parse("/").unwrap(), Route::default());

        let route = Route::parse("/dashboard/posts?search=rust&page=2").unwrap();
        match route {
            Route::List { kind, view } => {
                assert_eq!(kind, ResourceKind::Posts);
                assert_eq!(view.filters.search, "rust");
                assert_eq!(view.page, 2);
            }
            other => panic!("unexpected route {:?}", other),
        }

        assert_eq!(
            Route::parse("albums/12").unwrap(),
            Route::Detail { segment: "albums".to_string(), id: "12".to_string() }
        );
        // detail input is kept raw
        assert_eq!(
            Route::parse("/dashboard/photos/abc").unwrap(),
            Route::Detail { segment: "photos".to_string(), id: "abc".to_string() }
        );
    }

    #[test]
    fn test_route_parse_errors() {
        assert_eq!(
            Route::parse("/dashboard/photos"),
            Err(RouteError::UnknownResource("photos".to_string()))
        );
        assert!(matches!(Route::parse("users/1/extra"), Err(RouteError::Unrecognized(_))));
    }

    #[test]
    fn test_route_to_location() {
        let route = Route::parse("comments?userId=4").unwrap();
        assert_eq!(route.to_location(), "/dashboard/comments?userId=4");
        assert_eq!(Route::default().to_location(), "/dashboard/users");
        assert_eq!(Route::parse("users/3").unwrap().to_location(), "/dashboard/users/3");
    }
}
