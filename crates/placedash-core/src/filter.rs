//! Filtering and pagination of fetched collections.
//!
//! Both steps are pure: the same records and filters always produce the same
//! page, in the order the records were fetched.

use serde::{Deserialize, Serialize};

use crate::models::Record;

/// Rows per page in list views.
pub const PAGE_SIZE: usize = 10;

/// Active list filters. Empty strings mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub search: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.user_id.is_empty()
    }

    /// Whether `record` passes both filters.
    pub fn matches(&self, record: &Record) -> bool {
        if !self.search.is_empty() && !matches_search(record, &self.search.to_lowercase()) {
            return false;
        }
        if !self.user_id.is_empty() && !matches_user_id(record, &self.user_id) {
            return false;
        }
        true
    }
}

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// First matching field wins; `needle_lower` must already be lowercase.
fn matches_search(record: &Record, needle_lower: &str) -> bool {
    match record {
        Record::User(u) => {
            contains_ignore_case(&u.firstname, needle_lower)
                || contains_ignore_case(&u.lastname, needle_lower)
                || contains_ignore_case(&u.email, needle_lower)
                || contains_ignore_case(&u.login.username, needle_lower)
        }
        Record::Post(p) => {
            contains_ignore_case(&p.title, needle_lower)
                || contains_ignore_case(&p.content, needle_lower)
        }
        Record::Comment(c) => contains_ignore_case(&c.comment, needle_lower),
        Record::Album(a) => contains_ignore_case(&a.title, needle_lower),
    }
}

/// Exact string comparison, so "4" does not match 40. Users are matched on
/// their own id.
fn matches_user_id(record: &Record, user_id: &str) -> bool {
    let owner = match record {
        Record::User(u) => u.id,
        _ => match record.user_id() {
            Some(id) => id,
            None => return false,
        },
    };
    owner.to_string() == user_id
}

/// Records passing `filters`, in input order.
pub fn filter_records<'a>(records: &'a [Record], filters: &FilterState) -> Vec<&'a Record> {
    if filters.is_empty() {
        return records.iter().collect();
    }
    records.iter().filter(|r| filters.matches(r)).collect()
}

/// One page of a filtered list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// Effective page after clamping, 1-based.
    pub page: usize,
    /// Zero when there are no items.
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<'_, T> {
    /// Index of the first item on this page within the filtered list.
    pub fn start_index(&self) -> usize {
        (self.page - 1) * PAGE_SIZE
    }
}

pub fn total_pages(total_items: usize) -> usize {
    total_items.div_ceil(PAGE_SIZE)
}

/// Clamp `requested` into `[1, max(total_pages, 1)]`.
pub fn clamp_page(requested: usize, total_pages: usize) -> usize {
    requested.clamp(1, total_pages.max(1))
}

/// Slice out page `requested` (1-based). Out-of-range requests get the
/// nearest valid page.
pub fn paginate<T>(items: &[T], requested: usize) -> Page<'_, T> {
    let total_pages = total_pages(items.len());
    let page = clamp_page(requested, total_pages);
    let start = ((page - 1) * PAGE_SIZE).min(items.len());
    let end = (start + PAGE_SIZE).min(items.len());
    Page {
        items: &items[start..end],
        page,
        total_pages,
        total_items: items.len(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Address, Album, Comment, Login, Post, User};

    fn user(id: i64, first: &str, last: &str, username: &str) -> Record {
        Record::User(User {
            id,
            firstname: first.to_string(),
            lastname: last.to_string(),
            email: format!("{}@example.com", username),
            birth_date: None,
            login: Login {
                uuid: format!("uuid-{}", id),
                username: username.to_string(),
                password: None,
                md5: None,
                sha1: None,
                registered: None,
            },
            address: Address {
                street: "1 Main St".to_string(),
                suite: None,
                city: "Springfield".to_string(),
                zipcode: "00000".to_string(),
                geo: None,
            },
            phone: None,
            website: None,
            company: None,
        })
    }

    fn post(id: i64, title: &str, content: &str, user_id: i64) -> Record {
        Record::Post(Post {
            id,
            slug: format!("post-{}", id),
            url: format!("https://example.com/posts/{}", id),
            title: title.to_string(),
            content: content.to_string(),
            image: None,
            thumbnail: None,
            status: "published".to_string(),
            category: "misc".to_string(),
            published_at: "2024-01-01".to_string(),
            updated_at: "2024-01-02".to_string(),
            user_id,
        })
    }

    fn comment(id: i64, user_id: i64, body: &str) -> Record {
        Record::Comment(Comment {
            id,
            post_id: 1,
            user_id,
            comment: body.to_string(),
        })
    }

    fn filters(search: &str, user_id: &str) -> FilterState {
        FilterState {
            search: search.to_string(),
            user_id: user_id.to_string(),
        }
    }

    fn posts(count: i64) -> Vec<Record> {
        (1..=count)
            .map(|id| post(id, &format!("Title {}", id), "body", id % 5))
            .collect()
    }

    fn ids(records: &[&Record]) -> Vec<i64> {
        records.iter().map(|r| r.id()).collect()
    }

    #[test]
    fn test_empty_filters_are_identity() {
        let records = posts(23);
        let filtered = filter_records(&records, &FilterState::default());
        assert_eq!(ids(&filtered), (1..=23).collect::<Vec<_>>());
    }

    #[test]
    fn test_filter_preserves_order_and_is_subset() {
        let records = posts(23);
        let filtered = filter_records(&records, &filters("", "2"));
        assert_eq!(ids(&filtered), vec![2, 7, 12, 17, 22]);
    }

    #[test]
    fn test_user_search_is_case_insensitive() {
        let records = vec![
            user(3, "Bob", "Stone", "bobs"),
            user(7, "Ana", "Lopez", "alopez"),
            user(9, "Carl", "Banana", "carl"),
        ];
        let filtered = filter_records(&records, &filters("ana", ""));
        assert_eq!(ids(&filtered), vec![7, 9]);

        let filtered = filter_records(&records, &filters("ALOPEZ", ""));
        assert_eq!(ids(&filtered), vec![7]);
    }

    #[test]
    fn test_user_id_filter_on_users_matches_own_id() {
        let records = vec![user(4, "A", "B", "ab"), user(40, "C", "D", "cd")];
        let filtered = filter_records(&records, &filters("", "4"));
        assert_eq!(ids(&filtered), vec![4]);
    }

    #[test]
    fn test_user_id_filter_is_exact_match() {
        let records = vec![comment(1, 4, "first"), comment(2, 40, "second"), comment(3, 4, "third")];
        let filtered = filter_records(&records, &filters("", "4"));
        assert_eq!(ids(&filtered), vec![1, 3]);
    }

    #[test]
    fn test_post_search_falls_back_to_content() {
        let records = vec![
            post(1, "Rust tips", "nothing here", 1),
            post(2, "Cooking", "a rusty pan", 1),
            post(3, "Gardening", "soil", 1),
        ];
        let filtered = filter_records(&records, &filters("rust", ""));
        assert_eq!(ids(&filtered), vec![1, 2]);
    }

    #[test]
    fn test_search_and_user_id_combine() {
        let records = vec![comment(1, 4, "great post"), comment(2, 5, "great"), comment(3, 4, "meh")];
        let filtered = filter_records(&records, &filters("GREAT", "4"));
        assert_eq!(ids(&filtered), vec![1]);
    }

    #[test]
    fn test_album_search_by_title() {
        let records = vec![
            Record::Album(Album { id: 1, title: "Summer Trip".to_string(), user_id: 1 }),
            Record::Album(Album { id: 2, title: "Winter".to_string(), user_id: 1 }),
        ];
        let filtered = filter_records(&records, &filters("summer", ""));
        assert_eq!(ids(&filtered), vec![1]);
    }

    #[test]
    fn test_paginate_third_page_of_23() {
        let records = posts(23);
        let page = paginate(&records, 3);
        assert_eq!(page.page, 3);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 23);
        assert_eq!(page.items.iter().map(|r| r.id()).collect::<Vec<_>>(), vec![21, 22, 23]);
        assert_eq!(page.start_index(), 20);
    }

    #[test]
    fn test_page_counts_and_last_page_sizes() {
        for len in 1..=35usize {
            let items: Vec<usize> = (0..len).collect();
            let pages = total_pages(len);
            assert_eq!(pages, (len + PAGE_SIZE - 1) / PAGE_SIZE);
            let last = paginate(&items, pages);
            let expected = if len % PAGE_SIZE == 0 { PAGE_SIZE } else { len % PAGE_SIZE };
            assert_eq!(last.items.len(), expected, "len {}", len);
        }
    }

    #[test]
    fn test_out_of_range_pages_clamp() {
        let records = posts(23);
        assert_eq!(paginate(&records, 0).page, 1);
        assert_eq!(paginate(&records, 0).items.len(), 10);
        let overflow = paginate(&records, 99);
        assert_eq!(overflow.page, 3);
        assert_eq!(overflow.items.len(), 3);
    }

    #[test]
    fn test_paginate_empty() {
        let items: Vec<i32> = Vec::new();
        let page = paginate(&items, 4);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }
}
