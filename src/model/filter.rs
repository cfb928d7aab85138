use crate::model::{reject_nul, InvalidPayload, Song};

pub const DEFAULT_OFFSET: i64 = 0;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Optional exact-match predicates for listing songs.
///
/// Present predicates are AND-combined. `None` and the empty string both
/// mean "no constraint" on that column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SongFilter {
    pub group: Option<String>,
    pub title: Option<String>,
    pub release_date: Option<String>,
    pub link: Option<String>,
}

impl SongFilter {
    pub fn by_group(group: impl Into<String>) -> Self {
        Self {
            group: Some(group.into()),
            ..Self::default()
        }
    }

    pub fn and_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn and_release_date(mut self, release_date: impl Into<String>) -> Self {
        self.release_date = Some(release_date.into());
        self
    }

    pub fn and_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Active predicates as `(column, value)` pairs
    pub fn predicates(&self) -> Vec<(&'static str, &str)> {
        [
            ("group", &self.group),
            ("title", &self.title),
            ("release_date", &self.release_date),
            ("link", &self.link),
        ]
        .into_iter()
        .filter_map(|(column, value)| match value.as_deref() {
            Some(v) if !v.is_empty() => Some((column, v)),
            _ => None,
        })
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates().is_empty()
    }

    pub fn validate(&self) -> Result<(), InvalidPayload> {
        self.predicates()
            .into_iter()
            .try_for_each(|(column, value)| reject_nul(column, value))
    }

    pub fn matches(&self, song: &Song) -> bool {
        self.predicates().into_iter().all(|(column, value)| {
            let field = match column {
                "group" => &song.group,
                "title" => &song.title,
                "release_date" => &song.release_date,
                _ => &song.link,
            };
            field == value
        })
    }
}

/// Offset/limit pagination window. No upper bound is placed on `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: DEFAULT_OFFSET,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Page {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }

    /// Build a page from raw query-string values.
    ///
    /// Absent, unparsable, negative offsets and non-positive sizes fall
    /// back to the defaults without being reported as client errors.
    pub fn from_params(offset: Option<&str>, page_size: Option<&str>) -> Self {
        let offset = offset
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|offset| *offset >= 0)
            .unwrap_or(DEFAULT_OFFSET);
        let limit = page_size
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Self { offset, limit }
    }

    /// Slice an already-filtered, ordered collection
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let start = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let len = usize::try_from(self.limit).unwrap_or(0);
        items.iter().skip(start).take(len).cloned().collect()
    }
}

/// One page of results plus the number of rows matching the filter
#[derive(Debug, Clone, PartialEq)]
pub struct SongPage {
    pub songs: Vec<Song>,
    pub total: i64,
}
