//! Paging requests and results

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Fields, Filter, Sort};

/// A page request: window, plus optional sort, filter, projection and
/// distinct field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pageable {
    page: u64,
    size: u64,
    #[serde(default)]
    sort: Option<Sort>,
    #[serde(default)]
    filter: Option<Filter>,
    #[serde(default)]
    fields: Option<Fields>,
    #[serde(default)]
    distinct: Option<Fields>,
}

impl Pageable {
    /// Page numbers start at 1. A size below 1 is clamped to 1.
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page,
            size: size.max(1),
            ..Default::default()
        }
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn with_distinct(mut self, distinct: Fields) -> Self {
        self.distinct = Some(distinct);
        self
    }

    pub fn page_number(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.size.max(1)
    }

    pub fn sort(&self) -> Option<&Sort> {
        self.sort.as_ref()
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub fn fields(&self) -> Option<&Fields> {
        self.fields.as_ref()
    }

    pub fn distinct(&self) -> Option<&Fields> {
        self.distinct.as_ref()
    }

    /// Documents skipped before the page; page 0 behaves like page 1
    pub fn offset(&self) -> u64 {
        self.page_size().saturating_mul(self.page.saturating_sub(1))
    }

    pub fn limit(&self) -> u64 {
        self.page_size()
    }
}

/// What a page holds
#[derive(Debug, Clone, PartialEq)]
pub enum PageContent<E> {
    Entities(Vec<E>),
    /// Distinct values of one field
    Values(Vec<Value>),
}

impl<E> PageContent<E> {
    pub fn len(&self) -> usize {
        match self {
            PageContent::Entities(items) => items.len(),
            PageContent::Values(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq)]
pub struct Page<E> {
    content: PageContent<E>,
    total_elements: u64,
    page_number: u64,
    total_pages: u64,
    sort: Option<Sort>,
    filter: Option<Filter>,
    fields: Option<Fields>,
}

impl<E> Page<E> {
    pub fn new(content: PageContent<E>, total_elements: u64, page_number: u64, total_pages: u64) -> Self {
        Self {
            content,
            total_elements,
            page_number,
            total_pages,
            sort: None,
            filter: None,
            fields: None,
        }
    }

    /// Echoes the request's sort, filter and fields
    pub(crate) fn echoing(mut self, pageable: &Pageable) -> Self {
        self.sort = pageable.sort.clone();
        self.filter = pageable.filter.clone();
        self.fields = pageable.fields.clone();
        self
    }

    pub fn content(&self) -> &PageContent<E> {
        &self.content
    }

    pub fn into_content(self) -> PageContent<E> {
        self.content
    }

    /// Entities on the page; empty for distinct pages
    pub fn entities(&self) -> &[E] {
        match &self.content {
            PageContent::Entities(items) => items,
            PageContent::Values(_) => &[],
        }
    }

    /// Distinct values on the page; empty for entity pages
    pub fn values(&self) -> &[Value] {
        match &self.content {
            PageContent::Values(values) => values,
            PageContent::Entities(_) => &[],
        }
    }

    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    pub fn page_number(&self) -> u64 {
        self.page_number
    }

    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    pub fn sort(&self) -> Option<&Sort> {
        self.sort.as_ref()
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub fn fields(&self) -> Option<&Fields> {
        self.fields.as_ref()
    }
}

/// `ceil(total / size)`, with size clamped to 1
pub fn total_pages(total: u64, size: u64) -> u64 {
    total.div_ceil(size.max(1))
}
