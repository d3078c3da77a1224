use actix_web::HttpResponseBuilder;
use serde::Deserialize;

/// Response header carrying the number of records matching a paged query.
pub const TOTAL_RECORDS_HEADER: &str = "cantidadTotalRegistros";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: i64,
    records_per_page: i64,
}

impl Pagination {
    pub const MAX_RECORDS_PER_PAGE: i64 = 50;
    pub const DEFAULT_RECORDS_PER_PAGE: i64 = 10;

    /// Page numbers start at 1; the page size is clamped to
    /// `1..=MAX_RECORDS_PER_PAGE`.
    pub fn new(page: Option<i64>, records_per_page: Option<i64>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let records_per_page = records_per_page
            .unwrap_or(Self::DEFAULT_RECORDS_PER_PAGE)
            .clamp(1, Self::MAX_RECORDS_PER_PAGE);
        Self {
            page,
            records_per_page,
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn records_per_page(&self) -> i64 {
        self.records_per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.records_per_page)
    }

    /// Applies the page window to an already filtered sequence.
    #[cfg(test)]
    pub fn slice<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(usize::try_from(self.offset()).unwrap_or(usize::MAX))
            .take(self.records_per_page as usize)
            .collect()
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Raw `?pagina=&recordsPorPagina=` query parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationQuery {
    pub pagina: Option<i64>,
    pub records_por_pagina: Option<i64>,
}

impl From<PaginationQuery> for Pagination {
    fn from(value: PaginationQuery) -> Self {
        Pagination::new(value.pagina, value.records_por_pagina)
    }
}

/// One page of records plus the total count of matching records.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub total: i64,
    pub items: Vec<T>,
}

/// Header names are case-insensitive; `TOTAL_RECORDS_HEADER` is sent lowercased.
pub fn insert_total_records(builder: &mut HttpResponseBuilder, total: i64) {
    builder.insert_header((TOTAL_RECORDS_HEADER, total));
}
