use axum::http::{HeaderMap, HeaderValue, header::LINK};

use super::criteria::CriteriaError;
use super::sort::SortOrder;

/// Page size limits applied to every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    pub default_size: u64,
    pub max_size: u64,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_size: 20,
            max_size: 2000,
        }
    }
}

/// A requested page: zero-based `page`, `size` records, ordered by `sort`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
    pub sort: Vec<SortOrder>,
}

impl PageRequest {
    #[must_use]
    pub const fn new(page: u64, size: u64) -> Self {
        Self {
            page,
            size,
            sort: Vec::new(),
        }
    }

    #[must_use]
    pub fn sorted_by(mut self, order: SortOrder) -> Self {
        self.sort.push(order);
        self
    }

    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }

    /// Read `page`, `size` and repeated `sort` parameters. Other keys are
    /// ignored. `size` is clamped to `1..=max_size`.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::InvalidParameter`] when `page` or `size` is
    /// not a non-negative integer, or when the page starts beyond the
    /// largest offset the store accepts.
    pub fn from_query_pairs(
        pairs: &[(String, String)],
        config: &PagingConfig,
    ) -> Result<Self, CriteriaError> {
        let parse = |name: &str, value: &str| {
            value
                .trim()
                .parse::<u64>()
                .map_err(|_| CriteriaError::InvalidParameter {
                    name: name.to_string(),
                    value: value.to_string(),
                })
        };

        let mut request = Self::new(0, config.default_size);
        for (key, value) in pairs {
            match key.as_str() {
                "page" => request.page = parse(key, value)?,
                "size" => request.size = parse(key, value)?,
                "sort" => request.sort.extend(SortOrder::parse(value)),
                _ => {}
            }
        }
        request.size = request.size.clamp(1, config.max_size.max(1));
        let addressable = request
            .page
            .checked_mul(request.size)
            .is_some_and(|offset| i64::try_from(offset).is_ok());
        if !addressable {
            return Err(CriteriaError::InvalidParameter {
                name: "page".to_string(),
                value: request.page.to_string(),
            });
        }
        Ok(request)
    }
}

/// One page of results together with the total across all pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub number: u64,
    pub size: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        if self.size == 0 {
            0
        } else {
            self.total_elements.div_ceil(self.size)
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            number: self.number,
            size: self.size,
        }
    }
}

/// Sanitize resource name by removing control characters for HTTP headers
fn sanitize_resource_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .collect()
}

/// `Content-Range` value for a page, e.g. `cars 20-39/57`.
#[must_use]
pub fn content_range(offset: u64, returned: u64, total_count: u64, resource_name: &str) -> String {
    let safe_name = sanitize_resource_name(resource_name);
    let end = if returned == 0 {
        offset
    } else {
        offset.saturating_add(returned - 1)
    };
    format!("{safe_name} {offset}-{end}/{total_count}")
}

/// `Link` header value with `first`, `prev`, `next` and `last` relations.
///
/// `query` holds the original request parameters; `page` and `size` are
/// replaced, every other pair is kept.
#[must_use]
pub fn link_header<T>(base_path: &str, query: &[(String, String)], page: &Page<T>) -> String {
    let retained: String = query
        .iter()
        .filter(|(k, _)| k != "page" && k != "size")
        .map(|(k, v)| {
            format!(
                "{}={}&",
                url_escape::encode_component(k),
                url_escape::encode_component(v)
            )
        })
        .collect();
    let link = |number: u64, rel: &str| {
        format!(
            "<{base_path}?{retained}page={number}&size={}>; rel=\"{rel}\"",
            page.size
        )
    };

    let last = page.total_pages().saturating_sub(1);
    let mut links = Vec::with_capacity(4);
    if page.number < last {
        links.push(link(page.number + 1, "next"));
    }
    if page.number > 0 {
        links.push(link(page.number - 1, "prev"));
    }
    links.push(link(last, "last"));
    links.push(link(0, "first"));
    links.join(",")
}

/// `X-Total-Count`, `Content-Range` and `Link` headers for a page.
#[must_use]
pub fn pagination_headers<T>(
    resource_name: &str,
    base_path: &str,
    query: &[(String, String)],
    page: &Page<T>,
) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("x-total-count", HeaderValue::from(page.total_elements));

    let offset = page.number.saturating_mul(page.size);
    let range = content_range(offset, page.content.len() as u64, page.total_elements, resource_name);
    if let Ok(value) = HeaderValue::from_str(&range) {
        headers.insert("content-range", value);
    }
    if let Ok(value) = HeaderValue::from_str(&link_header(base_path, query, page)) {
        headers.insert(LINK, value);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn page_of(number: u64, size: u64, total: u64, returned: usize) -> Page<u64> {
        Page {
            content: vec![0; returned],
            total_elements: total,
            number,
            size,
        }
    }

    #[test]
    fn test_page_request_defaults_and_clamping() {
        let config = PagingConfig::default();
        let request = PageRequest::from_query_pairs(&[], &config).unwrap();
        assert_eq!(request, PageRequest::new(0, 20));

        let huge = PageRequest::from_query_pairs(&pairs(&[("size", "100000")]), &config).unwrap();
        assert_eq!(huge.size, 2000);

        let zero = PageRequest::from_query_pairs(&pairs(&[("size", "0")]), &config).unwrap();
        assert_eq!(zero.size, 1);
    }

    #[test]
    fn test_page_request_reads_sort_and_rejects_garbage() {
        let config = PagingConfig::default();
        let request = PageRequest::from_query_pairs(
            &pairs(&[("page", "2"), ("sort", "dailyPrice,desc"), ("sort", "id")]),
            &config,
        )
        .unwrap();
        assert_eq!(request.page, 2);
        assert_eq!(request.offset(), 40);
        assert_eq!(
            request.sort,
            vec![SortOrder::desc("dailyPrice"), SortOrder::asc("id")]
        );

        let err = PageRequest::from_query_pairs(&pairs(&[("page", "-1")]), &config).unwrap_err();
        assert!(matches!(err, CriteriaError::InvalidParameter { .. }));
    }

    #[test]
    fn test_page_beyond_largest_offset_is_rejected() {
        let config = PagingConfig::default();
        let page_of_size_20 = |page: u64| {
            let page = page.to_string();
            PageRequest::from_query_pairs(
                &pairs(&[("page", page.as_str()), ("size", "20")]),
                &config,
            )
        };

        let err = page_of_size_20(u64::MAX).unwrap_err();
        assert_eq!(
            err,
            CriteriaError::InvalidParameter {
                name: "page".into(),
                value: u64::MAX.to_string(),
            }
        );

        let last = i64::MAX.unsigned_abs() / 20;
        assert_eq!(page_of_size_20(last).unwrap().page, last);
        assert!(page_of_size_20(last + 1).is_err());
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(page_of(0, 20, 0, 0).total_pages(), 0);
        assert_eq!(page_of(0, 20, 20, 20).total_pages(), 1);
        assert_eq!(page_of(0, 20, 21, 20).total_pages(), 2);
    }

    #[test]
    fn test_content_range() {
        assert_eq!(content_range(0, 10, 100, "users"), "users 0-9/100");
        assert_eq!(content_range(40, 0, 0, "cars"), "cars 40-40/0");
        assert_eq!(
            content_range(0, 1, 1, "cars\r\nInjected: evil"),
            "carsInjected: evil 0-0/1"
        );
    }

    #[test]
    fn test_link_header_middle_page() {
        let page = page_of(1, 10, 35, 10);
        let link = link_header("/api/cars", &pairs(&[("brandId.equals", "3"), ("page", "1")]), &page);
        assert_eq!(
            link,
            "</api/cars?brandId.equals=3&page=2&size=10>; rel=\"next\",\
             </api/cars?brandId.equals=3&page=0&size=10>; rel=\"prev\",\
             </api/cars?brandId.equals=3&page=3&size=10>; rel=\"last\",\
             </api/cars?brandId.equals=3&page=0&size=10>; rel=\"first\""
        );
    }

    #[test]
    fn test_headers_present() {
        let headers = pagination_headers("brands", "/api/brands", &[], &page_of(0, 20, 3, 3));
        assert_eq!(headers.get("X-Total-Count").unwrap(), "3");
        assert_eq!(headers.get("Content-Range").unwrap(), "brands 0-2/3");
        assert!(headers.get(LINK).unwrap().to_str().unwrap().contains("rel=\"first\""));
    }
}
