//! Zero-based paging over an already ordered sequence.

use serde::Deserialize;
use thiserror::Error;

use crate::config::PagingSettings;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingError {
    #[error("invalid page number requested")]
    InvalidPageNumber,
    #[error("invalid page size requested")]
    InvalidPageSize,
}

/// Paging parameters exactly as the caller sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageParams {
    pub page_num: Option<String>,
    pub page_size: Option<String>,
}

impl PageParams {
    pub fn new(page_num: Option<impl Into<String>>, page_size: Option<impl Into<String>>) -> Self {
        Self {
            page_num: page_num.map(Into::into),
            page_size: page_size.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_num: usize,
    /// Zero disables paging.
    pub page_size: usize,
}

impl PageRequest {
    pub fn parse(params: &PageParams, settings: &PagingSettings) -> Result<Self, PagingError> {
        let page_num = match params.page_num.as_deref() {
            None => 0,
            Some(raw) => parse_non_negative(raw).ok_or(PagingError::InvalidPageNumber)?,
        };
        let page_size = match params.page_size.as_deref() {
            None => settings.default_page_size,
            Some(raw) => parse_non_negative(raw)
                .filter(|size| *size <= settings.max_page_size)
                .ok_or(PagingError::InvalidPageSize)?,
        };
        Ok(Self {
            page_num,
            page_size,
        })
    }

    /// Cut the requested page out of `items`.
    ///
    /// A page past the end is an error, except the first page of an empty sequence.
    pub fn apply<T>(&self, items: Vec<T>) -> Result<Vec<T>, PagingError> {
        if self.page_size == 0 {
            return Ok(items);
        }
        if items.is_empty() && self.page_num == 0 {
            return Ok(items);
        }
        let start = self
            .page_num
            .checked_mul(self.page_size)
            .filter(|start| *start < items.len())
            .ok_or(PagingError::InvalidPageNumber)?;
        Ok(items
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .collect())
    }
}

fn parse_non_negative(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn settings() -> PagingSettings {
        PagingSettings::default()
    }

    #[test]
    fn given_no_params_when_parsing_then_defaults() {
        let page = PageRequest::parse(&PageParams::default(), &settings()).unwrap();
        assert_eq!(
            page,
            PageRequest {
                page_num: 0,
                page_size: 5
            }
        );
    }

    #[rstest]
    #[case("-1")]
    #[case("abc")]
    #[case("")]
    #[case("1.5")]
    fn given_bad_page_num_when_parsing_then_invalid_page_number(#[case] raw: &str) {
        let params = PageParams::new(Some(raw), None::<String>);
        assert_eq!(
            PageRequest::parse(&params, &settings()),
            Err(PagingError::InvalidPageNumber)
        );
    }

    #[rstest]
    #[case("-3")]
    #[case("1001")]
    #[case("many")]
    fn given_bad_page_size_when_parsing_then_invalid_page_size(#[case] raw: &str) {
        let params = PageParams::new(None::<String>, Some(raw));
        assert_eq!(
            PageRequest::parse(&params, &settings()),
            Err(PagingError::InvalidPageSize)
        );
    }

    #[rstest]
    #[case(0, 5, vec![0, 1, 2, 3, 4])]
    #[case(1, 5, vec![5, 6, 7, 8, 9])]
    #[case(2, 5, vec![10, 11])]
    #[case(0, 0, (0..12).collect())]
    #[case(0, 1000, (0..12).collect())]
    fn given_twelve_items_when_paging_then_expected_slice(
        #[case] page_num: usize,
        #[case] page_size: usize,
        #[case] expected: Vec<usize>,
    ) {
        let items: Vec<usize> = (0..12).collect();
        let page = PageRequest {
            page_num,
            page_size,
        };
        assert_eq!(page.apply(items).unwrap(), expected);
    }

    #[test]
    fn given_page_past_end_when_paging_then_invalid_page_number() {
        let page = PageRequest {
            page_num: 3,
            page_size: 5,
        };
        assert_eq!(
            page.apply((0..12).collect::<Vec<_>>()),
            Err(PagingError::InvalidPageNumber)
        );
    }

    #[test]
    fn given_empty_sequence_when_first_page_then_empty() {
        let page = PageRequest {
            page_num: 0,
            page_size: 5,
        };
        assert_eq!(page.apply(Vec::<u8>::new()).unwrap(), Vec::<u8>::new());
        let second = PageRequest {
            page_num: 1,
            page_size: 5,
        };
        assert_eq!(
            second.apply(Vec::<u8>::new()),
            Err(PagingError::InvalidPageNumber)
        );
    }
}
