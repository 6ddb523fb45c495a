//! Query façade
//!
//! Takes requests as loosely as the transport receives them, runs them
//! through the tree engine and pager, and turns every failure into a
//! localized message.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::IgnoredAny;

use tracing::{debug, error};

use crate::application::messages::{Locale, Message};
use crate::application::paging::{PageParams, PageRequest, PagingError};
use crate::application::services::TreeService;
use crate::application::{ApplicationError, ErrorKind};
use crate::config::PagingSettings;
use crate::domain::{DomainError, NodeId, NodeView};
use crate::infrastructure::traits::Caller;

/// A failed query: what went wrong, and what to tell the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl QueryFailure {
    pub fn new(kind: ErrorKind, message: &Message, locale: Locale) -> Self {
        Self {
            kind,
            message: message.render(locale),
        }
    }

    fn from_paging(err: PagingError, locale: Locale) -> Self {
        let message = match err {
            PagingError::InvalidPageNumber => Message::InvalidPageNumber,
            PagingError::InvalidPageSize => Message::InvalidPageSize,
        };
        Self::new(ErrorKind::InvalidArgument, &message, locale)
    }

    fn from_app(err: ApplicationError, locale: Locale) -> Self {
        let kind = err.kind();
        let message = match err {
            ApplicationError::Domain(DomainError::MissingNames(missing)) => {
                Message::MissingNames(missing)
            }
            ApplicationError::Domain(DomainError::UnknownLanguage(tag)) => {
                Message::UnknownLanguage(tag)
            }
            ApplicationError::InvalidArgument(_) => Message::MissingParams,
            ApplicationError::NotFound(_) => Message::NotFound,
            ApplicationError::Unauthorized => Message::NotAuthenticated,
            ApplicationError::Conflict { .. } => Message::Busy,
            other => {
                error!(error = %other, source = ?std::error::Error::source(&other), "query failed");
                return Self::new(ErrorKind::Internal, &Message::Unexpected, locale);
            }
        };
        Self::new(kind, &message, locale)
    }
}

pub type QueryResult<T> = Result<T, QueryFailure>;

/// One name as the client sent it. Anything but a string (`null`, a number)
/// counts as no name for that language.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(untagged)]
pub enum NameValue {
    Text(String),
    Other(IgnoredAny),
}

impl From<String> for NameValue {
    fn from(name: String) -> Self {
        NameValue::Text(name)
    }
}

/// Body of a node creation request.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct CreateNode {
    pub parent_id: Option<i64>,
    pub names: Option<BTreeMap<String, NameValue>>,
    /// Language of the returned node's display name
    pub language: Option<String>,
}

impl CreateNode {
    pub fn new(parent_id: i64, names: BTreeMap<String, String>) -> Self {
        Self {
            parent_id: Some(parent_id),
            names: Some(names.into_iter().map(|(l, n)| (l, n.into())).collect()),
            language: None,
        }
    }

    pub fn in_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Names that arrived as strings; the rest are left for validation to
    /// report as missing.
    fn text_names(&self) -> Option<BTreeMap<String, String>> {
        self.names.as_ref().map(|names| {
            names
                .iter()
                .filter_map(|(language, value)| match value {
                    NameValue::Text(name) => Some((language.clone(), name.clone())),
                    NameValue::Other(_) => None,
                })
                .collect()
        })
    }
}

pub struct QueryService {
    tree: Arc<TreeService>,
    paging: PagingSettings,
}

impl QueryService {
    pub fn new(tree: Arc<TreeService>, paging: PagingSettings) -> Self {
        Self { tree, paging }
    }

    pub fn tree(&self) -> &TreeService {
        &self.tree
    }

    /// One page of all nodes in pre-order.
    pub fn list_nodes(&self, language: Option<&str>, page: &PageParams) -> QueryResult<Vec<NodeView>> {
        let locale = Locale::for_request(language);
        let language = required(language, locale)?;

        let nodes = self
            .tree
            .list_all()
            .map_err(|e| QueryFailure::from_app(e, locale))?;
        let nodes = self.page(nodes, page, locale)?;
        self.tree
            .render(&nodes, language)
            .map_err(|e| QueryFailure::from_app(e, locale))
    }

    pub fn get_node(&self, id: i64, language: Option<&str>) -> QueryResult<Vec<NodeView>> {
        let locale = Locale::for_request(language);
        let language = required(language, locale)?;

        let node = self
            .tree
            .get_by_id(NodeId(id))
            .map_err(|e| QueryFailure::from_app(e, locale))?;
        Ok(vec![NodeView::new(&node, self.tree.resolve_name(&node, language))])
    }

    /// One page of the children of `id` whose name in `language` contains `keyword`.
    pub fn search_children(
        &self,
        id: i64,
        language: Option<&str>,
        keyword: Option<&str>,
        page: &PageParams,
    ) -> QueryResult<Vec<NodeView>> {
        let locale = Locale::for_request(language);
        let language = required(language, locale)?;
        let keyword = required(keyword, locale)?;

        let children = self
            .tree
            .search_children(NodeId(id), language, keyword)
            .map_err(|e| QueryFailure::from_app(e, locale))?;
        let children = self.page(children, page, locale)?;
        self.tree
            .render(&children, language)
            .map_err(|e| QueryFailure::from_app(e, locale))
    }

    /// Insert a node on behalf of an authenticated caller.
    pub fn create_node(&self, caller: Option<&Caller>, request: &CreateNode) -> QueryResult<Vec<NodeView>> {
        let language = request
            .language
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(self.tree.languages().fallback.as_str());
        let locale = Locale::for_request(Some(language));

        let Some(caller) = caller else {
            return Err(QueryFailure::from_app(ApplicationError::Unauthorized, locale));
        };
        // id 0 never names a node and is read as absent
        let parent_id = request.parent_id.filter(|id| *id != 0);
        let (Some(parent_id), Some(names)) = (parent_id, request.text_names()) else {
            return Err(QueryFailure::new(
                ErrorKind::InvalidArgument,
                &Message::MissingParams,
                locale,
            ));
        };
        if request.names.as_ref().is_some_and(BTreeMap::is_empty) {
            return Err(QueryFailure::new(
                ErrorKind::InvalidArgument,
                &Message::MissingParams,
                locale,
            ));
        }

        let node = self
            .tree
            .insert_child(NodeId(parent_id), &names)
            .map_err(|e| QueryFailure::from_app(e, locale))?;
        debug!(user = %caller.username, id = %node.id, "created node");
        Ok(vec![NodeView::new(&node, self.tree.resolve_name(&node, language))])
    }

    fn page<T>(&self, items: Vec<T>, params: &PageParams, locale: Locale) -> QueryResult<Vec<T>> {
        PageRequest::parse(params, &self.paging)
            .and_then(|page| page.apply(items))
            .map_err(|e| QueryFailure::from_paging(e, locale))
    }
}

fn required(value: Option<&str>, locale: Locale) -> QueryResult<&str> {
    value.filter(|v| !v.is_empty()).ok_or_else(|| {
        QueryFailure::new(ErrorKind::InvalidArgument, &Message::MissingParams, locale)
    })
}
