//! Searches and resumable paging.
//!
//! An unresumable search asks the directory for the complete result set. A
//! resumable search returns one page; when the directory reports more
//! results, the cursor is stored as an `ETag` object and its `ObjectID` is
//! returned as the continuation token, together with a link that resumes
//! the enumeration from an independent request.

use super::core::IdmServer;
use crate::directory::{ClientError, DirectoryClient, PagedResults};
use crate::error::{IdmError, IdmResult, ValidationError};
use crate::paging::{PagingContext, etag};
use crate::query::{SearchCriteria, Sorting, SortingAttribute};
use crate::resource::{OBJECT_ID, Resource, SELECT_ALL};
use log::{debug, info};

/// One page of search results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub resources: Vec<Resource>,
    /// Continuation token, present only when more results remain
    pub token: Option<String>,
    /// Absolute link resolving `token`
    pub next_link: Option<String>,
}

impl SearchPage {
    fn complete(resources: Vec<Resource>) -> Self {
        Self {
            resources,
            token: None,
            next_link: None,
        }
    }

    pub fn has_more(&self) -> bool {
        self.token.is_some()
    }
}

/// Check a token locally before it is used in any directory request.
fn validate_token(token: &str) -> Result<(), ValidationError> {
    if token.is_empty() {
        return Err(ValidationError::unrecognized_token(token, "token is empty"));
    }
    if !token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ValidationError::unrecognized_token(
            token,
            "token contains invalid characters",
        ));
    }
    Ok(())
}

impl<C: DirectoryClient> IdmServer<C> {
    /// Run a search.
    ///
    /// The page size comes from `criteria.page_size`. With `resumable` set
    /// only the first page is returned, plus a continuation link when the
    /// directory has more; otherwise every match is returned.
    pub async fn search(&self, criteria: SearchCriteria, resumable: bool) -> IdmResult<SearchPage> {
        if criteria.page_size == 0 {
            return Err(ValidationError::InvalidPageSize {
                value: criteria.page_size.to_string(),
            }
            .into());
        }

        let page_size = criteria.page_size;
        let selection = criteria.effective_selection();
        let mut criteria = criteria.with_selection(selection);

        if !resumable {
            let resources = self.client.search(&criteria).await?;
            debug!(
                "Search '{}' returned {} objects",
                criteria.filter,
                resources.len()
            );
            return Ok(SearchPage::complete(resources));
        }

        // Resumption runs as a new request, so the order must be pinned down.
        if criteria.sorting.is_empty() {
            criteria.sorting = Sorting {
                dialect: criteria.sorting.dialect.take(),
                attributes: vec![SortingAttribute::ascending(OBJECT_ID)],
            };
        }

        let results = self.client.search_paged(&criteria, page_size).await?;
        debug!(
            "Paged search '{}' returned {} objects (exhausted: {})",
            criteria.filter,
            results.resources.len(),
            results.is_exhausted()
        );
        self.finish_page(results).await
    }

    /// Continue an enumeration from a continuation token.
    pub async fn resume(&self, token: &str, page_size: usize) -> IdmResult<SearchPage> {
        if page_size == 0 {
            return Err(ValidationError::InvalidPageSize {
                value: page_size.to_string(),
            }
            .into());
        }

        let context = self.load_token(token).await?;
        debug!(
            "Resuming token {} at index {} of '{}'",
            token, context.current_index, context.filter
        );

        let results = match self.client.pull(&context, page_size).await {
            Ok(results) => results,
            Err(ClientError::Expired { expires }) => {
                info!("Continuation token {} expired at {}", token, expires);
                return Err(IdmError::TokenExpired { expires });
            }
            Err(error) => return Err(error.into()),
        };

        self.finish_page(results).await
    }

    /// Fetch and decode the cursor stored behind a continuation token.
    pub async fn load_token(&self, token: &str) -> IdmResult<PagingContext> {
        validate_token(token)?;

        let entry = match self
            .client
            .get_by_id(token, &[SELECT_ALL.to_string()])
            .await
        {
            Ok(entry) => entry,
            Err(ClientError::NotFound { .. }) => {
                return Err(IdmError::not_found(format!("continuation token {}", token)));
            }
            Err(error) => return Err(error.into()),
        };

        Ok(etag::decode(&entry)?)
    }

    /// Store a cursor and return its continuation token.
    ///
    /// The token schema is provisioned first; the token itself is only
    /// created once that has completed.
    pub async fn store_token(&self, context: &PagingContext) -> IdmResult<String> {
        self.etag_schema.ensure(&self.client).await?;

        let created = self.client.create(etag::encode(context)).await?;
        let token = created
            .object_id()
            .ok_or_else(|| IdmError::RemoteFault {
                message: "directory created a continuation token without an ObjectID".to_string(),
            })?
            .to_string();

        info!(
            "Stored continuation token {} at index {}",
            token, context.current_index
        );
        Ok(token)
    }

    async fn finish_page(&self, results: PagedResults) -> IdmResult<SearchPage> {
        let Some(context) = results.paging_context else {
            return Ok(SearchPage::complete(results.resources));
        };

        let token = self.store_token(&context).await?;
        let next_link = self.config.next_link(&token);
        Ok(SearchPage {
            resources: results.resources,
            token: Some(token),
            next_link: Some(next_link),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryDirectory;
    use crate::paging::ETAG_OBJECT_TYPE;

    async fn server_with_constants(count: usize) -> IdmServer<InMemoryDirectory> {
        let directory = InMemoryDirectory::with_object_types(["ConstantSpecifier"]);
        let constants = (0..count)
            .map(|i| {
                Resource::new("ConstantSpecifier").with_scalar("DisplayName", format!("C{:03}", i))
            })
            .collect();
        directory.seed(constants).await.unwrap();
        IdmServer::new(directory)
    }

    #[tokio::test]
    async fn test_unresumable_returns_everything() {
        let server = server_with_constants(12).await;
        let page = server
            .search(SearchCriteria::new("/ConstantSpecifier").with_page_size(5), false)
            .await
            .unwrap();
        assert_eq!(page.resources.len(), 12);
        assert!(!page.has_more());
        assert!(!server.is_token_schema_ready());
    }

    #[tokio::test]
    async fn test_single_page_mints_no_token() {
        let server = server_with_constants(3).await;
        let page = server
            .search(SearchCriteria::new("/ConstantSpecifier").with_page_size(5), true)
            .await
            .unwrap();
        assert_eq!(page.resources.len(), 3);
        assert_eq!(page.next_link, None);
        assert_eq!(server.client().count("/ETag").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_resumable_walks_all_pages() {
        let server = server_with_constants(12).await;
        let criteria = SearchCriteria::build(Some("/ConstantSpecifier"), Some("DisplayName"), None)
            .unwrap()
            .with_page_size(5);

        let mut page = server.search(criteria, true).await.unwrap();
        let mut seen = page.resources.len();
        while let Some(token) = page.token.clone() {
            assert_eq!(
                page.next_link.as_deref(),
                Some(format!("http://localhost:8088/api/etags/{}", token).as_str())
            );
            page = server.resume(&token, 5).await.unwrap();
            seen += page.resources.len();
        }

        assert_eq!(seen, 12);
        assert!(page.resources.iter().all(|r| r.contains("DisplayName")));
        assert_eq!(server.client().count("/ETag").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_default_sort_is_stored_with_token() {
        let server = server_with_constants(6).await;
        let page = server
            .search(SearchCriteria::new("/ConstantSpecifier").with_page_size(5), true)
            .await
            .unwrap();

        let context = server.load_token(page.token.as_deref().unwrap()).await.unwrap();
        assert_eq!(context.current_index, 5);
        assert_eq!(
            context.sorting.attributes,
            vec![SortingAttribute::ascending(OBJECT_ID)]
        );
        assert_eq!(context.selection, vec!["ObjectID", "ObjectType"]);
    }

    #[tokio::test]
    async fn test_resume_errors() {
        let server = server_with_constants(2).await;

        assert!(matches!(
            server.resume("not a token'", 5).await,
            Err(IdmError::Validation(ValidationError::UnrecognizedToken { .. }))
        ));
        assert!(matches!(
            server.resume("5f0e1c9a-0000-4000-8000-000000000000", 5).await,
            Err(IdmError::NotFound { .. })
        ));

        let person_id = server
            .client()
            .search(&SearchCriteria::new("/ConstantSpecifier"))
            .await
            .unwrap()[0]
            .object_id()
            .unwrap()
            .to_string();
        assert!(matches!(
            server.resume(&person_id, 5).await,
            Err(IdmError::Validation(ValidationError::UnrecognizedToken { .. }))
        ));
    }

    #[tokio::test]
    async fn test_expired_cursor() {
        let directory = InMemoryDirectory::with_object_types(["ConstantSpecifier"])
            .with_cursor_lifetime(chrono::Duration::seconds(-5));
        directory
            .seed(vec![Resource::new("ConstantSpecifier"); 3])
            .await
            .unwrap();
        let server = IdmServer::new(directory);

        let page = server
            .search(SearchCriteria::new("/ConstantSpecifier").with_page_size(1), true)
            .await
            .unwrap();
        let token = page.token.unwrap();

        // The stored token is still an ETag object.
        let entry = server
            .client()
            .get_by_id(&token, &[SELECT_ALL.to_string()])
            .await
            .unwrap();
        assert!(entry.is_type(ETAG_OBJECT_TYPE));

        assert!(matches!(
            server.resume(&token, 1).await,
            Err(IdmError::TokenExpired { .. })
        ));
    }
}
