//! Lazy provisioning of the continuation-token schema.
//!
//! Before the first `ETag` object can be stored, the directory must know the
//! type: one `ObjectTypeDescription`, an `AttributeTypeDescription` per token
//! attribute, and a `BindingDescription` tying each attribute to the type.
//! [`EtagSchema::ensure`] creates whatever is missing, exactly once per
//! process. Every step is a lookup followed by a create, and a create that
//! loses a race with another writer (`AlreadyExists`) is treated as success.

use crate::directory::{
    ATTRIBUTE_TYPE_DESCRIPTION, BINDING_DESCRIPTION, BOUND_ATTRIBUTE_TYPE, BOUND_OBJECT_TYPE,
    ClientError, DATA_TYPE, DESCRIPTION, DISPLAY_NAME, DirectoryClient, MULTIVALUED, NAME,
    OBJECT_TYPE_DESCRIPTION, REQUIRED,
};
use crate::error::{IdmError, IdmResult};
use crate::paging::etag::{ETAG_ATTRIBUTES, ETAG_OBJECT_TYPE};
use crate::query::SearchCriteria;
use crate::resource::{OBJECT_ID, Resource};
use log::{debug, info, warn};
use tokio::sync::OnceCell;

/// Directory identifiers of the provisioned token schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtagSchemaIds {
    pub object_type: String,
    /// `(attribute name, AttributeTypeDescription ObjectID)` in declaration order
    pub attributes: Vec<(String, String)>,
}

/// Single-flight guard around token schema provisioning.
///
/// Concurrent callers of [`ensure`](Self::ensure) wait on one provisioning
/// attempt. A failed attempt is not cached, so the next caller retries.
#[derive(Debug, Default)]
pub struct EtagSchema {
    provisioned: OnceCell<EtagSchemaIds>,
}

impl EtagSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether provisioning has already completed in this process.
    pub fn is_provisioned(&self) -> bool {
        self.provisioned.initialized()
    }

    /// Make sure the token schema exists, creating what is missing.
    pub async fn ensure<C: DirectoryClient>(&self, client: &C) -> IdmResult<&EtagSchemaIds> {
        self.provisioned
            .get_or_try_init(|| provision(client))
            .await
    }
}

async fn provision<C: DirectoryClient>(client: &C) -> IdmResult<EtagSchemaIds> {
    let object_type = ensure_object(
        client,
        format!(
            "/{}[{}='{}']",
            OBJECT_TYPE_DESCRIPTION, NAME, ETAG_OBJECT_TYPE
        ),
        Resource::new(OBJECT_TYPE_DESCRIPTION)
            .with_scalar(NAME, ETAG_OBJECT_TYPE)
            .with_scalar(DISPLAY_NAME, ETAG_OBJECT_TYPE)
            .with_scalar(DESCRIPTION, "Continuation token for resumable searches"),
    )
    .await?;

    let mut attributes = Vec::with_capacity(ETAG_ATTRIBUTES.len());
    for (name, data_type) in ETAG_ATTRIBUTES {
        let attribute = ensure_object(
            client,
            format!("/{}[{}='{}']", ATTRIBUTE_TYPE_DESCRIPTION, NAME, name),
            Resource::new(ATTRIBUTE_TYPE_DESCRIPTION)
                .with_scalar(NAME, name)
                .with_scalar(DISPLAY_NAME, name)
                .with_scalar(DATA_TYPE, data_type)
                .with_scalar(MULTIVALUED, "False"),
        )
        .await?;

        ensure_object(
            client,
            format!(
                "/{}[{}='{}' and {}='{}']",
                BINDING_DESCRIPTION, BOUND_OBJECT_TYPE, object_type, BOUND_ATTRIBUTE_TYPE, attribute
            ),
            Resource::new(BINDING_DESCRIPTION)
                .with_scalar(BOUND_OBJECT_TYPE, object_type.clone())
                .with_scalar(BOUND_ATTRIBUTE_TYPE, attribute.clone())
                .with_scalar(REQUIRED, "False"),
        )
        .await?;

        attributes.push((name.to_string(), attribute));
    }

    info!(
        "Continuation token schema ready ({} {} with {} attributes)",
        ETAG_OBJECT_TYPE,
        object_type,
        attributes.len()
    );

    Ok(EtagSchemaIds {
        object_type,
        attributes,
    })
}

/// Look an object up by filter, creating it when absent.
async fn ensure_object<C: DirectoryClient>(
    client: &C,
    filter: String,
    entry: Resource,
) -> IdmResult<String> {
    if let Some(id) = find_id(client, &filter).await? {
        debug!("Schema object already present: {}", filter);
        return Ok(id);
    }

    match client.create(entry).await {
        Ok(created) => {
            debug!("Created schema object: {}", filter);
            created.object_id().map(str::to_string).ok_or_else(|| {
                IdmError::SchemaProvisionFailure {
                    message: format!("directory assigned no ObjectID for {}", filter),
                    source: None,
                }
            })
        }
        Err(ClientError::AlreadyExists { message }) => {
            warn!(
                "Schema object {} was created concurrently ({}), using the existing one",
                filter, message
            );
            find_id(client, &filter).await?.ok_or_else(|| {
                IdmError::SchemaProvisionFailure {
                    message: format!("{} reported as existing but not found", filter),
                    source: None,
                }
            })
        }
        Err(error) => Err(IdmError::schema_provision(
            format!("could not create {}", filter),
            error,
        )),
    }
}

async fn find_id<C: DirectoryClient>(client: &C, filter: &str) -> IdmResult<Option<String>> {
    let criteria = SearchCriteria::new(filter).with_selection(vec![OBJECT_ID.to_string()]);
    let found = client
        .search(&criteria)
        .await
        .map_err(|e| IdmError::schema_provision(format!("could not look up {}", filter), e))?;
    Ok(found
        .first()
        .and_then(Resource::object_id)
        .map(str::to_string))
}
