//! Remote document store on PostgreSQL `jsonb`.

use chrono::Utc;
use ndiambour_core::store::{Document, DocumentStore, ID_FIELD, StoreError, document_id_or_new};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr,
};
use serde_json::Value;
use tracing::debug;

use crate::entities::documents;

/// Document store backed by the `documents` table.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    db: DatabaseConnection,
}

impl PgDocumentStore {
    /// Create a new store on an open connection.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying connection.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

fn backend(err: &DbErr) -> StoreError {
    StoreError::backend(err.to_string())
}

fn into_document(model: documents::Model) -> Result<Document, StoreError> {
    match model.data {
        Value::Object(mut doc) => {
            doc.insert(ID_FIELD.to_string(), Value::from(model.id));
            Ok(doc)
        }
        _ => Err(StoreError::Codec(format!(
            "document {}/{} is not an object",
            model.collection, model.id
        ))),
    }
}

fn into_documents(models: Vec<documents::Model>) -> Result<Vec<Document>, StoreError> {
    models.into_iter().map(into_document).collect()
}

/// SQL and parameters merging `patch` into `data`.
///
/// Non-null fields are merged with `||`; null fields are removed with `-`.
fn merge_expression(patch: Document) -> (String, Vec<sea_orm::Value>) {
    let (removed, kept): (Vec<_>, Vec<_>) = patch
        .into_iter()
        .filter(|(field, _)| field != ID_FIELD)
        .partition(|(_, value)| value.is_null());

    let mut sql = String::from("(data || ?::jsonb)");
    let mut values = vec![sea_orm::Value::from(Value::Object(kept.into_iter().collect()))];
    for (field, _) in removed {
        sql.push_str(" - ?");
        values.push(sea_orm::Value::from(field));
    }
    (sql, values)
}

impl DocumentStore for PgDocumentStore {
    async fn create(&self, collection: &str, mut doc: Document) -> Result<String, StoreError> {
        let id = document_id_or_new(&doc);
        doc.insert(ID_FIELD.to_string(), Value::from(id.clone()));
        let now = Utc::now();

        let model = documents::ActiveModel {
            collection: Set(collection.to_string()),
            id: Set(id.clone()),
            data: Set(Value::Object(doc)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        match model.insert(&self.db).await {
            Ok(_) => Ok(id),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(StoreError::duplicate(collection, id))
            }
            Err(e) => Err(backend(&e)),
        }
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        documents::Entity::find_by_id((collection.to_string(), id.to_string()))
            .one(&self.db)
            .await
            .map_err(|e| backend(&e))?
            .map(into_document)
            .transpose()
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let models = documents::Entity::find()
            .filter(documents::Column::Collection.eq(collection))
            .order_by_asc(documents::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| backend(&e))?;
        into_documents(models)
    }

    async fn query_equals(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        // Containment hits the GIN index but only means equality for scalars.
        let condition = if value.is_array() || value.is_object() {
            Expr::cust_with_values(
                "data -> ? = ?::jsonb",
                [sea_orm::Value::from(field), sea_orm::Value::from(value.clone())],
            )
        } else {
            let mut probe = Document::new();
            probe.insert(field.to_string(), value.clone());
            Expr::cust_with_values(
                "data @> ?::jsonb",
                [sea_orm::Value::from(Value::Object(probe))],
            )
        };

        let models = documents::Entity::find()
            .filter(documents::Column::Collection.eq(collection))
            .filter(condition)
            .order_by_asc(documents::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| backend(&e))?;
        into_documents(models)
    }

    async fn update(&self, collection: &str, id: &str, patch: Document) -> Result<(), StoreError> {
        let (sql, values) = merge_expression(patch);

        let result = documents::Entity::update_many()
            .col_expr(documents::Column::Data, Expr::cust_with_values(sql, values))
            .col_expr(documents::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(documents::Column::Collection.eq(collection))
            .filter(documents::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| backend(&e))?;

        if result.rows_affected == 0 {
            return Err(StoreError::missing(collection, id));
        }
        debug!(collection, id, "Document updated");
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        documents::Entity::delete_many()
            .filter(documents::Column::Collection.eq(collection))
            .filter(documents::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| backend(&e))?;
        Ok(())
    }
}
