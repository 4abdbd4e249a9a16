type Result<T> = std::result::Result<T, Error>;
pub type Id = mongodb::bson::oid::ObjectId;

pub mod model {
    use serde::{Deserialize, Serialize};

    use super::Id;

    /// Listing projection. Products are owned by the marketplace catalog;
    /// only the name is needed for the chat list.
    #[derive(Serialize, Deserialize, Clone)]
    pub struct Product {
        #[serde(alias = "_id", skip_serializing_if = "Option::is_none")]
        pub id: Option<Id>,
        pub name: String,
    }
}

pub mod repository {
    use mongodb::bson::doc;

    use super::Id;
    use super::model::Product;

    const PRODUCTS_COLLECTION: &str = "products";

    #[derive(Clone)]
    pub struct ProductRepository {
        collection: mongodb::Collection<Product>,
    }

    impl ProductRepository {
        pub fn new(db: &mongodb::Database) -> Self {
            Self {
                collection: db.collection(PRODUCTS_COLLECTION),
            }
        }
    }

    impl ProductRepository {
        pub async fn find_name(&self, id: &Id) -> super::Result<Option<String>> {
            let product = self.collection.find_one(doc! {"_id": id}).await?;

            Ok(product.map(|p| p.name))
        }
    }
}

#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    _MongoDB(#[from] mongodb::error::Error),
}
