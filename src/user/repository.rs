use mongodb::bson::doc;

use super::model::User;
use super::{Id, Role};

const CUSTOMERS_COLLECTION: &str = "customers";
const SELLERS_COLLECTION: &str = "sellers";

#[derive(Clone)]
pub struct UserRepository {
    customers: mongodb::Collection<User>,
    sellers: mongodb::Collection<User>,
}

impl UserRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            customers: db.collection(CUSTOMERS_COLLECTION),
            sellers: db.collection(SELLERS_COLLECTION),
        }
    }
}

impl UserRepository {
    /// A missing account yields `None` rather than an error so that chat
    /// listings survive deleted counterparts.
    pub async fn find_name(&self, id: &Id, role: Role) -> super::Result<Option<String>> {
        let col = match role {
            Role::Buyer => &self.customers,
            Role::Seller => &self.sellers,
        };

        let user = col.find_one(doc! {"_id": id}).await?;

        Ok(user.map(|u| u.name))
    }
}
