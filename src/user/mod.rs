use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod model;
pub mod repository;

type Result<T> = std::result::Result<T, Error>;
pub type Id = mongodb::bson::oid::ObjectId;

/// The two marketplace roles a chat participant can have. Buyers live in the
/// `customers` collection, sellers in `sellers`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
}

impl Role {
    pub fn counterpart(self) -> Self {
        match self {
            Self::Buyer => Self::Seller,
            Self::Seller => Self::Buyer,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buyer => write!(f, "buyer"),
            Self::Seller => write!(f, "seller"),
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "buyer" => Ok(Self::Buyer),
            "seller" => Ok(Self::Seller),
            other => Err(Error::InvalidRole(other.to_owned())),
        }
    }
}

#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    #[error("invalid role: {0}")]
    InvalidRole(String),

    _MongoDB(#[from] mongodb::error::Error),
}
