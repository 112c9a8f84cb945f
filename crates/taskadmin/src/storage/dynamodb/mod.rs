//! DynamoDB artifact store using `aws-sdk-dynamodb`.

mod conversions;
mod error;
mod keys;
mod repository;

pub use repository::DynamoDbArtifactRepository;
