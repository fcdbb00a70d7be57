//! DynamoDB client construction.

use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::Client;

/// Connection settings for the DynamoDB backend.
///
/// `endpoint_url` points the client at DynamoDB Local or another compatible
/// endpoint; credentials always come from the default provider chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsConfig {
    pub endpoint_url: Option<String>,
    pub region: String,
}

pub async fn create_client(config: &AwsConfig) -> Client {
    let loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()));
    let loader = match config.endpoint_url.as_deref() {
        Some(endpoint) => loader.endpoint_url(endpoint),
        None => loader,
    };

    Client::new(&loader.load().await)
}
