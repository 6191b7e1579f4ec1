use lambda_runtime::{service_fn, Error, LambdaEvent};
use range_sync_core::contract::SyncResponse;
use range_sync_lambda::adapters::feed::HttpRangeFeed;
use range_sync_lambda::adapters::firewall::Ec2FirewallApi;
use range_sync_lambda::handlers::sync::handle_sync_event;
use serde_json::Value;

async fn handle_request(event: LambdaEvent<Value>) -> Result<SyncResponse, Error> {
    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let firewall = Ec2FirewallApi::new(aws_sdk_ec2::Client::new(&config));
    let feed = HttpRangeFeed::new();

    handle_sync_event(event.payload, &feed, &firewall).map_err(|error| Error::from(error.message))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
