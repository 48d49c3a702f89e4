//! Prediction through a running server

use anyhow::Result;
use difficulty_lib::Prediction;

use crate::client::ApiClient;
use crate::output::{print_prediction, OutputFormat};
use crate::StatementArgs;

pub async fn run(client: &ApiClient, statement: &StatementArgs, format: OutputFormat) -> Result<()> {
    let prediction: Prediction = client.post("predict", &statement.to_request()).await?;
    print_prediction(&prediction, format)
}
