use crate::config::cli::Commands;
use redisai_client_rs::converters::{decode_blob, values_from_strs};
use redisai_client_rs::prelude::*;
use serde::Serialize;
use serde_json::json;

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|err| err.to_string())
}

fn done(reply: Option<()>) -> Result<String, String> {
    Ok(reply.map_or("QUEUED", |_| "OK").to_string())
}

fn missing(key: &str) -> String {
    format!("no reply for {key}")
}

/// Run one command against the server and render its result for the terminal
pub async fn run_command(client: &mut AiClient, command: Commands) -> Result<String, String> {
    match command {
        Commands::TensorSet(args) => {
            let reply = if args.values.is_empty() {
                client.tensor_set_meta(&args.key, args.dtype, &args.shape).await
            } else {
                let data =
                    values_from_strs(args.dtype, &args.values).map_err(|err| err.to_string())?;
                client
                    .tensor_set(&args.key, args.dtype, &args.shape, data)
                    .await
            };
            done(reply.map_err(|err| err.to_string())?)
        }
        Commands::TensorGet(args) => {
            let mut tensor = client
                .tensor_get(&args.key, args.format)
                .await
                .map_err(|err| err.to_string())?
                .ok_or_else(|| missing(&args.key))?;
            // show blobs as typed values, raw bytes are of little use on a terminal
            if let Some(TensorData::Blob(bytes)) = &tensor.data {
                let decoded = decode_blob(tensor.dtype, bytes).map_err(|err| err.to_string())?;
                tensor.data = Some(decoded);
            }
            to_json(&tensor)
        }
        Commands::ModelGet(args) => {
            let mut model = client
                .model_get(&args.key)
                .await
                .map_err(|err| err.to_string())?
                .ok_or_else(|| missing(&args.key))?;
            let blob_size = model.blob.take().map(|blob| blob.len());
            to_json(&json!({ "model": model, "blob_size": blob_size }))
        }
        Commands::ModelDel(args) => done(
            client
                .model_del(&args.key)
                .await
                .map_err(|err| err.to_string())?,
        ),
        Commands::ModelExecute(args) => {
            let inputs: Vec<&str> = args.inputs.iter().map(String::as_str).collect();
            let outputs: Vec<&str> = args.outputs.iter().map(String::as_str).collect();
            done(
                client
                    .model_execute(&args.key, &inputs, &outputs, args.timeout)
                    .await
                    .map_err(|err| err.to_string())?,
            )
        }
        Commands::ScriptGet(args) => {
            let script = client
                .script_get(&args.key)
                .await
                .map_err(|err| err.to_string())?
                .ok_or_else(|| missing(&args.key))?;
            to_json(&script)
        }
        Commands::ScriptDel(args) => done(
            client
                .script_del(&args.key)
                .await
                .map_err(|err| err.to_string())?,
        ),
        Commands::Info(args) if args.reset_stat => done(
            client
                .reset_stat(&args.key)
                .await
                .map_err(|err| err.to_string())?,
        ),
        Commands::Info(args) => {
            let info = client
                .info(&args.key)
                .await
                .map_err(|err| err.to_string())?
                .ok_or_else(|| missing(&args.key))?;
            to_json(&info)
        }
        Commands::LoadBackend(args) => done(
            client
                .load_backend(args.backend, &args.path)
                .await
                .map_err(|err| err.to_string())?,
        ),
    }
}
