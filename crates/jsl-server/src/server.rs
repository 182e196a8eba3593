use crate::mcp::*;
use crate::session::Session;
use crate::tools::ToolRegistry;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Run the tool server: read JSON-RPC from stdin, write responses to stdout.
pub async fn run(session: Arc<Session>) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Tool server ready, reading from stdin");
    serve_session(session, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

/// Serve `session` until `reader` ends, then wait for every queued lint task
/// so none is cut short by shutdown.
pub async fn serve_session<R, W>(
    session: Arc<Session>,
    reader: R,
    writer: W,
) -> Result<(), Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let registry = ToolRegistry::new(Arc::clone(&session));
    let served = serve(reader, writer, &registry).await;
    let finished = session.drain().await;
    tracing::info!("Input closed; {finished} lint task(s) finished");
    served
}

/// One request per line in, one response per line out, until `reader` ends.
pub async fn serve<R, W>(
    reader: R,
    mut writer: W,
    registry: &ToolRegistry,
) -> Result<(), Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                let resp = JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {e}"));
                write_response(&mut writer, &resp).await?;
                continue;
            }
        };

        if let Some(resp) = handle_request(&request, registry).await {
            write_response(&mut writer, &resp).await?;
        }
    }

    Ok(())
}

async fn handle_request(req: &JsonRpcRequest, registry: &ToolRegistry) -> Option<JsonRpcResponse> {
    match req.method.as_str() {
        "initialize" => {
            let result = InitializeResult {
                protocol_version: PROTOCOL_VERSION,
                capabilities: ServerCapabilities {
                    tools: ToolsCapability {
                        list_changed: false,
                    },
                },
                server_info: ServerInfo {
                    name: "jsl-tools",
                    version: env!("CARGO_PKG_VERSION"),
                },
            };
            Some(JsonRpcResponse::from_serialize(req.id.clone(), &result))
        }

        // Notifications: no response expected
        "notifications/initialized" | "initialized" => None,

        "tools/list" => {
            let result = ToolsListResult {
                tools: registry.definitions(),
            };
            Some(JsonRpcResponse::from_serialize(req.id.clone(), &result))
        }

        "tools/call" => {
            let name = req.params.get("name").and_then(Value::as_str).unwrap_or("");
            let arguments = req
                .params
                .get("arguments")
                .cloned()
                .unwrap_or(Value::Object(serde_json::Map::new()));

            let result = registry.call(name, arguments).await;
            Some(JsonRpcResponse::from_serialize(req.id.clone(), &result))
        }

        _ => {
            tracing::debug!("Unknown method: {}", req.method);
            Some(JsonRpcResponse::error(
                req.id.clone(),
                METHOD_NOT_FOUND,
                format!("Method not found: {}", req.method),
            ))
        }
    }
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    resp: &JsonRpcResponse,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(resp)?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
