use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use skypaper_core::ipc::{IpcRequest, IpcResponse};
use skypaper_core::models::Initiator;
use skypaper_core::paths::SkypaperPaths;

use crate::update::DaemonCommand;

pub async fn serve_ipc(
    cmd_tx: mpsc::Sender<DaemonCommand>,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let socket_path = SkypaperPaths::socket_path();

    // clean up stale socket
    if socket_path.exists() {
        std::fs::remove_file(&socket_path)?;
    }

    let listener = UnixListener::bind(&socket_path)?;
    info!(path = %socket_path.display(), "IPC socket listening");

    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, _)) => {
                        let tx = cmd_tx.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, tx).await {
                                warn!("IPC connection error: {e}");
                            }
                        });
                    }
                    Err(e) => warn!("IPC accept error: {e}"),
                }
            }
            _ = shutdown.changed() => {
                info!("IPC server shutting down");
                let _ = std::fs::remove_file(&socket_path);
                return Ok(());
            }
        }
    }
}

async fn handle_connection(
    stream: tokio::net::UnixStream,
    cmd_tx: mpsc::Sender<DaemonCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut buf_reader = BufReader::new(reader);
    let mut line = String::new();
    buf_reader.read_line(&mut line).await?;

    let request: IpcRequest = match serde_json::from_str(line.trim()) {
        Ok(r) => r,
        Err(e) => {
            let resp = IpcResponse::error(format!("invalid request: {e}"));
            let mut resp_line = serde_json::to_string(&resp)?;
            resp_line.push('\n');
            writer.write_all(resp_line.as_bytes()).await?;
            return Ok(());
        }
    };

    let response = dispatch_request(request, &cmd_tx).await;

    let mut resp_line = serde_json::to_string(&response)?;
    resp_line.push('\n');
    writer.write_all(resp_line.as_bytes()).await?;
    Ok(())
}

async fn dispatch_request(
    request: IpcRequest,
    cmd_tx: &mpsc::Sender<DaemonCommand>,
) -> IpcResponse {
    match request {
        IpcRequest::Status => {
            let (tx, rx) = oneshot::channel();
            if cmd_tx.send(DaemonCommand::Status { respond: tx }).await.is_err() {
                return IpcResponse::error("engine unavailable");
            }
            match rx.await {
                Ok(status) => {
                    IpcResponse::ok_with_data(serde_json::to_value(status).unwrap_or_default())
                }
                Err(_) => IpcResponse::error("engine dropped response"),
            }
        }
        IpcRequest::GetConfig => {
            let (tx, rx) = oneshot::channel();
            if cmd_tx
                .send(DaemonCommand::GetConfig { respond: tx })
                .await
                .is_err()
            {
                return IpcResponse::error("engine unavailable");
            }
            match rx.await {
                // explicit "config": null when nothing is available
                Ok(config) => {
                    let value = match config {
                        Some(config) => {
                            serde_json::to_value(&*config).unwrap_or_default()
                        }
                        None => serde_json::Value::Null,
                    };
                    IpcResponse::ok_with_data(serde_json::json!({ "config": value }))
                }
                Err(_) => IpcResponse::error("engine dropped response"),
            }
        }
        IpcRequest::SetView { view_id } => {
            let _ = cmd_tx.send(DaemonCommand::SetView { view_id }).await;
            IpcResponse::ok()
        }
        IpcRequest::Update => {
            let _ = cmd_tx
                .send(DaemonCommand::Update {
                    initiator: Initiator::User,
                })
                .await;
            IpcResponse::ok()
        }
        IpcRequest::Quit => {
            let _ = cmd_tx.send(DaemonCommand::Quit).await;
            IpcResponse::ok()
        }
    }
}
