use serde::{Deserialize, Serialize};

use crate::error::{Result, SkypaperError};
use crate::models::Initiator;
use crate::paths::SkypaperPaths;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum IpcRequest {
    Status,
    GetConfig,
    SetView { view_id: String },
    Update,
    Quit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IpcResponse {
    Ok {
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<serde_json::Value>,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonStatus {
    pub running: bool,
    /// True while an update run is in flight.
    pub updating: bool,
    pub current_view: String,
    pub config_available: bool,
    pub last_initiator: Option<Initiator>,
    pub last_run: Option<String>,
    pub last_run_ok: Option<bool>,
}

impl IpcResponse {
    pub fn ok() -> Self {
        Self::Ok { data: None }
    }

    pub fn ok_with_data(data: serde_json::Value) -> Self {
        Self::Ok { data: Some(data) }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error {
            message: msg.into(),
        }
    }
}

/// Send a request to the daemon and receive a response.
pub async fn send_request(request: &IpcRequest) -> Result<IpcResponse> {
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::UnixStream;

    let socket_path = SkypaperPaths::socket_path();
    let stream = UnixStream::connect(&socket_path)
        .await
        .map_err(|e| SkypaperError::Ipc(format!("failed to connect to daemon: {e}")))?;

    let (reader, mut writer) = stream.into_split();

    let mut line = serde_json::to_string(request)?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.shutdown().await?;

    let mut buf_reader = BufReader::new(reader);
    let mut response_line = String::new();
    buf_reader.read_line(&mut response_line).await?;

    let response: IpcResponse = serde_json::from_str(response_line.trim())?;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialize() {
        let req = IpcRequest::Status;
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"command":"status"}"#);

        let req = IpcRequest::SetView {
            view_id: "east_pacific".into(),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains(r#""command":"set_view""#));
        assert!(json.contains(r#""view_id":"east_pacific""#));
    }

    #[test]
    fn test_request_deserialize() {
        let json = r#"{"command":"update"}"#;
        let req: IpcRequest = serde_json::from_str(json).unwrap();
        assert!(matches!(req, IpcRequest::Update));

        let json = r#"{"command":"set_view","view_id":"full_disk"}"#;
        let req: IpcRequest = serde_json::from_str(json).unwrap();
        assert!(matches!(req, IpcRequest::SetView { view_id } if view_id == "full_disk"));
    }

    #[test]
    fn test_response_serialize() {
        let resp = IpcResponse::ok();
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"status":"ok"}"#);

        let resp = IpcResponse::error("no config");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""status":"error""#));
        assert!(json.contains("no config"));
    }

    #[test]
    fn test_status_in_response_data() {
        let status = DaemonStatus {
            running: true,
            updating: false,
            current_view: "full_disk".into(),
            config_available: true,
            last_initiator: Some(Initiator::User),
            last_run: Some("2025-01-01T01:00:00Z".into()),
            last_run_ok: Some(true),
        };
        let data = serde_json::to_value(&status).unwrap();
        let resp = IpcResponse::ok_with_data(data);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("full_disk"));
        assert!(json.contains(r#""last_initiator":"user""#));
    }
}
