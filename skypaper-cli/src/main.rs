use anyhow::Result;
use clap::{Parser, Subcommand};

use skypaper_core::ipc::{self, IpcRequest, IpcResponse};

#[derive(Parser)]
#[command(name = "skypaper", about = "Satellite-imagery wallpaper daemon")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show daemon status
    Status,
    /// Show the available satellite views
    Views,
    /// Set the active view and update the wallpaper
    View {
        /// View id from `skypaper views`
        id: String,
    },
    /// Update the wallpaper now
    Update,
    /// Stop the daemon
    Quit,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status => {
            let resp = send(IpcRequest::Status).await?;
            print_response(resp);
        }
        Commands::Views => {
            let resp = send(IpcRequest::GetConfig).await?;
            print_views(resp);
        }
        Commands::View { id } => {
            let resp = send(IpcRequest::SetView { view_id: id }).await?;
            print_response(resp);
        }
        Commands::Update => {
            let resp = send(IpcRequest::Update).await?;
            print_response(resp);
        }
        Commands::Quit => {
            let resp = send(IpcRequest::Quit).await?;
            print_response(resp);
        }
    }

    Ok(())
}

async fn send(request: IpcRequest) -> Result<IpcResponse> {
    ipc::send_request(&request)
        .await
        .map_err(|e| anyhow::anyhow!("{e}\nis skypaper-daemon running?"))
}

fn print_response(resp: IpcResponse) {
    match resp {
        IpcResponse::Ok { data: None } => println!("ok"),
        IpcResponse::Ok { data: Some(data) } => {
            println!("{}", serde_json::to_string_pretty(&data).unwrap_or_default());
        }
        IpcResponse::Error { message } => {
            eprintln!("error: {message}");
            std::process::exit(1);
        }
    }
}

fn print_views(resp: IpcResponse) {
    match resp {
        IpcResponse::Ok { data: Some(data) } => {
            let config = data.get("config").cloned().unwrap_or(serde_json::Value::Null);
            if config.is_null() {
                println!("no satellite configuration available");
                return;
            }
            let views = config
                .get("views")
                .and_then(|v| v.as_array())
                .cloned()
                .unwrap_or_default();
            for view in views {
                let id = view.get("id").and_then(|v| v.as_str()).unwrap_or("?");
                let name = view.get("name").and_then(|v| v.as_str()).unwrap_or("");
                println!("{id:<20} {name}");
            }
        }
        IpcResponse::Ok { data: None } => println!("no satellite configuration available"),
        IpcResponse::Error { message } => {
            eprintln!("error: {message}");
            std::process::exit(1);
        }
    }
}
