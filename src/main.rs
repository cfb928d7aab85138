#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = song_library::run_server().await {
        log::error!("server stopped: {:#}", e);
        return Err(e);
    }

    Ok(())
}
