use soundboard::logging::init_logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let app = soundboard::App::new().await?;
    app.run().await?;

    Ok(())
}
