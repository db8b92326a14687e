use clap::Parser;
use survey_desk::{db::Db, names, router, services::tokens::TokenKeys, AppState};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// SQLite database URL, e.g. sqlite://data/surveys.db
    #[clap(env)]
    database_url: String,

    /// Secret used to sign bearer tokens.
    #[clap(env)]
    jwt_secret: String,

    /// Bearer token lifetime in hours.
    #[arg(long, env, default_value_t = names::DEFAULT_TOKEN_TTL_HOURS)]
    token_ttl_hours: i64,

    /// The address to bind to.
    #[arg(short, long, env, default_value = "127.0.0.1:1414")]
    address: String,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "tracing=info,survey_desk=debug".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .init();

    let args = Args::parse();

    let db = Db::new(&args.database_url).await?;
    let tokens = TokenKeys::new(&args.jwt_secret, args.token_ttl_hours);
    let app = router(AppState::new(db, tokens));

    let address = args.address.parse::<std::net::SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(address).await?;
    tracing::info!("listening on {address}");
    axum::serve(listener, app).await?;

    Ok(())
}
