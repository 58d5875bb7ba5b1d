use clap::Parser;
use fire_calc::api::{Cli, Command, render_json, run_coast, run_http_server, run_mortgage};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,fire_calc=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn exit_with(msg: &str) -> ! {
    eprintln!("{msg}");
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let rendered = match cli.command {
        Command::Serve { port } => {
            if let Err(e) = run_http_server(port).await {
                exit_with(&format!("Server error: {e}"));
            }
            return;
        }
        Command::Coast(args) => run_coast(&args)
            .map_err(|e| e.message())
            .and_then(|response| render_json(&response)),
        Command::Mortgage(args) => run_mortgage(&args)
            .map_err(|e| e.message())
            .and_then(|response| render_json(&response)),
    };

    match rendered {
        Ok(json) => println!("{json}"),
        Err(msg) => exit_with(&msg),
    }
}
