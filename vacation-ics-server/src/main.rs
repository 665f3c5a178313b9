use std::{env, io, sync::Arc};

use tokio::{net::TcpListener, signal};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vacation_ics::CalendarExporter;

mod cli;
mod routes;

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = cli::parse(env::args().collect());

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let exporter = Arc::new(CalendarExporter::new(args.branding));
    let product = exporter.branding().product_name.clone();
    let router = routes::router(exporter);

    let listener = TcpListener::bind(args.address).await?;
    info!(%product, "Listening at http://{}{}", args.address, routes::EXPORT_PATH);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(%err, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(%err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutting down");
}
