use std::sync::Arc;

use tracing::{debug, info};

use crate::args::ConnectArgs;
use crate::error::{AppError, AppResult, ConfigError};
use crate::session::{
    JsonFileRoutineStore, MemoryRoutineStore, RoutineStore, SessionOptions, connect,
};
use crate::shutdown::{setup_signal_shutdown_handler, shutdown_channel};

enum Exit {
    Closed(AppResult<()>),
    Shutdown,
}

/// Opens a session and logs every published state change until the runtime
/// hangs up or the process is interrupted.
///
/// # Errors
///
/// Returns an error when no URL is configured, the connection fails, or the
/// session ends with a transport error.
pub async fn run_connect(args: ConnectArgs) -> AppResult<()> {
    let url = args
        .url
        .ok_or_else(|| AppError::config(ConfigError::MissingServerUrl))?;
    let store: Arc<dyn RoutineStore> = match args.routine_store {
        Some(path) => {
            debug!("Persisting routines to {}", path.display());
            Arc::new(JsonFileRoutineStore::new(path))
        }
        None => Arc::new(MemoryRoutineStore::new()),
    };
    let options = SessionOptions {
        query_timeout: args.query_timeout,
        ..SessionOptions::default()
    };

    let (client, mut handle) = connect(&url, store, options).await?;
    if args.fetch_frame {
        client.request_frame(None)?;
    }

    let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
    let signal_task = setup_signal_shutdown_handler(&shutdown_tx);

    let state = client.state();
    let mut screen = state.subscribe_screen();
    let mut frames = state.subscribe_frames();
    let mut routine = state.subscribe_routine();
    let mut runtime = state.subscribe_runtime();

    let exit = loop {
        tokio::select! {
            result = handle.closed() => break Exit::Closed(result),
            _ = shutdown_rx.recv() => break Exit::Shutdown,
            Ok(()) = screen.changed() => {
                if let Some(dimensions) = *screen.borrow_and_update() {
                    info!("Screen is {}x{}", dimensions.width, dimensions.height);
                }
            }
            Ok(()) = frames.changed() => {
                let count = frames.borrow_and_update().len();
                info!("Received {} frames", count);
            }
            Ok(()) = routine.changed() => {
                let current = routine.borrow_and_update();
                info!(
                    "Routine '{}' synced: {} nodes, {} edges",
                    current.name,
                    current.nodes.len(),
                    current.edges.len()
                );
            }
            Ok(()) = runtime.changed() => {
                let context = *runtime.borrow_and_update();
                info!(
                    "Runtime at node {:?}, edge {:?}",
                    context.current_node, context.current_edge
                );
            }
        }
    };

    match exit {
        Exit::Closed(result) => {
            drop(shutdown_tx.send(()));
            signal_task.await?;
            info!("Runtime closed the session");
            if client.pending_queries() > 0 {
                debug!("{} condition queries left unanswered", client.pending_queries());
            }
            result
        }
        Exit::Shutdown => {
            info!("Shutting down session");
            handle.shutdown();
            signal_task.await?;
            Ok(())
        }
    }
}
