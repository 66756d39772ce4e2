use crate::error::ServerError;
use crate::mcp::handle_request;
use crate::protocol::{
    INTERNAL_ERROR, LineFramer, Request, Response, decode_request, error_response, write_message,
};
use crate::tools::generate::PipelineGenerator;
use std::any::Any;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error};

const READ_CHUNK_SIZE: usize = 8 * 1024;

pub struct Server {
    generator: Arc<PipelineGenerator>,
    max_message_bytes: usize,
    max_in_flight: usize,
}

impl Server {
    pub fn new(
        generator: Arc<PipelineGenerator>,
        max_message_bytes: usize,
        max_in_flight: usize,
    ) -> Self {
        Self {
            generator,
            max_message_bytes,
            max_in_flight,
        }
    }

    /// Serves until `reader` reaches EOF. Handlers run one task per request,
    /// capped at `max_in_flight`; reading pauses while the cap is reached.
    pub async fn run<R, W>(&self, mut reader: R, writer: W) -> Result<(), ServerError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (response_tx, response_rx) = mpsc::unbounded_channel();
        let emitter = tokio::spawn(emit_responses(writer, response_rx));
        let permits = Arc::new(Semaphore::new(self.max_in_flight));
        let mut framer = LineFramer::new(self.max_message_bytes);
        let mut handlers = JoinSet::new();
        let mut chunk = vec![0_u8; READ_CHUNK_SIZE];

        let read_result = 'read: loop {
            let read = match reader.read(&mut chunk).await {
                Ok(0) => break Ok(()),
                Ok(n) => n,
                Err(err) => break Err(err),
            };

            for line in framer.push(&chunk[..read]) {
                let Some(request) = decode_request(&line) else {
                    continue;
                };
                let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                    break 'read Ok(());
                };
                handlers.spawn(dispatch(
                    request,
                    Arc::clone(&self.generator),
                    permit,
                    response_tx.clone(),
                ));
            }

            while handlers.try_join_next().is_some() {}

            if response_tx.is_closed() {
                // The writer stopped; its error is reported below.
                break Ok(());
            }
        };

        framer.finish();
        debug!(in_flight = handlers.len(), "input closed, draining handlers");
        while handlers.join_next().await.is_some() {}
        drop(response_tx);

        let emit_result = emitter.await?;
        read_result?;
        emit_result?;
        Ok(())
    }
}

async fn dispatch(
    request: Request,
    generator: Arc<PipelineGenerator>,
    permit: OwnedSemaphorePermit,
    responses: mpsc::UnboundedSender<Response>,
) {
    let _permit = permit;
    let id = request.id.clone();
    let method = request.method.clone();

    let handler = tokio::spawn(async move { handle_request(request, &generator).await });
    let response = match handler.await {
        Ok(response) => response,
        Err(err) => {
            error!(method = %method, error = %err, "request handler failed");
            error_response(id, INTERNAL_ERROR, failure_message(err))
        }
    };

    if responses.send(response).is_err() {
        debug!(method = %method, "writer has stopped, response dropped");
    }
}

fn failure_message(err: JoinError) -> String {
    if !err.is_panic() {
        return "Internal error".to_owned();
    }
    let payload = err.into_panic();
    panic_text(payload.as_ref())
        .unwrap_or("Internal error")
        .to_owned()
}

fn panic_text(payload: &(dyn Any + Send)) -> Option<&str> {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
}

async fn emit_responses<W: AsyncWrite + Unpin>(
    mut writer: W,
    mut responses: mpsc::UnboundedReceiver<Response>,
) -> io::Result<()> {
    while let Some(response) = responses.recv().await {
        write_message(&mut writer, &response).await?;
    }
    Ok(())
}
