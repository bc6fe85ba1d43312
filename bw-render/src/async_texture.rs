use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use bw_texture::TextMeasurer;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::lifecycle::{BatchResult, TextureBatch};

/// Off-frame texture synthesis. Batches go in through `job_tx`, finished
/// batches come back on `result_rx`; cancelled batches never come back.
#[derive(Resource)]
pub struct TextureWorker {
    pub runtime: Arc<Runtime>,
    pub job_tx: UnboundedSender<TextureBatch>,
    pub result_rx: Mutex<UnboundedReceiver<BatchResult>>,
}

impl TextureWorker {
    pub fn spawn(measurer: Arc<dyn TextMeasurer>) -> std::io::Result<Self> {
        let runtime = Arc::new(Runtime::new()?);
        let (job_tx, mut job_rx) = unbounded_channel::<TextureBatch>();
        let (result_tx, result_rx) = unbounded_channel::<BatchResult>();
        let runtime_clone = runtime.clone();

        runtime.spawn(async move {
            while let Some(batch) = job_rx.recv().await {
                let result_tx = result_tx.clone();
                let measurer = measurer.clone();
                runtime_clone.spawn_blocking(move || {
                    if let Some(result) = batch.synthesize(measurer.as_ref()) {
                        let _ = result_tx.send(result);
                    }
                });
            }
        });

        Ok(Self {
            runtime,
            job_tx,
            result_rx: Mutex::new(result_rx),
        })
    }
}
