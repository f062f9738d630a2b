use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use crate::dispatch::DrawOutcome;
use crate::engine::{SurfacingEngine, DEFAULT_CHANNEL_CAPACITY};
use crate::errors::SurfacingError;
use crate::events::{EngineEvent, ShellCommand};
use crate::surface::{SurfaceHandle, SurfaceId, SurfaceSize};

/// Command loop for shells that deliver surface events and draw requests from
/// different threads or tasks.
///
/// Commands are applied to the engine one at a time, in arrival order.
pub struct SurfacingHost {
    engine: SurfacingEngine,
    /// Taken by the first [`start`](Self::start).
    channel: Option<(mpsc::Sender<ShellCommand>, mpsc::Receiver<ShellCommand>)>,
}

impl SurfacingHost {
    pub fn new(engine: SurfacingEngine) -> Self {
        let channel = mpsc::channel::<ShellCommand>(DEFAULT_CHANNEL_CAPACITY);
        Self { engine, channel: Some(channel) }
    }

    pub fn is_started(&self) -> bool {
        self.channel.is_none()
    }

    /// Spawns the command loop on the current tokio runtime. A host starts at
    /// most once; later calls fail with [`SurfacingError::HostAlreadyRunning`].
    pub fn start(&mut self) -> Result<(HostHandle, JoinHandle<()>), SurfacingError> {
        let (cmd_tx, cmd_rx) = self.channel.take().ok_or(SurfacingError::HostAlreadyRunning)?;

        // Only handles keep the channel open.
        let handle = HostHandle { cmd_tx, engine: self.engine.clone() };
        let join_handle = tokio::spawn(run(self.engine.clone(), cmd_rx));

        Ok((handle, join_handle))
    }
}

/// Runs until [`ShellCommand::Shutdown`] arrives or every handle is dropped,
/// then tears down whatever is still bound.
async fn run(engine: SurfacingEngine, mut cmd_rx: mpsc::Receiver<ShellCommand>) {
    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            ShellCommand::SurfaceAvailable { surface } => engine.on_surface_available(surface),
            ShellCommand::SurfaceResized { id, size } => engine.on_surface_resized(id, size.width, size.height),
            ShellCommand::SurfaceDestroyed { id, reply } => {
                let ack = engine.on_surface_destroyed(id);
                let _ = reply.send(ack);
            }
            ShellCommand::SelectionChanged { index } => engine.on_selection_changed(index),
            ShellCommand::DrawRequested => {
                engine.on_draw_requested();
            }
            ShellCommand::Shutdown => break,
        }
    }

    log::debug!(target: "surfacing", "host loop finished");
    engine.shutdown();
}

/// Cloneable sender side of a running [`SurfacingHost`].
#[derive(Clone)]
pub struct HostHandle {
    cmd_tx: mpsc::Sender<ShellCommand>,
    engine: SurfacingEngine,
}

impl std::fmt::Debug for HostHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostHandle")
            .field("cmd_tx", &self.cmd_tx)
            .finish()
    }
}

impl HostHandle {
    pub fn subscribe_events(&self) -> broadcast::Receiver<EngineEvent> {
        self.engine.subscribe_events()
    }

    /// Direct access to the engine, e.g. to draw synchronously from a render thread.
    pub fn engine(&self) -> &SurfacingEngine {
        &self.engine
    }

    async fn send(&self, cmd: ShellCommand) -> Result<(), SurfacingError> {
        self.cmd_tx.send(cmd).await.map_err(|_| SurfacingError::ChannelClosed)
    }

    pub async fn surface_available(&self, surface: SurfaceHandle) -> Result<(), SurfacingError> {
        self.send(ShellCommand::SurfaceAvailable { surface }).await
    }

    pub async fn surface_resized(&self, id: SurfaceId, size: SurfaceSize) -> Result<(), SurfacingError> {
        self.send(ShellCommand::SurfaceResized { id, size }).await
    }

    /// Waits until the host has torn down the binding and acknowledged.
    pub async fn surface_destroyed(&self, id: SurfaceId) -> Result<bool, SurfacingError> {
        let (tx, rx) = oneshot::channel();
        self.send(ShellCommand::SurfaceDestroyed { id, reply: tx }).await?;
        rx.await.map_err(|_| SurfacingError::ChannelClosed)
    }

    pub async fn select(&self, index: usize) -> Result<(), SurfacingError> {
        self.send(ShellCommand::SelectionChanged { index }).await
    }

    pub async fn request_draw(&self) -> Result<(), SurfacingError> {
        self.send(ShellCommand::DrawRequested).await
    }

    /// Draws on the calling task, bypassing the queue.
    pub fn draw_now(&self) -> DrawOutcome {
        self.engine.on_draw_requested()
    }

    pub async fn shutdown(&self) -> Result<(), SurfacingError> {
        self.send(ShellCommand::Shutdown).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SurfacingConfig;
    use crate::testing::{Call, Recorder};

    fn host(backends: usize) -> (SurfacingHost, Recorder) {
        let recorder = Recorder::new();
        let cfg = SurfacingConfig::builder().mirror_to_log(false).build().unwrap();
        let engine = SurfacingEngine::with_registry(cfg, recorder.registry(backends));
        (SurfacingHost::new(engine), recorder)
    }

    #[tokio::test]
    async fn commands_are_applied_in_order() {
        let (mut host, recorder) = host(2);
        let (handle, join) = host.start().unwrap();

        let surface = SurfaceHandle::new(SurfaceSize::new(8, 8));
        handle.surface_available(surface).await.unwrap();
        handle.select(1).await.unwrap();
        handle.request_draw().await.unwrap();
        assert!(handle.surface_destroyed(surface.id()).await.unwrap());

        handle.shutdown().await.unwrap();
        join.await.unwrap();

        assert_eq!(
            recorder.calls(),
            vec![
                Call::Init { backend: 0, size: SurfaceSize::new(8, 8) },
                Call::Teardown { backend: 0 },
                Call::Init { backend: 1, size: SurfaceSize::new(8, 8) },
                Call::Render { backend: 1, color: crate::render::FRAME_PALETTE[0] },
                Call::Teardown { backend: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn dropping_handles_ends_loop_and_tears_down() {
        let (mut host, recorder) = host(1);
        let (handle, join) = host.start().unwrap();

        let surface = SurfaceHandle::new(SurfaceSize::new(4, 4));
        handle.surface_available(surface).await.unwrap();
        handle.surface_resized(surface.id(), SurfaceSize::new(2, 2)).await.unwrap();
        drop(handle);
        join.await.unwrap();

        assert_eq!(recorder.live(), 0);
        assert_eq!(recorder.calls().last(), Some(&Call::Teardown { backend: 0 }));
    }

    #[tokio::test]
    async fn send_after_shutdown_reports_closed_channel() {
        let (mut host, _) = host(1);
        let (handle, join) = host.start().unwrap();
        handle.shutdown().await.unwrap();
        join.await.unwrap();

        assert!(matches!(handle.request_draw().await, Err(SurfacingError::ChannelClosed)));
    }

    #[tokio::test]
    async fn second_start_is_rejected() {
        let (mut host, recorder) = host(1);
        assert!(!host.is_started());
        let (handle, join) = host.start().unwrap();
        assert!(host.is_started());

        assert!(matches!(host.start(), Err(SurfacingError::HostAlreadyRunning)));

        // the first loop is unaffected
        handle.surface_available(SurfaceHandle::new(SurfaceSize::new(2, 2))).await.unwrap();
        handle.shutdown().await.unwrap();
        join.await.unwrap();
        assert_eq!(recorder.count(|c| matches!(c, Call::Init { .. })), 1);
        assert_eq!(recorder.live(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn direct_draws_race_safely_with_queued_rebinds() {
        let (mut host, recorder) = host(3);
        let (handle, join) = host.start().unwrap();
        handle.surface_available(SurfaceHandle::new(SurfaceSize::new(8, 8))).await.unwrap();

        let drawer = {
            let handle = handle.clone();
            tokio::task::spawn_blocking(move || {
                for _ in 0..100 {
                    handle.draw_now();
                }
            })
        };
        for i in 0..100 {
            handle.select(i % 3).await.unwrap();
        }
        drawer.await.unwrap();
        handle.shutdown().await.unwrap();
        join.await.unwrap();

        assert_eq!(recorder.max_live(), 1);
        assert_eq!(recorder.live(), 0);
    }
}
