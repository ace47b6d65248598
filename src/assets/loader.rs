//! Background asset loading with a single hand-off.

use std::thread::{self, JoinHandle};

use rtrb::{Consumer, RingBuffer};
use tracing::warn;

use super::{AssetError, AssetProvider, SampleBank};

type LoadResult = Result<SampleBank, AssetError>;

/// Loads a sample bank on its own thread.
///
/// The result comes back exactly once through a one-slot ring buffer, so the
/// engine thread can poll it every frame without blocking.
pub struct AssetLoader {
    rx: Consumer<LoadResult>,
    handle: Option<JoinHandle<()>>,
    finished: bool,
}

impl AssetLoader {
    pub fn spawn<P: AssetProvider + Send + 'static>(provider: P) -> Self {
        let (mut tx, rx) = RingBuffer::<LoadResult>::new(1);

        let handle = thread::spawn(move || {
            let result = provider.load_all();
            if tx.push(result).is_err() {
                warn!("asset result slot was already full");
            }
        });

        Self {
            rx,
            handle: Some(handle),
            finished: false,
        }
    }

    /// Take the result if loading has finished. Returns `Some` at most once.
    pub fn poll(&mut self) -> Option<LoadResult> {
        if self.finished {
            return None;
        }

        if let Ok(result) = self.rx.pop() {
            return Some(self.finish(result));
        }

        if self.rx.is_abandoned() {
            // The producer may have pushed right before it was dropped.
            let result = self.rx.pop().unwrap_or(Err(AssetError::LoaderGone));
            return Some(self.finish(result));
        }

        None
    }

    /// Block until loading finishes.
    pub fn wait(mut self) -> LoadResult {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                return Err(AssetError::LoaderGone);
            }
        }
        self.poll().unwrap_or(Err(AssetError::LoaderGone))
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn finish(&mut self, result: LoadResult) -> LoadResult {
        self.finished = true;
        // Loader thread is done or about to be; detach it.
        self.handle = None;
        result
    }
}
