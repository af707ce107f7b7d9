//! Daemon-backed sink: every destination ends up as a descriptor owned by
//! the log daemon.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::os::fd::{AsFd, OwnedFd};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use nix::fcntl::OFlag;
use nix::sys::stat::Mode;
use nix::unistd::mkfifo;

use svclog_core::paths::{service_log_path, DISCARD_PATH};
use svclog_core::QueryCommand;

use crate::error::{io_err, SinkError};
use crate::handoff::DescriptorHandoff;
use crate::{ensure_path_safe, LogSink};

const WAKE_INTERVAL: Duration = Duration::from_millis(10);

/// A FIFO whose read end is still waiting for a writer.
struct PendingHandoff {
    fifo: PathBuf,
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

type PendingMap = Arc<Mutex<HashMap<String, PendingHandoff>>>;

/// Sink that forwards descriptors to the log daemon through a
/// [`DescriptorHandoff`].
pub struct RemoteSink {
    fifo_dir: PathBuf,
    query_socket: PathBuf,
    handoff: Arc<dyn DescriptorHandoff>,
    pending: PendingMap,
}

impl RemoteSink {
    pub fn new(
        fifo_dir: impl Into<PathBuf>,
        query_socket: impl Into<PathBuf>,
        handoff: Arc<dyn DescriptorHandoff>,
    ) -> Self {
        Self {
            fifo_dir: fifo_dir.into(),
            query_socket: query_socket.into(),
            handoff,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Services whose FIFO has not been opened by a writer yet.
    pub fn pending(&self) -> Vec<String> {
        let mut names: Vec<_> = lock(&self.pending).keys().cloned().collect();
        names.sort();
        names
    }

    /// Abandon the handoff for `service`, typically because the service will
    /// never start.
    ///
    /// The waiting task is woken, drops its descriptor without handing it to
    /// the daemon and is joined before this returns. The FIFO is removed so
    /// that a later [`LogSink::locate`] can create it again. Returns `false`
    /// when nothing was pending for `service`.
    pub fn cancel(&self, service: &str) -> bool {
        let Some(entry) = lock(&self.pending).remove(service) else {
            return false;
        };
        entry.cancelled.store(true, Ordering::SeqCst);

        // The task may not have reached open(2) yet, so keep offering a
        // writer until it has gone.
        while !entry.task.is_finished() {
            wake_reader(&entry.fifo);
            thread::sleep(WAKE_INTERVAL);
        }
        if entry.task.join().is_err() {
            tracing::warn!(service, "fifo handoff task panicked");
        }
        if let Err(err) = fs::remove_file(&entry.fifo) {
            if err.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %entry.fifo.display(), error = %err, "failed to remove fifo");
            }
        }
        tracing::info!(service, "log handoff cancelled");
        true
    }

    fn spawn_fifo_task(&self, service: &str, fifo: &Path) -> io::Result<()> {
        let cancelled = Arc::new(AtomicBool::new(false));

        // Held until the entry is in place: `cancel` never sees a pending
        // FIFO without the task that waits on it, and the task cannot
        // remove its entry before it exists.
        let mut map = lock(&self.pending);
        let task = {
            let service = service.to_owned();
            let fifo = fifo.to_path_buf();
            let handoff = self.handoff.clone();
            let pending = self.pending.clone();
            let cancelled = cancelled.clone();
            thread::Builder::new()
                .name(format!("fifo-{service}"))
                .spawn(move || {
                    await_writer_and_hand_off(&service, &fifo, handoff.as_ref(), &cancelled);
                    let mut map = lock(&pending);
                    if map
                        .get(&service)
                        .is_some_and(|p| Arc::ptr_eq(&p.cancelled, &cancelled))
                    {
                        map.remove(&service);
                    }
                })?
        };
        map.insert(
            service.to_owned(),
            PendingHandoff {
                fifo: fifo.to_path_buf(),
                cancelled,
                task,
            },
        );
        Ok(())
    }
}

/// A reader blocked opening a FIFO returns as soon as any writer shows up.
fn wake_reader(fifo: &Path) {
    let opened = OpenOptions::new()
        .write(true)
        .custom_flags(OFlag::O_NONBLOCK.bits())
        .open(fifo);
    if let Err(err) = opened {
        // ENXIO: nobody is reading yet, or any more.
        tracing::trace!(path = %fifo.display(), error = %err, "no fifo reader to wake");
    }
}

/// Blocks until a writer opens `fifo`, then passes the read end on.
fn await_writer_and_hand_off(
    service: &str,
    fifo: &Path,
    handoff: &dyn DescriptorHandoff,
    cancelled: &AtomicBool,
) {
    let reader = match File::open(fifo) {
        Ok(reader) => reader,
        Err(err) => {
            tracing::error!(service, path = %fifo.display(), error = %err, "failed to open fifo");
            return;
        }
    };
    if cancelled.load(Ordering::SeqCst) {
        return;
    }
    match handoff.hand_off(service, reader.as_fd()) {
        Ok(()) => tracing::info!(service, path = %fifo.display(), "fifo handed to log daemon"),
        Err(err) => tracing::warn!(service, error = %err, "failed to send fifo to log daemon"),
    }
}

impl LogSink for RemoteSink {
    /// Creates `<fifo_dir>/<service>.log` as a named pipe and returns at
    /// once. A background task waits for the service to open the write end
    /// and then hands the read end to the daemon.
    fn locate(&self, service: &str) -> PathBuf {
        if let Err(err) = ensure_path_safe(service) {
            tracing::warn!(service, error = %err, "discarding output");
            return PathBuf::from(DISCARD_PATH);
        }
        let fifo = service_log_path(&self.fifo_dir, service);
        if let Err(err) = mkfifo(fifo.as_path(), Mode::S_IRUSR | Mode::S_IWUSR) {
            tracing::warn!(service, path = %fifo.display(), error = %err, "cannot create fifo, discarding output");
            return PathBuf::from(DISCARD_PATH);
        }
        if let Err(err) = self.spawn_fifo_task(service, &fifo) {
            tracing::warn!(service, error = %err, "cannot start fifo task, discarding output");
            let _ = fs::remove_file(&fifo);
            return PathBuf::from(DISCARD_PATH);
        }
        fifo
    }

    /// Creates a connected socket pair, gives one end to the daemon and
    /// returns the other, ready for writing.
    fn open(&self, service: &str) -> Result<File, SinkError> {
        ensure_path_safe(service)?;
        let (local, remote) = UnixStream::pair().map_err(|e| io_err("socketpair", e))?;
        self.handoff.hand_off(service, remote.as_fd())?;
        Ok(File::from(OwnedFd::from(local)))
    }

    fn dump_all(&self, out: &mut dyn Write) -> Result<(), SinkError> {
        let socket = &self.query_socket;
        let mut stream = UnixStream::connect(socket).map_err(|e| io_err(socket, e))?;
        stream
            .write_all(&[QueryCommand::Dump.as_byte()])
            .map_err(|e| io_err(socket, e))?;
        io::copy(&mut stream, out).map_err(|e| io_err(socket, e))?;
        out.flush().map_err(|e| io_err("<output>", e))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
