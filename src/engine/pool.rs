//! Shared session pool backing both shipped engines.
//!
//! A pool owns a set of open serial port handles plus one background reader
//! task per handle. Serial I/O is synchronous, so every blocking call runs on
//! Tokio's blocking executor; reader loops poll with a short internal port
//! timeout so they can observe the shutdown flag promptly.

use crate::error::{MeasureError, MeasureResult};
use crate::listener::SharedListener;
use crate::params::LinkSettings;
use serialport::SerialPort;
use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Poll granularity of reader loops and of shutdown observation.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

type SharedPort = Arc<StdMutex<Box<dyn SerialPort>>>;

struct Session {
    target: String,
    port: SharedPort,
    shutdown: Arc<AtomicBool>,
    listener: SharedListener,
    reader: JoinHandle<()>,
}

/// Pool of open sessions for one transport family.
pub(crate) struct SessionPool {
    family: &'static str,
    sessions: Mutex<Vec<Session>>,
}

impl SessionPool {
    pub(crate) fn new(family: &'static str) -> Self {
        Self {
            family,
            sessions: Mutex::new(Vec::new()),
        }
    }

    /// Open a port with `link` applied and start its reader loop.
    pub(crate) async fn open(
        &self,
        target: &str,
        link: &LinkSettings,
        listener: SharedListener,
    ) -> MeasureResult<()> {
        let path = target.to_string();
        let settings = link.clone();
        let port = tokio::task::spawn_blocking(move || -> MeasureResult<Box<dyn SerialPort>> {
            let port = serialport::new(&path, settings.baud_rate)
                .data_bits(settings.serialport_data_bits())
                .stop_bits(settings.serialport_stop_bits())
                .parity(settings.serialport_parity())
                .flow_control(settings.serialport_flow_control())
                .timeout(POLL_INTERVAL)
                .open()?;
            Ok(port)
        })
        .await
        .map_err(|err| MeasureError::Engine(format!("open task panicked: {err}")))??;

        debug!(
            family = self.family,
            port = target,
            baud = link.baud_rate,
            "session opened"
        );

        let port: SharedPort = Arc::new(StdMutex::new(port));
        let shutdown = Arc::new(AtomicBool::new(false));
        let reader = spawn_reader(
            target.to_string(),
            Arc::clone(&port),
            Arc::clone(&shutdown),
            Arc::clone(&listener),
        );

        listener.on_opened(target);
        self.sessions.lock().await.push(Session {
            target: target.to_string(),
            port,
            shutdown,
            listener,
            reader,
        });
        Ok(())
    }

    /// Write every buffer in `data` to every pooled session, in order.
    ///
    /// All sessions are attempted; the first failure is surfaced afterwards.
    pub(crate) async fn write(&self, data: &[Vec<u8>]) -> MeasureResult<()> {
        if data.is_empty() {
            return Ok(());
        }

        let targets: Vec<(String, SharedPort)> = {
            let sessions = self.sessions.lock().await;
            sessions
                .iter()
                .map(|session| (session.target.clone(), Arc::clone(&session.port)))
                .collect()
        };

        let mut first_err = None;
        for (target, port) in targets {
            let buffers = data.to_vec();
            let result = tokio::task::spawn_blocking(move || -> MeasureResult<()> {
                let mut guard = lock_port(&port);
                for buffer in &buffers {
                    guard.write_all(buffer)?;
                }
                guard.flush()?;
                Ok(())
            })
            .await
            .map_err(|err| MeasureError::Engine(format!("write task panicked: {err}")))
            .and_then(|result| result);

            if let Err(err) = result {
                warn!(family = self.family, port = target.as_str(), %err, "session write failed");
                first_err.get_or_insert(err);
            }
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Close every pooled session: stop the readers, drop the port handles,
    /// notify the listeners.
    pub(crate) async fn stop(&self) -> MeasureResult<()> {
        let drained: Vec<Session> = {
            let mut sessions = self.sessions.lock().await;
            sessions.drain(..).collect()
        };

        for session in drained {
            session.shutdown.store(true, Ordering::SeqCst);
            // The reader exits within one poll interval of the flag flip.
            if tokio::time::timeout(Duration::from_secs(1), session.reader)
                .await
                .is_err()
            {
                warn!(
                    family = self.family,
                    port = session.target.as_str(),
                    "reader task did not exit in time"
                );
            }
            session.listener.on_closed(&session.target);
            debug!(
                family = self.family,
                port = session.target.as_str(),
                "session closed"
            );
        }
        Ok(())
    }

    /// Number of currently open sessions.
    #[cfg(test)]
    pub(crate) async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

fn lock_port(port: &SharedPort) -> std::sync::MutexGuard<'_, Box<dyn SerialPort>> {
    match port.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Blocking reader loop forwarding received chunks to the listener.
fn spawn_reader(
    target: String,
    port: SharedPort,
    shutdown: Arc<AtomicBool>,
    listener: SharedListener,
) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        let mut buffer = [0u8; 1024];
        while !shutdown.load(Ordering::SeqCst) {
            // Lock per iteration so writes can interleave with the poll.
            let read = {
                let mut guard = lock_port(&port);
                guard.read(&mut buffer)
            };
            match read {
                Ok(0) => {
                    listener.on_error(&target, "serial stream closed");
                    break;
                }
                Ok(n) => listener.on_data(&target, &buffer[..n]),
                Err(err)
                    if err.kind() == std::io::ErrorKind::TimedOut
                        || err.kind() == std::io::ErrorKind::Interrupted =>
                {
                    continue;
                }
                Err(err) => {
                    if !shutdown.load(Ordering::SeqCst) {
                        listener.on_error(&target, &err.to_string());
                    }
                    break;
                }
            }
        }
    })
}
