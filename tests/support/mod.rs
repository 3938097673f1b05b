#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT: AtomicUsize = AtomicUsize::new(0);

/// A scratch directory under the system temp dir, removed on drop.
pub struct TempRoot {
    path: PathBuf,
}

impl TempRoot {
    pub fn new(label: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "jailhttp-{label}-{}-{}",
            std::process::id(),
            NEXT.fetch_add(1, Ordering::SeqCst)
        ));
        fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, relative: &str, contents: &[u8]) -> PathBuf {
        let file = self.path.join(relative);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&file, contents).unwrap();
        file
    }
}

impl Drop for TempRoot {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use jailhttp::config::Config;
use jailhttp::server::{Server, ShutdownHandle};

/// A server running its event loop on a background thread.
pub struct RunningServer {
    pub addr: SocketAddr,
    shutdown: ShutdownHandle,
    thread: JoinHandle<anyhow::Result<()>>,
}

impl RunningServer {
    pub fn start(root: &Path) -> Self {
        Self::start_with_idle_timeout(root, 0)
    }

    pub fn start_with_idle_timeout(root: &Path, idle_timeout_ms: u64) -> Self {
        let mut cfg = Config::default();
        cfg.server.listen_addr = "127.0.0.1:0".to_string();
        cfg.server.idle_timeout_ms = idle_timeout_ms;
        cfg.static_files.root = root.to_path_buf();

        let server = Server::bind(&cfg).unwrap();
        let addr = server.local_addr().unwrap();
        let shutdown = server.shutdown_handle();
        let thread = thread::spawn(move || server.run());

        Self { addr, shutdown, thread }
    }

    pub fn connect(&self) -> TcpStream {
        let stream = TcpStream::connect(self.addr).unwrap();
        stream.set_nodelay(true).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        stream
    }

    /// Sends `raw` in one write and reads until the server closes.
    pub fn exchange(&self, raw: &[u8]) -> Vec<u8> {
        let mut stream = self.connect();
        stream.write_all(raw).unwrap();
        read_all(&mut stream)
    }

    pub fn stop(self) {
        self.shutdown.trigger();
        self.thread.join().unwrap().unwrap();
    }
}

/// Reads until EOF. A reset counts as the end of the stream.
pub fn read_all(stream: &mut TcpStream) -> Vec<u8> {
    let mut out = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        match stream.read(&mut buf) {
            Ok(0) => return out,
            Ok(n) => out.extend_from_slice(&buf[..n]),
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionReset => return out,
            Err(e) => panic!("read failed: {e}"),
        }
    }
}
