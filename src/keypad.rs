// keypad.rs

use std::io;
use std::os::unix::io::RawFd;
use std::thread::{self, JoinHandle};

use bytes::BytesMut;
use nix::errno::Errno;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::app::Event;
use crate::command::Command;
use crate::keymap::{decode_keys, Keymap};

/// Read raw keys from `fd` on a dedicated thread and forward commands.
pub fn spawn_reader(fd: RawFd, tx: mpsc::Sender<Event>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("keypad-input".into())
        .spawn(move || read_keys(fd, tx))
}

fn read_keys(fd: RawFd, tx: mpsc::Sender<Event>) {
    let mut keymap = Keymap::new();
    let mut buf = BytesMut::with_capacity(64);
    let mut chunk = [0u8; 64];
    loop {
        let n = match nix::unistd::read(fd, &mut chunk) {
            Ok(0) => {
                debug!("keypad input closed");
                let _ = tx.blocking_send(Event::Key(Command::Quit));
                return;
            }
            Ok(n) => n,
            Err(Errno::EINTR) => continue,
            Err(err) => {
                warn!("keypad read failed: {err}");
                let _ = tx.blocking_send(Event::Key(Command::Quit));
                return;
            }
        };
        buf.extend_from_slice(&chunk[..n]);
        for key in decode_keys(&mut buf) {
            let Some(command) = keymap.command(key) else {
                continue;
            };
            let quit = command == Command::Quit;
            if tx.blocking_send(Event::Key(command)).is_err() || quit {
                return;
            }
        }
    }
}
