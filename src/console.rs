use crossbeam_channel::{bounded, never, select, Receiver, Sender};
use std::io::{self, BufRead, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Install a Ctrl-C handler that sets `cancelled` instead of killing the process.
///
/// The returned receiver gets one message per signal, so a blocked prompt can
/// wake up and end the loop.
pub fn install_interrupt_handler(
    cancelled: Arc<AtomicBool>,
) -> Result<Receiver<()>, ctrlc::Error> {
    let (interrupt_tx, interrupt_rx) = bounded::<()>(1);

    ctrlc::set_handler(move || {
        cancelled.store(true, Ordering::SeqCst);
        // A pending wake-up is already enough
        let _ = interrupt_tx.try_send(());
    })?;

    Ok(interrupt_rx)
}

/// Operator input that ends early when an interrupt arrives.
///
/// Lines are read from stdin on a helper thread and handed over through a
/// channel; the prompt waits on either a line or an interrupt. After an
/// interrupt, or once stdin is exhausted, reads report end of input.
pub struct ConsoleInput {
    lines: Receiver<io::Result<String>>,
    interrupts: Receiver<()>,
    buf: Vec<u8>,
    pos: usize,
    closed: bool,
}

impl ConsoleInput {
    pub fn new(lines: Receiver<io::Result<String>>, interrupts: Receiver<()>) -> Self {
        ConsoleInput {
            lines,
            interrupts,
            buf: Vec::new(),
            pos: 0,
            closed: false,
        }
    }

    /// Start the stdin reader thread and wrap it
    pub fn stdin(interrupts: Receiver<()>) -> Self {
        let (line_tx, line_rx) = bounded(1);
        thread::spawn(move || read_stdin_lines(line_tx));
        ConsoleInput::new(line_rx, interrupts)
    }

    fn interrupted(&self) -> bool {
        self.interrupts.try_recv().is_ok()
    }
}

fn read_stdin_lines(line_tx: Sender<io::Result<String>>) {
    let stdin = io::stdin();
    let mut handle = stdin.lock();

    loop {
        let mut line = String::new();
        match handle.read_line(&mut line) {
            // EOF; dropping the sender closes the channel
            Ok(0) => break,
            Ok(_) => {
                if line_tx.send(Ok(line)).is_err() {
                    break;
                }
            }
            Err(e) => {
                let _ = line_tx.send(Err(e));
                break;
            }
        }
    }
}

impl Read for ConsoleInput {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl BufRead for ConsoleInput {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        while self.pos >= self.buf.len() && !self.closed {
            self.buf.clear();
            self.pos = 0;

            // An interrupt that came in while no prompt was waiting still wins
            if self.interrupted() {
                self.closed = true;
                break;
            }

            let mut handler_gone = false;
            select! {
                recv(self.lines) -> msg => match msg {
                    Ok(Ok(line)) => self.buf = line.into_bytes(),
                    Ok(Err(e)) => return Err(e),
                    Err(_) => self.closed = true,
                },
                recv(self.interrupts) -> msg => match msg {
                    Ok(()) => self.closed = true,
                    Err(_) => handler_gone = true,
                },
            }

            // Nobody can signal any more, wait on lines alone
            if handler_gone {
                self.interrupts = never();
            }
        }
        Ok(&self.buf[self.pos..])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.buf.len());
    }
}
