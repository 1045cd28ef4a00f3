
use std::collections::VecDeque;
use std::io::{Write, stdout};
use std::sync::Mutex;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::terminal;

pub trait Console: Send + Sync {
    // Non-blocking; consumes the character when one is pending.
    fn poll_input(&self) -> Option<u8>;
    fn read_blocking(&self) -> u8;

    fn write_byte(&self, val: u8);
    fn flush(&self);
}

////////////////////////////////////////////////////////////////////////////////

fn key_byte(key: &KeyEvent) -> Option<u8> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        // Raw mode turned ISIG off, so ctrl-c arrives as an ordinary key
        // event rather than SIGINT.
        if key.code == KeyCode::Char('c') {
            terminal::interrupt_exit();
        }
        return None;
    }
    match key.code {
        KeyCode::Char(c) if c.is_ascii() => Some(c as u8),
        KeyCode::Enter => Some(b'\n'),
        KeyCode::Tab => Some(b'\t'),
        KeyCode::Backspace => Some(0x08),
        KeyCode::Esc => Some(0x1b),
        _ => None,
    }
}

// The real terminal. Key events are drained into a pending queue so that a
// poll which finds a character does not lose it before the matching read.
#[derive(Default)]
pub struct TermConsole {
    pending: Mutex<VecDeque<u8>>,
}

impl TermConsole {
    pub fn new() -> TermConsole {
        Default::default()
    }

    fn pump(&self, pending: &mut VecDeque<u8>) {
        while event::poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => {
                    if let Some(byte) = key_byte(&key) {
                        pending.push_back(byte);
                    }
                }
                Ok(_) => (),
                Err(_) => break,
            }
        }
    }
}

impl Console for TermConsole {
    fn poll_input(&self) -> Option<u8> {
        let mut pending = self.pending.lock().unwrap();
        self.pump(&mut pending);
        pending.pop_front()
    }

    fn read_blocking(&self) -> u8 {
        loop {
            if let Some(byte) = self.poll_input() {
                return byte;
            }
            match event::read() {
                Ok(Event::Key(key)) => {
                    if let Some(byte) = key_byte(&key) {
                        return byte;
                    }
                }
                _ => (),
            }
        }
    }

    fn write_byte(&self, val: u8) {
        let mut out = stdout().lock();
        // Raw mode disables output post-processing, so supply the carriage
        // return ourselves.
        if val == b'\n' {
            out.write_all(b"\r\n").unwrap();
        } else {
            out.write_all(&[val]).unwrap();
        }
    }

    fn flush(&self) {
        stdout().lock().flush().unwrap();
    }
}

////////////////////////////////////////////////////////////////////////////////

#[derive(Default)]
pub struct PipeConsole {
    out_buf: Mutex<VecDeque<u8>>,
    in_buf: Mutex<VecDeque<u8>>,
}

impl PipeConsole {
    pub fn take_output(&self) -> VecDeque<u8> {
        std::mem::take(&mut self.out_buf.lock().unwrap())
    }

    pub fn is_out_empty(&self) -> bool {
        self.out_buf.lock().unwrap().is_empty()
    }

    pub fn pop_output(&self) -> Option<u8> {
        self.out_buf.lock().unwrap().pop_front()
    }

    pub fn push_input(&self, val: u8) {
        self.in_buf.lock().unwrap().push_back(val);
    }

    pub fn write_input(&self, vals: &[u8]) {
        for val in vals.iter() {
            self.push_input(*val);
        }
    }
}

impl Console for PipeConsole {
    fn poll_input(&self) -> Option<u8> {
        self.in_buf.lock().unwrap().pop_front()
    }

    fn read_blocking(&self) -> u8 {
        // A test that blocks forever is a bug; fail it instead.
        self.poll_input()
            .expect("PipeConsole: blocking read with no input queued")
    }

    fn write_byte(&self, val: u8) {
        self.out_buf.lock().unwrap().push_back(val);
    }

    fn flush(&self) {}
}
