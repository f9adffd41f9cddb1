//! Console transport fed from a buffer

use std::collections::VecDeque;

use lolmon_core::hal::Transport;

/// Transport with pre-queued input and captured output
///
/// When the input runs dry, [`Transport::receive`] returns `\r` so a
/// pending line editor finishes its line instead of blocking forever. Each
/// such substitute is counted in [`ScriptedTransport::underruns`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    input: VecDeque<u8>,
    output: Vec<u8>,
    initialized: bool,
    /// Receives served after the input was exhausted
    pub underruns: u32,
}

impl ScriptedTransport {
    /// Create a transport that will deliver `input`
    pub fn new(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            ..Self::default()
        }
    }

    /// Queue more input
    pub fn feed(&mut self, input: &[u8]) {
        self.input.extend(input);
    }

    /// Return `true` if all queued input was consumed
    pub fn is_drained(&self) -> bool {
        self.input.is_empty()
    }

    /// Everything sent so far
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Everything sent so far, lossily decoded
    pub fn output_string(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    /// Return the output sent so far and start capturing afresh
    pub fn take_output(&mut self) -> String {
        let out = self.output_string();
        self.output.clear();
        out
    }

    /// Return `true` once [`Transport::init`] ran
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl Transport for ScriptedTransport {
    fn init(&mut self) {
        self.initialized = true;
    }

    fn send(&mut self, byte: u8) {
        self.output.push(byte);
    }

    fn receive(&mut self) -> u8 {
        self.input.pop_front().unwrap_or_else(|| {
            self.underruns += 1;
            b'\r'
        })
    }

    fn can_receive(&mut self) -> bool {
        !self.input.is_empty()
    }
}
