use std::sync::mpsc::Receiver;

use crate::state::{ StateMutex, StatePerceptron };

/// Copies every snapshot sent by the simulation thread into the shared state
/// the dashboard renders from.
pub struct Editor {
    pub rx: Receiver<StatePerceptron>,
    pub state: StateMutex,
}

impl Editor {
    /// Returns once the sending side hangs up.
    pub fn listen_and_update(&self) {
        while let Ok(received_state) = self.rx.recv() {
            if let Ok(mut state) = self.state.lock() {
                *state = received_state;
            } else {
                log::warn!("failed to lock perceptron state");
            }
        }
    }
}
