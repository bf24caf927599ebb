//! Shutdown signal that tests trigger by hand.

use std::sync::{Arc, Condvar, Mutex};

use crate::process::{ShutdownError, ShutdownSignal};

#[derive(Debug, Clone, Default)]
pub struct TestShutdownSignal {
    state: Arc<(Mutex<bool>, Condvar)>,
}

impl TestShutdownSignal {
    pub fn trigger(&self) {
        let (triggered, wake) = &*self.state;
        *triggered.lock().expect("shutdown mutex poisoned") = true;
        wake.notify_all();
    }
}

impl ShutdownSignal for TestShutdownSignal {
    fn wait(&self) -> Result<(), ShutdownError> {
        let (triggered, wake) = &*self.state;
        let mut guard = triggered.lock().expect("shutdown mutex poisoned");
        while !*guard {
            guard = wake.wait(guard).expect("shutdown mutex poisoned");
        }
        Ok(())
    }
}
