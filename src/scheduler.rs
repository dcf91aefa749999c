use std::thread::{self, JoinHandle};

/// Where background work (currently only audio playback) gets to run.
pub trait Scheduler {
    fn spawn<F>(&self, name: &str, f: F) -> std::io::Result<JoinHandle<()>>
    where
        F: FnOnce() + Send + 'static;
}

pub struct ThreadScheduler;

impl ThreadScheduler {
    pub fn new() -> Self {
        ThreadScheduler
    }
}

impl Default for ThreadScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ThreadScheduler {
    fn spawn<F>(&self, name: &str, f: F) -> std::io::Result<JoinHandle<()>>
    where
        F: FnOnce() + Send + 'static,
    {
        thread::Builder::new().name(name.to_string()).spawn(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_thread_scheduler_spawn() {
        let scheduler = ThreadScheduler::new();
        let flag = Arc::new(Mutex::new(false));
        let flag_clone = flag.clone();

        let handle = scheduler
            .spawn("test", move || {
                let mut flag = flag_clone.lock().unwrap();
                *flag = true;
            })
            .unwrap();

        handle.join().unwrap();
        assert!(*flag.lock().unwrap());
    }

    #[test]
    fn test_thread_is_named() {
        let handle = ThreadScheduler::new()
            .spawn("midi2video-audio", || {
                assert_eq!(thread::current().name(), Some("midi2video-audio"));
            })
            .unwrap();
        assert!(handle.join().is_ok());
    }
}
