/// Channel for messages the end user must see (startup failures, fatal device errors).
pub trait Notifier {
    fn notify(&mut self, message: &str);
}

impl<F> Notifier for F
where
    F: FnMut(&str),
{
    fn notify(&mut self, message: &str) {
        self(message)
    }
}

/// Platform default: `window.alert` in the browser, stderr on native.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostNotifier;

impl Notifier for HostNotifier {
    #[cfg(target_arch = "wasm32")]
    fn notify(&mut self, message: &str) {
        let shown = web_sys::window().is_some_and(|w| w.alert_with_message(message).is_ok());
        if !shown {
            log::error!("{message}");
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn notify(&mut self, message: &str) {
        eprintln!("{message}");
    }
}
