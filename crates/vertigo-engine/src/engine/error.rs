use std::fmt;

use crate::device::ContextError;

/// Startup failure of the engine.
#[derive(Debug)]
pub enum EngineError {
    /// No graphics context is attached; carries the acquisition error when one was recorded.
    NoContext(Option<ContextError>),
    /// `start` was called before a scene was set.
    NoScene,
    /// The active scene's `init` failed.
    SceneInit { scene: String, source: anyhow::Error },
}

impl EngineError {
    /// Message suitable for showing to the end user.
    pub fn user_message(&self) -> String {
        match self {
            EngineError::NoContext(_) => "Unable to initialize the graphics context. \
                 Your browser or machine may not support it."
                .to_string(),
            EngineError::NoScene => "A scene must be set before running the engine!".to_string(),
            EngineError::SceneInit { scene, source } => {
                format!("Scene '{scene}' failed to initialize: {source}")
            }
        }
    }

    /// Whether `err` is an engine startup failure.
    ///
    /// The engine shows those to the user through its notifier before
    /// returning them, so callers of [`Engine::run`](super::Engine::run)
    /// should not print them a second time.
    pub fn is_reported(err: &anyhow::Error) -> bool {
        err.is::<EngineError>()
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::NoContext(Some(err)) => write!(f, "no graphics context: {err}"),
            EngineError::NoContext(None) => f.write_str("no graphics context attached"),
            EngineError::NoScene => f.write_str("no scene set"),
            EngineError::SceneInit { scene, source } => {
                write!(f, "scene '{scene}' failed to initialize: {source:#}")
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::NoContext(Some(err)) => Some(err),
            EngineError::SceneInit { source, .. } => Some(&**source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_failures_count_as_reported() {
        assert!(EngineError::is_reported(&EngineError::NoScene.into()));
        assert!(EngineError::is_reported(
            &EngineError::NoContext(Some(ContextError::NoAdapter("none".into()))).into()
        ));
    }

    #[test]
    fn other_errors_are_not_reported() {
        let err = anyhow::anyhow!("failed to create winit EventLoop");
        assert!(!EngineError::is_reported(&err));
    }

    #[test]
    fn scene_init_message_includes_cause() {
        let err = EngineError::SceneInit {
            scene: "cube".into(),
            source: anyhow::anyhow!("shader missing"),
        };
        assert_eq!(
            err.user_message(),
            "Scene 'cube' failed to initialize: shader missing"
        );
    }
}
