use crate::device::{GraphicsContext, ProgramId, ProgramLayout};

/// A linked vertex + fragment program.
///
/// Holds exactly one program handle, or none once destroyed. The handle is
/// never replaced: after [`destroy`](Self::destroy) the program stays empty.
/// Dropping a program that still exists leaks the backend object and logs a
/// warning; owners call `destroy` with the context that built it.
#[derive(Debug)]
pub struct ShaderProgram {
    id: Option<ProgramId>,
    layout: ProgramLayout,
}

impl ShaderProgram {
    pub(crate) fn new(id: ProgramId, layout: ProgramLayout) -> Self {
        Self {
            id: Some(id),
            layout,
        }
    }

    /// A program that owns nothing. `exists()` is false.
    pub fn empty() -> Self {
        Self {
            id: None,
            layout: ProgramLayout::default(),
        }
    }

    pub fn exists(&self) -> bool {
        self.id.is_some()
    }

    pub fn id(&self) -> Option<ProgramId> {
        self.id
    }

    /// Attribute and uniform layout the program was linked with.
    pub fn layout(&self) -> &ProgramLayout {
        &self.layout
    }

    /// Releases the program. Calling it again is a no-op.
    pub fn destroy(&mut self, gfx: &mut dyn GraphicsContext) {
        if let Some(id) = self.id.take() {
            gfx.delete_program(id);
            log::debug!("destroyed shader program {}", id.raw());
        }
    }
}

impl Default for ShaderProgram {
    fn default() -> Self {
        Self::empty()
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        if let Some(id) = self.id {
            log::warn!("shader program {} dropped without destroy()", id.raw());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HeadlessContext;

    #[test]
    fn empty_program_does_not_exist() {
        let p = ShaderProgram::empty();
        assert!(!p.exists());
        assert_eq!(p.id(), None);
    }

    #[test]
    fn destroy_on_empty_program_makes_no_backend_call() {
        let mut gfx = HeadlessContext::new();
        let rec = gfx.recorder();

        let mut p = ShaderProgram::empty();
        p.destroy(&mut gfx);

        assert!(rec.calls().is_empty());
    }
}
