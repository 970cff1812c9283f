//! Toolbar highlighting kept in step with the editing surface

use super::surface::{FormatCommand, FormatState, FormatSurface};

/// Surface events after which the toolbar re-reads the formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    KeyUp,
    PointerUp,
    Click,
    SelectionChange,
    Focus,
}

/// Last formatting flags read from the surface
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolbarSync {
    flags: FormatState,
}

impl ToolbarSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flags(&self) -> FormatState {
        self.flags
    }

    pub fn is_active(&self, command: FormatCommand) -> bool {
        self.flags.is_active(command)
    }

    /// Re-derive the flags; never touches the content
    pub fn sync<S: FormatSurface + ?Sized>(&mut self, surface: &S) -> FormatState {
        let flags = surface.query_format_state();
        if flags != self.flags {
            tracing::debug!("Toolbar state changed: {:?}", flags);
        }
        self.flags = flags;
        flags
    }

    pub fn handle_event<S: FormatSurface + ?Sized>(
        &mut self,
        event: SurfaceEvent,
        surface: &S,
    ) -> FormatState {
        tracing::trace!("Syncing toolbar after {:?}", event);
        self.sync(surface)
    }

    /// Apply a format and immediately reflect the new state
    pub fn apply<S: FormatSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        command: FormatCommand,
    ) -> FormatState {
        surface.apply_format(command);
        self.sync(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::surface::{BlockStyle, Caret, MarkupSurface};

    #[test]
    fn test_sync_is_idempotent() {
        let mut surface = MarkupSurface::from_markup("<h2><b>a</b>b</h2>");
        surface.set_caret(Caret::new(0, 1));
        let before = surface.markup();

        let mut toolbar = ToolbarSync::new();
        let first = toolbar.sync(&surface);
        let second = toolbar.handle_event(SurfaceEvent::KeyUp, &surface);
        assert_eq!(first, second);
        assert!(first.bold && first.heading2);
        assert_eq!(surface.markup(), before);
    }

    #[test]
    fn test_apply_updates_flags_without_extra_sync() {
        let mut surface = MarkupSurface::from_markup("<p>metin</p>");
        surface.select(Caret::new(0, 0), Caret::new(0, 5));

        let mut toolbar = ToolbarSync::new();
        toolbar.sync(&surface);
        assert!(!toolbar.is_active(FormatCommand::Bold));

        toolbar.apply(&mut surface, FormatCommand::Bold);
        assert!(toolbar.is_active(FormatCommand::Bold));

        toolbar.apply(&mut surface, FormatCommand::Block(BlockStyle::Heading(1)));
        assert!(toolbar.is_active(FormatCommand::Block(BlockStyle::Heading(1))));
        assert!(!toolbar.flags().heading2);

        toolbar.apply(&mut surface, FormatCommand::UnorderedList);
        let flags = toolbar.flags();
        assert!(flags.unordered_list && !flags.heading1);
    }

    #[test]
    fn test_losing_cursor_clears_flags() {
        let mut surface = MarkupSurface::from_markup("<h1>a</h1>");
        surface.set_caret(Caret::new(0, 0));
        let mut toolbar = ToolbarSync::new();
        assert!(toolbar.sync(&surface).heading1);

        surface.clear_cursor();
        assert_eq!(
            toolbar.handle_event(SurfaceEvent::Click, &surface),
            FormatState::default()
        );
    }

    #[test]
    fn test_focus_and_pointer_release_resync() {
        let mut surface = MarkupSurface::from_markup("<p><b>a</b>b</p><ul><li>c</li></ul>");
        let mut toolbar = ToolbarSync::new();

        surface.set_caret(Caret::new(0, 1));
        assert!(toolbar.handle_event(SurfaceEvent::Focus, &surface).bold);

        surface.set_caret(Caret::new(1, 1));
        let flags = toolbar.handle_event(SurfaceEvent::PointerUp, &surface);
        assert!(flags.unordered_list && !flags.bold);
        assert_eq!(toolbar.flags(), flags);
    }
}
