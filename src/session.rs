//! Project session state shared by the menu and signal handlers.
//!
//! The save flow is an explicit transition chain:
//!
//! ```text
//! Editing --begin_save--> Saving --complete_save--> AwaitingNewProject --project_created--> Editing
//! ```

use serde_json::Value;

/// Where the project is in the save / new-project flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectPhase {
    #[default]
    Editing,
    /// Save dialog is open
    Saving,
    /// Save finished, new-project dialog requested
    AwaitingNewProject,
}

/// What the "New Project" action should do for the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewProjectDecision {
    /// Lists were cleared (or already empty); open the new-project dialog
    OpenNewProject,
    /// Unsaved work exists; open the save dialog first
    PromptSave,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    project_saved: bool,
    components_loaded: Vec<Value>,
    files_loaded: Vec<Value>,
    phase: ProjectPhase,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_saved(&self) -> bool {
        self.project_saved
    }

    pub fn components(&self) -> &[Value] {
        &self.components_loaded
    }

    pub fn files(&self) -> &[Value] {
        &self.files_loaded
    }

    pub fn phase(&self) -> ProjectPhase {
        self.phase
    }

    pub fn has_content(&self) -> bool {
        !self.components_loaded.is_empty() || !self.files_loaded.is_empty()
    }

    pub fn set_saved(&mut self, saved: bool) {
        self.project_saved = saved;
    }

    /// Adding to the project leaves it with unsaved changes
    pub fn load_component(&mut self, descriptor: Value) {
        self.components_loaded.push(descriptor);
        self.project_saved = false;
    }

    pub fn load_file(&mut self, descriptor: Value) {
        self.files_loaded.push(descriptor);
        self.project_saved = false;
    }

    fn clear_loaded(&mut self) {
        self.components_loaded.clear();
        self.files_loaded.clear();
    }

    /// Decide what "New Project" does.
    ///
    /// Empty projects go straight to the new-project dialog whatever the saved
    /// flag says. A saved project with content is cleared first; an unsaved one
    /// must go through the save dialog.
    pub fn start_new_project(&mut self) -> NewProjectDecision {
        if !self.has_content() {
            return NewProjectDecision::OpenNewProject;
        }
        if self.project_saved {
            self.clear_loaded();
            NewProjectDecision::OpenNewProject
        } else {
            NewProjectDecision::PromptSave
        }
    }

    pub fn begin_save(&mut self) {
        self.phase = ProjectPhase::Saving;
    }

    /// The save dialog closed: the project counts as saved and emptied
    pub fn complete_save(&mut self) {
        self.project_saved = true;
        self.clear_loaded();
        self.phase = ProjectPhase::AwaitingNewProject;
    }

    pub fn project_created(&mut self) {
        self.phase = ProjectPhase::Editing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_unsaved_project_skips_save_prompt() {
        let mut session = SessionState::new();
        assert!(!session.is_saved());
        assert_eq!(session.start_new_project(), NewProjectDecision::OpenNewProject);
    }

    #[test]
    fn test_unsaved_components_prompt_save() {
        let mut session = SessionState::new();
        session.load_component(json!({"kind": "button"}));
        assert_eq!(session.start_new_project(), NewProjectDecision::PromptSave);
        // Nothing is cleared until the save dialog closes
        assert_eq!(session.components().len(), 1);
    }

    #[test]
    fn test_unsaved_files_prompt_save() {
        let mut session = SessionState::new();
        session.load_file(json!("main.bp"));
        assert_eq!(session.start_new_project(), NewProjectDecision::PromptSave);
    }

    #[test]
    fn test_saved_project_is_cleared_directly() {
        let mut session = SessionState::new();
        session.load_component(json!({"kind": "label"}));
        session.load_file(json!("main.bp"));
        session.set_saved(true);

        assert_eq!(session.start_new_project(), NewProjectDecision::OpenNewProject);
        assert!(session.components().is_empty());
        assert!(session.files().is_empty());
    }

    #[test]
    fn test_loading_marks_unsaved() {
        let mut session = SessionState::new();
        session.set_saved(true);
        session.load_file(json!("a.bp"));
        assert!(!session.is_saved());
    }

    #[test]
    fn test_save_chain_phases() {
        let mut session = SessionState::new();
        session.load_component(json!(1));
        session.begin_save();
        assert_eq!(session.phase(), ProjectPhase::Saving);

        session.complete_save();
        assert_eq!(session.phase(), ProjectPhase::AwaitingNewProject);
        assert!(session.is_saved());
        assert!(!session.has_content());

        session.project_created();
        assert_eq!(session.phase(), ProjectPhase::Editing);
    }
}
