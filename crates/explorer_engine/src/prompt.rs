use explorer_core::PickerItem;

/// User interaction the provider needs: pickers, input boxes, confirmations
/// and notifications. The app implements it over the terminal.
pub trait Prompter: Send + Sync {
    /// Returns the label of the chosen item, `None` when dismissed.
    fn pick(&self, title: &str, items: &[PickerItem]) -> Option<String>;

    /// Free text input; `None` when dismissed.
    fn input(&self, prompt: &str, value: Option<&str>) -> Option<String>;

    /// Modal confirmation with a single affirmative `action`.
    fn confirm(&self, message: &str, action: &str) -> bool;

    fn show_message(&self, message: &str);

    fn show_error(&self, message: &str);

    /// Transient status line, e.g. while a spool file is polled.
    fn set_status(&self, _message: &str) {}

    /// Remote failures end up here.
    fn report_api_error(&self, profile: &str, context: &str, error: &str) {
        self.show_error(&format!("{context} for profile {profile}: {error}"));
    }
}
