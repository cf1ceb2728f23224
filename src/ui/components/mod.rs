mod command_input;
mod confirm_dialog;
mod input;
mod key_result;
mod persona_editor;
mod search_input;

pub use command_input::CommandInput;
pub use confirm_dialog::{ConfirmDialog, ConfirmEvent};
pub use key_result::KeyResult;
pub use persona_editor::{EditorEvent, PersonaEditor};
pub use search_input::{SearchEvent, SearchInput};
