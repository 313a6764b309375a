mod central_panel;
mod dialog;
mod gallery_panel;
mod tools_panel;

pub use central_panel::central_panel;
pub use dialog::dialog_window;
pub use gallery_panel::gallery_panel;
pub use tools_panel::tools_panel;
